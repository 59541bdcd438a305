// src/fetch/mod.rs

pub mod provider;

pub use provider::{fetch_first, Provider};

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

/// Fixed per-request time limit; a timeout is a hard failure of that one
/// request, never retried.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = "Mozilla/5.0 (compatible; cn-market-calendar; +https://github.com/)";

/// Shared HTTP client for the whole run.
pub fn client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .gzip(true)
        .build()
        .context("building HTTP client")
}

/// GET a page as text. Some government pages redirect or sit behind odd
/// proxies; non-success statuses are errors here.
pub async fn get_text(client: &Client, url: &str) -> Result<String> {
    client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("non-success status from {}", url))?
        .text()
        .await
        .with_context(|| format!("reading body from {}", url))
}

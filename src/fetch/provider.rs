// src/fetch/provider.rs

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::table::Dataset;

/// One named upstream interface for a category. Provider schemas drift
/// between versions, so each category lists several adapters in preference
/// order and takes the first that yields rows.
#[derive(Debug, Clone, Copy)]
pub struct Provider {
    pub name: &'static str,
    pub url: &'static str,
}

/// The East Money datacenter envelope most adapters return.
#[derive(Debug, Deserialize)]
struct DatacenterEnvelope {
    result: Option<DatacenterResult>,
}

#[derive(Debug, Deserialize)]
struct DatacenterResult {
    data: Vec<Value>,
}

impl Provider {
    pub async fn fetch(&self, client: &Client) -> Result<Dataset> {
        debug!(provider = self.name, url = self.url, "fetching dataset");
        let body: Value = client
            .get(self.url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", self.url))?
            .error_for_status()
            .with_context(|| format!("non-success status from {}", self.url))?
            .json()
            .await
            .with_context(|| format!("decoding JSON from {}", self.url))?;

        let rows = extract_rows(&body)
            .ok_or_else(|| anyhow!("unrecognized payload envelope from {}", self.name))?;
        if rows.is_empty() {
            bail!("{} returned an empty dataset", self.name);
        }
        Ok(Dataset::from_rows(rows))
    }
}

/// Dig object rows out of the envelopes the providers are known to use.
fn extract_rows(body: &Value) -> Option<Vec<Map<String, Value>>> {
    if let Ok(env) = serde_json::from_value::<DatacenterEnvelope>(body.clone()) {
        if let Some(result) = env.result {
            return object_rows(&result.data);
        }
    }
    for path in [&["data", "list"][..], &["data", "items"], &["data"], &["items"]] {
        let mut cursor = body;
        let mut ok = true;
        for key in path.iter() {
            match cursor.get(*key) {
                Some(v) => cursor = v,
                None => {
                    ok = false;
                    break;
                }
            }
        }
        if ok {
            if let Some(arr) = cursor.as_array() {
                return object_rows(arr);
            }
        }
    }
    body.as_array().and_then(|arr| object_rows(arr))
}

fn object_rows(arr: &[Value]) -> Option<Vec<Map<String, Value>>> {
    let rows: Vec<_> = arr
        .iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();
    if rows.len() == arr.len() {
        Some(rows)
    } else {
        None
    }
}

/// Try each adapter in order and return the first dataset. If every adapter
/// fails, the error names all of them so a maintainer can update the list
/// when a provider renames its interface.
pub async fn fetch_first(
    client: &Client,
    category: &str,
    providers: &[Provider],
) -> Result<Dataset> {
    let mut failures = Vec::with_capacity(providers.len());
    for provider in providers {
        match provider.fetch(client).await {
            Ok(ds) => {
                debug!(
                    provider = provider.name,
                    rows = ds.rows.len(),
                    "dataset fetched"
                );
                return Ok(ds);
            }
            Err(e) => {
                warn!(provider = provider.name, error = %e, "provider failed, trying next");
                failures.push(format!("{}: {:#}", provider.name, e));
            }
        }
    }
    bail!(
        "no usable provider for {} (tried: {})",
        category,
        failures.join("; ")
    )
}

// src/events/macro_econ.rs
//
// 06_macro.ics — macro data releases and events, de-noised to the markets
// that move A-shares: a country allow-list plus an importance floor.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use tracing::info;

use super::join_desc;
use crate::config::{Config, DateWindow};
use crate::fetch::{fetch_first, Provider};
use crate::ics::{register, short_hash, CalendarSink, EventSpec, EventTime};
use crate::table::{cell, cell_text, to_datetime, Dataset};

const PROVIDERS: &[Provider] = &[Provider {
    name: "macro_info_ws",
    url: "https://api-one-wscn.awtmt.com/apiv1/finance/macrodatas?limit=500",
}];

const TIME: &[&str] = &["时间", "date", "datetime", "public_date", "timestamp"];
const COUNTRY: &[&str] = &["国家", "country"];
const EVENT: &[&str] = &["事件", "event", "指标", "title"];
const IMPORTANCE: &[&str] = &["重要性", "importance", "star"];
const FORECAST: &[&str] = &["预期", "forecast", "expected"];
const PREVIOUS: &[&str] = &["前值", "previous"];

const COUNTRY_ALLOW: &[&str] = &["中国", "美国", "欧元区"];

static DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("digit pattern should be valid"));

pub async fn generate(client: &Client, cfg: &Config, all: &mut CalendarSink) -> Result<()> {
    let ds = fetch_first(client, "宏观日历", PROVIDERS).await?;
    let events = build_events(&ds, &cfg.window());
    info!(count = events.len(), "macro events in window");

    let mut cal = CalendarSink::new("宏观｜重要经济数据/事件", cfg.max_events_per_day);
    for ev in &events {
        register(ev, &mut cal, all);
    }
    cal.write(&cfg.out_dir, "06_macro.ics")?;
    Ok(())
}

/// Importance formats differ per source: ★★★★★, bare digits, 高/重要.
/// High marks pass, low marks drop, unknown formats pass unfiltered.
fn important_enough(imp: &str) -> bool {
    if imp.is_empty() || imp.contains('高') || imp.contains("重要") {
        return true;
    }
    if let Some(m) = DIGITS.find(imp) {
        if let Ok(n) = m.as_str().parse::<u32>() {
            return n >= 3;
        }
    }
    if imp.contains('★') {
        return imp.chars().filter(|&c| c == '★').count() >= 3;
    }
    true
}

fn build_events(ds: &Dataset, window: &DateWindow) -> Vec<EventSpec> {
    let time_col = ds.resolve(TIME);
    let country_col = ds.resolve(COUNTRY);
    let event_col = ds.resolve(EVENT);
    let imp_col = ds.resolve(IMPORTANCE);
    let forecast_col = ds.resolve(FORECAST);
    let previous_col = ds.resolve(PREVIOUS);

    let mut events = Vec::new();
    for row in &ds.rows {
        let Some(day) = cell(row, time_col.as_deref())
            .and_then(to_datetime)
            .map(|dt| dt.date())
        else {
            continue;
        };
        if !window.contains(day) {
            continue;
        }

        let country = cell_text(row, country_col.as_deref());
        if !country.is_empty() && !COUNTRY_ALLOW.contains(&country.as_str()) {
            continue;
        }
        let importance = cell_text(row, imp_col.as_deref());
        if !important_enough(&importance) {
            continue;
        }

        let name = cell_text(row, event_col.as_deref());
        let forecast = cell_text(row, forecast_col.as_deref());
        let previous = cell_text(row, previous_col.as_deref());
        let summary = if country.is_empty() {
            name.clone()
        } else {
            format!("{}｜{}", country, name)
        };
        let desc = join_desc(&[
            if importance.is_empty() { String::new() } else { format!("重要性: {}", importance) },
            if forecast.is_empty() { String::new() } else { format!("预期: {}", forecast) },
            if previous.is_empty() { String::new() } else { format!("前值: {}", previous) },
        ]);

        events.push(EventSpec {
            summary: format!("宏观数据｜{}", summary),
            description: desc,
            uid: format!("macro-{}-{}", day, short_hash(&summary)),
            when: EventTime::AllDay(day),
        });
    }
    events
}

// src/events/unlock.rs
//
// 02_unlock.ics — share unlock dates, filtered to unlocks worth at least
// `unlock_mv_min_yi` 亿元.

use anyhow::Result;
use reqwest::Client;
use tracing::info;

use super::{join_desc, security_title};
use crate::config::{Config, DateWindow};
use crate::fetch::{fetch_first, Provider};
use crate::ics::{register, CalendarSink, EventSpec, EventTime};
use crate::table::{cell, cell_text, to_datetime, Dataset};

/// The unlock interface has been renamed across provider versions; newest
/// first.
const PROVIDERS: &[Provider] = &[
    Provider {
        name: "stock_restricted_release_queue_em",
        url: "https://datacenter-web.eastmoney.com/api/data/v1/get?reportName=RPT_LIFT_STAGE&columns=ALL&sortColumns=FREE_DATE&sortTypes=1&pageSize=500&pageNumber=1&source=WEB",
    },
    Provider {
        name: "stock_restricted_release_summary_em",
        url: "https://datacenter-web.eastmoney.com/api/data/v1/get?reportName=RPT_LIFT_GBJJ&columns=ALL&sortColumns=FREE_DATE&sortTypes=1&pageSize=500&pageNumber=1&source=WEB",
    },
    Provider {
        name: "stock_restricted_release_detail_em",
        url: "https://datacenter-web.eastmoney.com/api/data/v1/get?reportName=RPT_LIFT_DETAIL&columns=ALL&sortColumns=FREE_DATE&sortTypes=1&pageSize=500&pageNumber=1&source=WEB",
    },
];

const DATE: &[&str] = &["解禁日期", "日期", "FREE_DATE", "LIFT_DATE"];
const CODE: &[&str] = &["股票代码", "代码", "SECURITY_CODE"];
const NAME: &[&str] = &["股票简称", "名称", "SECURITY_NAME_ABBR"];
const AMOUNT: &[&str] = &["解禁数量", "解禁股数", "数量", "解禁数量(万股)", "LIFT_NUM"];
const MARKET_VALUE: &[&str] = &["解禁市值", "市值", "解禁市值(亿元)", "LIFT_MARKET_CAP"];

/// Raw upstream field keys that report market value in 元 rather than 亿元.
const RAW_YUAN_COLS: &[&str] = &["LIFT_MARKET_CAP"];

pub async fn generate(client: &Client, cfg: &Config, all: &mut CalendarSink) -> Result<()> {
    let ds = fetch_first(client, "限售解禁", PROVIDERS).await?;
    let events = build_events(&ds, &cfg.window(), cfg.unlock_mv_min_yi);
    info!(count = events.len(), "unlock events in window");

    let mut cal = CalendarSink::new("A股｜限售解禁", cfg.max_events_per_day);
    for ev in &events {
        register(ev, &mut cal, all);
    }
    cal.write(&cfg.out_dir, "02_unlock.ics")?;
    Ok(())
}

/// Market value cell → 亿元. Strips commas and a trailing 亿. Columns known
/// to report in 元 (`RAW_YUAN_COLS`) are always scaled down; for 亿元-labeled
/// columns the scaling only kicks in above 1e7, where a literal 亿元 reading
/// would be absurd, so a mislabeled raw-yuan cell below 1e7 still slips
/// through unscaled. Unparsable text is `None`, which keeps the row.
fn market_value_yi(text: &str, raw_yuan: bool) -> Option<f64> {
    let cleaned = text.replace(',', "").replace('亿', "").trim().to_string();
    if cleaned.is_empty() {
        return None;
    }
    let v: f64 = cleaned.parse().ok()?;
    if raw_yuan || v.abs() >= 1.0e7 {
        Some(v / 1.0e8)
    } else {
        Some(v)
    }
}

fn build_events(ds: &Dataset, window: &DateWindow, min_mv_yi: f64) -> Vec<EventSpec> {
    let date_col = ds.resolve(DATE);
    let code_col = ds.resolve(CODE);
    let name_col = ds.resolve(NAME);
    let amount_col = ds.resolve(AMOUNT);
    let mv_col = ds.resolve(MARKET_VALUE);
    let mv_raw_yuan = mv_col
        .as_deref()
        .map(|c| RAW_YUAN_COLS.contains(&c))
        .unwrap_or(false);

    let mut events = Vec::new();
    for row in &ds.rows {
        let Some(day) = cell(row, date_col.as_deref())
            .and_then(to_datetime)
            .map(|dt| dt.date())
        else {
            continue;
        };
        if !window.contains(day) {
            continue;
        }

        let mv = cell_text(row, mv_col.as_deref());
        if let Some(mv_yi) = market_value_yi(&mv, mv_raw_yuan) {
            if mv_yi < min_mv_yi {
                continue;
            }
        }

        let code = cell_text(row, code_col.as_deref());
        let name = cell_text(row, name_col.as_deref());
        let amount = cell_text(row, amount_col.as_deref());
        let title = security_title(&name, &code, "解禁");
        let desc = join_desc(&[
            if amount.is_empty() { String::new() } else { format!("解禁数量: {}", amount) },
            if mv.is_empty() { String::new() } else { format!("解禁市值: {}", mv) },
        ]);

        events.push(EventSpec {
            summary: format!("限售解禁｜{}", title),
            description: desc,
            uid: format!("unlock-{}-{}", code, day),
            when: EventTime::AllDay(day),
        });
    }
    events
}

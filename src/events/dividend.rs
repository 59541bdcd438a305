// src/events/dividend.rs
//
// 04_dividend.ics — dividend / ex-dividend dates.

use anyhow::Result;
use reqwest::Client;
use tracing::info;

use super::security_title;
use crate::config::{Config, DateWindow};
use crate::fetch::{fetch_first, Provider};
use crate::ics::{register, CalendarSink, EventSpec, EventTime};
use crate::table::{cell, cell_text, to_datetime, Dataset};

/// Two generations of the dividend interface.
const PROVIDERS: &[Provider] = &[
    Provider {
        name: "stock_fhps_em",
        url: "https://datacenter-web.eastmoney.com/api/data/v1/get?reportName=RPT_SHAREBONUS_DET&columns=ALL&sortColumns=EX_DIVIDEND_DATE&sortTypes=1&pageSize=500&pageNumber=1&source=WEB",
    },
    Provider {
        name: "stock_fhps_detail_em",
        url: "https://datacenter-web.eastmoney.com/api/data/v1/get?reportName=RPT_SHAREBONUS_DETAIL&columns=ALL&sortColumns=EX_DIVIDEND_DATE&sortTypes=1&pageSize=500&pageNumber=1&source=WEB",
    },
];

const DATE: &[&str] = &[
    "除权除息日",
    "除息日",
    "权益登记日",
    "日期",
    "EX_DIVIDEND_DATE",
    "EQUITY_RECORD_DATE",
];
const CODE: &[&str] = &["代码", "股票代码", "SECURITY_CODE"];
const NAME: &[&str] = &["名称", "股票简称", "SECURITY_NAME_ABBR"];
const PLAN: &[&str] = &["分红方案", "方案", "送转派", "派息方案", "IMPL_PLAN_PROFILE"];

pub async fn generate(client: &Client, cfg: &Config, all: &mut CalendarSink) -> Result<()> {
    let ds = fetch_first(client, "分红", PROVIDERS).await?;
    let events = build_events(&ds, &cfg.window());
    info!(count = events.len(), "dividend events in window");

    let mut cal = CalendarSink::new("A股｜分红/除权除息", cfg.max_events_per_day);
    for ev in &events {
        register(ev, &mut cal, all);
    }
    cal.write(&cfg.out_dir, "04_dividend.ics")?;
    Ok(())
}

fn build_events(ds: &Dataset, window: &DateWindow) -> Vec<EventSpec> {
    let date_col = ds.resolve(DATE);
    let code_col = ds.resolve(CODE);
    let name_col = ds.resolve(NAME);
    let plan_col = ds.resolve(PLAN);

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

        let code = cell_text(row, code_col.as_deref());
        let name = cell_text(row, name_col.as_deref());
        let plan = cell_text(row, plan_col.as_deref());
        let title = security_title(&name, &code, "分红");

        events.push(EventSpec {
            summary: format!("分红/除权除息｜{}", title),
            description: plan,
            uid: format!("div-{}-{}", code, day),
            when: EventTime::AllDay(day),
        });
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn ex_dividend_date_is_preferred_and_plan_becomes_description() {
        let rows = [json!({
            "代码": "600036",
            "名称": "招商银行",
            "权益登记日": "2026-09-14",
            "除权除息日": "2026-09-15",
            "分红方案": "10派12.5元",
        })];
        let ds =
            Dataset::from_rows(rows.iter().map(|v| v.as_object().unwrap().clone()).collect());
        let window = DateWindow {
            start: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 11, 30).unwrap(),
        };
        let events = build_events(&ds, &window);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].uid, "div-600036-2026-09-15");
        assert_eq!(events[0].description, "10派12.5元");
    }
}

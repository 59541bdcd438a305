// src/events/earnings.rs
//
// 03_earnings.ics — earnings disclosure dates, actual when published,
// otherwise the first appointment.

use anyhow::Result;
use reqwest::Client;
use tracing::info;

use super::security_title;
use crate::config::{Config, DateWindow};
use crate::fetch::{fetch_first, Provider};
use crate::ics::{register, CalendarSink, EventSpec, EventTime};
use crate::table::{cell, cell_text, to_datetime, Dataset};

const PROVIDERS: &[Provider] = &[Provider {
    name: "stock_yysj_em",
    url: "https://datacenter-web.eastmoney.com/api/data/v1/get?reportName=RPT_PUBLIC_BS_APPOIN&columns=ALL&sortColumns=FIRST_APPOINT_DATE&sortTypes=1&pageSize=500&pageNumber=1&source=WEB",
}];

const CODE: &[&str] = &["股票代码", "代码", "SECURITY_CODE"];
const NAME: &[&str] = &["股票简称", "名称", "SECURITY_NAME_ABBR"];
const FIRST: &[&str] = &["首次预约", "首次预约披露", "首次预约时间", "FIRST_APPOINT_DATE"];
const ACTUAL: &[&str] = &["实际披露", "实际披露时间", "ACTUAL_PUBLISH_DATE"];
const REPORT: &[&str] = &["报告期", "报告期别", "报告期类型", "REPORT_DATE"];

pub async fn generate(client: &Client, cfg: &Config, all: &mut CalendarSink) -> Result<()> {
    let ds = fetch_first(client, "财报披露", PROVIDERS).await?;
    let events = build_events(&ds, &cfg.window());
    info!(count = events.len(), "earnings events in window");

    let mut cal = CalendarSink::new("A股｜财报披露（预约）", cfg.max_events_per_day);
    for ev in &events {
        register(ev, &mut cal, all);
    }
    cal.write(&cfg.out_dir, "03_earnings.ics")?;
    Ok(())
}

fn build_events(ds: &Dataset, window: &DateWindow) -> Vec<EventSpec> {
    let code_col = ds.resolve(CODE);
    let name_col = ds.resolve(NAME);
    let first_col = ds.resolve(FIRST);
    let actual_col = ds.resolve(ACTUAL);
    let report_col = ds.resolve(REPORT);

    let mut events = Vec::new();
    for row in &ds.rows {
        let day = cell(row, actual_col.as_deref())
            .and_then(to_datetime)
            .or_else(|| cell(row, first_col.as_deref()).and_then(to_datetime))
            .map(|dt| dt.date());
        let Some(day) = day else { continue };
        if !window.contains(day) {
            continue;
        }

        let code = cell_text(row, code_col.as_deref());
        let name = cell_text(row, name_col.as_deref());
        let report = cell_text(row, report_col.as_deref());
        let title = security_title(&name, &code, "财报");
        let summary = if report.is_empty() {
            format!("财报披露｜{}", title)
        } else {
            format!("财报披露｜{}｜{}", title, report)
        };

        events.push(EventSpec {
            summary,
            description: String::new(),
            uid: format!("earn-{}-{}", code, day),
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

    fn window() -> DateWindow {
        DateWindow {
            start: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 11, 30).unwrap(),
        }
    }

    #[test]
    fn actual_disclosure_wins_over_appointment() {
        let rows = [
            json!({
                "股票代码": "600010",
                "股票简称": "先披露",
                "首次预约": "2026-10-20",
                "实际披露": "2026-10-15",
                "报告期": "2026三季报",
            }),
            json!({
                "股票代码": "600011",
                "股票简称": "仅预约",
                "首次预约": "2026-10-28",
                "实际披露": null,
            }),
            json!({
                "股票代码": "600012",
                "股票简称": "无日期",
            }),
        ];
        let ds =
            Dataset::from_rows(rows.iter().map(|v| v.as_object().unwrap().clone()).collect());
        let events = build_events(&ds, &window());
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].uid, "earn-600010-2026-10-15");
        assert_eq!(events[0].summary, "财报披露｜先披露(600010)｜2026三季报");
        assert_eq!(events[1].uid, "earn-600011-2026-10-28");
        assert_eq!(events[1].summary, "财报披露｜仅预约(600011)");
    }
}

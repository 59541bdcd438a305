// src/events/ipo.rs
//
// 01_ipo.ics — IPO subscription, payment and listing dates.

use anyhow::Result;
use reqwest::Client;
use tracing::info;

use super::security_title;
use crate::config::{Config, DateWindow};
use crate::fetch::{fetch_first, Provider};
use crate::ics::{register, CalendarSink, EventSpec, EventTime};
use crate::table::{cell, cell_text, to_datetime, Dataset};

const PROVIDERS: &[Provider] = &[Provider {
    name: "stock_xgsglb_em",
    url: "https://datacenter-web.eastmoney.com/api/data/v1/get?reportName=RPTA_APP_IPOAPPLY&columns=ALL&sortColumns=APPLY_DATE&sortTypes=-1&pageSize=500&pageNumber=1&source=WEB",
}];

const CODE: &[&str] = &["股票代码", "申购代码", "SECURITY_CODE", "APPLY_CODE"];
const NAME: &[&str] = &["股票简称", "SECURITY_NAME", "SECURITY_NAME_ABBR"];
const APPLY: &[&str] = &["申购日期", "APPLY_DATE"];
const PAY: &[&str] = &["中签缴款日期", "网上申购缴款日", "PAY_DATE"];
const LIST: &[&str] = &["上市日期", "上市日", "LISTING_DATE"];

pub async fn generate(client: &Client, cfg: &Config, all: &mut CalendarSink) -> Result<()> {
    let ds = fetch_first(client, "新股", PROVIDERS).await?;
    let events = build_events(&ds, &cfg.window());
    info!(count = events.len(), "ipo events in window");

    let mut cal = CalendarSink::new("A股｜新股申购/缴款/上市", cfg.max_events_per_day);
    for ev in &events {
        register(ev, &mut cal, all);
    }
    cal.write(&cfg.out_dir, "01_ipo.ics")?;
    Ok(())
}

fn build_events(ds: &Dataset, window: &DateWindow) -> Vec<EventSpec> {
    let code_col = ds.resolve(CODE);
    let name_col = ds.resolve(NAME);
    let apply_col = ds.resolve(APPLY);
    let pay_col = ds.resolve(PAY);
    let list_col = ds.resolve(LIST);

    // One row can produce up to three events: subscription, payment, listing.
    let kinds: &[(&Option<String>, &str, &str)] = &[
        (&apply_col, "新股申购", "ipo-apply"),
        (&pay_col, "中签缴款", "ipo-pay"),
        (&list_col, "新股上市", "ipo-list"),
    ];

    let mut events = Vec::new();
    for row in &ds.rows {
        let code = cell_text(row, code_col.as_deref());
        let name = cell_text(row, name_col.as_deref());
        let title = security_title(&name, &code, "新股");

        for &(col, label, uid_kind) in kinds {
            let Some(day) = cell(row, col.as_deref())
                .and_then(to_datetime)
                .map(|dt| dt.date())
            else {
                continue;
            };
            if !window.contains(day) {
                continue;
            }
            events.push(EventSpec {
                summary: format!("{}｜{}", label, title),
                description: String::new(),
                uid: format!("{}-{}-{}", uid_kind, code, day),
                when: EventTime::AllDay(day),
            });
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn dataset() -> Dataset {
        let rows = [
            json!({
                "股票代码": "301999",
                "股票简称": "样例科技",
                "申购日期": "2026-09-02",
                "中签缴款日期": "2026-09-04",
                "上市日期": null,
            }),
            json!({
                "股票代码": "302000",
                "股票简称": "窗外股份",
                "申购日期": "2027-03-01",
            }),
        ];
        Dataset::from_rows(rows.iter().map(|v| v.as_object().unwrap().clone()).collect())
    }

    fn window() -> DateWindow {
        DateWindow {
            start: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 11, 30).unwrap(),
        }
    }

    #[test]
    fn emits_one_event_per_resolved_date_in_window() {
        let events = build_events(&dataset(), &window());
        let uids: Vec<_> = events.iter().map(|e| e.uid.as_str()).collect();
        assert_eq!(
            uids,
            vec!["ipo-apply-301999-2026-09-02", "ipo-pay-301999-2026-09-04"]
        );
        assert_eq!(events[0].summary, "新股申购｜样例科技(301999)");
    }

    #[test]
    fn identifiers_are_idempotent() {
        let a: Vec<_> = build_events(&dataset(), &window());
        let b: Vec<_> = build_events(&dataset(), &window());
        assert_eq!(a, b);
    }
}

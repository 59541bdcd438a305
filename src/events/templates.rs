// src/events/templates.rs
//
// Rule/experience layer, no upstream fetch:
//   07_report_templates.ics — statutory disclosure deadlines and the usual
//     reporting-season windows for this year and next;
//   08_macro_templates.ics — recurring monthly CN macro release windows.

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use tracing::info;

use super::index_rebalance::next_month;
use crate::config::Config;
use crate::ics::{register, CalendarSink, EventSpec, EventTime};

pub fn generate_report_deadlines(cfg: &Config, all: &mut CalendarSink) -> Result<()> {
    let window = cfg.window();
    let events = report_events(window.start, window.end);
    info!(count = events.len(), "report template events in window");

    let mut cal = CalendarSink::new("模板｜财报季与窗口（规则）", cfg.max_events_per_day);
    for ev in &events {
        register(ev, &mut cal, all);
    }
    cal.write(&cfg.out_dir, "07_report_templates.ics")?;
    Ok(())
}

pub fn generate_macro_windows(cfg: &Config, all: &mut CalendarSink) -> Result<()> {
    let window = cfg.window();
    let events = macro_window_events(window.start, window.end);
    info!(count = events.len(), "macro template events in window");

    let mut cal = CalendarSink::new("模板｜中国宏观数据窗口（经验）", cfg.max_events_per_day);
    for ev in &events {
        register(ev, &mut cal, all);
    }
    cal.write(&cfg.out_dir, "08_macro_templates.ics")?;
    Ok(())
}

fn all_day(summary: &str, desc: &str, uid: String, day: NaiveDate) -> EventSpec {
    EventSpec {
        summary: summary.to_string(),
        description: desc.to_string(),
        uid,
        when: EventTime::AllDay(day),
    }
}

fn report_events(start: NaiveDate, end: NaiveDate) -> Vec<EventSpec> {
    let mut events = Vec::new();
    for year in [start.year(), start.year() + 1] {
        let deadlines = [
            (4, 30, "A股｜一季报披露截止日（通常4/30）"),
            (4, 30, "A股｜年报披露截止日（通常4/30）"),
            (8, 31, "A股｜中报披露截止日（通常8/31）"),
            (10, 31, "A股｜三季报披露截止日（通常10/31）"),
        ];
        for (month, day, summary) in deadlines {
            let d = NaiveDate::from_ymd_opt(year, month, day).expect("fixed deadlines are valid");
            if start <= d && d <= end {
                events.push(all_day(
                    summary,
                    "",
                    format!("tpl-report-deadline-{}-{}", summary, d),
                    d,
                ));
            }
        }

        // Experience windows, marked on their opening day only.
        let windows = [
            (1, 10, 1, 31, "A股｜年报预告/快报密集窗口（经验）"),
            (4, 1, 4, 30, "A股｜财报披露高峰（月度窗口）"),
            (7, 1, 7, 31, "A股｜中报预告密集窗口（经验）"),
            (8, 1, 8, 31, "A股｜中报披露高峰（月度窗口）"),
            (10, 1, 10, 31, "A股｜三季报披露高峰（月度窗口）"),
        ];
        for (m1, d1, m2, d2, summary) in windows {
            let open = NaiveDate::from_ymd_opt(year, m1, d1).expect("fixed windows are valid");
            let close = NaiveDate::from_ymd_opt(year, m2, d2).expect("fixed windows are valid");
            if start <= open && open <= end {
                events.push(all_day(
                    summary,
                    &format!("窗口范围：{} ~ {}", open, close),
                    format!("tpl-window-{}-{}", summary, open),
                    open,
                ));
            }
        }
    }
    events
}

fn macro_window_events(start: NaiveDate, end: NaiveDate) -> Vec<EventSpec> {
    // (day-of-month, summary, uid tag); None = last day of the month
    let monthly: [(Option<u32>, &str, &str); 5] = [
        (Some(7), "宏观｜外汇储备公布窗口（经验：上旬）", "fx"),
        (Some(10), "宏观｜CPI/PPI公布窗口（经验：上旬）", "cpi"),
        (Some(15), "宏观｜社融/信贷/M2公布窗口（经验：中旬）", "ts"),
        (Some(20), "宏观｜LPR报价日（每月20日）", "lpr"),
        (None, "宏观｜PMI公布窗口（月末/次月初附近）", "pmi"),
    ];

    let mut events = Vec::new();
    let mut cursor =
        NaiveDate::from_ymd_opt(start.year(), start.month(), 1).expect("first of month is valid");
    while cursor <= end {
        for (day, summary, tag) in monthly {
            let d = match day {
                Some(day) => NaiveDate::from_ymd_opt(cursor.year(), cursor.month(), day)
                    .expect("days 7/10/15/20 exist in every month"),
                None => next_month(cursor) - Duration::days(1),
            };
            if start <= d && d <= end {
                events.push(all_day(summary, "", format!("tpl-macro-{}-{}", tag, d), d));
            }
        }
        cursor = next_month(cursor);
    }
    events
}

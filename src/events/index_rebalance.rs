// src/events/index_rebalance.rs
//
// 05_index_rebalance_rules.ics — rule-derived index rebalance windows: the
// second Friday of March, June, September and December. No upstream fetch;
// the effective date is usually the next trading day and is announced
// separately.

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use tracing::info;

use crate::config::Config;
use crate::ics::{register, CalendarSink, EventSpec, EventTime};

const REBALANCE_MONTHS: [u32; 4] = [3, 6, 9, 12];

pub fn generate(cfg: &Config, all: &mut CalendarSink) -> Result<()> {
    let window = cfg.window();
    let events = build_events(window.start, window.end);
    info!(count = events.len(), "index rebalance rule dates in window");

    let mut cal = CalendarSink::new("A股｜指数调样（规则日）", cfg.max_events_per_day);
    for ev in &events {
        register(ev, &mut cal, all);
    }
    cal.write(&cfg.out_dir, "05_index_rebalance_rules.ics")?;
    Ok(())
}

fn build_events(start: NaiveDate, end: NaiveDate) -> Vec<EventSpec> {
    let mut events = Vec::new();
    let mut cursor = start.with_day(1).expect("first of month is always valid");
    while cursor <= end {
        if REBALANCE_MONTHS.contains(&cursor.month()) {
            let day = second_friday(cursor.year(), cursor.month());
            if start <= day && day <= end {
                events.push(EventSpec {
                    summary: "指数样本定期调整窗口（按规则推算；最终以公告为准）".to_string(),
                    description: String::new(),
                    uid: format!("idx-reb-{}", day),
                    when: EventTime::AllDay(day),
                });
            }
        }
        cursor = next_month(cursor);
    }
    events
}

fn second_friday(year: i32, month: u32) -> NaiveDate {
    let mut d = NaiveDate::from_ymd_opt(year, month, 1).expect("first of month is always valid");
    while d.weekday() != Weekday::Fri {
        d += Duration::days(1);
    }
    d + Duration::days(7)
}

pub(crate) fn next_month(first_of_month: NaiveDate) -> NaiveDate {
    let (y, m) = if first_of_month.month() == 12 {
        (first_of_month.year() + 1, 1)
    } else {
        (first_of_month.year(), first_of_month.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1).expect("first of month is always valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_friday_is_computed_correctly() {
        // June 2026: 1st is a Monday, Fridays fall on 5, 12, 19, 26
        assert_eq!(
            second_friday(2026, 6),
            NaiveDate::from_ymd_opt(2026, 6, 12).unwrap()
        );
        // March 2026: 1st is a Sunday, Fridays fall on 6, 13, ...
        assert_eq!(
            second_friday(2026, 3),
            NaiveDate::from_ymd_opt(2026, 3, 13).unwrap()
        );
    }

    #[test]
    fn only_quarter_end_months_inside_the_window_emit() {
        let start = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        let events = build_events(start, end);
        let uids: Vec<_> = events.iter().map(|e| e.uid.as_str()).collect();
        assert_eq!(uids, vec!["idx-reb-2026-06-12", "idx-reb-2026-09-11"]);
    }

    #[test]
    fn year_rollover_is_handled() {
        let start = NaiveDate::from_ymd_opt(2026, 11, 20).unwrap();
        let end = NaiveDate::from_ymd_opt(2027, 3, 31).unwrap();
        let events = build_events(start, end);
        let uids: Vec<_> = events.iter().map(|e| e.uid.as_str()).collect();
        assert_eq!(uids, vec!["idx-reb-2026-12-11", "idx-reb-2027-03-12"]);
    }
}

// src/events/nbs.rs
//
// 09_nbs_release.ics — the National Bureau of Statistics annual release
// schedule. The page is scraped and grid-parsed; the whole year is emitted,
// not just the forward window, since the schedule is published once per year.
// This category is optional: the caller logs and skips it on failure.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use tracing::{info, warn};

use crate::config::{today_cn, Config};
use crate::fetch::get_text;
use crate::grid::{parse_schedule, Schedule};
use crate::ics::{register, short_hash, CalendarSink, EventSpec, EventTime};

const SCHEDULE_URL: &str = "https://www.stats.gov.cn/sj/fbrc/bnxxfb/";

pub async fn generate(client: &Client, cfg: &Config, all: &mut CalendarSink) -> Result<()> {
    let html = get_text(client, SCHEDULE_URL)
        .await
        .context("fetching NBS release schedule page")?;
    let schedule = parse_schedule(&html, today_cn().year())
        .context("parsing NBS release schedule")?;
    info!(
        year = schedule.year,
        count = schedule.releases.len(),
        "nbs releases parsed"
    );

    let events = build_events(&schedule);
    let mut cal = CalendarSink::new("国家统计局｜重要数据发布日程", cfg.max_events_per_day);
    for ev in &events {
        register(ev, &mut cal, all);
    }
    cal.write(&cfg.out_dir, "09_nbs_release.ics")?;
    Ok(())
}

fn build_events(schedule: &Schedule) -> Vec<EventSpec> {
    let desc = format!("来源：{}\n注：发布日期为初步计划，可能调整。", SCHEDULE_URL);

    let mut events = Vec::new();
    for release in &schedule.releases {
        let Some(day) = NaiveDate::from_ymd_opt(schedule.year, release.month, release.day) else {
            // a mis-parsed cell must not fabricate a date
            warn!(
                label = %release.label,
                month = release.month,
                day = release.day,
                "invalid calendar day in schedule, skipping"
            );
            continue;
        };
        let when = match release.time {
            Some((hour, minute)) => match day.and_hms_opt(hour, minute, 0) {
                Some(dt) => EventTime::Timed(dt),
                None => EventTime::AllDay(day),
            },
            None => EventTime::AllDay(day),
        };
        events.push(EventSpec {
            summary: format!("国家统计局｜{}", release.label),
            description: desc.clone(),
            uid: format!(
                "nbs-{}-{:02}-{:02}-{}@stats.gov.cn",
                schedule.year,
                release.month,
                release.day,
                short_hash(&release.label)
            ),
            when,
        });
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridRelease;

    fn release(label: &str, month: u32, day: u32, time: Option<(u32, u32)>) -> GridRelease {
        GridRelease {
            label: label.to_string(),
            month,
            day,
            time,
        }
    }

    #[test]
    fn timed_and_all_day_releases_map_to_events() {
        let schedule = Schedule {
            year: 2026,
            releases: vec![
                release("工业生产者价格指数", 1, 10, Some((9, 30))),
                release("国民经济运行情况", 1, 17, None),
            ],
        };
        let events = build_events(&schedule);
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0].when,
            EventTime::Timed(
                NaiveDate::from_ymd_opt(2026, 1, 10)
                    .unwrap()
                    .and_hms_opt(9, 30, 0)
                    .unwrap()
            )
        );
        assert!(events[0].uid.starts_with("nbs-2026-01-10-"));
        assert!(events[0].uid.ends_with("@stats.gov.cn"));
        assert_eq!(
            events[1].when,
            EventTime::AllDay(NaiveDate::from_ymd_opt(2026, 1, 17).unwrap())
        );
    }

    #[test]
    fn impossible_dates_are_skipped_not_fabricated() {
        let schedule = Schedule {
            year: 2026,
            releases: vec![release("含注释的错行", 2, 30, None)],
        };
        assert!(build_events(&schedule).is_empty());
    }

    #[test]
    fn identical_schedules_produce_identical_uids() {
        let schedule = Schedule {
            year: 2026,
            releases: vec![release("社会消费品零售总额", 3, 15, Some((10, 0)))],
        };
        let a: Vec<String> = build_events(&schedule).into_iter().map(|e| e.uid).collect();
        let b: Vec<String> = build_events(&schedule).into_iter().map(|e| e.uid).collect();
        assert_eq!(a, b);
    }
}

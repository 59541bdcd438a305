// src/ics.rs

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use icalendar::{Calendar, CalendarDateTime, Component, Event, EventLike, Property};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const TZID: &str = "Asia/Shanghai";

/// Start of a calendar entry. All-day unless the source named a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    AllDay(NaiveDate),
    /// Local Asia/Shanghai wall time; rendered with a one-hour nominal
    /// duration so subscribed calendars show a block, not a point.
    Timed(NaiveDateTime),
}

impl EventTime {
    pub fn day(&self) -> NaiveDate {
        match self {
            EventTime::AllDay(d) => *d,
            EventTime::Timed(dt) => dt.date(),
        }
    }
}

/// A calendar entry before serialization. `uid` is a pure function of the
/// category and source fields, so unchanged upstream data reproduces the
/// identical calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSpec {
    pub summary: String,
    pub description: String,
    pub uid: String,
    pub when: EventTime,
}

/// Deterministic stand-in for Python's per-process `hash()` in uids that
/// need to compress free text.
pub fn short_hash(text: &str) -> String {
    hex::encode(&Sha256::digest(text.as_bytes())[..6])
}

/// One output calendar plus its per-day event budget.
pub struct CalendarSink {
    cal: Calendar,
    per_day: BTreeMap<NaiveDate, usize>,
    max_per_day: usize,
    name: String,
    prodid: String,
}

impl CalendarSink {
    pub fn new(name: &str, max_per_day: usize) -> Self {
        let mut cal = Calendar::new();
        // VERSION, PRODID and CALSCALE are written by the icalendar crate
        // itself; appending them here would duplicate the lines, which RFC
        // 5545 forbids. The PRODID value is swapped in during serialization.
        cal.append_property(Property::new("X-WR-CALNAME", name));
        cal.append_property(Property::new("X-WR-TIMEZONE", TZID));
        CalendarSink {
            cal,
            per_day: BTreeMap::new(),
            max_per_day,
            name: name.to_string(),
            prodid: format!("-//{}//CN Market Calendar//", name),
        }
    }

    /// Append an event, rebuilding the component for this calendar. Returns
    /// false when the day's budget is exhausted and the event was dropped.
    pub fn add(&mut self, spec: &EventSpec) -> bool {
        let day = spec.when.day();
        let count = self.per_day.entry(day).or_insert(0);
        if *count >= self.max_per_day {
            warn!(
                calendar = %self.name,
                %day,
                uid = %spec.uid,
                "per-day event cap reached, dropping"
            );
            return false;
        }
        *count += 1;

        let mut ev = Event::new();
        ev.summary(&spec.summary);
        ev.uid(&spec.uid);
        if !spec.description.is_empty() {
            ev.description(&spec.description);
        }
        match spec.when {
            EventTime::AllDay(day) => {
                ev.starts(day);
                ev.ends(day + Duration::days(1));
            }
            EventTime::Timed(dt) => {
                ev.starts(CalendarDateTime::WithTimezone {
                    date_time: dt,
                    tzid: TZID.to_string(),
                });
                ev.ends(CalendarDateTime::WithTimezone {
                    date_time: dt + Duration::hours(1),
                    tzid: TZID.to_string(),
                });
            }
        }
        ev.timestamp(Utc::now());
        self.cal.push(ev.done());
        true
    }

    /// Serialize to `<out_dir>/<filename>` and print the confirmation line.
    pub fn write(&self, out_dir: &Path, filename: &str) -> Result<PathBuf> {
        let path = out_dir.join(filename);
        fs::write(&path, self.to_ics())
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote: {}", path.display());
        Ok(path)
    }

    /// The serialized calendar, with the crate's hardcoded `PRODID` replaced
    /// by this calendar's product identifier.
    fn to_ics(&self) -> String {
        self.cal
            .to_string()
            .replacen("PRODID:ICALENDAR-RS", &format!("PRODID:{}", self.prodid), 1)
    }
}

/// Register one event into its category calendar and the combined calendar.
/// Each sink gets its own freshly built component.
pub fn register(spec: &EventSpec, category: &mut CalendarSink, all: &mut CalendarSink) {
    category.add(spec);
    all.add(spec);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_day(summary: &str, uid: &str, day: NaiveDate) -> EventSpec {
        EventSpec {
            summary: summary.to_string(),
            description: String::new(),
            uid: uid.to_string(),
            when: EventTime::AllDay(day),
        }
    }

    #[test]
    fn all_day_events_serialize_as_date_values() {
        let mut sink = CalendarSink::new("A股｜限售解禁", 30);
        let day = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        sink.add(&all_day("限售解禁｜招商银行(600036)", "unlock-600036-2026-09-01", day));

        let ics = sink.to_ics();
        assert!(ics.contains("DTSTART;VALUE=DATE:20260901"), "{ics}");
        assert!(ics.contains("DTEND;VALUE=DATE:20260902"), "{ics}");
        assert!(ics.contains("UID:unlock-600036-2026-09-01"), "{ics}");
        assert!(ics.contains("X-WR-CALNAME:A股｜限售解禁"), "{ics}");
        assert!(ics.contains("X-WR-TIMEZONE:Asia/Shanghai"), "{ics}");
        assert!(ics.contains("CALSCALE:GREGORIAN"), "{ics}");
    }

    #[test]
    fn calendar_header_properties_appear_exactly_once() {
        let mut sink = CalendarSink::new("测试", 30);
        sink.add(&all_day("x", "uid-x", NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()));
        let ics = sink.to_ics();

        let count = |prefix: &str| ics.lines().filter(|l| l.starts_with(prefix)).count();
        assert_eq!(count("PRODID:"), 1, "{ics}");
        assert_eq!(count("VERSION:"), 1, "{ics}");
        assert_eq!(count("CALSCALE:"), 1, "{ics}");
        assert!(ics.contains("PRODID:-//测试//CN Market Calendar//"), "{ics}");
        assert!(!ics.contains("ICALENDAR-RS"), "{ics}");
    }

    #[test]
    fn timed_events_carry_tzid_and_one_hour_duration() {
        let mut sink = CalendarSink::new("国家统计局｜重要数据发布日程", 30);
        let dt = NaiveDate::from_ymd_opt(2026, 1, 17)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        sink.add(&EventSpec {
            summary: "国家统计局｜国民经济运行情况".to_string(),
            description: String::new(),
            uid: "nbs-2026-01-17-abc@stats.gov.cn".to_string(),
            when: EventTime::Timed(dt),
        });

        let ics = sink.to_ics();
        assert!(ics.contains("DTSTART;TZID=Asia/Shanghai:20260117T100000"), "{ics}");
        assert!(ics.contains("DTEND;TZID=Asia/Shanghai:20260117T110000"), "{ics}");
    }

    #[test]
    fn per_day_cap_is_enforced_per_sink() {
        let mut sink = CalendarSink::new("测试", 2);
        let day = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        assert!(sink.add(&all_day("a", "uid-a", day)));
        assert!(sink.add(&all_day("b", "uid-b", day)));
        assert!(!sink.add(&all_day("c", "uid-c", day)));
        // a different day is unaffected
        assert!(sink.add(&all_day("d", "uid-d", day.succ_opt().unwrap())));

        let ics = sink.to_ics();
        assert!(!ics.contains("UID:uid-c"));
    }

    #[test]
    fn short_hash_is_stable_and_ascii() {
        let h1 = short_hash("规模以上工业增加值");
        let h2 = short_hash("规模以上工业增加值");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 12);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(h1, short_hash("社会消费品零售总额"));
    }

    #[test]
    fn write_emits_file_to_out_dir() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut sink = CalendarSink::new("测试", 30);
        sink.add(&all_day("x", "uid-x", NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()));
        let path = sink.write(dir.path(), "00_all.ics")?;
        let body = std::fs::read_to_string(path)?;
        assert!(body.starts_with("BEGIN:VCALENDAR"));
        assert!(body.trim_end().ends_with("END:VCALENDAR"));
        Ok(())
    }
}

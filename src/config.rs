// src/config.rs

use chrono::{FixedOffset, NaiveDate, Utc};
use std::env;
use std::path::PathBuf;

/// Runtime configuration, read from the environment once at startup and
/// passed by reference into every category generator.
#[derive(Debug, Clone)]
pub struct Config {
    /// How many days ahead of today events are kept.
    pub days_forward: i64,
    /// Minimum unlock market value, in 亿元, below which unlock rows are dropped.
    pub unlock_mv_min_yi: f64,
    /// Maximum events kept per calendar per start date.
    pub max_events_per_day: usize,
    /// Directory the .ics files are written to.
    pub out_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            days_forward: 90,
            unlock_mv_min_yi: 5.0,
            max_events_per_day: 30,
            out_dir: PathBuf::from("public"),
        }
    }
}

impl Config {
    /// Build from `DAYS_FORWARD`, `UNLOCK_MV_MIN_YI`, `MAX_EVENTS_PER_DAY`
    /// and `OUT_DIR`. Missing or unparsable values fall back to the default.
    pub fn from_env() -> Self {
        let d = Config::default();
        Config {
            days_forward: env_parsed("DAYS_FORWARD").unwrap_or(d.days_forward),
            unlock_mv_min_yi: env_parsed("UNLOCK_MV_MIN_YI").unwrap_or(d.unlock_mv_min_yi),
            max_events_per_day: env_parsed("MAX_EVENTS_PER_DAY").unwrap_or(d.max_events_per_day),
            out_dir: env::var("OUT_DIR").map(PathBuf::from).unwrap_or(d.out_dir),
        }
    }

    /// The `[today, today + days_forward]` window, today taken in Asia/Shanghai.
    pub fn window(&self) -> DateWindow {
        let start = today_cn();
        DateWindow {
            start,
            end: start + chrono::Duration::days(self.days_forward),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Asia/Shanghai has no DST, a fixed +08:00 offset is exact.
pub fn cn_offset() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).expect("UTC+8 offset should be valid")
}

/// Today's date in Asia/Shanghai.
pub fn today_cn() -> NaiveDate {
    Utc::now().with_timezone(&cn_offset()).date_naive()
}

/// Inclusive date range used to filter fetched events.
#[derive(Debug, Clone, Copy)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Inclusive on both ends.
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

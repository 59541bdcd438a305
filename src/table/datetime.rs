// src/table/datetime.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Sentinel strings providers use for "no date".
const ABSENT: &[&str] = &["", "-", "—", "--", "nan", "NaN", "NaT", "None", "null"];

/// Date-only and date-time layouts seen across provider versions.
const FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// Normalize an arbitrary cell to a timestamp, or absence.
///
/// Never errors: nulls, NaN-like numbers, sentinel strings and unparsable
/// text all map to `None`. A native epoch number and the equivalent ISO
/// string normalize to the same value.
pub fn to_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => parse_str(s),
        Value::Number(n) => parse_number(n.as_f64()?),
        _ => None,
    }
}

fn parse_str(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if ABSENT.contains(&s) {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn parse_number(n: f64) -> Option<NaiveDateTime> {
    if !n.is_finite() {
        return None;
    }
    let i = n as i64;
    // 8-digit YYYYMMDD serials
    if (19000101..=21001231).contains(&i) {
        let (y, m, d) = ((i / 10000) as i32, (i / 100 % 100) as u32, (i % 100) as u32);
        return NaiveDate::from_ymd_opt(y, m, d)?.and_hms_opt(0, 0, 0);
    }
    // epoch millis, then epoch seconds
    if i >= 1_000_000_000_000 {
        return DateTime::from_timestamp_millis(i).map(|dt| dt.naive_utc());
    }
    if i >= 1_000_000_000 {
        return DateTime::from_timestamp(i, 0).map(|dt| dt.naive_utc());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absences_all_normalize_to_none() {
        for v in [
            json!(null),
            json!(""),
            json!("-"),
            json!("—"),
            json!("NaT"),
            json!("nan"),
            json!("随便写的文本"),
            json!(42),
            json!([1, 2]),
        ] {
            assert_eq!(to_datetime(&v), None, "value: {v}");
        }
        assert_eq!(to_datetime(&Value::from(f64::NAN)), None);
    }

    #[test]
    fn string_and_epoch_forms_agree() {
        let iso = to_datetime(&json!("2026-09-01 12:00:00")).unwrap();
        // 2026-09-01T12:00:00Z as epoch seconds and millis
        let secs = to_datetime(&json!(1_788_264_000_i64)).unwrap();
        let millis = to_datetime(&json!(1_788_264_000_000_i64)).unwrap();
        assert_eq!(secs, millis);
        assert_eq!(iso.date(), secs.date());
    }

    #[test]
    fn date_only_layouts_parse_to_midnight() {
        let expected = NaiveDate::from_ymd_opt(2026, 9, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        for s in ["2026-09-01", "2026/09/01", "20260901"] {
            assert_eq!(to_datetime(&json!(s)), Some(expected), "input: {s}");
        }
        assert_eq!(to_datetime(&json!(20260901)), Some(expected));
    }

    #[test]
    fn rfc3339_is_accepted() {
        let dt = to_datetime(&json!("2026-09-01T09:30:00+08:00")).unwrap();
        assert_eq!(dt.time(), chrono::NaiveTime::from_hms_opt(9, 30, 0).unwrap());
    }
}

// src/grid.rs
//
// Parser for the NBS "annual release schedule" page: one big table whose
// header names 12 month columns, with each indicator spanning a date row
// ("19/一", "4/三 注5", "……") optionally followed by a time row ("9:30").

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

const ROW_NO_MARKER: &str = "序号";
const LABEL_MARKER: &str = "内容";
const MONTH_FIRST: &str = "1月";
const MONTH_LAST: &str = "12月";

/// One scheduled release: indicator label, month and day within the page's
/// year, plus the announced release time when the table carries one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRelease {
    pub label: String,
    pub month: u32,
    pub day: u32,
    pub time: Option<(u32, u32)>,
}

#[derive(Debug)]
pub struct Schedule {
    pub year: i32,
    pub releases: Vec<GridRelease>,
}

static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})\s*年").expect("year pattern should be valid"));
// leading day number before a slash, e.g. "4/三 注5" → 4
static DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{1,2})\s*/").expect("day pattern should be valid"));
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}):(\d{2})").expect("time pattern should be valid"));

/// The schedule's year: the largest 4-digit number directly followed by 年
/// anywhere in the page text. Pages occasionally come back as a template
/// without a year, hence the caller-supplied fallback.
pub fn detect_year(page_text: &str, fallback: i32) -> i32 {
    YEAR_RE
        .captures_iter(page_text)
        .filter_map(|c| c[1].parse::<i32>().ok())
        .max()
        .unwrap_or(fallback)
}

/// Day cell → day-of-month. Placeholder cells (ellipsis, dash) are absent,
/// never zero; annotation text after the slash is ignored.
fn parse_day(cell: &str) -> Option<u32> {
    let cell = cell.trim();
    if cell.is_empty() || cell.contains('…') || cell == "-" || cell == "—" {
        return None;
    }
    DAY_RE.captures(cell)?[1].parse().ok()
}

/// Time cell → (hour, minute).
fn parse_time(cell: &str) -> Option<(u32, u32)> {
    let caps = TIME_RE.captures(cell)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// Parse the schedule page. Failure to find the table or its header row is an
/// error; the caller treats it as an isolated category failure, not a run
/// failure.
pub fn parse_schedule(html: &str, fallback_year: i32) -> Result<Schedule> {
    let doc = Html::parse_document(html);
    let year = detect_year(&page_text(&doc), fallback_year);

    let rows = schedule_rows(&doc)?;
    let header_idx = rows
        .iter()
        .take(10)
        .position(|r| is_header(&r.join(" ")))
        .ok_or_else(|| anyhow::anyhow!("release schedule header row not found (page layout changed?)"))?;
    let header = &rows[header_idx];

    let label_col = header
        .iter()
        .position(|c| c == LABEL_MARKER)
        .or_else(|| header.iter().position(|c| c.contains(LABEL_MARKER)))
        .unwrap_or(1);
    let month_start = header
        .iter()
        .position(|c| c == MONTH_FIRST)
        .or_else(|| header.iter().position(|c| c.contains(MONTH_FIRST)))
        .ok_or_else(|| anyhow::anyhow!("month columns not found in schedule header"))?;
    let month_cols: Vec<usize> = (month_start..month_start + 12).collect();
    let width = *month_cols.last().expect("twelve month columns").max(&label_col);

    let mut releases = Vec::new();
    let mut i = header_idx + 1;
    while i < rows.len() {
        let row = &rows[i];
        if row.len() <= width {
            i += 1;
            continue;
        }
        let label = row[label_col].trim();
        let days: Vec<(u32, u32)> = month_cols
            .iter()
            .enumerate()
            .filter_map(|(m, &col)| parse_day(&row[col]).map(|d| (m as u32 + 1, d)))
            .collect();

        if label.is_empty() || days.is_empty() {
            i += 1;
            continue;
        }

        // A following row with a blank label but HH:MM cells is this
        // indicator's time row; consume it.
        let mut times: Vec<(u32, (u32, u32))> = Vec::new();
        if let Some(next) = rows.get(i + 1) {
            if next.len() > width && next[label_col].trim().is_empty() {
                let parsed: Vec<_> = month_cols
                    .iter()
                    .enumerate()
                    .filter_map(|(m, &col)| parse_time(&next[col]).map(|t| (m as u32 + 1, t)))
                    .collect();
                if !parsed.is_empty() {
                    times = parsed;
                    i += 1;
                }
            }
        }

        // Known approximation: months the time row leaves blank fall back to
        // the row's first observed time, one default per indicator.
        let default_time = times.first().map(|&(_, t)| t);
        for (month, day) in days {
            let time = times
                .iter()
                .find(|&&(m, _)| m == month)
                .map(|&(_, t)| t)
                .or(default_time);
            releases.push(GridRelease {
                label: label.to_string(),
                month,
                day,
                time,
            });
        }
        i += 1;
    }

    Ok(Schedule { year, releases })
}

fn page_text(doc: &Html) -> String {
    doc.root_element().text().collect::<Vec<_>>().join("\n")
}

fn is_header(joined: &str) -> bool {
    joined.contains(ROW_NO_MARKER)
        && joined.contains(LABEL_MARKER)
        && joined.contains(MONTH_FIRST)
        && joined.contains(MONTH_LAST)
}

/// Cell texts of the one schedule table, or an error if no table on the page
/// carries the expected markers.
fn schedule_rows(doc: &Html) -> Result<Vec<Vec<String>>> {
    let table_sel = Selector::parse("table").expect("selector should parse");
    let tr_sel = Selector::parse("tr").expect("selector should parse");
    let cell_sel = Selector::parse("th, td").expect("selector should parse");

    for table in doc.select(&table_sel) {
        let text = element_text(&table);
        if !is_header(&text) {
            continue;
        }
        let rows: Vec<Vec<String>> = table
            .select(&tr_sel)
            .map(|tr| tr.select(&cell_sel).map(|c| element_text(&c)).collect())
            .filter(|cells: &Vec<String>| !cells.is_empty())
            .collect();
        return Ok(rows);
    }
    bail!("release schedule table not found (page layout changed?)")
}

fn element_text(el: &ElementRef) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

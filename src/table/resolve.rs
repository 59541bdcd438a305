// src/table/resolve.rs

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Characters providers sprinkle into header labels between versions:
/// whitespace, ASCII and full-width parentheses, underscores, hyphens.
static DECORATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\(\)（）_\-]").expect("decoration pattern should be valid"));

fn normalize(label: &str) -> String {
    DECORATION.replace_all(label, "").into_owned()
}

/// Resolve a column role against a dataset's column labels.
///
/// Candidates are tried most-preferred first, exact matches before normalized
/// ones, so `解禁市值` resolves a column literally named `解禁市值(亿元)`.
/// Returns a label from `columns` itself, or `None`; callers treat `None` as
/// "field absent for every row" rather than failing the dataset.
pub fn pick_col<'a>(columns: &'a [String], candidates: &[&str]) -> Option<&'a str> {
    for cand in candidates {
        if let Some(col) = columns.iter().find(|c| c.as_str() == *cand) {
            return Some(col);
        }
    }

    let normalized: HashMap<String, &str> = columns
        .iter()
        .map(|c| (normalize(c), c.as_str()))
        .collect();
    for cand in candidates {
        if let Some(col) = normalized.get(&normalize(cand)) {
            return Some(col);
        }
    }
    None
}

// src/events/mod.rs

pub mod dividend;
pub mod earnings;
pub mod index_rebalance;
pub mod ipo;
pub mod macro_econ;
pub mod nbs;
pub mod templates;
pub mod unlock;

/// `名称(代码)` when both are known, else whichever exists, else the
/// category fallback.
pub fn security_title(name: &str, code: &str, fallback: &str) -> String {
    match (name.is_empty(), code.is_empty()) {
        (false, false) => format!("{}({})", name, code),
        (false, true) => name.to_string(),
        (true, false) => code.to_string(),
        (true, true) => fallback.to_string(),
    }
}

/// Join non-empty description parts with the full-width separator the
/// original calendars use.
pub fn join_desc(parts: &[String]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join("；")
}

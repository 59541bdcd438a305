// src/table/mod.rs

pub mod datetime;
pub mod resolve;

pub use datetime::to_datetime;
pub use resolve::pick_col;

use serde_json::{Map, Value};

/// A fetched tabular payload: the union of column labels seen across rows
/// plus the raw JSON object rows. Cell heterogeneity stays here at the
/// boundary; category code works on resolved, normalized fields only.
#[derive(Debug, Default)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

impl Dataset {
    pub fn from_rows(rows: Vec<Map<String, Value>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        Dataset { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve a column role against this dataset's own labels.
    pub fn resolve(&self, candidates: &[&str]) -> Option<String> {
        pick_col(&self.columns, candidates).map(str::to_string)
    }
}

/// Trimmed text of a cell, empty when the column is unresolved or the cell is
/// null. Numbers render without a trailing `.0` for whole values so codes
/// like `600000` survive a float-typed column.
pub fn cell_text(row: &Map<String, Value>, col: Option<&str>) -> String {
    let Some(col) = col else {
        return String::new();
    };
    match row.get(col) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else {
                n.to_string()
            }
        }
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// The cell itself, for normalizers that care about the JSON type.
pub fn cell<'a>(row: &'a Map<String, Value>, col: Option<&str>) -> Option<&'a Value> {
    row.get(col?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn columns_are_the_union_across_rows() {
        let ds = Dataset::from_rows(vec![
            row(json!({"b": 1, "a": 2})),
            row(json!({"a": 3, "c": 4})),
        ]);
        assert_eq!(ds.columns, vec!["a", "b", "c"]); // serde_json maps sort keys
        assert_eq!(ds.rows.len(), 2);
    }

    #[test]
    fn cell_text_handles_missing_and_numeric() {
        let r = row(json!({"code": 600000, "mv": 5.5, "name": " 招商银行 ", "gone": null}));
        assert_eq!(cell_text(&r, Some("code")), "600000");
        assert_eq!(cell_text(&r, Some("mv")), "5.5");
        assert_eq!(cell_text(&r, Some("name")), "招商银行");
        assert_eq!(cell_text(&r, Some("gone")), "");
        assert_eq!(cell_text(&r, Some("absent")), "");
        assert_eq!(cell_text(&r, None), "");
    }
}

//! Typed cell values and their clipboard string forms.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A typed cell value.
///
/// `Date` carries a calendar date (no time component); `List` covers the
/// multi-valued variants (multi-select options, file attachment names).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    List(Vec<String>),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Null
    }
}

impl CellValue {
    /// Clipboard string form of this value: lists serialize as a compact
    /// JSON token, dates as ISO-8601, null as the empty string, everything
    /// else as its plain string form.
    pub fn clipboard_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => canonical_number(*n),
            CellValue::Bool(b) => if *b { "true".to_string() } else { "false".to_string() },
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::List(items) => {
                serde_json::to_string(items).unwrap_or_else(|_| String::new())
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::List(items) => items.is_empty(),
            _ => false,
        }
    }
}

/// Canonical string form of a number.
/// Guarantees: no scientific notation, deterministic output, -0.0 normalized to 0.
pub fn canonical_number(n: f64) -> String {
    if !n.is_finite() {
        if n.is_nan() {
            return "NaN".to_string();
        }
        return if n > 0.0 { "INF".to_string() } else { "-INF".to_string() };
    }

    // Normalize -0.0 to 0.0
    let n0 = if n == 0.0 { 0.0 } else { n };

    // Integer fast path: no decimal point needed
    if n0.fract() == 0.0 && n0.abs() < 9e15 {
        format!("{:.0}", n0)
    } else {
        // Fixed precision (15 decimals), trim trailing zeros, no scientific notation
        let mut s = format!("{:.15}", n0);
        while s.contains('.') && s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
        s
    }
}

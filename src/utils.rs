/// Utility functions
use chrono::{DateTime, Datelike, Duration, Utc};
use serde_json::Value;

/// Extract number from JSON value
pub fn num(v: &Value) -> Option<f64> {
    if let Some(x) = v.as_f64() {
        return Some(x);
    }
    if let Some(s) = v.as_str() {
        return s.parse::<f64>().ok();
    }
    None
}

/// Extract a trimmed string from JSON value
pub fn text(v: &Value) -> Option<String> {
    v.as_str().map(|s| s.trim().to_string())
}

/// `YYYY-MM` used in monthly blob keys
pub fn month_stamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

/// `YYYY-MM-DD` used in daily blob keys
pub fn day_stamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// Month stamps covering `[at - window, at]`, oldest first
pub fn months_in_window(at: DateTime<Utc>, window: Duration) -> Vec<String> {
    let start = at - window;
    let mut months = Vec::new();
    let (mut y, mut m) = (start.year(), start.month());
    while (y, m) <= (at.year(), at.month()) {
        months.push(format!("{:04}-{:02}", y, m));
        if m == 12 {
            y += 1;
            m = 1;
        } else {
            m += 1;
        }
    }
    months
}

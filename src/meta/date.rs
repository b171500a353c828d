//! Front-matter date normalization.
//!
//! Every `date:` value becomes a [`NaiveDateTime`]:
//!
//! | input                          | result                      |
//! |--------------------------------|-----------------------------|
//! | `"2024-03-01 14:30"`           | that minute                 |
//! | `"2024-03-01 14:30:05"`        | that second                 |
//! | `"2024-03-01T14:30:05"`        | that second                 |
//! | `"2024-03-01"`                 | midnight of that day        |
//! | `2024`                         | Jan 1 2024, 00:00           |
//! | anything else                  | [`sentinel`] (2000-01-01)   |

use chrono::{NaiveDate, NaiveDateTime};
use serde_yaml::Value;

/// Accepted string layouts, tried in order.
const FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Date used when a value can not be interpreted.
pub fn sentinel() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Normalize a raw YAML `date` value.
pub fn normalize(value: &Value) -> NaiveDateTime {
    match value {
        Value::String(s) => parse_str(s.trim()).unwrap_or_else(sentinel),
        Value::Number(n) => n
            .as_i64()
            .and_then(|year| i32::try_from(year).ok())
            .and_then(year_start)
            .unwrap_or_else(sentinel),
        Value::Tagged(tagged) => normalize(&tagged.value),
        _ => sentinel(),
    }
}

fn parse_str(s: &str) -> Option<NaiveDateTime> {
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn year_start(year: i32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)
}

/// `YYYY-MM-DD HH:MM`, the canonical layout. Feeding it back through
/// [`normalize`] yields the same minute.
#[cfg(test)]
pub fn format(date: &NaiveDateTime) -> String {
    date.format("%Y-%m-%d %H:%M").to_string()
}

/// `YYYY-MM-DD`, used in generated listings.
pub fn format_day(date: &NaiveDateTime) -> String {
    date.format("%Y-%m-%d").to_string()
}

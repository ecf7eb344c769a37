// Utility helpers for score coercion, statistics, and week bucketing.
//
// This module centralizes all the "dirty" JSON/number/date handling so the
// rest of the code can assume clean, typed values.
use chrono::{Datelike, NaiveDate};
use num_format::{Locale, ToFormattedString};
use serde_json::Value;

/// Coerce a raw JSON value into an optional score.
///
/// Upstream scores come from free-text extraction and show up as numbers,
/// numeric strings, the sentinel `"N/A"` (any case), empty strings, or
/// garbage. Everything unusable degrades to `None`; this function never
/// errors.
pub fn safe_num(v: &Value) -> Option<f64> {
    match v {
        Value::Null => None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s.eq_ignore_ascii_case("n/a") {
                return None;
            }
            s.parse::<f64>().ok()
        }
        _ => None,
    }
}

/// Coerce a raw JSON value into a trimmed string, defaulting to empty for
/// anything that is not a string.
pub fn coerce_str(v: &Value) -> String {
    match v {
        Value::String(s) => s.trim().to_string(),
        _ => String::new(),
    }
}

/// Coerce a raw JSON value into a tag list: string elements of an array,
/// trimmed, empties dropped. Non-arrays become the empty list.
pub fn coerce_tags(v: &Value) -> Vec<String> {
    match v {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

pub fn parse_date_safe(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Derive a snapshot date from a filename of the exact form `YYYY-MM-DD.json`.
///
/// Any other extension or a malformed stem yields `None`; the file still
/// contributes records, it just lands in the "unknown" week bucket.
pub fn snapshot_date(file_name: &str) -> Option<NaiveDate> {
    let stem = file_name.strip_suffix(".json")?;
    // chrono accepts unpadded months/days, the naming contract does not.
    if stem.len() != 10 {
        return None;
    }
    parse_date_safe(stem)
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Arithmetic mean of the present values, unrounded. `None` when nothing is
/// present — a group with no usable scores must never report zero.
pub fn mean_opt(vals: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = vals.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    let sum: f64 = present.iter().sum();
    Some(sum / present.len() as f64)
}

/// Null-tolerant mean rounded to 2 decimals, as displayed in report tables.
pub fn mean_or_none(vals: &[Option<f64>]) -> Option<f64> {
    mean_opt(vals).map(round2)
}

/// ISO year-week label (`YYYY-Www`) for a snapshot date, or `"unknown"`.
pub fn week_label(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => {
            let iso = d.iso_week();
            format!("{}-W{:02}", iso.year(), iso.week())
        }
        None => "unknown".to_string(),
    }
}

/// Ascending, deduplicated week labels for the given snapshot dates, limited
/// to the most recent 26.
pub fn trend_weeks(dates: &[NaiveDate]) -> Vec<String> {
    let mut weeks: Vec<String> = dates.iter().map(|d| week_label(Some(*d))).collect();
    weeks.sort();
    weeks.dedup();
    if weeks.len() > 26 {
        weeks.split_off(weeks.len() - 26)
    } else {
        weeks
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format`, used for counts in log messages.
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn safe_num_absent_inputs() {
        assert_eq!(safe_num(&Value::Null), None);
        assert_eq!(safe_num(&json!("")), None);
        assert_eq!(safe_num(&json!("   ")), None);
        assert_eq!(safe_num(&json!("N/A")), None);
        assert_eq!(safe_num(&json!("n/a")), None);
        assert_eq!(safe_num(&json!(" N/a ")), None);
        assert_eq!(safe_num(&json!("eighty")), None);
        assert_eq!(safe_num(&json!(true)), None);
        assert_eq!(safe_num(&json!([80])), None);
    }

    #[test]
    fn safe_num_numeric_inputs() {
        assert_eq!(safe_num(&json!(80)), Some(80.0));
        assert_eq!(safe_num(&json!(72.5)), Some(72.5));
        assert_eq!(safe_num(&json!("80")), Some(80.0));
        assert_eq!(safe_num(&json!(" 72.5 ")), Some(72.5));
        assert_eq!(safe_num(&json!("-3")), Some(-3.0));
    }

    #[test]
    fn coerce_str_defaults_and_trims() {
        assert_eq!(coerce_str(&json!("  Nature  ")), "Nature");
        assert_eq!(coerce_str(&Value::Null), "");
        assert_eq!(coerce_str(&json!(42)), "");
    }

    #[test]
    fn coerce_tags_keeps_string_elements() {
        assert_eq!(coerce_tags(&json!(["a", " b ", "", 7])), vec!["a", "b"]);
        assert_eq!(coerce_tags(&json!("not-a-list")), Vec::<String>::new());
        assert_eq!(coerce_tags(&Value::Null), Vec::<String>::new());
    }

    #[test]
    fn snapshot_date_requires_exact_form() {
        assert_eq!(
            snapshot_date("2024-01-08.json"),
            NaiveDate::from_ymd_opt(2024, 1, 8)
        );
        assert_eq!(snapshot_date("2024-01-08.txt"), None);
        assert_eq!(snapshot_date("2024-1-8.json"), None);
        assert_eq!(snapshot_date("notes.json"), None);
        assert_eq!(snapshot_date("2024-13-40.json"), None);
    }

    #[test]
    fn mean_or_none_filters_absent_values() {
        assert_eq!(mean_or_none(&[]), None);
        assert_eq!(mean_or_none(&[None, None]), None);
        assert_eq!(mean_or_none(&[Some(60.0), None, Some(80.0)]), Some(70.0));
        assert_eq!(mean_or_none(&[Some(1.0), Some(2.0), Some(2.0)]), Some(1.67));
    }

    #[test]
    fn week_label_iso_rules() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 8);
        assert_eq!(week_label(d), "2024-W02");
        // ISO year boundary: the last days of December can fall into week 1
        // of the following year.
        let d = NaiveDate::from_ymd_opt(2024, 12, 30);
        assert_eq!(week_label(d), "2025-W01");
        assert_eq!(week_label(None), "unknown");
    }

    #[test]
    fn trend_weeks_keeps_last_26_ascending() {
        let mut dates: Vec<NaiveDate> = (0..30)
            .map(|i| NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(7 * i))
            .collect();
        // duplicate a date; labels must dedup
        dates.push(dates[0]);
        let weeks = trend_weeks(&dates);
        assert_eq!(weeks.len(), 26);
        assert!(weeks.windows(2).all(|w| w[0] < w[1]));
        // the first four labels fell off the front
        assert_eq!(weeks.first().map(String::as_str), Some("2024-W05"));
        assert_eq!(weeks.last().map(String::as_str), Some("2024-W30"));
    }
}

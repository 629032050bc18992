//! Column normalization rules for raw registry values
//!
//! SQLite is dynamically typed, so every rule here accepts any storage class
//! and decides how to coerce it. Row context (row number, tag) is attached
//! by the loader when a rule rejects a value.

use chrono::NaiveDate;
use clap::ValueEnum;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

/// Text rendered for a NULL text column under [`NullTextPolicy::Literal`]
pub const NULL_LITERAL: &str = "nan";

/// Storage and display format of acquisition dates
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Minimum width of a rendered asset tag
pub const TAG_WIDTH: usize = 6;

const DAYS_PER_YEAR: f64 = 365.25;

/// How NULL values in free-text columns are rendered
///
/// `Literal` keeps the registry's historical behaviour of showing "nan" for
/// missing text. It is almost certainly a latent defect, but reports built on
/// the registry depend on it, so it stays the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum NullTextPolicy {
    /// NULL becomes the literal "nan"
    #[default]
    Literal,
    /// NULL becomes an empty string
    Empty,
}

/// What a malformed acquisition date does to a load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DateParsePolicy {
    /// One malformed date aborts the whole load
    #[default]
    Strict,
    /// A malformed date keeps its raw text and yields an age of zero
    Lenient,
}

/// Outcome of parsing one acquisition date cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateCell {
    /// NULL or blank in the store
    Absent,
    Parsed(NaiveDate),
    /// Present but not a `DD/MM/YYYY` calendar date; holds the raw text
    Invalid(String),
}

/// Coerce a stored tag to its zero-padded display form
///
/// Negative, non-numeric and NULL tags render as an empty string. Tags of
/// a million or more keep all their digits.
pub fn normalize_tag(value: &Value) -> String {
    let number = match value {
        Value::Integer(n) => Some(*n),
        Value::Real(f) => truncate_float(*f),
        Value::Text(s) => s.trim().parse::<f64>().ok().and_then(truncate_float),
        Value::Null | Value::Blob(_) => None,
    };

    match number {
        Some(n) if n >= 0 => format!("{:0width$}", n, width = TAG_WIDTH),
        _ => String::new(),
    }
}

/// Coerce any stored value to its text representation
pub fn normalize_text(value: &Value, policy: NullTextPolicy) -> String {
    match value {
        Value::Null => match policy {
            NullTextPolicy::Literal => NULL_LITERAL.to_string(),
            NullTextPolicy::Empty => String::new(),
        },
        Value::Integer(n) => n.to_string(),
        Value::Real(f) => float_to_text(*f),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => String::from_utf8_lossy(b).into_owned(),
    }
}

/// Pass a text column through untouched, keeping NULL as absent
pub fn passthrough_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(normalize_text(other, NullTextPolicy::Empty)),
    }
}

/// Coerce a document number: NULL or blank is 0, anything else must be numeric
///
/// Fractional values are truncated toward zero. Returns the offending text
/// when the value is not a finite number.
pub fn normalize_document(value: &Value) -> Result<i64, String> {
    match value {
        Value::Null => Ok(0),
        Value::Integer(n) => Ok(*n),
        Value::Real(f) => truncate_float(*f).ok_or_else(|| float_to_text(*f)),
        Value::Text(s) if s.trim().is_empty() => Ok(0),
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(truncate_float)
            .ok_or_else(|| s.clone()),
        Value::Blob(b) => Err(String::from_utf8_lossy(b).into_owned()),
    }
}

/// Coerce an acquisition amount, keeping the raw number
pub fn normalize_amount(value: &Value) -> Result<Option<f64>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Integer(n) => Ok(Some(*n as f64)),
        Value::Real(f) => Ok(Some(*f)),
        Value::Text(s) if s.trim().is_empty() => Ok(None),
        Value::Text(s) => s.trim().parse::<f64>().map(Some).map_err(|_| s.clone()),
        Value::Blob(b) => Err(String::from_utf8_lossy(b).into_owned()),
    }
}

/// Parse an acquisition date strictly as `DD/MM/YYYY`
pub fn parse_acquisition_date(value: &Value) -> DateCell {
    match value {
        Value::Null => DateCell::Absent,
        Value::Text(s) if s.trim().is_empty() => DateCell::Absent,
        Value::Text(s) if !has_full_year(s.trim()) => DateCell::Invalid(s.clone()),
        Value::Text(s) => match NaiveDate::parse_from_str(s.trim(), DATE_FORMAT) {
            Ok(date) => DateCell::Parsed(date),
            Err(_) => DateCell::Invalid(s.clone()),
        },
        other => DateCell::Invalid(normalize_text(other, NullTextPolicy::Empty)),
    }
}

/// `%Y` alone also takes short or signed years ("20", "+2020")
fn has_full_year(raw: &str) -> bool {
    raw.rsplit('/')
        .next()
        .is_some_and(|year| year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()))
}

/// Render a date back to `DD/MM/YYYY`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Whole days between acquisition and today divided by 365.25, rounded to
/// 2 decimals. Acquisitions dated in the future count as age zero.
pub fn age_in_years(acquired: NaiveDate, today: NaiveDate) -> f64 {
    let days = (today - acquired).num_days();
    if days <= 0 {
        return 0.0;
    }
    round2(days as f64 / DAYS_PER_YEAR)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn truncate_float(f: f64) -> Option<i64> {
    if f.is_finite() && f.abs() < i64::MAX as f64 {
        Some(f.trunc() as i64)
    } else {
        None
    }
}

/// Text form of a float: integral values keep a trailing ".0"
fn float_to_text(f: f64) -> String {
    if f.is_nan() {
        NULL_LITERAL.to_string()
    } else if f.is_infinite() {
        let sign = if f > 0.0 { "" } else { "-" };
        format!("{}inf", sign)
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

//! Shared helper functions for CLI commands

/// Truncate a string to `max_len` characters, adding "..." if truncated
///
/// Counts characters rather than bytes; registry text is full of accented
/// Portuguese.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Display form of an acquisition amount (raw number, two decimals)
pub fn format_amount(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}", v),
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

/// Display form of an age in years
pub fn format_age(age: f64) -> String {
    format!("{:.2}", age)
}

/// Parse an interactive answer into an optional age bound
///
/// Blank input means "no bound".
pub fn parse_bound(input: &str) -> Result<Option<f64>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.replace(',', ".").parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(format!("'{}' is not a number", trimmed)),
    }
}

/// clap value parser for `--min-age`/`--max-age`
pub fn parse_age_arg(input: &str) -> Result<f64, String> {
    parse_bound(input)?.ok_or_else(|| "age must not be empty".to_string())
}

/// Parse an age bound that must fall inside `low..=high`
pub fn parse_bound_within(input: &str, low: i64, high: i64) -> Result<Option<f64>, String> {
    match parse_bound(input)? {
        Some(value) if value < low as f64 || value > high as f64 => Err(format!(
            "age must be between {} and {} years",
            low, high
        )),
        bound => Ok(bound),
    }
}

//! Filter engine for the registry table
//!
//! A filter combines a case-insensitive substring search over the tag and
//! description columns with inclusive bounds on `age_years`:
//!
//! ```text
//! (query ⊆ tag OR query ⊆ description) AND age_min ≤ age ≤ age_max
//! ```
//!
//! Filtering never fails and keeps the table's row order.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::record::{AgeSpan, AssetRecord, AssetTable};

/// How to decide whether a filter has anything to apply
///
/// The registry view only shows rows once a predicate is active. Older
/// versions tested the age bounds for truthiness, so a bound of exactly zero
/// counted as "not set"; `Truthy` keeps that behaviour for anyone relying on
/// it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FilterGate {
    /// A bound is active whenever it is set, including zero
    #[default]
    Explicit,
    /// A bound of zero is treated as unset
    Truthy,
}

/// A text query plus optional inclusive age bounds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterQuery {
    pub text: String,
    pub age_min: Option<f64>,
    pub age_max: Option<f64>,
}

impl FilterQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_age_range(mut self, age_min: Option<f64>, age_max: Option<f64>) -> Self {
        self.age_min = age_min;
        self.age_max = age_max;
        self
    }

    /// The search text as compared: trimmed and case-folded
    fn needle(&self) -> String {
        self.text.trim().to_lowercase()
    }

    /// Whether any predicate is set under the given gate
    pub fn is_active(&self, gate: FilterGate) -> bool {
        let bound_set = |bound: Option<f64>| match gate {
            FilterGate::Explicit => bound.is_some(),
            FilterGate::Truthy => bound.is_some_and(|b| b != 0.0),
        };

        !self.needle().is_empty() || bound_set(self.age_min) || bound_set(self.age_max)
    }

    /// Tighten set bounds to the table's observed age span
    ///
    /// Only a minimum below the span or a maximum above it moves, so the
    /// set of matching rows never changes. A minimum above the span stays
    /// put and still matches nothing.
    pub fn clamped_to(mut self, span: &AgeSpan) -> Self {
        self.age_min = self.age_min.map(|b| b.max(span.min));
        self.age_max = self.age_max.map(|b| b.min(span.max));
        self
    }

    fn matches(&self, needle: &str, record: &AssetRecord) -> bool {
        let text_hit = needle.is_empty()
            || record.tag.to_lowercase().contains(needle)
            || record.description.to_lowercase().contains(needle);

        text_hit
            && self.age_min.map_or(true, |min| record.age_years >= min)
            && self.age_max.map_or(true, |max| record.age_years <= max)
    }
}

/// Rows of `table` matching `query`, in their original order
pub fn filter(table: &AssetTable, query: &FilterQuery) -> AssetTable {
    let needle = query.needle();
    table
        .iter()
        .filter(|record| query.matches(&needle, record))
        .cloned()
        .collect()
}

/// Result of running a query through the view's gate
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    /// No predicate is active; the view asks for one instead of listing rows
    Inactive,
    Matches(AssetTable),
}

/// Apply `query` when the gate considers it active
pub fn evaluate(table: &AssetTable, query: &FilterQuery, gate: FilterGate) -> FilterOutcome {
    if query.is_active(gate) {
        FilterOutcome::Matches(filter(table, query))
    } else {
        FilterOutcome::Inactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::sample_record;

    fn table() -> AssetTable {
        vec![
            sample_record("000120", "Laser Printer", 3.2),
            sample_record("000099", "Scanner", 3.2),
            sample_record("000042", "Inkjet printer", 8.75),
            sample_record("000007", "Monitor", 0.0),
        ]
        .into_iter()
        .collect()
    }

    fn tags(table: &AssetTable) -> Vec<&str> {
        table.iter().map(|r| r.tag.as_str()).collect()
    }

    #[test]
    fn test_text_matches_description_case_insensitively() {
        let query = FilterQuery::new("PRINTER").with_age_range(Some(0.0), Some(5.0));
        let result = filter(&table(), &query);
        assert_eq!(tags(&result), ["000120"]);
    }

    #[test]
    fn test_text_matches_tag_substring() {
        let result = filter(&table(), &FilterQuery::new("0004"));
        assert_eq!(tags(&result), ["000042"]);
    }

    #[test]
    fn test_text_is_trimmed() {
        let result = filter(&table(), &FilterQuery::new("  scanner "));
        assert_eq!(tags(&result), ["000099"]);
    }

    #[test]
    fn test_empty_text_filters_by_age_only() {
        let query = FilterQuery::new("").with_age_range(Some(3.0), Some(9.0));
        let result = filter(&table(), &query);
        assert_eq!(tags(&result), ["000120", "000099", "000042"]);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let query = FilterQuery::new("").with_age_range(Some(3.2), Some(3.2));
        assert_eq!(tags(&filter(&table(), &query)), ["000120", "000099"]);
    }

    #[test]
    fn test_order_is_preserved() {
        let result = filter(&table(), &FilterQuery::new("n"));
        assert_eq!(tags(&result), ["000120", "000099", "000042", "000007"]);
    }

    #[test]
    fn test_zero_matches_is_empty_table() {
        let result = filter(&table(), &FilterQuery::new("forklift"));
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_table_yields_empty_result() {
        let query = FilterQuery::new("anything").with_age_range(Some(0.0), Some(100.0));
        assert!(filter(&AssetTable::default(), &query).is_empty());
        assert_eq!(
            evaluate(&AssetTable::default(), &query, FilterGate::Explicit),
            FilterOutcome::Matches(AssetTable::default())
        );
    }

    #[test]
    fn test_filter_is_idempotent() {
        let query = FilterQuery::new("print").with_age_range(Some(1.0), Some(9.0));
        let once = filter(&table(), &query);
        let twice = filter(&once, &query);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_widening_range_never_drops_rows() {
        let narrow = FilterQuery::new("").with_age_range(Some(3.0), Some(4.0));
        let wide = FilterQuery::new("").with_age_range(Some(0.0), Some(10.0));
        let narrow_rows = filter(&table(), &narrow);
        let wide_rows = filter(&table(), &wide);
        for record in &narrow_rows {
            assert!(wide_rows.iter().any(|r| r == record));
        }
    }

    #[test]
    fn test_explicit_gate_counts_zero_bounds() {
        let query = FilterQuery::new("").with_age_range(Some(0.0), Some(0.0));
        assert!(query.is_active(FilterGate::Explicit));
        assert_eq!(
            evaluate(&table(), &query, FilterGate::Explicit),
            FilterOutcome::Matches(filter(&table(), &query))
        );
    }

    #[test]
    fn test_truthy_gate_ignores_zero_bounds() {
        let query = FilterQuery::new("").with_age_range(Some(0.0), Some(0.0));
        assert!(!query.is_active(FilterGate::Truthy));
        assert_eq!(evaluate(&table(), &query, FilterGate::Truthy), FilterOutcome::Inactive);

        let with_max = FilterQuery::new("").with_age_range(Some(0.0), Some(5.0));
        assert!(with_max.is_active(FilterGate::Truthy));
    }

    #[test]
    fn test_no_predicate_is_inactive() {
        let query = FilterQuery::new("   ");
        assert!(!query.is_active(FilterGate::Explicit));
        assert_eq!(evaluate(&table(), &query, FilterGate::Explicit), FilterOutcome::Inactive);
    }

    #[test]
    fn test_clamp_to_span() {
        let span = table().age_span().unwrap();
        let query = FilterQuery::new("").with_age_range(Some(-4.0), Some(50.0)).clamped_to(&span);
        assert_eq!(query.age_min, Some(0.0));
        assert_eq!(query.age_max, Some(8.75));

        let unset = FilterQuery::new("x").clamped_to(&span);
        assert_eq!(unset.age_min, None);
    }

    #[test]
    fn test_clamp_never_admits_rows_outside_requested_range() {
        let span = table().age_span().unwrap();

        let above = FilterQuery::new("").with_age_range(Some(50.0), None);
        assert!(filter(&table(), &above.clone().clamped_to(&span)).is_empty());
        assert_eq!(above.clamped_to(&span).age_min, Some(50.0));

        let below = FilterQuery::new("").with_age_range(None, Some(-1.0));
        assert!(filter(&table(), &below.clamped_to(&span)).is_empty());

        let inside = FilterQuery::new("").with_age_range(Some(3.0), Some(20.0));
        assert_eq!(
            filter(&table(), &inside.clone().clamped_to(&span)),
            filter(&table(), &inside)
        );
    }
}

//! Normalized asset records and the in-memory registry table

use serde::Serialize;

/// One normalized row of the asset registry
///
/// Every field is always present. Text columns have already been coerced
/// according to the configured [`NullTextPolicy`](crate::core::NullTextPolicy).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetRecord {
    /// Zero-padded asset tag ("000007"), empty when the stored value was unusable
    pub tag: String,
    pub description: String,
    pub branch: String,
    pub location_description: String,
    pub holder: String,
    /// Date of the last location change, passed through as stored
    pub last_location_date: Option<String>,
    pub supplier: String,
    pub document_number: i64,
    /// Acquisition date as `DD/MM/YYYY`, absent when the store had none
    pub acquisition_date: Option<String>,
    /// Raw acquisition amount; currency formatting happens at display time
    pub acquisition_value: Option<f64>,
    pub product_code: String,
    pub serial_number: String,
    /// Years since acquisition, rounded to 2 decimals, never negative
    pub age_years: f64,
    /// Per-row "select" flag shown next to each row in result views.
    ///
    /// Nothing acts on it yet. A bulk action (export, disposal list) would
    /// read this flag to decide which rows it applies to.
    pub selected: bool,
}

/// Observed age range of a table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeSpan {
    pub min: f64,
    pub max: f64,
}

impl AgeSpan {
    /// Integer range used to seed range prompts.
    ///
    /// Rounds outward so the default range always covers every row.
    pub fn whole_years(&self) -> (i64, i64) {
        (self.min.floor() as i64, self.max.ceil() as i64)
    }
}

/// The normalized registry table
///
/// Rows keep the order delivered by the store (tag descending). A table is
/// never modified after construction; a reload produces a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AssetTable {
    records: Vec<AssetRecord>,
}

impl AssetTable {
    pub fn new(records: Vec<AssetRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[AssetRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssetRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Minimum and maximum `age_years` across the table, `None` when empty
    pub fn age_span(&self) -> Option<AgeSpan> {
        let mut iter = self.records.iter().map(|r| r.age_years);
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), age| (lo.min(age), hi.max(age)));
        Some(AgeSpan { min, max })
    }

    /// Number of rows that had no acquisition date in the store
    pub fn undated_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.acquisition_date.is_none())
            .count()
    }
}

impl<'a> IntoIterator for &'a AssetTable {
    type Item = &'a AssetRecord;
    type IntoIter = std::slice::Iter<'a, AssetRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<AssetRecord> for AssetTable {
    fn from_iter<I: IntoIterator<Item = AssetRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
pub(crate) fn sample_record(tag: &str, description: &str, age_years: f64) -> AssetRecord {
    AssetRecord {
        tag: tag.to_string(),
        description: description.to_string(),
        branch: "1".to_string(),
        location_description: "Warehouse".to_string(),
        holder: "nan".to_string(),
        last_location_date: None,
        supplier: "Acme".to_string(),
        document_number: 0,
        acquisition_date: Some("01/01/2020".to_string()),
        acquisition_value: Some(100.0),
        product_code: "P-1".to_string(),
        serial_number: "SN-1".to_string(),
        age_years,
        selected: true,
    }
}

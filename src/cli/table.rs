//! Table formatting for registry query results
//!
//! Every result view renders through [`TableFormatter`] so the output formats
//! stay consistent between `search` and `browse`.
//!
//! # Text Wrapping
//!
//! - Use `TableConfig::with_wrap(width)` to enable word-wrapped multi-line rows
//! - CSV, JSON, YAML and ID formats remain single-line for pipability

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{format_age, format_amount, truncate_str};
use crate::cli::OutputFormat;
use crate::core::record::{AssetRecord, AssetTable};

/// Configuration for table output
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Maximum width for text columns before wrapping (None = truncate instead)
    pub wrap_width: Option<usize>,
    /// Show summary line after table (e.g., "5 asset(s) found")
    pub show_summary: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            wrap_width: None,
            show_summary: true,
        }
    }
}

impl TableConfig {
    /// Create config with text wrapping enabled at the specified width
    pub fn with_wrap(width: usize) -> Self {
        Self {
            wrap_width: Some(width),
            show_summary: true,
        }
    }

    /// Create config optimized for piping (no wrapping, no summary)
    pub fn for_pipe() -> Self {
        Self {
            wrap_width: None,
            show_summary: false,
        }
    }
}

/// Wrap text to fit within a maximum width, breaking at word boundaries
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if text.chars().count() <= max_width || max_width < 5 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let current_len = current_line.chars().count();

        if !current_line.is_empty() && current_len + 1 + word_len <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
            continue;
        }

        if !current_line.is_empty() {
            lines.push(std::mem::take(&mut current_line));
        }

        // Words longer than the line are force-broken
        let chars: Vec<char> = word.chars().collect();
        let mut chunks = chars.chunks(max_width).peekable();
        while let Some(chunk) = chunks.next() {
            let piece: String = chunk.iter().collect();
            if chunks.peek().is_some() {
                lines.push(piece);
            } else {
                current_line = piece;
            }
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Asset tag (cyan)
    Tag(String),
    /// Plain text, truncated to the column width
    Text(String),
    /// Text that may be absent (displays "-")
    OptionalText(Option<String>),
    /// Integer value
    Number(i64),
    /// Acquisition amount, two decimals
    Amount(Option<f64>),
    /// Age in years, colour-coded by how old the asset is
    Age(f64),
    /// The per-row select flag
    Flag(bool),
}

impl CellValue {
    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Tag(tag) => format!("{:<width$}", style(tag).cyan(), width = width),
            CellValue::Text(s) => {
                let truncated = truncate_str(s, width.saturating_sub(2));
                format!("{:<width$}", truncated, width = width)
            }
            CellValue::OptionalText(opt) => {
                let s = opt.as_deref().unwrap_or("-");
                format!("{:<width$}", truncate_str(s, width.saturating_sub(2)), width = width)
            }
            CellValue::Number(n) => format!("{:<width$}", n, width = width),
            CellValue::Amount(v) => format!("{:>width$}", format_amount(*v), width = width),
            CellValue::Age(age) => {
                let s = format_age(*age);
                let styled = if *age >= 10.0 {
                    style(s).red()
                } else if *age >= 5.0 {
                    style(s).yellow()
                } else {
                    style(s).green()
                };
                format!("{:>width$}", styled, width = width)
            }
            CellValue::Flag(b) => {
                let mark = if *b { "[x]" } else { "[ ]" };
                format!("{:<width$}", mark, width = width)
            }
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::OptionalText(None) | CellValue::Amount(None) => "-".to_string(),
            CellValue::Flag(b) => {
                if *b {
                    "☑".to_string()
                } else {
                    "☐".to_string()
                }
            }
            other => other.raw(),
        };
        raw.replace('|', "\\|")
    }

    /// Get raw string value (no formatting, for CSV and ID output)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Tag(s) | CellValue::Text(s) => s.clone(),
            CellValue::OptionalText(opt) => opt.clone().unwrap_or_default(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Amount(v) => v.map(|v| v.to_string()).unwrap_or_default(),
            CellValue::Age(age) => format_age(*age),
            CellValue::Flag(b) => b.to_string(),
        }
    }

    /// Get the display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Tag(s) | CellValue::Text(s) => s.chars().count(),
            CellValue::OptionalText(opt) => opt.as_deref().map_or(1, |s| s.chars().count()),
            CellValue::Number(n) => n.to_string().len(),
            CellValue::Amount(v) => format_amount(*v).len(),
            CellValue::Age(age) => format_age(*age).len(),
            CellValue::Flag(_) => 3,
        }
    }

    fn wraps(&self) -> bool {
        matches!(self, CellValue::Text(_))
    }
}

/// Column definition with header label and width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// All registry columns, in display order, with the select flag last
pub const ASSET_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("tag", "TAG", 9),
    ColumnDef::new("description", "DESCRIPTION", 36),
    ColumnDef::new("branch", "BRANCH", 10),
    ColumnDef::new("location", "LOCATION", 24),
    ColumnDef::new("holder", "HOLDER", 20),
    ColumnDef::new("last_location", "LAST LOC", 12),
    ColumnDef::new("supplier", "SUPPLIER", 24),
    ColumnDef::new("document", "DOCUMENT", 10),
    ColumnDef::new("acquired", "ACQUIRED", 10),
    ColumnDef::new("value", "VALUE", 14),
    ColumnDef::new("product_code", "CODE", 12),
    ColumnDef::new("serial", "SERIAL", 18),
    ColumnDef::new("age", "AGE", 6),
    ColumnDef::new("select", "SELECT", 6),
];

/// Keys shown in the terminal view unless `--wide` is given
pub const COMPACT_KEYS: &[&str] = &[
    "tag",
    "description",
    "branch",
    "location",
    "holder",
    "acquired",
    "value",
    "age",
    "select",
];

/// A row of cell values for table output
#[derive(Debug, Clone)]
pub struct TableRow {
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

impl From<&AssetRecord> for TableRow {
    fn from(r: &AssetRecord) -> Self {
        Self {
            cells: vec![
                ("tag", CellValue::Tag(r.tag.clone())),
                ("description", CellValue::Text(r.description.clone())),
                ("branch", CellValue::Text(r.branch.clone())),
                ("location", CellValue::Text(r.location_description.clone())),
                ("holder", CellValue::Text(r.holder.clone())),
                ("last_location", CellValue::OptionalText(r.last_location_date.clone())),
                ("supplier", CellValue::Text(r.supplier.clone())),
                ("document", CellValue::Number(r.document_number)),
                ("acquired", CellValue::OptionalText(r.acquisition_date.clone())),
                ("value", CellValue::Amount(r.acquisition_value)),
                ("product_code", CellValue::Text(r.product_code.clone())),
                ("serial", CellValue::Text(r.serial_number.clone())),
                ("age", CellValue::Age(r.age_years)),
                ("select", CellValue::Flag(r.selected)),
            ],
        }
    }
}

/// Renders a registry table in any output format
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    visible: Vec<&'static str>,
    config: TableConfig,
}

impl<'a> TableFormatter<'a> {
    /// Formatter showing every column in `columns`
    pub fn new(columns: &'a [ColumnDef]) -> Self {
        Self {
            visible: columns.iter().map(|c| c.key).collect(),
            columns,
            config: TableConfig::default(),
        }
    }

    /// Restrict the terminal (TSV) view to the given keys
    pub fn with_visible(mut self, keys: &[&'static str]) -> Self {
        self.visible = keys.to_vec();
        self
    }

    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Render `table` in `format`
    pub fn render(&self, table: &AssetTable, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => {
                let mut out = serde_json::to_string_pretty(table).into_diagnostic()?;
                out.push('\n');
                Ok(out)
            }
            OutputFormat::Yaml => serde_yml::to_string(table).into_diagnostic(),
            OutputFormat::Csv => self.render_csv(table),
            OutputFormat::Md => Ok(self.render_md(table)),
            OutputFormat::Id => Ok(table.iter().map(|r| format!("{}\n", r.tag)).collect()),
            OutputFormat::Tsv | OutputFormat::Auto => Ok(self.render_tsv(table)),
        }
    }

    fn visible_columns(&self) -> Vec<&ColumnDef> {
        self.columns
            .iter()
            .filter(|c| self.visible.contains(&c.key))
            .collect()
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.visible_columns()
            .into_iter()
            .map(|col| {
                let max_content = rows
                    .iter()
                    .filter_map(|r| r.get(col.key))
                    .map(|v| v.display_width())
                    .max()
                    .unwrap_or(0);

                // +2 leaves room for the truncation buffer
                let natural_width = col.header.len().max(max_content.saturating_add(2));
                natural_width.min(col.width.max(col.header.len()))
            })
            .collect()
    }

    fn render_tsv(&self, table: &AssetTable) -> String {
        let rows: Vec<TableRow> = table.iter().map(TableRow::from).collect();
        let widths = self.calculate_widths(&rows);
        let mut out = String::new();

        let header: Vec<String> = self
            .visible_columns()
            .into_iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:<width$}", style(col.header).bold(), width = *w))
            .collect();
        out.push_str(&header.join(" "));
        out.push('\n');

        let total_width: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(total_width));
        out.push('\n');

        for row in &rows {
            match self.config.wrap_width {
                Some(wrap_width) => self.push_row_wrapped(&mut out, row, &widths, wrap_width),
                None => self.push_row_truncated(&mut out, row, &widths),
            }
        }

        if self.config.show_summary {
            out.push('\n');
            out.push_str(&format!("{} asset(s) found.\n", style(rows.len()).cyan()));
        }

        out
    }

    fn push_row_truncated(&self, out: &mut String, row: &TableRow, widths: &[usize]) {
        let parts: Vec<String> = self
            .visible_columns()
            .into_iter()
            .zip(widths)
            .map(|(col, w)| match row.get(col.key) {
                Some(value) => value.format_tsv(*w),
                None => format!("{:<width$}", "-", width = *w),
            })
            .collect();
        out.push_str(&parts.join(" "));
        out.push('\n');
    }

    fn push_row_wrapped(&self, out: &mut String, row: &TableRow, widths: &[usize], wrap_width: usize) {
        let wrapped: Vec<Vec<String>> = self
            .visible_columns()
            .into_iter()
            .map(|col| match row.get(col.key) {
                Some(value) if value.wraps() => wrap_text(&value.raw(), wrap_width),
                Some(value) => vec![value.raw()],
                None => vec!["-".to_string()],
            })
            .collect();

        let max_lines = wrapped.iter().map(Vec::len).max().unwrap_or(1);

        for line_idx in 0..max_lines {
            let parts: Vec<String> = wrapped
                .iter()
                .zip(widths)
                .map(|(lines, w)| {
                    let content = lines.get(line_idx).map(String::as_str).unwrap_or("");
                    format!("{:<width$}", content, width = *w)
                })
                .collect();
            out.push_str(parts.join(" ").trim_end());
            out.push('\n');
        }

        // Blank line between multi-line rows for readability
        if max_lines > 1 {
            out.push('\n');
        }
    }

    fn render_csv(&self, table: &AssetTable) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(self.columns.iter().map(|c| c.key))
            .into_diagnostic()?;

        for record in table {
            let row = TableRow::from(record);
            writer
                .write_record(
                    self.columns
                        .iter()
                        .map(|c| row.get(c.key).map(CellValue::raw).unwrap_or_default()),
                )
                .into_diagnostic()?;
        }

        let bytes = writer.into_inner().into_diagnostic()?;
        String::from_utf8(bytes).into_diagnostic()
    }

    fn render_md(&self, table: &AssetTable) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.columns.iter().map(|c| c.header));

        for record in table {
            let row = TableRow::from(record);
            builder.push_record(
                self.columns
                    .iter()
                    .map(|c| row.get(c.key).map(CellValue::format_md).unwrap_or_else(|| "-".to_string())),
            );
        }

        let mut out = builder.build().with(Style::markdown()).to_string();
        out.push('\n');
        out
    }
}

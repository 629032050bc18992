//! Registry loader - reads the asset table from SQLite and normalizes it
//!
//! The loader opens the database read-only, materializes every row with a
//! non-zero tag (tag descending), closes the connection and then normalizes
//! the whole batch. Acquisition dates are parsed in one pass before any age
//! is computed, so under the strict policy a single bad date fails the load
//! without producing a partial table.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{Local, NaiveDate};
use miette::Diagnostic;
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::normalize::{
    age_in_years, format_date, normalize_amount, normalize_document, normalize_tag,
    normalize_text, parse_acquisition_date, passthrough_text, DateCell, DateParsePolicy,
    NullTextPolicy,
};
use crate::core::record::{AssetRecord, AssetTable};

/// Default database file, relative to the working directory
pub const DEFAULT_DATABASE: &str = "cadastro_patrimonio.sqlite";

/// Default registry table name
pub const DEFAULT_TABLE: &str = "cadastro_patrimonio";

/// Registry columns in projection order
pub const COLUMNS: [&str; 12] = [
    "Plaqueta",
    "Desc. Bem",
    "Filial",
    "Desc. Local",
    "Portador",
    "Data últ. Loc",
    "Fornecedor",
    "Documento",
    "Data Aquisição",
    "Valor Aquisição",
    "Cód. Bem",
    "Série Fabricação",
];

const COL_TAG: usize = 0;
const COL_DESCRIPTION: usize = 1;
const COL_BRANCH: usize = 2;
const COL_LOCATION: usize = 3;
const COL_HOLDER: usize = 4;
const COL_LAST_LOCATION: usize = 5;
const COL_SUPPLIER: usize = 6;
const COL_DOCUMENT: usize = 7;
const COL_ACQUIRED: usize = 8;
const COL_VALUE: usize = 9;
const COL_PRODUCT_CODE: usize = 10;
const COL_SERIAL: usize = 11;

/// Errors raised while loading the registry
#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("registry database not found at {path:?}")]
    #[diagnostic(
        code(areg::source::missing),
        help("pass --database or set `database:` in areg.yaml")
    )]
    MissingDatabase { path: PathBuf },

    #[error("cannot open registry database {path:?}")]
    #[diagnostic(code(areg::source::unreachable))]
    Unreachable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("registry table {table:?} is missing or lacks the expected columns")]
    #[diagnostic(
        code(areg::source::schema),
        help("the table must provide the registry columns: Plaqueta, Desc. Bem, Filial, Desc. Local, Portador, Data últ. Loc, Fornecedor, Documento, Data Aquisição, Valor Aquisição, Cód. Bem, Série Fabricação")
    )]
    Schema {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("invalid acquisition date {value:?} in row {row} (tag {tag:?})")]
    #[diagnostic(
        code(areg::load::date),
        help("acquisition dates must be DD/MM/YYYY calendar dates; set `date_parsing: lenient` to load the remaining rows")
    )]
    DateParse { row: usize, tag: String, value: String },

    #[error("non-numeric {column} {value:?} in row {row} (tag {tag:?})")]
    #[diagnostic(code(areg::load::number))]
    InvalidNumber {
        column: &'static str,
        row: usize,
        tag: String,
        value: String,
    },
}

impl LoadError {
    /// True for failures of the store itself rather than of its contents
    pub fn is_data_source(&self) -> bool {
        matches!(
            self,
            LoadError::MissingDatabase { .. } | LoadError::Unreachable { .. } | LoadError::Schema { .. }
        )
    }
}

/// Anything that can produce a normalized registry table
pub trait TableSource {
    fn load(&self) -> Result<AssetTable, LoadError>;
}

/// Options applied while normalizing raw rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub null_text: NullTextPolicy,
    pub date_parsing: DateParsePolicy,
    /// Reference date for ages; `None` means the local date at load time
    pub today: Option<NaiveDate>,
}

impl NormalizeOptions {
    fn reference_date(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// One row as read from the store, in [`COLUMNS`] order
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    values: Vec<Value>,
}

impl RawRow {
    /// Build a row from exactly twelve values in [`COLUMNS`] order
    pub fn new(values: Vec<Value>) -> Self {
        debug_assert_eq!(values.len(), COLUMNS.len());
        Self { values }
    }

    fn get(&self, column: usize) -> &Value {
        self.values.get(column).unwrap_or(&Value::Null)
    }
}

/// The SQLite-backed registry
#[derive(Debug, Clone)]
pub struct RegistrySource {
    path: PathBuf,
    table: String,
    options: NormalizeOptions,
}

impl RegistrySource {
    pub fn new(path: impl Into<PathBuf>, table: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            table: table.into(),
            options: NormalizeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Open and close a connection without reading anything
    pub fn check(&self) -> Result<(), LoadError> {
        let conn = self.open()?;
        self.close(conn)
    }

    fn open(&self) -> Result<Connection, LoadError> {
        if !self.path.is_file() {
            return Err(LoadError::MissingDatabase {
                path: self.path.clone(),
            });
        }

        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| LoadError::Unreachable {
            path: self.path.clone(),
            source,
        })
    }

    fn close(&self, conn: Connection) -> Result<(), LoadError> {
        conn.close().map_err(|(_, source)| LoadError::Unreachable {
            path: self.path.clone(),
            source,
        })
    }

    fn select_sql(&self) -> String {
        let tag = quote_ident(COLUMNS[COL_TAG]);
        let projection = COLUMNS
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "SELECT {} FROM {} WHERE {} <> 0 ORDER BY {} DESC",
            projection,
            quote_ident(&self.table),
            tag,
            tag
        )
    }

    /// Materialize every matching row, closing the connection afterwards
    pub fn fetch_rows(&self) -> Result<Vec<RawRow>, LoadError> {
        let conn = self.open()?;
        let sql = self.select_sql();
        debug!(%sql, "querying registry");

        let rows = {
            let mut stmt = conn.prepare(&sql).map_err(|source| LoadError::Schema {
                table: self.table.clone(),
                source,
            })?;

            let mapped = stmt
                .query_map([], |row| {
                    let values = (0..COLUMNS.len())
                        .map(|i| row.get::<_, Value>(i))
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    Ok(RawRow::new(values))
                })
                .map_err(|source| LoadError::Unreachable {
                    path: self.path.clone(),
                    source,
                })?;

            mapped
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|source| LoadError::Schema {
                    table: self.table.clone(),
                    source,
                })?
        };

        self.close(conn)?;
        Ok(rows)
    }
}

impl TableSource for RegistrySource {
    fn load(&self) -> Result<AssetTable, LoadError> {
        let started = Instant::now();
        let rows = self.fetch_rows()?;
        let fetched = rows.len();
        let table = normalize_rows(rows, &self.options)?;

        info!(
            rows = fetched,
            elapsed_ms = started.elapsed().as_millis() as u64,
            path = %self.path.display(),
            "registry loaded"
        );
        Ok(table)
    }
}

/// Normalize a batch of raw rows into a table
///
/// Dates are validated for the whole batch first; only then are records
/// built and ages computed.
pub fn normalize_rows(rows: Vec<RawRow>, options: &NormalizeOptions) -> Result<AssetTable, LoadError> {
    let dates = parse_dates(&rows, options.date_parsing)?;
    let today = options.reference_date();

    rows.into_iter()
        .zip(dates)
        .enumerate()
        .map(|(index, (row, date))| build_record(index + 1, &row, date, today, options))
        .collect::<Result<Vec<_>, _>>()
        .map(AssetTable::new)
}

fn parse_dates(rows: &[RawRow], policy: DateParsePolicy) -> Result<Vec<DateCell>, LoadError> {
    let mut cells = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let cell = parse_acquisition_date(row.get(COL_ACQUIRED));
        if let DateCell::Invalid(ref value) = cell {
            let tag = normalize_tag(row.get(COL_TAG));
            match policy {
                DateParsePolicy::Strict => {
                    return Err(LoadError::DateParse {
                        row: index + 1,
                        tag,
                        value: value.clone(),
                    });
                }
                DateParsePolicy::Lenient => {
                    warn!(row = index + 1, %tag, %value, "unparseable acquisition date, age set to 0");
                }
            }
        }
        cells.push(cell);
    }

    Ok(cells)
}

fn build_record(
    row_number: usize,
    row: &RawRow,
    date: DateCell,
    today: NaiveDate,
    options: &NormalizeOptions,
) -> Result<AssetRecord, LoadError> {
    let tag = normalize_tag(row.get(COL_TAG));
    let text = |column: usize| normalize_text(row.get(column), options.null_text);

    let document_number =
        normalize_document(row.get(COL_DOCUMENT)).map_err(|value| LoadError::InvalidNumber {
            column: COLUMNS[COL_DOCUMENT],
            row: row_number,
            tag: tag.clone(),
            value,
        })?;

    let acquisition_value =
        normalize_amount(row.get(COL_VALUE)).map_err(|value| LoadError::InvalidNumber {
            column: COLUMNS[COL_VALUE],
            row: row_number,
            tag: tag.clone(),
            value,
        })?;

    let (acquisition_date, age_years) = match date {
        DateCell::Parsed(acquired) => (Some(format_date(acquired)), age_in_years(acquired, today)),
        DateCell::Invalid(raw) => (Some(raw), 0.0),
        DateCell::Absent => (None, 0.0),
    };

    Ok(AssetRecord {
        description: text(COL_DESCRIPTION),
        branch: text(COL_BRANCH),
        location_description: text(COL_LOCATION),
        holder: text(COL_HOLDER),
        last_location_date: passthrough_text(row.get(COL_LAST_LOCATION)),
        supplier: text(COL_SUPPLIER),
        document_number,
        acquisition_date,
        acquisition_value,
        product_code: text(COL_PRODUCT_CODE),
        serial_number: text(COL_SERIAL),
        age_years,
        selected: true,
        tag,
    })
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

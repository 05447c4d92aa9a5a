//! Store table loading, column resolution and field parsing using Polars

use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use tracing::debug;

use crate::error::ReportError;

pub const CREATED_COLUMN: &str = "created";
pub const APPS_COLUMN: &str = "installed_apps_names";
pub const TECHNOLOGIES_COLUMN: &str = "technologies";
pub const PAGEVIEWS_COLUMN: &str = "estimated_monthly_pageviews";
pub const SALES_COLUMN: &str = "estimated_monthly_sales";

/// Derived column holding each store's creation month as a [`YearMonth`] ordinal
pub const CREATED_MONTH_COLUMN: &str = "created_month";

/// Accepted names for the region field, in priority order
pub const REGION_COLUMNS: [&str; 2] = ["pm_state", "state"];

/// Day-first layouts tried in order when parsing creation dates
///
/// chrono's `%Y` accepts any number of digits, so each two-digit `%y` layout
/// comes before its four-digit twin; `%y` rejects a four-digit year.
const DATE_FORMATS: [&str; 7] = [
    "%d/%m/%y",
    "%d/%m/%Y",
    "%d-%m-%y",
    "%d-%m-%Y",
    "%d.%m.%y",
    "%d.%m.%Y",
    "%Y-%m-%d",
];

const DATETIME_FORMATS: [&str; 7] = [
    "%d/%m/%y %H:%M",
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%SZ",
];

/// The loaded record table: one row per store
#[derive(Debug, Clone)]
pub struct StoreTable {
    frame: DataFrame,
}

impl StoreTable {
    /// Wrap an already materialised frame
    pub fn from_frame(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// Number of store rows
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Copy of the named columns as a frame of their own
    pub fn select(&self, columns: &[&str]) -> crate::Result<DataFrame> {
        Ok(self.frame.select(columns.iter().copied())?)
    }

    /// Read a column as optional text, exactly as stored
    pub fn text_column(&self, name: &str) -> crate::Result<Vec<Option<String>>> {
        let column = self.frame.column(name)?.cast(&DataType::String)?;
        let values = column
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|value| value.map(str::to_owned))
            .collect();
        Ok(values)
    }

    /// A column as `Float64`; cells that do not parse become null
    pub fn numeric_column(&self, name: &str) -> crate::Result<Column> {
        let column = self.frame.column(name)?;
        let column = match column.dtype() {
            DataType::String => parse_numeric_text(column.as_materialized_series().str()?),
            _ => column.cast(&DataType::Float64)?,
        };
        let values: Float64Chunked = column
            .as_materialized_series()
            .f64()?
            .into_iter()
            .map(|value| value.filter(|v| !v.is_nan()))
            .collect();
        Ok(values.with_name(name.into()).into_series().into())
    }

    /// Creation dates parsed day-first; unparsable cells become `None`
    pub fn created_dates(&self) -> crate::Result<Vec<Option<NaiveDate>>> {
        let dates = self
            .text_column(CREATED_COLUMN)?
            .iter()
            .map(|value| value.as_deref().and_then(parse_day_first_date))
            .collect();
        Ok(dates)
    }

    /// Creation months as the `created_month` column of month ordinals
    pub fn created_months(&self) -> crate::Result<Column> {
        let months: Int64Chunked = self
            .created_dates()?
            .into_iter()
            .map(|date| date.map(|date| YearMonth::from_date(date).ordinal()))
            .collect();
        Ok(months.with_name(CREATED_MONTH_COLUMN.into()).into_series().into())
    }
}

/// Numbers exported as text may carry thousands separators or a currency sign
fn parse_numeric_text(values: &StringChunked) -> Column {
    let parsed: Float64Chunked = values
        .into_iter()
        .map(|value| {
            value.and_then(|text| {
                let cleaned: String = text
                    .trim()
                    .chars()
                    .filter(|c| !matches!(c, ',' | '$' | ' '))
                    .collect();
                cleaned.parse::<f64>().ok()
            })
        })
        .collect();
    parsed.with_name(values.name().clone()).into_series().into()
}

/// Load the store export from disk
///
/// # Arguments
/// * `file_path` - Path to the CSV file; the header row names the columns
///
/// # Returns
/// * `StoreTable` on success, or a fatal `ReportError` when the file is absent
///   or cannot be parsed as CSV
pub fn load_store_table(file_path: &Path) -> Result<StoreTable, ReportError> {
    if !file_path.is_file() {
        return Err(ReportError::FileNotFound {
            path: file_path.to_path_buf(),
        });
    }

    let unparsable = |source: PolarsError| ReportError::Unparsable {
        path: file_path.to_path_buf(),
        source,
    };

    // Scan the whole file for the schema so late float cells do not break an integer guess
    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(file_path.to_path_buf()))
        .map_err(unparsable)?
        .finish()
        .map_err(unparsable)?;

    let table = StoreTable::from_frame(frame);
    debug!(
        rows = table.height(),
        columns = ?table.column_names(),
        "loaded store table from {}",
        file_path.display()
    );
    Ok(table)
}

/// Pick the first accepted region column present in the table
pub fn resolve_region_column(table: &StoreTable) -> Result<&'static str, ReportError> {
    REGION_COLUMNS
        .iter()
        .copied()
        .find(|name| table.has_column(name))
        .ok_or_else(|| ReportError::MissingRegionColumn {
            candidates: REGION_COLUMNS.to_vec(),
        })
}

/// Split free text on `:`, `,` or `;` into trimmed, non-empty tokens
pub fn parse_tokens(text: Option<&str>) -> Vec<String> {
    let Some(text) = text else {
        return Vec::new();
    };
    text.split([':', ',', ';'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Parse a day-first date such as `31/01/2021` (an optional time part is ignored)
pub fn parse_day_first_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|datetime| datetime.date())
        })
}

/// Calendar month bucket of a store creation date
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Months since year 0, used as a continuous plotting axis
    pub fn ordinal(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        let year = i32::try_from(ordinal.div_euclid(12)).ok()?;
        let month = u32::try_from(ordinal.rem_euclid(12)).ok()? + 1;
        Some(Self { year, month })
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

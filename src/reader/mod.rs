//! Streaming access to the delimited source tables.
//!
//! A [`TableReader`] wraps a CSV source with a header row. Its [`Rows`]
//! iterator materializes one [`Record`] at a time, so memory use is bounded by
//! the graph being built rather than by the size of the table. The iterator is
//! single-pass: once exhausted, the table must be reopened to read it again.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDateTime;
use rustc_hash::FxHashMap;

use crate::error::util::safe_open_file;
use crate::error::{IcuDbError, Result};
use crate::utils::date::parse_date_time;

/// The four source tables, in load order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Patients,
    Admissions,
    IcuStays,
    ChartEvents,
}

impl Table {
    /// All tables in the order they must be loaded
    pub const LOAD_ORDER: [Table; 4] = [
        Table::Patients,
        Table::Admissions,
        Table::IcuStays,
        Table::ChartEvents,
    ];

    /// Base name of the table, as used in file names and log lines
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Patients => "PATIENTS",
            Self::Admissions => "ADMISSIONS",
            Self::IcuStays => "ICUSTAYS",
            Self::ChartEvents => "CHARTEVENTS",
        }
    }

    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.csv", self.name())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Column name → position, shared by every record of a table
#[derive(Debug)]
struct Headers {
    index: FxHashMap<String, usize>,
}

impl Headers {
    fn from_record(record: &csv::StringRecord) -> Self {
        let index = record
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        Self { index }
    }
}

/// One row of a source table, addressable by column name
#[derive(Debug, Clone)]
pub struct Record {
    headers: Arc<Headers>,
    fields: csv::StringRecord,
}

impl Record {
    /// Raw value of `column`, or `None` when the column is absent
    ///
    /// An empty cell is returned as `Some("")`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.headers
            .index
            .get(column)
            .and_then(|&i| self.fields.get(i))
    }

    /// Raw value of a required column
    pub fn require(&self, column: &str) -> Result<&str> {
        self.get(column)
            .ok_or_else(|| IcuDbError::missing_field(column))
    }

    /// Required integer column
    pub fn require_i64(&self, column: &str) -> Result<i64> {
        let raw = self.require(column)?;
        parse_i64(column, raw)?.ok_or_else(|| IcuDbError::missing_field(column))
    }

    /// Required column holding an optional integer (empty cell → `None`)
    pub fn opt_i64(&self, column: &str) -> Result<Option<i64>> {
        parse_i64(column, self.require(column)?)
    }

    /// Required column holding an optional float (empty cell → `None`)
    pub fn opt_f64(&self, column: &str) -> Result<Option<f64>> {
        parse_f64(column, self.require(column)?)
    }

    /// Required column holding an optional date-time (empty cell → `None`)
    pub fn date_time(&self, column: &str) -> Result<Option<NaiveDateTime>> {
        parse_date_time(self.require(column)?)
    }

    /// Required free-text column
    pub fn text(&self, column: &str) -> Result<String> {
        self.require(column).map(str::to_string)
    }
}

fn parse_i64(column: &str, raw: &str) -> Result<Option<i64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| IcuDbError::invalid_number(column, raw))
}

/// Parse an optional float; `NaN` and infinities are rejected
pub(crate) fn parse_f64(column: &str, raw: &str) -> Result<Option<f64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(Some(number)),
        _ => Err(IcuDbError::invalid_number(column, raw)),
    }
}

/// A delimited table with a header row
pub struct TableReader<R: Read> {
    table: Table,
    reader: csv::Reader<R>,
    headers: Arc<Headers>,
}

impl TableReader<BufReader<File>> {
    /// Open `<dir>/<TABLE>.csv`
    pub fn open(dir: &Path, table: Table, delimiter: u8) -> Result<Self> {
        let path = dir.join(table.file_name());
        let file = safe_open_file(&path, &format!("reading {table}"))?;
        Self::from_reader(table, BufReader::new(file), delimiter)
    }
}

impl<R: Read> TableReader<R> {
    /// Wrap any reader producing delimited text with a header row
    pub fn from_reader(table: Table, source: R, delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(source);
        let headers = Arc::new(Headers::from_record(reader.headers()?));
        Ok(Self {
            table,
            reader,
            headers,
        })
    }

    /// Consume the table as a lazy sequence of `(row index, record)` pairs
    #[must_use]
    pub fn rows(self) -> Rows<R> {
        Rows {
            table: self.table,
            inner: self.reader.into_records(),
            headers: self.headers,
            next_index: 0,
        }
    }
}

/// Single-pass iterator over the rows of a [`TableReader`]
///
/// Row indices start at 0 for the first data row. A row that cannot be
/// decoded is yielded as an error carrying its index.
pub struct Rows<R: Read> {
    table: Table,
    inner: csv::StringRecordsIntoIter<R>,
    headers: Arc<Headers>,
    next_index: usize,
}

impl<R: Read> Iterator for Rows<R> {
    type Item = Result<(usize, Record)>;

    fn next(&mut self) -> Option<Self::Item> {
        let fields = self.inner.next()?;
        let index = self.next_index;
        self.next_index += 1;
        Some(
            fields
                .map(|fields| {
                    (
                        index,
                        Record {
                            headers: Arc::clone(&self.headers),
                            fields,
                        },
                    )
                })
                .map_err(|e| IcuDbError::from(e).at_row(self.table, index)),
        )
    }
}

//! Header-indexed view over one CSV file.

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use csv::{Reader, StringRecord};
use yamdb_core::error::ValidationError;
use yamdb_core::types::DbId;

use crate::error::LoadError;

/// Header names are matched loosely: case-folded, spaces become
/// underscores and a trailing `_id` is dropped, so `Title ID`, `title_id`
/// and `title` all name the same column.
pub fn normalize_header(raw: &str) -> String {
    let name = raw.trim().to_lowercase().replace(' ', "_");
    match name.strip_suffix("_id") {
        Some(base) if !base.is_empty() => base.to_string(),
        _ => name,
    }
}

/// A parsed CSV file with normalized headers.
#[derive(Debug)]
pub struct CsvTable {
    file: &'static str,
    columns: HashMap<String, usize>,
    records: Vec<StringRecord>,
}

impl CsvTable {
    /// Read `dir/file`. Every header must be one of `allowed`.
    pub fn read(dir: &Path, file: &'static str, allowed: &[&str]) -> Result<Self, LoadError> {
        let path = dir.join(file);
        if !path.is_file() {
            return Err(LoadError::MissingFile { path });
        }
        let handle = File::open(&path).map_err(|e| LoadError::Csv {
            file,
            source: e.into(),
        })?;
        Self::from_reader(file, handle, allowed)
    }

    pub fn from_reader<R: Read>(
        file: &'static str,
        reader: R,
        allowed: &[&str],
    ) -> Result<Self, LoadError> {
        let csv_err = |source| LoadError::Csv { file, source };
        let mut reader = Reader::from_reader(reader);

        let headers = reader.headers().map_err(csv_err)?.clone();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(LoadError::EmptyFile { file });
        }

        let mut columns = HashMap::new();
        for (index, raw) in headers.iter().enumerate() {
            let name = normalize_header(raw);
            if !allowed.contains(&name.as_str()) {
                return Err(LoadError::UnknownColumn { file, column: name });
            }
            columns.insert(name, index);
        }

        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(csv_err)?;
        tracing::debug!(file, rows = records.len(), "CSV file read");

        Ok(Self {
            file,
            columns,
            records,
        })
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fail unless every column in `required` is present.
    pub fn require(&self, required: &[&str]) -> Result<(), LoadError> {
        match required.iter().find(|c| !self.columns.contains_key(**c)) {
            Some(column) => Err(LoadError::MissingColumn {
                file: self.file,
                column: column.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.records.iter().map(move |record| Row {
            table: self,
            record,
        })
    }
}

/// One record plus the accessors the row builders need.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a CsvTable,
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    pub fn line(&self) -> u64 {
        self.record.position().map_or(0, |p| p.line())
    }

    /// The raw cell, or `MissingColumn` when the header is absent.
    pub fn text(&self, column: &str) -> Result<&'a str, LoadError> {
        self.table
            .columns
            .get(column)
            .map(|&index| self.record.get(index).unwrap_or(""))
            .ok_or_else(|| LoadError::MissingColumn {
                file: self.table.file,
                column: column.to_string(),
            })
    }

    /// Absent column and empty cell both read as `None`.
    pub fn optional(&self, column: &str) -> Option<&'a str> {
        self.text(column).ok().filter(|value| !value.trim().is_empty())
    }

    pub fn parse<T>(&self, column: &str) -> Result<T, LoadError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let value = self.text(column)?;
        value
            .trim()
            .parse()
            .map_err(|e: T::Err| self.invalid(column, value, e.to_string()))
    }

    /// Parse a foreign key and check it against the ids loaded so far.
    pub fn reference(&self, column: &str, known: &HashSet<DbId>) -> Result<DbId, LoadError> {
        let id: DbId = self.parse(column)?;
        if known.contains(&id) {
            Ok(id)
        } else {
            Err(LoadError::UnknownReference {
                file: self.table.file,
                line: self.line(),
                column: column.to_string(),
                id,
            })
        }
    }

    pub fn invalid(&self, column: &str, value: &str, reason: impl Into<String>) -> LoadError {
        LoadError::InvalidValue {
            file: self.table.file,
            line: self.line(),
            column: column.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Lift a domain validation failure onto this row.
    pub fn check<T>(
        &self,
        column: &str,
        value: &str,
        result: Result<T, ValidationError>,
    ) -> Result<T, LoadError> {
        result.map_err(|e| self.invalid(column, value, e.to_string()))
    }
}

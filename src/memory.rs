//! In-memory row cursor.
//!
//! Useful for tests and for binding rows that were materialized elsewhere.
//! Failures can be injected at each cursor step, and scan/close calls are
//! counted.
//!
//! ```
//! use qail_scan::MemoryCursor;
//!
//! let mut rows = MemoryCursor::new(["name"])
//!     .row(["Bob"])
//!     .row(["Alice"]);
//! let names: Vec<String> = qail_scan::rows(&mut rows).unwrap();
//! assert_eq!(names, ["Bob", "Alice"]);
//! ```

use crate::cursor::RowCursor;
use crate::error::ConvertError;
use crate::nullable::Destination;
use crate::value::Value;
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MemoryError {
    /// The caller did not pass one destination per column.
    #[error("Expected {expected} destinations, got {got}")]
    DestinationCount { expected: usize, got: usize },

    #[error("Scan called without a current row")]
    NoCurrentRow,

    #[error("Column '{column}': {source}")]
    Convert {
        column: String,
        #[source]
        source: ConvertError,
    },

    /// A failure set up with one of the `fail_*` methods.
    #[error("{0}")]
    Injected(String),
}

/// A cursor over rows held in memory.
///
/// Rows shorter than the column list read their missing trailing values as
/// NULL; extra values are ignored.
#[derive(Debug, Default)]
pub struct MemoryCursor {
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
    current: Option<Vec<Value>>,
    columns_error: Option<String>,
    scan_error: Option<String>,
    terminal_error: Option<String>,
    close_error: Option<String>,
    scan_calls: usize,
    close_calls: usize,
    closed: bool,
}

impl MemoryCursor {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Append a row.
    pub fn row<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.rows.push_back(values.into_iter().map(Into::into).collect());
        self
    }

    /// Append several rows of ready-made values.
    pub fn rows(mut self, rows: impl IntoIterator<Item = Vec<Value>>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn fail_columns(mut self, message: impl Into<String>) -> Self {
        self.columns_error = Some(message.into());
        self
    }

    pub fn fail_scan(mut self, message: impl Into<String>) -> Self {
        self.scan_error = Some(message.into());
        self
    }

    /// Report this error from `err()` once the rows are exhausted.
    pub fn fail_terminal(mut self, message: impl Into<String>) -> Self {
        self.terminal_error = Some(message.into());
        self
    }

    pub fn fail_close(mut self, message: impl Into<String>) -> Self {
        self.close_error = Some(message.into());
        self
    }

    pub fn scan_calls(&self) -> usize {
        self.scan_calls
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Rows not yet advanced past.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl RowCursor for MemoryCursor {
    type Error = MemoryError;

    fn columns(&mut self) -> Result<Vec<String>, MemoryError> {
        match &self.columns_error {
            Some(message) => Err(MemoryError::Injected(message.clone())),
            None => Ok(self.columns.clone()),
        }
    }

    fn advance(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.current = self.rows.pop_front();
        self.current.is_some()
    }

    fn scan(&mut self, dest: &mut [Destination<'_>]) -> Result<(), MemoryError> {
        self.scan_calls += 1;
        if let Some(message) = &self.scan_error {
            return Err(MemoryError::Injected(message.clone()));
        }
        let row = self.current.as_ref().ok_or(MemoryError::NoCurrentRow)?;
        if dest.len() != self.columns.len() {
            return Err(MemoryError::DestinationCount {
                expected: self.columns.len(),
                got: dest.len(),
            });
        }

        for (i, slot) in dest.iter_mut().enumerate() {
            let value = row.get(i).cloned().unwrap_or_default();
            slot.set(value).map_err(|source| MemoryError::Convert {
                column: self.columns[i].clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn err(&mut self) -> Result<(), MemoryError> {
        match &self.terminal_error {
            Some(message) => Err(MemoryError::Injected(message.clone())),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> Result<(), MemoryError> {
        self.close_calls += 1;
        self.closed = true;
        self.current = None;
        self.rows.clear();
        match &self.close_error {
            Some(message) => Err(MemoryError::Injected(message.clone())),
            None => Ok(()),
        }
    }
}

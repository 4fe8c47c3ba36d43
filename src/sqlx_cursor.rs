//! Row cursor over sqlx results.
//!
//! [`SqlxCursor`] adapts rows fetched through sqlx's `Any` driver, so one
//! cursor type serves PostgreSQL, MySQL and SQLite URLs alike.
//!
//! The `Any` driver maps column types before rows reach the cursor, and it
//! has no mapping for SQLite's declared `BOOLEAN`: such a query fails inside
//! `fetch_all`. Store SQLite flags as `INTEGER` 0/1; they bind into `bool`
//! fields through the integer conversion.
//!
//! ```rust,ignore
//! use qail_scan::{Record, SqlxCursor};
//!
//! sqlx::any::install_default_drivers();
//! let pool = sqlx::any::AnyPoolOptions::new()
//!     .max_connections(5)
//!     .connect("postgres://localhost/app")
//!     .await?;
//!
//! let mut cursor = SqlxCursor::fetch(&pool, "SELECT id, first_name FROM users").await?;
//! let users: Vec<User> = qail_scan::rows(&mut cursor)?;
//! ```

use crate::cursor::RowCursor;
use crate::nullable::Destination;
use crate::value::Value;

use sqlx::any::{AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, Column, Executor, Row, TypeInfo, ValueRef};

/// A cursor over rows already fetched with sqlx.
///
/// Column names come from the first row. An empty result therefore reports
/// no columns, which binds to an empty list either way.
pub struct SqlxCursor {
    columns: Vec<String>,
    rows: std::vec::IntoIter<AnyRow>,
    current: Option<AnyRow>,
}

impl SqlxCursor {
    pub fn new(rows: Vec<AnyRow>) -> Self {
        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect()
            })
            .unwrap_or_default();
        Self {
            columns,
            rows: rows.into_iter(),
            current: None,
        }
    }

    /// Run a query and wrap its rows.
    pub async fn fetch<'c, E>(executor: E, sql: &str) -> Result<Self, sqlx::Error>
    where
        E: Executor<'c, Database = Any>,
    {
        Self::fetch_with(executor, sql, &[]).await
    }

    /// Run a query with positional parameters and wrap its rows.
    ///
    /// NULL parameters are bound as a NULL text value.
    pub async fn fetch_with<'c, E>(
        executor: E,
        sql: &str,
        params: &[Value],
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'c, Database = Any>,
    {
        let mut query = sqlx::query::<Any>(sql);
        for param in params {
            query = bind(query, param);
        }
        let rows = query.fetch_all(executor).await?;
        tracing::debug!("Fetched {} rows", rows.len());
        Ok(Self::new(rows))
    }

    /// Rows not yet advanced past.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

fn bind<'q>(
    query: Query<'q, Any, AnyArguments<'q>>,
    value: &Value,
) -> Query<'q, Any, AnyArguments<'q>> {
    match value {
        Value::Null => query.bind(Option::<String>::None),
        Value::Bool(v) => query.bind(*v),
        Value::Int(v) => query.bind(*v),
        Value::UInt(v) => match i64::try_from(*v) {
            Ok(v) => query.bind(v),
            Err(_) => query.bind(v.to_string()),
        },
        Value::Float(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.clone()),
        Value::Bytes(v) => query.bind(v.clone()),
    }
}

/// Read one cell, NULL first, then by the column's declared type, then by
/// whatever decodes.
fn cell(row: &AnyRow, index: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_name = raw.type_info().name().to_ascii_uppercase();

    let typed = match type_name.as_str() {
        "BOOL" | "BOOLEAN" => row.try_get::<bool, _>(index).map(Value::Bool),
        "INT2" | "INT4" | "INT8" | "INTEGER" | "BIGINT" | "SMALLINT" => {
            row.try_get::<i64, _>(index).map(Value::Int)
        }
        "FLOAT4" | "FLOAT8" | "REAL" | "DOUBLE" => row.try_get::<f64, _>(index).map(Value::Float),
        "BLOB" | "BYTEA" => row.try_get::<Vec<u8>, _>(index).map(Value::Bytes),
        _ => row.try_get::<String, _>(index).map(Value::Text),
    };
    typed.or_else(|_| {
        row.try_get::<String, _>(index)
            .map(Value::Text)
            .or_else(|_| row.try_get::<i64, _>(index).map(Value::Int))
            .or_else(|_| row.try_get::<f64, _>(index).map(Value::Float))
            .or_else(|_| row.try_get::<Vec<u8>, _>(index).map(Value::Bytes))
    })
}

impl RowCursor for SqlxCursor {
    type Error = sqlx::Error;

    fn columns(&mut self) -> Result<Vec<String>, sqlx::Error> {
        Ok(self.columns.clone())
    }

    fn advance(&mut self) -> bool {
        self.current = self.rows.next();
        self.current.is_some()
    }

    fn scan(&mut self, dest: &mut [Destination<'_>]) -> Result<(), sqlx::Error> {
        let row = self
            .current
            .as_ref()
            .ok_or_else(|| sqlx::Error::Protocol("scan called without a current row".into()))?;
        if dest.len() != self.columns.len() {
            return Err(sqlx::Error::ColumnIndexOutOfBounds {
                index: dest.len(),
                len: self.columns.len(),
            });
        }

        for (index, slot) in dest.iter_mut().enumerate() {
            let value = cell(row, index)?;
            slot.set(value).map_err(|e| sqlx::Error::ColumnDecode {
                index: self.columns[index].clone(),
                source: Box::new(e),
            })?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), sqlx::Error> {
        self.current = None;
        self.rows = Vec::new().into_iter();
        Ok(())
    }
}

impl std::fmt::Debug for SqlxCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlxCursor")
            .field("columns", &self.columns)
            .field("remaining", &self.rows.len())
            .finish_non_exhaustive()
    }
}

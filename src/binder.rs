//! Binding cursor rows into values.
//!
//! The target type decides the shape of a bind:
//!
//! - a record (`#[derive(Record)]`) takes one location per column, resolved by
//!   override or mapped name, with unmatched columns discarded;
//! - anything else is primitive-like and reads the single column of the
//!   result, so a result with more than one column is rejected up front.
//!
//! Every location is wrapped with [`nullable`] before it reaches the cursor.

use crate::config::{self, Config};
use crate::cursor::RowCursor;
use crate::error::ScanError;
use crate::field::Field;
use crate::nullable::{nullable, Destination};
use crate::resolver::Plan;

/// Binds cursor rows using one [`Config`].
#[derive(Debug, Clone, Default)]
pub struct Binder {
    config: Config,
}

impl Binder {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Bind the first row. Fails with [`ScanError::NoRows`] if there is none.
    pub fn row<T, C>(&self, cursor: &mut C) -> Result<T, ScanError<C::Error>>
    where
        T: Field + Default,
        C: RowCursor + ?Sized,
    {
        bind_row(&self.config, cursor)
    }

    /// Bind every row, in cursor order.
    pub fn rows<T, C>(&self, cursor: &mut C) -> Result<Vec<T>, ScanError<C::Error>>
    where
        T: Field + Default,
        C: RowCursor + ?Sized,
    {
        bind_rows(&self.config, cursor)
    }

    /// Bind the first row, or `None` if there is none.
    pub fn optional<T, C>(&self, cursor: &mut C) -> Result<Option<T>, ScanError<C::Error>>
    where
        T: Field + Default,
        C: RowCursor + ?Sized,
    {
        bind_optional(&self.config, cursor)
    }
}

/// Bind the first row with the process-wide configuration.
pub fn row<T, C>(cursor: &mut C) -> Result<T, ScanError<C::Error>>
where
    T: Field + Default,
    C: RowCursor + ?Sized,
{
    bind_row(config::global(), cursor)
}

/// Bind every row with the process-wide configuration.
pub fn rows<T, C>(cursor: &mut C) -> Result<Vec<T>, ScanError<C::Error>>
where
    T: Field + Default,
    C: RowCursor + ?Sized,
{
    bind_rows(config::global(), cursor)
}

/// Bind the first row, if any, with the process-wide configuration.
pub fn optional<T, C>(cursor: &mut C) -> Result<Option<T>, ScanError<C::Error>>
where
    T: Field + Default,
    C: RowCursor + ?Sized,
{
    bind_optional(config::global(), cursor)
}

fn bind_row<T, C>(config: &Config, cursor: &mut C) -> Result<T, ScanError<C::Error>>
where
    T: Field + Default,
    C: RowCursor + ?Sized,
{
    bind_optional(config, cursor)?.ok_or(ScanError::NoRows)
}

fn bind_optional<T, C>(config: &Config, cursor: &mut C) -> Result<Option<T>, ScanError<C::Error>>
where
    T: Field + Default,
    C: RowCursor + ?Sized,
{
    Ok(bind_rows::<T, C>(config, cursor)?.into_iter().next())
}

fn bind_rows<T, C>(config: &Config, cursor: &mut C) -> Result<Vec<T>, ScanError<C::Error>>
where
    T: Field + Default,
    C: RowCursor + ?Sized,
{
    let result = collect(config, cursor);
    release(config, cursor);
    result
}

fn collect<T, C>(config: &Config, cursor: &mut C) -> Result<Vec<T>, ScanError<C::Error>>
where
    T: Field + Default,
    C: RowCursor + ?Sized,
{
    let target = std::any::type_name::<T>();
    let columns = cursor.columns().map_err(ScanError::Cursor)?;

    let plan = match T::schema() {
        Some(schema) => Some(Plan::new(schema, &columns, &**config.mapper())),
        None if columns.len() > 1 => {
            return Err(ScanError::TooManyColumns {
                columns: columns.len(),
            });
        }
        None => None,
    };
    tracing::debug!("Binding {} from {} columns", target, columns.len());

    let mut items = Vec::new();
    while cursor.advance() {
        let mut item = T::default();
        let mut dest: Vec<Destination<'_>> = match &plan {
            Some(plan) => plan.locations(&mut item).into_iter().map(nullable).collect(),
            None if columns.is_empty() => Vec::new(),
            None => vec![nullable(item.location())],
        };

        if dest.is_empty() {
            tracing::trace!("Skipping row with no columns");
            continue;
        }

        cursor.scan(&mut dest).map_err(ScanError::Cursor)?;
        drop(dest);
        items.push(item);
    }
    cursor.err().map_err(ScanError::Cursor)?;

    tracing::debug!("Bound {} rows into {}", items.len(), target);
    Ok(items)
}

/// Close the cursor if the configuration asks for it. Close errors never
/// replace the bind result.
fn release<C: RowCursor + ?Sized>(config: &Config, cursor: &mut C) {
    if !config.is_auto_close() {
        return;
    }
    if let Err(err) = cursor.close() {
        tracing::debug!("Closing cursor failed: {}", err);
        config.notify_close_error(&err);
    }
}

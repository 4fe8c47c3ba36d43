//! Error types for qail-scan.

use thiserror::Error;

/// Error returned by a bind.
///
/// `E` is the cursor's own error type. Cursor failures are carried through
/// untouched so callers can match on them exactly as the driver produced them.
#[derive(Debug, Error)]
pub enum ScanError<E> {
    /// The cursor failed while reading columns, scanning a row, or iterating.
    #[error(transparent)]
    Cursor(E),

    /// More than one column was returned for a primitive target.
    /// For example, binding `select first, last from people` to `String`.
    #[error("too many columns returned for primitive target: {columns} columns")]
    TooManyColumns { columns: usize },

    /// A single-row bind produced no rows.
    #[error("no rows in result set")]
    NoRows,
}

impl<E> ScanError<E> {
    /// True for the "no rows" condition of a single-row bind.
    pub fn is_no_rows(&self) -> bool {
        matches!(self, Self::NoRows)
    }

    /// Unwrap the cursor error, if that is what this is.
    pub fn into_cursor(self) -> Option<E> {
        match self {
            Self::Cursor(e) => Some(e),
            _ => None,
        }
    }
}

/// A column value could not be assigned to its destination.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    /// NULL reached a destination that cannot represent it.
    #[error("Unexpected NULL for non-nullable {target}")]
    UnexpectedNull { target: &'static str },

    /// The value kind has no conversion to the target type.
    #[error("Cannot convert {from} to {target}")]
    Incompatible {
        from: &'static str,
        target: &'static str,
    },

    /// The value does not fit the target type.
    #[error("Value {value} out of range for {target}")]
    OutOfRange { value: String, target: &'static str },

    /// The value was the right kind but could not be parsed.
    #[error("Invalid {target}: {message}")]
    Invalid {
        target: &'static str,
        message: String,
    },
}

impl ConvertError {
    pub(crate) fn incompatible<T>(from: &'static str) -> Self {
        Self::Incompatible {
            from,
            target: std::any::type_name::<T>(),
        }
    }

    pub(crate) fn invalid<T>(message: impl ToString) -> Self {
        Self::Invalid {
            target: std::any::type_name::<T>(),
            message: message.to_string(),
        }
    }

    pub(crate) fn out_of_range<T>(value: impl ToString) -> Self {
        Self::OutOfRange {
            value: value.to_string(),
            target: std::any::type_name::<T>(),
        }
    }
}

/// Configuration loading or installation failed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid scan settings: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The process-wide configuration was already set.
    #[error("Scan configuration already installed")]
    AlreadyInstalled,
}

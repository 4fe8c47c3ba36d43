//! Column values and the conversions a store performs on assignment.
//!
//! Cursors hand every column to its destination as a [`Value`]. Destinations
//! that are plain Rust types turn it into themselves through [`FromValue`],
//! which follows the usual database coercions: integers are range-checked,
//! numeric text is parsed, UTF-8 bytes become strings, and NULL is rejected
//! unless the target is an `Option`.

use crate::error::ConvertError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// A single column value as produced by a cursor.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Short name of the variant, used in conversion errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the value as text. Bytes are accepted when they are valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "'{}'", v),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

// ==================== Into Value ====================

macro_rules! value_from {
    ($variant:ident as $wide:ty: $($t:ty),*) => {$(
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::$variant(<$wide>::from(v))
            }
        }
    )*};
}

value_from!(Int as i64: i8, i16, i32, i64, u8, u16, u32);
value_from!(UInt as u64: u64);
value_from!(Float as f64: f32, f64);
value_from!(Bool as bool: bool);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

// ==================== FromValue ====================

/// Conversion from a column value into a Rust type.
///
/// This is the assignment a store performs directly. It has no notion of
/// "leave the field alone": NULL is an error for every non-`Option` target.
/// The null-safe wrapper in [`crate::nullable`] is what turns NULL into a
/// zero value for plain fields.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ConvertError>;
}

fn null<T>() -> ConvertError {
    ConvertError::UnexpectedNull {
        target: std::any::type_name::<T>(),
    }
}

fn text_of<T>(value: &Value) -> Result<&str, ConvertError> {
    match value {
        Value::Text(s) => Ok(s),
        Value::Bytes(b) => std::str::from_utf8(b).map_err(ConvertError::invalid::<T>),
        other => Err(ConvertError::incompatible::<T>(other.kind())),
    }
}

// ==================== Integer Types ====================

macro_rules! from_value_int {
    ($($t:ty),*) => {$(
        impl FromValue for $t {
            fn from_value(value: Value) -> Result<Self, ConvertError> {
                let wide: i128 = match value {
                    Value::Null => return Err(null::<$t>()),
                    Value::Int(v) => i128::from(v),
                    Value::UInt(v) => i128::from(v),
                    Value::Bool(v) => i128::from(v),
                    Value::Float(v) => {
                        if !v.is_finite() || v.fract() != 0.0 {
                            return Err(ConvertError::out_of_range::<$t>(v));
                        }
                        v as i128
                    }
                    ref text @ (Value::Text(_) | Value::Bytes(_)) => {
                        let s = text_of::<$t>(text)?.trim();
                        return s.parse::<$t>().map_err(ConvertError::invalid::<$t>);
                    }
                };
                <$t>::try_from(wide).map_err(|_| ConvertError::out_of_range::<$t>(wide))
            }
        }
    )*};
}

from_value_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

// ==================== Float Types ====================

macro_rules! from_value_float {
    ($($t:ty),*) => {$(
        impl FromValue for $t {
            fn from_value(value: Value) -> Result<Self, ConvertError> {
                match value {
                    Value::Null => Err(null::<$t>()),
                    Value::Float(v) => Ok(v as $t),
                    Value::Int(v) => Ok(v as $t),
                    Value::UInt(v) => Ok(v as $t),
                    ref text @ (Value::Text(_) | Value::Bytes(_)) => text_of::<$t>(text)?
                        .trim()
                        .parse::<$t>()
                        .map_err(ConvertError::invalid::<$t>),
                    other => Err(ConvertError::incompatible::<$t>(other.kind())),
                }
            }
        }
    )*};
}

from_value_float!(f32, f64);

// ==================== Boolean ====================

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Err(null::<bool>()),
            Value::Bool(v) => Ok(v),
            Value::Int(0) | Value::UInt(0) => Ok(false),
            Value::Int(1) | Value::UInt(1) => Ok(true),
            Value::Int(v) => Err(ConvertError::out_of_range::<bool>(v)),
            Value::UInt(v) => Err(ConvertError::out_of_range::<bool>(v)),
            ref text @ (Value::Text(_) | Value::Bytes(_)) => {
                let s = text_of::<bool>(text)?.trim();
                match s.to_ascii_lowercase().as_str() {
                    "t" | "true" | "1" => Ok(true),
                    "f" | "false" | "0" => Ok(false),
                    _ => Err(ConvertError::invalid::<bool>(format!("'{}'", s))),
                }
            }
            other => Err(ConvertError::incompatible::<bool>(other.kind())),
        }
    }
}

// ==================== String and Bytes ====================

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Err(null::<String>()),
            Value::Text(s) => Ok(s),
            Value::Bytes(b) => String::from_utf8(b).map_err(ConvertError::invalid::<String>),
            Value::Bool(v) => Ok(v.to_string()),
            Value::Int(v) => Ok(v.to_string()),
            Value::UInt(v) => Ok(v.to_string()),
            Value::Float(v) => Ok(v.to_string()),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Err(null::<Vec<u8>>()),
            Value::Bytes(b) => Ok(b),
            Value::Text(s) => Ok(s.into_bytes()),
            other => Err(ConvertError::incompatible::<Vec<u8>>(other.kind())),
        }
    }
}

// ==================== Value and Option<T> ====================

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

// ==================== Temporal ====================

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

fn from_unix<T>(secs: i64) -> Result<DateTime<Utc>, ConvertError> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| ConvertError::out_of_range::<T>(secs))
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Err(null::<Self>()),
            Value::Int(secs) => from_unix::<Self>(secs),
            ref text @ (Value::Text(_) | Value::Bytes(_)) => {
                let s = text_of::<Self>(text)?.trim();
                // "2024-01-01 12:00:00+00" is what PostgreSQL prints for timestamptz
                DateTime::parse_from_rfc3339(&s.replacen(' ', "T", 1))
                    .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z"))
                    .map(|dt| dt.with_timezone(&Utc))
                    .or_else(|_| {
                        NaiveDateTime::from_value(Value::Text(s.to_string())).map(|n| n.and_utc())
                    })
                    .map_err(|_| ConvertError::invalid::<Self>(format!("'{}'", s)))
            }
            other => Err(ConvertError::incompatible::<Self>(other.kind())),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Err(null::<Self>()),
            Value::Int(secs) => from_unix::<Self>(secs).map(|dt| dt.naive_utc()),
            ref text @ (Value::Text(_) | Value::Bytes(_)) => {
                let s = text_of::<Self>(text)?.trim();
                NAIVE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                    .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc()))
                    .ok_or_else(|| ConvertError::invalid::<Self>(format!("'{}'", s)))
            }
            other => Err(ConvertError::incompatible::<Self>(other.kind())),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Err(null::<Self>()),
            ref text @ (Value::Text(_) | Value::Bytes(_)) => {
                let s = text_of::<Self>(text)?.trim();
                match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    Ok(date) => Ok(date),
                    Err(_) => NaiveDateTime::from_value(Value::Text(s.to_string()))
                        .map(|dt| dt.date())
                        .map_err(|_| ConvertError::invalid::<Self>(format!("'{}'", s))),
                }
            }
            other => NaiveDateTime::from_value(other).map(|dt| dt.date()),
        }
    }
}

// ==================== JSON ====================

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Err(null::<Self>()),
            Value::Bool(v) => Ok(serde_json::Value::Bool(v)),
            Value::Int(v) => Ok(serde_json::Value::from(v)),
            Value::UInt(v) => Ok(serde_json::Value::from(v)),
            Value::Float(v) => serde_json::Number::from_f64(v)
                .map(serde_json::Value::Number)
                .ok_or_else(|| ConvertError::out_of_range::<Self>(v)),
            Value::Text(s) => serde_json::from_str(&s).map_err(ConvertError::invalid::<Self>),
            Value::Bytes(b) => serde_json::from_slice(&b).map_err(ConvertError::invalid::<Self>),
        }
    }
}

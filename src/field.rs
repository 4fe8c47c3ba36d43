//! Bindable field types.
//!
//! Every type that can sit in a record field implements [`Field`]. A field
//! either hands out a settable [`Location`] (scalars, `Option<T>`, custom
//! scanners) or describes itself as a nested record whose own fields are
//! reachable through [`Field::fields_mut`].
//!
//! ```ignore
//! // A type that decodes raw values itself, NULL included.
//! #[derive(Default)]
//! struct Tags(Vec<String>);
//!
//! impl Scanner for Tags {
//!     fn scan(&mut self, value: Value) -> Result<(), ConvertError> {
//!         if let Some(s) = value.as_str() {
//!             self.0 = s.split(',').map(str::to_string).collect();
//!         }
//!         Ok(())
//!     }
//! }
//!
//! impl Field for Tags {
//!     fn location(&mut self) -> Location<'_> {
//!         Location::Scanner(self)
//!     }
//! }
//! ```

use crate::error::ConvertError;
use crate::schema::Schema;
use crate::value::{FromValue, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// A type that consumes column values itself.
///
/// Implementors receive every value unchanged, NULL included, and are never
/// wrapped by the null-safe adapter.
pub trait Scanner {
    fn scan(&mut self, value: Value) -> Result<(), ConvertError>;
}

/// Object-safe assignment of a converted value into a place.
///
/// Implemented for every [`FromValue`] type; this is the direct store a
/// cursor would perform without null handling.
pub trait Assign {
    fn assign(&mut self, value: Value) -> Result<(), ConvertError>;
}

impl<T: FromValue> Assign for T {
    fn assign(&mut self, value: Value) -> Result<(), ConvertError> {
        *self = T::from_value(value)?;
        Ok(())
    }
}

/// A settable place inside a target instance, one per column.
pub enum Location<'a> {
    /// A plain value assigned through [`FromValue`].
    Value(&'a mut dyn Assign),
    /// A value that represents NULL itself, such as `Option<T>`. Assigned
    /// through [`FromValue`] for every value, NULL included.
    Direct(&'a mut dyn Assign),
    /// A type implementing its own decoding.
    Scanner(&'a mut dyn Scanner),
    /// Nothing to set; the column value is read and dropped.
    Discard,
}

impl Location<'_> {
    pub fn is_discard(&self) -> bool {
        matches!(self, Location::Discard)
    }
}

impl std::fmt::Debug for Location<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Value(_) => write!(f, "Location::Value"),
            Location::Direct(_) => write!(f, "Location::Direct"),
            Location::Scanner(_) => write!(f, "Location::Scanner"),
            Location::Discard => write!(f, "Location::Discard"),
        }
    }
}

/// A type that can be the target of a bind or a field of one.
pub trait Field {
    /// The descriptor of this type when it is a record.
    ///
    /// `None` marks a primitive-like type: the whole value is one column.
    fn schema() -> Option<&'static Schema>
    where
        Self: Sized,
    {
        None
    }

    /// Where a column bound to this field is written.
    fn location(&mut self) -> Location<'_>;

    /// Disjoint borrows of the record's fields, in declaration order.
    /// Empty for primitive-like types.
    fn fields_mut(&mut self) -> Vec<&mut dyn Field> {
        Vec::new()
    }
}

macro_rules! value_field {
    ($($t:ty),* $(,)?) => {$(
        impl Field for $t {
            fn location(&mut self) -> Location<'_> {
                Location::Value(self)
            }
        }
    )*};
}

value_field!(
    bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64,
    String, Vec<u8>, Value,
    DateTime<Utc>, NaiveDateTime, NaiveDate,
    serde_json::Value,
);

impl<T: FromValue> Field for Option<T> {
    fn location(&mut self) -> Location<'_> {
        Location::Direct(self)
    }
}

/// A field that accepts any column and keeps nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Discarded;

impl Field for Discarded {
    fn location(&mut self) -> Location<'_> {
        Location::Discard
    }
}

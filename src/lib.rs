//! # qail-scan
//!
//! > **Rows in, records out.**
//!
//! qail-scan binds tabular query results into typed Rust values. Any cursor
//! that can report column names, advance, and fill one destination per column
//! can be bound into a list of records or a single one.
//!
//! ## Quick Example
//!
//! ```
//! use qail_scan::{MemoryCursor, Record, Value};
//!
//! #[derive(Debug, Default, Record)]
//! struct Person {
//!     first: String,
//!     #[scan(column = "p.last")]
//!     last: String,
//!     age: i32,
//! }
//!
//! let mut rows = MemoryCursor::new(["first", "p.last", "age", "ignored"])
//!     .row([Value::from("Brett"), Value::from("Jones"), Value::Int(40), Value::Null])
//!     .row([Value::from("Fred"), Value::from("Smith"), Value::Null, Value::Null]);
//!
//! let people: Vec<Person> = qail_scan::rows(&mut rows).unwrap();
//! assert_eq!(people[0].last, "Jones");
//! assert_eq!(people[1].age, 0);
//! ```
//!
//! ## Column matching
//!
//! | Rule               | Example                                         |
//! |--------------------|-------------------------------------------------|
//! | Override           | `#[scan(column = "p.last")]` binds `"p.last"`   |
//! | Mapped name        | `"first_name"` -> `FirstName` binds `first_name` |
//! | Nested record      | overrides inside nested records bind too        |
//! | Flatten            | `#[scan(flatten)]` promotes nested keys         |
//! | No match           | the column is read and dropped                  |
//!
//! Primitive targets (`String`, `i64`, [`Value`], ...) take exactly one column.
//! NULL leaves a field at its `Default`.

extern crate self as qail_scan;

pub mod binder;
pub mod config;
pub mod cursor;
pub mod error;
pub mod field;
pub mod memory;
pub mod naming;
pub mod nullable;
pub mod resolver;
pub mod schema;
#[cfg(feature = "sqlx")]
pub mod sqlx_cursor;
pub mod value;

pub use binder::{optional, row, rows, Binder};
pub use config::{Config, Naming, Settings};
pub use cursor::RowCursor;
pub use error::{ConfigError, ConvertError, ScanError};
pub use field::{Assign, Discarded, Field, Location, Scanner};
pub use memory::{MemoryCursor, MemoryError};
pub use nullable::{nullable, Destination};
pub use qail_scan_macros::Record;
pub use resolver::{resolve, Plan};
pub use schema::{FieldDef, FieldPath, Record, Schema};
#[cfg(feature = "sqlx")]
pub use sqlx_cursor::SqlxCursor;
pub use value::{FromValue, Value};

pub mod prelude {
    pub use crate::binder::Binder;
    pub use crate::config::Config;
    pub use crate::cursor::RowCursor;
    pub use crate::error::{ConvertError, ScanError};
    pub use crate::field::{Field, Location, Scanner};
    pub use crate::schema::Record;
    pub use crate::value::{FromValue, Value};
    pub use qail_scan_macros::Record;
}

//! NULL-safe destinations.
//!
//! Many field types (integers, `String`, `bool`) have no way to say "absent".
//! A column that is nullable in the store but bound to such a field would fail
//! the whole row on the first NULL. [`nullable`] wraps a [`Location`] so NULL
//! leaves the field at its zero value and every other value is assigned as
//! usual. Types that implement [`Scanner`](crate::field::Scanner) are passed
//! through untouched: they asked to see NULL themselves. So are `Option<T>`
//! fields ([`Location::Direct`]), where NULL is written as `None`.

use crate::error::ConvertError;
use crate::field::{Assign, Location, Scanner};
use crate::value::Value;

/// The write target a cursor fills for one column.
pub struct Destination<'a> {
    target: Target<'a>,
}

enum Target<'a> {
    Nullable(&'a mut dyn Assign),
    Direct(&'a mut dyn Assign),
    Scanner(&'a mut dyn Scanner),
    Discard,
}

/// Wrap a location for a cursor's scan call.
pub fn nullable(location: Location<'_>) -> Destination<'_> {
    let target = match location {
        Location::Value(slot) => Target::Nullable(slot),
        Location::Direct(slot) => Target::Direct(slot),
        Location::Scanner(scanner) => Target::Scanner(scanner),
        Location::Discard => Target::Discard,
    };
    Destination { target }
}

impl<'a> Destination<'a> {
    /// A destination that reads and drops its column.
    pub fn discard() -> Self {
        Self {
            target: Target::Discard,
        }
    }

    /// Store one column value.
    pub fn set(&mut self, value: Value) -> Result<(), ConvertError> {
        match &mut self.target {
            Target::Nullable(_) if value.is_null() => Ok(()),
            Target::Nullable(slot) | Target::Direct(slot) => slot.assign(value),
            Target::Scanner(scanner) => scanner.scan(value),
            Target::Discard => Ok(()),
        }
    }

    pub fn is_discard(&self) -> bool {
        matches!(self.target, Target::Discard)
    }

    /// True when the destination decodes values itself.
    pub fn is_scanner(&self) -> bool {
        matches!(self.target, Target::Scanner(_))
    }
}

impl<'a> From<Location<'a>> for Destination<'a> {
    fn from(location: Location<'a>) -> Self {
        nullable(location)
    }
}

impl std::fmt::Debug for Destination<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.target {
            Target::Nullable(_) => "Nullable",
            Target::Direct(_) => "Direct",
            Target::Scanner(_) => "Scanner",
            Target::Discard => "Discard",
        };
        write!(f, "Destination::{}", kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;

    #[derive(Default)]
    struct SeesNull(Option<Value>);

    impl Scanner for SeesNull {
        fn scan(&mut self, value: Value) -> Result<(), ConvertError> {
            self.0 = Some(value);
            Ok(())
        }
    }

    impl Field for SeesNull {
        fn location(&mut self) -> Location<'_> {
            Location::Scanner(self)
        }
    }

    #[test]
    fn test_null_leaves_zero_value() {
        let mut age = 0i32;
        let mut dest = nullable(age.location());
        dest.set(Value::Null).unwrap();
        dest.set(Value::Int(5)).unwrap();
        drop(dest);
        assert_eq!(age, 5);

        let mut name = String::new();
        nullable(name.location()).set(Value::Null).unwrap();
        assert_eq!(name, "");
    }

    #[test]
    fn test_conversion_errors_still_surface() {
        let mut age = 0i8;
        let err = nullable(age.location()).set(Value::Int(1000)).unwrap_err();
        assert!(matches!(err, ConvertError::OutOfRange { .. }));
    }

    #[test]
    fn test_scanner_passed_through() {
        let mut v = SeesNull::default();
        let mut dest = nullable(v.location());
        assert!(dest.is_scanner());
        dest.set(Value::Null).unwrap();
        drop(dest);
        assert_eq!(v.0, Some(Value::Null));
    }

    #[test]
    fn test_option_field() {
        let mut nick: Option<String> = Some("stale".into());
        nullable(nick.location()).set(Value::Text("Bob".into())).unwrap();
        assert_eq!(nick.as_deref(), Some("Bob"));

        // NULL is a value for an Option, not a skip
        let mut dest = nullable(nick.location());
        assert!(!dest.is_scanner());
        dest.set(Value::Null).unwrap();
        drop(dest);
        assert_eq!(nick, None);
    }

    #[test]
    fn test_discard_accepts_anything() {
        let mut dest = nullable(Location::Discard);
        assert!(dest.is_discard());
        dest.set(Value::Bytes(vec![1, 2, 3])).unwrap();
        assert!(Destination::discard().is_discard());
    }
}

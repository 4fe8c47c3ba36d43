//! The row cursor a bind consumes.

use crate::nullable::Destination;

/// A forward-only cursor over tabular results.
///
/// This is the only thing the binder needs from a driver. The contract:
///
/// - [`columns`](RowCursor::columns) returns the same ordered list every time.
/// - [`advance`](RowCursor::advance) moves to the next row; `false` means the
///   rows are exhausted, which is not necessarily an error.
/// - [`scan`](RowCursor::scan) fills exactly one destination per column, in
///   column order, from the current row.
/// - [`err`](RowCursor::err) reports the terminal iteration error once
///   `advance` has returned `false`.
/// - [`close`](RowCursor::close) releases the underlying resources. Calling it
///   twice must be harmless.
pub trait RowCursor {
    type Error: std::error::Error + 'static;

    fn columns(&mut self) -> Result<Vec<String>, Self::Error>;

    fn advance(&mut self) -> bool;

    fn scan(&mut self, dest: &mut [Destination<'_>]) -> Result<(), Self::Error>;

    /// Cursors that do not track a terminal error keep the default.
    fn err(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<C: RowCursor + ?Sized> RowCursor for &mut C {
    type Error = C::Error;

    fn columns(&mut self) -> Result<Vec<String>, Self::Error> {
        (**self).columns()
    }

    fn advance(&mut self) -> bool {
        (**self).advance()
    }

    fn scan(&mut self, dest: &mut [Destination<'_>]) -> Result<(), Self::Error> {
        (**self).scan(dest)
    }

    fn err(&mut self) -> Result<(), Self::Error> {
        (**self).err()
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        (**self).close()
    }
}

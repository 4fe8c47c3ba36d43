//! Column-to-field resolution.
//!
//! A [`Plan`] maps every column of a result set to a field of the target
//! record. It is computed once per bind, since the column list cannot change
//! while rows are read, and applied to each row's fresh instance to produce
//! one [`Location`] per column.
//!
//! For each column, in order:
//!
//! 1. an exact `#[scan(column = "...")]` override at any depth;
//! 2. otherwise the mapped name (`Config` mapper) against field keys;
//! 3. otherwise, or when the match is a nested record rather than a value,
//!    the column is discarded.
//!
//! When two columns land on the same field, the later one owns it and the
//! earlier one is discarded, the same outcome as assigning both in order.

use crate::field::{Field, Location};
use crate::schema::{self, Record, Schema};

/// Resolved column placement for one record type and one column list.
#[derive(Debug, Clone)]
pub struct Plan {
    width: usize,
    slots: Vec<Option<Slot>>,
    bound: Vec<bool>,
}

#[derive(Debug, Clone)]
enum Slot {
    Column(usize),
    Nested(Vec<Option<Slot>>),
}

impl Plan {
    pub fn new(schema: &Schema, columns: &[String], mapper: &dyn Fn(&str) -> String) -> Self {
        let mut slots = empty(schema.fields().len());
        let mut bound = vec![false; columns.len()];

        for (index, column) in columns.iter().enumerate() {
            let key;
            let path = match schema.by_column(column) {
                Some(path) => path,
                None => {
                    key = mapper(column);
                    match schema.by_key(&key) {
                        Some(path) => path,
                        None => {
                            tracing::trace!("Column '{}' has no field on {}", column, schema.name());
                            continue;
                        }
                    }
                }
            };

            if !schema.field(path).is_some_and(|def| def.is_settable()) {
                tracing::trace!(
                    "Column '{}' names nested record on {}, discarding",
                    column,
                    schema.name()
                );
                continue;
            }

            if let Some(previous) = place(&mut slots, schema, path, index) {
                bound[previous] = false;
            }
            bound[index] = true;
        }

        Self {
            width: columns.len(),
            slots,
            bound,
        }
    }

    /// Number of columns, and of locations produced per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether the column at `index` writes to a field.
    pub fn is_bound(&self, index: usize) -> bool {
        self.bound.get(index).copied().unwrap_or(false)
    }

    /// One location per column for this instance; unbound columns get
    /// [`Location::Discard`].
    pub fn locations<'a>(&self, item: &'a mut dyn Field) -> Vec<Location<'a>> {
        let mut out: Vec<Location<'a>> = std::iter::repeat_with(|| Location::Discard)
            .take(self.width)
            .collect();
        fill(item.fields_mut(), &self.slots, &mut out);
        out
    }
}

/// Resolve columns against a record instance in one step.
pub fn resolve<'a, R: Record>(
    item: &'a mut R,
    columns: &[String],
    mapper: &dyn Fn(&str) -> String,
) -> Vec<Location<'a>> {
    Plan::new(schema::of::<R>(), columns, mapper).locations(item)
}

fn empty(len: usize) -> Vec<Option<Slot>> {
    std::iter::repeat_with(|| None).take(len).collect()
}

/// Put `column` at `path`, returning the column it displaced.
fn place(slots: &mut [Option<Slot>], schema: &Schema, path: &[usize], column: usize) -> Option<usize> {
    let (&first, rest) = path.split_first()?;
    if rest.is_empty() {
        return match slots.get_mut(first)?.replace(Slot::Column(column)) {
            Some(Slot::Column(previous)) => Some(previous),
            _ => None,
        };
    }

    let nested = schema.fields().get(first)?.nested()?;
    let slot = slots
        .get_mut(first)?
        .get_or_insert_with(|| Slot::Nested(empty(nested.fields().len())));
    match slot {
        Slot::Nested(children) => place(children, nested, rest, column),
        Slot::Column(_) => None,
    }
}

fn fill<'a>(fields: Vec<&'a mut dyn Field>, slots: &[Option<Slot>], out: &mut [Location<'a>]) {
    for (field, slot) in fields.into_iter().zip(slots) {
        match slot {
            Some(Slot::Column(index)) => out[*index] = field.location(),
            Some(Slot::Nested(children)) => fill(field.fields_mut(), children, out),
            None => {}
        }
    }
}

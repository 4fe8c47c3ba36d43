//! Record descriptors.
//!
//! A [`Schema`] describes one record type: its bindable fields, which of them
//! are nested records, and the two lookup tables the resolver uses. It is
//! built once per type by [`Record::describe`] (generated by
//! `#[derive(Record)]`) and cached by [`TypeId`] for the life of the process.
//!
//! ## Lookup tables
//!
//! | Table     | Key                           | Scope                                   |
//! |-----------|-------------------------------|-----------------------------------------|
//! | `columns` | `#[scan(column = "...")]`     | every depth, flat, last registration wins |
//! | `keys`    | UpperCamel of the field ident | top level, plus `#[scan(flatten)]` fields |
//!
//! Column overrides on nested records land in the same flat table as the
//! parent's. Two nested records declaring the same override is not an error:
//! whichever is registered last (declaration order, depth first) wins.

use crate::field::Field;
use crate::naming::field_key;
use dashmap::DashMap;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Index path from a record to one of its (possibly nested) fields.
pub type FieldPath = Vec<usize>;

/// A record type with a descriptor.
///
/// Implemented by `#[derive(Record)]`; the derive also implements [`Field`]
/// so records can be bound directly or nested inside other records.
pub trait Record: Field + Default + 'static {
    /// Build the descriptor. Called once per type; use [`of`] to read it.
    fn describe() -> Schema;
}

/// One bindable field of a record.
#[derive(Debug, Clone)]
pub struct FieldDef {
    ident: &'static str,
    key: String,
    column: Option<&'static str>,
    nested: Option<&'static Schema>,
    flatten: bool,
}

impl FieldDef {
    /// Describe a field by identifier; `nested` is the field type's own
    /// descriptor when it is a record.
    pub fn new(ident: &'static str, nested: Option<&'static Schema>) -> Self {
        Self {
            ident,
            key: field_key(ident),
            column: None,
            nested,
            flatten: false,
        }
    }

    /// Bind this field to an exact column name.
    pub fn column(mut self, name: &'static str) -> Self {
        self.column = Some(name);
        self
    }

    /// Promote the nested record's field keys into the parent.
    pub fn flatten(mut self) -> Self {
        self.flatten = true;
        self
    }

    pub fn ident(&self) -> &'static str {
        self.ident
    }

    /// The name-mapping key, e.g. `FirstName` for `first_name`.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn column_override(&self) -> Option<&'static str> {
        self.column
    }

    pub fn nested(&self) -> Option<&'static Schema> {
        self.nested
    }

    pub fn is_flattened(&self) -> bool {
        self.flatten
    }

    /// Nested records are traversed, never assigned as a whole.
    pub fn is_settable(&self) -> bool {
        self.nested.is_none()
    }
}

/// Descriptor of a record type.
#[derive(Debug)]
pub struct Schema {
    name: &'static str,
    fields: Vec<FieldDef>,
    columns: HashMap<&'static str, FieldPath>,
    keys: HashMap<String, FieldPath>,
}

impl Schema {
    /// Build a descriptor from its top-level fields.
    ///
    /// Two fields whose identifiers map to the same key (`first_name` and
    /// `firstName` both map to `FirstName`) are not an error: the first
    /// declared field owns the key and the later one is reachable only
    /// through a `column` override.
    pub fn new(name: &'static str, fields: Vec<FieldDef>) -> Self {
        let mut columns = HashMap::new();
        collect_columns(&fields, &mut Vec::new(), &mut columns);

        let mut keys = HashMap::new();
        for (i, field) in fields.iter().enumerate() {
            keys.entry(field.key.clone()).or_insert_with(|| vec![i]);
        }
        for (i, field) in fields.iter().enumerate() {
            let Some(nested) = field.nested.filter(|_| field.flatten) else {
                continue;
            };
            for (key, path) in &nested.keys {
                keys.entry(key.clone()).or_insert_with(|| {
                    let mut full = Vec::with_capacity(path.len() + 1);
                    full.push(i);
                    full.extend_from_slice(path);
                    full
                });
            }
        }

        Self {
            name,
            fields,
            columns,
            keys,
        }
    }

    /// Type name of the record.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Top-level fields in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Follow a path into nested records.
    pub fn field(&self, path: &[usize]) -> Option<&FieldDef> {
        let (last, parents) = path.split_last()?;
        let mut schema = self;
        for &i in parents {
            schema = schema.fields.get(i)?.nested?;
        }
        schema.fields.get(*last)
    }

    /// Path of the field carrying this exact column override.
    pub fn by_column(&self, column: &str) -> Option<&[usize]> {
        self.columns.get(column).map(Vec::as_slice)
    }

    /// Path of the field matched by a name-mapping key.
    pub fn by_key(&self, key: &str) -> Option<&[usize]> {
        self.keys.get(key).map(Vec::as_slice)
    }
}

fn collect_columns(
    fields: &[FieldDef],
    prefix: &mut FieldPath,
    out: &mut HashMap<&'static str, FieldPath>,
) {
    for (i, field) in fields.iter().enumerate() {
        prefix.push(i);
        if let Some(nested) = field.nested {
            collect_columns(&nested.fields, prefix, out);
        }
        if let Some(column) = field.column {
            out.insert(column, prefix.clone());
        }
        prefix.pop();
    }
}

// ============================================================================
// Descriptor cache
// ============================================================================

static SCHEMAS: LazyLock<DashMap<TypeId, &'static Schema>> = LazyLock::new(DashMap::new);

/// The cached descriptor of `R`, built on first use.
pub fn of<R: Record>() -> &'static Schema {
    let id = TypeId::of::<R>();
    if let Some(schema) = SCHEMAS.get(&id) {
        return *schema;
    }

    // Built outside the map lock: describing a record describes its nested
    // records first, and those may live in the same shard.
    let built: &'static Schema = Box::leak(Box::new(R::describe()));
    tracing::debug!("Described record {} ({} fields)", built.name, built.fields.len());
    *SCHEMAS.entry(id).or_insert(built)
}

//! Derive macro for qail-scan records.
//!
//! `#[derive(Record)]` describes a struct's bindable fields and gives the
//! binder disjoint `&mut` access to them.
//!
//! ```ignore
//! use qail_scan::Record;
//!
//! #[derive(Default, Record)]
//! struct Person {
//!     #[scan(column = "p.first")]
//!     first: String,
//!     last_name: String,          // matched by column "last_name" or "LastName"
//!     #[scan(skip)]
//!     display: String,            // never bound
//!     #[scan(flatten)]
//!     audit: Audit,               // Audit's keys resolve on Person too
//! }
//! ```
//!
//! Field attributes:
//!
//! | Attribute                 | Effect                                         |
//! |---------------------------|------------------------------------------------|
//! | `column = "name"`         | bind to this exact column (alias: `rename`)    |
//! | `skip`                    | not bindable; left at its `Default`            |
//! | `flatten`                 | promote a nested record's keys into this one   |

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Ident, LitStr};

const ATTRIBUTES: &[&str] = &["column", "rename", "skip", "flatten"];

#[proc_macro_derive(Record, attributes(scan))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

// ============================================================================
// Field attributes
// ============================================================================

#[derive(Default)]
struct FieldAttrs {
    column: Option<LitStr>,
    skip: bool,
    flatten: bool,
}

impl FieldAttrs {
    fn parse(field: &syn::Field) -> syn::Result<Self> {
        let mut attrs = Self::default();
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("scan")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("column") || meta.path.is_ident("rename") {
                    let name: LitStr = meta.value()?.parse()?;
                    if name.value().is_empty() {
                        return Err(syn::Error::new_spanned(&name, "column name cannot be empty"));
                    }
                    attrs.column = Some(name);
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    attrs.skip = true;
                    Ok(())
                } else if meta.path.is_ident("flatten") {
                    attrs.flatten = true;
                    Ok(())
                } else {
                    let found = meta
                        .path
                        .get_ident()
                        .map(Ident::to_string)
                        .unwrap_or_default();
                    Err(meta.error(format!(
                        "unknown scan attribute `{}`, expected one of: {}",
                        found,
                        ATTRIBUTES.join(", ")
                    )))
                }
            })?;
        }

        if attrs.skip && (attrs.column.is_some() || attrs.flatten) {
            return Err(syn::Error::new_spanned(
                &field.ident,
                "`skip` cannot be combined with `column` or `flatten`",
            ));
        }
        Ok(attrs)
    }
}

// ============================================================================
// Expansion
// ============================================================================

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(Record)] does not support generic structs",
        ));
    }

    let fields: Vec<&syn::Field> = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    name,
                    "#[derive(Record)] needs named fields; tuple structs have no names to match columns against",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "#[derive(Record)] only supports structs",
            ));
        }
    };

    let mut defs = Vec::new();
    let mut bound = Vec::new();
    for field in fields {
        let attrs = FieldAttrs::parse(field)?;
        if attrs.skip {
            continue;
        }
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let ty = &field.ty;
        let ident_str = ident.to_string();

        let mut def = quote! {
            ::qail_scan::FieldDef::new(#ident_str, <#ty as ::qail_scan::Field>::schema())
        };
        if let Some(column) = &attrs.column {
            def = quote! { #def.column(#column) };
        }
        if attrs.flatten {
            def = quote! { #def.flatten() };
        }
        defs.push(def);
        bound.push(ident);
    }

    let name_str = name.to_string();

    Ok(quote! {
        impl ::qail_scan::Record for #name {
            fn describe() -> ::qail_scan::Schema {
                ::qail_scan::Schema::new(#name_str, ::std::vec![#(#defs),*])
            }
        }

        impl ::qail_scan::Field for #name {
            fn schema() -> ::std::option::Option<&'static ::qail_scan::Schema> {
                ::std::option::Option::Some(::qail_scan::schema::of::<Self>())
            }

            fn location(&mut self) -> ::qail_scan::Location<'_> {
                ::qail_scan::Location::Discard
            }

            fn fields_mut(&mut self) -> ::std::vec::Vec<&mut dyn ::qail_scan::Field> {
                let Self { #(#bound,)* .. } = self;
                ::std::vec![#(#bound as &mut dyn ::qail_scan::Field),*]
            }
        }
    })
}

//! Column-name conventions.

/// Convert a snake_case name into UpperCamel ("title") case.
///
/// Underscores are dropped and the first letter of every segment is
/// capitalized; the rest of each segment is left alone, so `"First"` and
/// `"first"` both become `"First"` and `"userID"` becomes `"UserID"`.
pub fn to_title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for part in name.split('_') {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// The key a Rust field identifier is matched under.
pub(crate) fn field_key(ident: &str) -> String {
    to_title_case(ident.strip_prefix("r#").unwrap_or(ident))
}

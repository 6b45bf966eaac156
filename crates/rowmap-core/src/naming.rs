//! Field-name to column-name conventions.

use serde::{Deserialize, Serialize};

/// Naming convention applied to a field name to derive its column name.
///
/// Conversions accept field names in any mixed style (camel, snake, or a
/// combination) and are idempotent over their own output format. Explicit
/// per-field column overrides bypass the convention entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnCase {
    /// Use the field name verbatim.
    #[default]
    FieldName,
    /// `lowerCamelCase`.
    Camel,
    /// `snake_case`.
    Snake,
    /// `kebab-case`.
    Kebab,
    /// `UpperCamelCase`.
    Pascal,
}

impl ColumnCase {
    /// Derive the column name for `field` under this convention.
    pub fn column_name(&self, field: &str) -> String {
        match self {
            ColumnCase::FieldName => field.to_string(),
            ColumnCase::Camel => cased(field, false),
            ColumnCase::Pascal => cased(field, true),
            ColumnCase::Snake => separated(field, '_'),
            ColumnCase::Kebab => separated(field, '-'),
        }
    }
}

/// Camel family: underscores mark a word break, the following character is
/// upcased, and the first output character is forced to the requested case.
fn cased(field: &str, first_upper: bool) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for ch in field.chars() {
        if ch == '_' {
            upper_next = true;
            continue;
        }
        if out.is_empty() {
            if first_upper {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
        } else if upper_next {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        upper_next = false;
    }
    out
}

/// Separator family: a word break (underscore or an uppercase character)
/// emits the separator unless the output is empty or already ends with one,
/// and everything is downcased. Separators are never doubled.
fn separated(field: &str, sep: char) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    for ch in field.chars() {
        if ch == '_' {
            if !out.is_empty() && !out.ends_with(sep) {
                out.push(sep);
            }
        } else if ch.is_uppercase() {
            if !out.is_empty() && !out.ends_with(sep) {
                out.push(sep);
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

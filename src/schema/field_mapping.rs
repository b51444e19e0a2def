//! Resolution of source column names to canonical fields
//!
//! Resolution is an ordered traversal per field: the field's aliases are
//! tried as exact matches in priority order, and only when none hits are the
//! source columns scanned (in their own order) for a case-insensitive match.

use serde::Serialize;

use crate::schema::{AliasTable, CanonicalField};

/// Resolved canonical field → source column mapping
///
/// Holds one entry per canonical field, in schema order. Unresolved fields
/// keep their entry with `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    entries: Vec<(CanonicalField, Option<String>)>,
}

impl ColumnMapping {
    /// Source column resolved for a field
    #[must_use]
    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .and_then(|(_, source)| source.as_deref())
    }

    /// Whether a field was resolved
    #[must_use]
    pub fn is_resolved(&self, field: CanonicalField) -> bool {
        self.get(field).is_some()
    }

    /// All entries, including unresolved fields
    pub fn entries(&self) -> impl Iterator<Item = (CanonicalField, Option<&str>)> {
        self.entries.iter().map(|(f, s)| (*f, s.as_deref()))
    }

    /// Resolved `(field, source column)` pairs
    pub fn resolved(&self) -> impl Iterator<Item = (CanonicalField, &str)> {
        self.entries
            .iter()
            .filter_map(|(f, s)| s.as_deref().map(|s| (*f, s)))
    }

    /// Canonical fields claiming a given source column, in schema order
    #[must_use]
    pub fn fields_for_source(&self, source: &str) -> Vec<CanonicalField> {
        self.resolved()
            .filter(|(_, s)| *s == source)
            .map(|(f, _)| f)
            .collect()
    }
}

/// Resolve each canonical field to at most one source column
///
/// # Arguments
/// * `columns` - Source column names, in table order
/// * `aliases` - Alias lists per canonical field
///
/// # Returns
/// A [`ColumnMapping`] with an entry for every canonical field
#[must_use]
pub fn resolve_columns<S: AsRef<str>>(columns: &[S], aliases: &AliasTable) -> ColumnMapping {
    let entries = CanonicalField::ALL
        .into_iter()
        .map(|field| (field, resolve_field(columns, aliases.aliases(field))))
        .collect();

    ColumnMapping { entries }
}

fn resolve_field<S: AsRef<str>>(columns: &[S], options: &[String]) -> Option<String> {
    // Exact match, alias priority order
    for option in options {
        if columns.iter().any(|c| c.as_ref() == option.as_str()) {
            return Some(option.clone());
        }
    }

    // Case-insensitive fallback, source column order
    let lowered: Vec<String> = options.iter().map(|o| o.to_lowercase()).collect();
    columns
        .iter()
        .map(|c| c.as_ref())
        .find(|c| lowered.contains(&c.to_lowercase()))
        .map(str::to_string)
}

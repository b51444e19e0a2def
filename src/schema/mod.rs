//! Canonical schema for discharge records.
//!
//! Source files name their columns however they like. Everything downstream
//! of normalization refers to columns only through [`CanonicalField`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod adapters;
pub mod field_mapping;

pub use field_mapping::{ColumnMapping, resolve_columns};

/// Name of the derived age cohort column
pub const AGE_GROUP_COLUMN: &str = "age_group";

/// How a canonical field is coerced during normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Parsed to `Float64`, unparseable values become null
    Numeric,
    /// Cast to `Utf8`, missing values become the unknown label
    Text,
}

/// A fixed semantic column that downstream logic depends on
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Age,
    LengthOfStay,
    Charges,
    Diagnosis,
    Facility,
    County,
    Payment,
    Severity,
}

impl CanonicalField {
    /// All canonical fields, in schema order
    pub const ALL: [Self; 8] = [
        Self::Age,
        Self::LengthOfStay,
        Self::Charges,
        Self::Diagnosis,
        Self::Facility,
        Self::County,
        Self::Payment,
        Self::Severity,
    ];

    /// Column name used in the normalized table
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::LengthOfStay => "length_of_stay",
            Self::Charges => "charges",
            Self::Diagnosis => "diagnosis",
            Self::Facility => "facility",
            Self::County => "county",
            Self::Payment => "payment",
            Self::Severity => "severity",
        }
    }

    /// Coercion applied to this field
    #[must_use]
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Age | Self::LengthOfStay | Self::Charges => FieldKind::Numeric,
            Self::Diagnosis | Self::Facility | Self::County | Self::Payment | Self::Severity => {
                FieldKind::Text
            }
        }
    }

    /// Look up a field by its canonical column name
    #[must_use]
    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column_name() == name)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Ordered alias lists per canonical field
///
/// Fields without an entry can never be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasTable {
    aliases: BTreeMap<CanonicalField, Vec<String>>,
}

impl AliasTable {
    /// An alias table with no entries
    #[must_use]
    pub fn empty() -> Self {
        Self {
            aliases: BTreeMap::new(),
        }
    }

    /// Replace the aliases for one field
    #[must_use]
    pub fn with_aliases<I, S>(mut self, field: CanonicalField, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(field, aliases);
        self
    }

    /// Replace the aliases for one field in place
    pub fn set<I, S>(&mut self, field: CanonicalField, aliases: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases
            .insert(field, aliases.into_iter().map(Into::into).collect());
    }

    /// Aliases for a field in priority order (empty if none are configured)
    #[must_use]
    pub fn aliases(&self, field: CanonicalField) -> &[String] {
        self.aliases
            .get(&field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::empty()
            .with_aliases(CanonicalField::Age, ["Age", "Patient_Age", "age"])
            .with_aliases(
                CanonicalField::LengthOfStay,
                ["Length_of_stay", "LOS", "length_of_stay", "LengthOfStay"],
            )
            .with_aliases(
                CanonicalField::Charges,
                ["Total_Charges", "Charges", "TotalCharges", "Charge"],
            )
            .with_aliases(
                CanonicalField::Diagnosis,
                ["Diagnosis_Code", "Diagnosis", "Diag", "DiagnosisCode"],
            )
            .with_aliases(
                CanonicalField::Facility,
                ["Facility", "Hospital", "Hospital_Name"],
            )
            .with_aliases(CanonicalField::County, ["County", "Region", "State"])
            .with_aliases(
                CanonicalField::Payment,
                ["Payment_Type", "Payment", "Payer"],
            )
            .with_aliases(
                CanonicalField::Severity,
                ["Severity", "Severity_Level", "DRG_Severity"],
            )
    }
}

//! Row filtering for the canonical table
//!
//! Filters are expressed as [`core::BatchFilter`] implementations over
//! Arrow boolean masks. [`inclusion`] provides the per-field inclusion lists
//! the dashboard exposes.

pub mod core;
pub mod inclusion;

pub use self::core::{AndFilter, BatchFilter, IncludeAllFilter, filter_record_batch};
pub use self::inclusion::{
    FilterField, FilterOptions, FilterSelection, InclusionFilter, apply_filters, filter_options,
};

//! Sort comparators and multi-key sorting
//!
//! [`SortFn`] is the closed comparator registry. [`RowSorter`] chains
//! persisted [`Sort`] keys over a row set.

mod registry;
mod sorter;
mod types;

pub use registry::{sort_fns_for_type, SortColumn, SortFn};
pub use sorter::RowSorter;
pub use types::Sort;

pub(crate) use types::lenient_sorts;

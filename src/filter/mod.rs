//! Filter operators and evaluation
//!
//! - [`FilterFn`] is the closed operator registry
//! - [`Filter`] / [`FilterGroup`] are the persisted shapes
//! - [`RowFilter`] applies filters to rows, [`PropertyFilter`] to a
//!   property bag (used by the `filter` action node)
//!
//! Evaluation is total: malformed operands compare false, never error.

mod evaluator;
mod registry;
mod types;

pub use evaluator::{PropertyFilter, RowFilter};
pub use registry::{predicate_fns_for_type, FilterFn, ValueKind};
pub use types::{Filter, FilterGroup, GroupKind, OperandSource};

pub(crate) use types::{lenient_filters, lenient_groups, lenient_list};

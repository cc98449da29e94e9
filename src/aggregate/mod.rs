//! Column aggregates
//!
//! [`AggregateFn`] reduces a column's values across a row set to one
//! display string. Numeric results honour the column's [`NumberFormat`].

mod evaluator;
mod format;
mod registry;

pub use evaluator::Aggregator;
pub use format::NumberFormat;
pub use registry::{aggregate_fns_for_type, AggregateFn};

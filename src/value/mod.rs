//! Value representation and string coercion
//!
//! Cell values arrive as strings (scalars, comma-joined lists, JSON for
//! structured types). Action props arrive as JSON. Both meet here:
//!
//! - [`Value`] is the tagged runtime value threaded through action trees
//! - [`coerce`] parses string-encoded cells into comparable primitives
//!
//! Coercion never fails loudly. Malformed numbers become NaN, malformed
//! dates become `None`, and every comparison against those is false.

pub mod coerce;
mod types;

pub use coerce::{
    list_includes, natural_cmp, normalized_empty, parse_date_millis, parse_multi_string,
    parse_number, path_basename, string_equal, string_includes,
};
pub use types::Value;

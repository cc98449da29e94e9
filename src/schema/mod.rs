//! Column and row model consumed by the engine
//!
//! The host owns columns and rows. The engine only reads them:
//! - Columns carry a type tag and a JSON config string
//! - Rows are immutable string maps keyed by `name + table`
//! - Schemas decide which default view predicate a table gets

mod types;

pub use types::{Column, Row, SpaceSchema, TypeTag};

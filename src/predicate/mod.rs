//! View predicates
//!
//! A [`Predicate`] is the persisted configuration of a view. It is created
//! from a schema default, edited by partial merges and stored as an opaque
//! JSON blob by the host. [`PredicateValidator`] turns whatever was stored
//! back into a well-formed predicate, and [`ViewQuery`] applies it to rows.

mod query;
mod types;
mod validator;

pub use query::{ViewGroup, ViewQuery, ViewResult};
pub use types::Predicate;
pub use validator::{default_predicate_for_schema, PredicateValidator};

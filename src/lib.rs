//! rowkit - view predicates and action trees for tabular data
//!
//! - Filter, sort and aggregate operator registries
//! - Predicate validation, defaulting and view queries
//! - Action tree interpretation against a host's commands

pub mod action;
pub mod aggregate;
pub mod cli;
pub mod config;
pub mod filter;
pub mod observability;
pub mod predicate;
pub mod schema;
pub mod sort;
pub mod value;

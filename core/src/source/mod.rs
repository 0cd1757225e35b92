//! Data-source boundary.
//!
//! RULE: Only implementations of `DataSource` talk to the database.
//! The executor hands them a statement plus validated bindings and gets
//! back raw rows or a `SourceError`, never a driver error.

use crate::{catalog::Statement, error::SourceError, params::BoundParam, types::Value};

mod functions;
mod routines;
mod sqlite;

pub use routines::{Routine, STANDARD_ROUTINES};
pub use sqlite::SqliteSource;

/// A statement with its validated bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundQuery<'a> {
    pub statement: &'a Statement,
    pub params:    &'a [BoundParam],
}

/// Rows as the data source returned them, before any shape check.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRows {
    pub columns: Vec<String>,
    pub rows:    Vec<Vec<Value>>,
}

/// A read-only, query-capable store.
///
/// Implementations must be safe to call from many threads at once and
/// must not keep per-call state between fetches.
pub trait DataSource: Send + Sync {
    fn fetch(&self, query: &BoundQuery<'_>) -> Result<RawRows, SourceError>;
}

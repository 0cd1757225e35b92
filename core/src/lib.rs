//! Report engine for the game store analytics dashboard.
//!
//! A caller picks a report by name, the engine runs its bound, read-only
//! query against the injected data source and hands back plain rows:
//!
//!   Dispatcher → Executor → Catalog → DataSource → Outcome

pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod params;
pub mod result;
pub mod source;
pub mod types;
pub mod views;

use std::sync::Arc;

pub use catalog::Catalog;
pub use dispatcher::Dispatcher;
pub use error::{ErrorKind, ExecutionError};
pub use executor::Executor;
pub use result::{Outcome, QueryResult, Row};
pub use source::{DataSource, SqliteSource};
pub use types::{ReportId, Value};

/// Wire the standard catalog and `source` into a ready dispatcher.
pub fn standard_dispatcher(source: Arc<dyn DataSource>) -> Result<Dispatcher, error::CatalogError> {
    let catalog = Arc::new(Catalog::standard()?);
    Ok(Dispatcher::new(Arc::new(Executor::new(catalog, source))))
}

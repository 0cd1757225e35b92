use std::time::Duration;
use thiserror::Error;

use crate::types::{ColumnType, ReportId};

/// Failure of a single report execution.
///
/// `report` is the caller's selection as given, so an unparseable id still
/// shows up in the error.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("report '{report}': {cause}")]
pub struct ExecutionError {
    pub report: String,
    pub cause:  ErrorKind,
}

impl ExecutionError {
    pub fn new(report: impl Into<String>, cause: ErrorKind) -> Self {
        Self { report: report.into(), cause }
    }

    /// Operational failures are shown to the user; everything else is a
    /// programmer or configuration error.
    pub fn is_operational(&self) -> bool {
        matches!(self.cause, ErrorKind::DataSource(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorKind {
    #[error("report not found")]
    NotFound,

    #[error("invalid parameter: {0}")]
    ParameterInvalid(#[from] ParamError),

    #[error("data source error: {0}")]
    DataSource(#[from] SourceError),

    #[error("schema mismatch: {0}")]
    SchemaMismatch(#[from] SchemaError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    #[error("missing required parameter '{name}'")]
    Missing { name: String },

    #[error("unexpected parameter '{name}'")]
    Unexpected { name: String },

    #[error("parameter '{name}' must be {expected}")]
    TypeMismatch { name: String, expected: &'static str },

    #[error("parameter '{name}' is not a valid {rule}")]
    Rejected { name: String, rule: &'static str },
}

/// Failures at the data-source boundary.
///
/// Carries no driver text; the driver's message is logged where it occurs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("data source unavailable")]
    Unavailable,

    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    #[error("statement is not read-only")]
    NotReadOnly,

    #[error("unknown stored procedure '{0}'")]
    UnknownProcedure(String),

    #[error("column '{0}' holds a value type reports cannot carry")]
    UnsupportedValue(String),

    #[error("query failed")]
    QueryFailed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("expected columns {expected:?}, got {actual:?}")]
    Columns {
        expected: Vec<String>,
        actual:   Vec<String>,
    },

    #[error("row {row}: column '{column}' expected {expected}, got {actual}")]
    CellType {
        row:      usize,
        column:   String,
        expected: ColumnType,
        actual:   &'static str,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("report '{0}' is already registered")]
    DuplicateId(ReportId),

    #[error("report '{0}' declares no output columns")]
    NoColumns(ReportId),
}

pub type ExecResult<T> = Result<T, ExecutionError>;

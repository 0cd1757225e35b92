//! Normalized report output.

use crate::{
    catalog::ReportDefinition,
    error::SchemaError,
    source::RawRows,
    types::{ReportId, Value},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One result row, keyed by column name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, Value>);

impl Row {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub report:    ReportId,
    pub title:     String,
    pub columns:   Vec<String>,
    pub rows:      Vec<Row>,
    pub row_count: usize,
}

impl QueryResult {
    /// Values of one column, in row order.
    pub fn column(&self, name: &str) -> Vec<&Value> {
        self.rows.iter().filter_map(|r| r.get(name)).collect()
    }
}

/// Successful execution. Zero rows is not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Rows(QueryResult),
    EmptyResult {
        report:  ReportId,
        columns: Vec<String>,
    },
}

impl Outcome {
    pub fn report(&self) -> ReportId {
        match self {
            Outcome::Rows(result)               => result.report,
            Outcome::EmptyResult { report, .. } => *report,
        }
    }

    pub fn rows(&self) -> Option<&QueryResult> {
        match self {
            Outcome::Rows(result) => Some(result),
            Outcome::EmptyResult { .. } => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::EmptyResult { .. })
    }

    pub fn row_count(&self) -> usize {
        self.rows().map(|r| r.row_count).unwrap_or(0)
    }
}

/// Check `raw` against the definition's declared columns and shape it.
pub fn normalize(definition: &ReportDefinition, raw: RawRows) -> Result<Outcome, SchemaError> {
    let expected = definition.column_names();
    if raw.columns != expected {
        return Err(SchemaError::Columns { expected, actual: raw.columns });
    }

    if raw.rows.is_empty() {
        return Ok(Outcome::EmptyResult { report: definition.id, columns: raw.columns });
    }

    let mut rows = Vec::with_capacity(raw.rows.len());
    for (index, cells) in raw.rows.into_iter().enumerate() {
        let mut row = BTreeMap::new();
        for (spec, value) in definition.expected_columns.iter().zip(cells) {
            if !spec.kind.accepts(&value) {
                return Err(SchemaError::CellType {
                    row:      index,
                    column:   spec.name.to_string(),
                    expected: spec.kind,
                    actual:   value.type_name(),
                });
            }
            row.insert(spec.name.to_string(), value);
        }
        rows.push(Row(row));
    }

    Ok(Outcome::Rows(QueryResult {
        report:    definition.id,
        title:     definition.title.to_string(),
        row_count: rows.len(),
        columns:   raw.columns,
        rows,
    }))
}

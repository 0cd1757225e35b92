//! Query catalog: the closed set of report definitions.
//!
//! RULE: The catalog is built once at startup through `CatalogBuilder`.
//! A built `Catalog` has no mutating methods, so it can be shared
//! across threads by reference without locking.

use crate::{
    error::CatalogError,
    types::{ColumnType, ReportId},
    views,
};
use std::collections::HashMap;

/// One named report: its query and the shape of what it returns.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDefinition {
    pub id:               ReportId,
    pub title:            &'static str,
    pub template:         ParameterizedQuery,
    pub expected_columns: &'static [ColumnSpec],
}

impl ReportDefinition {
    pub fn column_names(&self) -> Vec<String> {
        self.expected_columns.iter().map(|c| c.name.to_string()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterizedQuery {
    pub statement: Statement,
    pub params:    &'static [ParamSpec],
}

/// What gets sent to the data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// A read-only SELECT with `:name` placeholders.
    Select(&'static str),
    /// A named stored procedure; declared params are passed as its arguments
    /// in declaration order.
    Call(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnType,
}

impl ColumnSpec {
    pub const fn new(name: &'static str, kind: ColumnType) -> Self {
        Self { name, kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub rule: ParamRule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Text,
    Integer,
}

/// Validation applied to a parameter after its type is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRule {
    Any,
    /// Non-empty, at most `max_len` chars of ASCII alphanumerics, `_`, `-`, `.`.
    Identifier { max_len: usize },
}

// ── Catalog ─────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Catalog {
    order:       Vec<ReportId>,
    definitions: HashMap<ReportId, ReportDefinition>,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Every view in `views::STANDARD_REPORTS`.
    pub fn standard() -> Result<Self, CatalogError> {
        let mut builder = Self::builder();
        for definition in views::STANDARD_REPORTS {
            builder.register(definition.clone())?;
        }
        Ok(builder.build())
    }

    pub fn lookup(&self, id: ReportId) -> Option<&ReportDefinition> {
        self.definitions.get(&id)
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> &[ReportId] {
        &self.order
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ReportDefinition> {
        self.order.iter().filter_map(|id| self.definitions.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct CatalogBuilder {
    order:       Vec<ReportId>,
    definitions: HashMap<ReportId, ReportDefinition>,
}

impl CatalogBuilder {
    pub fn register(&mut self, definition: ReportDefinition) -> Result<&mut Self, CatalogError> {
        let id = definition.id;
        if self.definitions.contains_key(&id) {
            return Err(CatalogError::DuplicateId(id));
        }
        if definition.expected_columns.is_empty() {
            return Err(CatalogError::NoColumns(id));
        }
        self.order.push(id);
        self.definitions.insert(id, definition);
        Ok(self)
    }

    pub fn build(self) -> Catalog {
        log::debug!("catalog: {} reports registered", self.order.len());
        Catalog {
            order:       self.order,
            definitions: self.definitions,
        }
    }
}

//! Query executor: runs one report against the data source.
//!
//! EXECUTION ORDER (fixed; each step short-circuits the rest):
//!   1. Resolve the report in the catalog        → NotFound
//!   2. Validate parameters against its schema   → ParameterInvalid
//!   3. Bind and fetch from the data source      → DataSourceError
//!   4. Check the returned shape                 → SchemaMismatch
//!   5. Zero rows                                → Outcome::EmptyResult
//!
//! RULES:
//!   - Steps 1 and 2 never touch the data source.
//!   - The executor only reads. It holds no mutable state, so one instance
//!     serves any number of concurrent callers.

use crate::{
    catalog::Catalog,
    error::{ErrorKind, ExecResult, ExecutionError},
    params,
    result::{self, Outcome},
    source::{BoundQuery, DataSource},
    types::{Params, ReportId},
};
use std::sync::Arc;
use std::time::Instant;

pub struct Executor {
    catalog: Arc<Catalog>,
    source:  Arc<dyn DataSource>,
}

impl Executor {
    pub fn new(catalog: Arc<Catalog>, source: Arc<dyn DataSource>) -> Self {
        Self { catalog, source }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn execute(&self, id: ReportId, params: &Params) -> ExecResult<Outcome> {
        let definition = self
            .catalog
            .lookup(id)
            .ok_or_else(|| fail(id, ErrorKind::NotFound))?;

        let bound = params::validate(definition.template.params, params)
            .map_err(|e| fail(id, ErrorKind::ParameterInvalid(e)))?;

        let started = Instant::now();
        let raw = self
            .source
            .fetch(&BoundQuery {
                statement: &definition.template.statement,
                params:    &bound,
            })
            .map_err(|e| fail(id, ErrorKind::DataSource(e)))?;

        let outcome = result::normalize(definition, raw)
            .map_err(|e| fail(id, ErrorKind::SchemaMismatch(e)))?;

        log::debug!(
            "report={id} rows={} elapsed_ms={}",
            outcome.row_count(),
            started.elapsed().as_millis()
        );
        Ok(outcome)
    }
}

/// Build the error and log it at the level its kind deserves.
fn fail(id: ReportId, cause: ErrorKind) -> ExecutionError {
    let err = ExecutionError::new(id.as_str(), cause);
    if err.is_operational() {
        log::warn!("{err}");
    } else {
        log::error!("{err}");
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{ParamError, SourceError},
        source::RawRows,
        types::Value,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts fetches and answers every query with the same rows.
    struct Canned {
        calls: AtomicUsize,
        reply: Result<RawRows, SourceError>,
    }

    impl Canned {
        fn new(reply: Result<RawRows, SourceError>) -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), reply })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl DataSource for Canned {
        fn fetch(&self, _query: &BoundQuery<'_>) -> Result<RawRows, crate::error::SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    fn library_rows(rows: Vec<Vec<Value>>) -> RawRows {
        RawRows {
            columns: ["title", "genre", "price_paid", "purchase_date"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            rows,
        }
    }

    fn executor(source: Arc<Canned>, catalog: Catalog) -> Executor {
        Executor::new(Arc::new(catalog), source)
    }

    fn tag(value: &str) -> Params {
        [("gamer_tag".to_string(), Value::from(value))].into_iter().collect()
    }

    #[test]
    fn unregistered_report_never_reaches_the_source() {
        let source = Canned::new(Ok(RawRows::default()));
        let exec = executor(source.clone(), Catalog::builder().build());

        let err = exec.execute(ReportId::CheapestGames, &Params::new()).unwrap_err();

        assert_eq!(err.cause, ErrorKind::NotFound);
        assert_eq!(err.report, "cheapest_games");
        assert_eq!(source.calls(), 0);
    }

    #[test]
    fn unsafe_gamer_tag_never_reaches_the_source() {
        let source = Canned::new(Ok(library_rows(vec![])));
        let exec = executor(source.clone(), Catalog::standard().unwrap());

        let err = exec
            .execute(ReportId::GamerLibrary, &tag("x'); DROP TABLE Gamers; --"))
            .unwrap_err();

        assert!(matches!(
            err.cause,
            ErrorKind::ParameterInvalid(ParamError::Rejected { .. })
        ));
        assert_eq!(source.calls(), 0);
    }

    #[test]
    fn source_failure_is_operational() {
        let source = Canned::new(Err(SourceError::Unavailable));
        let exec = executor(source.clone(), Catalog::standard().unwrap());

        let err = exec.execute(ReportId::GenreDistribution, &Params::new()).unwrap_err();

        assert_eq!(err.cause, ErrorKind::DataSource(SourceError::Unavailable));
        assert!(err.is_operational());
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn empty_library_is_not_an_error() {
        let source = Canned::new(Ok(library_rows(vec![])));
        let exec = executor(source, Catalog::standard().unwrap());

        let out = exec.execute(ReportId::GamerLibrary, &tag("ZAP99")).unwrap();

        assert!(out.is_empty());
        assert_eq!(out.report(), ReportId::GamerLibrary);
    }

    #[test]
    fn drifted_columns_are_a_schema_mismatch() {
        let source = Canned::new(Ok(RawRows {
            columns: vec!["genre".into(), "n".into()],
            rows:    vec![],
        }));
        let exec = executor(source, Catalog::standard().unwrap());

        let err = exec.execute(ReportId::GenreDistribution, &Params::new()).unwrap_err();

        assert!(matches!(err.cause, ErrorKind::SchemaMismatch(_)));
        assert!(!err.is_operational());
    }

    #[test]
    fn rows_come_back_shaped() {
        let source = Canned::new(Ok(library_rows(vec![vec![
            Value::from("Halo"),
            Value::from("Shooter"),
            Value::Real(59.99),
            Value::from("2024-01-02"),
        ]])));
        let exec = executor(source, Catalog::standard().unwrap());

        let out = exec.execute(ReportId::GamerLibrary, &tag("ZAP99")).unwrap();
        let result = out.rows().unwrap();

        assert_eq!(result.row_count, 1);
        assert_eq!(result.title, "Gamer Library");
        assert_eq!(result.rows[0].get("title"), Some(&Value::from("Halo")));
    }
}

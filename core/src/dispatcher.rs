//! Report dispatcher: the single entry point for callers.
//!
//! RULE: The dispatcher translates a UI selection into an executor call
//! and nothing more. It never resolves a report itself or touches the data source.

use crate::{
    catalog::Catalog,
    error::{ErrorKind, ExecResult, ExecutionError},
    executor::Executor,
    result::Outcome,
    types::{Params, ReportId, Value},
};
use std::collections::HashMap;
use std::sync::Arc;

/// Cheap to clone; clones share one executor.
#[derive(Clone)]
pub struct Dispatcher {
    executor: Arc<Executor>,
}

impl Dispatcher {
    pub fn new(executor: Arc<Executor>) -> Self {
        Self { executor }
    }

    /// The catalog the executor resolves reports against.
    pub fn catalog(&self) -> &Catalog {
        self.executor.catalog()
    }

    /// `selection` is a report's wire name; `raw_params` are free-text
    /// inputs as typed by the user, trimmed before validation.
    pub fn handle(&self, selection: &str, raw_params: &HashMap<String, String>) -> ExecResult<Outcome> {
        let id: ReportId = selection.parse().map_err(|_| {
            let err = ExecutionError::new(selection, ErrorKind::NotFound);
            log::error!("{err}");
            err
        })?;

        let params: Params = raw_params
            .iter()
            .map(|(name, raw)| (name.clone(), Value::Text(raw.trim().to_string())))
            .collect();

        self.executor.execute(id, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::SourceError,
        source::{BoundQuery, DataSource, RawRows},
    };
    use std::sync::Mutex;

    /// Records the bindings of every fetch.
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<Vec<(String, Value)>>>,
    }

    impl DataSource for Recorder {
        fn fetch(&self, query: &BoundQuery<'_>) -> Result<RawRows, SourceError> {
            let bindings = query
                .params
                .iter()
                .map(|p| (p.name.to_string(), p.value.clone()))
                .collect();
            self.seen.lock().unwrap().push(bindings);
            Ok(RawRows {
                columns: ["title", "genre", "price_paid", "purchase_date"]
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
                rows: vec![],
            })
        }
    }

    fn dispatcher(source: Arc<Recorder>) -> Dispatcher {
        let catalog = Arc::new(Catalog::standard().unwrap());
        Dispatcher::new(Arc::new(Executor::new(catalog, source)))
    }

    #[test]
    fn unknown_selection_is_not_found() {
        let source = Arc::new(Recorder::default());
        let err = dispatcher(source.clone())
            .handle("run_as_is", &HashMap::new())
            .unwrap_err();
        assert_eq!(err.report, "run_as_is");
        assert_eq!(err.cause, ErrorKind::NotFound);
        assert!(source.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn raw_gamer_tag_is_trimmed_and_bound_as_text() {
        let source = Arc::new(Recorder::default());
        let raw = HashMap::from([("gamer_tag".to_string(), "  ZAP99 \n".to_string())]);

        let out = dispatcher(source.clone()).handle("gamer_library", &raw).unwrap();

        assert!(out.is_empty());
        assert_eq!(
            *source.seen.lock().unwrap(),
            vec![vec![("gamer_tag".to_string(), Value::from("ZAP99"))]]
        );
    }

    #[test]
    fn catalog_is_the_executors_own() {
        let source = Arc::new(Recorder::default());
        let dispatcher = dispatcher(source);
        assert_eq!(dispatcher.catalog().len(), ReportId::ALL.len());
        assert!(dispatcher.catalog().lookup(ReportId::GamerLibrary).is_some());
    }
}

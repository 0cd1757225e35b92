//! report-runner: headless caller of the game store report engine.
//!
//! Usage:
//!   report-runner --list
//!   report-runner --report cheapest_games
//!   report-runner --report gamer_library --param gamer_tag=ZAP99 --db games.db
//!   report-runner --ipc-mode --config reports.json
//!
//! The connection comes from --db, else --config <file.json>, else the
//! DB_CONNECTION environment variable.

use anyhow::Result;
use gamestore_reports::{
    catalog::Catalog, config::ReportConfig, Dispatcher, ExecutionError, Executor, Outcome,
};
use std::collections::HashMap;
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    List,
    Run {
        report: String,
        #[serde(default)]
        params: HashMap<String, String>,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct CatalogEntry {
    report:  String,
    title:   &'static str,
    columns: Vec<String>,
    params:  Vec<&'static str>,
}

#[derive(serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Failure {
    Error {
        report:      String,
        kind:        &'static str,
        message:     String,
        operational: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let catalog = Arc::new(Catalog::standard()?);

    if args.iter().any(|a| a == "--list") {
        let entries = catalog_entries(&catalog);
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let config = resolve_config(&args)?;
    log::info!(
        "report-runner: connection={} timeout_ms={}",
        config.connection,
        config.query_timeout_ms
    );
    let executor = Executor::new(catalog, Arc::new(config.source()));
    let dispatcher = Dispatcher::new(Arc::new(executor));

    if args.iter().any(|a| a == "--ipc-mode") {
        return run_ipc_loop(&dispatcher);
    }

    let report = flag_value(&args, "--report")
        .ok_or_else(|| anyhow::anyhow!("--report <id> is required (see --list)"))?;
    let params = parse_params(&args)?;

    match dispatcher.handle(report, &params) {
        Ok(outcome) => {
            log::info!("{}", describe(&outcome));
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Err(err) => {
            println!("{}", serde_json::to_string_pretty(&failure(&err))?);
            Err(err.into())
        }
    }
}

fn run_ipc_loop(dispatcher: &Dispatcher) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "status": "error", "message": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::List => {
                let entries = catalog_entries(dispatcher.catalog());
                writeln!(stdout, "{}", serde_json::to_string(&entries)?)?;
            }
            IpcCommand::Run { report, params } => {
                let line = match dispatcher.handle(&report, &params) {
                    Ok(outcome) => serde_json::to_string(&outcome)?,
                    Err(err) => serde_json::to_string(&failure(&err))?,
                };
                writeln!(stdout, "{line}")?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn resolve_config(args: &[String]) -> Result<ReportConfig> {
    let db = flag_value(args, "--db");
    let base = match flag_value(args, "--config") {
        Some(path) => ReportConfig::load(path)?,
        None => match db {
            Some(db) => ReportConfig::new(db),
            None => ReportConfig::from_env()?,
        },
    };
    let timeout_ms = flag_value(args, "--timeout-ms")
        .map(|ms| {
            ms.parse::<u64>()
                .map_err(|e| anyhow::anyhow!("--timeout-ms {ms:?}: {e}"))
        })
        .transpose()?;
    base.with_overrides(db, timeout_ms)
}

fn catalog_entries(catalog: &Catalog) -> Vec<CatalogEntry> {
    catalog
        .definitions()
        .map(|d| CatalogEntry {
            report:  d.id.to_string(),
            title:   d.title,
            columns: d.column_names(),
            params:  d.template.params.iter().map(|p| p.name).collect(),
        })
        .collect()
}

fn failure(err: &ExecutionError) -> Failure {
    use gamestore_reports::ErrorKind;
    let kind = match err.cause {
        ErrorKind::NotFound            => "not_found",
        ErrorKind::ParameterInvalid(_) => "parameter_invalid",
        ErrorKind::DataSource(_)       => "data_source_error",
        ErrorKind::SchemaMismatch(_)   => "schema_mismatch",
    };
    Failure::Error {
        report: err.report.clone(),
        kind,
        message: err.cause.to_string(),
        operational: err.is_operational(),
    }
}

/// `--param name=value`, repeatable.
fn parse_params(args: &[String]) -> Result<HashMap<String, String>> {
    args.windows(2)
        .filter(|w| w[0] == "--param")
        .map(|w| {
            w[1].split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| anyhow::anyhow!("--param expects name=value, got {:?}", w[1]))
        })
        .collect()
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Rows(result) => format!("{} ({} rows)", result.title, result.row_count),
        Outcome::EmptyResult { report, .. } => format!("{report}: no data"),
    }
}

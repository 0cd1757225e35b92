//! SQLite data source.
//!
//! Each fetch opens its own read-only connection, so a `SqliteSource` holds
//! nothing but settings and can be shared freely between threads.

use super::{functions, BoundQuery, DataSource, RawRows, Routine, STANDARD_ROUTINES};
use crate::{
    catalog::Statement,
    error::SourceError,
    params::BoundParam,
    types::Value,
};
use rusqlite::{
    types::{ToSqlOutput, ValueRef},
    Connection, ErrorCode, OpenFlags, ToSql,
};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// VM steps between deadline checks.
const PROGRESS_STEPS: i32 = 1_000;

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct SqliteSource {
    path:     String,
    timeout:  Duration,
    routines: HashMap<&'static str, Routine>,
}

impl SqliteSource {
    /// `connection` is a file path, a `file:` URI, or either behind a
    /// `sqlite://` prefix. The database must already exist.
    pub fn new(connection: &str) -> Self {
        let path = connection
            .strip_prefix("sqlite://")
            .unwrap_or(connection)
            .to_string();
        Self {
            path,
            timeout:  DEFAULT_QUERY_TIMEOUT,
            routines: STANDARD_ROUTINES.iter().map(|r| (r.name, *r)).collect(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add or replace a routine reachable through `Statement::Call`.
    pub fn with_routine(mut self, routine: Routine) -> Self {
        self.routines.insert(routine.name, routine);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `deadline` bounds the whole fetch; lock waits get only what is left.
    fn connect(&self, deadline: Instant) -> Result<Connection, SourceError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.path, flags).map_err(|e| {
            log::warn!("sqlite: cannot open '{}': {e}", self.path);
            SourceError::Unavailable
        })?;
        conn.busy_timeout(deadline.saturating_duration_since(Instant::now()))
            .and_then(|_| conn.execute_batch("PRAGMA query_only = ON;"))
            .and_then(|_| functions::register(&conn))
            .map_err(|e| self.classify(e))?;
        Ok(conn)
    }

    fn resolve(&self, query: &BoundQuery<'_>) -> Result<&'static str, SourceError> {
        match *query.statement {
            Statement::Select(sql) => Ok(sql),
            Statement::Call(name) => {
                let routine = self.routines.get(name).ok_or_else(|| {
                    log::error!("sqlite: no routine named '{name}'");
                    SourceError::UnknownProcedure(name.to_string())
                })?;
                let supplied: Vec<&str> = query.params.iter().map(|p| p.name).collect();
                if supplied != routine.args {
                    log::error!(
                        "sqlite: routine '{name}' takes {:?}, called with {supplied:?}",
                        routine.args
                    );
                    return Err(SourceError::QueryFailed);
                }
                Ok(routine.body)
            }
        }
    }

    /// Map a driver error to what callers may see. The driver's text is
    /// logged here and goes no further.
    fn classify(&self, err: rusqlite::Error) -> SourceError {
        log::warn!("sqlite: {err}");
        match err.sqlite_error_code() {
            Some(ErrorCode::OperationInterrupted)
            | Some(ErrorCode::DatabaseBusy)
            | Some(ErrorCode::DatabaseLocked) => SourceError::Timeout(self.timeout),
            Some(ErrorCode::CannotOpen) | Some(ErrorCode::NotADatabase) => {
                SourceError::Unavailable
            }
            Some(ErrorCode::ReadOnly) => SourceError::NotReadOnly,
            _ => SourceError::QueryFailed,
        }
    }
}

impl DataSource for SqliteSource {
    fn fetch(&self, query: &BoundQuery<'_>) -> Result<RawRows, SourceError> {
        let sql = self.resolve(query)?;
        let deadline = Instant::now() + self.timeout;
        let conn = self.connect(deadline)?;
        conn.progress_handler(PROGRESS_STEPS, Some(move || Instant::now() >= deadline));

        match run(&conn, sql, query.params) {
            Ok(raw) => Ok(raw),
            Err(FetchError::Driver(e)) => Err(self.classify(e)),
            Err(FetchError::NotReadOnly) => {
                log::error!("sqlite: refused non-read-only statement");
                Err(SourceError::NotReadOnly)
            }
            Err(FetchError::Unsupported(column)) => {
                log::warn!("sqlite: column '{column}' holds a blob or invalid UTF-8 text");
                Err(SourceError::UnsupportedValue(column))
            }
        }
    }
}

enum FetchError {
    Driver(rusqlite::Error),
    NotReadOnly,
    Unsupported(String),
}

impl From<rusqlite::Error> for FetchError {
    fn from(e: rusqlite::Error) -> Self {
        FetchError::Driver(e)
    }
}

fn run(conn: &Connection, sql: &str, params: &[BoundParam]) -> Result<RawRows, FetchError> {
    let mut stmt = conn.prepare(sql)?;
    if !stmt.readonly() {
        return Err(FetchError::NotReadOnly);
    }

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let names: Vec<String> = params.iter().map(|p| format!(":{}", p.name)).collect();
    let named: Vec<(&str, &dyn ToSql)> = names
        .iter()
        .zip(params)
        .map(|(name, p)| (name.as_str(), &p.value as &dyn ToSql))
        .collect();

    let mut rows = stmt.query(named.as_slice())?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            let value = match row.get_ref(i)? {
                ValueRef::Null       => Value::Null,
                ValueRef::Integer(v) => Value::Integer(v),
                ValueRef::Real(v)    => Value::Real(v),
                ValueRef::Text(t)    => match std::str::from_utf8(t) {
                    Ok(text) => Value::Text(text.to_string()),
                    Err(_) => return Err(FetchError::Unsupported(column.clone())),
                },
                ValueRef::Blob(_)    => return Err(FetchError::Unsupported(column.clone())),
            };
            cells.push(value);
        }
        out.push(cells);
    }

    Ok(RawRows { columns, rows: out })
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null       => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Real(r)    => ToSqlOutput::from(*r),
            Value::Text(s)    => ToSqlOutput::from(s.as_str()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unit.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE Gamers (gamer_tag TEXT PRIMARY KEY, email TEXT, birth_date TEXT);
             INSERT INTO Gamers VALUES ('ZAP99', 'zap@gmail.com', '1999-01-01');",
        )
        .unwrap();
        (dir, path.to_string_lossy().into_owned())
    }

    #[test]
    fn binds_named_parameters() {
        let (_dir, path) = fixture();
        let source = SqliteSource::new(&path);
        let statement = Statement::Select(
            "SELECT email_domain(email) AS domain FROM Gamers WHERE gamer_tag = :gamer_tag",
        );
        let params = [BoundParam { name: "gamer_tag", value: "ZAP99".into() }];
        let raw = source
            .fetch(&BoundQuery { statement: &statement, params: &params })
            .unwrap();
        assert_eq!(raw.columns, vec!["domain".to_string()]);
        assert_eq!(raw.rows, vec![vec![Value::Text("gmail.com".into())]]);
    }

    #[test]
    fn refuses_writes() {
        let (_dir, path) = fixture();
        let source = SqliteSource::new(&path);
        let statement = Statement::Select("DELETE FROM Gamers");
        let err = source
            .fetch(&BoundQuery { statement: &statement, params: &[] })
            .unwrap_err();
        assert_eq!(err, SourceError::NotReadOnly);
    }

    #[test]
    fn missing_database_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");
        let source = SqliteSource::new(&path.to_string_lossy());
        let statement = Statement::Select("SELECT 1");
        let err = source
            .fetch(&BoundQuery { statement: &statement, params: &[] })
            .unwrap_err();
        assert_eq!(err, SourceError::Unavailable);
    }

    #[test]
    fn unknown_routine_is_reported() {
        let (_dir, path) = fixture();
        let source = SqliteSource::new(&path);
        let statement = Statement::Call("DropEverything");
        let err = source
            .fetch(&BoundQuery { statement: &statement, params: &[] })
            .unwrap_err();
        assert_eq!(err, SourceError::UnknownProcedure("DropEverything".into()));
    }

    #[test]
    fn runaway_query_times_out() {
        let (_dir, path) = fixture();
        let source = SqliteSource::new(&path).with_timeout(Duration::from_millis(50));
        let statement = Statement::Select(
            "WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n)
             SELECT count(*) FROM n",
        );
        let err = source
            .fetch(&BoundQuery { statement: &statement, params: &[] })
            .unwrap_err();
        assert_eq!(err, SourceError::Timeout(Duration::from_millis(50)));
    }

    #[test]
    fn invalid_utf8_text_is_unsupported() {
        let (_dir, path) = fixture();
        let source = SqliteSource::new(&path);
        let statement = Statement::Select("SELECT CAST(x'c328ff' AS TEXT) AS garbled");
        let err = source
            .fetch(&BoundQuery { statement: &statement, params: &[] })
            .unwrap_err();
        assert_eq!(err, SourceError::UnsupportedValue("garbled".into()));
    }

    #[test]
    fn locked_database_times_out_within_one_budget() {
        let (_dir, path) = fixture();
        let writer = Connection::open(&path).unwrap();
        writer.execute_batch("BEGIN EXCLUSIVE;").unwrap();

        let timeout = Duration::from_millis(200);
        let source = SqliteSource::new(&path).with_timeout(timeout);
        let statement = Statement::Select("SELECT gamer_tag FROM Gamers");
        let started = Instant::now();
        let err = source
            .fetch(&BoundQuery { statement: &statement, params: &[] })
            .unwrap_err();

        assert_eq!(err, SourceError::Timeout(timeout));
        assert!(started.elapsed() < timeout * 2, "waited {:?}", started.elapsed());
        writer.execute_batch("ROLLBACK;").unwrap();
    }
}

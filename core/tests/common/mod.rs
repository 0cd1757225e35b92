//! Shared SQLite fixture for integration tests.
//!
//! Each fixture is a fresh database file in its own temp directory. The
//! schema mirrors the game store's tables; seeding happens over a separate
//! read-write connection that is closed before any report runs.

#![allow(dead_code)]

use gamestore_reports::{
    standard_dispatcher, types::Params, Dispatcher, SqliteSource, Value,
};
use rusqlite::Connection;
use std::sync::Arc;
use tempfile::TempDir;

pub const SCHEMA: &str = "
    CREATE TABLE GamePublishers (
        publisher_id INTEGER PRIMARY KEY,
        name         TEXT NOT NULL,
        country      TEXT NOT NULL
    );
    CREATE TABLE VideoGames (
        game_id      INTEGER PRIMARY KEY,
        title        TEXT NOT NULL,
        genre        TEXT NOT NULL,
        price        REAL NOT NULL,
        publisher_id INTEGER REFERENCES GamePublishers(publisher_id)
    );
    CREATE TABLE Gamers (
        gamer_tag  TEXT PRIMARY KEY,
        email      TEXT NOT NULL,
        birth_date TEXT
    );
    CREATE TABLE Purchases (
        purchase_id   INTEGER PRIMARY KEY,
        gamer_tag     TEXT NOT NULL REFERENCES Gamers(gamer_tag),
        game_id       INTEGER NOT NULL REFERENCES VideoGames(game_id),
        price_paid    REAL NOT NULL,
        purchase_date TEXT NOT NULL
    );
";

/// A small but complete store:
///   - NEO (gmail) bought three games, TRIN (icloud) two, MORPH (yahoo) one.
///   - ZAP99 (gmail) owns nothing.
///   - Mario Kart and Lone Indie were never bought.
pub const STORE: &str = "
    INSERT INTO GamePublishers VALUES
        (1, 'Nintendo', 'Japan'),
        (2, 'Valve',    'USA'),
        (3, 'Ubisoft',  'France');
    INSERT INTO VideoGames VALUES
        (1, 'Zelda',      'Adventure', 59.99, 1),
        (2, 'Portal',     'Puzzle',    19.99, 2),
        (3, 'Far Cry',    'Shooter',   39.99, 3),
        (4, 'Mario Kart', 'Racing',    49.99, 1),
        (5, 'Lone Indie', 'Puzzle',     9.99, 2);
    INSERT INTO Gamers VALUES
        ('NEO',   'neo@gmail.com',      '1990-01-01'),
        ('TRIN',  'trin@icloud.com',    '1995-06-30'),
        ('MORPH', 'morpheus@yahoo.com', '1980-12-12'),
        ('ZAP99', 'zap@gmail.com',      '1999-04-01');
    INSERT INTO Purchases VALUES
        (1, 'NEO',   1, 59.99, '2024-01-05'),
        (2, 'NEO',   2, 19.99, '2024-02-10'),
        (3, 'NEO',   3, 39.99, '2024-03-15'),
        (4, 'TRIN',  1, 59.99, '2024-01-20'),
        (5, 'TRIN',  2, 19.99, '2024-04-01'),
        (6, 'MORPH', 1, 49.99, '2024-05-05');
";

pub struct Fixture {
    _dir:     TempDir,
    pub path: String,
}

impl Fixture {
    /// Schema plus `seed_sql`.
    pub fn with(seed_sql: &str) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("games.db").to_string_lossy().into_owned();
        let conn = Connection::open(&path).expect("open fixture");
        conn.execute_batch(SCHEMA).expect("schema");
        conn.execute_batch(seed_sql).expect("seed");
        Self { _dir: dir, path }
    }

    pub fn store() -> Self {
        Self::with(STORE)
    }

    pub fn source(&self) -> SqliteSource {
        SqliteSource::new(&self.path)
    }

    pub fn dispatcher(&self) -> Dispatcher {
        standard_dispatcher(Arc::new(self.source())).expect("standard catalog")
    }

    /// Read a single integer straight from the fixture.
    pub fn count(&self, sql: &str) -> i64 {
        let conn = Connection::open(&self.path).expect("open fixture");
        conn.query_row(sql, [], |r| r.get(0)).expect("count")
    }
}

pub fn gamer_tag(tag: &str) -> Params {
    [("gamer_tag".to_string(), Value::from(tag))].into_iter().collect()
}

pub fn text(value: &Value) -> &str {
    value.as_text().expect("text cell")
}

//! Shared primitive types used across the report engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Every report the engine can serve.
/// The snake_case name is the wire identifier callers send. Never rename a
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportId {
    // ── Game analytics ────────────────────────────
    GamePopularity,
    PriceDistribution,
    GenreDistribution,

    // ── Gamer analytics ───────────────────────────
    TopSpenders,
    ActiveGamers,
    EmailDomainSegmentation,

    // ── Publisher analytics ───────────────────────
    PublisherGameCounts,
    PublisherRevenue,
    PublisherCountries,

    // ── Email domain comparison ───────────────────
    EmailDomainStats,
    EmailDomainSpending,
    EmailDomainGenres,

    // ── Query dropdown ────────────────────────────
    PopularGames,
    MostPurchases,
    HighestSpending,
    NoPurchases,
    NotPurchased,
    ExpensiveGames,
    CheapestGames,
    PublisherGames,
    #[serde(rename = "proc_gamers_purchases")]
    GamersWithPurchases,
    #[serde(rename = "proc_purchased_games")]
    PurchasedGames,
    GamerLibrary,
}

impl ReportId {
    pub const ALL: [ReportId; 23] = [
        ReportId::GamePopularity,
        ReportId::PriceDistribution,
        ReportId::GenreDistribution,
        ReportId::TopSpenders,
        ReportId::ActiveGamers,
        ReportId::EmailDomainSegmentation,
        ReportId::PublisherGameCounts,
        ReportId::PublisherRevenue,
        ReportId::PublisherCountries,
        ReportId::EmailDomainStats,
        ReportId::EmailDomainSpending,
        ReportId::EmailDomainGenres,
        ReportId::PopularGames,
        ReportId::MostPurchases,
        ReportId::HighestSpending,
        ReportId::NoPurchases,
        ReportId::NotPurchased,
        ReportId::ExpensiveGames,
        ReportId::CheapestGames,
        ReportId::PublisherGames,
        ReportId::GamersWithPurchases,
        ReportId::PurchasedGames,
        ReportId::GamerLibrary,
    ];

    /// Stable wire name. Must agree with the serde names above.
    pub fn as_str(self) -> &'static str {
        match self {
            ReportId::GamePopularity          => "game_popularity",
            ReportId::PriceDistribution       => "price_distribution",
            ReportId::GenreDistribution       => "genre_distribution",
            ReportId::TopSpenders             => "top_spenders",
            ReportId::ActiveGamers            => "active_gamers",
            ReportId::EmailDomainSegmentation => "email_domain_segmentation",
            ReportId::PublisherGameCounts     => "publisher_game_counts",
            ReportId::PublisherRevenue        => "publisher_revenue",
            ReportId::PublisherCountries      => "publisher_countries",
            ReportId::EmailDomainStats        => "email_domain_stats",
            ReportId::EmailDomainSpending     => "email_domain_spending",
            ReportId::EmailDomainGenres       => "email_domain_genres",
            ReportId::PopularGames            => "popular_games",
            ReportId::MostPurchases           => "most_purchases",
            ReportId::HighestSpending         => "highest_spending",
            ReportId::NoPurchases             => "no_purchases",
            ReportId::NotPurchased            => "not_purchased",
            ReportId::ExpensiveGames          => "expensive_games",
            ReportId::CheapestGames           => "cheapest_games",
            ReportId::PublisherGames          => "publisher_games",
            ReportId::GamersWithPurchases     => "proc_gamers_purchases",
            ReportId::PurchasedGames          => "proc_purchased_games",
            ReportId::GamerLibrary            => "gamer_library",
        }
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownReport(pub String);

impl FromStr for ReportId {
    type Err = UnknownReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownReport(s.to_string()))
    }
}

/// Semantic type of an output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    Integer,
    /// Floating point; integral cells are accepted since SQLite may
    /// return whole-number aggregates as integers.
    Real,
    /// ISO-8601 date text (`YYYY-MM-DD`, optionally followed by a time).
    Date,
}

impl ColumnType {
    /// NULL is accepted in every column.
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null)                        => true,
            (ColumnType::Text, Value::Text(_))      => true,
            (ColumnType::Integer, Value::Integer(_)) => true,
            (ColumnType::Real, Value::Real(_))      => true,
            (ColumnType::Real, Value::Integer(_))   => true,
            (ColumnType::Date, Value::Text(s))      => is_iso_date(s),
            _                                       => false,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Text    => "text",
            ColumnType::Integer => "integer",
            ColumnType::Real    => "real",
            ColumnType::Date    => "date",
        };
        f.write_str(name)
    }
}

fn is_iso_date(s: &str) -> bool {
    s.get(..10)
        .map(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").is_ok())
        .unwrap_or(false)
}

/// A single cell, as returned by the data source or supplied as a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null       => "null",
            Value::Integer(_) => "integer",
            Value::Real(_)    => "real",
            Value::Text(_)    => "text",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the cell; integers widen to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(r)    => Some(*r),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

/// Parameters for one execution, keyed by declared parameter name.
pub type Params = BTreeMap<String, Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_report_id_round_trips_through_its_wire_name() {
        for id in ReportId::ALL {
            assert_eq!(id.as_str().parse::<ReportId>(), Ok(id));
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()), "serde name drifted for {id:?}");
        }
    }

    #[test]
    fn unknown_wire_name_is_rejected() {
        assert_eq!(
            "drop_tables".parse::<ReportId>(),
            Err(UnknownReport("drop_tables".into()))
        );
    }

    #[test]
    fn real_columns_accept_integers_but_not_text() {
        assert!(ColumnType::Real.accepts(&Value::Integer(3)));
        assert!(ColumnType::Real.accepts(&Value::Real(19.99)));
        assert!(!ColumnType::Real.accepts(&Value::Text("19.99".into())));
        assert!(!ColumnType::Integer.accepts(&Value::Real(1.0)));
    }

    #[test]
    fn date_columns_require_iso_text() {
        assert!(ColumnType::Date.accepts(&Value::Text("2024-03-15".into())));
        assert!(ColumnType::Date.accepts(&Value::Text("2024-03-15 10:22:00".into())));
        assert!(!ColumnType::Date.accepts(&Value::Text("15/03/2024".into())));
        assert!(ColumnType::Date.accepts(&Value::Null));
    }
}

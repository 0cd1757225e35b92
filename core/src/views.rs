//! Aggregation views: every report the dashboard serves, as data.
//!
//! RULE: No procedural logic here. Grouping, summing and ordering belong to
//! the database; each entry only names its query and the columns it yields.
//! Every output column carries an explicit `AS` alias so names never depend
//! on the engine's defaults.

use crate::{
    catalog::{
        ColumnSpec, ParamKind, ParamRule, ParamSpec, ParameterizedQuery, ReportDefinition,
        Statement,
    },
    types::{ColumnType::*, ReportId},
};

pub const GAMER_TAG_MAX_LEN: usize = 32;

const GAMER_TAG: &[ParamSpec] = &[ParamSpec {
    name: "gamer_tag",
    kind: ParamKind::Text,
    rule: ParamRule::Identifier { max_len: GAMER_TAG_MAX_LEN },
}];

const fn select(sql: &'static str) -> ParameterizedQuery {
    ParameterizedQuery { statement: Statement::Select(sql), params: &[] }
}

const fn call(procedure: &'static str, params: &'static [ParamSpec]) -> ParameterizedQuery {
    ParameterizedQuery { statement: Statement::Call(procedure), params }
}

const fn col(name: &'static str, kind: crate::types::ColumnType) -> ColumnSpec {
    ColumnSpec::new(name, kind)
}

// ── Shared column sets ──────────────────────────────────────────────

const GAME_PURCHASE_COUNT: &[ColumnSpec] = &[
    col("title", Text),
    col("genre", Text),
    col("times_purchased", Integer),
];

const GAME_PRICE: &[ColumnSpec] = &[col("title", Text), col("genre", Text), col("price", Real)];

pub static STANDARD_REPORTS: &[ReportDefinition] = &[
    // ── Game analytics ──────────────────────────────────────────────
    ReportDefinition {
        id: ReportId::GamePopularity,
        title: "Top 10 Most Popular Games",
        template: select(
            "SELECT v.title AS title, v.genre AS genre, COUNT(p.purchase_id) AS times_purchased
             FROM VideoGames v
             INNER JOIN Purchases p ON v.game_id = p.game_id
             GROUP BY v.title, v.genre
             ORDER BY times_purchased DESC, v.title
             LIMIT 10",
        ),
        expected_columns: GAME_PURCHASE_COUNT,
    },
    ReportDefinition {
        id: ReportId::PriceDistribution,
        title: "Game Price Distribution",
        template: select(
            "SELECT v.price AS price, COUNT(*) AS game_count
             FROM VideoGames v
             GROUP BY v.price
             ORDER BY v.price ASC",
        ),
        expected_columns: &[col("price", Real), col("game_count", Integer)],
    },
    ReportDefinition {
        id: ReportId::GenreDistribution,
        title: "Games by Genre",
        template: select(
            "SELECT v.genre AS genre, COUNT(*) AS game_count
             FROM VideoGames v
             GROUP BY v.genre
             ORDER BY v.genre",
        ),
        expected_columns: &[col("genre", Text), col("game_count", Integer)],
    },
    // ── Gamer analytics ─────────────────────────────────────────────
    ReportDefinition {
        id: ReportId::TopSpenders,
        title: "Top 10 Spenders",
        template: select(
            "SELECT g.gamer_tag AS gamer_tag, SUM(p.price_paid) AS total_spent
             FROM Gamers g
             INNER JOIN Purchases p ON g.gamer_tag = p.gamer_tag
             GROUP BY g.gamer_tag
             ORDER BY total_spent DESC, g.gamer_tag
             LIMIT 10",
        ),
        expected_columns: &[col("gamer_tag", Text), col("total_spent", Real)],
    },
    ReportDefinition {
        id: ReportId::ActiveGamers,
        title: "Most Active Gamers",
        template: select(
            "SELECT g.gamer_tag AS gamer_tag, COUNT(p.purchase_id) AS purchase_count
             FROM Gamers g
             INNER JOIN Purchases p ON g.gamer_tag = p.gamer_tag
             GROUP BY g.gamer_tag
             ORDER BY purchase_count DESC, g.gamer_tag
             LIMIT 10",
        ),
        expected_columns: &[col("gamer_tag", Text), col("purchase_count", Integer)],
    },
    ReportDefinition {
        id: ReportId::EmailDomainSegmentation,
        title: "Gamers by Email Domain",
        template: select(
            "SELECT email_domain(g.email) AS email_domain, COUNT(g.gamer_tag) AS user_count
             FROM Gamers g
             GROUP BY email_domain(g.email)
             ORDER BY user_count DESC, email_domain ASC",
        ),
        expected_columns: &[col("email_domain", Text), col("user_count", Integer)],
    },
    // ── Publisher analytics ─────────────────────────────────────────
    ReportDefinition {
        id: ReportId::PublisherGameCounts,
        title: "Publishers by Number of Games",
        template: select(
            "SELECT gp.name AS name, COUNT(v.game_id) AS games_published
             FROM GamePublishers gp
             INNER JOIN VideoGames v ON gp.publisher_id = v.publisher_id
             GROUP BY gp.name
             ORDER BY games_published DESC, gp.name",
        ),
        expected_columns: &[col("name", Text), col("games_published", Integer)],
    },
    ReportDefinition {
        id: ReportId::PublisherRevenue,
        title: "Publisher Revenue from Purchases",
        template: select(
            "SELECT gp.name AS name, SUM(p.price_paid) AS total_revenue
             FROM GamePublishers gp
             INNER JOIN VideoGames v ON gp.publisher_id = v.publisher_id
             INNER JOIN Purchases p ON v.game_id = p.game_id
             GROUP BY gp.name
             ORDER BY total_revenue DESC, gp.name",
        ),
        expected_columns: &[col("name", Text), col("total_revenue", Real)],
    },
    ReportDefinition {
        id: ReportId::PublisherCountries,
        title: "Publishers by Country",
        template: select(
            "SELECT gp.country AS country, COUNT(*) AS publisher_count
             FROM GamePublishers gp
             GROUP BY gp.country
             ORDER BY publisher_count DESC, gp.country",
        ),
        expected_columns: &[col("country", Text), col("publisher_count", Integer)],
    },
    // ── Email domain comparison ─────────────────────────────────────
    ReportDefinition {
        id: ReportId::EmailDomainStats,
        title: "Email Domain User Statistics",
        template: select(
            "SELECT email_domain(g.email) AS email_domain,
                    COUNT(g.gamer_tag) AS user_count,
                    AVG(age_years(g.birth_date)) AS avg_age
             FROM Gamers g
             GROUP BY email_domain(g.email)
             ORDER BY email_domain",
        ),
        expected_columns: &[
            col("email_domain", Text),
            col("user_count", Integer),
            col("avg_age", Real),
        ],
    },
    ReportDefinition {
        id: ReportId::EmailDomainSpending,
        title: "Average Spending by Email Domain",
        template: select(
            "SELECT email_domain(g.email) AS email_domain,
                    AVG(spend.total_spent) AS avg_spent_per_user
             FROM Gamers g
             LEFT JOIN (
                 SELECT p.gamer_tag AS gamer_tag, SUM(p.price_paid) AS total_spent
                 FROM Purchases p
                 GROUP BY p.gamer_tag
             ) AS spend ON g.gamer_tag = spend.gamer_tag
             GROUP BY email_domain(g.email)
             ORDER BY email_domain",
        ),
        expected_columns: &[col("email_domain", Text), col("avg_spent_per_user", Real)],
    },
    ReportDefinition {
        id: ReportId::EmailDomainGenres,
        title: "Genre Preferences by Email Domain",
        template: select(
            "SELECT email_domain(g.email) AS email_domain, v.genre AS genre,
                    COUNT(*) AS purchase_count
             FROM Gamers g
             INNER JOIN Purchases p ON g.gamer_tag = p.gamer_tag
             INNER JOIN VideoGames v ON p.game_id = v.game_id
             GROUP BY email_domain(g.email), v.genre
             ORDER BY email_domain ASC, purchase_count DESC, v.genre",
        ),
        expected_columns: &[
            col("email_domain", Text),
            col("genre", Text),
            col("purchase_count", Integer),
        ],
    },
    // ── Query dropdown ──────────────────────────────────────────────
    ReportDefinition {
        id: ReportId::PopularGames,
        title: "Top 5 Most Popular Games",
        template: select(
            "SELECT v.title AS title, v.genre AS genre, COUNT(p.purchase_id) AS times_purchased
             FROM VideoGames v
             INNER JOIN Purchases p ON v.game_id = p.game_id
             GROUP BY v.title, v.genre
             ORDER BY times_purchased DESC, v.title
             LIMIT 5",
        ),
        expected_columns: GAME_PURCHASE_COUNT,
    },
    ReportDefinition {
        id: ReportId::MostPurchases,
        title: "Gamers With Most Purchases",
        template: select(
            "SELECT g.gamer_tag AS gamer_tag, g.email AS email,
                    COUNT(p.purchase_id) AS games_purchased
             FROM Gamers g
             INNER JOIN Purchases p ON g.gamer_tag = p.gamer_tag
             GROUP BY g.gamer_tag, g.email
             ORDER BY games_purchased DESC, g.gamer_tag",
        ),
        expected_columns: &[
            col("gamer_tag", Text),
            col("email", Text),
            col("games_purchased", Integer),
        ],
    },
    ReportDefinition {
        id: ReportId::HighestSpending,
        title: "Gamers With Highest Spending",
        template: select(
            "SELECT g.gamer_tag AS gamer_tag, g.email AS email,
                    SUM(p.price_paid) AS total_spent
             FROM Gamers g
             INNER JOIN Purchases p ON g.gamer_tag = p.gamer_tag
             GROUP BY g.gamer_tag, g.email
             ORDER BY total_spent DESC, g.gamer_tag",
        ),
        expected_columns: &[
            col("gamer_tag", Text),
            col("email", Text),
            col("total_spent", Real),
        ],
    },
    ReportDefinition {
        id: ReportId::NoPurchases,
        title: "Gamers With No Purchases",
        template: select(
            "SELECT g.gamer_tag AS gamer_tag, g.email AS email
             FROM Gamers g
             LEFT JOIN Purchases p ON g.gamer_tag = p.gamer_tag
             WHERE p.purchase_id IS NULL
             ORDER BY g.gamer_tag",
        ),
        expected_columns: &[col("gamer_tag", Text), col("email", Text)],
    },
    ReportDefinition {
        id: ReportId::NotPurchased,
        title: "Games Not Purchased",
        template: select(
            "SELECT v.title AS title, v.genre AS genre, v.price AS price
             FROM VideoGames v
             LEFT JOIN Purchases p ON v.game_id = p.game_id
             WHERE p.purchase_id IS NULL
             ORDER BY v.title",
        ),
        expected_columns: GAME_PRICE,
    },
    ReportDefinition {
        id: ReportId::ExpensiveGames,
        title: "Most Expensive Games",
        template: select(
            "SELECT v.title AS title, v.genre AS genre, v.price AS price
             FROM VideoGames v
             ORDER BY v.price DESC, v.title
             LIMIT 5",
        ),
        expected_columns: GAME_PRICE,
    },
    ReportDefinition {
        id: ReportId::CheapestGames,
        title: "Cheapest Games",
        template: select(
            "SELECT v.title AS title, v.genre AS genre, v.price AS price
             FROM VideoGames v
             ORDER BY v.price ASC, v.title
             LIMIT 5",
        ),
        expected_columns: GAME_PRICE,
    },
    ReportDefinition {
        id: ReportId::PublisherGames,
        title: "Publishers By Game Count",
        template: select(
            "SELECT gp.name AS name, gp.country AS country,
                    COUNT(v.game_id) AS games_published
             FROM GamePublishers gp
             INNER JOIN VideoGames v ON gp.publisher_id = v.publisher_id
             GROUP BY gp.name, gp.country
             ORDER BY games_published DESC, gp.name",
        ),
        expected_columns: &[
            col("name", Text),
            col("country", Text),
            col("games_published", Integer),
        ],
    },
    // ── Stored procedures ───────────────────────────────────────────
    ReportDefinition {
        id: ReportId::GamersWithPurchases,
        title: "All Gamers With Their Purchase Statistics",
        template: call("ShowGamersWithPurchases", &[]),
        expected_columns: &[
            col("gamer_tag", Text),
            col("email", Text),
            col("games_purchased", Integer),
            col("total_spent", Real),
        ],
    },
    ReportDefinition {
        id: ReportId::PurchasedGames,
        title: "Games That Have Been Purchased",
        template: call("ShowPurchasedGames", &[]),
        expected_columns: GAME_PRICE,
    },
    ReportDefinition {
        id: ReportId::GamerLibrary,
        title: "Gamer Library",
        template: call("ShowGamerLibrary", GAMER_TAG),
        expected_columns: &[
            col("title", Text),
            col("genre", Text),
            col("price_paid", Real),
            col("purchase_date", Date),
        ],
    },
];

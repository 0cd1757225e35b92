//! Stored procedures of the game store database.
//!
//! SQLite has no CREATE PROCEDURE, so `SqliteSource` runs each routine's
//! SELECT body directly. Arguments are bound by name, exactly like the
//! catalog's own placeholders.

/// A named read-only routine and the argument names its body binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Routine {
    pub name: &'static str,
    pub args: &'static [&'static str],
    pub body: &'static str,
}

pub static STANDARD_ROUTINES: &[Routine] = &[
    Routine {
        name: "ShowGamersWithPurchases",
        args: &[],
        body: "SELECT g.gamer_tag AS gamer_tag, g.email AS email,
                      COUNT(p.purchase_id) AS games_purchased,
                      SUM(p.price_paid)    AS total_spent
               FROM Gamers g
               INNER JOIN Purchases p ON g.gamer_tag = p.gamer_tag
               GROUP BY g.gamer_tag, g.email
               ORDER BY total_spent DESC, g.gamer_tag",
    },
    Routine {
        name: "ShowPurchasedGames",
        args: &[],
        body: "SELECT DISTINCT v.title AS title, v.genre AS genre, v.price AS price
               FROM VideoGames v
               INNER JOIN Purchases p ON v.game_id = p.game_id
               ORDER BY v.title",
    },
    Routine {
        name: "ShowGamerLibrary",
        args: &["gamer_tag"],
        body: "SELECT v.title AS title, v.genre AS genre,
                      p.price_paid AS price_paid, p.purchase_date AS purchase_date
               FROM Purchases p
               INNER JOIN VideoGames v ON p.game_id = v.game_id
               WHERE p.gamer_tag = :gamer_tag
               ORDER BY p.purchase_date, v.title",
    },
];

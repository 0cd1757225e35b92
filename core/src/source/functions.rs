//! Scalar SQL functions registered on every connection.
//!
//! `email_domain(text)`: text after the last `@`, or the whole text.
//! `age_years(date)`   : full years from an ISO date until today.

use chrono::{Datelike, Local, NaiveDate};
use rusqlite::{functions::FunctionFlags, Connection};

pub(crate) fn register(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "email_domain",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let email = ctx.get::<Option<String>>(0)?;
            Ok(email.map(|e| email_domain(&e).to_string()))
        },
    )?;

    // Not deterministic: depends on today's date.
    conn.create_scalar_function("age_years", 1, FunctionFlags::SQLITE_UTF8, |ctx| {
        let birth = ctx.get::<Option<String>>(0)?;
        let today = Local::now().date_naive();
        Ok(birth
            .as_deref()
            .and_then(parse_date)
            .map(|b| full_years_between(b, today)))
    })?;

    Ok(())
}

pub(crate) fn email_domain(email: &str) -> &str {
    email.rsplit_once('@').map(|(_, domain)| domain).unwrap_or(email)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    s.get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}

pub(crate) fn full_years_between(birth: NaiveDate, today: NaiveDate) -> i64 {
    let mut years = i64::from(today.year() - birth.year());
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years
}

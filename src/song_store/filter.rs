//! Translation of a `SongFilter` into a SQL `WHERE` clause.

use super::error::{SongStoreError, SongStoreResult};
use super::models::{LyricsFilter, ReleaseDateFilter, SongFilter};
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, ToSql};

/// Name of the scalar function used for case-insensitive matching.
pub const FOLD_CASE_FN: &str = "fold_case";

/// Registers `fold_case(text)`, a Unicode-aware lowercase that passes NULL through.
pub fn register_fold_case(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_CASE_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|s| fold_case(&s)))
        },
    )
}

pub fn fold_case(s: &str) -> String {
    s.to_lowercase()
}

/// A SQL condition together with the positional parameters it binds.
pub struct SqlCondition {
    pub clause: String,
    pub params: Vec<Box<dyn ToSql>>,
}

impl SqlCondition {
    pub fn param_refs(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

fn contains_condition(column: &str) -> String {
    format!("instr({}({}), ?) > 0", FOLD_CASE_FN, column)
}

fn non_empty_condition(column: &str) -> String {
    format!("({0} IS NOT NULL AND {0} <> '')", column)
}

/// Builds the `WHERE` clause for `filter`. Returns an empty clause when no
/// predicate is set.
pub fn build_where(filter: &SongFilter) -> SongStoreResult<SqlCondition> {
    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(artist) = filter.artist.as_deref().filter(|s| !s.is_empty()) {
        conditions.push(contains_condition("artist"));
        params.push(Box::new(fold_case(artist)));
    }

    if let Some(title) = filter.title.as_deref().filter(|s| !s.is_empty()) {
        conditions.push(contains_condition("title"));
        params.push(Box::new(fold_case(title)));
    }

    match filter.release_date {
        Some(ReleaseDateFilter::On(date)) => {
            conditions.push("release_date = ?".to_string());
            params.push(Box::new(date));
        }
        Some(ReleaseDateFilter::Between(from, to)) => {
            if from > to {
                return Err(SongStoreError::InvalidFilter(format!(
                    "release date range starts after it ends ({} > {})",
                    from, to
                )));
            }
            conditions.push("release_date BETWEEN ? AND ?".to_string());
            params.push(Box::new(from));
            params.push(Box::new(to));
        }
        None => {}
    }

    match &filter.lyrics {
        Some(LyricsFilter::NonEmpty) => conditions.push(non_empty_condition("lyrics")),
        Some(LyricsFilter::Contains(needle)) if !needle.is_empty() => {
            conditions.push(contains_condition("lyrics"));
            params.push(Box::new(fold_case(needle)));
        }
        _ => {}
    }

    if filter.link_non_empty {
        conditions.push(non_empty_condition("link"));
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    Ok(SqlCondition { clause, params })
}

//! Validated statement execution and scalar normalization.
//!
//! The executor runs one statement once and reduces the result set to a
//! single integer:
//!
//! | Result set | Outcome |
//! |------------|---------|
//! | no rows | `0` |
//! | one row, one `NULL` column | `0` |
//! | one row, one column | the value as an integer |
//! | anything else | shape error |
//!
//! Fetching rows is behind the [`Database`] trait; [`PostgresDatabase`]
//! implements it with `sqlx`.

use std::future::Future;

use sqlx::{
    Column, PgPool, Row, TypeInfo,
    postgres::{PgPoolOptions, PgRow}
};

use crate::error::{AppResult, database_error, shape_error, value_error};

/// One result cell, decoded as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// SQL `NULL`
    Null,
    /// Value of a numeric column (integer, decimal or floating point)
    Number(String),
    /// Value of any other column
    Text(String)
}

/// Source of result rows for a single statement.
pub trait Database: Send + Sync {
    /// Execute `sql` once and return every row.
    fn fetch_rows(&self, sql: &str) -> impl Future<Output = AppResult<Vec<Vec<Cell>>>> + Send;
}

/// Runs validated statements and returns their scalar result.
#[derive(Debug, Clone)]
pub struct QueryExecutor<D> {
    database: D
}

impl<D: Database> QueryExecutor<D> {
    pub fn new(database: D) -> Self {
        Self {
            database
        }
    }

    /// Execute a validated statement and reduce the result to an integer.
    pub async fn execute(&self, sql: &str) -> AppResult<i64> {
        let rows = self.database.fetch_rows(sql).await?;
        tracing::debug!(rows = rows.len(), "statement executed");
        scalar_from_rows(&rows)
    }
}

/// Reduce a result set to the single integer it must contain.
///
/// # Example
///
/// ```
/// use nl_sql_bridge::executor::{Cell, scalar_from_rows};
///
/// assert_eq!(scalar_from_rows(&[]).unwrap(), 0);
/// assert_eq!(scalar_from_rows(&[vec![Cell::Null]]).unwrap(), 0);
/// assert_eq!(scalar_from_rows(&[vec![Cell::Number("3".into())]]).unwrap(), 3);
/// assert!(scalar_from_rows(&[vec![Cell::Null], vec![Cell::Null]]).is_err());
/// ```
pub fn scalar_from_rows(rows: &[Vec<Cell>]) -> AppResult<i64> {
    match rows {
        [] => Ok(0),
        [row] => match row.as_slice() {
            [cell] => cell_to_integer(cell),
            cells => Err(shape_error(1, cells.len()))
        },
        _ => {
            let columns = rows.first().map_or(0, Vec::len);
            Err(shape_error(rows.len(), columns))
        }
    }
}

fn cell_to_integer(cell: &Cell) -> AppResult<i64> {
    match cell {
        Cell::Null => Ok(0),
        Cell::Number(text) => parse_number(text).ok_or_else(|| value_error(text)),
        Cell::Text(text) => text.trim().parse().map_err(|_| value_error(text))
    }
}

/// Integer part of a numeric value, truncated toward zero
fn parse_number(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(value) = text.parse::<i64>() {
        return Some(value);
    }
    if let Some((whole, fraction)) = text.split_once('.')
        && !fraction.is_empty()
        && fraction.bytes().all(|b| b.is_ascii_digit())
        && let Ok(value) = whole.parse::<i64>()
    {
        return Some(value);
    }
    let value = text.parse::<f64>().ok()?;
    if value.is_finite() && value.trunc().abs() < i64::MAX as f64 {
        Some(value.trunc() as i64)
    } else {
        None
    }
}

fn is_numeric_type(name: &str) -> bool {
    matches!(
        name,
        "INT2" | "INT4" | "INT8" | "NUMERIC" | "FLOAT4" | "FLOAT8" | "OID"
    )
}

/// Postgres-backed [`Database`].
///
/// Each statement checks out its own pooled connection, so concurrent
/// questions never share a session.
#[derive(Debug, Clone)]
pub struct PostgresDatabase {
    pool: PgPool
}

impl PostgresDatabase {
    /// Creates a new database with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool
        }
    }

    /// Connect a pool of at most `max_connections` connections.
    pub async fn connect(url: &str, max_connections: u32) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(database_error)?;
        Ok(Self::new(pool))
    }
}

impl Database for PostgresDatabase {
    async fn fetch_rows(&self, sql: &str) -> AppResult<Vec<Vec<Cell>>> {
        // Simple-query protocol: one round trip, results in text format.
        let rows = sqlx::raw_sql(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;
        rows.iter().map(row_cells).collect()
    }
}

fn row_cells(row: &PgRow) -> AppResult<Vec<Cell>> {
    row.columns()
        .iter()
        .map(|column| {
            let text: Option<String> = row
                .try_get_unchecked(column.ordinal())
                .map_err(database_error)?;
            Ok(match text {
                None => Cell::Null,
                Some(text) if is_numeric_type(column.type_info().name()) => Cell::Number(text),
                Some(text) => Cell::Text(text)
            })
        })
        .collect()
}

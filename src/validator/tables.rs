//! Heuristic table reference extraction.
//!
//! This is a textual scan, not a parser. It reads every `from <ident>` and
//! `join <ident>` pair of the lower-cased statement and knows nothing about
//! string literals, comments, CTE names, schema-qualified names or
//! `EXTRACT(field FROM column)`, so it can report names that are not tables
//! and miss tables written in other forms.

use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;

static TABLE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:from|join)\s+([a-z_][a-z0-9_]*)").expect("valid regex")
});

/// Collect lower-cased names following `FROM` or `JOIN`.
///
/// # Example
///
/// ```
/// use nl_sql_bridge::validator::extract_referenced_tables;
///
/// let tables = extract_referenced_tables(
///     "SELECT COUNT(*) FROM Videos v JOIN video_snapshots s ON s.video_id = v.id"
/// );
/// assert_eq!(tables.into_iter().collect::<Vec<_>>(), ["video_snapshots", "videos"]);
/// ```
pub fn extract_referenced_tables(sql: &str) -> BTreeSet<String> {
    let lowered = sql.to_lowercase();
    TABLE_REFERENCE
        .captures_iter(&lowered)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

//! Candidate SQL extraction from raw model output.
//!
//! Models wrap SQL in markdown fences, prefix it with `SQL:` or end it with a
//! semicolon. [`extract_sql`] strips those artifacts and nothing else: the
//! result is never checked for correctness here.
//!
//! # Steps
//!
//! 1. Take the interior of the first fenced block (optionally tagged `sql`),
//!    or the whole text when there is none
//! 2. Trim surrounding whitespace
//! 3. Drop a leading case-insensitive `sql:` label
//! 4. Drop trailing `;` characters and whitespace
//!
//! # Example
//!
//! ```
//! use nl_sql_bridge::extract::extract_sql;
//!
//! let raw = "```sql\nSELECT COUNT(*) FROM videos;\n```";
//! assert_eq!(extract_sql(raw), "SELECT COUNT(*) FROM videos");
//! assert_eq!(extract_sql("SQL: DROP TABLE videos"), "DROP TABLE videos");
//! ```

use std::sync::LazyLock;

use regex::Regex;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```(?:[ \t]*sql)?[ \t]*\r?\n?(.*?)```").expect("valid fence regex")
});

static SQL_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^sql:\s*").expect("valid label regex"));

/// Reduce raw model output to a candidate SQL string.
pub fn extract_sql(raw: &str) -> String {
    let body = FENCED_BLOCK
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or(raw, |m| m.as_str());
    let body = body.trim();
    let body = SQL_LABEL
        .find(body)
        .map_or(body, |label| &body[label.end()..]);
    body.trim_end_matches(|c: char| c == ';' || c.is_whitespace())
        .to_string()
}

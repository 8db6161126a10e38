use std::sync::LazyLock;

use regex::Regex;

use super::{Check, CheckInfo, Rejection, extract_referenced_tables};
use crate::schema::is_allowed_table;

/// Keywords that change data or schema
pub const FORBIDDEN_KEYWORDS: [&str; 9] = [
    "insert", "update", "delete", "drop", "alter", "create", "truncate", "grant", "revoke"
];

static FORBIDDEN_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b({})\b", FORBIDDEN_KEYWORDS.join("|"))).expect("valid regex")
});

/// Rejects statement stacking such as `SELECT 1; DROP TABLE videos`
///
/// Any `;` is refused, including one inside a string literal.
pub struct NoStatementSeparator;

impl Check for NoStatementSeparator {
    fn info(&self) -> CheckInfo {
        CheckInfo {
            id:   "GUARD001",
            name: "Statement separator"
        }
    }

    fn inspect(&self, sql: &str) -> Option<Rejection> {
        sql.contains(';').then_some(Rejection::StatementSeparator)
    }
}

/// Only `SELECT` may start the statement
///
/// `WITH` and `EXPLAIN` are refused as well.
pub struct SelectOnly;

impl Check for SelectOnly {
    fn info(&self) -> CheckInfo {
        CheckInfo {
            id:   "GUARD002",
            name: "Disallowed verb"
        }
    }

    fn inspect(&self, sql: &str) -> Option<Rejection> {
        let token = sql.split_whitespace().next().unwrap_or_default();
        if token.eq_ignore_ascii_case("select") {
            return None;
        }
        Some(Rejection::DisallowedVerb {
            token: token.to_string()
        })
    }
}

/// Mutating keywords are refused anywhere in the text, subqueries and
/// comments included
pub struct NoMutatingKeyword;

impl Check for NoMutatingKeyword {
    fn info(&self) -> CheckInfo {
        CheckInfo {
            id:   "GUARD003",
            name: "Forbidden keyword"
        }
    }

    fn inspect(&self, sql: &str) -> Option<Rejection> {
        FORBIDDEN_KEYWORD
            .find(sql)
            .map(|m| Rejection::ForbiddenKeyword {
                keyword: m.as_str().to_lowercase()
            })
    }
}

/// Every table found after `FROM`/`JOIN` must be readable
///
/// A statement with no detectable table passes.
pub struct AllowedTablesOnly;

impl Check for AllowedTablesOnly {
    fn info(&self) -> CheckInfo {
        CheckInfo {
            id:   "GUARD004",
            name: "Disallowed table"
        }
    }

    fn inspect(&self, sql: &str) -> Option<Rejection> {
        let disallowed: Vec<String> = extract_referenced_tables(sql)
            .into_iter()
            .filter(|table| !is_allowed_table(table))
            .collect();
        if disallowed.is_empty() {
            return None;
        }
        Some(Rejection::DisallowedTable {
            tables: disallowed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_inside_identifier_ignored() {
        let sql = "SELECT COUNT(*) FROM videos WHERE created_at > updated_at";
        assert!(NoMutatingKeyword.inspect(sql).is_none());
    }

    #[test]
    fn test_keyword_in_comment_rejected() {
        let sql = "SELECT 1 FROM videos -- drop later";
        assert_eq!(
            NoMutatingKeyword.inspect(sql),
            Some(Rejection::ForbiddenKeyword {
                keyword: String::from("drop")
            })
        );
    }

    #[test]
    fn test_leading_whitespace_before_verb() {
        assert!(SelectOnly.inspect("\n  select 1").is_none());
    }

    #[test]
    fn test_with_clause_refused() {
        let rejection = SelectOnly.inspect("WITH t AS (SELECT 1) SELECT * FROM t");
        assert_eq!(
            rejection,
            Some(Rejection::DisallowedVerb {
                token: String::from("WITH")
            })
        );
    }

    #[test]
    fn test_all_offending_tables_listed() {
        let rejection =
            AllowedTablesOnly.inspect("SELECT 1 FROM users JOIN videos ON 1=1 JOIN orders ON 1=1");
        assert_eq!(
            rejection,
            Some(Rejection::DisallowedTable {
                tables: vec![String::from("orders"), String::from("users")]
            })
        );
    }
}

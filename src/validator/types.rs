//! Outcome types of the read-only validator.
//!
//! - [`Validation`] - tagged result of validating one candidate
//! - [`Rejection`] - the reason a candidate was refused
//! - [`CheckInfo`] - identification of a single check

use serde::Serialize;

/// Metadata about a check for identification and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInfo {
    /// Unique check identifier (e.g., "GUARD001")
    pub id:   &'static str,
    /// Human-readable check name
    pub name: &'static str
}

/// Reason a candidate statement was refused.
///
/// The [`Display`](std::fmt::Display) text is shown to the end user, so it
/// always names the rule that fired and the offending input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    /// A `;` appears somewhere in the candidate
    StatementSeparator,
    /// The first token is not `SELECT`
    DisallowedVerb {
        /// Offending first token, empty for an empty candidate
        token: String
    },
    /// A data or schema mutating keyword appears as a whole word
    ForbiddenKeyword {
        /// Lower-cased keyword
        keyword: String
    },
    /// Tables outside the allow-list are referenced
    DisallowedTable {
        /// Lower-cased offending table names, sorted
        tables: Vec<String>
    }
}

impl Rejection {
    /// Identifier of the check that produced this rejection
    pub fn rule_id(&self) -> &'static str {
        match self {
            Self::StatementSeparator => "GUARD001",
            Self::DisallowedVerb {
                ..
            } => "GUARD002",
            Self::ForbiddenKeyword {
                ..
            } => "GUARD003",
            Self::DisallowedTable {
                ..
            } => "GUARD004"
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StatementSeparator => {
                write!(f, "multiple statements are not allowed (found ';')")
            }
            Self::DisallowedVerb {
                token
            } if token.is_empty() => write!(f, "only SELECT queries are allowed, got an empty query"),
            Self::DisallowedVerb {
                token
            } => write!(f, "only SELECT queries are allowed, got '{}'", token),
            Self::ForbiddenKeyword {
                keyword
            } => write!(f, "forbidden keyword '{}' in query", keyword),
            Self::DisallowedTable {
                tables
            } => write!(
                f,
                "query references disallowed table(s): {}",
                tables.join(", ")
            )
        }
    }
}

/// Tagged result of validating a candidate statement.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Candidate may be executed
    Accepted,
    /// Candidate must be discarded
    Rejected(Rejection)
}

impl Validation {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Rejection reason, if any
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Accepted => None,
            Self::Rejected(reason) => Some(reason)
        }
    }

    /// Convert into a `Result` for `?`-style callers
    pub fn into_result(self) -> Result<(), Rejection> {
        match self {
            Self::Accepted => Ok(()),
            Self::Rejected(reason) => Err(reason)
        }
    }
}

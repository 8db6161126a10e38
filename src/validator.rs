//! Read-only policy for model-generated SQL.
//!
//! The validator stands between an untrusted text generator and the
//! production database. It is an allow-list filter over the statement text,
//! not a SQL parser: checks run in a fixed order and the first one that fails
//! decides the [`Rejection`].
//!
//! # Checks
//!
//! | ID | Name | Refuses |
//! |----|------|---------|
//! | GUARD001 | Statement separator | any `;` |
//! | GUARD002 | Disallowed verb | a first token other than `SELECT` |
//! | GUARD003 | Forbidden keyword | `insert`, `update`, `delete`, `drop`, `alter`, `create`, `truncate`, `grant`, `revoke` as whole words |
//! | GUARD004 | Disallowed table | `FROM`/`JOIN` targets outside `videos`, `video_snapshots` |
//!
//! GUARD002 and GUARD003 carry the guarantee. GUARD004 relies on
//! [`extract_referenced_tables`], a textual heuristic.
//!
//! # Example
//!
//! ```
//! use nl_sql_bridge::validator::{Rejection, SqlValidator, Validation};
//!
//! let validator = SqlValidator::new();
//!
//! assert_eq!(
//!     validator.validate("SELECT COUNT(*) FROM videos"),
//!     Validation::Accepted
//! );
//!
//! let verdict = validator.validate("SELECT * FROM users");
//! assert!(matches!(
//!     verdict,
//!     Validation::Rejected(Rejection::DisallowedTable { .. })
//! ));
//! ```

mod checks;
mod tables;
mod types;

pub use checks::{
    AllowedTablesOnly, FORBIDDEN_KEYWORDS, NoMutatingKeyword, NoStatementSeparator, SelectOnly
};
pub use tables::extract_referenced_tables;
pub use types::{CheckInfo, Rejection, Validation};

/// A single validation step.
///
/// Checks are stateless and inspect the trimmed candidate.
pub trait Check: Send + Sync {
    /// Returns metadata about this check.
    fn info(&self) -> CheckInfo;

    /// Returns the rejection if the candidate fails this check.
    fn inspect(&self, sql: &str) -> Option<Rejection>;
}

/// Ordered runner over the mandatory checks.
pub struct SqlValidator {
    checks: Vec<Box<dyn Check>>
}

impl Default for SqlValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlValidator {
    /// Create a validator with all checks in their fixed order
    pub fn new() -> Self {
        Self {
            checks: vec![
                Box::new(NoStatementSeparator),
                Box::new(SelectOnly),
                Box::new(NoMutatingKeyword),
                Box::new(AllowedTablesOnly),
            ]
        }
    }

    /// Validate a candidate statement
    pub fn validate(&self, candidate: &str) -> Validation {
        let sql = candidate.trim();
        for check in &self.checks {
            if let Some(rejection) = check.inspect(sql) {
                tracing::debug!(
                    check = check.info().id,
                    reason = %rejection,
                    "candidate rejected"
                );
                return Validation::Rejected(rejection);
            }
        }
        Validation::Accepted
    }

    /// Metadata of the checks in evaluation order
    pub fn checks(&self) -> Vec<CheckInfo> {
        self.checks.iter().map(|c| c.info()).collect()
    }
}

impl std::fmt::Debug for SqlValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlValidator")
            .field("checks", &self.checks())
            .finish()
    }
}

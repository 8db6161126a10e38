pub use masterror::{AppError, AppResult};

/// Create file read error
pub fn file_read_error(path: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to read file '{}': {}", path, source))
}

/// Create system prompt read error
pub fn prompt_read_error(path: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!(
        "Failed to read system prompt '{}': {}",
        path, source
    ))
}

/// Create config error
pub fn config_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(message.into())
}

/// Create LLM API error
pub fn llm_api_error(message: impl Into<String>) -> AppError {
    AppError::service(message.into())
}

/// Create HTTP error
pub fn http_error(err: reqwest::Error) -> AppError {
    let msg = if err.is_timeout() {
        format!("Request timeout: {}", err)
    } else if err.is_connect() {
        format!("Connection failed: {}", err)
    } else if err.is_status() {
        format!("HTTP error {}: {}", err.status().unwrap_or_default(), err)
    } else {
        err.to_string()
    };
    AppError::service(msg)
}

/// Create database error
///
/// Covers connection failures as well as statements the server refuses
/// (syntax errors, unknown columns) after passing validation.
pub fn database_error(err: sqlx::Error) -> AppError {
    let msg = match &err {
        sqlx::Error::Database(db) => match db.code() {
            Some(code) => format!("Database error [{}]: {}", code, db.message()),
            None => format!("Database error: {}", db.message())
        },
        sqlx::Error::PoolTimedOut => String::from("Database error: connection pool timed out"),
        other => format!("Database error: {}", other)
    };
    AppError::service(msg)
}

/// Create result shape error
pub fn shape_error(rows: usize, columns: usize) -> AppError {
    AppError::internal(format!(
        "expected exactly one row and one column, got {} row(s) and {} column(s)",
        rows, columns
    ))
}

/// Create scalar conversion error quoting the offending value
pub fn value_error(value: &str) -> AppError {
    AppError::internal(format!("cannot convert value '{}' to an integer", value))
}

/// Create error for a completion worker that panicked or was cancelled
pub fn worker_error(err: tokio::task::JoinError) -> AppError {
    if err.is_panic() {
        AppError::internal("Completion worker panicked")
    } else {
        AppError::internal(format!("Completion worker failed: {}", err))
    }
}

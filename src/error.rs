use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidReference(String),

    #[error("Invalid payload: {0}")]
    Serialization(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Error body returned across the command boundary.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{error} ({status})")]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
}

impl AppError {
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) => 400,
            AppError::InvalidReference(_) => 400,
            AppError::Serialization(_) => 400,
            AppError::NotFound(_) => 404,
            AppError::Conflict(_) => 409,
            AppError::Database(_) => 500,
        }
    }

    /// Build the response body. Database details stay in the log, not in the response.
    pub fn to_response(&self) -> ErrorResponse {
        let error = match self {
            AppError::Database(detail) => {
                log::error!("Persistence failure: {}", detail);
                "Internal storage error".to_string()
            }
            other => other.to_string(),
        };
        ErrorResponse {
            status: self.status_code(),
            error,
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound("Record".to_string()),
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                match failure.extended_code {
                    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => AppError::Conflict(
                        "A record with this information already exists".to_string(),
                    ),
                    rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                        AppError::InvalidReference("Invalid reference to a related record".to_string())
                    }
                    _ => AppError::Validation(format!("Constraint violation: {}", err)),
                }
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for AppError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        AppError::Database(format!("Connection lock poisoned: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Validation("x".into()).status_code(), 400);
        assert_eq!(AppError::NotFound("Journal entry".into()).status_code(), 404);
        assert_eq!(AppError::Conflict("x".into()).status_code(), 409);
        assert_eq!(AppError::Database("x".into()).status_code(), 500);
    }

    #[test]
    fn test_not_found_message() {
        let err = AppError::NotFound("Journal entry".to_string());
        assert_eq!(err.to_string(), "Journal entry not found");
        assert_eq!(
            err.to_response(),
            ErrorResponse { status: 404, error: "Journal entry not found".to_string() }
        );
    }

    #[test]
    fn test_database_details_are_hidden() {
        let response = AppError::Database("disk I/O error".into()).to_response();
        assert_eq!(response.status, 500);
        assert!(!response.error.contains("disk"));
    }

    #[test]
    fn test_constraint_violations_are_mapped() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE parent (id TEXT PRIMARY KEY);
             CREATE TABLE child (id TEXT PRIMARY KEY, parent_id TEXT REFERENCES parent(id), code TEXT UNIQUE);",
        )
        .unwrap();

        conn.execute("INSERT INTO child (id, code) VALUES ('a', 'X')", []).unwrap();
        let dup = conn
            .execute("INSERT INTO child (id, code) VALUES ('b', 'X')", [])
            .unwrap_err();
        assert!(matches!(AppError::from(dup), AppError::Conflict(_)));

        let orphan = conn
            .execute("INSERT INTO child (id, parent_id) VALUES ('c', 'missing')", [])
            .unwrap_err();
        let mapped = AppError::from(orphan);
        assert!(matches!(mapped, AppError::InvalidReference(_)));
        assert_eq!(mapped.status_code(), 400);
    }
}

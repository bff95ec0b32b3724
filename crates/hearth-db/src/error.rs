//! # Storage Errors
//!
//! Every repository call returns [`DbResult`]. SQLite failures are sorted into
//! the few cases callers act on.
//!
//! ```text
//! sqlx::Error / MigrateError
//!        │  From
//!        ▼
//!     DbError ───► BakeryStore: a failed write is queued (Durability::Queued)
//!        │         UniqueViolation on a report append means "already saved"
//!        ▼
//!     AppError::DatabaseError (details logged, generic message shown)
//! ```

use thiserror::Error;

/// What a repository call can fail with.
#[derive(Debug, Error)]
pub enum DbError {
    /// A lookup by id found nothing.
    #[error("{entity} {id} does not exist")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the row:
    /// - Appending a report whose id or shift is already archived
    /// - Two catalog items whose names only differ in case
    #[error("{field} must be unique ({value})")]
    UniqueViolation { field: String, value: String },

    /// Ledger or inventory rows written for a shift that is not stored.
    #[error("Missing parent row: {message}")]
    ForeignKeyViolation { message: String },

    /// The file could not be opened or created, or the pool is closed.
    #[error("Cannot open database: {0}")]
    ConnectionFailed(String),

    #[error("Schema migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected the statement for another reason.
    #[error("SQLite rejected the statement: {0}")]
    QueryFailed(String),

    /// A stored row no longer maps onto a domain value:
    /// - Report snapshot JSON was edited by hand
    /// - A discharge row lost its reason
    #[error("Corrupt {entity} row {id}: {reason}")]
    Corrupt {
        entity: String,
        id: String,
        reason: String,
    },

    /// No connection became free within the acquire timeout.
    #[error("Timed out waiting for a database connection")]
    PoolExhausted,

    #[error("Database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn corrupt(
        entity: impl Into<String>,
        id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DbError::Corrupt {
            entity: entity.into(),
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Constraint failures are recognised from SQLite's message text.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "?"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // "UNIQUE constraint failed: shift_reports.id"
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::duplicate(field, "existing row")
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("database closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DbError::not_found("Shift", "abc").to_string(),
            "Shift abc does not exist"
        );
        assert_eq!(
            DbError::corrupt("shift_reports", "r1", "bad json").to_string(),
            "Corrupt shift_reports row r1: bad json"
        );
    }

    #[test]
    fn test_pool_errors_map() {
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::PoolExhausted
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolClosed),
            DbError::ConnectionFailed(_)
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::RowNotFound),
            DbError::NotFound { .. }
        ));
    }
}

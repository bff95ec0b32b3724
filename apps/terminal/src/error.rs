//! # Terminal Error Types
//!
//! Errors raised by the store, the configuration loader and the CLI.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Hearth                                 │
//! │                                                                         │
//! │  store.add_production("13", 0)                                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  BakeryStore command                                             │  │
//! │  │  Result<Committed<T>, StoreError>                                │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Not signed in? ─────── StoreError::Unauthorized ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Rule broken? ───────── StoreError::Domain ─────── AppError ───►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Write failed? ──────── Ok(Committed { durability: Queued })    │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  A failed durable write is not an error: the change already happened   │
//! │  in memory and sits in the retry queue.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use hearth_core::CoreError;
use hearth_db::DbError;

// =============================================================================
// Store Error
// =============================================================================

/// What a [`crate::store::BakeryStore`] call can fail with.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A command was issued without a signed-in operator.
    #[error("Not signed in: cannot {0}")]
    Unauthorized(&'static str),

    /// A catalog, lifecycle or ledger rule rejected the command.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Loading state or reading the report archive failed.
    #[error("Persistence failed: {0}")]
    Persistence(#[from] DbError),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Config Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config: {0}")]
    Write(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The platform has no home directory to derive defaults from.
    #[error("Could not determine the application directories")]
    NoProjectDirs,
}

// =============================================================================
// App Error
// =============================================================================

/// Coded error handed to the operator (CLI output, or a UI shell).
///
/// ## Serialization
/// ```json
/// {
///   "code": "SHIFT_CLOSED",
///   "message": "Shift is closed, cannot add production"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown item, entry or report
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Wrong shift status for the transition
    InvalidState,

    /// Ledger or count write on a closed shift
    ShiftClosed,

    /// Duplicate name, or an item still referenced by the shift
    Conflict,

    /// No operator signed in
    Unauthorized,

    /// Database operation failed
    DatabaseError,

    /// Configuration could not be loaded
    ConfigError,

    /// Bad command line
    Usage,

    Internal,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Usage, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }

    /// Process exit status for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self.code {
            ErrorCode::Usage => 2,
            ErrorCode::ConfigError => 3,
            ErrorCode::DatabaseError => 4,
            _ => 1,
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::InvalidState { .. } => ErrorCode::InvalidState,
            CoreError::ShiftClosed { .. } => ErrorCode::ShiftClosed,
            CoreError::UnknownItem(_) | CoreError::EntryNotFound { .. } => ErrorCode::NotFound,
            CoreError::ItemInUse { .. } | CoreError::DuplicateName(_) => ErrorCode::Conflict,
            CoreError::InvalidQuantity(_) | CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        AppError::new(code, err.to_string())
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                AppError::new(ErrorCode::NotFound, format!("{} not found: {}", entity, id))
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            // Everything else is logged in full and reported generically
            other => {
                tracing::error!("Database error: {}", other);
                AppError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unauthorized(_) => AppError::new(ErrorCode::Unauthorized, err.to_string()),
            StoreError::Domain(e) => AppError::from(e),
            StoreError::Persistence(e) => AppError::from(e),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

//! # Pool & Database Handle
//!
//! Opening `hearth.db` and handing out repositories.
//!
//! ```text
//! AppConfig.database ──► DbConfig::new(path).max_connections(n)
//!                               │
//!                               ▼
//!                     Database::new(config)
//!                       1. sqlite://path?mode=rwc   (or sqlite::memory:)
//!                       2. WAL, synchronous=NORMAL, foreign_keys=ON
//!                       3. SqlitePool (min..max connections)
//!                       4. embedded migrations
//!                               │
//!              ┌────────────────┼────────────────┐
//!              ▼                ▼                ▼
//!        db.catalog()      db.shifts()      db.reports()
//! ```
//!
//! WAL lets the report history be read while the store is writing a shift.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::catalog::CatalogRepository;
use crate::repository::report::ReportRepository;
use crate::repository::shift::ShiftRepository;

const IN_MEMORY: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the database lives and how the pool is sized.
///
/// ## Example
/// ```rust
/// use hearth_db::DbConfig;
///
/// let config = DbConfig::new("/var/lib/hearth/hearth.db").max_connections(2);
/// assert_eq!(config.max_connections, 2);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// `hearth.db` location, or `:memory:`.
    pub database_path: PathBuf,

    /// Pool ceiling. One terminal rarely needs more than the default 4.
    pub max_connections: u32,

    /// Connections kept open while idle.
    pub min_connections: u32,

    /// Acquire timeout.
    pub connect_timeout: Duration,

    pub idle_timeout: Duration,

    /// Apply `migrations/sqlite` when opening.
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a configuration for a database file, created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 4,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// An isolated in-memory database (for tests).
    ///
    /// One connection only: every connection to `:memory:` would otherwise
    /// see its own empty database.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to an open `hearth.db`. Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and runs migrations when enabled.
    ///
    /// ## SQLite Settings
    /// - WAL journal
    /// - NORMAL synchronous
    /// - Foreign keys on (ledger rows cascade with their shift)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Opening hearth database"
        );

        let options = sqlite_options(&config)?;
        debug!(in_memory = config.is_in_memory(), "SQLite options ready");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Pool ready"
        );

        let database = Database { pool };
        if config.run_migrations {
            database.run_migrations().await?;
        }
        Ok(database)
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// The raw pool, for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn catalog(&self) -> CatalogRepository {
        CatalogRepository::new(self.pool.clone())
    }

    pub fn shifts(&self) -> ShiftRepository {
        ShiftRepository::new(self.pool.clone())
    }

    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(self.pool.clone())
    }

    /// Closes the pool. Every later repository call fails.
    pub async fn close(&self) {
        info!("Closing hearth database");
        self.pool.close().await;
    }

    /// `true` while `SELECT 1` still succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

fn sqlite_options(config: &DbConfig) -> DbResult<SqliteConnectOptions> {
    let url = if config.is_in_memory() {
        "sqlite::memory:".to_string()
    } else {
        format!("sqlite://{}?mode=rwc", config.database_path.display())
    };

    Ok(SqliteConnectOptions::from_str(&url)
        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .create_if_missing(true))
}

// =============================================================================
// Unit Tests
// =============================================================================

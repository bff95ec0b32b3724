//! # Hearth Terminal Library
//!
//! Composition root for the Hearth shift terminal: configuration, logging,
//! the [`store::BakeryStore`] every command goes through, and the CLI.
//!
//! ## Module Organization
//! ```text
//! hearth_terminal_lib/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── AppConfig (hearth.toml + HEARTH_* env)
//! │   └── session.rs  ◄─── Signed-in operator
//! ├── store/
//! │   ├── mod.rs      ◄─── BakeryStore: commands, queries, write-through
//! │   ├── backend.rs  ◄─── Backend trait over hearth-db
//! │   ├── events.rs   ◄─── StoreEvent broadcast + Subscription
//! │   └── pending.rs  ◄─── Retry queue
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command dispatch & output
//! │   └── args.rs     ◄─── clap Cli definition
//! ├── report.rs       ◄─── Text inventory sheet & report history
//! └── error.rs        ◄─── StoreError, ConfigError, AppError
//! ```

pub mod commands;
pub mod error;
pub mod report;
pub mod state;
pub mod store;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hearth_core::Operator;
use hearth_db::{Database, DbConfig};

use commands::{Cli, Parsed};
use error::{AppError, ErrorCode};
use report::ReportStyle;
use state::AppConfig;
use store::{BakeryStore, Durability};

/// Runs one CLI invocation. `args` excludes the program name.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Parse arguments          (--help exits here, no database needed)    │
/// │  2. Load AppConfig           file ◄── env ◄── --db / --operator         │
/// │  3. Open Database            WAL, migrations                            │
/// │  4. BakeryStore::open        catalog (seeded on first run) + shift      │
/// │  5. Sign in                  operator from config, if any               │
/// │  6. Execute command          print output                               │
/// │  7. Flush queued writes      backoff; report anything left unsaved      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(args: impl IntoIterator<Item = String>) -> Result<(), AppError> {
    let cli = match Cli::parse_args(args)? {
        Parsed::Run(cli) => cli,
        Parsed::Info(text) => {
            print!("{}", text);
            return Ok(());
        }
    };

    let mut config = AppConfig::load(cli.config)?;
    if let Some(path) = cli.db {
        config.database.path = Some(path);
    }
    if let Some(name) = cli.operator {
        config.store.operator = Some(name);
    }

    let db_path = config.database_path()?;
    info!(?db_path, "Opening database");
    let database = Arc::new(
        Database::new(DbConfig::new(db_path).max_connections(config.database.max_connections))
            .await?,
    );

    let store = BakeryStore::open(database.clone(), config.store_settings()).await?;
    match &config.store.operator {
        Some(name) => store.sign_in(operator_from_name(name)),
        None if cli.command.is_mutation() => {
            warn!("No operator configured; set HEARTH_OPERATOR or pass --operator");
        }
        None => {}
    }

    let style = ReportStyle::from_config(&config);
    let result =
        commands::execute(&store, cli.command, &style, config.reports.history_limit).await;

    // A CLI process ends here, so give queued writes their retries now
    let durability = if store.pending_writes().await > 0 {
        store.flush_pending().await
    } else {
        Durability::Saved
    };
    database.close().await;

    println!("{}", result?);

    match durability {
        Durability::Saved => Ok(()),
        Durability::Queued { pending, error } => Err(AppError::new(
            ErrorCode::DatabaseError,
            format!("{} change(s) could not be saved: {}", pending, error),
        )),
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so command output on stdout stays clean.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=hearth=trace` - Show trace for hearth crates only
/// - Default: `info,hearth=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hearth=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Operator for a configured display name; the id is a slug of the name.
pub fn operator_from_name(name: &str) -> Operator {
    let name = name.trim();
    let mut id = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            id.extend(c.to_lowercase());
        } else if !id.ends_with('-') && !id.is_empty() {
            id.push('-');
        }
    }
    while id.ends_with('-') {
        id.pop();
    }
    Operator::new(id, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_from_name() {
        let op = operator_from_name("  Ana  María Cruz ");
        assert_eq!(op.id, "ana-maría-cruz");
        assert_eq!(op.display_name, "Ana  María Cruz");

        assert_eq!(operator_from_name("J.R.").id, "j-r");
    }

    #[tokio::test]
    async fn test_help_needs_no_database() {
        run(vec!["--help".to_string()]).await.unwrap();
    }

    #[tokio::test]
    async fn test_usage_error() {
        let err = run(vec!["explode".to_string()]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Usage);
        assert_eq!(err.exit_code(), 2);
    }
}

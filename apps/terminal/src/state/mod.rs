//! # State Module
//!
//! Process-level state the composition root builds before the store.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AppConfig ──► DbConfig, StoreSettings, report style                    │
//! │  Session   ──► the operator store commands run as                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod session;

pub use config::{AppConfig, DatabaseSection, PersistenceSection, ReportsSection, StoreSection};
pub use session::Session;

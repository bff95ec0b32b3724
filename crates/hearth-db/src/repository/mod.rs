//! # Repository Module
//!
//! Database repository implementations for Hearth.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Whole-aggregate Repositories                         │
//! │                                                                         │
//! │  BakeryStore (write-through)                                           │
//! │       │                                                                 │
//! │       │  db.shifts().save(&shift)                                      │
//! │       ▼                                                                 │
//! │  ShiftRepository                                                       │
//! │  ├── save(&self, shift)         one transaction, replaces ledgers      │
//! │  ├── load_current(&self)        follows app_state.current_shift_id     │
//! │  └── get(&self, id)                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  The store owns the live state; repositories only ever receive a       │
//! │  complete value to write or hand one back.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CatalogRepository`](catalog::CatalogRepository) - Ordered catalog snapshot
//! - [`ShiftRepository`](shift::ShiftRepository) - Shifts with their ledgers and counts
//! - [`ReportRepository`](report::ReportRepository) - Append-only report archive

pub mod catalog;
pub mod report;
pub mod shift;

/// Key/value pointers kept in `app_state`.
pub(crate) mod state_keys {
    pub const CURRENT_SHIFT_ID: &str = "current_shift_id";
    pub const CATALOG_INITIALIZED: &str = "catalog_initialized";
}

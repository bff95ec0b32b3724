//! # hearth-core: Pure Business Logic for Hearth
//!
//! Shift inventory reconciliation for a single bakery: what was on the
//! shelf, what was baked, what was written off, what was counted at close,
//! and what all of that is worth.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Hearth Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              hearth-terminal (BakeryStore, CLI)                 │   │
//! │  │    commands ──► store ──► subscribers / write-through queue     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ hearth-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────────┐ ┌──────────────┐  │   │
//! │  │   │ catalog  │ │  shift   │ │reconciliation│ │    report    │  │   │
//! │  │   │  items   │ │lifecycle │ │ rows, totals │ │ ShiftReport  │  │   │
//! │  │   │  seed    │ │ ledgers  │ │ sales data   │ │              │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────────┘ └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK READS • PURE FUNCTIONS       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    hearth-db (Database Layer)                   │   │
//! │  │          SQLite catalog, shifts, report archive                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (CatalogItem, Shift, ledger entries)
//! - [`money`] - Integer-cents Money type
//! - [`catalog`] - Catalog rules and the seed list
//! - [`shift`] - Shift state machine and ledger operations
//! - [`reconciliation`] - Inventory sheet and aggregate figures
//! - [`report`] - The ShiftReport written at close
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: timestamps come in as arguments
//! 2. **No I/O**: storage and notification live in the layers above
//! 3. **Integer Money**: all monetary values are cents (i64)
//! 4. **All-or-nothing writes**: an `Err` means nothing changed

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod money;
pub mod reconciliation;
pub mod report;
pub mod shift;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{default_catalog, Catalog};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use reconciliation::{
    estimated_profit, inventory_sheet, sales_by_item, sales_data, summarize, total_cost,
    total_discharges, total_revenue, DischargeTotals, InventoryRow, SalesPoint, ShiftSummary,
};
pub use report::ShiftReport;
pub use shift::ShiftOpening;
pub use types::*;

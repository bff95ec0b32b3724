//! # Domain Types
//!
//! Core domain types used throughout Hearth.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐        ┌──────────────────────────────────────┐   │
//! │  │  CatalogItem    │◄───────│  Shift (aggregate root)              │   │
//! │  │  ─────────────  │ item_id│  ──────────────────────────────────  │   │
//! │  │  id             │        │  status  CLOSED | OPEN               │   │
//! │  │  name           │        │  start_time / end_time               │   │
//! │  │  category       │        │  opening_cash / closing_cash         │   │
//! │  │  unit           │        │  production: [ProductionEntry]       │   │
//! │  │  cost_cents     │        │  sales:      [SaleEntry]             │   │
//! │  │  price_cents    │        │  discharges: [DischargeEntry]        │   │
//! │  └─────────────────┘        │  inventory_start: item → count       │   │
//! │                             │  inventory_end:   item → count?      │   │
//! │                             └──────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `inventory_end` only holds items the operator has counted. A missing key
//! means "not counted yet" and is never the same thing as a count of zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

/// Per-item inventory counts keyed by catalog item id.
pub type InventoryCounts = BTreeMap<String, i64>;

// =============================================================================
// Category
// =============================================================================

/// Menu section an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
pub enum Category {
    Bread,
    Pastry,
    Cake,
    Beverage,
    Coffee,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Bread,
        Category::Pastry,
        Category::Cake,
        Category::Beverage,
        Category::Coffee,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Bread => "Bread",
            Category::Pastry => "Pastry",
            Category::Cake => "Cake",
            Category::Beverage => "Beverage",
            Category::Coffee => "Coffee",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Catalog Item
// =============================================================================

/// A sellable or produced item definition.
///
/// ## Money Fields
/// Prices are stored as raw cents like every persisted amount; use
/// [`CatalogItem::cost`] and [`CatalogItem::price`] for arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub category: Category,
    /// Display unit: "pcs", "loaf", "btl".
    pub unit: String,
    /// What one unit costs to produce or buy in.
    pub cost_cents: i64,
    /// What one unit sells for.
    pub price_cents: i64,
}

impl CatalogItem {
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Input for adding an item to the catalog.
///
/// `id` is optional; the catalog assigns a UUID when it is absent.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCatalogItem {
    pub id: Option<String>,
    pub name: String,
    pub category: Category,
    pub unit: String,
    pub cost_cents: i64,
    pub price_cents: i64,
}

// =============================================================================
// Ledger Entries
// =============================================================================

/// Which of the three shift ledgers an entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    Production,
    Sale,
    Discharge,
}

impl LedgerKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LedgerKind::Production => "Production",
            LedgerKind::Sale => "Sale",
            LedgerKind::Discharge => "Discharge",
        }
    }
}

impl fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why stock was written off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
pub enum DischargeReason {
    Expired,
    Damaged,
    QualityIssue,
    Other,
}

impl DischargeReason {
    pub const fn label(&self) -> &'static str {
        match self {
            DischargeReason::Expired => "Expired",
            DischargeReason::Damaged => "Damaged",
            DischargeReason::QualityIssue => "Quality Issue",
            DischargeReason::Other => "Other",
        }
    }
}

impl fmt::Display for DischargeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A batch of stock baked or received during the shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductionEntry {
    pub id: String,
    pub item_id: String,
    pub quantity: i64,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

/// A point-of-sale line. Feeds the live sales view, never revenue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleEntry {
    pub id: String,
    pub item_id: String,
    pub quantity: i64,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

/// Stock written off (BO) with a reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DischargeEntry {
    pub id: String,
    pub item_id: String,
    pub quantity: i64,
    pub reason: DischargeReason,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

/// Shared read access to the three entry kinds.
pub trait LedgerEntry {
    const KIND: LedgerKind;

    fn id(&self) -> &str;
    fn item_id(&self) -> &str;
    fn quantity(&self) -> i64;
}

macro_rules! impl_ledger_entry {
    ($ty:ty, $kind:expr) => {
        impl LedgerEntry for $ty {
            const KIND: LedgerKind = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn item_id(&self) -> &str {
                &self.item_id
            }

            fn quantity(&self) -> i64 {
                self.quantity
            }
        }
    };
}

impl_ledger_entry!(ProductionEntry, LedgerKind::Production);
impl_ledger_entry!(SaleEntry, LedgerKind::Sale);
impl_ledger_entry!(DischargeEntry, LedgerKind::Discharge);

// =============================================================================
// Shift
// =============================================================================

/// Lifecycle status of a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShiftStatus {
    Closed,
    Open,
}

impl Default for ShiftStatus {
    fn default() -> Self {
        ShiftStatus::Closed
    }
}

impl fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftStatus::Closed => f.write_str("CLOSED"),
            ShiftStatus::Open => f.write_str("OPEN"),
        }
    }
}

/// One operating session, from open to close.
///
/// Mutations live in [`crate::shift`]; this is the plain data shape that gets
/// persisted and handed to the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Shift {
    pub id: String,
    pub status: ShiftStatus,
    #[ts(as = "Option<String>")]
    pub start_time: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub end_time: Option<DateTime<Utc>>,
    pub opening_cash_cents: i64,
    pub closing_cash_cents: Option<i64>,
    pub production: Vec<ProductionEntry>,
    pub sales: Vec<SaleEntry>,
    pub discharges: Vec<DischargeEntry>,
    pub inventory_start: InventoryCounts,
    /// Only counted items are present.
    pub inventory_end: InventoryCounts,
}

impl Shift {
    #[inline]
    pub fn opening_cash(&self) -> Money {
        Money::from_cents(self.opening_cash_cents)
    }

    #[inline]
    pub fn closing_cash(&self) -> Option<Money> {
        self.closing_cash_cents.map(Money::from_cents)
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == ShiftStatus::Open
    }

    /// Beginning count for an item, zero when the item was not in the snapshot.
    pub fn beginning_count(&self, item_id: &str) -> i64 {
        self.inventory_start.get(item_id).copied().unwrap_or(0)
    }

    /// Ending count for an item, `None` until the operator has counted it.
    pub fn ending_count(&self, item_id: &str) -> Option<i64> {
        self.inventory_end.get(item_id).copied()
    }
}

// =============================================================================
// Operator
// =============================================================================

/// Who ran the shift, as reported by the authentication collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Operator {
    pub id: String,
    pub display_name: String,
}

impl Operator {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Operator {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

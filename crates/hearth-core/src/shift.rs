//! # Shift Lifecycle
//!
//! The state machine that gates every write to a shift, plus the ledger
//! operations that are legal while it is open.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            start()                                                      │
//! │   ┌────────┐  ──────────────────────────────►  ┌────────┐               │
//! │   │ CLOSED │                                   │  OPEN  │◄──┐           │
//! │   └────────┘  ◄──────────────────────────────  └────────┘   │           │
//! │        ▲            end(closing_cash)              │        │           │
//! │        │                                           └────────┘           │
//! │    initial()                          add_* / set_* / remove_entry /    │
//! │                                       prefill / set_ending_inventory    │
//! │                                                                         │
//! │  CLOSED + start()  ──► new Shift, counts carried forward                │
//! │  OPEN   + start()  ──► InvalidState                                     │
//! │  CLOSED + end()    ──► InvalidState                                     │
//! │  CLOSED + ledger   ──► ShiftClosed                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two-Step Close
//! ```text
//! prefill_ending_inventory()      operator edits counts        end(cash)
//!   expected = max(0, beg + prod   ──► set_ending_inventory ──► report
//!              - sales - bo)
//! ```
//! `end` does not require the prefill. Items without an ending count simply
//! contribute nothing to revenue.
//!
//! Every operation validates fully before touching the shift, so an `Err`
//! always leaves the shift exactly as it was.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::reconciliation::{expected_ending, ledger_total};
use crate::report::ShiftReport;
use crate::types::{
    DischargeEntry, DischargeReason, InventoryCounts, LedgerEntry, LedgerKind, Operator,
    ProductionEntry, SaleEntry, Shift, ShiftStatus,
};
use crate::validation::{validate_cash_cents, validate_count, validate_quantity_limit};

// =============================================================================
// Shift Opening
// =============================================================================

/// What the operator supplies when opening a shift.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftOpening {
    pub opening_cash_cents: i64,
    /// Verified beginning counts that override the carried-forward value
    /// for the listed items.
    pub counts: InventoryCounts,
}

impl ShiftOpening {
    pub fn with_cash(opening_cash_cents: i64) -> Self {
        ShiftOpening {
            opening_cash_cents,
            counts: InventoryCounts::new(),
        }
    }

    pub fn count(mut self, item_id: impl Into<String>, count: i64) -> Self {
        self.counts.insert(item_id.into(), count);
        self
    }
}

// =============================================================================
// Lifecycle Transitions
// =============================================================================

impl Shift {
    /// The blank closed shift used before anything was ever opened.
    pub fn initial() -> Shift {
        Shift {
            id: Uuid::new_v4().to_string(),
            status: ShiftStatus::Closed,
            start_time: None,
            end_time: None,
            opening_cash_cents: 0,
            closing_cash_cents: None,
            production: Vec::new(),
            sales: Vec::new(),
            discharges: Vec::new(),
            inventory_start: InventoryCounts::new(),
            inventory_end: InventoryCounts::new(),
        }
    }

    /// Opens the next shift after this one.
    ///
    /// ## Rules
    /// - `self` must be CLOSED
    /// - Every catalog item starts at this shift's ending count, or 0
    /// - Counts in `opening` replace the carried value for their item
    /// - Ledgers and `inventory_end` start empty
    ///
    /// ## Example
    /// ```rust
    /// use chrono::Utc;
    /// use hearth_core::{Catalog, Shift, ShiftOpening};
    ///
    /// let catalog = Catalog::default();
    /// let mut previous = Shift::initial();
    /// previous.inventory_end.insert("1".to_string(), 7);
    ///
    /// let next = previous.start(&catalog, ShiftOpening::default(), Utc::now()).unwrap();
    /// assert_eq!(next.inventory_start["1"], 7);
    /// assert_eq!(next.inventory_start["2"], 0);
    /// assert!(next.inventory_end.is_empty());
    /// ```
    pub fn start(
        &self,
        catalog: &Catalog,
        opening: ShiftOpening,
        now: DateTime<Utc>,
    ) -> CoreResult<Shift> {
        if self.status != ShiftStatus::Closed {
            return Err(CoreError::InvalidState {
                operation: "start a shift",
                status: self.status,
            });
        }

        validate_cash_cents("opening cash", opening.opening_cash_cents)?;
        for (item_id, count) in &opening.counts {
            if !catalog.contains(item_id) {
                return Err(CoreError::UnknownItem(item_id.clone()));
            }
            validate_count("beginning count", *count)?;
        }

        let mut inventory_start: InventoryCounts = catalog
            .items()
            .iter()
            .map(|item| {
                let carried = self.inventory_end.get(&item.id).copied().unwrap_or(0);
                (item.id.clone(), carried)
            })
            .collect();
        inventory_start.extend(opening.counts);

        Ok(Shift {
            id: Uuid::new_v4().to_string(),
            status: ShiftStatus::Open,
            start_time: Some(now),
            end_time: None,
            opening_cash_cents: opening.opening_cash_cents,
            closing_cash_cents: None,
            production: Vec::new(),
            sales: Vec::new(),
            discharges: Vec::new(),
            inventory_start,
            inventory_end: InventoryCounts::new(),
        })
    }

    /// Fills `inventory_end` with the expected count for every catalog item.
    ///
    /// The previous ending counts are discarded, including counts for items
    /// no longer in the catalog.
    pub fn prefill_ending_inventory(&mut self, catalog: &Catalog) -> CoreResult<()> {
        self.require_open_state("prefill ending inventory")?;

        self.inventory_end = catalog
            .items()
            .iter()
            .map(|item| (item.id.clone(), expected_ending(self, &item.id)))
            .collect();
        Ok(())
    }

    /// Closes the shift and materializes its report.
    pub fn end(
        &mut self,
        catalog: &Catalog,
        closing_cash_cents: i64,
        operator: Option<Operator>,
        now: DateTime<Utc>,
    ) -> CoreResult<ShiftReport> {
        self.require_open_state("end the shift")?;
        validate_cash_cents("closing cash", closing_cash_cents)?;

        self.status = ShiftStatus::Closed;
        self.end_time = Some(now);
        self.closing_cash_cents = Some(closing_cash_cents);

        Ok(ShiftReport::from_closed_shift(self, catalog, operator, now))
    }

    // -------------------------------------------------------------------------
    // Ending Inventory
    // -------------------------------------------------------------------------

    /// Records the physical ending count for one item.
    pub fn set_ending_inventory(
        &mut self,
        catalog: &Catalog,
        item_id: &str,
        count: i64,
    ) -> CoreResult<()> {
        self.require_writable("set ending inventory", catalog, item_id)?;
        validate_count("ending count", count)?;

        self.inventory_end.insert(item_id.to_string(), count);
        Ok(())
    }

    /// Returns an item to "not counted". Returns whether a count was present.
    pub fn clear_ending_inventory(&mut self, catalog: &Catalog, item_id: &str) -> CoreResult<bool> {
        self.require_writable("clear ending inventory", catalog, item_id)?;
        Ok(self.inventory_end.remove(item_id).is_some())
    }

    // -------------------------------------------------------------------------
    // Additive Ledger Operations
    // -------------------------------------------------------------------------

    pub fn add_production(
        &mut self,
        catalog: &Catalog,
        item_id: &str,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> CoreResult<ProductionEntry> {
        self.require_writable("add production", catalog, item_id)?;
        require_positive(quantity)?;

        let entry = ProductionEntry {
            id: Uuid::new_v4().to_string(),
            item_id: item_id.to_string(),
            quantity,
            timestamp: now,
        };
        self.production.push(entry.clone());
        Ok(entry)
    }

    pub fn add_sale(
        &mut self,
        catalog: &Catalog,
        item_id: &str,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> CoreResult<SaleEntry> {
        self.require_writable("add sale", catalog, item_id)?;
        require_positive(quantity)?;

        let entry = SaleEntry {
            id: Uuid::new_v4().to_string(),
            item_id: item_id.to_string(),
            quantity,
            timestamp: now,
        };
        self.sales.push(entry.clone());
        Ok(entry)
    }

    pub fn add_discharge(
        &mut self,
        catalog: &Catalog,
        item_id: &str,
        quantity: i64,
        reason: DischargeReason,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> CoreResult<DischargeEntry> {
        self.require_writable("add discharge", catalog, item_id)?;
        require_positive(quantity)?;

        let entry = DischargeEntry {
            id: Uuid::new_v4().to_string(),
            item_id: item_id.to_string(),
            quantity,
            reason,
            notes: clean_notes(notes),
            timestamp: now,
        };
        self.discharges.push(entry.clone());
        Ok(entry)
    }

    // -------------------------------------------------------------------------
    // Collapsing Ledger Operations
    // -------------------------------------------------------------------------

    /// Replaces every production entry for the item with one entry of
    /// `quantity`, or removes them all when `quantity` is 0.
    pub fn set_production_quantity(
        &mut self,
        catalog: &Catalog,
        item_id: &str,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> CoreResult<Option<ProductionEntry>> {
        self.require_writable("set production quantity", catalog, item_id)?;
        require_non_negative(quantity)?;

        self.production.retain(|entry| entry.item_id != item_id);
        if quantity == 0 {
            return Ok(None);
        }
        let entry = ProductionEntry {
            id: Uuid::new_v4().to_string(),
            item_id: item_id.to_string(),
            quantity,
            timestamp: now,
        };
        self.production.push(entry.clone());
        Ok(Some(entry))
    }

    /// Replaces every sale entry for the item with one net entry.
    ///
    /// Revenue does not move: it comes from the count reconciliation.
    pub fn set_sales_quantity(
        &mut self,
        catalog: &Catalog,
        item_id: &str,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> CoreResult<Option<SaleEntry>> {
        self.require_writable("set sales quantity", catalog, item_id)?;
        require_non_negative(quantity)?;

        self.sales.retain(|entry| entry.item_id != item_id);
        if quantity == 0 {
            return Ok(None);
        }
        let entry = SaleEntry {
            id: Uuid::new_v4().to_string(),
            item_id: item_id.to_string(),
            quantity,
            timestamp: now,
        };
        self.sales.push(entry.clone());
        Ok(Some(entry))
    }

    /// Replaces every discharge entry for the item with one entry carrying
    /// the given reason and notes.
    pub fn set_discharge_quantity(
        &mut self,
        catalog: &Catalog,
        item_id: &str,
        quantity: i64,
        reason: DischargeReason,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> CoreResult<Option<DischargeEntry>> {
        self.require_writable("set discharge quantity", catalog, item_id)?;
        require_non_negative(quantity)?;

        self.discharges.retain(|entry| entry.item_id != item_id);
        if quantity == 0 {
            return Ok(None);
        }
        let entry = DischargeEntry {
            id: Uuid::new_v4().to_string(),
            item_id: item_id.to_string(),
            quantity,
            reason,
            notes: clean_notes(notes),
            timestamp: now,
        };
        self.discharges.push(entry.clone());
        Ok(Some(entry))
    }

    /// Removes a single entry by id from the chosen ledger.
    pub fn remove_entry(&mut self, kind: LedgerKind, entry_id: &str) -> CoreResult<()> {
        if !self.is_open() {
            return Err(CoreError::ShiftClosed {
                operation: "remove a ledger entry",
            });
        }

        let removed = match kind {
            LedgerKind::Production => remove_by_id(&mut self.production, entry_id),
            LedgerKind::Sale => remove_by_id(&mut self.sales, entry_id),
            LedgerKind::Discharge => remove_by_id(&mut self.discharges, entry_id),
        };

        if removed {
            Ok(())
        } else {
            Err(CoreError::EntryNotFound {
                kind: kind.as_str(),
                id: entry_id.to_string(),
            })
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Why this shift still depends on an item, if it does.
    ///
    /// Any ledger entry counts; snapshot counts only when nonzero.
    pub fn references_item(&self, item_id: &str) -> Option<String> {
        let entries = self.production.iter().filter(|e| e.item_id == item_id).count()
            + self.sales.iter().filter(|e| e.item_id == item_id).count()
            + self.discharges.iter().filter(|e| e.item_id == item_id).count();
        if entries > 0 {
            return Some(format!("{} ledger entries", entries));
        }

        let beginning = self.beginning_count(item_id);
        if beginning != 0 {
            return Some(format!("beginning count {}", beginning));
        }

        match self.ending_count(item_id) {
            Some(ending) if ending != 0 => Some(format!("ending count {}", ending)),
            _ => None,
        }
    }

    /// Units recorded in the production ledger for one item.
    pub fn produced_quantity(&self, item_id: &str) -> i64 {
        ledger_total(&self.production, item_id)
    }

    /// Units recorded in the sale ledger for one item.
    pub fn sold_quantity(&self, item_id: &str) -> i64 {
        ledger_total(&self.sales, item_id)
    }

    /// Units written off for one item.
    pub fn discharged_quantity(&self, item_id: &str) -> i64 {
        ledger_total(&self.discharges, item_id)
    }

    // -------------------------------------------------------------------------
    // Guards
    // -------------------------------------------------------------------------

    fn require_open_state(&self, operation: &'static str) -> CoreResult<()> {
        if self.status != ShiftStatus::Open {
            return Err(CoreError::InvalidState {
                operation,
                status: self.status,
            });
        }
        Ok(())
    }

    fn require_writable(
        &self,
        operation: &'static str,
        catalog: &Catalog,
        item_id: &str,
    ) -> CoreResult<()> {
        if !self.is_open() {
            return Err(CoreError::ShiftClosed { operation });
        }
        if !catalog.contains(item_id) {
            return Err(CoreError::UnknownItem(item_id.to_string()));
        }
        Ok(())
    }
}

fn require_positive(quantity: i64) -> CoreResult<()> {
    if quantity <= 0 {
        return Err(CoreError::InvalidQuantity(quantity));
    }
    Ok(validate_quantity_limit(quantity)?)
}

fn require_non_negative(quantity: i64) -> CoreResult<()> {
    if quantity < 0 {
        return Err(CoreError::InvalidQuantity(quantity));
    }
    Ok(validate_quantity_limit(quantity)?)
}

fn clean_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

fn remove_by_id<E: LedgerEntry>(entries: &mut Vec<E>, entry_id: &str) -> bool {
    let before = entries.len();
    entries.retain(|entry| entry.id() != entry_id);
    entries.len() != before
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::types::{CatalogItem, Category};
    use crate::validation::{MAX_COUNT, MAX_QUANTITY};

    fn bakery() -> Catalog {
        Catalog::from_items(vec![
            CatalogItem {
                id: "bread".to_string(),
                name: "Bread".to_string(),
                category: Category::Bread,
                unit: "pcs".to_string(),
                cost_cents: 200,
                price_cents: 500,
            },
            CatalogItem {
                id: "cola".to_string(),
                name: "Cola".to_string(),
                category: Category::Beverage,
                unit: "btl".to_string(),
                cost_cents: 1200,
                price_cents: 2000,
            },
        ])
    }

    fn open_shift(catalog: &Catalog) -> Shift {
        Shift::initial()
            .start(catalog, ShiftOpening::default(), Utc::now())
            .unwrap()
    }

    #[test]
    fn test_initial_shift_is_closed_and_blank() {
        let shift = Shift::initial();
        assert_eq!(shift.status, ShiftStatus::Closed);
        assert!(shift.start_time.is_none());
        assert_eq!(shift.opening_cash_cents, 0);
        assert!(shift.inventory_start.is_empty());
        assert!(shift.production.is_empty());
    }

    #[test]
    fn test_start_from_blank_zeroes_every_item() {
        let catalog = bakery();
        let shift = open_shift(&catalog);

        assert_eq!(shift.status, ShiftStatus::Open);
        assert!(shift.start_time.is_some());
        assert!(shift.end_time.is_none());
        assert_eq!(shift.inventory_start.len(), 2);
        assert!(shift.inventory_start.values().all(|&c| c == 0));
        assert!(shift.inventory_end.is_empty());
    }

    #[test]
    fn test_start_carries_forward_and_fills_new_items() {
        let catalog = bakery();
        let mut first = open_shift(&catalog);
        first.set_ending_inventory(&catalog, "bread", 7).unwrap();
        first.end(&catalog, 0, None, Utc::now()).unwrap();

        let second = first
            .start(&catalog, ShiftOpening::default(), Utc::now())
            .unwrap();
        assert_ne!(second.id, first.id);
        assert_eq!(second.inventory_start["bread"], 7);
        assert_eq!(second.inventory_start["cola"], 0);
    }

    #[test]
    fn test_start_applies_verified_counts() {
        let catalog = bakery();
        let mut previous = Shift::initial();
        previous.inventory_end.insert("bread".to_string(), 7);

        let opening = ShiftOpening::with_cash(50_000).count("bread", 5).count("cola", 12);
        let shift = previous.start(&catalog, opening, Utc::now()).unwrap();

        assert_eq!(shift.opening_cash_cents, 50_000);
        assert_eq!(shift.inventory_start["bread"], 5);
        assert_eq!(shift.inventory_start["cola"], 12);
    }

    #[test]
    fn test_start_rejects_bad_opening() {
        let catalog = bakery();
        let blank = Shift::initial();

        let err = blank
            .start(&catalog, ShiftOpening::default().count("ghost", 1), Utc::now())
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownItem(id) if id == "ghost"));

        let err = blank
            .start(&catalog, ShiftOpening::default().count("bread", -1), Utc::now())
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = blank
            .start(&catalog, ShiftOpening::with_cash(-100), Utc::now())
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_start_while_open_is_invalid_state() {
        let catalog = bakery();
        let shift = open_shift(&catalog);
        let err = shift
            .start(&catalog, ShiftOpening::default(), Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidState {
                status: ShiftStatus::Open,
                ..
            }
        ));
    }

    #[test]
    fn test_closed_shift_rejects_writes() {
        let catalog = bakery();
        let mut shift = Shift::initial();
        let before = shift.clone();
        let now = Utc::now();

        assert!(matches!(
            shift.add_production(&catalog, "bread", 1, now),
            Err(CoreError::ShiftClosed { .. })
        ));
        assert!(matches!(
            shift.add_sale(&catalog, "bread", 1, now),
            Err(CoreError::ShiftClosed { .. })
        ));
        assert!(matches!(
            shift.add_discharge(&catalog, "bread", 1, DischargeReason::Expired, None, now),
            Err(CoreError::ShiftClosed { .. })
        ));
        assert!(matches!(
            shift.set_ending_inventory(&catalog, "bread", 3),
            Err(CoreError::ShiftClosed { .. })
        ));
        assert!(matches!(
            shift.prefill_ending_inventory(&catalog),
            Err(CoreError::InvalidState { .. })
        ));
        assert!(matches!(
            shift.end(&catalog, 0, None, now),
            Err(CoreError::InvalidState { .. })
        ));
        assert_eq!(shift, before);
    }

    #[test]
    fn test_ledger_guards() {
        let catalog = bakery();
        let mut shift = open_shift(&catalog);
        let now = Utc::now();

        assert!(matches!(
            shift.add_production(&catalog, "cake", 1, now),
            Err(CoreError::UnknownItem(_))
        ));
        assert!(matches!(
            shift.add_production(&catalog, "bread", 0, now),
            Err(CoreError::InvalidQuantity(0))
        ));
        assert!(matches!(
            shift.add_sale(&catalog, "bread", -4, now),
            Err(CoreError::InvalidQuantity(-4))
        ));
        assert!(matches!(
            shift.set_sales_quantity(&catalog, "bread", -1, now),
            Err(CoreError::InvalidQuantity(-1))
        ));
        assert!(shift.production.is_empty());
        assert!(shift.sales.is_empty());
    }

    #[test]
    fn test_oversized_quantities_and_counts_are_rejected() {
        let catalog = bakery();
        let mut shift = open_shift(&catalog);
        let now = Utc::now();
        let too_many = MAX_QUANTITY + 1;

        assert!(matches!(
            shift.add_production(&catalog, "bread", i64::MAX / 100, now),
            Err(CoreError::Validation(ValidationError::TooLarge { .. }))
        ));
        assert!(shift.add_sale(&catalog, "bread", i64::MAX, now).is_err());
        assert!(shift
            .add_discharge(&catalog, "bread", too_many, DischargeReason::Other, None, now)
            .is_err());
        assert!(shift.set_production_quantity(&catalog, "bread", too_many, now).is_err());
        assert!(shift.set_sales_quantity(&catalog, "bread", too_many, now).is_err());
        assert!(shift
            .set_discharge_quantity(&catalog, "bread", too_many, DischargeReason::Other, None, now)
            .is_err());
        assert!(shift.set_ending_inventory(&catalog, "bread", MAX_COUNT + 1).is_err());
        assert!(shift.production.is_empty() && shift.sales.is_empty());
        assert!(shift.discharges.is_empty() && shift.inventory_end.is_empty());

        shift.add_production(&catalog, "bread", MAX_QUANTITY, now).unwrap();
        shift.set_ending_inventory(&catalog, "bread", MAX_COUNT).unwrap();

        let opening = ShiftOpening::default().count("bread", MAX_COUNT + 1);
        assert!(matches!(
            Shift::initial().start(&catalog, opening, now),
            Err(CoreError::Validation(ValidationError::TooLarge { .. }))
        ));
    }

    #[test]
    fn test_add_entries() {
        let catalog = bakery();
        let mut shift = open_shift(&catalog);
        let now = Utc::now();

        shift.add_production(&catalog, "bread", 20, now).unwrap();
        shift.add_production(&catalog, "bread", 5, now).unwrap();
        shift.add_sale(&catalog, "cola", 3, now).unwrap();
        let bo = shift
            .add_discharge(
                &catalog,
                "bread",
                2,
                DischargeReason::QualityIssue,
                Some("  burnt bottoms ".to_string()),
                now,
            )
            .unwrap();

        assert_eq!(shift.produced_quantity("bread"), 25);
        assert_eq!(shift.sold_quantity("cola"), 3);
        assert_eq!(shift.discharged_quantity("bread"), 2);
        assert_eq!(bo.notes.as_deref(), Some("burnt bottoms"));

        let blank_notes = shift
            .add_discharge(&catalog, "cola", 1, DischargeReason::Other, Some("  ".into()), now)
            .unwrap();
        assert!(blank_notes.notes.is_none());
    }

    #[test]
    fn test_set_sales_quantity_collapses_entries() {
        let catalog = bakery();
        let mut shift = open_shift(&catalog);
        let now = Utc::now();

        shift.add_sale(&catalog, "bread", 2, now).unwrap();
        shift.add_sale(&catalog, "bread", 3, now).unwrap();
        shift.add_sale(&catalog, "cola", 1, now).unwrap();

        let entry = shift.set_sales_quantity(&catalog, "bread", 4, now).unwrap();
        assert_eq!(entry.map(|e| e.quantity), Some(4));
        assert_eq!(shift.sales.iter().filter(|e| e.item_id == "bread").count(), 1);
        assert_eq!(shift.sold_quantity("bread"), 4);

        assert!(shift.set_sales_quantity(&catalog, "bread", 0, now).unwrap().is_none());
        assert_eq!(shift.sold_quantity("bread"), 0);
        assert_eq!(shift.sold_quantity("cola"), 1);
    }

    #[test]
    fn test_set_production_and_discharge_quantity() {
        let catalog = bakery();
        let mut shift = open_shift(&catalog);
        let now = Utc::now();

        shift.add_production(&catalog, "bread", 10, now).unwrap();
        shift.add_production(&catalog, "bread", 10, now).unwrap();
        shift.set_production_quantity(&catalog, "bread", 15, now).unwrap();
        assert_eq!(shift.production.len(), 1);
        assert_eq!(shift.produced_quantity("bread"), 15);

        shift
            .add_discharge(&catalog, "bread", 1, DischargeReason::Expired, None, now)
            .unwrap();
        let entry = shift
            .set_discharge_quantity(&catalog, "bread", 3, DischargeReason::Damaged, None, now)
            .unwrap()
            .unwrap();
        assert_eq!(entry.reason, DischargeReason::Damaged);
        assert_eq!(shift.discharged_quantity("bread"), 3);

        shift
            .set_discharge_quantity(&catalog, "bread", 0, DischargeReason::Other, None, now)
            .unwrap();
        assert!(shift.discharges.is_empty());
    }

    #[test]
    fn test_remove_entry() {
        let catalog = bakery();
        let mut shift = open_shift(&catalog);
        let now = Utc::now();

        let bo = shift
            .add_discharge(&catalog, "bread", 2, DischargeReason::Expired, None, now)
            .unwrap();
        shift.remove_entry(LedgerKind::Discharge, &bo.id).unwrap();
        assert!(shift.discharges.is_empty());

        let err = shift.remove_entry(LedgerKind::Discharge, &bo.id).unwrap_err();
        assert!(matches!(err, CoreError::EntryNotFound { kind: "Discharge", .. }));

        let sale = shift.add_sale(&catalog, "bread", 1, now).unwrap();
        assert!(shift.remove_entry(LedgerKind::Production, &sale.id).is_err());
        assert_eq!(shift.sales.len(), 1);
    }

    #[test]
    fn test_prefill_is_floored_and_idempotent() {
        let catalog = bakery();
        let mut previous = Shift::initial();
        previous.inventory_end.insert("bread".to_string(), 10);
        let mut shift = previous
            .start(&catalog, ShiftOpening::default(), Utc::now())
            .unwrap();
        let now = Utc::now();

        shift.add_production(&catalog, "bread", 20, now).unwrap();
        shift.add_sale(&catalog, "bread", 8, now).unwrap();
        shift
            .add_discharge(&catalog, "bread", 2, DischargeReason::Expired, None, now)
            .unwrap();
        shift.add_sale(&catalog, "cola", 5, now).unwrap();
        shift.set_ending_inventory(&catalog, "cola", 99).unwrap();

        shift.prefill_ending_inventory(&catalog).unwrap();
        let first = shift.inventory_end.clone();
        assert_eq!(first["bread"], 20);
        assert_eq!(first["cola"], 0);

        shift.prefill_ending_inventory(&catalog).unwrap();
        assert_eq!(shift.inventory_end, first);
        assert!(shift.is_open());
    }

    #[test]
    fn test_ending_inventory_set_and_clear() {
        let catalog = bakery();
        let mut shift = open_shift(&catalog);

        shift.set_ending_inventory(&catalog, "bread", 0).unwrap();
        assert_eq!(shift.ending_count("bread"), Some(0));
        assert!(matches!(
            shift.set_ending_inventory(&catalog, "bread", -2),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            shift.set_ending_inventory(&catalog, "ghost", 1),
            Err(CoreError::UnknownItem(_))
        ));

        assert!(shift.clear_ending_inventory(&catalog, "bread").unwrap());
        assert_eq!(shift.ending_count("bread"), None);
        assert!(!shift.clear_ending_inventory(&catalog, "bread").unwrap());
    }

    #[test]
    fn test_end_freezes_shift() {
        let catalog = bakery();
        let mut shift = open_shift(&catalog);
        shift.add_production(&catalog, "bread", 4, Utc::now()).unwrap();

        assert!(matches!(
            shift.end(&catalog, -1, None, Utc::now()),
            Err(CoreError::Validation(_))
        ));
        assert!(shift.is_open());

        let report = shift
            .end(&catalog, 12_500, Some(Operator::new("u1", "Ana")), Utc::now())
            .unwrap();
        assert_eq!(shift.status, ShiftStatus::Closed);
        assert_eq!(shift.closing_cash_cents, Some(12_500));
        assert_eq!(shift.end_time, Some(report.end_time));
        assert_eq!(report.shift_id, shift.id);

        assert!(matches!(
            shift.add_production(&catalog, "bread", 1, Utc::now()),
            Err(CoreError::ShiftClosed { .. })
        ));
    }

    #[test]
    fn test_references_item() {
        let catalog = bakery();
        let mut shift = open_shift(&catalog);
        assert_eq!(shift.references_item("bread"), None);

        shift.inventory_start.insert("bread".to_string(), 3);
        assert_eq!(
            shift.references_item("bread").as_deref(),
            Some("beginning count 3")
        );

        shift.add_sale(&catalog, "cola", 1, Utc::now()).unwrap();
        assert_eq!(
            shift.references_item("cola").as_deref(),
            Some("1 ledger entries")
        );
    }
}

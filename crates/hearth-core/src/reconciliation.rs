//! # Reconciliation Engine
//!
//! Pure projections from `(Catalog, Shift)` to the numbers the inventory
//! sheet, the charts and the closing report show.
//!
//! ## Per-Item Row
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  beg    = inventory_start[item]  or 0                                   │
//! │  prod   = Σ production entries for item                                 │
//! │  bo     = Σ discharge entries for item                                  │
//! │  total  = beg + prod                                                    │
//! │  end    = inventory_end[item]          (may be unset)                   │
//! │  sold   = end set ? max(0, total - end - bo) : 0                        │
//! │  amount = sold × selling price                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Kinds of "Sold"
//! ```text
//!   Sale ledger (POS taps)          Physical counts
//!          │                               │
//!          ▼                               ▼
//!   sales_data / sales_by_item     InventoryRow.sold ──► amount ──► revenue
//!   (live feed, charts)            (money)
//! ```
//! The sale ledger never feeds revenue. Editing it leaves `total_revenue`
//! unchanged.
//!
//! Nothing here can fail. Missing counts are zero, unset ending counts give
//! `sold = 0`, and entries for items no longer in the catalog are ignored.
//! Unit sums saturate like [`Money`] does, so rows loaded from storage with
//! absurd values still project.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::money::Money;
use crate::types::{Category, LedgerEntry, Shift};

// =============================================================================
// Output Types
// =============================================================================

/// One line of the inventory sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryRow {
    pub item_id: String,
    pub name: String,
    pub category: Category,
    pub unit: String,
    pub beginning: i64,
    pub produced: i64,
    pub total: i64,
    /// `None` until the item has been counted.
    pub ending: Option<i64>,
    pub discharged: i64,
    pub sold: i64,
    pub price: Money,
    pub amount: Money,
}

/// Written-off units and what they cost to make.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DischargeTotals {
    pub count: i64,
    pub cost: Money,
}

/// Chart point built from the raw ledgers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesPoint {
    pub item_id: String,
    pub name: String,
    pub produced: i64,
    /// From the sale ledger, not from the reconciliation.
    pub sold: i64,
}

/// Everything the sheet and the report need, computed in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShiftSummary {
    pub rows: Vec<InventoryRow>,
    pub total_revenue: Money,
    pub total_cost: Money,
    pub estimated_profit: Money,
    pub discharges: DischargeTotals,
    pub total_produced: i64,
    /// Reconciled units, the figure revenue is built on.
    pub total_sold: i64,
    /// Units in the sale ledger.
    pub total_sale_entries: i64,
}

// =============================================================================
// Ledger Helpers
// =============================================================================

/// Sum of quantities in a ledger for one item.
pub fn ledger_total<E: LedgerEntry>(entries: &[E], item_id: &str) -> i64 {
    units(
        entries
            .iter()
            .filter(|entry| entry.item_id() == item_id)
            .map(LedgerEntry::quantity),
    )
}

/// Saturating unit sum.
fn units(quantities: impl Iterator<Item = i64>) -> i64 {
    quantities.fold(0, i64::saturating_add)
}

/// The ending count the prefill step suggests for an item.
///
/// Uses the sale ledger as the expected sold quantity:
/// `max(0, beg + prod - sales - bo)`.
pub fn expected_ending(shift: &Shift, item_id: &str) -> i64 {
    let on_hand = shift
        .beginning_count(item_id)
        .saturating_add(ledger_total(&shift.production, item_id));
    let gone = ledger_total(&shift.sales, item_id)
        .saturating_add(ledger_total(&shift.discharges, item_id));
    on_hand.saturating_sub(gone).max(0)
}

// =============================================================================
// Rows
// =============================================================================

/// Per-item rows in catalog order.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use hearth_core::{inventory_sheet, Catalog, DischargeReason, Shift, ShiftOpening};
///
/// let catalog = Catalog::default(); // "13" is MONAY: cost 2.00, price 5.00
/// let now = Utc::now();
/// let mut shift = Shift::initial()
///     .start(&catalog, ShiftOpening::default().count("13", 10), now)
///     .unwrap();
/// shift.add_production(&catalog, "13", 20, now).unwrap();
/// shift.add_discharge(&catalog, "13", 2, DischargeReason::Expired, None, now).unwrap();
/// shift.set_ending_inventory(&catalog, "13", 5).unwrap();
///
/// let rows = inventory_sheet(&catalog, &shift);
/// let monay = rows.iter().find(|r| r.item_id == "13").unwrap();
/// assert_eq!((monay.total, monay.sold, monay.amount.cents()), (30, 23, 11_500));
/// ```
pub fn inventory_sheet(catalog: &Catalog, shift: &Shift) -> Vec<InventoryRow> {
    catalog
        .items()
        .iter()
        .map(|item| {
            let beginning = shift.beginning_count(&item.id);
            let produced = ledger_total(&shift.production, &item.id);
            let discharged = ledger_total(&shift.discharges, &item.id);
            let total = beginning.saturating_add(produced);
            let ending = shift.ending_count(&item.id);
            let sold = match ending {
                Some(end) => total.saturating_sub(end).saturating_sub(discharged).max(0),
                None => 0,
            };

            InventoryRow {
                item_id: item.id.clone(),
                name: item.name.clone(),
                category: item.category,
                unit: item.unit.clone(),
                beginning,
                produced,
                total,
                ending,
                discharged,
                sold,
                price: item.price(),
                amount: item.price().multiply_quantity(sold),
            }
        })
        .collect()
}

// =============================================================================
// Aggregates
// =============================================================================

/// Σ amount over every row.
pub fn total_revenue(catalog: &Catalog, shift: &Shift) -> Money {
    inventory_sheet(catalog, shift)
        .iter()
        .map(|row| row.amount)
        .sum()
}

/// Production quantity × unit cost over the production ledger.
///
/// Cost is charged when stock is made, whether or not it sells.
pub fn total_cost(catalog: &Catalog, shift: &Shift) -> Money {
    shift
        .production
        .iter()
        .filter_map(|entry| {
            catalog
                .get(&entry.item_id)
                .map(|item| item.cost().multiply_quantity(entry.quantity))
        })
        .sum()
}

/// Revenue minus production cost. Discharge loss is not subtracted.
pub fn estimated_profit(catalog: &Catalog, shift: &Shift) -> Money {
    total_revenue(catalog, shift) - total_cost(catalog, shift)
}

/// Discharged units and their cost.
///
/// The unit count includes entries whose item has left the catalog; the
/// cost only covers items that still have a price.
pub fn total_discharges(catalog: &Catalog, shift: &Shift) -> DischargeTotals {
    shift
        .discharges
        .iter()
        .fold(DischargeTotals::default(), |mut totals, entry| {
            totals.count = totals.count.saturating_add(entry.quantity);
            if let Some(item) = catalog.get(&entry.item_id) {
                totals.cost += item.cost().multiply_quantity(entry.quantity);
            }
            totals
        })
}

/// Produced and ledger-sold units per item, skipping items with no activity.
pub fn sales_data(catalog: &Catalog, shift: &Shift) -> Vec<SalesPoint> {
    catalog
        .items()
        .iter()
        .map(|item| SalesPoint {
            item_id: item.id.clone(),
            name: item.name.clone(),
            produced: ledger_total(&shift.production, &item.id),
            sold: ledger_total(&shift.sales, &item.id),
        })
        .filter(|point| point.produced > 0 || point.sold > 0)
        .collect()
}

/// Quick per-item totals from the sale ledger for the POS view.
pub fn sales_by_item(catalog: &Catalog, shift: &Shift) -> Vec<(String, i64)> {
    catalog
        .items()
        .iter()
        .map(|item| (item.id.clone(), ledger_total(&shift.sales, &item.id)))
        .filter(|(_, sold)| *sold > 0)
        .collect()
}

/// The full set of derived figures for one shift.
pub fn summarize(catalog: &Catalog, shift: &Shift) -> ShiftSummary {
    let rows = inventory_sheet(catalog, shift);
    let total_revenue: Money = rows.iter().map(|row| row.amount).sum();
    let total_cost = total_cost(catalog, shift);

    ShiftSummary {
        total_sold: units(rows.iter().map(|row| row.sold)),
        total_produced: units(shift.production.iter().map(|e| e.quantity)),
        total_sale_entries: units(shift.sales.iter().map(|e| e.quantity)),
        discharges: total_discharges(catalog, shift),
        estimated_profit: total_revenue - total_cost,
        total_revenue,
        total_cost,
        rows,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shift::ShiftOpening;
    use crate::types::{CatalogItem, DischargeReason};
    use chrono::Utc;

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
                id: "roll".to_string(),
                name: "Roll".to_string(),
                category: Category::Bread,
                unit: "pcs".to_string(),
                cost_cents: 100,
                price_cents: 300,
            },
        ])
    }

    fn open_with(catalog: &Catalog, opening: ShiftOpening) -> Shift {
        Shift::initial().start(catalog, opening, Utc::now()).unwrap()
    }

    fn row<'a>(rows: &'a [InventoryRow], id: &str) -> &'a InventoryRow {
        rows.iter().find(|r| r.item_id == id).unwrap()
    }

    #[test]
    fn test_bread_scenario() {
        let catalog = bakery();
        let now = Utc::now();
        let mut shift = open_with(&catalog, ShiftOpening::default().count("bread", 10));
        shift.add_production(&catalog, "bread", 20, now).unwrap();
        shift
            .add_discharge(&catalog, "bread", 2, DischargeReason::Expired, None, now)
            .unwrap();
        shift.set_ending_inventory(&catalog, "bread", 5).unwrap();

        let rows = inventory_sheet(&catalog, &shift);
        let bread = row(&rows, "bread");
        assert_eq!(bread.beginning, 10);
        assert_eq!(bread.produced, 20);
        assert_eq!(bread.total, 30);
        assert_eq!(bread.ending, Some(5));
        assert_eq!(bread.discharged, 2);
        assert_eq!(bread.sold, 23);
        assert_eq!(bread.amount.cents(), 11_500);

        assert_eq!(total_revenue(&catalog, &shift).cents(), 11_500);
        assert_eq!(total_cost(&catalog, &shift).cents(), 4_000);
        assert_eq!(estimated_profit(&catalog, &shift).cents(), 7_500);
        assert_eq!(
            total_discharges(&catalog, &shift),
            DischargeTotals {
                count: 2,
                cost: Money::from_cents(400)
            }
        );
    }

    #[test]
    fn test_unset_ending_recognizes_no_revenue() {
        let catalog = bakery();
        let now = Utc::now();
        let mut shift = open_with(&catalog, ShiftOpening::default());
        shift.add_production(&catalog, "roll", 15, now).unwrap();
        shift.add_sale(&catalog, "roll", 10, now).unwrap();

        let rows = inventory_sheet(&catalog, &shift);
        let roll = row(&rows, "roll");
        assert_eq!(roll.ending, None);
        assert_eq!(roll.sold, 0);
        assert!(roll.amount.is_zero());
        assert!(total_revenue(&catalog, &shift).is_zero());
        // Cost is still charged on production
        assert_eq!(total_cost(&catalog, &shift).cents(), 1_500);
        assert_eq!(estimated_profit(&catalog, &shift).cents(), -1_500);
    }

    #[test]
    fn test_sold_is_floored_at_zero() {
        let catalog = bakery();
        let mut shift = open_with(&catalog, ShiftOpening::default().count("bread", 3));
        shift.set_ending_inventory(&catalog, "bread", 50).unwrap();

        let rows = inventory_sheet(&catalog, &shift);
        assert_eq!(row(&rows, "bread").sold, 0);
        assert!(total_revenue(&catalog, &shift).is_zero());
    }

    #[test]
    fn test_sold_property_over_grid() {
        let catalog = bakery();
        let now = Utc::now();
        for beginning in [0, 4, 12] {
            for produced in [0, 1, 9] {
                for discharged in [0, 2] {
                    for ending in [0, 3, 30] {
                        let mut shift = open_with(
                            &catalog,
                            ShiftOpening::default().count("bread", beginning),
                        );
                        if produced > 0 {
                            shift.add_production(&catalog, "bread", produced, now).unwrap();
                        }
                        if discharged > 0 {
                            shift
                                .add_discharge(
                                    &catalog,
                                    "bread",
                                    discharged,
                                    DischargeReason::Other,
                                    None,
                                    now,
                                )
                                .unwrap();
                        }
                        shift.set_ending_inventory(&catalog, "bread", ending).unwrap();

                        let rows = inventory_sheet(&catalog, &shift);
                        let sold = row(&rows, "bread").sold;
                        assert!(sold >= 0);
                        assert_eq!(sold, (beginning + produced - ending - discharged).max(0));
                        if ending >= beginning + produced - discharged {
                            assert_eq!(sold, 0);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_sale_ledger_edits_do_not_move_revenue() {
        let catalog = bakery();
        let now = Utc::now();
        let mut shift = open_with(&catalog, ShiftOpening::default().count("bread", 10));
        shift.set_ending_inventory(&catalog, "bread", 4).unwrap();
        let before = total_revenue(&catalog, &shift);

        shift.add_sale(&catalog, "bread", 3, now).unwrap();
        shift.set_sales_quantity(&catalog, "bread", 9, now).unwrap();

        assert_eq!(total_revenue(&catalog, &shift), before);
        assert_eq!(before.cents(), 3_000);
    }

    #[test]
    fn test_sales_data_uses_raw_ledgers_and_skips_idle_items() {
        let catalog = bakery();
        let now = Utc::now();
        let mut shift = open_with(&catalog, ShiftOpening::default());
        shift.add_production(&catalog, "bread", 12, now).unwrap();
        shift.add_sale(&catalog, "bread", 7, now).unwrap();
        shift.set_ending_inventory(&catalog, "bread", 0).unwrap();

        let points = sales_data(&catalog, &shift);
        assert_eq!(
            points,
            vec![SalesPoint {
                item_id: "bread".to_string(),
                name: "Bread".to_string(),
                produced: 12,
                sold: 7,
            }]
        );
        // Reconciled sold is a different figure
        assert_eq!(row(&inventory_sheet(&catalog, &shift), "bread").sold, 12);
        assert_eq!(sales_by_item(&catalog, &shift), vec![("bread".to_string(), 7)]);
    }

    #[test]
    fn test_entries_for_removed_items_are_ignored() {
        let mut catalog = bakery();
        let now = Utc::now();
        let mut shift = open_with(&catalog, ShiftOpening::default());
        shift.add_production(&catalog, "roll", 5, now).unwrap();
        shift
            .add_discharge(&catalog, "roll", 1, DischargeReason::Damaged, None, now)
            .unwrap();

        catalog = Catalog::from_items(vec![catalog.items()[0].clone()]);

        assert!(total_cost(&catalog, &shift).is_zero());
        assert_eq!(total_discharges(&catalog, &shift).count, 1);
        assert!(total_discharges(&catalog, &shift).cost.is_zero());
        assert!(sales_data(&catalog, &shift).is_empty());
        assert_eq!(inventory_sheet(&catalog, &shift).len(), 1);
    }

    #[test]
    fn test_summary_matches_individual_figures() {
        let catalog = bakery();
        let now = Utc::now();
        let mut shift = open_with(
            &catalog,
            ShiftOpening::default().count("bread", 10).count("roll", 2),
        );
        shift.add_production(&catalog, "bread", 20, now).unwrap();
        shift.add_production(&catalog, "roll", 6, now).unwrap();
        shift.add_sale(&catalog, "roll", 4, now).unwrap();
        shift
            .add_discharge(&catalog, "bread", 2, DischargeReason::Expired, None, now)
            .unwrap();
        shift.prefill_ending_inventory(&catalog).unwrap();
        shift.set_ending_inventory(&catalog, "bread", 5).unwrap();

        let summary = summarize(&catalog, &shift);
        assert_eq!(summary.rows, inventory_sheet(&catalog, &shift));
        assert_eq!(summary.total_revenue, total_revenue(&catalog, &shift));
        assert_eq!(summary.total_cost, total_cost(&catalog, &shift));
        assert_eq!(summary.estimated_profit, estimated_profit(&catalog, &shift));
        assert_eq!(summary.discharges, total_discharges(&catalog, &shift));
        assert_eq!(summary.total_produced, 26);
        assert_eq!(summary.total_sale_entries, 4);
        // bread 23 + roll (2 + 6 - 4 prefilled) = 4
        assert_eq!(summary.total_sold, 27);
        assert_eq!(summary.total_revenue.cents(), 23 * 500 + 4 * 300);
    }

    #[test]
    fn test_blank_shift_projects_cleanly() {
        let catalog = bakery();
        let shift = Shift::initial();
        let summary = summarize(&catalog, &shift);
        assert_eq!(summary.rows.len(), 2);
        assert!(summary.rows.iter().all(|r| r.beginning == 0 && r.ending.is_none()));
        assert!(summary.total_revenue.is_zero());
        assert!(sales_data(&catalog, &shift).is_empty());
    }

    #[test]
    fn test_extreme_stored_values_do_not_panic() {
        let catalog = bakery();
        let now = Utc::now();
        let mut shift = open_with(&catalog, ShiftOpening::default());
        shift.add_production(&catalog, "bread", 1, now).unwrap();
        shift.add_sale(&catalog, "bread", 1, now).unwrap();
        shift.add_sale(&catalog, "bread", 1, now).unwrap();

        // Rows as a hand-edited database could hand them back
        shift.production[0].quantity = i64::MAX / 100;
        shift.sales[0].quantity = i64::MAX;
        shift.inventory_start.insert("bread".to_string(), i64::MAX);
        shift.inventory_end.insert("bread".to_string(), i64::MIN);

        let summary = summarize(&catalog, &shift);
        let bread = row(&summary.rows, "bread");
        assert_eq!(bread.total, i64::MAX);
        assert_eq!(bread.sold, i64::MAX);
        assert_eq!(bread.amount.cents(), i64::MAX);
        assert_eq!(summary.total_revenue.cents(), i64::MAX);
        assert_eq!(summary.total_cost.cents(), i64::MAX);
        assert_eq!(summary.total_sale_entries, i64::MAX);
        assert!(summary.estimated_profit.is_zero());

        assert_eq!(sales_data(&catalog, &shift)[0].sold, i64::MAX);
        assert_eq!(sales_by_item(&catalog, &shift), vec![("bread".to_string(), i64::MAX)]);
        assert_eq!(expected_ending(&shift, "bread"), 0);
    }
}

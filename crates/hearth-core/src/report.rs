//! # Shift Report
//!
//! The archival projection written once when a shift closes.
//!
//! ```text
//! Shift (OPEN) ── end(closing_cash) ──► Shift (CLOSED)
//!                        │
//!                        └──► ShiftReport   (append-only archive)
//!                              counts, totals, operator
//! ```
//!
//! A report copies the two inventory snapshots, so it stays readable after
//! catalog items are edited or removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::money::Money;
use crate::reconciliation::summarize;
use crate::types::{InventoryCounts, Operator, Shift};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShiftReport {
    pub id: String,
    pub shift_id: String,
    #[ts(as = "String")]
    pub start_time: DateTime<Utc>,
    #[ts(as = "String")]
    pub end_time: DateTime<Utc>,
    pub opening_cash_cents: i64,
    pub closing_cash_cents: i64,
    pub inventory_start: InventoryCounts,
    pub inventory_end: InventoryCounts,
    /// Units in the production ledger.
    pub total_production: i64,
    /// Reconciled revenue at close.
    pub total_revenue_cents: i64,
    /// Reconciled units sold, the figure revenue is built on.
    pub total_sold: i64,
    /// Units written off.
    pub total_discharges: i64,
    pub operator: Option<Operator>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl ShiftReport {
    /// Builds the report for a shift that has just been closed.
    pub(crate) fn from_closed_shift(
        shift: &Shift,
        catalog: &Catalog,
        operator: Option<Operator>,
        now: DateTime<Utc>,
    ) -> ShiftReport {
        let summary = summarize(catalog, shift);

        ShiftReport {
            id: Uuid::new_v4().to_string(),
            shift_id: shift.id.clone(),
            start_time: shift.start_time.unwrap_or(now),
            end_time: shift.end_time.unwrap_or(now),
            opening_cash_cents: shift.opening_cash_cents,
            closing_cash_cents: shift.closing_cash_cents.unwrap_or(0),
            inventory_start: shift.inventory_start.clone(),
            inventory_end: shift.inventory_end.clone(),
            total_production: summary.total_produced,
            total_revenue_cents: summary.total_revenue.cents(),
            total_sold: summary.total_sold,
            total_discharges: summary.discharges.count,
            operator,
            created_at: now,
        }
    }

    #[inline]
    pub fn total_revenue(&self) -> Money {
        Money::from_cents(self.total_revenue_cents)
    }

    #[inline]
    pub fn opening_cash(&self) -> Money {
        Money::from_cents(self.opening_cash_cents)
    }

    #[inline]
    pub fn closing_cash(&self) -> Money {
        Money::from_cents(self.closing_cash_cents)
    }

    /// Closing minus opening cash.
    pub fn cash_movement(&self) -> Money {
        self.closing_cash() - self.opening_cash()
    }

    pub fn operator_name(&self) -> Option<&str> {
        self.operator.as_ref().map(|op| op.display_name.as_str())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shift::ShiftOpening;
    use crate::types::DischargeReason;

    #[test]
    fn test_report_totals() {
        let catalog = Catalog::default();
        let opened = Utc::now();
        let mut shift = Shift::initial()
            .start(
                &catalog,
                ShiftOpening::with_cash(100_000).count("13", 10),
                opened,
            )
            .unwrap();
        shift.add_production(&catalog, "13", 20, opened).unwrap();
        shift.add_production(&catalog, "28", 6, opened).unwrap();
        shift.add_sale(&catalog, "28", 6, opened).unwrap();
        shift
            .add_discharge(&catalog, "13", 2, DischargeReason::Expired, None, opened)
            .unwrap();
        shift.set_ending_inventory(&catalog, "13", 5).unwrap();

        let report = shift
            .end(
                &catalog,
                211_500,
                Some(Operator::new("u-7", "Ana Cruz")),
                Utc::now(),
            )
            .unwrap();

        assert_eq!(report.shift_id, shift.id);
        assert_eq!(report.start_time, opened);
        assert_eq!(report.total_production, 26);
        // Sprite has no ending count, so only MONAY's 23 register
        assert_eq!(report.total_sold, 23);
        assert_eq!(report.total_revenue().cents(), 11_500);
        assert_eq!(report.total_discharges, 2);
        assert_eq!(report.inventory_start["13"], 10);
        assert_eq!(report.inventory_end.get("28"), None);
        assert_eq!(report.cash_movement().cents(), 111_500);
        assert_eq!(report.operator_name(), Some("Ana Cruz"));
    }

    #[test]
    fn test_report_json_shape() {
        let catalog = Catalog::default();
        let mut shift = Shift::initial()
            .start(&catalog, ShiftOpening::default(), Utc::now())
            .unwrap();
        let report = shift.end(&catalog, 0, None, Utc::now()).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_revenue_cents"], 0);
        assert!(json["operator"].is_null());

        let back: ShiftReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }
}

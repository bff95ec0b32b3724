//! # Bakery Store
//!
//! The one store object the composition root owns. Every catalog, lifecycle
//! and ledger command goes through it; every query reads from it.
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        BakeryStore command                              │
//! │                                                                         │
//! │  1. session.require()          no operator  ──► Err(Unauthorized)       │
//! │  2. pending.lock().await       one command at a time                    │
//! │  3. state.lock()               hearth-core rule ──► Err(Domain)         │
//! │       mutate catalog / shift   (nothing changed on Err)                 │
//! │  4. mark dirty / queue report                                           │
//! │  5. events.send(StoreEvent)    subscribers see the change now           │
//! │  6. drain pending writes       retired shifts, reports, catalog, shift  │
//! │       ok   ──► Durability::Saved                                        │
//! │       fail ──► Durability::Queued { pending, error }  (kept, retried)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Locks
//! - `state` is a std mutex and is never held across an `.await`
//! - `pending` is a tokio mutex held for the whole command, which serializes
//!   writers. Queries only take `state` and never wait on the backend.
//!
//! In-memory changes are never rolled back when a write fails. A single
//! terminal is assumed; two stores writing one database is last write wins.

mod backend;
mod events;
mod pending;

pub use backend::Backend;
pub use events::{StoreEvent, Subscription};

#[cfg(test)]
pub(crate) use backend::memory::MemoryBackend;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use hearth_core::reconciliation;
use hearth_core::{
    Catalog, CatalogItem, CoreResult, DischargeEntry, DischargeReason, DischargeTotals,
    InventoryCounts, InventoryRow, LedgerKind, Money, NewCatalogItem, Operator, ProductionEntry,
    SaleEntry, SalesPoint, Shift, ShiftOpening, ShiftReport, ShiftSummary,
};
use hearth_db::{DbError, DbResult};

use crate::error::StoreResult;
use crate::state::Session;
use events::EVENT_CAPACITY;
use pending::PendingWrites;

// =============================================================================
// Settings & Results
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// Attempts `flush_pending` makes before reporting the queue as stuck.
    pub max_attempts: u32,
    /// First delay between attempts; doubles each time.
    pub base_backoff: Duration,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            max_attempts: 5,
            base_backoff: Duration::from_millis(200),
        }
    }
}

/// Whether a command's change reached the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Durability {
    Saved,
    /// The change is applied in memory and waiting in the retry queue.
    Queued { pending: usize, error: String },
}

impl Durability {
    pub fn is_saved(&self) -> bool {
        matches!(self, Durability::Saved)
    }
}

/// A command result: the value plus what happened to the durable write.
#[derive(Debug, Clone)]
pub struct Committed<T> {
    pub value: T,
    pub durability: Durability,
}

// =============================================================================
// Internal Change Description
// =============================================================================

struct StoreState {
    catalog: Catalog,
    shift: Shift,
}

/// What a successful mutation touched.
struct Change<T> {
    value: T,
    event: StoreEvent,
    catalog: bool,
    shift: bool,
    retired: Option<Shift>,
    report: Option<ShiftReport>,
}

impl<T> Change<T> {
    fn catalog(value: T) -> Self {
        Change {
            value,
            event: StoreEvent::CatalogChanged,
            catalog: true,
            shift: false,
            retired: None,
            report: None,
        }
    }

    fn shift(value: T, event: StoreEvent) -> Self {
        Change {
            value,
            event,
            catalog: false,
            shift: true,
            retired: None,
            report: None,
        }
    }

    fn ledger(value: T, shift_id: &str, kind: LedgerKind) -> Self {
        Change::shift(
            value,
            StoreEvent::LedgerChanged {
                shift_id: shift_id.to_string(),
                kind,
            },
        )
    }

    fn counts(value: T, shift_id: &str) -> Self {
        Change::shift(
            value,
            StoreEvent::EndingInventoryChanged {
                shift_id: shift_id.to_string(),
            },
        )
    }
}

// =============================================================================
// Bakery Store
// =============================================================================

pub struct BakeryStore {
    backend: Arc<dyn Backend>,
    settings: StoreSettings,
    session: Session,
    state: Mutex<StoreState>,
    pending: tokio::sync::Mutex<PendingWrites>,
    events: broadcast::Sender<StoreEvent>,
}

impl BakeryStore {
    /// Loads the catalog and current shift from `backend`.
    ///
    /// A backend with no catalog gets the default one, saved right away. With
    /// no saved shift the store starts from a blank CLOSED shift.
    pub async fn open(backend: Arc<dyn Backend>, settings: StoreSettings) -> StoreResult<Self> {
        let (catalog, seeded) = match backend.load_catalog().await? {
            Some(items) => (Catalog::from_items(items), false),
            None => {
                info!("No saved catalog, seeding the default one");
                (Catalog::default(), true)
            }
        };

        let shift = backend
            .load_current_shift()
            .await?
            .unwrap_or_else(Shift::initial);

        info!(
            items = catalog.len(),
            shift_id = %shift.id,
            status = %shift.status,
            "Store opened"
        );

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let store = BakeryStore {
            backend,
            settings,
            session: Session::new(),
            state: Mutex::new(StoreState { catalog, shift }),
            pending: tokio::sync::Mutex::new(PendingWrites {
                catalog_dirty: seeded,
                ..PendingWrites::default()
            }),
            events,
        };

        if seeded {
            let mut pending = store.pending.lock().await;
            store.drain(&mut pending).await;
        }

        Ok(store)
    }

    // =========================================================================
    // Session
    // =========================================================================

    pub fn sign_in(&self, operator: Operator) {
        self.session.sign_in(operator);
    }

    pub fn sign_out(&self) -> Option<Operator> {
        self.session.sign_out()
    }

    pub fn operator(&self) -> Option<Operator> {
        self.session.current()
    }

    // =========================================================================
    // Change Notification
    // =========================================================================

    pub fn subscribe(&self) -> Subscription {
        Subscription::new(self.events.subscribe())
    }

    // =========================================================================
    // Catalog Commands
    // =========================================================================

    pub async fn add_item(&self, input: NewCatalogItem) -> StoreResult<Committed<CatalogItem>> {
        self.commit("add a catalog item", |state, _, _| {
            let item = state.catalog.add(input)?;
            info!(id = %item.id, name = %item.name, "Catalog item added");
            Ok(Change::catalog(item))
        })
        .await
    }

    pub async fn update_item(&self, item: CatalogItem) -> StoreResult<Committed<CatalogItem>> {
        self.commit("update a catalog item", |state, _, _| {
            let item = state.catalog.update(item)?;
            info!(id = %item.id, name = %item.name, "Catalog item updated");
            Ok(Change::catalog(item))
        })
        .await
    }

    pub async fn remove_item(&self, item_id: &str) -> StoreResult<Committed<CatalogItem>> {
        self.commit("remove a catalog item", |state, _, _| {
            let StoreState { catalog, shift } = state;
            let item = catalog.remove(item_id, shift)?;
            info!(id = %item.id, name = %item.name, "Catalog item removed");
            Ok(Change::catalog(item))
        })
        .await
    }

    /// Replaces the catalog with the seed list. Shift data is untouched.
    pub async fn reset_catalog(&self) -> StoreResult<Committed<()>> {
        self.commit("reset the catalog", |state, _, _| {
            state.catalog.reset_to_defaults();
            info!(items = state.catalog.len(), "Catalog reset to defaults");
            Ok(Change::catalog(()))
        })
        .await
    }

    // =========================================================================
    // Lifecycle Commands
    // =========================================================================

    pub async fn start_shift(&self, opening: ShiftOpening) -> StoreResult<Committed<Shift>> {
        self.commit("start a shift", |state, operator, now| {
            let next = state.shift.start(&state.catalog, opening, now)?;
            let previous = std::mem::replace(&mut state.shift, next.clone());

            info!(
                shift_id = %next.id,
                operator = %operator.display_name,
                opening_cash_cents = next.opening_cash_cents,
                "Shift started"
            );

            let event = StoreEvent::ShiftStarted {
                shift_id: next.id.clone(),
            };
            let mut change = Change::shift(next, event);
            change.retired = Some(previous);
            Ok(change)
        })
        .await
    }

    /// Writes the expected count for every catalog item into the ending
    /// inventory and returns the new counts.
    pub async fn prefill_ending_inventory(&self) -> StoreResult<Committed<InventoryCounts>> {
        self.commit("prefill ending inventory", |state, _, _| {
            state.shift.prefill_ending_inventory(&state.catalog)?;
            debug!(shift_id = %state.shift.id, "Ending inventory prefilled");
            Ok(Change::counts(
                state.shift.inventory_end.clone(),
                &state.shift.id,
            ))
        })
        .await
    }

    /// Closes the shift as the signed-in operator and archives its report.
    pub async fn end_shift(&self, closing_cash_cents: i64) -> StoreResult<Committed<ShiftReport>> {
        self.commit("end the shift", |state, operator, now| {
            let StoreState { catalog, shift } = state;
            let report = shift.end(catalog, closing_cash_cents, Some(operator.clone()), now)?;

            info!(
                shift_id = %shift.id,
                report_id = %report.id,
                revenue_cents = report.total_revenue_cents,
                sold = report.total_sold,
                operator = %operator.display_name,
                "Shift ended"
            );

            let event = StoreEvent::ShiftEnded {
                shift_id: shift.id.clone(),
                report_id: report.id.clone(),
            };
            let mut change = Change::shift(report.clone(), event);
            change.report = Some(report);
            Ok(change)
        })
        .await
    }

    // =========================================================================
    // Ledger Commands
    // =========================================================================

    pub async fn add_production(
        &self,
        item_id: &str,
        quantity: i64,
    ) -> StoreResult<Committed<ProductionEntry>> {
        self.commit("add production", |state, _, now| {
            let entry = state
                .shift
                .add_production(&state.catalog, item_id, quantity, now)?;
            debug!(item_id, quantity, "Production recorded");
            Ok(Change::ledger(entry, &state.shift.id, LedgerKind::Production))
        })
        .await
    }

    pub async fn add_sale(&self, item_id: &str, quantity: i64) -> StoreResult<Committed<SaleEntry>> {
        self.commit("add a sale", |state, _, now| {
            let entry = state.shift.add_sale(&state.catalog, item_id, quantity, now)?;
            debug!(item_id, quantity, "Sale recorded");
            Ok(Change::ledger(entry, &state.shift.id, LedgerKind::Sale))
        })
        .await
    }

    pub async fn add_discharge(
        &self,
        item_id: &str,
        quantity: i64,
        reason: DischargeReason,
        notes: Option<String>,
    ) -> StoreResult<Committed<DischargeEntry>> {
        self.commit("add a discharge", |state, _, now| {
            let entry =
                state
                    .shift
                    .add_discharge(&state.catalog, item_id, quantity, reason, notes, now)?;
            debug!(item_id, quantity, reason = %reason, "Discharge recorded");
            Ok(Change::ledger(entry, &state.shift.id, LedgerKind::Discharge))
        })
        .await
    }

    pub async fn set_production_quantity(
        &self,
        item_id: &str,
        quantity: i64,
    ) -> StoreResult<Committed<Option<ProductionEntry>>> {
        self.commit("set production quantity", |state, _, now| {
            let entry = state
                .shift
                .set_production_quantity(&state.catalog, item_id, quantity, now)?;
            debug!(item_id, quantity, "Production quantity set");
            Ok(Change::ledger(entry, &state.shift.id, LedgerKind::Production))
        })
        .await
    }

    pub async fn set_sales_quantity(
        &self,
        item_id: &str,
        quantity: i64,
    ) -> StoreResult<Committed<Option<SaleEntry>>> {
        self.commit("set sales quantity", |state, _, now| {
            let entry = state
                .shift
                .set_sales_quantity(&state.catalog, item_id, quantity, now)?;
            debug!(item_id, quantity, "Sales quantity set");
            Ok(Change::ledger(entry, &state.shift.id, LedgerKind::Sale))
        })
        .await
    }

    pub async fn set_discharge_quantity(
        &self,
        item_id: &str,
        quantity: i64,
        reason: DischargeReason,
        notes: Option<String>,
    ) -> StoreResult<Committed<Option<DischargeEntry>>> {
        self.commit("set discharge quantity", |state, _, now| {
            let entry = state.shift.set_discharge_quantity(
                &state.catalog,
                item_id,
                quantity,
                reason,
                notes,
                now,
            )?;
            debug!(item_id, quantity, "Discharge quantity set");
            Ok(Change::ledger(entry, &state.shift.id, LedgerKind::Discharge))
        })
        .await
    }

    pub async fn remove_entry(&self, kind: LedgerKind, entry_id: &str) -> StoreResult<Committed<()>> {
        self.commit("remove a ledger entry", |state, _, _| {
            state.shift.remove_entry(kind, entry_id)?;
            debug!(kind = %kind, entry_id, "Ledger entry removed");
            Ok(Change::ledger((), &state.shift.id, kind))
        })
        .await
    }

    pub async fn set_ending_inventory(
        &self,
        item_id: &str,
        count: i64,
    ) -> StoreResult<Committed<()>> {
        self.commit("set ending inventory", |state, _, _| {
            state
                .shift
                .set_ending_inventory(&state.catalog, item_id, count)?;
            debug!(item_id, count, "Ending count set");
            Ok(Change::counts((), &state.shift.id))
        })
        .await
    }

    /// Returns the item to "not counted". The value says whether it had a count.
    pub async fn clear_ending_inventory(&self, item_id: &str) -> StoreResult<Committed<bool>> {
        self.commit("clear ending inventory", |state, _, _| {
            let cleared = state.shift.clear_ending_inventory(&state.catalog, item_id)?;
            debug!(item_id, cleared, "Ending count cleared");
            Ok(Change::counts(cleared, &state.shift.id))
        })
        .await
    }

    // =========================================================================
    // Query Surface
    // =========================================================================

    pub fn catalog(&self) -> Catalog {
        self.lock_state().catalog.clone()
    }

    pub fn shift(&self) -> Shift {
        self.lock_state().shift.clone()
    }

    pub fn inventory_sheet(&self) -> Vec<InventoryRow> {
        let state = self.lock_state();
        reconciliation::inventory_sheet(&state.catalog, &state.shift)
    }

    pub fn total_revenue(&self) -> Money {
        let state = self.lock_state();
        reconciliation::total_revenue(&state.catalog, &state.shift)
    }

    pub fn total_cost(&self) -> Money {
        let state = self.lock_state();
        reconciliation::total_cost(&state.catalog, &state.shift)
    }

    pub fn estimated_profit(&self) -> Money {
        let state = self.lock_state();
        reconciliation::estimated_profit(&state.catalog, &state.shift)
    }

    pub fn total_discharges(&self) -> DischargeTotals {
        let state = self.lock_state();
        reconciliation::total_discharges(&state.catalog, &state.shift)
    }

    pub fn sales_data(&self) -> Vec<SalesPoint> {
        let state = self.lock_state();
        reconciliation::sales_data(&state.catalog, &state.shift)
    }

    pub fn sales_by_item(&self) -> Vec<(String, i64)> {
        let state = self.lock_state();
        reconciliation::sales_by_item(&state.catalog, &state.shift)
    }

    pub fn summary(&self) -> ShiftSummary {
        let state = self.lock_state();
        reconciliation::summarize(&state.catalog, &state.shift)
    }

    /// Archived reports, newest first.
    pub async fn recent_reports(&self, limit: u32) -> StoreResult<Vec<ShiftReport>> {
        Ok(self.backend.recent_reports(limit).await?)
    }

    /// Writes still waiting for the backend.
    pub async fn pending_writes(&self) -> usize {
        self.pending.lock().await.len()
    }

    // =========================================================================
    // Write-Through
    // =========================================================================

    /// Retries the queue with exponential backoff, up to `max_attempts` tries.
    pub async fn flush_pending(&self) -> Durability {
        let mut pending = self.pending.lock().await;
        let mut backoff = ExponentialBackoff {
            initial_interval: self.settings.base_backoff,
            max_interval: self.settings.base_backoff * 32,
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        };

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let durability = self.drain(&mut pending).await;
            if durability.is_saved() || attempt >= self.settings.max_attempts {
                if !durability.is_saved() {
                    warn!(attempt, pending = pending.len(), "Giving up on queued writes for now");
                }
                return durability;
            }

            match backoff.next_backoff() {
                Some(delay) => {
                    debug!(?delay, attempt, "Waiting before retrying queued writes");
                    tokio::time::sleep(delay).await;
                }
                None => return durability,
            }
        }
    }

    async fn commit<T, F>(&self, action: &'static str, mutate: F) -> StoreResult<Committed<T>>
    where
        F: FnOnce(&mut StoreState, &Operator, DateTime<Utc>) -> CoreResult<Change<T>>,
    {
        let operator = self.session.require(action)?;
        let mut pending = self.pending.lock().await;

        let change = {
            let mut state = self.lock_state();
            mutate(&mut *state, &operator, Utc::now())?
        };

        if let Some(previous) = change.retired {
            pending.retire(previous);
        }
        if let Some(report) = change.report {
            pending.reports.push_back(report);
        }
        pending.catalog_dirty |= change.catalog;
        pending.shift_dirty |= change.shift;

        // No subscribers is fine
        let _ = self.events.send(change.event);

        let durability = self.drain(&mut pending).await;
        Ok(Committed {
            value: change.value,
            durability,
        })
    }

    /// One pass over the queue.
    async fn drain(&self, pending: &mut PendingWrites) -> Durability {
        if pending.is_empty() {
            return Durability::Saved;
        }

        match self.flush_once(pending).await {
            Ok(()) => {
                if pending.attempts > 0 {
                    info!(after = pending.attempts, "Queued writes saved");
                }
                pending.record_success();
                Durability::Saved
            }
            Err(err) => {
                let error = err.to_string();
                pending.record_failure(error.clone());
                warn!(
                    error = %error,
                    pending = pending.len(),
                    attempts = pending.attempts,
                    "Durable write failed, change kept in memory and queued"
                );
                Durability::Queued {
                    pending: pending.len(),
                    error,
                }
            }
        }
    }

    async fn flush_once(&self, pending: &mut PendingWrites) -> DbResult<()> {
        while let Some(shift) = pending.retired_shifts.front() {
            self.backend.save_shift(shift).await?;
            pending.retired_shifts.pop_front();
        }

        while let Some(report) = pending.reports.front() {
            match self.backend.append_report(report).await {
                Ok(()) => {}
                Err(DbError::UniqueViolation { .. }) => {
                    debug!(report_id = %report.id, "Report already archived");
                }
                Err(e) => return Err(e),
            }
            pending.reports.pop_front();
        }

        if pending.catalog_dirty {
            let items = self.lock_state().catalog.items().to_vec();
            self.backend.save_catalog(&items).await?;
            pending.catalog_dirty = false;
        }

        if pending.shift_dirty {
            let shift = self.lock_state().shift.clone();
            self.backend.save_shift(&shift).await?;
            pending.shift_dirty = false;
        }

        Ok(())
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

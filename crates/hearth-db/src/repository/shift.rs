//! # Shift Repository
//!
//! Persists whole shifts: header row, the three ledgers and both inventory
//! snapshots.
//!
//! ## Save Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    UPSERT shifts            (status, times, cash)                       │
//! │    DELETE shift_entries     WHERE shift_id = ?                          │
//! │    INSERT shift_entries     production, sales, discharges (seq order)   │
//! │    DELETE shift_inventory   WHERE shift_id = ?                          │
//! │    INSERT shift_inventory   start + end counts                          │
//! │    UPSERT app_state         current_shift_id = ?                        │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Saving a shift always makes it the current one. Earlier shifts stay in the
//! table and can still be read with [`ShiftRepository::get`].

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::state_keys::CURRENT_SHIFT_ID;
use hearth_core::{
    DischargeEntry, DischargeReason, InventoryCounts, LedgerKind, ProductionEntry, SaleEntry,
    Shift, ShiftStatus,
};

const PHASE_START: &str = "start";
const PHASE_END: &str = "end";

/// Repository for shifts.
#[derive(Debug, Clone)]
pub struct ShiftRepository {
    pool: SqlitePool,
}

// =============================================================================
// Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ShiftRow {
    id: String,
    status: ShiftStatus,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    opening_cash_cents: i64,
    closing_cash_cents: Option<i64>,
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: String,
    kind: LedgerKind,
    item_id: String,
    quantity: i64,
    reason: Option<DischargeReason>,
    notes: Option<String>,
    recorded_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct InventoryRow {
    item_id: String,
    phase: String,
    count: i64,
}

impl ShiftRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ShiftRepository { pool }
    }

    /// Writes the full shift and points `current_shift_id` at it.
    pub async fn save(&self, shift: &Shift) -> DbResult<()> {
        debug!(
            id = %shift.id,
            status = %shift.status,
            production = shift.production.len(),
            sales = shift.sales.len(),
            discharges = shift.discharges.len(),
            "Saving shift"
        );

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO shifts (
                id, status, start_time, end_time,
                opening_cash_cents, closing_cash_cents, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (id) DO UPDATE SET
                status = excluded.status,
                start_time = excluded.start_time,
                end_time = excluded.end_time,
                opening_cash_cents = excluded.opening_cash_cents,
                closing_cash_cents = excluded.closing_cash_cents,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&shift.id)
        .bind(shift.status)
        .bind(shift.start_time)
        .bind(shift.end_time)
        .bind(shift.opening_cash_cents)
        .bind(shift.closing_cash_cents)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM shift_entries WHERE shift_id = ?1")
            .bind(&shift.id)
            .execute(&mut *tx)
            .await?;

        for (seq, entry) in shift.production.iter().enumerate() {
            let row = EntryInsert {
                id: &entry.id,
                kind: LedgerKind::Production,
                item_id: &entry.item_id,
                quantity: entry.quantity,
                reason: None,
                notes: None,
                recorded_at: entry.timestamp,
                seq,
            };
            row.execute(&mut tx, &shift.id).await?;
        }
        for (seq, entry) in shift.sales.iter().enumerate() {
            let row = EntryInsert {
                id: &entry.id,
                kind: LedgerKind::Sale,
                item_id: &entry.item_id,
                quantity: entry.quantity,
                reason: None,
                notes: None,
                recorded_at: entry.timestamp,
                seq,
            };
            row.execute(&mut tx, &shift.id).await?;
        }
        for (seq, entry) in shift.discharges.iter().enumerate() {
            let row = EntryInsert {
                id: &entry.id,
                kind: LedgerKind::Discharge,
                item_id: &entry.item_id,
                quantity: entry.quantity,
                reason: Some(entry.reason),
                notes: entry.notes.as_deref(),
                recorded_at: entry.timestamp,
                seq,
            };
            row.execute(&mut tx, &shift.id).await?;
        }

        sqlx::query("DELETE FROM shift_inventory WHERE shift_id = ?1")
            .bind(&shift.id)
            .execute(&mut *tx)
            .await?;

        insert_counts(&mut tx, &shift.id, PHASE_START, &shift.inventory_start).await?;
        insert_counts(&mut tx, &shift.id, PHASE_END, &shift.inventory_end).await?;

        sqlx::query(
            r#"
            INSERT INTO app_state (key, value) VALUES (?1, ?2)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(CURRENT_SHIFT_ID)
        .bind(&shift.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Loads the shift `current_shift_id` points at.
    ///
    /// ## Returns
    /// `None` on a database that never saved a shift.
    pub async fn load_current(&self) -> DbResult<Option<Shift>> {
        let current: Option<String> =
            sqlx::query_scalar("SELECT value FROM app_state WHERE key = ?1")
                .bind(CURRENT_SHIFT_ID)
                .fetch_optional(&self.pool)
                .await?;

        match current {
            Some(id) => match self.get(&id).await? {
                Some(shift) => Ok(Some(shift)),
                // The pointer is written in the same transaction as the row
                None => Err(DbError::corrupt(
                    "app_state",
                    CURRENT_SHIFT_ID,
                    format!("points at missing shift {}", id),
                )),
            },
            None => Ok(None),
        }
    }

    /// Loads one shift by id with its ledgers and counts.
    pub async fn get(&self, id: &str) -> DbResult<Option<Shift>> {
        let header: Option<ShiftRow> = sqlx::query_as(
            r#"
            SELECT id, status, start_time, end_time, opening_cash_cents, closing_cash_cents
            FROM shifts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let entries: Vec<EntryRow> = sqlx::query_as(
            r#"
            SELECT id, kind, item_id, quantity, reason, notes, recorded_at
            FROM shift_entries
            WHERE shift_id = ?1
            ORDER BY kind, seq
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let counts: Vec<InventoryRow> = sqlx::query_as(
            "SELECT item_id, phase, count FROM shift_inventory WHERE shift_id = ?1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let mut shift = Shift {
            id: header.id,
            status: header.status,
            start_time: header.start_time,
            end_time: header.end_time,
            opening_cash_cents: header.opening_cash_cents,
            closing_cash_cents: header.closing_cash_cents,
            production: Vec::new(),
            sales: Vec::new(),
            discharges: Vec::new(),
            inventory_start: InventoryCounts::new(),
            inventory_end: InventoryCounts::new(),
        };

        for row in entries {
            match row.kind {
                LedgerKind::Production => shift.production.push(ProductionEntry {
                    id: row.id,
                    item_id: row.item_id,
                    quantity: row.quantity,
                    timestamp: row.recorded_at,
                }),
                LedgerKind::Sale => shift.sales.push(SaleEntry {
                    id: row.id,
                    item_id: row.item_id,
                    quantity: row.quantity,
                    timestamp: row.recorded_at,
                }),
                LedgerKind::Discharge => {
                    let reason = row.reason.ok_or_else(|| {
                        DbError::corrupt("shift_entries", row.id.clone(), "discharge without reason")
                    })?;
                    shift.discharges.push(DischargeEntry {
                        id: row.id,
                        item_id: row.item_id,
                        quantity: row.quantity,
                        reason,
                        notes: row.notes,
                        timestamp: row.recorded_at,
                    });
                }
            }
        }

        for row in counts {
            let target = match row.phase.as_str() {
                PHASE_START => &mut shift.inventory_start,
                PHASE_END => &mut shift.inventory_end,
                other => {
                    return Err(DbError::corrupt(
                        "shift_inventory",
                        row.item_id,
                        format!("unknown phase '{}'", other),
                    ))
                }
            };
            target.insert(row.item_id, row.count);
        }

        Ok(Some(shift))
    }

    /// Counts stored shifts (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shifts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Insert Helpers
// =============================================================================

struct EntryInsert<'a> {
    id: &'a str,
    kind: LedgerKind,
    item_id: &'a str,
    quantity: i64,
    reason: Option<DischargeReason>,
    notes: Option<&'a str>,
    recorded_at: DateTime<Utc>,
    seq: usize,
}

impl EntryInsert<'_> {
    async fn execute(&self, tx: &mut Transaction<'_, Sqlite>, shift_id: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO shift_entries (
                id, shift_id, kind, item_id, quantity, reason, notes, recorded_at, seq
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(self.id)
        .bind(shift_id)
        .bind(self.kind)
        .bind(self.item_id)
        .bind(self.quantity)
        .bind(self.reason)
        .bind(self.notes)
        .bind(self.recorded_at)
        .bind(self.seq as i64)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

async fn insert_counts(
    tx: &mut Transaction<'_, Sqlite>,
    shift_id: &str,
    phase: &str,
    counts: &InventoryCounts,
) -> DbResult<()> {
    for (item_id, count) in counts {
        sqlx::query(
            "INSERT INTO shift_inventory (shift_id, item_id, phase, count) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(shift_id)
        .bind(item_id)
        .bind(phase)
        .bind(*count)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Report Repository
//!
//! Append-only archive of closed-shift reports.
//!
//! Reports are never updated. Appending the same report twice fails with
//! [`DbError::UniqueViolation`], which the store's retry queue treats as
//! "already saved".

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use hearth_core::{InventoryCounts, Operator, ShiftReport};

/// Repository for shift reports.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct ReportRow {
    id: String,
    shift_id: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    opening_cash_cents: i64,
    closing_cash_cents: i64,
    inventory_start: String,
    inventory_end: String,
    total_production: i64,
    total_revenue_cents: i64,
    total_sold: i64,
    total_discharges: i64,
    operator_id: Option<String>,
    operator_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReportRow> for ShiftReport {
    type Error = DbError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        let inventory_start = parse_counts(&row.id, "inventory_start", &row.inventory_start)?;
        let inventory_end = parse_counts(&row.id, "inventory_end", &row.inventory_end)?;

        let operator = match (row.operator_id, row.operator_name) {
            (Some(id), Some(name)) => Some(Operator::new(id, name)),
            _ => None,
        };

        Ok(ShiftReport {
            id: row.id,
            shift_id: row.shift_id,
            start_time: row.start_time,
            end_time: row.end_time,
            opening_cash_cents: row.opening_cash_cents,
            closing_cash_cents: row.closing_cash_cents,
            inventory_start,
            inventory_end,
            total_production: row.total_production,
            total_revenue_cents: row.total_revenue_cents,
            total_sold: row.total_sold,
            total_discharges: row.total_discharges,
            operator,
            created_at: row.created_at,
        })
    }
}

fn parse_counts(report_id: &str, column: &str, json: &str) -> DbResult<InventoryCounts> {
    serde_json::from_str(json)
        .map_err(|e| DbError::corrupt("shift_reports", report_id, format!("{}: {}", column, e)))
}

fn encode_counts(counts: &InventoryCounts) -> DbResult<String> {
    serde_json::to_string(counts).map_err(|e| DbError::Internal(e.to_string()))
}

const SELECT_REPORT: &str = r#"
    SELECT
        id, shift_id, start_time, end_time,
        opening_cash_cents, closing_cash_cents,
        inventory_start, inventory_end,
        total_production, total_revenue_cents, total_sold, total_discharges,
        operator_id, operator_name, created_at
    FROM shift_reports
"#;

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Archives a report.
    ///
    /// ## Errors
    /// `UniqueViolation` if the report id or its shift is already archived.
    pub async fn append(&self, report: &ShiftReport) -> DbResult<()> {
        debug!(
            id = %report.id,
            shift_id = %report.shift_id,
            revenue_cents = report.total_revenue_cents,
            "Appending shift report"
        );

        let inventory_start = encode_counts(&report.inventory_start)?;
        let inventory_end = encode_counts(&report.inventory_end)?;
        let (operator_id, operator_name) = match &report.operator {
            Some(op) => (Some(op.id.as_str()), Some(op.display_name.as_str())),
            None => (None, None),
        };

        sqlx::query(
            r#"
            INSERT INTO shift_reports (
                id, shift_id, start_time, end_time,
                opening_cash_cents, closing_cash_cents,
                inventory_start, inventory_end,
                total_production, total_revenue_cents, total_sold, total_discharges,
                operator_id, operator_name, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6,
                ?7, ?8,
                ?9, ?10, ?11, ?12,
                ?13, ?14, ?15
            )
            "#,
        )
        .bind(&report.id)
        .bind(&report.shift_id)
        .bind(report.start_time)
        .bind(report.end_time)
        .bind(report.opening_cash_cents)
        .bind(report.closing_cash_cents)
        .bind(inventory_start)
        .bind(inventory_end)
        .bind(report.total_production)
        .bind(report.total_revenue_cents)
        .bind(report.total_sold)
        .bind(report.total_discharges)
        .bind(operator_id)
        .bind(operator_name)
        .bind(report.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Most recent reports first, by shift end time.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<ShiftReport>> {
        let sql = format!("{} ORDER BY end_time DESC, created_at DESC LIMIT ?1", SELECT_REPORT);
        let rows: Vec<ReportRow> = sqlx::query_as(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ShiftReport::try_from).collect()
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<ShiftReport>> {
        let sql = format!("{} WHERE id = ?1", SELECT_REPORT);
        let row: Option<ReportRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ShiftReport::try_from).transpose()
    }

    /// Counts archived reports (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shift_reports")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Persistence Backend
//!
//! The durable record store as the [`BakeryStore`](super::BakeryStore) sees
//! it: whole-value saves and loads, plus the append-only report archive.
//!
//! [`hearth_db::Database`] is the production implementation. Tests use the
//! in-memory backend in [`memory`], which can be told to fail writes.

use async_trait::async_trait;

use hearth_core::{CatalogItem, Shift, ShiftReport};
use hearth_db::{Database, DbResult};

#[async_trait]
pub trait Backend: Send + Sync {
    /// `None` until a catalog was saved once.
    async fn load_catalog(&self) -> DbResult<Option<Vec<CatalogItem>>>;

    async fn save_catalog(&self, items: &[CatalogItem]) -> DbResult<()>;

    async fn load_current_shift(&self) -> DbResult<Option<Shift>>;

    /// Saves the shift and makes it the current one.
    async fn save_shift(&self, shift: &Shift) -> DbResult<()>;

    /// Fails with `UniqueViolation` when the report is already archived.
    async fn append_report(&self, report: &ShiftReport) -> DbResult<()>;

    /// Newest first.
    async fn recent_reports(&self, limit: u32) -> DbResult<Vec<ShiftReport>>;
}

#[async_trait]
impl Backend for Database {
    async fn load_catalog(&self) -> DbResult<Option<Vec<CatalogItem>>> {
        self.catalog().load().await
    }

    async fn save_catalog(&self, items: &[CatalogItem]) -> DbResult<()> {
        self.catalog().save(items).await
    }

    async fn load_current_shift(&self) -> DbResult<Option<Shift>> {
        self.shifts().load_current().await
    }

    async fn save_shift(&self, shift: &Shift) -> DbResult<()> {
        self.shifts().save(shift).await
    }

    async fn append_report(&self, report: &ShiftReport) -> DbResult<()> {
        self.reports().append(report).await
    }

    async fn recent_reports(&self, limit: u32) -> DbResult<Vec<ShiftReport>> {
        self.reports().list_recent(limit).await
    }
}

// =============================================================================
// In-Memory Backend (tests)
// =============================================================================

#[cfg(test)]
pub(crate) mod memory {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use super::*;
    use hearth_db::DbError;

    #[derive(Debug, Default)]
    struct Records {
        catalog: Option<Vec<CatalogItem>>,
        shifts: Vec<Shift>,
        current: Option<String>,
        reports: Vec<ShiftReport>,
        writes: u32,
    }

    /// Backend that keeps everything in a mutex and fails the next
    /// `n` writes on request.
    #[derive(Debug, Default)]
    pub(crate) struct MemoryBackend {
        records: Mutex<Records>,
        failing_writes: AtomicU32,
    }

    impl MemoryBackend {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn with_catalog(items: Vec<CatalogItem>) -> Self {
            let backend = Self::default();
            backend.records.lock().unwrap().catalog = Some(items);
            backend
        }

        pub(crate) fn fail_writes(&self, n: u32) {
            self.failing_writes.store(n, Ordering::SeqCst);
        }

        /// Successful writes so far.
        pub(crate) fn writes(&self) -> u32 {
            self.records.lock().unwrap().writes
        }

        pub(crate) fn saved_catalog(&self) -> Option<Vec<CatalogItem>> {
            self.records.lock().unwrap().catalog.clone()
        }

        pub(crate) fn saved_shift(&self, id: &str) -> Option<Shift> {
            let records = self.records.lock().unwrap();
            records.shifts.iter().find(|s| s.id == id).cloned()
        }

        pub(crate) fn current_shift_id(&self) -> Option<String> {
            self.records.lock().unwrap().current.clone()
        }

        pub(crate) fn report_count(&self) -> usize {
            self.records.lock().unwrap().reports.len()
        }

        fn write(&self, apply: impl FnOnce(&mut Records) -> DbResult<()>) -> DbResult<()> {
            let failing = self.failing_writes.load(Ordering::SeqCst);
            if failing > 0 {
                self.failing_writes.store(failing - 1, Ordering::SeqCst);
                return Err(DbError::ConnectionFailed("disk unplugged".to_string()));
            }
            let mut records = self.records.lock().unwrap();
            apply(&mut records)?;
            records.writes += 1;
            Ok(())
        }
    }

    #[async_trait]
    impl Backend for MemoryBackend {
        async fn load_catalog(&self) -> DbResult<Option<Vec<CatalogItem>>> {
            Ok(self.saved_catalog())
        }

        async fn save_catalog(&self, items: &[CatalogItem]) -> DbResult<()> {
            self.write(|r| {
                r.catalog = Some(items.to_vec());
                Ok(())
            })
        }

        async fn load_current_shift(&self) -> DbResult<Option<Shift>> {
            let records = self.records.lock().unwrap();
            Ok(records
                .current
                .as_ref()
                .and_then(|id| records.shifts.iter().find(|s| &s.id == id).cloned()))
        }

        async fn save_shift(&self, shift: &Shift) -> DbResult<()> {
            self.write(|r| {
                r.shifts.retain(|s| s.id != shift.id);
                r.shifts.push(shift.clone());
                r.current = Some(shift.id.clone());
                Ok(())
            })
        }

        async fn append_report(&self, report: &ShiftReport) -> DbResult<()> {
            self.write(|r| {
                if r.reports.iter().any(|x| x.id == report.id) {
                    return Err(DbError::duplicate("shift_reports.id", report.id.clone()));
                }
                r.reports.push(report.clone());
                Ok(())
            })
        }

        async fn recent_reports(&self, limit: u32) -> DbResult<Vec<ShiftReport>> {
            let mut reports = self.records.lock().unwrap().reports.clone();
            reports.sort_by(|a, b| b.end_time.cmp(&a.end_time));
            reports.truncate(limit as usize);
            Ok(reports)
        }
    }
}

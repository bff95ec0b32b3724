//! # Catalog Repository
//!
//! Stores the catalog as one ordered snapshot.
//!
//! A database that has never been given a catalog returns `None` from
//! [`CatalogRepository::load`], which is how the store tells "first run, use
//! the seed list" apart from "the owner deleted every item".

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::state_keys::CATALOG_INITIALIZED;
use hearth_core::{CatalogItem, Category};

/// Repository for catalog items.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct CatalogItemRow {
    id: String,
    name: String,
    category: Category,
    unit: String,
    cost_cents: i64,
    price_cents: i64,
}

impl From<CatalogItemRow> for CatalogItem {
    fn from(row: CatalogItemRow) -> Self {
        CatalogItem {
            id: row.id,
            name: row.name,
            category: row.category,
            unit: row.unit,
            cost_cents: row.cost_cents,
            price_cents: row.price_cents,
        }
    }
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Loads the saved catalog in display order.
    ///
    /// ## Returns
    /// `None` when no catalog was ever saved to this database.
    pub async fn load(&self) -> DbResult<Option<Vec<CatalogItem>>> {
        if !self.is_initialized().await? {
            return Ok(None);
        }

        let rows: Vec<CatalogItemRow> = sqlx::query_as(
            r#"
            SELECT id, name, category, unit, cost_cents, price_cents
            FROM catalog_items
            ORDER BY position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(rows.into_iter().map(CatalogItem::from).collect()))
    }

    /// Replaces the stored catalog with `items`, keeping their order.
    pub async fn save(&self, items: &[CatalogItem]) -> DbResult<()> {
        debug!(count = items.len(), "Saving catalog");

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM catalog_items")
            .execute(&mut *tx)
            .await?;

        for (position, item) in items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO catalog_items (
                    id, name, category, unit, cost_cents, price_cents, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&item.id)
            .bind(&item.name)
            .bind(item.category)
            .bind(&item.unit)
            .bind(item.cost_cents)
            .bind(item.price_cents)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO app_state (key, value) VALUES (?1, '1')
            ON CONFLICT (key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(CATALOG_INITIALIZED)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Whether a catalog was ever saved.
    pub async fn is_initialized(&self) -> DbResult<bool> {
        let flag: Option<String> = sqlx::query_scalar("SELECT value FROM app_state WHERE key = ?1")
            .bind(CATALOG_INITIALIZED)
            .fetch_optional(&self.pool)
            .await?;

        Ok(flag.is_some())
    }

    /// Counts stored items (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM catalog_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use hearth_core::{default_catalog, CatalogItem, Category};

    fn item(id: &str, name: &str) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: name.to_string(),
            category: Category::Pastry,
            unit: "pcs".to_string(),
            cost_cents: 1_200,
            price_cents: 2_500,
        }
    }

    #[tokio::test]
    async fn test_fresh_database_has_no_catalog() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert_eq!(db.catalog().load().await.unwrap(), None);
        assert!(!db.catalog().is_initialized().await.unwrap());
    }

    #[tokio::test]
    async fn test_save_and_load_keeps_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.catalog();

        let seed = default_catalog();
        repo.save(&seed).await.unwrap();

        let loaded = repo.load().await.unwrap().unwrap();
        assert_eq!(loaded, seed);
        assert_eq!(repo.count().await.unwrap(), seed.len() as i64);
    }

    #[tokio::test]
    async fn test_empty_catalog_is_not_first_run() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.catalog();

        repo.save(&[]).await.unwrap();
        assert_eq!(repo.load().await.unwrap(), Some(vec![]));
    }

    #[tokio::test]
    async fn test_save_replaces_previous_catalog() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.catalog();

        repo.save(&[item("a", "Ensaymada"), item("b", "Hopia")])
            .await
            .unwrap();
        repo.save(&[item("b", "Hopia"), item("c", "Ube Roll")])
            .await
            .unwrap();

        let ids: Vec<String> = repo
            .load()
            .await
            .unwrap()
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_case_insensitive_duplicate_names_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.catalog();

        let err = repo
            .save(&[item("a", "Hopia"), item("b", " hopia ")])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // The failed transaction left nothing behind
        assert_eq!(repo.load().await.unwrap(), None);
    }
}

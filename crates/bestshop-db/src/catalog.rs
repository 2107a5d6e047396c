//! Database operations for the `catalog_products` table.

use bestshop_core::CatalogRecord;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `catalog_products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogProductRow {
    pub id: Uuid,
    pub category: String,
    pub title: Option<String>,
    pub shops: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogProductRow {
    /// Drops the bookkeeping timestamps and hands the raw listing to the
    /// normalizer.
    #[must_use]
    pub fn into_record(self) -> CatalogRecord {
        CatalogRecord {
            id: self.id,
            category: self.category,
            title: self.title,
            shops: self.shops,
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns the catalog rows of `category` whose id is in `ids`.
///
/// Row order is unspecified; callers reorder by request. An empty `ids`
/// slice returns an empty vec without touching the database.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn fetch_catalog_products(
    pool: &PgPool,
    category: &str,
    ids: &[Uuid],
) -> Result<Vec<CatalogProductRow>, DbError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, CatalogProductRow>(
        "SELECT id, category, title, shops, created_at, updated_at \
         FROM catalog_products \
         WHERE category = $1 AND id = ANY($2)",
    )
    .bind(category)
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Inserts or replaces one catalog product keyed by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn upsert_catalog_product(pool: &PgPool, record: &CatalogRecord) -> Result<(), DbError> {
    let mut conn = pool.acquire().await?;
    upsert_one(&mut *conn, record).await
}

/// Upserts every record of a catalog file.
///
/// Returns the number of records written. All upserts run inside a single
/// transaction; if any operation fails the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn import_catalog(pool: &PgPool, records: &[CatalogRecord]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;

    for record in records {
        upsert_one(&mut *tx, record).await?;
    }

    tx.commit().await?;
    Ok(records.len())
}

/// Counts catalog rows per category, ordered by category key.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_catalog_products(pool: &PgPool) -> Result<Vec<(String, i64)>, DbError> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT category, COUNT(*) \
         FROM catalog_products \
         GROUP BY category \
         ORDER BY category",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

async fn upsert_one(conn: &mut sqlx::PgConnection, record: &CatalogRecord) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO catalog_products (id, category, title, shops) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (id) DO UPDATE SET \
             category = EXCLUDED.category, \
             title = EXCLUDED.title, \
             shops = EXCLUDED.shops, \
             updated_at = NOW()",
    )
    .bind(record.id)
    .bind(&record.category)
    .bind(&record.title)
    .bind(&record.shops)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

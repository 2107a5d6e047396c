use std::collections::BTreeMap;

use bestshop_core::{normalize_record, order_by_request, ParsedBag, Product};
use futures::future::try_join_all;
use sqlx::PgPool;

use crate::catalog::{fetch_catalog_products, CatalogProductRow};
use crate::DbError;

/// Fetches and normalizes the products of every category in `bag`.
///
/// One query per category, issued concurrently. Each category's products
/// follow the order the ids were first requested in; ids with no catalog row
/// are absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any category's query fails.
pub async fn load_bag_products(
    pool: &PgPool,
    bag: &ParsedBag,
) -> Result<BTreeMap<String, Vec<Product>>, DbError> {
    let fetches = bag.ids_by_category.iter().map(|(category, ids)| async move {
        let rows = fetch_catalog_products(pool, category, ids).await?;
        let records = rows
            .into_iter()
            .map(CatalogProductRow::into_record)
            .collect();
        let products = order_by_request(ids, records)
            .iter()
            .map(normalize_record)
            .collect::<Vec<_>>();
        Ok::<_, DbError>((category.clone(), products))
    });

    let loaded = try_join_all(fetches).await?;
    Ok(loaded.into_iter().collect())
}

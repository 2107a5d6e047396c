//! Catalog records and their normalization into rankable [`Product`]s.
//!
//! The catalog stores each product's shop listings as a free-form JSON object
//! keyed by shop identifier. This module turns that shape into typed
//! [`ShopOffer`]s and resolves shop identifiers that differ only by
//! separator (`pharma-shop` vs `pharma_shop`).

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::ConfigError;

/// Title used when a catalog record has none.
pub const UNKNOWN_TITLE: &str = "Unknown";

/// One shop's listing for one product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopOffer {
    /// Listed price. `None` when the shop shows no usable price.
    pub price: Option<Decimal>,
    pub available: bool,
    pub images: Vec<String>,
}

impl ShopOffer {
    #[must_use]
    pub fn first_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A bag item resolved against the catalog, ready for ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    /// Offers keyed by the shop identifier exactly as stored.
    pub offers: BTreeMap<String, ShopOffer>,
}

impl Product {
    /// Finds this product's offer at `shop`, trying the exact key before its
    /// separator variants.
    #[must_use]
    pub fn offer_for(&self, shop: &str) -> Option<&ShopOffer> {
        shop_key_variants(shop)
            .into_iter()
            .find_map(|key| self.offers.get(key.as_ref()))
    }
}

/// Keys under which `shop` may be stored, in lookup order: exact, then
/// hyphens as underscores, then underscores as hyphens.
#[must_use]
pub fn shop_key_variants(shop: &str) -> [Cow<'_, str>; 3] {
    [
        Cow::Borrowed(shop),
        Cow::Owned(shop.replace('-', "_")),
        Cow::Owned(shop.replace('_', "-")),
    ]
}

/// A product as held by the catalog store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: Uuid,
    pub category: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Shop key → raw offer object (`price`, `available`, `images`).
    #[serde(default)]
    pub shops: Value,
}

/// Converts a stored record into a [`Product`].
///
/// Never fails: offers that cannot be interpreted are dropped, and prices
/// that are negative or non-numeric become `None`.
#[must_use]
pub fn normalize_record(record: &CatalogRecord) -> Product {
    let title = record
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNKNOWN_TITLE)
        .to_owned();

    let offers = match &record.shops {
        Value::Object(shops) => shops
            .iter()
            .filter_map(|(shop, raw)| normalize_offer(raw).map(|offer| (shop.clone(), offer)))
            .collect(),
        _ => BTreeMap::new(),
    };

    Product {
        id: record.id.to_string(),
        title,
        offers,
    }
}

fn normalize_offer(raw: &Value) -> Option<ShopOffer> {
    let fields = raw.as_object().filter(|o| !o.is_empty())?;

    Some(ShopOffer {
        price: parse_price(fields.get("price")),
        available: parse_available(fields),
        images: fields
            .get("images")
            .and_then(Value::as_array)
            .map(|images| {
                images
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default(),
    })
}

// Listings without an explicit flag are treated as in stock. Scraped flags
// are not always booleans: zero, empty and null values mean out of stock.
fn parse_available(fields: &Map<String, Value>) -> bool {
    match fields.get("available") {
        None => true,
        Some(Value::Null) => false,
        Some(Value::Bool(available)) => *available,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n.abs() > 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(fields)) => !fields.is_empty(),
    }
}

fn parse_price(raw: Option<&Value>) -> Option<Decimal> {
    let price = match raw? {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }?;

    // abs() clears the sign of a negative zero such as "-0".
    (price >= Decimal::ZERO).then(|| price.abs())
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Returns `records` in the order their ids appear in `ids`.
///
/// Records whose id was not requested are dropped; each id yields at most one
/// record.
#[must_use]
pub fn order_by_request(ids: &[Uuid], records: Vec<CatalogRecord>) -> Vec<CatalogRecord> {
    let mut by_id: HashMap<Uuid, CatalogRecord> =
        records.into_iter().map(|r| (r.id, r)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

/// A catalog snapshot kept in a YAML or JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogFile {
    pub products: Vec<CatalogRecord>,
}

impl CatalogFile {
    /// Resolves `ids` within `category` the way the catalog store would:
    /// unknown ids are skipped and the result follows request order.
    #[must_use]
    pub fn products_for(&self, category: &str, ids: &[Uuid]) -> Vec<Product> {
        let wanted: HashSet<&Uuid> = ids.iter().collect();
        let matching = self
            .products
            .iter()
            .filter(|r| r.category == category && wanted.contains(&r.id))
            .cloned()
            .collect();

        order_by_request(ids, matching)
            .iter()
            .map(normalize_record)
            .collect()
    }
}

/// Load a catalog file. JSON is accepted as well since it parses as YAML.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed, or if a
/// product id appears twice.
pub fn load_catalog_file(path: &Path) -> Result<CatalogFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: CatalogFile =
        serde_yaml::from_str(&content).map_err(ConfigError::CatalogFileParse)?;

    let mut seen = HashSet::new();
    for record in &file.products {
        if record.category.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "catalog product {} has an empty category",
                record.id
            )));
        }
        if !seen.insert(record.id) {
            return Err(ConfigError::Validation(format!(
                "duplicate catalog product id: {}",
                record.id
            )));
        }
    }

    Ok(file)
}

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::categories::CategoriesFile;

/// One entry of the caller's bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BagLineItem {
    /// Catalog object id. Older clients send it as `sku`.
    #[serde(alias = "sku")]
    pub id: String,
    /// Configured category key. Older clients send it as `source`.
    #[serde(alias = "source")]
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BagRequest {
    #[serde(default)]
    pub items: Vec<BagLineItem>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BagError {
    #[error("No items provided")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MalformedId,
    UnknownCategory,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MalformedId => write!(f, "malformed_id"),
            SkipReason::UnknownCategory => write!(f, "unknown_category"),
        }
    }
}

/// A line item left out of the evaluation. Skips are not errors: the rest of
/// the bag is still evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub id: String,
    pub category: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedBag {
    /// Category key → distinct catalog ids in first-seen order.
    pub ids_by_category: BTreeMap<String, Vec<Uuid>>,
    pub skipped: Vec<SkippedItem>,
}

impl ParsedBag {
    #[must_use]
    pub fn ids_for(&self, category: &str) -> &[Uuid] {
        self.ids_by_category
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of distinct ids that survived parsing, across all categories.
    #[must_use]
    pub fn resolved_len(&self) -> usize {
        self.ids_by_category.values().map(Vec::len).sum()
    }
}

/// Splits bag line items by category and parses their catalog ids.
///
/// Malformed ids and unconfigured categories are recorded in
/// [`ParsedBag::skipped`] rather than failing the bag.
///
/// # Errors
///
/// Returns [`BagError::Empty`] when `items` is empty.
pub fn parse_bag(
    items: &[BagLineItem],
    categories: &CategoriesFile,
) -> Result<ParsedBag, BagError> {
    if items.is_empty() {
        return Err(BagError::Empty);
    }

    let mut parsed = ParsedBag::default();
    let mut seen: HashSet<(&str, Uuid)> = HashSet::new();

    for item in items {
        let skip = |reason| SkippedItem {
            id: item.id.clone(),
            category: item.category.clone(),
            reason,
        };

        let Ok(id) = Uuid::parse_str(item.id.trim()) else {
            parsed.skipped.push(skip(SkipReason::MalformedId));
            continue;
        };

        let Some(category) = categories.get(&item.category) else {
            parsed.skipped.push(skip(SkipReason::UnknownCategory));
            continue;
        };

        if seen.insert((category.key.as_str(), id)) {
            parsed
                .ids_by_category
                .entry(category.key.clone())
                .or_default()
                .push(id);
        }
    }

    Ok(parsed)
}

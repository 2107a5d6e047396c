use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalog::Product;
use crate::categories::{CategoriesFile, CategoryConfig};
use crate::ranking::{rank_shops, ShopTotal};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSummary {
    pub id: String,
    pub title: String,
}

/// Ranking outcome for one category of a bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryResult {
    pub category: String,
    pub category_label: String,
    pub best_shop: Option<String>,
    pub best_total: Option<Decimal>,
    pub shop_totals: Vec<ShopTotal>,
    pub products: Vec<ProductSummary>,
}

/// Results for every configured category that had at least one product, in
/// configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BagEvaluation {
    pub results: Vec<CategoryResult>,
}

impl BagEvaluation {
    #[must_use]
    pub fn result_for(&self, category: &str) -> Option<&CategoryResult> {
        self.results.iter().find(|r| r.category == category)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Ranks one category's products against its configured shops.
///
/// Returns `None` when `products` is empty: a category the bag did not touch
/// has no result at all, not an empty one.
#[must_use]
pub fn evaluate_category(category: &CategoryConfig, products: &[Product]) -> Option<CategoryResult> {
    if products.is_empty() {
        return None;
    }

    let ranking = rank_shops(products, category.shops.as_slice());
    let (best_shop, best_total) = ranking
        .best
        .map_or((None, None), |best| (Some(best.shop), Some(best.total)));

    Some(CategoryResult {
        category: category.key.clone(),
        category_label: category.label.clone(),
        best_shop,
        best_total,
        shop_totals: ranking.shop_totals,
        products: products
            .iter()
            .map(|p| ProductSummary {
                id: p.id.clone(),
                title: p.title.clone(),
            })
            .collect(),
    })
}

/// Evaluates every configured category independently.
///
/// `products_by_category` is keyed by category key; keys that are not
/// configured are ignored.
#[must_use]
pub fn evaluate_bag(
    categories: &CategoriesFile,
    products_by_category: &BTreeMap<String, Vec<Product>>,
) -> BagEvaluation {
    let results = categories
        .iter()
        .filter_map(|category| {
            let products = products_by_category
                .get(&category.key)
                .map(Vec::as_slice)
                .unwrap_or_default();
            evaluate_category(category, products)
        })
        .collect();

    BagEvaluation { results }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rust_decimal::Decimal;

    use super::*;
    use crate::catalog::ShopOffer;
    use crate::categories::parse_categories;

    fn categories() -> CategoriesFile {
        parse_categories(
            r"
categories:
  - key: para
    label: Parapharmacie
    shops: [parashop, pharma-shop, parafendri]
  - key: retail
    label: Électronique
    shops: [mytek, tunisianet, spacenet]
",
        )
        .expect("test categories")
    }

    fn product(id: &str, shop: &str, price: i64) -> Product {
        Product {
            id: id.to_string(),
            title: format!("Item {id}"),
            offers: BTreeMap::from([(
                shop.to_string(),
                ShopOffer {
                    price: Some(Decimal::from(price)),
                    available: true,
                    images: vec![],
                },
            )]),
        }
    }

    #[test]
    fn empty_category_has_no_result() {
        let cats = categories();
        let para = cats.get("para").unwrap();
        assert!(evaluate_category(para, &[]).is_none());
    }

    #[test]
    fn category_result_carries_label_and_products() {
        let cats = categories();
        let para = cats.get("para").unwrap();
        let result = evaluate_category(para, &[product("a", "pharma_shop", 12)]).unwrap();

        assert_eq!(result.category, "para");
        assert_eq!(result.category_label, "Parapharmacie");
        assert_eq!(result.best_shop.as_deref(), Some("pharma-shop"));
        assert_eq!(result.best_total.map(|t| t.to_string()).as_deref(), Some("12.000"));
        assert_eq!(
            result.products,
            vec![ProductSummary {
                id: "a".to_string(),
                title: "Item a".to_string(),
            }]
        );
    }

    #[test]
    fn category_with_no_stocking_shop_has_result_without_best() {
        let cats = categories();
        let retail = cats.get("retail").unwrap();
        let result = evaluate_category(retail, &[product("z", "amazon", 10)]).unwrap();
        assert!(result.shop_totals.is_empty());
        assert!(result.best_shop.is_none());
        assert!(result.best_total.is_none());
        assert_eq!(result.products.len(), 1);
    }

    #[test]
    fn bag_keeps_configuration_order_and_skips_empty_categories() {
        let mut products = BTreeMap::new();
        products.insert("retail".to_string(), vec![product("r", "mytek", 300)]);
        products.insert("para".to_string(), vec![]);
        products.insert("grocery".to_string(), vec![product("g", "mytek", 1)]);

        let evaluation = evaluate_bag(&categories(), &products);
        let keys: Vec<&str> = evaluation
            .results
            .iter()
            .map(|r| r.category.as_str())
            .collect();
        assert_eq!(keys, vec!["retail"]);
        assert!(evaluation.result_for("para").is_none());
        assert!(evaluation.result_for("grocery").is_none());
    }

    #[test]
    fn both_categories_are_evaluated_independently() {
        let mut products = BTreeMap::new();
        products.insert("para".to_string(), vec![product("p", "parafendri", 20)]);
        products.insert("retail".to_string(), vec![product("r", "spacenet", 999)]);

        let evaluation = evaluate_bag(&categories(), &products);
        assert_eq!(
            evaluation.result_for("para").and_then(|r| r.best_shop.as_deref()),
            Some("parafendri")
        );
        assert_eq!(
            evaluation.result_for("retail").and_then(|r| r.best_shop.as_deref()),
            Some("spacenet")
        );
    }

    #[test]
    fn empty_bag_evaluation_is_empty() {
        let evaluation = evaluate_bag(&categories(), &BTreeMap::new());
        assert!(evaluation.is_empty());
        let json = serde_json::to_value(&evaluation).unwrap();
        assert_eq!(json, serde_json::json!({ "results": [] }));
    }

    #[test]
    fn category_result_serializes_expected_fields() {
        let cats = categories();
        let result = evaluate_category(cats.get("retail").unwrap(), &[product("r", "mytek", 5)])
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["category_label"], "Électronique");
        assert_eq!(json["best_shop"], "mytek");
        assert_eq!(json["best_total"], "5.000");
        assert_eq!(json["shop_totals"][0]["shop"], "mytek");
        assert_eq!(json["products"][0]["title"], "Item r");
    }
}

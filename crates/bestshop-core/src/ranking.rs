//! Shop ranking for one category of a bag.
//!
//! Every candidate shop is priced against the whole product list. Shops that
//! can fulfil none of the products are dropped; the rest are ordered by how
//! many products they are missing, then by total. Coverage always beats
//! price.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::catalog::Product;

/// Fractional digits carried by every shop total.
pub const TOTAL_SCALE: u32 = 3;

/// How one product presents at one shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductInShop {
    pub id: String,
    pub title: String,
    pub image: Option<String>,
    pub price: Option<Decimal>,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopTotal {
    pub shop: String,
    /// Sum of the available products' prices, rounded to [`TOTAL_SCALE`].
    pub total: Decimal,
    /// One entry per input product, in input order.
    pub products: Vec<ProductInShop>,
    pub available_count: usize,
    pub missing_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BestShop {
    pub shop: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShopRanking {
    /// Sorted by `(missing_count, total)`; ties keep candidate order.
    pub shop_totals: Vec<ShopTotal>,
    pub best: Option<BestShop>,
}

/// Ranks `shops` for `products` and picks the best one.
///
/// The best shop is the cheapest shop carrying every product. When no shop
/// carries everything it falls back to the top of the ranking, i.e. the
/// widest coverage at the lowest total.
pub fn rank_shops<S: AsRef<str>>(products: &[Product], shops: &[S]) -> ShopRanking {
    let mut shop_totals: Vec<ShopTotal> = shops
        .iter()
        .filter_map(|shop| total_for_shop(products, shop.as_ref()))
        .collect();

    // Stable: equal keys stay in candidate order.
    shop_totals.sort_by(|a, b| {
        a.missing_count
            .cmp(&b.missing_count)
            .then_with(|| a.total.cmp(&b.total))
    });

    let best = shop_totals
        .iter()
        .find(|t| t.missing_count == 0)
        .or_else(|| shop_totals.first())
        .map(|t| BestShop {
            shop: t.shop.clone(),
            total: t.total,
        });

    ShopRanking { shop_totals, best }
}

fn total_for_shop(products: &[Product], shop: &str) -> Option<ShopTotal> {
    let mut total = Decimal::ZERO;
    let mut available_count = 0usize;
    let mut missing_count = 0usize;
    let mut entries = Vec::with_capacity(products.len());

    for product in products {
        let priced = product
            .offer_for(shop)
            .and_then(|offer| offer.price.map(|price| (offer, price)));

        let Some((offer, price)) = priced else {
            missing_count += 1;
            entries.push(ProductInShop {
                id: product.id.clone(),
                title: product.title.clone(),
                image: None,
                price: None,
                available: false,
            });
            continue;
        };

        if offer.available {
            total = total.checked_add(price).unwrap_or(Decimal::MAX);
            available_count += 1;
        } else {
            missing_count += 1;
        }

        entries.push(ProductInShop {
            id: product.id.clone(),
            title: product.title.clone(),
            image: offer.first_image().map(str::to_owned),
            price: Some(price),
            available: offer.available,
        });
    }

    if available_count == 0 {
        return None;
    }

    Some(ShopTotal {
        shop: shop.to_owned(),
        total: round_total(total),
        products: entries,
        available_count,
        missing_count,
    })
}

/// Rounds half-to-even to [`TOTAL_SCALE`] digits and pads to exactly that
/// scale, so `8` renders as `8.000`.
#[must_use]
pub fn round_total(total: Decimal) -> Decimal {
    let mut rounded =
        total.round_dp_with_strategy(TOTAL_SCALE, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(TOTAL_SCALE);
    rounded
}

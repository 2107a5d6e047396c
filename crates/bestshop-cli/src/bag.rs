//! Bag evaluation from the command line.
//!
//! Products come either from a catalog file, which needs no database, or
//! from the catalog store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use bestshop_core::{
    evaluate_bag, parse_bag, BagEvaluation, BagRequest, CatalogFile, CategoriesFile, ParsedBag,
    Product,
};
use clap::Subcommand;

/// Sub-commands available under `bag`.
#[derive(Debug, Subcommand)]
pub enum BagCommands {
    /// Rank shops for every category of a bag file
    Evaluate {
        /// Bag file (`items: [{id, category}]`, YAML or JSON)
        bag_path: PathBuf,
        /// Resolve products from this catalog file instead of the database
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Print the evaluation as JSON
        #[arg(long)]
        json: bool,
    },
}

pub(crate) enum ProductSource {
    File(CatalogFile),
    Database(sqlx::PgPool),
}

impl ProductSource {
    async fn load(&self, bag: &ParsedBag) -> anyhow::Result<BTreeMap<String, Vec<Product>>> {
        match self {
            Self::File(catalog) => Ok(bag
                .ids_by_category
                .iter()
                .map(|(category, ids)| (category.clone(), catalog.products_for(category, ids)))
                .collect()),
            Self::Database(pool) => Ok(bestshop_db::load_bag_products(pool, bag).await?),
        }
    }
}

/// Evaluate a bag file and print the result.
///
/// # Errors
///
/// Returns an error if the bag file cannot be read or parsed, the bag is
/// empty, or products cannot be loaded.
pub(crate) async fn run_bag_evaluate(
    categories: &CategoriesFile,
    source: &ProductSource,
    bag_path: &Path,
    json: bool,
) -> anyhow::Result<()> {
    let request = load_bag_file(bag_path)?;
    let parsed = parse_bag(&request.items, categories)?;
    for skipped in &parsed.skipped {
        tracing::warn!(
            item_id = %skipped.id,
            category = %skipped.category,
            reason = %skipped.reason,
            "skipping bag item"
        );
    }

    let products = source.load(&parsed).await?;
    let evaluation = evaluate_bag(categories, &products);

    if json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
    } else {
        print!("{}", render_evaluation(&evaluation));
    }

    Ok(())
}

pub(crate) fn load_bag_file(path: &Path) -> anyhow::Result<BagRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bag file {}", path.display()))?;
    let request = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse bag file {}", path.display()))?;
    Ok(request)
}

/// Plain-text report: one block per category, shops in ranking order.
pub(crate) fn render_evaluation(evaluation: &BagEvaluation) -> String {
    if evaluation.is_empty() {
        return "no products found for this bag\n".to_string();
    }

    let mut out = String::new();
    for result in &evaluation.results {
        let best = match (&result.best_shop, &result.best_total) {
            (Some(shop), Some(total)) => format!("best shop {shop} at {total}"),
            _ => "no shop stocks these products".to_string(),
        };
        out.push_str(&format!(
            "{} ({}): {} product(s), {best}\n",
            result.category,
            result.category_label,
            result.products.len()
        ));

        if result.shop_totals.is_empty() {
            out.push('\n');
            continue;
        }

        out.push_str(&format!(
            "  {:<16}{:>12}  {:<10}MISSING\n",
            "SHOP", "TOTAL", "AVAILABLE"
        ));
        for total in &result.shop_totals {
            out.push_str(&format!(
                "  {:<16}{:>12}  {:<10}{}\n",
                total.shop,
                total.total.to_string(),
                total.available_count,
                total.missing_count
            ));
        }
        out.push('\n');
    }
    out
}

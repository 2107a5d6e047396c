use std::path::{Path, PathBuf};

use clap::Subcommand;

/// Sub-commands available under `catalog`.
#[derive(Debug, Subcommand)]
pub enum CatalogCommands {
    /// Upsert every product of a YAML or JSON catalog file
    Import {
        /// Catalog file (`products: [{id, category, title, shops}]`)
        path: PathBuf,
    },
}

/// Load a catalog file and upsert it in one transaction, then print the
/// per-category row counts.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or any database operation
/// fails.
pub(crate) async fn run_catalog_import(pool: &sqlx::PgPool, path: &Path) -> anyhow::Result<()> {
    let catalog = bestshop_core::load_catalog_file(path)?;
    let written = bestshop_db::import_catalog(pool, &catalog.products).await?;
    tracing::info!(path = %path.display(), written, "catalog imported");
    println!("imported {written} product(s) from {}", path.display());

    let counts = bestshop_db::count_catalog_products(pool).await?;
    println!("{:<12}PRODUCTS", "CATEGORY");
    for (category, count) in &counts {
        println!("{category:<12}{count}");
    }

    Ok(())
}

mod bag;
mod catalog;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::{bag::BagCommands, catalog::CatalogCommands};

#[derive(Debug, Parser)]
#[command(name = "bestshop-cli")]
#[command(about = "Best-shop bag evaluation command line interface")]
struct Cli {
    /// Category configuration file
    #[arg(
        long,
        global = true,
        env = "BESTSHOP_CATEGORIES_PATH",
        default_value = "./config/categories.yaml"
    )]
    categories: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Catalog store management
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    /// Evaluate bags against the catalog
    Bag {
        #[command(subcommand)]
        command: BagCommands,
    },
    /// Print configured categories and their shops
    Categories,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Db { command }) => {
            let pool = connect().await?;
            match command {
                DbCommands::Ping => {
                    bestshop_db::health_check(&pool).await?;
                    println!("database ok");
                }
                DbCommands::Migrate => {
                    let applied = bestshop_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
            }
        }
        Some(Commands::Catalog {
            command: CatalogCommands::Import { path },
        }) => {
            let pool = connect().await?;
            catalog::run_catalog_import(&pool, &path).await?;
        }
        Some(Commands::Bag {
            command:
                BagCommands::Evaluate {
                    bag_path,
                    catalog,
                    json,
                },
        }) => {
            let categories = bestshop_core::load_categories(&cli.categories)?;
            let source = match catalog {
                Some(path) => bag::ProductSource::File(bestshop_core::load_catalog_file(&path)?),
                None => bag::ProductSource::Database(connect().await?),
            };
            bag::run_bag_evaluate(&categories, &source, &bag_path, json).await?;
        }
        Some(Commands::Categories) => {
            let categories = bestshop_core::load_categories(&cli.categories)?;
            print!("{}", render_categories(&categories));
        }
        None => println!("bestshop-cli: run with --help to list commands"),
    }

    Ok(())
}

/// Connects with the full application config; only commands that touch the
/// database require `DATABASE_URL`.
async fn connect() -> anyhow::Result<sqlx::PgPool> {
    let config = bestshop_core::load_app_config()?;
    let pool_config = bestshop_db::PoolConfig::from_app_config(&config);
    let pool = bestshop_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}

fn render_categories(categories: &bestshop_core::CategoriesFile) -> String {
    let mut out = format!("{:<12}{:<20}SHOPS\n", "KEY", "LABEL");
    for category in categories.iter() {
        out.push_str(&format!(
            "{:<12}{:<20}{}\n",
            category.key,
            category.label,
            category.shops.join(", ")
        ));
    }
    out
}

pub mod app_config;
pub mod bag;
pub mod catalog;
pub mod categories;
pub mod config;
pub mod evaluation;
pub mod ranking;

pub use app_config::{AppConfig, Environment};
pub use bag::{parse_bag, BagError, BagLineItem, BagRequest, ParsedBag, SkipReason, SkippedItem};
pub use catalog::{
    load_catalog_file, normalize_record, order_by_request, shop_key_variants, CatalogFile,
    CatalogRecord, Product, ShopOffer, UNKNOWN_TITLE,
};
pub use categories::{load_categories, parse_categories, CategoriesFile, CategoryConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use evaluation::{
    evaluate_bag, evaluate_category, BagEvaluation, CategoryResult, ProductSummary,
};
pub use ranking::{rank_shops, round_total, BestShop, ProductInShop, ShopRanking, ShopTotal};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read categories file {path}: {source}")]
    CategoriesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse categories file: {0}")]
    CategoriesFileParse(#[source] serde_yaml::Error),

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[source] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

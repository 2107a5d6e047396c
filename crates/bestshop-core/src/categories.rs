use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One catalog partition and the shops it is priced against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Key used by bag line items, e.g. `"para"`.
    pub key: String,
    /// Human-readable name shown next to results, e.g. `"Parapharmacie"`.
    pub label: String,
    /// Candidate shops in priority order. Ranking ties keep this order.
    pub shops: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoriesFile {
    pub categories: Vec<CategoryConfig>,
}

impl CategoriesFile {
    /// Looks up a category by its exact key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CategoryConfig> {
        self.categories.iter().find(|c| c.key == key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CategoryConfig> {
        self.categories.iter()
    }
}

/// Load and validate the category configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_categories(path: &Path) -> Result<CategoriesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CategoriesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_categories(&content)
}

/// Parse and validate category configuration from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_categories(content: &str) -> Result<CategoriesFile, ConfigError> {
    let file: CategoriesFile =
        serde_yaml::from_str(content).map_err(ConfigError::CategoriesFileParse)?;

    validate_categories(&file)?;

    Ok(file)
}

fn validate_categories(file: &CategoriesFile) -> Result<(), ConfigError> {
    if file.categories.is_empty() {
        return Err(ConfigError::Validation(
            "at least one category must be configured".to_string(),
        ));
    }

    let mut seen_keys = HashSet::new();

    for category in &file.categories {
        if category.key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category key must be non-empty".to_string(),
            ));
        }

        if category.label.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "category '{}' has an empty label",
                category.key
            )));
        }

        if !seen_keys.insert(category.key.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category key: '{}'",
                category.key
            )));
        }

        if category.shops.is_empty() {
            return Err(ConfigError::Validation(format!(
                "category '{}' lists no shops",
                category.key
            )));
        }

        let mut seen_shops = HashSet::new();
        for shop in &category.shops {
            if shop.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "category '{}' has an empty shop identifier",
                    category.key
                )));
            }
            if !seen_shops.insert(shop.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "category '{}' lists shop '{shop}' more than once",
                    category.key
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &str = r"
categories:
  - key: para
    label: Parapharmacie
    shops: [parashop, pharma-shop, parafendri]
  - key: retail
    label: Électronique
    shops: [mytek, tunisianet, spacenet]
";

    #[test]
    fn parses_reference_deployment() {
        let file = parse_categories(REFERENCE).expect("reference config should parse");
        assert_eq!(file.categories.len(), 2);

        let para = file.get("para").expect("para category");
        assert_eq!(para.label, "Parapharmacie");
        assert_eq!(para.shops, vec!["parashop", "pharma-shop", "parafendri"]);

        let retail = file.get("retail").expect("retail category");
        assert_eq!(retail.label, "Électronique");
        assert_eq!(retail.shops, vec!["mytek", "tunisianet", "spacenet"]);
    }

    #[test]
    fn get_is_exact_match() {
        let file = parse_categories(REFERENCE).unwrap();
        assert!(file.get("PARA").is_none());
        assert!(file.get("electronics").is_none());
    }

    #[test]
    fn iteration_keeps_file_order() {
        let file = parse_categories(REFERENCE).unwrap();
        let keys: Vec<&str> = file.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["para", "retail"]);
    }

    #[test]
    fn rejects_empty_category_list() {
        let err = parse_categories("categories: []").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_duplicate_keys_case_insensitively() {
        let yaml = r"
categories:
  - key: para
    label: A
    shops: [one]
  - key: Para
    label: B
    shops: [two]
";
        let err = parse_categories(yaml).unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(ref msg) if msg.contains("duplicate category key")),
            "got: {err:?}"
        );
    }

    #[test]
    fn rejects_category_without_shops() {
        let yaml = r"
categories:
  - key: para
    label: Parapharmacie
    shops: []
";
        let err = parse_categories(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("no shops")));
    }

    #[test]
    fn rejects_repeated_shop() {
        let yaml = r"
categories:
  - key: retail
    label: Électronique
    shops: [mytek, mytek]
";
        let err = parse_categories(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("more than once")));
    }

    #[test]
    fn rejects_blank_label() {
        let yaml = r"
categories:
  - key: retail
    label: '  '
    shops: [mytek]
";
        let err = parse_categories(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("empty label")));
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let err = parse_categories("categories: {not: [a list").unwrap_err();
        assert!(matches!(err, ConfigError::CategoriesFileParse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_categories(Path::new("/nonexistent/bestshop/categories.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::CategoriesFileIo { .. }));
    }
}

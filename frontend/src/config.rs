//! Listing settings read from the environment.

use std::{collections::BTreeMap, env, fmt::Display, fs::read_to_string, path::{Path, PathBuf}, str::FromStr, time::Duration};

use common::{
    facet_catalog::FilterCatalog,
    listing_schema::ListingSchema,
    search_const::{PAGE_SIZE, SEARCH_DEBOUNCE_MS},
};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ListingConfig {
    pub debounce: Duration,
    pub page_size: u64,
    /// JSON file mapping listing name -> facet catalog, replacing the built-in
    /// catalogs of the listings it names.
    pub catalog_path: Option<PathBuf>,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(SEARCH_DEBOUNCE_MS),
            page_size: PAGE_SIZE,
            catalog_path: None,
        }
    }
}

impl ListingConfig {
    pub fn load() -> Self {
        Self {
            debounce: Duration::from_millis(try_load("DIRECTORY_DEBOUNCE_MS", SEARCH_DEBOUNCE_MS)),
            page_size: try_load("DIRECTORY_PAGE_SIZE", PAGE_SIZE).max(1),
            catalog_path: env::var("DIRECTORY_CATALOG_PATH").ok().map(PathBuf::from),
        }
    }

    /// The schema with this config's page size and, if the catalog file has
    /// an entry for it, that catalog. A broken catalog file keeps the
    /// built-in catalog.
    pub fn apply(&self, schema: ListingSchema) -> ListingSchema {
        let mut schema = schema.with_page_size(self.page_size);
        let Some(path) = &self.catalog_path else { return schema };
        match load_catalogs(path) {
            Ok(mut catalogs) => {
                if let Some(catalog) = catalogs.remove(&schema.name) {
                    info!("{}: using facet catalog from {}", schema.name, path.display());
                    schema = schema.with_catalog(catalog);
                }
            }
            Err(e) => warn!("Failed to read facet catalogs from {}: {e:#}", path.display()),
        }
        schema
    }
}

pub fn load_catalogs(path: &Path) -> anyhow::Result<BTreeMap<String, FilterCatalog>> {
    let text = read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn try_load<T: FromStr + Display>(key: &str, default: T) -> T
where
    T::Err: Display,
{
    match env::var(key) {
        Ok(value) => value.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {value:?}: {e}, using default: {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use common::listing_schema::{automation_directory, job_board};

    use super::*;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("listing-config-{}-{name}.json", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn catalog_file_replaces_named_listing_only() {
        let path = write_temp(
            "named",
            r#"{
                "automation_directory": {
                    "facets": [{"name": "function", "display_name": "Function", "field": "functions", "values": ["Sales", "CS"]}],
                    "aliases": {"CS": ["Customer Success", "Client Success"]}
                }
            }"#,
        );
        let config = ListingConfig { catalog_path: Some(path.clone()), ..ListingConfig::default() };

        let automations = config.apply(automation_directory());
        assert_eq!(automations.catalog.values("function"), ["Sales".to_string(), "CS".to_string()]);
        let expanded = automations.catalog.expand(&BTreeSet::from(["CS".to_string()]));
        assert_eq!(expanded.len(), 3);

        let jobs = config.apply(job_board());
        assert_eq!(jobs.catalog, job_board().catalog);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn broken_catalog_file_keeps_builtin() {
        let path = write_temp("broken", "{ not json");
        let config = ListingConfig { catalog_path: Some(path.clone()), page_size: 10, ..ListingConfig::default() };
        let schema = config.apply(automation_directory());
        assert_eq!(schema.catalog, automation_directory().catalog);
        assert_eq!(schema.page_size, 10);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_catalog_file_is_an_error() {
        assert!(load_catalogs(Path::new("/nonexistent/catalogs.json")).is_err());
    }
}

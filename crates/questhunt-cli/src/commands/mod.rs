pub mod completions;
pub mod config;
pub mod distance;
pub mod guide;
pub mod quests;
pub mod tiers;

use std::path::Path;

use questhunt_core::{CatalogError, Config, QuestCatalog};

/// The configured catalog, or the built-in one.
pub fn load_catalog(config: &Config) -> Result<QuestCatalog, CatalogError> {
    QuestCatalog::load_or_builtin(config.catalog_path.as_deref().map(Path::new))
}

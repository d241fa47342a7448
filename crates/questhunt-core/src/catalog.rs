//! Quest catalog.
//!
//! The built-in catalog is compiled in. A custom one can be loaded from a
//! TOML file of `[[quests]]` tables:
//!
//! ```toml
//! [[quests]]
//! id = 1
//! name = "Château Mystérieux"
//! place = "Château de Chambord"
//! latitude = 47.6161
//! longitude = 1.5162
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CoreError};
use crate::geo::Coordinate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestTarget {
    pub id: u32,
    pub name: String,
    pub place: String,
    #[serde(flatten)]
    pub location: Coordinate,
}

impl QuestTarget {
    fn new(id: u32, name: &str, place: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            name: name.into(),
            place: place.into(),
            location: Coordinate::new(latitude, longitude),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestCatalog {
    quests: Vec<QuestTarget>,
}

impl QuestCatalog {
    /// Build a catalog, checking ids are unique and locations valid.
    pub fn new(quests: Vec<QuestTarget>) -> Result<Self, CatalogError> {
        if quests.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for quest in &quests {
            if !seen.insert(quest.id) {
                return Err(CatalogError::DuplicateId(quest.id));
            }
            quest
                .location
                .validate()
                .map_err(|source| CatalogError::InvalidLocation {
                    id: quest.id,
                    source,
                })?;
        }
        Ok(Self { quests })
    }

    /// The catalog shipped with the game.
    pub fn builtin() -> Self {
        Self {
            quests: vec![
                QuestTarget::new(1, "Château Mystérieux", "Château de Chambord", 47.6161, 1.5162),
                QuestTarget::new(2, "Forêt Enchantée", "Forêt de Brocéliande", 48.0182, -2.1833),
                QuestTarget::new(3, "Montagne Sacrée", "Mont Saint-Michel", 48.6361, -1.5115),
                QuestTarget::new(4, "Parc Barbieux", "Parc Barbieux, Croix", 50.6786, 3.1517),
                QuestTarget::new(
                    5,
                    "Église Saint-Martin",
                    "Église Saint-Martin, Croix",
                    50.6781,
                    3.1462,
                ),
                QuestTarget::new(
                    6,
                    "Mairie de Croix",
                    "Mairie de Croix, Place des Martyrs",
                    50.6789,
                    3.1468,
                ),
                QuestTarget::new(7, "Villa Cavrois", "Villa Cavrois, Croix", 50.6842, 3.1436),
                QuestTarget::new(
                    8,
                    "Gare de Croix-Wasquehal",
                    "Gare de Croix-Wasquehal",
                    50.6783,
                    3.1525,
                ),
                QuestTarget::new(
                    9,
                    "25 rue isaac Holden",
                    "25 rue isaac Holden, Croix",
                    50.6717,
                    3.1491,
                ),
                QuestTarget::new(
                    10,
                    "passage pieton metro",
                    "passage pieton metro, Croix",
                    50.6740,
                    3.1468,
                ),
            ],
        }
    }

    /// Load a TOML catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// quests fail validation.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let raw: QuestCatalog = toml::from_str(&content).map_err(|e| CatalogError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::new(raw.quests)
    }

    /// Load `path` when given, otherwise use the built-in catalog.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn quests(&self) -> &[QuestTarget] {
        &self.quests
    }

    pub fn get(&self, id: u32) -> Option<&QuestTarget> {
        self.quests.iter().find(|q| q.id == id)
    }

    /// Like [`get`](Self::get) but reports a missing quest as an error.
    pub fn find(&self, id: u32) -> Result<&QuestTarget, CoreError> {
        self.get(id).ok_or(CoreError::TargetNotFound { id })
    }
}

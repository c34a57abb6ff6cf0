use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::{chess, storm, ItemTable};
use crate::error::{GenerationError, GenerationResult};
use crate::locations::MAX_REPUTATION_PER_BIOME;
use crate::pool::AllocationOptions;
use crate::production::{ShuffleMode, DEFAULT_MAX_SHUFFLE_ATTEMPTS};

fn default_player() -> u32 {
    1
}

fn default_starter_buildings() -> Vec<String> {
    vec!["Crude Workstation".to_string()]
}

fn default_max_shuffle_attempts() -> u32 {
    DEFAULT_MAX_SHUFFLE_ATTEMPTS
}

fn default_species() -> Vec<String> {
    storm::SPECIES.iter().map(|s| s.to_string()).collect()
}

fn default_species_combinations() -> usize {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Built-in item catalogs a scenario can allocate from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemTablePreset {
    #[default]
    Storm,
    Chess,
}

impl ItemTablePreset {
    pub fn table(self) -> ItemTable {
        match self {
            ItemTablePreset::Storm => storm::item_table(),
            ItemTablePreset::Chess => chess::item_table(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub seed: u64,
    #[serde(default = "default_player")]
    pub player: u32,
    #[serde(default)]
    pub recipe_shuffle: ShuffleMode,
    #[serde(default = "default_starter_buildings")]
    pub starter_buildings: Vec<String>,
    #[serde(default = "default_max_shuffle_attempts")]
    pub max_shuffle_attempts: u32,
    #[serde(default)]
    pub blueprint_items: bool,
    #[serde(default)]
    pub reputation_locations_per_biome: u32,
    /// Fixed location count; replaces the reputation plan when set.
    #[serde(default)]
    pub location_count: Option<usize>,
    #[serde(default)]
    pub item_table: ItemTablePreset,
    #[serde(default)]
    pub allocation: AllocationOptions,
    #[serde(default = "default_species")]
    pub species: Vec<String>,
    #[serde(default = "default_species_combinations")]
    pub species_combinations: usize,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Scenario {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Failed to parse scenario YAML")
    }

    /// Allocation options with the scenario-wide switches folded in.
    pub fn allocation_options(&self) -> AllocationOptions {
        AllocationOptions {
            blueprint_items: self.blueprint_items,
            ..self.allocation.clone()
        }
    }

    pub fn validate(&self) -> GenerationResult<()> {
        if self.name.trim().is_empty() {
            return Err(invalid("name", "scenario name must not be empty"));
        }
        if self.max_shuffle_attempts == 0 {
            return Err(invalid("max_shuffle_attempts", "must be at least 1"));
        }
        if self.reputation_locations_per_biome > MAX_REPUTATION_PER_BIOME {
            return Err(invalid(
                "reputation_locations_per_biome",
                format!(
                    "{} is above the maximum of {MAX_REPUTATION_PER_BIOME}",
                    self.reputation_locations_per_biome
                ),
            ));
        }
        if self.allocation.early_material > 5 {
            return Err(invalid("early_material", "must be between 0 and 5"));
        }
        if let Some(window) = self.allocation.material {
            if window.min_material > window.max_material {
                return Err(invalid(
                    "material",
                    format!(
                        "min_material {} is above max_material {}",
                        window.min_material, window.max_material
                    ),
                ));
            }
        }
        let distinct: BTreeSet<&str> = self.species.iter().map(String::as_str).collect();
        if distinct.len() != self.species.len() {
            return Err(invalid("species", "species names must be distinct"));
        }
        Ok(())
    }
}

fn invalid(option: &'static str, reason: impl Into<String>) -> GenerationError {
    GenerationError::InvalidOption {
        option,
        reason: reason.into(),
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}

use crate::error::EcosystemError;
use crate::organisms::components::Species;
use crate::organisms::species::SpeciesTable;
use crate::world::FoodTemplate;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Ecosystem tuning parameters - one place to adjust balance.
///
/// Every field has a default, so a JSON file only needs to list what it changes.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcosystemTuning {
    // Initial population
    pub initial_rabbits: usize,
    pub initial_wolves: usize,
    pub initial_deer: usize,
    pub initial_food: usize,
    /// Side of the square the bootstrap scatters entities over
    pub ecosystem_size: f32,
    /// Seed for serial bootstrap and balancing draws
    pub world_seed: u64,

    /// Fixed seconds per tick; `None` follows the frame clock
    pub fixed_delta: Option<f32>,

    // Balancing
    /// Desired share of the animal population per species
    pub target_ratios: BTreeMap<Species, f32>,
    pub auto_balance: bool,
    /// Seconds between auto-balance passes
    pub auto_balance_interval: f32,

    // Logging cadence, in ticks
    pub stats_log_interval: u64,
    pub tracked_log_interval: u64,

    pub food: FoodTemplate,
    pub species: SpeciesTable,
}

impl Default for EcosystemTuning {
    fn default() -> Self {
        Self {
            initial_rabbits: 50,
            initial_wolves: 8,
            initial_deer: 30,
            initial_food: 200,
            ecosystem_size: 100.0,
            world_seed: 12345,

            fixed_delta: None,

            target_ratios: BTreeMap::from([
                (Species::Rabbit, 0.6),
                (Species::Deer, 0.3),
                (Species::Wolf, 0.1),
            ]),
            auto_balance: true,
            auto_balance_interval: 10.0,

            stats_log_interval: 500,
            tracked_log_interval: 10,

            food: FoodTemplate::default(),
            species: SpeciesTable::default(),
        }
    }
}

impl EcosystemTuning {
    /// Create balanced preset for stable ecosystem
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Create preset with quicker conception and shorter pregnancies
    pub fn fast_breeding() -> Self {
        let mut tuning = Self::default();
        for profile in tuning.species.0.values_mut() {
            profile.reproduction.base_rate *= 2.0;
            profile.reproduction.gestation *= 0.5;
            profile.reproduction.cooldown_after_birth *= 0.5;
        }
        tuning.initial_food = 300; // Feed the larger litters
        tuning
    }

    /// Create preset for competitive ecosystem (few, slow-growing food patches)
    pub fn scarce_food() -> Self {
        let mut tuning = Self::default();
        tuning.initial_food = 60;
        tuning.food.quantity = 60.0;
        tuning.food.regeneration_rate = 4.0;
        tuning
    }

    pub fn from_json_str(json: &str) -> Result<Self, EcosystemError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, EcosystemError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| EcosystemError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String, EcosystemError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), EcosystemError> {
        let invalid = |msg: &str| Err(EcosystemError::InvalidConfig(msg.to_string()));

        if !(self.ecosystem_size.is_finite() && self.ecosystem_size > 0.0) {
            return invalid("ecosystem_size must be positive");
        }
        if let Some(delta) = self.fixed_delta {
            if !(delta.is_finite() && delta > 0.0) {
                return invalid("fixed_delta must be positive");
            }
        }
        if !(self.auto_balance_interval.is_finite() && self.auto_balance_interval > 0.0) {
            return invalid("auto_balance_interval must be positive");
        }
        if self.stats_log_interval == 0 || self.tracked_log_interval == 0 {
            return invalid("log intervals must be at least one tick");
        }

        if self
            .target_ratios
            .values()
            .any(|ratio| !ratio.is_finite() || *ratio < 0.0)
        {
            return invalid("target ratios must be non-negative");
        }
        let total: f32 = self.target_ratios.values().sum();
        if (total - 1.0).abs() > 0.01 {
            return Err(EcosystemError::InvalidConfig(format!(
                "target ratios sum to {total:.3}, expected 1"
            )));
        }

        let food = &self.food;
        if !(food.nutrition_value.is_finite() && food.nutrition_value > 0.0) {
            return invalid("food nutrition_value must be positive");
        }
        if !(food.quantity.is_finite() && food.quantity > 0.0) {
            return invalid("food quantity must be positive");
        }
        if !(food.regeneration_rate.is_finite() && food.regeneration_rate >= 0.0) {
            return invalid("food regeneration_rate must be non-negative");
        }

        self.species.validate()
    }
}

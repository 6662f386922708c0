use crate::error::EcosystemError;
use crate::organisms::commands::PopulationEvents;
use crate::organisms::components::*;
use crate::organisms::tuning::EcosystemTuning;
use crate::world::{FoodSource, TickClock};
use bevy::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Agents carrying each status tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCounts {
    pub young: u32,
    pub old: u32,
    pub hungry: u32,
    pub tired: u32,
    pub pregnant: u32,
}

impl TagCounts {
    fn add(&mut self, tags: &StatusTags) {
        self.young += tags.young as u32;
        self.old += tags.old as u32;
        self.hungry += tags.hungry as u32;
        self.tired += tags.tired as u32;
        self.pregnant += tags.pregnant as u32;
    }

    fn merge(mut self, other: TagCounts) -> Self {
        self.young += other.young;
        self.old += other.old;
        self.hungry += other.hungry;
        self.tired += other.tired;
        self.pregnant += other.pregnant;
        self
    }
}

/// Population snapshot for monitoring and balancing callers
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EcosystemStats {
    pub tick: u64,
    pub elapsed_seconds: f32,
    pub total_animals: u32,
    pub by_species: BTreeMap<Species, u32>,
    pub by_tag: TagCounts,
    pub food_sources: u32,
    /// Mean of energy / max_energy over all agents, 0 with no agents
    pub average_energy: f32,
    pub balance_index: f32,
    /// Lifetime totals
    pub births: u64,
    pub natural_deaths: u64,
    pub culled: u64,
    pub max_population: u32,
}

impl EcosystemStats {
    pub fn count(&self, species: Species) -> u32 {
        self.by_species.get(&species).copied().unwrap_or(0)
    }

    pub fn to_json(&self) -> Result<String, EcosystemError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Partial aggregate over a slice of agents
#[derive(Debug, Clone, Default)]
pub struct Tally {
    pub total: u32,
    pub by_species: BTreeMap<Species, u32>,
    pub tags: TagCounts,
    pub energy_ratio_sum: f64,
}

impl Tally {
    fn add(mut self, species: Species, energy_ratio: f32, tags: &StatusTags) -> Self {
        self.total += 1;
        *self.by_species.entry(species).or_insert(0) += 1;
        self.tags.add(tags);
        self.energy_ratio_sum += energy_ratio as f64;
        self
    }

    fn merge(mut self, other: Tally) -> Self {
        self.total += other.total;
        for (species, count) in other.by_species {
            *self.by_species.entry(species).or_insert(0) += count;
        }
        self.tags = self.tags.merge(other.tags);
        self.energy_ratio_sum += other.energy_ratio_sum;
        self
    }

    pub fn average_energy(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            (self.energy_ratio_sum / self.total as f64) as f32
        }
    }
}

/// Aggregate agent rows in parallel
pub fn tally(rows: &[(Species, f32, StatusTags)]) -> Tally {
    rows.par_iter()
        .fold(Tally::default, |acc, (species, ratio, tags)| {
            acc.add(*species, *ratio, tags)
        })
        .reduce(Tally::default, Tally::merge)
}

/// 1 minus the summed deviation of each species' share from its target share,
/// floored at 0. An empty population scores 0.
pub fn balance_index(
    by_species: &BTreeMap<Species, u32>,
    total: u32,
    targets: &BTreeMap<Species, f32>,
) -> f32 {
    if total == 0 {
        return 0.0;
    }
    let share = |species: &Species| {
        by_species.get(species).copied().unwrap_or(0) as f32 / total as f32
    };

    let mut deviation: f32 = targets
        .iter()
        .map(|(species, target)| (share(species) - target).abs())
        .sum();
    // Species with no target count fully against the balance
    deviation += by_species
        .keys()
        .filter(|species| !targets.contains_key(species))
        .map(share)
        .sum::<f32>();

    (1.0 - deviation).max(0.0)
}

/// Recompute population statistics every tick
pub fn collect_ecosystem_stats(
    mut stats: ResMut<EcosystemStats>,
    agents: Query<(&Creature, &StatusTags)>,
    food: Query<(), With<FoodSource>>,
    events: Res<PopulationEvents>,
    tuning: Res<EcosystemTuning>,
    clock: Res<TickClock>,
) {
    let rows: Vec<(Species, f32, StatusTags)> = agents
        .iter()
        .map(|(creature, tags)| (creature.species, creature.energy_ratio(), *tags))
        .collect();
    let totals = tally(&rows);

    stats.tick = clock.tick;
    stats.elapsed_seconds = clock.elapsed_seconds;
    stats.total_animals = totals.total;
    stats.average_energy = totals.average_energy();
    stats.balance_index = balance_index(&totals.by_species, totals.total, &tuning.target_ratios);
    stats.by_species = totals.by_species;
    stats.by_tag = totals.tags;
    stats.food_sources = food.iter().count() as u32;
    stats.births = events.births;
    stats.natural_deaths = events.natural_deaths;
    stats.culled = events.culled;
    stats.max_population = stats.max_population.max(totals.total);

    if clock.tick % tuning.stats_log_interval.max(1) == 0 {
        info!(
            "[ECOSYSTEM] Tick {} | Animals: {} | Rabbits: {} | Deer: {} | Wolves: {} | Food: {} | Avg energy: {:.2} | Balance: {:.2} | Births: {} | Deaths: {}",
            stats.tick,
            stats.total_animals,
            stats.count(Species::Rabbit),
            stats.count(Species::Deer),
            stats.count(Species::Wolf),
            stats.food_sources,
            stats.average_energy,
            stats.balance_index,
            stats.births,
            stats.natural_deaths + stats.culled,
        );
    }
}

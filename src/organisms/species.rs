use crate::error::EcosystemError;
use crate::organisms::components::*;
use bevy::prelude::*;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Closed interval sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut fastrand::Rng) -> f32 {
        self.min + rng.f32() * (self.max - self.min)
    }
}

/// Inclusive offspring count range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LitterSize {
    pub min: u32,
    pub max: u32,
}

impl LitterSize {
    pub fn sample(&self, rng: &mut fastrand::Rng) -> u32 {
        rng.u32(self.min..=self.max)
    }
}

/// Numbers used to build a fresh `Creature`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreatureTemplate {
    pub energy: f32,
    pub max_energy: f32,
    pub hunger_rate: f32,
    pub lifespan: Span,
    pub reproduction_age: f32,
    pub size: f32,
    pub weight: f32,
    pub speed: f32,
}

impl CreatureTemplate {
    pub fn build(&self, species: Species, rng: &mut fastrand::Rng) -> Creature {
        let sex = if rng.bool() { Sex::Male } else { Sex::Female };
        let mut creature = Creature::new(
            species,
            sex,
            self.energy,
            self.max_energy,
            self.lifespan.sample(rng),
        );
        creature.hunger_rate = self.hunger_rate;
        creature.reproduction_age = self.reproduction_age;
        creature.size = self.size;
        creature.weight = self.weight;
        creature.speed = self.speed;
        creature
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Senses {
    pub sight_range: f32,
    pub hearing_range: f32,
    pub smell_range: f32,
    pub field_of_view: f32,
}

impl Senses {
    pub fn perception(&self) -> Perception {
        Perception::new(
            self.sight_range,
            self.hearing_range,
            self.smell_range,
            self.field_of_view,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementTemplate {
    pub rotation_speed: f32,
    pub pattern: MovementPattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReproductionProfile {
    /// Conception chance per second before modifiers
    pub base_rate: f32,
    /// Pregnancy length in seconds
    pub gestation: f32,
    /// Cooldown applied when a litter is born
    pub cooldown_after_birth: f32,
    pub litter: LitterSize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesProfile {
    pub role: Role,
    pub adult: CreatureTemplate,
    pub offspring: CreatureTemplate,
    pub personality: Personality,
    pub senses: Senses,
    pub initial_mode: AiMode,
    pub movement: MovementTemplate,
    pub reproduction: ReproductionProfile,
}

impl SpeciesProfile {
    fn bundle(
        &self,
        creature: Creature,
        personality: Personality,
        position: Vec3,
    ) -> AgentBundle {
        let mut movement = Movement::new(
            creature.speed,
            self.movement.rotation_speed,
            self.movement.pattern,
        );
        movement.last_position = position;
        let tags = StatusTags::derive(&creature);
        AgentBundle {
            position: Position(position),
            orientation: Orientation::default(),
            creature,
            personality: personality.clamped(),
            perception: self.senses.perception(),
            ai_state: AiState::new(self.initial_mode),
            movement,
            tags,
        }
    }

    fn validate(&self, species: Species) -> Result<(), EcosystemError> {
        let invalid = |what: &str| {
            Err(EcosystemError::InvalidConfig(format!(
                "{species:?}: {what}"
            )))
        };
        for (label, template) in [("adult", &self.adult), ("offspring", &self.offspring)] {
            let numbers = [
                template.energy,
                template.max_energy,
                template.hunger_rate,
                template.lifespan.min,
                template.lifespan.max,
                template.reproduction_age,
                template.size,
                template.weight,
                template.speed,
            ];
            if numbers.iter().any(|n| !n.is_finite()) {
                return invalid(&format!("{label} template has a non-finite value"));
            }
            if template.max_energy <= 0.0 {
                return invalid(&format!("{label} max_energy must be positive"));
            }
            if template.energy < 0.0 || template.energy > template.max_energy {
                return invalid(&format!("{label} energy must be within [0, max_energy]"));
            }
            if template.lifespan.min <= 0.0 || template.lifespan.min > template.lifespan.max {
                return invalid(&format!("{label} lifespan range must be positive and ordered"));
            }
            if template.hunger_rate < 0.0 || template.speed < 0.0 {
                return invalid(&format!("{label} hunger_rate and speed must be non-negative"));
            }
        }
        let repro = &self.reproduction;
        if !(repro.base_rate.is_finite() && repro.base_rate >= 0.0) {
            return invalid("reproduction base_rate must be non-negative");
        }
        if !(repro.gestation.is_finite() && repro.gestation > 0.0) {
            return invalid("gestation must be positive");
        }
        if !(repro.cooldown_after_birth.is_finite() && repro.cooldown_after_birth >= 0.0) {
            return invalid("cooldown_after_birth must be non-negative");
        }
        if repro.litter.min > repro.litter.max {
            return invalid("litter range is inverted");
        }
        if self.senses.sight_range < 0.0 {
            return invalid("sight_range must be non-negative");
        }
        Ok(())
    }
}

/// Per-species configuration, looked up instead of branching on species
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesTable(pub BTreeMap<Species, SpeciesProfile>);

impl SpeciesTable {
    pub fn profile(&self, species: Species) -> Result<&SpeciesProfile, EcosystemError> {
        self.0
            .get(&species)
            .ok_or(EcosystemError::UnknownSpecies(species))
    }

    pub fn role(&self, species: Species) -> Result<Role, EcosystemError> {
        Ok(self.profile(species)?.role)
    }

    /// Attribute set for a newly spawned adult
    pub fn adult_bundle(
        &self,
        species: Species,
        position: Vec3,
        rng: &mut fastrand::Rng,
    ) -> Result<AgentBundle, EcosystemError> {
        let profile = self.profile(species)?;
        let creature = profile.adult.build(species, rng);
        Ok(profile.bundle(creature, profile.personality, position))
    }

    /// Attribute set for a newborn; temperament is inherited from the parent
    pub fn offspring_bundle(
        &self,
        species: Species,
        position: Vec3,
        parent_personality: Personality,
        rng: &mut fastrand::Rng,
    ) -> Result<AgentBundle, EcosystemError> {
        let profile = self.profile(species)?;
        let creature = profile.offspring.build(species, rng);
        Ok(profile.bundle(creature, parent_personality, position))
    }

    pub fn validate(&self) -> Result<(), EcosystemError> {
        if self.0.is_empty() {
            return Err(EcosystemError::InvalidConfig(
                "species table is empty".to_string(),
            ));
        }
        for (species, profile) in &self.0 {
            profile.validate(*species)?;
        }
        Ok(())
    }
}

impl Default for SpeciesTable {
    fn default() -> Self {
        let mut table = BTreeMap::new();

        table.insert(
            Species::Rabbit,
            SpeciesProfile {
                role: Role::Prey,
                adult: CreatureTemplate {
                    energy: 80.0,
                    max_energy: 100.0,
                    hunger_rate: 8.0,
                    lifespan: Span::new(8.0, 12.0),
                    reproduction_age: 2.0,
                    size: 0.3,
                    weight: 2.0,
                    speed: 6.0,
                },
                // Kits start lower on energy, burn it more slowly and move slower
                offspring: CreatureTemplate {
                    energy: 60.0,
                    max_energy: 100.0,
                    hunger_rate: 6.0,
                    lifespan: Span::new(8.0, 12.0),
                    reproduction_age: 2.0,
                    size: 0.15,
                    weight: 1.0,
                    speed: 4.0,
                },
                personality: Personality {
                    aggressiveness: 0.1,
                    curiosity: 0.7,
                    fearfulness: 0.9,
                    sociability: 0.4,
                    territoriality: 0.2,
                    intelligence: 0.4,
                    dominance: 0.2,
                    adaptability: 0.8,
                },
                senses: Senses {
                    sight_range: 12.0,
                    hearing_range: 18.0,
                    smell_range: 6.0,
                    field_of_view: 300.0,
                },
                initial_mode: AiMode::Idle,
                movement: MovementTemplate {
                    rotation_speed: 8.0,
                    pattern: MovementPattern::Random,
                },
                reproduction: ReproductionProfile {
                    base_rate: 0.1,
                    gestation: 15.0,
                    cooldown_after_birth: 30.0,
                    litter: LitterSize { min: 2, max: 5 },
                },
            },
        );

        table.insert(
            Species::Wolf,
            SpeciesProfile {
                role: Role::Predator,
                adult: CreatureTemplate {
                    energy: 120.0,
                    max_energy: 150.0,
                    hunger_rate: 5.0,
                    lifespan: Span::new(12.0, 18.0),
                    reproduction_age: 3.0,
                    size: 1.2,
                    weight: 40.0,
                    speed: 8.0,
                },
                offspring: CreatureTemplate {
                    energy: 80.0,
                    max_energy: 150.0,
                    hunger_rate: 4.0,
                    lifespan: Span::new(12.0, 18.0),
                    reproduction_age: 3.0,
                    size: 0.6,
                    weight: 20.0,
                    speed: 5.0,
                },
                personality: Personality {
                    aggressiveness: 0.8,
                    curiosity: 0.6,
                    fearfulness: 0.2,
                    sociability: 0.7,
                    territoriality: 0.9,
                    intelligence: 0.9,
                    dominance: 0.7,
                    adaptability: 0.6,
                },
                senses: Senses {
                    sight_range: 25.0,
                    hearing_range: 30.0,
                    smell_range: 35.0,
                    field_of_view: 180.0,
                },
                initial_mode: AiMode::Wandering,
                movement: MovementTemplate {
                    rotation_speed: 6.0,
                    pattern: MovementPattern::Patrol,
                },
                reproduction: ReproductionProfile {
                    base_rate: 0.02,
                    gestation: 45.0,
                    cooldown_after_birth: 120.0,
                    litter: LitterSize { min: 1, max: 3 },
                },
            },
        );

        table.insert(
            Species::Deer,
            SpeciesProfile {
                role: Role::Prey,
                adult: CreatureTemplate {
                    energy: 100.0,
                    max_energy: 120.0,
                    hunger_rate: 6.0,
                    lifespan: Span::new(10.0, 15.0),
                    reproduction_age: 2.5,
                    size: 1.0,
                    weight: 80.0,
                    speed: 10.0,
                },
                offspring: CreatureTemplate {
                    energy: 70.0,
                    max_energy: 120.0,
                    hunger_rate: 5.0,
                    lifespan: Span::new(10.0, 15.0),
                    reproduction_age: 2.5,
                    size: 0.5,
                    weight: 40.0,
                    speed: 7.0,
                },
                personality: Personality {
                    aggressiveness: 0.2,
                    curiosity: 0.5,
                    fearfulness: 0.7,
                    sociability: 0.8,
                    territoriality: 0.1,
                    intelligence: 0.6,
                    dominance: 0.3,
                    adaptability: 0.7,
                },
                senses: Senses {
                    sight_range: 20.0,
                    hearing_range: 25.0,
                    smell_range: 10.0,
                    field_of_view: 270.0,
                },
                initial_mode: AiMode::Searching,
                movement: MovementTemplate {
                    rotation_speed: 10.0,
                    pattern: MovementPattern::Direct,
                },
                reproduction: ReproductionProfile {
                    base_rate: 0.05,
                    gestation: 30.0,
                    cooldown_after_birth: 90.0,
                    litter: LitterSize { min: 1, max: 2 },
                },
            },
        );

        Self(table)
    }
}

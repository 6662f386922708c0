use bevy::prelude::*;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position in world coordinates (Y is up, agents live on the Y = 0 plane)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec3);

impl Position {
    pub fn new(x: f32, z: f32) -> Self {
        Self(Vec3::new(x, 0.0, z))
    }

    pub fn x(&self) -> f32 {
        self.0.x
    }

    pub fn z(&self) -> f32 {
        self.0.z
    }

    pub fn as_vec3(&self) -> Vec3 {
        self.0
    }
}

/// Facing direction, shared with whatever presents the simulation
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Orientation(pub Quat);

impl Default for Orientation {
    fn default() -> Self {
        Self(Quat::IDENTITY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    Rabbit,
    Wolf,
    Deer,
    Bear,
    Fox,
}

impl Species {
    pub const ALL: [Species; 5] = [
        Species::Rabbit,
        Species::Wolf,
        Species::Deer,
        Species::Bear,
        Species::Fox,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

/// Core vital state of an animal.
///
/// `energy` is kept inside `[0, max_energy]` by routing every write through
/// the clamping helpers below.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Creature {
    pub species: Species,
    pub sex: Sex,

    energy: f32,
    pub max_energy: f32,
    pub hunger_rate: f32,

    /// Seconds lived
    pub age: f32,
    pub lifespan: f32,
    pub reproduction_age: f32,
    /// Seconds until the creature may conceive again
    pub reproduction_cooldown: f32,

    pub size: f32,
    pub weight: f32,
    pub speed: f32,

    pub is_pregnant: bool,
    pub pregnancy_time_remaining: f32,
}

impl Creature {
    /// Newborn-or-adult creature with zero age and no pregnancy
    pub fn new(species: Species, sex: Sex, energy: f32, max_energy: f32, lifespan: f32) -> Self {
        let max_energy = max_energy.max(0.0);
        Self {
            species,
            sex,
            energy: energy.clamp(0.0, max_energy),
            max_energy,
            hunger_rate: 0.0,
            age: 0.0,
            lifespan,
            reproduction_age: 0.0,
            reproduction_cooldown: 0.0,
            size: 1.0,
            weight: 1.0,
            speed: 1.0,
            is_pregnant: false,
            pregnancy_time_remaining: 0.0,
        }
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    pub fn set_energy(&mut self, value: f32) {
        self.energy = value.clamp(0.0, self.max_energy);
    }

    pub fn drain_energy(&mut self, amount: f32) {
        self.energy = (self.energy - amount.max(0.0)).max(0.0);
    }

    /// Returns how much energy was actually gained
    pub fn restore_energy(&mut self, amount: f32) -> f32 {
        let before = self.energy;
        self.energy = (self.energy + amount.max(0.0)).min(self.max_energy);
        self.energy - before
    }

    pub fn energy_ratio(&self) -> f32 {
        if self.max_energy > 0.0 {
            self.energy / self.max_energy
        } else {
            0.0
        }
    }

    pub fn age_ratio(&self) -> f32 {
        if self.lifespan > 0.0 {
            self.age / self.lifespan
        } else {
            1.0
        }
    }

    pub fn grow_older(&mut self, dt: f32) {
        self.age += dt.max(0.0);
    }

    /// Old age, starvation, or an unviable newborn
    pub fn meets_death_condition(&self) -> bool {
        self.age >= self.lifespan || self.energy <= 0.0 || (self.age < 1.0 && self.energy < 10.0)
    }

    pub fn can_reproduce(&self) -> bool {
        self.age >= self.reproduction_age
            && self.reproduction_cooldown <= 0.0
            && !self.is_pregnant
            && self.energy >= self.max_energy * 0.7
    }
}

/// Fixed behavioural traits, each in [0, 1]
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    pub aggressiveness: f32,
    pub curiosity: f32,
    pub fearfulness: f32,
    pub sociability: f32,
    pub territoriality: f32,
    pub intelligence: f32,
    pub dominance: f32,
    pub adaptability: f32,
}

impl Personality {
    pub fn clamped(self) -> Self {
        Self {
            aggressiveness: self.aggressiveness.clamp(0.0, 1.0),
            curiosity: self.curiosity.clamp(0.0, 1.0),
            fearfulness: self.fearfulness.clamp(0.0, 1.0),
            sociability: self.sociability.clamp(0.0, 1.0),
            territoriality: self.territoriality.clamp(0.0, 1.0),
            intelligence: self.intelligence.clamp(0.0, 1.0),
            dominance: self.dominance.clamp(0.0, 1.0),
            adaptability: self.adaptability.clamp(0.0, 1.0),
        }
    }

    pub fn neutral() -> Self {
        Self {
            aggressiveness: 0.5,
            curiosity: 0.5,
            fearfulness: 0.5,
            sociability: 0.5,
            territoriality: 0.5,
            intelligence: 0.5,
            dominance: 0.5,
            adaptability: 0.5,
        }
    }
}

/// Sensory ranges plus the entities the decision pass currently cares about
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    pub sight_range: f32,
    pub hearing_range: f32,
    pub smell_range: f32,
    /// Degrees
    pub field_of_view: f32,
    pub current_target: Option<Entity>,
    pub current_threat: Option<Entity>,
    pub current_mate: Option<Entity>,
}

impl Perception {
    pub fn new(sight_range: f32, hearing_range: f32, smell_range: f32, field_of_view: f32) -> Self {
        Self {
            sight_range,
            hearing_range,
            smell_range,
            field_of_view,
            current_target: None,
            current_threat: None,
            current_mate: None,
        }
    }
}

/// Behaviour vocabulary. Only a subset has handlers in the decision pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiMode {
    Idle,
    Wandering,
    Searching,
    Moving,
    Feeding,
    Drinking,
    Fleeing,
    Hunting,
    Stalking,
    Attacking,
    Mating,
    Territorial,
    Migrating,
    Sleeping,
    Socializing,
    Caring,
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct AiState {
    pub current: AiMode,
    pub previous: AiMode,
    /// Seconds spent in `current`
    pub state_timer: f32,
    pub cooldown: f32,
    pub priority: f32,
    pub desired: AiMode,
    pub can_change_state: bool,
}

impl AiState {
    pub fn new(initial: AiMode) -> Self {
        Self {
            current: initial,
            previous: AiMode::Idle,
            state_timer: 0.0,
            cooldown: 0.0,
            priority: 1.0,
            desired: initial,
            can_change_state: true,
        }
    }

    /// Switch modes, remembering where we came from. No-op for the same mode.
    pub fn transition(&mut self, next: AiMode) -> bool {
        self.desired = next;
        if self.current == next {
            return false;
        }
        self.previous = self.current;
        self.current = next;
        self.state_timer = 0.0;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementPattern {
    Direct,
    Zigzag,
    Circle,
    Random,
    Follow,
    Flee,
    Patrol,
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Movement {
    pub velocity: Vec3,
    pub acceleration: Vec3,
    /// Where the agent is steering, if anywhere
    pub target: Option<Vec3>,
    pub last_position: Vec3,

    pub current_speed: f32,
    pub max_speed: f32,
    pub rotation_speed: f32,

    pub is_moving: bool,
    pub avoid_obstacles: bool,

    pub pattern: MovementPattern,
    pub pattern_timer: f32,
}

impl Movement {
    pub fn new(max_speed: f32, rotation_speed: f32, pattern: MovementPattern) -> Self {
        Self {
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            target: None,
            last_position: Vec3::ZERO,
            current_speed: 0.0,
            max_speed,
            rotation_speed,
            is_moving: false,
            avoid_obstacles: true,
            pattern,
            pattern_timer: 0.0,
        }
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }
}

/// Status classifications cached from `Creature`.
///
/// Never written field by field: always replaced wholesale with
/// [`StatusTags::derive`].
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusTags {
    pub young: bool,
    pub old: bool,
    pub hungry: bool,
    pub tired: bool,
    pub pregnant: bool,
}

impl StatusTags {
    pub fn derive(creature: &Creature) -> Self {
        let age_ratio = creature.age_ratio();
        let energy_ratio = creature.energy_ratio();
        Self {
            young: age_ratio < 0.2,
            old: age_ratio > 0.8,
            hungry: energy_ratio < 0.3,
            tired: energy_ratio < 0.1,
            pregnant: creature.is_pregnant,
        }
    }
}

/// Marker for animals other animals flee from
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Predator;

/// Marker for animals that flee
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Prey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Predator,
    Prey,
}

/// Everything an agent is created with, minus its role marker
#[derive(Bundle, Debug, Clone)]
pub struct AgentBundle {
    pub position: Position,
    pub orientation: Orientation,
    pub creature: Creature,
    pub personality: Personality,
    pub perception: Perception,
    pub ai_state: AiState,
    pub movement: Movement,
    pub tags: StatusTags,
}

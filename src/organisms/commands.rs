use crate::organisms::components::*;
use crate::world::FoodBundle;
use bevy::ecs::world::EntityWorldMut;
use bevy::prelude::*;
use dashmap::DashMap;
use smallvec::SmallVec;
use std::collections::HashSet;
use std::fmt;

/// Who asked for a change. Batches are applied in this order, which keeps the
/// outcome independent of how workers were scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChangeOrigin {
    /// An agent processed during a parallel pass
    Agent(Entity),
    /// Serial callers outside the per-agent passes (bootstrap, auto-balance)
    Environment,
}

#[derive(Debug, Clone)]
pub struct AgentSpawn {
    pub bundle: AgentBundle,
    pub role: Role,
}

/// Deferred attribute edit: insert, remove or mutate components of one entity
pub type EntityEdit = Box<dyn FnOnce(&mut EntityWorldMut) + Send + Sync>;

pub enum StructuralChange {
    SpawnAgent(Box<AgentSpawn>),
    SpawnFood(FoodBundle),
    Destroy(Entity),
    Modify { entity: Entity, edit: EntityEdit },
}

impl fmt::Debug for StructuralChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralChange::SpawnAgent(spawn) => f
                .debug_tuple("SpawnAgent")
                .field(&spawn.bundle.creature.species)
                .finish(),
            StructuralChange::SpawnFood(food) => {
                f.debug_tuple("SpawnFood").field(&food.position).finish()
            }
            StructuralChange::Destroy(entity) => f.debug_tuple("Destroy").field(entity).finish(),
            StructuralChange::Modify { entity, .. } => {
                f.debug_struct("Modify").field("entity", entity).finish()
            }
        }
    }
}

type Batch = SmallVec<[StructuralChange; 2]>;

/// Spawn/destroy/edit requests recorded during parallel passes and applied
/// serially at the end of the tick.
#[derive(Resource, Default)]
pub struct StructuralChangeBuffer {
    batches: DashMap<ChangeOrigin, Batch>,
}

impl StructuralChangeBuffer {
    pub fn push(&self, origin: ChangeOrigin, change: StructuralChange) {
        self.batches.entry(origin).or_default().push(change);
    }

    pub fn spawn_agent(&self, origin: ChangeOrigin, bundle: AgentBundle, role: Role) {
        self.push(
            origin,
            StructuralChange::SpawnAgent(Box::new(AgentSpawn { bundle, role })),
        );
    }

    pub fn spawn_food(&self, origin: ChangeOrigin, bundle: FoodBundle) {
        self.push(origin, StructuralChange::SpawnFood(bundle));
    }

    pub fn destroy(&self, origin: ChangeOrigin, entity: Entity) {
        self.push(origin, StructuralChange::Destroy(entity));
    }

    pub fn modify<F>(&self, origin: ChangeOrigin, entity: Entity, edit: F)
    where
        F: FnOnce(&mut EntityWorldMut) + Send + Sync + 'static,
    {
        self.push(
            origin,
            StructuralChange::Modify {
                entity,
                edit: Box::new(edit),
            },
        );
    }

    /// Number of pending requests
    pub fn len(&self) -> usize {
        self.batches.iter().map(|batch| batch.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pending requests issued by one origin, in issue order
    pub fn pending_for(&self, origin: ChangeOrigin) -> usize {
        self.batches.get(&origin).map(|b| b.len()).unwrap_or(0)
    }

    /// Take every pending batch, ordered by origin
    pub fn drain(&mut self) -> Vec<(ChangeOrigin, Batch)> {
        let mut batches: Vec<_> = std::mem::take(&mut self.batches).into_iter().collect();
        batches.sort_by_key(|(origin, _)| *origin);
        batches
    }
}

/// What one application pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppliedChanges {
    /// Agents spawned by agents (births)
    pub births: u32,
    /// Agents spawned by environment callers
    pub external_spawns: u32,
    pub food_spawned: u32,
    pub destroyed: Vec<Entity>,
    /// Destroys requested from agent passes
    pub natural_deaths: u32,
    /// Destroys requested by environment callers
    pub culled: u32,
    pub edits: u32,
    /// Duplicate destroys and requests against missing entities
    pub skipped: u32,
}

/// Spawn an agent with the marker matching its role
pub fn spawn_with_role(world: &mut World, bundle: AgentBundle, role: Role) -> Entity {
    let mut entity = world.spawn(bundle);
    match role {
        Role::Predator => entity.insert(Predator),
        Role::Prey => entity.insert(Prey),
    };
    entity.id()
}

/// Apply drained batches. Destroys are idempotent; anything aimed at an entity
/// that no longer exists is dropped.
pub fn apply_batches(world: &mut World, batches: Vec<(ChangeOrigin, Batch)>) -> AppliedChanges {
    let mut applied = AppliedChanges::default();
    let mut destroyed: HashSet<Entity> = HashSet::new();

    for (origin, changes) in batches {
        for change in changes {
            match change {
                StructuralChange::SpawnAgent(spawn) => {
                    let AgentSpawn { bundle, role } = *spawn;
                    spawn_with_role(world, bundle, role);
                    match origin {
                        ChangeOrigin::Agent(_) => applied.births += 1,
                        ChangeOrigin::Environment => applied.external_spawns += 1,
                    }
                }
                StructuralChange::SpawnFood(bundle) => {
                    world.spawn(bundle);
                    applied.food_spawned += 1;
                }
                StructuralChange::Destroy(entity) => {
                    if !destroyed.insert(entity) || world.get_entity(entity).is_none() {
                        applied.skipped += 1;
                        continue;
                    }
                    world.despawn(entity);
                    applied.destroyed.push(entity);
                    match origin {
                        ChangeOrigin::Agent(_) => applied.natural_deaths += 1,
                        ChangeOrigin::Environment => applied.culled += 1,
                    }
                }
                StructuralChange::Modify { entity, edit } => {
                    match world.get_entity_mut(entity) {
                        Some(mut target) => {
                            edit(&mut target);
                            applied.edits += 1;
                        }
                        None => applied.skipped += 1,
                    }
                }
            }
        }
    }

    applied
}

/// Running totals of structural changes, for monitoring callers
#[derive(Resource, Debug, Clone, Default)]
pub struct PopulationEvents {
    pub births: u64,
    pub natural_deaths: u64,
    pub culled: u64,
    pub external_spawns: u64,
    pub last_tick: AppliedChanges,
}

impl PopulationEvents {
    pub fn record(&mut self, applied: AppliedChanges) {
        self.births += applied.births as u64;
        self.natural_deaths += applied.natural_deaths as u64;
        self.culled += applied.culled as u64;
        self.external_spawns += applied.external_spawns as u64;
        self.last_tick = applied;
    }
}

/// Synchronization point: runs after every parallel pass of the tick
pub fn apply_structural_changes(world: &mut World) {
    let batches = match world.get_resource_mut::<StructuralChangeBuffer>() {
        Some(mut buffer) => buffer.drain(),
        None => return,
    };
    let applied = apply_batches(world, batches);

    if applied.births > 0 || !applied.destroyed.is_empty() {
        debug!(
            "[LIFECYCLE] births: {} | deaths: {} | culled: {} | skipped: {}",
            applied.births, applied.natural_deaths, applied.culled, applied.skipped
        );
    }

    if let Some(mut events) = world.get_resource_mut::<PopulationEvents>() {
        events.record(applied);
    }
}

use crate::error::EcosystemError;
use crate::organisms::commands::{spawn_with_role, ChangeOrigin, StructuralChangeBuffer};
use crate::organisms::components::*;
use crate::organisms::ecosystem_stats::EcosystemStats;
use crate::organisms::species::SpeciesTable;
use crate::organisms::tuning::EcosystemTuning;
use crate::world::{FoodBundle, TickClock};
use bevy::prelude::*;
use bevy::time::{Timer, TimerMode};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

const BALANCE_RABBIT_FLOOR: u32 = 5;
const BALANCE_RABBIT_REFILL: usize = 10;
const BALANCE_WOLF_CULL: usize = 2;
const BALANCE_FOOD_REFILL: usize = 50;

/// Random source for serial work outside the per-agent passes
#[derive(Resource)]
pub struct WorldRng(pub StdRng);

impl WorldRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Resource to track which organism we're logging
#[derive(Resource, Debug, Default)]
pub struct TrackedOrganism {
    entity: Option<Entity>,
    log_counter: u64,
}

impl TrackedOrganism {
    pub fn track(&mut self, entity: Entity) {
        self.entity = Some(entity);
    }

    pub fn entity(&self) -> Option<Entity> {
        self.entity
    }
}

/// Uniform point on the ground inside a square of side `size` centred on the origin
fn random_position(rng: &mut StdRng, size: f32) -> Vec3 {
    let half = size / 2.0;
    Vec3::new(rng.gen_range(-half..half), 0.0, rng.gen_range(-half..half))
}

/// Spawn one adult immediately. Only for callers outside a tick.
pub fn spawn_agent(
    world: &mut World,
    table: &SpeciesTable,
    species: Species,
    position: Vec3,
    rng: &mut StdRng,
) -> Result<Entity, EcosystemError> {
    let mut bundle_rng = fastrand::Rng::with_seed(rng.gen());
    let bundle = table.adult_bundle(species, position, &mut bundle_rng)?;
    let role = table.role(species)?;
    Ok(spawn_with_role(world, bundle, role))
}

/// Queue one adult for creation at the next synchronization point
pub fn queue_agent(
    buffer: &StructuralChangeBuffer,
    table: &SpeciesTable,
    species: Species,
    position: Vec3,
    rng: &mut StdRng,
) -> Result<(), EcosystemError> {
    let mut bundle_rng = fastrand::Rng::with_seed(rng.gen());
    let bundle = table.adult_bundle(species, position, &mut bundle_rng)?;
    let role = table.role(species)?;
    buffer.spawn_agent(ChangeOrigin::Environment, bundle, role);
    Ok(())
}

/// Scatter the configured food and animals over the ecosystem square.
///
/// Returns the number of animals created.
pub fn populate(world: &mut World) -> Result<usize, EcosystemError> {
    let tuning = world
        .get_resource::<EcosystemTuning>()
        .cloned()
        .unwrap_or_default();
    let mut rng = StdRng::seed_from_u64(tuning.world_seed);

    for _ in 0..tuning.initial_food {
        world.spawn(FoodBundle {
            position: Position(random_position(&mut rng, tuning.ecosystem_size)),
            food: tuning.food.source(),
        });
    }

    let mut first = None;
    let mut spawned = 0;
    for (species, count) in [
        (Species::Rabbit, tuning.initial_rabbits),
        (Species::Deer, tuning.initial_deer),
        (Species::Wolf, tuning.initial_wolves),
    ] {
        for _ in 0..count {
            let position = random_position(&mut rng, tuning.ecosystem_size);
            let entity = spawn_agent(world, &tuning.species, species, position, &mut rng)?;
            first.get_or_insert(entity);
            spawned += 1;
        }
    }

    if let Some(entity) = first {
        if let Some(mut tracked) = world.get_resource_mut::<TrackedOrganism>() {
            tracked.track(entity);
            info!("Tracking organism {:?} for detailed logging", entity);
        }
    }
    world.insert_resource(WorldRng(rng));

    info!(
        "Spawned {} rabbits, {} deer, {} wolves and {} food sources",
        tuning.initial_rabbits, tuning.initial_deer, tuning.initial_wolves, tuning.initial_food
    );
    Ok(spawned)
}

/// Spawn initial organisms in the world
pub fn spawn_initial_population(world: &mut World) {
    info!("Spawning initial organisms...");
    if let Err(err) = populate(world) {
        error!("Failed to populate the ecosystem: {err}");
    }
}

/// Corrective spawns and removals, every `auto_balance_interval` seconds
#[allow(clippy::too_many_arguments)]
pub fn auto_balance(
    mut timer: Local<Option<Timer>>,
    mut rng: Local<Option<WorldRng>>,
    world_rng: Option<ResMut<WorldRng>>,
    tuning: Res<EcosystemTuning>,
    clock: Res<TickClock>,
    stats: Res<EcosystemStats>,
    wolves: Query<(Entity, &Creature), With<Predator>>,
    buffer: Res<StructuralChangeBuffer>,
) {
    if !tuning.auto_balance {
        return;
    }
    let timer = timer.get_or_insert_with(|| {
        Timer::from_seconds(tuning.auto_balance_interval, TimerMode::Repeating)
    });
    // A catch-up delta can exceed what `Duration` holds; one firing per tick is enough
    let step = Duration::try_from_secs_f32(clock.delta_seconds)
        .unwrap_or(Duration::MAX)
        .min(timer.duration());
    timer.tick(step);
    if !timer.just_finished() {
        return;
    }

    // Prefer the stream left behind by the bootstrap
    let rng = match world_rng {
        Some(world_rng) => &mut world_rng.into_inner().0,
        None => &mut rng.get_or_insert_with(|| WorldRng::from_seed(tuning.world_seed)).0,
    };

    let rabbits = stats.count(Species::Rabbit);
    let wolf_count = stats.count(Species::Wolf);

    if rabbits < BALANCE_RABBIT_FLOOR && wolf_count > 0 {
        for _ in 0..BALANCE_RABBIT_REFILL {
            let position = random_position(rng, tuning.ecosystem_size);
            if let Err(err) = queue_agent(&buffer, &tuning.species, Species::Rabbit, position, rng) {
                warn!("[BALANCE] Rejected rabbit spawn: {err}");
                break;
            }
        }
        info!("[BALANCE] Rabbits low ({rabbits}), adding {BALANCE_RABBIT_REFILL}");
    }

    if wolf_count > rabbits / 3 {
        let mut oldest: Vec<(Entity, f32)> = wolves
            .iter()
            .filter(|(_, creature)| creature.species == Species::Wolf)
            .map(|(entity, creature)| (entity, creature.age))
            .collect();
        oldest.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        for (entity, _) in oldest.iter().take(BALANCE_WOLF_CULL) {
            buffer.destroy(ChangeOrigin::Environment, *entity);
        }
        info!(
            "[BALANCE] Too many predators ({wolf_count} wolves for {rabbits} rabbits), removing {}",
            oldest.len().min(BALANCE_WOLF_CULL)
        );
    }

    if stats.food_sources < stats.total_animals {
        for _ in 0..BALANCE_FOOD_REFILL {
            buffer.spawn_food(
                ChangeOrigin::Environment,
                FoodBundle {
                    position: Position(random_position(rng, tuning.ecosystem_size)),
                    food: tuning.food.source(),
                },
            );
        }
        info!("[BALANCE] Food short, adding {BALANCE_FOOD_REFILL} sources");
    }
}

/// Log tracked organism information periodically
pub fn log_tracked_organism(
    mut tracked: ResMut<TrackedOrganism>,
    query: Query<(&Position, &Creature, &AiState, &Movement)>,
    tuning: Res<EcosystemTuning>,
) {
    tracked.log_counter += 1;
    if tracked.log_counter % tuning.tracked_log_interval.max(1) != 0 {
        return;
    }
    let Some(entity) = tracked.entity else {
        return;
    };

    match query.get(entity) {
        Ok((position, creature, ai, movement)) => {
            let target_info = movement
                .target
                .map(|t| format!("({:.1}, {:.1})", t.x, t.z))
                .unwrap_or_else(|| "None".to_string());
            info!(
                "[TRACKED] Tick: {} | {:?} | Pos: ({:.2}, {:.2}) | Speed: {:.2} | Energy: {:.2}/{:.2} ({:.1}%) | Age: {:.1}/{:.1} | State: {:?} ({:.1}s) | Target: {} | Pregnant: {}",
                tracked.log_counter,
                creature.species,
                position.x(),
                position.z(),
                movement.current_speed,
                creature.energy(),
                creature.max_energy,
                creature.energy_ratio() * 100.0,
                creature.age,
                creature.lifespan,
                ai.current,
                ai.state_timer,
                target_info,
                creature.is_pregnant,
            );
        }
        Err(_) => {
            info!("[TRACKED] Organism {:?} no longer exists", entity);
            tracked.entity = None;
        }
    }
}

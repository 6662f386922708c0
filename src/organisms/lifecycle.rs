use crate::error::EcosystemError;
use crate::organisms::commands::{ChangeOrigin, StructuralChangeBuffer};
use crate::organisms::components::*;
use crate::organisms::species::SpeciesTable;
use crate::organisms::tuning::EcosystemTuning;
use crate::utils::{seeded_rng, RngStream};
use crate::world::TickClock;
use bevy::prelude::*;
use glam::Vec3;

/// Extra energy burned per second while pregnant
pub const PREGNANCY_DRAIN: f32 = 5.0;
/// Energy a parent is left with after giving birth, at minimum
pub const POST_BIRTH_ENERGY_FLOOR: f32 = 10.0;
const POST_BIRTH_ENERGY_SHARE: f32 = 0.6;
/// Newborns land within this distance of the parent on each planar axis
const LITTER_SCATTER: f32 = 2.0;

/// A litter delivered this tick
#[derive(Debug, Clone)]
pub struct Birth {
    pub role: Role,
    pub litter: Vec<AgentBundle>,
}

#[derive(Debug, Clone, Default)]
pub struct LifecycleOutcome {
    pub birth: Option<Birth>,
    pub died: bool,
}

/// Age, metabolism, pregnancy, tags and the death check for one agent
pub fn advance_lifecycle(
    creature: &mut Creature,
    tags: &mut StatusTags,
    personality: &Personality,
    position: Vec3,
    table: &SpeciesTable,
    dt: f32,
    elapsed: f32,
) -> LifecycleOutcome {
    let mut outcome = LifecycleOutcome::default();

    creature.grow_older(dt);
    // Older animals burn more
    let age_multiplier = 1.0 + 0.5 * creature.age_ratio();
    creature.drain_energy(creature.hunger_rate * dt * age_multiplier);

    if creature.is_pregnant {
        creature.pregnancy_time_remaining -= dt;
        creature.drain_energy(PREGNANCY_DRAIN * dt);

        if creature.pregnancy_time_remaining <= 0.0 {
            match give_birth(creature, personality, position, table, elapsed) {
                Ok(birth) => outcome.birth = Some(birth),
                Err(err) => warn!("Dropping litter: {err}"),
            }
        }
    }

    if creature.reproduction_cooldown > 0.0 {
        creature.reproduction_cooldown = (creature.reproduction_cooldown - dt).max(0.0);
    }

    *tags = StatusTags::derive(creature);
    outcome.died = creature.meets_death_condition();
    outcome
}

fn give_birth(
    creature: &mut Creature,
    personality: &Personality,
    position: Vec3,
    table: &SpeciesTable,
    elapsed: f32,
) -> Result<Birth, EcosystemError> {
    creature.is_pregnant = false;
    creature.pregnancy_time_remaining = 0.0;

    let profile = table.profile(creature.species)?;
    creature.reproduction_cooldown = profile.reproduction.cooldown_after_birth;
    creature.set_energy(
        (creature.energy() * POST_BIRTH_ENERGY_SHARE).max(POST_BIRTH_ENERGY_FLOOR),
    );

    let mut rng = seeded_rng(position, elapsed, RngStream::Litter);
    let count = profile.reproduction.litter.sample(&mut rng);
    let mut litter = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let offset = Vec3::new(
            (rng.f32() * 2.0 - 1.0) * LITTER_SCATTER,
            0.0,
            (rng.f32() * 2.0 - 1.0) * LITTER_SCATTER,
        );
        litter.push(table.offspring_bundle(
            creature.species,
            position + offset,
            *personality,
            &mut rng,
        )?);
    }

    Ok(Birth {
        role: profile.role,
        litter,
    })
}

/// Lifecycle pass over every agent, in parallel. Births and deaths are queued.
pub fn update_lifecycle(
    mut agents: Query<(
        Entity,
        &Position,
        &Personality,
        &mut Creature,
        &mut StatusTags,
    )>,
    buffer: Res<StructuralChangeBuffer>,
    tuning: Res<EcosystemTuning>,
    clock: Res<TickClock>,
) {
    let dt = clock.delta_seconds;
    let elapsed = clock.elapsed_seconds;
    let buffer = &*buffer;
    let table = &tuning.species;

    agents.par_iter_mut().for_each(
        |(entity, position, personality, mut creature, mut tags)| {
            let outcome = advance_lifecycle(
                &mut creature,
                &mut tags,
                personality,
                position.0,
                table,
                dt,
                elapsed,
            );
            let origin = ChangeOrigin::Agent(entity);

            if let Some(birth) = outcome.birth {
                for bundle in birth.litter {
                    buffer.spawn_agent(origin, bundle, birth.role);
                }
            }
            if outcome.died {
                buffer.destroy(origin, entity);
            }
        },
    );
}

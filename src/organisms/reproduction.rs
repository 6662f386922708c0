use crate::organisms::components::*;
use crate::organisms::species::ReproductionProfile;
use crate::organisms::tuning::EcosystemTuning;
use crate::utils::{seeded_rng, RngStream};
use crate::world::TickClock;
use bevy::prelude::*;
use glam::Vec3;

/// Age ratio after which fertility declines
const FERTILITY_DECLINE_START: f32 = 0.7;

/// Conception chance per second.
///
/// Mates are not searched for: pairing is treated as a population-level
/// probability scaled by temperament, condition and age.
pub fn conception_chance(creature: &Creature, personality: &Personality, base_rate: f32) -> f32 {
    let mut chance = base_rate * (1.0 + 0.5 * personality.sociability) * creature.energy_ratio();

    let age_ratio = creature.age_ratio();
    if age_ratio > FERTILITY_DECLINE_START {
        chance *= (1.0 - 2.0 * (age_ratio - FERTILITY_DECLINE_START)).max(0.0);
    }
    chance.max(0.0)
}

/// Roll for conception and start a pregnancy on success
pub fn try_conceive(
    creature: &mut Creature,
    tags: &mut StatusTags,
    personality: &Personality,
    profile: &ReproductionProfile,
    position: Vec3,
    elapsed: f32,
    dt: f32,
) -> bool {
    // Agents already queued for removal this tick are left alone
    if creature.meets_death_condition() || !creature.can_reproduce() {
        return false;
    }

    let chance = conception_chance(creature, personality, profile.base_rate);
    let mut rng = seeded_rng(position, elapsed, RngStream::Conception);
    if rng.f32() >= chance * dt {
        return false;
    }

    creature.is_pregnant = true;
    creature.pregnancy_time_remaining = profile.gestation;
    *tags = StatusTags::derive(creature);
    true
}

/// Reproduction pass over every agent, in parallel
pub fn update_reproduction(
    mut agents: Query<(&Position, &Personality, &mut Creature, &mut StatusTags)>,
    tuning: Res<EcosystemTuning>,
    clock: Res<TickClock>,
) {
    let dt = clock.delta_seconds;
    let elapsed = clock.elapsed_seconds;
    let table = &tuning.species;

    agents
        .par_iter_mut()
        .for_each(|(position, personality, mut creature, mut tags)| {
            let Ok(profile) = table.profile(creature.species) else {
                return;
            };
            try_conceive(
                &mut creature,
                &mut tags,
                personality,
                &profile.reproduction,
                position.0,
                elapsed,
                dt,
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::organisms::species::SpeciesTable;

    fn breeder() -> (Creature, Personality, ReproductionProfile) {
        let table = SpeciesTable::default();
        let profile = table.profile(Species::Rabbit).unwrap();
        let mut creature = Creature::new(Species::Rabbit, Sex::Female, 80.0, 100.0, 10.0);
        creature.reproduction_age = 2.0;
        creature.age = 3.0;
        (creature, profile.personality, profile.reproduction)
    }

    #[test]
    fn eligibility_requires_every_condition() {
        let (creature, _, _) = breeder();
        assert!(creature.can_reproduce());

        let mut young = creature.clone();
        young.age = 1.0;
        assert!(!young.can_reproduce());

        let mut resting = creature.clone();
        resting.reproduction_cooldown = 0.5;
        assert!(!resting.can_reproduce());

        let mut pregnant = creature.clone();
        pregnant.is_pregnant = true;
        assert!(!pregnant.can_reproduce());

        let mut weak = creature;
        weak.set_energy(69.0);
        assert!(!weak.can_reproduce());
    }

    #[test]
    fn chance_follows_formula() {
        let (mut creature, personality, profile) = breeder();
        // 0.1 * (1 + 0.5 * 0.4) * 0.8
        let prime = conception_chance(&creature, &personality, profile.base_rate);
        assert!((prime - 0.096).abs() < 1e-6);

        creature.age = 9.0;
        let old = conception_chance(&creature, &personality, profile.base_rate);
        assert!((old - 0.096 * 0.6).abs() < 1e-5);

        creature.age = 13.0;
        assert_eq!(conception_chance(&creature, &personality, profile.base_rate), 0.0);
    }

    #[test]
    fn certain_roll_starts_pregnancy() {
        let (mut creature, personality, profile) = breeder();
        let mut tags = StatusTags::derive(&creature);

        // chance * dt > 1 guarantees success
        let conceived = try_conceive(
            &mut creature,
            &mut tags,
            &personality,
            &profile,
            Vec3::new(2.0, 0.0, 3.0),
            4.0,
            20.0,
        );
        assert!(conceived);
        assert!(creature.is_pregnant);
        assert_eq!(creature.pregnancy_time_remaining, 15.0);
        assert!(tags.pregnant);
    }

    #[test]
    fn zero_delta_never_conceives() {
        let (mut creature, personality, profile) = breeder();
        let mut tags = StatusTags::derive(&creature);
        assert!(!try_conceive(
            &mut creature,
            &mut tags,
            &personality,
            &profile,
            Vec3::ZERO,
            1.0,
            0.0
        ));
        assert!(!creature.is_pregnant);
    }

    #[test]
    fn dying_agents_are_skipped() {
        let (mut creature, personality, profile) = breeder();
        creature.age = creature.lifespan;
        let mut tags = StatusTags::derive(&creature);
        assert!(!try_conceive(
            &mut creature,
            &mut tags,
            &personality,
            &profile,
            Vec3::ZERO,
            1.0,
            1_000.0
        ));
        assert!(!creature.is_pregnant);
    }

    #[test]
    fn outcome_is_reproducible_for_same_position_and_time() {
        let roll = || {
            let (mut creature, personality, profile) = breeder();
            let mut tags = StatusTags::derive(&creature);
            try_conceive(
                &mut creature,
                &mut tags,
                &personality,
                &profile,
                Vec3::new(-4.0, 0.0, 9.5),
                33.0,
                2.0,
            )
        };
        let first = roll();
        for _ in 0..8 {
            assert_eq!(roll(), first);
        }
    }
}

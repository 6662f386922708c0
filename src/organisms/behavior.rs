use crate::organisms::commands::{ChangeOrigin, StructuralChangeBuffer};
use crate::organisms::components::*;
use crate::organisms::perception::{PerceptionSnapshot, Sighting};
use crate::organisms::tuning::EcosystemTuning;
use crate::utils::{random_planar_direction, seeded_rng, RngStream};
use crate::world::{FoodSource, TickClock};
use bevy::ecs::query::Has;
use bevy::prelude::*;
use glam::Vec3;

/// Energy restored per second while feeding
pub const FEEDING_RATE: f32 = 20.0;
/// Predators closer than this keep an agent fleeing
pub const FLEE_RADIUS: f32 = 15.0;
/// How far ahead of the agent the flee target is placed
pub const FLEE_DISTANCE: f32 = 25.0;
pub const FLEE_SPEED_BOOST: f32 = 1.5;

const WANDER_TIMEOUT: f32 = 8.0;
const WANDER_RETARGET_PERIOD: f32 = 2.0;
const WANDER_RETARGET_CHANCE: f32 = 0.3;
const SEARCH_TIMEOUT: f32 = 15.0;
const FEEDING_TIMEOUT: f32 = 5.0;
/// Distance at which a food source is close enough to eat
const FEEDING_REACH: f32 = 1.0;

/// Everything one agent's decision reads but never writes
pub struct DecisionContext<'a> {
    pub entity: Entity,
    pub position: Vec3,
    pub personality: &'a Personality,
    pub role: Role,
    /// Pattern restored when the agent calms down
    pub default_pattern: MovementPattern,
    pub snapshot: &'a PerceptionSnapshot,
    pub elapsed: f32,
    pub dt: f32,
}

/// Energy taken from a food source this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Meal {
    pub food: Entity,
    pub energy: f32,
}

/// Run one tick of the state machine for a single agent.
///
/// Returns the meal eaten, if any, so the caller can charge the food source.
pub fn decide(
    ctx: &DecisionContext,
    ai: &mut AiState,
    movement: &mut Movement,
    perception: &mut Perception,
    creature: &mut Creature,
) -> Option<Meal> {
    ai.state_timer += ctx.dt;
    ai.cooldown = (ai.cooldown - ctx.dt).max(0.0);

    let mut meal = None;

    // Danger overrides every other state
    if let Some(threat) = detect_danger(ctx, perception.sight_range) {
        perception.current_threat = Some(threat.entity);
        flee_from(ctx, ai, movement, threat);
        // No early return: the drain and aging below apply on danger ticks too
    } else {
        perception.current_threat = None;
        match ai.current {
            AiMode::Idle => handle_idle(ctx, ai, movement, creature),
            AiMode::Wandering => handle_wandering(ctx, ai, movement),
            AiMode::Searching => handle_searching(ctx, ai, movement, perception),
            AiMode::Feeding => meal = handle_feeding(ctx, ai, perception, creature),
            AiMode::Fleeing => handle_fleeing(ctx, ai, movement),
            _ => {}
        }
        check_basic_needs(ai, creature);
    }

    creature.drain_energy(creature.hunger_rate * ctx.dt);
    creature.grow_older(ctx.dt);

    meal
}

/// Nearest predator close enough to trigger a flee. Predators ignore each other.
fn detect_danger(ctx: &DecisionContext, sight_range: f32) -> Option<Sighting> {
    if ctx.role == Role::Predator {
        return None;
    }
    let threat = ctx.snapshot.nearest_predator(ctx.position, ctx.entity)?;
    let in_sight = threat.distance < sight_range;
    let close = threat.distance < sight_range * 0.5;
    (in_sight || close).then_some(threat)
}

fn random_target(ctx: &DecisionContext, range: f32) -> Vec3 {
    let mut rng = seeded_rng(ctx.position, ctx.elapsed, RngStream::RandomTarget);
    let direction = random_planar_direction(&mut rng);
    ctx.position + direction * range * (0.5 + 0.5 * rng.f32())
}

fn handle_idle(
    ctx: &DecisionContext,
    ai: &mut AiState,
    movement: &mut Movement,
    creature: &Creature,
) {
    // Fearful animals don't stay still for long
    let max_idle = 1.0 + 2.0 * (1.0 - ctx.personality.fearfulness);
    if ai.state_timer <= max_idle {
        return;
    }

    if creature.energy() < creature.max_energy * 0.6 {
        ai.transition(AiMode::Searching);
        return;
    }

    let mut rng = seeded_rng(ctx.position, ctx.elapsed, RngStream::IdleChoice);
    if rng.f32() < ctx.personality.curiosity {
        ai.transition(AiMode::Searching);
    } else {
        ai.transition(AiMode::Wandering);
        movement.target = Some(random_target(ctx, 5.0));
    }
}

fn handle_wandering(ctx: &DecisionContext, ai: &mut AiState, movement: &mut Movement) {
    if !movement.has_target() || ai.state_timer > WANDER_TIMEOUT {
        ai.transition(AiMode::Idle);
    }

    // Erratic direction changes, roughly once per period
    if ai.state_timer % WANDER_RETARGET_PERIOD < ctx.dt {
        let mut rng = seeded_rng(ctx.position, ctx.elapsed, RngStream::WanderJitter);
        if rng.f32() < WANDER_RETARGET_CHANCE {
            movement.target = Some(random_target(ctx, 3.0));
        }
    }
}

fn handle_searching(
    ctx: &DecisionContext,
    ai: &mut AiState,
    movement: &mut Movement,
    perception: &mut Perception,
) {
    match ctx
        .snapshot
        .nearest_food_within(ctx.position, perception.sight_range)
    {
        Some(food) => {
            movement.target = Some(food.position);
            perception.current_target = Some(food.entity);
            if food.distance < FEEDING_REACH {
                ai.transition(AiMode::Feeding);
            }
        }
        None => {
            perception.current_target = None;
            if !movement.has_target() {
                movement.target = Some(random_target(ctx, 10.0));
            }
            if ai.state_timer > SEARCH_TIMEOUT {
                ai.transition(AiMode::Wandering);
                movement.target = Some(random_target(ctx, 5.0));
            }
        }
    }
}

fn handle_feeding(
    ctx: &DecisionContext,
    ai: &mut AiState,
    perception: &mut Perception,
    creature: &mut Creature,
) -> Option<Meal> {
    // Someone else emptied the source
    if let Some(food) = perception.current_target {
        if !ctx.snapshot.food_available(food) {
            ai.transition(AiMode::Idle);
            perception.current_target = None;
            return None;
        }
    }

    let gained = creature.restore_energy(FEEDING_RATE * ctx.dt);
    let meal = perception
        .current_target
        .filter(|_| gained > 0.0)
        .map(|food| Meal {
            food,
            energy: gained,
        });

    if creature.energy() > creature.max_energy * 0.9 || ai.state_timer > FEEDING_TIMEOUT {
        ai.transition(AiMode::Idle);
        perception.current_target = None;
    }
    meal
}

/// Regular Fleeing dispatch: nothing in sight, but something may still be near
fn handle_fleeing(ctx: &DecisionContext, ai: &mut AiState, movement: &mut Movement) {
    let nearest = if ctx.role == Role::Predator {
        None
    } else {
        ctx.snapshot.nearest_predator(ctx.position, ctx.entity)
    };

    match nearest {
        Some(threat) if threat.distance < FLEE_RADIUS => flee_from(ctx, ai, movement, threat),
        _ => {
            movement.current_speed = movement.max_speed;
            movement.pattern = ctx.default_pattern;
            ai.transition(AiMode::Idle);
        }
    }
}

fn flee_from(ctx: &DecisionContext, ai: &mut AiState, movement: &mut Movement, threat: Sighting) {
    let away = Vec3::new(
        ctx.position.x - threat.position.x,
        0.0,
        ctx.position.z - threat.position.z,
    )
    .normalize_or_zero();
    // Standing on top of the predator: any direction will do
    let away = if away == Vec3::ZERO {
        let mut rng = seeded_rng(ctx.position, ctx.elapsed, RngStream::RandomTarget);
        random_planar_direction(&mut rng)
    } else {
        away
    };

    movement.target = Some(ctx.position + away * FLEE_DISTANCE);
    movement.current_speed = movement.max_speed * FLEE_SPEED_BOOST;
    movement.pattern = MovementPattern::Flee;
    ai.transition(AiMode::Fleeing);
}

fn check_basic_needs(ai: &mut AiState, creature: &Creature) {
    let starving = creature.energy() < creature.max_energy * 0.3;
    if starving && !matches!(ai.current, AiMode::Fleeing | AiMode::Feeding) {
        ai.transition(AiMode::Searching);
    }
}

/// Decision pass over every agent, in parallel
pub fn update_decisions(
    mut agents: Query<(
        Entity,
        &Position,
        &Personality,
        &mut Perception,
        &mut AiState,
        &mut Movement,
        &mut Creature,
        Has<Predator>,
    )>,
    snapshot: Res<PerceptionSnapshot>,
    buffer: Res<StructuralChangeBuffer>,
    tuning: Res<EcosystemTuning>,
    clock: Res<TickClock>,
) {
    let dt = clock.delta_seconds;
    let elapsed = clock.elapsed_seconds;
    let snapshot = &*snapshot;
    let buffer = &*buffer;
    let species = &tuning.species;

    agents.par_iter_mut().for_each(
        |(entity, position, personality, mut perception, mut ai, mut movement, mut creature, is_predator)| {
            let default_pattern = species
                .profile(creature.species)
                .map(|profile| profile.movement.pattern)
                .unwrap_or(movement.pattern);
            let ctx = DecisionContext {
                entity,
                position: position.0,
                personality,
                role: if is_predator { Role::Predator } else { Role::Prey },
                default_pattern,
                snapshot,
                elapsed,
                dt,
            };

            let meal = decide(&ctx, &mut ai, &mut movement, &mut perception, &mut creature);
            if let Some(meal) = meal {
                buffer.modify(ChangeOrigin::Agent(entity), meal.food, move |food| {
                    if let Some(mut source) = food.get_mut::<FoodSource>() {
                        let amount = source.quantity_for_energy(meal.energy);
                        source.consume(amount);
                    }
                });
            }
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::organisms::species::SpeciesTable;

    struct Agent {
        creature: Creature,
        personality: Personality,
        perception: Perception,
        ai: AiState,
        movement: Movement,
    }

    fn agent(species: Species) -> Agent {
        let mut rng = fastrand::Rng::with_seed(1);
        let bundle = SpeciesTable::default()
            .adult_bundle(species, Vec3::ZERO, &mut rng)
            .unwrap();
        let mut creature = bundle.creature;
        creature.hunger_rate = 0.0;
        creature.lifespan = 100.0;
        Agent {
            creature,
            personality: bundle.personality,
            perception: bundle.perception,
            ai: bundle.ai_state,
            movement: bundle.movement,
        }
    }

    fn run(agent: &mut Agent, snapshot: &PerceptionSnapshot, role: Role, dt: f32) -> Option<Meal> {
        run_at(agent, snapshot, role, dt, 42.0)
    }

    fn run_at(
        agent: &mut Agent,
        snapshot: &PerceptionSnapshot,
        role: Role,
        dt: f32,
        elapsed: f32,
    ) -> Option<Meal> {
        let ctx = DecisionContext {
            entity: Entity::from_raw(1),
            position: Vec3::ZERO,
            personality: &agent.personality,
            role,
            default_pattern: MovementPattern::Random,
            snapshot,
            elapsed,
            dt,
        };
        decide(
            &ctx,
            &mut agent.ai,
            &mut agent.movement,
            &mut agent.perception,
            &mut agent.creature,
        )
    }

    fn wolf_at(x: f32, z: f32) -> PerceptionSnapshot {
        PerceptionSnapshot {
            predators: vec![(Entity::from_raw(99), Vec3::new(x, 0.0, z))],
            food: Vec::new(),
        }
    }

    fn food_at(food: Entity, x: f32, z: f32) -> PerceptionSnapshot {
        PerceptionSnapshot {
            predators: Vec::new(),
            food: vec![(food, Vec3::new(x, 0.0, z))],
        }
    }

    /// First elapsed time at which the wander jitter draw at the origin succeeds
    fn retarget_time() -> f32 {
        (0..1000)
            .map(|i| 10.0 + i as f32 * 0.25)
            .find(|t| {
                seeded_rng(Vec3::ZERO, *t, RngStream::WanderJitter).f32() < WANDER_RETARGET_CHANCE
            })
            .expect("some draw falls under the retarget chance")
    }

    #[test]
    fn idle_past_threshold_always_leaves_idle() {
        let mut rabbit = agent(Species::Rabbit);
        assert_eq!(rabbit.personality.fearfulness, 0.9);
        rabbit.creature.set_energy(90.0);
        rabbit.ai.state_timer = 1.5;

        run(&mut rabbit, &PerceptionSnapshot::default(), Role::Prey, 0.1);

        assert!(matches!(
            rabbit.ai.current,
            AiMode::Searching | AiMode::Wandering
        ));
        assert_eq!(rabbit.ai.previous, AiMode::Idle);
        assert_eq!(rabbit.ai.state_timer, 0.0);
        if rabbit.ai.current == AiMode::Wandering {
            assert!(rabbit.movement.target.unwrap().length() <= 5.0 + 1e-4);
        }
    }

    #[test]
    fn hungry_idle_agent_searches() {
        let mut rabbit = agent(Species::Rabbit);
        rabbit.creature.set_energy(50.0);
        rabbit.ai.state_timer = 2.0;
        run(&mut rabbit, &PerceptionSnapshot::default(), Role::Prey, 0.1);
        assert_eq!(rabbit.ai.current, AiMode::Searching);
    }

    #[test]
    fn idle_agent_waits_below_threshold() {
        let mut rabbit = agent(Species::Rabbit);
        rabbit.ai.state_timer = 0.5;
        run(&mut rabbit, &PerceptionSnapshot::default(), Role::Prey, 0.1);
        assert_eq!(rabbit.ai.current, AiMode::Idle);
        assert!((rabbit.ai.state_timer - 0.6).abs() < 1e-6);
    }

    #[test]
    fn danger_in_sight_overrides_any_state() {
        for mode in [AiMode::Idle, AiMode::Feeding, AiMode::Searching, AiMode::Sleeping] {
            let mut rabbit = agent(Species::Rabbit);
            rabbit.ai = AiState::new(mode);
            rabbit.ai.state_timer = 3.0;

            run(&mut rabbit, &wolf_at(10.0, 0.0), Role::Prey, 0.1);

            assert_eq!(rabbit.ai.current, AiMode::Fleeing);
            assert_eq!(rabbit.ai.previous, mode);
            assert_eq!(rabbit.ai.state_timer, 0.0);
            assert_eq!(rabbit.movement.pattern, MovementPattern::Flee);
            assert_eq!(rabbit.perception.current_threat, Some(Entity::from_raw(99)));
            let target = rabbit.movement.target.unwrap();
            assert!((target - Vec3::new(-FLEE_DISTANCE, 0.0, 0.0)).length() < 1e-4);
            assert_eq!(rabbit.movement.current_speed, rabbit.movement.max_speed * 1.5);
        }
    }

    #[test]
    fn deer_flees_beyond_flee_radius_while_in_sight() {
        let mut deer = agent(Species::Deer);
        assert_eq!(deer.perception.sight_range, 20.0);
        run(&mut deer, &wolf_at(0.0, 18.0), Role::Prey, 0.1);
        assert_eq!(deer.ai.current, AiMode::Fleeing);
    }

    #[test]
    fn predators_do_not_flee() {
        let mut wolf = agent(Species::Wolf);
        run(&mut wolf, &wolf_at(2.0, 0.0), Role::Predator, 0.1);
        assert_ne!(wolf.ai.current, AiMode::Fleeing);
        assert_eq!(wolf.perception.current_threat, None);
    }

    #[test]
    fn fleeing_continues_while_predator_is_near() {
        let mut rabbit = agent(Species::Rabbit);
        rabbit.ai = AiState::new(AiMode::Fleeing);
        rabbit.ai.state_timer = 1.0;
        // Out of sight (12) but inside the flee radius
        run(&mut rabbit, &wolf_at(13.0, 0.0), Role::Prey, 0.1);
        assert_eq!(rabbit.ai.current, AiMode::Fleeing);
        assert!((rabbit.ai.state_timer - 1.1).abs() < 1e-6);
    }

    #[test]
    fn fleeing_calms_down_when_safe() {
        let mut rabbit = agent(Species::Rabbit);
        rabbit.ai = AiState::new(AiMode::Fleeing);
        rabbit.movement.pattern = MovementPattern::Flee;
        rabbit.movement.current_speed = 99.0;

        run(&mut rabbit, &wolf_at(40.0, 0.0), Role::Prey, 0.1);

        assert_eq!(rabbit.ai.current, AiMode::Idle);
        assert_eq!(rabbit.ai.previous, AiMode::Fleeing);
        assert_eq!(rabbit.movement.pattern, MovementPattern::Random);
        assert_eq!(rabbit.movement.current_speed, rabbit.movement.max_speed);
    }

    #[test]
    fn searching_targets_nearest_visible_food() {
        let mut rabbit = agent(Species::Rabbit);
        rabbit.ai = AiState::new(AiMode::Searching);
        let near = Entity::from_raw(7);
        let snapshot = PerceptionSnapshot {
            predators: Vec::new(),
            food: vec![
                (Entity::from_raw(6), Vec3::new(8.0, 0.0, 0.0)),
                (near, Vec3::new(0.0, 0.0, 4.0)),
                (Entity::from_raw(8), Vec3::new(50.0, 0.0, 0.0)),
            ],
        };

        run(&mut rabbit, &snapshot, Role::Prey, 0.1);
        assert_eq!(rabbit.ai.current, AiMode::Searching);
        assert_eq!(rabbit.movement.target, Some(Vec3::new(0.0, 0.0, 4.0)));
        assert_eq!(rabbit.perception.current_target, Some(near));
    }

    #[test]
    fn reaching_food_starts_feeding() {
        let mut rabbit = agent(Species::Rabbit);
        rabbit.ai = AiState::new(AiMode::Searching);
        let snapshot = PerceptionSnapshot {
            predators: Vec::new(),
            food: vec![(Entity::from_raw(5), Vec3::new(0.5, 0.0, 0.0))],
        };
        run(&mut rabbit, &snapshot, Role::Prey, 0.1);
        assert_eq!(rabbit.ai.current, AiMode::Feeding);
    }

    #[test]
    fn fruitless_search_gives_up() {
        let mut rabbit = agent(Species::Rabbit);
        rabbit.ai = AiState::new(AiMode::Searching);
        rabbit.ai.state_timer = 15.0;

        run(&mut rabbit, &PerceptionSnapshot::default(), Role::Prey, 0.1);

        assert_eq!(rabbit.ai.current, AiMode::Wandering);
        let target = rabbit.movement.target.unwrap();
        assert!(target.length() <= 5.0 + 1e-4);
        assert_eq!(target.y, 0.0);
    }

    #[test]
    fn feeding_restores_energy_and_charges_food() {
        let mut rabbit = agent(Species::Rabbit);
        rabbit.ai = AiState::new(AiMode::Feeding);
        rabbit.creature.set_energy(50.0);
        let food = Entity::from_raw(3);
        rabbit.perception.current_target = Some(food);

        let meal = run(&mut rabbit, &food_at(food, 0.5, 0.0), Role::Prey, 0.5);

        assert_eq!(rabbit.creature.energy(), 60.0);
        assert_eq!(meal, Some(Meal { food, energy: 10.0 }));
        assert_eq!(rabbit.ai.current, AiMode::Feeding);
    }

    #[test]
    fn feeding_stops_when_nearly_full() {
        let mut rabbit = agent(Species::Rabbit);
        rabbit.ai = AiState::new(AiMode::Feeding);
        rabbit.creature.set_energy(89.0);
        let food = Entity::from_raw(3);
        rabbit.perception.current_target = Some(food);

        run(&mut rabbit, &food_at(food, 0.5, 0.0), Role::Prey, 0.1);

        assert_eq!(rabbit.creature.energy(), 91.0);
        assert_eq!(rabbit.ai.current, AiMode::Idle);
        assert_eq!(rabbit.perception.current_target, None);
    }

    #[test]
    fn emptied_food_ends_feeding() {
        let mut rabbit = agent(Species::Rabbit);
        rabbit.ai = AiState::new(AiMode::Feeding);
        rabbit.ai.state_timer = 1.0;
        rabbit.creature.set_energy(50.0);
        rabbit.perception.current_target = Some(Entity::from_raw(3));

        // The source is gone from the edible list
        let meal = run(&mut rabbit, &food_at(Entity::from_raw(4), 0.5, 0.0), Role::Prey, 0.1);

        assert_eq!(meal, None);
        assert_eq!(rabbit.creature.energy(), 50.0);
        assert_eq!(rabbit.ai.current, AiMode::Idle);
        assert_eq!(rabbit.ai.previous, AiMode::Feeding);
        assert_eq!(rabbit.perception.current_target, None);
    }

    #[test]
    fn wandering_retargets_nearby_on_period() {
        let elapsed = retarget_time();
        let mut rabbit = agent(Species::Rabbit);
        rabbit.ai = AiState::new(AiMode::Wandering);
        rabbit.ai.state_timer = 1.95;
        rabbit.movement.target = Some(Vec3::new(10.0, 0.0, 0.0));

        run_at(&mut rabbit, &PerceptionSnapshot::default(), Role::Prey, 0.1, elapsed);

        assert_eq!(rabbit.ai.current, AiMode::Wandering);
        let target = rabbit.movement.target.unwrap();
        assert_ne!(target, Vec3::new(10.0, 0.0, 0.0));
        assert!(target.length() <= 3.0 + 1e-4);
        assert!(target.length() >= 1.5 - 1e-4);
        assert_eq!(target.y, 0.0);
    }

    #[test]
    fn wandering_keeps_target_off_period() {
        let elapsed = retarget_time();
        let mut rabbit = agent(Species::Rabbit);
        rabbit.ai = AiState::new(AiMode::Wandering);
        rabbit.ai.state_timer = 1.0;
        rabbit.movement.target = Some(Vec3::new(10.0, 0.0, 0.0));

        run_at(&mut rabbit, &PerceptionSnapshot::default(), Role::Prey, 0.1, elapsed);

        assert_eq!(rabbit.ai.current, AiMode::Wandering);
        assert_eq!(rabbit.movement.target, Some(Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn searching_without_food_picks_a_nearby_point() {
        let mut rabbit = agent(Species::Rabbit);
        rabbit.ai = AiState::new(AiMode::Searching);
        assert_eq!(rabbit.movement.target, None);

        run(&mut rabbit, &PerceptionSnapshot::default(), Role::Prey, 0.1);

        assert_eq!(rabbit.ai.current, AiMode::Searching);
        assert!((rabbit.ai.state_timer - 0.1).abs() < 1e-6);
        assert_eq!(rabbit.perception.current_target, None);
        let target = rabbit.movement.target.unwrap();
        assert!(target.length() <= 10.0 + 1e-4);
        assert!(target.length() >= 5.0 - 1e-4);
        assert_eq!(target.y, 0.0);

        // An existing target is kept while the search goes on
        run(&mut rabbit, &PerceptionSnapshot::default(), Role::Prey, 0.1);
        assert_eq!(rabbit.movement.target, Some(target));
    }

    #[test]
    fn starving_agents_switch_to_searching() {
        let mut rabbit = agent(Species::Rabbit);
        rabbit.ai = AiState::new(AiMode::Wandering);
        rabbit.movement.target = Some(Vec3::new(3.0, 0.0, 0.0));
        rabbit.creature.set_energy(20.0);

        run(&mut rabbit, &PerceptionSnapshot::default(), Role::Prey, 0.1);
        assert_eq!(rabbit.ai.current, AiMode::Searching);
        assert_eq!(rabbit.ai.previous, AiMode::Wandering);
    }

    #[test]
    fn wandering_times_out() {
        let mut rabbit = agent(Species::Rabbit);
        rabbit.ai = AiState::new(AiMode::Wandering);
        rabbit.ai.state_timer = 8.5;
        rabbit.movement.target = Some(Vec3::new(3.0, 0.0, 0.0));

        run(&mut rabbit, &PerceptionSnapshot::default(), Role::Prey, 0.1);
        assert_eq!(rabbit.ai.current, AiMode::Idle);
    }

    #[test]
    fn metabolism_and_age_advance_every_tick() {
        let mut rabbit = agent(Species::Rabbit);
        rabbit.creature.hunger_rate = 8.0;
        rabbit.creature.set_energy(80.0);
        rabbit.ai = AiState::new(AiMode::Sleeping);
        rabbit.ai.cooldown = 0.05;

        run(&mut rabbit, &PerceptionSnapshot::default(), Role::Prey, 0.5);

        assert_eq!(rabbit.ai.current, AiMode::Sleeping);
        assert_eq!(rabbit.creature.energy(), 76.0);
        assert_eq!(rabbit.creature.age, 0.5);
        assert_eq!(rabbit.ai.cooldown, 0.0);
        assert_eq!(rabbit.ai.state_timer, 0.5);
    }

    #[test]
    fn decisions_are_reproducible() {
        let make = || {
            let mut rabbit = agent(Species::Rabbit);
            rabbit.creature.set_energy(95.0);
            rabbit.ai.state_timer = 4.0;
            rabbit
        };
        let mut a = make();
        let mut b = make();
        run(&mut a, &PerceptionSnapshot::default(), Role::Prey, 0.1);
        run(&mut b, &PerceptionSnapshot::default(), Role::Prey, 0.1);
        assert_eq!(a.ai, b.ai);
        assert_eq!(a.movement, b.movement);
    }
}

use crate::organisms::components::*;
use crate::utils::{seeded_rng, RngStream};
use crate::world::TickClock;
use bevy::prelude::*;
use glam::{Quat, Vec3};

/// Closer than this to the target counts as arrived
pub const ARRIVAL_DISTANCE: f32 = 0.5;
/// Displacement per tick below which an agent counts as standing still
pub const MOVING_THRESHOLD: f32 = 0.01;
const ACCELERATION_RATE: f32 = 5.0;
const FLEE_JITTER: f32 = 0.2;
/// Turning is skipped below this speed so a stopped agent keeps its heading
const MIN_TURN_SPEED: f32 = 0.1;

/// Shape the desired velocity according to the agent's gait
pub fn apply_pattern(desired: Vec3, movement: &Movement, position: Vec3, elapsed: f32) -> Vec3 {
    match movement.pattern {
        MovementPattern::Flee => {
            // Panic: faster, with a little noise on the ground plane
            let mut rng = seeded_rng(position, elapsed, RngStream::FleeJitter);
            let noise = Vec3::new(
                (rng.f32() * 2.0 - 1.0) * FLEE_JITTER,
                0.0,
                (rng.f32() * 2.0 - 1.0) * FLEE_JITTER,
            );
            desired * 1.5 + noise
        }
        MovementPattern::Follow => desired * 1.2,
        MovementPattern::Patrol => desired.normalize_or_zero() * (movement.max_speed * 0.7),
        MovementPattern::Direct
        | MovementPattern::Zigzag
        | MovementPattern::Circle
        | MovementPattern::Random => desired,
    }
}

/// Yaw that faces along `velocity` (+Z is forward)
fn facing(velocity: Vec3) -> Quat {
    Quat::from_rotation_y(velocity.x.atan2(velocity.z))
}

/// Advance one agent's motion by `dt` seconds
pub fn integrate_movement(
    position: &mut Vec3,
    orientation: &mut Quat,
    movement: &mut Movement,
    dt: f32,
    elapsed: f32,
) {
    if let Some(target) = movement.target {
        let to_target = target - *position;
        if to_target.length() < ARRIVAL_DISTANCE {
            movement.target = None;
            movement.velocity = Vec3::ZERO;
        } else {
            let desired = to_target.normalize_or_zero() * movement.max_speed;
            let desired = apply_pattern(desired, movement, *position, elapsed);
            let blend = (ACCELERATION_RATE * dt).min(1.0);
            movement.velocity = movement.velocity.lerp(desired, blend);

            if movement.velocity.length() > MIN_TURN_SPEED {
                let turn = (movement.rotation_speed * dt).clamp(0.0, 1.0);
                *orientation = orientation.slerp(facing(movement.velocity), turn);
            }
        }
    }

    movement.last_position = *position;
    *position += movement.velocity * dt;
    position.y = 0.0;
    movement.pattern_timer += dt;

    let moved = position.distance(movement.last_position);
    movement.is_moving = moved > MOVING_THRESHOLD;
    movement.current_speed = if dt > 0.0 {
        (moved / dt).min(movement.max_speed)
    } else {
        movement.current_speed.min(movement.max_speed)
    };
}

/// Movement pass over every agent, in parallel
pub fn update_movement(
    mut agents: Query<(&mut Position, &mut Orientation, &mut Movement)>,
    clock: Res<TickClock>,
) {
    let dt = clock.delta_seconds;
    let elapsed = clock.elapsed_seconds;

    agents
        .par_iter_mut()
        .for_each(|(mut position, mut orientation, mut movement)| {
            integrate_movement(
                &mut position.0,
                &mut orientation.0,
                &mut movement,
                dt,
                elapsed,
            );
        });
}

use crate::organisms::components::*;
use crate::world::FoodSource;
use bevy::prelude::*;
use glam::Vec3;

/// Positions of everything agents react to, captured once per tick before the
/// decision pass and only read during it.
#[derive(Resource, Debug, Clone, Default)]
pub struct PerceptionSnapshot {
    pub predators: Vec<(Entity, Vec3)>,
    /// Food sources that are currently edible
    pub food: Vec<(Entity, Vec3)>,
}

/// A sensed entity with its distance from the observer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    pub entity: Entity,
    pub position: Vec3,
    pub distance: f32,
}

fn nearest(entries: &[(Entity, Vec3)], from: Vec3, skip: Option<Entity>) -> Option<Sighting> {
    entries
        .iter()
        .filter(|(entity, _)| Some(*entity) != skip)
        .map(|(entity, position)| Sighting {
            entity: *entity,
            position: *position,
            distance: from.distance(*position),
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

impl PerceptionSnapshot {
    /// Closest predator other than `observer`
    pub fn nearest_predator(&self, from: Vec3, observer: Entity) -> Option<Sighting> {
        nearest(&self.predators, from, Some(observer))
    }

    pub fn nearest_food_within(&self, from: Vec3, range: f32) -> Option<Sighting> {
        nearest(&self.food, from, None).filter(|s| s.distance < range)
    }

    /// Whether `food` was still edible when the snapshot was taken
    pub fn food_available(&self, food: Entity) -> bool {
        self.food.iter().any(|(entity, _)| *entity == food)
    }
}

/// Clear and rebuild the snapshot each tick
pub fn refresh_perception_snapshot(
    mut snapshot: ResMut<PerceptionSnapshot>,
    predators: Query<(Entity, &Position), With<Predator>>,
    food: Query<(Entity, &Position, &FoodSource)>,
) {
    snapshot.predators.clear();
    snapshot.food.clear();

    snapshot
        .predators
        .extend(predators.iter().map(|(entity, position)| (entity, position.0)));
    snapshot.food.extend(
        food.iter()
            .filter(|(_, _, source)| !source.is_consumed)
            .map(|(entity, position, _)| (entity, position.0)),
    );
}

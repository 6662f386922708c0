mod food;

use crate::organisms::EcosystemTuning;
use crate::SimulationSet;
use bevy::prelude::*;
use bevy::time::Time;

pub use food::*;

/// Timing of the tick currently being simulated
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct TickClock {
    /// Number of ticks started so far (1 during the first tick)
    pub tick: u64,
    pub delta_seconds: f32,
    /// Simulated seconds including this tick
    pub elapsed_seconds: f32,
}

impl TickClock {
    pub fn advance(&mut self, delta_seconds: f32) {
        let delta = if delta_seconds.is_finite() {
            delta_seconds.max(0.0)
        } else {
            0.0
        };
        self.tick += 1;
        self.delta_seconds = delta;
        self.elapsed_seconds += delta;
    }
}

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TickClock>()
            .add_systems(Update, advance_clock.in_set(SimulationSet::Clock))
            .add_systems(Update, regenerate_food.in_set(SimulationSet::Environment));
    }
}

/// Start a new tick: fixed delta from tuning when configured, otherwise the
/// frame delta reported by Bevy
fn advance_clock(
    mut clock: ResMut<TickClock>,
    time: Option<Res<Time>>,
    tuning: Option<Res<EcosystemTuning>>,
) {
    let delta = tuning
        .and_then(|t| t.fixed_delta)
        .or_else(|| time.map(|t| t.delta_seconds()))
        .unwrap_or(0.0);
    clock.advance(delta);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_accumulates_and_rejects_bad_deltas() {
        let mut clock = TickClock::default();
        clock.advance(0.5);
        clock.advance(0.25);
        assert_eq!(clock.tick, 2);
        assert_eq!(clock.delta_seconds, 0.25);
        assert_eq!(clock.elapsed_seconds, 0.75);

        clock.advance(f32::NAN);
        assert_eq!(clock.delta_seconds, 0.0);
        clock.advance(-1.0);
        assert_eq!(clock.delta_seconds, 0.0);
        assert_eq!(clock.elapsed_seconds, 0.75);
        assert_eq!(clock.tick, 4);
    }
}

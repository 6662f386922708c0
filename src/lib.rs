pub mod error;
pub mod organisms;
pub mod utils;
pub mod world;

use bevy::prelude::*;

pub use error::EcosystemError;
pub use organisms::{EcosystemStats, EcosystemTuning, OrganismPlugin};
pub use world::{TickClock, WorldPlugin};

/// Phases of one simulation tick, run strictly in this order
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Clock,
    Environment,
    Perception,
    Decision,
    Movement,
    Lifecycle,
    Reproduction,
    /// Buffered spawns/destroys/edits are applied here
    Apply,
    Report,
}

/// World and organisms together, with the tick phases chained
pub struct EcosystemPlugin;

impl Plugin for EcosystemPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                SimulationSet::Clock,
                SimulationSet::Environment,
                SimulationSet::Perception,
                SimulationSet::Decision,
                SimulationSet::Movement,
                SimulationSet::Lifecycle,
                SimulationSet::Reproduction,
                SimulationSet::Apply,
                SimulationSet::Report,
            )
                .chain(),
        )
        .add_plugins((WorldPlugin, OrganismPlugin));
    }
}

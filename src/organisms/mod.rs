mod behavior;
mod commands;
mod components;
mod ecosystem_stats;
mod lifecycle;
mod movement;
mod perception;
mod reproduction;
mod species;
mod systems;
mod tuning;


use crate::SimulationSet;
use bevy::prelude::*;

pub use behavior::*;
pub use commands::*;
pub use components::*;
pub use ecosystem_stats::*;
pub use lifecycle::*;
pub use movement::*;
pub use perception::*;
pub use reproduction::*;
pub use species::*;
pub use systems::*;
pub use tuning::*;

pub struct OrganismPlugin;

impl Plugin for OrganismPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EcosystemTuning>()
            .init_resource::<PerceptionSnapshot>()
            .init_resource::<StructuralChangeBuffer>()
            .init_resource::<PopulationEvents>()
            .init_resource::<EcosystemStats>()
            .init_resource::<TrackedOrganism>()
            .add_systems(Startup, systems::spawn_initial_population)
            .add_systems(
                Update,
                (
                    systems::auto_balance.in_set(SimulationSet::Environment),
                    perception::refresh_perception_snapshot.in_set(SimulationSet::Perception),
                    behavior::update_decisions.in_set(SimulationSet::Decision),
                    movement::update_movement.in_set(SimulationSet::Movement),
                    lifecycle::update_lifecycle.in_set(SimulationSet::Lifecycle),
                    reproduction::update_reproduction.in_set(SimulationSet::Reproduction),
                    commands::apply_structural_changes.in_set(SimulationSet::Apply),
                    (
                        ecosystem_stats::collect_ecosystem_stats,
                        systems::log_tracked_organism,
                    )
                        .chain()
                        .in_set(SimulationSet::Report),
                ),
            );
    }
}

pub mod rng;

pub use rng::{random_planar_direction, seed_for, seeded_rng, RngStream};

use glam::Vec3;
use std::f32::consts::TAU;

/// Call-site salts so independent draws taken from the same agent on the same
/// tick do not share a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum RngStream {
    IdleChoice = 0x1D1E,
    WanderJitter = 0x3A4D,
    RandomTarget = 0x7A26,
    FleeJitter = 0xF1EE,
    Litter = 0xB127,
    Conception = 0xC0CE,
}

/// SplitMix64 finalizer.
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed derived only from where the agent is and when the draw happens.
///
/// Two calls with the same inputs always agree, no matter which worker thread
/// makes them or in what order, so parallel passes stay reproducible.
pub fn seed_for(position: Vec3, elapsed: f32, stream: RngStream) -> u64 {
    let x = position.x.to_bits() as u64;
    let z = position.z.to_bits() as u64;
    let t = elapsed.to_bits() as u64;
    let mut h = mix(stream as u64);
    h = mix(h ^ x);
    h = mix(h ^ (z << 1));
    mix(h ^ (t << 2))
}

/// Fresh generator for a single call site. Never share one across agents.
pub fn seeded_rng(position: Vec3, elapsed: f32, stream: RngStream) -> fastrand::Rng {
    fastrand::Rng::with_seed(seed_for(position, elapsed, stream))
}

/// Unit direction on the XZ ground plane.
pub fn random_planar_direction(rng: &mut fastrand::Rng) -> Vec3 {
    let angle = rng.f32() * TAU;
    Vec3::new(angle.cos(), 0.0, angle.sin())
}

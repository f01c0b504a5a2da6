//! Core deterministic primitives.
//!
//! Leaf types shared by every gameplay module: vectors, the seeded RNG,
//! countdown timers and state hashing.

pub mod vec3;
pub mod rng;
pub mod timer;
pub mod hash;

// Re-export core types
pub use vec3::Vec3;
pub use rng::DeterministicRng;
pub use timer::Cooldown;
pub use hash::{compute_state_hash, StateHash};

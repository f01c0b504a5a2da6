//! # Tidecaller Simulation Core
//!
//! Deterministic combat and round simulation for Tidecaller, a wave-survival
//! game where a water mage holds off escalating waves of fire creatures.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   TIDECALLER SIMULATION                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── vec3.rs     - 3D vector math                            │
//! │  ├── timer.rs    - Countdown timers                          │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Session logic                             │
//! │  ├── ability.rs  - Ability slots and casts                   │
//! │  ├── effect.rs   - Water effect flights                      │
//! │  ├── combat.rs   - Damage and knockback                      │
//! │  ├── enemy.rs    - Enemy behaviour                           │
//! │  ├── round.rs    - Wave director                             │
//! │  ├── economy.rs  - Rewards and perks                         │
//! │  ├── fire.rs     - Fire hazards                              │
//! │  ├── world.rs    - Host collaborators and sandbox            │
//! │  ├── tick.rs     - Authoritative simulation loop             │
//! │  └── session.rs  - Host-facing facade                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Given an identical seed, intent stream, contact stream and `dt`
//! sequence, the simulation produces identical state hashes:
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies
//! - All randomness from seeded Xorshift128+
//!
//! Rendering, audio, physics and navigation stay with the host behind the
//! [`game::world::World`] traits.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use core::rng::DeterministicRng;
pub use core::vec3::Vec3;
pub use game::config::SessionConfig;
pub use game::intent::Intent;
pub use game::session::Session;
pub use game::state::{ActorId, SessionId};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;

/// Seconds per tick at [`TICK_RATE`]
pub const TICK_DT: f32 = 1.0 / TICK_RATE as f32;

//! Game Logic Module
//!
//! All session simulation code. Deterministic for a given seed, intent
//! stream and `dt` sequence.
//!
//! ## Module Structure
//!
//! - `config`: Session configuration, loading and validation
//! - `state`: Session, player and enemy state
//! - `intent`: Player intents and per-tick buffering
//! - `ability`: Ability slots, cooldowns and casts
//! - `effect`: Water ball, bend and tube flights
//! - `combat`: Damage, knockback and area resolution
//! - `enemy`: Chase, cornering and attack behaviour
//! - `round`: Wave director and enemy selection
//! - `economy`: Rewards, perks and statistics
//! - `fire`: Fire hazards
//! - `world`: Host collaborator traits and the headless sandbox
//! - `tick`: Authoritative simulation loop
//! - `session`: Host-facing facade
//! - `events`: Game events for replay/verification

pub mod ability;
pub mod combat;
pub mod config;
pub mod economy;
pub mod effect;
pub mod enemy;
pub mod events;
pub mod fire;
pub mod intent;
pub mod round;
pub mod session;
pub mod state;
pub mod tick;
pub mod world;

// Re-export key types
pub use ability::{AbilityKind, AbilityStatus};
pub use config::{ConfigError, EnemySpec, SessionConfig};
pub use economy::{Economy, PerkKind, ProgressionSink, PurchaseError};
pub use events::{GameEvent, GameEventData};
pub use intent::{Intent, IntentFrame};
pub use round::RoundStatus;
pub use session::{HealthStatus, Session};
pub use state::{ActorId, EffectId, FireId, SessionId, SessionState};
pub use tick::{TickInputs, TickResult};
pub use world::{Contact, ContactTarget, SandboxWorld, World, WorldCommands, WorldQuery};

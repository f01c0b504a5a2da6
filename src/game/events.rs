//! Session Events
//!
//! Notifications generated during simulation for the host (HUD, audio,
//! analytics) and for replay comparison. Drained once per tick.

use serde::{Serialize, Deserialize};
use crate::core::vec3::Vec3;
use crate::game::ability::AbilityKind;
use crate::game::economy::PerkKind;
use crate::game::state::{ActorId, EffectId, FireId};

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Deaths first
    Death = 0,
    /// Then damage readouts
    Damage = 1,
    /// Then knockback
    Knockback = 2,
    /// Then abilities and their effects
    AbilityEffect = 3,
    /// Then rewards (fires, perks)
    Economy = 4,
    /// Then wave flow
    Round = 5,
    /// Lowest priority
    Other = 255,
}

/// Session event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Damage landed on an enemy or player
    DamageApplied {
        target: ActorId,
        amount: f32,
        critical: bool,
    },

    /// Enemy died
    Death {
        target: ActorId,
        headshot: bool,
    },

    /// Player health reached zero
    PlayerDied {
        player: ActorId,
    },

    /// Knockback impulse applied
    KnockbackApplied {
        target: ActorId,
        impulse: Vec3,
    },

    /// Ability activated
    AbilityUsed {
        player: ActorId,
        ability: AbilityKind,
    },

    /// Water ball reached its target
    ProjectileImpact {
        effect: EffectId,
        position: Vec3,
    },

    /// Enemy entered the simulation
    EnemySpawned {
        enemy: ActorId,
        spec: String,
        position: Vec3,
    },

    /// Enemy removed after its death grace
    EnemyDespawned {
        enemy: ActorId,
    },

    /// Round began spawning
    RoundStarted {
        round: u32,
        enemies_target: u32,
    },

    /// All enemies of the round spawned and died
    RoundCompleted {
        round: u32,
    },

    /// Fire put out
    FireExtinguished {
        fire: FireId,
    },

    /// Fire burning again
    FireReignited {
        fire: FireId,
    },

    /// Perk bought from the shop
    PerkPurchased {
        player: ActorId,
        perk: PerkKind,
        cost: u32,
    },
}

/// A session event with timing and priority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Processing priority
    pub priority: EventPriority,

    /// Actor involved (for tie-breaking)
    pub actor: Option<ActorId>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, priority: EventPriority, data: GameEventData) -> Self {
        let actor = match &data {
            GameEventData::DamageApplied { target, .. } => Some(*target),
            GameEventData::Death { target, .. } => Some(*target),
            GameEventData::PlayerDied { player } => Some(*player),
            GameEventData::KnockbackApplied { target, .. } => Some(*target),
            GameEventData::AbilityUsed { player, .. } => Some(*player),
            GameEventData::EnemySpawned { enemy, .. } => Some(*enemy),
            GameEventData::EnemyDespawned { enemy } => Some(*enemy),
            GameEventData::PerkPurchased { player, .. } => Some(*player),
            _ => None,
        };

        Self {
            tick,
            priority,
            actor,
            data,
        }
    }

    /// Create damage applied event.
    pub fn damage_applied(tick: u32, target: ActorId, amount: f32, critical: bool) -> Self {
        Self::new(
            tick,
            EventPriority::Damage,
            GameEventData::DamageApplied {
                target,
                amount,
                critical,
            },
        )
    }

    /// Create enemy death event.
    pub fn death(tick: u32, target: ActorId, headshot: bool) -> Self {
        Self::new(tick, EventPriority::Death, GameEventData::Death { target, headshot })
    }

    /// Create player died event.
    pub fn player_died(tick: u32, player: ActorId) -> Self {
        Self::new(tick, EventPriority::Death, GameEventData::PlayerDied { player })
    }

    /// Create knockback applied event.
    pub fn knockback_applied(tick: u32, target: ActorId, impulse: Vec3) -> Self {
        Self::new(
            tick,
            EventPriority::Knockback,
            GameEventData::KnockbackApplied { target, impulse },
        )
    }

    /// Create ability used event.
    pub fn ability_used(tick: u32, player: ActorId, ability: AbilityKind) -> Self {
        Self::new(
            tick,
            EventPriority::AbilityEffect,
            GameEventData::AbilityUsed { player, ability },
        )
    }

    /// Create projectile impact event.
    pub fn projectile_impact(tick: u32, effect: EffectId, position: Vec3) -> Self {
        Self::new(
            tick,
            EventPriority::AbilityEffect,
            GameEventData::ProjectileImpact { effect, position },
        )
    }

    /// Create enemy spawned event.
    pub fn enemy_spawned(tick: u32, enemy: ActorId, spec: &str, position: Vec3) -> Self {
        Self::new(
            tick,
            EventPriority::Round,
            GameEventData::EnemySpawned {
                enemy,
                spec: spec.to_string(),
                position,
            },
        )
    }

    /// Create enemy despawned event.
    pub fn enemy_despawned(tick: u32, enemy: ActorId) -> Self {
        Self::new(tick, EventPriority::Other, GameEventData::EnemyDespawned { enemy })
    }

    /// Create round started event.
    pub fn round_started(tick: u32, round: u32, enemies_target: u32) -> Self {
        Self::new(
            tick,
            EventPriority::Round,
            GameEventData::RoundStarted {
                round,
                enemies_target,
            },
        )
    }

    /// Create round completed event.
    pub fn round_completed(tick: u32, round: u32) -> Self {
        Self::new(tick, EventPriority::Round, GameEventData::RoundCompleted { round })
    }

    /// Create fire extinguished event.
    pub fn fire_extinguished(tick: u32, fire: FireId) -> Self {
        Self::new(tick, EventPriority::Economy, GameEventData::FireExtinguished { fire })
    }

    /// Create fire reignited event.
    pub fn fire_reignited(tick: u32, fire: FireId) -> Self {
        Self::new(tick, EventPriority::Other, GameEventData::FireReignited { fire })
    }

    /// Create perk purchased event.
    pub fn perk_purchased(tick: u32, player: ActorId, perk: PerkKind, cost: u32) -> Self {
        Self::new(
            tick,
            EventPriority::Economy,
            GameEventData::PerkPurchased { player, perk, cost },
        )
    }
}

impl PartialEq for GameEvent {
    fn eq(&self, other: &Self) -> bool {
        self.tick == other.tick
            && self.priority == other.priority
            && self.actor == other.actor
    }
}

impl Eq for GameEvent {}

impl PartialOrd for GameEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GameEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Sort by: tick, then priority, then actor
        self.tick
            .cmp(&other.tick)
            .then(self.priority.cmp(&other.priority))
            .then(self.actor.cmp(&other.actor))
    }
}

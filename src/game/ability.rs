//! Water Abilities
//!
//! Per-player ability slots with cooldown and cast state machines.
//!
//! Each slot moves `Idle -> Active -> Cooling -> Idle`. Instant slots
//! (`cast_time == 0`) skip `Active` and emit their command on invocation.
//! Only one non-instant slot may be `Active` at a time.
//!
//! The scheduler never touches the world. It hands back [`AbilityCommand`]s
//! that the tick resolves into effects.

use serde::{Serialize, Deserialize};
use tracing::trace;

use crate::core::timer::Cooldown;
use crate::core::vec3::Vec3;
use crate::game::config::AbilityConfig;
use crate::game::state::EffectId;

/// Quick Draw cooldown floor.
pub const MIN_COOLDOWN: f32 = 0.01;

/// Ability slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AbilityKind {
    /// Primary attack: carried then thrown water ball
    WaterBall = 0,
    /// Ability 1: curling water bend, area damage at the target
    WaterBend = 1,
    /// Ability 2: water tube, area damage at the target
    WaterTube = 2,
}

impl AbilityKind {
    /// All slots in slot order.
    pub const ALL: [AbilityKind; 3] = [
        AbilityKind::WaterBall,
        AbilityKind::WaterBend,
        AbilityKind::WaterTube,
    ];

    /// Slot index.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Config / log name.
    pub fn name(self) -> &'static str {
        match self {
            AbilityKind::WaterBall => "water_ball",
            AbilityKind::WaterBend => "water_bend",
            AbilityKind::WaterTube => "water_tube",
        }
    }

    /// Whether the slot is available without a perk.
    pub fn starts_unlocked(self) -> bool {
        matches!(self, AbilityKind::WaterBall)
    }
}

/// Effect request produced by an activation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum AbilityCommand {
    /// Create a water ball held in front of the caster
    CreateCarried,
    /// Throw the held water ball at a target
    Release { effect: EffectId, target: Vec3 },
    /// Spawn a water bend travelling to a target
    SpawnBend { target: Vec3 },
    /// Spawn a water tube travelling to a target
    SpawnTube { target: Vec3 },
}

/// Slot phase.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum AbilityPhase {
    /// Ready once the cooldown is zero
    Idle,
    /// Casting; `cast` is emitted when `remaining` reaches zero
    Active { remaining: f32, cast: AbilityCommand },
    /// Waiting out the cooldown
    Cooling,
}

/// Water ball carry sub-state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarryState {
    /// Nothing held; next primary attack creates a ball
    #[default]
    Empty,
    /// A ball is held; next primary attack throws it
    Carrying(EffectId),
}

/// Result of a successful invocation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Activation {
    /// Command ready for the resolver now
    Fired(AbilityCommand),
    /// Cast started; the command comes out of [`AbilityScheduler::tick`]
    Casting,
}

/// Host-facing view of one slot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityStatus {
    /// Seconds until the slot can fire again
    pub cooldown_remaining: f32,
    /// Full cooldown length
    pub cooldown_max: f32,
    /// Whether the slot can be used at all
    pub unlocked: bool,
    /// Whether the slot is mid-cast
    pub casting: bool,
}

/// One ability slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityState {
    /// Slot kind
    pub kind: AbilityKind,
    /// Cooldown countdown
    pub cooldown: Cooldown,
    /// Seconds spent in `Active` before the command is emitted
    pub cast_time: f32,
    /// Whether the slot is usable
    pub unlocked: bool,
    /// Current phase
    pub phase: AbilityPhase,
}

impl AbilityState {
    /// Create an idle slot.
    pub fn new(kind: AbilityKind, cooldown: f32, cast_time: f32, unlocked: bool) -> Self {
        Self {
            kind,
            cooldown: Cooldown::new(cooldown),
            cast_time: if cast_time.is_finite() { cast_time.max(0.0) } else { 0.0 },
            unlocked,
            phase: AbilityPhase::Idle,
        }
    }

    /// Check if the slot emits on invocation.
    #[inline]
    pub fn is_instant(&self) -> bool {
        self.cast_time <= 0.0
    }

    /// Check if the slot is mid-cast.
    #[inline]
    pub fn is_casting(&self) -> bool {
        matches!(self.phase, AbilityPhase::Active { .. })
    }

    /// Advance one tick. Returns the command of a cast that just completed.
    fn tick(&mut self, dt: f32) -> Option<AbilityCommand> {
        match self.phase {
            AbilityPhase::Idle => None,
            AbilityPhase::Active { remaining, cast } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.cooldown.restart();
                    self.phase = AbilityPhase::Cooling;
                    Some(cast)
                } else {
                    self.phase = AbilityPhase::Active { remaining, cast };
                    None
                }
            }
            AbilityPhase::Cooling => {
                self.cooldown.tick(dt);
                if self.cooldown.is_ready() {
                    self.phase = AbilityPhase::Idle;
                }
                None
            }
        }
    }
}

/// All ability slots of one player plus the water ball carry state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityScheduler {
    slots: [AbilityState; 3],
    carry: CarryState,
}

impl AbilityScheduler {
    /// Create slots from config. Only the water ball starts unlocked.
    pub fn new(config: &AbilityConfig) -> Self {
        let slot = |kind: AbilityKind| {
            let tuning = config.tuning(kind);
            AbilityState::new(kind, tuning.cooldown, tuning.cast_time, kind.starts_unlocked())
        };

        Self {
            slots: AbilityKind::ALL.map(slot),
            carry: CarryState::Empty,
        }
    }

    /// Get a slot.
    #[inline]
    pub fn slot(&self, kind: AbilityKind) -> &AbilityState {
        &self.slots[kind.index()]
    }

    /// Check if any slot is mid-cast.
    pub fn is_casting(&self) -> bool {
        self.slots.iter().any(AbilityState::is_casting)
    }

    /// Current carry state.
    #[inline]
    pub fn carry(&self) -> CarryState {
        self.carry
    }

    /// Try to use a slot.
    ///
    /// Refused (returns `None`, state untouched) when the slot is locked,
    /// cooling down, or a non-instant slot is invoked while another cast
    /// is in progress.
    pub fn invoke(&mut self, kind: AbilityKind, aim: Vec3) -> Option<Activation> {
        let casting = self.is_casting();
        let slot = &self.slots[kind.index()];

        if !slot.unlocked {
            trace!(ability = kind.name(), "invocation refused: locked");
            return None;
        }
        if !slot.cooldown.is_ready() {
            trace!(
                ability = kind.name(),
                remaining = slot.cooldown.remaining(),
                "invocation refused: cooling down"
            );
            return None;
        }
        if !slot.is_instant() && casting {
            trace!(ability = kind.name(), "invocation refused: already casting");
            return None;
        }

        let command = match kind {
            AbilityKind::WaterBall => match self.carry {
                CarryState::Empty => AbilityCommand::CreateCarried,
                CarryState::Carrying(effect) => {
                    self.carry = CarryState::Empty;
                    AbilityCommand::Release { effect, target: aim }
                }
            },
            AbilityKind::WaterBend => AbilityCommand::SpawnBend { target: aim },
            AbilityKind::WaterTube => AbilityCommand::SpawnTube { target: aim },
        };

        let slot = &mut self.slots[kind.index()];
        if slot.is_instant() {
            slot.cooldown.restart();
            slot.phase = AbilityPhase::Cooling;
            Some(Activation::Fired(command))
        } else {
            slot.phase = AbilityPhase::Active {
                remaining: slot.cast_time,
                cast: command,
            };
            Some(Activation::Casting)
        }
    }

    /// Advance cooldowns and casts. Returns commands of casts completed this tick.
    pub fn tick(&mut self, dt: f32) -> Vec<(AbilityKind, AbilityCommand)> {
        let mut completed = Vec::new();
        for slot in &mut self.slots {
            if let Some(command) = slot.tick(dt) {
                completed.push((slot.kind, command));
            }
        }
        completed
    }

    /// Record the ball created for a `CreateCarried` command.
    pub fn attach_carried(&mut self, effect: EffectId) {
        self.carry = CarryState::Carrying(effect);
    }

    /// Forget a held ball that no longer exists.
    pub fn drop_carried(&mut self, effect: EffectId) {
        if self.carry == CarryState::Carrying(effect) {
            self.carry = CarryState::Empty;
        }
    }

    /// Host-facing status of one slot.
    pub fn status(&self, kind: AbilityKind) -> AbilityStatus {
        let slot = self.slot(kind);
        AbilityStatus {
            cooldown_remaining: slot.cooldown.remaining(),
            cooldown_max: slot.cooldown.max(),
            unlocked: slot.unlocked,
            casting: slot.is_casting(),
        }
    }

    /// Change a slot's cooldown length.
    pub fn set_cooldown_max(&mut self, kind: AbilityKind, max: f32) {
        self.slots[kind.index()].cooldown.set_max(max);
    }

    /// Make a slot usable.
    pub fn unlock(&mut self, kind: AbilityKind) {
        self.slots[kind.index()].unlocked = true;
    }
}

// =============================================================================
// TESTS
// =============================================================================

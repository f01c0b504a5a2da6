//! Player Intents
//!
//! Abstract player commands submitted by the host between ticks.
//! Raw device polling stays with the host; the core only sees intents.
//!
//! Intents for one actor are folded into a single [`IntentFrame`] per tick:
//! axis and look values keep the last submission, one-shot actions are
//! packed into flag bits.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::vec3::Vec3;
use crate::game::ability::AbilityKind;
use crate::game::state::ActorId;

/// A single player command.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    /// Movement axes in `[-1, 1]` (x = strafe right, z = forward)
    Move { x: f32, z: f32 },
    /// Absolute view angles in degrees
    Look { yaw: f32, pitch: f32 },
    /// Jump if grounded
    Jump,
    /// Hold or release sprint
    Sprint(bool),
    /// Water ball (create / release)
    PrimaryAttack,
    /// Water bend
    Ability1,
    /// Water tube
    Ability2,
    /// Interact with a nearby fire
    Interact,
    /// World-space aim point from the host's raycast
    AimAt(Vec3),
}

impl Intent {
    /// Ability slot triggered by this intent, if any.
    pub fn ability(&self) -> Option<AbilityKind> {
        match self {
            Intent::PrimaryAttack => Some(AbilityKind::WaterBall),
            Intent::Ability1 => Some(AbilityKind::WaterBend),
            Intent::Ability2 => Some(AbilityKind::WaterTube),
            _ => None,
        }
    }
}

/// All intents of one actor for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentFrame {
    /// Latest movement axes, if any were submitted
    pub movement: Option<(f32, f32)>,

    /// Latest view angles, if any were submitted
    pub look: Option<(f32, f32)>,

    /// Latest sprint toggle, if any was submitted
    pub sprint: Option<bool>,

    /// Latest aim point, if any was submitted
    pub aim: Option<Vec3>,

    /// Action flags (packed bits):
    /// - Bit 0: Jump
    /// - Bit 1: Primary attack
    /// - Bit 2: Ability 1
    /// - Bit 3: Ability 2
    /// - Bit 4: Interact
    pub flags: u8,
}

impl IntentFrame {
    /// Jump flag bit
    pub const FLAG_JUMP: u8 = 0x01;

    /// Primary attack flag bit
    pub const FLAG_PRIMARY: u8 = 0x02;

    /// Ability 1 flag bit
    pub const FLAG_ABILITY1: u8 = 0x04;

    /// Ability 2 flag bit
    pub const FLAG_ABILITY2: u8 = 0x08;

    /// Interact flag bit
    pub const FLAG_INTERACT: u8 = 0x10;

    /// Fold one intent into the frame.
    pub fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::Move { x, z } => {
                self.movement = Some((clamp_axis(x), clamp_axis(z)));
            }
            Intent::Look { yaw, pitch } => {
                if yaw.is_finite() && pitch.is_finite() {
                    self.look = Some((yaw, pitch));
                }
            }
            Intent::Jump => self.flags |= Self::FLAG_JUMP,
            Intent::Sprint(on) => self.sprint = Some(on),
            Intent::PrimaryAttack => self.flags |= Self::FLAG_PRIMARY,
            Intent::Ability1 => self.flags |= Self::FLAG_ABILITY1,
            Intent::Ability2 => self.flags |= Self::FLAG_ABILITY2,
            Intent::Interact => self.flags |= Self::FLAG_INTERACT,
            Intent::AimAt(point) => {
                if point.is_finite() {
                    self.aim = Some(point);
                }
            }
        }
    }

    /// Build a frame from a list of intents.
    pub fn from_intents(intents: &[Intent]) -> Self {
        let mut frame = Self::default();
        for intent in intents {
            frame.apply(*intent);
        }
        frame
    }

    /// Check if jump was requested this tick.
    #[inline]
    pub fn jump_pressed(&self) -> bool {
        self.flags & Self::FLAG_JUMP != 0
    }

    /// Check if interact was requested this tick.
    #[inline]
    pub fn interact_pressed(&self) -> bool {
        self.flags & Self::FLAG_INTERACT != 0
    }

    /// Ability slots requested this tick, in slot order.
    pub fn abilities_pressed(&self) -> impl Iterator<Item = AbilityKind> + '_ {
        [
            (Self::FLAG_PRIMARY, AbilityKind::WaterBall),
            (Self::FLAG_ABILITY1, AbilityKind::WaterBend),
            (Self::FLAG_ABILITY2, AbilityKind::WaterTube),
        ]
        .into_iter()
        .filter(move |(flag, _)| self.flags & flag != 0)
        .map(|(_, kind)| kind)
    }

    /// Check if the frame carries nothing.
    pub fn is_idle(&self) -> bool {
        self.movement.is_none()
            && self.look.is_none()
            && self.sprint.is_none()
            && self.aim.is_none()
            && self.flags == 0
    }
}

fn clamp_axis(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Intents queued between ticks, keyed by actor.
#[derive(Clone, Debug, Default)]
pub struct IntentBuffer {
    frames: BTreeMap<ActorId, IntentFrame>,
}

impl IntentBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an intent for the next tick.
    pub fn submit(&mut self, actor: ActorId, intent: Intent) {
        self.frames.entry(actor).or_default().apply(intent);
    }

    /// Take all queued frames, leaving the buffer empty.
    pub fn take(&mut self) -> BTreeMap<ActorId, IntentFrame> {
        std::mem::take(&mut self.frames)
    }

    /// Check if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_accumulate() {
        let frame = IntentFrame::from_intents(&[
            Intent::Jump,
            Intent::Ability2,
            Intent::PrimaryAttack,
        ]);

        assert!(frame.jump_pressed());
        assert!(!frame.interact_pressed());

        let abilities: Vec<_> = frame.abilities_pressed().collect();
        assert_eq!(abilities, vec![AbilityKind::WaterBall, AbilityKind::WaterTube]);
    }

    #[test]
    fn test_last_axis_wins_and_is_clamped() {
        let frame = IntentFrame::from_intents(&[
            Intent::Move { x: 0.5, z: 0.5 },
            Intent::Move { x: 3.0, z: f32::NAN },
        ]);

        assert_eq!(frame.movement, Some((1.0, 0.0)));
    }

    #[test]
    fn test_non_finite_aim_is_dropped() {
        let frame = IntentFrame::from_intents(&[Intent::AimAt(Vec3::new(f32::INFINITY, 0.0, 0.0))]);
        assert!(frame.aim.is_none());
        assert!(frame.is_idle());
    }

    #[test]
    fn test_intent_ability_mapping() {
        assert_eq!(Intent::PrimaryAttack.ability(), Some(AbilityKind::WaterBall));
        assert_eq!(Intent::Ability1.ability(), Some(AbilityKind::WaterBend));
        assert_eq!(Intent::Ability2.ability(), Some(AbilityKind::WaterTube));
        assert_eq!(Intent::Jump.ability(), None);
    }

    #[test]
    fn test_buffer_take_clears() {
        let mut buffer = IntentBuffer::new();
        buffer.submit(ActorId(2), Intent::Jump);
        buffer.submit(ActorId(1), Intent::Interact);
        buffer.submit(ActorId(2), Intent::Sprint(true));

        let frames = buffer.take();
        assert!(buffer.is_empty());

        let ids: Vec<_> = frames.keys().copied().collect();
        assert_eq!(ids, vec![ActorId(1), ActorId(2)]);
        assert_eq!(frames[&ActorId(2)].sprint, Some(true));
        assert!(frames[&ActorId(2)].jump_pressed());
    }
}

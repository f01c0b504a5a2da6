//! Ability Effects
//!
//! Core-owned water entities spawned by abilities. Each effect is an
//! explicit state machine advanced by [`Effect::advance`]; the tick turns
//! the returned [`EffectStep`] into combat calls and events.
//!
//! - Water ball: carried in front of the caster, thrown along a speed
//!   curve, damages per reported contact, lingers after impact.
//! - Water bend: rises from a puddle, curls toward the target, resolves
//!   its area once on arrival, lingers.
//! - Water tube: moves linearly to the target over a fixed duration,
//!   resolves its area once, lingers.

use serde::{Serialize, Deserialize};

use crate::core::timer::Cooldown;
use crate::core::vec3::Vec3;
use crate::game::ability::AbilityKind;
use crate::game::config::AbilityConfig;
use crate::game::state::{ActorId, EffectId};

/// Easing applied to water ball travel progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedCurve {
    /// Constant speed
    #[default]
    Linear,
    /// Slow start
    EaseIn,
    /// Slow finish
    EaseOut,
    /// Slow start and finish
    EaseInOut,
}

impl SpeedCurve {
    /// Map travel progress `t` in `[0, 1]` to path position.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            SpeedCurve::Linear => t,
            SpeedCurve::EaseIn => t * t,
            SpeedCurve::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            SpeedCurve::EaseInOut => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// Water ball flight phase.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum BallFlight {
    /// Held in front of the caster
    Carried,
    /// Thrown toward a target
    Travelling { start: Vec3, target: Vec3, progress: f32 },
    /// Reached the target
    Landed,
}

/// Water bend stage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum BendStage {
    /// Water gathering at the origin
    PuddleRise { progress: f32 },
    /// Water curling toward the target
    Travel { distance: f32, ramp: f32 },
    /// Area resolved
    Resolved,
}

/// Water bend flight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BendFlight {
    /// Where the water rises
    pub origin: Vec3,
    /// Area center
    pub target: Vec3,
    /// Current stage
    pub stage: BendStage,
    /// Curl side, -1 or +1
    pub curl: i8,
    /// Length of the curved path
    pub path_length: f32,
}

/// Water tube flight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TubeFlight {
    /// Spawn point
    pub start: Vec3,
    /// Area center
    pub target: Vec3,
    /// Seconds travelled
    pub elapsed: f32,
    /// One-shot guard for area resolution
    pub resolved: bool,
}

/// Per-kind effect data.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum EffectBody {
    /// Water ball
    Ball(BallFlight),
    /// Water bend
    Bend(BendFlight),
    /// Water tube
    Tube(TubeFlight),
}

/// What the tick must do after advancing an effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EffectStep {
    /// Nothing to resolve
    Moving,
    /// Water ball arrived; show the impact marker here
    Impact(Vec3),
    /// Resolve area damage around this point
    ResolveArea(Vec3),
    /// Linger elapsed; remove the effect
    Expired,
}

/// A live water effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    /// Effect id
    pub id: EffectId,
    /// Casting player
    pub owner: ActorId,
    /// Current position
    pub position: Vec3,
    /// Per-kind flight
    pub body: EffectBody,
    /// Countdown to removal once the effect has done its work
    pub linger: Option<Cooldown>,
}

impl Effect {
    /// Create a water ball held at `position`.
    pub fn carried_ball(id: EffectId, owner: ActorId, position: Vec3) -> Self {
        Self {
            id,
            owner,
            position,
            body: EffectBody::Ball(BallFlight::Carried),
            linger: None,
        }
    }

    /// Create a water bend from `origin` to `target`.
    pub fn bend(
        id: EffectId,
        owner: ActorId,
        origin: Vec3,
        target: Vec3,
        curl: i8,
        config: &AbilityConfig,
    ) -> Self {
        let path_length = origin.distance(target) * config.bend.path_factor;
        Self {
            id,
            owner,
            position: origin,
            body: EffectBody::Bend(BendFlight {
                origin,
                target,
                stage: BendStage::PuddleRise { progress: 0.0 },
                curl: if curl < 0 { -1 } else { 1 },
                path_length,
            }),
            linger: None,
        }
    }

    /// Create a water tube from `start` to `target`.
    pub fn tube(id: EffectId, owner: ActorId, start: Vec3, target: Vec3) -> Self {
        Self {
            id,
            owner,
            position: start,
            body: EffectBody::Tube(TubeFlight {
                start,
                target,
                elapsed: 0.0,
                resolved: false,
            }),
            linger: None,
        }
    }

    /// Ability that produced this effect.
    pub fn kind(&self) -> AbilityKind {
        match self.body {
            EffectBody::Ball(_) => AbilityKind::WaterBall,
            EffectBody::Bend(_) => AbilityKind::WaterBend,
            EffectBody::Tube(_) => AbilityKind::WaterTube,
        }
    }

    /// Check if this is a ball still in the caster's hands.
    pub fn is_carried(&self) -> bool {
        matches!(self.body, EffectBody::Ball(BallFlight::Carried))
    }

    /// Check if host-reported contacts damage through this effect.
    pub fn accepts_contacts(&self) -> bool {
        matches!(self.body, EffectBody::Ball(_))
    }

    /// Move a carried ball with the caster's viewpoint.
    pub fn follow(&mut self, position: Vec3) {
        if self.is_carried() {
            self.position = position;
        }
    }

    /// Throw a carried ball. Returns false if the ball was not carried.
    pub fn release(&mut self, target: Vec3) -> bool {
        if !self.is_carried() {
            return false;
        }
        self.body = EffectBody::Ball(BallFlight::Travelling {
            start: self.position,
            target,
            progress: 0.0,
        });
        true
    }

    /// Advance one tick.
    pub fn advance(&mut self, dt: f32, config: &AbilityConfig) -> EffectStep {
        if let Some(linger) = self.linger.as_mut() {
            linger.tick(dt);
            return if linger.is_ready() {
                EffectStep::Expired
            } else {
                EffectStep::Moving
            };
        }

        match &mut self.body {
            EffectBody::Ball(flight) => {
                let tuning = &config.projectile;
                let BallFlight::Travelling { start, target, progress } = flight else {
                    return EffectStep::Moving;
                };

                *progress += dt * tuning.speed;
                let (start, target, progress) = (*start, *target, *progress);
                self.position = start.lerp(target, tuning.curve.apply(progress));

                if progress >= 1.0 || self.position.distance(target) <= tuning.arrival_radius {
                    self.position = target;
                    *flight = BallFlight::Landed;
                    self.linger = Some(Cooldown::running(tuning.impact_grace));
                    return EffectStep::Impact(target);
                }
                EffectStep::Moving
            }

            EffectBody::Bend(flight) => {
                let tuning = &config.bend;
                match flight.stage {
                    BendStage::PuddleRise { progress } => {
                        let progress = (progress + dt * tuning.puddle_rate).min(1.0);
                        self.position = flight.origin + Vec3::UP.scale(progress - 1.0);
                        flight.stage = if progress >= 1.0 {
                            BendStage::Travel { distance: 0.0, ramp: 0.0 }
                        } else {
                            BendStage::PuddleRise { progress }
                        };
                        EffectStep::Moving
                    }
                    BendStage::Travel { distance, ramp } => {
                        let ramp = (ramp + tuning.ramp_rate * dt).min(1.0);
                        let distance = distance + dt * tuning.travel_speed * ramp;
                        let total = tuning.shape_length + flight.path_length;

                        if distance >= total {
                            self.position = flight.target;
                            flight.stage = BendStage::Resolved;
                            self.linger = Some(Cooldown::running(tuning.linger));
                            return EffectStep::ResolveArea(flight.target);
                        }

                        self.position = bend_point(flight, distance / total);
                        flight.stage = BendStage::Travel { distance, ramp };
                        EffectStep::Moving
                    }
                    BendStage::Resolved => EffectStep::Moving,
                }
            }

            EffectBody::Tube(flight) => {
                let tuning = &config.tube;
                flight.elapsed += dt;
                let t = (flight.elapsed / tuning.duration).min(1.0);
                self.position = flight.start.lerp(flight.target, t);

                if t >= 1.0 && !flight.resolved {
                    flight.resolved = true;
                    self.linger = Some(Cooldown::running(tuning.linger));
                    return EffectStep::ResolveArea(flight.target);
                }
                EffectStep::Moving
            }
        }
    }
}

/// Point along the curled bend path at share `s` of the way.
fn bend_point(flight: &BendFlight, s: f32) -> Vec3 {
    let s = s.clamp(0.0, 1.0);
    let straight = flight.target - flight.origin;
    let side = Vec3::UP.cross(straight.flatten()).normalize();
    let length = straight.length();
    let bulge = (flight.path_length - length).max(0.0) * 0.5;
    let arc = (s * std::f32::consts::PI).sin() * bulge * flight.curl as f32;
    flight.origin.lerp(flight.target, s) + side.scale(arc)
}

/// Where a carried ball sits for a caster's viewpoint.
pub fn carried_position(eye: Vec3, yaw: f32, pitch: f32, config: &AbilityConfig) -> Vec3 {
    let forward = Vec3::from_yaw_pitch(yaw, pitch);
    let right = Vec3::from_yaw_pitch(yaw + 90.0, 0.0);
    eye + forward.scale(config.projectile.hold_distance) + right.scale(config.projectile.hold_offset)
}

// =============================================================================
// TESTS
// =============================================================================

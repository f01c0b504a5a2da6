//! World Collaborators
//!
//! The core never owns physics, navigation or actor transforms. It talks
//! to the host through [`WorldQuery`] and [`WorldCommands`]; path requests
//! and impulses are fire-and-forget.
//!
//! [`SandboxWorld`] is an in-memory headless implementation with
//! brute-force overlap tests, straight-line navigation and damped impulses.
//! Tests, benches and the demo binary run against it.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::hash::{StateHash, StateHasher};
use crate::core::vec3::Vec3;
use crate::game::state::{ActorId, EffectId, FireId, SessionState};

/// Height of every sandbox body.
pub const BODY_HEIGHT: f32 = 2.0;

/// Share of body height above which a contact counts as a headshot.
pub const HEAD_LINE: f32 = 0.8;

/// Radius within which a water ball touches a fire.
pub const FIRE_CONTACT_RADIUS: f32 = 1.0;

// =============================================================================
// COLLABORATOR TRAITS
// =============================================================================

/// Spatial queries the core reads.
pub trait WorldQuery {
    /// Position (feet) of an actor, if it exists.
    fn position_of(&self, actor: ActorId) -> Option<Vec3>;

    /// Actors whose collision volume intersects the sphere, in any order.
    fn entities_within_sphere(&self, center: Vec3, radius: f32) -> Vec<ActorId>;

    /// Distance between two actors, if both exist.
    fn distance_between(&self, a: ActorId, b: ActorId) -> Option<f32> {
        Some(self.position_of(a)?.distance(self.position_of(b)?))
    }

    /// Whether an actor stands on the ground.
    fn is_grounded(&self, actor: ActorId) -> bool;
}

/// Enemy placement request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySpawn<'a> {
    /// Id allocated by the core
    pub id: ActorId,
    /// Catalog name (host picks the prefab)
    pub spec: &'a str,
    /// Spawn position
    pub position: Vec3,
    /// Navigation speed
    pub speed: f32,
    /// Collision radius
    pub radius: f32,
}

/// Commands the core issues.
pub trait WorldCommands {
    /// Place a new enemy.
    fn spawn_enemy(&mut self, spawn: &EnemySpawn<'_>);

    /// Remove an actor.
    fn despawn(&mut self, actor: ActorId);

    /// Ask navigation to path an actor toward a point.
    fn request_path(&mut self, actor: ActorId, destination: Vec3);

    /// Suspend or resume an actor's navigation.
    fn set_navigation_enabled(&mut self, actor: ActorId, enabled: bool);

    /// Push an actor.
    fn apply_impulse(&mut self, actor: ActorId, impulse: Vec3);

    /// Move an actor by a displacement (character controller).
    fn move_actor(&mut self, actor: ActorId, displacement: Vec3);
}

/// Everything the tick needs from the host.
pub trait World: WorldQuery + WorldCommands {}

impl<T: WorldQuery + WorldCommands + ?Sized> World for T {}

// =============================================================================
// CONTACTS
// =============================================================================

/// What a water ball touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ContactTarget {
    /// A player or enemy
    Actor(ActorId),
    /// A fire hazard
    Fire(FireId),
}

/// Physics contact reported by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// Effect that touched something
    pub effect: EffectId,
    /// What it touched
    pub target: ContactTarget,
    /// Whether the contact point was on the head
    pub headshot: bool,
}

// =============================================================================
// SANDBOX
// =============================================================================

#[derive(Clone, Debug)]
struct Body {
    position: Vec3,
    radius: f32,
    velocity: Vec3,
    speed: f32,
    destination: Option<Vec3>,
    navigation: bool,
}

impl Body {
    fn new(position: Vec3, radius: f32, speed: f32) -> Self {
        Self {
            position,
            radius,
            velocity: Vec3::ZERO,
            speed,
            destination: None,
            navigation: true,
        }
    }

    /// Distance from a point to the body's vertical capsule axis.
    fn gap_to(&self, point: Vec3) -> f32 {
        let axis_y = point.y.clamp(self.position.y, self.position.y + BODY_HEIGHT);
        let closest = Vec3::new(self.position.x, axis_y, self.position.z);
        point.distance(closest) - self.radius
    }
}

/// Headless in-memory world.
#[derive(Clone, Debug)]
pub struct SandboxWorld {
    bodies: BTreeMap<ActorId, Body>,
    ground_height: f32,
    impulse_damping: f32,
    stopping_distance: f32,
    touching: BTreeSet<(EffectId, ContactTarget)>,
}

impl Default for SandboxWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxWorld {
    /// Create an empty world with flat ground at y = 0.
    pub fn new() -> Self {
        Self {
            bodies: BTreeMap::new(),
            ground_height: 0.0,
            impulse_damping: 4.0,
            stopping_distance: 1.0,
            touching: BTreeSet::new(),
        }
    }

    /// Place a player body.
    pub fn add_player(&mut self, id: ActorId, position: Vec3) {
        let mut body = Body::new(position, 0.4, 0.0);
        body.navigation = false;
        self.bodies.insert(id, body);
    }

    /// Number of bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Check if an actor has a body.
    pub fn contains(&self, actor: ActorId) -> bool {
        self.bodies.contains_key(&actor)
    }

    /// Current navigation destination of an actor.
    pub fn destination_of(&self, actor: ActorId) -> Option<Vec3> {
        self.bodies.get(&actor).and_then(|b| b.destination)
    }

    /// Whether navigation is enabled for an actor.
    pub fn navigation_enabled(&self, actor: ActorId) -> bool {
        self.bodies.get(&actor).is_some_and(|b| b.navigation)
    }

    /// Pending impulse velocity of an actor.
    pub fn velocity_of(&self, actor: ActorId) -> Option<Vec3> {
        self.bodies.get(&actor).map(|b| b.velocity)
    }

    /// Teleport an actor.
    pub fn set_position(&mut self, actor: ActorId, position: Vec3) {
        if let Some(body) = self.bodies.get_mut(&actor) {
            body.position = position;
        }
    }

    /// Advance navigation and impulses by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let ground = self.ground_height;
        let damping = (1.0 - self.impulse_damping * dt).max(0.0);
        let stopping = self.stopping_distance;

        for body in self.bodies.values_mut() {
            if body.navigation {
                if let Some(destination) = body.destination {
                    let offset = (destination - body.position).flatten();
                    let distance = offset.length();
                    if distance > stopping {
                        let travel = (body.speed * dt).min(distance - stopping);
                        body.position += offset.normalize().scale(travel);
                    }
                }
            }

            body.position += body.velocity.scale(dt);
            body.velocity = body.velocity.scale(damping);
            if body.position.y < ground {
                body.position.y = ground;
            }
        }
    }

    /// Contacts between live water balls and bodies or fires.
    ///
    /// A contact is reported once when it begins; a ball must separate from
    /// a target before touching it again counts.
    pub fn projectile_contacts(&mut self, state: &SessionState, ball_radius: f32) -> Vec<Contact> {
        let mut current = BTreeSet::new();
        let mut contacts = Vec::new();

        for effect in state.effects.values() {
            if !effect.accepts_contacts() || effect.linger.is_some() {
                continue;
            }
            let ball = effect.position;

            for (id, enemy) in &state.enemies {
                if !enemy.is_alive() {
                    continue;
                }
                let Some(body) = self.bodies.get(id) else {
                    continue;
                };
                if body.gap_to(ball) > ball_radius {
                    continue;
                }
                let key = (effect.id, ContactTarget::Actor(*id));
                if !self.touching.contains(&key) {
                    contacts.push(Contact {
                        effect: effect.id,
                        target: key.1,
                        headshot: ball.y >= body.position.y + BODY_HEIGHT * HEAD_LINE,
                    });
                }
                current.insert(key);
            }

            for (id, fire) in &state.fires {
                if fire.extinguished || ball.distance(fire.position) > FIRE_CONTACT_RADIUS + ball_radius {
                    continue;
                }
                let key = (effect.id, ContactTarget::Fire(*id));
                if !self.touching.contains(&key) {
                    contacts.push(Contact {
                        effect: effect.id,
                        target: key.1,
                        headshot: false,
                    });
                }
                current.insert(key);
            }
        }

        self.touching = current;
        contacts
    }

    /// Hash body positions for replay checks.
    pub fn compute_hash(&self) -> StateHash {
        let mut hasher = StateHasher::new(b"TIDECALLER_SANDBOX_V1");
        for (id, body) in &self.bodies {
            hasher.update_u32(id.0);
            hasher.update_vec3(body.position);
            hasher.update_vec3(body.velocity);
            hasher.update_bool(body.navigation);
        }
        hasher.finalize()
    }
}

impl WorldQuery for SandboxWorld {
    fn position_of(&self, actor: ActorId) -> Option<Vec3> {
        self.bodies.get(&actor).map(|b| b.position)
    }

    fn entities_within_sphere(&self, center: Vec3, radius: f32) -> Vec<ActorId> {
        self.bodies
            .iter()
            .filter(|(_, body)| body.gap_to(center) <= radius)
            .map(|(id, _)| *id)
            .collect()
    }

    fn is_grounded(&self, actor: ActorId) -> bool {
        self.bodies
            .get(&actor)
            .is_some_and(|b| b.position.y <= self.ground_height + 1e-4)
    }
}

impl WorldCommands for SandboxWorld {
    fn spawn_enemy(&mut self, spawn: &EnemySpawn<'_>) {
        self.bodies
            .insert(spawn.id, Body::new(spawn.position, spawn.radius, spawn.speed));
    }

    fn despawn(&mut self, actor: ActorId) {
        self.bodies.remove(&actor);
        self.touching
            .retain(|(_, target)| *target != ContactTarget::Actor(actor));
    }

    fn request_path(&mut self, actor: ActorId, destination: Vec3) {
        if let Some(body) = self.bodies.get_mut(&actor) {
            body.destination = Some(destination);
        }
    }

    fn set_navigation_enabled(&mut self, actor: ActorId, enabled: bool) {
        if let Some(body) = self.bodies.get_mut(&actor) {
            body.navigation = enabled;
        }
    }

    fn apply_impulse(&mut self, actor: ActorId, impulse: Vec3) {
        if let Some(body) = self.bodies.get_mut(&actor) {
            body.velocity += impulse;
        }
    }

    fn move_actor(&mut self, actor: ActorId, displacement: Vec3) {
        let ground = self.ground_height;
        if let Some(body) = self.bodies.get_mut(&actor) {
            body.position += displacement;
            if body.position.y < ground {
                body.position.y = ground;
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

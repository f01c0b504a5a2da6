//! Fire Hazards
//!
//! Burning spots the player puts out with water for a reward. A fire
//! needs several hits (water ball contacts or interacting up close), then
//! reignites after a delay.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::timer::Cooldown;
use crate::core::vec3::Vec3;
use crate::game::config::FireConfig;
use crate::game::economy::ProgressionSink;
use crate::game::events::GameEvent;
use crate::game::state::{ActorId, FireId, SessionState};
use crate::game::world::WorldQuery;

/// State of one fire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FireState {
    /// Fire id
    pub id: FireId,
    /// Location
    pub position: Vec3,
    /// Water hits taken since it last (re)ignited
    pub hits: u32,
    /// Whether it is currently out
    pub extinguished: bool,
    /// Countdown until it burns again
    pub reignite: Cooldown,
}

impl FireState {
    /// Create a burning fire.
    pub fn new(id: FireId, position: Vec3) -> Self {
        Self {
            id,
            position,
            hits: 0,
            extinguished: false,
            reignite: Cooldown::default(),
        }
    }

    /// Count a water hit. Returns true if this hit put the fire out.
    pub fn register_hit(&mut self, config: &FireConfig) -> bool {
        if self.extinguished {
            return false;
        }
        self.hits += 1;
        if self.hits >= config.hits_to_extinguish {
            self.extinguished = true;
            self.hits = 0;
            self.reignite.start(config.reignite_delay);
            return true;
        }
        false
    }

    /// Advance the reignite countdown. Returns true if the fire relit.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.extinguished {
            return false;
        }
        self.reignite.tick(dt);
        if self.reignite.is_ready() {
            self.extinguished = false;
            return true;
        }
        false
    }
}

/// Apply one water hit to a fire, rewarding the extinguish.
pub fn hit_fire(
    state: &mut SessionState,
    sink: &mut dyn ProgressionSink,
    config: &FireConfig,
    fire: FireId,
) -> bool {
    let Some(fire_state) = state.fires.get_mut(&fire) else {
        return false;
    };
    if !fire_state.register_hit(config) {
        return false;
    }

    debug!(fire = fire.0, "Fire extinguished");
    sink.register_fire_extinguished();
    let event = GameEvent::fire_extinguished(state.tick, fire);
    state.push_event(event);
    true
}

/// Interact with the nearest burning fire in range of a player.
pub fn interact<W: WorldQuery + ?Sized>(
    state: &mut SessionState,
    world: &W,
    sink: &mut dyn ProgressionSink,
    config: &FireConfig,
    player: ActorId,
) -> Option<FireId> {
    let position = world.position_of(player)?;

    let nearest = state
        .fires
        .values()
        .filter(|fire| !fire.extinguished)
        .map(|fire| (fire.id, fire.position.distance(position)))
        .filter(|(_, distance)| *distance <= config.interaction_range)
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(id, _)| id)?;

    hit_fire(state, sink, config, nearest);
    Some(nearest)
}

/// Advance every reignite countdown.
pub fn tick_fires(state: &mut SessionState, dt: f32) {
    let tick = state.tick;
    let mut relit = Vec::new();
    for fire in state.fires.values_mut() {
        if fire.tick(dt) {
            relit.push(fire.id);
        }
    }
    for fire in relit {
        debug!(fire = fire.0, "Fire reignited");
        state.push_event(GameEvent::fire_reignited(tick, fire));
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! Session State Definitions
//!
//! All state types for session simulation.
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::hash::{compute_state_hash, StateHash, StateHasher};
use crate::core::rng::DeterministicRng;
use crate::core::timer::Cooldown;
use crate::core::vec3::Vec3;
use crate::game::ability::{AbilityScheduler, CarryState};
use crate::game::config::{EnemySpec, SessionConfig};
use crate::game::effect::{Effect, EffectBody};
use crate::game::events::GameEvent;
use crate::game::fire::FireState;
use crate::game::round::{RoundDirector, ScaledStats};

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Player or enemy identifier. Players and enemies share one counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// Water effect identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectId(pub u32);

/// Fire hazard identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FireId(pub u32);

/// Unique session identifier (UUID as bytes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub [u8; 16]);

impl SessionId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Create a fresh random id.
    pub fn random() -> Self {
        Self(*uuid::Uuid::new_v4().as_bytes())
    }

    /// Create from UUID string.
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s)
            .ok()
            .map(|u| Self(*u.as_bytes()))
    }

    /// Convert to UUID string.
    pub fn to_uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.0).to_string()
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

// =============================================================================
// DAMAGEABLE
// =============================================================================

/// Health pool shared by players and enemies.
///
/// `0 <= current_health <= max_health` always holds; `dead` never reverts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Damageable {
    /// Current health
    pub current_health: f32,
    /// Maximum health
    pub max_health: f32,
    /// Multiplier applied to incoming water damage
    pub elemental_multiplier: f32,
    /// Share of knockback force ignored
    pub knockback_resistance: f32,
    /// Terminal flag
    pub dead: bool,
}

impl Damageable {
    /// Create a full-health pool.
    pub fn new(max_health: f32, elemental_multiplier: f32, knockback_resistance: f32) -> Self {
        let max_health = max_health.max(0.0);
        Self {
            current_health: max_health,
            max_health,
            elemental_multiplier,
            knockback_resistance: knockback_resistance.clamp(0.0, 1.0),
            dead: false,
        }
    }

    /// Check if still alive.
    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Heal up to max. Dead pools stay at their last value.
    pub fn heal(&mut self, amount: f32) {
        if self.dead || amount <= 0.0 {
            return;
        }
        self.current_health = (self.current_health + amount).min(self.max_health);
    }

    /// Change max health, optionally refilling.
    pub fn set_max_health(&mut self, max_health: f32, refill: bool) {
        self.max_health = max_health.max(0.0);
        if refill && !self.dead {
            self.current_health = self.max_health;
        } else {
            self.current_health = self.current_health.min(self.max_health);
        }
    }
}

// =============================================================================
// TRANSIENTS
// =============================================================================

/// Navigation suspension after a knockback.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnockbackWindow {
    /// Countdown until navigation resumes
    pub remaining: Cooldown,
}

/// Floating readout of the most recent hit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HitMarker {
    /// Effective damage of the hit
    pub amount: f32,
    /// Whether the hit was critical
    pub critical: bool,
    /// Fade countdown
    pub remaining: Cooldown,
}

impl HitMarker {
    /// Show a marker for a hit.
    pub fn new(amount: f32, critical: bool, duration: f32) -> Self {
        Self {
            amount,
            critical,
            remaining: Cooldown::running(duration),
        }
    }

    /// Current opacity in `[0, 1]`.
    pub fn alpha(&self) -> f32 {
        self.remaining.fraction()
    }
}

// =============================================================================
// ENEMY STATE
// =============================================================================

/// Enemy behaviour posture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum EnemyPosture {
    /// Pathing straight at the target
    #[default]
    Chase = 0,
    /// Pathing to a flank point near the target
    Corner = 1,
    /// In range and striking
    Attack = 2,
    /// Navigation suspended by a knockback
    KnockedBack = 3,
    /// Terminal
    Dead = 4,
}

/// State of a single enemy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnemyState {
    /// Actor id
    pub id: ActorId,
    /// Catalog name
    pub spec: String,
    /// Round-scaled stats
    pub stats: ScaledStats,
    /// Health pool
    pub health: Damageable,
    /// Whether knockback affects this enemy
    pub knockback_enabled: bool,
    /// Collision sphere radius
    pub collision_radius: f32,
    /// Behaviour posture
    pub posture: EnemyPosture,
    /// Open knockback window
    pub knockback: Option<KnockbackWindow>,
    /// Last-hit readout
    pub hit_marker: Option<HitMarker>,
    /// Countdown between attacks
    pub attack_cooldown: Cooldown,
    /// Flank rotation chosen for the current cornering approach
    pub corner_offset: Option<i32>,
    /// Set once any critical hit lands
    pub headshot_landed: bool,
    /// Countdown to removal after death
    pub removal: Option<Cooldown>,
}

impl EnemyState {
    /// Create a freshly spawned enemy.
    pub fn new(id: ActorId, spec: &EnemySpec, stats: ScaledStats, attack_cooldown: f32) -> Self {
        Self {
            id,
            spec: spec.name.clone(),
            stats,
            health: Damageable::new(
                stats.health as f32,
                spec.elemental_multiplier,
                spec.knockback_resistance,
            ),
            knockback_enabled: spec.knockback_enabled,
            collision_radius: spec.collision_radius,
            posture: EnemyPosture::Chase,
            knockback: None,
            hit_marker: None,
            attack_cooldown: Cooldown::new(attack_cooldown),
            corner_offset: None,
            headshot_landed: false,
            removal: None,
        }
    }

    /// Check if alive.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    /// Check if navigation is suspended by a knockback.
    #[inline]
    pub fn is_knocked_back(&self) -> bool {
        self.knockback.is_some()
    }

    /// Add enemy state to hash.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.id.0);
        hasher.update_bytes(self.spec.as_bytes());
        hasher.update_f32(self.health.current_health);
        hasher.update_f32(self.health.max_health);
        hasher.update_bool(self.health.dead);
        hasher.update_u8(self.posture as u8);
        hasher.update_f32(self.knockback.map_or(0.0, |w| w.remaining.remaining()));
        hasher.update_f32(self.attack_cooldown.remaining());
        hasher.update_u32(self.corner_offset.unwrap_or(0) as u32);
        hasher.update_bool(self.headshot_landed);
    }
}

// =============================================================================
// PLAYER STATE
// =============================================================================

/// Delayed health regeneration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthRegen {
    /// Countdown since the last damage
    pub delay: Cooldown,
    /// Health per second once the delay has passed
    pub rate: f32,
}

impl HealthRegen {
    /// Create an idle regenerator.
    pub fn new(delay: f32, rate: f32) -> Self {
        Self {
            delay: Cooldown::new(delay),
            rate: rate.max(0.0),
        }
    }

    /// Restart the delay after taking damage.
    pub fn on_damage(&mut self) {
        self.delay.restart();
    }

    /// Advance and heal `health` if the delay has passed.
    pub fn tick(&mut self, dt: f32, health: &mut Damageable) {
        if health.dead {
            return;
        }
        self.delay.tick(dt);
        if self.delay.is_ready() && health.current_health < health.max_health {
            health.heal(self.rate * dt);
        }
    }
}

/// State of the player.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerState {
    /// Actor id
    pub id: ActorId,
    /// Health pool
    pub health: Damageable,
    /// Regeneration
    pub regen: HealthRegen,
    /// Ability slots
    pub abilities: AbilityScheduler,
    /// View yaw in degrees
    pub yaw: f32,
    /// View pitch in degrees
    pub pitch: f32,
    /// Latest movement axes (x = strafe, z = forward)
    pub move_input: (f32, f32),
    /// Sprint held
    pub sprinting: bool,
    /// Latest aim point from the host
    pub aim_point: Option<Vec3>,
    /// Vertical speed
    pub vertical_velocity: f32,
    /// Speed Boost perk multiplier
    pub speed_multiplier: f32,
    /// Super Jump perk multiplier
    pub jump_multiplier: f32,
}

impl PlayerState {
    /// Create a player at full health.
    pub fn new(id: ActorId, config: &SessionConfig) -> Self {
        let player = &config.player;
        Self {
            id,
            health: Damageable::new(player.max_health, 1.0, 0.0),
            regen: HealthRegen::new(player.regen_delay, player.regen_rate),
            abilities: AbilityScheduler::new(&config.abilities),
            yaw: 0.0,
            pitch: 0.0,
            move_input: (0.0, 0.0),
            sprinting: false,
            aim_point: None,
            vertical_velocity: 0.0,
            speed_multiplier: 1.0,
            jump_multiplier: 1.0,
        }
    }

    /// Check if alive.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        Vec3::from_yaw_pitch(self.yaw, self.pitch)
    }

    /// Add player state to hash.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.id.0);
        hasher.update_f32(self.health.current_health);
        hasher.update_f32(self.health.max_health);
        hasher.update_bool(self.health.dead);
        hasher.update_f32(self.regen.delay.remaining());
        hasher.update_f32(self.yaw);
        hasher.update_f32(self.pitch);
        hasher.update_f32(self.vertical_velocity);
        for kind in crate::game::ability::AbilityKind::ALL {
            let status = self.abilities.status(kind);
            hasher.update_f32(status.cooldown_remaining);
            hasher.update_f32(status.cooldown_max);
            hasher.update_bool(status.unlocked);
            hasher.update_bool(status.casting);
        }
        match self.abilities.carry() {
            CarryState::Empty => hasher.update_u32(0),
            CarryState::Carrying(effect) => hasher.update_u32(effect.0 + 1),
        }
    }
}

// =============================================================================
// SESSION STATE
// =============================================================================

/// Complete session state.
///
/// This is the authoritative state that gets hashed for replay checks.
/// Positions of actors live with the world collaborator; effects and
/// fires are core-owned and carry their own positions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionState {
    /// Session identifier
    pub session_id: SessionId,

    /// Current tick number
    pub tick: u32,

    /// Simulated seconds since session start
    pub time: f32,

    /// Deterministic RNG
    pub rng: DeterministicRng,

    /// RNG seed (for verification)
    pub rng_seed: u64,

    /// Players (BTreeMap for deterministic order)
    pub players: BTreeMap<ActorId, PlayerState>,

    /// Enemies (BTreeMap for deterministic order)
    pub enemies: BTreeMap<ActorId, EnemyState>,

    /// Live water effects
    pub effects: BTreeMap<EffectId, Effect>,

    /// Fire hazards
    pub fires: BTreeMap<FireId, FireState>,

    /// Candidate enemy spawn positions
    pub spawn_points: Vec<Vec3>,

    /// Actor enemies chase and spawns are placed around
    pub tracked_target: Option<ActorId>,

    /// Wave progression
    pub director: RoundDirector,

    /// Events generated this tick
    pub pending_events: Vec<GameEvent>,

    next_actor_id: u32,
    next_effect_id: u32,
    next_fire_id: u32,
}

impl SessionState {
    /// Create a new session state.
    pub fn new(session_id: SessionId, rng_seed: u64, config: &SessionConfig) -> Self {
        Self {
            session_id,
            tick: 0,
            time: 0.0,
            rng: DeterministicRng::new(rng_seed),
            rng_seed,
            players: BTreeMap::new(),
            enemies: BTreeMap::new(),
            effects: BTreeMap::new(),
            fires: BTreeMap::new(),
            spawn_points: Vec::new(),
            tracked_target: None,
            director: RoundDirector::new(&config.rounds),
            pending_events: Vec::new(),
            next_actor_id: 1,
            next_effect_id: 1,
            next_fire_id: 1,
        }
    }

    /// Allocate the next actor id.
    pub fn allocate_actor_id(&mut self) -> ActorId {
        let id = ActorId(self.next_actor_id);
        self.next_actor_id += 1;
        id
    }

    /// Allocate the next effect id.
    pub fn allocate_effect_id(&mut self) -> EffectId {
        let id = EffectId(self.next_effect_id);
        self.next_effect_id += 1;
        id
    }

    /// Add a player. The first player becomes the tracked target.
    pub fn add_player(&mut self, config: &SessionConfig) -> ActorId {
        let id = self.allocate_actor_id();
        self.players.insert(id, PlayerState::new(id, config));
        if self.tracked_target.is_none() {
            self.tracked_target = Some(id);
        }
        id
    }

    /// Add a fire hazard.
    pub fn add_fire(&mut self, position: Vec3) -> FireId {
        let id = FireId(self.next_fire_id);
        self.next_fire_id += 1;
        self.fires.insert(id, FireState::new(id, position));
        id
    }

    /// Get a player.
    pub fn get_player(&self, id: &ActorId) -> Option<&PlayerState> {
        self.players.get(id)
    }

    /// Get a mutable player.
    pub fn get_player_mut(&mut self, id: &ActorId) -> Option<&mut PlayerState> {
        self.players.get_mut(id)
    }

    /// Get an enemy.
    pub fn get_enemy(&self, id: &ActorId) -> Option<&EnemyState> {
        self.enemies.get(id)
    }

    /// Get a mutable enemy.
    pub fn get_enemy_mut(&mut self, id: &ActorId) -> Option<&mut EnemyState> {
        self.enemies.get_mut(id)
    }

    /// Tracked target if it is an alive player.
    pub fn live_target(&self) -> Option<ActorId> {
        self.tracked_target
            .filter(|id| self.players.get(id).is_some_and(PlayerState::is_alive))
    }

    /// Number of enemies not yet dead.
    pub fn living_enemy_count(&self) -> usize {
        self.enemies.values().filter(|e| e.is_alive()).count()
    }

    /// Compute deterministic hash of current state.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.rng_seed, |hasher| {
            hasher.update_bytes(self.session_id.as_bytes());
            let [s0, s1] = self.rng.state();
            hasher.update_u64(s0);
            hasher.update_u64(s1);
            hasher.update_f32(self.time);

            // Hash all players in sorted order (BTreeMap guarantees this)
            for player in self.players.values() {
                player.hash_into(hasher);
            }

            for enemy in self.enemies.values() {
                enemy.hash_into(hasher);
            }

            for (effect_id, effect) in &self.effects {
                hasher.update_u32(effect_id.0);
                hasher.update_u8(effect.kind() as u8);
                hasher.update_vec3(effect.position);
                if let EffectBody::Bend(bend) = &effect.body {
                    hasher.update_u8(bend.curl as u8);
                }
                hasher.update_bool(effect.linger.is_some());
            }

            for (fire_id, fire) in &self.fires {
                hasher.update_u32(fire_id.0);
                hasher.update_u32(fire.hits);
                hasher.update_bool(fire.extinguished);
                hasher.update_f32(fire.reignite.remaining());
            }

            self.director.hash_into(hasher);
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a session event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SessionState {
        SessionState::new(SessionId::new([7; 16]), 12345, &SessionConfig::default())
    }

    #[test]
    fn test_session_id_uuid_round_trip() {
        let id = SessionId::random();
        let parsed = SessionId::from_uuid_str(&id.to_uuid_string()).unwrap();
        assert_eq!(parsed, id);
        assert!(SessionId::from_uuid_str("not-a-uuid").is_none());
    }

    #[test]
    fn test_actor_ids_are_shared_and_monotonic() {
        let mut state = state();
        let config = SessionConfig::default();

        let player = state.add_player(&config);
        let next = state.allocate_actor_id();
        assert_eq!(player, ActorId(1));
        assert_eq!(next, ActorId(2));
        assert_eq!(state.tracked_target, Some(player));
    }

    #[test]
    fn test_damageable_heal_and_max() {
        let mut health = Damageable::new(100.0, 1.0, 0.0);
        health.current_health = 40.0;

        health.heal(30.0);
        assert_eq!(health.current_health, 70.0);
        health.heal(100.0);
        assert_eq!(health.current_health, 100.0);

        health.set_max_health(150.0, true);
        assert_eq!(health.current_health, 150.0);
        health.set_max_health(50.0, false);
        assert_eq!(health.current_health, 50.0);

        health.dead = true;
        health.current_health = 0.0;
        health.heal(10.0);
        assert_eq!(health.current_health, 0.0);
    }

    #[test]
    fn test_resistance_is_clamped() {
        let health = Damageable::new(10.0, 1.0, 2.0);
        assert_eq!(health.knockback_resistance, 1.0);
    }

    #[test]
    fn test_regen_waits_for_delay() {
        let mut regen = HealthRegen::new(5.0, 10.0);
        let mut health = Damageable::new(100.0, 1.0, 0.0);
        health.current_health = 50.0;
        regen.on_damage();

        for _ in 0..4 {
            regen.tick(1.0, &mut health);
        }
        assert_eq!(health.current_health, 50.0);

        regen.tick(1.0, &mut health);
        regen.tick(1.0, &mut health);
        assert!(health.current_health > 50.0);
        assert!(health.current_health <= 100.0);
    }

    #[test]
    fn test_hit_marker_fades() {
        let mut marker = HitMarker::new(30.0, true, 1.5);
        assert_eq!(marker.alpha(), 1.0);
        marker.remaining.tick(0.75);
        assert_eq!(marker.alpha(), 0.5);
    }

    #[test]
    fn test_state_hash_determinism() {
        let config = SessionConfig::default();
        let mut a = state();
        let mut b = state();
        a.add_player(&config);
        b.add_player(&config);
        assert_eq!(a.compute_hash(), b.compute_hash());

        b.players.values_mut().for_each(|p| p.yaw = 10.0);
        assert_ne!(a.compute_hash(), b.compute_hash());
    }

    #[test]
    fn test_events_drain() {
        let mut state = state();
        state.push_event(GameEvent::round_completed(0, 1));
        assert_eq!(state.take_events().len(), 1);
        assert!(state.take_events().is_empty());
    }
}

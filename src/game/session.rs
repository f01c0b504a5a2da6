//! Session Facade
//!
//! Owns the state, the host world, the economy and the intent buffer for
//! one run, and is the surface a host drives: submit intents, report
//! contacts, step, query.

use tracing::info;

use crate::core::hash::StateHash;
use crate::core::rng::derive_session_seed;
use crate::core::vec3::Vec3;
use crate::game::ability::{AbilityKind, AbilityStatus};
use crate::game::config::{ConfigError, SessionConfig};
use crate::game::economy::{Economy, PerkKind, PurchaseError};
use crate::game::events::GameEvent;
use crate::game::intent::{Intent, IntentBuffer};
use crate::game::round::RoundStatus;
use crate::game::state::{ActorId, FireId, SessionId, SessionState};
use crate::game::tick::{tick, TickInputs, TickResult};
use crate::game::world::{Contact, SandboxWorld, World};

/// Health readout for an actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealthStatus {
    /// Current health
    pub current: f32,
    /// Maximum health
    pub max: f32,
}

/// One survival run against a host world.
#[derive(Debug)]
pub struct Session<W> {
    config: SessionConfig,
    state: SessionState,
    world: W,
    economy: Economy,
    intents: IntentBuffer,
    contacts: Vec<Contact>,
}

impl<W: World> Session<W> {
    /// Create a session seeded from its id and level.
    pub fn new(config: SessionConfig, session_id: SessionId, world: W) -> Result<Self, ConfigError> {
        let seed = derive_session_seed(session_id.as_bytes(), &config.level);
        Self::with_seed(config, session_id, seed, world)
    }

    /// Create a session with an explicit RNG seed.
    pub fn with_seed(
        config: SessionConfig,
        session_id: SessionId,
        seed: u64,
        world: W,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let state = SessionState::new(session_id, seed, &config);
        let economy = Economy::new(&config.economy);
        info!(
            session = %session_id.to_uuid_string(),
            level = %config.level,
            seed,
            "Session created"
        );

        Ok(Self {
            config,
            state,
            world,
            economy,
            intents: IntentBuffer::new(),
            contacts: Vec::new(),
        })
    }

    /// Register a player. The host places its body under the returned id.
    ///
    /// The first player becomes the tracked target.
    pub fn register_player(&mut self) -> ActorId {
        self.state.add_player(&self.config)
    }

    /// Replace the level's spawn points.
    pub fn set_spawn_points(&mut self, points: Vec<Vec3>) {
        self.state.spawn_points = points;
    }

    /// Place a fire hazard.
    pub fn add_fire(&mut self, position: Vec3) -> FireId {
        self.state.add_fire(position)
    }

    /// Change which player enemies hunt.
    pub fn set_tracked_target(&mut self, target: Option<ActorId>) {
        self.state.tracked_target = target;
    }

    /// Queue an intent for the next step.
    pub fn submit_intent(&mut self, actor: ActorId, intent: Intent) {
        self.intents.submit(actor, intent);
    }

    /// Queue a physics contact for the next step.
    pub fn report_contact(&mut self, contact: Contact) {
        self.contacts.push(contact);
    }

    /// Run one tick with everything queued since the last step.
    pub fn step(&mut self, dt: f32) -> TickResult {
        let intents = self.intents.take();
        let contacts = std::mem::take(&mut self.contacts);
        let inputs = TickInputs {
            dt,
            intents: &intents,
            contacts: &contacts,
        };
        tick(
            &mut self.state,
            &mut self.world,
            &mut self.economy,
            &inputs,
            &self.config,
        )
    }

    /// Buy a perk for a player and apply it.
    ///
    /// Returns the remaining balance. `PerkPurchased` is reported with the
    /// next step's events.
    pub fn buy_perk(&mut self, player: ActorId, perk: PerkKind) -> Result<u32, PurchaseError> {
        let Some(state) = self.state.players.get(&player) else {
            return Err(PurchaseError::NoPlayer);
        };
        if !state.is_alive() {
            return Err(PurchaseError::NoPlayer);
        }

        let balance = self.economy.purchase(perk)?;
        if let Some(state) = self.state.players.get_mut(&player) {
            perk.apply(state);
        }

        let tick = self.state.tick;
        self.state
            .push_event(GameEvent::perk_purchased(tick, player, perk, perk.cost()));
        Ok(balance)
    }

    /// Cooldown and unlock readout for a player's slot.
    pub fn ability_status(&self, actor: ActorId, kind: AbilityKind) -> Option<AbilityStatus> {
        self.state
            .players
            .get(&actor)
            .map(|p| p.abilities.status(kind))
    }

    /// Health of a player or enemy.
    pub fn health(&self, actor: ActorId) -> Option<HealthStatus> {
        let health = match self.state.players.get(&actor) {
            Some(player) => &player.health,
            None => &self.state.enemies.get(&actor)?.health,
        };
        Some(HealthStatus {
            current: health.current_health,
            max: health.max_health,
        })
    }

    /// Current round readout.
    pub fn round_status(&self) -> RoundStatus {
        self.state.director.status()
    }

    /// Money, perks and statistics.
    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    /// Simulation state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Host world.
    pub fn world(&self) -> &W {
        &self.world
    }

    /// Host world, mutable.
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Current tick.
    pub fn current_tick(&self) -> u32 {
        self.state.tick
    }

    /// State hash for replay verification.
    pub fn compute_hash(&self) -> StateHash {
        self.state.compute_hash()
    }
}

impl Session<SandboxWorld> {
    /// Register a player and place its body in the sandbox.
    pub fn spawn_player(&mut self, position: Vec3) -> ActorId {
        let id = self.register_player();
        self.world.add_player(id, position);
        id
    }

    /// Collect sandbox contacts, run a tick, then advance sandbox physics.
    pub fn step_sandbox(&mut self, dt: f32) -> TickResult {
        let radius = self.config.abilities.water_ball.radius;
        let contacts = self.world.projectile_contacts(&self.state, radius);
        self.contacts.extend(contacts);

        let result = self.step(dt);
        self.world.step(dt);
        result
    }
}

// =============================================================================
// TESTS
// =============================================================================

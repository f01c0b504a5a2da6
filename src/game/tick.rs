//! Authoritative Simulation Tick
//!
//! One logical update. Every subsystem advances exactly once, in a fixed
//! order, so identical seeds, intents, contacts and `dt` sequences produce
//! identical state hashes.
//!
//! Order inside a tick:
//! 1. clocks
//! 2. ability cooldowns and cast completions
//! 3. intents (look, movement, jump, abilities, interact)
//! 4. host-reported contacts
//! 5. effect travel and area resolution
//! 6. knockback windows
//! 7. enemy behaviour
//! 8. player regeneration and hit-marker fades
//! 9. fire reignite timers
//! 10. round director
//! 11. removal grace timers
//! 12. event drain

use std::collections::BTreeMap;

use tracing::{debug, warn};
#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::core::vec3::Vec3;
use crate::game::ability::{AbilityCommand, AbilityKind, Activation, CarryState};
use crate::game::combat::{
    apply_knockback, damage_enemy, resolve_area, tick_hit_markers, tick_knockback_windows,
    tick_player_regen, tick_removals,
};
use crate::game::config::SessionConfig;
use crate::game::economy::ProgressionSink;
use crate::game::effect::{carried_position, Effect, EffectStep};
use crate::game::enemy::update_enemies;
use crate::game::events::{GameEvent, GameEventData};
use crate::game::fire::{hit_fire, interact, tick_fires};
use crate::game::intent::IntentFrame;
use crate::game::round::{DirectorAction, SpawnContext};
use crate::game::state::{ActorId, EnemyState, SessionState};
use crate::game::world::{Contact, ContactTarget, EnemySpawn, World};

/// Inputs for one tick.
#[derive(Clone, Copy, Debug)]
pub struct TickInputs<'a> {
    /// Seconds since the previous tick
    pub dt: f32,
    /// Intents per actor (BTreeMap for deterministic order!)
    pub intents: &'a BTreeMap<ActorId, IntentFrame>,
    /// Contacts the physics host reported since the previous tick
    pub contacts: &'a [Contact],
}

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick, sorted by (tick, priority, actor)
    pub events: Vec<GameEvent>,
    /// Round cleared this tick
    pub round_completed: Option<u32>,
    /// Whether a player died this tick
    pub player_died: bool,
}

/// Run one simulation tick.
///
/// # Arguments
///
/// * `state` - The session state (will be mutated)
/// * `world` - Host spatial queries and commands
/// * `sink` - Reward funnel
/// * `inputs` - Intents and contacts for this tick
/// * `config` - Session configuration
pub fn tick<W: World + ?Sized>(
    state: &mut SessionState,
    world: &mut W,
    sink: &mut dyn ProgressionSink,
    inputs: &TickInputs<'_>,
    config: &SessionConfig,
) -> TickResult {
    let dt = if inputs.dt.is_finite() { inputs.dt.max(0.0) } else { 0.0 };

    // 0. Advance tick counter
    state.tick += 1;

    // 1. Clocks
    state.time += dt;
    if state.players.values().any(|p| p.is_alive()) {
        sink.add_time_alive(dt);
    }

    // 2. Ability cooldowns and casts
    update_abilities(state, &*world, config, dt);

    // 3. Intents
    apply_intents(state, world, sink, inputs.intents, config, dt);

    // 4. Contacts
    apply_contacts(state, world, sink, inputs.contacts, config);

    // 5. Effects
    update_effects(state, world, sink, config, dt);

    // 6. Knockback windows
    tick_knockback_windows(state, world, dt);

    // 7. Enemy behaviour
    update_enemies(state, world, &config.enemy_ai, dt);

    // 8. Regeneration and hit markers
    tick_player_regen(state, dt);
    tick_hit_markers(state, dt);

    // 9. Fires
    tick_fires(state, dt);

    // 10. Round director
    let round_completed = update_director(state, world, sink, config, dt);

    // 11. Removal grace
    tick_removals(state, world, dt);

    #[cfg(feature = "debug-tracing")]
    trace!(
        tick = state.tick,
        enemies = state.enemies.len(),
        effects = state.effects.len(),
        events = state.pending_events.len(),
        "tick complete"
    );

    // 12. Drain events
    let mut events = state.take_events();
    events.sort();
    let player_died = events
        .iter()
        .any(|e| matches!(e.data, GameEventData::PlayerDied { .. }));

    TickResult {
        events,
        round_completed,
        player_died,
    }
}

// =============================================================================
// ABILITIES
// =============================================================================

fn update_abilities<W: World + ?Sized>(
    state: &mut SessionState,
    world: &W,
    config: &SessionConfig,
    dt: f32,
) {
    let ids: Vec<ActorId> = state.players.keys().copied().collect();
    for id in ids {
        let Some(player) = state.players.get_mut(&id) else {
            continue;
        };
        let completed = player.abilities.tick(dt);
        if !player.is_alive() {
            continue;
        }
        for (kind, command) in completed {
            resolve_command(state, world, config, id, kind, command);
        }
    }
}

fn eye_position<W: World + ?Sized>(world: &W, actor: ActorId, config: &SessionConfig) -> Vec3 {
    let feet = world.position_of(actor).unwrap_or_else(|| {
        warn!(player = actor.0, "No position for player, using origin");
        Vec3::ZERO
    });
    feet + Vec3::UP.scale(config.player.eye_height)
}

/// Turn an ability command into an effect.
fn resolve_command<W: World + ?Sized>(
    state: &mut SessionState,
    world: &W,
    config: &SessionConfig,
    player_id: ActorId,
    kind: AbilityKind,
    command: AbilityCommand,
) {
    let Some(player) = state.players.get(&player_id) else {
        return;
    };
    let (yaw, pitch) = (player.yaw, player.pitch);
    let forward = player.forward();
    let eye = eye_position(world, player_id, config);
    let abilities = &config.abilities;

    match command {
        AbilityCommand::CreateCarried => {
            let id = state.allocate_effect_id();
            let position = carried_position(eye, yaw, pitch, abilities);
            state
                .effects
                .insert(id, Effect::carried_ball(id, player_id, position));
            if let Some(player) = state.players.get_mut(&player_id) {
                player.abilities.attach_carried(id);
            }
            debug!(player = player_id.0, effect = id.0, "Water ball created");
        }
        AbilityCommand::Release { effect, target } => {
            let released = state
                .effects
                .get_mut(&effect)
                .is_some_and(|e| e.release(target));
            if !released {
                warn!(effect = effect.0, "Release for a ball that is not held");
                return;
            }
            debug!(player = player_id.0, effect = effect.0, "Water ball thrown");
        }
        AbilityCommand::SpawnBend { target } => {
            let id = state.allocate_effect_id();
            let origin =
                (eye + forward.flatten().normalize().scale(abilities.spawn_distance)).flatten();
            let curl = state.rng.next_sign();
            state.effects.insert(
                id,
                Effect::bend(id, player_id, origin, target, curl, abilities),
            );
            debug!(player = player_id.0, effect = id.0, "Water bend cast");
        }
        AbilityCommand::SpawnTube { target } => {
            let id = state.allocate_effect_id();
            let start = eye + forward.scale(abilities.spawn_distance);
            state
                .effects
                .insert(id, Effect::tube(id, player_id, start, target));
            debug!(player = player_id.0, effect = id.0, "Water tube cast");
        }
    }

    let tick = state.tick;
    state.push_event(GameEvent::ability_used(tick, player_id, kind));
}

// =============================================================================
// INTENTS
// =============================================================================

fn apply_intents<W: World + ?Sized>(
    state: &mut SessionState,
    world: &mut W,
    sink: &mut dyn ProgressionSink,
    intents: &BTreeMap<ActorId, IntentFrame>,
    config: &SessionConfig,
    dt: f32,
) {
    let idle = IntentFrame::default();
    let ids: Vec<ActorId> = state.players.keys().copied().collect();

    for id in ids {
        let frame = intents.get(&id).unwrap_or(&idle);
        let Some(player) = state.players.get_mut(&id) else {
            continue;
        };
        if !player.is_alive() {
            continue;
        }

        // Look, axes and toggles
        if let Some((yaw, pitch)) = frame.look {
            player.yaw = yaw.rem_euclid(360.0);
            player.pitch = pitch.clamp(-config.player.max_pitch, config.player.max_pitch);
        }
        if let Some(movement) = frame.movement {
            player.move_input = movement;
        }
        if let Some(sprint) = frame.sprint {
            player.sprinting = sprint;
        }
        if let Some(aim) = frame.aim {
            player.aim_point = Some(aim);
        }

        // Movement
        let settings = &config.player;
        let base_speed = if player.sprinting {
            settings.sprint_speed
        } else {
            settings.move_speed
        };
        let speed = base_speed * player.speed_multiplier;
        let forward = Vec3::from_yaw_pitch(player.yaw, 0.0);
        let right = Vec3::from_yaw_pitch(player.yaw + 90.0, 0.0);
        let (x, z) = player.move_input;
        let mut horizontal = right.scale(x) + forward.scale(z);
        if horizontal.length_squared() > 1.0 {
            horizontal = horizontal.normalize();
        }

        let grounded = world.is_grounded(id);
        if grounded && player.vertical_velocity < 0.0 {
            player.vertical_velocity = 0.0;
        }
        if grounded && frame.jump_pressed() {
            let height = settings.jump_height * player.jump_multiplier;
            player.vertical_velocity = (2.0 * settings.gravity.abs() * height).sqrt();
        }
        player.vertical_velocity += settings.gravity * dt;

        let displacement =
            horizontal.scale(speed * dt) + Vec3::UP.scale(player.vertical_velocity * dt);
        if displacement != Vec3::ZERO {
            world.move_actor(id, displacement);
        }
        if world.is_grounded(id) && player.vertical_velocity < 0.0 {
            player.vertical_velocity = 0.0;
        }

        // Abilities
        let eye = eye_position(&*world, id, config);
        let Some(player) = state.players.get_mut(&id) else {
            continue;
        };
        let aim = player.aim_point.unwrap_or_else(|| {
            eye + player.forward().scale(config.abilities.fallback_aim_distance)
        });
        let mut fired = Vec::new();
        for kind in frame.abilities_pressed() {
            match player.abilities.invoke(kind, aim) {
                Some(Activation::Fired(command)) => fired.push((kind, command)),
                Some(Activation::Casting) => {
                    debug!(player = id.0, ability = kind.name(), "Cast started");
                }
                None => {}
            }
        }
        for (kind, command) in fired {
            resolve_command(state, &*world, config, id, kind, command);
        }

        // Interact
        if frame.interact_pressed() {
            interact(state, &*world, sink, &config.fire, id);
        }

        // Held ball follows the viewpoint
        if let Some(player) = state.players.get(&id) {
            if let CarryState::Carrying(effect) = player.abilities.carry() {
                let held = carried_position(
                    eye_position(&*world, id, config),
                    player.yaw,
                    player.pitch,
                    &config.abilities,
                );
                if let Some(ball) = state.effects.get_mut(&effect) {
                    ball.follow(held);
                }
            }
        }
    }
}

// =============================================================================
// CONTACTS
// =============================================================================

fn apply_contacts<W: World + ?Sized>(
    state: &mut SessionState,
    world: &mut W,
    sink: &mut dyn ProgressionSink,
    contacts: &[Contact],
    config: &SessionConfig,
) {
    let tuning = config.abilities.tuning(AbilityKind::WaterBall);

    for contact in contacts {
        let Some(ball) = state.effects.get(&contact.effect) else {
            continue;
        };
        // Held balls hit too; only the post-impact linger is inert
        if !ball.accepts_contacts() || ball.linger.is_some() {
            continue;
        }
        let ball_position = ball.position;

        match contact.target {
            ContactTarget::Actor(target) => {
                if !state.enemies.contains_key(&target) {
                    continue;
                }
                damage_enemy(
                    state,
                    world,
                    sink,
                    &config.combat,
                    target,
                    tuning.damage,
                    contact.headshot,
                );
                let direction = world
                    .position_of(target)
                    .map(|position| (position - ball_position).flatten().normalize())
                    .unwrap_or(Vec3::ZERO);
                apply_knockback(
                    state,
                    world,
                    &config.combat,
                    target,
                    direction.scale(tuning.knockback),
                );
            }
            ContactTarget::Fire(fire) => {
                hit_fire(state, sink, &config.fire, fire);
            }
        }
    }
}

// =============================================================================
// EFFECTS
// =============================================================================

fn update_effects<W: World + ?Sized>(
    state: &mut SessionState,
    world: &mut W,
    sink: &mut dyn ProgressionSink,
    config: &SessionConfig,
    dt: f32,
) {
    let ids: Vec<_> = state.effects.keys().copied().collect();
    for id in ids {
        let Some(effect) = state.effects.get_mut(&id) else {
            continue;
        };
        let kind = effect.kind();
        let owner = effect.owner;
        let step = effect.advance(dt, &config.abilities);

        match step {
            EffectStep::Moving => {}
            EffectStep::Impact(position) => {
                let tick = state.tick;
                state.push_event(GameEvent::projectile_impact(tick, id, position));
            }
            EffectStep::ResolveArea(center) => {
                let tuning = config.abilities.tuning(kind);
                let hit = resolve_area(state, world, sink, &config.combat, center, tuning);
                debug!(effect = id.0, ability = kind.name(), hit, "Area resolved");
            }
            EffectStep::Expired => {
                state.effects.remove(&id);
                if let Some(player) = state.players.get_mut(&owner) {
                    player.abilities.drop_carried(id);
                }
            }
        }
    }
}

// =============================================================================
// ROUNDS
// =============================================================================

fn update_director<W: World + ?Sized>(
    state: &mut SessionState,
    world: &mut W,
    sink: &mut dyn ProgressionSink,
    config: &SessionConfig,
    dt: f32,
) -> Option<u32> {
    let target = state.live_target().and_then(|id| world.position_of(id));
    let ctx = SpawnContext {
        catalog: &config.enemies,
        spawn_points: &state.spawn_points,
        target,
    };
    let actions = state.director.tick(dt, &ctx, &mut state.rng);

    let tick = state.tick;
    let mut completed = None;
    for action in actions {
        match action {
            DirectorAction::RoundStarted { round, enemies_target } => {
                state.push_event(GameEvent::round_started(tick, round, enemies_target));
            }
            DirectorAction::Spawn(order) => {
                let id = state.allocate_actor_id();
                world.spawn_enemy(&EnemySpawn {
                    id,
                    spec: &order.spec.name,
                    position: order.position,
                    speed: order.stats.speed,
                    radius: order.spec.collision_radius,
                });
                state.enemies.insert(
                    id,
                    EnemyState::new(id, &order.spec, order.stats, config.enemy_ai.attack_cooldown),
                );
                state.push_event(GameEvent::enemy_spawned(
                    tick,
                    id,
                    &order.spec.name,
                    order.position,
                ));
            }
            DirectorAction::RoundCompleted { round } => {
                sink.register_round_completed(round);
                state.push_event(GameEvent::round_completed(tick, round));
                completed = Some(round);
            }
        }
    }
    completed
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::EconomyConfig;
    use crate::game::economy::{Economy, PerkKind};
    use crate::game::intent::Intent;
    use crate::game::round::RoundPhase;
    use crate::game::state::SessionId;
    use crate::game::world::{SandboxWorld, WorldCommands, WorldQuery};

    const DT: f32 = 1.0 / 60.0;

    struct Harness {
        state: SessionState,
        world: SandboxWorld,
        economy: Economy,
        config: SessionConfig,
        player: ActorId,
    }

    impl Harness {
        fn new(seed: u64) -> Self {
            let config = SessionConfig::default();
            let mut state = SessionState::new(SessionId::new([9; 16]), seed, &config);
            let mut world = SandboxWorld::new();
            let player = state.add_player(&config);
            world.add_player(player, Vec3::ZERO);
            state.spawn_points = vec![
                Vec3::new(0.0, 0.0, 25.0),
                Vec3::new(25.0, 0.0, 0.0),
                Vec3::new(-25.0, 0.0, 0.0),
            ];
            Self {
                state,
                world,
                economy: Economy::new(&EconomyConfig::default()),
                config,
                player,
            }
        }

        fn add_enemy(&mut self, position: Vec3) -> ActorId {
            let enemy = self.state.allocate_actor_id();
            let spec = self.config.enemies[0].clone();
            let stats = crate::game::round::scale_stats(&spec, 1, &self.config.rounds);
            self.world.spawn_enemy(&EnemySpawn {
                id: enemy,
                spec: &spec.name,
                position,
                speed: stats.speed,
                radius: spec.collision_radius,
            });
            self.state.enemies.insert(enemy, EnemyState::new(enemy, &spec, stats, 1.5));
            enemy
        }

        fn step(&mut self, intents: &[Intent], contacts: &[Contact]) -> TickResult {
            let frames: BTreeMap<ActorId, IntentFrame> = if intents.is_empty() {
                BTreeMap::new()
            } else {
                BTreeMap::from([(self.player, IntentFrame::from_intents(intents))])
            };
            let inputs = TickInputs {
                dt: DT,
                intents: &frames,
                contacts,
            };
            let result = tick(
                &mut self.state,
                &mut self.world,
                &mut self.economy,
                &inputs,
                &self.config,
            );
            self.world.step(DT);
            result
        }
    }

    #[test]
    fn test_tick_advances_clocks() {
        let mut h = Harness::new(1);
        h.step(&[], &[]);
        h.step(&[], &[]);
        assert_eq!(h.state.tick, 2);
        assert!((h.state.time - 2.0 * DT).abs() < 1e-6);
        assert!(h.economy.stats().time_alive > 0.0);
    }

    #[test]
    fn test_non_finite_dt_is_zero() {
        let mut h = Harness::new(1);
        let frames = BTreeMap::new();
        let inputs = TickInputs {
            dt: f32::NAN,
            intents: &frames,
            contacts: &[],
        };
        tick(&mut h.state, &mut h.world, &mut h.economy, &inputs, &h.config);
        assert_eq!(h.state.time, 0.0);
    }

    #[test]
    fn test_movement_and_jump() {
        let mut h = Harness::new(1);
        h.step(&[Intent::Move { x: 0.0, z: 1.0 }], &[]);
        for _ in 0..59 {
            h.step(&[], &[]);
        }
        let position = h.world.position_of(h.player).unwrap();
        assert!((position.z - 5.0).abs() < 0.01, "walked to {position}");

        h.step(&[Intent::Jump], &[]);
        assert!(!h.world.is_grounded(h.player));
        for _ in 0..120 {
            h.step(&[], &[]);
        }
        assert!(h.world.is_grounded(h.player));
    }

    #[test]
    fn test_ball_create_follow_release_impact() {
        let mut h = Harness::new(1);
        let target = Vec3::new(0.0, 1.6, 10.0);

        let result = h.step(&[Intent::AimAt(target), Intent::PrimaryAttack], &[]);
        assert!(result
            .events
            .iter()
            .any(|e| e.data == GameEventData::AbilityUsed { player: h.player, ability: AbilityKind::WaterBall }));
        let CarryState::Carrying(ball) = h.state.players[&h.player].abilities.carry() else {
            panic!("ball not held");
        };

        // Held ball follows the player
        h.step(&[Intent::Move { x: 1.0, z: 0.0 }], &[]);
        let held = h.state.effects[&ball].position;
        assert!(held.x > 1.5);

        for _ in 0..20 {
            h.step(&[Intent::Move { x: 0.0, z: 0.0 }], &[]);
        }
        h.step(&[Intent::PrimaryAttack], &[]);
        assert_eq!(h.state.players[&h.player].abilities.carry(), CarryState::Empty);

        let mut impact = false;
        for _ in 0..60 {
            let result = h.step(&[], &[]);
            impact |= result
                .events
                .iter()
                .any(|e| matches!(e.data, GameEventData::ProjectileImpact { .. }));
        }
        assert!(impact);

        for _ in 0..40 {
            h.step(&[], &[]);
        }
        assert!(!h.state.effects.contains_key(&ball));
    }

    #[test]
    fn test_ball_contact_damages_and_pushes() {
        let mut h = Harness::new(1);
        h.step(&[Intent::PrimaryAttack], &[]);
        let CarryState::Carrying(ball) = h.state.players[&h.player].abilities.carry() else {
            panic!("ball not held");
        };

        let enemy = h.add_enemy(Vec3::new(1.5, 0.0, 4.0));

        let contact = Contact {
            effect: ball,
            target: ContactTarget::Actor(enemy),
            headshot: true,
        };
        h.step(&[], &[contact]);

        // 10 raw * 1.5 elemental * 2 headshot
        assert_eq!(h.state.enemies[&enemy].health.current_health, 70.0);
        assert!(h.state.enemies[&enemy].is_knocked_back());

        // Each contact is its own hit
        h.step(&[], &[contact]);
        assert_eq!(h.state.enemies[&enemy].health.current_health, 40.0);
    }

    #[test]
    fn test_held_ball_hits_on_contact() {
        let mut h = Harness::new(1);
        h.step(&[Intent::PrimaryAttack], &[]);
        let CarryState::Carrying(ball) = h.state.players[&h.player].abilities.carry() else {
            panic!("ball not held");
        };
        let enemy = h.add_enemy(Vec3::new(0.5, 0.0, 1.5));

        let result = h.step(
            &[],
            &[Contact {
                effect: ball,
                target: ContactTarget::Actor(enemy),
                headshot: false,
            }],
        );

        assert!(result.events.iter().any(|e| e.data
            == GameEventData::DamageApplied {
                target: enemy,
                amount: 15.0,
                critical: false
            }));
        assert_eq!(h.state.enemies[&enemy].health.current_health, 85.0);

        // Still in hand afterwards
        assert_eq!(
            h.state.players[&h.player].abilities.carry(),
            CarryState::Carrying(ball)
        );
        assert!(h.state.effects[&ball].linger.is_none());
    }

    #[test]
    fn test_locked_abilities_do_nothing() {
        let mut h = Harness::new(1);
        let result = h.step(&[Intent::Ability1, Intent::Ability2], &[]);
        assert!(result.events.is_empty());
        assert!(h.state.effects.is_empty());
    }

    #[test]
    fn test_tube_resolves_area_once() {
        let mut h = Harness::new(1);
        PerkKind::WaterTube.apply(h.state.players.get_mut(&h.player).unwrap());

        let enemy = h.state.allocate_actor_id();
        let spec = h.config.enemies[0].clone();
        let stats = crate::game::round::scale_stats(&spec, 1, &h.config.rounds);
        h.world.spawn_enemy(&EnemySpawn {
            id: enemy,
            spec: &spec.name,
            position: Vec3::new(0.0, 0.0, 12.0),
            speed: 0.0,
            radius: spec.collision_radius,
        });
        h.state.enemies.insert(enemy, EnemyState::new(enemy, &spec, stats, 1.5));

        h.step(&[Intent::AimAt(Vec3::new(0.0, 0.0, 12.0)), Intent::Ability2], &[]);
        for _ in 0..180 {
            h.step(&[], &[]);
        }

        // 20 raw * 1.5 elemental, exactly once
        assert_eq!(h.state.enemies[&enemy].health.current_health, 70.0);
        assert!(h.state.effects.is_empty());
    }

    #[test]
    fn test_interact_puts_out_fire() {
        let mut h = Harness::new(1);
        let fire = h.state.add_fire(Vec3::new(0.0, 0.0, 3.0));
        let money = h.economy.money();

        for _ in 0..3 {
            h.step(&[Intent::Interact], &[]);
        }
        assert!(h.state.fires[&fire].extinguished);
        assert_eq!(h.economy.money(), money + 10);
    }

    #[test]
    fn test_director_spawns_into_world() {
        let mut h = Harness::new(3);
        let mut spawned = 0;
        for _ in 0..(6 * 60) {
            let result = h.step(&[], &[]);
            spawned += result
                .events
                .iter()
                .filter(|e| matches!(e.data, GameEventData::EnemySpawned { .. }))
                .count();
        }

        assert!(spawned >= 1);
        assert_eq!(h.state.enemies.len(), spawned);
        assert_eq!(h.world.body_count(), spawned + 1);
        assert!(matches!(h.state.director.phase(), RoundPhase::Spawning { .. }));
    }

    #[test]
    fn test_events_sorted() {
        let mut h = Harness::new(3);
        for _ in 0..(8 * 60) {
            let result = h.step(&[], &[]);
            let mut sorted = result.events.clone();
            sorted.sort();
            let keys = |events: &[GameEvent]| {
                events
                    .iter()
                    .map(|e| (e.tick, e.priority, e.actor))
                    .collect::<Vec<_>>()
            };
            assert_eq!(keys(&result.events), keys(&sorted));
        }
    }

    #[test]
    fn test_same_inputs_same_hash() {
        let run = || {
            let mut h = Harness::new(42);
            for step in 0..(10 * 60) {
                let intents = if step % 30 == 0 {
                    vec![Intent::Look { yaw: step as f32, pitch: 0.0 }, Intent::PrimaryAttack]
                } else {
                    vec![Intent::Move { x: 0.3, z: -0.2 }]
                };
                h.step(&intents, &[]);
            }
            (h.state.compute_hash(), h.world.compute_hash())
        };
        assert_eq!(run(), run());
    }
}

//! Combat Resolution
//!
//! Damage, knockback, area effects and death for enemies and players.
//!
//! ```text
//! effective = raw * elemental_multiplier * (critical ? critical_multiplier : 1)
//! health    = clamp(health - effective, 0, max)
//! impulse   = force * (1 - knockback_resistance)
//! ```
//!
//! A death transition happens at most once per target. Hits on a dead
//! target change nothing and emit nothing.

use tracing::{debug, warn};

use crate::core::timer::Cooldown;
use crate::core::vec3::Vec3;
use crate::game::config::{AbilityTuning, CombatConfig};
use crate::game::economy::ProgressionSink;
use crate::game::events::GameEvent;
use crate::game::state::{
    ActorId, Damageable, EnemyPosture, HitMarker, KnockbackWindow, SessionState,
};
use crate::game::world::World;

/// Result of one damage application.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DamageOutcome {
    /// Target missing or already dead
    Ignored,
    /// Health reduced, target still alive
    Damaged { amount: f32 },
    /// This hit was lethal
    Killed { amount: f32 },
}

/// Damage after multipliers.
#[inline]
pub fn effective_damage(raw: f32, elemental_multiplier: f32, critical: bool, critical_multiplier: f32) -> f32 {
    let crit = if critical { critical_multiplier } else { 1.0 };
    let amount = raw * elemental_multiplier * crit;
    if amount.is_finite() {
        amount.max(0.0)
    } else {
        0.0
    }
}

impl Damageable {
    /// Subtract already-multiplied damage.
    pub fn apply_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.dead {
            return DamageOutcome::Ignored;
        }

        self.current_health = (self.current_health - amount).clamp(0.0, self.max_health);
        if self.current_health <= 0.0 {
            self.dead = true;
            DamageOutcome::Killed { amount }
        } else {
            DamageOutcome::Damaged { amount }
        }
    }
}

// =============================================================================
// ENEMIES
// =============================================================================

/// Apply a water hit to an enemy.
pub fn damage_enemy<W: World + ?Sized>(
    state: &mut SessionState,
    world: &mut W,
    sink: &mut dyn ProgressionSink,
    config: &CombatConfig,
    target: ActorId,
    raw: f32,
    critical: bool,
) -> DamageOutcome {
    let Some(enemy) = state.enemies.get_mut(&target) else {
        return DamageOutcome::Ignored;
    };

    let amount = effective_damage(
        raw,
        enemy.health.elemental_multiplier,
        critical,
        config.critical_multiplier,
    );
    let outcome = enemy.health.apply_damage(amount);
    if outcome == DamageOutcome::Ignored {
        return outcome;
    }

    // Last hit wins the marker
    enemy.hit_marker = Some(HitMarker::new(amount, critical, config.hit_marker_duration));
    enemy.headshot_landed |= critical;
    let headshot = enemy.headshot_landed;

    let tick = state.tick;
    state.push_event(GameEvent::damage_applied(tick, target, amount, critical));

    if matches!(outcome, DamageOutcome::Killed { .. }) {
        kill_enemy(state, world, sink, config, target, headshot);
    }
    outcome
}

fn kill_enemy<W: World + ?Sized>(
    state: &mut SessionState,
    world: &mut W,
    sink: &mut dyn ProgressionSink,
    config: &CombatConfig,
    target: ActorId,
    headshot: bool,
) {
    if let Some(enemy) = state.enemies.get_mut(&target) {
        enemy.posture = EnemyPosture::Dead;
        enemy.knockback = None;
        enemy.removal = Some(Cooldown::running(config.death_removal_delay));
    }
    world.set_navigation_enabled(target, false);

    debug!(enemy = target.0, headshot, "Enemy died");
    let tick = state.tick;
    state.push_event(GameEvent::death(tick, target, headshot));
    state.director.on_enemy_death();
    sink.register_kill(headshot);
}

/// Push an enemy and suspend its navigation.
///
/// Returns the applied impulse. While a window is already open the timer
/// restarts and no second impulse is applied.
pub fn apply_knockback<W: World + ?Sized>(
    state: &mut SessionState,
    world: &mut W,
    config: &CombatConfig,
    target: ActorId,
    force: Vec3,
) -> Option<Vec3> {
    let enemy = state.enemies.get_mut(&target)?;
    if !enemy.is_alive() || !enemy.knockback_enabled {
        return None;
    }

    if let Some(window) = enemy.knockback.as_mut() {
        window.remaining.restart();
        return None;
    }

    let impulse = force.scale(1.0 - enemy.health.knockback_resistance);
    enemy.knockback = Some(KnockbackWindow {
        remaining: Cooldown::running(config.knockback_disable_time),
    });
    enemy.posture = EnemyPosture::KnockedBack;

    world.set_navigation_enabled(target, false);
    world.apply_impulse(target, impulse);

    let tick = state.tick;
    state.push_event(GameEvent::knockback_applied(tick, target, impulse));
    Some(impulse)
}

/// Damage and push every enemy intersecting a sphere.
///
/// No falloff and no cap. Hits resolve in ascending id order. Returns the
/// number of enemies hit.
pub fn resolve_area<W: World + ?Sized>(
    state: &mut SessionState,
    world: &mut W,
    sink: &mut dyn ProgressionSink,
    config: &CombatConfig,
    center: Vec3,
    tuning: &AbilityTuning,
) -> usize {
    let mut hits = world.entities_within_sphere(center, tuning.radius);
    hits.sort();
    hits.dedup();

    let mut count = 0;
    for target in hits {
        if !state.enemies.get(&target).is_some_and(|e| e.is_alive()) {
            continue;
        }
        count += 1;

        damage_enemy(state, world, sink, config, target, tuning.damage, false);

        let direction = match world.position_of(target) {
            Some(position) => (position - center).normalize(),
            None => {
                warn!(enemy = target.0, "No position for knockback, using zero direction");
                Vec3::ZERO
            }
        };
        apply_knockback(state, world, config, target, direction.scale(tuning.knockback));
    }
    count
}

/// Count down knockback windows and resume navigation for survivors.
pub fn tick_knockback_windows<W: World + ?Sized>(state: &mut SessionState, world: &mut W, dt: f32) {
    for enemy in state.enemies.values_mut() {
        let Some(window) = enemy.knockback.as_mut() else {
            continue;
        };
        window.remaining.tick(dt);
        if !window.remaining.is_ready() {
            continue;
        }

        enemy.knockback = None;
        if enemy.is_alive() {
            enemy.posture = EnemyPosture::Chase;
            world.set_navigation_enabled(enemy.id, true);
        }
    }
}

/// Fade hit markers.
pub fn tick_hit_markers(state: &mut SessionState, dt: f32) {
    for enemy in state.enemies.values_mut() {
        if let Some(marker) = enemy.hit_marker.as_mut() {
            marker.remaining.tick(dt);
            if marker.remaining.is_ready() {
                enemy.hit_marker = None;
            }
        }
    }
}

/// Remove dead enemies whose grace delay has passed.
pub fn tick_removals<W: World + ?Sized>(state: &mut SessionState, world: &mut W, dt: f32) {
    let mut expired = Vec::new();
    for enemy in state.enemies.values_mut() {
        if let Some(removal) = enemy.removal.as_mut() {
            removal.tick(dt);
            if removal.is_ready() {
                expired.push(enemy.id);
            }
        }
    }

    let tick = state.tick;
    for id in expired {
        state.enemies.remove(&id);
        world.despawn(id);
        state.push_event(GameEvent::enemy_despawned(tick, id));
    }
}

// =============================================================================
// PLAYERS
// =============================================================================

/// Apply raw damage to a player. No multipliers.
pub fn damage_player(state: &mut SessionState, target: ActorId, raw: f32) -> DamageOutcome {
    let Some(player) = state.players.get_mut(&target) else {
        return DamageOutcome::Ignored;
    };

    let amount = effective_damage(raw, 1.0, false, 1.0);
    let outcome = player.health.apply_damage(amount);
    if outcome == DamageOutcome::Ignored {
        return outcome;
    }
    player.regen.on_damage();

    let tick = state.tick;
    state.push_event(GameEvent::damage_applied(tick, target, amount, false));
    if matches!(outcome, DamageOutcome::Killed { .. }) {
        debug!(player = target.0, "Player died");
        state.push_event(GameEvent::player_died(tick, target));
    }
    outcome
}

/// Regenerate player health.
pub fn tick_player_regen(state: &mut SessionState, dt: f32) {
    for player in state.players.values_mut() {
        let regen = &mut player.regen;
        regen.tick(dt, &mut player.health);
    }
}

// =============================================================================
// TESTS
// =============================================================================

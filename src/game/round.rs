//! Round Director
//!
//! Wave progression: lobby delay, paced spawning, waiting for the wave to
//! die, intermission, next round. There is no terminal phase; rounds keep
//! escalating until the host stops the session.
//!
//! The director owns the round counters. `enemies_alive` is only raised by
//! a spawn decision here and only lowered by [`RoundDirector::on_enemy_death`].

use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};

use crate::core::hash::StateHasher;
use crate::core::rng::DeterministicRng;
use crate::core::vec3::Vec3;
use crate::game::config::{EnemySpec, RoundConfig};

// =============================================================================
// WAVE MATH
// =============================================================================

/// Enemies in a round: `initial + 3·round + floor(round^1.3)`.
pub fn enemies_for_round(initial: u32, round: u32) -> u32 {
    let growth = (round as f64).powf(1.3).floor() as u32;
    initial
        .saturating_add(round.saturating_mul(3))
        .saturating_add(growth)
}

/// Per-spawn stats after round scaling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaledStats {
    /// Max health
    pub health: u32,
    /// Attack damage
    pub damage: u32,
    /// Movement speed
    pub speed: f32,
}

/// Scale a spec's base stats for a round.
///
/// Health and damage round half-to-even; speed is left fractional.
pub fn scale_stats(spec: &EnemySpec, round: u32, config: &RoundConfig) -> ScaledStats {
    let steps = round.saturating_sub(1) as f32;
    let health = spec.base_health as f32 * (1.0 + config.health_growth * steps);
    let damage = spec.base_damage as f32 * (1.0 + config.damage_growth * steps);
    ScaledStats {
        health: health.round_ties_even().max(1.0) as u32,
        damage: damage.round_ties_even().max(0.0) as u32,
        speed: spec.base_speed * (1.0 + config.speed_growth * steps),
    }
}

/// Specs allowed to spawn in a round, in catalog order.
pub fn eligible_specs(catalog: &[EnemySpec], round: u32) -> Vec<&EnemySpec> {
    catalog
        .iter()
        .filter(|spec| spec.min_round_to_appear <= round)
        .collect()
}

/// Index of the weight interval containing `draw`.
///
/// Candidate `i` owns `[Σ_{<i} w, Σ_{≤i} w)`. Returns `None` if there are no
/// candidates, the total is not positive, or the draw lies outside `[0, Σw)`.
pub fn select_weighted(weights: &[f32], draw: f32) -> Option<usize> {
    let total: f32 = weights.iter().map(|w| w.max(0.0)).sum();
    if weights.is_empty() || !(total > 0.0) || draw < 0.0 || draw >= total {
        return None;
    }

    let mut cumulative = 0.0;
    for (index, weight) in weights.iter().enumerate() {
        cumulative += weight.max(0.0);
        if draw < cumulative {
            return Some(index);
        }
    }
    None
}

/// Pick a spec by weight using one RNG draw.
pub fn choose_spec<'a>(candidates: &[&'a EnemySpec], rng: &mut DeterministicRng) -> Option<&'a EnemySpec> {
    let weights: Vec<f32> = candidates.iter().map(|spec| spec.spawn_weight).collect();
    let total: f32 = weights.iter().map(|w| w.max(0.0)).sum();
    if !(total > 0.0) {
        return None;
    }
    let draw = rng.next_f32_range(0.0, total);
    select_weighted(&weights, draw).map(|index| candidates[index])
}

/// Pick a spawn point index.
///
/// With a target, choose uniformly among the `pool` points nearest to it;
/// without one, uniformly among all points.
pub fn choose_spawn_point(
    points: &[Vec3],
    target: Option<Vec3>,
    pool: usize,
    rng: &mut DeterministicRng,
) -> Option<usize> {
    if points.is_empty() {
        return None;
    }

    let Some(target) = target else {
        return Some(rng.next_index(points.len()));
    };

    let mut ranked: Vec<(usize, f32)> = points
        .iter()
        .enumerate()
        .map(|(index, point)| (index, point.distance(target)))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

    let pool = pool.clamp(1, ranked.len());
    Some(ranked[rng.next_index(pool)].0)
}

// =============================================================================
// ROUND STATE
// =============================================================================

/// Counters for the current round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    /// 1-based round number (0 before the first round)
    pub round_number: u32,
    /// Enemies this round will spawn
    pub enemies_target: u32,
    /// Enemies spawned so far
    pub enemies_spawned: u32,
    /// Enemies spawned and not yet dead
    pub enemies_alive: u32,
}

impl RoundState {
    /// Fresh counters for a round.
    pub fn for_round(round_number: u32, initial_enemies: u32) -> Self {
        Self {
            round_number,
            enemies_target: enemies_for_round(initial_enemies, round_number),
            enemies_spawned: 0,
            enemies_alive: 0,
        }
    }

    /// Cleared iff every enemy has spawned and none is alive.
    pub fn is_cleared(&self) -> bool {
        self.enemies_spawned == self.enemies_target && self.enemies_alive == 0
    }
}

/// Host-facing round summary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStatus {
    /// Current round
    pub round_number: u32,
    /// Enemies this round will spawn
    pub enemies_target: u32,
    /// Enemies alive
    pub enemies_alive: u32,
}

/// Director phase.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Lobby delay before round 1
    PreRound { remaining: f32 },
    /// Spawning; next attempt in `next` seconds
    Spawning { next: f32 },
    /// All spawned, waiting for the last death
    AwaitingClear,
    /// Breather before the next round
    Intermission { remaining: f32 },
}

/// A spawn the tick must carry out.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnOrder {
    /// Catalog entry
    pub spec: EnemySpec,
    /// Round-scaled stats
    pub stats: ScaledStats,
    /// Spawn point index
    pub spawn_point: usize,
    /// Spawn position
    pub position: Vec3,
}

/// Director output for one tick, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum DirectorAction {
    /// A round began
    RoundStarted { round: u32, enemies_target: u32 },
    /// Spawn an enemy
    Spawn(SpawnOrder),
    /// A round was cleared
    RoundCompleted { round: u32 },
}

/// Read-only inputs the director needs for spawning.
pub struct SpawnContext<'a> {
    /// Enemy catalog
    pub catalog: &'a [EnemySpec],
    /// Spawn points
    pub spawn_points: &'a [Vec3],
    /// Tracked target position, if any
    pub target: Option<Vec3>,
}

/// Wave state machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundDirector {
    config: RoundConfig,
    phase: RoundPhase,
    round: RoundState,
}

impl RoundDirector {
    /// Create a director waiting out the lobby delay.
    pub fn new(config: &RoundConfig) -> Self {
        Self {
            config: config.clone(),
            phase: RoundPhase::PreRound {
                remaining: config.initial_round_delay,
            },
            round: RoundState::default(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Current round counters.
    pub fn round(&self) -> &RoundState {
        &self.round
    }

    /// Host-facing summary.
    pub fn status(&self) -> RoundStatus {
        RoundStatus {
            round_number: self.round.round_number,
            enemies_target: self.round.enemies_target,
            enemies_alive: self.round.enemies_alive,
        }
    }

    /// Record an enemy death. The only path that lowers the alive count.
    pub fn on_enemy_death(&mut self) {
        self.round.enemies_alive = self.round.enemies_alive.saturating_sub(1);
    }

    /// Advance the wave state machine by `dt` seconds.
    pub fn tick(
        &mut self,
        dt: f32,
        ctx: &SpawnContext<'_>,
        rng: &mut DeterministicRng,
    ) -> Vec<DirectorAction> {
        let mut actions = Vec::new();

        match self.phase {
            RoundPhase::PreRound { remaining } | RoundPhase::Intermission { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.begin_round(&mut actions);
                    self.run_spawning(0.0, ctx, rng, &mut actions);
                } else if matches!(self.phase, RoundPhase::PreRound { .. }) {
                    self.phase = RoundPhase::PreRound { remaining };
                } else {
                    self.phase = RoundPhase::Intermission { remaining };
                }
            }
            RoundPhase::Spawning { .. } => {
                self.run_spawning(dt, ctx, rng, &mut actions);
            }
            RoundPhase::AwaitingClear => {}
        }

        if self.phase == RoundPhase::AwaitingClear && self.round.is_cleared() {
            let round = self.round.round_number;
            info!(round, "Round completed");
            actions.push(DirectorAction::RoundCompleted { round });
            self.phase = RoundPhase::Intermission {
                remaining: self.config.intermission,
            };
        }

        actions
    }

    fn begin_round(&mut self, actions: &mut Vec<DirectorAction>) {
        let number = self.round.round_number + 1;
        self.round = RoundState::for_round(number, self.config.initial_enemies);
        self.phase = RoundPhase::Spawning { next: 0.0 };

        info!(
            round = number,
            enemies = self.round.enemies_target,
            "Round starting"
        );
        actions.push(DirectorAction::RoundStarted {
            round: number,
            enemies_target: self.round.enemies_target,
        });
    }

    fn run_spawning(
        &mut self,
        dt: f32,
        ctx: &SpawnContext<'_>,
        rng: &mut DeterministicRng,
        actions: &mut Vec<DirectorAction>,
    ) {
        let RoundPhase::Spawning { next } = self.phase else {
            return;
        };
        let mut next = next - dt;

        // Catch-up spawns only; a stalled attempt waits for a later tick
        while next <= 0.0 {
            if self.round.enemies_spawned >= self.round.enemies_target {
                break;
            }

            let order = if self.round.enemies_alive >= self.config.max_concurrent_enemies {
                None
            } else {
                self.plan_spawn(ctx, rng)
            };

            let Some(order) = order else {
                next = next.max(0.0) + self.config.poll_interval;
                break;
            };

            self.round.enemies_spawned += 1;
            self.round.enemies_alive += 1;
            debug!(
                round = self.round.round_number,
                spec = %order.spec.name,
                spawned = self.round.enemies_spawned,
                target = self.round.enemies_target,
                "Spawning enemy"
            );
            actions.push(DirectorAction::Spawn(order));
            next += self.config.spawn_delay;
        }

        self.phase = if self.round.enemies_spawned >= self.round.enemies_target {
            RoundPhase::AwaitingClear
        } else {
            RoundPhase::Spawning { next }
        };
    }

    fn plan_spawn(&self, ctx: &SpawnContext<'_>, rng: &mut DeterministicRng) -> Option<SpawnOrder> {
        let round = self.round.round_number;

        let candidates = eligible_specs(ctx.catalog, round);
        let Some(spec) = choose_spec(&candidates, rng) else {
            warn!(round, "No eligible enemy to spawn, retrying");
            return None;
        };

        let Some(spawn_point) =
            choose_spawn_point(ctx.spawn_points, ctx.target, self.config.spawn_point_pool, rng)
        else {
            warn!(round, "No spawn points available, retrying");
            return None;
        };

        Some(SpawnOrder {
            spec: spec.clone(),
            stats: scale_stats(spec, round, &self.config),
            spawn_point,
            position: ctx.spawn_points[spawn_point],
        })
    }

    /// Add director state to hash.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        match self.phase {
            RoundPhase::PreRound { remaining } => {
                hasher.update_u8(0);
                hasher.update_f32(remaining);
            }
            RoundPhase::Spawning { next } => {
                hasher.update_u8(1);
                hasher.update_f32(next);
            }
            RoundPhase::AwaitingClear => hasher.update_u8(2),
            RoundPhase::Intermission { remaining } => {
                hasher.update_u8(3);
                hasher.update_f32(remaining);
            }
        }
        hasher.update_u32(self.round.round_number);
        hasher.update_u32(self.round.enemies_target);
        hasher.update_u32(self.round.enemies_spawned);
        hasher.update_u32(self.round.enemies_alive);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::default_enemy_catalog;
    use proptest::prelude::*;

    fn points() -> Vec<Vec3> {
        vec![
            Vec3::new(30.0, 0.0, 0.0),
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::new(-20.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 8.0),
        ]
    }

    fn fast_config() -> RoundConfig {
        RoundConfig {
            initial_round_delay: 1.0,
            intermission: 2.0,
            ..RoundConfig::default()
        }
    }

    fn spawned(actions: &[DirectorAction]) -> usize {
        actions
            .iter()
            .filter(|a| matches!(a, DirectorAction::Spawn(_)))
            .count()
    }

    #[test]
    fn test_round_one_target() {
        assert_eq!(enemies_for_round(5, 1), 9);
        assert_eq!(enemies_for_round(5, 2), 13);
        assert_eq!(enemies_for_round(0, 10), 49);
    }

    #[test]
    fn test_scaling() {
        let spec = EnemySpec::new("grunt", 100, 10, 3.5);
        let config = RoundConfig::default();

        let first = scale_stats(&spec, 1, &config);
        assert_eq!(first.health, 100);
        assert_eq!(first.damage, 10);
        assert_eq!(first.speed, 3.5);

        let fifth = scale_stats(&spec, 5, &config);
        assert_eq!(fifth.health, 140);
        assert_eq!(fifth.damage, 12);
        assert!((fifth.speed - 3.78).abs() < 1e-4);
    }

    #[test]
    fn test_eligibility() {
        let catalog = default_enemy_catalog();
        assert_eq!(eligible_specs(&catalog, 1).len(), 1);
        assert_eq!(eligible_specs(&catalog, 2).len(), 2);
        assert_eq!(eligible_specs(&catalog, 4).len(), 3);
    }

    #[test]
    fn test_weighted_boundaries() {
        let weights = [1.0, 2.0, 1.0];
        assert_eq!(select_weighted(&weights, 0.0), Some(0));
        assert_eq!(select_weighted(&weights, 0.999), Some(0));
        assert_eq!(select_weighted(&weights, 1.0), Some(1));
        assert_eq!(select_weighted(&weights, 2.999), Some(1));
        assert_eq!(select_weighted(&weights, 3.0), Some(2));
        assert_eq!(select_weighted(&weights, 4.0), None);
    }

    #[test]
    fn test_weighted_degenerate() {
        assert_eq!(select_weighted(&[], 0.0), None);
        assert_eq!(select_weighted(&[0.0, 0.0], 0.0), None);

        let mut rng = DeterministicRng::new(1);
        assert!(choose_spec(&[], &mut rng).is_none());

        let zero = EnemySpec::new("zero", 10, 1, 1.0).with_weight(0.0);
        assert!(choose_spec(&[&zero], &mut rng).is_none());
    }

    #[test]
    fn test_zero_weight_never_chosen() {
        let weights = [0.0, 1.0, 0.0];
        for step in 0..100 {
            let draw = step as f32 / 100.0;
            assert_eq!(select_weighted(&weights, draw), Some(1));
        }
    }

    #[test]
    fn test_spawn_point_nearest_pool() {
        let mut rng = DeterministicRng::new(42);
        let target = Some(Vec3::new(4.0, 0.0, 1.0));

        for _ in 0..100 {
            let index = choose_spawn_point(&points(), target, 2, &mut rng).unwrap();
            // Nearest two: index 1 (distance ~1.4) and index 3 (distance ~8.1)
            assert!(index == 1 || index == 3, "picked {index}");
        }
    }

    #[test]
    fn test_spawn_point_without_target_uses_all() {
        let mut rng = DeterministicRng::new(42);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let index = choose_spawn_point(&points(), None, 2, &mut rng).unwrap();
            seen[index] = true;
        }
        assert!(seen.iter().all(|s| *s));

        assert!(choose_spawn_point(&[], None, 2, &mut rng).is_none());
    }

    #[test]
    fn test_spawn_point_single_pool() {
        let mut rng = DeterministicRng::new(3);
        let target = Some(Vec3::new(-19.0, 0.0, 0.0));
        for _ in 0..20 {
            assert_eq!(choose_spawn_point(&points(), target, 1, &mut rng), Some(2));
        }
    }

    #[test]
    fn test_spawn_point_pool_larger_than_level() {
        let mut rng = DeterministicRng::new(8);
        let single = [Vec3::new(12.0, 0.0, -3.0)];
        for _ in 0..20 {
            assert_eq!(
                choose_spawn_point(&single, Some(Vec3::ZERO), 2, &mut rng),
                Some(0)
            );
        }

        let mut seen = [false; 4];
        for _ in 0..200 {
            let index = choose_spawn_point(&points(), Some(Vec3::ZERO), 10, &mut rng).unwrap();
            seen[index] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_lobby_then_paced_spawning() {
        let catalog = default_enemy_catalog();
        let spawn_points = points();
        let ctx = SpawnContext {
            catalog: &catalog,
            spawn_points: &spawn_points,
            target: None,
        };
        let mut rng = DeterministicRng::new(7);
        let mut director = RoundDirector::new(&fast_config());

        // Lobby
        assert!(director.tick(0.5, &ctx, &mut rng).is_empty());
        assert_eq!(director.status().round_number, 0);

        // Round 1 starts and spawns the first enemy immediately
        let actions = director.tick(0.5, &ctx, &mut rng);
        assert_eq!(
            actions[0],
            DirectorAction::RoundStarted { round: 1, enemies_target: 9 }
        );
        assert_eq!(spawned(&actions), 1);

        // One spawn per second after that
        assert_eq!(spawned(&director.tick(0.5, &ctx, &mut rng)), 0);
        assert_eq!(spawned(&director.tick(0.5, &ctx, &mut rng)), 1);
        assert_eq!(director.round().enemies_spawned, 2);
        assert_eq!(director.round().enemies_alive, 2);
    }

    #[test]
    fn test_cleared_only_after_all_spawned_and_dead() {
        let catalog = default_enemy_catalog();
        let spawn_points = points();
        let ctx = SpawnContext {
            catalog: &catalog,
            spawn_points: &spawn_points,
            target: None,
        };
        let mut rng = DeterministicRng::new(11);
        let mut director = RoundDirector::new(&fast_config());

        director.tick(1.0, &ctx, &mut rng);

        // Kill every enemy as soon as it spawns; never cleared before 9 spawns
        let mut completed_at = None;
        for step in 0..20 {
            while director.round().enemies_alive > 0 {
                director.on_enemy_death();
            }
            let actions = director.tick(1.0, &ctx, &mut rng);
            if actions.contains(&DirectorAction::RoundCompleted { round: 1 }) {
                completed_at = Some(step);
                break;
            }
            if director.round().enemies_spawned < director.round().enemies_target {
                assert!(!director.round().is_cleared());
            }
        }

        assert!(completed_at.is_some());
        assert_eq!(director.round().enemies_spawned, 9);
        assert!(matches!(director.phase(), RoundPhase::Intermission { .. }));
    }

    #[test]
    fn test_intermission_starts_next_round() {
        let catalog = default_enemy_catalog();
        let spawn_points = points();
        let ctx = SpawnContext {
            catalog: &catalog,
            spawn_points: &spawn_points,
            target: None,
        };
        let mut rng = DeterministicRng::new(5);
        let mut director = RoundDirector::new(&fast_config());

        director.tick(1.0, &ctx, &mut rng);
        for _ in 0..20 {
            while director.round().enemies_alive > 0 {
                director.on_enemy_death();
            }
            director.tick(1.0, &ctx, &mut rng);
            if matches!(director.phase(), RoundPhase::Intermission { .. }) {
                break;
            }
        }

        assert!(director.tick(1.0, &ctx, &mut rng).is_empty());
        let actions = director.tick(1.0, &ctx, &mut rng);
        assert_eq!(
            actions[0],
            DirectorAction::RoundStarted { round: 2, enemies_target: 13 }
        );
    }

    #[test]
    fn test_concurrency_ceiling_polls() {
        let catalog = default_enemy_catalog();
        let spawn_points = points();
        let ctx = SpawnContext {
            catalog: &catalog,
            spawn_points: &spawn_points,
            target: None,
        };
        let config = RoundConfig {
            initial_round_delay: 0.0,
            max_concurrent_enemies: 2,
            ..RoundConfig::default()
        };
        let mut rng = DeterministicRng::new(9);
        let mut director = RoundDirector::new(&config);

        for _ in 0..10 {
            director.tick(1.0, &ctx, &mut rng);
        }
        assert_eq!(director.round().enemies_alive, 2);
        assert_eq!(director.round().enemies_spawned, 2);

        director.on_enemy_death();
        director.tick(0.5, &ctx, &mut rng);
        assert_eq!(director.round().enemies_spawned, 3);
    }

    #[test]
    fn test_empty_catalog_never_spawns() {
        let spawn_points = points();
        let ctx = SpawnContext {
            catalog: &[],
            spawn_points: &spawn_points,
            target: None,
        };
        let mut rng = DeterministicRng::new(1);
        let mut director = RoundDirector::new(&fast_config());

        for _ in 0..10 {
            director.tick(1.0, &ctx, &mut rng);
        }
        assert_eq!(director.round().round_number, 1);
        assert_eq!(director.round().enemies_spawned, 0);
        assert!(matches!(director.phase(), RoundPhase::Spawning { .. }));
    }

    #[test]
    fn test_stalled_spawning_retries_once_per_tick() {
        let catalog = default_enemy_catalog();
        let ctx = SpawnContext {
            catalog: &catalog,
            spawn_points: &[],
            target: None,
        };
        let mut rng = DeterministicRng::new(1);
        let mut director = RoundDirector::new(&fast_config());

        director.tick(1.0, &ctx, &mut rng);
        let actions = director.tick(1.0e8, &ctx, &mut rng);

        assert!(actions.is_empty());
        assert_eq!(director.round().enemies_spawned, 0);
        assert_eq!(
            director.phase(),
            RoundPhase::Spawning {
                next: fast_config().poll_interval
            }
        );
    }

    #[test]
    fn test_ceiling_stall_survives_huge_step() {
        let catalog = default_enemy_catalog();
        let spawn_points = points();
        let ctx = SpawnContext {
            catalog: &catalog,
            spawn_points: &spawn_points,
            target: None,
        };
        let config = RoundConfig {
            initial_round_delay: 0.0,
            max_concurrent_enemies: 1,
            ..RoundConfig::default()
        };
        let mut rng = DeterministicRng::new(2);
        let mut director = RoundDirector::new(&config);

        director.tick(0.0, &ctx, &mut rng);
        assert_eq!(director.round().enemies_alive, 1);

        assert!(director.tick(1.0e8, &ctx, &mut rng).is_empty());
        assert_eq!(director.round().enemies_spawned, 1);

        // Freed slot is used on the next attempt
        director.on_enemy_death();
        let actions = director.tick(config.poll_interval, &ctx, &mut rng);
        assert_eq!(spawned(&actions), 1);
    }

    #[test]
    fn test_death_never_underflows() {
        let mut director = RoundDirector::new(&RoundConfig::default());
        director.on_enemy_death();
        assert_eq!(director.round().enemies_alive, 0);
    }

    proptest! {
        #[test]
        fn prop_target_monotonic(initial in 0u32..50, round in 1u32..500) {
            prop_assert!(enemies_for_round(initial, round + 1) >= enemies_for_round(initial, round));
        }

        #[test]
        fn prop_draw_lands_in_its_interval(
            weights in proptest::collection::vec(0.0f32..10.0, 1..8),
            share in 0.0f32..1.0,
        ) {
            let total: f32 = weights.iter().sum();
            prop_assume!(total > 0.0);
            let draw = total * share;
            prop_assume!(draw < total);

            let index = select_weighted(&weights, draw).unwrap();
            let below: f32 = weights[..index].iter().sum();
            let through: f32 = weights[..=index].iter().sum();
            prop_assert!(below <= draw && draw < through);
            prop_assert!(weights[index] > 0.0);
        }
    }
}

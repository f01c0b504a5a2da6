//! Enemy Behaviour
//!
//! Chase the tracked target, flank it when close, strike it in range.
//!
//! - Beyond `cornering_distance`: path straight at the target.
//! - Inside the cornering band: path to a flank point. The flank angle is
//!   drawn once when the enemy enters the band and kept until it leaves.
//! - Within `attack_range`: hit the target for the enemy's scaled damage,
//!   then wait out the attack cooldown.

use crate::core::vec3::Vec3;
use crate::game::combat::damage_player;
use crate::game::config::EnemyAiConfig;
use crate::game::state::{ActorId, EnemyPosture, SessionState};
use crate::game::world::World;

/// Advance every living, navigable enemy.
pub fn update_enemies<W: World + ?Sized>(
    state: &mut SessionState,
    world: &mut W,
    config: &EnemyAiConfig,
    dt: f32,
) {
    let target = state.live_target();
    let target_position = target.and_then(|id| world.position_of(id));

    let ids: Vec<ActorId> = state.enemies.keys().copied().collect();
    for id in ids {
        let Some(enemy) = state.enemies.get_mut(&id) else {
            continue;
        };
        if !enemy.is_alive() {
            continue;
        }
        enemy.attack_cooldown.tick(dt);
        if enemy.is_knocked_back() {
            continue;
        }

        // No target or unknown positions: hold this tick
        let (Some(target), Some(target_position)) = (target, target_position) else {
            continue;
        };
        let Some(position) = world.position_of(id) else {
            continue;
        };
        let distance = position.distance(target_position);

        if distance <= config.attack_range {
            enemy.posture = EnemyPosture::Attack;
            enemy.corner_offset = None;
            if enemy.attack_cooldown.is_ready() {
                enemy.attack_cooldown.restart();
                let damage = enemy.stats.damage as f32;
                damage_player(state, target, damage);
            }
            continue;
        }

        if distance < config.cornering_distance {
            let angle = match enemy.corner_offset {
                Some(angle) => angle,
                None => {
                    let angle = state
                        .rng
                        .next_int_range(-config.cornering_angle, config.cornering_angle);
                    enemy.corner_offset = Some(angle);
                    angle
                }
            };
            enemy.posture = EnemyPosture::Corner;
            let destination = flank_point(position, target_position, angle, config.cornering_distance);
            world.request_path(id, destination);
        } else {
            enemy.posture = EnemyPosture::Chase;
            enemy.corner_offset = None;
            world.request_path(id, target_position);
        }
    }
}

/// Flank destination: the approach direction rotated by `angle` degrees,
/// `distance` away from the target.
pub fn flank_point(position: Vec3, target: Vec3, angle: i32, distance: f32) -> Vec3 {
    let approach = (position - target).flatten().normalize();
    target + approach.rotate_y(angle as f32).scale(distance)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::SessionConfig;
    use crate::game::events::GameEventData;
    use crate::game::round::scale_stats;
    use crate::game::state::{EnemyState, SessionId};
    use crate::game::world::{EnemySpawn, SandboxWorld, WorldCommands};

    struct Field {
        state: SessionState,
        world: SandboxWorld,
        config: SessionConfig,
        player: ActorId,
    }

    impl Field {
        fn new() -> Self {
            let config = SessionConfig::default();
            let mut state = SessionState::new(SessionId::default(), 77, &config);
            let mut world = SandboxWorld::new();
            let player = state.add_player(&config);
            world.add_player(player, Vec3::ZERO);
            Self {
                state,
                world,
                config,
                player,
            }
        }

        fn spawn(&mut self, position: Vec3) -> ActorId {
            let id = self.state.allocate_actor_id();
            let spec = &self.config.enemies[0];
            let stats = scale_stats(spec, 1, &self.config.rounds);
            self.world.spawn_enemy(&EnemySpawn {
                id,
                spec: &spec.name,
                position,
                speed: stats.speed,
                radius: spec.collision_radius,
            });
            let enemy = EnemyState::new(id, spec, stats, self.config.enemy_ai.attack_cooldown);
            self.state.enemies.insert(id, enemy);
            id
        }

        fn update(&mut self, dt: f32) {
            update_enemies(&mut self.state, &mut self.world, &self.config.enemy_ai, dt);
        }
    }

    #[test]
    fn test_far_enemy_chases_target() {
        let mut field = Field::new();
        let enemy = field.spawn(Vec3::new(0.0, 0.0, 20.0));

        field.update(0.1);
        assert_eq!(field.state.enemies[&enemy].posture, EnemyPosture::Chase);
        assert_eq!(field.world.destination_of(enemy), Some(Vec3::ZERO));
    }

    #[test]
    fn test_cornering_offset_is_sticky() {
        let mut field = Field::new();
        let enemy = field.spawn(Vec3::new(0.0, 0.0, 4.0));

        field.update(0.1);
        let first = field.state.enemies[&enemy].corner_offset;
        assert!(first.is_some());
        assert_eq!(field.state.enemies[&enemy].posture, EnemyPosture::Corner);

        let angle = first.unwrap();
        assert!((-45..=45).contains(&angle));

        field.update(0.1);
        assert_eq!(field.state.enemies[&enemy].corner_offset, first);

        let destination = field.world.destination_of(enemy).unwrap();
        assert!((destination.length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_attack_in_range_respects_cooldown() {
        let mut field = Field::new();
        field.spawn(Vec3::new(0.0, 0.0, 1.5));

        field.update(0.25);
        let health = field.state.players[&field.player].health.current_health;
        assert_eq!(health, 90.0);

        // Cooldown 1.5 s between strikes
        for _ in 0..5 {
            field.update(0.25);
        }
        assert_eq!(field.state.players[&field.player].health.current_health, 90.0);

        field.update(0.25);
        assert_eq!(field.state.players[&field.player].health.current_health, 80.0);

        let damage_events = field
            .state
            .take_events()
            .into_iter()
            .filter(|e| matches!(e.data, GameEventData::DamageApplied { .. }))
            .count();
        assert_eq!(damage_events, 2);
    }

    #[test]
    fn test_knocked_back_enemy_holds() {
        let mut field = Field::new();
        let enemy = field.spawn(Vec3::new(0.0, 0.0, 1.0));
        field.state.enemies.get_mut(&enemy).unwrap().knockback = Some(crate::game::state::KnockbackWindow {
            remaining: crate::core::timer::Cooldown::running(0.5),
        });

        field.update(0.1);
        assert_eq!(field.state.players[&field.player].health.current_health, 100.0);
    }

    #[test]
    fn test_no_target_holds() {
        let mut field = Field::new();
        let enemy = field.spawn(Vec3::new(0.0, 0.0, 20.0));
        field.state.tracked_target = None;

        field.update(0.1);
        assert_eq!(field.world.destination_of(enemy), None);
    }

    #[test]
    fn test_flank_point_rotation() {
        let point = flank_point(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, 90, 5.0);
        assert!((point.x - 5.0).abs() < 1e-4);
        assert!(point.z.abs() < 1e-4);
    }
}

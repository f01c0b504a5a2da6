//! Session Configuration
//!
//! Every balancing constant the simulation reads, grouped by subsystem.
//! Loaded from JSON at startup and validated before the first tick; a bad
//! catalog fails here instead of inside the loop.

use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};

use crate::game::ability::AbilityKind;
use crate::game::effect::SpeedCurve;

/// Configuration load/validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for this schema.
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A scalar setting is out of range.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted path of the setting.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An enemy catalog entry is unusable.
    #[error("Enemy spec '{name}' is invalid: {reason}")]
    InvalidEnemy {
        /// Catalog name of the entry.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}

// =============================================================================
// ENEMY CATALOG
// =============================================================================

/// Static enemy template. Read-only at runtime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySpec {
    /// Catalog name (the host maps it to a prefab)
    pub name: String,
    /// Health at round 1
    pub base_health: u32,
    /// Attack damage at round 1
    pub base_damage: u32,
    /// Movement speed at round 1
    pub base_speed: f32,
    /// First round this enemy may spawn in
    #[serde(default = "default_min_round")]
    pub min_round_to_appear: u32,
    /// Relative spawn weight among eligible enemies
    #[serde(default = "default_spawn_weight")]
    pub spawn_weight: f32,
    /// Multiplier applied to all incoming water damage
    #[serde(default = "default_elemental_multiplier")]
    pub elemental_multiplier: f32,
    /// Share of knockback force ignored, in [0, 1]
    #[serde(default = "default_knockback_resistance")]
    pub knockback_resistance: f32,
    /// Whether knockback impulses affect this enemy at all
    #[serde(default = "default_true")]
    pub knockback_enabled: bool,
    /// Radius of the collision sphere
    #[serde(default = "default_collision_radius")]
    pub collision_radius: f32,
}

fn default_min_round() -> u32 {
    1
}

fn default_spawn_weight() -> f32 {
    1.0
}

fn default_elemental_multiplier() -> f32 {
    1.5
}

fn default_knockback_resistance() -> f32 {
    0.5
}

fn default_true() -> bool {
    true
}

fn default_collision_radius() -> f32 {
    0.5
}

impl EnemySpec {
    /// Create a spec with default multipliers.
    pub fn new(name: &str, base_health: u32, base_damage: u32, base_speed: f32) -> Self {
        Self {
            name: name.to_string(),
            base_health,
            base_damage,
            base_speed,
            min_round_to_appear: default_min_round(),
            spawn_weight: default_spawn_weight(),
            elemental_multiplier: default_elemental_multiplier(),
            knockback_resistance: default_knockback_resistance(),
            knockback_enabled: true,
            collision_radius: default_collision_radius(),
        }
    }

    /// Builder: first eligible round.
    pub fn from_round(mut self, round: u32) -> Self {
        self.min_round_to_appear = round;
        self
    }

    /// Builder: spawn weight.
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.spawn_weight = weight;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let fail = |reason: &str| ConfigError::InvalidEnemy {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.base_health == 0 {
            return Err(fail("base_health must be positive"));
        }
        if !self.base_speed.is_finite() || self.base_speed < 0.0 {
            return Err(fail("base_speed must be finite and non-negative"));
        }
        if !self.spawn_weight.is_finite() || self.spawn_weight < 0.0 {
            return Err(fail("spawn_weight must be finite and non-negative"));
        }
        if !self.elemental_multiplier.is_finite() || self.elemental_multiplier < 0.0 {
            return Err(fail("elemental_multiplier must be finite and non-negative"));
        }
        if !(0.0..=1.0).contains(&self.knockback_resistance) {
            return Err(fail("knockback_resistance must be within [0, 1]"));
        }
        if !self.collision_radius.is_finite() || self.collision_radius <= 0.0 {
            return Err(fail("collision_radius must be positive"));
        }
        Ok(())
    }
}

/// The stock enemy roster.
pub fn default_enemy_catalog() -> Vec<EnemySpec> {
    vec![
        EnemySpec::new("ember_grunt", 100, 10, 3.5),
        EnemySpec::new("cinder_runner", 60, 8, 5.0)
            .from_round(2)
            .with_weight(0.6),
        EnemySpec {
            knockback_resistance: 0.8,
            collision_radius: 0.9,
            ..EnemySpec::new("magma_brute", 250, 25, 2.5)
                .from_round(4)
                .with_weight(0.3)
        },
    ]
}

// =============================================================================
// SUBSYSTEM SETTINGS
// =============================================================================

/// Wave pacing and difficulty growth.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    /// Base enemies in round 1 (before the per-round terms)
    pub initial_enemies: u32,
    /// Maximum alive enemies at once
    pub max_concurrent_enemies: u32,
    /// Seconds between individual spawns
    pub spawn_delay: f32,
    /// Seconds between retries while at the ceiling or when no spawn was possible
    pub poll_interval: f32,
    /// Lobby delay before round 1
    pub initial_round_delay: f32,
    /// Breather after a cleared round
    pub intermission: f32,
    /// Health growth per round (0.1 = +10%)
    pub health_growth: f32,
    /// Damage growth per round
    pub damage_growth: f32,
    /// Speed growth per round
    pub speed_growth: f32,
    /// How many of the nearest spawn points to choose between
    pub spawn_point_pool: usize,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            initial_enemies: 5,
            max_concurrent_enemies: 24,
            spawn_delay: 1.0,
            poll_interval: 0.5,
            initial_round_delay: 5.0,
            intermission: 5.0,
            health_growth: 0.10,
            damage_growth: 0.05,
            speed_growth: 0.02,
            spawn_point_pool: 2,
        }
    }
}

/// Damage and death resolution settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Multiplier for critical (head) hits
    pub critical_multiplier: f32,
    /// Seconds navigation stays disabled after a knockback
    pub knockback_disable_time: f32,
    /// Seconds a dead enemy stays in the simulation before removal
    pub death_removal_delay: f32,
    /// Seconds the last-hit marker stays visible
    pub hit_marker_duration: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            critical_multiplier: 2.0,
            knockback_disable_time: 0.5,
            death_removal_delay: 1.0,
            hit_marker_duration: 1.5,
        }
    }
}

/// Cooldown, damage and reach of one ability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityTuning {
    /// Seconds between activations
    pub cooldown: f32,
    /// Seconds in the Active phase before the effect is released (0 = instant)
    #[serde(default)]
    pub cast_time: f32,
    /// Raw damage per hit
    pub damage: f32,
    /// Impact / area radius
    pub radius: f32,
    /// Knockback force before resistance
    pub knockback: f32,
}

/// Water ball travel settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    /// Travel progress per second (1.0 = one second to the target)
    pub speed: f32,
    /// Easing applied to travel progress
    pub curve: SpeedCurve,
    /// Distance to the target that counts as arrived
    pub arrival_radius: f32,
    /// Seconds the ball lingers after impact
    pub impact_grace: f32,
    /// Distance in front of the viewpoint while carried
    pub hold_distance: f32,
    /// Sideways offset to the right of the viewpoint while carried
    pub hold_offset: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: 1.5,
            curve: SpeedCurve::Linear,
            arrival_radius: 0.4,
            impact_grace: 0.5,
            hold_distance: 2.0,
            hold_offset: 1.5,
        }
    }
}

/// Water bend travel settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BendTuning {
    /// Puddle rise progress per second
    pub puddle_rate: f32,
    /// Distance per second at full ramp
    pub travel_speed: f32,
    /// Ramp gained per second
    pub ramp_rate: f32,
    /// Length of the water body itself
    pub shape_length: f32,
    /// Curved path length relative to the straight line
    pub path_factor: f32,
    /// Seconds the effect lingers after resolution
    pub linger: f32,
}

impl Default for BendTuning {
    fn default() -> Self {
        Self {
            puddle_rate: 2.0,
            travel_speed: 12.0,
            ramp_rate: 1.5,
            shape_length: 1.0,
            path_factor: 1.4,
            linger: 2.0,
        }
    }
}

/// Water tube travel settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TubeTuning {
    /// Seconds to reach the target
    pub duration: f32,
    /// Seconds the effect lingers after resolution
    pub linger: f32,
}

impl Default for TubeTuning {
    fn default() -> Self {
        Self {
            duration: 1.5,
            linger: 0.5,
        }
    }
}

/// All ability settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityConfig {
    /// Primary attack
    pub water_ball: AbilityTuning,
    /// Ability 1
    pub water_bend: AbilityTuning,
    /// Ability 2
    pub water_tube: AbilityTuning,
    /// Ball travel
    pub projectile: ProjectileTuning,
    /// Bend travel
    pub bend: BendTuning,
    /// Tube travel
    pub tube: TubeTuning,
    /// Distance in front of the viewpoint where area effects start
    pub spawn_distance: f32,
    /// Aim distance used when the host supplies no aim point
    pub fallback_aim_distance: f32,
}

impl Default for AbilityConfig {
    fn default() -> Self {
        Self {
            water_ball: AbilityTuning {
                cooldown: 0.2,
                cast_time: 0.0,
                damage: 10.0,
                radius: 1.0,
                knockback: 5.0,
            },
            water_bend: AbilityTuning {
                cooldown: 5.0,
                cast_time: 0.0,
                damage: 15.0,
                radius: 3.0,
                knockback: 8.0,
            },
            water_tube: AbilityTuning {
                cooldown: 7.0,
                cast_time: 0.0,
                damage: 20.0,
                radius: 3.0,
                knockback: 12.0,
            },
            projectile: ProjectileTuning::default(),
            bend: BendTuning::default(),
            tube: TubeTuning::default(),
            spawn_distance: 2.0,
            fallback_aim_distance: 100.0,
        }
    }
}

impl AbilityConfig {
    /// Tuning for one ability slot.
    pub fn tuning(&self, kind: AbilityKind) -> &AbilityTuning {
        match kind {
            AbilityKind::WaterBall => &self.water_ball,
            AbilityKind::WaterBend => &self.water_bend,
            AbilityKind::WaterTube => &self.water_tube,
        }
    }
}

/// Player controller and vitals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Starting max health
    pub max_health: f32,
    /// Seconds without damage before regeneration starts
    pub regen_delay: f32,
    /// Health regenerated per second
    pub regen_rate: f32,
    /// Walk speed
    pub move_speed: f32,
    /// Sprint speed
    pub sprint_speed: f32,
    /// Jump apex height
    pub jump_height: f32,
    /// Vertical acceleration (negative = down)
    pub gravity: f32,
    /// Eye height above the actor position
    pub eye_height: f32,
    /// Pitch clamp in degrees
    pub max_pitch: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            regen_delay: 5.0,
            regen_rate: 10.0,
            move_speed: 5.0,
            sprint_speed: 8.0,
            jump_height: 3.0,
            gravity: -9.81,
            eye_height: 1.6,
            max_pitch: 90.0,
        }
    }
}

/// Enemy behaviour settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyAiConfig {
    /// Distance at which an enemy attacks
    pub attack_range: f32,
    /// Distance at which an enemy starts flanking
    pub cornering_distance: f32,
    /// Maximum flank rotation in degrees either side
    pub cornering_angle: i32,
    /// Seconds between attacks
    pub attack_cooldown: f32,
}

impl Default for EnemyAiConfig {
    fn default() -> Self {
        Self {
            attack_range: 2.0,
            cornering_distance: 5.0,
            cornering_angle: 45,
            attack_cooldown: 1.5,
        }
    }
}

/// Rewards and perk shop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Money at session start
    pub starting_money: u32,
    /// Reward per kill
    pub money_per_kill: u32,
    /// Total reward for a headshot kill (replaces the kill reward)
    pub money_per_headshot: u32,
    /// Reward per extinguished fire
    pub money_per_fire: u32,
    /// Maximum perks owned at once
    pub max_perks: usize,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_money: 500,
            money_per_kill: 50,
            money_per_headshot: 100,
            money_per_fire: 10,
            max_perks: 5,
        }
    }
}

/// Fire hazard settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireConfig {
    /// Water hits needed to put a fire out
    pub hits_to_extinguish: u32,
    /// Seconds before an extinguished fire reignites
    pub reignite_delay: f32,
    /// Distance within which the interact intent reaches a fire
    pub interaction_range: f32,
}

impl Default for FireConfig {
    fn default() -> Self {
        Self {
            hits_to_extinguish: 3,
            reignite_delay: 30.0,
            interaction_range: 5.0,
        }
    }
}

// =============================================================================
// SESSION CONFIG
// =============================================================================

/// Complete configuration for a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Level name (feeds seed derivation)
    pub level: String,
    /// Wave pacing
    pub rounds: RoundConfig,
    /// Damage resolution
    pub combat: CombatConfig,
    /// Abilities and effects
    pub abilities: AbilityConfig,
    /// Player controller
    pub player: PlayerConfig,
    /// Enemy behaviour
    pub enemy_ai: EnemyAiConfig,
    /// Rewards
    pub economy: EconomyConfig,
    /// Fire hazards
    pub fire: FireConfig,
    /// Enemy catalog
    pub enemies: Vec<EnemySpec>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            level: "harbor".to_string(),
            rounds: RoundConfig::default(),
            combat: CombatConfig::default(),
            abilities: AbilityConfig::default(),
            player: PlayerConfig::default(),
            enemy_ai: EnemyAiConfig::default(),
            economy: EconomyConfig::default(),
            fire: FireConfig::default(),
            enemies: default_enemy_catalog(),
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check every value the simulation divides by or multiplies with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rounds = &self.rounds;
        positive("rounds.spawn_delay", rounds.spawn_delay)?;
        positive("rounds.poll_interval", rounds.poll_interval)?;
        non_negative("rounds.initial_round_delay", rounds.initial_round_delay)?;
        non_negative("rounds.intermission", rounds.intermission)?;
        non_negative("rounds.health_growth", rounds.health_growth)?;
        non_negative("rounds.damage_growth", rounds.damage_growth)?;
        non_negative("rounds.speed_growth", rounds.speed_growth)?;
        if rounds.max_concurrent_enemies == 0 {
            return Err(invalid("rounds.max_concurrent_enemies", "must be at least 1"));
        }
        if rounds.spawn_point_pool == 0 {
            return Err(invalid("rounds.spawn_point_pool", "must be at least 1"));
        }

        let combat = &self.combat;
        non_negative("combat.critical_multiplier", combat.critical_multiplier)?;
        non_negative("combat.knockback_disable_time", combat.knockback_disable_time)?;
        non_negative("combat.death_removal_delay", combat.death_removal_delay)?;
        non_negative("combat.hit_marker_duration", combat.hit_marker_duration)?;

        for kind in AbilityKind::ALL {
            let tuning = self.abilities.tuning(kind);
            let name = kind.name();
            non_negative(&format!("abilities.{name}.cooldown"), tuning.cooldown)?;
            non_negative(&format!("abilities.{name}.cast_time"), tuning.cast_time)?;
            non_negative(&format!("abilities.{name}.damage"), tuning.damage)?;
            non_negative(&format!("abilities.{name}.radius"), tuning.radius)?;
            non_negative(&format!("abilities.{name}.knockback"), tuning.knockback)?;
        }
        positive("abilities.projectile.speed", self.abilities.projectile.speed)?;
        positive("abilities.tube.duration", self.abilities.tube.duration)?;
        positive("abilities.bend.puddle_rate", self.abilities.bend.puddle_rate)?;
        positive("abilities.bend.travel_speed", self.abilities.bend.travel_speed)?;
        positive("abilities.bend.ramp_rate", self.abilities.bend.ramp_rate)?;

        let player = &self.player;
        positive("player.max_health", player.max_health)?;
        non_negative("player.regen_delay", player.regen_delay)?;
        non_negative("player.regen_rate", player.regen_rate)?;

        if !(0..=180).contains(&self.enemy_ai.cornering_angle) {
            return Err(invalid("enemy_ai.cornering_angle", "must be between 0 and 180 degrees"));
        }

        if self.fire.hits_to_extinguish == 0 {
            return Err(invalid("fire.hits_to_extinguish", "must be at least 1"));
        }

        for spec in &self.enemies {
            spec.validate()?;
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be finite and positive"))
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be finite and non-negative"))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rounds.initial_enemies, 5);
        assert_eq!(config.abilities.water_bend.cooldown, 5.0);
        assert_eq!(config.enemies.len(), 3);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "rounds": { "initial_enemies": 8 },
            "enemies": [
                { "name": "ember_grunt", "base_health": 120, "base_damage": 12, "base_speed": 3.0 }
            ]
        }"#;

        let config = SessionConfig::from_json_str(json).unwrap();
        assert_eq!(config.rounds.initial_enemies, 8);
        assert_eq!(config.rounds.max_concurrent_enemies, 24);
        assert_eq!(config.enemies.len(), 1);

        let grunt = &config.enemies[0];
        assert_eq!(grunt.min_round_to_appear, 1);
        assert_eq!(grunt.spawn_weight, 1.0);
        assert_eq!(grunt.elemental_multiplier, 1.5);
        assert_eq!(grunt.knockback_resistance, 0.5);
    }

    #[test]
    fn test_rejects_bad_resistance() {
        let mut config = SessionConfig::default();
        config.enemies[0].knockback_resistance = 1.5;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnemy { .. }));
    }

    #[test]
    fn test_rejects_negative_weight() {
        let mut config = SessionConfig::default();
        config.enemies[1].spawn_weight = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_spawn_delay() {
        let mut config = SessionConfig::default();
        config.rounds.spawn_delay = 0.0;

        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "rounds.spawn_delay");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_out_of_range_cornering_angle() {
        for angle in [-10, 181, i32::MAX] {
            let mut config = SessionConfig::default();
            config.enemy_ai.cornering_angle = angle;

            match config.validate() {
                Err(ConfigError::InvalidValue { field, .. }) => {
                    assert_eq!(field, "enemy_ai.cornering_angle");
                }
                other => panic!("angle {angle} gave {other:?}"),
            }
        }

        let mut config = SessionConfig::default();
        config.enemy_ai.cornering_angle = 180;
        assert!(config.validate().is_ok());
        config.enemy_ai.cornering_angle = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = SessionConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_empty_catalog_is_allowed() {
        let json = r#"{ "enemies": [] }"#;
        let config = SessionConfig::from_json_str(json).unwrap();
        assert!(config.enemies.is_empty());
    }

    #[test]
    fn test_round_trip_through_json() {
        let config = SessionConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = SessionConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}

//! Economy and Progression
//!
//! The single reward funnel. Kills, headshots, fires and rounds are
//! reported through [`ProgressionSink`]; nothing else writes the money
//! balance. The concrete [`Economy`] also runs the perk shop.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::game::ability::{AbilityKind, MIN_COOLDOWN};
use crate::game::config::EconomyConfig;
use crate::game::state::PlayerState;

/// Receiver of progression notifications.
pub trait ProgressionSink {
    /// An enemy died; `headshot` if a critical hit landed on it.
    fn register_kill(&mut self, headshot: bool);

    /// A fire was put out.
    fn register_fire_extinguished(&mut self);

    /// A round was cleared.
    fn register_round_completed(&mut self, round: u32);

    /// Simulated time passed while the session is running.
    fn add_time_alive(&mut self, dt: f32);
}

/// Perk-shop failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PurchaseError {
    /// Perk is already active.
    #[error("Perk {0:?} is already owned")]
    AlreadyOwned(PerkKind),

    /// Perk slots are full.
    #[error("Perk limit reached ({max})")]
    LimitReached {
        /// Maximum perks
        max: usize,
    },

    /// Not enough money.
    #[error("Insufficient funds: need {cost}, have {available}")]
    InsufficientFunds {
        /// Perk price
        cost: u32,
        /// Current balance
        available: u32,
    },

    /// Buyer is not a live player.
    #[error("No live player to receive the perk")]
    NoPlayer,
}

// =============================================================================
// PERKS
// =============================================================================

/// Purchasable perk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PerkKind {
    /// Max health ×1.5 and a full heal
    HealthUp = 0,
    /// Walk and sprint speed ×1.2
    SpeedBoost = 1,
    /// Jump height ×1.3
    SuperJump = 2,
    /// Unlock the water bend
    WaterBend = 3,
    /// Unlock the water tube
    WaterTube = 4,
    /// Water ball cooldown ×0.8
    QuickDraw = 5,
}

impl PerkKind {
    /// All perks in shop order.
    pub const ALL: [PerkKind; 6] = [
        PerkKind::HealthUp,
        PerkKind::SpeedBoost,
        PerkKind::SuperJump,
        PerkKind::WaterBend,
        PerkKind::WaterTube,
        PerkKind::QuickDraw,
    ];

    /// Shop price.
    pub fn cost(self) -> u32 {
        match self {
            PerkKind::HealthUp => 1000,
            PerkKind::SpeedBoost => 1500,
            PerkKind::SuperJump => 1200,
            PerkKind::WaterBend => 2000,
            PerkKind::WaterTube => 2500,
            PerkKind::QuickDraw => 1200,
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            PerkKind::HealthUp => "Health Up",
            PerkKind::SpeedBoost => "Speed Boost",
            PerkKind::SuperJump => "Super Jump",
            PerkKind::WaterBend => "Water Bend",
            PerkKind::WaterTube => "Water Tube",
            PerkKind::QuickDraw => "Quick Draw",
        }
    }

    /// Apply the perk to a player.
    pub fn apply(self, player: &mut PlayerState) {
        match self {
            PerkKind::HealthUp => {
                let max = player.health.max_health * 1.5;
                player.health.set_max_health(max, true);
            }
            PerkKind::SpeedBoost => player.speed_multiplier *= 1.2,
            PerkKind::SuperJump => player.jump_multiplier *= 1.3,
            PerkKind::WaterBend => player.abilities.unlock(AbilityKind::WaterBend),
            PerkKind::WaterTube => player.abilities.unlock(AbilityKind::WaterTube),
            PerkKind::QuickDraw => {
                let current = player.abilities.status(AbilityKind::WaterBall).cooldown_max;
                player
                    .abilities
                    .set_cooldown_max(AbilityKind::WaterBall, (current * 0.8).max(MIN_COOLDOWN));
            }
        }
    }
}

// =============================================================================
// ECONOMY
// =============================================================================

/// Session statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Enemies killed
    pub kills: u32,
    /// Kills with a critical hit
    pub headshots: u32,
    /// Rounds cleared
    pub rounds_completed: u32,
    /// Highest round cleared
    pub highest_round: u32,
    /// Fires put out
    pub fires_extinguished: u32,
    /// Seconds survived
    pub time_alive: f32,
    /// Perks bought
    pub perks_activated: u32,
}

/// Money, stats and perks for one session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Economy {
    config: EconomyConfig,
    money: u32,
    stats: SessionStats,
    perks: Vec<PerkKind>,
}

impl Economy {
    /// Create with the starting balance.
    pub fn new(config: &EconomyConfig) -> Self {
        Self {
            config: config.clone(),
            money: config.starting_money,
            stats: SessionStats::default(),
            perks: Vec::new(),
        }
    }

    /// Current balance.
    pub fn money(&self) -> u32 {
        self.money
    }

    /// Session statistics.
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Active perks in purchase order.
    pub fn perks(&self) -> &[PerkKind] {
        &self.perks
    }

    /// Check if a perk is active.
    pub fn has_perk(&self, perk: PerkKind) -> bool {
        self.perks.contains(&perk)
    }

    /// Check every purchase rule without spending.
    pub fn can_purchase(&self, perk: PerkKind) -> Result<(), PurchaseError> {
        if self.has_perk(perk) {
            return Err(PurchaseError::AlreadyOwned(perk));
        }
        if self.perks.len() >= self.config.max_perks {
            return Err(PurchaseError::LimitReached {
                max: self.config.max_perks,
            });
        }
        if self.money < perk.cost() {
            return Err(PurchaseError::InsufficientFunds {
                cost: perk.cost(),
                available: self.money,
            });
        }
        Ok(())
    }

    /// Spend the price and record the perk. Returns the remaining balance.
    ///
    /// The caller applies the perk's effect to the player.
    pub fn purchase(&mut self, perk: PerkKind) -> Result<u32, PurchaseError> {
        self.can_purchase(perk)?;
        self.money -= perk.cost();
        self.perks.push(perk);
        self.stats.perks_activated += 1;
        debug!(perk = perk.name(), money = self.money, "Perk purchased");
        Ok(self.money)
    }

    fn add_money(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }
}

impl ProgressionSink for Economy {
    fn register_kill(&mut self, headshot: bool) {
        self.stats.kills += 1;
        self.add_money(self.config.money_per_kill);
        if headshot {
            self.stats.headshots += 1;
            let bonus = self
                .config
                .money_per_headshot
                .saturating_sub(self.config.money_per_kill);
            self.add_money(bonus);
        }
    }

    fn register_fire_extinguished(&mut self) {
        self.stats.fires_extinguished += 1;
        self.add_money(self.config.money_per_fire);
    }

    fn register_round_completed(&mut self, round: u32) {
        self.stats.rounds_completed += 1;
        self.stats.highest_round = self.stats.highest_round.max(round);
    }

    fn add_time_alive(&mut self, dt: f32) {
        self.stats.time_alive += dt;
    }
}

// =============================================================================
// TESTS
// =============================================================================

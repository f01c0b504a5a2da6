//! Tidecaller Simulation Runner
//!
//! Runs a headless survival session with a scripted player against the
//! sandbox world and checks the result replays to the same state hash.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tidecaller::{
    game::{
        economy::PerkKind,
        events::GameEventData,
        session::Session,
        state::{ActorId, SessionId},
        world::{SandboxWorld, WorldQuery},
    },
    Intent, SessionConfig, Vec3, TICK_DT, TICK_RATE, VERSION,
};

/// Headless Tidecaller session runner.
#[derive(Debug, Parser)]
#[command(name = "tidecaller-sim", version)]
struct Args {
    /// Session configuration (JSON). Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed. Derived from the session id when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated seconds.
    #[arg(long, default_value_t = 120)]
    duration: u32,

    /// Replay the run and compare state hashes.
    #[arg(long)]
    verify: bool,
}

/// What a run ended with.
#[derive(Debug, PartialEq, Eq)]
struct RunSummary {
    state_hash: [u8; 32],
    world_hash: [u8; 32],
    events: usize,
    round: u32,
    kills: u32,
    money: u32,
}

const SESSION_ID: SessionId = SessionId::new([7; 16]);

const PERK_ORDER: [PerkKind; 6] = [
    PerkKind::QuickDraw,
    PerkKind::WaterBend,
    PerkKind::HealthUp,
    PerkKind::WaterTube,
    PerkKind::SpeedBoost,
    PerkKind::SuperJump,
];

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    info!("Tidecaller Simulation v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SessionConfig::default(),
    };

    let ticks = args.duration.saturating_mul(TICK_RATE);
    let summary = run_session(&config, args.seed, ticks)?;

    info!("=== Session Results ===");
    info!("Rounds reached: {}", summary.round);
    info!("Kills: {}", summary.kills);
    info!("Money: {}", summary.money);
    info!("Total events: {}", summary.events);
    info!("Final State Hash: {}", hex::encode(summary.state_hash));
    info!("Final World Hash: {}", hex::encode(summary.world_hash));

    if args.verify {
        info!("=== Verifying Determinism ===");
        let replay = run_session(&config, args.seed, ticks)?;
        info!("Replay State Hash: {}", hex::encode(replay.state_hash));

        if replay != summary {
            bail!("determinism failure: replay diverged");
        }
        info!("DETERMINISM VERIFIED: Hashes match!");
    }

    Ok(())
}

/// Run one scripted session for `ticks` ticks.
fn run_session(config: &SessionConfig, seed: Option<u64>, ticks: u32) -> Result<RunSummary> {
    let world = SandboxWorld::new();
    let mut session = match seed {
        Some(seed) => Session::with_seed(config.clone(), SESSION_ID, seed, world)?,
        None => Session::new(config.clone(), SESSION_ID, world)?,
    };

    info!("Session ID: {}", SESSION_ID.to_uuid_string());
    info!("RNG Seed: {}", session.state().rng_seed);

    let player = session.spawn_player(Vec3::ZERO);
    session.set_spawn_points(
        (0..8)
            .map(|i| Vec3::FORWARD.rotate_y(i as f32 * 45.0).scale(30.0))
            .collect(),
    );
    for i in 0..3 {
        session.add_fire(Vec3::RIGHT.rotate_y(i as f32 * 120.0).scale(4.0));
    }

    let mut events = 0;
    for t in 0..ticks {
        drive_player(&mut session, player, t);

        let result = session.step_sandbox(TICK_DT);
        events += result.events.len();

        for event in &result.events {
            match &event.data {
                GameEventData::RoundStarted { round, enemies_target } => {
                    info!("Round {} started ({} enemies)", round, enemies_target);
                }
                GameEventData::RoundCompleted { round } => {
                    info!("Round {} cleared at tick {}", round, event.tick);
                }
                GameEventData::PerkPurchased { perk, cost, .. } => {
                    info!("Bought {} for {}", perk.name(), cost);
                }
                _ => {}
            }
        }

        if result.player_died {
            warn!("Player died at tick {}", session.current_tick());
            break;
        }

        if t % 600 == 0 {
            let status = session.round_status();
            info!(
                "Tick {}: round {}, {} enemies alive, {} money",
                t,
                status.round_number,
                status.enemies_alive,
                session.economy().money()
            );
        }
    }

    Ok(RunSummary {
        state_hash: session.compute_hash(),
        world_hash: session.world().compute_hash(),
        events,
        round: session.round_status().round_number,
        kills: session.economy().stats().kills,
        money: session.economy().money(),
    })
}

/// Scripted player: back-pedal, aim at the nearest enemy's head, throw
/// balls, cast unlocked abilities, douse fires, buy perks.
fn drive_player(session: &mut Session<SandboxWorld>, player: ActorId, t: u32) {
    let Some(position) = session.world().position_of(player) else {
        return;
    };
    let eye = position + Vec3::UP.scale(session.config().player.eye_height);

    let nearest = session
        .state()
        .enemies
        .values()
        .filter(|e| e.is_alive())
        .filter_map(|e| session.world().position_of(e.id))
        .min_by(|a, b| a.distance(position).total_cmp(&b.distance(position)));

    let strafe = ((t as f32) / 90.0).sin();
    session.submit_intent(player, Intent::Move { x: strafe, z: -0.3 });

    if let Some(enemy) = nearest {
        let head = enemy + Vec3::UP.scale(1.7);
        let aim = head - eye;
        let yaw = aim.x.atan2(aim.z).to_degrees();
        let pitch = (aim.y / aim.length().max(1e-3)).asin().to_degrees();
        session.submit_intent(player, Intent::Look { yaw, pitch });
        session.submit_intent(player, Intent::AimAt(head));

        if t % 15 == 0 {
            session.submit_intent(player, Intent::PrimaryAttack);
        }
        if t % 120 == 60 {
            session.submit_intent(player, Intent::Ability1);
            session.submit_intent(player, Intent::Ability2);
        }
    }

    if t % 10 == 0 {
        session.submit_intent(player, Intent::Interact);
    }

    if t % 60 == 0 {
        if let Some(perk) = PERK_ORDER
            .into_iter()
            .find(|perk| session.economy().can_purchase(*perk).is_ok())
        {
            if let Err(err) = session.buy_perk(player, perk) {
                warn!("Perk purchase failed: {}", err);
            }
        }
    }
}

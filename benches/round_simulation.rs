//! Tick throughput with a full first wave on the sandbox world.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tidecaller::game::world::SandboxWorld;
use tidecaller::{ActorId, Intent, Session, SessionConfig, SessionId, Vec3, TICK_DT};

fn wave_session() -> (Session<SandboxWorld>, ActorId) {
    let mut config = SessionConfig::default();
    config.rounds.initial_round_delay = 0.0;
    config.rounds.spawn_delay = 0.05;

    let mut session = Session::with_seed(config, SessionId::new([5; 16]), 99, SandboxWorld::new())
        .expect("default config is valid");
    let player = session.spawn_player(Vec3::ZERO);
    session.set_spawn_points(
        (0..8)
            .map(|i| Vec3::FORWARD.rotate_y(i as f32 * 45.0).scale(30.0))
            .collect(),
    );
    for _ in 0..60 {
        session.step_sandbox(TICK_DT);
    }
    (session, player)
}

fn bench_tick(c: &mut Criterion) {
    c.bench_function("tick_first_wave", |b| {
        let (mut session, player) = wave_session();
        let mut t = 0u32;
        b.iter(|| {
            t = t.wrapping_add(1);
            session.submit_intent(player, Intent::Move { x: 0.0, z: -0.2 });
            if t % 15 == 0 {
                session.submit_intent(player, Intent::PrimaryAttack);
            }
            black_box(session.step_sandbox(TICK_DT));
        });
    });
}

fn bench_state_hash(c: &mut Criterion) {
    let (session, _) = wave_session();
    c.bench_function("state_hash", |b| b.iter(|| black_box(session.compute_hash())));
}

criterion_group!(benches, bench_tick, bench_state_hash);
criterion_main!(benches);

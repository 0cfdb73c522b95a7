//! Performance benchmarks for the simulation and wire encoding

use rand::rngs::StdRng;
use rand::SeedableRng;
use server::client_manager::Outbound;
use server::physics;
use server::session::Session;
use shared::{Ball, BallUpdate, ClientEvent, Direction, Paddle, Score, ServerEvent};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Benchmarks the per-tick ball step
#[test]
fn benchmark_physics_step() {
    let paddle1 = Paddle { y: 250.0 };
    let paddle2 = Paddle { y: 250.0 };
    let mut ball = Ball {
        x: 400.0,
        y: 300.0,
        velocity_x: 5.0,
        velocity_y: 3.0,
    };

    let iterations = 100_000;
    let start = Instant::now();

    for _ in 0..iterations {
        if physics::step(&mut ball, &paddle1, &paddle2).is_some() {
            ball = Ball::default();
        }
    }

    let duration = start.elapsed();
    println!(
        "Physics step: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Well inside one 33ms tick budget per thousand steps
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks full session ticks including broadcast fan-out
#[test]
fn benchmark_session_tick() {
    let mut session = Session::with_rng(StdRng::seed_from_u64(11));
    let (tx1, mut rx1) = mpsc::unbounded_channel::<Outbound>();
    let (tx2, mut rx2) = mpsc::unbounded_channel::<Outbound>();
    session.handle_connect(1, tx1);
    session.handle_connect(2, tx2);

    let start_time = Instant::now();
    let mut now = start_time;
    let iterations = 10_000;
    let start = Instant::now();

    for i in 0..iterations {
        if !session.game().is_running() {
            session.handle_event(1, ClientEvent::PlayerReady, now);
            session.handle_event(2, ClientEvent::PlayerReady, now);
        }

        now += Duration::from_millis(33);
        let direction = if i % 20 < 10 { Direction::Up } else { Direction::Down };
        session.handle_event(1, ClientEvent::PaddleMove(direction), now);
        session.tick();

        while rx1.try_recv().is_ok() {}
        while rx2.try_recv().is_ok() {}
    }

    let duration = start.elapsed();
    println!(
        "Session tick: {} ticks in {:?} ({:.2} μs/tick)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(session.game().tick > 0);
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks JSON encoding of the per-tick ball update
#[test]
fn benchmark_ball_update_encoding() {
    let event = ServerEvent::BallUpdate(BallUpdate {
        ball: Ball {
            x: 123.456,
            y: 321.5,
            velocity_x: -5.1,
            velocity_y: 2.25,
        },
        score: Score {
            player1: 3,
            player2: 4,
        },
    });

    let iterations = 10_000;
    let start = Instant::now();
    let mut total_bytes = 0;

    for _ in 0..iterations {
        total_bytes += event.to_json().unwrap().len();
    }

    let duration = start.elapsed();
    println!(
        "Ball update encoding: {} iterations in {:?}, {} bytes each",
        iterations,
        duration,
        total_bytes / iterations
    );

    // Ball updates go out ~30 times a second to each player; keep them small
    assert!(total_bytes / iterations < 150);
    assert!(duration.as_millis() < 2000);
}

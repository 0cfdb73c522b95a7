//! # Pong Server Library
//!
//! This library provides the authoritative server for a two-player Pong match.
//! It owns the only copy of the ball, paddle and score state, enforces the
//! rules, and pushes updates to both connected players at a fixed tick rate.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! Clients only send intents (`playerReady`, `paddleMove`). Ball movement,
//! collisions, scoring and the win condition are decided here, and clients
//! render whatever the server last told them.
//!
//! ### Matchmaking
//! Exactly one game exists per process. The first two connections take the
//! Player 1 and Player 2 slots; anyone else receives `gameFull` and is
//! disconnected. The match starts once both players are ready and ends when a
//! side reaches the winning score.
//!
//! ### State Broadcasting
//! Every tick of a running match broadcasts the ball and score. Paddle moves
//! broadcast both paddle positions. Full snapshots are only sent on connect
//! and on match start, keeping the steady-state payload small.
//!
//! ## Architecture Design
//!
//! ### Single Owner Event Loop
//! All state lives in one [`session::Session`] owned by the main loop in
//! [`network::Server::run`]. Connection events and the fixed-interval tick
//! arrive through one `tokio::select!` and are applied one at a time, so no
//! locking is needed and no two mutations interleave.
//!
//! ### WebSocket Transport
//! Each connection gets a reader task that forwards parsed events into the
//! main loop and a writer task that drains that connection's outbound queue.
//! The session only ever pushes onto those queues, so it never waits on the
//! network.
//!
//! ## Module Organization
//!
//! ### Client Manager Module (`client_manager`)
//! Player slot registry: role assignment, readiness, input throttling and
//! delivery to one or all players.
//!
//! ### Game Module (`game`)
//! The authoritative state record and match phases.
//!
//! ### Physics Module (`physics`)
//! Per-tick ball integration, wall and paddle collisions, and exit detection.
//!
//! ### Session Module (`session`)
//! Connect, disconnect, input and tick handling on top of the modules above.
//!
//! ### Network Module (`network`)
//! Listener, per-connection tasks and the main loop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // ~30Hz physics, as in the default configuration
//!     let mut server = Server::new("0.0.0.0:3000", Duration::from_millis(33)).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Security Considerations
//!
//! ### Input Validation
//! Frames that do not parse as a known event are dropped. Paddle input is
//! ignored outside a running match and from connections without a slot.
//!
//! ### Rate Limiting
//! Each connection may move its paddle at most once per 16ms, independent
//! of the tick rate.

pub mod client_manager;
pub mod game;
pub mod network;
pub mod physics;
pub mod session;

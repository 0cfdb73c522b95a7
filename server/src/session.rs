//! The single shared match: registry, rules and simulation behind one owner
//!
//! [`Session`] is driven by exactly one task. Every entry point runs to
//! completion before the next one starts, which is what keeps connect,
//! disconnect, input and tick handling from interleaving.

use crate::client_manager::{ClientManager, Outbound, OutboundSender};
use crate::game::{GameState, PointOutcome};
use crate::physics;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{ClientEvent, ClientId, Direction, GameSnapshot, Role, ServerEvent};
use std::time::Instant;

/// How often a running match logs simulation stats
const STATS_INTERVAL_TICKS: u64 = 300;

pub struct Session {
    game: GameState,
    clients: ClientManager,
    rng: StdRng,
}

impl Session {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates a session with a fixed random source for ball serves
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            game: GameState::new(),
            clients: ClientManager::new(),
            rng,
        }
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn clients(&self) -> &ClientManager {
        &self.clients
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.game.snapshot(self.clients.slots())
    }

    /// Registers a new connection
    ///
    /// The newcomer receives its role followed by a full snapshot. When both
    /// slots are taken it receives `gameFull` and its transport is closed.
    pub fn handle_connect(
        &mut self,
        client_id: ClientId,
        sender: OutboundSender,
    ) -> Option<Role> {
        match self.clients.add_client(client_id, sender.clone()) {
            Some(role) => {
                self.clients
                    .send_to(&client_id, ServerEvent::PlayerAssigned(role));
                self.clients
                    .send_to(&client_id, ServerEvent::GameState(self.snapshot()));
                Some(role)
            }
            None => {
                warn!("Rejecting connection {}: game is full", client_id);
                let _ = sender.send(Outbound::Event(ServerEvent::GameFull));
                let _ = sender.send(Outbound::Close);
                None
            }
        }
    }

    /// Releases a connection's slot
    ///
    /// The last player leaving resets the whole game. If one player remains,
    /// a running match is paused and the survivor is told its opponent left;
    /// score and positions are kept.
    pub fn handle_disconnect(&mut self, client_id: ClientId) {
        if self.clients.remove_client(&client_id).is_none() {
            return;
        }

        if self.clients.is_empty() {
            self.game.reset();
            info!("All players left, game reset");
        } else {
            self.game.pause();
            self.clients.broadcast(&ServerEvent::PlayerDisconnected);
        }
    }

    pub fn handle_event(&mut self, client_id: ClientId, event: ClientEvent, now: Instant) {
        match event {
            ClientEvent::PlayerReady => self.handle_ready(client_id),
            ClientEvent::PaddleMove(direction) => {
                self.handle_paddle_move(client_id, direction, now)
            }
        }
    }

    fn handle_ready(&mut self, client_id: ClientId) {
        if !self.clients.mark_ready(&client_id) {
            return;
        }

        // Ready flags survive a finished match, so a single ready after
        // game over is enough to start the next one.
        if self.game.is_running() || !self.clients.all_ready() {
            return;
        }

        self.game.start(&mut self.rng);
        info!(
            "Match started, serve velocity ({:.1}, {:.1})",
            self.game.ball.velocity_x, self.game.ball.velocity_y
        );
        self.clients
            .broadcast(&ServerEvent::GameStart(self.snapshot()));
    }

    fn handle_paddle_move(&mut self, client_id: ClientId, direction: Direction, now: Instant) {
        if !self.game.is_running() {
            return;
        }

        let role = match self.clients.get_mut(&client_id) {
            Some(client) => {
                if !client.try_accept_input(now) {
                    return;
                }
                client.role
            }
            None => return,
        };

        self.game.move_paddle(role, direction);
        self.clients
            .broadcast(&ServerEvent::PaddleUpdate(self.game.paddle_update()));
    }

    /// Runs one physics tick and pushes the resulting updates
    ///
    /// Does nothing unless a match is running with both players present.
    pub fn tick(&mut self) {
        if !self.game.is_running() || !self.clients.is_full() {
            return;
        }

        self.game.tick += 1;

        let game = &mut self.game;
        if let Some(scorer) = physics::step(&mut game.ball, &game.paddle1, &game.paddle2) {
            let event = match game.award_point(scorer, &mut self.rng) {
                PointOutcome::Scored(player) => ServerEvent::PointScored { player },
                PointOutcome::Won(winner) => ServerEvent::GameOver {
                    winner: winner.to_string(),
                },
            };
            self.clients.broadcast(&event);
        }

        self.clients
            .broadcast(&ServerEvent::BallUpdate(self.game.ball_update()));

        if self.game.tick % STATS_INTERVAL_TICKS == 0 {
            debug!(
                "Tick {}: ball speed ({:.2}, {:.2}), score {}-{}",
                self.game.tick,
                self.game.ball.velocity_x,
                self.game.ball.velocity_y,
                self.game.score.player1,
                self.game.score.player2
            );
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

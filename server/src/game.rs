use log::info;
use rand::Rng;
use shared::{
    Ball, BallUpdate, ClientId, Direction, GameSnapshot, Paddle, PaddleUpdate, PlayerSlot, Role, Score,
    BALL_SPEED, FIELD_HEIGHT, FIELD_WIDTH, PADDLE_MAX_Y, PADDLE_SPEED, WINNING_SCORE,
};
use std::collections::BTreeMap;

/// Where the single shared match currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    /// Fewer than two ready players
    Waiting,
    Running,
    /// A side reached the winning score
    Over,
}

/// Result of awarding a point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointOutcome {
    Scored(Role),
    Won(Role),
}

/// Authoritative ball, paddle and score state
///
/// Lives for the whole process and is reset in place, never rebuilt.
#[derive(Debug, Clone)]
pub struct GameState {
    /// Physics ticks simulated since the process started
    pub tick: u64,
    pub ball: Ball,
    pub paddle1: Paddle,
    pub paddle2: Paddle,
    pub score: Score,
    pub phase: MatchPhase,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            tick: 0,
            ball: Ball::default(),
            paddle1: Paddle::default(),
            paddle2: Paddle::default(),
            score: Score::default(),
            phase: MatchPhase::Waiting,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == MatchPhase::Running
    }

    pub fn paddle(&self, role: Role) -> &Paddle {
        match role {
            Role::One => &self.paddle1,
            Role::Two => &self.paddle2,
        }
    }

    fn paddle_mut(&mut self, role: Role) -> &mut Paddle {
        match role {
            Role::One => &mut self.paddle1,
            Role::Two => &mut self.paddle2,
        }
    }

    /// Re-centers the ball and serves it in a random direction
    ///
    /// Horizontal speed is always `BALL_SPEED` toward either side; vertical
    /// speed is uniform in `[-BALL_SPEED / 2, BALL_SPEED / 2)`.
    pub fn reset_ball<R: Rng>(&mut self, rng: &mut R) {
        let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };

        self.ball.x = FIELD_WIDTH / 2.0;
        self.ball.y = FIELD_HEIGHT / 2.0;
        self.ball.velocity_x = direction * BALL_SPEED;
        self.ball.velocity_y = (rng.gen::<f32>() - 0.5) * BALL_SPEED;
    }

    /// Restores ball, paddles and score to their initial values
    pub fn reset(&mut self) {
        self.ball = Ball::default();
        self.paddle1 = Paddle::default();
        self.paddle2 = Paddle::default();
        self.score = Score::default();
        self.phase = MatchPhase::Waiting;
    }

    /// Moves to `Running` with a freshly served ball
    ///
    /// Starting after a finished match begins a new one from zero.
    pub fn start<R: Rng>(&mut self, rng: &mut R) {
        if self.phase == MatchPhase::Over {
            self.score = Score::default();
            self.paddle1 = Paddle::default();
            self.paddle2 = Paddle::default();
        }
        self.reset_ball(rng);
        self.phase = MatchPhase::Running;
    }

    /// Drops back to `Waiting` if a match is in progress
    pub fn pause(&mut self) {
        if self.phase == MatchPhase::Running {
            self.phase = MatchPhase::Waiting;
        }
    }

    /// Moves a paddle one step, keeping it inside the field
    pub fn move_paddle(&mut self, role: Role, direction: Direction) {
        let paddle = self.paddle_mut(role);
        paddle.y = match direction {
            Direction::Up => paddle.y - PADDLE_SPEED,
            Direction::Down => paddle.y + PADDLE_SPEED,
        }
        .clamp(0.0, PADDLE_MAX_Y);
    }

    /// Credits `scorer`, serves a new ball and ends the match at the winning score
    pub fn award_point<R: Rng>(&mut self, scorer: Role, rng: &mut R) -> PointOutcome {
        let total = self.score.award(scorer);
        self.reset_ball(rng);

        if total >= WINNING_SCORE {
            self.phase = MatchPhase::Over;
            info!(
                "{} wins {}-{}",
                scorer, self.score.player1, self.score.player2
            );
            PointOutcome::Won(scorer)
        } else {
            info!(
                "{} scores ({}-{})",
                scorer, self.score.player1, self.score.player2
            );
            PointOutcome::Scored(scorer)
        }
    }

    pub fn paddle_update(&self) -> PaddleUpdate {
        PaddleUpdate {
            paddle1: *self.paddle(Role::One),
            paddle2: *self.paddle(Role::Two),
        }
    }

    pub fn ball_update(&self) -> BallUpdate {
        BallUpdate {
            ball: self.ball,
            score: self.score,
        }
    }

    pub fn snapshot(&self, players: BTreeMap<ClientId, PlayerSlot>) -> GameSnapshot {
        GameSnapshot {
            players,
            ball: self.ball,
            paddle1: *self.paddle(Role::One),
            paddle2: *self.paddle(Role::Two),
            score: self.score,
            game_running: self.is_running(),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

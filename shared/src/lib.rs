use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Identifier the server gives each accepted connection. Never reused.
pub type ClientId = u64;

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 600.0;
pub const BALL_RADIUS: f32 = 10.0;
pub const BALL_SPEED: f32 = 5.0;
/// Velocity multiplier applied on every paddle hit. Uncapped.
pub const BALL_ACCELERATION: f32 = 1.02;
pub const PADDLE_WIDTH: f32 = 10.0;
pub const PADDLE_HEIGHT: f32 = 100.0;
pub const PADDLE_SPEED: f32 = 12.0;
pub const PADDLE_START_Y: f32 = 250.0;
pub const PADDLE_MAX_Y: f32 = FIELD_HEIGHT - PADDLE_HEIGHT;
/// Left edge of player one's paddle.
pub const LEFT_PADDLE_X: f32 = 20.0;
/// Left edge of player two's paddle.
pub const RIGHT_PADDLE_X: f32 = 770.0;
pub const WINNING_SCORE: u32 = 5;
pub const TICK_INTERVAL: Duration = Duration::from_millis(33);
/// Minimum gap between two accepted paddle inputs from the same connection.
pub const INPUT_THROTTLE: Duration = Duration::from_millis(16);

/// Which side of the field a connection controls.
///
/// Serialized as the bare integers `1` and `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Role {
    One,
    Two,
}

impl Role {
    /// Roles in assignment order.
    pub const ALL: [Role; 2] = [Role::One, Role::Two];

    pub fn number(self) -> u8 {
        match self {
            Role::One => 1,
            Role::Two => 2,
        }
    }

    pub fn opponent(self) -> Role {
        match self {
            Role::One => Role::Two,
            Role::Two => Role::One,
        }
    }
}

impl From<Role> for u8 {
    fn from(role: Role) -> u8 {
        role.number()
    }
}

impl TryFrom<u8> for Role {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Role::One),
            2 => Ok(Role::Two),
            other => Err(format!("invalid player role {}", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
}

impl Default for Ball {
    fn default() -> Self {
        Self {
            x: FIELD_WIDTH / 2.0,
            y: FIELD_HEIGHT / 2.0,
            velocity_x: BALL_SPEED,
            velocity_y: BALL_SPEED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub y: f32,
}

impl Default for Paddle {
    fn default() -> Self {
        Self { y: PADDLE_START_Y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub player1: u32,
    pub player2: u32,
}

impl Score {
    pub fn get(&self, role: Role) -> u32 {
        match role {
            Role::One => self.player1,
            Role::Two => self.player2,
        }
    }

    /// Adds a point for `role` and returns that side's new total.
    pub fn award(&mut self, role: Role) -> u32 {
        let points = match role {
            Role::One => &mut self.player1,
            Role::Two => &mut self.player2,
        };
        *points += 1;
        *points
    }

    pub fn winner(&self) -> Option<Role> {
        Role::ALL
            .into_iter()
            .find(|role| self.get(*role) >= WINNING_SCORE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSlot {
    pub player: Role,
    pub ready: bool,
}

/// Full copy of the authoritative state, keyed by connection id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub players: BTreeMap<ClientId, PlayerSlot>,
    pub ball: Ball,
    pub paddle1: Paddle,
    pub paddle2: Paddle,
    pub score: Score,
    pub game_running: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaddleUpdate {
    pub paddle1: Paddle,
    pub paddle2: Paddle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallUpdate {
    pub ball: Ball,
    pub score: Score,
}

/// Events pushed from the server to connected actors.
///
/// On the wire each event is a JSON object `{"event": <name>, "data": <payload>}`;
/// events without a payload omit `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    GameFull,
    PlayerAssigned(Role),
    GameState(GameSnapshot),
    GameStart(GameSnapshot),
    PaddleUpdate(PaddleUpdate),
    BallUpdate(BallUpdate),
    PointScored { player: Role },
    GameOver { winner: String },
    PlayerDisconnected,
}

impl ServerEvent {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Events sent by a connected actor to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    PlayerReady,
    PaddleMove(Direction),
}

impl ClientEvent {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

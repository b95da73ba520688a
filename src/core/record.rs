//! Per-tick kinematic records.
//!
//! These are the shared vocabulary of the corpus: a `Frame` is one tick of
//! ball and player state, a `Match` is the ordered frames of one recorded
//! session. The types carry no logic beyond simple accessors.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Inline capacity for players in a frame (3v3 without spilling).
pub const INLINE_PLAYERS: usize = 6;

/// Players of one frame, in snapshot order.
pub type Players = SmallVec<[PlayerTick; INLINE_PLAYERS]>;

/// A position in field coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A velocity in field units per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
}

impl Velocity {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One player's state at one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerTick {
    /// Player id, unique within a frame.
    pub id: i32,

    /// Team id. `0` is the spectator team and never reaches a stored frame.
    pub team: i32,

    /// Control input bitmask (expected `0..=31`, not enforced here).
    pub input: i32,

    pub position: Position,
    pub velocity: Velocity,
}

impl PlayerTick {
    /// Create a player with zero kinematics.
    #[must_use]
    pub fn new(id: i32, team: i32) -> Self {
        Self {
            id,
            team,
            ..Self::default()
        }
    }

    /// Set the control input.
    #[must_use]
    pub fn with_input(mut self, input: i32) -> Self {
        self.input = input;
        self
    }

    /// Set the position.
    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    /// Set the velocity.
    #[must_use]
    pub fn moving(mut self, x: f64, y: f64) -> Self {
        self.velocity = Velocity::new(x, y);
        self
    }
}

/// The ball's state at one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BallTick {
    pub position: Position,
    pub velocity: Velocity,
}

impl BallTick {
    #[must_use]
    pub const fn new(position: Position, velocity: Velocity) -> Self {
        Self { position, velocity }
    }
}

/// One tick's snapshot of the ball and every tracked player.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Match-relative frame counter.
    pub tick: u32,

    /// Players in snapshot order. The order carries no meaning but must
    /// survive encoding unchanged.
    pub players: Players,

    pub ball: BallTick,
}

impl Frame {
    /// Create a frame with no players.
    #[must_use]
    pub fn new(tick: u32, ball: BallTick) -> Self {
        Self {
            tick,
            players: Players::new(),
            ball,
        }
    }

    /// Append a player in snapshot order.
    #[must_use]
    pub fn with_player(mut self, player: PlayerTick) -> Self {
        self.players.push(player);
        self
    }

    /// Number of players in this frame.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Find a player by id.
    #[must_use]
    pub fn player(&self, id: i32) -> Option<&PlayerTick> {
        self.players.iter().find(|p| p.id == id)
    }
}

/// The ordered frames of one recorded session.
///
/// Built up frame by frame while a session is recorded, then encoded once
/// and never mutated.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub frames: Vec<Frame>,
}

impl Match {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame.
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Largest tick value in the match, `None` when empty.
    #[must_use]
    pub fn max_tick(&self) -> Option<u32> {
        self.frames.iter().map(|f| f.tick).max()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }
}

impl From<Vec<Frame>> for Match {
    fn from(frames: Vec<Frame>) -> Self {
        Self { frames }
    }
}

impl FromIterator<Frame> for Match {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Match {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball() -> BallTick {
        BallTick::new(Position::new(1.0, 2.0), Velocity::new(0.5, -0.5))
    }

    #[test]
    fn test_frame_builder() {
        let frame = Frame::new(7, ball())
            .with_player(PlayerTick::new(1, 1).at(10.0, 20.0))
            .with_player(PlayerTick::new(2, 2).moving(1.0, 0.0));

        assert_eq!(frame.tick, 7);
        assert_eq!(frame.player_count(), 2);
        assert_eq!(frame.player(2).map(|p| p.team), Some(2));
        assert!(frame.player(3).is_none());
    }

    #[test]
    fn test_match_max_tick() {
        let mut m = Match::new();
        assert_eq!(m.max_tick(), None);

        m.push(Frame::new(3, ball()));
        m.push(Frame::new(9, ball()));
        m.push(Frame::new(5, ball()));

        assert_eq!(m.len(), 3);
        assert_eq!(m.max_tick(), Some(9));
    }

    #[test]
    fn test_player_deserializes_from_json() {
        let json = r#"{
            "id": 4, "team": 2, "input": 17,
            "position": {"x": -12.5, "y": 3.0},
            "velocity": {"x": 0.25, "y": 0.0}
        }"#;
        let player: PlayerTick = serde_json::from_str(json).unwrap();

        assert_eq!(player.id, 4);
        assert_eq!(player.input, 17);
        assert_eq!(player.position, Position::new(-12.5, 3.0));
    }

    #[test]
    fn test_frame_serialization() {
        let frame = Frame::new(11, ball()).with_player(PlayerTick::new(1, 1).with_input(5));

        let json = serde_json::to_string(&frame).unwrap();
        let deserialized: Frame = serde_json::from_str(&json).unwrap();

        assert_eq!(frame, deserialized);
    }
}

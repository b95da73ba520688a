//! Feature vector construction.
//!
//! The same builder runs on decoded corpus frames at training time and on
//! live snapshots at inference time. Any difference between the two call
//! sites would be a silent training/inference skew, so there is exactly one
//! code path: [`FeatureBuilder::build`].

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::dataset::Example;
use super::normalize::{normalize, FeatureError};
use crate::core::record::INLINE_PLAYERS;
use crate::core::{BallTick, CorpusConfig, Frame, PlayerTick, DEFAULT_TEAM_ONE};

/// Layout revision. Revision 1 carried team slots for the other players
/// only; revision 2 also flags the current player.
pub const FEATURE_LAYOUT_VERSION: u32 = 2;

/// Values for the ball at the head of the vector.
pub const HEAD_LEN: usize = 4;

/// Values per player: four kinematic slots and one team slot.
pub const PLAYER_SLOTS: usize = 5;

/// Feature vector length for a frame with `players` players (current included).
#[must_use]
pub const fn feature_len(players: usize) -> usize {
    HEAD_LEN + PLAYER_SLOTS * players
}

/// Normalized model input for one player's view of one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }

    /// Team indicator of the `slot`-th player (0 = current).
    #[must_use]
    pub fn team_indicator(&self, slot: usize) -> Option<f64> {
        self.0.get(HEAD_LEN + slot * PLAYER_SLOTS + PLAYER_SLOTS - 1).copied()
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl AsRef<[f64]> for FeatureVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Builds feature vectors from ball and player state.
///
/// Layout, for a current player `c` and others `o1..ok`:
///
/// 1. Raw positions `[ball.x, ball.y, c.x, c.y, o1.x, o1.y, ...]` and raw
///    velocities of the same shape.
/// 2. Each sequence min-max normalized independently.
/// 3. Element-wise interleave `[pos0, vel0, pos1, vel1, ...]`. The ball
///    occupies the first four values.
/// 4. After each player's four values, a team slot: `1.0` if the player is
///    on `team_one`, else `0.0`.
///
/// Total length is `4 + 5 * (k + 1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureBuilder {
    team_one: i32,
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureBuilder {
    pub fn new() -> Self {
        Self {
            team_one: DEFAULT_TEAM_ONE,
        }
    }

    pub fn from_config(config: &CorpusConfig) -> Self {
        Self::new().with_team_one(config.team_one)
    }

    /// Set the team id flagged with `1.0`.
    #[must_use]
    pub fn with_team_one(mut self, team: i32) -> Self {
        self.team_one = team;
        self
    }

    #[must_use]
    pub fn team_one(&self) -> i32 {
        self.team_one
    }

    /// Build the vector for `current`, with `others` in the given order.
    pub fn build<'a, I>(
        &self,
        ball: &BallTick,
        current: &PlayerTick,
        others: I,
    ) -> Result<FeatureVector, FeatureError>
    where
        I: IntoIterator<Item = &'a PlayerTick>,
    {
        let others: SmallVec<[&PlayerTick; INLINE_PLAYERS]> = others.into_iter().collect();
        let players = || std::iter::once(current).chain(others.iter().copied());
        let player_count = others.len() + 1;

        let mut positions = Vec::with_capacity(2 + 2 * player_count);
        let mut velocities = Vec::with_capacity(2 + 2 * player_count);
        positions.extend([ball.position.x, ball.position.y]);
        velocities.extend([ball.velocity.x, ball.velocity.y]);
        for p in players() {
            positions.extend([p.position.x, p.position.y]);
            velocities.extend([p.velocity.x, p.velocity.y]);
        }

        let positions = normalize(&positions)?;
        let velocities = normalize(&velocities)?;

        let mut interleaved = positions
            .iter()
            .zip(&velocities)
            .flat_map(|(&p, &v)| [p, v]);

        let mut out = Vec::with_capacity(feature_len(player_count));
        out.extend(interleaved.by_ref().take(HEAD_LEN));
        for p in players() {
            out.extend(interleaved.by_ref().take(PLAYER_SLOTS - 1));
            out.push(if p.team == self.team_one { 1.0 } else { 0.0 });
        }

        Ok(FeatureVector(out))
    }

    /// One example per player of `frame`, each player taking a turn as
    /// current with the rest in snapshot order.
    pub fn examples<'f>(
        &'f self,
        frame: &'f Frame,
    ) -> impl Iterator<Item = Result<Example, FeatureError>> + 'f {
        frame
            .players
            .iter()
            .enumerate()
            .map(move |(i, current)| -> Result<Example, FeatureError> {
                let others = frame
                    .players
                    .iter()
                    .enumerate()
                    .filter(move |&(j, _)| j != i)
                    .map(|(_, p)| p);
                let features = self.build(&frame.ball, current, others)?;
                Ok(Example {
                    tick: frame.tick,
                    player_id: current.id,
                    features,
                    target: f64::from(current.input),
                })
            })
    }
}

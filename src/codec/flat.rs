//! Match ⇄ flat `f32` sequence.
//!
//! Layout per frame:
//!
//! ```text
//! tick, ball.pos.x, ball.pos.y, ball.vel.x, ball.vel.y, player_count,
//!   (id, team, input, pos.x, pos.y, vel.x, vel.y) * player_count
//! ```
//!
//! Frames are concatenated with no match-level delimiter. Every field is
//! narrowed to `f32`; decoding widens back, so a round trip is exact up to
//! single precision.

use thiserror::Error;

use crate::core::{BallTick, Frame, Match, PlayerTick, Players, Position, Velocity};

/// Floats in a frame header (tick, ball, player count).
pub const FRAME_HEADER_LEN: usize = 6;

/// Floats per encoded player.
pub const PLAYER_RECORD_LEN: usize = 7;

/// Largest tick that survives the `f32` narrowing unchanged.
pub const MAX_EXACT_TICK: u32 = 1 << 24;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The player count field does not hold a non-negative integer.
    #[error("malformed stream at offset {offset}: player count {value} is not a non-negative integer")]
    MalformedStream { offset: usize, value: f32 },

    /// The input ended inside a record.
    #[error("truncated record at offset {offset}: needed {needed}, {remaining} remaining")]
    TruncatedRecord {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
}

/// Number of floats a frame with `players` players encodes to.
#[must_use]
pub const fn frame_len(players: usize) -> usize {
    FRAME_HEADER_LEN + PLAYER_RECORD_LEN * players
}

/// Number of floats a whole match encodes to.
#[must_use]
pub fn match_len(m: &Match) -> usize {
    m.iter().map(|f| frame_len(f.player_count())).sum()
}

/// Encode a match into a freshly allocated float sequence.
///
/// Ticks are exact up to [`MAX_EXACT_TICK`] (2^24); later ticks round to
/// the nearest representable `f32`.
#[must_use]
pub fn to_floats(m: &Match) -> Vec<f32> {
    let mut out = Vec::with_capacity(match_len(m));
    to_floats_into(&mut out, &m.frames);
    out
}

/// Append the encoding of `frames` to `out`.
pub fn to_floats_into(out: &mut Vec<f32>, frames: &[Frame]) {
    for frame in frames {
        out.reserve(frame_len(frame.player_count()));
        out.push(frame.tick as f32);
        out.push(frame.ball.position.x as f32);
        out.push(frame.ball.position.y as f32);
        out.push(frame.ball.velocity.x as f32);
        out.push(frame.ball.velocity.y as f32);
        out.push(frame.players.len() as f32);
        for p in &frame.players {
            out.push(p.id as f32);
            out.push(p.team as f32);
            out.push(p.input as f32);
            out.push(p.position.x as f32);
            out.push(p.position.y as f32);
            out.push(p.velocity.x as f32);
            out.push(p.velocity.y as f32);
        }
    }
}

/// Decode a float sequence produced by [`to_floats`].
///
/// Only the structure is checked: field ranges (team ids, inputs) pass
/// through untouched.
pub fn from_floats(floats: &[f32]) -> Result<Match, DecodeError> {
    let mut cursor = FloatCursor::new(floats);
    let mut frames = Vec::new();
    while !cursor.is_exhausted() {
        frames.push(cursor.read_frame()?);
    }
    Ok(Match { frames })
}

/// Forward-only reader over a borrowed float buffer.
pub struct FloatCursor<'a> {
    floats: &'a [f32],
    off: usize,
}

impl<'a> FloatCursor<'a> {
    #[must_use]
    pub fn new(floats: &'a [f32]) -> Self {
        Self { floats, off: 0 }
    }

    /// Floats consumed so far.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.off
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.floats.len() - self.off
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.off >= self.floats.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [f32], DecodeError> {
        if n > self.remaining() {
            return Err(DecodeError::TruncatedRecord {
                offset: self.off,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let s = &self.floats[self.off..self.off + n];
        self.off += n;
        Ok(s)
    }

    /// Read one frame: header, then the declared number of players.
    pub fn read_frame(&mut self) -> Result<Frame, DecodeError> {
        let header = self.take(FRAME_HEADER_LEN)?;
        let count_offset = self.off - 1;
        let count = player_count(header[5], count_offset)?;

        let body = self.take(count.saturating_mul(PLAYER_RECORD_LEN))?;
        let players = body
            .chunks_exact(PLAYER_RECORD_LEN)
            .map(|r| PlayerTick {
                id: r[0] as i32,
                team: r[1] as i32,
                input: r[2] as i32,
                position: Position::new(f64::from(r[3]), f64::from(r[4])),
                velocity: Velocity::new(f64::from(r[5]), f64::from(r[6])),
            })
            .collect::<Players>();

        Ok(Frame {
            tick: header[0] as u32,
            players,
            ball: BallTick::new(
                Position::new(f64::from(header[1]), f64::from(header[2])),
                Velocity::new(f64::from(header[3]), f64::from(header[4])),
            ),
        })
    }
}

/// The count must survive float → integer → float unchanged.
fn player_count(value: f32, offset: usize) -> Result<usize, DecodeError> {
    let count = value as usize;
    if count as f32 == value {
        Ok(count)
    } else {
        Err(DecodeError::MalformedStream { offset, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame(tick: u32) -> Frame {
        Frame::new(
            tick,
            BallTick::new(Position::new(1.5, -2.5), Velocity::new(0.25, 0.0)),
        )
        .with_player(PlayerTick::new(3, 1).with_input(16).at(-100.0, 20.0).moving(1.0, -1.0))
        .with_player(PlayerTick::new(7, 2).with_input(4).at(250.0, -60.0).moving(0.0, 2.0))
    }

    #[test]
    fn test_layout_order() {
        let m = Match::from(vec![sample_frame(42)]);
        let floats = to_floats(&m);

        assert_eq!(floats.len(), frame_len(2));
        assert_eq!(&floats[..6], &[42.0, 1.5, -2.5, 0.25, 0.0, 2.0]);
        assert_eq!(&floats[6..13], &[3.0, 1.0, 16.0, -100.0, 20.0, 1.0, -1.0]);
        assert_eq!(&floats[13..20], &[7.0, 2.0, 4.0, 250.0, -60.0, 0.0, 2.0]);
    }

    #[test]
    fn test_round_trip() {
        let m = Match::from(vec![sample_frame(1), sample_frame(2), sample_frame(3)]);
        let decoded = from_floats(&to_floats(&m)).unwrap();

        assert_eq!(decoded, m);
    }

    #[test]
    fn test_empty_match() {
        let m = Match::new();
        assert!(to_floats(&m).is_empty());
        assert!(from_floats(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_precision_truncated_to_f32() {
        let frame = Frame::new(
            0,
            BallTick::new(Position::new(0.1, 584.0659502969348), Velocity::default()),
        );
        let decoded = from_floats(&to_floats(&Match::from(vec![frame]))).unwrap();

        let y = decoded.frames[0].ball.position.y;
        assert_eq!(y, f64::from(584.0659502969348f64 as f32));
        assert!((y - 584.0659502969348).abs() < 1e-4);
    }

    #[test]
    fn test_truncated_header() {
        let err = from_floats(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TruncatedRecord {
                offset: 0,
                needed: FRAME_HEADER_LEN,
                remaining: 3
            }
        );
    }

    #[test]
    fn test_truncated_players() {
        let mut floats = to_floats(&Match::from(vec![sample_frame(1)]));
        floats.truncate(floats.len() - 1);

        let err = from_floats(&floats).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TruncatedRecord {
                offset: FRAME_HEADER_LEN,
                needed: 2 * PLAYER_RECORD_LEN,
                remaining: 2 * PLAYER_RECORD_LEN - 1
            }
        );
    }

    #[test]
    fn test_fractional_player_count() {
        let err = from_floats(&[0.0, 0.0, 0.0, 0.0, 0.0, 1.5]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MalformedStream {
                offset: 5,
                value: 1.5
            }
        );
    }

    #[test]
    fn test_negative_and_nan_player_count() {
        assert!(matches!(
            from_floats(&[0.0, 0.0, 0.0, 0.0, 0.0, -1.0]),
            Err(DecodeError::MalformedStream { .. })
        ));
        assert!(matches!(
            from_floats(&[0.0, 0.0, 0.0, 0.0, 0.0, f32::NAN]),
            Err(DecodeError::MalformedStream { .. })
        ));
    }

    #[test]
    fn test_team_values_not_validated() {
        let frame =
            Frame::new(0, BallTick::default()).with_player(PlayerTick::new(0, 99).with_input(255));
        let decoded = from_floats(&to_floats(&Match::from(vec![frame.clone()]))).unwrap();

        assert_eq!(decoded.frames[0], frame);
    }

    #[test]
    fn test_error_offset_in_second_frame() {
        let mut floats = to_floats(&Match::from(vec![sample_frame(1)]));
        floats.extend_from_slice(&[2.0, 0.0, 0.0, 0.0, 0.0, 0.5]);

        let err = from_floats(&floats).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MalformedStream {
                offset: frame_len(2) + 5,
                value: 0.5
            }
        );
    }
}

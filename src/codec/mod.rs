//! Flat binary codec for matches.
//!
//! A match is flattened into a sequence of `f32` values ([`flat`]) which is
//! then written as little-endian bytes ([`wire`]). Decoding is a single
//! forward scan with a cursor; no field ranges are validated, only the
//! record shape.
//!
//! ## Usage
//!
//! ```rust
//! use haxball_corpus::codec;
//! use haxball_corpus::core::{BallTick, Frame, Match, PlayerTick};
//!
//! let frame = Frame::new(1, BallTick::default()).with_player(PlayerTick::new(0, 1));
//! let m = Match::from(vec![frame]);
//!
//! let bytes = codec::encode(&m);
//! assert_eq!(codec::decode(&bytes).unwrap(), m);
//! ```

pub mod flat;
pub mod wire;

pub use wire::{bytes_to_floats, decode, encode, encode_batch, floats_to_bytes, FLOAT_WIDTH};
pub use flat::{
    frame_len, from_floats, match_len, to_floats, DecodeError, FloatCursor, FRAME_HEADER_LEN,
    MAX_EXACT_TICK, PLAYER_RECORD_LEN,
};

//! Float sequence ⇄ little-endian bytes, and the full match byte codec.

use byteorder::{ByteOrder, LittleEndian};

use super::flat::{self, DecodeError};
use crate::core::Match;

/// Bytes per encoded float.
pub const FLOAT_WIDTH: usize = 4;

/// Serialize floats as consecutive little-endian IEEE-754 singles.
#[must_use]
pub fn floats_to_bytes(floats: &[f32]) -> Vec<u8> {
    let mut out = vec![0u8; floats.len() * FLOAT_WIDTH];
    LittleEndian::write_f32_into(floats, &mut out);
    out
}

/// Parse consecutive little-endian singles.
///
/// A length that is not a multiple of four is a truncated record, with
/// offsets counted in bytes.
pub fn bytes_to_floats(bytes: &[u8]) -> Result<Vec<f32>, DecodeError> {
    let tail = bytes.len() % FLOAT_WIDTH;
    if tail != 0 {
        return Err(DecodeError::TruncatedRecord {
            offset: bytes.len() - tail,
            needed: FLOAT_WIDTH,
            remaining: tail,
        });
    }
    let mut floats = vec![0f32; bytes.len() / FLOAT_WIDTH];
    LittleEndian::read_f32_into(bytes, &mut floats);
    Ok(floats)
}

/// Encode a match to its byte payload. An empty match yields no bytes.
#[must_use]
pub fn encode(m: &Match) -> Vec<u8> {
    floats_to_bytes(&flat::to_floats(m))
}

/// Decode a byte payload produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<Match, DecodeError> {
    flat::from_floats(&bytes_to_floats(bytes)?)
}

/// Encode several matches independently, one payload each.
#[must_use]
pub fn encode_batch(matches: &[Match]) -> Vec<Vec<u8>> {
    matches.iter().map(encode).collect()
}

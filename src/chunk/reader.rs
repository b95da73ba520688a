//! Incremental chunk parser.
//!
//! `ChunkReader` is push-driven: feed it whatever bytes arrived, get back
//! the chunks they completed. It holds nothing but the undecoded tail, so
//! chunk boundaries may fall anywhere relative to the delivery increments.

use std::fmt;

use bytes::{Buf, Bytes, BytesMut};

use super::writer::LENGTH_PREFIX;

/// Parser position within the current chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadState {
    /// Waiting for a full four-byte length prefix.
    AwaitingLength,
    /// Prefix consumed; waiting for this many payload bytes.
    AwaitingPayload(usize),
}

/// A partial chunk left over when the stream ended.
///
/// Not an error: chunks completed before it are valid, the tail is dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FramingWarning {
    /// Declared payload length, if the prefix itself was complete.
    pub declared: Option<u32>,
    /// Bytes discarded after the last complete chunk (prefix excluded once
    /// it has been parsed).
    pub trailing: usize,
}

impl fmt::Display for FramingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.declared {
            Some(len) => write!(
                f,
                "partial chunk at end of stream: declared {} bytes, only {} present",
                len, self.trailing
            ),
            None => write!(
                f,
                "partial length prefix at end of stream: {} of {} bytes",
                self.trailing, LENGTH_PREFIX
            ),
        }
    }
}

/// Push-driven parser for `[u32 LE length][payload]` chunks.
#[derive(Debug)]
pub struct ChunkReader {
    state: ReadState,
    buf: BytesMut,
    chunks: usize,
    bytes: u64,
}

impl Default for ChunkReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkReader {
    pub fn new() -> Self {
        Self {
            state: ReadState::AwaitingLength,
            buf: BytesMut::new(),
            chunks: 0,
            bytes: 0,
        }
    }

    /// Append bytes and return every chunk they complete, in order.
    pub fn feed(&mut self, input: &[u8]) -> Vec<Bytes> {
        self.bytes += input.len() as u64;
        self.buf.extend_from_slice(input);

        let mut out = Vec::new();
        loop {
            match self.state {
                ReadState::AwaitingLength => {
                    if self.buf.len() < LENGTH_PREFIX {
                        break;
                    }
                    let len = self.buf.get_u32_le() as usize;
                    self.state = ReadState::AwaitingPayload(len);
                }
                ReadState::AwaitingPayload(len) => {
                    if self.buf.len() < len {
                        break;
                    }
                    out.push(self.buf.split_to(len).freeze());
                    self.chunks += 1;
                    self.state = ReadState::AwaitingLength;
                }
            }
        }
        out
    }

    /// Close the stream, reporting any partial chunk that was dropped.
    pub fn finish(self) -> Option<FramingWarning> {
        match self.state {
            ReadState::AwaitingLength if self.buf.is_empty() => None,
            ReadState::AwaitingLength => Some(FramingWarning {
                declared: None,
                trailing: self.buf.len(),
            }),
            ReadState::AwaitingPayload(len) => Some(FramingWarning {
                declared: Some(len as u32),
                trailing: self.buf.len(),
            }),
        }
    }

    #[must_use]
    pub fn state(&self) -> ReadState {
        self.state
    }

    /// Bytes held for the chunk in progress.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Complete chunks emitted so far.
    #[must_use]
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Total bytes fed so far.
    #[must_use]
    pub fn bytes_fed(&self) -> u64 {
        self.bytes
    }
}

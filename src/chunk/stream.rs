//! Pull-style chunk iteration over any `Read`.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;

use super::reader::{ChunkReader, FramingWarning};
use crate::core::DEFAULT_READ_CHUNK_SIZE;

/// Iterates the chunks of a byte source in arrival order.
///
/// Reads happen in fixed increments and are fed through a [`ChunkReader`],
/// so the source never has to fit in memory. A trailing partial chunk is
/// logged once and recorded in [`ChunkStream::warning`]; iteration then ends
/// as if the stream had stopped at the last complete chunk.
///
/// Cancellation is only observed between chunks: a chunk is either yielded
/// whole or not at all.
pub struct ChunkStream<R: Read> {
    inner: R,
    reader: Option<ChunkReader>,
    ready: VecDeque<Bytes>,
    scratch: Vec<u8>,
    cancel: Option<Arc<AtomicBool>>,
    warning: Option<FramingWarning>,
    bytes: u64,
    yielded: usize,
}

impl<R: Read> ChunkStream<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            reader: Some(ChunkReader::new()),
            ready: VecDeque::new(),
            scratch: vec![0u8; DEFAULT_READ_CHUNK_SIZE],
            cancel: None,
            warning: None,
            bytes: 0,
            yielded: 0,
        }
    }

    /// Set the number of bytes requested per read (at least one).
    #[must_use]
    pub fn with_read_size(mut self, size: usize) -> Self {
        self.scratch = vec![0u8; size.max(1)];
        self
    }

    /// Stop at the next chunk boundary once `flag` is set.
    #[must_use]
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// The partial-tail warning, once the source has been exhausted.
    #[must_use]
    pub fn warning(&self) -> Option<FramingWarning> {
        self.warning
    }

    /// Bytes read from the source so far.
    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.bytes
    }

    /// Chunks handed to the caller so far.
    #[must_use]
    pub fn chunks_yielded(&self) -> usize {
        self.yielded
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

impl<R: Read> Iterator for ChunkStream<R> {
    type Item = std::io::Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cancelled() {
                return None;
            }
            if let Some(chunk) = self.ready.pop_front() {
                self.yielded += 1;
                return Some(Ok(chunk));
            }
            let reader = self.reader.as_mut()?;
            match self.inner.read(&mut self.scratch) {
                Ok(0) => {
                    let reader = self.reader.take()?;
                    if let Some(warning) = reader.finish() {
                        log::warn!("{}; discarding tail", warning);
                        self.warning = Some(warning);
                    }
                }
                Ok(n) => {
                    self.bytes += n as u64;
                    self.ready.extend(reader.feed(&self.scratch[..n]));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    self.reader = None;
                    return Some(Err(e));
                }
            }
        }
    }
}

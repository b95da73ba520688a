//! Corpus preparation: sessions in, length-prefixed matches out.
//!
//! [`prepare_corpus`] runs sessions one after another on the calling thread.
//! [`CorpusSink`] is the concurrent variant: producers on any thread encode
//! their matches and queue the bytes, and a single writer thread appends
//! them to the stream in arrival order.

use std::io::Write;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::JoinHandle;

use super::session::{record_session, Rejection, SessionSource};
use crate::chunk::ChunkWriter;
use crate::codec;
use crate::core::{CorpusConfig, Error, Match, Result};

/// Default number of encoded matches queued ahead of the writer thread.
pub const DEFAULT_SINK_CAPACITY: usize = 16;

/// Outcome counts of one preparation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrepareStats {
    /// Sessions offered.
    pub sessions: usize,

    /// Matches written as chunks.
    pub written: usize,

    /// Sessions with no admitted frame.
    pub empty: usize,

    /// Sessions below the retention threshold.
    pub too_short: usize,

    /// Sessions whose source failed mid-read.
    pub failed: usize,

    /// Bytes appended to the corpus, length prefixes included.
    pub bytes: u64,
}

impl PrepareStats {
    fn reject(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::Empty => self.empty += 1,
            Rejection::TooShort { .. } => self.too_short += 1,
        }
    }
}

/// Record every session and append the retained matches to `writer`.
///
/// A failing source is logged and skipped. Write failures abort the run.
pub fn prepare_corpus<I, S, W>(
    sources: I,
    config: &CorpusConfig,
    writer: &mut ChunkWriter<W>,
) -> Result<PrepareStats>
where
    I: IntoIterator<Item = S>,
    I::IntoIter: ExactSizeIterator,
    S: SessionSource,
    W: Write,
{
    config.validate()?;

    let sources = sources.into_iter();
    let total = sources.len();
    let start_bytes = writer.bytes_written();
    let mut stats = PrepareStats::default();

    for (i, mut source) in sources.enumerate() {
        stats.sessions += 1;

        let m = match record_session(config, &mut source) {
            Ok(Ok(m)) => m,
            Ok(Err(rejection)) => {
                log::info!("Session {} skipped: {}", i + 1, rejection);
                stats.reject(rejection);
                continue;
            }
            Err(e) => {
                log::error!("Session {} failed: {}", i + 1, e);
                stats.failed += 1;
                continue;
            }
        };

        if !writer.write_chunk(&codec::encode(&m))? {
            stats.empty += 1;
            continue;
        }
        stats.written += 1;

        log::info!(
            "Wrote {} of {} ({:.2}%)",
            i + 1,
            total,
            (i + 1) as f64 / total as f64 * 100.0
        );
    }

    writer.flush()?;
    stats.bytes = writer.bytes_written() - start_bytes;
    Ok(stats)
}

/// Cloneable handle that queues matches for a [`CorpusSink`].
///
/// Encoding happens on the caller's thread; only bytes cross the channel.
#[derive(Clone, Debug)]
pub struct CorpusProducer {
    sender: SyncSender<Vec<u8>>,
}

impl CorpusProducer {
    /// Encode and queue one match. Blocks while the queue is full.
    pub fn submit(&self, m: &Match) -> Result<()> {
        self.submit_encoded(codec::encode(m))
    }

    /// Queue an already encoded payload.
    pub fn submit_encoded(&self, payload: Vec<u8>) -> Result<()> {
        self.sender.send(payload).map_err(|_| Error::SinkClosed)
    }
}

/// Single-writer corpus output on a background thread.
///
/// Dropping the sink without [`finish`](CorpusSink::finish) still drains the
/// queue and joins the writer; a write failure is then only logged.
pub struct CorpusSink<W: Write + Send + 'static> {
    producer: Option<CorpusProducer>,
    handle: Option<JoinHandle<Result<ChunkWriter<W>>>>,
}

impl<W: Write + Send + 'static> CorpusSink<W> {
    /// Start the writer thread with the default queue depth.
    pub fn spawn(writer: ChunkWriter<W>) -> Result<Self> {
        Self::with_capacity(writer, DEFAULT_SINK_CAPACITY)
    }

    /// Start the writer thread with at most `capacity` queued payloads.
    pub fn with_capacity(writer: ChunkWriter<W>, capacity: usize) -> Result<Self> {
        let (sender, receiver) = mpsc::sync_channel(capacity.max(1));
        let handle = std::thread::Builder::new()
            .name("corpus-writer".into())
            .spawn(move || write_loop(writer, receiver))?;

        Ok(Self {
            producer: Some(CorpusProducer { sender }),
            handle: Some(handle),
        })
    }

    /// A new handle for another producer.
    pub fn producer(&self) -> Result<CorpusProducer> {
        self.producer.clone().ok_or(Error::SinkClosed)
    }

    /// Encode and queue one match.
    pub fn submit(&self, m: &Match) -> Result<()> {
        self.producer
            .as_ref()
            .ok_or(Error::SinkClosed)
            .and_then(|p| p.submit(m))
    }

    /// Close the queue and wait for the writer to drain it.
    ///
    /// Blocks until every outstanding [`CorpusProducer`] has been dropped.
    pub fn finish(mut self) -> Result<ChunkWriter<W>> {
        self.producer = None;
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| {
                log::error!("corpus writer thread panicked");
                Error::SinkClosed
            })?,
            None => Err(Error::SinkClosed),
        }
    }
}

impl<W: Write + Send + 'static> Drop for CorpusSink<W> {
    fn drop(&mut self) {
        self.producer = None;
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => log::error!("corpus sink dropped with error: {}", e),
                Err(_) => log::error!("corpus writer thread panicked"),
            }
        }
    }
}

fn write_loop<W: Write>(
    mut writer: ChunkWriter<W>,
    receiver: Receiver<Vec<u8>>,
) -> Result<ChunkWriter<W>> {
    while let Ok(payload) = receiver.recv() {
        if let Err(e) = writer.write_chunk(&payload) {
            log::error!("corpus writer error: {}", e);
            return Err(e);
        }
    }
    writer.flush()?;
    Ok(writer)
}

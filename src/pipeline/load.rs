//! Corpus loading: chunks in, training examples out.
//!
//! Examples are pushed into an [`ExampleSink`] as they are built, so the
//! consumer decides how much of the corpus lives in memory at once. A
//! [`Dataset`] collects everything; a channel hands examples to another
//! thread as the corpus streams past.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::chunk::{ChunkStream, FramingWarning};
use crate::codec;
use crate::core::{CorpusConfig, Error, Result};
use crate::features::{Dataset, Example, FeatureBuilder, FEATURE_LAYOUT_VERSION};

/// Default number of examples buffered between a loader thread and its consumer.
pub const DEFAULT_LOADER_CAPACITY: usize = 4096;

/// Consumer of built examples.
pub trait ExampleSink {
    fn accept(&mut self, example: Example) -> Result<()>;
}

impl ExampleSink for Dataset {
    fn accept(&mut self, example: Example) -> Result<()> {
        self.push(example)
    }
}

impl ExampleSink for Vec<Example> {
    fn accept(&mut self, example: Example) -> Result<()> {
        self.push(example);
        Ok(())
    }
}

impl ExampleSink for SyncSender<Example> {
    fn accept(&mut self, example: Example) -> Result<()> {
        self.send(example).map_err(|_| Error::SinkClosed)
    }
}

/// Outcome counts of one load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Complete chunks read.
    pub chunks: usize,

    /// Chunks that decoded into a match.
    pub matches: usize,

    /// Frames that produced examples.
    pub frames: usize,

    /// Examples delivered to the sink.
    pub examples: usize,

    /// Chunks that failed to decode.
    pub skipped_matches: usize,

    /// Frames whose player count differs from the configured one.
    pub skipped_frames: usize,

    /// Examples rejected by the feature builder.
    pub skipped_examples: usize,

    /// Bytes read from the source.
    pub bytes: u64,

    /// Partial chunk discarded at the end, if any.
    pub warning: Option<FramingWarning>,
}

/// Streams a corpus through the feature builder.
#[derive(Clone, Debug)]
pub struct CorpusLoader {
    config: CorpusConfig,
    builder: FeatureBuilder,
    cancel: Option<Arc<AtomicBool>>,
    total_bytes: Option<u64>,
}

impl CorpusLoader {
    pub fn new(config: CorpusConfig) -> Self {
        let builder = FeatureBuilder::from_config(&config);
        Self {
            config,
            builder,
            cancel: None,
            total_bytes: None,
        }
    }

    /// Stop at the next chunk boundary once `flag` is set.
    #[must_use]
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Corpus size, used only for progress reporting.
    #[must_use]
    pub fn with_total_bytes(mut self, total: u64) -> Self {
        self.total_bytes = Some(total);
        self
    }

    #[must_use]
    pub fn config(&self) -> &CorpusConfig {
        &self.config
    }

    #[must_use]
    pub fn builder(&self) -> &FeatureBuilder {
        &self.builder
    }

    /// Load every example of `reader` into `sink`.
    ///
    /// Undecodable matches and unbuildable examples are logged and skipped.
    /// Read failures and sink failures end the load.
    pub fn load<R, K>(&self, reader: R, sink: &mut K) -> Result<LoadStats>
    where
        R: Read,
        K: ExampleSink + ?Sized,
    {
        self.config.validate()?;
        log::debug!(
            "loading corpus: {} players per frame, feature layout v{}",
            self.config.expected_player_count,
            FEATURE_LAYOUT_VERSION
        );

        let mut stream = ChunkStream::new(reader).with_read_size(self.config.read_chunk_size);
        if let Some(flag) = &self.cancel {
            stream = stream.with_cancel(Arc::clone(flag));
        }

        let mut stats = LoadStats::default();
        let mut payload_bytes = 0u64;

        for chunk in stream.by_ref() {
            let chunk = chunk?;
            stats.chunks += 1;
            payload_bytes += chunk.len() as u64;

            match self.total_bytes {
                Some(total) if total > 0 => log::info!(
                    "Processing match: {} bytes ({:.2}%)",
                    chunk.len(),
                    payload_bytes as f64 / total as f64 * 100.0
                ),
                _ => log::info!("Processing match: {} bytes", chunk.len()),
            }

            let m = match codec::decode(&chunk) {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("skipping match {}: {}", stats.chunks, e);
                    stats.skipped_matches += 1;
                    continue;
                }
            };
            stats.matches += 1;

            for frame in m.iter() {
                if frame.player_count() != self.config.expected_player_count {
                    log::debug!(
                        "skipping frame {}: {} players, expected {}",
                        frame.tick,
                        frame.player_count(),
                        self.config.expected_player_count
                    );
                    stats.skipped_frames += 1;
                    continue;
                }
                stats.frames += 1;

                for example in self.builder.examples(frame) {
                    match example {
                        Ok(example) => {
                            sink.accept(example)?;
                            stats.examples += 1;
                        }
                        Err(e) => {
                            log::warn!("skipping example at tick {}: {}", frame.tick, e);
                            stats.skipped_examples += 1;
                        }
                    }
                }
            }
        }

        stats.bytes = stream.bytes_read();
        stats.warning = stream.warning();
        Ok(stats)
    }

    /// Load a corpus file into `sink`.
    pub fn load_file<K>(&self, path: impl AsRef<Path>, sink: &mut K) -> Result<LoadStats>
    where
        K: ExampleSink + ?Sized,
    {
        let file = File::open(path)?;
        let loader = match (self.total_bytes, file.metadata()) {
            (None, Ok(meta)) => self.clone().with_total_bytes(meta.len()),
            _ => self.clone(),
        };
        loader.load(file, sink)
    }

    /// Load a corpus file on a background thread.
    ///
    /// Examples arrive on the returned receiver as they are built. Dropping
    /// the receiver stops the loader with [`Error::SinkClosed`].
    pub fn spawn(
        self,
        path: impl Into<PathBuf>,
        capacity: usize,
    ) -> Result<(Receiver<Example>, JoinHandle<Result<LoadStats>>)> {
        let path = path.into();
        let (mut sender, receiver) = mpsc::sync_channel(capacity.max(1));
        let handle = std::thread::Builder::new()
            .name("corpus-loader".into())
            .spawn(move || self.load_file(&path, &mut sender))?;
        Ok((receiver, handle))
    }
}

/// Load every example of `reader` into `sink` with the default loader.
pub fn load_corpus<R, K>(reader: R, config: &CorpusConfig, sink: &mut K) -> Result<LoadStats>
where
    R: Read,
    K: ExampleSink + ?Sized,
{
    CorpusLoader::new(config.clone()).load(reader, sink)
}

/// Load a whole corpus file into memory.
pub fn load_dataset(path: impl AsRef<Path>, config: &CorpusConfig) -> Result<(Dataset, LoadStats)> {
    let mut dataset = Dataset::new(config.feature_len());
    let stats = CorpusLoader::new(config.clone()).load_file(path, &mut dataset)?;
    Ok((dataset, stats))
}

/// Stream a corpus file to another thread with the default buffer depth.
pub fn spawn_loader(
    path: impl Into<PathBuf>,
    config: &CorpusConfig,
) -> Result<(Receiver<Example>, JoinHandle<Result<LoadStats>>)> {
    CorpusLoader::new(config.clone()).spawn(path, DEFAULT_LOADER_CAPACITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkWriter;
    use crate::core::{BallTick, Frame, Match, PlayerTick};
    use std::io::Cursor;

    fn two_player_match(ticks: &[u32]) -> Match {
        ticks
            .iter()
            .map(|&t| {
                Frame::new(t, BallTick::default())
                    .with_player(PlayerTick::new(1, 1).with_input(4).at(f64::from(t), 0.0))
                    .with_player(PlayerTick::new(2, 2).with_input(16))
            })
            .collect()
    }

    fn corpus(payloads: &[Vec<u8>]) -> Vec<u8> {
        let mut writer = ChunkWriter::new(Vec::new());
        for p in payloads {
            writer.write_chunk(p).unwrap();
        }
        writer.into_inner().unwrap()
    }

    #[test]
    fn test_load_into_dataset() {
        let data = corpus(&[
            codec::encode(&two_player_match(&[1, 2])),
            codec::encode(&two_player_match(&[3])),
        ]);
        let config = CorpusConfig::new(2);
        let mut ds = Dataset::new(config.feature_len());

        let stats = load_corpus(Cursor::new(data), &config, &mut ds).unwrap();

        assert_eq!(stats.chunks, 2);
        assert_eq!(stats.matches, 2);
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.examples, 6);
        assert_eq!(stats.warning, None);
        assert_eq!(ds.shape(), [6, 14]);
        assert_eq!(&ds.targets()[..2], &[4.0, 16.0]);
    }

    #[test]
    fn test_bad_match_skipped() {
        let mut bad = codec::encode(&two_player_match(&[1]));
        // player count 2.0 -> 2.5
        bad[5 * 4..6 * 4].copy_from_slice(&2.5f32.to_le_bytes());
        let data = corpus(&[bad, codec::encode(&two_player_match(&[7]))]);

        let mut out: Vec<Example> = Vec::new();
        let stats = load_corpus(Cursor::new(data), &CorpusConfig::new(2), &mut out).unwrap();

        assert_eq!(stats.skipped_matches, 1);
        assert_eq!(stats.matches, 1);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|e| e.tick == 7));
    }

    #[test]
    fn test_wrong_player_count_frames_skipped() {
        let data = corpus(&[codec::encode(&two_player_match(&[1, 2]))]);
        let mut out: Vec<Example> = Vec::new();
        let stats = load_corpus(Cursor::new(data), &CorpusConfig::new(3), &mut out).unwrap();

        assert_eq!(stats.skipped_frames, 2);
        assert!(out.is_empty());
    }

    #[test]
    fn test_non_finite_example_skipped() {
        let m: Match = vec![Frame::new(0, BallTick::default())
            .with_player(PlayerTick::new(1, 1).at(f64::INFINITY, 0.0))
            .with_player(PlayerTick::new(2, 2))]
        .into();
        let data = corpus(&[codec::encode(&m), codec::encode(&two_player_match(&[5]))]);

        let mut out: Vec<Example> = Vec::new();
        let stats = load_corpus(Cursor::new(data), &CorpusConfig::new(2), &mut out).unwrap();

        assert_eq!(stats.skipped_examples, 2);
        assert_eq!(stats.examples, 2);
    }

    #[test]
    fn test_partial_tail_reported() {
        let mut data = corpus(&[codec::encode(&two_player_match(&[1]))]);
        data.extend_from_slice(&100u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 60]);

        let mut out: Vec<Example> = Vec::new();
        let stats = load_corpus(Cursor::new(data), &CorpusConfig::new(2), &mut out).unwrap();

        assert_eq!(stats.examples, 2);
        assert_eq!(
            stats.warning,
            Some(FramingWarning {
                declared: Some(100),
                trailing: 60
            })
        );
    }

    #[test]
    fn test_closed_channel_stops_load() {
        let data = corpus(&[codec::encode(&two_player_match(&[1]))]);
        let (mut sender, receiver) = mpsc::sync_channel::<Example>(4);
        drop(receiver);

        let err = load_corpus(Cursor::new(data), &CorpusConfig::new(2), &mut sender).unwrap_err();
        assert!(matches!(err, Error::SinkClosed));
    }

    #[test]
    fn test_cancelled_before_start() {
        let data = corpus(&[codec::encode(&two_player_match(&[1]))]);
        let flag = Arc::new(AtomicBool::new(true));
        let mut out: Vec<Example> = Vec::new();

        let stats = CorpusLoader::new(CorpusConfig::new(2))
            .with_cancel(flag)
            .load(Cursor::new(data), &mut out)
            .unwrap();

        assert_eq!(stats.chunks, 0);
        assert!(out.is_empty());
    }
}

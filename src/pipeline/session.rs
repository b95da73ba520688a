//! Game session sources and frame admission.
//!
//! A session source emits one [`TickEvent`] per simulated tick. The
//! [`SessionRecorder`] turns those events into the frames of one [`Match`],
//! dropping spectators and any tick that would break the stored-frame shape.

use std::io::BufRead;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{BallTick, CorpusConfig, Frame, Match, PlayerTick, Result};

/// Team id of spectators.
pub const SPECTATOR_TEAM: i32 = 0;

/// Raw state of one tick as reported by a game session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickEvent {
    pub tick: u32,

    /// Missing when the session has no resolvable ball this tick.
    #[serde(default)]
    pub ball: Option<BallTick>,

    /// Every player in the room, spectators included.
    #[serde(default)]
    pub players: Vec<PlayerTick>,
}

impl TickEvent {
    pub fn new(tick: u32, ball: Option<BallTick>) -> Self {
        Self {
            tick,
            ball,
            players: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_player(mut self, player: PlayerTick) -> Self {
        self.players.push(player);
        self
    }
}

/// Something that emits tick events until the session ends.
pub trait SessionSource {
    /// The next tick, or `None` once the session has ended.
    fn next_tick(&mut self) -> Result<Option<TickEvent>>;
}

impl SessionSource for std::vec::IntoIter<TickEvent> {
    fn next_tick(&mut self) -> Result<Option<TickEvent>> {
        Ok(self.next())
    }
}

impl<S: SessionSource + ?Sized> SessionSource for Box<S> {
    fn next_tick(&mut self) -> Result<Option<TickEvent>> {
        (**self).next_tick()
    }
}

/// A recorded session stored as JSON lines, one [`TickEvent`] per line.
///
/// Blank lines are ignored.
pub struct JsonlSession<R: BufRead> {
    lines: std::io::Lines<R>,
    line: usize,
}

impl<R: BufRead> JsonlSession<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }

    /// Lines consumed so far, blank ones included.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> SessionSource for JsonlSession<R> {
    fn next_tick(&mut self) -> Result<Option<TickEvent>> {
        for line in self.lines.by_ref() {
            let line = line?;
            self.line += 1;
            if line.trim().is_empty() {
                continue;
            }
            return Ok(Some(serde_json::from_str(&line)?));
        }
        Ok(None)
    }
}

/// What happened to one tick offered to a [`SessionRecorder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// Stored as a frame.
    Admitted,

    /// Dropped: no ball this tick.
    NoBall,

    /// Dropped: wrong number of non-spectator players.
    PlayerCount { found: usize },

    /// Dropped: a player id appears twice.
    DuplicatePlayer { id: i32 },
}

impl Admission {
    #[must_use]
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// Why a finished session was not kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("no frames admitted")]
    Empty,

    #[error("largest tick {max_tick} is below the minimum {minimum}")]
    TooShort { max_tick: u32, minimum: u32 },
}

/// Per-reason counts of dropped ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DropCounts {
    pub no_ball: usize,
    pub player_count: usize,
    pub duplicate_player: usize,
}

impl DropCounts {
    #[must_use]
    pub fn total(&self) -> usize {
        self.no_ball + self.player_count + self.duplicate_player
    }
}

/// Accumulates the admitted frames of one session.
#[derive(Clone, Debug)]
pub struct SessionRecorder {
    expected_players: usize,
    minimum_ticks: u32,
    frames: Match,
    dropped: DropCounts,
    spectators: usize,
}

impl SessionRecorder {
    pub fn new(config: &CorpusConfig) -> Self {
        Self {
            expected_players: config.expected_player_count,
            minimum_ticks: config.minimum_ticks_to_retain,
            frames: Match::new(),
            dropped: DropCounts::default(),
            spectators: 0,
        }
    }

    /// Offer one tick. Spectators are removed before any check.
    pub fn admit(&mut self, event: TickEvent) -> Admission {
        let Some(ball) = event.ball else {
            self.dropped.no_ball += 1;
            return Admission::NoBall;
        };

        let total = event.players.len();
        let players: Vec<PlayerTick> = event
            .players
            .into_iter()
            .filter(|p| p.team != SPECTATOR_TEAM)
            .collect();
        self.spectators += total - players.len();

        if players.len() != self.expected_players {
            self.dropped.player_count += 1;
            return Admission::PlayerCount {
                found: players.len(),
            };
        }

        let mut seen = FxHashSet::default();
        if let Some(dup) = players.iter().find(|p| !seen.insert(p.id)) {
            self.dropped.duplicate_player += 1;
            return Admission::DuplicatePlayer { id: dup.id };
        }

        let mut frame = Frame::new(event.tick, ball);
        frame.players.extend(players);
        self.frames.push(frame);
        Admission::Admitted
    }

    /// Frames admitted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[must_use]
    pub fn dropped(&self) -> DropCounts {
        self.dropped
    }

    /// Spectator entries removed across all ticks.
    #[must_use]
    pub fn spectators(&self) -> usize {
        self.spectators
    }

    /// Close the session, applying the retention threshold.
    pub fn finish(self) -> std::result::Result<Match, Rejection> {
        let Some(max_tick) = self.frames.max_tick() else {
            return Err(Rejection::Empty);
        };
        if max_tick < self.minimum_ticks {
            return Err(Rejection::TooShort {
                max_tick,
                minimum: self.minimum_ticks,
            });
        }
        Ok(self.frames)
    }
}

/// Drain `source` through a fresh recorder.
///
/// The outer `Result` carries source failures; the inner one whether the
/// finished session is kept.
pub fn record_session<S: SessionSource + ?Sized>(
    config: &CorpusConfig,
    source: &mut S,
) -> Result<std::result::Result<Match, Rejection>> {
    let mut recorder = SessionRecorder::new(config);
    while let Some(event) = source.next_tick()? {
        recorder.admit(event);
    }

    let dropped = recorder.dropped();
    log::debug!(
        "session closed: {} frames admitted, {} dropped (no ball {}, player count {}, duplicate {}), {} spectator entries removed",
        recorder.len(),
        dropped.total(),
        dropped.no_ball,
        dropped.player_count,
        dropped.duplicate_player,
        recorder.spectators()
    );
    Ok(recorder.finish())
}

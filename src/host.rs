//! Capabilities a quiz session needs from its environment.
//!
//! The browser build implements [`Host`] on top of the DOM and the HanziWriter
//! library; tests implement it with a recorder. Everything a host reports back
//! (attempt completion, demo completion, fired timers) re-enters the session
//! as a [`QuizEvent`](crate::session::QuizEvent).

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::layout::Placement;
use crate::tone::Tone;

/// Monotonic tag identifying one active attempt (or one reveal cycle).
///
/// Every replacement of the active attempt bumps it, so a notification that
/// carries an older value belongs to an attempt that no longer exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stroke geometry for one character, passed through to the writer untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrokeData(pub serde_json::Value);

/// When the writer starts highlighting the expected stroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HintPolicy {
    AfterMisses(NonZeroU32),
    Never,
}

impl HintPolicy {
    /// `0` disables hints.
    pub fn from_misses(misses: u32) -> Self {
        NonZeroU32::new(misses).map_or(HintPolicy::Never, HintPolicy::AfterMisses)
    }
}

/// Options handed to the writer for each created attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct WriterOptions {
    pub size: u32,
    pub stroke_color: String,
    pub leniency: f64,
    pub hint: HintPolicy,
    pub stroke_delay_ms: u32,
}

/// Deferred work a session asks its host to run later.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timer {
    /// Lay out all slots after the entering slot at `position` was committed.
    Reposition { position: usize },
    /// Advance past the attempt that completed with `generation`.
    Advance { generation: Generation },
    /// Hide the demonstration and quiz the same character again.
    Resume { generation: Generation },
}

/// Handle to the recognition component for one character.
pub trait Writer {
    /// Begin capturing strokes. Completion is reported with `generation`.
    fn start_quiz(&mut self, generation: Generation);
    /// Abort the running quiz, discarding partial strokes.
    fn cancel_quiz(&mut self);
    fn show_outline(&mut self);
    fn hide_character(&mut self);
    /// Play the full stroke demonstration. Completion is reported with `generation`.
    fn animate_demo(&mut self, generation: Generation);
}

pub trait Host {
    /// Visual handle for one presentation slot.
    type Slot;
    type Writer: Writer;

    fn create_slot(&mut self, position: usize) -> Result<Self::Slot, QuizError>;
    fn place_slot(&mut self, slot: &Self::Slot, placement: Placement);
    /// Remove a slot that never received a writer.
    fn release_slot(&mut self, slot: Self::Slot);

    /// Computed display color for a tone category, or `None` if the
    /// environment could not resolve it.
    fn probe_tone_color(&mut self, tone: Tone) -> Option<String>;

    fn create_writer(
        &mut self,
        slot: &Self::Slot,
        character: &str,
        strokes: &StrokeData,
        options: &WriterOptions,
    ) -> Result<Self::Writer, QuizError>;

    /// Fire `timer` back into the session after `delay_ms`. Not cancellable.
    fn schedule(&mut self, delay_ms: u32, timer: Timer);

    /// The last character was completed.
    fn session_finished(&mut self);
}

//! The quiz sequencer.
//!
//! A [`QuizSession`] walks a [`Lesson`] one character at a time. For each
//! position it creates a presentation slot, asks the host for a writer and
//! starts a quiz on it; when the writer reports completion the session waits
//! [`Timing::advance_delay_ms`] and moves on. Earlier slots are archived
//! most-recent-first and slide left, with anything past
//! [`RETENTION_DEPTH`](crate::layout::RETENTION_DEPTH) hidden.
//!
//! All state lives in the session object; hosts feed notifications back in
//! through [`QuizSession::handle`]. Every notification and timer is checked
//! against current state, so late or duplicated callbacks are harmless.

use std::collections::VecDeque;

use crate::config::{SessionOptions, Timing};
use crate::error::QuizError;
use crate::host::{Generation, Host, Timer, Writer, WriterOptions};
use crate::layout::{self, SlotState};
use crate::lesson::Lesson;
use crate::reveal::RevealController;
use crate::tone::ToneColorTable;

/// Notifications delivered to a session by its host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizEvent {
    /// The learner finished the attempt tagged with `generation`.
    AttemptComplete { generation: Generation },
    /// The demonstration started by a reveal finished playing.
    DemoComplete { generation: Generation },
    /// The reveal affordance was used.
    RevealRequested,
    /// A previously scheduled timer fired.
    Timer(Timer),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Quizzing { position: usize },
    Finished,
}

/// Outcome of [`QuizSession::advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    Quizzing(usize),
    Finished,
    /// A reveal cycle holds the writer; nothing changed.
    Refused,
}

/// Visual record for one sequence position.
#[derive(Debug)]
pub struct PresentationSlot<V> {
    pub position: usize,
    pub color: String,
    pub state: SlotState,
    pub handle: V,
}

/// The live quiz for the current character.
#[derive(Debug)]
pub(crate) struct ActiveAttempt<W> {
    pub(crate) writer: W,
    pub(crate) generation: Generation,
}

pub struct QuizSession<H: Host> {
    pub(crate) host: H,
    lesson: Lesson,
    pub(crate) options: SessionOptions,
    tone_colors: ToneColorTable,
    cursor: Option<usize>,
    current: Option<PresentationSlot<H::Slot>>,
    archive: VecDeque<PresentationSlot<H::Slot>>,
    pub(crate) attempt: Option<ActiveAttempt<H::Writer>>,
    pub(crate) generation: Generation,
    /// Generation whose completion is waiting on the advance timer.
    pub(crate) pending_advance: Option<Generation>,
    pub(crate) reveal: Option<RevealController<H::Writer>>,
    finished: bool,
}

impl<H: Host> QuizSession<H> {
    /// Resolves the tone color table once and prepares an idle session.
    /// Nothing is shown until [`start`](Self::start).
    pub fn new(mut host: H, lesson: Lesson, options: SessionOptions) -> Self {
        let tone_colors = ToneColorTable::resolve(|tone| host.probe_tone_color(tone));
        let reveal = options.reveal.then(RevealController::new);
        Self {
            host,
            lesson,
            options,
            tone_colors,
            cursor: None,
            current: None,
            archive: VecDeque::new(),
            attempt: None,
            generation: Generation::default(),
            pending_advance: None,
            reveal,
            finished: false,
        }
    }

    /// Presents the first character. Calling it on a running session is a no-op.
    pub fn start(&mut self) -> Result<Progress, QuizError> {
        match self.phase() {
            Phase::NotStarted => {
                log::info!("starting quiz over {} characters", self.lesson.len());
                self.advance()
            }
            Phase::Quizzing { position } => Ok(Progress::Quizzing(position)),
            Phase::Finished => Ok(Progress::Finished),
        }
    }

    /// Archives the current slot and presents the next character, or ends the
    /// session if the last one was already presented.
    ///
    /// On a host error nothing is committed: a slot created for the failed
    /// position is released, and the cursor and attempt are left as they were.
    pub fn advance(&mut self) -> Result<Progress, QuizError> {
        if self.finished {
            log::debug!("advance after finish ignored");
            return Ok(Progress::Finished);
        }
        if self.is_revealing() {
            log::debug!("advance refused during reveal");
            return Ok(Progress::Refused);
        }

        let next = self.cursor.map_or(0, |c| c + 1);
        if next >= self.lesson.len() {
            self.archive_current();
            self.finished = true;
            log::info!("quiz finished after {} characters", self.lesson.len());
            self.host.session_finished();
            return Ok(Progress::Finished);
        }

        let (character, strokes) = self
            .lesson
            .entry(next)
            .ok_or(QuizError::MissingEntry(next))?;
        let color = self
            .tone_colors
            .color_for(self.lesson.tone(next))
            .to_string();

        let writer_options = WriterOptions {
            size: self.options.size,
            stroke_color: color.clone(),
            leniency: self.options.leniency,
            hint: self.options.hint,
            stroke_delay_ms: self.options.stroke_delay_ms,
        };
        let handle = self.host.create_slot(next)?;
        let writer = match self
            .host
            .create_writer(&handle, character, strokes, &writer_options)
        {
            Ok(writer) => writer,
            Err(e) => {
                self.host.release_slot(handle);
                return Err(e);
            }
        };

        let entering = next > 0;
        let placement = if entering {
            layout::entering(self.options.size)
        } else {
            layout::active(self.options.size)
        };
        self.host.place_slot(&handle, placement);
        log::debug!("quizzing '{character}' at position {next}");

        self.archive_current();
        self.cursor = Some(next);
        self.replace_attempt(writer);
        self.current = Some(PresentationSlot {
            position: next,
            color,
            state: if entering {
                SlotState::Entering
            } else {
                SlotState::Active
            },
            handle,
        });
        if entering {
            self.host.schedule(
                self.options.timing.pre_layout_ms,
                Timer::Reposition { position: next },
            );
        }
        Ok(Progress::Quizzing(next))
    }

    /// Drops the finished attempt and moves the current slot to the front of
    /// the archive.
    fn archive_current(&mut self) {
        self.pending_advance = None;
        self.attempt = None;
        if let Some(mut slot) = self.current.take() {
            slot.state = SlotState::Archived;
            self.archive.push_front(slot);
        }
    }

    /// Schedules the advance for a completed attempt. Completions from
    /// superseded attempts, duplicates, and completions arriving during a
    /// reveal are ignored.
    pub fn on_attempt_complete(&mut self, generation: Generation) {
        if self.finished || self.is_revealing() {
            log::debug!("completion {generation} ignored");
            return;
        }
        if self.attempt.as_ref().map(|a| a.generation) != Some(generation) {
            log::debug!("stale completion {generation} (current {})", self.generation);
            return;
        }
        if self.pending_advance.is_some() {
            return;
        }
        self.pending_advance = Some(generation);
        self.host.schedule(
            self.options.timing.advance_delay_ms,
            Timer::Advance { generation },
        );
    }

    pub fn on_timer(&mut self, timer: Timer) -> Result<(), QuizError> {
        match timer {
            Timer::Reposition { position } => self.reposition(position),
            Timer::Advance { generation } => {
                if self.pending_advance == Some(generation) && self.generation == generation {
                    self.advance()?;
                } else {
                    log::debug!("stale advance timer {generation}");
                }
            }
            Timer::Resume { generation } => self.resume_after_reveal(generation),
        }
        Ok(())
    }

    pub fn handle(&mut self, event: QuizEvent) -> Result<(), QuizError> {
        match event {
            QuizEvent::AttemptComplete { generation } => self.on_attempt_complete(generation),
            QuizEvent::DemoComplete { generation } => self.on_demo_complete(generation),
            QuizEvent::RevealRequested => self.reveal(),
            QuizEvent::Timer(timer) => return self.on_timer(timer),
        }
        Ok(())
    }

    /// Lays out every slot once the entering slot at `position` is committed.
    fn reposition(&mut self, position: usize) {
        let size = self.options.size;
        let Some(current) = self.current.as_mut() else {
            return;
        };
        if current.position != position || current.state != SlotState::Entering {
            log::debug!("stale reposition for position {position}");
            return;
        }
        for (idx, slot) in self.archive.iter_mut().enumerate() {
            let rank = idx + 1;
            if rank <= layout::RETENTION_DEPTH {
                self.host.place_slot(&slot.handle, layout::archived(size, rank));
            } else if slot.state != SlotState::Hidden {
                self.host.place_slot(&slot.handle, layout::Placement::Hidden);
                slot.state = SlotState::Hidden;
            }
        }
        self.host.place_slot(&current.handle, layout::active(size));
        current.state = SlotState::Active;
    }

    /// Destroys the current attempt (if any) and starts a quiz on `writer`
    /// under a fresh generation.
    pub(crate) fn replace_attempt(&mut self, mut writer: H::Writer) {
        self.attempt = None;
        self.generation = self.generation.next();
        writer.start_quiz(self.generation);
        self.attempt = Some(ActiveAttempt {
            writer,
            generation: self.generation,
        });
    }

    // --- Accessors ------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        match (self.finished, self.cursor) {
            (true, _) => Phase::Finished,
            (false, None) => Phase::NotStarted,
            (false, Some(position)) => Phase::Quizzing { position },
        }
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn current_character(&self) -> Option<&str> {
        if self.finished {
            return None;
        }
        self.cursor.and_then(|c| self.lesson.character(c))
    }

    pub fn current_slot(&self) -> Option<&PresentationSlot<H::Slot>> {
        self.current.as_ref()
    }

    /// Archived slots, most recent first (index 0 has rank 1).
    pub fn archive(&self) -> impl Iterator<Item = &PresentationSlot<H::Slot>> {
        self.archive.iter()
    }

    /// 1-based archive rank of the slot for `position`, if archived.
    pub fn archive_rank(&self, position: usize) -> Option<usize> {
        self.archive
            .iter()
            .position(|s| s.position == position)
            .map(|idx| idx + 1)
    }

    pub fn slot_count(&self) -> usize {
        self.archive.len() + usize::from(self.current.is_some())
    }

    pub fn has_active_attempt(&self) -> bool {
        self.attempt.is_some()
    }

    /// Most recently issued generation (attempt or reveal cycle).
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Generation of the live attempt, if one exists.
    pub fn attempt_generation(&self) -> Option<Generation> {
        self.attempt.as_ref().map(|a| a.generation)
    }

    pub fn tone_colors(&self) -> &ToneColorTable {
        &self.tone_colors
    }

    pub fn lesson(&self) -> &Lesson {
        &self.lesson
    }

    pub fn timing(&self) -> Timing {
        self.options.timing
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

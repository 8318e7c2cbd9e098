//! Reveal cycles: show the learner the correct strokes without moving on.
//!
//! A reveal cancels the running quiz, takes the writer out of the session for
//! the duration of the demonstration, and hands it back with a fresh quiz on
//! the same character once the demonstration has lingered for
//! [`Timing::reveal_linger_ms`](crate::config::Timing::reveal_linger_ms).

use crate::host::{Generation, Host, Timer, Writer};
use crate::session::QuizSession;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealPhase {
    Demonstrating,
    Lingering,
}

#[derive(Debug)]
struct RevealCycle<W> {
    writer: W,
    generation: Generation,
    phase: RevealPhase,
}

/// Holds the writer while a reveal cycle is running.
#[derive(Debug)]
pub struct RevealController<W> {
    cycle: Option<RevealCycle<W>>,
}

impl<W> RevealController<W> {
    pub fn new() -> Self {
        Self { cycle: None }
    }

    pub fn in_progress(&self) -> bool {
        self.cycle.is_some()
    }

    pub fn phase(&self) -> Option<RevealPhase> {
        self.cycle.as_ref().map(|c| c.phase)
    }
}

impl<W> Default for RevealController<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> QuizSession<H> {
    /// Starts a reveal cycle for the current character.
    ///
    /// Ignored when no reveal affordance is configured, when a cycle is
    /// already running, or when there is no live attempt. A completion that
    /// was received but not yet acted on is dropped: the learner quizzes the
    /// same character again after the demonstration.
    pub fn reveal(&mut self) {
        let Some(controller) = self.reveal.as_mut() else {
            log::debug!("reveal requested without a reveal affordance");
            return;
        };
        if controller.in_progress() {
            return;
        }
        let Some(attempt) = self.attempt.take() else {
            log::debug!("reveal requested with no active attempt");
            return;
        };

        self.pending_advance = None;
        self.generation = self.generation.next();
        let mut writer = attempt.writer;
        writer.cancel_quiz();
        writer.show_outline();
        writer.animate_demo(self.generation);
        log::debug!("revealing current character ({})", self.generation);
        controller.cycle = Some(RevealCycle {
            writer,
            generation: self.generation,
            phase: RevealPhase::Demonstrating,
        });
    }

    /// The demonstration finished; let it linger before resuming.
    pub fn on_demo_complete(&mut self, generation: Generation) {
        let Some(cycle) = self.reveal.as_mut().and_then(|r| r.cycle.as_mut()) else {
            return;
        };
        if cycle.generation != generation || cycle.phase != RevealPhase::Demonstrating {
            log::debug!("stale demo completion {generation}");
            return;
        }
        cycle.phase = RevealPhase::Lingering;
        self.host.schedule(
            self.options.timing.reveal_linger_ms,
            Timer::Resume { generation },
        );
    }

    /// Hides the demonstration and quizzes the same character again.
    pub(crate) fn resume_after_reveal(&mut self, generation: Generation) {
        let Some(controller) = self.reveal.as_mut() else {
            return;
        };
        let matches = controller
            .cycle
            .as_ref()
            .is_some_and(|c| c.generation == generation && c.phase == RevealPhase::Lingering);
        if !matches {
            log::debug!("stale resume timer {generation}");
            return;
        }
        let Some(cycle) = controller.cycle.take() else {
            return;
        };
        let mut writer = cycle.writer;
        writer.hide_character();
        self.replace_attempt(writer);
    }

    pub fn is_revealing(&self) -> bool {
        self.reveal.as_ref().is_some_and(RevealController::in_progress)
    }

    pub fn has_reveal(&self) -> bool {
        self.reveal.is_some()
    }

    pub fn reveal_phase(&self) -> Option<RevealPhase> {
        self.reveal.as_ref().and_then(RevealController::phase)
    }
}

// Recording host shared by the integration tests. Writers and the host append
// to one call log; scheduled timers queue up until a test fires them.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use hanzi_quiz::layout::Placement;
use hanzi_quiz::{
    Generation, Host, Lesson, QuizError, QuizEvent, QuizSession, SessionOptions, StrokeData,
    Timer, Tone, Writer, WriterOptions,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateSlot(usize),
    ReleaseSlot(usize),
    Place { slot: usize, placement: Placement },
    CreateWriter { slot: usize, character: String, color: String },
    StartQuiz { slot: usize, generation: Generation },
    CancelQuiz { slot: usize },
    ShowOutline { slot: usize },
    HideCharacter { slot: usize },
    AnimateDemo { slot: usize, generation: Generation },
    Schedule { delay_ms: u32, timer: Timer },
    Finished,
}

#[derive(Clone, Default)]
pub struct Recorder {
    pub calls: Rc<RefCell<Vec<Call>>>,
    pub timers: Rc<RefCell<VecDeque<Timer>>>,
}

impl Recorder {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn created_slots(&self) -> Vec<usize> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::CreateSlot(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Created slots that were not released again.
    pub fn live_slots(&self) -> Vec<usize> {
        let mut live = Vec::new();
        for call in self.calls.borrow().iter() {
            match call {
                Call::CreateSlot(p) => live.push(*p),
                Call::ReleaseSlot(p) => {
                    if let Some(idx) = live.iter().position(|s| s == p) {
                        live.remove(idx);
                    }
                }
                _ => {}
            }
        }
        live
    }

    pub fn pending_timers(&self) -> Vec<Timer> {
        self.timers.borrow().iter().copied().collect()
    }

    fn push(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

pub struct RecordingWriter {
    slot: usize,
    recorder: Recorder,
}

impl Writer for RecordingWriter {
    fn start_quiz(&mut self, generation: Generation) {
        self.recorder.push(Call::StartQuiz { slot: self.slot, generation });
    }

    fn cancel_quiz(&mut self) {
        self.recorder.push(Call::CancelQuiz { slot: self.slot });
    }

    fn show_outline(&mut self) {
        self.recorder.push(Call::ShowOutline { slot: self.slot });
    }

    fn hide_character(&mut self) {
        self.recorder.push(Call::HideCharacter { slot: self.slot });
    }

    fn animate_demo(&mut self, generation: Generation) {
        self.recorder.push(Call::AnimateDemo { slot: self.slot, generation });
    }
}

pub struct RecordingHost {
    pub recorder: Recorder,
    pub resolve_colors: bool,
    pub fail_writers: bool,
}

impl RecordingHost {
    pub fn new(recorder: Recorder) -> Self {
        Self {
            recorder,
            resolve_colors: true,
            fail_writers: false,
        }
    }
}

/// Color the recording host reports for `tone`.
pub fn probe_color(tone: Tone) -> String {
    format!("color-{}", tone.class_name())
}

impl Host for RecordingHost {
    type Slot = usize;
    type Writer = RecordingWriter;

    fn create_slot(&mut self, position: usize) -> Result<usize, QuizError> {
        self.recorder.push(Call::CreateSlot(position));
        Ok(position)
    }

    fn place_slot(&mut self, slot: &usize, placement: Placement) {
        self.recorder.push(Call::Place { slot: *slot, placement });
    }

    fn release_slot(&mut self, slot: usize) {
        self.recorder.push(Call::ReleaseSlot(slot));
    }

    fn probe_tone_color(&mut self, tone: Tone) -> Option<String> {
        self.resolve_colors.then(|| probe_color(tone))
    }

    fn create_writer(
        &mut self,
        slot: &usize,
        character: &str,
        _strokes: &StrokeData,
        options: &WriterOptions,
    ) -> Result<RecordingWriter, QuizError> {
        if self.fail_writers {
            return Err(QuizError::Environment("writer unavailable".into()));
        }
        self.recorder.push(Call::CreateWriter {
            slot: *slot,
            character: character.to_string(),
            color: options.stroke_color.clone(),
        });
        Ok(RecordingWriter {
            slot: *slot,
            recorder: self.recorder.clone(),
        })
    }

    fn schedule(&mut self, delay_ms: u32, timer: Timer) {
        self.recorder.push(Call::Schedule { delay_ms, timer });
        self.recorder.timers.borrow_mut().push_back(timer);
    }

    fn session_finished(&mut self) {
        self.recorder.push(Call::Finished);
    }
}

pub fn lesson(chars: &str, tones: Option<Vec<Tone>>) -> Lesson {
    let characters: Vec<String> = chars.chars().map(String::from).collect();
    let strokes = vec![StrokeData::default(); characters.len()];
    Lesson::new(characters, strokes, tones).unwrap()
}

pub fn session_with(
    chars: &str,
    tones: Option<Vec<Tone>>,
    reveal: bool,
) -> (QuizSession<RecordingHost>, Recorder) {
    let recorder = Recorder::default();
    let options = SessionOptions {
        reveal,
        ..SessionOptions::default()
    };
    let session = QuizSession::new(
        RecordingHost::new(recorder.clone()),
        lesson(chars, tones),
        options,
    );
    (session, recorder)
}

pub fn session(chars: &str) -> (QuizSession<RecordingHost>, Recorder) {
    session_with(chars, None, false)
}

/// Fires queued timers in order until none are left.
pub fn run_timers(session: &mut QuizSession<RecordingHost>, recorder: &Recorder) {
    loop {
        let next = recorder.timers.borrow_mut().pop_front();
        match next {
            Some(timer) => session.handle(QuizEvent::Timer(timer)).unwrap(),
            None => break,
        }
    }
}

/// The learner finishes the current attempt.
pub fn complete_current(session: &mut QuizSession<RecordingHost>) {
    let generation = session
        .attempt_generation()
        .expect("an attempt should be active");
    session
        .handle(QuizEvent::AttemptComplete { generation })
        .unwrap();
}

/// Complete the current attempt and let every resulting timer fire.
pub fn write_current(session: &mut QuizSession<RecordingHost>, recorder: &Recorder) {
    complete_current(session);
    run_timers(session, recorder);
}

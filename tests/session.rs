// Sequencing, archiving and tone styling driven through a recording host.

mod common;

use common::*;
use hanzi_quiz::layout::{self, Placement, SlotState, RETENTION_DEPTH};
use hanzi_quiz::{Generation, NEUTRAL_COLOR, Phase, Progress, QuizEvent, Timer, Tone};

#[test]
fn visits_every_position_in_order() {
    for n in 1..=8 {
        let chars: String = "你好猫学汉字黑鱼".chars().take(n).collect();
        let (mut session, recorder) = session(&chars);
        assert_eq!(session.phase(), Phase::NotStarted);

        let mut visited = Vec::new();
        session.start().unwrap();
        while let Phase::Quizzing { position } = session.phase() {
            visited.push(position);
            write_current(&mut session, &recorder);
        }

        assert_eq!(visited, (0..n).collect::<Vec<_>>());
        assert_eq!(recorder.created_slots(), (0..n).collect::<Vec<_>>());
        assert_eq!(recorder.count(|c| matches!(c, Call::Finished)), 1);
        assert_eq!(session.phase(), Phase::Finished);
        assert_eq!(session.slot_count(), n);
    }
}

#[test]
fn two_character_walkthrough() {
    let (mut session, recorder) = session("你好");
    assert_eq!(session.start().unwrap(), Progress::Quizzing(0));
    assert_eq!(session.current_character(), Some("你"));
    let first = session.current_slot().unwrap();
    assert_eq!(first.position, 0);
    assert_eq!(first.state, SlotState::Active);
    assert_eq!(first.color, NEUTRAL_COLOR);
    // the first slot is placed directly at rest, no fade-in
    assert!(recorder.calls().contains(&Call::Place { slot: 0, placement: layout::active(200) }));
    assert!(recorder.pending_timers().is_empty());

    write_current(&mut session, &recorder);
    assert_eq!(session.archive_rank(0), Some(1));
    assert_eq!(session.current_character(), Some("好"));
    let second = session.current_slot().unwrap();
    assert_eq!(second.position, 1);
    assert_eq!(second.state, SlotState::Active);

    recorder.clear();
    write_current(&mut session, &recorder);
    assert!(session.is_finished());
    assert_eq!(session.current_character(), None);
    assert!(session.current_slot().is_none());
    assert_eq!(session.slot_count(), 2);
    assert_eq!(session.archive_rank(1), Some(1));
    assert_eq!(session.archive_rank(0), Some(2));
    let calls = recorder.calls();
    assert!(calls.contains(&Call::Finished));
    assert!(!calls.iter().any(|c| matches!(c, Call::CreateSlot(_))));
}

#[test]
fn new_slot_fades_in_after_pre_layout_delay() {
    let (mut session, recorder) = session("你好");
    session.start().unwrap();
    complete_current(&mut session);
    assert_eq!(
        recorder.calls().last(),
        Some(&Call::Schedule {
            delay_ms: 200,
            timer: Timer::Advance { generation: Generation(1) },
        })
    );

    run_timers_once(&mut session, &recorder);
    let slot = session.current_slot().unwrap();
    assert_eq!(slot.state, SlotState::Entering);
    let calls = recorder.calls();
    assert!(calls.contains(&Call::Place { slot: 1, placement: layout::entering(200) }));
    assert!(calls.contains(&Call::Schedule {
        delay_ms: 50,
        timer: Timer::Reposition { position: 1 },
    }));

    run_timers(&mut session, &recorder);
    assert_eq!(session.current_slot().unwrap().state, SlotState::Active);
    let calls = recorder.calls();
    assert!(calls.contains(&Call::Place { slot: 0, placement: layout::archived(200, 1) }));
    assert_eq!(
        calls.last(),
        Some(&Call::Place { slot: 1, placement: layout::active(200) })
    );
}

fn run_timers_once(session: &mut hanzi_quiz::QuizSession<RecordingHost>, recorder: &Recorder) {
    let timer = recorder.timers.borrow_mut().pop_front().unwrap();
    session.handle(QuizEvent::Timer(timer)).unwrap();
}

#[test]
fn archive_ranks_shift_by_one_per_advance() {
    let (mut session, recorder) = session("你好猫学汉");
    session.start().unwrap();
    let mut previous: Vec<(usize, usize)> = Vec::new();
    for _ in 0..4 {
        let active = session.cursor().unwrap();
        write_current(&mut session, &recorder);
        assert_eq!(session.archive_rank(active), Some(1));
        for (position, rank) in &previous {
            assert_eq!(session.archive_rank(*position), Some(rank + 1));
        }
        previous = session
            .archive()
            .map(|s| (s.position, session.archive_rank(s.position).unwrap()))
            .collect();
    }
}

#[test]
fn only_five_archived_slots_are_laid_out() {
    let (mut session, recorder) = session("你好猫学汉字黑鱼火");
    session.start().unwrap();
    for _ in 0..8 {
        write_current(&mut session, &recorder);
    }
    assert_eq!(session.cursor(), Some(8));
    assert_eq!(session.archive().count(), 8);

    let hidden: Vec<usize> = session
        .archive()
        .filter(|s| s.state == SlotState::Hidden)
        .map(|s| s.position)
        .collect();
    assert_eq!(hidden, vec![2, 1, 0]);
    let laid_out = session
        .archive()
        .filter(|s| s.state == SlotState::Archived)
        .count();
    assert_eq!(laid_out, RETENTION_DEPTH);

    // a hidden slot is hidden once, never laid out again
    for position in [0, 1, 2] {
        let hides = recorder.count(|c| {
            *c == Call::Place { slot: position, placement: Placement::Hidden }
        });
        assert_eq!(hides, 1, "slot {position}");
    }
    let last_layout_of_slot_0 = recorder
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Place { slot: 0, placement } => Some(placement),
            _ => None,
        })
        .last();
    assert_eq!(last_layout_of_slot_0, Some(Placement::Hidden));
}

#[test]
fn stale_and_duplicate_completions_are_ignored() {
    let (mut session, recorder) = session("你好猫");
    session.start().unwrap();
    let first = session.attempt_generation().unwrap();

    complete_current(&mut session);
    complete_current(&mut session);
    assert_eq!(recorder.pending_timers().len(), 1);
    run_timers(&mut session, &recorder);
    assert_eq!(session.cursor(), Some(1));

    recorder.clear();
    session
        .handle(QuizEvent::AttemptComplete { generation: first })
        .unwrap();
    assert!(recorder.calls().is_empty());
    assert_eq!(session.cursor(), Some(1));
}

#[test]
fn stale_timers_are_no_ops() {
    let (mut session, recorder) = session("你好猫");
    session.start().unwrap();
    write_current(&mut session, &recorder);
    recorder.clear();

    session
        .handle(QuizEvent::Timer(Timer::Reposition { position: 0 }))
        .unwrap();
    session
        .handle(QuizEvent::Timer(Timer::Reposition { position: 1 }))
        .unwrap();
    session
        .handle(QuizEvent::Timer(Timer::Advance { generation: Generation(1) }))
        .unwrap();
    session
        .handle(QuizEvent::Timer(Timer::Resume { generation: Generation(2) }))
        .unwrap();
    assert!(recorder.calls().is_empty());
    assert_eq!(session.cursor(), Some(1));
}

#[test]
fn advance_after_finish_is_a_no_op() {
    let (mut session, recorder) = session("猫");
    session.start().unwrap();
    write_current(&mut session, &recorder);
    assert!(session.is_finished());

    recorder.clear();
    assert_eq!(session.advance().unwrap(), Progress::Finished);
    assert_eq!(session.start().unwrap(), Progress::Finished);
    assert!(recorder.calls().is_empty());
}

#[test]
fn start_twice_does_not_skip() {
    let (mut session, recorder) = session("你好");
    session.start().unwrap();
    assert_eq!(session.start().unwrap(), Progress::Quizzing(0));
    assert_eq!(recorder.created_slots(), vec![0]);
}

#[test]
fn tone_assignment_colors_each_slot() {
    let (mut session, recorder) =
        session_with("你好", Some(vec![Tone::First, Tone::Second]), false);
    session.start().unwrap();
    assert_eq!(session.current_slot().unwrap().color, probe_color(Tone::First));
    assert_eq!(
        session.current_slot().unwrap().color,
        session.tone_colors().color(Tone::First)
    );
    write_current(&mut session, &recorder);
    assert_eq!(
        session.current_slot().unwrap().color,
        session.tone_colors().color(Tone::Second)
    );
    let writer_colors: Vec<String> = recorder
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::CreateWriter { color, .. } => Some(color),
            _ => None,
        })
        .collect();
    assert_eq!(writer_colors, vec![probe_color(Tone::First), probe_color(Tone::Second)]);
}

#[test]
fn tone_table_is_complete_without_tone_assignment() {
    let (session, _) = session("你好");
    let table = session.tone_colors();
    assert_eq!(table.len(), 5);
    for tone in Tone::ALL {
        assert_eq!(table.color(tone), probe_color(tone));
    }
}

#[test]
fn unresolvable_tone_colors_fall_back_to_neutral() {
    let recorder = Recorder::default();
    let mut host = RecordingHost::new(recorder.clone());
    host.resolve_colors = false;
    let mut session = hanzi_quiz::QuizSession::new(
        host,
        lesson("你", Some(vec![Tone::Third])),
        hanzi_quiz::SessionOptions::default(),
    );
    assert_eq!(session.tone_colors().len(), 5);
    session.start().unwrap();
    assert_eq!(session.current_slot().unwrap().color, NEUTRAL_COLOR);
}

#[test]
fn host_failure_leaves_session_untouched() {
    let recorder = Recorder::default();
    let mut host = RecordingHost::new(recorder.clone());
    host.fail_writers = true;
    let mut session = hanzi_quiz::QuizSession::new(
        host,
        lesson("你好", None),
        hanzi_quiz::SessionOptions::default(),
    );
    assert!(session.start().is_err());
    assert_eq!(session.phase(), Phase::NotStarted);
    assert!(!session.has_active_attempt());
    assert!(recorder.live_slots().is_empty());
    assert!(!recorder.calls().iter().any(|c| matches!(c, Call::Place { .. })));

    session.host_mut().fail_writers = false;
    assert_eq!(session.start().unwrap(), Progress::Quizzing(0));
    assert_eq!(session.current_character(), Some("你"));
    assert_eq!(recorder.live_slots(), vec![0]);
    assert_eq!(recorder.count(|c| *c == Call::ReleaseSlot(0)), 1);
}

#[test]
fn writer_failure_mid_lesson_keeps_one_slot_per_position() {
    let (mut session, recorder) = session("你好");
    session.start().unwrap();
    complete_current(&mut session);
    session.host_mut().fail_writers = true;
    let timer = recorder.timers.borrow_mut().pop_front().unwrap();
    assert!(session.handle(QuizEvent::Timer(timer)).is_err());
    assert_eq!(session.cursor(), Some(0));
    assert_eq!(recorder.live_slots(), vec![0]);

    session.host_mut().fail_writers = false;
    assert_eq!(session.advance().unwrap(), Progress::Quizzing(1));
    assert_eq!(recorder.live_slots(), vec![0, 1]);
    assert_eq!(session.slot_count(), 2);
}

//! Integration tests for a full practice: mood checks, timer, ledger.
//!
//! Drives a [`PracticeRun`] with a manual clock in test mode and records
//! the result into a SQLite-backed progress ledger.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{TimeZone, Utc};
use yogaflow_core::library::find_session;
use yogaflow_core::timer::{
    AudioNotifier, HapticNotifier, ManualClock, NullHaptic, TransitionSettings,
};
use yogaflow_core::{
    Database, Event, PracticeRun, Preferences, ProgressLedger, RunStage, SignalEmitter, TestMode,
    TimerState,
};

#[derive(Clone, Default)]
struct CountingAudio(Rc<Cell<u32>>);

impl AudioNotifier for CountingAudio {
    fn play(&self, _settings: &TransitionSettings) {
        self.0.set(self.0.get() + 1);
    }
}

fn pump_until_done(run: &mut PracticeRun<ManualClock>, clock: &ManualClock) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..10_000 {
        if run.stage() != RunStage::Practicing {
            break;
        }
        clock.advance_ms(10);
        events.extend(run.pump());
    }
    events
}

#[test]
fn test_full_practice_recorded_in_ledger() {
    let db = Database::open_memory().unwrap();
    let prefs = Preferences::default();
    let clock = ManualClock::default();
    let audio = CountingAudio::default();
    let session = find_session("morning-flow").unwrap();
    let steps = session.len();

    let mut run = PracticeRun::with_clock(
        session,
        &prefs,
        TestMode::new(true, 100),
        SignalEmitter::new(
            Box::new(audio.clone()),
            Box::new(NullHaptic::default()),
            prefs.transition.clone(),
        ),
        clock.clone(),
    );

    run.begin();
    assert_eq!(run.stage(), RunStage::PreCheck);
    run.select_mood(2);
    run.select_energy(2);

    let events = pump_until_done(&mut run, &clock);
    assert_eq!(run.engine().state(), TimerState::Complete);
    assert_eq!(run.stage(), RunStage::PostCheck);
    let advanced = events
        .iter()
        .filter(|e| matches!(e, Event::StepAdvanced { .. }))
        .count();
    assert_eq!(advanced, steps - 1);
    assert_eq!(audio.0.get(), steps as u32);

    run.select_mood(4);
    run.select_energy(5);
    let input = run.completed_session().unwrap();
    assert_eq!(input.session_id, "morning-flow");
    assert_eq!(input.pose_ids.len(), steps);

    let mut ledger = ProgressLedger::load(&db);
    let record = ledger.record_session(input, Utc.with_ymd_and_hms(2026, 5, 4, 7, 30, 0).unwrap());
    assert_eq!(record.mood_improvement, Some(2));
    assert_eq!(record.energy_improvement, Some(3));
    assert_eq!(record.duration_minutes, 1);
    assert!(ledger.save(&db));

    let reloaded = ProgressLedger::load(&db);
    assert_eq!(reloaded.data().total_sessions, 1);
    assert_eq!(reloaded.data().current_streak, 1);
    assert!(reloaded
        .data()
        .achievements
        .iter()
        .any(|a| a.id == "first_session"));
}

#[test]
fn test_disabled_mood_check_goes_straight_to_practice() {
    let mut prefs = Preferences::default();
    prefs.mood_check.breathing = false;
    let clock = ManualClock::default();
    let session = find_session("box-breathing").unwrap();

    let mut run = PracticeRun::with_clock(
        session,
        &prefs,
        TestMode::new(true, 1_000),
        SignalEmitter::silent(prefs.transition.clone()),
        clock.clone(),
    );
    let events = run.begin();
    assert!(matches!(events[0], Event::PracticeStarted { .. }));
    assert!(run.mood_check().is_none());

    pump_until_done(&mut run, &clock);
    assert_eq!(run.stage(), RunStage::Finished);
    let input = run.completed_session().unwrap();
    assert_eq!(input.pre_mood, None);
    assert_eq!(input.post_mood, None);
}

#[test]
fn test_abandoned_practice_records_nothing() {
    let db = Database::open_memory().unwrap();
    let prefs = Preferences::default();
    let clock = ManualClock::default();
    let mut run = PracticeRun::with_clock(
        find_session("evening-unwind").unwrap(),
        &prefs,
        TestMode::disabled(),
        SignalEmitter::silent(prefs.transition.clone()),
        clock.clone(),
    );
    run.begin();
    run.skip_mood();
    clock.advance_ms(90_000);
    run.pump();
    assert_eq!(run.engine().step_index(), 1);

    run.teardown();
    assert_eq!(run.stage(), RunStage::Cancelled);
    assert!(run.completed_session().is_none());

    let ledger = ProgressLedger::load(&db);
    assert!(ledger.history().is_empty());
}

#[derive(Default)]
struct SilentHaptic;

impl HapticNotifier for SilentHaptic {
    fn vibrate(&self) {}
}

#[test]
fn test_cue_settings_respected() {
    let mut prefs = Preferences::default();
    prefs.transition.beep_enabled = false;
    let clock = ManualClock::default();
    let audio = CountingAudio::default();
    let mut run = PracticeRun::with_clock(
        find_session("morning-flow").unwrap(),
        &prefs,
        TestMode::new(true, 100),
        SignalEmitter::new(
            Box::new(audio.clone()),
            Box::new(SilentHaptic),
            prefs.transition.clone(),
        ),
        clock.clone(),
    );
    run.begin();
    run.skip_mood();
    pump_until_done(&mut run, &clock);
    assert!(run.engine().is_complete());
    assert_eq!(audio.0.get(), 0);
}

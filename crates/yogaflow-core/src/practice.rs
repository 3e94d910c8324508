//! One practice screen, start to finish.
//!
//! A [`PracticeRun`] gates the timer engine behind the pre-practice mood
//! check, feeds it ticks from a [`Ticker`], routes transition cues to the
//! [`SignalEmitter`], and after completion holds the user on the
//! post-practice mood check. Once finished it yields the [`NewSession`] to
//! hand to the progress ledger.
//!
//! ```text
//! NotStarted -> PreCheck -> Practicing -> PostCheck -> Finished
//!                    (any) -- teardown --> Cancelled
//! ```

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::events::Event;
use crate::mood::{MoodCapture, MoodCheck, MoodFlowEnd, MoodStage};
use crate::progress::{NewSession, ProgramContext};
use crate::storage::Preferences;
use crate::timer::{
    Clock, DurationPolicy, SignalEmitter, Session, SystemClock, TestMode, Ticker, TimerEngine,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    NotStarted,
    PreCheck,
    Practicing,
    PostCheck,
    Finished,
    Cancelled,
}

pub struct PracticeRun<C: Clock + Clone = SystemClock> {
    engine: TimerEngine<C>,
    ticker: Ticker,
    signals: SignalEmitter,
    clock: C,
    test_mode: TestMode,
    stage: RunStage,
    mood_enabled: bool,
    mood_check: Option<MoodCheck>,
    pre_mood: Option<MoodCapture>,
    post_mood: Option<MoodCapture>,
    program: Option<ProgramContext>,
}

impl PracticeRun<SystemClock> {
    pub fn new(
        session: Session,
        prefs: &Preferences,
        test_mode: TestMode,
        signals: SignalEmitter,
    ) -> Self {
        Self::with_clock(session, prefs, test_mode, signals, SystemClock)
    }
}

impl<C: Clock + Clone> PracticeRun<C> {
    pub fn with_clock(
        session: Session,
        prefs: &Preferences,
        test_mode: TestMode,
        signals: SignalEmitter,
        clock: C,
    ) -> Self {
        let mood_enabled = prefs.mood_check_enabled(session.practice_type);
        let engine = TimerEngine::with_clock(
            session,
            prefs.timing(),
            DurationPolicy::new(test_mode.clone()),
            clock.clone(),
        );
        Self {
            engine,
            ticker: Ticker::new(test_mode.tick_interval()),
            signals,
            clock,
            test_mode,
            stage: RunStage::NotStarted,
            mood_enabled,
            mood_check: None,
            pre_mood: None,
            post_mood: None,
            program: None,
        }
    }

    pub fn with_program(mut self, program: ProgramContext) -> Self {
        self.program = Some(program);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn stage(&self) -> RunStage {
        self.stage
    }

    pub fn engine(&self) -> &TimerEngine<C> {
        &self.engine
    }

    /// The mood check currently on screen, if any.
    pub fn mood_check(&self) -> Option<&MoodCheck> {
        self.mood_check.as_ref()
    }

    pub fn pre_mood(&self) -> Option<&MoodCapture> {
        self.pre_mood.as_ref()
    }

    pub fn post_mood(&self) -> Option<&MoodCapture> {
        self.post_mood.as_ref()
    }

    /// Time until the next tick is due, while the engine is playing.
    pub fn until_next_tick(&self) -> Option<Duration> {
        self.ticker.until_next(self.clock.now())
    }

    /// Ledger input for a run that played through to the end.
    pub fn completed_session(&self) -> Option<NewSession> {
        if self.stage != RunStage::Finished || !self.engine.is_complete() {
            return None;
        }
        let session = self.engine.session();
        let input = NewSession {
            session_id: session.id.clone(),
            session_name: session.name.clone(),
            practice_type: session.practice_type,
            practice_secs: self.engine.final_practice_time(),
            pose_ids: session.pose_ids(),
            program: self.program.clone(),
            ..Default::default()
        };
        Some(input.with_moods(self.pre_mood.as_ref(), self.post_mood.as_ref()))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Open the pre-practice check, or start right away if it is disabled.
    pub fn begin(&mut self) -> Vec<Event> {
        if self.stage != RunStage::NotStarted {
            debug!(stage = ?self.stage, "Begin ignored");
            return Vec::new();
        }
        if self.mood_enabled {
            self.stage = RunStage::PreCheck;
            self.mood_check = Some(MoodCheck::new(MoodStage::Pre));
            Vec::new()
        } else {
            self.start_practice()
        }
    }

    pub fn select_mood(&mut self, value: u8) -> bool {
        match self.mood_check.as_mut() {
            Some(check) => check.select_mood(value),
            None => false,
        }
    }

    pub fn select_energy(&mut self, value: u8) -> Vec<Event> {
        let end = self
            .mood_check
            .as_mut()
            .and_then(|check| check.select_energy(value));
        match end {
            Some(end) => self.finish_check(end),
            None => Vec::new(),
        }
    }

    pub fn skip_mood(&mut self) -> Vec<Event> {
        let end = self.mood_check.as_mut().and_then(|check| check.skip());
        match end {
            Some(end) => self.finish_check(end),
            None => Vec::new(),
        }
    }

    pub fn set_dont_show_again(&mut self, checked: bool) {
        if let Some(check) = self.mood_check.as_mut() {
            check.set_dont_show_again(checked);
        }
    }

    pub fn play_pause(&mut self) -> Vec<Event> {
        self.drive(|engine| engine.play_pause())
    }

    pub fn next(&mut self) -> Vec<Event> {
        self.drive(|engine| engine.advance())
    }

    pub fn previous(&mut self) -> Vec<Event> {
        self.drive(|engine| engine.retreat())
    }

    /// Deliver every tick that is due at the current clock time.
    pub fn pump(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.stage != RunStage::Practicing {
            return events;
        }
        let now = self.clock.now();
        while self.ticker.poll(now) {
            let produced = self.engine.tick();
            events.extend(self.route(produced));
            if !self.engine.is_playing() || self.stage != RunStage::Practicing {
                break;
            }
        }
        self.sync_ticker();
        events
    }

    /// Leave the screen: cancel the tick scheduler and any pending interval.
    ///
    /// Leaving from the post-practice check counts as skipping it.
    pub fn teardown(&mut self) -> Vec<Event> {
        self.ticker.cancel();
        let events = self.engine.stop();
        self.stage = match self.stage {
            RunStage::PostCheck | RunStage::Finished => RunStage::Finished,
            _ => RunStage::Cancelled,
        };
        self.mood_check = None;
        debug!(stage = ?self.stage, "Practice run torn down");
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn start_practice(&mut self) -> Vec<Event> {
        self.stage = RunStage::Practicing;
        let events = self.engine.start();
        if !self.engine.session_started() {
            warn!("Practice could not start; finishing without a session");
            self.stage = RunStage::Finished;
        }
        self.sync_ticker();
        events
    }

    fn drive<F>(&mut self, command: F) -> Vec<Event>
    where
        F: FnOnce(&mut TimerEngine<C>) -> Vec<Event>,
    {
        if self.stage != RunStage::Practicing {
            return Vec::new();
        }
        let produced = command(&mut self.engine);
        let events = self.route(produced);
        self.sync_ticker();
        events
    }

    fn route(&mut self, events: Vec<Event>) -> Vec<Event> {
        for event in &events {
            match event {
                Event::TransitionCue { step_index, .. } => {
                    self.signals.emit_transition_cue(*step_index);
                }
                Event::SessionCompleted { .. } => self.on_session_complete(),
                _ => {}
            }
        }
        events
    }

    fn on_session_complete(&mut self) {
        self.ticker.disarm();
        if self.mood_enabled {
            self.stage = RunStage::PostCheck;
            self.mood_check = Some(MoodCheck::new(MoodStage::Post));
        } else {
            self.stage = RunStage::Finished;
        }
    }

    fn finish_check(&mut self, end: MoodFlowEnd) -> Vec<Event> {
        let Some(check) = self.mood_check.take() else {
            return Vec::new();
        };
        let stage = check.stage();
        let at = self.clock.now();
        let mut events = Vec::new();

        match end.capture {
            Some(capture) => {
                events.push(Event::MoodCaptured {
                    stage,
                    capture: capture.clone(),
                    at,
                });
                match stage {
                    MoodStage::Pre => self.pre_mood = Some(capture),
                    MoodStage::Post => self.post_mood = Some(capture),
                }
            }
            None => events.push(Event::MoodSkipped { stage, at }),
        }
        if end.disable_prompt {
            self.mood_enabled = false;
            events.push(Event::MoodPromptDisabled {
                practice_type: self.engine.session().practice_type,
                at,
            });
        }

        match stage {
            MoodStage::Pre => events.extend(self.start_practice()),
            MoodStage::Post => self.stage = RunStage::Finished,
        }
        events
    }

    fn sync_ticker(&mut self) {
        if self.stage == RunStage::Practicing && self.engine.is_playing() {
            if !self.ticker.is_armed() && !self.ticker.is_cancelled() {
                self.ticker = Ticker::new(self.test_mode.tick_interval());
                self.ticker.arm(self.clock.now());
            }
        } else {
            self.ticker.disarm();
        }
    }
}

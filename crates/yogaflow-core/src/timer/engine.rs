//! Practice timer engine.
//!
//! The engine is a tick-driven state machine over the steps of a
//! [`Session`]. It does not use internal threads or timers: the caller
//! delivers one `tick()` per nominal second (see
//! [`Ticker`](super::Ticker)) and every command returns the events it
//! produced. Wall-clock practice time is read from an injected [`Clock`].
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running(i) <-> Paused
//!      Running(i) -> Transitioning(i) -> Resting -> Running(i+1) -> ... -> Complete
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(session, timing, DurationPolicy::default());
//! engine.start();
//! // Once per second:
//! for event in engine.tick() { /* render, cue, record */ }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::duration::DurationPolicy;
use super::session::{PoseStep, Session};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    /// Not started yet.
    Idle,
    Running,
    Paused,
    /// Settle window after a step ended, before rest/advance.
    Transitioning,
    Resting,
    Complete,
}

/// Rest and transition gaps between steps, in nominal seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimingSettings {
    pub rest_secs: u64,
    pub transition_delay_secs: u64,
}

/// Commands accepted by [`TimerEngine::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    PlayPause,
    Tick,
    Advance,
    Retreat,
    Reset,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Step,
    Transitioning { remaining_secs: u64 },
    Resting { remaining_secs: u64 },
    Complete,
}

/// Core practice timer.
#[derive(Debug, Clone)]
pub struct TimerEngine<C: Clock = SystemClock> {
    session: Session,
    timing: TimingSettings,
    policy: DurationPolicy,
    clock: C,
    phase: Phase,
    step_index: usize,
    /// Seconds left on the current step.
    time_remaining: u64,
    is_playing: bool,
    session_started: bool,
    /// Step index the transition cue already fired for.
    cue_fired_for: Option<usize>,
    /// Accumulated play time in milliseconds, excluding the live interval.
    practice_ms: i64,
    resumed_at: Option<DateTime<Utc>>,
}

impl TimerEngine<SystemClock> {
    pub fn new(session: Session, timing: TimingSettings, policy: DurationPolicy) -> Self {
        Self::with_clock(session, timing, policy, SystemClock)
    }
}

impl<C: Clock> TimerEngine<C> {
    /// Create an engine in the `Idle` state with the first step ready.
    pub fn with_clock(
        session: Session,
        timing: TimingSettings,
        policy: DurationPolicy,
        clock: C,
    ) -> Self {
        if session.is_empty() {
            warn!(session_id = %session.id, "Timer engine created for a session with no steps");
        }
        let time_remaining = session
            .step(0)
            .map(|s| policy.effective_duration(s.duration_secs))
            .unwrap_or(0);
        Self {
            session,
            timing,
            policy,
            clock,
            phase: Phase::Idle,
            step_index: 0,
            time_remaining,
            is_playing: false,
            session_started: false,
            cue_fired_for: None,
            practice_ms: 0,
            resumed_at: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        match self.phase {
            Phase::Idle => TimerState::Idle,
            Phase::Step if self.is_playing => TimerState::Running,
            Phase::Step => TimerState::Paused,
            Phase::Transitioning { .. } => TimerState::Transitioning,
            Phase::Resting { .. } => TimerState::Resting,
            Phase::Complete => TimerState::Complete,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn timing(&self) -> TimingSettings {
        self.timing
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn current_step(&self) -> Option<&PoseStep> {
        self.session.step(self.step_index)
    }

    pub fn time_remaining(&self) -> u64 {
        self.time_remaining
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn session_started(&self) -> bool {
        self.session_started
    }

    pub fn is_resting(&self) -> bool {
        matches!(self.phase, Phase::Resting { .. })
    }

    pub fn rest_remaining(&self) -> u64 {
        match self.phase {
            Phase::Resting { remaining_secs } => remaining_secs,
            _ => 0,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, Phase::Transitioning { .. })
    }

    pub fn transition_remaining(&self) -> u64 {
        match self.phase {
            Phase::Transitioning { remaining_secs } => remaining_secs,
            _ => 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// Play time accumulated up to the last pause.
    pub fn total_practice_secs(&self) -> u64 {
        (self.practice_ms / 1000) as u64
    }

    /// Play time including the interval since the last resume, if playing.
    pub fn final_practice_time(&self) -> u64 {
        let live_ms = match self.resumed_at {
            Some(since) if self.is_playing => elapsed_ms(since, self.clock.now()),
            _ => 0,
        };
        ((self.practice_ms + live_ms) / 1000) as u64
    }

    /// Effective duration of the current step in seconds.
    pub fn step_duration(&self) -> u64 {
        self.current_step()
            .map(|s| self.policy.effective_duration(s.duration_secs))
            .unwrap_or(0)
    }

    /// 0.0 .. 100.0 progress within the current step.
    ///
    /// The denominator is the effective duration, so in test mode it is the
    /// collapsed test-mode duration rather than the nominal one.
    pub fn progress_percent(&self) -> f64 {
        let total = self.step_duration();
        if total == 0 {
            return 0.0;
        }
        let done = total.saturating_sub(self.time_remaining);
        (done as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let step = self.current_step();
        Event::StateSnapshot {
            state: self.state(),
            step_index: self.step_index,
            step_count: self.session.len(),
            pose_id: step.map(|s| s.pose_id.clone()).unwrap_or_default(),
            step_label: step.map(|s| s.display_label()).unwrap_or_default(),
            remaining_secs: self.time_remaining,
            step_duration_secs: self.step_duration(),
            rest_remaining_secs: self.rest_remaining(),
            progress_pct: self.progress_percent(),
            practice_secs: self.final_practice_time(),
            at: self.clock.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn dispatch(&mut self, command: Command) -> Vec<Event> {
        match command {
            Command::Start => self.start(),
            Command::PlayPause => self.play_pause(),
            Command::Tick => self.tick(),
            Command::Advance => self.advance(),
            Command::Retreat => self.retreat(),
            Command::Reset => self.reset(),
            Command::Stop => self.stop(),
        }
    }

    pub fn start(&mut self) -> Vec<Event> {
        if self.phase != Phase::Idle {
            debug!(state = ?self.state(), "Start ignored; session already started");
            return Vec::new();
        }
        let Some(step) = self.session.step(0) else {
            warn!(session_id = %self.session.id, "Cannot start a session with no steps");
            return Vec::new();
        };
        let duration_secs = self.policy.effective_duration(step.duration_secs);
        let now = self.clock.now();

        self.step_index = 0;
        self.time_remaining = duration_secs;
        self.cue_fired_for = None;
        self.phase = Phase::Step;
        self.is_playing = true;
        self.session_started = true;
        self.resumed_at = Some(now);

        debug!(session_id = %self.session.id, "Practice started");
        vec![Event::PracticeStarted {
            session_id: self.session.id.clone(),
            step_index: 0,
            duration_secs,
            at: now,
        }]
    }

    /// Toggle the play flag. Starts the session from `Idle`.
    pub fn play_pause(&mut self) -> Vec<Event> {
        match self.phase {
            Phase::Idle => return self.start(),
            Phase::Complete => return Vec::new(),
            _ => {}
        }
        let now = self.clock.now();
        if self.is_playing {
            self.flush_practice_time(now);
            self.is_playing = false;
            vec![Event::PracticePaused {
                step_index: self.step_index,
                remaining_secs: self.time_remaining,
                at: now,
            }]
        } else {
            self.resumed_at = Some(now);
            self.is_playing = true;
            vec![Event::PracticeResumed {
                step_index: self.step_index,
                remaining_secs: self.time_remaining,
                at: now,
            }]
        }
    }

    /// Advance one nominal second. No-op unless playing.
    pub fn tick(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if !self.is_playing {
            return events;
        }
        match self.phase {
            Phase::Step => {
                self.time_remaining = self.time_remaining.saturating_sub(1);
                if self.cue_fired_for != Some(self.step_index)
                    && self.time_remaining <= self.cue_threshold()
                {
                    self.cue_fired_for = Some(self.step_index);
                    events.push(Event::TransitionCue {
                        step_index: self.step_index,
                        remaining_secs: self.time_remaining,
                        at: self.clock.now(),
                    });
                }
                if self.time_remaining == 0 {
                    self.finish_step(&mut events);
                }
            }
            Phase::Transitioning { remaining_secs } => {
                let remaining_secs = remaining_secs.saturating_sub(1);
                if remaining_secs == 0 {
                    self.rest_or_advance(&mut events);
                } else {
                    self.phase = Phase::Transitioning { remaining_secs };
                }
            }
            Phase::Resting { remaining_secs } => {
                let remaining_secs = remaining_secs.saturating_sub(1);
                if remaining_secs == 0 {
                    self.advance_index(&mut events);
                } else {
                    self.phase = Phase::Resting { remaining_secs };
                }
            }
            Phase::Idle | Phase::Complete => {}
        }
        events
    }

    /// Manual "next": skips any pending rest, completes on the final step.
    pub fn advance(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        match self.phase {
            Phase::Idle | Phase::Complete => {
                debug!(state = ?self.state(), "Advance ignored");
            }
            Phase::Resting { .. } | Phase::Transitioning { .. } => {
                events.push(Event::RestCancelled {
                    step_index: self.step_index,
                    at: self.clock.now(),
                });
                self.advance_index(&mut events);
            }
            Phase::Step => self.advance_index(&mut events),
        }
        events
    }

    /// Manual "previous". During rest or transition this stays on the step
    /// that just finished and pauses; it does not restart that step.
    pub fn retreat(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        match self.phase {
            Phase::Idle | Phase::Complete => {
                debug!(state = ?self.state(), "Retreat ignored");
            }
            Phase::Resting { .. } | Phase::Transitioning { .. } => {
                let now = self.clock.now();
                self.phase = Phase::Step;
                events.push(Event::RestCancelled {
                    step_index: self.step_index,
                    at: now,
                });
                if self.is_playing {
                    self.flush_practice_time(now);
                    self.is_playing = false;
                    events.push(Event::PracticePaused {
                        step_index: self.step_index,
                        remaining_secs: self.time_remaining,
                        at: now,
                    });
                }
            }
            Phase::Step => {
                if self.step_index == 0 {
                    return events;
                }
                let from_step = self.step_index;
                self.move_to(from_step - 1);
                events.push(Event::StepRetreated {
                    from_step,
                    step_index: self.step_index,
                    pose_id: self.current_pose_id(),
                    duration_secs: self.time_remaining,
                    at: self.clock.now(),
                });
            }
        }
        events
    }

    /// Back to `Idle` at the first step with no practice time.
    pub fn reset(&mut self) -> Vec<Event> {
        self.phase = Phase::Idle;
        self.step_index = 0;
        self.time_remaining = self.step_duration();
        self.is_playing = false;
        self.session_started = false;
        self.cue_fired_for = None;
        self.practice_ms = 0;
        self.resumed_at = None;
        vec![Event::PracticeReset {
            at: self.clock.now(),
        }]
    }

    /// Teardown: stop playing and drop any pending rest or transition.
    pub fn stop(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        let now = self.clock.now();
        if matches!(
            self.phase,
            Phase::Resting { .. } | Phase::Transitioning { .. }
        ) {
            self.phase = Phase::Step;
            events.push(Event::RestCancelled {
                step_index: self.step_index,
                at: now,
            });
        }
        if self.is_playing {
            self.flush_practice_time(now);
            self.is_playing = false;
            events.push(Event::PracticePaused {
                step_index: self.step_index,
                remaining_secs: self.time_remaining,
                at: now,
            });
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn cue_threshold(&self) -> u64 {
        if self.timing.transition_delay_secs == 0 {
            0
        } else {
            self.policy
                .effective_duration(self.timing.transition_delay_secs)
        }
    }

    fn is_last_step(&self) -> bool {
        self.step_index + 1 >= self.session.len()
    }

    fn current_pose_id(&self) -> String {
        self.current_step()
            .map(|s| s.pose_id.clone())
            .unwrap_or_default()
    }

    fn finish_step(&mut self, events: &mut Vec<Event>) {
        if self.is_last_step() {
            self.complete(events);
        } else if self.timing.transition_delay_secs > 0 {
            let delay_secs = self
                .policy
                .effective_duration(self.timing.transition_delay_secs);
            self.phase = Phase::Transitioning {
                remaining_secs: delay_secs,
            };
            events.push(Event::TransitionStarted {
                step_index: self.step_index,
                delay_secs,
                at: self.clock.now(),
            });
        } else {
            self.rest_or_advance(events);
        }
    }

    fn rest_or_advance(&mut self, events: &mut Vec<Event>) {
        if self.timing.rest_secs > 0 {
            let rest_secs = self.policy.effective_duration(self.timing.rest_secs);
            self.phase = Phase::Resting {
                remaining_secs: rest_secs,
            };
            events.push(Event::RestStarted {
                after_step: self.step_index,
                rest_secs,
                at: self.clock.now(),
            });
        } else {
            self.advance_index(events);
        }
    }

    fn advance_index(&mut self, events: &mut Vec<Event>) {
        if self.is_last_step() {
            self.complete(events);
            return;
        }
        let from_step = self.step_index;
        self.move_to(from_step + 1);
        events.push(Event::StepAdvanced {
            from_step,
            step_index: self.step_index,
            pose_id: self.current_pose_id(),
            duration_secs: self.time_remaining,
            at: self.clock.now(),
        });
    }

    fn move_to(&mut self, index: usize) {
        self.step_index = index;
        self.phase = Phase::Step;
        self.cue_fired_for = None;
        self.time_remaining = self.step_duration();
    }

    fn complete(&mut self, events: &mut Vec<Event>) {
        let now = self.clock.now();
        self.flush_practice_time(now);
        self.is_playing = false;
        self.phase = Phase::Complete;
        self.time_remaining = 0;
        let practice_secs = self.total_practice_secs();
        info!(
            session_id = %self.session.id,
            practice_secs,
            "Practice session complete"
        );
        events.push(Event::SessionCompleted {
            session_id: self.session.id.clone(),
            steps: self.session.len(),
            practice_secs,
            at: now,
        });
    }

    fn flush_practice_time(&mut self, now: DateTime<Utc>) {
        if let Some(since) = self.resumed_at.take() {
            self.practice_ms += elapsed_ms(since, now);
        }
    }
}

fn elapsed_ms(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - since).num_milliseconds().max(0)
}

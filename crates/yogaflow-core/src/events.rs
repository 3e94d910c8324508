use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mood::{MoodCapture, MoodStage};
use crate::timer::{PracticeType, TimerState};

/// Every state change in the practice core produces an Event.
/// The caller renders them; the practice run routes cues to the emitters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    PracticeStarted {
        session_id: String,
        step_index: usize,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    PracticePaused {
        step_index: usize,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    PracticeResumed {
        step_index: usize,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// The current step is about to end; play the advance-warning cue.
    TransitionCue {
        step_index: usize,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Settle window after a step's countdown reached zero.
    TransitionStarted {
        step_index: usize,
        delay_secs: u64,
        at: DateTime<Utc>,
    },
    RestStarted {
        after_step: usize,
        rest_secs: u64,
        at: DateTime<Utc>,
    },
    /// A pending rest or transition was cut short by the user.
    RestCancelled {
        step_index: usize,
        at: DateTime<Utc>,
    },
    StepAdvanced {
        from_step: usize,
        step_index: usize,
        pose_id: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    StepRetreated {
        from_step: usize,
        step_index: usize,
        pose_id: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        session_id: String,
        steps: usize,
        practice_secs: u64,
        at: DateTime<Utc>,
    },
    PracticeReset {
        at: DateTime<Utc>,
    },
    MoodCaptured {
        stage: MoodStage,
        capture: MoodCapture,
        at: DateTime<Utc>,
    },
    MoodSkipped {
        stage: MoodStage,
        at: DateTime<Utc>,
    },
    /// The user asked not to be prompted again for this practice type.
    MoodPromptDisabled {
        practice_type: PracticeType,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        step_index: usize,
        step_count: usize,
        pose_id: String,
        step_label: String,
        remaining_secs: u64,
        step_duration_secs: u64,
        rest_remaining_secs: u64,
        progress_pct: f64,
        practice_secs: u64,
        at: DateTime<Utc>,
    },
}

//! # YogaFlow Core Library
//!
//! Core logic for the YogaFlow practice app: the timer that walks a user
//! through a sequence of poses or breathing steps, the mood check that
//! brackets each practice, and the progress ledger that records it.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A tick-driven state machine over session steps, with
//!   rests, transition cues and an accelerated test mode
//! - **Practice Run**: Gates the engine behind the mood checks and turns
//!   wall-clock time into ticks
//! - **Progress**: Append-only history, streaks, period stats and
//!   achievements, persisted through a key-value store
//! - **Storage**: SQLite key-value persistence and TOML preferences
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`PracticeRun`]: One practice screen from pre-check to post-check
//! - [`ProgressLedger`]: History and derived progress
//! - [`Database`]: Key-value persistence
//! - [`Preferences`]: User preferences

pub mod error;
pub mod events;
pub mod library;
pub mod mood;
pub mod practice;
pub mod progress;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use mood::{MoodCapture, MoodCheck, MoodStage};
pub use practice::{PracticeRun, RunStage};
pub use progress::{CompletedSessionRecord, NewSession, ProgressLedger, ProgressStats};
pub use storage::{Database, KeyValueStore, MemoryStore, Preferences};
pub use timer::{
    DurationPolicy, PracticeType, Session, SignalEmitter, TestMode, TimerEngine, TimerState,
};

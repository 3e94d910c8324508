//! Progress tracking: session history, streaks, stats and achievements.

pub mod achievements;
mod ledger;
mod record;
mod stats;

pub use achievements::{Achievement, Criterion, UnlockedAchievement, ACHIEVEMENTS};
pub use ledger::{
    ProgressData, ProgressExport, ProgressLedger, EXPORT_VERSION, MAX_HISTORY, PROGRESS_KEY,
};
pub use record::{
    improvement, practice_minutes, CompletedSessionRecord, NewSession, ProgramContext,
};
pub use stats::{compute_stats, next_streak, PeriodStats, ProgressStats};

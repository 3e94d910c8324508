mod clock;
mod duration;
mod engine;
mod session;
mod signal;
mod ticker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use duration::{DurationPolicy, TestMode, TEST_MODE_DURATION_SECS};
pub use engine::{Command, TimerEngine, TimerState, TimingSettings};
pub use session::{PoseStep, PracticeType, Session, Side};
pub use signal::{
    AudioNotifier, HapticNotifier, NullAudio, NullHaptic, SignalEmitter, TerminalBell,
    TransitionSettings,
};
pub use ticker::Ticker;

#[cfg(test)]
pub(crate) use signal::testing;

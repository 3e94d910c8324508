//! Duration policy and the accelerated test mode.
//!
//! Test mode collapses every duration to one second so that a full session
//! can be traversed by a harness in seconds. The flag lives behind a shared
//! handle and is read on every call: flipping it between ticks takes effect
//! on the next duration resolved.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use chrono::Duration;

/// Effective duration of every step, rest and transition in test mode.
pub const TEST_MODE_DURATION_SECS: u64 = 1;

const NOMINAL_TICK_MS: i64 = 1_000;

/// Shared test-mode switch plus tick speed multiplier.
#[derive(Debug, Clone)]
pub struct TestMode {
    enabled: Arc<AtomicBool>,
    speed: Arc<AtomicU32>,
}

impl TestMode {
    pub fn new(enabled: bool, speed: u32) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
            speed: Arc::new(AtomicU32::new(speed.max(1))),
        }
    }

    pub fn disabled() -> Self {
        Self::new(false, 1)
    }

    /// Read `YOGAFLOW_TEST_MODE` and `YOGAFLOW_TEST_SPEED`.
    pub fn from_env() -> Self {
        let enabled = std::env::var("YOGAFLOW_TEST_MODE")
            .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
            .unwrap_or(false);
        let speed = std::env::var("YOGAFLOW_TEST_SPEED")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);
        Self::new(enabled, speed)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn speed(&self) -> u32 {
        self.speed.load(Ordering::SeqCst).max(1)
    }

    pub fn set_speed(&self, speed: u32) {
        self.speed.store(speed.max(1), Ordering::SeqCst);
    }

    /// Real-world interval between ticks. Only shortened while test mode is on.
    pub fn tick_interval(&self) -> Duration {
        if !self.is_enabled() {
            return Duration::milliseconds(NOMINAL_TICK_MS);
        }
        let ms = (NOMINAL_TICK_MS / i64::from(self.speed())).max(1);
        Duration::milliseconds(ms)
    }
}

impl Default for TestMode {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Resolves nominal durations to effective ones.
#[derive(Debug, Clone, Default)]
pub struct DurationPolicy {
    test_mode: TestMode,
}

impl DurationPolicy {
    pub fn new(test_mode: TestMode) -> Self {
        Self { test_mode }
    }

    pub fn test_mode(&self) -> &TestMode {
        &self.test_mode
    }

    pub fn effective_duration(&self, nominal_secs: u64) -> u64 {
        if self.test_mode.is_enabled() {
            TEST_MODE_DURATION_SECS
        } else {
            nominal_secs
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_mode_is_identity() {
        let policy = DurationPolicy::default();
        assert_eq!(policy.effective_duration(45), 45);
        assert_eq!(policy.effective_duration(0), 0);
    }

    #[test]
    fn flag_is_read_at_call_time() {
        let mode = TestMode::disabled();
        let policy = DurationPolicy::new(mode.clone());
        assert_eq!(policy.effective_duration(60), 60);
        mode.set_enabled(true);
        assert_eq!(policy.effective_duration(60), 1);
        assert_eq!(policy.effective_duration(3600), 1);
        mode.set_enabled(false);
        assert_eq!(policy.effective_duration(60), 60);
    }

    #[test]
    fn speed_only_applies_in_test_mode() {
        let mode = TestMode::new(false, 10);
        assert_eq!(mode.tick_interval(), Duration::milliseconds(1_000));
        mode.set_enabled(true);
        assert_eq!(mode.tick_interval(), Duration::milliseconds(100));
        mode.set_speed(5_000);
        assert_eq!(mode.tick_interval(), Duration::milliseconds(1));
    }

    #[test]
    fn zero_speed_is_clamped() {
        let mode = TestMode::new(true, 0);
        assert_eq!(mode.speed(), 1);
        assert_eq!(mode.tick_interval(), Duration::milliseconds(1_000));
    }
}

//! Transition cue emitters.
//!
//! The engine never plays sounds itself. It reports a
//! [`Event::TransitionCue`](crate::Event::TransitionCue) and the practice run
//! hands it to a [`SignalEmitter`], which fans out to whichever audio and
//! haptic backends are available.

use std::cell::Cell;
use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Transition cue preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionSettings {
    #[serde(default = "default_true")]
    pub beep_enabled: bool,
    /// 0..=100
    #[serde(default = "default_volume")]
    pub volume: u32,
    /// Seconds before a step ends at which the cue fires, and the length of
    /// the settle window after it ends.
    #[serde(default = "default_delay")]
    pub delay_secs: u64,
    #[serde(default = "default_frequency")]
    pub frequency_hz: u32,
    #[serde(default = "default_true")]
    pub vibration_enabled: bool,
}

fn default_true() -> bool {
    true
}
fn default_volume() -> u32 {
    50
}
fn default_delay() -> u64 {
    3
}
fn default_frequency() -> u32 {
    880
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            beep_enabled: true,
            volume: default_volume(),
            delay_secs: default_delay(),
            frequency_hz: default_frequency(),
            vibration_enabled: true,
        }
    }
}

pub trait AudioNotifier {
    fn play(&self, settings: &TransitionSettings);
}

pub trait HapticNotifier {
    fn vibrate(&self);
}

/// Audio backend for environments with no sound output.
#[derive(Debug, Default)]
pub struct NullAudio {
    warned: Cell<bool>,
}

impl AudioNotifier for NullAudio {
    fn play(&self, _settings: &TransitionSettings) {
        if !self.warned.replace(true) {
            warn!("Audio output unavailable; transition beeps are disabled");
        }
    }
}

/// Haptic backend for devices without a vibration motor.
#[derive(Debug, Default)]
pub struct NullHaptic {
    warned: Cell<bool>,
}

impl HapticNotifier for NullHaptic {
    fn vibrate(&self) {
        if !self.warned.replace(true) {
            warn!("Vibration unavailable on this device");
        }
    }
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl AudioNotifier for TerminalBell {
    fn play(&self, settings: &TransitionSettings) {
        if settings.volume == 0 {
            return;
        }
        let mut err = std::io::stderr();
        if let Err(e) = err.write_all(b"\x07").and_then(|_| err.flush()) {
            warn!(error = %e, "Failed to ring terminal bell");
        }
    }
}

/// Routes a transition cue to the enabled backends.
pub struct SignalEmitter {
    audio: Box<dyn AudioNotifier>,
    haptic: Box<dyn HapticNotifier>,
    settings: TransitionSettings,
}

impl SignalEmitter {
    pub fn new(
        audio: Box<dyn AudioNotifier>,
        haptic: Box<dyn HapticNotifier>,
        settings: TransitionSettings,
    ) -> Self {
        Self {
            audio,
            haptic,
            settings,
        }
    }

    /// Emitter with no backends; every cue is a no-op.
    pub fn silent(settings: TransitionSettings) -> Self {
        Self::new(
            Box::new(NullAudio::default()),
            Box::new(NullHaptic::default()),
            settings,
        )
    }

    pub fn settings(&self) -> &TransitionSettings {
        &self.settings
    }

    pub fn emit_transition_cue(&self, step_index: usize) {
        debug!(step_index, "Transition cue");
        if self.settings.beep_enabled {
            self.audio.play(&self.settings);
        }
        if self.settings.vibration_enabled {
            self.haptic.vibrate();
        }
    }
}

//! Mood capture flow.
//!
//! A two-screen prompt shown before and after a practice: the mood screen
//! always comes first, picking a mood moves straight to the energy screen,
//! and picking an energy level finishes the flow. `skip()` ends the flow at
//! any point with no data.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const MOOD_LABELS: [&str; 5] = ["Very low", "Low", "Neutral", "Good", "Great"];
pub const ENERGY_LABELS: [&str; 5] = ["Drained", "Tired", "Steady", "Energized", "Vibrant"];

/// Which prompt of a practice this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodStage {
    Pre,
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodScreen {
    Mood,
    Energy,
    Done,
}

/// One point on a 1..=5 scale with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub value: u8,
    pub label: String,
}

impl Rating {
    pub fn mood(value: u8) -> Option<Self> {
        Self::from_table(value, &MOOD_LABELS)
    }

    pub fn energy(value: u8) -> Option<Self> {
        Self::from_table(value, &ENERGY_LABELS)
    }

    fn from_table(value: u8, labels: &[&str; 5]) -> Option<Self> {
        let label = labels.get(usize::from(value).checked_sub(1)?)?;
        Some(Self {
            value,
            label: (*label).to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodCapture {
    pub mood: Rating,
    pub energy: Rating,
}

/// How a flow ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodFlowEnd {
    /// `None` when skipped.
    pub capture: Option<MoodCapture>,
    /// "Don't show again" was checked.
    pub disable_prompt: bool,
}

#[derive(Debug, Clone)]
pub struct MoodCheck {
    stage: MoodStage,
    screen: MoodScreen,
    mood: Option<Rating>,
    dont_show_again: bool,
}

impl MoodCheck {
    pub fn new(stage: MoodStage) -> Self {
        Self {
            stage,
            screen: MoodScreen::Mood,
            mood: None,
            dont_show_again: false,
        }
    }

    pub fn stage(&self) -> MoodStage {
        self.stage
    }

    pub fn screen(&self) -> MoodScreen {
        self.screen
    }

    pub fn is_done(&self) -> bool {
        self.screen == MoodScreen::Done
    }

    pub fn dont_show_again(&self) -> bool {
        self.dont_show_again
    }

    pub fn set_dont_show_again(&mut self, checked: bool) {
        self.dont_show_again = checked;
    }

    /// Pick a mood and move to the energy screen. Returns false if ignored.
    pub fn select_mood(&mut self, value: u8) -> bool {
        if self.screen != MoodScreen::Mood {
            debug!(screen = ?self.screen, "Mood selection ignored");
            return false;
        }
        let Some(rating) = Rating::mood(value) else {
            warn!(value, "Mood value out of range");
            return false;
        };
        self.mood = Some(rating);
        self.screen = MoodScreen::Energy;
        true
    }

    /// Pick an energy level and finish the flow.
    pub fn select_energy(&mut self, value: u8) -> Option<MoodFlowEnd> {
        if self.screen != MoodScreen::Energy {
            debug!(screen = ?self.screen, "Energy selection ignored");
            return None;
        }
        let Some(energy) = Rating::energy(value) else {
            warn!(value, "Energy value out of range");
            return None;
        };
        let mood = self.mood.take()?;
        self.screen = MoodScreen::Done;
        Some(MoodFlowEnd {
            capture: Some(MoodCapture { mood, energy }),
            disable_prompt: self.dont_show_again,
        })
    }

    pub fn skip(&mut self) -> Option<MoodFlowEnd> {
        if self.is_done() {
            return None;
        }
        self.screen = MoodScreen::Done;
        self.mood = None;
        Some(MoodFlowEnd {
            capture: None,
            disable_prompt: self.dont_show_again,
        })
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::mood::MoodCapture;
use crate::timer::PracticeType;

/// Where a session sits inside a multi-week program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramContext {
    pub program_id: String,
    pub week: u32,
    pub day: u32,
}

/// What a finished practice reports to the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSession {
    pub session_id: String,
    pub session_name: String,
    pub practice_type: PracticeType,
    /// Wall-clock play time, pauses excluded.
    pub practice_secs: u64,
    pub pose_ids: Vec<String>,
    pub program: Option<ProgramContext>,
    pub pre_mood: Option<u8>,
    pub post_mood: Option<u8>,
    pub pre_energy: Option<u8>,
    pub post_energy: Option<u8>,
}

impl NewSession {
    /// Fill the mood fields from the pre/post captures, if any.
    pub fn with_moods(mut self, pre: Option<&MoodCapture>, post: Option<&MoodCapture>) -> Self {
        self.pre_mood = pre.map(|c| c.mood.value);
        self.pre_energy = pre.map(|c| c.energy.value);
        self.post_mood = post.map(|c| c.mood.value);
        self.post_energy = post.map(|c| c.energy.value);
        self
    }
}

/// One entry of the progress history. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedSessionRecord {
    pub id: String,
    pub session_id: String,
    pub session_name: String,
    pub practice_type: PracticeType,
    pub duration_minutes: u64,
    pub completed_at: DateTime<Utc>,
    /// Calendar day of completion in the user's time zone.
    pub practice_date: NaiveDate,
    pub pose_ids: Vec<String>,
    #[serde(default)]
    pub program: Option<ProgramContext>,
    #[serde(default)]
    pub pre_mood: Option<u8>,
    #[serde(default)]
    pub post_mood: Option<u8>,
    #[serde(default)]
    pub pre_energy: Option<u8>,
    #[serde(default)]
    pub post_energy: Option<u8>,
    #[serde(default)]
    pub mood_improvement: Option<i8>,
    #[serde(default)]
    pub energy_improvement: Option<i8>,
}

/// `post - pre` when both values are present.
///
/// Zero counts as absent, matching records written by earlier versions.
pub fn improvement(pre: Option<u8>, post: Option<u8>) -> Option<i8> {
    match (pre, post) {
        (Some(pre), Some(post)) if pre != 0 && post != 0 => {
            Some(i16::from(post).saturating_sub(i16::from(pre)).clamp(-128, 127) as i8)
        }
        _ => None,
    }
}

/// Whole minutes of practice, rounded to nearest, at least one.
pub fn practice_minutes(practice_secs: u64) -> u64 {
    ((practice_secs + 30) / 60).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::Rating;

    #[test]
    fn improvement_needs_both_values() {
        assert_eq!(improvement(Some(2), Some(5)), Some(3));
        assert_eq!(improvement(Some(4), Some(1)), Some(-3));
        assert_eq!(improvement(Some(2), None), None);
        assert_eq!(improvement(None, Some(5)), None);
    }

    #[test]
    fn zero_is_treated_as_absent() {
        assert_eq!(improvement(Some(0), Some(5)), None);
        assert_eq!(improvement(Some(3), Some(0)), None);
    }

    #[test]
    fn minutes_round_to_nearest() {
        assert_eq!(practice_minutes(0), 1);
        assert_eq!(practice_minutes(89), 1);
        assert_eq!(practice_minutes(90), 2);
        assert_eq!(practice_minutes(600), 10);
    }

    #[test]
    fn with_moods_copies_values() {
        let pre = MoodCapture {
            mood: Rating::mood(2).unwrap(),
            energy: Rating::energy(3).unwrap(),
        };
        let input = NewSession::default().with_moods(Some(&pre), None);
        assert_eq!(input.pre_mood, Some(2));
        assert_eq!(input.pre_energy, Some(3));
        assert_eq!(input.post_mood, None);
    }
}

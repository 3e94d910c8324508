use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeType {
    Yoga,
    Breathing,
}

impl PracticeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PracticeType::Yoga => "yoga",
            PracticeType::Breathing => "breathing",
        }
    }
}

impl Default for PracticeType {
    fn default() -> Self {
        PracticeType::Yoga
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoseStep {
    /// Reference into the pose content library.
    pub pose_id: String,
    /// Nominal duration in seconds.
    pub duration_secs: u64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub side: Option<Side>,
}

impl PoseStep {
    pub fn new(pose_id: impl Into<String>, duration_secs: u64) -> Self {
        let pose_id = pose_id.into();
        Self {
            label: pose_id.clone(),
            pose_id,
            duration_secs,
            side: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    pub fn display_label(&self) -> String {
        let base = if self.label.is_empty() {
            self.pose_id.as_str()
        } else {
            self.label.as_str()
        };
        match self.side {
            Some(Side::Left) => format!("{base} (left)"),
            Some(Side::Right) => format!("{base} (right)"),
            None => base.to_string(),
        }
    }
}

/// An ordered sequence of timed steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub practice_type: PracticeType,
    pub steps: Vec<PoseStep>,
}

impl Session {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        practice_type: PracticeType,
        steps: Vec<PoseStep>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            practice_type,
            steps,
        }
    }

    /// Drop steps the engine cannot time (zero duration, missing pose id).
    pub fn sanitized(mut self) -> Self {
        let before = self.steps.len();
        self.steps
            .retain(|s| s.duration_secs > 0 && !s.pose_id.trim().is_empty());
        let dropped = before - self.steps.len();
        if dropped > 0 {
            warn!(
                session_id = %self.id,
                dropped,
                "Dropped invalid steps from session"
            );
        }
        self
    }

    /// Parse a session from JSON, sanitizing its steps.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let session: Session = serde_json::from_str(json)?;
        Ok(session.sanitized())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<&PoseStep> {
        self.steps.get(index)
    }

    pub fn total_duration_secs(&self) -> u64 {
        self.steps.iter().map(|s| s.duration_secs).sum()
    }

    pub fn pose_ids(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.pose_id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Session {
        Session::new(
            "morning",
            "Morning Flow",
            PracticeType::Yoga,
            vec![
                PoseStep::new("mountain", 30),
                PoseStep::new("warrior-2", 45).with_side(Side::Left),
                PoseStep::new("warrior-2", 45).with_side(Side::Right),
            ],
        )
    }

    #[test]
    fn total_duration() {
        assert_eq!(sample().total_duration_secs(), 120);
    }

    #[test]
    fn display_label_includes_side() {
        let s = sample();
        assert_eq!(s.steps[0].display_label(), "mountain");
        assert_eq!(s.steps[1].display_label(), "warrior-2 (left)");
    }

    #[test]
    fn sanitized_drops_zero_duration_and_blank_pose() {
        let mut s = sample();
        s.steps.push(PoseStep::new("savasana", 0));
        s.steps.push(PoseStep::new("  ", 30));
        let s = s.sanitized();
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn from_json_defaults_optional_fields() {
        let json = r#"{
            "id": "box",
            "name": "Box Breathing",
            "steps": [{"pose_id": "inhale", "duration_secs": 4}]
        }"#;
        let s = Session::from_json(json).unwrap();
        assert_eq!(s.practice_type, PracticeType::Yoga);
        assert_eq!(s.steps[0].label, "");
        assert_eq!(s.steps[0].side, None);
        assert_eq!(s.steps[0].display_label(), "inhale");
    }
}

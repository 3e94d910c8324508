//! Built-in practice sessions.

use std::path::Path;

use tracing::warn;

use crate::error::{CoreError, Result, ValidationError};
use crate::timer::{PoseStep, PracticeType, Session, Side};

pub fn builtin_sessions() -> Vec<Session> {
    vec![
        Session::new(
            "morning-flow",
            "Morning Flow",
            PracticeType::Yoga,
            vec![
                PoseStep::new("mountain", 30).with_label("Mountain"),
                PoseStep::new("forward-fold", 45).with_label("Forward Fold"),
                PoseStep::new("downward-dog", 60).with_label("Downward Dog"),
                PoseStep::new("warrior-1", 45)
                    .with_label("Warrior I")
                    .with_side(Side::Left),
                PoseStep::new("warrior-1", 45)
                    .with_label("Warrior I")
                    .with_side(Side::Right),
                PoseStep::new("childs-pose", 60).with_label("Child's Pose"),
            ],
        ),
        Session::new(
            "evening-unwind",
            "Evening Unwind",
            PracticeType::Yoga,
            vec![
                PoseStep::new("cat-cow", 60).with_label("Cat-Cow"),
                PoseStep::new("pigeon", 60)
                    .with_label("Pigeon")
                    .with_side(Side::Left),
                PoseStep::new("pigeon", 60)
                    .with_label("Pigeon")
                    .with_side(Side::Right),
                PoseStep::new("legs-up-wall", 120).with_label("Legs Up the Wall"),
                PoseStep::new("savasana", 180).with_label("Savasana"),
            ],
        ),
        Session::new(
            "box-breathing",
            "Box Breathing",
            PracticeType::Breathing,
            (0..4)
                .flat_map(|_| {
                    [
                        PoseStep::new("inhale", 4).with_label("Inhale"),
                        PoseStep::new("hold-in", 4).with_label("Hold"),
                        PoseStep::new("exhale", 4).with_label("Exhale"),
                        PoseStep::new("hold-out", 4).with_label("Hold"),
                    ]
                })
                .collect(),
        ),
    ]
}

/// Look up a built-in session by id.
pub fn find_session(id: &str) -> Option<Session> {
    builtin_sessions().into_iter().find(|s| s.id == id)
}

/// Look up a built-in session, failing with a validation error if unknown.
pub fn require_session(id: &str) -> Result<Session> {
    find_session(id).ok_or_else(|| {
        ValidationError::UnknownId {
            kind: "session".into(),
            id: id.into(),
        }
        .into()
    })
}

/// Load a session from a JSON file.
pub fn load_session_file(path: &Path) -> Result<Session> {
    let content = std::fs::read_to_string(path)?;
    let session = Session::from_json(&content)?;
    if session.is_empty() {
        warn!(path = %path.display(), "Session file has no usable steps");
        return Err(CoreError::Validation(ValidationError::EmptyCollection(
            format!("steps in {}", path.display()),
        )));
    }
    Ok(session)
}

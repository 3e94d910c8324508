use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ledger::ProgressData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    Sessions(u64),
    StreakDays(u32),
    TotalMinutes(u64),
}

impl Criterion {
    fn is_met(&self, data: &ProgressData) -> bool {
        match *self {
            Criterion::Sessions(n) => data.total_sessions >= n,
            Criterion::StreakDays(n) => data.current_streak >= n,
            Criterion::TotalMinutes(n) => data.total_minutes >= n,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub criterion: Criterion,
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: "first_session",
        title: "First Breath",
        description: "Complete your first practice",
        criterion: Criterion::Sessions(1),
    },
    Achievement {
        id: "streak_3",
        title: "Finding Rhythm",
        description: "Practice 3 days in a row",
        criterion: Criterion::StreakDays(3),
    },
    Achievement {
        id: "streak_7",
        title: "Week of Stillness",
        description: "Practice 7 days in a row",
        criterion: Criterion::StreakDays(7),
    },
    Achievement {
        id: "streak_30",
        title: "Rooted",
        description: "Practice 30 days in a row",
        criterion: Criterion::StreakDays(30),
    },
    Achievement {
        id: "sessions_10",
        title: "Dedicated",
        description: "Complete 10 practices",
        criterion: Criterion::Sessions(10),
    },
    Achievement {
        id: "sessions_50",
        title: "Devoted",
        description: "Complete 50 practices",
        criterion: Criterion::Sessions(50),
    },
    Achievement {
        id: "sessions_100",
        title: "Centurion",
        description: "Complete 100 practices",
        criterion: Criterion::Sessions(100),
    },
    Achievement {
        id: "minutes_60",
        title: "First Hour",
        description: "Practice for 60 minutes in total",
        criterion: Criterion::TotalMinutes(60),
    },
    Achievement {
        id: "minutes_300",
        title: "Five Hours In",
        description: "Practice for 300 minutes in total",
        criterion: Criterion::TotalMinutes(300),
    },
    Achievement {
        id: "minutes_1000",
        title: "Thousand Minutes",
        description: "Practice for 1000 minutes in total",
        criterion: Criterion::TotalMinutes(1000),
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    pub id: String,
    pub title: String,
    pub unlocked_at: DateTime<Utc>,
}

pub fn find(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Achievements whose criterion is met and that are not unlocked yet.
pub fn newly_unlocked(data: &ProgressData, now: DateTime<Utc>) -> Vec<UnlockedAchievement> {
    ACHIEVEMENTS
        .iter()
        .filter(|a| !data.achievements.iter().any(|u| u.id == a.id))
        .filter(|a| a.criterion.is_met(data))
        .map(|a| UnlockedAchievement {
            id: a.id.to_string(),
            title: a.title.to_string(),
            unlocked_at: now,
        })
        .collect()
}

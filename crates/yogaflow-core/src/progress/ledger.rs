//! Progress ledger.
//!
//! Append-only history of completed practices plus the streak, totals,
//! stats and achievements derived from it. The whole ledger is persisted as
//! one JSON value under [`PROGRESS_KEY`].

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::achievements::{self, UnlockedAchievement};
use super::record::{improvement, practice_minutes, CompletedSessionRecord, NewSession};
use super::stats::{compute_stats, next_streak, ProgressStats};
use crate::error::{Result, ValidationError};
use crate::storage::{load_or_default, persist, KeyValueStore};

pub const PROGRESS_KEY: &str = "progress";

/// Most recent records kept in the history.
pub const MAX_HISTORY: usize = 100;

pub const EXPORT_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressData {
    #[serde(default)]
    pub history: Vec<CompletedSessionRecord>,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub total_minutes: u64,
    #[serde(default)]
    pub total_sessions: u64,
    #[serde(default)]
    pub last_practice_date: Option<NaiveDate>,
    #[serde(default)]
    pub stats: ProgressStats,
    #[serde(default)]
    pub achievements: Vec<UnlockedAchievement>,
}

/// Versioned envelope for export files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressExport {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub data: ProgressData,
}

#[derive(Debug, Default)]
pub struct ProgressLedger {
    data: ProgressData,
    new_achievements: Vec<UnlockedAchievement>,
}

impl ProgressLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: ProgressData) -> Self {
        Self {
            data,
            new_achievements: Vec::new(),
        }
    }

    /// Load from `store`, starting empty if nothing usable is stored.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        Self::from_data(load_or_default(store, PROGRESS_KEY))
    }

    /// Write the whole ledger back. Returns false if the write failed.
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &S) -> bool {
        persist(store, PROGRESS_KEY, &self.data)
    }

    pub fn data(&self) -> &ProgressData {
        &self.data
    }

    pub fn history(&self) -> &[CompletedSessionRecord] {
        &self.data.history
    }

    /// Up to `n` most recent records, newest first.
    pub fn recent(&self, n: usize) -> Vec<&CompletedSessionRecord> {
        self.data.history.iter().rev().take(n).collect()
    }

    pub fn stats(&self) -> &ProgressStats {
        &self.data.stats
    }

    /// Append a completed practice and recompute everything derived.
    ///
    /// `completed_at` decides the calendar day used for streaks, so pass it
    /// in the user's time zone.
    pub fn record_session<Tz: TimeZone>(
        &mut self,
        input: NewSession,
        completed_at: DateTime<Tz>,
    ) -> CompletedSessionRecord {
        let today = completed_at.date_naive();
        let completed_at = completed_at.with_timezone(&Utc);

        let record = CompletedSessionRecord {
            id: Uuid::new_v4().to_string(),
            session_id: input.session_id,
            session_name: input.session_name,
            practice_type: input.practice_type,
            duration_minutes: practice_minutes(input.practice_secs),
            completed_at,
            practice_date: today,
            pose_ids: input.pose_ids,
            program: input.program,
            pre_mood: input.pre_mood,
            post_mood: input.post_mood,
            pre_energy: input.pre_energy,
            post_energy: input.post_energy,
            mood_improvement: improvement(input.pre_mood, input.post_mood),
            energy_improvement: improvement(input.pre_energy, input.post_energy),
        };

        let data = &mut self.data;
        data.history.push(record.clone());
        if data.history.len() > MAX_HISTORY {
            let excess = data.history.len() - MAX_HISTORY;
            data.history.drain(..excess);
        }

        data.current_streak = next_streak(data.current_streak, data.last_practice_date, today);
        data.longest_streak = data.longest_streak.max(data.current_streak);
        data.total_minutes = data.total_minutes.saturating_add(record.duration_minutes);
        data.total_sessions = data.total_sessions.saturating_add(1);
        data.last_practice_date = Some(data.last_practice_date.map_or(today, |d| d.max(today)));
        data.stats = compute_stats(&data.history, today);

        let unlocked = achievements::newly_unlocked(data, completed_at);
        for a in &unlocked {
            info!(achievement = %a.id, "Achievement unlocked");
        }
        data.achievements.extend(unlocked.iter().cloned());
        self.new_achievements.extend(unlocked);

        info!(
            session_id = %record.session_id,
            minutes = record.duration_minutes,
            streak = self.data.current_streak,
            "Session recorded"
        );
        record
    }

    /// Achievements unlocked since the last call.
    pub fn take_new_achievements(&mut self) -> Vec<UnlockedAchievement> {
        std::mem::take(&mut self.new_achievements)
    }

    /// Recompute the period stats for a new day without recording anything.
    pub fn refresh_stats(&mut self, today: NaiveDate) {
        self.data.stats = compute_stats(&self.data.history, today);
    }

    pub fn export(&self, exported_at: DateTime<Utc>) -> ProgressExport {
        ProgressExport {
            version: EXPORT_VERSION,
            exported_at,
            data: self.data.clone(),
        }
    }

    pub fn export_json(&self, exported_at: DateTime<Utc>) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export(exported_at))?)
    }

    /// Replace the ledger with an exported one.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or from another version.
    /// The ledger is left untouched in that case.
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let export: ProgressExport = serde_json::from_str(json)?;
        if export.version != EXPORT_VERSION {
            return Err(ValidationError::UnsupportedVersion {
                found: export.version,
                expected: EXPORT_VERSION,
            }
            .into());
        }
        let mut data = export.data;
        if data.history.len() > MAX_HISTORY {
            warn!(
                records = data.history.len(),
                kept = MAX_HISTORY,
                "Imported history exceeds cap; keeping most recent records"
            );
            let excess = data.history.len() - MAX_HISTORY;
            data.history.drain(..excess);
        }
        self.data = data;
        self.new_achievements.clear();
        Ok(())
    }

    pub fn reset(&mut self) {
        self.data = ProgressData::default();
        self.new_achievements.clear();
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::error::CoreError;
    use crate::storage::MemoryStore;
    use crate::timer::PracticeType;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn input(secs: u64) -> NewSession {
        NewSession {
            session_id: "morning".into(),
            session_name: "Morning Flow".into(),
            practice_type: PracticeType::Yoga,
            practice_secs: secs,
            pose_ids: vec!["mountain".into(), "tree".into()],
            ..Default::default()
        }
    }

    #[test]
    fn record_derives_mood_improvement() {
        let mut ledger = ProgressLedger::new();
        let record = ledger.record_session(
            NewSession {
                pre_mood: Some(2),
                post_mood: Some(5),
                ..input(600)
            },
            at(2026, 3, 1),
        );
        assert_eq!(record.mood_improvement, Some(3));
        assert_eq!(record.duration_minutes, 10);

        let record = ledger.record_session(
            NewSession {
                pre_mood: Some(2),
                ..input(600)
            },
            at(2026, 3, 1),
        );
        assert_eq!(record.mood_improvement, None);
    }

    #[test]
    fn streak_over_consecutive_days() {
        let mut ledger = ProgressLedger::new();
        let start = at(2026, 3, 1);
        for i in 0..4 {
            ledger.record_session(input(300), start + Duration::days(i));
            assert_eq!(ledger.data().current_streak, i as u32 + 1);
        }
        ledger.record_session(input(300), start + Duration::days(5));
        assert_eq!(ledger.data().current_streak, 1);
        assert_eq!(ledger.data().longest_streak, 4);
        assert_eq!(
            ledger.data().last_practice_date,
            NaiveDate::from_ymd_opt(2026, 3, 6)
        );
    }

    #[test]
    fn same_day_keeps_streak() {
        let mut ledger = ProgressLedger::new();
        ledger.record_session(input(300), at(2026, 3, 1));
        ledger.record_session(input(300), at(2026, 3, 2));
        ledger.record_session(input(300), at(2026, 3, 2) + Duration::hours(3));
        assert_eq!(ledger.data().current_streak, 2);
        assert_eq!(ledger.data().total_sessions, 3);
        assert_eq!(ledger.data().total_minutes, 15);
    }

    #[test]
    fn history_is_capped_but_totals_are_not() {
        let mut ledger = ProgressLedger::new();
        let start = at(2026, 1, 1);
        for i in 0..(MAX_HISTORY + 5) {
            ledger.record_session(input(60), start + Duration::hours(i as i64));
        }
        assert_eq!(ledger.history().len(), MAX_HISTORY);
        assert_eq!(ledger.data().total_sessions, (MAX_HISTORY + 5) as u64);
        assert_eq!(ledger.data().stats.all_time.sessions, MAX_HISTORY as u32);
        assert_eq!(ledger.recent(1)[0].completed_at, start + Duration::hours(104));
    }

    #[test]
    fn achievements_unlock_once() {
        let mut ledger = ProgressLedger::new();
        ledger.record_session(input(3_600), at(2026, 3, 1));
        let ids: Vec<_> = ledger
            .take_new_achievements()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["first_session", "minutes_60"]);

        ledger.record_session(input(60), at(2026, 3, 1));
        assert!(ledger.take_new_achievements().is_empty());
        assert_eq!(ledger.data().achievements.len(), 2);
    }

    #[test]
    fn save_and_load() {
        let store = MemoryStore::new();
        let mut ledger = ProgressLedger::new();
        ledger.record_session(input(300), at(2026, 3, 1));
        assert!(ledger.save(&store));
        let loaded = ProgressLedger::load(&store);
        assert_eq!(loaded.data(), ledger.data());
    }

    #[test]
    fn corrupt_store_loads_empty() {
        let store = MemoryStore::new();
        store.set(PROGRESS_KEY, "[1, 2").unwrap();
        let ledger = ProgressLedger::load(&store);
        assert_eq!(ledger.data(), &ProgressData::default());
    }

    #[test]
    fn import_rejects_other_versions() {
        let mut ledger = ProgressLedger::new();
        ledger.record_session(input(300), at(2026, 3, 1));
        let mut export = ledger.export(at(2026, 3, 2));
        export.version = 99;
        let json = serde_json::to_string(&export).unwrap();

        let mut fresh = ProgressLedger::new();
        let err = fresh.import_json(&json).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::UnsupportedVersion { found: 99, .. })
        ));
        assert!(fresh.history().is_empty());
        assert!(fresh.import_json("not json").is_err());
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let mut ledger = ProgressLedger::from_data(ProgressData {
            total_minutes: u64::MAX - 1,
            total_sessions: u64::MAX,
            ..Default::default()
        });
        ledger.record_session(input(600), at(2026, 3, 1));
        assert_eq!(ledger.data().total_minutes, u64::MAX);
        assert_eq!(ledger.data().total_sessions, u64::MAX);
    }

    #[test]
    fn reset_clears_everything() {
        let mut ledger = ProgressLedger::new();
        ledger.record_session(input(300), at(2026, 3, 1));
        ledger.reset();
        assert_eq!(ledger.data(), &ProgressData::default());
        assert!(ledger.take_new_achievements().is_empty());
    }
}

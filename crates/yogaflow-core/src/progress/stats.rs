//! Streak and aggregate statistics derived from the session history.
//!
//! Nothing here is a source of truth: every value is recomputed from the
//! history whenever a session is recorded.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::record::CompletedSessionRecord;

const WEEK_DAYS: i64 = 7;
const MONTH_DAYS: i64 = 30;

/// Session count and minutes over a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodStats {
    pub sessions: u32,
    pub minutes: u64,
}

/// Aggregates over the retained history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressStats {
    /// Last 7 days including today
    pub this_week: PeriodStats,
    /// Last 30 days including today
    pub this_month: PeriodStats,
    /// Everything in the retained history
    pub all_time: PeriodStats,
    /// Distinct practice days in the last 7 days
    pub active_days_this_week: u32,
    /// Mean session length in minutes (two decimals)
    pub average_session_minutes: f64,
    /// Mean mood change over sessions that have one (two decimals)
    pub average_mood_improvement: Option<f64>,
    /// Mean energy change over sessions that have one (two decimals)
    pub average_energy_improvement: Option<f64>,
}

/// Streak after practicing on `today`.
///
/// Practicing again the same day keeps the streak, practicing the day after
/// the last practice extends it, anything else starts over at 1.
pub fn next_streak(current: u32, last_practice: Option<NaiveDate>, today: NaiveDate) -> u32 {
    let Some(last) = last_practice else {
        return 1;
    };
    match (today - last).num_days() {
        d if d <= 0 => current.max(1),
        1 => current.saturating_add(1),
        _ => 1,
    }
}

pub fn compute_stats(history: &[CompletedSessionRecord], today: NaiveDate) -> ProgressStats {
    let week_start = today - Duration::days(WEEK_DAYS - 1);
    let month_start = today - Duration::days(MONTH_DAYS - 1);

    let mut stats = ProgressStats::default();
    let mut week_days: Vec<NaiveDate> = Vec::new();
    let mut mood_deltas = Vec::new();
    let mut energy_deltas = Vec::new();

    for record in history {
        add(&mut stats.all_time, record);
        let day = record.practice_date;
        if day >= month_start && day <= today {
            add(&mut stats.this_month, record);
        }
        if day >= week_start && day <= today {
            add(&mut stats.this_week, record);
            if !week_days.contains(&day) {
                week_days.push(day);
            }
        }
        if let Some(d) = record.mood_improvement {
            mood_deltas.push(f64::from(d));
        }
        if let Some(d) = record.energy_improvement {
            energy_deltas.push(f64::from(d));
        }
    }

    stats.active_days_this_week = week_days.len() as u32;
    if stats.all_time.sessions > 0 {
        stats.average_session_minutes =
            round2(stats.all_time.minutes as f64 / f64::from(stats.all_time.sessions));
    }
    stats.average_mood_improvement = mean(&mood_deltas);
    stats.average_energy_improvement = mean(&energy_deltas);
    stats
}

fn add(period: &mut PeriodStats, record: &CompletedSessionRecord) {
    period.sessions += 1;
    period.minutes += record.duration_minutes;
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(round2(values.iter().sum::<f64>() / values.len() as f64))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::timer::PracticeType;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(date: NaiveDate, minutes: u64, mood: Option<i8>) -> CompletedSessionRecord {
        CompletedSessionRecord {
            id: format!("r-{date}-{minutes}"),
            session_id: "s".into(),
            session_name: "S".into(),
            practice_type: PracticeType::Yoga,
            duration_minutes: minutes,
            completed_at: Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap()),
            practice_date: date,
            pose_ids: vec![],
            program: None,
            pre_mood: None,
            post_mood: None,
            pre_energy: None,
            post_energy: None,
            mood_improvement: mood,
            energy_improvement: None,
        }
    }

    #[test]
    fn streak_rules() {
        let today = day(2026, 3, 10);
        assert_eq!(next_streak(0, None, today), 1);
        assert_eq!(next_streak(4, Some(day(2026, 3, 9)), today), 5);
        assert_eq!(next_streak(4, Some(today), today), 4);
        assert_eq!(next_streak(0, Some(today), today), 1);
        assert_eq!(next_streak(4, Some(day(2026, 3, 8)), today), 1);
    }

    #[test]
    fn streak_crosses_month_boundary() {
        assert_eq!(next_streak(2, Some(day(2026, 2, 28)), day(2026, 3, 1)), 3);
    }

    #[test]
    fn period_windows() {
        let today = day(2026, 3, 31);
        let history = vec![
            record(day(2026, 3, 31), 10, Some(2)),
            record(day(2026, 3, 25), 20, None),
            record(day(2026, 3, 24), 30, Some(-1)),
            record(day(2026, 3, 2), 40, None),
            record(day(2026, 1, 1), 50, None),
        ];
        let stats = compute_stats(&history, today);
        assert_eq!(stats.this_week, PeriodStats { sessions: 2, minutes: 30 });
        assert_eq!(stats.this_month, PeriodStats { sessions: 4, minutes: 100 });
        assert_eq!(stats.all_time, PeriodStats { sessions: 5, minutes: 150 });
        assert_eq!(stats.active_days_this_week, 2);
        assert_eq!(stats.average_session_minutes, 30.0);
        assert_eq!(stats.average_mood_improvement, Some(0.5));
        assert_eq!(stats.average_energy_improvement, None);
    }

    #[test]
    fn averages_are_rounded() {
        let today = day(2026, 3, 31);
        let history = vec![
            record(today, 1, Some(1)),
            record(today, 1, Some(1)),
            record(today, 2, Some(2)),
        ];
        let stats = compute_stats(&history, today);
        assert_eq!(stats.average_session_minutes, 1.33);
        assert_eq!(stats.average_mood_improvement, Some(1.33));
    }

    #[test]
    fn empty_history() {
        let stats = compute_stats(&[], day(2026, 3, 31));
        assert_eq!(stats, ProgressStats::default());
    }
}

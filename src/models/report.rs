//! Derived values: daily aggregates, goal evaluations and reports.
//!
//! None of these are persisted. They are rebuilt from activity records
//! for every request.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::goal::{GoalPeriod, GoalThreshold};
use crate::models::ActivityKind;
use crate::time_utils::format_pace;

/// Pace in seconds per mile.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Pace(pub f64);

impl Pace {
    pub fn secs_per_mile(&self) -> f64 {
        self.0
    }

    pub fn minutes_per_mile(&self) -> f64 {
        self.0 / 60.0
    }

    /// `MM:SS` per mile.
    pub fn display(&self) -> String {
        format_pace(self.0)
    }
}

/// Totals for one kind on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub kind: ActivityKind,
    /// Number of records that contributed
    pub sessions: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_duration_secs: u64,
    pub total_distance_miles: f64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_repetitions: u64,
    /// total duration / total distance; absent when no distance was logged
    pub average_pace: Option<Pace>,
}

impl DailyAggregate {
    /// Aggregate for a day with nothing logged.
    pub fn empty(kind: ActivityKind, date: NaiveDate) -> Self {
        Self {
            date,
            kind,
            sessions: 0,
            total_duration_secs: 0,
            total_distance_miles: 0.0,
            total_repetitions: 0,
            average_pace: None,
        }
    }
}

/// Result of evaluating a goal over a run of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GoalEvaluation {
    pub days_met: u32,
    /// Consecutive qualifying days ending at the most recent day
    pub streak: u32,
    pub longest_streak: u32,
}

/// Goal attainment for one period, measured over the report window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PeriodAttainment {
    pub period: GoalPeriod,
    /// Configured qualifying days for a full period
    pub required_days: u32,
    /// Required days pro-rated to the window length
    pub expected_days: u32,
    pub days_met: u32,
    pub on_track: bool,
}

/// Window totals for one kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Totals {
    pub sessions: u32,
    pub active_days: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub duration_secs: u64,
    pub distance_miles: f64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub repetitions: u64,
    pub average_pace: Option<Pace>,
    /// Miles per run session
    pub average_distance_miles: Option<f64>,
    /// Repetitions per pushups session
    pub average_repetitions: Option<f64>,
    /// Mean over runs that recorded heart rate
    pub average_heart_rate: Option<u32>,
    /// Mean over runs that recorded cadence
    pub average_cadence: Option<u32>,
}

/// A single standout run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RunHighlight {
    pub date: NaiveDate,
    pub distance_miles: f64,
    pub duration_secs: u32,
    pub pace: Option<Pace>,
    pub cadence_avg: Option<u32>,
}

/// Best runs in the window.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PersonalRecords {
    pub fastest: Option<RunHighlight>,
    pub longest: Option<RunHighlight>,
    pub highest_cadence: Option<RunHighlight>,
}

/// Report section for one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct KindReport {
    pub kind: ActivityKind,
    pub threshold: GoalThreshold,
    pub days_met_goal: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub totals: Totals,
    pub periods: Vec<PeriodAttainment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<PersonalRecords>,
    /// One entry per day in the window, oldest first
    pub days: Vec<DailyAggregate>,
}

/// Label for the requested window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ReportPeriod {
    Day,
    Week,
    Month,
    Year,
    Custom,
}

impl ReportPeriod {
    pub fn from_window_days(days: u32) -> Self {
        match days {
            1 => ReportPeriod::Day,
            7 => ReportPeriod::Week,
            30 => ReportPeriod::Month,
            365 => ReportPeriod::Year,
            _ => ReportPeriod::Custom,
        }
    }
}

/// Time-windowed progress report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Report {
    pub period: ReportPeriod,
    pub window_days: u32,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub kinds: Vec<KindReport>,
}

impl Report {
    pub fn kind(&self, kind: ActivityKind) -> Option<&KindReport> {
        self.kinds.iter().find(|k| k.kind == kind)
    }
}

/// All-time totals across every stored record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitySummary {
    pub total_runs: u32,
    pub total_distance_miles: f64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_run_duration_secs: u64,
    pub total_pushup_sessions: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_pushups: u64,
    pub first_activity_date: Option<NaiveDate>,
    pub last_activity_date: Option<NaiveDate>,
    /// Distinct dates with at least one record of any kind
    pub total_days_active: u32,
}

/// Pushups logged over a trailing window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PushupsTotal {
    pub period_days: u32,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub sessions: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_pushups: u64,
    /// Over every day of the window, including days with none
    pub average_per_day: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pace_conversions() {
        let pace = Pace(600.0);
        assert_eq!(pace.minutes_per_mile(), 10.0);
        assert_eq!(pace.display(), "10:00");
    }

    #[test]
    fn test_report_period_labels() {
        assert_eq!(ReportPeriod::from_window_days(7), ReportPeriod::Week);
        assert_eq!(ReportPeriod::from_window_days(30), ReportPeriod::Month);
        assert_eq!(ReportPeriod::from_window_days(365), ReportPeriod::Year);
        assert_eq!(ReportPeriod::from_window_days(14), ReportPeriod::Custom);
    }
}

//! Goal definitions: what counts as a "good day" and how many are expected.
//!
//! Goals are configuration, loaded once at startup and passed explicitly
//! into the evaluator. Examples: "run every day", "100 pushups 5 days a week".

use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{ActivityKind, DailyAggregate};

/// Condition a single day's aggregate must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum GoalThreshold {
    /// Any logged duration (runs) or repetitions (pushups)
    AnyActivity,
    MinRepetitions { count: u32 },
    MinDistance { miles: f64 },
    MinDuration { secs: u32 },
}

impl GoalThreshold {
    /// Whether `day` satisfies this threshold.
    pub fn is_met(&self, day: &DailyAggregate) -> bool {
        match self {
            GoalThreshold::AnyActivity => match day.kind {
                ActivityKind::Run => day.total_duration_secs > 0,
                ActivityKind::Pushups => day.total_repetitions > 0,
            },
            GoalThreshold::MinRepetitions { count } => {
                day.total_repetitions > 0 && day.total_repetitions >= u64::from(*count)
            }
            GoalThreshold::MinDistance { miles } => {
                day.total_distance_miles > 0.0 && day.total_distance_miles >= *miles
            }
            GoalThreshold::MinDuration { secs } => {
                day.total_duration_secs > 0 && day.total_duration_secs >= u64::from(*secs)
            }
        }
    }
}

impl fmt::Display for GoalThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalThreshold::AnyActivity => write!(f, "any activity"),
            GoalThreshold::MinRepetitions { count } => write!(f, ">= {} reps", count),
            GoalThreshold::MinDistance { miles } => write!(f, ">= {} mi", miles),
            GoalThreshold::MinDuration { secs } => write!(f, ">= {} s", secs),
        }
    }
}

/// Goal tracking period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum GoalPeriod {
    Week,
    Month,
    Year,
}

impl GoalPeriod {
    pub const ALL: [GoalPeriod; 3] = [GoalPeriod::Week, GoalPeriod::Month, GoalPeriod::Year];

    /// Nominal length in days.
    pub fn days(&self) -> u32 {
        match self {
            GoalPeriod::Week => 7,
            GoalPeriod::Month => 30,
            GoalPeriod::Year => 365,
        }
    }
}

/// Required qualifying days per period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTargets {
    pub week: u32,
    pub month: u32,
    pub year: u32,
}

impl PeriodTargets {
    pub fn get(&self, period: GoalPeriod) -> u32 {
        match period {
            GoalPeriod::Week => self.week,
            GoalPeriod::Month => self.month,
            GoalPeriod::Year => self.year,
        }
    }
}

/// Goal for one activity kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalDefinition {
    pub kind: ActivityKind,
    pub threshold: GoalThreshold,
    pub required_days: PeriodTargets,
}

impl GoalDefinition {
    /// Built-in goals: run every day, 100 pushups five days a week.
    pub fn default_for(kind: ActivityKind) -> Self {
        match kind {
            ActivityKind::Run => Self {
                kind,
                threshold: GoalThreshold::AnyActivity,
                required_days: PeriodTargets {
                    week: 7,
                    month: 30,
                    year: 365,
                },
            },
            ActivityKind::Pushups => Self {
                kind,
                threshold: GoalThreshold::MinRepetitions { count: 100 },
                required_days: PeriodTargets {
                    week: 5,
                    month: 21,
                    year: 260,
                },
            },
        }
    }

    /// Whether `day` counts toward this goal.
    pub fn is_met(&self, day: &DailyAggregate) -> bool {
        day.kind == self.kind && self.threshold.is_met(day)
    }

    /// Reject targets that cannot be met within their period.
    pub fn validate(&self) -> Result<(), String> {
        for period in GoalPeriod::ALL {
            let required = self.required_days.get(period);
            if required > period.days() {
                return Err(format!(
                    "{} goal requires {} days per {:?}, which has only {}",
                    self.kind,
                    required,
                    period,
                    period.days()
                ));
            }
        }
        Ok(())
    }
}

/// Goals for every kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalConfig {
    pub run: GoalDefinition,
    pub pushups: GoalDefinition,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            run: GoalDefinition::default_for(ActivityKind::Run),
            pushups: GoalDefinition::default_for(ActivityKind::Pushups),
        }
    }
}

impl GoalConfig {
    pub fn for_kind(&self, kind: ActivityKind) -> &GoalDefinition {
        match kind {
            ActivityKind::Run => &self.run,
            ActivityKind::Pushups => &self.pushups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn pushup_day(reps: u64) -> DailyAggregate {
        let mut day = DailyAggregate::empty(
            ActivityKind::Pushups,
            NaiveDate::from_ymd_opt(2025, 6, 7).unwrap(),
        );
        day.total_repetitions = reps;
        day.sessions = u32::from(reps > 0);
        day
    }

    #[test]
    fn test_min_repetitions_threshold() {
        let goal = GoalDefinition::default_for(ActivityKind::Pushups);
        assert!(goal.is_met(&pushup_day(100)));
        assert!(goal.is_met(&pushup_day(120)));
        assert!(!goal.is_met(&pushup_day(99)));
        assert!(!goal.is_met(&pushup_day(0)));
    }

    #[test]
    fn test_zero_threshold_still_requires_activity() {
        let threshold = GoalThreshold::MinRepetitions { count: 0 };
        assert!(!threshold.is_met(&pushup_day(0)));
        assert!(threshold.is_met(&pushup_day(1)));
    }

    #[test]
    fn test_goal_ignores_other_kinds() {
        let goal = GoalDefinition::default_for(ActivityKind::Run);
        assert!(!goal.is_met(&pushup_day(500)));
    }

    #[test]
    fn test_validate_rejects_impossible_targets() {
        let mut goal = GoalDefinition::default_for(ActivityKind::Pushups);
        assert!(goal.validate().is_ok());
        goal.required_days.week = 8;
        assert!(goal.validate().is_err());
    }

    #[test]
    fn test_threshold_serde_shape() {
        let json = serde_json::to_value(GoalThreshold::MinRepetitions { count: 100 }).unwrap();
        assert_eq!(json["type"], "min_repetitions");
        assert_eq!(json["count"], 100);
    }
}

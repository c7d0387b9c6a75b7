// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod goal;
pub mod report;

pub use activity::{ActivityKind, ActivityRecord, ActivitySource, RunDetails, Split};
pub use goal::{GoalConfig, GoalDefinition, GoalPeriod, GoalThreshold, PeriodTargets};
pub use report::{
    ActivitySummary, DailyAggregate, GoalEvaluation, KindReport, Pace, PeriodAttainment,
    PersonalRecords, PushupsTotal, Report, ReportPeriod, RunHighlight, Totals,
};

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Report assembly.
//!
//! Pulls records for the window from the store, aggregates them per day and
//! evaluates goals. Nothing is cached; every call reads the store afresh.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};

use crate::db::ActivityStore;
use crate::error::{AppError, Result};
use crate::models::{
    ActivityKind, ActivityRecord, ActivitySummary, DailyAggregate, GoalConfig, GoalDefinition,
    KindReport, PersonalRecords, PushupsTotal, Report, ReportPeriod, RunHighlight, Totals,
};
use crate::services::{goals, metrics};

/// Builds reports from a store and a goal configuration.
#[derive(Clone)]
pub struct ReportBuilder {
    store: Arc<dyn ActivityStore>,
    goals: GoalConfig,
}

impl ReportBuilder {
    pub fn new(store: Arc<dyn ActivityStore>, goals: GoalConfig) -> Self {
        Self { store, goals }
    }

    /// Report for one kind over the `window_days` days ending at `as_of`.
    pub async fn build_report(
        &self,
        kind: ActivityKind,
        window_days: u32,
        as_of: NaiveDate,
    ) -> Result<Report> {
        self.build(&[kind], window_days, as_of).await
    }

    /// Report for every kind over the `window_days` days ending at `as_of`.
    pub async fn build_status(&self, window_days: u32, as_of: NaiveDate) -> Result<Report> {
        self.build(&ActivityKind::ALL, window_days, as_of).await
    }

    /// All-time totals over every stored record.
    pub async fn build_summary(&self) -> Result<ActivitySummary> {
        let (start, end) = all_time()?;
        let runs = self.store.query(ActivityKind::Run, start, end).await?;
        let pushups = self.store.query(ActivityKind::Pushups, start, end).await?;
        tracing::debug!(
            runs = runs.len(),
            pushups = pushups.len(),
            "Loaded records for summary"
        );

        let mut dates: Vec<NaiveDate> = runs.iter().chain(&pushups).map(|r| r.date).collect();
        dates.sort_unstable();
        dates.dedup();

        Ok(ActivitySummary {
            total_runs: runs.len() as u32,
            total_distance_miles: crate::models::activity::round_distance(
                runs.iter().filter_map(|r| r.distance_miles).sum(),
            ),
            total_run_duration_secs: runs
                .iter()
                .filter_map(|r| r.duration_secs)
                .map(u64::from)
                .sum(),
            total_pushup_sessions: pushups.len() as u32,
            total_pushups: pushups
                .iter()
                .filter_map(|r| r.repetitions)
                .map(u64::from)
                .sum(),
            first_activity_date: dates.first().copied(),
            last_activity_date: dates.last().copied(),
            total_days_active: dates.len() as u32,
        })
    }

    /// Pushups over the `window_days` days ending at `as_of`.
    pub async fn pushups_total(&self, window_days: u32, as_of: NaiveDate) -> Result<PushupsTotal> {
        let window_start = window_start(window_days, as_of)?;
        let records = self
            .store
            .query(ActivityKind::Pushups, window_start, as_of)
            .await?;
        let total_pushups: u64 = records
            .iter()
            .filter_map(|r| r.repetitions)
            .map(u64::from)
            .sum();

        Ok(PushupsTotal {
            period_days: window_days,
            window_start,
            window_end: as_of,
            sessions: records.len() as u32,
            total_pushups,
            average_per_day: (total_pushups as f64 / f64::from(window_days) * 10.0).round() / 10.0,
        })
    }

    async fn build(
        &self,
        kinds: &[ActivityKind],
        window_days: u32,
        as_of: NaiveDate,
    ) -> Result<Report> {
        let window_start = window_start(window_days, as_of)?;

        let mut sections = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            let records = self.store.query(kind, window_start, as_of).await?;
            tracing::debug!(
                kind = %kind,
                count = records.len(),
                %window_start,
                %as_of,
                "Loaded records for report"
            );
            sections.push(assemble_kind_report(
                self.goals.for_kind(kind),
                window_start,
                as_of,
                &records,
            ));
        }

        Ok(Report {
            period: ReportPeriod::from_window_days(window_days),
            window_days,
            window_start,
            window_end: as_of,
            kinds: sections,
        })
    }
}

/// Date range covering every record an all-time summary reads.
fn all_time() -> Result<(NaiveDate, NaiveDate)> {
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .zip(NaiveDate::from_ymd_opt(9999, 12, 31))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Invalid all-time range")))
}

/// First day of a `window_days` window ending at `as_of`.
pub fn window_start(window_days: u32, as_of: NaiveDate) -> Result<NaiveDate> {
    if window_days < 1 {
        return Err(AppError::BadRequest(
            "Report window must be at least 1 day".to_string(),
        ));
    }
    as_of
        .checked_sub_signed(Duration::days(i64::from(window_days) - 1))
        .ok_or_else(|| AppError::BadRequest(format!("Window of {} days is too long", window_days)))
}

/// Report section for `goal.kind` over `[start, end]`.
pub fn assemble_kind_report(
    goal: &GoalDefinition,
    start: NaiveDate,
    end: NaiveDate,
    records: &[ActivityRecord],
) -> KindReport {
    let kind = goal.kind;
    let days = metrics::aggregate_window(kind, start, end, records);
    let evaluation = goals::evaluate(&days, goal);
    let window_days = days.len() as u32;

    KindReport {
        kind,
        threshold: goal.threshold.clone(),
        days_met_goal: evaluation.days_met,
        current_streak: evaluation.streak,
        longest_streak: evaluation.longest_streak,
        totals: totals(&days, records, start, end),
        periods: goals::evaluate_periods(evaluation.days_met, window_days, goal),
        records: match kind {
            ActivityKind::Run => Some(personal_records(records, start, end)),
            ActivityKind::Pushups => None,
        },
        days,
    }
}

fn totals(
    days: &[DailyAggregate],
    records: &[ActivityRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Totals {
    let mut totals = days.iter().fold(Totals::default(), |mut t, d| {
        t.sessions += d.sessions;
        t.active_days += u32::from(d.sessions > 0);
        t.duration_secs += d.total_duration_secs;
        t.distance_miles += d.total_distance_miles;
        t.repetitions += d.total_repetitions;
        t
    });
    totals.distance_miles = crate::models::activity::round_distance(totals.distance_miles);
    if totals.distance_miles > 0.0 {
        totals.average_pace =
            metrics::compute_pace(totals.duration_secs as f64, totals.distance_miles).ok();
    }
    if totals.sessions > 0 {
        let sessions = f64::from(totals.sessions);
        if totals.distance_miles > 0.0 {
            totals.average_distance_miles = Some(crate::models::activity::round_distance(
                totals.distance_miles / sessions,
            ));
        }
        if totals.repetitions > 0 {
            totals.average_repetitions =
                Some((totals.repetitions as f64 / sessions * 10.0).round() / 10.0);
        }
    }

    let details: Vec<_> = records
        .iter()
        .filter(|r| r.kind == ActivityKind::Run && r.date >= start && r.date <= end)
        .filter_map(|r| r.details.as_ref())
        .collect();
    totals.average_heart_rate = mean(details.iter().filter_map(|d| d.heart_rate_avg));
    totals.average_cadence = mean(details.iter().filter_map(|d| d.cadence_avg));
    totals
}

/// Rounded mean, or `None` for no values.
fn mean(values: impl Iterator<Item = u32>) -> Option<u32> {
    let (sum, count) = values.fold((0u64, 0u64), |(s, c), v| (s + u64::from(v), c + 1));
    if count == 0 {
        return None;
    }
    u32::try_from((sum + count / 2) / count).ok()
}

fn highlight(record: &ActivityRecord) -> RunHighlight {
    RunHighlight {
        date: record.date,
        distance_miles: record.distance_miles.unwrap_or(0.0),
        duration_secs: record.duration_secs.unwrap_or(0),
        pace: record.pace(),
        cadence_avg: record.details.as_ref().and_then(|d| d.cadence_avg),
    }
}

/// Fastest, longest and highest-cadence runs in `[start, end]`.
///
/// Ties go to the earliest record.
fn personal_records(records: &[ActivityRecord], start: NaiveDate, end: NaiveDate) -> PersonalRecords {
    let runs: Vec<&ActivityRecord> = records
        .iter()
        .filter(|r| r.kind == ActivityKind::Run && r.date >= start && r.date <= end)
        .collect();

    let mut fastest: Option<(f64, &ActivityRecord)> = None;
    let mut longest: Option<(f64, &ActivityRecord)> = None;
    let mut cadence: Option<(u32, &ActivityRecord)> = None;

    for &run in &runs {
        if let Some(pace) = run.pace() {
            if fastest.is_none_or(|(best, _)| pace.secs_per_mile() < best) {
                fastest = Some((pace.secs_per_mile(), run));
            }
        }
        let distance = run.distance_miles.unwrap_or(0.0);
        if longest.is_none_or(|(best, _)| distance > best) {
            longest = Some((distance, run));
        }
        if let Some(c) = run.details.as_ref().and_then(|d| d.cadence_avg) {
            if cadence.is_none_or(|(best, _)| c > best) {
                cadence = Some((c, run));
            }
        }
    }

    PersonalRecords {
        fastest: fastest.map(|(_, r)| highlight(r)),
        longest: longest.map(|(_, r)| highlight(r)),
        highest_cadence: cadence.map(|(_, r)| highlight(r)),
    }
}

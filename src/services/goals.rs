// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Goal evaluation over a run of daily aggregates.

use crate::models::{DailyAggregate, GoalDefinition, GoalEvaluation, GoalPeriod, PeriodAttainment};

/// Count qualifying days and streaks in `aggregates`.
///
/// `aggregates` must be sorted ascending by date. The current streak ends at
/// the last element; a missing calendar day between two entries breaks it.
pub fn evaluate(aggregates: &[DailyAggregate], goal: &GoalDefinition) -> GoalEvaluation {
    let mut eval = GoalEvaluation::default();
    let mut run = 0u32;
    let mut prev_date = None;

    for day in aggregates {
        let contiguous = prev_date.is_some_and(|prev| day.date.pred_opt() == Some(prev));
        if !contiguous {
            run = 0;
        }

        if goal.is_met(day) {
            eval.days_met += 1;
            run += 1;
            eval.longest_streak = eval.longest_streak.max(run);
        } else {
            run = 0;
        }
        prev_date = Some(day.date);
    }

    eval.streak = run;
    eval
}

/// Attainment for each goal period, pro-rated to a window of `window_days`.
///
/// A week goal of 5 days over a 14 day window expects 10 qualifying days;
/// a year goal of 260 over 7 days expects `ceil(260 * 7 / 365) = 5`.
pub fn evaluate_periods(
    days_met: u32,
    window_days: u32,
    goal: &GoalDefinition,
) -> Vec<PeriodAttainment> {
    GoalPeriod::ALL
        .iter()
        .map(|&period| {
            let required_days = goal.required_days.get(period);
            let expected_days = expected_days(required_days, window_days, period.days());
            PeriodAttainment {
                period,
                required_days,
                expected_days,
                days_met,
                on_track: days_met >= expected_days,
            }
        })
        .collect()
}

fn expected_days(required: u32, window_days: u32, period_days: u32) -> u32 {
    if period_days == 0 {
        return 0;
    }
    let scaled = u64::from(required) * u64::from(window_days);
    let expected = scaled.div_ceil(u64::from(period_days));
    expected.min(u64::from(window_days)) as u32
}

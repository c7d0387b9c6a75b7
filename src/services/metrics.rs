// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Metric calculations: pace and per-day totals.
//!
//! Pure functions with no I/O.

use chrono::NaiveDate;

use crate::error::AppError;
use crate::models::{ActivityKind, ActivityRecord, DailyAggregate, Pace};

/// Pace in seconds per mile for `duration_secs` over `distance_miles`.
pub fn compute_pace(duration_secs: f64, distance_miles: f64) -> Result<Pace, AppError> {
    if !distance_miles.is_finite() || distance_miles <= 0.0 {
        return Err(AppError::InvalidMetric(format!(
            "Distance must be positive to compute pace, got {}",
            distance_miles
        )));
    }
    if !duration_secs.is_finite() || duration_secs < 0.0 {
        return Err(AppError::InvalidMetric(format!(
            "Duration cannot be negative, got {}",
            duration_secs
        )));
    }
    Ok(Pace(duration_secs / distance_miles))
}

/// Sum every record of `kind` logged on `date`.
///
/// Pace is recomputed from the summed totals rather than averaged per
/// record, so a long slow run and a short fast one weigh by distance.
pub fn aggregate_day(
    kind: ActivityKind,
    date: NaiveDate,
    records: &[ActivityRecord],
) -> DailyAggregate {
    records
        .iter()
        .filter(|r| r.kind == kind && r.date == date)
        .fold(DailyAggregate::empty(kind, date), |mut day, record| {
            accumulate(&mut day, record);
            day
        })
        .with_pace()
}

/// One aggregate per calendar day in `[start, end]`, oldest first.
///
/// Days with nothing logged get an empty aggregate so callers see a
/// contiguous range.
pub fn aggregate_window(
    kind: ActivityKind,
    start: NaiveDate,
    end: NaiveDate,
    records: &[ActivityRecord],
) -> Vec<DailyAggregate> {
    let mut days: Vec<DailyAggregate> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|d| DailyAggregate::empty(kind, d))
        .collect();

    for record in records.iter().filter(|r| r.kind == kind) {
        if record.date < start || record.date > end {
            continue;
        }
        let offset = (record.date - start).num_days() as usize;
        if let Some(day) = days.get_mut(offset) {
            accumulate(day, record);
        }
    }

    days.into_iter().map(DailyAggregate::with_pace).collect()
}

fn accumulate(day: &mut DailyAggregate, record: &ActivityRecord) {
    day.sessions += 1;
    day.total_duration_secs += u64::from(record.duration_secs.unwrap_or(0));
    day.total_distance_miles += record.distance_miles.unwrap_or(0.0);
    day.total_repetitions += u64::from(record.repetitions.unwrap_or(0));
}

impl DailyAggregate {
    fn with_pace(mut self) -> Self {
        self.average_pace = if self.total_distance_miles > 0.0 {
            compute_pace(self.total_duration_secs as f64, self.total_distance_miles).ok()
        } else {
            None
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn run(d: u32, secs: u32, miles: f64) -> ActivityRecord {
        let at = Utc.with_ymd_and_hms(2025, 6, d, 12, 0, 0).unwrap();
        ActivityRecord::run(day(d), at, secs, miles).unwrap()
    }

    fn pushups(d: u32, count: u32) -> ActivityRecord {
        let at = Utc.with_ymd_and_hms(2025, 6, d, 12, 0, 0).unwrap();
        ActivityRecord::pushups(day(d), at, count).unwrap()
    }

    #[test]
    fn test_compute_pace_divides() {
        assert_eq!(compute_pace(1800.0, 3.0).unwrap(), Pace(600.0));
        assert_eq!(compute_pace(0.0, 2.0).unwrap(), Pace(0.0));
    }

    #[test]
    fn test_compute_pace_rejects_bad_input() {
        assert!(matches!(
            compute_pace(1800.0, 0.0),
            Err(AppError::InvalidMetric(_))
        ));
        assert!(matches!(
            compute_pace(1800.0, -2.0),
            Err(AppError::InvalidMetric(_))
        ));
        assert!(matches!(
            compute_pace(-1.0, 2.0),
            Err(AppError::InvalidMetric(_))
        ));
        assert!(matches!(
            compute_pace(f64::NAN, 2.0),
            Err(AppError::InvalidMetric(_))
        ));
    }

    #[test]
    fn test_thirty_minute_three_mile_run_is_ten_minute_pace() {
        let records = vec![run(7, 1800, 3.0)];
        let agg = aggregate_day(ActivityKind::Run, day(7), &records);
        assert_eq!(agg.sessions, 1);
        assert_eq!(agg.average_pace.unwrap().minutes_per_mile(), 10.0);
    }

    #[test]
    fn test_pace_uses_summed_totals() {
        // 1 mile in 6:00 and 3 miles in 36:00: per-record average would be 9:00,
        // the weighted pace is 42:00 / 4 = 10:30.
        let records = vec![run(7, 360, 1.0), run(7, 2160, 3.0)];
        let agg = aggregate_day(ActivityKind::Run, day(7), &records);
        assert_eq!(agg.total_duration_secs, 2520);
        assert_eq!(agg.total_distance_miles, 4.0);
        assert_eq!(agg.average_pace, Some(Pace(630.0)));
    }

    #[test]
    fn test_aggregate_day_filters_kind_and_date() {
        let records = vec![pushups(7, 50), pushups(7, 60), pushups(6, 100), run(7, 1800, 3.0)];
        let agg = aggregate_day(ActivityKind::Pushups, day(7), &records);
        assert_eq!(agg.sessions, 2);
        assert_eq!(agg.total_repetitions, 110);
        assert_eq!(agg.average_pace, None);
    }

    #[test]
    fn test_aggregate_window_fills_missing_days() {
        let records = vec![pushups(5, 100), pushups(7, 30)];
        let days = aggregate_window(ActivityKind::Pushups, day(4), day(7), &records);
        let totals: Vec<u64> = days.iter().map(|d| d.total_repetitions).collect();
        assert_eq!(totals, vec![0, 100, 0, 30]);
        assert_eq!(days.first().unwrap().date, day(4));
        assert_eq!(days.last().unwrap().date, day(7));
    }

    #[test]
    fn test_aggregate_window_ignores_out_of_range_records() {
        let records = vec![pushups(1, 100), pushups(9, 100)];
        let days = aggregate_window(ActivityKind::Pushups, day(4), day(7), &records);
        assert!(days.iter().all(|d| d.sessions == 0));
    }

    #[test]
    fn test_empty_window_when_start_after_end() {
        let days = aggregate_window(ActivityKind::Run, day(7), day(4), &[]);
        assert!(days.is_empty());
    }
}

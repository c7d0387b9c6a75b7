// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Manual activity logging.

use chrono::{DateTime, NaiveDate, Utc};

use crate::db::ActivityStore;
use crate::error::Result;
use crate::models::ActivityRecord;
use crate::time_utils::LocalTimezone;

/// Fields of a manually logged activity.
#[derive(Debug, Clone, PartialEq)]
pub enum NewActivity {
    Run { duration_secs: u32, distance_miles: f64 },
    Pushups { count: u32 },
}

/// Validate and store a manual entry.
///
/// `date` defaults to today in `tz`. The record is stamped with `now`.
pub async fn log_activity(
    store: &dyn ActivityStore,
    activity: NewActivity,
    date: Option<NaiveDate>,
    tz: &LocalTimezone,
    now: DateTime<Utc>,
) -> Result<ActivityRecord> {
    let date = date.unwrap_or_else(|| tz.local_date(now));

    let record = match activity {
        NewActivity::Run {
            duration_secs,
            distance_miles,
        } => ActivityRecord::run(date, now, duration_secs, distance_miles)?,
        NewActivity::Pushups { count } => ActivityRecord::pushups(date, now, count)?,
    };

    store.insert(&record).await?;

    tracing::info!(
        kind = %record.kind,
        date = %record.date,
        duration_secs = record.duration_secs,
        distance_miles = record.distance_miles,
        repetitions = record.repetitions,
        "Logged activity"
    );

    Ok(record)
}

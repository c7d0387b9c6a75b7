// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity record model for storage and API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::AppError;

/// Kilometers to miles.
pub const KM_TO_MILES: f64 = 0.621371;

/// Decimal places kept for distances (manual and imported alike).
pub const DISTANCE_DECIMALS: i32 = 5;

/// Round a distance in miles to the stored precision.
pub fn round_distance(miles: f64) -> f64 {
    let scale = 10f64.powi(DISTANCE_DECIMALS);
    (miles * scale).round() / scale
}

/// Convert kilometers to miles with the stored precision.
pub fn km_to_miles(km: f64) -> f64 {
    round_distance(km * KM_TO_MILES)
}

/// Kind of exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ActivityKind {
    Run,
    Pushups,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 2] = [ActivityKind::Run, ActivityKind::Pushups];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Run => "run",
            ActivityKind::Pushups => "pushups",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "run" | "runs" => Ok(ActivityKind::Run),
            "pushup" | "pushups" => Ok(ActivityKind::Pushups),
            other => Err(AppError::BadRequest(format!(
                "Unknown activity kind '{}'",
                other
            ))),
        }
    }
}

/// Where a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ActivitySource {
    Manual,
    Imported,
}

/// Per-mile split of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Split {
    /// 1-based mile number
    pub mile_number: u32,
    pub duration_secs: u32,
    /// Seconds per mile
    pub pace_secs: u32,
    pub heart_rate_avg: Option<u32>,
    pub cadence_avg: Option<u32>,
}

/// Optional run enrichment (heart rate, cadence, weather, splits).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RunDetails {
    pub heart_rate_avg: Option<u32>,
    pub heart_rate_max: Option<u32>,
    pub heart_rate_min: Option<u32>,
    pub cadence_avg: Option<u32>,
    pub cadence_max: Option<u32>,
    pub cadence_min: Option<u32>,
    /// Degrees as reported by the source
    pub temperature: Option<f64>,
    pub weather_type: Option<String>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub splits: Vec<Split>,
}

/// A single logged exercise event. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityRecord {
    pub kind: ActivityKind,
    /// Local calendar date the activity counts toward
    pub date: NaiveDate,
    /// When the activity started (imports) or was logged (manual)
    pub logged_at: DateTime<Utc>,
    /// Run duration in seconds
    pub duration_secs: Option<u32>,
    /// Run distance in miles
    pub distance_miles: Option<f64>,
    /// Pushup count
    pub repetitions: Option<u32>,
    pub source: ActivitySource,
    /// Source-specific identifier, unique across imported records
    pub external_id: Option<String>,
    #[serde(default)]
    pub details: Option<RunDetails>,
}

impl ActivityRecord {
    /// Build a manually logged run.
    pub fn run(
        date: NaiveDate,
        logged_at: DateTime<Utc>,
        duration_secs: u32,
        distance_miles: f64,
    ) -> Result<Self, AppError> {
        let record = Self {
            kind: ActivityKind::Run,
            date,
            logged_at,
            duration_secs: Some(duration_secs),
            distance_miles: Some(round_distance(distance_miles)),
            repetitions: None,
            source: ActivitySource::Manual,
            external_id: None,
            details: None,
        };
        record.validate()?;
        Ok(record)
    }

    /// Build a manually logged set of pushups.
    pub fn pushups(
        date: NaiveDate,
        logged_at: DateTime<Utc>,
        repetitions: u32,
    ) -> Result<Self, AppError> {
        let record = Self {
            kind: ActivityKind::Pushups,
            date,
            logged_at,
            duration_secs: None,
            distance_miles: None,
            repetitions: Some(repetitions),
            source: ActivitySource::Manual,
            external_id: None,
            details: None,
        };
        record.validate()?;
        Ok(record)
    }

    /// Check the per-kind field invariants.
    pub fn validate(&self) -> Result<(), AppError> {
        match self.kind {
            ActivityKind::Run => {
                let distance = self.distance_miles.ok_or_else(|| {
                    AppError::InvalidMetric("Run requires a distance".to_string())
                })?;
                if self.duration_secs.is_none() {
                    return Err(AppError::InvalidMetric(
                        "Run requires a duration".to_string(),
                    ));
                }
                if !distance.is_finite() || distance <= 0.0 {
                    return Err(AppError::InvalidMetric(format!(
                        "Distance must be positive, got {}",
                        distance
                    )));
                }
                if self.repetitions.is_some() {
                    return Err(AppError::InvalidMetric(
                        "Run cannot carry repetitions".to_string(),
                    ));
                }
            }
            ActivityKind::Pushups => match self.repetitions {
                Some(0) | None => {
                    return Err(AppError::InvalidMetric(
                        "Pushups require a positive count".to_string(),
                    ))
                }
                Some(_) => {
                    if self.duration_secs.is_some() || self.distance_miles.is_some() {
                        return Err(AppError::InvalidMetric(
                            "Pushups cannot carry duration or distance".to_string(),
                        ));
                    }
                }
            },
        }
        Ok(())
    }

    /// Store document ID.
    ///
    /// Imported records are keyed by their external ID so the store itself
    /// rejects a second copy.
    pub fn document_id(&self) -> String {
        match &self.external_id {
            Some(external_id) => Self::external_document_id(external_id),
            None => format!(
                "{}_{}_{}",
                self.kind,
                self.date.format("%Y%m%d"),
                self.logged_at.timestamp_nanos_opt().unwrap_or_default()
            ),
        }
    }

    /// Document ID an imported record with `external_id` is stored under.
    pub fn external_document_id(external_id: &str) -> String {
        format!("ext_{}", urlencoding::encode(external_id))
    }

    /// Pace in seconds per mile, for runs.
    pub fn pace(&self) -> Option<crate::models::Pace> {
        match (self.duration_secs, self.distance_miles) {
            (Some(duration), Some(distance)) => {
                crate::services::metrics::compute_pace(duration as f64, distance).ok()
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 7, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_km_conversion_matches_manual_rounding() {
        let imported = km_to_miles(5.0);
        assert!((imported - 3.10686).abs() < 1e-12);
        let manual = ActivityRecord::run(day(2025, 6, 7), noon(), 1800, 3.106855).unwrap();
        assert_eq!(manual.distance_miles, Some(imported));
    }

    #[test]
    fn test_run_rejects_zero_and_negative_distance() {
        assert!(matches!(
            ActivityRecord::run(day(2025, 6, 7), noon(), 1800, 0.0),
            Err(AppError::InvalidMetric(_))
        ));
        assert!(matches!(
            ActivityRecord::run(day(2025, 6, 7), noon(), 1800, -1.0),
            Err(AppError::InvalidMetric(_))
        ));
    }

    #[test]
    fn test_pushups_reject_zero_count() {
        assert!(matches!(
            ActivityRecord::pushups(day(2025, 6, 7), noon(), 0),
            Err(AppError::InvalidMetric(_))
        ));
        let ok = ActivityRecord::pushups(day(2025, 6, 7), noon(), 50).unwrap();
        assert_eq!(ok.repetitions, Some(50));
        assert_eq!(ok.source, ActivitySource::Manual);
    }

    #[test]
    fn test_validate_rejects_mixed_fields() {
        let mut record = ActivityRecord::pushups(day(2025, 6, 7), noon(), 50).unwrap();
        record.distance_miles = Some(1.0);
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_document_id_for_imported_record_is_stable() {
        let mut a = ActivityRecord::run(day(2025, 6, 7), noon(), 1800, 3.0).unwrap();
        a.external_id = Some("123/456".to_string());
        let mut b = a.clone();
        b.logged_at = Utc::now();
        assert_eq!(a.document_id(), b.document_id());
        assert_eq!(a.document_id(), "ext_123%2F456");
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Run".parse::<ActivityKind>().unwrap(), ActivityKind::Run);
        assert_eq!(
            "pushups".parse::<ActivityKind>().unwrap(),
            ActivityKind::Pushups
        );
        assert!("swim".parse::<ActivityKind>().is_err());
    }

    #[test]
    fn test_record_serializes_kind_lowercase() {
        let record = ActivityRecord::pushups(day(2025, 6, 7), noon(), 20).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "pushups");
        assert_eq!(json["date"], "2025-06-07");
        assert_eq!(json["source"], "manual");
    }
}

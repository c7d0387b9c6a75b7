// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Import of runs from Smashrun.
//!
//! Handles the import workflow:
//! 1. Search Smashrun for runs in a trailing window
//! 2. Normalize each entry (km to miles, UTC start to local date)
//! 3. Skip entries already stored under the same external ID
//! 4. Fetch per-mile splits (best effort)
//! 5. Insert into the store

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::ActivityStore;
use crate::error::{AppError, Result};
use crate::models::activity::km_to_miles;
use crate::models::{ActivityKind, ActivityRecord, ActivitySource, RunDetails};
use crate::services::smashrun::{SmashrunClient, SmashrunCredentials};
use crate::time_utils::LocalTimezone;

/// Foreign distances above this are meters, not kilometers.
const METERS_THRESHOLD: f64 = 1000.0;

/// A run as reported by Smashrun, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignActivity {
    /// Number or string depending on endpoint
    pub activity_id: Option<serde_json::Value>,
    pub start_date_time_utc: Option<String>,
    pub start_date_time_local: Option<String>,
    /// Seconds
    pub duration: Option<f64>,
    /// Kilometers (occasionally meters)
    pub distance: Option<f64>,
    pub heart_rate_average: Option<f64>,
    pub heart_rate_max: Option<f64>,
    pub heart_rate_min: Option<f64>,
    pub cadence_average: Option<f64>,
    pub cadence_max: Option<f64>,
    pub cadence_min: Option<f64>,
    pub temperature: Option<f64>,
    pub weather_type: Option<String>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
}

impl ForeignActivity {
    /// Decode one raw search entry.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| AppError::ImportSource(format!("Malformed entry: {}", e)))
    }

    /// Source activity ID as a string.
    pub fn external_id(&self) -> Result<String> {
        match &self.activity_id {
            Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
                Ok(s.trim().to_string())
            }
            _ => Err(AppError::ImportSource(
                "Entry has no activityId".to_string(),
            )),
        }
    }

    /// UTC start instant.
    ///
    /// `startDateTimeUtc` wins when present. A local timestamp with an
    /// offset is exact; one without is read as wall-clock time in `tz`.
    pub fn start_instant(&self, tz: &LocalTimezone) -> Result<DateTime<Utc>> {
        if let Some(raw) = self.start_date_time_utc.as_deref() {
            return parse_timestamp(raw, |naive| Some(naive.and_utc()));
        }
        if let Some(raw) = self.start_date_time_local.as_deref() {
            return parse_timestamp(raw, |naive| tz.to_utc(naive));
        }
        Err(AppError::ImportSource(
            "Entry has no start time".to_string(),
        ))
    }

    fn details(&self) -> RunDetails {
        RunDetails {
            heart_rate_avg: self.heart_rate_average.map(round_u32),
            heart_rate_max: self.heart_rate_max.map(round_u32),
            heart_rate_min: self.heart_rate_min.map(round_u32),
            cadence_avg: self.cadence_average.map(round_u32),
            cadence_max: self.cadence_max.map(round_u32),
            cadence_min: self.cadence_min.map(round_u32),
            temperature: self.temperature,
            weather_type: self.weather_type.clone(),
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            splits: Vec::new(),
        }
    }
}

fn round_u32(v: f64) -> u32 {
    v.round().max(0.0) as u32
}

fn parse_timestamp<F>(raw: &str, naive_to_utc: F) -> Result<DateTime<Utc>>
where
    F: FnOnce(NaiveDateTime) -> Option<DateTime<Utc>>,
{
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|_| AppError::ImportSource(format!("Invalid start time '{}'", raw)))?;
    naive_to_utc(naive)
        .ok_or_else(|| AppError::ImportSource(format!("Nonexistent local time '{}'", raw)))
}

/// Convert a foreign entry to a canonical run record.
///
/// Distances above 1000 are taken as meters. The record's date is the
/// calendar date of the start instant in `tz`.
pub fn normalize(foreign: &ForeignActivity, tz: &LocalTimezone) -> Result<ActivityRecord> {
    let external_id = foreign.external_id()?;
    let start = foreign.start_instant(tz)?;

    let duration = foreign
        .duration
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| {
            AppError::ImportSource(format!("Activity {} has no duration", external_id))
        })?;

    let mut distance_km = foreign
        .distance
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| {
            AppError::ImportSource(format!("Activity {} has no distance", external_id))
        })?;
    if distance_km > METERS_THRESHOLD {
        distance_km /= 1000.0;
    }

    let record = ActivityRecord {
        kind: ActivityKind::Run,
        date: tz.local_date(start),
        logged_at: start,
        duration_secs: Some(duration.round() as u32),
        distance_miles: Some(km_to_miles(distance_km)),
        repetitions: None,
        source: ActivitySource::Imported,
        external_id: Some(external_id),
        details: Some(foreign.details()),
    };
    record
        .validate()
        .map_err(|e| AppError::ImportSource(e.to_string()))?;
    Ok(record)
}

/// Outcome of an import batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: u32,
    pub skipped: u32,
    /// One message per entry that could not be imported
    pub errors: Vec<String>,
}

/// Imports foreign activities into the store.
#[derive(Clone)]
pub struct ImportService {
    store: Arc<dyn ActivityStore>,
    timezone: LocalTimezone,
}

impl ImportService {
    pub fn new(store: Arc<dyn ActivityStore>, timezone: LocalTimezone) -> Self {
        Self { store, timezone }
    }

    /// Store `record` unless one with the same external ID exists.
    ///
    /// Returns `true` if the record was newly stored.
    pub async fn import_record(&self, record: &ActivityRecord) -> Result<bool> {
        if let Some(external_id) = record.external_id.as_deref() {
            if self.store.find_by_external_id(external_id).await?.is_some() {
                tracing::debug!(external_id, "Activity already imported (idempotent skip)");
                return Ok(false);
            }
        }

        match self.store.insert(record).await {
            Ok(()) => Ok(true),
            Err(AppError::DuplicateKey(key)) => {
                tracing::debug!(key, "Duplicate on insert (idempotent skip)");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Normalize and store raw entries, without fetching splits.
    pub async fn import_entries(&self, entries: Vec<serde_json::Value>) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();
        for entry in entries {
            self.import_entry(entry, None, &mut summary).await?;
        }
        Ok(summary)
    }

    /// Import runs from the last `days` days ending at `now`.
    ///
    /// An unreachable service fails the whole import. Individual malformed
    /// entries are skipped and listed in the summary.
    pub async fn import_from_smashrun(
        &self,
        client: &SmashrunClient,
        credentials: &SmashrunCredentials,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<ImportSummary> {
        if days < 1 {
            return Err(AppError::BadRequest(
                "days must be at least 1".to_string(),
            ));
        }
        let from = now
            .checked_sub_signed(Duration::days(i64::from(days)))
            .ok_or_else(|| {
                AppError::BadRequest(format!("days {} reaches before the calendar", days))
            })?;

        let mut access_token = credentials.access_token.clone();
        let entries = match client.list_activities(&access_token, from, now).await {
            Ok(entries) => entries,
            Err(e) if e.is_smashrun_token_error() && credentials.can_refresh() => {
                tracing::info!("Smashrun token rejected, refreshing");
                access_token = client.refresh_token(credentials).await?.access_token;
                client.list_activities(&access_token, from, now).await?
            }
            Err(e) => return Err(e),
        };

        tracing::info!(count = entries.len(), days, "Fetched Smashrun activities");

        let mut summary = ImportSummary::default();
        for entry in entries {
            self.import_entry(entry, Some((client, access_token.as_str())), &mut summary)
                .await?;
        }

        tracing::info!(
            imported = summary.imported,
            skipped = summary.skipped,
            errors = summary.errors.len(),
            "Smashrun import complete"
        );
        Ok(summary)
    }

    /// Import one entry, recording the outcome in `summary`.
    ///
    /// Only store faults are returned as errors.
    async fn import_entry(
        &self,
        entry: serde_json::Value,
        splits_source: Option<(&SmashrunClient, &str)>,
        summary: &mut ImportSummary,
    ) -> Result<()> {
        let mut record = match ForeignActivity::from_value(entry)
            .and_then(|foreign| normalize(&foreign, &self.timezone))
        {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed Smashrun entry");
                summary.errors.push(e.to_string());
                return Ok(());
            }
        };

        let external_id = record.external_id.clone().unwrap_or_default();
        if self.store.find_by_external_id(&external_id).await?.is_some() {
            summary.skipped += 1;
            return Ok(());
        }

        if let Some((client, token)) = splits_source {
            match client.get_activity_detail(token, &external_id).await {
                Ok(detail) => {
                    if let Some(details) = record.details.as_mut() {
                        details.splits = detail.to_splits();
                    }
                }
                Err(e) => {
                    tracing::warn!(external_id, error = %e, "Could not fetch split data");
                }
            }
        }

        if self.import_record(&record).await? {
            summary.imported += 1;
        } else {
            summary.skipped += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use chrono::NaiveDate;
    use serde_json::json;

    fn utc_minus_5() -> LocalTimezone {
        "UTC-5".parse().unwrap()
    }

    fn entry(id: u64, start: &str, km: f64) -> serde_json::Value {
        json!({
            "activityId": id,
            "startDateTimeUtc": start,
            "duration": 1800.0,
            "distance": km,
            "heartRateAverage": 151.4,
            "cadenceAverage": 172.0
        })
    }

    #[test]
    fn test_normalize_converts_km_and_local_date() {
        let foreign =
            ForeignActivity::from_value(entry(1, "2025-06-08T02:10:00Z", 5.0)).unwrap();
        let record = normalize(&foreign, &utc_minus_5()).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 6, 7).unwrap());
        assert_eq!(record.distance_miles, Some(3.10686));
        assert_eq!(record.duration_secs, Some(1800));
        assert_eq!(record.source, ActivitySource::Imported);
        assert_eq!(record.external_id.as_deref(), Some("1"));
        let details = record.details.unwrap();
        assert_eq!(details.heart_rate_avg, Some(151));
        assert_eq!(details.cadence_avg, Some(172));
    }

    #[test]
    fn test_normalize_treats_large_distance_as_meters() {
        let foreign =
            ForeignActivity::from_value(entry(2, "2025-06-07T12:00:00Z", 5000.0)).unwrap();
        let record = normalize(&foreign, &LocalTimezone::default()).unwrap();
        assert_eq!(record.distance_miles, Some(3.10686));
    }

    #[test]
    fn test_local_timestamp_with_offset() {
        let foreign = ForeignActivity::from_value(json!({
            "activityId": "abc",
            "startDateTimeLocal": "2025-06-07T21:10:00-05:00",
            "duration": 1200,
            "distance": 3.2
        }))
        .unwrap();
        let record = normalize(&foreign, &"Asia/Tokyo".parse().unwrap()).unwrap();
        // 02:10Z on the 8th is 11:10 on the 8th in Tokyo
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 6, 8).unwrap());
        assert_eq!(record.external_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_naive_local_timestamp_uses_configured_zone() {
        let foreign = ForeignActivity::from_value(json!({
            "activityId": 9,
            "startDateTimeLocal": "2025-06-07T21:10:00",
            "duration": 1200,
            "distance": 3.2
        }))
        .unwrap();
        let record = normalize(&foreign, &utc_minus_5()).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 6, 7).unwrap());
        assert_eq!(
            record.logged_at,
            DateTime::parse_from_rfc3339("2025-06-08T02:10:00Z").unwrap()
        );
    }

    #[test]
    fn test_malformed_entries_are_import_errors() {
        let tz = LocalTimezone::default();
        let no_distance = ForeignActivity::from_value(json!({
            "activityId": 1, "startDateTimeUtc": "2025-06-07T12:00:00Z", "duration": 100
        }))
        .unwrap();
        assert!(matches!(
            normalize(&no_distance, &tz),
            Err(AppError::ImportSource(_))
        ));

        let no_id = ForeignActivity::from_value(json!({
            "startDateTimeUtc": "2025-06-07T12:00:00Z", "duration": 100, "distance": 1.0
        }))
        .unwrap();
        assert!(matches!(normalize(&no_id, &tz), Err(AppError::ImportSource(_))));

        let bad_time = ForeignActivity::from_value(json!({
            "activityId": 1, "startDateTimeUtc": "yesterday", "duration": 100, "distance": 1.0
        }))
        .unwrap();
        assert!(matches!(
            normalize(&bad_time, &tz),
            Err(AppError::ImportSource(_))
        ));

        assert!(matches!(
            ForeignActivity::from_value(json!({"activityId": 1, "distance": "far"})),
            Err(AppError::ImportSource(_))
        ));
    }

    #[tokio::test]
    async fn test_import_entries_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let service = ImportService::new(store.clone(), utc_minus_5());
        let batch = vec![entry(10, "2025-06-07T12:00:00Z", 5.0)];

        let first = service.import_entries(batch.clone()).await.unwrap();
        assert_eq!(first.imported, 1);
        let second = service.import_entries(batch).await.unwrap();
        assert_eq!(second.imported, 0);
        assert_eq!(second.skipped, 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_import_window_past_calendar_is_bad_request() {
        let store = Arc::new(MemoryStore::new());
        let service = ImportService::new(store.clone(), LocalTimezone::default());
        // Never contacted: the window is rejected first
        let client =
            SmashrunClient::new("http://127.0.0.1:1", std::time::Duration::from_secs(1)).unwrap();
        let now = DateTime::parse_from_rfc3339("2025-06-10T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let err = service
            .import_from_smashrun(&client, &SmashrunCredentials::with_token("t"), u32::MAX, now)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)), "got {:?}", err);
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_import_entries_continues_past_bad_entry() {
        let store = Arc::new(MemoryStore::new());
        let service = ImportService::new(store.clone(), LocalTimezone::default());
        let batch = vec![
            entry(1, "2025-06-06T12:00:00Z", 5.0),
            json!({"activityId": 2, "startDateTimeUtc": "2025-06-07T12:00:00Z"}),
            entry(3, "2025-06-07T12:00:00Z", 8.0),
        ];
        let summary = service.import_entries(batch).await.unwrap();
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].contains('2'));
    }
}

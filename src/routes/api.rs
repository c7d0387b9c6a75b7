// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes (require an API key).

use crate::error::{AppError, Result};
use crate::models::{ActivityKind, ActivityRecord, ActivitySummary, PushupsTotal, Report};
use crate::services::{log_activity, ImportSummary, NewActivity, SmashrunCredentials};
use crate::time_utils::{parse_date, parse_duration};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Default window for record listings without a start date.
const DEFAULT_LIST_DAYS: i64 = 30;

/// API routes (require authentication via API key).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/runs", post(log_run).get(get_runs))
        .route("/api/pushups", post(log_pushups).get(get_pushups))
        .route("/api/pushups/total", get(get_pushups_total))
        .route("/api/activities", post(insert_activity).get(get_activities))
        .route(
            "/api/activities/external/{external_id}",
            get(get_activity_by_external_id),
        )
        .route("/api/activities/status", get(get_status))
        .route("/api/activities/report", get(get_report))
        .route("/api/activities/summary", get(get_summary))
        .route("/api/activities/import/smashrun", post(import_smashrun))
}

// ─── Logging ─────────────────────────────────────────────────

/// Body of `POST /api/runs`.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct LogRunRequest {
    /// `HH:MM:SS` or `MM:SS`
    #[validate(length(min = 1, max = 16))]
    pub duration: String,
    /// Miles
    pub distance: f64,
    /// `MM/DD/YY` or `YYYY-MM-DD`; defaults to today
    pub date: Option<String>,
}

/// Body of `POST /api/pushups`.
#[derive(Debug, Deserialize, Serialize)]
pub struct LogPushupsRequest {
    pub count: u32,
    pub date: Option<String>,
}

fn optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.filter(|s| !s.trim().is_empty())
        .map(parse_date)
        .transpose()
}

async fn log_run(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LogRunRequest>,
) -> Result<(StatusCode, Json<ActivityRecord>)> {
    payload.validate()?;
    let activity = NewActivity::Run {
        duration_secs: parse_duration(&payload.duration)?,
        distance_miles: payload.distance,
    };
    let record = log_activity(
        state.store.as_ref(),
        activity,
        optional_date(payload.date.as_deref())?,
        &state.config.timezone,
        Utc::now(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn log_pushups(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LogPushupsRequest>,
) -> Result<(StatusCode, Json<ActivityRecord>)> {
    let record = log_activity(
        state.store.as_ref(),
        NewActivity::Pushups {
            count: payload.count,
        },
        optional_date(payload.date.as_deref())?,
        &state.config.timezone,
        Utc::now(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

// ─── Records ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub kind: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl RangeQuery {
    /// Resolve the range, defaulting to the last 30 days ending today.
    fn resolve(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        let end = optional_date(self.end_date.as_deref())?.unwrap_or(today);
        let start = match optional_date(self.start_date.as_deref())? {
            Some(start) => start,
            None => end - Duration::days(DEFAULT_LIST_DAYS - 1),
        };
        if start > end {
            return Err(AppError::BadRequest(
                "start_date must not be after end_date".to_string(),
            ));
        }
        Ok((start, end))
    }
}

async fn list_records(
    state: &AppState,
    kind: ActivityKind,
    range: &RangeQuery,
) -> Result<Json<Vec<ActivityRecord>>> {
    let (start, end) = range.resolve(state.config.timezone.today())?;
    tracing::debug!(kind = %kind, %start, %end, "Listing records");
    Ok(Json(state.store.query(kind, start, end).await?))
}

async fn get_runs(
    State(state): State<Arc<AppState>>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<ActivityRecord>>> {
    list_records(&state, ActivityKind::Run, &range).await
}

async fn get_pushups(
    State(state): State<Arc<AppState>>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<ActivityRecord>>> {
    list_records(&state, ActivityKind::Pushups, &range).await
}

async fn get_activities(
    State(state): State<Arc<AppState>>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<ActivityRecord>>> {
    let kind: ActivityKind = range
        .kind
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("kind is required".to_string()))?
        .parse()?;
    list_records(&state, kind, &range).await
}

/// Store a complete record as sent by a remote client.
async fn insert_activity(
    State(state): State<Arc<AppState>>,
    Json(record): Json<ActivityRecord>,
) -> Result<(StatusCode, Json<ActivityRecord>)> {
    record.validate()?;
    state.store.insert(&record).await?;
    tracing::info!(
        kind = %record.kind,
        date = %record.date,
        external_id = ?record.external_id,
        "Stored remote record"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_activity_by_external_id(
    State(state): State<Arc<AppState>>,
    Path(external_id): Path<String>,
) -> Result<Json<ActivityRecord>> {
    state
        .store
        .find_by_external_id(&external_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Activity {}", external_id)))
}

// ─── Reports ─────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct ReportQuery {
    #[serde(default = "default_report_days")]
    #[validate(range(min = 1, max = 3660))]
    pub days: u32,
    pub kind: Option<String>,
    /// Last day of the window; defaults to today
    pub as_of: Option<String>,
}

fn default_report_days() -> u32 {
    7
}

impl ReportQuery {
    fn as_of(&self, state: &AppState) -> Result<NaiveDate> {
        Ok(optional_date(self.as_of.as_deref())?.unwrap_or_else(|| state.config.timezone.today()))
    }
}

async fn get_status(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportQuery>,
) -> Result<Json<Report>> {
    params.validate()?;
    let as_of = params.as_of(&state)?;
    Ok(Json(state.reports.build_status(params.days, as_of).await?))
}

async fn get_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportQuery>,
) -> Result<Json<Report>> {
    params.validate()?;
    let as_of = params.as_of(&state)?;
    let report = match params.kind.as_deref() {
        Some(kind) => {
            state
                .reports
                .build_report(kind.parse()?, params.days, as_of)
                .await?
        }
        None => state.reports.build_status(params.days, as_of).await?,
    };
    Ok(Json(report))
}

async fn get_summary(State(state): State<Arc<AppState>>) -> Result<Json<ActivitySummary>> {
    Ok(Json(state.reports.build_summary().await?))
}

async fn get_pushups_total(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportQuery>,
) -> Result<Json<PushupsTotal>> {
    params.validate()?;
    let as_of = params.as_of(&state)?;
    Ok(Json(state.reports.pushups_total(params.days, as_of).await?))
}

// ─── Import ──────────────────────────────────────────────────

/// Body of `POST /api/activities/import/smashrun`.
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct ImportRequest {
    /// Overrides the server's configured token
    #[validate(length(min = 1))]
    pub access_token: Option<String>,
    #[serde(default = "default_import_days")]
    #[validate(range(min = 1, max = 3660))]
    pub days: u32,
}

fn default_import_days() -> u32 {
    30
}

async fn import_smashrun(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ImportRequest>,
) -> Result<Json<ImportSummary>> {
    payload.validate()?;

    let credentials = match payload.access_token {
        Some(token) => SmashrunCredentials::with_token(token),
        None => state.config.smashrun_credentials().ok_or_else(|| {
            AppError::BadRequest("No Smashrun access token provided".to_string())
        })?,
    };

    tracing::info!(days = payload.days, "Starting Smashrun import");
    let summary = state
        .imports
        .import_from_smashrun(&state.smashrun, &credentials, payload.days, Utc::now())
        .await?;
    Ok(Json(summary))
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Smashrun API client for fetching runs to import.
//!
//! Handles:
//! - Activity search over a date range
//! - Activity detail (per-mile splits)
//! - Token refresh when expired
//! - Rate limit and bad-token detection

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::AppError;

pub const DEFAULT_API_URL: &str = "https://api.smashrun.com/v1";
pub const DEFAULT_AUTH_URL: &str = "https://secure.smashrun.com/oauth2";

/// Credentials for one Smashrun account.
#[derive(Debug, Clone, Default)]
pub struct SmashrunCredentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl SmashrunCredentials {
    pub fn with_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Default::default()
        }
    }

    /// Whether an expired access token can be refreshed.
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some() && self.client_id.is_some() && self.client_secret.is_some()
    }
}

/// Smashrun API client.
#[derive(Clone)]
pub struct SmashrunClient {
    http: reqwest::Client,
    base_url: String,
    auth_url: String,
}

impl SmashrunClient {
    /// Create a client against `base_url`; every request is bounded by `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client: {}", e)))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            auth_url: DEFAULT_AUTH_URL.to_string(),
            base_url,
        })
    }

    /// Override the OAuth endpoint (tests point this at a mock server).
    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Search activities that started within `[from, to]`.
    ///
    /// Entries are returned raw so one malformed entry does not sink the batch.
    pub async fn list_activities(
        &self,
        access_token: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<serde_json::Value>, AppError> {
        let url = format!("{}/my/activities/search", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("fromDateUTC", from.timestamp().to_string()),
                ("toDateUTC", to.timestamp().to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::ImportSource(format!("Smashrun unreachable: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Get one activity with its splits.
    pub async fn get_activity_detail(
        &self,
        access_token: &str,
        activity_id: &str,
    ) -> Result<SmashrunActivityDetail, AppError> {
        let url = format!(
            "{}/my/activities/{}",
            self.base_url,
            urlencoding::encode(activity_id)
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AppError::ImportSource(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Refresh an expired access token.
    pub async fn refresh_token(
        &self,
        credentials: &SmashrunCredentials,
    ) -> Result<TokenRefreshResponse, AppError> {
        let (Some(refresh_token), Some(client_id), Some(client_secret)) = (
            credentials.refresh_token.as_deref(),
            credentials.client_id.as_deref(),
            credentials.client_secret.as_deref(),
        ) else {
            return Err(AppError::ImportSource(
                AppError::SMASHRUN_TOKEN_ERROR.to_string(),
            ));
        };

        let response = self
            .http
            .post(format!("{}/token", self.auth_url))
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::ImportSource(format!("Token refresh request failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Smashrun rate limit hit (429)");
                return Err(AppError::ImportSource(
                    AppError::SMASHRUN_RATE_LIMIT.to_string(),
                ));
            }

            if status.as_u16() == 401 {
                return Err(AppError::ImportSource(
                    AppError::SMASHRUN_TOKEN_ERROR.to_string(),
                ));
            }

            return Err(AppError::ImportSource(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ImportSource(format!("JSON parse error: {}", e)))
    }
}

/// Token refresh response from Smashrun.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

/// Activity detail; only the splits are used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmashrunActivityDetail {
    #[serde(default)]
    pub splits: Vec<SmashrunSplit>,
}

/// One split as reported by Smashrun.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmashrunSplit {
    /// Seconds
    pub duration: Option<f64>,
    /// Seconds per mile
    pub pace: Option<f64>,
    pub heart_rate: Option<f64>,
    pub cadence: Option<f64>,
}

impl SmashrunActivityDetail {
    /// Convert to stored splits, numbered from 1.
    pub fn to_splits(&self) -> Vec<crate::models::Split> {
        self.splits
            .iter()
            .enumerate()
            .map(|(i, s)| crate::models::Split {
                mile_number: i as u32 + 1,
                duration_secs: s.duration.unwrap_or(0.0).max(0.0) as u32,
                pace_secs: s.pace.unwrap_or(0.0).max(0.0) as u32,
                heart_rate_avg: s.heart_rate.map(|v| v.round() as u32),
                cadence_avg: s.cadence.map(|v| v.round() as u32),
            })
            .collect()
    }
}

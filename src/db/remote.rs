// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Store that forwards to a deployed fitlog API.
//!
//! Used by the CLI in cloud mode. Every request carries the `X-API-Key`
//! header and is bounded by the configured timeout; failures are not retried.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::db::ActivityStore;
use crate::error::{AppError, Result};
use crate::middleware::auth::API_KEY_HEADER;
use crate::models::{ActivityKind, ActivityRecord};

/// HTTP client for the fitlog API's record endpoints.
#[derive(Clone)]
pub struct RemoteStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RemoteStore {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        request
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::Database(format!("Remote store request failed: {}", e)))
    }

    /// Map non-success statuses to errors and parse JSON bodies.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED => AppError::Unauthorized,
                StatusCode::CONFLICT => AppError::DuplicateKey(body),
                StatusCode::BAD_REQUEST => AppError::BadRequest(body),
                _ => AppError::Database(format!("Remote store HTTP {}: {}", status, body)),
            });
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Database(format!("Remote store JSON parse error: {}", e)))
    }
}

#[async_trait]
impl ActivityStore for RemoteStore {
    async fn insert(&self, record: &ActivityRecord) -> Result<()> {
        let response = self
            .send(self.http.post(self.url("/activities")).json(record))
            .await?;
        let _: ActivityRecord = self.check_response_json(response).await?;
        Ok(())
    }

    async fn query(
        &self,
        kind: ActivityKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ActivityRecord>> {
        let response = self
            .send(self.http.get(self.url("/activities")).query(&[
                ("kind", kind.as_str().to_string()),
                ("start_date", start.format("%Y-%m-%d").to_string()),
                ("end_date", end.format("%Y-%m-%d").to_string()),
            ]))
            .await?;
        let mut records: Vec<ActivityRecord> = self.check_response_json(response).await?;
        crate::db::sort_records(&mut records);
        Ok(records)
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<ActivityRecord>> {
        let path = format!("/activities/external/{}", urlencoding::encode(external_id));
        let response = self.send(self.http.get(self.url(&path))).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.check_response_json(response).await.map(Some)
    }

    async fn clear(&self) -> Result<usize> {
        Err(AppError::BadRequest(
            "Clearing the cloud store is not supported".to_string(),
        ))
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API key authentication middleware.

use crate::config::api_key_digest;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Middleware that requires a valid `X-API-Key` header.
///
/// The presented key is hashed and compared with the configured digest in
/// constant time.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let expected = state
        .config
        .api_key_digest
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let digest = api_key_digest(presented);
    if !bool::from(digest.ct_eq(&expected)) {
        tracing::warn!("Rejected request with invalid API key");
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(request).await)
}

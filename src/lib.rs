// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! fitlog: a personal log of runs and pushups.
//!
//! This crate provides the progress/reporting engine (pace, streaks, goal
//! attainment, time-windowed reports), the Smashrun importer, the storage
//! backends and the HTTP API served by `fitlog-api`.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use db::ActivityStore;
use error::Result;
use services::{ImportService, ReportBuilder, SmashrunClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ActivityStore>,
    pub reports: ReportBuilder,
    pub imports: ImportService,
    pub smashrun: SmashrunClient,
}

impl AppState {
    /// Wire services around `store` using `config`.
    pub fn new(config: Config, store: Arc<dyn ActivityStore>) -> Result<Self> {
        let smashrun = SmashrunClient::new(&config.smashrun.api_url, config.request_timeout)?;
        Ok(Self {
            reports: ReportBuilder::new(store.clone(), config.goals.clone()),
            imports: ImportService::new(store.clone(), config.timezone),
            smashrun,
            store,
            config,
        })
    }
}

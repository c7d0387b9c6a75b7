// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activity;
pub mod goals;
pub mod import;
pub mod metrics;
pub mod report;
pub mod smashrun;

pub use activity::{log_activity, NewActivity};
pub use import::{normalize, ForeignActivity, ImportService, ImportSummary};
pub use report::ReportBuilder;
pub use smashrun::{SmashrunClient, SmashrunCredentials};

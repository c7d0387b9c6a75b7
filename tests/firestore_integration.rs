// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running, with
//! FIRESTORE_EMULATOR_HOST set. Without it they return early.
//!
//! The emulator is shared between tests, so each test works on its own
//! date range and external IDs.

use chrono::{NaiveDate, TimeZone, Utc};
use fitlog::db::{ActivityStore, FirestoreDb};
use fitlog::error::AppError;
use fitlog::models::{ActivityKind, ActivityRecord, ActivitySource};

mod common;
use common::test_db;

/// Unique value for test isolation.
fn unique_suffix() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos() as u64
}

/// A year no other test writes to.
fn unique_year() -> i32 {
    2100 + (unique_suffix() % 7000) as i32
}

fn run_on(date: NaiveDate, miles: f64) -> ActivityRecord {
    let at = Utc.from_utc_datetime(&date.and_hms_opt(7, 0, 0).unwrap());
    ActivityRecord::run(date, at, 1800, miles).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// ACTIVITY TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_insert_and_query_range() {
    require_emulator!();

    let db = test_db().await;
    let year = unique_year();
    let d = |m, d| NaiveDate::from_ymd_opt(year, m, d).unwrap();

    db.insert(&run_on(d(3, 2), 3.0)).await.unwrap();
    db.insert(&run_on(d(3, 1), 4.0)).await.unwrap();
    db.insert(&run_on(d(4, 1), 5.0)).await.unwrap();

    let march = db.query(ActivityKind::Run, d(3, 1), d(3, 31)).await.unwrap();
    assert_eq!(march.len(), 2, "April run must be outside the range");
    assert_eq!(march[0].date, d(3, 1));
    assert_eq!(march[1].date, d(3, 2));

    let pushups = db
        .query(ActivityKind::Pushups, d(3, 1), d(3, 31))
        .await
        .unwrap();
    assert!(pushups.is_empty());
}

#[tokio::test]
async fn test_imported_record_is_unique() {
    require_emulator!();

    let db = test_db().await;
    let external_id = format!("smashrun-{}", unique_suffix());

    let mut record = run_on(NaiveDate::from_ymd_opt(unique_year(), 5, 5).unwrap(), 6.0);
    record.source = ActivitySource::Imported;
    record.external_id = Some(external_id.clone());

    assert!(db.find_by_external_id(&external_id).await.unwrap().is_none());

    db.insert(&record).await.unwrap();
    let err = db.insert(&record).await.unwrap_err();
    assert!(
        matches!(err, AppError::DuplicateKey(_)),
        "Second insert should conflict, got {:?}",
        err
    );

    let found = db.find_by_external_id(&external_id).await.unwrap();
    assert_eq!(found, Some(record));
}

#[tokio::test]
async fn test_offline_db_reports_database_error() {
    let db = FirestoreDb::new_mock();
    let err = db
        .query(
            ActivityKind::Run,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Database(_)));
}

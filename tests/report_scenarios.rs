// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end report tests: log through the API, then read reports back.

use axum::http::StatusCode;
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;
use common::{body_json, get, post_json};

async fn send(app: &axum::Router, request: axum::http::Request<axum::body::Body>) -> Value {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = body_json(response).await;
    assert!(status.is_success(), "unexpected {}: {}", status, body);
    body
}

fn kind_section<'a>(report: &'a Value, kind: &str) -> &'a Value {
    report["kinds"]
        .as_array()
        .unwrap()
        .iter()
        .find(|k| k["kind"] == kind)
        .unwrap()
}

#[tokio::test]
async fn test_pushups_below_threshold_break_streak() {
    let (app, _) = common::create_test_app();

    send(&app, post_json("/api/pushups", json!({"count": 120, "date": "06/01/25"}))).await;
    send(&app, post_json("/api/pushups", json!({"count": 80, "date": "06/02/25"}))).await;

    let report = send(
        &app,
        get("/api/activities/report?days=2&kind=pushups&as_of=2025-06-02"),
    )
    .await;

    assert_eq!(report["window_start"], "2025-06-01");
    assert_eq!(report["window_end"], "2025-06-02");
    let pushups = kind_section(&report, "pushups");
    assert_eq!(pushups["days_met_goal"], 1);
    assert_eq!(pushups["current_streak"], 0);
    assert_eq!(pushups["longest_streak"], 1);
    assert_eq!(pushups["totals"]["repetitions"], 200);
    assert_eq!(pushups["totals"]["average_repetitions"], 100.0);
}

#[tokio::test]
async fn test_sets_on_one_day_add_up() {
    let (app, _) = common::create_test_app();

    send(&app, post_json("/api/pushups", json!({"count": 60, "date": "2025-06-03"}))).await;
    send(&app, post_json("/api/pushups", json!({"count": 40, "date": "2025-06-03"}))).await;

    let report = send(
        &app,
        get("/api/activities/report?days=1&kind=pushups&as_of=2025-06-03"),
    )
    .await;

    assert_eq!(report["period"], "day");
    let pushups = kind_section(&report, "pushups");
    assert_eq!(pushups["days"][0]["total_repetitions"], 100);
    assert_eq!(pushups["days"][0]["sessions"], 2);
    assert_eq!(pushups["days_met_goal"], 1);
    assert_eq!(pushups["current_streak"], 1);
}

#[tokio::test]
async fn test_weekly_run_report() {
    let (app, _) = common::create_test_app();

    for (date, duration, distance) in [
        ("2025-06-05", "00:30:00", 3.0),
        ("2025-06-06", "45:00", 4.5),
        ("2025-06-07", "1:00:00", 6.0),
    ] {
        send(
            &app,
            post_json(
                "/api/runs",
                json!({"duration": duration, "distance": distance, "date": date}),
            ),
        )
        .await;
    }
    // Outside the window
    send(
        &app,
        post_json(
            "/api/runs",
            json!({"duration": "20:00", "distance": 2.0, "date": "2025-05-31"}),
        ),
    )
    .await;

    let report = send(
        &app,
        get("/api/activities/report?days=7&kind=run&as_of=2025-06-07"),
    )
    .await;

    assert_eq!(report["period"], "week");
    assert_eq!(report["window_start"], "2025-06-01");
    let runs = kind_section(&report, "run");
    assert_eq!(runs["days"].as_array().unwrap().len(), 7);
    assert_eq!(runs["days_met_goal"], 3);
    assert_eq!(runs["current_streak"], 3);
    assert_eq!(runs["totals"]["sessions"], 3);
    assert_eq!(runs["totals"]["distance_miles"], 13.5);
    // 8100 s over 13.5 mi
    assert_eq!(runs["totals"]["average_pace"], 600.0);
    assert_eq!(runs["totals"]["average_distance_miles"], 4.5);
    // Manually logged runs carry no heart rate or cadence
    assert_eq!(runs["totals"]["average_heart_rate"], Value::Null);
    assert_eq!(runs["totals"]["average_cadence"], Value::Null);
    assert_eq!(runs["records"]["longest"]["date"], "2025-06-07");

    let week = runs["periods"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["period"] == "week")
        .unwrap();
    assert_eq!(week["days_met"], 3);
    assert_eq!(week["expected_days"], 7);
    assert_eq!(week["on_track"], false);
}

#[tokio::test]
async fn test_status_covers_every_kind() {
    let (app, _) = common::create_test_app();

    send(
        &app,
        post_json(
            "/api/runs",
            json!({"duration": "00:30:00", "distance": 3.0, "date": "2025-06-07"}),
        ),
    )
    .await;

    let report = send(&app, get("/api/activities/status?as_of=2025-06-07")).await;

    assert_eq!(report["window_days"], 7);
    assert_eq!(report["kinds"].as_array().unwrap().len(), 2);
    assert_eq!(kind_section(&report, "run")["current_streak"], 1);
    assert_eq!(kind_section(&report, "pushups")["current_streak"], 0);
}

#[tokio::test]
async fn test_empty_window_reports_zeros() {
    let (app, _) = common::create_test_app();

    let report = send(
        &app,
        get("/api/activities/report?days=30&kind=run&as_of=2025-06-30"),
    )
    .await;

    let runs = kind_section(&report, "run");
    assert_eq!(runs["days"].as_array().unwrap().len(), 30);
    assert_eq!(runs["days_met_goal"], 0);
    assert_eq!(runs["totals"]["average_pace"], Value::Null);
}

#[tokio::test]
async fn test_logged_runs_are_listed_in_date_order() {
    let (app, _) = common::create_test_app();

    for date in ["2025-06-03", "2025-06-01", "2025-06-02"] {
        send(
            &app,
            post_json(
                "/api/runs",
                json!({"duration": "30:00", "distance": 3.0, "date": date}),
            ),
        )
        .await;
    }

    let response = app
        .clone()
        .oneshot(get("/api/runs?start_date=2025-06-01&end_date=2025-06-03"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let runs = body_json(response).await;
    let dates: Vec<&str> = runs
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, ["2025-06-01", "2025-06-02", "2025-06-03"]);
}

#[tokio::test]
async fn test_all_time_summary() {
    let (app, _) = common::create_test_app();

    let empty = send(&app, get("/api/activities/summary")).await;
    assert_eq!(empty["total_runs"], 0);
    assert_eq!(empty["first_activity_date"], Value::Null);
    assert_eq!(empty["total_days_active"], 0);

    send(
        &app,
        post_json(
            "/api/runs",
            json!({"duration": "30:00", "distance": 3.0, "date": "2024-12-30"}),
        ),
    )
    .await;
    send(&app, post_json("/api/pushups", json!({"count": 50, "date": "2024-12-30"}))).await;
    send(&app, post_json("/api/pushups", json!({"count": 70, "date": "2025-06-02"}))).await;

    let summary = send(&app, get("/api/activities/summary")).await;
    assert_eq!(summary["total_runs"], 1);
    assert_eq!(summary["total_distance_miles"], 3.0);
    assert_eq!(summary["total_run_duration_secs"], 1800);
    assert_eq!(summary["total_pushup_sessions"], 2);
    assert_eq!(summary["total_pushups"], 120);
    assert_eq!(summary["first_activity_date"], "2024-12-30");
    assert_eq!(summary["last_activity_date"], "2025-06-02");
    assert_eq!(summary["total_days_active"], 2);
}

#[tokio::test]
async fn test_pushups_total_over_window() {
    let (app, _) = common::create_test_app();

    for (count, date) in [(100, "2025-06-01"), (30, "2025-06-06"), (40, "2025-06-07")] {
        send(&app, post_json("/api/pushups", json!({"count": count, "date": date}))).await;
    }

    let total = send(&app, get("/api/pushups/total?days=2&as_of=2025-06-07")).await;
    assert_eq!(total["period_days"], 2);
    assert_eq!(total["window_start"], "2025-06-06");
    assert_eq!(total["total_pushups"], 70);
    assert_eq!(total["sessions"], 2);
    assert_eq!(total["average_per_day"], 35.0);

    // Defaults to the last seven days
    let week = send(&app, get("/api/pushups/total?as_of=2025-06-07")).await;
    assert_eq!(week["period_days"], 7);
    assert_eq!(week["total_pushups"], 170);

    let response = app
        .clone()
        .oneshot(get("/api/pushups/total?days=0"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

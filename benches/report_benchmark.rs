use chrono::{Duration, NaiveDate, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use fitlog::models::{ActivityKind, ActivityRecord, GoalDefinition};
use fitlog::services::report::assemble_kind_report;

/// A year of daily runs, with a second run every third day.
fn year_of_runs(end: NaiveDate) -> Vec<ActivityRecord> {
    let mut records = Vec::new();
    for offset in 0..365 {
        let date = end - Duration::days(offset);
        let at = Utc.from_utc_datetime(&date.and_hms_opt(7, 0, 0).unwrap());
        let miles = 3.0 + (offset % 5) as f64;
        records.push(ActivityRecord::run(date, at, (miles * 570.0) as u32, miles).unwrap());
        if offset % 3 == 0 {
            let evening = at + Duration::hours(11);
            records.push(ActivityRecord::run(date, evening, 1200, 2.0).unwrap());
        }
    }
    records.sort_by_key(|r| (r.date, r.logged_at));
    records
}

fn benchmark_reports(c: &mut Criterion) {
    let end = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
    let records = year_of_runs(end);
    let goal = GoalDefinition::default_for(ActivityKind::Run);

    let mut group = c.benchmark_group("run_reports");

    for days in [7i64, 30, 365] {
        let start = end - Duration::days(days - 1);
        let in_window: Vec<ActivityRecord> = records
            .iter()
            .filter(|r| r.date >= start)
            .cloned()
            .collect();
        group.bench_function(format!("window_{}_days", days), |b| {
            b.iter(|| assemble_kind_report(black_box(&goal), start, end, black_box(&in_window)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_reports);
criterion_main!(benches);

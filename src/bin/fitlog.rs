// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! fitlog command-line client.
//!
//! Logs runs and pushups and prints progress reports, against the local
//! JSON store or (with `FITLOG_USE_CLOUD=true`) the deployed API.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fitlog::config::Config;
use fitlog::db::{ActivityStore, LocalStore, RemoteStore};
use fitlog::models::{ActivityKind, ActivitySummary, KindReport, Report, RunHighlight};
use fitlog::services::{
    log_activity, ImportService, NewActivity, ReportBuilder, SmashrunClient, SmashrunCredentials,
};
use fitlog::time_utils::{format_duration, parse_date, parse_duration, CLI_DATE_FORMAT};

/// Longest window accepted by `--days`, matching the API.
const MAX_WINDOW_DAYS: i64 = 3660;

#[derive(Parser)]
#[command(name = "fitlog", version, about = "Log runs and pushups, track streaks and goals")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log a run
    LogRun {
        /// Duration as HH:MM:SS or MM:SS
        #[arg(short = 't', long)]
        duration: String,
        /// Distance in miles
        #[arg(short, long)]
        distance: f64,
        /// Date as MM/DD/YY (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Log a set of pushups
    LogPushups {
        #[arg(short, long)]
        count: u32,
        /// Date as MM/DD/YY (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show recent activity and goal progress for every kind
    Status {
        #[arg(
            long,
            default_value_t = 7,
            value_parser = clap::value_parser!(u32).range(1..=MAX_WINDOW_DAYS)
        )]
        days: u32,
    },
    /// Report on one kind (7 = week, 30 = month, 365 = year)
    Report {
        #[arg(
            long,
            default_value_t = 7,
            value_parser = clap::value_parser!(u32).range(1..=MAX_WINDOW_DAYS)
        )]
        days: u32,
        #[arg(long, default_value = "run")]
        kind: String,
    },
    /// Show all-time totals
    Summary,
    /// List runs in a date range
    GetRuns {
        /// Start date as MM/DD/YY (defaults to 30 days ago)
        #[arg(long)]
        start: Option<String>,
        /// End date as MM/DD/YY (defaults to today)
        #[arg(long)]
        end: Option<String>,
    },
    /// Import runs from Smashrun
    ImportSmashrun {
        #[arg(
            long,
            default_value_t = 30,
            value_parser = clap::value_parser!(u32).range(1..=MAX_WINDOW_DAYS)
        )]
        days: u32,
        /// Access token (defaults to SMASHRUN_ACCESS_TOKEN)
        #[arg(long)]
        token: Option<String>,
    },
    /// Delete every stored record
    DropDb {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },
    /// Show the effective configuration
    ConfigShow,
}

fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    let default_filter = if config.debug { "fitlog=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async { run(cli.command, config).await })
}

async fn open_store(config: &Config) -> Result<Arc<dyn ActivityStore>> {
    if config.use_cloud {
        let api_key = config.require_api_key()?;
        tracing::debug!(url = %config.api_url, "Using cloud store");
        Ok(Arc::new(RemoteStore::new(
            &config.api_url,
            api_key,
            config.request_timeout,
        )?))
    } else {
        Ok(Arc::new(LocalStore::open(&config.local_db_path).await?))
    }
}

async fn run(command: Command, config: Config) -> Result<()> {
    if let Command::ConfigShow = command {
        print!("{}", render_config(&config));
        return Ok(());
    }

    let store = open_store(&config).await?;
    let today = config.timezone.today();

    match command {
        Command::LogRun {
            duration,
            distance,
            date,
        } => {
            let activity = NewActivity::Run {
                duration_secs: parse_duration(&duration)?,
                distance_miles: distance,
            };
            let date = date.as_deref().map(parse_date).transpose()?;
            let record =
                log_activity(store.as_ref(), activity, date, &config.timezone, Utc::now()).await?;
            let pace = record.pace().map(|p| p.display()).unwrap_or_default();
            println!(
                "Logged run: {:.2} mi in {} ({} /mi) on {}",
                record.distance_miles.unwrap_or_default(),
                duration,
                pace,
                record.date.format(CLI_DATE_FORMAT)
            );
        }
        Command::LogPushups { count, date } => {
            let date = date.as_deref().map(parse_date).transpose()?;
            let record = log_activity(
                store.as_ref(),
                NewActivity::Pushups { count },
                date,
                &config.timezone,
                Utc::now(),
            )
            .await?;
            println!(
                "Logged {} pushups on {}",
                count,
                record.date.format(CLI_DATE_FORMAT)
            );
        }
        Command::Status { days } => {
            let report = ReportBuilder::new(store, config.goals.clone())
                .build_status(days, today)
                .await?;
            print!("{}", render_report(&report));
        }
        Command::Report { days, kind } => {
            let kind: ActivityKind = kind.parse()?;
            let report = ReportBuilder::new(store, config.goals.clone())
                .build_report(kind, days, today)
                .await?;
            print!("{}", render_report(&report));
        }
        Command::Summary => {
            let summary = ReportBuilder::new(store, config.goals.clone())
                .build_summary()
                .await?;
            print!("{}", render_summary(&summary));
        }
        Command::GetRuns { start, end } => {
            let end = end.as_deref().map(parse_date).transpose()?.unwrap_or(today);
            let start = start
                .as_deref()
                .map(parse_date)
                .transpose()?
                .unwrap_or(end - chrono::Duration::days(29));
            let runs = store.query(ActivityKind::Run, start, end).await?;
            if runs.is_empty() {
                println!("No runs between {} and {}", start, end);
            }
            for run in runs {
                println!(
                    "{}  {:>7.2} mi  {}  {} /mi{}",
                    run.date.format(CLI_DATE_FORMAT),
                    run.distance_miles.unwrap_or_default(),
                    format_duration(u64::from(run.duration_secs.unwrap_or_default())),
                    run.pace().map(|p| p.display()).unwrap_or_default(),
                    run.external_id
                        .as_deref()
                        .map(|id| format!("  (smashrun {})", id))
                        .unwrap_or_default()
                );
            }
        }
        Command::ImportSmashrun { days, token } => {
            let credentials = match token {
                Some(token) => SmashrunCredentials::with_token(token),
                None => match config.smashrun_credentials() {
                    Some(credentials) => credentials,
                    None => bail!("No Smashrun token: pass --token or set SMASHRUN_ACCESS_TOKEN"),
                },
            };
            let client = SmashrunClient::new(&config.smashrun.api_url, config.request_timeout)?;
            let summary = ImportService::new(store, config.timezone)
                .import_from_smashrun(&client, &credentials, days, Utc::now())
                .await?;
            println!(
                "Imported {} runs, skipped {} already stored",
                summary.imported, summary.skipped
            );
            for error in &summary.errors {
                println!("  error: {}", error);
            }
        }
        Command::DropDb { yes } => {
            if !yes {
                bail!("Refusing to delete every record without --yes");
            }
            let count = store.clear().await?;
            println!("Deleted {} records", count);
        }
        Command::ConfigShow => unreachable!("handled above"),
    }

    Ok(())
}

fn render_config(config: &Config) -> String {
    let mut out = String::new();
    let mode = if config.use_cloud { "cloud" } else { "local" };
    let _ = writeln!(out, "mode:            {}", mode);
    let _ = writeln!(out, "api url:         {}", config.api_url);
    let _ = writeln!(
        out,
        "api key:         {}",
        if config.api_key.is_some() { "set" } else { "not set" }
    );
    let _ = writeln!(out, "local db:        {}", config.local_db_path.display());
    let _ = writeln!(out, "timezone:        {}", config.timezone);
    let _ = writeln!(out, "request timeout: {}s", config.request_timeout.as_secs());
    for kind in ActivityKind::ALL {
        let goal = config.goals.for_kind(kind);
        let _ = writeln!(
            out,
            "{:<16} {} on {}/wk, {}/mo, {}/yr",
            format!("{} goal:", kind),
            goal.threshold,
            goal.required_days.week,
            goal.required_days.month,
            goal.required_days.year
        );
    }
    out
}

fn render_summary(summary: &ActivitySummary) -> String {
    let date = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.format(CLI_DATE_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    let mut out = String::new();
    let _ = writeln!(
        out,
        "runs:        {} ({:.2} mi, {})",
        summary.total_runs,
        summary.total_distance_miles,
        format_duration(summary.total_run_duration_secs)
    );
    let _ = writeln!(
        out,
        "pushups:     {} in {} sessions",
        summary.total_pushups, summary.total_pushup_sessions
    );
    let _ = writeln!(out, "active days: {}", summary.total_days_active);
    let _ = writeln!(
        out,
        "first/last:  {} / {}",
        date(summary.first_activity_date),
        date(summary.last_activity_date)
    );
    out
}

fn render_report(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} days: {} to {}",
        report.window_days,
        report.window_start.format(CLI_DATE_FORMAT),
        report.window_end.format(CLI_DATE_FORMAT)
    );
    for section in &report.kinds {
        out.push('\n');
        render_kind(&mut out, section);
    }
    out
}

fn render_kind(out: &mut String, section: &KindReport) {
    let _ = writeln!(out, "== {} ({}) ==", section.kind, section.threshold);
    for day in section.days.iter().filter(|d| d.sessions > 0) {
        let _ = match section.kind {
            ActivityKind::Run => writeln!(
                out,
                "  {}  {:>6.2} mi  {}  {} /mi",
                day.date.format(CLI_DATE_FORMAT),
                day.total_distance_miles,
                format_duration(day.total_duration_secs),
                day.average_pace.map(|p| p.display()).unwrap_or_default()
            ),
            ActivityKind::Pushups => writeln!(
                out,
                "  {}  {:>5} reps",
                day.date.format(CLI_DATE_FORMAT),
                day.total_repetitions
            ),
        };
    }

    let totals = &section.totals;
    let _ = match section.kind {
        ActivityKind::Run => writeln!(
            out,
            "  total: {} runs, {:.2} mi, avg pace {}",
            totals.sessions,
            totals.distance_miles,
            totals
                .average_pace
                .map(|p| p.display())
                .unwrap_or_else(|| "-".to_string())
        ),
        ActivityKind::Pushups => writeln!(
            out,
            "  total: {} sessions, {} pushups",
            totals.sessions, totals.repetitions
        ),
    };
    let mut averages = Vec::new();
    if let Some(miles) = totals.average_distance_miles {
        averages.push(format!("{:.2} mi/run", miles));
    }
    if let Some(reps) = totals.average_repetitions {
        averages.push(format!("{:.1} per session", reps));
    }
    if let Some(hr) = totals.average_heart_rate {
        averages.push(format!("HR {} bpm", hr));
    }
    if let Some(cadence) = totals.average_cadence {
        averages.push(format!("cadence {} spm", cadence));
    }
    if !averages.is_empty() {
        let _ = writeln!(out, "  average: {}", averages.join(", "));
    }
    let _ = writeln!(
        out,
        "  goal met on {} of {} days, current streak {}, longest {}",
        section.days_met_goal,
        section.days.len(),
        section.current_streak,
        section.longest_streak
    );
    for period in &section.periods {
        let _ = writeln!(
            out,
            "  {:?}: {} of {} expected days{}",
            period.period,
            period.days_met,
            period.expected_days,
            if period.on_track { "" } else { " (behind)" }
        );
    }

    if let Some(records) = &section.records {
        let line = |label: &str, h: &Option<RunHighlight>| match h {
            Some(h) => format!(
                "  {}: {:.2} mi on {} ({} /mi{})\n",
                label,
                h.distance_miles,
                h.date.format(CLI_DATE_FORMAT),
                h.pace.map(|p| p.display()).unwrap_or_default(),
                h.cadence_avg
                    .map(|c| format!(", {} spm", c))
                    .unwrap_or_default()
            ),
            None => String::new(),
        };
        out.push_str(&line("fastest", &records.fastest));
        out.push_str(&line("longest", &records.longest));
        out.push_str(&line("highest cadence", &records.highest_cadence));
    }
}

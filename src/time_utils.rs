// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time parsing and formatting.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Date format used by the command line ("06/07/25").
pub const CLI_DATE_FORMAT: &str = "%m/%d/%y";

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a user supplied date, either `MM/DD/YY` or ISO `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, CLI_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .map_err(|_| {
            AppError::BadRequest(format!(
                "Invalid date '{}': expected MM/DD/YY or YYYY-MM-DD",
                raw
            ))
        })
}

/// Parse a duration given as `HH:MM:SS` or `MM:SS` into whole seconds.
///
/// A single session is shorter than a day, so hours must be below 24.
pub fn parse_duration(raw: &str) -> Result<u32, AppError> {
    let invalid = || {
        AppError::BadRequest(format!(
            "Invalid duration '{}': expected HH:MM:SS or MM:SS",
            raw
        ))
    };

    let parts = raw
        .trim()
        .split(':')
        .map(|p| p.parse::<u32>().map_err(|_| invalid()))
        .collect::<Result<Vec<u32>, AppError>>()?;

    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [m, s] => (0, *m, *s),
        _ => return Err(invalid()),
    };

    if hours >= 24 || minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    Ok(hours * 3600 + minutes * 60 + seconds)
}

/// Format whole seconds as `HH:MM:SS`.
pub fn format_duration(total_secs: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60
    )
}

/// Format a pace given in seconds per mile as `MM:SS`.
pub fn format_pace(secs_per_mile: f64) -> String {
    let total = secs_per_mile.round() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Timezone used to decide which calendar day an activity belongs to.
///
/// Accepts IANA names ("America/New_York", with DST rules) or fixed
/// offsets ("UTC", "UTC-5", "UTC+05:30").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalTimezone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl LocalTimezone {
    /// Calendar date of `instant` in this timezone.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            LocalTimezone::Named(tz) => instant.with_timezone(tz).date_naive(),
            LocalTimezone::Fixed(offset) => instant.with_timezone(offset).date_naive(),
        }
    }

    /// UTC instant of a wall-clock time in this timezone.
    ///
    /// Ambiguous times (DST fall-back) resolve to the earlier instant;
    /// times skipped by spring-forward have no instant.
    pub fn to_utc(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            LocalTimezone::Named(tz) => tz
                .from_local_datetime(&local)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            LocalTimezone::Fixed(offset) => offset
                .from_local_datetime(&local)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    /// Today's date in this timezone.
    pub fn today(&self) -> NaiveDate {
        self.local_date(Utc::now())
    }
}

impl Default for LocalTimezone {
    fn default() -> Self {
        LocalTimezone::Named(Tz::UTC)
    }
}

impl fmt::Display for LocalTimezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalTimezone::Named(tz) => write!(f, "{}", tz.name()),
            LocalTimezone::Fixed(offset) => write!(f, "UTC{}", offset),
        }
    }
}

impl FromStr for LocalTimezone {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let invalid = || AppError::BadRequest(format!("Unknown timezone '{}'", raw));

        if let Some(rest) = raw.strip_prefix("UTC").or_else(|| raw.strip_prefix("GMT")) {
            if rest.is_empty() {
                return Ok(LocalTimezone::Named(Tz::UTC));
            }
            let (sign, rest) = if let Some(r) = rest.strip_prefix('+') {
                (1, r)
            } else if let Some(r) = rest.strip_prefix('-') {
                (-1, r)
            } else {
                return Err(invalid());
            };
            let (hours, minutes) = match rest.split_once(':') {
                Some((h, m)) => (h, m),
                None => (rest, "0"),
            };
            let hours: i32 = hours.parse().map_err(|_| invalid())?;
            let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
            if hours > 14 || minutes >= 60 {
                return Err(invalid());
            }
            let offset = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
                .ok_or_else(invalid)?;
            return Ok(LocalTimezone::Fixed(offset));
        }

        raw.parse::<Tz>()
            .map(LocalTimezone::Named)
            .map_err(|_| invalid())
    }
}

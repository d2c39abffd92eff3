use std::fmt::Display;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_english::parse_date_string;
use clap::{CommandFactory, ValueEnum};

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

/// Resolves a user supplied day into the UTC day records are keyed by. Accepts `2025-03-15` as
/// well as anything chrono-english understands, like "yesterday" or "15/03/2025". No input means
/// the day of `now`, which relative phrases are resolved against too.
pub fn parse_day(
    value: Option<&str>,
    date_style: DateStyle,
    now: DateTime<Utc>,
) -> Result<NaiveDate> {
    let Some(value) = value else {
        return Ok(now.date_naive());
    };

    if let Ok(day) = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        return Ok(day);
    }

    match parse_date_string(value, now, date_style.into()) {
        Ok(v) => Ok(v.date_naive()),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate day {value:?}: {e}"),
            )
            .into()),
    }
}

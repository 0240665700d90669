use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use crate::config::settings::RatingSettings;
use crate::domain::{NewRating, NewSubject};

use super::parser::CsvRow;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

/// Maps header-keyed CSV rows to typed records, rejecting rows that fail
/// validation.
pub struct RecordMapper {
    email_re: Regex,
    settings: RatingSettings,
}

impl RecordMapper {
    pub fn new(settings: RatingSettings) -> Result<Self> {
        let email_re = Regex::new(EMAIL_PATTERN).context("Failed to compile email pattern")?;

        Ok(Self { email_re, settings })
    }

    pub fn map_subject(&self, row: &CsvRow) -> Result<NewSubject> {
        let id = require_field(row, "id")?;
        let name = require_field(row, "name")?;
        let email = optional_field(row, "email");

        if let Some(email) = &email {
            if !self.email_re.is_match(email) {
                bail!("Invalid email for subject {}: {}", id, email);
            }
        }

        Ok(NewSubject {
            id,
            name,
            email,
            discipline: optional_field(row, "discipline"),
        })
    }

    pub fn map_rating(&self, row: &CsvRow, now: DateTime<Utc>) -> Result<NewRating> {
        let subject_id = require_field(row, "subject_id")?;
        let rater_id = require_field(row, "rater_id")?;
        let score = parse_score(row)?;

        if !self.settings.score_range().contains(&score) {
            bail!("Score {} out of range for subject {}", score, subject_id);
        }

        let submitted_at = match optional_field(row, "submitted_at") {
            Some(raw) => parse_submitted_at(&raw)?,
            None => now,
        };

        Ok(NewRating {
            subject_id,
            rater_id,
            rater_name: optional_field(row, "rater_name"),
            score,
            comment: optional_field(row, "comment"),
            created_at: submitted_at,
            updated_at: None,
        })
    }
}

fn require_field(row: &CsvRow, key: &str) -> Result<String> {
    match optional_field(row, key) {
        Some(value) => Ok(value),
        None => bail!("Missing required column: {}", key),
    }
}

fn optional_field(row: &CsvRow, key: &str) -> Option<String> {
    row.get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_score(row: &CsvRow) -> Result<i32> {
    let raw = require_field(row, "score")?;

    raw.parse::<i32>()
        .with_context(|| format!("Score is not an integer: {}", raw))
}

fn parse_submitted_at(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc());
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }

    bail!("Failed to parse submission timestamp: {}", raw)
}

pub mod cache;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod import;
pub mod rating;
pub mod services;
pub mod store;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use log::info;

use crate::cache::Cache;
use crate::cli::{Cli, Command, ImportKind};
use crate::config::AppConfig;
use crate::domain::{RatingSubmission, SubjectProfile};
use crate::errors::RatingError;
use crate::services::{ImportService, RecomputeService, SubmissionService};
use crate::store::{fetch_latest_first, ProfileStore, SqliteStore};

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_init() -> Result<()> {
    let pool = database::create_pool(&database::database_path())?;
    let mut conn = database::get_connection(&pool)?;
    database::setup::reset_database(&mut conn)
}

pub fn handle_import(file: &Path, kind: &ImportKind) -> Result<()> {
    let config = AppConfig::new();
    let store = open_store()?;

    let csv_text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read CSV file: {}", file.display()))?;

    let archive = Cache::new(config.import.archive_dir)?;
    let service = ImportService::new(&store, config.rating)?.with_archive(archive);

    let summary = match kind {
        ImportKind::Subjects => service.import_subjects(&csv_text)?,
        ImportKind::Ratings => service.import_ratings(&csv_text)?,
    };

    info!(
        "Import complete: {} imported, {} skipped",
        summary.imported, summary.skipped
    );
    Ok(())
}

pub fn handle_submit(
    subject: &str,
    rater: &str,
    rater_name: Option<&str>,
    score: i32,
    comment: Option<&str>,
) -> Result<()> {
    let config = AppConfig::new();
    let store = open_store()?;
    let service = SubmissionService::new(&store, config.rating);

    let aggregate = service.submit(&RatingSubmission {
        subject_id: subject.to_string(),
        rater_id: rater.to_string(),
        rater_name: rater_name.map(str::to_string),
        score,
        comment: comment.map(str::to_string),
    })?;

    info!(
        "Rating recorded for {}: now {} over {} review(s)",
        subject, aggregate.average, aggregate.count
    );
    Ok(())
}

pub fn handle_recompute(subject: Option<&str>) -> Result<()> {
    let store = open_store()?;
    let service = RecomputeService::new(&store);

    match subject {
        Some(subject_id) => {
            let aggregate = service.recompute_subject(subject_id)?;
            info!(
                "Aggregate for {}: {} over {} review(s)",
                subject_id, aggregate.average, aggregate.count
            );
        }
        None => {
            let processed = service.recompute_all()?;
            info!("Recomputed aggregates for {} subject(s)", processed);
        }
    }

    Ok(())
}

pub fn handle_show(subject: &str) -> Result<()> {
    let config = AppConfig::new();
    let store = open_store()?;

    let profile = store
        .find_subject(subject)
        .map_err(RatingError::from)?
        .ok_or_else(|| RatingError::UnknownSubject(subject.to_string()))?;

    print_profile(&profile);

    let reviews = fetch_latest_first(&store, subject).map_err(RatingError::from)?;
    for record in reviews.iter().take(config.display.review_preview_limit) {
        let rater = record.rater_name.as_deref().unwrap_or(&record.rater_id);
        let comment = record.comment.as_deref().unwrap_or("-");
        println!("  {} {}  {}", stars(record.score).yellow(), rater.bold(), comment);
    }

    Ok(())
}

fn print_profile(profile: &SubjectProfile) {
    println!("{} ({})", profile.name.bold(), profile.id.dimmed());

    if let Some(discipline) = &profile.discipline {
        println!("{}", discipline.italic());
    }

    println!(
        "{} {:.1}  {} review(s)  [{}]",
        stars(profile.rating.round() as i32).yellow(),
        profile.rating,
        profile.reviews,
        profile.review_band.cyan()
    );
}

fn stars(score: i32) -> String {
    let filled = score.clamp(0, 5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

fn open_store() -> Result<SqliteStore> {
    let pool = database::create_pool(&database::database_path())?;
    Ok(SqliteStore::new(pool))
}

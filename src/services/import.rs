use std::collections::BTreeSet;

use anyhow::Result;
use chrono::Utc;
use log::{info, warn};

use crate::cache::Cache;
use crate::config::settings::RatingSettings;
use crate::domain::{NewRating, NewSubject};
use crate::import::{parse_csv, RecordMapper};
use crate::store::{ProfileStore, RatingStore};

use super::processing::RecomputeService;

#[derive(Debug, Default, PartialEq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub recomputed: usize,
}

/// Bulk-loads subject profiles and rating submissions from CSV batches.
///
/// Rows failing validation are skipped with a warning rather than aborting
/// the batch. Aggregates are recomputed once per affected subject after the
/// batch instead of after every row; recomputation is a pure function of the
/// store contents, so the final state matches per-row recomputes.
pub struct ImportService<'a, S> {
    store: &'a S,
    mapper: RecordMapper,
    archive: Option<Cache>,
}

impl<'a, S> ImportService<'a, S>
where
    S: RatingStore + ProfileStore,
{
    pub fn new(store: &'a S, settings: RatingSettings) -> Result<Self> {
        Ok(Self {
            store,
            mapper: RecordMapper::new(settings)?,
            archive: None,
        })
    }

    /// Archive each accepted batch as JSON under the given cache.
    pub fn with_archive(mut self, archive: Cache) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn import_subjects(&self, csv_text: &str) -> Result<ImportSummary> {
        info!("=== Starting Subject Import ===");

        let rows = parse_csv(csv_text);
        let mut summary = ImportSummary::default();
        let mut accepted: Vec<NewSubject> = Vec::new();

        for row in &rows {
            let subject = match self.mapper.map_subject(row) {
                Ok(subject) => subject,
                Err(err) => {
                    warn!("Skipping subject row: {:#}", err);
                    summary.skipped += 1;
                    continue;
                }
            };

            self.store.upsert_subject(&subject)?;
            accepted.push(subject);
            summary.imported += 1;
        }

        self.archive_batch("subjects", &accepted)?;

        info!(
            "  → Imported {} subject(s), skipped {}",
            summary.imported, summary.skipped
        );
        Ok(summary)
    }

    pub fn import_ratings(&self, csv_text: &str) -> Result<ImportSummary> {
        info!("=== Starting Rating Import ===");

        let rows = parse_csv(csv_text);
        let now = Utc::now();

        let mut summary = ImportSummary::default();
        let mut accepted: Vec<NewRating> = Vec::new();
        let mut affected: BTreeSet<String> = BTreeSet::new();

        for row in &rows {
            let rating = match self.mapper.map_rating(row, now) {
                Ok(rating) => rating,
                Err(err) => {
                    warn!("Skipping rating row: {:#}", err);
                    summary.skipped += 1;
                    continue;
                }
            };

            if self.store.find_subject(&rating.subject_id)?.is_none() {
                warn!("Skipping rating for unknown subject {}", rating.subject_id);
                summary.skipped += 1;
                continue;
            }

            self.store.insert(&rating)?;
            affected.insert(rating.subject_id.clone());
            accepted.push(rating);
            summary.imported += 1;
        }

        let recompute = RecomputeService::new(self.store);
        for subject_id in &affected {
            recompute.recompute_subject(subject_id)?;
            summary.recomputed += 1;
        }

        self.archive_batch("ratings", &accepted)?;

        info!(
            "  → Imported {} rating(s), skipped {}, recomputed {} subject(s)",
            summary.imported, summary.skipped, summary.recomputed
        );
        Ok(summary)
    }

    fn archive_batch<T: serde::Serialize>(&self, kind: &str, batch: &[T]) -> Result<()> {
        let Some(archive) = &self.archive else {
            return Ok(());
        };

        archive.save_parsed(kind, &batch)
    }
}

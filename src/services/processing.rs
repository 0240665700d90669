use log::info;

use crate::errors::RatingError;
use crate::rating::{aggregate_ratings, AggregateRating, ReviewBand};
use crate::store::{ProfileStore, RatingStore};

/// Recomputes the denormalized aggregate on subject profiles from the full
/// rating record set.
pub struct RecomputeService<'a, S> {
    store: &'a S,
}

impl<'a, S> RecomputeService<'a, S>
where
    S: RatingStore + ProfileStore,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Recompute one subject's aggregate and persist it.
    ///
    /// The result is a pure function of the rating store contents at read
    /// time; rerunning without intervening writes produces the same value.
    /// When the fetch fails the profile's existing denormalized fields are
    /// left untouched.
    pub fn recompute_subject(&self, subject_id: &str) -> Result<AggregateRating, RatingError> {
        let records = self.store.query_by_subject(subject_id)?;

        let aggregate = aggregate_ratings(&records);
        let band = ReviewBand::from_review_count(aggregate.count);

        let written = self.store.write_aggregate(subject_id, aggregate, &band)?;
        if !written {
            return Err(RatingError::UnknownSubject(subject_id.to_string()));
        }

        info!(
            "Recomputed aggregate for {}: {} over {} review(s)",
            subject_id, aggregate.average, aggregate.count
        );

        Ok(aggregate)
    }

    /// Recompute every stored subject. Returns the number processed.
    pub fn recompute_all(&self) -> Result<usize, RatingError> {
        let subjects = self.store.list_subjects()?;

        for subject in &subjects {
            self.recompute_subject(&subject.id)?;
        }

        Ok(subjects.len())
    }
}

use chrono::Utc;
use log::{info, warn};

use crate::config::settings::RatingSettings;
use crate::domain::{NewRating, RatingPatch, RatingSubmission};
use crate::errors::RatingError;
use crate::rating::AggregateRating;
use crate::store::{Notifier, ProfileStore, RatingStore};

use super::processing::RecomputeService;

/// Accepts rating submissions: validates, writes the record, recomputes the
/// subject's aggregate, then notifies the subject.
pub struct SubmissionService<'a, S> {
    store: &'a S,
    settings: RatingSettings,
}

impl<'a, S> SubmissionService<'a, S>
where
    S: RatingStore + ProfileStore + Notifier,
{
    pub fn new(store: &'a S, settings: RatingSettings) -> Self {
        Self { store, settings }
    }

    /// Submit a new rating or replace the rater's previous one.
    ///
    /// Success is reported only after both the record write and the
    /// aggregate recompute complete. Notification failures are logged and
    /// ignored.
    pub fn submit(&self, submission: &RatingSubmission) -> Result<AggregateRating, RatingError> {
        self.validate(submission)?;

        if self.store.find_subject(&submission.subject_id)?.is_none() {
            return Err(RatingError::UnknownSubject(submission.subject_id.clone()));
        }

        self.write_record(submission)?;

        let aggregate =
            RecomputeService::new(self.store).recompute_subject(&submission.subject_id)?;

        self.notify_subject(submission);

        Ok(aggregate)
    }

    fn validate(&self, submission: &RatingSubmission) -> Result<(), RatingError> {
        if submission.subject_id.trim().is_empty() {
            return Err(RatingError::InvalidReference("subject"));
        }

        if submission.rater_id.trim().is_empty() {
            return Err(RatingError::InvalidReference("rater"));
        }

        if !self.settings.score_range().contains(&submission.score) {
            return Err(RatingError::InvalidScore(submission.score));
        }

        Ok(())
    }

    fn write_record(&self, submission: &RatingSubmission) -> Result<(), RatingError> {
        let now = Utc::now();

        let existing = self
            .store
            .find_by_subject_and_rater(&submission.subject_id, &submission.rater_id)?;

        // Duplicates from racing submissions stay in place; only the first
        // match is patched and aggregation resolves the rest.
        if let Some(first) = existing.first() {
            self.store.update_by_key(
                first.id,
                &RatingPatch {
                    score: submission.score,
                    comment: submission.comment.clone(),
                    updated_at: now,
                },
            )?;
            return Ok(());
        }

        self.store.insert(&NewRating {
            subject_id: submission.subject_id.clone(),
            rater_id: submission.rater_id.clone(),
            rater_name: submission.rater_name.clone(),
            score: submission.score,
            comment: submission.comment.clone(),
            created_at: now,
            updated_at: None,
        })?;

        Ok(())
    }

    fn notify_subject(&self, submission: &RatingSubmission) {
        let message = format!("You received a new {}-star review", submission.score);

        if let Err(err) = self.store.notify(&submission.subject_id, &message) {
            warn!(
                "Failed to notify subject {}: {}",
                submission.subject_id, err
            );
            return;
        }

        info!("Notified subject {}", submission.subject_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewSubject;
    use crate::store::InMemoryStore;

    fn service(store: &InMemoryStore) -> SubmissionService<'_, InMemoryStore> {
        SubmissionService::new(store, RatingSettings::default())
    }

    fn seed_subject(store: &InMemoryStore, id: &str) {
        store
            .upsert_subject(&NewSubject {
                id: id.to_string(),
                name: "Thandi Nkosi".to_string(),
                email: None,
                discipline: None,
            })
            .unwrap();
    }

    fn submission(subject_id: &str, rater_id: &str, score: i32) -> RatingSubmission {
        RatingSubmission {
            subject_id: subject_id.to_string(),
            rater_id: rater_id.to_string(),
            rater_name: Some("Sipho".to_string()),
            score,
            comment: None,
        }
    }

    #[test]
    fn out_of_range_scores_are_rejected_before_any_write() {
        let store = InMemoryStore::new();
        seed_subject(&store, "sme-1");

        for score in [0, 6] {
            let err = service(&store)
                .submit(&submission("sme-1", "sdp-c", score))
                .unwrap_err();
            assert_eq!(err, RatingError::InvalidScore(score));
        }

        assert_eq!(store.rating_count(), 0);
        assert!(store.notifications().is_empty());
    }

    #[test]
    fn empty_references_are_rejected_before_any_write() {
        let store = InMemoryStore::new();
        seed_subject(&store, "sme-1");

        let err = service(&store).submit(&submission("", "sdp-a", 4)).unwrap_err();
        assert_eq!(err, RatingError::InvalidReference("subject"));

        let err = service(&store).submit(&submission("sme-1", " ", 4)).unwrap_err();
        assert_eq!(err, RatingError::InvalidReference("rater"));

        assert_eq!(store.rating_count(), 0);
    }

    #[test]
    fn unknown_subjects_are_rejected() {
        let store = InMemoryStore::new();

        let err = service(&store)
            .submit(&submission("ghost", "sdp-a", 4))
            .unwrap_err();

        assert_eq!(err, RatingError::UnknownSubject("ghost".to_string()));
    }

    #[test]
    fn first_submission_inserts_and_updates_the_profile() {
        let store = InMemoryStore::new();
        seed_subject(&store, "sme-1");

        service(&store).submit(&submission("sme-1", "sdp-a", 4)).unwrap();
        let aggregate = service(&store).submit(&submission("sme-1", "sdp-b", 5)).unwrap();

        assert_eq!(aggregate.average, 4.5);
        assert_eq!(aggregate.count, 2);

        let profile = store.find_subject("sme-1").unwrap().unwrap();
        assert_eq!(profile.rating, 4.5);
        assert_eq!(profile.reviews, 2);
        assert_eq!(profile.review_band, "provisional");
    }

    #[test]
    fn resubmission_replaces_the_raters_previous_score() {
        let store = InMemoryStore::new();
        seed_subject(&store, "sme-1");

        let service = service(&store);
        service.submit(&submission("sme-1", "sdp-a", 4)).unwrap();
        service.submit(&submission("sme-1", "sdp-b", 5)).unwrap();

        let aggregate = service.submit(&submission("sme-1", "sdp-a", 2)).unwrap();

        // still two raters, rater a now counts as 2
        assert_eq!(aggregate.count, 2);
        assert_eq!(aggregate.average, 3.5);
        assert_eq!(store.rating_count(), 2);
    }

    #[test]
    fn subject_is_notified_on_success() {
        let store = InMemoryStore::new();
        seed_subject(&store, "sme-1");

        service(&store).submit(&submission("sme-1", "sdp-a", 4)).unwrap();

        assert_eq!(
            store.notifications(),
            vec![(
                "sme-1".to_string(),
                "You received a new 4-star review".to_string()
            )]
        );
    }

    #[test]
    fn notification_failure_does_not_fail_the_submission() {
        let store = InMemoryStore::new();
        seed_subject(&store, "sme-1");
        store.set_notify_fails(true);

        let aggregate = service(&store).submit(&submission("sme-1", "sdp-a", 4)).unwrap();

        assert_eq!(aggregate.average, 4.0);
        assert!(store.notifications().is_empty());

        let profile = store.find_subject("sme-1").unwrap().unwrap();
        assert_eq!(profile.rating, 4.0);
    }
}

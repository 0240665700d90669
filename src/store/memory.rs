use std::cell::{Cell, RefCell};

use crate::domain::{NewRating, NewSubject, RatingPatch, RatingRecord, SubjectProfile};
use crate::errors::StoreError;
use crate::rating::{AggregateRating, ReviewBand};

use super::{Notifier, ProfileStore, RatingStore};

/// Vec-backed reference store.
///
/// Mirrors the SQLite backend's observable behavior except for ordered
/// queries, which it deliberately lacks so callers exercise the
/// degraded-query fallback. Tests can flip `set_unavailable` to simulate an
/// unreachable store.
#[derive(Default)]
pub struct InMemoryStore {
    ratings: RefCell<Vec<RatingRecord>>,
    subjects: RefCell<Vec<SubjectProfile>>,
    notifications: RefCell<Vec<(String, String)>>,
    next_id: Cell<i64>,
    unavailable: Cell<bool>,
    notify_fails: Cell<bool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            ..Self::default()
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    pub fn set_notify_fails(&self, fails: bool) {
        self.notify_fails.set(fails);
    }

    pub fn notifications(&self) -> Vec<(String, String)> {
        self.notifications.borrow().clone()
    }

    pub fn rating_count(&self) -> usize {
        self.ratings.borrow().len()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.get() {
            return Err(StoreError::Unavailable("in-memory store offline".to_string()));
        }
        Ok(())
    }

    fn take_id(&self) -> i64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

impl RatingStore for InMemoryStore {
    fn insert(&self, rating: &NewRating) -> Result<RatingRecord, StoreError> {
        self.check_available()?;

        let record = RatingRecord {
            id: self.take_id(),
            subject_id: rating.subject_id.clone(),
            rater_id: rating.rater_id.clone(),
            rater_name: rating.rater_name.clone(),
            score: rating.score,
            comment: rating.comment.clone(),
            created_at: rating.created_at,
            updated_at: rating.updated_at,
        };

        self.ratings.borrow_mut().push(record.clone());
        Ok(record)
    }

    fn update_by_key(
        &self,
        rating_id: i64,
        patch: &RatingPatch,
    ) -> Result<RatingRecord, StoreError> {
        self.check_available()?;

        let mut ratings = self.ratings.borrow_mut();
        let record = ratings
            .iter_mut()
            .find(|record| record.id == rating_id)
            .ok_or_else(|| StoreError::Unavailable(format!("no rating with id {rating_id}")))?;

        record.score = patch.score;
        record.comment = patch.comment.clone();
        record.updated_at = Some(patch.updated_at);

        Ok(record.clone())
    }

    fn query_by_subject(&self, subject_id: &str) -> Result<Vec<RatingRecord>, StoreError> {
        self.check_available()?;

        Ok(self
            .ratings
            .borrow()
            .iter()
            .filter(|record| record.subject_id == subject_id)
            .cloned()
            .collect())
    }

    fn find_by_subject_and_rater(
        &self,
        subject_id: &str,
        rater_id: &str,
    ) -> Result<Vec<RatingRecord>, StoreError> {
        self.check_available()?;

        Ok(self
            .ratings
            .borrow()
            .iter()
            .filter(|record| record.subject_id == subject_id && record.rater_id == rater_id)
            .cloned()
            .collect())
    }
}

impl ProfileStore for InMemoryStore {
    fn find_subject(&self, id: &str) -> Result<Option<SubjectProfile>, StoreError> {
        self.check_available()?;

        Ok(self
            .subjects
            .borrow()
            .iter()
            .find(|subject| subject.id == id)
            .cloned())
    }

    fn upsert_subject(&self, subject: &NewSubject) -> Result<SubjectProfile, StoreError> {
        self.check_available()?;

        let mut subjects = self.subjects.borrow_mut();

        if let Some(existing) = subjects.iter_mut().find(|s| s.id == subject.id) {
            existing.name = subject.name.clone();
            if subject.email.is_some() {
                existing.email = subject.email.clone();
            }
            if subject.discipline.is_some() {
                existing.discipline = subject.discipline.clone();
            }
            return Ok(existing.clone());
        }

        let profile = SubjectProfile {
            id: subject.id.clone(),
            name: subject.name.clone(),
            email: subject.email.clone(),
            discipline: subject.discipline.clone(),
            rating: 0.0,
            reviews: 0,
            review_band: ReviewBand::Unreviewed.as_str().to_string(),
        };

        subjects.push(profile.clone());
        Ok(profile)
    }

    fn list_subjects(&self) -> Result<Vec<SubjectProfile>, StoreError> {
        self.check_available()?;

        Ok(self.subjects.borrow().clone())
    }

    fn write_aggregate(
        &self,
        subject_id: &str,
        aggregate: AggregateRating,
        band: &ReviewBand,
    ) -> Result<bool, StoreError> {
        self.check_available()?;

        let mut subjects = self.subjects.borrow_mut();
        let Some(subject) = subjects.iter_mut().find(|s| s.id == subject_id) else {
            return Ok(false);
        };

        subject.rating = aggregate.average;
        subject.reviews = aggregate.count;
        subject.review_band = band.as_str().to_string();

        Ok(true)
    }
}

impl Notifier for InMemoryStore {
    fn notify(&self, user_id: &str, message: &str) -> Result<(), StoreError> {
        self.check_available()?;

        if self.notify_fails.get() {
            return Err(StoreError::Unavailable("notifier offline".to_string()));
        }

        self.notifications
            .borrow_mut()
            .push((user_id.to_string(), message.to_string()));

        Ok(())
    }
}

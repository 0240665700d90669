pub mod fallback;
pub mod memory;
pub mod sqlite;

pub use fallback::fetch_latest_first;
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use crate::domain::{NewRating, NewSubject, RatingPatch, RatingRecord, SubjectProfile};
use crate::errors::StoreError;
use crate::rating::{AggregateRating, ReviewBand};

/// Collection of rating records keyed logically by (subject, rater).
pub trait RatingStore {
    fn insert(&self, rating: &NewRating) -> Result<RatingRecord, StoreError>;

    fn update_by_key(&self, rating_id: i64, patch: &RatingPatch)
        -> Result<RatingRecord, StoreError>;

    fn query_by_subject(&self, subject_id: &str) -> Result<Vec<RatingRecord>, StoreError>;

    /// Latest-first variant for review listings. Backends without ordered
    /// queries keep the default and callers degrade via
    /// [`fallback::fetch_latest_first`].
    fn query_by_subject_ordered(&self, subject_id: &str) -> Result<Vec<RatingRecord>, StoreError> {
        let _ = subject_id;
        Err(StoreError::UnsupportedQuery)
    }

    fn find_by_subject_and_rater(
        &self,
        subject_id: &str,
        rater_id: &str,
    ) -> Result<Vec<RatingRecord>, StoreError>;
}

/// Subject profiles carrying the denormalized aggregate fields.
pub trait ProfileStore {
    fn find_subject(&self, id: &str) -> Result<Option<SubjectProfile>, StoreError>;

    fn upsert_subject(&self, subject: &NewSubject) -> Result<SubjectProfile, StoreError>;

    fn list_subjects(&self) -> Result<Vec<SubjectProfile>, StoreError>;

    /// Overwrite the denormalized aggregate. Returns false when the subject
    /// does not exist.
    fn write_aggregate(
        &self,
        subject_id: &str,
        aggregate: AggregateRating,
        band: &ReviewBand,
    ) -> Result<bool, StoreError>;
}

/// Fire-and-forget notification collaborator.
pub trait Notifier {
    fn notify(&self, user_id: &str, message: &str) -> Result<(), StoreError>;
}

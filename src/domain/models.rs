use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored rating submission by one rater about one subject.
///
/// Storage does not enforce uniqueness of (subject_id, rater_id); concurrent
/// submissions can leave several records for the same pair. Aggregation
/// treats the pair as a logical key and keeps the latest record per rater.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRecord {
    pub id: i64,
    pub subject_id: String,
    pub rater_id: String,
    pub rater_name: Option<String>,
    pub score: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RatingRecord {
    /// Timestamp used for latest-wins deduplication and review ordering.
    pub fn effective_timestamp(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}

/// A rating submission before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRating {
    pub subject_id: String,
    pub rater_id: String,
    pub rater_name: Option<String>,
    pub score: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// SME profile with the denormalized aggregate fields the marketplace displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectProfile {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub discipline: Option<String>,
    pub rating: f64,
    pub reviews: i32,
    pub review_band: String,
}

/// Profile fields accepted from imports, before the store fills in the
/// aggregate defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubject {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub discipline: Option<String>,
}

/// A caller-supplied rating before validation stamps it with timestamps.
#[derive(Debug, Clone)]
pub struct RatingSubmission {
    pub subject_id: String,
    pub rater_id: String,
    pub rater_name: Option<String>,
    pub score: i32,
    pub comment: Option<String>,
}

/// Fields of an existing rating that a resubmission replaces.
#[derive(Debug, Clone)]
pub struct RatingPatch {
    pub score: i32,
    pub comment: Option<String>,
    pub updated_at: DateTime<Utc>,
}

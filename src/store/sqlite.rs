use chrono::{DateTime, TimeZone, Utc};

use crate::database::{self, DbConn, DbPool, RatingRow, SubjectRow};
use crate::domain::{NewRating, NewSubject, RatingPatch, RatingRecord, SubjectProfile};
use crate::errors::StoreError;
use crate::rating::{AggregateRating, ReviewBand};

use super::{Notifier, ProfileStore, RatingStore};

/// Production store backed by the SQLite connection pool.
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn connection(&self) -> Result<DbConn, StoreError> {
        database::get_connection(&self.pool).map_err(store_error)
    }
}

impl RatingStore for SqliteStore {
    fn insert(&self, rating: &NewRating) -> Result<RatingRecord, StoreError> {
        let mut conn = self.connection()?;

        let row = database::ratings::insert_rating(
            &mut conn,
            &rating.subject_id,
            &rating.rater_id,
            rating.rater_name.as_deref(),
            rating.score,
            rating.comment.as_deref(),
            rating.created_at.naive_utc(),
            rating.updated_at.map(|ts| ts.naive_utc()),
        )
        .map_err(store_error)?;

        Ok(rating_to_domain(row))
    }

    fn update_by_key(
        &self,
        rating_id: i64,
        patch: &RatingPatch,
    ) -> Result<RatingRecord, StoreError> {
        let mut conn = self.connection()?;

        let row = database::ratings::update_rating(
            &mut conn,
            rating_id,
            patch.score,
            patch.comment.as_deref(),
            patch.updated_at.naive_utc(),
        )
        .map_err(store_error)?;

        Ok(rating_to_domain(row))
    }

    fn query_by_subject(&self, subject_id: &str) -> Result<Vec<RatingRecord>, StoreError> {
        let mut conn = self.connection()?;

        let rows =
            database::ratings::list_by_subject(&mut conn, subject_id).map_err(store_error)?;

        Ok(rows.into_iter().map(rating_to_domain).collect())
    }

    fn query_by_subject_ordered(&self, subject_id: &str) -> Result<Vec<RatingRecord>, StoreError> {
        let mut conn = self.connection()?;

        let rows = database::ratings::list_by_subject_latest_first(&mut conn, subject_id)
            .map_err(store_error)?;

        Ok(rows.into_iter().map(rating_to_domain).collect())
    }

    fn find_by_subject_and_rater(
        &self,
        subject_id: &str,
        rater_id: &str,
    ) -> Result<Vec<RatingRecord>, StoreError> {
        let mut conn = self.connection()?;

        let rows = database::ratings::find_by_subject_and_rater(&mut conn, subject_id, rater_id)
            .map_err(store_error)?;

        Ok(rows.into_iter().map(rating_to_domain).collect())
    }
}

impl ProfileStore for SqliteStore {
    fn find_subject(&self, id: &str) -> Result<Option<SubjectProfile>, StoreError> {
        let mut conn = self.connection()?;

        let row = database::subjects::find_by_id(&mut conn, id).map_err(store_error)?;

        Ok(row.map(subject_to_domain))
    }

    fn upsert_subject(&self, subject: &NewSubject) -> Result<SubjectProfile, StoreError> {
        let mut conn = self.connection()?;

        let row = database::subjects::upsert_subject(
            &mut conn,
            &subject.id,
            &subject.name,
            subject.email.as_deref(),
            subject.discipline.as_deref(),
        )
        .map_err(store_error)?;

        Ok(subject_to_domain(row))
    }

    fn list_subjects(&self) -> Result<Vec<SubjectProfile>, StoreError> {
        let mut conn = self.connection()?;

        let rows = database::subjects::list_all(&mut conn).map_err(store_error)?;

        Ok(rows.into_iter().map(subject_to_domain).collect())
    }

    fn write_aggregate(
        &self,
        subject_id: &str,
        aggregate: AggregateRating,
        band: &ReviewBand,
    ) -> Result<bool, StoreError> {
        let mut conn = self.connection()?;

        database::subjects::write_aggregate(
            &mut conn,
            subject_id,
            aggregate.average,
            aggregate.count,
            band.as_str(),
        )
        .map_err(store_error)
    }
}

impl Notifier for SqliteStore {
    fn notify(&self, user_id: &str, message: &str) -> Result<(), StoreError> {
        let mut conn = self.connection()?;

        database::notifications::insert_notification(
            &mut conn,
            user_id,
            message,
            Utc::now().naive_utc(),
        )
        .map_err(store_error)?;

        Ok(())
    }
}

fn store_error(err: anyhow::Error) -> StoreError {
    StoreError::Unavailable(format!("{err:#}"))
}

fn to_utc(naive: chrono::NaiveDateTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&naive)
}

fn rating_to_domain(row: RatingRow) -> RatingRecord {
    RatingRecord {
        id: row.id,
        subject_id: row.subject_id,
        rater_id: row.rater_id,
        rater_name: row.rater_name,
        score: row.score,
        comment: row.comment,
        created_at: to_utc(row.created_at),
        updated_at: row.updated_at.map(to_utc),
    }
}

fn subject_to_domain(row: SubjectRow) -> SubjectProfile {
    SubjectProfile {
        id: row.id,
        name: row.name,
        email: row.email,
        discipline: row.discipline,
        rating: row.rating,
        reviews: row.reviews,
        review_band: row.review_band,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::setup;
    use chrono::TimeZone;
    use r2d2_sqlite::SqliteConnectionManager;

    fn test_store() -> SqliteStore {
        // single connection so the in-memory database is shared
        let manager = SqliteConnectionManager::memory();
        let pool = r2d2::Pool::builder().max_size(1).build(manager).unwrap();

        let mut conn = pool.get().unwrap();
        setup::reset_database(&mut conn).unwrap();
        drop(conn);

        SqliteStore::new(pool)
    }

    fn submission(rater_id: &str, score: i32, minute: u32) -> NewRating {
        NewRating {
            subject_id: "sme-1".to_string(),
            rater_id: rater_id.to_string(),
            rater_name: Some("Rater".to_string()),
            score,
            comment: Some("solid facilitator".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 3, 10, 12, minute, 0).unwrap(),
            updated_at: None,
        }
    }

    fn seed_subject(store: &SqliteStore) -> SubjectProfile {
        store
            .upsert_subject(&NewSubject {
                id: "sme-1".to_string(),
                name: "Thandi Nkosi".to_string(),
                email: Some("thandi@example.org".to_string()),
                discipline: Some("Assessor Training".to_string()),
            })
            .unwrap()
    }

    #[test]
    fn insert_and_query_round_trip() {
        let store = test_store();
        seed_subject(&store);

        let inserted = store.insert(&submission("sdp-a", 4, 1)).unwrap();
        assert!(inserted.id > 0);

        let records = store.query_by_subject("sme-1").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].score, 4);
        assert_eq!(records[0].updated_at, None);
        assert_eq!(records[0].created_at, submission("sdp-a", 4, 1).created_at);
    }

    #[test]
    fn ordered_query_is_native_and_latest_first() {
        let store = test_store();
        seed_subject(&store);

        store.insert(&submission("sdp-a", 4, 1)).unwrap();
        store.insert(&submission("sdp-b", 5, 9)).unwrap();
        store.insert(&submission("sdp-c", 3, 4)).unwrap();

        let records = store.query_by_subject_ordered("sme-1").unwrap();
        let raters: Vec<&str> = records.iter().map(|r| r.rater_id.as_str()).collect();

        assert_eq!(raters, vec!["sdp-b", "sdp-c", "sdp-a"]);
    }

    #[test]
    fn update_by_key_patches_first_match() {
        let store = test_store();
        seed_subject(&store);

        let original = store.insert(&submission("sdp-a", 4, 1)).unwrap();
        let updated_at = Utc.with_ymd_and_hms(2024, 3, 11, 8, 0, 0).unwrap();

        let updated = store
            .update_by_key(
                original.id,
                &RatingPatch {
                    score: 2,
                    comment: None,
                    updated_at,
                },
            )
            .unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.score, 2);
        assert_eq!(updated.comment, None);
        assert_eq!(updated.updated_at, Some(updated_at));

        let matches = store.find_by_subject_and_rater("sme-1", "sdp-a").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].score, 2);
    }

    #[test]
    fn upsert_subject_refreshes_contact_fields_but_keeps_aggregate() {
        let store = test_store();
        seed_subject(&store);

        store
            .write_aggregate(
                "sme-1",
                AggregateRating {
                    average: 4.5,
                    count: 2,
                },
                &ReviewBand::Provisional,
            )
            .unwrap();

        let updated = store
            .upsert_subject(&NewSubject {
                id: "sme-1".to_string(),
                name: "Thandi Nkosi-Dlamini".to_string(),
                email: None,
                discipline: None,
            })
            .unwrap();

        assert_eq!(updated.name, "Thandi Nkosi-Dlamini");
        assert_eq!(updated.email, Some("thandi@example.org".to_string()));
        assert_eq!(updated.rating, 4.5);
        assert_eq!(updated.reviews, 2);
        assert_eq!(updated.review_band, "provisional");
    }

    #[test]
    fn write_aggregate_reports_missing_subject() {
        let store = test_store();

        let written = store
            .write_aggregate("ghost", AggregateRating::empty(), &ReviewBand::Unreviewed)
            .unwrap();

        assert!(!written);
    }

    #[test]
    fn notify_appends_a_notification_row() {
        let store = test_store();
        seed_subject(&store);

        store.notify("sme-1", "You received a new review").unwrap();

        let mut conn = database::get_connection(&store.pool).unwrap();
        let rows = database::notifications::list_for_user(&mut conn, "sme-1").unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].message, "You received a new review");
    }
}

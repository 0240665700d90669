use std::cmp::Reverse;

use crate::domain::RatingRecord;
use crate::errors::StoreError;

use super::RatingStore;

/// Fetch a subject's ratings latest-first.
///
/// Prefers the store's ordered query and degrades to the unordered query
/// plus an in-memory sort when the backend reports the capability missing.
pub fn fetch_latest_first<S: RatingStore + ?Sized>(
    store: &S,
    subject_id: &str,
) -> Result<Vec<RatingRecord>, StoreError> {
    match store.query_by_subject_ordered(subject_id) {
        Ok(records) => Ok(records),
        Err(StoreError::UnsupportedQuery) => {
            log::debug!(
                "Ordered query unsupported for subject {}, sorting in memory",
                subject_id
            );
            fetch_and_sort(store, subject_id)
        }
        Err(err) => Err(err),
    }
}

fn fetch_and_sort<S: RatingStore + ?Sized>(
    store: &S,
    subject_id: &str,
) -> Result<Vec<RatingRecord>, StoreError> {
    let mut records = store.query_by_subject(subject_id)?;
    records.sort_by_key(|record| Reverse((record.effective_timestamp(), record.id)));
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewRating;
    use crate::store::InMemoryStore;
    use chrono::{TimeZone, Utc};

    fn submission(rater_id: &str, score: i32, minute: u32) -> NewRating {
        NewRating {
            subject_id: "sme-1".to_string(),
            rater_id: rater_id.to_string(),
            rater_name: None,
            score,
            comment: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 10, 12, minute, 0).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn falls_back_to_in_memory_sort_when_ordering_unsupported() {
        let store = InMemoryStore::new();
        store.insert(&submission("sdp-a", 4, 1)).unwrap();
        store.insert(&submission("sdp-b", 5, 9)).unwrap();
        store.insert(&submission("sdp-c", 3, 4)).unwrap();

        // the in-memory backend reports ordered queries as unsupported
        assert_eq!(
            store.query_by_subject_ordered("sme-1"),
            Err(StoreError::UnsupportedQuery)
        );

        let records = fetch_latest_first(&store, "sme-1").unwrap();
        let raters: Vec<&str> = records.iter().map(|r| r.rater_id.as_str()).collect();

        assert_eq!(raters, vec!["sdp-b", "sdp-c", "sdp-a"]);
    }

    #[test]
    fn equal_timestamps_order_by_record_id_descending() {
        let store = InMemoryStore::new();
        store.insert(&submission("sdp-a", 4, 1)).unwrap();
        store.insert(&submission("sdp-b", 5, 1)).unwrap();

        let records = fetch_latest_first(&store, "sme-1").unwrap();
        let raters: Vec<&str> = records.iter().map(|r| r.rater_id.as_str()).collect();

        assert_eq!(raters, vec!["sdp-b", "sdp-a"]);
    }
}

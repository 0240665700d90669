use std::collections::HashMap;

use crate::domain::RatingRecord;

use super::types::AggregateRating;

/// Compute the displayed aggregate for a subject from every stored rating
/// record, counting each rater once.
///
/// Duplicate records for one rater are resolved to the record with the
/// greatest effective timestamp; equal timestamps resolve to the greater
/// record id (last inserted wins). The result depends only on the record set,
/// not on its order.
pub fn aggregate_ratings(records: &[RatingRecord]) -> AggregateRating {
    let buckets = bucket_by_rater(records);
    let scores = select_authoritative_scores(&buckets);

    build_aggregate(&scores)
}

fn bucket_by_rater(records: &[RatingRecord]) -> HashMap<&str, Vec<&RatingRecord>> {
    let mut buckets: HashMap<&str, Vec<&RatingRecord>> = HashMap::new();

    for record in records {
        buckets.entry(record.rater_id.as_str()).or_default().push(record);
    }

    buckets
}

fn select_authoritative_scores(buckets: &HashMap<&str, Vec<&RatingRecord>>) -> Vec<i32> {
    buckets
        .values()
        .filter_map(|bucket| latest_record(bucket))
        .map(|record| record.score)
        .collect()
}

fn latest_record<'a>(bucket: &[&'a RatingRecord]) -> Option<&'a RatingRecord> {
    bucket
        .iter()
        .copied()
        .max_by_key(|record| (record.effective_timestamp(), record.id))
}

fn build_aggregate(scores: &[i32]) -> AggregateRating {
    let count = scores.len() as i32;

    if count == 0 {
        return AggregateRating::empty();
    }

    let sum: i32 = scores.iter().sum();
    let average = round_to_one_decimal(f64::from(sum) / f64::from(count));

    AggregateRating { average, count }
}

fn round_to_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, minute, 0).unwrap()
    }

    fn record(
        id: i64,
        rater_id: &str,
        score: i32,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
    ) -> RatingRecord {
        RatingRecord {
            id,
            subject_id: "sme-1".to_string(),
            rater_id: rater_id.to_string(),
            rater_name: None,
            score,
            comment: None,
            created_at,
            updated_at,
        }
    }

    #[test]
    fn averages_distinct_raters() {
        let records = vec![
            record(1, "sdp-a", 4, at(1), None),
            record(2, "sdp-b", 5, at(2), None),
        ];

        let aggregate = aggregate_ratings(&records);

        assert_eq!(aggregate.count, 2);
        assert_eq!(aggregate.average, 4.5);
    }

    #[test]
    fn resubmission_replaces_previous_score() {
        let records = vec![
            record(1, "sdp-a", 4, at(1), Some(at(5))),
            record(2, "sdp-b", 5, at(2), None),
        ];

        let aggregate = aggregate_ratings(&records);

        // rater a now counts as 4 via the updated record, not twice
        assert_eq!(aggregate.count, 2);
        assert_eq!(aggregate.average, 4.5);
    }

    #[test]
    fn duplicate_records_keep_only_latest_timestamp() {
        // duplicate rows for one rater left behind by a racing submission
        let records = vec![
            record(1, "sdp-a", 4, at(1), None),
            record(2, "sdp-a", 2, at(3), None),
            record(3, "sdp-b", 5, at(2), None),
        ];

        let aggregate = aggregate_ratings(&records);

        assert_eq!(aggregate.count, 2);
        assert_eq!(aggregate.average, 3.5);
    }

    #[test]
    fn equal_timestamps_resolve_to_greater_record_id() {
        let records = vec![
            record(7, "sdp-a", 1, at(1), None),
            record(9, "sdp-a", 5, at(1), None),
            record(8, "sdp-a", 3, at(1), None),
        ];

        let aggregate = aggregate_ratings(&records);

        assert_eq!(aggregate.count, 1);
        assert_eq!(aggregate.average, 5.0);
    }

    #[test]
    fn updated_at_takes_precedence_over_created_at() {
        // older row was edited after the newer row was created
        let records = vec![
            record(1, "sdp-a", 2, at(1), Some(at(9))),
            record(2, "sdp-a", 4, at(3), None),
        ];

        let aggregate = aggregate_ratings(&records);

        assert_eq!(aggregate.average, 2.0);
    }

    #[test]
    fn empty_record_set_yields_zero_aggregate() {
        let aggregate = aggregate_ratings(&[]);

        assert_eq!(aggregate.count, 0);
        assert_eq!(aggregate.average, 0.0);
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        let records = vec![
            record(1, "sdp-a", 3, at(1), None),
            record(2, "sdp-b", 4, at(2), None),
            record(3, "sdp-c", 4, at(3), None),
        ];

        let aggregate = aggregate_ratings(&records);

        // 11 / 3 = 3.666...
        assert_eq!(aggregate.average, 3.7);
    }

    #[test]
    fn result_is_independent_of_record_order() {
        let mut records = vec![
            record(1, "sdp-a", 4, at(1), None),
            record(2, "sdp-a", 2, at(3), None),
            record(3, "sdp-b", 5, at(2), None),
            record(4, "sdp-c", 1, at(4), None),
        ];

        let forward = aggregate_ratings(&records);
        records.reverse();
        let backward = aggregate_ratings(&records);

        assert_eq!(forward, backward);
    }
}

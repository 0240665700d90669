use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::params;

use super::connection::DbConn;
use super::models::RatingRow;

const RATING_COLUMNS: &str =
    "id, subject_id, rater_id, rater_name, score, comment, created_at, updated_at";

pub fn insert_rating(
    conn: &mut DbConn,
    subject_id: &str,
    rater_id: &str,
    rater_name: Option<&str>,
    score: i32,
    comment: Option<&str>,
    created_at: NaiveDateTime,
    updated_at: Option<NaiveDateTime>,
) -> Result<RatingRow> {
    let sql = format!(
        "INSERT INTO ratings (subject_id, rater_id, rater_name, score, comment, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING {RATING_COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![subject_id, rater_id, rater_name, score, comment, created_at, updated_at],
        parse_rating_row,
    )
    .context("Failed to insert rating")
}

pub fn update_rating(
    conn: &mut DbConn,
    rating_id: i64,
    score: i32,
    comment: Option<&str>,
    updated_at: NaiveDateTime,
) -> Result<RatingRow> {
    let sql = format!(
        "UPDATE ratings SET score = ?1, comment = ?2, updated_at = ?3 \
         WHERE id = ?4 RETURNING {RATING_COLUMNS}"
    );

    conn.query_row(&sql, params![score, comment, updated_at, rating_id], parse_rating_row)
        .context("Failed to update rating")
}

pub fn list_by_subject(conn: &mut DbConn, subject_id: &str) -> Result<Vec<RatingRow>> {
    let sql = format!("SELECT {RATING_COLUMNS} FROM ratings WHERE subject_id = ?1");

    collect_rows(conn, &sql, subject_id).context("Failed to query ratings by subject")
}

/// Latest-first listing for review display. Ordering happens in the store so
/// callers get it without an in-memory sort.
pub fn list_by_subject_latest_first(
    conn: &mut DbConn,
    subject_id: &str,
) -> Result<Vec<RatingRow>> {
    let sql = format!(
        "SELECT {RATING_COLUMNS} FROM ratings WHERE subject_id = ?1 \
         ORDER BY COALESCE(updated_at, created_at) DESC, id DESC"
    );

    collect_rows(conn, &sql, subject_id).context("Failed to query ordered ratings by subject")
}

/// All records matching the logical (subject, rater) key, oldest first.
/// Duplicates can exist; callers update the first match.
pub fn find_by_subject_and_rater(
    conn: &mut DbConn,
    subject_id: &str,
    rater_id: &str,
) -> Result<Vec<RatingRow>> {
    let sql = format!(
        "SELECT {RATING_COLUMNS} FROM ratings WHERE subject_id = ?1 AND rater_id = ?2 \
         ORDER BY id"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![subject_id, rater_id], parse_rating_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

fn collect_rows(conn: &mut DbConn, sql: &str, subject_id: &str) -> Result<Vec<RatingRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![subject_id], parse_rating_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

fn parse_rating_row(row: &rusqlite::Row) -> rusqlite::Result<RatingRow> {
    Ok(RatingRow {
        id: row.get(0)?,
        subject_id: row.get(1)?,
        rater_id: row.get(2)?,
        rater_name: row.get(3)?,
        score: row.get(4)?,
        comment: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use super::connection::DbConn;
use super::models::SubjectRow;

const SUBJECT_COLUMNS: &str =
    "id, name, email, discipline, rating, reviews, review_band, created_at";

pub fn upsert_subject(
    conn: &mut DbConn,
    id: &str,
    name: &str,
    email: Option<&str>,
    discipline: Option<&str>,
) -> Result<SubjectRow> {
    if let Some(existing) = find_by_id(conn, id)? {
        // Re-imported profiles refresh contact fields but keep the aggregate
        let sql = format!(
            "UPDATE subjects SET name = ?1, email = COALESCE(?2, email), \
             discipline = COALESCE(?3, discipline) WHERE id = ?4 RETURNING {SUBJECT_COLUMNS}"
        );
        let updated = conn
            .query_row(&sql, params![name, email, discipline, existing.id], parse_subject_row)
            .context("Failed to update subject profile")?;
        return Ok(updated);
    }

    insert_new_subject(conn, id, name, email, discipline)
}

fn insert_new_subject(
    conn: &mut DbConn,
    id: &str,
    name: &str,
    email: Option<&str>,
    discipline: Option<&str>,
) -> Result<SubjectRow> {
    let sql = format!(
        "INSERT INTO subjects (id, name, email, discipline) VALUES (?1, ?2, ?3, ?4) \
         RETURNING {SUBJECT_COLUMNS}"
    );

    conn.query_row(&sql, params![id, name, email, discipline], parse_subject_row)
        .context("Failed to insert new subject")
}

pub fn find_by_id(conn: &mut DbConn, id: &str) -> Result<Option<SubjectRow>> {
    let sql = format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_subject_row)
        .optional()
        .context("Failed to query subject by id")
}

pub fn list_all(conn: &mut DbConn) -> Result<Vec<SubjectRow>> {
    let sql = format!("SELECT {SUBJECT_COLUMNS} FROM subjects ORDER BY id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_subject_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Overwrite the denormalized aggregate fields on a subject profile.
pub fn write_aggregate(
    conn: &mut DbConn,
    id: &str,
    average: f64,
    reviews: i32,
    review_band: &str,
) -> Result<bool> {
    let sql = "UPDATE subjects SET rating = ?1, reviews = ?2, review_band = ?3 WHERE id = ?4";

    let affected = conn
        .execute(sql, params![average, reviews, review_band, id])
        .context("Failed to write aggregate to subject profile")?;

    Ok(affected == 1)
}

fn parse_subject_row(row: &rusqlite::Row) -> rusqlite::Result<SubjectRow> {
    Ok(SubjectRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        discipline: row.get(3)?,
        rating: row.get(4)?,
        reviews: row.get(5)?,
        review_band: row.get(6)?,
        created_at: row.get(7)?,
    })
}

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::params;

use super::connection::DbConn;
use super::models::NotificationRow;

pub fn insert_notification(
    conn: &mut DbConn,
    user_id: &str,
    message: &str,
    created_at: NaiveDateTime,
) -> Result<NotificationRow> {
    let sql = "INSERT INTO notifications (user_id, message, created_at) VALUES (?1, ?2, ?3) \
               RETURNING id, user_id, message, created_at";

    conn.query_row(sql, params![user_id, message, created_at], parse_notification_row)
        .context("Failed to insert notification")
}

pub fn list_for_user(conn: &mut DbConn, user_id: &str) -> Result<Vec<NotificationRow>> {
    let sql = "SELECT id, user_id, message, created_at FROM notifications \
               WHERE user_id = ?1 ORDER BY id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![user_id], parse_notification_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

fn parse_notification_row(row: &rusqlite::Row) -> rusqlite::Result<NotificationRow> {
    Ok(NotificationRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        message: row.get(2)?,
        created_at: row.get(3)?,
    })
}

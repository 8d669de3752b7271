//! SQLite-backed run session cache.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rusqlite::{params, Connection, Row};
use stride_core::SessionCache;
use stride_domain::{Result, RunSession, StrideError};
use tokio::task;

use super::manager::{map_sql_error, DbManager};

/// SQLite implementation of the session cache port.
///
/// All queries run on the blocking thread pool; rows store timestamps as
/// epoch milliseconds.
pub struct SqliteSessionCache {
    db: Arc<DbManager>,
}

impl SqliteSessionCache {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionCache for SqliteSessionCache {
    async fn all_sessions(&self) -> Result<Vec<RunSession>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<RunSession>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(
                    "SELECT id, start_time_epoch_millis, end_time_epoch_millis, distance_meters,
                            active_duration_millis, average_pace_seconds_per_km,
                            average_heart_rate_bpm, title
                     FROM run_sessions
                     ORDER BY start_time_epoch_millis DESC",
                )
                .map_err(map_sql_error)?;

            let rows = stmt.query_map([], session_from_row).map_err(map_sql_error)?;
            let mut sessions = Vec::new();
            for row in rows {
                sessions.push(row.map_err(map_sql_error)??);
            }
            Ok(sessions)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn insert_all(&self, sessions: &[RunSession]) -> Result<()> {
        let db = Arc::clone(&self.db);
        let sessions = sessions.to_vec();

        task::spawn_blocking(move || -> Result<()> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;
            insert_sessions(&tx, &sessions)?;
            tx.commit().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn replace_all(&self, sessions: &[RunSession]) -> Result<()> {
        let db = Arc::clone(&self.db);
        let sessions = sessions.to_vec();

        task::spawn_blocking(move || -> Result<()> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;
            tx.execute("DELETE FROM run_sessions", []).map_err(map_sql_error)?;
            insert_sessions(&tx, &sessions)?;
            tx.commit().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn latest_end_time(&self) -> Result<Option<DateTime<Utc>>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Option<DateTime<Utc>>> {
            let conn = db.get_connection()?;
            let latest: Option<i64> = conn
                .query_row("SELECT MAX(end_time_epoch_millis) FROM run_sessions", [], |row| {
                    row.get(0)
                })
                .map_err(map_sql_error)?;
            latest.map(instant_from_millis).transpose()
        })
        .await
        .map_err(map_join_error)?
    }
}

fn insert_sessions(conn: &Connection, sessions: &[RunSession]) -> Result<()> {
    let mut stmt = conn
        .prepare(
            "INSERT OR REPLACE INTO run_sessions
                 (id, start_time_epoch_millis, end_time_epoch_millis, distance_meters,
                  active_duration_millis, average_pace_seconds_per_km,
                  average_heart_rate_bpm, title)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .map_err(map_sql_error)?;

    for session in sessions {
        stmt.execute(params![
            session.id,
            session.start_time.timestamp_millis(),
            session.end_time.timestamp_millis(),
            session.distance_meters,
            session.active_duration.num_milliseconds(),
            session.average_pace_seconds_per_km,
            session.average_heart_rate_bpm,
            session.title,
        ])
        .map_err(map_sql_error)?;
    }
    Ok(())
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Result<RunSession>> {
    let id: String = row.get(0)?;
    let start_millis: i64 = row.get(1)?;
    let end_millis: i64 = row.get(2)?;
    let distance_meters: f64 = row.get(3)?;
    let duration_millis: i64 = row.get(4)?;
    let average_pace_seconds_per_km: Option<f64> = row.get(5)?;
    let average_heart_rate_bpm: Option<i64> = row.get(6)?;
    let title: String = row.get(7)?;

    Ok(instant_from_millis(start_millis).and_then(|start_time| {
        let end_time = instant_from_millis(end_millis)?;
        Ok(RunSession {
            id,
            start_time,
            end_time,
            distance_meters,
            active_duration: Duration::milliseconds(duration_millis),
            average_pace_seconds_per_km,
            average_heart_rate_bpm,
            title,
        })
    }))
}

fn instant_from_millis(millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| StrideError::Database(format!("invalid stored timestamp: {millis}")))
}

fn map_join_error(err: task::JoinError) -> StrideError {
    StrideError::Internal(format!("blocking task failed: {err}"))
}

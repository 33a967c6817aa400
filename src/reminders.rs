//! The reminder log: the append-only record of dose actions.
//!
//! Appending a "took" entry also consumes one unit of the prescription's
//! stock. That side effect is fail-open: the log entry is the source of
//! truth and is never rolled back because stock bookkeeping hiccupped.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};
use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{ReminderAction, ReminderLog};
use crate::prescriptions;

/// Window applied when the caller does not ask for one.
pub const DEFAULT_LOG_WINDOW_DAYS: u32 = 30;

/// Hard cap on listed entries.
const MAX_LISTED_ENTRIES: u32 = 1000;

#[derive(Error, Debug)]
pub enum ReminderError {
    /// Only took / missed / snoozed may be reported.
    #[error("Invalid reminder action: {value}")]
    InvalidAction { value: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Append a dose action to the log.
///
/// `scheduled_at` records when the dose was due; when absent the append time
/// is used. `Pending` is a legal stored state but not a reportable action,
/// so it is rejected with [`ReminderError::InvalidAction`]. Strings outside
/// the enum never reach this function: they fail at `FromStr`.
pub fn append_log(
    conn: &Connection,
    prescription_id: &Uuid,
    patient_id: &Uuid,
    action: ReminderAction,
    note: Option<String>,
    scheduled_at: Option<DateTime<Utc>>,
) -> Result<ReminderLog, ReminderError> {
    if action == ReminderAction::Pending {
        return Err(ReminderError::InvalidAction {
            value: action.as_str().to_string(),
        });
    }

    let now = Utc::now();
    let entry = ReminderLog {
        id: Uuid::new_v4(),
        prescription_id: *prescription_id,
        patient_id: *patient_id,
        scheduled_at: scheduled_at.unwrap_or(now),
        action,
        action_at: now,
        note,
        created_at: now,
    };

    conn.execute(
        "INSERT INTO reminder_logs (
            id, prescription_id, patient_id, scheduled_at, action,
            action_at, note, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entry.id.to_string(),
            entry.prescription_id.to_string(),
            entry.patient_id.to_string(),
            entry.scheduled_at,
            entry.action.as_str(),
            entry.action_at,
            entry.note,
            entry.created_at,
        ],
    )
    .map_err(DatabaseError::from)?;

    if action == ReminderAction::Took {
        match prescriptions::decrement_stock_if_available(conn, prescription_id) {
            Ok(true) => {
                tracing::debug!(prescription = %prescription_id, "consumed one unit of stock")
            }
            Ok(false) => {}
            Err(e) => {
                // The entry stands even when depletion fails.
                tracing::warn!(
                    prescription = %prescription_id,
                    error = %e,
                    "stock depletion failed after log append"
                );
            }
        }
    }

    Ok(entry)
}

/// Entries for a patient within the last `days` days, newest first.
pub fn list_logs(
    conn: &Connection,
    patient_id: &Uuid,
    days: u32,
) -> Result<Vec<ReminderLog>, DatabaseError> {
    let since = Utc::now() - Duration::days(i64::from(days));

    let mut stmt = conn.prepare(
        "SELECT id, prescription_id, patient_id, scheduled_at, action,
                action_at, note, created_at
         FROM reminder_logs
         WHERE patient_id = ?1 AND created_at >= ?2
         ORDER BY created_at DESC
         LIMIT ?3",
    )?;
    let rows = stmt.query_map(
        params![patient_id.to_string(), since, MAX_LISTED_ENTRIES],
        log_from_row,
    )?;

    let mut logs = Vec::new();
    for row in rows {
        logs.push(row?);
    }
    Ok(logs)
}

fn log_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReminderLog> {
    Ok(ReminderLog {
        id: row
            .get::<_, String>(0)?
            .parse()
            .unwrap_or_else(|_| Uuid::nil()),
        prescription_id: row
            .get::<_, String>(1)?
            .parse()
            .unwrap_or_else(|_| Uuid::nil()),
        patient_id: row
            .get::<_, String>(2)?
            .parse()
            .unwrap_or_else(|_| Uuid::nil()),
        scheduled_at: row.get(3)?,
        action: row
            .get::<_, String>(4)?
            .parse()
            .unwrap_or(ReminderAction::Pending),
        action_at: row.get(5)?,
        note: row.get(6)?,
        created_at: row.get(7)?,
    })
}

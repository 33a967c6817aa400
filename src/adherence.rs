//! Adherence statistics, computed over the reminder log.
//!
//! Pure reads: computing stats never writes anything, so the numbers are
//! reproducible for any fixed log contents.

use chrono::{Duration, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DatabaseError;

/// Window applied when the caller does not ask for one.
pub const DEFAULT_STATS_WINDOW_DAYS: u32 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdherenceStats {
    /// Every entry in the window, whatever its action.
    pub total: u32,
    pub took: u32,
    pub missed: u32,
    pub snoozed: u32,
    /// took / total as a percentage, two decimal places. 0.0 for an empty
    /// window rather than a division error.
    pub adherence_rate: f64,
}

/// Adherence over the last `days` days for one patient.
pub fn stats(
    conn: &Connection,
    patient_id: &Uuid,
    days: u32,
) -> Result<AdherenceStats, DatabaseError> {
    let since = Utc::now() - Duration::days(i64::from(days));
    let patient = patient_id.to_string();

    let total: u32 = conn.query_row(
        "SELECT COUNT(*) FROM reminder_logs WHERE patient_id = ?1 AND created_at >= ?2",
        params![patient, since],
        |row| row.get(0),
    )?;

    let count_action = |action: &str| -> Result<u32, DatabaseError> {
        let n = conn.query_row(
            "SELECT COUNT(*) FROM reminder_logs
             WHERE patient_id = ?1 AND created_at >= ?2 AND action = ?3",
            params![patient, since, action],
            |row| row.get(0),
        )?;
        Ok(n)
    };

    let took = count_action("took")?;
    let missed = count_action("missed")?;
    let snoozed = count_action("snoozed")?;

    let adherence_rate = if total == 0 {
        0.0
    } else {
        let rate = f64::from(took) / f64::from(total) * 100.0;
        (rate * 100.0).round() / 100.0
    };

    Ok(AdherenceStats {
        total,
        took,
        missed,
        snoozed,
        adherence_rate,
    })
}

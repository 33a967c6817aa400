use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ReminderAction;

/// One reported dose action. Entries are immutable once appended: the log
/// is the system's source of truth for adherence, and nothing ever updates
/// or deletes a row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderLog {
    pub id: Uuid,
    pub prescription_id: Uuid,
    pub patient_id: Uuid,
    /// When the dose was due. Defaults to the append time unless the caller
    /// supplies the true scheduled time.
    pub scheduled_at: DateTime<Utc>,
    pub action: ReminderAction,
    pub action_at: DateTime<Utc>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

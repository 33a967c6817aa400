use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::UserRole;

/// An account holder. OTP state lives in storage only (see `auth`);
/// it is never part of the public record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

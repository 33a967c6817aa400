use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Emergency contact details, a closed structure rather than a free-form map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    pub relationship: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub allergies: Vec<String>,
    pub conditions: Vec<String>,
    pub primary_doctor_id: Option<Uuid>,
    pub emergency_contact: Option<EmergencyContact>,
    pub preferred_language: String,
    pub created_at: DateTime<Utc>,
}

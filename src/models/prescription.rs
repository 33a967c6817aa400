use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Frequency;

/// Dose schedule: ordered HH:MM times and weekday tokens ("Mon", "Tue", ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub times: Vec<String>,
    pub days: Vec<String>,
}

/// A medication prescribed to a patient.
///
/// `patient_id` and `medication_id` are opaque references — the store never
/// enforces their existence and deletion does not cascade in either
/// direction. `current_stock` is the only mutable field; it changes through
/// the explicit stock-update operation or the depletion rule, never both in
/// one call, and can never go negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub medication_id: Uuid,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: Frequency,
    pub schedule: Schedule,
    pub instructions: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub current_stock: u32,
    pub total_per_refill: u32,
    pub with_food: bool,
    pub created_at: DateTime<Utc>,
}

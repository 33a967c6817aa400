use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog entry for a medicine. Prescriptions reference it by id but the
/// catalog carries no derived behavior of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    pub generic_name: Option<String>,
    pub form: String,
    pub strength: Option<String>,
    pub manufacturer: Option<String>,
    pub description: Option<String>,
    pub common_uses: Option<String>,
    pub side_effects: Option<String>,
    pub created_at: DateTime<Utc>,
}

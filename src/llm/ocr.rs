//! Medicine label reading: a vision model extracts structured fields from a
//! photo, then the catalog is searched for likely matches.

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{LlmClient, LlmError};
use crate::db::DatabaseError;

const OCR_SYSTEM_PROMPT: &str =
    "You are an expert at reading medicine labels and extracting information.";

const OCR_USER_PROMPT: &str = r#"Analyze this medicine image and extract the following information in JSON format:
{
    "medicine_name": "extracted name",
    "strength": "dosage like 500mg",
    "form": "tablet/capsule/syrup etc",
    "manufacturer": "company name if visible",
    "confidence": 0.0-1.0
}
Only respond with valid JSON. If you cannot read the label clearly, set confidence to 0."#;

const CANDIDATE_LIMIT: u32 = 3;

/// Confidence assigned to catalog matches. The match is a substring lookup,
/// not a certainty, so it never claims 1.0.
const CANDIDATE_CONFIDENCE: f64 = 0.8;

/// Fields read off a medicine label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelExtraction {
    pub medicine_name: String,
    #[serde(default)]
    pub strength: String,
    #[serde(default = "default_form")]
    pub form: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub confidence: f64,
}

fn default_form() -> String {
    "tablet".to_string()
}

impl LabelExtraction {
    /// The canonical unreadable-label result. Callers can rely on this exact
    /// shape when the model output cannot be parsed.
    pub fn fallback() -> Self {
        Self {
            medicine_name: "Unknown".to_string(),
            strength: String::new(),
            form: "tablet".to_string(),
            manufacturer: None,
            confidence: 0.0,
        }
    }
}

/// A catalog entry resembling the extracted name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationCandidate {
    pub id: Uuid,
    pub name: String,
    pub generic_name: String,
    pub form: String,
    pub strength: String,
    pub confidence: f64,
}

/// Ask the vision model to read the label.
///
/// Unparseable model output degrades to [`LabelExtraction::fallback`]
/// rather than an error: a blurry photo is an expected outcome, not a
/// failure of the service.
pub fn extract_label(
    llm: &dyn LlmClient,
    model: &str,
    image_base64: &str,
) -> Result<LabelExtraction, LlmError> {
    let raw = llm.generate_with_image(model, OCR_USER_PROMPT, image_base64, OCR_SYSTEM_PROMPT)?;
    Ok(parse_extraction(&raw))
}

/// Parse the model's JSON reply, tolerating markdown code fences.
pub fn parse_extraction(raw: &str) -> LabelExtraction {
    let cleaned = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    match serde_json::from_str(cleaned) {
        Ok(extraction) => extraction,
        Err(e) => {
            tracing::debug!(error = %e, "label extraction output was not valid JSON");
            LabelExtraction::fallback()
        }
    }
}

/// Catalog entries whose name contains the extracted name, best-effort.
/// An unreadable extraction yields no candidates.
pub fn match_candidates(
    conn: &Connection,
    extraction: &LabelExtraction,
) -> Result<Vec<MedicationCandidate>, DatabaseError> {
    let name = extraction.medicine_name.trim();
    if name.is_empty() || name == "Unknown" {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare(
        "SELECT id, name, generic_name, form, strength FROM medications
         WHERE name LIKE '%' || ?1 || '%' COLLATE NOCASE
         ORDER BY name LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![name, CANDIDATE_LIMIT], |row| {
        Ok(MedicationCandidate {
            id: row
                .get::<_, String>(0)?
                .parse()
                .unwrap_or_else(|_| Uuid::nil()),
            name: row.get(1)?,
            generic_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            form: row.get(3)?,
            strength: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            confidence: CANDIDATE_CONFIDENCE,
        })
    })?;

    let mut candidates = Vec::new();
    for row in rows {
        candidates.push(row?);
    }
    Ok(candidates)
}

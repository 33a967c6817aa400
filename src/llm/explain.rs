//! Plain-language medicine explanations for patients.

use rusqlite::Connection;
use serde::Deserialize;
use uuid::Uuid;

use super::{LlmClient, LlmError};
use crate::db::DatabaseError;
use crate::medications;
use crate::models::Medication;

const EXPLAIN_SYSTEM_PROMPT: &str = "You are a helpful medical information assistant. Always provide information in simple, clear language suitable for elderly patients. Always add a disclaimer that patients should consult their doctor.";

/// Appended verbatim to every explanation, whatever the model said.
pub const DISCLAIMER: &str = "\n\n⚠️ This is informational only. Always follow your doctor's prescription and consult them for medical advice.";

/// What the patient wants to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Summary,
    Interactions,
    Dosage,
    SideEffects,
    Custom,
}

/// Resolve the medicine being asked about, by id first, then exact name.
pub fn resolve_medication(
    conn: &Connection,
    medication_id: Option<&Uuid>,
    medication_name: Option<&str>,
) -> Result<Medication, DatabaseError> {
    if let Some(id) = medication_id {
        return medications::get_medication(conn, id);
    }
    if let Some(name) = medication_name {
        if let Some(medication) = medications::find_by_name(conn, name)? {
            return Ok(medication);
        }
        return Err(DatabaseError::NotFound {
            entity_type: "medication".into(),
            id: name.to_string(),
        });
    }
    Err(DatabaseError::NotFound {
        entity_type: "medication".into(),
        id: "unspecified".into(),
    })
}

/// Build the model prompt for one query kind.
pub fn build_query(
    kind: QueryKind,
    medication: &Medication,
    custom_query: Option<&str>,
) -> String {
    let name = &medication.name;
    let generic = medication.generic_name.as_deref().unwrap_or("");

    match kind {
        QueryKind::Summary => format!(
            "Explain {name} ({generic}) in simple language suitable for elderly patients. \
             Include: 1) What it's used for, 2) Common dosage, 3) Important warnings. \
             Keep it to 3-4 short bullet points."
        ),
        QueryKind::Interactions => format!(
            "What are common drug interactions with {name}? Also mention food interactions. \
             Keep it brief and simple."
        ),
        QueryKind::Dosage => format!(
            "What is the typical dosage for {name}? Explain in simple terms for elderly patients."
        ),
        QueryKind::SideEffects => format!(
            "What are the common side effects of {name}? \
             List only the most important ones in simple language."
        ),
        QueryKind::Custom => custom_query
            .map(str::to_string)
            .unwrap_or_else(|| format!("Tell me about {name}")),
    }
}

/// Generate an explanation, always ending with the safety disclaimer.
pub fn explain(
    llm: &dyn LlmClient,
    model: &str,
    medication: &Medication,
    kind: QueryKind,
    custom_query: Option<&str>,
) -> Result<String, LlmError> {
    let query = build_query(kind, medication, custom_query);
    let answer = llm.generate(model, &query, EXPLAIN_SYSTEM_PROMPT)?;
    Ok(answer + DISCLAIMER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::llm::MockLlmClient;
    use crate::medications::{find_by_name, seed_catalog};

    fn metformin(conn: &Connection) -> Medication {
        find_by_name(conn, "Metformin 500mg").unwrap().unwrap()
    }

    #[test]
    fn each_kind_builds_its_template() {
        let conn = open_memory_database().unwrap();
        seed_catalog(&conn).unwrap();
        let med = metformin(&conn);

        let summary = build_query(QueryKind::Summary, &med, None);
        assert!(summary.contains("Metformin 500mg (Metformin)"));
        assert!(summary.contains("bullet points"));

        assert!(build_query(QueryKind::Interactions, &med, None).contains("drug interactions"));
        assert!(build_query(QueryKind::Dosage, &med, None).contains("typical dosage"));
        assert!(build_query(QueryKind::SideEffects, &med, None).contains("side effects"));
    }

    #[test]
    fn custom_kind_uses_the_given_question() {
        let conn = open_memory_database().unwrap();
        seed_catalog(&conn).unwrap();
        let med = metformin(&conn);

        let q = build_query(QueryKind::Custom, &med, Some("Can I take this at night?"));
        assert_eq!(q, "Can I take this at night?");

        // No custom question falls back to a generic one.
        let q = build_query(QueryKind::Custom, &med, None);
        assert_eq!(q, "Tell me about Metformin 500mg");
    }

    #[test]
    fn disclaimer_is_always_appended() {
        let conn = open_memory_database().unwrap();
        seed_catalog(&conn).unwrap();
        let med = metformin(&conn);

        let mock = MockLlmClient::new("Metformin helps control blood sugar.");
        let text = explain(&mock, "medgemma:4b", &med, QueryKind::Summary, None).unwrap();
        assert!(text.starts_with("Metformin helps control blood sugar."));
        assert!(text.ends_with(DISCLAIMER));
    }

    #[test]
    fn resolve_prefers_id_then_exact_name() {
        let conn = open_memory_database().unwrap();
        seed_catalog(&conn).unwrap();
        let med = metformin(&conn);

        let by_id = resolve_medication(&conn, Some(&med.id), None).unwrap();
        assert_eq!(by_id.id, med.id);

        let by_name = resolve_medication(&conn, None, Some("metformin 500MG")).unwrap();
        assert_eq!(by_name.id, med.id);

        let err = resolve_medication(&conn, None, Some("Unobtainium")).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));

        let err = resolve_medication(&conn, None, None).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }
}

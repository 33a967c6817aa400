//! Medicine explanation endpoint.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::llm::explain::{self, QueryKind};

#[derive(Deserialize)]
pub struct ExplainRequest {
    pub medication_id: Option<Uuid>,
    pub medication_name: Option<String>,
    #[serde(default = "default_query_kind")]
    pub query_type: QueryKind,
    pub custom_query: Option<String>,
}

fn default_query_kind() -> QueryKind {
    QueryKind::Summary
}

#[derive(Serialize)]
pub struct MedicationRef {
    pub name: String,
    pub generic_name: String,
}

#[derive(Serialize)]
pub struct ExplainResponse {
    pub success: bool,
    pub explanation: String,
    pub medication: MedicationRef,
}

/// `POST /api/ai/explain` — plain-language explanation of a medicine.
pub async fn explain(
    State(ctx): State<ApiContext>,
    Json(request): Json<ExplainRequest>,
) -> Result<Json<ExplainResponse>, ApiError> {
    // Resolve in its own scope so the database lock is released before the
    // model call.
    let medication = {
        let conn = ctx.db.conn()?;
        explain::resolve_medication(
            &conn,
            request.medication_id.as_ref(),
            request.medication_name.as_deref(),
        )?
    };

    let llm = ctx.llm.clone();
    let model = ctx.config.explain_model.clone();
    let med = medication.clone();
    let explanation = tokio::task::spawn_blocking(move || {
        explain::explain(
            llm.as_ref(),
            &model,
            &med,
            request.query_type,
            request.custom_query.as_deref(),
        )
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(ExplainResponse {
        success: true,
        explanation,
        medication: MedicationRef {
            name: medication.name,
            generic_name: medication.generic_name.unwrap_or_default(),
        },
    }))
}

//! Medicine catalog endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::medications;
use crate::models::Medication;

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub medications: Vec<Medication>,
}

/// `GET /api/medications/search?q=...`
pub async fn search(
    State(ctx): State<ApiContext>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let conn = ctx.db.conn()?;
    let medications = medications::search_medications(&conn, &query.q)?;

    Ok(Json(SearchResponse {
        success: true,
        medications,
    }))
}

#[derive(Serialize)]
pub struct MedicationResponse {
    pub success: bool,
    pub medication: Medication,
}

/// `GET /api/medications/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<MedicationResponse>, ApiError> {
    let medication_id = parse_id("medication", &id)?;

    let conn = ctx.db.conn()?;
    let medication = medications::get_medication(&conn, &medication_id)?;

    Ok(Json(MedicationResponse {
        success: true,
        medication,
    }))
}

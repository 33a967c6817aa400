//! Patient profile endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use super::parse_id;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::Patient;
use crate::patients::{self, NewPatient, PatientUpdate};

#[derive(Serialize)]
pub struct PatientResponse {
    pub success: bool,
    pub patient: Patient,
}

/// `POST /api/patients`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(request): Json<NewPatient>,
) -> Result<Json<PatientResponse>, ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::Validation("Patient name is required".into()));
    }

    let conn = ctx.db.conn()?;
    let patient = patients::create_patient(&conn, request)?;

    Ok(Json(PatientResponse {
        success: true,
        patient,
    }))
}

/// `GET /api/patients/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<PatientResponse>, ApiError> {
    let patient_id = parse_id("patient", &id)?;

    let conn = ctx.db.conn()?;
    let patient = patients::get_patient(&conn, &patient_id)?;

    Ok(Json(PatientResponse {
        success: true,
        patient,
    }))
}

#[derive(Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub message: String,
}

/// `PUT /api/patients/:id` — partial update over a closed field set.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(request): Json<PatientUpdate>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let patient_id = parse_id("patient", &id)?;

    let conn = ctx.db.conn()?;
    patients::update_patient(&conn, &patient_id, &request)?;

    Ok(Json(UpdateResponse {
        success: true,
        message: "Patient updated".into(),
    }))
}

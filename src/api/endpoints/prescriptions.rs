//! Prescription endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::Prescription;
use crate::prescriptions::{self, NewPrescription};

#[derive(Serialize)]
pub struct PrescriptionResponse {
    pub success: bool,
    pub prescription: Prescription,
}

/// `POST /api/prescriptions`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(request): Json<NewPrescription>,
) -> Result<Json<PrescriptionResponse>, ApiError> {
    if request.medication_name.trim().is_empty() {
        return Err(ApiError::Validation("Medication name is required".into()));
    }

    let conn = ctx.db.conn()?;
    let prescription = prescriptions::create_prescription(&conn, request)?;

    Ok(Json(PrescriptionResponse {
        success: true,
        prescription,
    }))
}

#[derive(Serialize)]
pub struct PrescriptionListResponse {
    pub success: bool,
    pub prescriptions: Vec<Prescription>,
}

/// `GET /api/prescriptions/patient/:patient_id`
pub async fn list_for_patient(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<PrescriptionListResponse>, ApiError> {
    let patient_id = parse_id("patient", &patient_id)?;

    let conn = ctx.db.conn()?;
    let prescriptions = prescriptions::list_by_patient(&conn, &patient_id)?;

    Ok(Json(PrescriptionListResponse {
        success: true,
        prescriptions,
    }))
}

/// `GET /api/prescriptions/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<PrescriptionResponse>, ApiError> {
    let prescription_id = parse_id("prescription", &id)?;

    let conn = ctx.db.conn()?;
    let prescription = prescriptions::get_prescription(&conn, &prescription_id)?;

    Ok(Json(PrescriptionResponse {
        success: true,
        prescription,
    }))
}

#[derive(Deserialize)]
pub struct UpdateStockRequest {
    pub new_stock: u32,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// `PUT /api/prescriptions/:id/stock` — overwrite the stock count.
pub async fn update_stock(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStockRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let prescription_id = parse_id("prescription", &id)?;

    let conn = ctx.db.conn()?;
    prescriptions::update_stock(&conn, &prescription_id, request.new_stock)?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Stock updated".into(),
    }))
}

/// `DELETE /api/prescriptions/:id`
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let prescription_id = parse_id("prescription", &id)?;

    let conn = ctx.db.conn()?;
    prescriptions::delete_prescription(&conn, &prescription_id)?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Prescription deleted".into(),
    }))
}

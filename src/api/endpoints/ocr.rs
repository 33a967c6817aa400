//! Medicine label recognition endpoint.

use axum::extract::State;
use axum::Json;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::llm::ocr::{self, LabelExtraction, MedicationCandidate};

#[derive(Deserialize)]
pub struct RecognizeRequest {
    pub image_base64: String,
}

#[derive(Serialize)]
pub struct RecognizeResponse {
    pub success: bool,
    pub extracted: LabelExtraction,
    pub candidates: Vec<MedicationCandidate>,
}

/// `POST /api/ocr/recognize` — read a medicine label photo.
///
/// The vision call is blocking, so it runs on the blocking pool; the catalog
/// lookup happens afterwards so the database lock is never held across it.
pub async fn recognize(
    State(ctx): State<ApiContext>,
    Json(request): Json<RecognizeRequest>,
) -> Result<Json<RecognizeResponse>, ApiError> {
    if request.image_base64.trim().is_empty() {
        return Err(ApiError::Validation("image_base64 is required".into()));
    }
    if base64::engine::general_purpose::STANDARD
        .decode(request.image_base64.trim())
        .is_err()
    {
        return Err(ApiError::Validation(
            "image_base64 is not valid base64".into(),
        ));
    }

    let llm = ctx.llm.clone();
    let model = ctx.config.ocr_model.clone();
    let extracted = tokio::task::spawn_blocking(move || {
        ocr::extract_label(llm.as_ref(), &model, &request.image_base64)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    let candidates = {
        let conn = ctx.db.conn()?;
        ocr::match_candidates(&conn, &extracted)?
    };

    Ok(Json(RecognizeResponse {
        success: true,
        extracted,
        candidates,
    }))
}

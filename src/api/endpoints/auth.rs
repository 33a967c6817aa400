//! OTP login endpoints.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth;
use crate::models::UserRole;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub phone: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    /// Demo deployment: no SMS gateway, so the code comes back to the
    /// client directly.
    pub otp: String,
}

/// `POST /api/auth/login` — request an OTP for a phone number.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let phone = request.phone.trim();
    if phone.is_empty() {
        return Err(ApiError::Validation("Phone number is required".into()));
    }

    let conn = ctx.db.conn()?;
    let (otp, _expires_at) = auth::issue_otp(&conn, phone)?;
    tracing::info!(phone, "OTP issued");

    Ok(Json(LoginResponse {
        success: true,
        message: "OTP sent successfully".into(),
        otp,
    }))
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub phone: String,
    pub otp: String,
}

#[derive(Serialize)]
pub struct UserSummary {
    pub id: String,
    pub phone: Option<String>,
    pub name: String,
    pub role: UserRole,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    /// The user id doubles as the session token.
    pub token: String,
    pub user: UserSummary,
}

/// `POST /api/auth/verify` — exchange phone + OTP for a token.
pub async fn verify(
    State(ctx): State<ApiContext>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let conn = ctx.db.conn()?;
    let user = auth::verify_otp(&conn, request.phone.trim(), request.otp.trim())?;

    Ok(Json(VerifyResponse {
        success: true,
        token: user.id.to_string(),
        user: UserSummary {
            id: user.id.to_string(),
            phone: user.phone,
            name: user.name,
            role: user.role,
        },
    }))
}

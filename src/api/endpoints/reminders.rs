//! Reminder log and adherence endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::parse_id;
use crate::adherence::{self, AdherenceStats, DEFAULT_STATS_WINDOW_DAYS};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{ReminderAction, ReminderLog};
use crate::reminders::{self, DEFAULT_LOG_WINDOW_DAYS};

#[derive(Deserialize)]
pub struct LogReminderRequest {
    pub prescription_id: Uuid,
    pub patient_id: Uuid,
    /// "took", "missed" or "snoozed".
    pub action: String,
    pub note: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct LogReminderResponse {
    pub success: bool,
    pub log: ReminderLog,
}

/// `POST /api/reminders/log` — report a dose action.
pub async fn log(
    State(ctx): State<ApiContext>,
    Json(request): Json<LogReminderRequest>,
) -> Result<Json<LogReminderResponse>, ApiError> {
    let action: ReminderAction = request
        .action
        .parse()
        .map_err(|_| ApiError::Validation(format!("Invalid reminder action: {}", request.action)))?;

    let conn = ctx.db.conn()?;
    let log = reminders::append_log(
        &conn,
        &request.prescription_id,
        &request.patient_id,
        action,
        request.note,
        request.scheduled_at,
    )?;

    Ok(Json(LogReminderResponse { success: true, log }))
}

#[derive(Deserialize)]
pub struct WindowQuery {
    pub days: Option<u32>,
}

#[derive(Serialize)]
pub struct LogListResponse {
    pub success: bool,
    pub logs: Vec<ReminderLog>,
}

/// `GET /api/reminders/logs/patient/:patient_id?days=30`
pub async fn list(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<LogListResponse>, ApiError> {
    let patient_id = parse_id("patient", &patient_id)?;
    let days = query.days.unwrap_or(DEFAULT_LOG_WINDOW_DAYS);

    let conn = ctx.db.conn()?;
    let logs = reminders::list_logs(&conn, &patient_id, days)?;

    Ok(Json(LogListResponse {
        success: true,
        logs,
    }))
}

#[derive(Serialize)]
pub struct AdherenceResponse {
    pub success: bool,
    pub stats: AdherenceStats,
}

/// `GET /api/reminders/adherence/:patient_id?days=7`
pub async fn stats(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<AdherenceResponse>, ApiError> {
    let patient_id = parse_id("patient", &patient_id)?;
    let days = query.days.unwrap_or(DEFAULT_STATS_WINDOW_DAYS);

    let conn = ctx.db.conn()?;
    let stats = adherence::stats(&conn, &patient_id, days)?;

    Ok(Json(AdherenceResponse {
        success: true,
        stats,
    }))
}

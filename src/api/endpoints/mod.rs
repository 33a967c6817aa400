//! HTTP endpoint handlers, one module per resource.
//!
//! Successful responses carry `"success": true` alongside their payload;
//! failures are [`ApiError`](crate::api::error::ApiError) responses with a
//! `detail` field.

pub mod ai;
pub mod auth;
pub mod health;
pub mod medications;
pub mod ocr;
pub mod patients;
pub mod prescriptions;
pub mod reminders;

use uuid::Uuid;

use crate::api::error::ApiError;

/// Parse a path segment as a UUID, reporting which kind of id was malformed.
fn parse_id(kind: &str, raw: &str) -> Result<Uuid, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::Validation(format!("Invalid {kind} id: {raw}")))
}

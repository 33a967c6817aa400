//! Phone-number OTP login.
//!
//! No SMS gateway is wired up: the issued code is returned to the caller so
//! a demo client can display it. A verified login yields the `User` record;
//! the user id doubles as the session token for this deployment.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rusqlite::{params, Connection};
use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{User, UserRole};

/// How long an issued code stays valid.
pub const OTP_TTL_MINUTES: i64 = 10;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid OTP")]
    InvalidOtp,

    #[error("OTP expired")]
    OtpExpired,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Issue a fresh 6-digit code for `phone`, creating the user on first login.
///
/// Re-issuing overwrites any previous unexpired code. Returns the code and
/// its expiry instant.
pub fn issue_otp(
    conn: &Connection,
    phone: &str,
) -> Result<(String, DateTime<Utc>), AuthError> {
    let otp = rand::thread_rng().gen_range(100_000..=999_999).to_string();
    let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

    let updated = conn
        .execute(
            "UPDATE users SET otp = ?1, otp_expires_at = ?2 WHERE phone = ?3",
            params![otp, expires_at, phone],
        )
        .map_err(DatabaseError::from)?;

    if updated == 0 {
        conn.execute(
            "INSERT INTO users (id, phone, name, role, otp, otp_expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                Uuid::new_v4().to_string(),
                phone,
                "User",
                UserRole::Patient.as_str(),
                otp,
                expires_at,
                Utc::now(),
            ],
        )
        .map_err(DatabaseError::from)?;
    }

    Ok((otp, expires_at))
}

/// Check a submitted code and consume it on success.
pub fn verify_otp(conn: &Connection, phone: &str, otp: &str) -> Result<User, AuthError> {
    struct Row {
        id: String,
        phone: Option<String>,
        email: Option<String>,
        name: String,
        role: String,
        otp: Option<String>,
        otp_expires_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    }

    let result = conn.query_row(
        "SELECT id, phone, email, name, role, otp, otp_expires_at, created_at
         FROM users WHERE phone = ?1",
        params![phone],
        |row| {
            Ok(Row {
                id: row.get(0)?,
                phone: row.get(1)?,
                email: row.get(2)?,
                name: row.get(3)?,
                role: row.get(4)?,
                otp: row.get(5)?,
                otp_expires_at: row.get(6)?,
                created_at: row.get(7)?,
            })
        },
    );

    let row = match result {
        Ok(row) => row,
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            return Err(AuthError::Database(DatabaseError::NotFound {
                entity_type: "user".into(),
                id: phone.to_string(),
            }))
        }
        Err(e) => return Err(AuthError::Database(e.into())),
    };

    match row.otp.as_deref() {
        Some(stored) if stored == otp => {}
        _ => return Err(AuthError::InvalidOtp),
    }
    match row.otp_expires_at {
        Some(expires) if expires >= Utc::now() => {}
        _ => return Err(AuthError::OtpExpired),
    }

    // Single-use: clear the code before handing back the user.
    conn.execute(
        "UPDATE users SET otp = NULL, otp_expires_at = NULL WHERE id = ?1",
        params![row.id],
    )
    .map_err(DatabaseError::from)?;

    let role = row
        .role
        .parse::<UserRole>()
        .map_err(AuthError::Database)?;

    Ok(User {
        id: row.id.parse().unwrap_or_else(|_| Uuid::nil()),
        phone: row.phone,
        email: row.email,
        name: row.name,
        role,
        created_at: row.created_at,
    })
}

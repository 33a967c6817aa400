//! Patient profiles — creation, lookup, and partial update.
//!
//! Patients are data-model leaves: the adherence core only ever sees their
//! ids. The partial update exposes a closed set of fields, not an arbitrary
//! column map.

use chrono::Utc;
use rusqlite::{params, Connection};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{EmergencyContact, Patient};

/// Input for creating a patient profile.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPatient {
    pub user_id: Uuid,
    pub name: String,
    pub dob: Option<String>,
    pub gender: Option<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
    pub emergency_contact: Option<EmergencyContact>,
    #[serde(default = "default_language")]
    pub preferred_language: String,
}

fn default_language() -> String {
    "en".to_string()
}

/// The closed set of updatable fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub conditions: Option<Vec<String>>,
    pub primary_doctor_id: Option<Uuid>,
    pub emergency_contact: Option<EmergencyContact>,
    pub preferred_language: Option<String>,
}

/// Create a patient profile.
pub fn create_patient(conn: &Connection, input: NewPatient) -> Result<Patient, DatabaseError> {
    let patient = Patient {
        id: Uuid::new_v4(),
        user_id: input.user_id,
        name: input.name,
        dob: input.dob,
        gender: input.gender,
        allergies: input.allergies,
        conditions: input.conditions,
        primary_doctor_id: None,
        emergency_contact: input.emergency_contact,
        preferred_language: input.preferred_language,
        created_at: Utc::now(),
    };

    let allergies = serde_json::to_string(&patient.allergies).unwrap_or_else(|_| "[]".into());
    let conditions = serde_json::to_string(&patient.conditions).unwrap_or_else(|_| "[]".into());
    let contact = patient.emergency_contact.as_ref();

    conn.execute(
        "INSERT INTO patients (
            id, user_id, name, dob, gender, allergies, conditions,
            primary_doctor_id, emergency_contact_name, emergency_contact_phone,
            emergency_contact_relationship, preferred_language, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            patient.id.to_string(),
            patient.user_id.to_string(),
            patient.name,
            patient.dob,
            patient.gender,
            allergies,
            conditions,
            patient.primary_doctor_id.map(|id| id.to_string()),
            contact.map(|c| c.name.clone()),
            contact.map(|c| c.phone.clone()),
            contact.and_then(|c| c.relationship.clone()),
            patient.preferred_language,
            patient.created_at,
        ],
    )?;

    Ok(patient)
}

/// Fetch a patient by id.
pub fn get_patient(conn: &Connection, patient_id: &Uuid) -> Result<Patient, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, user_id, name, dob, gender, allergies, conditions,
                primary_doctor_id, emergency_contact_name, emergency_contact_phone,
                emergency_contact_relationship, preferred_language, created_at
         FROM patients WHERE id = ?1",
        params![patient_id.to_string()],
        patient_from_row,
    );

    match result {
        Ok(patient) => Ok(patient),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(DatabaseError::NotFound {
            entity_type: "patient".into(),
            id: patient_id.to_string(),
        }),
        Err(e) => Err(DatabaseError::from(e)),
    }
}

/// Apply a partial update. Fields left as `None` are untouched.
///
/// An update with no fields set degenerates to an existence check so the
/// caller still gets `NotFound` for an unknown id.
pub fn update_patient(
    conn: &Connection,
    patient_id: &Uuid,
    update: &PatientUpdate,
) -> Result<(), DatabaseError> {
    let mut sets: Vec<String> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    let push = |sets: &mut Vec<String>,
                values: &mut Vec<Box<dyn rusqlite::types::ToSql>>,
                column: &str,
                value: Box<dyn rusqlite::types::ToSql>| {
        sets.push(format!("{column} = ?{}", values.len() + 1));
        values.push(value);
    };

    if let Some(name) = &update.name {
        push(&mut sets, &mut values, "name", Box::new(name.clone()));
    }
    if let Some(dob) = &update.dob {
        push(&mut sets, &mut values, "dob", Box::new(dob.clone()));
    }
    if let Some(gender) = &update.gender {
        push(&mut sets, &mut values, "gender", Box::new(gender.clone()));
    }
    if let Some(allergies) = &update.allergies {
        let json = serde_json::to_string(allergies).unwrap_or_else(|_| "[]".into());
        push(&mut sets, &mut values, "allergies", Box::new(json));
    }
    if let Some(conditions) = &update.conditions {
        let json = serde_json::to_string(conditions).unwrap_or_else(|_| "[]".into());
        push(&mut sets, &mut values, "conditions", Box::new(json));
    }
    if let Some(doctor_id) = &update.primary_doctor_id {
        push(
            &mut sets,
            &mut values,
            "primary_doctor_id",
            Box::new(doctor_id.to_string()),
        );
    }
    if let Some(contact) = &update.emergency_contact {
        push(
            &mut sets,
            &mut values,
            "emergency_contact_name",
            Box::new(contact.name.clone()),
        );
        push(
            &mut sets,
            &mut values,
            "emergency_contact_phone",
            Box::new(contact.phone.clone()),
        );
        push(
            &mut sets,
            &mut values,
            "emergency_contact_relationship",
            Box::new(contact.relationship.clone()),
        );
    }
    if let Some(lang) = &update.preferred_language {
        push(
            &mut sets,
            &mut values,
            "preferred_language",
            Box::new(lang.clone()),
        );
    }

    if sets.is_empty() {
        get_patient(conn, patient_id)?;
        return Ok(());
    }

    let sql = format!(
        "UPDATE patients SET {} WHERE id = ?{}",
        sets.join(", "),
        values.len() + 1
    );
    values.push(Box::new(patient_id.to_string()));

    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        values.iter().map(|v| v.as_ref()).collect();
    let changed = conn.execute(&sql, params_refs.as_slice())?;

    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "patient".into(),
            id: patient_id.to_string(),
        });
    }
    Ok(())
}

fn patient_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Patient> {
    let contact_name: Option<String> = row.get(8)?;
    let contact_phone: Option<String> = row.get(9)?;
    let emergency_contact = match (contact_name, contact_phone) {
        (Some(name), Some(phone)) => Some(EmergencyContact {
            name,
            phone,
            relationship: row.get(10)?,
        }),
        _ => None,
    };

    Ok(Patient {
        id: row
            .get::<_, String>(0)?
            .parse()
            .unwrap_or_else(|_| Uuid::nil()),
        user_id: row
            .get::<_, String>(1)?
            .parse()
            .unwrap_or_else(|_| Uuid::nil()),
        name: row.get(2)?,
        dob: row.get(3)?,
        gender: row.get(4)?,
        allergies: serde_json::from_str(&row.get::<_, String>(5)?).unwrap_or_default(),
        conditions: serde_json::from_str(&row.get::<_, String>(6)?).unwrap_or_default(),
        primary_doctor_id: row
            .get::<_, Option<String>>(7)?
            .and_then(|s| s.parse().ok()),
        emergency_contact,
        preferred_language: row.get(11)?,
        created_at: row.get(12)?,
    })
}

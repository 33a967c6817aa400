//! Prescription store.
//!
//! `current_stock` changes through exactly two paths: the explicit overwrite
//! in [`update_stock`] and the conditional decrement in
//! [`decrement_stock_if_available`]. The decrement is a single UPDATE with
//! the availability check in its WHERE clause, so stock can never be driven
//! below zero however calls interleave.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::medications;
use crate::models::{Frequency, Prescription, Schedule};

const PATIENT_LIST_LIMIT: u32 = 100;

/// Input for creating a prescription. The medicine is referenced by name and
/// resolved against the catalog, creating an entry when none matches.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPrescription {
    pub patient_id: Uuid,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: Frequency,
    #[serde(default)]
    pub schedule: Schedule,
    pub instructions: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub current_stock: u32,
    #[serde(default)]
    pub total_per_refill: u32,
    #[serde(default)]
    pub with_food: bool,
}

pub fn create_prescription(
    conn: &Connection,
    input: NewPrescription,
) -> Result<Prescription, DatabaseError> {
    let medication = medications::find_or_create_by_name(conn, &input.medication_name)?;

    let prescription = Prescription {
        id: Uuid::new_v4(),
        patient_id: input.patient_id,
        medication_id: medication.id,
        medication_name: input.medication_name,
        dosage: input.dosage,
        frequency: input.frequency,
        schedule: input.schedule,
        instructions: input.instructions,
        start_date: input.start_date,
        end_date: input.end_date,
        current_stock: input.current_stock,
        total_per_refill: input.total_per_refill,
        with_food: input.with_food,
        created_at: Utc::now(),
    };

    let times = serde_json::to_string(&prescription.schedule.times).unwrap_or_else(|_| "[]".into());
    let days = serde_json::to_string(&prescription.schedule.days).unwrap_or_else(|_| "[]".into());

    conn.execute(
        "INSERT INTO prescriptions (
            id, patient_id, medication_id, medication_name, dosage, frequency,
            schedule_times, schedule_days, instructions, start_date, end_date,
            current_stock, total_per_refill, with_food, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            prescription.id.to_string(),
            prescription.patient_id.to_string(),
            prescription.medication_id.to_string(),
            prescription.medication_name,
            prescription.dosage,
            prescription.frequency.as_str(),
            times,
            days,
            prescription.instructions,
            prescription.start_date,
            prescription.end_date,
            prescription.current_stock,
            prescription.total_per_refill,
            prescription.with_food,
            prescription.created_at,
        ],
    )?;

    Ok(prescription)
}

pub fn get_prescription(
    conn: &Connection,
    prescription_id: &Uuid,
) -> Result<Prescription, DatabaseError> {
    let result = conn.query_row(
        &format!("{SELECT_COLUMNS} WHERE id = ?1"),
        params![prescription_id.to_string()],
        prescription_from_row,
    );

    match result {
        Ok(prescription) => Ok(prescription),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(DatabaseError::NotFound {
            entity_type: "prescription".into(),
            id: prescription_id.to_string(),
        }),
        Err(e) => Err(DatabaseError::from(e)),
    }
}

/// All prescriptions for a patient, newest first.
pub fn list_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} WHERE patient_id = ?1 ORDER BY created_at DESC LIMIT ?2"
    ))?;
    let rows = stmt.query_map(
        params![patient_id.to_string(), PATIENT_LIST_LIMIT],
        prescription_from_row,
    )?;

    let mut prescriptions = Vec::new();
    for row in rows {
        prescriptions.push(row?);
    }
    Ok(prescriptions)
}

/// Overwrite the stock count, e.g. after a refill.
pub fn update_stock(
    conn: &Connection,
    prescription_id: &Uuid,
    new_stock: u32,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE prescriptions SET current_stock = ?1 WHERE id = ?2",
        params![new_stock, prescription_id.to_string()],
    )?;

    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "prescription".into(),
            id: prescription_id.to_string(),
        });
    }
    Ok(())
}

/// Take one dose off the shelf if any remain.
///
/// Returns `Ok(true)` when a unit was consumed, `Ok(false)` when the
/// prescription is unknown or already at zero. The availability check lives
/// in the WHERE clause, making the read-and-decrement one atomic statement.
pub fn decrement_stock_if_available(
    conn: &Connection,
    prescription_id: &Uuid,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE prescriptions SET current_stock = current_stock - 1
         WHERE id = ?1 AND current_stock > 0",
        params![prescription_id.to_string()],
    )?;
    Ok(changed > 0)
}

/// Delete a prescription. Its reminder log entries are kept: the history
/// remains queryable and adherence over past windows is unchanged.
pub fn delete_prescription(
    conn: &Connection,
    prescription_id: &Uuid,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM prescriptions WHERE id = ?1",
        params![prescription_id.to_string()],
    )?;

    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "prescription".into(),
            id: prescription_id.to_string(),
        });
    }
    Ok(())
}

const SELECT_COLUMNS: &str = "SELECT id, patient_id, medication_id, medication_name, dosage,
        frequency, schedule_times, schedule_days, instructions, start_date,
        end_date, current_stock, total_per_refill, with_food, created_at
 FROM prescriptions";

fn prescription_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Prescription> {
    Ok(Prescription {
        id: row
            .get::<_, String>(0)?
            .parse()
            .unwrap_or_else(|_| Uuid::nil()),
        patient_id: row
            .get::<_, String>(1)?
            .parse()
            .unwrap_or_else(|_| Uuid::nil()),
        medication_id: row
            .get::<_, String>(2)?
            .parse()
            .unwrap_or_else(|_| Uuid::nil()),
        medication_name: row.get(3)?,
        dosage: row.get(4)?,
        frequency: row
            .get::<_, String>(5)?
            .parse()
            .unwrap_or(Frequency::Custom),
        schedule: Schedule {
            times: serde_json::from_str(&row.get::<_, String>(6)?).unwrap_or_default(),
            days: serde_json::from_str(&row.get::<_, String>(7)?).unwrap_or_default(),
        },
        instructions: row.get(8)?,
        start_date: row.get(9)?,
        end_date: row.get(10)?,
        current_stock: row.get(11)?,
        total_per_refill: row.get(12)?,
        with_food: row.get(13)?,
        created_at: row.get(14)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;

    pub(crate) fn sample_prescription(patient_id: Uuid, stock: u32) -> NewPrescription {
        NewPrescription {
            patient_id,
            medication_name: "Metformin 500mg".into(),
            dosage: "1 tablet".into(),
            frequency: Frequency::Twice,
            schedule: Schedule {
                times: vec!["08:00".into(), "20:00".into()],
                days: vec!["Mon".into(), "Wed".into(), "Fri".into()],
            },
            instructions: Some("Take with food".into()),
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            end_date: None,
            current_stock: stock,
            total_per_refill: 60,
            with_food: true,
        }
    }

    #[test]
    fn create_then_get_roundtrips() {
        let conn = open_memory_database().unwrap();
        let patient_id = Uuid::new_v4();
        let created = create_prescription(&conn, sample_prescription(patient_id, 30)).unwrap();

        let fetched = get_prescription(&conn, &created.id).unwrap();
        assert_eq!(fetched.medication_name, "Metformin 500mg");
        assert_eq!(fetched.frequency, Frequency::Twice);
        assert_eq!(fetched.schedule.times, vec!["08:00", "20:00"]);
        assert_eq!(fetched.current_stock, 30);
        assert!(fetched.with_food);

        // The medicine landed in the catalog too.
        let medication = crate::medications::get_medication(&conn, &fetched.medication_id).unwrap();
        assert_eq!(medication.name, "Metformin 500mg");
    }

    #[test]
    fn list_by_patient_excludes_other_patients() {
        let conn = open_memory_database().unwrap();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        create_prescription(&conn, sample_prescription(alice, 10)).unwrap();
        create_prescription(&conn, sample_prescription(alice, 20)).unwrap();
        create_prescription(&conn, sample_prescription(bob, 5)).unwrap();

        let listed = list_by_patient(&conn, &alice).unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|p| p.patient_id == alice));
    }

    #[test]
    fn update_stock_overwrites() {
        let conn = open_memory_database().unwrap();
        let created = create_prescription(&conn, sample_prescription(Uuid::new_v4(), 3)).unwrap();

        update_stock(&conn, &created.id, 90).unwrap();
        assert_eq!(get_prescription(&conn, &created.id).unwrap().current_stock, 90);

        let err = update_stock(&conn, &Uuid::new_v4(), 10).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn decrement_consumes_one_unit() {
        let conn = open_memory_database().unwrap();
        let created = create_prescription(&conn, sample_prescription(Uuid::new_v4(), 2)).unwrap();

        assert!(decrement_stock_if_available(&conn, &created.id).unwrap());
        assert_eq!(get_prescription(&conn, &created.id).unwrap().current_stock, 1);
    }

    #[test]
    fn decrement_at_zero_is_a_noop() {
        let conn = open_memory_database().unwrap();
        let created = create_prescription(&conn, sample_prescription(Uuid::new_v4(), 1)).unwrap();

        assert!(decrement_stock_if_available(&conn, &created.id).unwrap());
        // Now empty: further decrements report false and leave zero in place.
        assert!(!decrement_stock_if_available(&conn, &created.id).unwrap());
        assert!(!decrement_stock_if_available(&conn, &created.id).unwrap());
        assert_eq!(get_prescription(&conn, &created.id).unwrap().current_stock, 0);
    }

    #[test]
    fn decrement_unknown_prescription_reports_false() {
        let conn = open_memory_database().unwrap();
        assert!(!decrement_stock_if_available(&conn, &Uuid::new_v4()).unwrap());
    }

    #[test]
    fn delete_removes_prescription_only() {
        let conn = open_memory_database().unwrap();
        let created = create_prescription(&conn, sample_prescription(Uuid::new_v4(), 5)).unwrap();

        delete_prescription(&conn, &created.id).unwrap();
        let err = get_prescription(&conn, &created.id).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));

        let err = delete_prescription(&conn, &created.id).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }
}

//! Medicine catalog: search, lookup, and the built-in starter set.

use chrono::Utc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Medication;

const SEARCH_LIMIT: u32 = 20;

/// The starter catalog, inserted once into an empty database.
/// (name, generic_name, form, strength, description, common_uses, side_effects)
const SEED_MEDICINES: &[(&str, &str, &str, &str, &str, &str, &str)] = &[
    (
        "Paracetamol 500mg",
        "Acetaminophen",
        "tablet",
        "500mg",
        "Pain reliever and fever reducer",
        "Pain relief, fever reduction",
        "Rare allergic reactions, liver damage with overdose",
    ),
    (
        "Metformin 500mg",
        "Metformin",
        "tablet",
        "500mg",
        "Used to treat type 2 diabetes",
        "Blood sugar control in diabetes",
        "Nausea, diarrhea, stomach upset",
    ),
    (
        "Aspirin 75mg",
        "Acetylsalicylic Acid",
        "tablet",
        "75mg",
        "Blood thinner and pain reliever",
        "Heart disease prevention, pain relief",
        "Stomach irritation, bleeding risk",
    ),
    (
        "Amoxicillin 500mg",
        "Amoxicillin",
        "capsule",
        "500mg",
        "Antibiotic for bacterial infections",
        "Treating bacterial infections",
        "Nausea, diarrhea, allergic reactions",
    ),
    (
        "Lisinopril 10mg",
        "Lisinopril",
        "tablet",
        "10mg",
        "Blood pressure medication",
        "High blood pressure, heart failure",
        "Dizziness, headache, persistent cough",
    ),
    (
        "Atorvastatin 20mg",
        "Atorvastatin",
        "tablet",
        "20mg",
        "Cholesterol-lowering medication",
        "High cholesterol, cardiovascular disease prevention",
        "Muscle pain, liver damage (rare)",
    ),
    (
        "Omeprazole 20mg",
        "Omeprazole",
        "capsule",
        "20mg",
        "Reduces stomach acid",
        "Heartburn, acid reflux, ulcers",
        "Headache, stomach pain, nausea",
    ),
    (
        "Levothyroxine 50mcg",
        "Levothyroxine",
        "tablet",
        "50mcg",
        "Thyroid hormone replacement",
        "Hypothyroidism treatment",
        "Weight changes, heart palpitations",
    ),
    (
        "Amlodipine 5mg",
        "Amlodipine",
        "tablet",
        "5mg",
        "Calcium channel blocker",
        "High blood pressure, chest pain",
        "Swelling of ankles, dizziness",
    ),
    (
        "Losartan 50mg",
        "Losartan",
        "tablet",
        "50mg",
        "Blood pressure medication",
        "High blood pressure, diabetic kidney disease",
        "Dizziness, back pain",
    ),
];

/// Populate the catalog with the starter set if it is empty. Idempotent.
pub fn seed_catalog(conn: &Connection) -> Result<usize, DatabaseError> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM medications", [], |row| row.get(0))?;
    if existing > 0 {
        tracing::debug!(existing, "medicine catalog already populated");
        return Ok(0);
    }

    for (name, generic, form, strength, description, uses, side_effects) in SEED_MEDICINES {
        conn.execute(
            "INSERT INTO medications (
                id, name, generic_name, form, strength, description,
                common_uses, side_effects, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                Uuid::new_v4().to_string(),
                name,
                generic,
                form,
                strength,
                description,
                uses,
                side_effects,
                Utc::now(),
            ],
        )?;
    }

    tracing::info!(count = SEED_MEDICINES.len(), "seeded medicine catalog");
    Ok(SEED_MEDICINES.len())
}

/// Case-insensitive substring search over name and generic name.
/// An empty query returns the first page of the catalog.
pub fn search_medications(conn: &Connection, query: &str) -> Result<Vec<Medication>, DatabaseError> {
    let query = query.trim();
    let mut stmt = if query.is_empty() {
        conn.prepare(
            "SELECT id, name, generic_name, form, strength, manufacturer,
                    description, common_uses, side_effects, created_at
             FROM medications ORDER BY name LIMIT ?1",
        )?
    } else {
        conn.prepare(
            "SELECT id, name, generic_name, form, strength, manufacturer,
                    description, common_uses, side_effects, created_at
             FROM medications
             WHERE name LIKE '%' || ?2 || '%' COLLATE NOCASE
                OR generic_name LIKE '%' || ?2 || '%' COLLATE NOCASE
             ORDER BY name LIMIT ?1",
        )?
    };

    let rows = if query.is_empty() {
        stmt.query_map(params![SEARCH_LIMIT], medication_from_row)?
    } else {
        stmt.query_map(params![SEARCH_LIMIT, query], medication_from_row)?
    };

    let mut medications = Vec::new();
    for row in rows {
        medications.push(row?);
    }
    Ok(medications)
}

/// Fetch a catalog entry by id.
pub fn get_medication(conn: &Connection, medication_id: &Uuid) -> Result<Medication, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, generic_name, form, strength, manufacturer,
                description, common_uses, side_effects, created_at
         FROM medications WHERE id = ?1",
        params![medication_id.to_string()],
        medication_from_row,
    );

    match result {
        Ok(medication) => Ok(medication),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(DatabaseError::NotFound {
            entity_type: "medication".into(),
            id: medication_id.to_string(),
        }),
        Err(e) => Err(DatabaseError::from(e)),
    }
}

/// Look up a catalog entry by exact name (case-insensitive).
pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Medication>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, generic_name, form, strength, manufacturer,
                description, common_uses, side_effects, created_at
         FROM medications WHERE name = ?1 COLLATE NOCASE",
        params![name],
        medication_from_row,
    );

    match result {
        Ok(medication) => Ok(Some(medication)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DatabaseError::from(e)),
    }
}

/// Resolve a name to a catalog entry, creating a minimal one if unknown.
///
/// Prescriptions always reference a catalog row, even for medicines typed in
/// by hand, so the explain feature has something to look up later.
pub fn find_or_create_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Medication, DatabaseError> {
    if let Some(existing) = find_by_name(conn, name)? {
        return Ok(existing);
    }

    let medication = Medication {
        id: Uuid::new_v4(),
        name: name.to_string(),
        generic_name: None,
        form: "tablet".to_string(),
        strength: None,
        manufacturer: None,
        description: None,
        common_uses: None,
        side_effects: None,
        created_at: Utc::now(),
    };

    conn.execute(
        "INSERT INTO medications (id, name, form, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            medication.id.to_string(),
            medication.name,
            medication.form,
            medication.created_at,
        ],
    )?;

    tracing::debug!(name, "created catalog entry for unknown medicine");
    Ok(medication)
}

pub(crate) fn medication_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Medication> {
    Ok(Medication {
        id: row
            .get::<_, String>(0)?
            .parse()
            .unwrap_or_else(|_| Uuid::nil()),
        name: row.get(1)?,
        generic_name: row.get(2)?,
        form: row.get(3)?,
        strength: row.get(4)?,
        manufacturer: row.get(5)?,
        description: row.get(6)?,
        common_uses: row.get(7)?,
        side_effects: row.get(8)?,
        created_at: row.get(9)?,
    })
}

//! Database handle and schema initialization.
//!
//! A single pooled SQLite connection is created at startup and handed to the
//! HTTP layer as shared state; per-resource operations live in the submodules
//! as `impl Database` blocks.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub mod doctors;
pub mod officers;
pub mod patients;
pub mod prescriptions;
pub mod reports;
pub mod wards;

/// Pooled database handle shared by all repositories.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (and create if missing) the database behind `url`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create all tables if they do not exist yet. Idempotent.
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

// The three one-per-patient tables carry UNIQUE(patient_id) so their write
// path can be a single atomic upsert instead of check-then-insert.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS doctors (
        doctor_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        dob TEXT NOT NULL,
        gender TEXT NOT NULL,
        phone TEXT NOT NULL,
        email TEXT NOT NULL,
        nic TEXT NOT NULL,
        medical_id TEXT NOT NULL,
        address TEXT NOT NULL,
        specialty TEXT NOT NULL,
        wallet_address TEXT,
        file_path TEXT,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS users (
        user_id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL,
        password TEXT NOT NULL,
        role TEXT NOT NULL,
        doctor_id INTEGER NOT NULL,
        FOREIGN KEY (doctor_id) REFERENCES doctors(doctor_id)
    )",
    "CREATE TABLE IF NOT EXISTS officers (
        officer_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        dob TEXT NOT NULL,
        gender TEXT NOT NULL,
        phone TEXT NOT NULL,
        email TEXT NOT NULL,
        nic TEXT NOT NULL,
        medical_id TEXT NOT NULL,
        address TEXT NOT NULL,
        job_role TEXT NOT NULL,
        wallet_address TEXT,
        file_path TEXT,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS patients (
        patient_id INTEGER PRIMARY KEY AUTOINCREMENT,
        full_name TEXT NOT NULL,
        dob TEXT NOT NULL,
        gender TEXT NOT NULL,
        phone TEXT NOT NULL,
        email TEXT NOT NULL,
        nic TEXT NOT NULL,
        address TEXT NOT NULL,
        ward TEXT,
        bed_no TEXT,
        file_path TEXT,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS patient_general_info (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        patient_id INTEGER NOT NULL UNIQUE,
        blood_group TEXT,
        height REAL,
        weight REAL,
        blood_pressure TEXT,
        pulse REAL,
        temperature REAL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY (patient_id) REFERENCES patients(patient_id)
    )",
    "CREATE TABLE IF NOT EXISTS medical_conditions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        patient_id INTEGER NOT NULL UNIQUE,
        symptom TEXT,
        symptom_type TEXT,
        consultant_doctor TEXT,
        patient_type TEXT,
        admit_date TEXT,
        symptom_description TEXT,
        updated_at TEXT NOT NULL,
        FOREIGN KEY (patient_id) REFERENCES patients(patient_id)
    )",
    "CREATE TABLE IF NOT EXISTS relatives_info (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        patient_id INTEGER NOT NULL UNIQUE,
        relative_name TEXT,
        relationship TEXT,
        address TEXT,
        email TEXT,
        secondary_relative TEXT,
        contact_number TEXT,
        updated_at TEXT NOT NULL,
        FOREIGN KEY (patient_id) REFERENCES patients(patient_id)
    )",
    "CREATE TABLE IF NOT EXISTS doctor_notes (
        note_id INTEGER PRIMARY KEY AUTOINCREMENT,
        patient_id INTEGER NOT NULL,
        note_title TEXT NOT NULL,
        note_description TEXT NOT NULL,
        doctor_name TEXT NOT NULL,
        created_at TEXT NOT NULL,
        FOREIGN KEY (patient_id) REFERENCES patients(patient_id)
    )",
    "CREATE TABLE IF NOT EXISTS prescriptions (
        prescription_id INTEGER PRIMARY KEY AUTOINCREMENT,
        patient_id INTEGER NOT NULL,
        doctor_name TEXT NOT NULL,
        prescription_date TEXT NOT NULL,
        diagnosis TEXT,
        allergy_info TEXT,
        created_at TEXT NOT NULL,
        FOREIGN KEY (patient_id) REFERENCES patients(patient_id)
    )",
    "CREATE TABLE IF NOT EXISTS prescription_medicines (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        prescription_id INTEGER NOT NULL,
        medicine_name TEXT NOT NULL,
        dosage TEXT NOT NULL,
        frequency TEXT NOT NULL,
        FOREIGN KEY (prescription_id) REFERENCES prescriptions(prescription_id)
    )",
    "CREATE TABLE IF NOT EXISTS ccu_beds (
        bed_id INTEGER PRIMARY KEY AUTOINCREMENT,
        status TEXT NOT NULL DEFAULT 'vacant'
    )",
    "CREATE TABLE IF NOT EXISTS iccu_beds (
        bed_id INTEGER PRIMARY KEY AUTOINCREMENT,
        status TEXT NOT NULL DEFAULT 'vacant'
    )",
    "CREATE TABLE IF NOT EXISTS normal_ward_beds (
        bed_id INTEGER PRIMARY KEY AUTOINCREMENT,
        status TEXT NOT NULL DEFAULT 'vacant'
    )",
    "CREATE TABLE IF NOT EXISTS lab_reports (
        report_id INTEGER PRIMARY KEY AUTOINCREMENT,
        patient_id INTEGER NOT NULL,
        report_type TEXT NOT NULL,
        report_date TEXT NOT NULL,
        comment TEXT,
        file_path TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS blood_test_reports (
        report_id INTEGER PRIMARY KEY AUTOINCREMENT,
        patient_id INTEGER NOT NULL,
        doctor_name TEXT NOT NULL,
        report_file TEXT NOT NULL,
        report_date TEXT NOT NULL,
        comment TEXT,
        file_path TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
];

#[cfg(test)]
pub(crate) mod testing {
    use super::Database;

    /// In-memory database limited to a single connection so every query in a
    /// test sees the same store.
    pub async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:", 1)
            .await
            .expect("in-memory database");
        db.init_schema().await.expect("schema");
        db
    }
}

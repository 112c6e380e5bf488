use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

/// An uploaded lab report file plus its metadata row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LabReport {
    pub report_id: i64,
    pub patient_id: i64,
    pub report_type: String,
    pub report_date: String,
    pub comment: Option<String>,
    pub file_path: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BloodTestReport {
    pub report_id: i64,
    pub patient_id: i64,
    pub doctor_name: String,
    pub report_file: String,
    pub report_date: String,
    pub comment: Option<String>,
    pub file_path: String,
    pub created_at: NaiveDateTime,
}

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Patient {
    pub patient_id: i64,
    pub full_name: String,
    pub dob: String,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub nic: String,
    pub address: String,
    pub ward: Option<String>,
    pub bed_no: Option<String>,
    pub file_path: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPatient {
    pub full_name: String,
    pub dob: String,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub nic: String,
    pub address: String,
    pub ward: Option<String>,
    pub bed_no: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePatient {
    pub full_name: String,
    pub dob: String,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub nic: String,
    pub address: String,
    pub ward: Option<String>,
    pub bed_no: Option<String>,
}

/// Vitals sheet; at most one row per patient, written by atomic upsert.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GeneralInfo {
    pub id: i64,
    pub patient_id: i64,
    pub blood_group: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub blood_pressure: Option<String>,
    pub pulse: Option<f64>,
    pub temperature: Option<f64>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralInfoUpdate {
    pub blood_group: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub blood_pressure: Option<String>,
    pub pulse: Option<f64>,
    pub temperature: Option<f64>,
}

/// Admission/symptom record; at most one row per patient.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MedicalCondition {
    pub id: i64,
    pub patient_id: i64,
    pub symptom: Option<String>,
    pub symptom_type: Option<String>,
    pub consultant_doctor: Option<String>,
    pub patient_type: Option<String>,
    pub admit_date: Option<String>,
    pub symptom_description: Option<String>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MedicalConditionUpdate {
    pub symptom: Option<String>,
    pub symptom_type: Option<String>,
    pub consultant_doctor: Option<String>,
    pub patient_type: Option<String>,
    pub admit_date: Option<String>,
    pub symptom_description: Option<String>,
}

/// Emergency contact; at most one row per patient.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RelativeInfo {
    pub id: i64,
    pub patient_id: i64,
    pub relative_name: Option<String>,
    pub relationship: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub secondary_relative: Option<String>,
    pub contact_number: Option<String>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelativeInfoUpdate {
    pub relative_name: Option<String>,
    pub relationship: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub secondary_relative: Option<String>,
    pub contact_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DoctorNote {
    pub note_id: i64,
    pub patient_id: i64,
    pub note_title: String,
    pub note_description: String,
    pub doctor_name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDoctorNote {
    pub note_title: Option<String>,
    pub note_description: Option<String>,
    pub doctor_name: Option<String>,
}

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Job roles an officer may hold.
pub const ALLOWED_ROLES: [&str; 2] = ["Nurse", "Lab Report Officer"];

pub fn is_valid_role(role: &str) -> bool {
    ALLOWED_ROLES.contains(&role)
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Officer {
    pub officer_id: i64,
    pub name: String,
    pub dob: String,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub nic: String,
    pub medical_id: String,
    pub address: String,
    pub job_role: String,
    pub wallet_address: Option<String>,
    pub file_path: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterOfficer {
    pub name: String,
    pub dob: String,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub nic: String,
    #[serde(rename = "medicalId")]
    pub medical_id: String,
    pub address: String,
    pub job_role: String,
    pub wallet_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOfficer {
    pub name: String,
    pub dob: String,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub job_role: String,
}

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A doctor row. Registration also creates a derived `users` credential row
/// (username = medical id, password = SHA-256 of the nic).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Doctor {
    pub doctor_id: i64,
    pub name: String,
    pub dob: String,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub nic: String,
    pub medical_id: String,
    pub address: String,
    pub specialty: String,
    pub wallet_address: Option<String>,
    pub file_path: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterDoctor {
    pub name: String,
    pub dob: String,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub nic: String,
    #[serde(rename = "medicalId")]
    pub medical_id: String,
    pub address: String,
    pub specialty: String,
    pub wallet_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDoctor {
    pub name: String,
    pub dob: String,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub specialty: String,
}

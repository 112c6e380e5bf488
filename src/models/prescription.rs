use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A prescription with its nested medicine list, as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct Prescription {
    pub prescription_id: i64,
    pub patient_id: i64,
    pub doctor_name: String,
    pub prescription_date: String,
    pub diagnosis: Option<String>,
    pub allergy_info: Option<String>,
    pub medicines: Vec<Medicine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medicine {
    pub medicine_name: String,
    pub dosage: String,
    pub frequency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPrescription {
    pub doctor_name: String,
    pub prescription_date: String,
    pub diagnosis: Option<String>,
    pub allergy_info: Option<String>,
    #[serde(default)]
    pub medicines: Vec<Medicine>,
}

/// One row of the prescriptions × medicines left join. Medicine columns are
/// NULL for prescriptions without any medicine rows.
#[derive(Debug, Clone, FromRow)]
pub struct PrescriptionJoinRow {
    pub prescription_id: i64,
    pub patient_id: i64,
    pub doctor_name: String,
    pub prescription_date: String,
    pub diagnosis: Option<String>,
    pub allergy_info: Option<String>,
    pub medicine_name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
}

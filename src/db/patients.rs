//! Patient repository: identity rows, the three one-per-patient sub-records
//! (general info, medical condition, relative info) and doctor notes.
//!
//! Sub-record writes are single atomic upserts keyed by the UNIQUE
//! constraint on `patient_id`; concurrent writers cannot produce duplicate
//! rows.

use chrono::Utc;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::models::patient::{
    DoctorNote, GeneralInfo, GeneralInfoUpdate, MedicalCondition, MedicalConditionUpdate,
    NewDoctorNote, Patient, RegisterPatient, RelativeInfo, RelativeInfoUpdate, UpdatePatient,
};

use super::Database;

impl Database {
    #[instrument(skip(self, patient), fields(full_name = %patient.full_name))]
    pub async fn create_patient(&self, patient: &RegisterPatient) -> Result<i64, ApiError> {
        let result = sqlx::query(
            "INSERT INTO patients (
                full_name, dob, gender, phone, email, nic,
                address, ward, bed_no, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&patient.full_name)
        .bind(&patient.dob)
        .bind(&patient.gender)
        .bind(&patient.phone)
        .bind(&patient.email)
        .bind(&patient.nic)
        .bind(&patient.address)
        .bind(&patient.ward)
        .bind(&patient.bed_no)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        let patient_id = result.last_insert_rowid();
        info!(patient_id, "patient registered");
        Ok(patient_id)
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>, ApiError> {
        let patients = sqlx::query_as::<_, Patient>("SELECT * FROM patients")
            .fetch_all(&self.pool)
            .await?;
        Ok(patients)
    }

    pub async fn get_patient(&self, patient_id: i64) -> Result<Patient, ApiError> {
        sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE patient_id = ?")
            .bind(patient_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ApiError::NotFound("patient"))
    }

    pub async fn update_patient(
        &self,
        patient_id: i64,
        patient: &UpdatePatient,
    ) -> Result<(), ApiError> {
        let result = sqlx::query(
            "UPDATE patients
             SET full_name = ?, dob = ?, gender = ?, phone = ?, email = ?,
                 nic = ?, address = ?, ward = ?, bed_no = ?
             WHERE patient_id = ?",
        )
        .bind(&patient.full_name)
        .bind(&patient.dob)
        .bind(&patient.gender)
        .bind(&patient.phone)
        .bind(&patient.email)
        .bind(&patient.nic)
        .bind(&patient.address)
        .bind(&patient.ward)
        .bind(&patient.bed_no)
        .bind(patient_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("patient"));
        }
        Ok(())
    }

    pub async fn set_patient_image(
        &self,
        patient_id: i64,
        file_path: &str,
    ) -> Result<(), ApiError> {
        let result = sqlx::query("UPDATE patients SET file_path = ? WHERE patient_id = ?")
            .bind(file_path)
            .bind(patient_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("patient"));
        }
        Ok(())
    }

    /// Parent existence check shared by the sub-record writes.
    pub async fn patient_exists(&self, patient_id: i64) -> Result<bool, ApiError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM patients WHERE patient_id = ?")
            .bind(patient_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn require_patient(&self, patient_id: i64) -> Result<(), ApiError> {
        if !self.patient_exists(patient_id).await? {
            return Err(ApiError::NotFound("patient"));
        }
        Ok(())
    }

    // ===== General info (vitals) =====

    pub async fn upsert_general_info(
        &self,
        patient_id: i64,
        info: &GeneralInfoUpdate,
    ) -> Result<(), ApiError> {
        self.require_patient(patient_id).await?;

        sqlx::query(
            "INSERT INTO patient_general_info (
                patient_id, blood_group, height, weight,
                blood_pressure, pulse, temperature, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(patient_id) DO UPDATE SET
                blood_group = excluded.blood_group,
                height = excluded.height,
                weight = excluded.weight,
                blood_pressure = excluded.blood_pressure,
                pulse = excluded.pulse,
                temperature = excluded.temperature,
                updated_at = excluded.updated_at",
        )
        .bind(patient_id)
        .bind(&info.blood_group)
        .bind(info.height)
        .bind(info.weight)
        .bind(&info.blood_pressure)
        .bind(info.pulse)
        .bind(info.temperature)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_general_info(&self, patient_id: i64) -> Result<GeneralInfo, ApiError> {
        sqlx::query_as::<_, GeneralInfo>(
            "SELECT * FROM patient_general_info WHERE patient_id = ?",
        )
        .bind(patient_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ApiError::NotFound("general information"))
    }

    // ===== Medical condition =====

    pub async fn upsert_medical_condition(
        &self,
        patient_id: i64,
        condition: &MedicalConditionUpdate,
    ) -> Result<(), ApiError> {
        self.require_patient(patient_id).await?;

        sqlx::query(
            "INSERT INTO medical_conditions (
                patient_id, symptom, symptom_type, consultant_doctor,
                patient_type, admit_date, symptom_description, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(patient_id) DO UPDATE SET
                symptom = excluded.symptom,
                symptom_type = excluded.symptom_type,
                consultant_doctor = excluded.consultant_doctor,
                patient_type = excluded.patient_type,
                admit_date = excluded.admit_date,
                symptom_description = excluded.symptom_description,
                updated_at = excluded.updated_at",
        )
        .bind(patient_id)
        .bind(&condition.symptom)
        .bind(&condition.symptom_type)
        .bind(&condition.consultant_doctor)
        .bind(&condition.patient_type)
        .bind(&condition.admit_date)
        .bind(&condition.symptom_description)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_medical_condition(
        &self,
        patient_id: i64,
    ) -> Result<MedicalCondition, ApiError> {
        sqlx::query_as::<_, MedicalCondition>(
            "SELECT * FROM medical_conditions WHERE patient_id = ?",
        )
        .bind(patient_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ApiError::NotFound("medical information"))
    }

    // ===== Relative info =====

    pub async fn upsert_relative_info(
        &self,
        patient_id: i64,
        relative: &RelativeInfoUpdate,
    ) -> Result<(), ApiError> {
        self.require_patient(patient_id).await?;

        sqlx::query(
            "INSERT INTO relatives_info (
                patient_id, relative_name, relationship, address,
                email, secondary_relative, contact_number, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(patient_id) DO UPDATE SET
                relative_name = excluded.relative_name,
                relationship = excluded.relationship,
                address = excluded.address,
                email = excluded.email,
                secondary_relative = excluded.secondary_relative,
                contact_number = excluded.contact_number,
                updated_at = excluded.updated_at",
        )
        .bind(patient_id)
        .bind(&relative.relative_name)
        .bind(&relative.relationship)
        .bind(&relative.address)
        .bind(&relative.email)
        .bind(&relative.secondary_relative)
        .bind(&relative.contact_number)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_relative_info(&self, patient_id: i64) -> Result<RelativeInfo, ApiError> {
        sqlx::query_as::<_, RelativeInfo>("SELECT * FROM relatives_info WHERE patient_id = ?")
            .bind(patient_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ApiError::NotFound("relative information"))
    }

    // ===== Doctor notes =====

    pub async fn add_doctor_note(
        &self,
        patient_id: i64,
        note: &NewDoctorNote,
    ) -> Result<i64, ApiError> {
        let (Some(note_title), Some(note_description), Some(doctor_name)) = (
            note.note_title.as_deref().filter(|s| !s.is_empty()),
            note.note_description.as_deref().filter(|s| !s.is_empty()),
            note.doctor_name.as_deref().filter(|s| !s.is_empty()),
        ) else {
            return Err(ApiError::validation("All fields are required"));
        };

        self.require_patient(patient_id).await?;

        let result = sqlx::query(
            "INSERT INTO doctor_notes (
                patient_id, note_title, note_description, doctor_name, created_at
            ) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(patient_id)
        .bind(note_title)
        .bind(note_description)
        .bind(doctor_name)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn list_doctor_notes(&self, patient_id: i64) -> Result<Vec<DoctorNote>, ApiError> {
        let notes = sqlx::query_as::<_, DoctorNote>(
            "SELECT * FROM doctor_notes WHERE patient_id = ? ORDER BY created_at DESC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notes)
    }

    pub async fn delete_doctor_note(&self, patient_id: i64, note_id: i64) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM doctor_notes WHERE note_id = ? AND patient_id = ?")
            .bind(note_id)
            .bind(patient_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("doctor note"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::test_db;

    pub(crate) fn sample_patient() -> RegisterPatient {
        RegisterPatient {
            full_name: "N. Jayasuriya".into(),
            dob: "1965-03-30".into(),
            gender: "Male".into(),
            phone: "0751112222".into(),
            email: "n.jaya@example.com".into(),
            nic: "651234567V".into(),
            address: "45 Lake View".into(),
            ward: Some("CCU".into()),
            bed_no: Some("4".into()),
        }
    }

    #[tokio::test]
    async fn register_persists_optional_fields_as_null() {
        let db = test_db().await;
        let mut patient = sample_patient();
        patient.ward = None;
        patient.bed_no = None;

        let patient_id = db.create_patient(&patient).await.unwrap();
        let stored = db.get_patient(patient_id).await.unwrap();
        assert_eq!(stored.ward, None);
        assert_eq!(stored.bed_no, None);
    }

    #[tokio::test]
    async fn general_info_upsert_keeps_one_row_with_latest_values() {
        let db = test_db().await;
        let patient_id = db.create_patient(&sample_patient()).await.unwrap();

        let first = GeneralInfoUpdate {
            blood_group: Some("A+".into()),
            height: Some(172.0),
            weight: Some(80.0),
            blood_pressure: Some("120/80".into()),
            pulse: Some(72.0),
            temperature: Some(36.8),
        };
        db.upsert_general_info(patient_id, &first).await.unwrap();

        let second = GeneralInfoUpdate {
            blood_group: Some("A+".into()),
            height: Some(172.0),
            weight: Some(78.5),
            blood_pressure: Some("118/76".into()),
            pulse: Some(70.0),
            temperature: None,
        };
        db.upsert_general_info(patient_id, &second).await.unwrap();

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM patient_general_info WHERE patient_id = ?")
                .bind(patient_id)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(count, 1);

        let stored = db.get_general_info(patient_id).await.unwrap();
        assert_eq!(stored.weight, Some(78.5));
        assert_eq!(stored.blood_pressure.as_deref(), Some("118/76"));
        assert_eq!(stored.temperature, None);
    }

    #[tokio::test]
    async fn sub_record_upsert_requires_existing_patient() {
        let db = test_db().await;
        let update = RelativeInfoUpdate {
            relative_name: Some("S. Jayasuriya".into()),
            relationship: Some("Spouse".into()),
            address: None,
            email: None,
            secondary_relative: None,
            contact_number: Some("0753334444".into()),
        };
        assert!(matches!(
            db.upsert_relative_info(77, &update).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn medical_condition_upsert_replaces_previous_record() {
        let db = test_db().await;
        let patient_id = db.create_patient(&sample_patient()).await.unwrap();

        let admit = MedicalConditionUpdate {
            symptom: Some("Chest pain".into()),
            symptom_type: Some("Cardiac".into()),
            consultant_doctor: Some("Dr. Fernando".into()),
            patient_type: Some("Inpatient".into()),
            admit_date: Some("2024-02-01".into()),
            symptom_description: Some("Acute onset".into()),
        };
        db.upsert_medical_condition(patient_id, &admit).await.unwrap();

        let revised = MedicalConditionUpdate {
            symptom: Some("Chest pain, resolved".into()),
            ..admit.clone()
        };
        db.upsert_medical_condition(patient_id, &revised)
            .await
            .unwrap();

        let stored = db.get_medical_condition(patient_id).await.unwrap();
        assert_eq!(stored.symptom.as_deref(), Some("Chest pain, resolved"));
    }

    #[tokio::test]
    async fn note_requires_all_fields_and_existing_patient() {
        let db = test_db().await;
        let patient_id = db.create_patient(&sample_patient()).await.unwrap();

        let incomplete = NewDoctorNote {
            note_title: Some("Rounds".into()),
            note_description: None,
            doctor_name: Some("Dr. Silva".into()),
        };
        assert!(matches!(
            db.add_doctor_note(patient_id, &incomplete).await,
            Err(ApiError::Validation(_))
        ));

        let complete = NewDoctorNote {
            note_title: Some("Rounds".into()),
            note_description: Some("Stable overnight".into()),
            doctor_name: Some("Dr. Silva".into()),
        };
        assert!(matches!(
            db.add_doctor_note(9999, &complete).await,
            Err(ApiError::NotFound(_))
        ));

        let note_id = db.add_doctor_note(patient_id, &complete).await.unwrap();
        assert_eq!(db.list_doctor_notes(patient_id).await.unwrap().len(), 1);

        db.delete_doctor_note(patient_id, note_id).await.unwrap();
        assert!(matches!(
            db.delete_doctor_note(patient_id, note_id).await,
            Err(ApiError::NotFound(_))
        ));
    }
}

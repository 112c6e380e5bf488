//! Officer repository. Same identity shape as doctors, no derived user row;
//! the job role is validated before anything is written.

use chrono::Utc;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::models::officer::{is_valid_role, Officer, RegisterOfficer, UpdateOfficer};

use super::Database;

impl Database {
    #[instrument(skip(self, officer), fields(medical_id = %officer.medical_id))]
    pub async fn create_officer(&self, officer: &RegisterOfficer) -> Result<i64, ApiError> {
        // Role check happens before the insert; an invalid role must never
        // reach the table.
        if !is_valid_role(&officer.job_role) {
            return Err(ApiError::validation("Invalid job role!"));
        }

        let result = sqlx::query(
            "INSERT INTO officers (
                name, dob, gender, phone, email, nic,
                medical_id, address, job_role, wallet_address, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&officer.name)
        .bind(&officer.dob)
        .bind(&officer.gender)
        .bind(&officer.phone)
        .bind(&officer.email)
        .bind(&officer.nic)
        .bind(&officer.medical_id)
        .bind(&officer.address)
        .bind(&officer.job_role)
        .bind(&officer.wallet_address)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        let officer_id = result.last_insert_rowid();
        info!(officer_id, "officer registered");
        Ok(officer_id)
    }

    pub async fn list_officers(&self) -> Result<Vec<Officer>, ApiError> {
        let officers = sqlx::query_as::<_, Officer>("SELECT * FROM officers")
            .fetch_all(&self.pool)
            .await?;
        Ok(officers)
    }

    pub async fn get_officer(&self, officer_id: i64) -> Result<Officer, ApiError> {
        sqlx::query_as::<_, Officer>("SELECT * FROM officers WHERE officer_id = ?")
            .bind(officer_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ApiError::NotFound("officer"))
    }

    pub async fn update_officer(
        &self,
        officer_id: i64,
        officer: &UpdateOfficer,
    ) -> Result<(), ApiError> {
        if !is_valid_role(&officer.job_role) {
            return Err(ApiError::validation("Invalid job role!"));
        }

        let result = sqlx::query(
            "UPDATE officers
             SET name = ?, dob = ?, gender = ?, phone = ?, email = ?, address = ?, job_role = ?
             WHERE officer_id = ?",
        )
        .bind(&officer.name)
        .bind(&officer.dob)
        .bind(&officer.gender)
        .bind(&officer.phone)
        .bind(&officer.email)
        .bind(&officer.address)
        .bind(&officer.job_role)
        .bind(officer_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("officer"));
        }
        Ok(())
    }

    pub async fn delete_officer(&self, officer_id: i64) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM officers WHERE officer_id = ?")
            .bind(officer_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("officer"));
        }
        Ok(())
    }

    pub async fn set_officer_image(
        &self,
        officer_id: i64,
        file_path: &str,
    ) -> Result<(), ApiError> {
        let result = sqlx::query("UPDATE officers SET file_path = ? WHERE officer_id = ?")
            .bind(file_path)
            .bind(officer_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("officer"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::test_db;

    fn sample_officer(job_role: &str) -> RegisterOfficer {
        RegisterOfficer {
            name: "K. Perera".into(),
            dob: "1990-09-02".into(),
            gender: "Female".into(),
            phone: "0719876543".into(),
            email: "k.perera@example.com".into(),
            nic: "907654321V".into(),
            medical_id: "OFF-2001".into(),
            address: "3 Clinic St".into(),
            job_role: job_role.into(),
            wallet_address: None,
        }
    }

    #[tokio::test]
    async fn valid_roles_are_accepted() {
        let db = test_db().await;
        db.create_officer(&sample_officer("Nurse")).await.unwrap();
        db.create_officer(&sample_officer("Lab Report Officer"))
            .await
            .unwrap();
        assert_eq!(db.list_officers().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn invalid_role_is_rejected_without_persisting() {
        let db = test_db().await;
        let err = db
            .create_officer(&sample_officer("Janitor"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        // The rejected registration must not have committed a row.
        assert!(db.list_officers().await.unwrap().is_empty());
    }
}

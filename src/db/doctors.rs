//! Doctor repository.
//!
//! Registration derives a `users` credential row from the doctor's
//! credentials (username = medical id, password = SHA-256 of the nic) inside
//! the same transaction, and deletion removes both rows together.

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::models::doctor::{Doctor, RegisterDoctor, UpdateDoctor};

use super::Database;

/// Deterministic default password: lowercase hex SHA-256 of the national id.
pub fn derived_password(nic: &str) -> String {
    format!("{:x}", Sha256::digest(nic.as_bytes()))
}

impl Database {
    #[instrument(skip(self, doctor), fields(medical_id = %doctor.medical_id))]
    pub async fn create_doctor(&self, doctor: &RegisterDoctor) -> Result<i64, ApiError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO doctors (
                name, dob, gender, phone, email, nic,
                medical_id, address, specialty, wallet_address, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&doctor.name)
        .bind(&doctor.dob)
        .bind(&doctor.gender)
        .bind(&doctor.phone)
        .bind(&doctor.email)
        .bind(&doctor.nic)
        .bind(&doctor.medical_id)
        .bind(&doctor.address)
        .bind(&doctor.specialty)
        .bind(&doctor.wallet_address)
        .bind(Utc::now().naive_utc())
        .execute(&mut *tx)
        .await?;

        let doctor_id = result.last_insert_rowid();

        sqlx::query(
            "INSERT INTO users (username, password, role, doctor_id)
             VALUES (?, ?, 'doctor', ?)",
        )
        .bind(&doctor.medical_id)
        .bind(derived_password(&doctor.nic))
        .bind(doctor_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(doctor_id, "doctor registered");
        Ok(doctor_id)
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, ApiError> {
        let doctors = sqlx::query_as::<_, Doctor>("SELECT * FROM doctors")
            .fetch_all(&self.pool)
            .await?;
        Ok(doctors)
    }

    pub async fn get_doctor(&self, doctor_id: i64) -> Result<Doctor, ApiError> {
        sqlx::query_as::<_, Doctor>("SELECT * FROM doctors WHERE doctor_id = ?")
            .bind(doctor_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ApiError::NotFound("doctor"))
    }

    pub async fn update_doctor(
        &self,
        doctor_id: i64,
        doctor: &UpdateDoctor,
    ) -> Result<(), ApiError> {
        let result = sqlx::query(
            "UPDATE doctors
             SET name = ?, dob = ?, gender = ?, phone = ?, email = ?, address = ?, specialty = ?
             WHERE doctor_id = ?",
        )
        .bind(&doctor.name)
        .bind(&doctor.dob)
        .bind(&doctor.gender)
        .bind(&doctor.phone)
        .bind(&doctor.email)
        .bind(&doctor.address)
        .bind(&doctor.specialty)
        .bind(doctor_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("doctor"));
        }
        Ok(())
    }

    /// Delete the doctor and its derived user row in one transaction. A
    /// missing doctor rolls the whole thing back.
    #[instrument(skip(self))]
    pub async fn delete_doctor(&self, doctor_id: i64) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM users WHERE doctor_id = ?")
            .bind(doctor_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM doctors WHERE doctor_id = ?")
            .bind(doctor_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("doctor"));
        }

        tx.commit().await?;
        info!(doctor_id, "doctor deleted");
        Ok(())
    }

    pub async fn set_doctor_image(&self, doctor_id: i64, file_path: &str) -> Result<(), ApiError> {
        let result = sqlx::query("UPDATE doctors SET file_path = ? WHERE doctor_id = ?")
            .bind(file_path)
            .bind(doctor_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("doctor"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::test_db;

    fn sample_doctor() -> RegisterDoctor {
        RegisterDoctor {
            name: "A. Fernando".into(),
            dob: "1980-04-12".into(),
            gender: "Male".into(),
            phone: "0712345678".into(),
            email: "a.fernando@example.com".into(),
            nic: "801231234V".into(),
            medical_id: "MED-1001".into(),
            address: "12 Hospital Rd".into(),
            specialty: "Cardiology".into(),
            wallet_address: None,
        }
    }

    #[tokio::test]
    async fn register_creates_derived_user_row() {
        let db = test_db().await;
        let doctor_id = db.create_doctor(&sample_doctor()).await.unwrap();

        let (username, password): (String, String) =
            sqlx::query_as("SELECT username, password FROM users WHERE doctor_id = ?")
                .bind(doctor_id)
                .fetch_one(db.pool())
                .await
                .unwrap();

        assert_eq!(username, "MED-1001");
        assert_eq!(password, derived_password("801231234V"));
    }

    #[tokio::test]
    async fn delete_removes_doctor_and_user() {
        let db = test_db().await;
        let doctor_id = db.create_doctor(&sample_doctor()).await.unwrap();

        db.delete_doctor(doctor_id).await.unwrap();

        assert!(matches!(
            db.get_doctor(doctor_id).await,
            Err(ApiError::NotFound(_))
        ));
        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE doctor_id = ?")
            .bind(doctor_id)
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(users, 0);
    }

    #[tokio::test]
    async fn delete_unknown_doctor_is_not_found() {
        let db = test_db().await;
        assert!(matches!(
            db.delete_doctor(999).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_unknown_doctor_is_not_found() {
        let db = test_db().await;
        let update = UpdateDoctor {
            name: "B. Silva".into(),
            dob: "1975-01-01".into(),
            gender: "Female".into(),
            phone: "0770000000".into(),
            email: "b.silva@example.com".into(),
            address: "1 Ward Lane".into(),
            specialty: "Neurology".into(),
        };
        assert!(matches!(
            db.update_doctor(42, &update).await,
            Err(ApiError::NotFound(_))
        ));
    }
}

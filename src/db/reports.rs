//! Lab and blood-test report rows. The file bytes live on disk under the
//! upload directory; rows store the generated file name and its public path.
//!
//! Deletion returns the stored path so the caller can remove the disk file
//! *after* the row is gone; a missing file then orphans nothing in the
//! database.

use chrono::Utc;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::models::report::{BloodTestReport, LabReport};

use super::Database;

pub struct NewLabReport<'a> {
    pub patient_id: i64,
    pub report_type: &'a str,
    pub report_date: &'a str,
    pub comment: Option<&'a str>,
    pub file_path: &'a str,
}

pub struct NewBloodTestReport<'a> {
    pub patient_id: i64,
    pub doctor_name: &'a str,
    pub report_file: &'a str,
    pub report_date: &'a str,
    pub comment: Option<&'a str>,
    pub file_path: &'a str,
}

impl Database {
    #[instrument(skip(self, report), fields(patient_id = report.patient_id))]
    pub async fn insert_lab_report(&self, report: &NewLabReport<'_>) -> Result<i64, ApiError> {
        let result = sqlx::query(
            "INSERT INTO lab_reports (
                patient_id, report_type, report_date, comment, file_path, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(report.patient_id)
        .bind(report.report_type)
        .bind(report.report_date)
        .bind(report.comment)
        .bind(report.file_path)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        let report_id = result.last_insert_rowid();
        info!(report_id, "lab report recorded");
        Ok(report_id)
    }

    pub async fn list_lab_reports(&self, patient_id: i64) -> Result<Vec<LabReport>, ApiError> {
        let reports = sqlx::query_as::<_, LabReport>(
            "SELECT * FROM lab_reports WHERE patient_id = ? ORDER BY report_date DESC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reports)
    }

    /// Remove the row and hand back its stored file path for disk cleanup.
    pub async fn delete_lab_report(&self, report_id: i64) -> Result<String, ApiError> {
        let mut tx = self.pool.begin().await?;

        let file_path: Option<String> =
            sqlx::query_scalar("SELECT file_path FROM lab_reports WHERE report_id = ?")
                .bind(report_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(file_path) = file_path else {
            return Err(ApiError::NotFound("lab report"));
        };

        sqlx::query("DELETE FROM lab_reports WHERE report_id = ?")
            .bind(report_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(file_path)
    }

    #[instrument(skip(self, report), fields(patient_id = report.patient_id))]
    pub async fn insert_blood_test_report(
        &self,
        report: &NewBloodTestReport<'_>,
    ) -> Result<i64, ApiError> {
        let result = sqlx::query(
            "INSERT INTO blood_test_reports (
                patient_id, doctor_name, report_file, report_date,
                comment, file_path, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(report.patient_id)
        .bind(report.doctor_name)
        .bind(report.report_file)
        .bind(report.report_date)
        .bind(report.comment)
        .bind(report.file_path)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        let report_id = result.last_insert_rowid();
        info!(report_id, "blood test report recorded");
        Ok(report_id)
    }

    pub async fn list_blood_test_reports(
        &self,
        patient_id: i64,
    ) -> Result<Vec<BloodTestReport>, ApiError> {
        let reports = sqlx::query_as::<_, BloodTestReport>(
            "SELECT * FROM blood_test_reports WHERE patient_id = ? ORDER BY report_date DESC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reports)
    }

    pub async fn delete_blood_test_report(&self, report_id: i64) -> Result<String, ApiError> {
        let mut tx = self.pool.begin().await?;

        let file_path: Option<String> =
            sqlx::query_scalar("SELECT file_path FROM blood_test_reports WHERE report_id = ?")
                .bind(report_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(file_path) = file_path else {
            return Err(ApiError::NotFound("blood test report"));
        };

        sqlx::query("DELETE FROM blood_test_reports WHERE report_id = ?")
            .bind(report_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::test_db;

    #[tokio::test]
    async fn lab_reports_list_newest_first_and_delete_returns_path() {
        let db = test_db().await;

        db.insert_lab_report(&NewLabReport {
            patient_id: 1,
            report_type: "CBC",
            report_date: "2024-01-05",
            comment: None,
            file_path: "uploads/older.pdf",
        })
        .await
        .unwrap();
        let newer = db
            .insert_lab_report(&NewLabReport {
                patient_id: 1,
                report_type: "Lipid Panel",
                report_date: "2024-02-10",
                comment: Some("fasting"),
                file_path: "uploads/newer.pdf",
            })
            .await
            .unwrap();

        let reports = db.list_lab_reports(1).await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].report_type, "Lipid Panel");

        let path = db.delete_lab_report(newer).await.unwrap();
        assert_eq!(path, "uploads/newer.pdf");
        assert_eq!(db.list_lab_reports(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleting_unknown_report_is_not_found() {
        let db = test_db().await;
        assert!(matches!(
            db.delete_lab_report(5).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            db.delete_blood_test_report(5).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn blood_test_reports_round_trip() {
        let db = test_db().await;
        let report_id = db
            .insert_blood_test_report(&NewBloodTestReport {
                patient_id: 2,
                doctor_name: "Dr. Silva",
                report_file: "abc.pdf",
                report_date: "2024-03-01",
                comment: None,
                file_path: "uploads/abc.pdf",
            })
            .await
            .unwrap();

        let reports = db.list_blood_test_reports(2).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].report_id, report_id);
        assert_eq!(reports[0].report_file, "abc.pdf");
    }
}

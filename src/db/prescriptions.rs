//! Prescription repository.
//!
//! Reads flatten a prescriptions × medicines left join and regroup it by
//! prescription id. The regrouping is keyed on a map rather than a
//! "current group" comparison so it stays correct even if the driver ever
//! returns rows for one prescription non-contiguously.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::models::prescription::{Medicine, NewPrescription, Prescription, PrescriptionJoinRow};

use super::Database;

impl Database {
    /// Insert the prescription and all its medicine rows in one transaction.
    #[instrument(skip(self, prescription))]
    pub async fn create_prescription(
        &self,
        patient_id: i64,
        prescription: &NewPrescription,
    ) -> Result<i64, ApiError> {
        if !self.patient_exists(patient_id).await? {
            return Err(ApiError::NotFound("patient"));
        }

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO prescriptions (
                patient_id, doctor_name, prescription_date,
                diagnosis, allergy_info, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(patient_id)
        .bind(&prescription.doctor_name)
        .bind(&prescription.prescription_date)
        .bind(&prescription.diagnosis)
        .bind(&prescription.allergy_info)
        .bind(Utc::now().naive_utc())
        .execute(&mut *tx)
        .await?;

        let prescription_id = result.last_insert_rowid();

        for medicine in &prescription.medicines {
            sqlx::query(
                "INSERT INTO prescription_medicines (
                    prescription_id, medicine_name, dosage, frequency
                ) VALUES (?, ?, ?, ?)",
            )
            .bind(prescription_id)
            .bind(&medicine.medicine_name)
            .bind(&medicine.dosage)
            .bind(&medicine.frequency)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(prescription_id, "prescription added");
        Ok(prescription_id)
    }

    /// Fetch a patient's prescriptions with their medicines nested, in
    /// first-seen (insertion) order.
    pub async fn list_prescriptions(
        &self,
        patient_id: i64,
    ) -> Result<Vec<Prescription>, ApiError> {
        let rows = sqlx::query_as::<_, PrescriptionJoinRow>(
            "SELECT
                p.prescription_id,
                p.patient_id,
                p.doctor_name,
                p.prescription_date,
                p.diagnosis,
                p.allergy_info,
                pm.medicine_name,
                pm.dosage,
                pm.frequency
            FROM prescriptions p
            LEFT JOIN prescription_medicines pm
                ON p.prescription_id = pm.prescription_id
            WHERE p.patient_id = ?
            ORDER BY p.prescription_id, pm.id",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(group_prescriptions(rows))
    }

    /// Delete a prescription and its medicines in one transaction; medicines
    /// go first to respect the foreign key.
    #[instrument(skip(self))]
    pub async fn delete_prescription(
        &self,
        patient_id: i64,
        prescription_id: i64,
    ) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM prescription_medicines
             WHERE prescription_id IN (
                 SELECT prescription_id FROM prescriptions
                 WHERE prescription_id = ? AND patient_id = ?
             )",
        )
        .bind(prescription_id)
        .bind(patient_id)
        .execute(&mut *tx)
        .await?;

        let result =
            sqlx::query("DELETE FROM prescriptions WHERE prescription_id = ? AND patient_id = ?")
                .bind(prescription_id)
                .bind(patient_id)
                .execute(&mut *tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("prescription"));
        }

        tx.commit().await?;
        info!(prescription_id, "prescription deleted");
        Ok(())
    }
}

/// Regroup the flat join rows into nested prescriptions, keyed by
/// prescription id, preserving first-seen order. A prescription without
/// medicines arrives as one row with NULL medicine columns and yields an
/// empty medicine list.
fn group_prescriptions(rows: Vec<PrescriptionJoinRow>) -> Vec<Prescription> {
    let mut grouped: Vec<Prescription> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for row in rows {
        let slot = match index.get(&row.prescription_id) {
            Some(&slot) => slot,
            None => {
                grouped.push(Prescription {
                    prescription_id: row.prescription_id,
                    patient_id: row.patient_id,
                    doctor_name: row.doctor_name.clone(),
                    prescription_date: row.prescription_date.clone(),
                    diagnosis: row.diagnosis.clone(),
                    allergy_info: row.allergy_info.clone(),
                    medicines: Vec::new(),
                });
                index.insert(row.prescription_id, grouped.len() - 1);
                grouped.len() - 1
            }
        };

        if let (Some(medicine_name), Some(dosage), Some(frequency)) =
            (row.medicine_name, row.dosage, row.frequency)
        {
            grouped[slot].medicines.push(Medicine {
                medicine_name,
                dosage,
                frequency,
            });
        }
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::test_db;
    use crate::models::patient::RegisterPatient;
    use crate::models::prescription::Medicine;

    fn patient() -> RegisterPatient {
        RegisterPatient {
            full_name: "T. Gunawardena".into(),
            dob: "1972-11-19".into(),
            gender: "Female".into(),
            phone: "0765556666".into(),
            email: "t.guna@example.com".into(),
            nic: "727654321V".into(),
            address: "8 Temple Rd".into(),
            ward: None,
            bed_no: None,
        }
    }

    fn prescription(doctor: &str, medicines: Vec<(&str, &str, &str)>) -> NewPrescription {
        NewPrescription {
            doctor_name: doctor.into(),
            prescription_date: "2024-03-10".into(),
            diagnosis: Some("Hypertension".into()),
            allergy_info: None,
            medicines: medicines
                .into_iter()
                .map(|(name, dosage, frequency)| Medicine {
                    medicine_name: name.into(),
                    dosage: dosage.into(),
                    frequency: frequency.into(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn two_prescriptions_group_into_their_own_medicines() {
        let db = test_db().await;
        let patient_id = db.create_patient(&patient()).await.unwrap();

        db.create_prescription(
            patient_id,
            &prescription(
                "Dr. Silva",
                vec![("Losartan", "50mg", "daily"), ("Aspirin", "75mg", "daily")],
            ),
        )
        .await
        .unwrap();
        db.create_prescription(
            patient_id,
            &prescription(
                "Dr. Perera",
                vec![
                    ("Metformin", "500mg", "twice daily"),
                    ("Atorvastatin", "20mg", "nightly"),
                ],
            ),
        )
        .await
        .unwrap();

        let grouped = db.list_prescriptions(patient_id).await.unwrap();
        assert_eq!(grouped.len(), 2);

        assert_eq!(grouped[0].doctor_name, "Dr. Silva");
        assert_eq!(grouped[0].medicines.len(), 2);
        assert_eq!(grouped[0].medicines[0].medicine_name, "Losartan");
        assert_eq!(grouped[0].medicines[1].medicine_name, "Aspirin");

        assert_eq!(grouped[1].doctor_name, "Dr. Perera");
        assert_eq!(grouped[1].medicines.len(), 2);
        assert_eq!(grouped[1].medicines[0].medicine_name, "Metformin");
        assert_eq!(grouped[1].medicines[1].medicine_name, "Atorvastatin");
    }

    #[tokio::test]
    async fn prescription_without_medicines_gets_empty_list() {
        let db = test_db().await;
        let patient_id = db.create_patient(&patient()).await.unwrap();
        db.create_prescription(patient_id, &prescription("Dr. Silva", vec![]))
            .await
            .unwrap();

        let grouped = db.list_prescriptions(patient_id).await.unwrap();
        assert_eq!(grouped.len(), 1);
        assert!(grouped[0].medicines.is_empty());
    }

    #[tokio::test]
    async fn delete_removes_prescription_and_medicines_together() {
        let db = test_db().await;
        let patient_id = db.create_patient(&patient()).await.unwrap();
        let prescription_id = db
            .create_prescription(
                patient_id,
                &prescription("Dr. Silva", vec![("Losartan", "50mg", "daily")]),
            )
            .await
            .unwrap();

        db.delete_prescription(patient_id, prescription_id)
            .await
            .unwrap();

        assert!(db.list_prescriptions(patient_id).await.unwrap().is_empty());
        let orphans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM prescription_medicines WHERE prescription_id = ?",
        )
        .bind(prescription_id)
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(orphans, 0);

        assert!(matches!(
            db.delete_prescription(patient_id, prescription_id).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn grouping_handles_interleaved_rows() {
        let row = |pid: i64, medicine: Option<&str>| PrescriptionJoinRow {
            prescription_id: pid,
            patient_id: 1,
            doctor_name: format!("Dr. {}", pid),
            prescription_date: "2024-01-01".into(),
            diagnosis: None,
            allergy_info: None,
            medicine_name: medicine.map(Into::into),
            dosage: medicine.map(|_| "10mg".into()),
            frequency: medicine.map(|_| "daily".into()),
        };

        // Rows for prescription 1 split around prescription 2.
        let grouped = group_prescriptions(vec![
            row(1, Some("A")),
            row(2, Some("B")),
            row(1, Some("C")),
        ]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].prescription_id, 1);
        assert_eq!(
            grouped[0]
                .medicines
                .iter()
                .map(|m| m.medicine_name.as_str())
                .collect::<Vec<_>>(),
            vec!["A", "C"]
        );
        assert_eq!(grouped[1].prescription_id, 2);
    }
}

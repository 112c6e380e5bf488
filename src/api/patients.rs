//! `/api/patients` routes: identity CRUD, the combined vacancy listing, the
//! three upserted sub-records, doctor notes and prescriptions.

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::db::Database;
use crate::error::ApiError;
use crate::models::patient::{
    GeneralInfoUpdate, MedicalConditionUpdate, NewDoctorNote, RegisterPatient, RelativeInfoUpdate,
    UpdatePatient,
};
use crate::models::prescription::NewPrescription;
use crate::storage::{self, Storage};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/patients")
            .route("/register", web::post().to(register))
            .route("/wards-and-beds", web::get().to(wards_and_beds))
            .route("", web::get().to(list))
            .route(
                "/upload-patient-image/{patient_id}",
                web::post().to(upload_image),
            )
            .service(
                web::resource("/{patient_id}/general-info")
                    .route(web::get().to(get_general_info))
                    .route(web::put().to(put_general_info)),
            )
            .service(
                web::resource("/{patient_id}/medical-info")
                    .route(web::get().to(get_medical_info))
                    .route(web::put().to(put_medical_info)),
            )
            .service(
                web::resource("/{patient_id}/relative-info")
                    .route(web::get().to(get_relative_info))
                    .route(web::put().to(put_relative_info)),
            )
            .route("/{patient_id}/add_note", web::post().to(add_note))
            .route("/{patient_id}/investigations", web::get().to(list_notes))
            .route(
                "/{patient_id}/investigations/{note_id}",
                web::delete().to(delete_note),
            )
            .service(
                web::resource("/{patient_id}/prescriptions")
                    .route(web::post().to(add_prescription))
                    .route(web::get().to(list_prescriptions)),
            )
            .route(
                "/{patient_id}/prescriptions/{prescription_id}",
                web::delete().to(delete_prescription),
            )
            .service(
                web::resource("/{patient_id}")
                    .route(web::get().to(get_by_id))
                    .route(web::put().to(update)),
            ),
    );
}

async fn register(
    db: web::Data<Database>,
    payload: web::Json<RegisterPatient>,
) -> Result<HttpResponse, ApiError> {
    let patient_id = db.create_patient(&payload).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Patient registered successfully!",
        "patientId": patient_id,
    })))
}

async fn list(db: web::Data<Database>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(db.list_patients().await?))
}

async fn get_by_id(
    db: web::Data<Database>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(db.get_patient(path.into_inner()).await?))
}

async fn update(
    db: web::Data<Database>,
    path: web::Path<i64>,
    payload: web::Json<UpdatePatient>,
) -> Result<HttpResponse, ApiError> {
    db.update_patient(path.into_inner(), &payload).await?;
    Ok(HttpResponse::Ok()
        .json(json!({ "message": "Patient Personal details updated successfully" })))
}

/// Combined vacancy listing used by the registration form.
async fn wards_and_beds(db: web::Data<Database>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(db.vacant_beds().await?))
}

async fn upload_image(
    db: web::Data<Database>,
    store: web::Data<Storage>,
    path: web::Path<i64>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let patient_id = path.into_inner();
    let (file, _) = storage::read_form(&store, payload, "image").await?;
    let file = file.ok_or_else(|| ApiError::validation("No file uploaded"))?;

    if let Err(err) = db.set_patient_image(patient_id, &file.relative_path).await {
        store.remove(&file.relative_path).await.ok();
        return Err(err);
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Profile image uploaded successfully",
        "filePath": file.relative_path,
    })))
}

// ===== Sub-records (one row per patient, upserted) =====

async fn get_general_info(
    db: web::Data<Database>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(db.get_general_info(path.into_inner()).await?))
}

async fn put_general_info(
    db: web::Data<Database>,
    path: web::Path<i64>,
    payload: web::Json<GeneralInfoUpdate>,
) -> Result<HttpResponse, ApiError> {
    db.upsert_general_info(path.into_inner(), &payload).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "General information saved successfully!" })))
}

async fn get_medical_info(
    db: web::Data<Database>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(db.get_medical_condition(path.into_inner()).await?))
}

async fn put_medical_info(
    db: web::Data<Database>,
    path: web::Path<i64>,
    payload: web::Json<MedicalConditionUpdate>,
) -> Result<HttpResponse, ApiError> {
    db.upsert_medical_condition(path.into_inner(), &payload)
        .await?;
    Ok(HttpResponse::Ok()
        .json(json!({ "message": "Medical condition information saved successfully!" })))
}

async fn get_relative_info(
    db: web::Data<Database>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(db.get_relative_info(path.into_inner()).await?))
}

async fn put_relative_info(
    db: web::Data<Database>,
    path: web::Path<i64>,
    payload: web::Json<RelativeInfoUpdate>,
) -> Result<HttpResponse, ApiError> {
    db.upsert_relative_info(path.into_inner(), &payload).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Relative information saved successfully!" })))
}

// ===== Doctor notes =====

async fn add_note(
    db: web::Data<Database>,
    path: web::Path<i64>,
    payload: web::Json<NewDoctorNote>,
) -> Result<HttpResponse, ApiError> {
    let note_id = db.add_doctor_note(path.into_inner(), &payload).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Doctor note added successfully!",
        "noteId": note_id,
    })))
}

async fn list_notes(
    db: web::Data<Database>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(db.list_doctor_notes(path.into_inner()).await?))
}

async fn delete_note(
    db: web::Data<Database>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, ApiError> {
    let (patient_id, note_id) = path.into_inner();
    db.delete_doctor_note(patient_id, note_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Investigation deleted successfully" })))
}

// ===== Prescriptions =====

async fn add_prescription(
    db: web::Data<Database>,
    path: web::Path<i64>,
    payload: web::Json<NewPrescription>,
) -> Result<HttpResponse, ApiError> {
    let prescription_id = db.create_prescription(path.into_inner(), &payload).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Prescription added successfully!",
        "prescriptionId": prescription_id,
    })))
}

async fn list_prescriptions(
    db: web::Data<Database>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let prescriptions = db.list_prescriptions(path.into_inner()).await?;
    if prescriptions.is_empty() {
        return Err(ApiError::NotFound("prescriptions"));
    }
    Ok(HttpResponse::Ok().json(prescriptions))
}

async fn delete_prescription(
    db: web::Data<Database>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, ApiError> {
    let (patient_id, prescription_id) = path.into_inner();
    db.delete_prescription(patient_id, prescription_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Prescription deleted successfully." })))
}

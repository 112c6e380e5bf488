//! Lab and blood-test report routes, mounted directly under `/api`.
//!
//! Uploads are multipart: one file plus text metadata fields. When the
//! metadata is rejected after the file already hit the disk, the file is
//! removed again so nothing is orphaned.

use actix_files::NamedFile;
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::warn;

use crate::db::reports::{NewBloodTestReport, NewLabReport};
use crate::db::Database;
use crate::error::ApiError;
use crate::storage::{self, SavedFile, Storage};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/uploadLabReport", web::post().to(upload_lab_report))
        .route(
            "/uploadBloodTestReport",
            web::post().to(upload_blood_test_report),
        )
        // GET lists by patient id, DELETE removes by report id.
        .service(
            web::resource("/lab_reports/{id}")
                .route(web::get().to(list_lab_reports))
                .route(web::delete().to(delete_lab_report)),
        )
        .service(
            web::resource("/blood_test_reports/{id}")
                .route(web::get().to(list_blood_test_reports))
                .route(web::delete().to(delete_blood_test_report)),
        )
        .route("/download/{file_name}", web::get().to(download));
}

/// Pull a required text field out of the parsed form, cleaning up the
/// already-written file on failure.
async fn require_field<'a>(
    fields: &'a std::collections::HashMap<String, String>,
    name: &str,
    store: &Storage,
    file: &SavedFile,
) -> Result<&'a str, ApiError> {
    match fields.get(name).map(String::as_str).filter(|v| !v.is_empty()) {
        Some(value) => Ok(value),
        None => {
            store.remove(&file.relative_path).await.ok();
            Err(ApiError::validation(
                "Please provide all required fields",
            ))
        }
    }
}

async fn parse_patient_id(
    value: &str,
    store: &Storage,
    file: &SavedFile,
) -> Result<i64, ApiError> {
    match value.parse() {
        Ok(id) => Ok(id),
        Err(_) => {
            store.remove(&file.relative_path).await.ok();
            Err(ApiError::validation("patientId must be a number"))
        }
    }
}

async fn upload_lab_report(
    db: web::Data<Database>,
    store: web::Data<Storage>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let (file, fields) = storage::read_form(&store, payload, "file").await?;
    let file = file.ok_or_else(|| ApiError::validation("No file uploaded"))?;

    let patient_id = require_field(&fields, "patientId", &store, &file).await?;
    let patient_id = parse_patient_id(patient_id, &store, &file).await?;
    let report_type = require_field(&fields, "reportType", &store, &file).await?;
    let report_date = require_field(&fields, "date", &store, &file).await?;

    let report = NewLabReport {
        patient_id,
        report_type,
        report_date,
        comment: fields.get("comment").map(String::as_str),
        file_path: &file.relative_path,
    };

    let report_id = match db.insert_lab_report(&report).await {
        Ok(id) => id,
        Err(err) => {
            store.remove(&file.relative_path).await.ok();
            return Err(err);
        }
    };

    Ok(HttpResponse::Created().json(json!({
        "message": "Lab report uploaded successfully",
        "reportId": report_id,
        "filePath": file.relative_path,
    })))
}

async fn upload_blood_test_report(
    db: web::Data<Database>,
    store: web::Data<Storage>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let (file, fields) = storage::read_form(&store, payload, "report_file").await?;
    let file = file.ok_or_else(|| ApiError::validation("No report file uploaded"))?;

    let patient_id = require_field(&fields, "patientId", &store, &file).await?;
    let patient_id = parse_patient_id(patient_id, &store, &file).await?;
    let doctor_name = require_field(&fields, "doctorName", &store, &file).await?;
    let report_date = require_field(&fields, "date", &store, &file).await?;

    let report = NewBloodTestReport {
        patient_id,
        doctor_name,
        report_file: &file.file_name,
        report_date,
        comment: fields.get("comment").map(String::as_str),
        file_path: &file.relative_path,
    };

    let report_id = match db.insert_blood_test_report(&report).await {
        Ok(id) => id,
        Err(err) => {
            store.remove(&file.relative_path).await.ok();
            return Err(err);
        }
    };

    Ok(HttpResponse::Created().json(json!({
        "message": "Blood test report uploaded successfully!",
        "reportId": report_id,
        "filePath": file.relative_path,
    })))
}

async fn list_lab_reports(
    db: web::Data<Database>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let reports = db.list_lab_reports(path.into_inner()).await?;
    if reports.is_empty() {
        return Err(ApiError::NotFound("lab reports"));
    }
    Ok(HttpResponse::Ok().json(json!({ "reports": reports })))
}

async fn list_blood_test_reports(
    db: web::Data<Database>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let reports = db.list_blood_test_reports(path.into_inner()).await?;
    if reports.is_empty() {
        return Err(ApiError::NotFound("blood test reports"));
    }
    Ok(HttpResponse::Ok().json(json!({ "reports": reports })))
}

/// Row first, then file: a crash between the two steps leaves at worst an
/// unreferenced file on disk, never a dangling database row.
async fn delete_lab_report(
    db: web::Data<Database>,
    store: web::Data<Storage>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let report_id = path.into_inner();
    let file_path = db.delete_lab_report(report_id).await?;
    if !store.remove(&file_path).await? {
        warn!(report_id, "lab report file was already missing");
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Lab report deleted successfully" })))
}

async fn delete_blood_test_report(
    db: web::Data<Database>,
    store: web::Data<Storage>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let report_id = path.into_inner();
    let file_path = db.delete_blood_test_report(report_id).await?;
    if !store.remove(&file_path).await? {
        warn!(report_id, "blood test report file was already missing");
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Blood test report deleted successfully" })))
}

async fn download(
    store: web::Data<Storage>,
    path: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let file_name = path.into_inner();
    let file_path = store.resolve(&file_name)?;

    let file = NamedFile::open_async(&file_path).await.map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            ApiError::NotFound("file")
        } else {
            ApiError::Storage(err)
        }
    })?;

    Ok(file.into_response(&req))
}

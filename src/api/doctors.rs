//! `/api/doctors` routes.

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::db::Database;
use crate::error::ApiError;
use crate::models::doctor::{RegisterDoctor, UpdateDoctor};
use crate::storage::{self, Storage};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/doctors")
            .route("/register", web::post().to(register))
            .route("", web::get().to(list))
            .route("/upload-doctor-image/{doctor_id}", web::post().to(upload_image))
            .service(
                web::resource("/{doctor_id}")
                    .route(web::get().to(get_by_id))
                    .route(web::put().to(update))
                    .route(web::delete().to(delete)),
            ),
    );
}

async fn register(
    db: web::Data<Database>,
    payload: web::Json<RegisterDoctor>,
) -> Result<HttpResponse, ApiError> {
    let doctor_id = db.create_doctor(&payload).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Doctor registered and user created successfully!",
        "doctorId": doctor_id,
    })))
}

async fn list(db: web::Data<Database>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(db.list_doctors().await?))
}

async fn get_by_id(
    db: web::Data<Database>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(db.get_doctor(path.into_inner()).await?))
}

async fn update(
    db: web::Data<Database>,
    path: web::Path<i64>,
    payload: web::Json<UpdateDoctor>,
) -> Result<HttpResponse, ApiError> {
    db.update_doctor(path.into_inner(), &payload).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Doctor details updated successfully" })))
}

async fn delete(db: web::Data<Database>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    db.delete_doctor(path.into_inner()).await?;
    Ok(HttpResponse::Ok()
        .json(json!({ "message": "Doctor and related user deleted successfully" })))
}

async fn upload_image(
    db: web::Data<Database>,
    store: web::Data<Storage>,
    path: web::Path<i64>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let doctor_id = path.into_inner();
    let (file, _) = storage::read_form(&store, payload, "image").await?;
    let file = file.ok_or_else(|| ApiError::validation("No file uploaded"))?;

    // Roll the disk write back if the row update fails.
    if let Err(err) = db.set_doctor_image(doctor_id, &file.relative_path).await {
        store.remove(&file.relative_path).await.ok();
        return Err(err);
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Profile image uploaded successfully",
        "filePath": file.relative_path,
    })))
}

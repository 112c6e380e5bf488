//! `/api/officers` routes. Same shape as doctors, plus the job role check.

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::db::Database;
use crate::error::ApiError;
use crate::models::officer::{RegisterOfficer, UpdateOfficer};
use crate::storage::{self, Storage};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/officers")
            .route("/register", web::post().to(register))
            .route("", web::get().to(list))
            .route(
                "/upload-officer-image/{officer_id}",
                web::post().to(upload_image),
            )
            .service(
                web::resource("/{officer_id}")
                    .route(web::get().to(get_by_id))
                    .route(web::put().to(update))
                    .route(web::delete().to(delete)),
            ),
    );
}

async fn register(
    db: web::Data<Database>,
    payload: web::Json<RegisterOfficer>,
) -> Result<HttpResponse, ApiError> {
    let officer_id = db.create_officer(&payload).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Officer registered successfully!",
        "officerId": officer_id,
    })))
}

async fn list(db: web::Data<Database>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(db.list_officers().await?))
}

async fn get_by_id(
    db: web::Data<Database>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(db.get_officer(path.into_inner()).await?))
}

async fn update(
    db: web::Data<Database>,
    path: web::Path<i64>,
    payload: web::Json<UpdateOfficer>,
) -> Result<HttpResponse, ApiError> {
    db.update_officer(path.into_inner(), &payload).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Officer details updated successfully" })))
}

async fn delete(db: web::Data<Database>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    db.delete_officer(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Officer deleted successfully" })))
}

async fn upload_image(
    db: web::Data<Database>,
    store: web::Data<Storage>,
    path: web::Path<i64>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let officer_id = path.into_inner();
    let (file, _) = storage::read_form(&store, payload, "image").await?;
    let file = file.ok_or_else(|| ApiError::validation("No file uploaded"))?;

    if let Err(err) = db.set_officer_image(officer_id, &file.relative_path).await {
        store.remove(&file.relative_path).await.ok();
        return Err(err);
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Profile image uploaded successfully",
        "filePath": file.relative_path,
    })))
}

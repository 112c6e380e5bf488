//! Per-category bed inventory routes, mounted directly under `/api`.

use actix_web::{web, HttpResponse};

use crate::db::Database;
use crate::error::ApiError;
use crate::models::ward::WardCategory;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/ccu_beds", web::get().to(ccu_beds))
        .route("/iccu_beds", web::get().to(iccu_beds))
        .route("/normal_ward_beds", web::get().to(normal_ward_beds));
}

async fn ccu_beds(db: web::Data<Database>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(db.list_beds(WardCategory::Ccu).await?))
}

async fn iccu_beds(db: web::Data<Database>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(db.list_beds(WardCategory::Iccu).await?))
}

async fn normal_ward_beds(db: web::Data<Database>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(db.list_beds(WardCategory::NormalWard).await?))
}

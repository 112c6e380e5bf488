//! HTTP API surface. Everything mounts under `/api`; each submodule owns one
//! resource prefix and registers its routes through `configure`.

use actix_web::web;

pub mod doctors;
pub mod officers;
pub mod patients;
pub mod reports;
pub mod wards;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(doctors::configure)
            .configure(officers::configure)
            .configure(patients::configure)
            .configure(wards::configure)
            .configure(reports::configure),
    );
}

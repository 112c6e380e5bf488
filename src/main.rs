//! Mediward hospital records backend
//!
//! Main entry point: load configuration, open the database, prepare the
//! upload directory and start the HTTP server.

use actix_cors::Cors;
use actix_files as fs;
use actix_web::{web, App, HttpServer};
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use mediward::{api, config, db::Database, storage::Storage};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config::load_config().expect("Failed to load configuration");

    let database = Database::connect(&config.database.url, config.database.max_connections)
        .await
        .expect("Failed to connect to database");
    database
        .init_schema()
        .await
        .expect("Failed to initialize database schema");

    let storage = Storage::new(&config.storage.upload_dir)
        .expect("Failed to prepare upload directory");

    info!(
        host = %config.server.host,
        port = config.server.port,
        "starting mediward server"
    );

    let db_data = web::Data::new(database);
    let storage_data = web::Data::new(storage);
    let upload_dir = config.storage.upload_dir.clone();

    HttpServer::new(move || {
        App::new()
            // Shared state
            .app_data(db_data.clone())
            .app_data(storage_data.clone())
            // Request logging
            .wrap(TracingLogger::default())
            // The original frontend is served separately
            .wrap(Cors::permissive())
            // API routes
            .configure(api::configure)
            // Serve uploaded files
            .service(fs::Files::new("/uploads", upload_dir.clone()))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}

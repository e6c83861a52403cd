use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;

mod api;
mod config;
mod db;
mod docs;
mod engine;
mod error;
mod model;
mod routes;
mod store;
mod utils;

use config::{Config, StoreBackend};
use db::init_db;
use routes::Limiters;
use store::{RecordStore, memory::MemoryRecordStore, mysql::MySqlRecordStore};
use utils::report_cache::ReportCache;

use crate::docs::ApiDoc;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "presence.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(backend = %config.store_backend, "Server starting...");

    let store: Arc<dyn RecordStore> = match config.store_backend {
        StoreBackend::Mysql => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            Arc::new(MySqlRecordStore::new(init_db(database_url).await?))
        }
        StoreBackend::Memory => {
            warn!("In-memory record store: uploads are lost on restart");
            Arc::new(MemoryRecordStore::new())
        }
    };

    let limiters = Limiters::from_config(&config)?;
    let server_addr = config.server_addr.clone();
    let api_prefix = config.api_prefix.clone();

    // shared across workers
    let store = Data::from(store);
    let cache = Data::new(ReportCache::new(config.report_cache_capacity));
    let config = Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard so JS/CSS assets match
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store.clone())
            .app_data(config.clone())
            .app_data(cache.clone())
            .configure(|cfg| routes::configure(cfg, &api_prefix, limiters.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}

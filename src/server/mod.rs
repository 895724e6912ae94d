pub mod errors;
pub mod handlers;

use crate::{
    config::Config,
    generator::{ImageGenerator, WorkerGenerator},
    storage::{BlobStore, ImageUploader, ObjectStore},
};
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;

/// Upper bound for request bodies; base64 images run to a few megabytes.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Read-only state shared by the proxy handlers.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn ImageGenerator>,
    pub uploader: ImageUploader,
}

impl AppState {
    pub fn new(generator: Arc<dyn ImageGenerator>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            generator,
            uploader: ImageUploader::new(store),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(WorkerGenerator::new(config.generator.clone())),
            Arc::new(BlobStore::new(config.blob_store.clone())),
        )
    }
}

/// Mounts both proxy routes. Expects `web::Data<AppState>` to be registered.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
        .route(
            crate::client::api::GENERATE_PATH,
            web::post().to(handlers::generate_image),
        )
        .route(
            crate::client::api::UPLOAD_PATH,
            web::post().to(handlers::upload_image),
        );
}

pub async fn run(config: Config) -> std::io::Result<()> {
    let state = web::Data::new(AppState::from_config(&config));
    let host = config.bind_host().to_string();
    let port = config.bind_port();

    crate::logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), &host, port);
    crate::logger::log_config_info(&config);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}

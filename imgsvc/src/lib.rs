//! # imgsvc: image upload and analysis service
//!
//! `imgsvc` accepts uploaded images, stores them in a pluggable storage backend, runs a registry
//! of analysis tasks over each one, records the results and serves a paginated history plus
//! the raw stored files.
//!
//! ## Architecture
//!
//! The HTTP layer is built on [Axum](https://github.com/tokio-rs/axum). Handlers in [`api`] turn
//! multipart uploads and query parameters into calls on the [`pipeline::ImagePipeline`], which
//! composes the pieces below:
//!
//! - [`validation`]: rejects missing uploads and disallowed media types before anything is written
//! - [`storage`]: `local` (filesystem directory) or `remote` (S3-compatible bucket) backend,
//!   selected once at startup by [`storage::create_file_storage`]
//! - [`tasks`]: an ordered list of analysis tasks; a failing task is reported in the `errors`
//!   map of the result and never aborts the upload
//! - [`db`]: append-only record repository, PostgreSQL or in-memory
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use imgsvc::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = imgsvc::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     imgsvc::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! With `database.type: postgres` migrations are run automatically on startup:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//! imgsvc::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
pub mod api;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod pipeline;
pub mod storage;
pub mod tasks;
pub mod telemetry;
pub mod upload;
pub mod validation;

#[cfg(test)]
mod test;

use crate::{
    config::DatabaseConfig,
    db::handlers::{ImageRepository, InMemoryImageRepository, PostgresImageRepository},
    openapi::ApiDoc,
    pipeline::ImagePipeline,
    storage::create_file_storage,
    tasks::TaskRegistry,
    validation::UploadValidator,
};
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    routing::get,
};
use bon::Builder;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .pipeline(pipeline)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub pipeline: ImagePipeline,
}

/// Get the imgsvc database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Build the record repository selected by `database`.
///
/// Returns the pool alongside the repository when PostgreSQL is used, so it can be closed on
/// shutdown.
async fn setup_repository(config: &Config) -> anyhow::Result<(Arc<dyn ImageRepository>, Option<PgPool>)> {
    match &config.database {
        DatabaseConfig::Memory => {
            info!("Using in-memory record repository; records are lost on shutdown");
            Ok((Arc::new(InMemoryImageRepository::new()), None))
        }
        DatabaseConfig::Postgres { url, max_connections } => {
            info!("Using PostgreSQL record repository");
            let pool = PgPoolOptions::new().max_connections(*max_connections).connect(url).await?;
            migrator().run(&pool).await?;
            Ok((Arc::new(PostgresImageRepository::new(pool.clone())), Some(pool)))
        }
    }
}

/// Wire the configured storage backend, task registry and repository into a pipeline.
pub async fn build_pipeline(config: &Config, repository: Arc<dyn ImageRepository>) -> anyhow::Result<ImagePipeline> {
    let storage = Arc::new(create_file_storage(&config.storage).await?);
    let tasks = TaskRegistry::default_tasks();
    let validator = UploadValidator::new(&config.allowed_image_extensions);
    info!(
        tasks = ?tasks.names(),
        allowed = ?validator.allowed(),
        storage = storage.kind(),
        "Analysis pipeline ready"
    );

    Ok(ImagePipeline::builder()
        .validator(validator)
        .writer(storage.clone())
        .reader(storage)
        .tasks(Arc::new(tasks))
        .repository(repository)
        .base_url(config.image_base_url())
        .build())
}

/// Build the application router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.body_limit();

    let image_routes = Router::new()
        .route(
            "/images",
            get(api::handlers::images::list_images)
                .post(api::handlers::images::upload_image)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/images/view/{name}", get(api::handlers::images::view_image))
        .with_state(state);

    Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .merge(image_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

pub struct Application {
    router: Router,
    config: Config,
    pool: Option<PgPool>,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting image service with configuration: {:#?}", config);

        let (repository, pool) = setup_repository(&config).await?;
        let pipeline = build_pipeline(&config, repository).await?;

        let state = AppState::builder().config(config.clone()).pipeline(pipeline).build();
        let router = build_router(state);

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Image service listening on http://{}, available at {}",
            bind_addr, self.config.public_url
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        if let Some(pool) = self.pool {
            info!("Closing database connections...");
            pool.close().await;
        }

        Ok(())
    }
}

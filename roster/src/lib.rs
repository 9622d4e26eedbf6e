//! # roster: people, their items, and one joined query
//!
//! `roster` is a small layered CRUD web application. HTTP handlers ([`api`]) validate form
//! input and delegate to services ([`services`]), which run repositories ([`db`]) inside
//! explicit transactions against SQLite. Pages are server-rendered minijinja templates
//! ([`views`]).
//!
//! The data model is `Person` (one) to `Item` (many). Reads never load related rows implicitly:
//! the people listing uses [`db::handlers::People::list_with_items`], a single outer join that
//! materializes every person with its items in one round trip instead of one query per person.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use roster::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = roster::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     roster::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await
//! }
//! ```
pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod services;
pub mod telemetry;
mod types;
pub mod validation;
pub mod views;

#[cfg(test)]
pub mod test_utils;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::{
    ConnectOptions, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info};

pub use types::{ItemId, PersonId};

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder().db(pool).config(config).build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
}

/// Get the roster database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Open the pool described by the config and bring the schema up to date.
async fn setup_database(config: &Config) -> anyhow::Result<SqlitePool> {
    let settings = &config.database.pool;

    let connect_options = SqliteConnectOptions::from_str(&config.database.url)?
        .foreign_keys(true)
        .log_statements(log::LevelFilter::Debug)
        .log_slow_statements(log::LevelFilter::Warn, config.slow_statement_threshold());

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout())
        .idle_timeout(settings.idle_timeout())
        .max_lifetime(settings.max_lifetime())
        .connect_with(connect_options)
        .await?;

    if config.run_migrations {
        migrator().run(&pool).await?;
    } else {
        info!("Skipping migrations (run_migrations = false)");
    }

    Ok(pool)
}

/// Build the application router with every route and the tracing layer.
pub fn build_router(state: AppState) -> Router {
    use api::handlers::{items, people};

    let router = Router::new()
        .route("/", get(|| async { Redirect::to("/people") }))
        .route("/healthz", get(|| async { "OK" }))
        .route("/people", get(people::list_people).post(people::create_person))
        .route("/people/new", get(people::new_person_form))
        .route("/people/search", get(people::search_people))
        .route(
            "/people/{id}",
            get(people::show_person)
                .patch(people::update_person)
                .delete(people::delete_person)
                .post(people::override_person),
        )
        .route("/people/{id}/edit", get(people::edit_person_form))
        .route("/people/{id}/items", post(people::add_item))
        .route("/items", get(items::list_items))
        .with_state(state);

    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting roster with configuration: {:#?}", config);

        let pool = setup_database(&config).await?;
        Ok(Self::new_with_pool(config, pool))
    }

    /// Create an application around an existing, already migrated pool
    pub fn new_with_pool(config: Config, pool: SqlitePool) -> Self {
        let state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(state);

        Self { router, config, pool }
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Roster listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        // Close database connections
        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}

//! Server construction and adapter wiring.
//!
//! Builds the production dependency graph once at startup: connection
//! pool, Diesel repositories, the Gemini gateway, and the credential
//! adapters, all passed into handlers through [`HttpState`].

mod config;

pub use config::{AppConfig, ConfigError};

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::configure;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::assistant::{GeminiClient, GeminiConfig};
use crate::outbound::persistence::{
    DbPool, DieselChatRepository, DieselEventRepository, DieselSchoolworkRepository,
    DieselScoreRepository, DieselUserRepository, PoolConfig,
};
use crate::outbound::security::{Argon2PasswordHasher, JwtTokenService};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply pending migrations over a short-lived synchronous connection.
///
/// # Errors
///
/// Propagates connection and migration failures as [`std::io::Error`].
pub fn run_migrations(database_url: &str) -> std::io::Result<()> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| std::io::Error::other(format!("database connection failed: {err}")))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| std::io::Error::other(format!("migrations failed: {err}")))?;
    if !applied.is_empty() {
        info!(count = applied.len(), "applied pending migrations");
    }
    Ok(())
}

/// Wire the production adapters into the HTTP state.
///
/// # Errors
///
/// Fails when the Gemini client cannot be constructed.
pub fn build_http_state(pool: &DbPool, config: &AppConfig) -> std::io::Result<HttpState> {
    let gemini = GeminiConfig::new(&config.gemini_api_key);
    let gemini = match &config.gemini_model {
        Some(model) => gemini.with_model(model),
        None => gemini,
    };
    let assistant = GeminiClient::new(gemini)
        .map_err(|err| std::io::Error::other(format!("gemini client setup failed: {err}")))?;

    Ok(HttpState::new(HttpStatePorts {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        events: Arc::new(DieselEventRepository::new(pool.clone())),
        chat: Arc::new(DieselChatRepository::new(pool.clone())),
        scores: Arc::new(DieselScoreRepository::new(pool.clone())),
        schoolwork: Arc::new(DieselSchoolworkRepository::new(pool.clone())),
        assistant: Arc::new(assistant),
        passwords: Arc::new(Argon2PasswordHasher::new()),
        tokens: Arc::new(JwtTokenService::new(&config.signing_key)),
    }))
}

/// Migrate, wire, bind, and serve until shutdown.
///
/// # Errors
///
/// Propagates [`std::io::Error`] from migrations, pool construction,
/// socket binding, or the running server.
pub async fn run(config: AppConfig) -> std::io::Result<()> {
    run_migrations(&config.database_url)?;

    let pool = DbPool::new(PoolConfig::new(&config.database_url))
        .await
        .map_err(|err| std::io::Error::other(format!("pool setup failed: {err}")))?;
    let state = web::Data::new(build_http_state(&pool, &config)?);

    info!(bind_addr = %config.bind_addr, "starting HTTP server");
    HttpServer::new(move || {
        let app = App::new().app_data(state.clone()).configure(configure);

        #[cfg(debug_assertions)]
        let app =
            app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

        app
    })
    .bind(config.bind_addr)?
    .run()
    .await
}

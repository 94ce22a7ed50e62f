pub mod appresult;
pub mod auth;
pub mod chats;
pub mod config;
pub mod db;
pub mod messages;
pub mod presence;
pub mod profiles;
pub mod session;

use std::sync::Arc;

use anyhow::Context;
use axum::{extract::FromRef, http::{header, HeaderValue, Method}, routing::get, Router};
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

pub use appresult::{AppError, AppJson, AppResult};
pub use config::Config;
use presence::PresenceRegistry;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub presence: Arc<PresenceRegistry>,
}

impl AppState {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self {
            db_pool,
            presence: Arc::new(PresenceRegistry::new()),
        }
    }
}

pub fn router(app_state: AppState, config: &Config) -> anyhow::Result<Router> {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(config.session_inactivity_minutes)));

    let mut app = Router::new()
        .route("/ws", get(presence::presence_ws))

        .nest("/api/auth", auth::router())
        .nest("/api/user", profiles::router())
        .nest("/api/messages", messages::router())

        .with_state(app_state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http());

    if let Some(origin) = &config.cors_origin {
        let origin = HeaderValue::from_str(origin)
            .with_context(|| format!("CORS_ORIGIN={origin} is not a valid header value"))?;
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_credentials(true)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        );
    }

    Ok(app)
}

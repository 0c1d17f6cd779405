pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod library;
pub mod templates;

use std::sync::Arc;
use actix_web::HttpResponse;
use tracing::info;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::{AuthService, SessionGate};
pub use db::{BookService, DbOperations, SessionService, UserService};
pub use library::LibraryService;
pub use templates::Templates;

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all workers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub auth: Arc<AuthService>,
    pub library: Arc<LibraryService>,
    pub gate: SessionGate,
    pub templates: Arc<Templates>,
}

impl AppState {
    /// Connects to Postgres, prepares the schema and wires the services.
    pub async fn new(config: Settings) -> Result<Self> {
        let db = DbOperations::new_with_options(
            &config.database.url,
            config.database.max_connections,
            config.database.acquire_timeout(),
        )
        .await?;
        info!("Connected to database");

        db.init_schema(config.database.reset_sessions_on_startup).await?;

        Self::with_store(config, Arc::new(db))
    }

    /// Wires the services over any store implementing all three storage traits.
    pub fn with_store<S>(config: Settings, store: Arc<S>) -> Result<Self>
    where
        S: UserService + BookService + SessionService + 'static,
    {
        let users: Arc<dyn UserService> = store.clone();
        let books: Arc<dyn BookService> = store.clone();
        let sessions: Arc<dyn SessionService> = store;

        let gate = SessionGate::new(
            sessions.clone(),
            config.session.idle_timeout(),
            config.session.secure_cookie,
        );
        let auth = AuthService::new(users, sessions, config.auth.bcrypt_cost);

        Ok(Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            library: Arc::new(LibraryService::new(books)),
            gate,
            templates: Arc::new(Templates::new()?),
        })
    }
}

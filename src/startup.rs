//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::application::{CleanupHandle, MessageService};
use crate::config::Settings;
use crate::infrastructure::database;
use crate::infrastructure::repositories::PgMessageStore;
use crate::presentation::http::handlers::health;
use crate::presentation::http::routes;
use crate::presentation::websocket::Hub;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub messages: Arc<MessageService>,
    pub hub: Hub,
    pub settings: Arc<Settings>,
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    cleanup: CleanupHandle,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        // Create database pool
        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        database::run_migrations(&db).await?;
        tracing::info!("Database migrations applied");

        // Message lifecycle service over the PostgreSQL store
        let store = Arc::new(PgMessageStore::new(db.clone()));
        let messages = Arc::new(MessageService::new(store, settings.board.message_ttl()));

        // Background expiry sweep, cancelled when the application stops
        let cleanup = messages.start_cleanup_routine(settings.board.cleanup_interval());
        tracing::info!(
            interval_secs = settings.board.cleanup_interval_secs,
            ttl_secs = settings.board.message_ttl_secs,
            "Expiry sweep started"
        );

        // Broadcast hub control loop
        let hub = Hub::spawn(Arc::clone(&messages), settings.board.history_limit);

        // Create app state
        let state = AppState {
            db,
            messages,
            hub,
            settings: Arc::new(settings.clone()),
        };

        // Build router with middleware
        let router = routes::create_router(state).layer(TraceLayer::new_for_http());

        // Bind to address
        let addr = SocketAddr::from(([0, 0, 0, 0], settings.server.port));
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self {
            listener,
            router,
            cleanup,
        })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        // Held for the server's lifetime; dropping it cancels the sweep.
        let _cleanup = self.cleanup;
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

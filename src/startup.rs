//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;

use crate::config::Settings;
use crate::infrastructure::database;
use crate::infrastructure::repositories::{
    PgGroupRepository, PgMessageRepository, PgUserRepository,
};
use crate::presentation::http::routes;
use crate::presentation::middleware::{cors, logging};
use crate::presentation::websocket::gateway::{Gateway, GroupNotifier, PresenceBroadcaster};
use crate::presentation::websocket::hub::MessageHub;
use crate::presentation::websocket::presence::PresenceTracker;
use crate::shared::snowflake::SnowflakeGenerator;

/// The hub wired to its production stores.
pub type ChatHub = MessageHub<PgMessageRepository, PgGroupRepository, PgUserRepository>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub snowflake: Arc<SnowflakeGenerator>,
    pub gateway: Arc<Gateway>,
    pub presence: Arc<PresenceTracker>,
    pub hub: Arc<ChatHub>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire up the state from a database pool and settings.
    pub fn new(db: PgPool, settings: Settings) -> Self {
        let snowflake = Arc::new(SnowflakeGenerator::new(settings.snowflake.machine_id as u64));
        let gateway = Arc::new(Gateway::new());
        let presence = Arc::new(PresenceTracker::new());

        let notifier: Arc<dyn GroupNotifier> = gateway.clone();
        let presence_hub: Arc<dyn PresenceBroadcaster> = gateway.clone();

        let hub = Arc::new(MessageHub::new(
            Arc::new(PgMessageRepository::new(db.clone())),
            Arc::new(PgGroupRepository::new(db.clone())),
            Arc::new(PgUserRepository::new(db.clone())),
            presence.clone(),
            notifier,
            presence_hub,
            snowflake.clone(),
        ));

        Self {
            db,
            snowflake,
            gateway,
            presence,
            hub,
            settings: Arc::new(settings),
        }
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        // Create database pool
        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        database::run_migrations(&db).await?;
        tracing::info!("Database migrations applied");

        let state = AppState::new(db, settings.clone());

        // Build router with middleware
        let router = routes::create_router(state)
            .layer(logging::create_trace_layer())
            .layer(cors::create_cors_layer(&settings.cors))
            // Outermost boundary: unexpected faults become a generic 500
            .layer(CatchPanicLayer::new());

        // Bind to address
        let addr: SocketAddr = settings.server_addr().parse()?;
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

//! Application Startup
//!
//! Application building and server initialization.

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use redis::aio::ConnectionManager;
use tokio::net::TcpListener;

use crate::config::Settings;
use crate::infrastructure::{bus, cache};
use crate::infrastructure::bus::{EventSink, RedisBus};
use crate::presentation::http::routes;
use crate::presentation::http::handlers::health;
use crate::presentation::middleware::{cors, logging};
use crate::presentation::websocket::gateway::Gateway;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub redis: ConnectionManager,
    pub bus: Arc<RedisBus>,
    pub gateway: Arc<Gateway>,
    pub settings: Arc<Settings>,
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        // Create Redis connection manager (storage + publish side)
        let redis = cache::create_redis_client(&settings.redis).await?;
        tracing::info!("Redis connection established");

        // Create WebSocket gateway
        let gateway = Arc::new(Gateway::new());

        // Create the fan-out bus publisher
        let bus = Arc::new(RedisBus::new(redis.clone()));

        // The subscriber needs its own connection; a Redis connection in
        // subscribe mode cannot issue regular commands.
        let subscriber_client = redis::Client::open(settings.redis.url.as_str())?;
        tokio::spawn(bus::run_subscriber(
            subscriber_client,
            gateway.clone() as Arc<dyn EventSink>,
        ));

        health::init_server_start();

        // Create app state
        let state = AppState {
            redis,
            bus,
            gateway,
            settings: Arc::new(settings.clone()),
        };

        // Build router with middleware
        let router = routes::create_router(state)
            .layer(logging::create_trace_layer())
            .layer(cors::create_cors_layer(&settings.cors));

        // Bind to address
        let addr = settings.server_addr();
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }
}

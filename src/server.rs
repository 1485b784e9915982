//! Server runtime
//!
//! [`ServerHandle`] owns the whole lifecycle: storage, services, the
//! overdue-reservation sweeper, the REST API and graceful shutdown.

use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use crate::application::events::{create_event_bus, SharedEventBus};
use crate::application::ports::PaymentGateway;
use crate::application::services::{start_reservation_sweeper, AppServices};
use crate::config::AppConfig;
use crate::infrastructure::database::{open_repositories, DatabaseConfig};
use crate::infrastructure::payment::SimulatedGateway;
use crate::interfaces::http::middleware::AuthState;
use crate::interfaces::http::{create_api_router, AppState};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Options for starting the service.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

/// The global metrics recorder can only be installed once per process, so
/// a restart within the same process reuses it.
pub fn prometheus_handle() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    if let Some(handle) = PROM_HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("Prometheus metrics recorder installed");
    Ok(PROM_HANDLE.get_or_init(|| handle).clone())
}

/// Handle to a running service.
pub struct ServerHandle {
    pub services: AppServices,
    pub event_bus: SharedEventBus,
    pub config: AppConfig,
    /// Port actually bound (differs from the config when it asked for 0)
    pub port: u16,

    db: Option<DatabaseConnection>,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        app_cfg.validate()?;

        info!("Starting Park-Eazy...");
        let prometheus = prometheus_handle()?;

        // ── Storage ────────────────────────────────────────────
        let db_config = DatabaseConfig {
            url: app_cfg.database.url.clone(),
        };
        let (repos, db) = open_repositories(&db_config, opts.auto_migrate).await?;

        // ── Services ───────────────────────────────────────────
        let event_bus = create_event_bus();
        let gateway: Arc<dyn PaymentGateway> = Arc::new(SimulatedGateway::new());
        let services = AppServices::new(
            repos,
            gateway,
            event_bus.clone(),
            app_cfg.store_policy(),
            app_cfg.default_currency()?,
        );

        // ── Background tasks ───────────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();
        start_reservation_sweeper(
            services.reservations.clone(),
            shutdown_signal.clone(),
            app_cfg.reservations.sweep_interval_secs,
        );

        // ── REST API ───────────────────────────────────────────
        let auth = AuthState {
            jwt_config: app_cfg.jwt_config(),
        };
        let state = AppState::new(services.clone(), auth, db.clone());
        let router = create_api_router(state, prometheus);

        let listener = tokio::net::TcpListener::bind(app_cfg.listen_address()).await?;
        let addr = listener.local_addr()?;
        info!("REST API listening on http://{}", addr);
        info!("Swagger UI available at http://{}/docs/", addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(listener, router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API received shutdown signal");
        });
        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!(error = %e, "REST API server error");
            }
        });

        Ok(Self {
            services,
            event_bus,
            config: app_cfg,
            port: addr.port(),
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Trigger shutdown on SIGTERM / SIGINT.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the API to stop after shutdown was triggered, then close
    /// the database.
    pub async fn wait(self) {
        let timeout = self.shutdown.timeout();
        match tokio::time::timeout(timeout, self.api_task).await {
            Ok(Ok(())) => info!("REST API stopped"),
            Ok(Err(e)) => error!(error = %e, "REST API task panicked"),
            Err(_) => warn!(
                timeout_secs = timeout.as_secs(),
                "REST API did not drain in time"
            ),
        }

        if let Some(db) = self.db {
            match db.close().await {
                Ok(()) => info!("Database connection closed"),
                Err(e) => warn!(error = %e, "Error closing database connection"),
            }
        }
        info!("Park-Eazy shutdown complete");
    }

    pub async fn shutdown(self) {
        info!("Shutting down Park-Eazy...");
        self.trigger_shutdown();
        self.wait().await;
    }
}

/// Initialize tracing from the application config.
///
/// Call once at process startup, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

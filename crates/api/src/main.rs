//! API server entry point.

use api::config::{self, Config, LogFormat};
use guest_store::{InMemoryGuestStore, PostgresGuestStore};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Resolves with the name of the first shutdown signal received.
///
/// A signal whose handler cannot be installed is logged and never fires.
async fn shutdown_signal() -> &'static str {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => "SIGINT",
        () = terminate => "SIGTERM",
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn serve(app: axum::Router, addr: &str) {
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let received = shutdown_signal().await;
            tracing::info!(signal = received, "draining connections before exit");
        })
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}

#[tokio::main]
async fn main() {
    // 1. Load env files and configuration
    let env_files = config::load_env_files();
    let config = Config::from_env().expect("invalid configuration");

    // 2. Initialize tracing
    init_tracing(&config);
    tracing::debug!(?env_files, "loaded env files");

    // 3. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 4. Connect the guest store and start serving
    let addr = config.addr();
    match &config.database {
        Some(db) => {
            tracing::info!(host = %db.host, database = %db.database, "connecting to PostgreSQL");
            let pool = db.connect().await.expect("failed to connect to PostgreSQL");
            let store = PostgresGuestStore::new(pool);
            if db.run_migrations {
                store.run_migrations().await.expect("migrations failed");
                tracing::info!("database migrations applied");
            }
            let app = api::create_app(api::create_state(store), metrics_handle);
            serve(app, &addr).await;
        }
        None => {
            tracing::warn!("no database configured, guests are kept in memory only");
            let app = api::create_app(api::create_state(InMemoryGuestStore::new()), metrics_handle);
            serve(app, &addr).await;
        }
    }
}

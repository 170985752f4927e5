// src/main.rs

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use quiz_backend::config::Config;
use quiz_backend::flow::FlowManager;
use quiz_backend::routes;
use quiz_backend::seed::seed_catalog;
use quiz_backend::state::AppState;
use tokio::sync::oneshot;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration from .env and the environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // A collection that cannot be loaded is fatal.
    let flows = match FlowManager::open(&config.data_dir) {
        Ok(flows) => flows,
        Err(e) => {
            tracing::error!("Failed to load collections from {}: {}", config.data_dir.display(), e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Collections loaded from {}", config.data_dir.display());

    // Seed the catalog
    if let Some(seed_file) = &config.seed_file {
        match seed_catalog(flows.collections(), seed_file) {
            Ok(report) => tracing::info!(
                questions = report.questions,
                quiz_types = report.quiz_types,
                "Catalog seeded from {}",
                seed_file.display()
            ),
            Err(e) => {
                tracing::error!("Failed to seed catalog from {}: {}", seed_file.display(), e);
                return ExitCode::FAILURE;
            }
        }
    }

    let state = AppState {
        flows: Arc::new(flows),
        config: config.clone(),
    };

    let app = routes::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Quiz server listening on {}", addr);

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            tracing::error!("Server stopped unexpectedly: {:?}", result);
            return ExitCode::FAILURE;
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received, draining connections...");
        }
    }

    let _ = stop_tx.send(());
    match tokio::time::timeout(Duration::from_secs(config.shutdown_timeout), server).await {
        Ok(Ok(Ok(()))) => {
            tracing::info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Ok(result) => {
            tracing::error!("Graceful shutdown failed: {:?}", result);
            ExitCode::FAILURE
        }
        Err(_) => {
            tracing::warn!(
                "Graceful shutdown timed out after {}s",
                config.shutdown_timeout
            );
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

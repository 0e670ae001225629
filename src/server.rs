use crate::config::WebConfig;
use crate::router::{RouterBuilder, WebApp};
use crate::services::{ApiRoutes, ServiceBindings};
use axum::{extract::Request, ServiceExt};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Serve(#[source] std::io::Error),
}

/// Start the server.
///
/// Runs until the listener fails or the process receives Ctrl+C / SIGTERM.
/// A bind failure is returned immediately; there is no retry.
pub async fn serve<R: ApiRoutes>(
    config: WebConfig,
    bindings: ServiceBindings,
    routes: R,
) -> Result<(), ServerError> {
    let config = Arc::new(config);
    let app = RouterBuilder::new(config.clone(), bindings).build(routes);

    let bind_addr = config.bind_address();
    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(source) => {
            error!("Cannot listen on {}: {}", bind_addr, source);
            return Err(ServerError::Bind {
                addr: bind_addr,
                source,
            });
        }
    };

    info!("Listening on {}", bind_addr);

    serve_with_listener(listener, app, shutdown_signal()).await
}

/// Serve an already-built application on a bound listener until `shutdown` resolves
pub async fn serve_with_listener<F>(
    listener: TcpListener,
    app: WebApp,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)?;

    info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down...");
        },
        _ = terminate => {
            info!("Received termination signal, shutting down...");
        },
    }
}

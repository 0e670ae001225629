// Main entry point for the ADK web server
use adk_web::config::{LogFormat, WebConfig};
use adk_web::server;
use adk_web::services::{ApiRouterConfig, ServiceBindings};
use anyhow::{Context, Result};
use axum::Router;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// The standalone binary has no API backend; launchers embedding the library register their own routes
fn no_api_routes(router: Router, _config: &ApiRouterConfig) -> Router {
    router
}

fn init_logging(format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse configuration; logging depends on it
    let config = WebConfig::parse().context("Failed to parse configuration")?;

    init_logging(config.log_format);

    info!(
        "Welcome to adk-web {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_COMMIT_SHA")
    );
    info!("Port: {}", config.port);
    info!("Front address: {}", config.front_address);
    info!("Web UI: {}", if config.start_webui { "enabled" } else { "disabled" });
    info!("REST API: {}", if config.start_restapi { "enabled" } else { "disabled" });

    server::serve(config, ServiceBindings::unbound(), no_api_routes)
        .await
        .context("Server error")?;

    Ok(())
}

//! Prediction service
//!
//! A thin HTTP wrapper around one persisted model bundle. The artifact is
//! deserialized once at startup and held as read-only state for the process
//! lifetime; every request is an independent read.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub artifact_path: PathBuf,
}

impl ServerConfig {
    /// Build a configuration, falling back to `API_HOST`/`API_PORT` env vars
    pub fn new(artifact_path: PathBuf, host: Option<String>, port: Option<u16>) -> Self {
        Self {
            host: host
                .or_else(|| std::env::var("API_HOST").ok())
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port: port
                .or_else(|| std::env::var("API_PORT").ok().and_then(|p| p.parse().ok()))
                .unwrap_or(8000),
            artifact_path,
        }
    }
}

/// Load the artifact and serve it until ctrl-c
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();

    let state = Arc::new(AppState::load(&config.artifact_path)?);
    info!(
        artifact = %config.artifact_path.display(),
        hazard = %state.kind(),
        started_at = %start_time.to_rfc3339(),
        "Artifact loaded"
    );

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        address = %addr,
        pid = std::process::id(),
        "Prediction service listening"
    );

    let shutdown_signal = async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        let uptime = chrono::Utc::now().signed_duration_since(start_time);
        info!(
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping service"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Service shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::new(PathBuf::from("model.json"), None, Some(9000));
        assert_eq!(config.port, 9000);
        assert!(!config.host.is_empty());
    }
}

// # profiled - Profile Directory Daemon
//
// This is a THIN integration layer ONLY. Profile decisions (existence
// checks, conflicts, create-vs-update) MUST stay in profile-core.
//
// The profiled daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Opening the profile store
// 4. Serving the HTTP routes until a shutdown signal arrives
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `PROFILED_BIND_ADDR`: Listen address (default 127.0.0.1:8080)
// - `PROFILED_STORE_TYPE`: Type of profile store (memory, file)
// - `PROFILED_STORE_PATH`: Path to the profile file (for file store)
// - `PROFILED_SHUTDOWN_TIMEOUT_SECS`: Drain timeout on shutdown (1-300)
// - `PROFILED_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export PROFILED_BIND_ADDR=0.0.0.0:8080
// export PROFILED_STORE_TYPE=file
// export PROFILED_STORE_PATH=/var/lib/profiled/profiles.json
//
// profiled
// ```

use anyhow::Result;
use profile_core::{ProfileOrchestrator, ServerConfig, ServiceConfig, StoreConfig};
use std::env;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum ProfiledExitCode {
    CleanShutdown = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<ProfiledExitCode> for ExitCode {
    fn from(code: ProfiledExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration as read from the environment
struct Config {
    bind_addr: String,
    store_type: String,
    store_path: Option<String>,
    shutdown_timeout_secs: Option<u64>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let shutdown_timeout_secs = env::var("PROFILED_SHUTDOWN_TIMEOUT_SECS")
            .ok()
            .map(|s| {
                s.parse::<u64>().map_err(|_| {
                    anyhow::anyhow!(
                        "PROFILED_SHUTDOWN_TIMEOUT_SECS must be a number of seconds. Got: {}",
                        s
                    )
                })
            })
            .transpose()?;

        Ok(Self {
            bind_addr: env::var("PROFILED_BIND_ADDR")
                .unwrap_or_else(|_| ServerConfig::default().bind_addr),
            store_type: env::var("PROFILED_STORE_TYPE").unwrap_or_else(|_| "memory".to_string()),
            store_path: env::var("PROFILED_STORE_PATH").ok(),
            shutdown_timeout_secs,
            log_level: env::var("PROFILED_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration and turn it into the core service config
    fn into_service_config(self) -> Result<ServiceConfig> {
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "PROFILED_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        let store = match self.store_type.as_str() {
            "memory" => StoreConfig::Memory,
            "file" => match self.store_path {
                Some(path) if !path.trim().is_empty() => StoreConfig::File { path },
                _ => anyhow::bail!(
                    "PROFILED_STORE_PATH is required when PROFILED_STORE_TYPE=file. \
                    Set it via: export PROFILED_STORE_PATH=/var/lib/profiled/profiles.json"
                ),
            },
            other => anyhow::bail!(
                "PROFILED_STORE_TYPE '{}' is not supported. \
                Supported types: memory, file",
                other
            ),
        };

        let mut server = ServerConfig {
            bind_addr: self.bind_addr,
            ..ServerConfig::default()
        };
        if let Some(timeout) = self.shutdown_timeout_secs {
            server.shutdown_timeout_secs = timeout;
        }

        let config = ServiceConfig { server, store };
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ProfiledExitCode::ConfigError.into();
        }
    };

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let service_config = match config.into_service_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return ProfiledExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ProfiledExitCode::ConfigError.into();
    }

    info!("Starting profiled daemon");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ProfiledExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(service_config).await {
            error!("Daemon error: {}", e);
            ProfiledExitCode::RuntimeError
        } else {
            ProfiledExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon until a shutdown signal arrives
async fn run_daemon(config: ServiceConfig) -> Result<()> {
    info!("Store type: {}", config.store.type_name());
    let orchestrator = ProfileOrchestrator::new(profile_core::open_store(&config.store).await?);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", config.server.bind_addr, e))?;
    info!("Listening on {}", config.server.bind_addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let app = profiled::router(orchestrator.clone());
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = shutdown_rx.await;
    });
    let mut server_handle = tokio::spawn(async move { server.await });

    tokio::select! {
        result = &mut server_handle => {
            // Server ended without being asked to
            result??;
            anyhow::bail!("HTTP server stopped unexpectedly");
        }
        received = wait_for_shutdown_signal() => {
            info!("Received shutdown signal: {}", received?);
        }
    }

    let _ = shutdown_tx.send(());
    let drain_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);
    match tokio::time::timeout(drain_timeout, server_handle).await {
        Ok(result) => result??,
        Err(_) => warn!(
            "In-flight requests did not finish within {:?}, shutting down anyway",
            drain_timeout
        ),
    }

    orchestrator.store().flush().await?;
    info!("Profile store flushed, daemon stopped");

    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(name)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}

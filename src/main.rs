//! hotcache - An embeddable LRU cache with lazy TTL expiry
//!
//! Binary that hosts the cache inside a TCP echo server.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hotcache::{listen_and_serve, spawn_expiry_sweeper, Config, EchoHandler, LruCache};

/// Main entry point for the hotcache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Create the shared cache
/// 4. Start the expiry sweeper if enabled
/// 5. Serve connections until SIGINT/SIGTERM/SIGHUP/SIGQUIT
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hotcache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting hotcache server");

    let config = Config::from_env();
    config.validate().context("invalid configuration")?;
    info!(
        "Configuration loaded: cache_capacity={}, server_addr={}, cleanup_interval={}s",
        config.cache_capacity, config.server_addr, config.cleanup_interval
    );

    let cache: Arc<LruCache<String, String>> = Arc::new(
        LruCache::new(config.cache_capacity).context("failed to create cache")?,
    );
    info!("Cache initialized");

    let shutdown = CancellationToken::new();

    let sweeper = config
        .sweep_interval()
        .map(|interval| spawn_expiry_sweeper(Arc::clone(&cache), interval, shutdown.clone()));
    if sweeper.is_none() {
        info!("Expiry sweeper disabled, expired entries are reclaimed on access");
    }

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tokio::spawn(shutdown_signal(shutdown.clone()));

    listen_and_serve(listener, Arc::new(EchoHandler::new()), shutdown.clone())
        .await
        .context("server error")?;

    if let Some(handle) = sweeper {
        if let Err(e) = handle.await {
            warn!(error = %e, "Expiry sweeper ended abnormally");
        }
    }

    let stats = cache.stats();
    info!(
        entries = stats.entries,
        hits = stats.hits,
        misses = stats.misses,
        evictions = stats.evictions,
        expirations = stats.expirations,
        "Server shutdown complete"
    );
    Ok(())
}

/// Waits for a termination signal and cancels `shutdown`.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let (Ok(mut term), Ok(mut hup), Ok(mut quit)) = (
            signal(SignalKind::terminate()),
            signal(SignalKind::hangup()),
            signal(SignalKind::quit()),
        ) else {
            warn!("Failed to install unix signal handlers");
            return std::future::pending::<&str>().await;
        };

        tokio::select! {
            _ = term.recv() => "SIGTERM",
            _ = hup.recv() => "SIGHUP",
            _ = quit.recv() => "SIGQUIT",
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&str>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        name = terminate => {
            info!("Received {}, initiating shutdown...", name);
        }
    }

    shutdown.cancel();
}

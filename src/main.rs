use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use contactgate::config::GatewayConfig;
use contactgate::contact::ResendMailer;
use contactgate::http::{AppState, HttpServer};
use contactgate::ratelimit::{run_sweeper, RateLimiter, SystemClock};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "contactgate", version, about = "Rate-limited contact form relay")]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the HTTP listen address
    #[arg(long)]
    http_addr: Option<SocketAddr>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true);
    match args.log_format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }

    info!("Starting contactgate");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => GatewayConfig::from_file(path)?,
        None => GatewayConfig::from_env()?,
    };
    if let Some(addr) = args.http_addr {
        config.server.http_addr = addr;
    }
    info!(http_addr = %config.server.http_addr, "Configuration loaded");

    let rl = &config.rate_limiting;
    let limiter = Arc::new(RateLimiter::with_store(rl.policy(), rl.store(), SystemClock));
    info!(
        interval_ms = rl.interval_ms,
        max_requests = rl.max_requests,
        block_duration_ms = rl.block_duration_ms,
        max_entries = ?rl.max_entries,
        "Rate limiter initialized"
    );

    let sweeper = tokio::spawn(run_sweeper(Arc::clone(&limiter), rl.sweep_interval()));

    let mailer = Arc::new(ResendMailer::new(config.mail.clone())?);
    let state = AppState::new(limiter, mailer);

    HttpServer::new(config.server.http_addr, state)
        .serve_with_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("contactgate stopped");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

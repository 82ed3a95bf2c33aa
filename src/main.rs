//! SINABE API - Backend for the SINABE asset and inventory management platform
//!
//! Serves the inventory CRUD and audit log API and records an audit trail
//! for every tracked mutation.

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use sinabe_api::{api, config::LogFormat, db, middleware, services::AuthService, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }
    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        println!("SINABE API {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Load configuration first (before logging, so we know log format)
    let config = AppConfig::load().context("Failed to load configuration")?;

    // The guard must be kept alive for the duration of the program
    // to ensure log messages are flushed to files
    let _log_guard = init_logging(&config);

    info!("SINABE API starting up");

    info!("Initializing database connection");
    let db = db::init_pool(&config.database)
        .await
        .context("Failed to initialize database")?;

    AuthService::ensure_admin_user(&db, &config.auth)
        .await
        .context("Failed to bootstrap admin account")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState { config, db };
    let app = build_router(state);

    info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("SINABE API shut down");
    Ok(())
}

fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api::public_routes())
        .nest(
            "/api/v1",
            api::protected_routes().layer(axum::middleware::from_fn_with_state(
                state.clone(),
                middleware::auth_middleware,
            )),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(CompressionLayer::new())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

fn init_logging(config: &AppConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use sinabe_api::config::LogTarget;
    use tracing_subscriber::{prelude::*, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let log_config = &config.logging;

    match &log_config.target {
        LogTarget::Console => {
            let subscriber = tracing_subscriber::registry().with(env_filter);
            init_console_logging(subscriber, &log_config.format);
            None
        }
        LogTarget::File => {
            let (writer, guard) = create_file_writer(log_config);
            let subscriber = tracing_subscriber::registry().with(env_filter);
            init_file_logging(subscriber, &log_config.format, writer);
            Some(guard)
        }
        LogTarget::Both => {
            let (writer, guard) = create_file_writer(log_config);
            let subscriber = tracing_subscriber::registry().with(env_filter);
            init_both_logging(subscriber, &log_config.format, writer);
            Some(guard)
        }
    }
}

/// Create a file writer with optional daily rotation
fn create_file_writer(
    log_config: &sinabe_api::config::LoggingConfig,
) -> (
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
) {
    if let Err(e) = std::fs::create_dir_all(&log_config.log_dir) {
        eprintln!(
            "Warning: Failed to create log directory {:?}: {}",
            log_config.log_dir, e
        );
    }

    let file_appender = if log_config.daily_rotation {
        tracing_appender::rolling::daily(&log_config.log_dir, &log_config.log_prefix)
    } else {
        tracing_appender::rolling::never(&log_config.log_dir, &log_config.log_prefix)
    };

    tracing_appender::non_blocking(file_appender)
}

fn init_console_logging<S>(subscriber: S, format: &LogFormat)
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
    use tracing_subscriber::{fmt, prelude::*};

    match format {
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_target(true))
                .init();
        }
        LogFormat::Compact => {
            subscriber.with(fmt::layer().compact()).init();
        }
        LogFormat::Pretty => {
            subscriber.with(fmt::layer().pretty()).init();
        }
    }
}

fn init_file_logging<S>(
    subscriber: S,
    format: &LogFormat,
    writer: tracing_appender::non_blocking::NonBlocking,
) where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
    use tracing_subscriber::{fmt, prelude::*};

    match format {
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_target(true).with_writer(writer))
                .init();
        }
        _ => {
            subscriber
                .with(fmt::layer().compact().with_ansi(false).with_writer(writer))
                .init();
        }
    }
}

fn init_both_logging<S>(
    subscriber: S,
    format: &LogFormat,
    writer: tracing_appender::non_blocking::NonBlocking,
) where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
    use tracing_subscriber::{fmt, prelude::*};

    match format {
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_target(true))
                .with(fmt::layer().json().with_target(true).with_writer(writer))
                .init();
        }
        LogFormat::Compact => {
            subscriber
                .with(fmt::layer().compact())
                .with(fmt::layer().compact().with_ansi(false).with_writer(writer))
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(fmt::layer().pretty())
                .with(fmt::layer().compact().with_ansi(false).with_writer(writer))
                .init();
        }
    }
}

fn print_help() {
    println!("SINABE API {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("USAGE:");
    println!("    sinabe-api [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print this help message");
    println!("    -V, --version    Print version information");
    println!();
    println!("CONFIGURATION:");
    println!("    Reads config.yaml from the working directory or /etc/sinabe/,");
    println!("    overridable with SINABE_CONFIG and SINABE_* environment variables.");
}

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use archivist_core::{Invocation, JobEvent, JobProcessor};
use archivist_server::api::create_router;
use archivist_server::cli::{self, Cli, Command, RunArgs, ServeArgs};
use archivist_server::metrics::REGISTRY;
use archivist_server::state::AppState;

/// Selects JSON log lines when set to `json`.
const LOG_FORMAT_ENV: &str = "ARCHIVIST_LOG_FORMAT";

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => run_job(args).await,
        Command::Serve(args) => serve(args).await.map(|_| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("Fatal error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // stdout carries the job outcome, logs go to stderr
    let (plain, structured) = if json {
        (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
        )
    } else {
        (
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
            None,
        )
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(plain)
        .with(structured)
        .init();
}

async fn run_job(args: RunArgs) -> Result<ExitCode> {
    let invocation = args.invocation();
    let config = cli::load(args.config.as_deref(), &invocation)?;
    let processor =
        JobProcessor::from_config(&config).context("Failed to build job processor")?;

    let input = cli::read_event(args.event.as_deref()).await?;
    let event: JobEvent = serde_json::from_str(&input).context("Malformed job event")?;

    match processor.handle(event, &invocation).await {
        Ok(outcome) => {
            println!("{}", serde_json::to_string(&outcome)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            let report = serde_json::json!({
                "error": e.to_string(),
                "stage": e.stage(),
            });
            println!("{}", report);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let config = cli::load(args.config.as_deref(), &Invocation::long_lived())?;
    info!("Configuration loaded successfully");

    let processor = Arc::new(
        JobProcessor::from_config(&config).context("Failed to build job processor")?,
    );
    once_cell::sync::Lazy::force(&REGISTRY);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, processor));
    let app = create_router(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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

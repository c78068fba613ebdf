//! Command line interface.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::info;

use archivist_core::{load_config, load_config_from_env, validate_config, Config, Invocation};

/// Set by function hosts to the directory the deployment package lives in.
pub const LAMBDA_TASK_ROOT_ENV: &str = "LAMBDA_TASK_ROOT";

#[derive(Debug, Parser)]
#[command(name = "archivist", version, about = "Bundle stored objects into a zip archive")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a single job read from a file or stdin, then exit
    Run(RunArgs),
    /// Serve jobs over HTTP
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Configuration file. Defaults and environment only when absent
    #[arg(long, env = "ARCHIVIST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Job event JSON file. Read from stdin when absent
    #[arg(long)]
    pub event: Option<PathBuf>,

    /// Request identifier of the host invocation
    #[arg(long, env = "ARCHIVIST_INVOCATION_ID")]
    pub invocation_id: Option<String>,
}

impl RunArgs {
    pub fn invocation(&self) -> Invocation {
        match &self.invocation_id {
            Some(id) if !id.is_empty() => Invocation::ephemeral(id.clone()),
            _ => Invocation::long_lived(),
        }
    }
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Configuration file. Defaults and environment only when absent
    #[arg(long, env = "ARCHIVIST_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Loads and validates configuration for an invocation.
pub fn load(path: Option<&Path>, invocation: &Invocation) -> Result<Config> {
    let config = match path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => load_config_from_env().context("Failed to load config from environment")?,
    };

    let lambda_root = std::env::var_os(LAMBDA_TASK_ROOT_ENV).map(PathBuf::from);
    let config = apply_host_environment(config, invocation, lambda_root);

    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

/// Makes a zip binary bundled with the deployment package findable on
/// ephemeral hosts.
pub fn apply_host_environment(
    mut config: Config,
    invocation: &Invocation,
    lambda_root: Option<PathBuf>,
) -> Config {
    if let Some(root) = lambda_root.filter(|_| invocation.is_ephemeral()) {
        config.archiver = config.archiver.with_search_path(root);
    }
    config
}

/// Reads the job event from a file, or from stdin when no path is given.
pub async fn read_event(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read event from {:?}", path)),
        None => {
            let mut input = String::new();
            tokio::io::stdin()
                .read_to_string(&mut input)
                .await
                .context("Failed to read event from stdin")?;
            Ok(input)
        }
    }
}

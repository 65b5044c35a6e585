//! `learn`: work through LMS modules from the terminal.

use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use learn_core::model::{ModuleId, ResultId};
use services::{ClientConfig, LearnerSession};
use tracing_subscriber::EnvFilter;

mod commands;

const DEFAULT_LOG_FILTER: &str = "learn=info,services=info";

#[derive(Parser)]
#[command(name = "learn", version, about = "Study LMS modules and take their tests")]
struct Cli {
    /// Base URL of the LMS API [default: $LMS_API_URL]
    #[arg(long)]
    api_url: Option<String>,

    /// Bearer token issued by the authentication service [default: $LMS_ACCESS_TOKEN]
    #[arg(long)]
    token: Option<String>,

    /// Request timeout in seconds [default: $LMS_TIMEOUT_SECS]
    #[arg(long)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the dashboard: every module with status, progress and grade
    Modules,

    /// Show overall progress, or one module's progress
    Progress {
        /// Module id, e.g. Module_01
        module: Option<ModuleId>,
    },

    /// Read a module's lessons and take its test
    Study {
        /// Module id, e.g. Module_01
        module: ModuleId,
    },

    /// Show a graded attempt
    Result {
        /// Result id returned when the test was graded
        result_id: ResultId,
    },
}

impl Cli {
    /// Environment first, then flags.
    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &self.api_url {
            config.base_url = url.clone();
        }
        if let Some(token) = self.token.as_deref().filter(|t| !t.trim().is_empty()) {
            config = config.with_access_token(token);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.client_config();
    tracing::debug!(base_url = %config.base_url, "connecting");
    let session = LearnerSession::http(config).context("cannot create LMS client")?;

    match cli.command {
        Commands::Modules => commands::modules::execute(session).await,
        Commands::Progress { module } => commands::progress::execute(session, module).await,
        Commands::Study { module } => commands::study::execute(session, module).await,
        Commands::Result { result_id } => commands::result::execute(session, result_id).await,
    }
}

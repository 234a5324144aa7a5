//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use searchbridge_core::pipeline::{ProgressReporter, SyncConfig, SyncResult};
use searchbridge_publish::HttpIndexClient;
use searchbridge_shared::{AppConfig, init_config, load_config, validate_api_token};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SearchBridge — make local markdown documentation searchable.
#[derive(Parser)]
#[command(
    name = "searchbridge",
    version,
    about = "Publish a markdown content tree into a remote search index connection.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Extract, transform, and publish every document to the remote index.
    Sync {
        /// Content root directory (defaults to the configured one).
        #[arg(short, long)]
        root: Option<String>,
    },

    /// Extract and transform only; print the items that would be published.
    Plan {
        /// Content root directory (defaults to the configured one).
        #[arg(short, long)]
        root: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "searchbridge=info",
        1 => "searchbridge=debug",
        _ => "searchbridge=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Sync { root } => cmd_sync(root.as_deref()).await,
        Command::Plan { root } => cmd_plan(root.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn resolve_sync_config(root: Option<&str>) -> Result<(AppConfig, SyncConfig)> {
    let config = load_config()?;

    let mut sync_config = SyncConfig::from_app_config(&config)?;
    if let Some(root) = root {
        sync_config.content_root = PathBuf::from(root);
    }

    Ok((config, sync_config))
}

async fn cmd_sync(root: Option<&str>) -> Result<()> {
    let (config, sync_config) = resolve_sync_config(root)?;

    // Validate the API token before doing anything
    validate_api_token(&config)?;
    let client = HttpIndexClient::new(&config.index)?;

    info!(
        root = %sync_config.content_root.display(),
        connection = %config.index.connection_id,
        "starting sync"
    );

    let reporter = CliProgress::new();
    let result =
        searchbridge_core::pipeline::sync(&sync_config, &client, &reporter).await?;

    if let Some(failed) = &result.failed {
        println!();
        println!("  Sync aborted at '{}': {}", failed.id, failed.message);
        if let Some(inner) = &failed.inner {
            println!("  {inner}");
        }
        println!("  Published: {} of {}", result.published, result.documents);
        println!("  Skipped:   {}", result.skipped);
        println!();
        return Err(eyre!("sync aborted after first failed item"));
    }

    println!();
    println!("  Sync complete!");
    println!("  Connection: {}", config.index.connection_id);
    println!("  Documents:  {}", result.documents);
    println!("  Published:  {}", result.published);
    println!("  Time:       {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_plan(root: Option<&str>) -> Result<()> {
    let (_config, sync_config) = resolve_sync_config(root)?;

    let items = searchbridge_core::pipeline::assemble_items(&sync_config)?;

    info!(count = items.len(), "assembled items (dry run)");
    println!("{}", serde_json::to_string_pretty(&items)?);

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn item_started(&self, id: &str, current: usize, total: usize) {
        self.spinner.set_message(format!(
            "Publishing [{current}/{total}] {id}"
        ));
    }

    fn item_published(&self, _id: &str) {}

    fn item_failed(&self, _id: &str, _message: &str) {}

    fn done(&self, _result: &SyncResult) {
        self.spinner.finish_and_clear();
    }
}

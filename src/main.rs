//! Claim Desk CLI
//!
//! Command-line front end for the claims dashboard:
//! - Show headline claim counts
//! - List claims, newest first
//! - Show one claim's detail
//! - File a new claim with attachments
//! - Generate a default config file

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use claimdesk::claims::{Attachment, ClaimId, ClaimStore, ClaimType, HttpClaimTransport};
use claimdesk::config::{generate_default_config, Config, LoggingConfig};
use claimdesk::views::{ClaimDetailView, ClaimFormView, ClaimListView, DashboardSummary};

#[derive(Parser)]
#[command(name = "claimdesk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Insurance claims dashboard for the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations, then environment)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Claims API base URL (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show claim counts by status
    Dashboard,

    /// List all claims, newest first
    List,

    /// Show the detail of one claim
    Show {
        /// Claim id
        id: ClaimId,
    },

    /// File a new claim
    File {
        /// Name of the filing agent
        #[arg(long)]
        agent: String,
        /// Claim type (Auto, Home, Commercial)
        #[arg(long = "type")]
        claim_type: ClaimType,
        /// Files to attach (PDF, PNG, JPG, JPEG, GIF; max 10MB each)
        #[arg(short, long = "attach")]
        attachments: Vec<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, config_errors) = match &cli.config {
        Some(path) => (Config::load_with_env(path)?, Vec::new()),
        None => Config::discover(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    init_logging(&config.logging);
    for e in &config_errors {
        tracing::warn!("{}; using defaults for that file", e);
    }
    tracing::debug!(base_url = %config.api.base_url, "Claim Desk v{}", env!("CARGO_PKG_VERSION"));

    let transport = HttpClaimTransport::new(config.transport())?;
    let store = ClaimStore::new(Arc::new(transport), config.cache.stale_after());
    let ansi = std::io::stdout().is_terminal();

    match cli.command {
        Commands::Dashboard => {
            let summary = match DashboardSummary::load(&store).await {
                Ok(summary) => summary,
                Err(e) => fail(&e.user_message()),
            };

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                OutputFormat::Table => summary.render(&mut std::io::stdout())?,
            }
        }

        Commands::List => {
            let mut list = ClaimListView::new();
            print_list(&mut list, &store, cli.format, ansi).await?;
        }

        Commands::Show { id } => {
            // the list row supplies agent and type when the detail lacks them
            let mut list = ClaimListView::new();
            let summary = match list.load(&store).await {
                Ok(()) => list.claims().iter().find(|c| c.claim_id == id).cloned(),
                Err(_) => None,
            };

            let detail = match ClaimDetailView::open(&store, Some(id), summary.as_ref()).await {
                Ok(detail) => detail,
                Err(e) => fail(&e.user_message()),
            };

            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(detail.records())?);
                }
                OutputFormat::Table => detail.render(&mut std::io::stdout(), ansi)?,
            }
        }

        Commands::File {
            agent,
            claim_type,
            attachments,
        } => {
            let mut batch = Vec::with_capacity(attachments.len());
            for path in &attachments {
                let file = Attachment::from_path(path)
                    .with_context(|| format!("Cannot read attachment {:?}", path))?;
                batch.push(file);
            }

            let mut form = ClaimFormView::new();
            form.set_agent_name(agent);
            form.set_claim_type(Some(claim_type));

            form.add_files(store.policy(), batch);
            if let Some(message) = form.error() {
                eprintln!("{}", message);
            }
            form.dismiss_error();

            let submitted = match form.submit(&store).await {
                Ok(submitted) => submitted,
                Err(_) => fail(form.error().unwrap_or("Claim submission failed")),
            };
            tracing::debug!(route = ?submitted.route, "Claim filed");

            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&submitted.created)?);
                }
                OutputFormat::Table => {
                    match submitted.created.claim_id() {
                        Some(id) => println!("Filed claim #{}", id),
                        None => println!("Claim filed"),
                    }
                    println!();

                    let mut list = ClaimListView::new();
                    print_list(&mut list, &store, cli.format, ansi).await?;
                }
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

async fn print_list(
    list: &mut ClaimListView,
    store: &ClaimStore,
    format: OutputFormat,
    ansi: bool,
) -> anyhow::Result<()> {
    if list.load(store).await.is_err() {
        eprint!("{}", list.render_to_string(false));
        std::process::exit(1);
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(list.claims())?),
        OutputFormat::Table => list.render(&mut std::io::stdout(), ansi)?,
    }
    Ok(())
}

fn fail(message: &str) -> ! {
    eprintln!("Error! {}", message);
    std::process::exit(1);
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("claimdesk={}", config.level)));

    // stdout carries command output; logs go to stderr
    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::warn;

mod aggregate;
mod config;
mod mailer;
mod models;
mod prompts;
mod report;
mod storage;

use config::{Config, StorageConfig};
use mailer::{Mailer, OutboundEmail};
use models::WordCountLedger;
use storage::ObjectStore;

#[derive(Parser)]
#[command(name = "wordform-report")]
#[command(about = "Scheduled email report of new word forms", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the ledger and prompt log, then send the report email
    Run {
        #[arg(long, default_value = "downloads")]
        downloads_dir: PathBuf,
    },
    /// Build the report body without sending anything
    Preview {
        #[arg(long, default_value = "downloads")]
        downloads_dir: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print aggregate totals from the ledger
    Totals {
        #[arg(long, default_value = "downloads")]
        downloads_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { downloads_dir } => run(&downloads_dir).await,
        Commands::Preview { downloads_dir, out } => preview(&downloads_dir, out.as_deref()).await,
        Commands::Totals { downloads_dir } => totals(&downloads_dir).await,
    }
}

async fn run(downloads_dir: &Path) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let store = ObjectStore::new(
        &config.storage.bucket_name,
        config.storage.access_token.clone(),
    )?;

    let now = Utc::now().naive_utc();
    let ledger = fetch_ledger(&store, downloads_dir).await?;
    let window_totals = aggregate::aggregate(&ledger.files, now)?;

    let prompt_log = store
        .download_to_dir(storage::PROMPTS_OBJECT, downloads_dir)
        .await?;
    let current_prompts = prompts::extract_current_section(&prompt_log);

    let message = report::compose(&window_totals, &current_prompts, now);
    let mailer = Mailer::new(&config.mail.api_key)?;
    let outcome = mailer
        .send(&OutboundEmail {
            from: config.mail.from_email.clone(),
            to: config.mail.to_email.clone(),
            subject: message.subject,
            html_body: message.html_body,
        })
        .await;

    // A failed delivery is logged but does not fail the run; the scheduler
    // still sees a completed invocation.
    if outcome.success {
        println!("Report sent to {}.", config.mail.to_email);
    } else {
        warn!(
            status = ?outcome.status_code,
            error = ?outcome.error,
            "report delivery failed"
        );
        println!("Report delivery failed; see logs.");
    }

    Ok(())
}

async fn preview(downloads_dir: &Path, out: Option<&Path>) -> anyhow::Result<()> {
    let config = StorageConfig::from_env()?;
    let store = ObjectStore::new(&config.bucket_name, config.access_token.clone())?;

    let now = Utc::now().naive_utc();
    let ledger = fetch_ledger(&store, downloads_dir).await?;
    let window_totals = aggregate::aggregate(&ledger.files, now)?;

    let prompt_log = store
        .download_to_dir(storage::PROMPTS_OBJECT, downloads_dir)
        .await?;
    let current_prompts = prompts::extract_current_section(&prompt_log);
    let body = report::compose_body(&window_totals, &current_prompts, now);

    match out {
        Some(path) => {
            std::fs::write(path, &body)?;
            println!("Report written to {}.", path.display());
        }
        None => println!("{body}"),
    }

    Ok(())
}

async fn totals(downloads_dir: &Path) -> anyhow::Result<()> {
    let config = StorageConfig::from_env()?;
    let store = ObjectStore::new(&config.bucket_name, config.access_token.clone())?;

    let ledger = fetch_ledger(&store, downloads_dir).await?;
    let window_totals = aggregate::aggregate(&ledger.files, Utc::now().naive_utc())?;

    println!("Total: {}", window_totals.total);
    println!("Total last 7 days: {}", window_totals.total_7d);
    println!("Total last 24 hours: {}", window_totals.total_24h);

    Ok(())
}

async fn fetch_ledger(store: &ObjectStore, downloads_dir: &Path) -> anyhow::Result<WordCountLedger> {
    let raw = store
        .download_to_dir(storage::LEDGER_OBJECT, downloads_dir)
        .await?;
    serde_json::from_str(&raw).context("unable to parse the word count ledger")
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

//! Dropwatch - Shared-Drive Upload Watcher
//!
//! Main entry point for the dropwatch CLI.

use clap::Parser;
use dropwatch::config::WatchConfig;
use dropwatch::lister::DriveLister;
use dropwatch::notify::SlackWebhook;
use dropwatch::scan::{ScanDaemon, Scanner};
use std::path::PathBuf;
use std::process;

/// Environment variable holding the webhook delivery credential
const SLACK_TOKEN_VAR: &str = "DROPWATCH_SLACK_TOKEN";

/// Environment variable holding the listing credential
const DRIVE_TOKEN_VAR: &str = "DROPWATCH_DRIVE_TOKEN";

/// Dropwatch - report new uploads in shared-drive folders to Slack
#[derive(Parser, Debug)]
#[command(name = "dropwatch")]
#[command(version, about, long_about = None)]
struct Cli {
    /// ID of the shared drive to scan
    #[arg(long = "drive-id")]
    drive_id: Option<String>,

    /// ID of the folder whose children are watched
    #[arg(long)]
    root: Option<String>,

    /// Path to the database JSON file
    #[arg(long)]
    db: Option<PathBuf>,

    /// Path to a YAML config file (exclusions, policy, format)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Don't send webhook messages (watermarks still advance)
    #[arg(long = "no-notify")]
    no_notify: bool,

    /// Keep running, scanning on a fixed interval
    #[arg(long)]
    daemon: bool,

    /// Seconds between passes in daemon mode
    #[arg(long)]
    interval: Option<u64>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = dropwatch::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> dropwatch::Result<()> {
    let mut config = match cli.config {
        Some(ref path) => WatchConfig::load(path)?,
        None => {
            let default_path = WatchConfig::default_path();
            if default_path.exists() {
                WatchConfig::load(&default_path)?
            } else {
                WatchConfig::default()
            }
        }
    };

    // CLI flags override the file
    if let Some(drive_id) = cli.drive_id {
        config.drive_id = drive_id;
    }
    if let Some(root) = cli.root {
        config.root_folder = root;
    }
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if cli.no_notify {
        config.dry_run = true;
    }
    if let Some(secs) = cli.interval {
        config.poll_interval_secs = secs;
    }

    config.validate()?;

    // Fail fast on missing credentials, before any pass runs
    let slack_token = match std::env::var(SLACK_TOKEN_VAR) {
        Ok(token) => token,
        Err(_) if config.dry_run => String::new(),
        Err(_) => {
            return Err(dropwatch::DropwatchError::Config(format!(
                "missing env var '{}'",
                SLACK_TOKEN_VAR
            )));
        }
    };
    let drive_token = std::env::var(DRIVE_TOKEN_VAR).map_err(|_| {
        dropwatch::DropwatchError::Config(format!("missing env var '{}'", DRIVE_TOKEN_VAR))
    })?;

    let client = drive_files::DriveClient::new(drive_token)?;
    let lister = DriveLister::new(client, config.page_size);
    let notifier = SlackWebhook::new(&config.webhook_base, &slack_token, config.dry_run)?;

    let daemon = cli.daemon;
    let poll_interval = config.poll_interval();
    let scanner = Scanner::new(config, lister, notifier);

    if daemon {
        ScanDaemon::new(scanner, poll_interval).run().await
    } else {
        let summary = scanner.run_once().await?;
        tracing::info!(
            scanned = summary.folders_scanned,
            notified = summary.folders_with_new_items,
            items = summary.items_reported,
            failed = summary.folders_failed,
            "Update completed"
        );
        Ok(())
    }
}

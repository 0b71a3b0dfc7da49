//! Scan daemon
//!
//! Repeats the scan pass on a fixed interval. Runs as a tokio event loop
//! with graceful shutdown on SIGTERM/SIGINT. Store and configuration
//! errors terminate the daemon; anything a later pass can retry is logged
//! and the loop continues.

use super::metrics;
use super::runner::Scanner;
use crate::lister::FolderLister;
use crate::notify::Notifier;
use crate::{DropwatchError, Result};
use std::time::Duration;
use tracing::{error, info};

/// Daemon wrapper around a scanner
pub struct ScanDaemon<L, N> {
    scanner: Scanner<L, N>,
    poll_interval: Duration,
}

impl<L: FolderLister, N: Notifier> ScanDaemon<L, N> {
    /// Create a daemon polling at `poll_interval`
    pub fn new(scanner: Scanner<L, N>, poll_interval: Duration) -> Self {
        Self {
            scanner,
            poll_interval,
        }
    }

    /// Run the daemon event loop until shutdown or an unrecoverable error
    pub async fn run(&self) -> Result<()> {
        info!(interval_secs = self.poll_interval.as_secs(), "Daemon started");
        metrics::set_health_status(true);

        let mut interval = tokio::time::interval(self.poll_interval);

        // Use platform-specific event loop
        #[cfg(unix)]
        let result = self.run_with_signals(&mut interval).await;

        #[cfg(not(unix))]
        let result = self.run_without_signals(&mut interval).await;

        metrics::set_health_status(false);
        info!("Daemon stopped");
        result
    }

    /// Event loop with Unix signal handling (SIGTERM/SIGINT)
    #[cfg(unix)]
    async fn run_with_signals(&self, interval: &mut tokio::time::Interval) -> Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate()).map_err(|e| {
            DropwatchError::Other(format!("Failed to set up SIGTERM handler: {}", e))
        })?;
        let mut sigint = signal(SignalKind::interrupt()).map_err(|e| {
            DropwatchError::Other(format!("Failed to set up SIGINT handler: {}", e))
        })?;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.tick().await {
                        return Err(e);
                    }
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down");
                    return Ok(());
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down");
                    return Ok(());
                }
            }
        }
    }

    /// Event loop without signal handling (non-Unix platforms)
    #[cfg(not(unix))]
    async fn run_without_signals(&self, interval: &mut tokio::time::Interval) -> Result<()> {
        loop {
            interval.tick().await;
            self.tick().await?;
        }
    }

    /// Run one pass, deciding whether its error ends the daemon
    ///
    /// Store integrity and configuration errors are unrecoverable; a
    /// failed delivery or discovery is re-attempted naturally on the next
    /// tick.
    async fn tick(&self) -> Result<()> {
        match self.scanner.run_once().await {
            Ok(summary) => {
                if summary.has_failures() {
                    error!(failed = summary.folders_failed, "Pass completed with failures");
                }
                Ok(())
            }
            Err(e @ (DropwatchError::Config(_)
            | DropwatchError::Decode(_)
            | DropwatchError::Io(_))) => Err(e),
            Err(e) => {
                error!(error = %e, "Pass failed, retrying on next tick");
                Ok(())
            }
        }
    }
}

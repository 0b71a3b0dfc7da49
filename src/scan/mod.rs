//! Scan orchestration
//!
//! Drives complete passes over all known folders and, in daemon mode,
//! repeats them on a fixed interval.
//!
//! # Pass Phases
//!
//! 1. **Load**: read the watermark store (missing file is an empty store)
//! 2. **Discover**: list the root folder to find the per-owner folders
//! 3. **Scan**: per folder, list children, detect new items, build and
//!    deliver the notification, advance the watermark in memory
//! 4. **Save**: persist the full mapping back to disk
//!
//! Failures are isolated at the granularity where they occur: a bad item
//! timestamp drops the item, a failed folder listing skips the folder,
//! and only store or configuration problems abort the pass outright.
//! Delivery failures follow the configured [`DeliveryPolicy`].
//!
//! # Example
//!
//! ```ignore
//! use dropwatch::config::WatchConfig;
//! use dropwatch::lister::DriveLister;
//! use dropwatch::notify::SlackWebhook;
//! use dropwatch::scan::{ScanDaemon, Scanner};
//!
//! #[tokio::main]
//! async fn main() -> dropwatch::Result<()> {
//!     let config = WatchConfig::new("drive-id", "root-folder-id");
//!     let lister = DriveLister::new(drive_files::DriveClient::new("token")?, 100);
//!     let notifier = SlackWebhook::new(&config.webhook_base, "hook-token", false)?;
//!
//!     let scanner = Scanner::new(config, lister, notifier);
//!     let summary = scanner.run_once().await?;
//!     println!("reported {} items", summary.items_reported);
//!     Ok(())
//! }
//! ```
//!
//! [`DeliveryPolicy`]: crate::config::DeliveryPolicy

mod daemon;
pub mod metrics;
mod runner;

pub use daemon::ScanDaemon;
pub use runner::{PassSummary, Scanner};

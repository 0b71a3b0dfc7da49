//! Dropwatch - Shared-Drive Upload Watcher
//!
//! Dropwatch periodically scans the per-owner folders of a shared drive,
//! detects files uploaded since the last scan, and posts one Slack
//! webhook notification per folder summarizing the newly found files. A
//! persistent per-folder watermark guarantees already-reported files are
//! never reported again, across restarts and partial failures.
//!
//! # Architecture
//!
//! - **store**: Persistent watermark mapping (folder id → last scan)
//! - **config**: Explicit run configuration, exclusion rules, policies
//! - **lister**: Folder listing seam over the `drive-files` client
//! - **detect**: Pure new-since-watermark change detection
//! - **notify**: Notification payload builder + Slack webhook transport
//! - **scan**: Pass orchestration, daemon loop, metrics

// Core modules
pub mod config;
pub mod detect;
pub mod error;
pub mod store;

// Collaborator seams and orchestration
pub mod lister;
pub mod logging;
pub mod notify;
pub mod scan;

// Re-exports
pub use error::{DropwatchError, Result};

//! Watch configuration
//!
//! The explicit configuration struct passed into the scanner; no
//! process-wide mutable globals. Values come from an optional YAML file
//! with serde defaults, overridden by CLI flags in `main`.

use crate::notify::MessageFormat;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What to do when a folder's notification cannot be delivered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// Abort the pass without saving the store; the next pass re-detects
    /// the same items
    #[default]
    FailFast,

    /// Log, skip the folder (its watermark untouched) and continue with
    /// the rest of the pass
    BestEffort,
}

/// Static name-based exclusion rules
///
/// An item matching any rule is never eligible for notification,
/// regardless of how recent it is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionRules {
    /// Exact name marking a file as already reconciled out-of-band
    #[serde(default = "default_settled_name")]
    pub settled_name: String,

    /// Prefix marking a name as ignored
    #[serde(default = "default_ignore_prefix")]
    pub ignore_prefix: String,

    /// Substring marking a name as documentation
    #[serde(default = "default_doc_marker")]
    pub doc_marker: String,
}

fn default_settled_name() -> String {
    "Betalt".to_string()
}

fn default_ignore_prefix() -> String {
    "xxx".to_string()
}

fn default_doc_marker() -> String {
    "README".to_string()
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self {
            settled_name: default_settled_name(),
            ignore_prefix: default_ignore_prefix(),
            doc_marker: default_doc_marker(),
        }
    }
}

impl ExclusionRules {
    /// True if a file with this name must never be reported
    pub fn excludes_item(&self, name: &str) -> bool {
        name == self.settled_name || self.excludes_folder(name)
    }

    /// True if a folder with this name is skipped during discovery
    ///
    /// The settled-name sentinel only applies to files, not folders.
    pub fn excludes_folder(&self, name: &str) -> bool {
        (!self.ignore_prefix.is_empty() && name.starts_with(&self.ignore_prefix))
            || (!self.doc_marker.is_empty() && name.contains(&self.doc_marker))
    }
}

/// Default poll interval for daemon mode (5 minutes)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);

fn default_db_path() -> PathBuf {
    PathBuf::from("db.json")
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

fn default_page_size() -> u32 {
    100
}

fn default_webhook_base() -> String {
    "https://hooks.slack.com/services/".to_string()
}

fn default_folder_link_base() -> String {
    "https://drive.google.com/drive/u/0/folders/".to_string()
}

/// Complete configuration for a watch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Shared drive (container) to scope listing queries to
    #[serde(default)]
    pub drive_id: String,

    /// Folder whose children are the per-owner folders to scan
    #[serde(default)]
    pub root_folder: String,

    /// Path to the watermark database file
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Suppress delivery while still advancing watermarks
    #[serde(default)]
    pub dry_run: bool,

    /// Seconds between passes in daemon mode
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Delivery failure policy for a pass
    #[serde(default)]
    pub delivery_policy: DeliveryPolicy,

    /// Which notification payload shape to emit
    #[serde(default)]
    pub format: MessageFormat,

    /// Name-based exclusion rules
    #[serde(default)]
    pub exclusions: ExclusionRules,

    /// Listing page size (pagination is followed internally)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Webhook endpoint base; the delivery credential is appended
    #[serde(default = "default_webhook_base")]
    pub webhook_base: String,

    /// Base URL for the deep link back to a folder
    #[serde(default = "default_folder_link_base")]
    pub folder_link_base: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            drive_id: String::new(),
            root_folder: String::new(),
            db_path: default_db_path(),
            dry_run: false,
            poll_interval_secs: default_poll_interval_secs(),
            delivery_policy: DeliveryPolicy::default(),
            format: MessageFormat::default(),
            exclusions: ExclusionRules::default(),
            page_size: default_page_size(),
            webhook_base: default_webhook_base(),
            folder_link_base: default_folder_link_base(),
        }
    }
}

impl WatchConfig {
    /// Create a config for the given drive and root folder
    pub fn new(drive_id: impl Into<String>, root_folder: impl Into<String>) -> Self {
        Self {
            drive_id: drive_id.into(),
            root_folder: root_folder.into(),
            ..Default::default()
        }
    }

    /// Set the database path
    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    /// Suppress delivery
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the delivery failure policy
    pub fn with_delivery_policy(mut self, policy: DeliveryPolicy) -> Self {
        self.delivery_policy = policy;
        self
    }

    /// Set the notification payload shape
    pub fn with_format(mut self, format: MessageFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the daemon poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_secs = interval.as_secs();
        self
    }

    /// Daemon poll interval as a `Duration`
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Default config file path (~/.config/dropwatch/config.yaml)
    pub fn default_path() -> PathBuf {
        // Always use ~/.config for consistency across platforms
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("dropwatch");
        path.push("config.yaml");
        path
    }

    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            crate::DropwatchError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Validate that the identifiers needed for a pass are present
    pub fn validate(&self) -> Result<()> {
        if self.drive_id.is_empty() {
            return Err(crate::DropwatchError::Config(
                "missing drive id".to_string(),
            ));
        }
        if self.root_folder.is_empty() {
            return Err(crate::DropwatchError::Config(
                "missing root folder id".to_string(),
            ));
        }
        Ok(())
    }
}

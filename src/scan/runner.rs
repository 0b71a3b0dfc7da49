//! Run orchestration
//!
//! One pass: load the store, discover folders under the root, then per
//! folder list, detect, notify and advance the watermark in memory;
//! finally save the store. One folder's listing failure never blocks the
//! others or touches their watermarks.

use super::metrics;
use crate::config::{DeliveryPolicy, WatchConfig};
use crate::detect;
use crate::lister::FolderLister;
use crate::notify::{self, Notifier};
use crate::store::{self, FolderId, FolderRecord};
use crate::Result;
use chrono::Utc;
use tracing::{debug, info, warn};

/// What one pass over all folders did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassSummary {
    pub folders_scanned: usize,
    pub folders_with_new_items: usize,
    pub items_reported: usize,
    pub folders_failed: usize,
}

impl PassSummary {
    /// True if any folder was skipped due to a failure
    pub fn has_failures(&self) -> bool {
        self.folders_failed > 0
    }
}

/// A folder discovered under the root
#[derive(Debug, Clone)]
struct DiscoveredFolder {
    id: FolderId,
    owner: String,
}

/// Drives one full pass over all known folders
pub struct Scanner<L, N> {
    config: WatchConfig,
    lister: L,
    notifier: N,
}

impl<L: FolderLister, N: Notifier> Scanner<L, N> {
    /// Create a scanner from its collaborators
    pub fn new(config: WatchConfig, lister: L, notifier: N) -> Self {
        Self {
            config,
            lister,
            notifier,
        }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// Execute one pass: LOAD_STORE, then per folder LIST, DETECT, BUILD,
    /// DELIVER, ADVANCE, and finally SAVE_STORE
    ///
    /// The watermark is advanced to local "now" at the time the folder is
    /// processed, not to the newest item timestamp seen; this tolerates
    /// clock skew against the storage provider at the cost of a narrow
    /// window between the listing call and the advance.
    ///
    /// Under `DeliveryPolicy::FailFast` a delivery failure aborts the
    /// pass before the store is saved, so no watermark advance from this
    /// pass persists and the next pass re-detects the same items.
    pub async fn run_once(&self) -> Result<PassSummary> {
        let start = std::time::Instant::now();

        let result = self.run_pass().await;

        let status = if result.is_ok() { "success" } else { "error" };
        let scanned = result
            .as_ref()
            .map(|s| s.folders_scanned)
            .unwrap_or_default();
        metrics::record_pass(status, start.elapsed().as_secs_f64(), scanned);

        result
    }

    async fn run_pass(&self) -> Result<PassSummary> {
        let mut db = store::load(&self.config.db_path)?;
        debug!(folders = db.len(), "Database loaded");

        let folders = self.discover_folders().await?;
        info!(folders = folders.len(), "Folder discovery complete");

        let mut summary = PassSummary::default();

        for folder in folders {
            summary.folders_scanned += 1;

            let record = db
                .entry(folder.id.clone())
                .or_insert_with(|| FolderRecord::new(folder.id.clone(), folder.owner.clone()));

            debug!(folder = %record.id, owner = %record.owner, "Handling folder");

            let listing = match self.lister.list(&self.config.drive_id, &record.id).await {
                Ok(listing) => listing,
                Err(e) => {
                    warn!(
                        folder = %record.id,
                        owner = %record.owner,
                        error = %e,
                        "Failed to list folder, skipping this pass"
                    );
                    metrics::record_list_failure(record.id.as_str());
                    summary.folders_failed += 1;
                    continue;
                }
            };

            if listing.is_empty() {
                continue;
            }

            let items = detect::new_items(record, &listing, &self.config.exclusions);
            if items.is_empty() {
                debug!(owner = %record.owner, "No new files");
                continue;
            }
            info!(owner = %record.owner, count = items.len(), "Found files to report");

            let message = notify::build(
                self.config.format,
                &record.owner,
                &record.id,
                &items,
                &self.config.folder_link_base,
            );

            if let Err(e) = self.notifier.deliver(&message).await {
                metrics::record_delivery_failure();
                match self.config.delivery_policy {
                    DeliveryPolicy::FailFast => return Err(e),
                    DeliveryPolicy::BestEffort => {
                        warn!(
                            owner = %record.owner,
                            error = %e,
                            "Delivery failed, folder watermark untouched"
                        );
                        summary.folders_failed += 1;
                        continue;
                    }
                }
            }

            record.watermark = Some(Utc::now());
            summary.folders_with_new_items += 1;
            summary.items_reported += items.len();
            metrics::record_items_reported(items.len());
        }

        store::save(&self.config.db_path, &db)?;

        info!(
            scanned = summary.folders_scanned,
            notified = summary.folders_with_new_items,
            items = summary.items_reported,
            failed = summary.folders_failed,
            "Pass complete"
        );

        Ok(summary)
    }

    /// List the root folder's children and keep the real per-owner
    /// folders
    ///
    /// A failure here fails the pass: without the folder set there is
    /// nothing to isolate.
    async fn discover_folders(&self) -> Result<Vec<DiscoveredFolder>> {
        let root = FolderId::new(self.config.root_folder.clone());
        let entries = self.lister.list(&self.config.drive_id, &root).await?;

        let folders = entries
            .into_iter()
            .filter(|f| !self.config.exclusions.excludes_folder(&f.name))
            .map(|f| DiscoveredFolder {
                id: FolderId::new(f.id),
                owner: f.name,
            })
            .collect::<Vec<_>>();

        Ok(folders)
    }
}

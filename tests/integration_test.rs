//! Integration tests for dropwatch
//!
//! These tests drive full passes through the scanner with mock
//! collaborators and a tempdir-backed store.

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use dropwatch::config::{DeliveryPolicy, WatchConfig};
use dropwatch::lister::{FolderLister, RemoteFile};
use dropwatch::notify::{Message, Notifier, SlackWebhook};
use dropwatch::scan::Scanner;
use dropwatch::store::{self, FolderId};
use dropwatch::{DropwatchError, Result};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const DRIVE_ID: &str = "0ATestDrive";
const ROOT_ID: &str = "1Root";

fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn remote(id: &str, name: &str, created: chrono::DateTime<Utc>) -> RemoteFile {
    RemoteFile {
        id: id.to_string(),
        name: name.to_string(),
        created_time: created.to_rfc3339(),
    }
}

/// Lister serving canned listings; the root folder returns the set of
/// per-owner folders
struct MockLister {
    root: FolderId,
    folders: Vec<RemoteFile>,
    listings: HashMap<FolderId, Vec<RemoteFile>>,
    failing: HashSet<FolderId>,
}

impl MockLister {
    fn new() -> Self {
        Self {
            root: FolderId::new(ROOT_ID),
            folders: Vec::new(),
            listings: HashMap::new(),
            failing: HashSet::new(),
        }
    }

    fn with_folder(mut self, id: &str, owner: &str, files: Vec<RemoteFile>) -> Self {
        self.folders.push(remote(id, owner, t0()));
        self.listings.insert(FolderId::new(id), files);
        self
    }

    fn with_failing_folder(mut self, id: &str, owner: &str) -> Self {
        self.folders.push(remote(id, owner, t0()));
        self.failing.insert(FolderId::new(id));
        self
    }
}

#[async_trait]
impl FolderLister for MockLister {
    async fn list(&self, _drive_id: &str, folder_id: &FolderId) -> Result<Vec<RemoteFile>> {
        if *folder_id == self.root {
            return Ok(self.folders.clone());
        }
        if self.failing.contains(folder_id) {
            return Err(DropwatchError::List("transport failure".to_string()));
        }
        Ok(self.listings.get(folder_id).cloned().unwrap_or_default())
    }
}

/// Notifier recording what it delivered; optionally fails the first N
/// deliveries
struct RecordingNotifier {
    delivered: Arc<Mutex<Vec<Message>>>,
    fail_next: AtomicUsize,
}

impl RecordingNotifier {
    fn new() -> (Self, Arc<Mutex<Vec<Message>>>) {
        let delivered = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                delivered: delivered.clone(),
                fail_next: AtomicUsize::new(0),
            },
            delivered,
        )
    }

    fn failing_first(n: usize) -> (Self, Arc<Mutex<Vec<Message>>>) {
        let (notifier, delivered) = Self::new();
        notifier.fail_next.store(n, Ordering::SeqCst);
        (notifier, delivered)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, message: &Message) -> Result<()> {
        if self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(DropwatchError::Delivery {
                status: 500,
                reason: "server_error".to_string(),
            });
        }
        self.delivered.lock().unwrap().push(message.clone());
        Ok(())
    }
}

fn test_config(db_path: &Path) -> WatchConfig {
    WatchConfig::new(DRIVE_ID, ROOT_ID).with_db_path(db_path)
}

mod pass_tests {
    use super::*;

    #[tokio::test]
    async fn test_pass_reports_new_items_and_advances_watermark() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("db.json");

        let lister = MockLister::new().with_folder(
            "fA",
            "Kari",
            vec![
                remote("r1", "Receipt1", t0() + Duration::hours(1)),
                remote("r2", "Receipt2", t0() + Duration::hours(2)),
            ],
        );
        let (notifier, delivered) = RecordingNotifier::new();

        let scanner = Scanner::new(test_config(&db_path), lister, notifier);
        let summary = scanner.run_once().await.unwrap();

        assert_eq!(summary.folders_scanned, 1);
        assert_eq!(summary.folders_with_new_items, 1);
        assert_eq!(summary.items_reported, 2);
        assert_eq!(summary.folders_failed, 0);

        let messages = delivered.lock().unwrap();
        assert_eq!(messages.len(), 1);
        let json = serde_json::to_value(&messages[0]).unwrap();
        let text = json["blocks"][0]["text"]["text"].as_str().unwrap();
        assert!(text.contains("Kari har lastet opp 2 nye utlegg:"));
        assert!(text.contains("* Receipt1"));
        assert!(text.contains("* Receipt2"));

        let db = store::load(&db_path).unwrap();
        assert!(db[&FolderId::new("fA")].watermark.is_some());
    }

    #[tokio::test]
    async fn test_empty_changeset_suppresses_notification() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("db.json");

        // Only excluded names in the listing
        let lister = MockLister::new().with_folder(
            "fA",
            "Kari",
            vec![
                remote("b", "Betalt", t0()),
                remote("d", "README.txt", t0()),
            ],
        );
        let (notifier, delivered) = RecordingNotifier::new();

        let scanner = Scanner::new(test_config(&db_path), lister, notifier);
        let summary = scanner.run_once().await.unwrap();

        assert_eq!(summary.folders_with_new_items, 0);
        assert_eq!(summary.items_reported, 0);
        assert!(delivered.lock().unwrap().is_empty());

        // Nothing reported, so the folder was not stamped
        let db = store::load(&db_path).unwrap();
        assert!(db[&FolderId::new("fA")].watermark.is_none());
    }

    #[tokio::test]
    async fn test_first_scan_reports_everything_present() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("db.json");

        // Old files, no watermark yet: all of them count
        let lister = MockLister::new().with_folder(
            "fA",
            "Kari",
            vec![
                remote("r1", "Old1", t0() - Duration::days(30)),
                remote("r2", "Old2", t0() - Duration::days(60)),
            ],
        );
        let (notifier, delivered) = RecordingNotifier::new();

        let scanner = Scanner::new(test_config(&db_path), lister, notifier);
        let summary = scanner.run_once().await.unwrap();

        assert_eq!(summary.items_reported, 2);
        assert_eq!(delivered.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rescan_reports_nothing_new() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("db.json");

        let files = vec![remote("r1", "Receipt1", t0())];
        let (notifier, delivered) = RecordingNotifier::new();
        let scanner = Scanner::new(
            test_config(&db_path),
            MockLister::new().with_folder("fA", "Kari", files),
            notifier,
        );

        scanner.run_once().await.unwrap();
        let second = scanner.run_once().await.unwrap();

        // The watermark from the first pass is after every item
        assert_eq!(second.folders_with_new_items, 0);
        assert_eq!(delivered.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_watermark_is_monotonic_across_passes() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("db.json");

        let (notifier, _) = RecordingNotifier::new();
        let scanner = Scanner::new(
            test_config(&db_path),
            MockLister::new().with_folder("fA", "Kari", vec![remote("r1", "Receipt1", t0())]),
            notifier,
        );

        scanner.run_once().await.unwrap();
        let first = store::load(&db_path).unwrap()[&FolderId::new("fA")].watermark;

        scanner.run_once().await.unwrap();
        let second = store::load(&db_path).unwrap()[&FolderId::new("fA")].watermark;

        assert!(first.is_some());
        // Second pass had nothing new, so the watermark stays put
        assert!(second >= first);
    }

    #[tokio::test]
    async fn test_discovery_skips_excluded_folder_names() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("db.json");

        let lister = MockLister::new()
            .with_folder("fA", "Kari", vec![remote("r1", "Receipt1", t0())])
            .with_folder("fX", "xxxArchive", vec![remote("r2", "Receipt2", t0())])
            .with_folder("fR", "README", vec![remote("r3", "Receipt3", t0())]);
        let (notifier, delivered) = RecordingNotifier::new();

        let scanner = Scanner::new(test_config(&db_path), lister, notifier);
        let summary = scanner.run_once().await.unwrap();

        assert_eq!(summary.folders_scanned, 1);
        assert_eq!(delivered.lock().unwrap().len(), 1);

        let db = store::load(&db_path).unwrap();
        assert!(!db.contains_key(&FolderId::new("fX")));
        assert!(!db.contains_key(&FolderId::new("fR")));
    }
}

mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn test_partial_failure_isolation() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("db.json");

        // Folder A's listing fails; folder B has new items
        let lister = MockLister::new()
            .with_failing_folder("fA", "Kari")
            .with_folder("fB", "Ola", vec![remote("r1", "Receipt1", t0())]);
        let (notifier, delivered) = RecordingNotifier::new();

        let scanner = Scanner::new(test_config(&db_path), lister, notifier);
        let summary = scanner.run_once().await.unwrap();

        assert_eq!(summary.folders_scanned, 2);
        assert_eq!(summary.folders_failed, 1);
        assert_eq!(summary.folders_with_new_items, 1);

        // B got its notification and its watermark; A is untouched
        let messages = delivered.lock().unwrap();
        assert_eq!(messages.len(), 1);
        let json = serde_json::to_value(&messages[0]).unwrap();
        assert!(json["blocks"][0]["text"]["text"]
            .as_str()
            .unwrap()
            .contains("Ola"));

        let db = store::load(&db_path).unwrap();
        assert!(db[&FolderId::new("fA")].watermark.is_none());
        assert!(db[&FolderId::new("fB")].watermark.is_some());
    }

    #[tokio::test]
    async fn test_fail_fast_delivery_aborts_without_saving() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("db.json");

        let lister =
            MockLister::new().with_folder("fA", "Kari", vec![remote("r1", "Receipt1", t0())]);
        let (notifier, delivered) = RecordingNotifier::failing_first(1);

        let config = test_config(&db_path).with_delivery_policy(DeliveryPolicy::FailFast);
        let scanner = Scanner::new(config, lister, notifier);

        let err = scanner.run_once().await.unwrap_err();
        assert!(matches!(err, DropwatchError::Delivery { .. }));
        assert!(delivered.lock().unwrap().is_empty());

        // Store never saved: next pass re-detects the same items
        assert!(!db_path.exists());
    }

    #[tokio::test]
    async fn test_best_effort_delivery_continues_with_other_folders() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("db.json");

        let lister = MockLister::new()
            .with_folder("fA", "Kari", vec![remote("r1", "Receipt1", t0())])
            .with_folder("fB", "Ola", vec![remote("r2", "Receipt2", t0())]);
        let (notifier, delivered) = RecordingNotifier::failing_first(1);

        let config = test_config(&db_path).with_delivery_policy(DeliveryPolicy::BestEffort);
        let scanner = Scanner::new(config, lister, notifier);

        let summary = scanner.run_once().await.unwrap();
        assert_eq!(summary.folders_failed, 1);
        assert_eq!(summary.folders_with_new_items, 1);
        assert_eq!(delivered.lock().unwrap().len(), 1);

        // The failed folder keeps its empty watermark and is retried next
        // pass; the delivered folder's advance is persisted
        let db = store::load(&db_path).unwrap();
        assert!(db[&FolderId::new("fA")].watermark.is_none());
        assert!(db[&FolderId::new("fB")].watermark.is_some());
    }

    #[tokio::test]
    async fn test_failed_folder_reports_again_next_pass() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("db.json");

        let (notifier, delivered) = RecordingNotifier::failing_first(1);
        let config = test_config(&db_path).with_delivery_policy(DeliveryPolicy::BestEffort);
        let scanner = Scanner::new(
            config,
            MockLister::new().with_folder("fA", "Kari", vec![remote("r1", "Receipt1", t0())]),
            notifier,
        );

        let first = scanner.run_once().await.unwrap();
        assert_eq!(first.folders_failed, 1);
        assert!(delivered.lock().unwrap().is_empty());

        // Watermark untouched, so the retry re-detects and delivers
        let second = scanner.run_once().await.unwrap();
        assert_eq!(second.folders_with_new_items, 1);
        assert_eq!(delivered.lock().unwrap().len(), 1);
    }
}

mod dry_run_tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_advances_watermarks_without_delivery() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("db.json");

        // A real webhook client pointed at an unroutable endpoint: any
        // actual send attempt would fail, so success proves no network
        // call happened
        let notifier = SlackWebhook::new("http://127.0.0.1:1/", "token", true).unwrap();
        let lister =
            MockLister::new().with_folder("fA", "Kari", vec![remote("r1", "Receipt1", t0())]);

        let config = test_config(&db_path).with_dry_run(true);
        let scanner = Scanner::new(config, lister, notifier);

        let summary = scanner.run_once().await.unwrap();
        assert_eq!(summary.folders_with_new_items, 1);

        // Watermark advanced exactly as in the live path
        let db = store::load(&db_path).unwrap();
        assert!(db[&FolderId::new("fA")].watermark.is_some());
    }
}

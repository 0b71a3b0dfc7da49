//! Folder listing
//!
//! `FolderLister` is the capability interface the scanner consumes; the
//! one production implementation adapts the `drive-files` client. All
//! call sites go through the same `list` so pagination and query scoping
//! live in exactly one place.

use crate::store::FolderId;
use crate::Result;
use async_trait::async_trait;
use drive_files::DriveClient;

/// One entry from a folder listing, as reported by the storage provider
///
/// `created_time` is the provider's raw timestamp string; parsing happens
/// in the change detector so one bad value never aborts a listing.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    pub created_time: String,
}

/// Capability to list the children of a folder inside a container
#[async_trait]
pub trait FolderLister: Send + Sync {
    /// List all children of `folder_id`, following pagination internally
    async fn list(&self, drive_id: &str, folder_id: &FolderId) -> Result<Vec<RemoteFile>>;
}

/// `FolderLister` backed by the Drive files API
#[derive(Debug, Clone)]
pub struct DriveLister {
    client: DriveClient,
    page_size: u32,
}

impl DriveLister {
    /// Create an adapter requesting `page_size` entries per page
    pub fn new(client: DriveClient, page_size: u32) -> Self {
        Self { client, page_size }
    }
}

#[async_trait]
impl FolderLister for DriveLister {
    async fn list(&self, drive_id: &str, folder_id: &FolderId) -> Result<Vec<RemoteFile>> {
        let files = self
            .client
            .list_children(drive_id, folder_id.as_str(), self.page_size)
            .await?;

        Ok(files
            .into_iter()
            .map(|f| RemoteFile {
                id: f.id,
                name: f.name,
                created_time: f.created_time,
            })
            .collect())
    }
}

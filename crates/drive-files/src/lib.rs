//! Drive files API wrapper for Rust
//!
//! A narrow, typed interface to the Drive v3 `files.list` endpoint, scoped
//! to shared drives. Lists the children of a folder and follows pagination
//! internally, so callers always see the complete listing.
//!
//! # Example
//!
//! ```no_run
//! use drive_files::DriveClient;
//!
//! # async fn run() -> Result<(), drive_files::Error> {
//! let client = DriveClient::new("ya29.access-token")?;
//!
//! // List every child of a folder inside a shared drive
//! let files = client.list_children("drive-id", "folder-id", 100).await?;
//! for f in &files {
//!     println!("{} ({})", f.name, f.created_time);
//! }
//! # Ok(())
//! # }
//! ```

use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Default API endpoint for the files collection
const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Per-request timeout for listing calls
const LIST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when talking to the files API
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Result type for drive-files operations
pub type Result<T> = std::result::Result<T, Error>;

/// A file (or folder) entry as returned by `files.list`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    /// RFC 3339 creation timestamp, passed through verbatim
    #[serde(default)]
    pub created_time: String,
}

/// One page of a `files.list` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Client for the Drive v3 files API
#[derive(Debug, Clone)]
pub struct DriveClient {
    client: Client,
    base_url: String,
    token: String,
}

impl DriveClient {
    /// Create a client authenticating with the given OAuth bearer token
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(LIST_TIMEOUT)
            .default_headers({
                let mut headers = header::HeaderMap::new();
                headers.insert(
                    header::USER_AGENT,
                    header::HeaderValue::from_static("drive-files/0.1"),
                );
                headers
            })
            .build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.into(),
        })
    }

    /// Override the API base URL (for proxies and tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// List all children of `folder_id` inside the shared drive `drive_id`
    ///
    /// Requests `page_size` entries per page and follows `nextPageToken`
    /// until the listing is exhausted. Only `id`, `name` and `createdTime`
    /// are requested.
    pub async fn list_children(
        &self,
        drive_id: &str,
        folder_id: &str,
        page_size: u32,
    ) -> Result<Vec<DriveFile>> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .list_page(drive_id, folder_id, page_size, page_token.as_deref())
                .await?;

            files.extend(page.files);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(files)
    }

    /// Fetch a single page of the listing
    async fn list_page(
        &self,
        drive_id: &str,
        folder_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<FileList> {
        let url = format!("{}/files", self.base_url);
        let query = format!("'{}' in parents", folder_id);
        let page_size = page_size.to_string();

        let mut params = vec![
            ("driveId", drive_id),
            ("corpora", "drive"),
            ("supportsAllDrives", "true"),
            ("includeItemsFromAllDrives", "true"),
            ("q", query.as_str()),
            ("pageSize", page_size.as_str()),
            ("fields", "nextPageToken, files(id, name, createdTime)"),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response = self
            .client
            .get(&url)
            .query(&params)
            .bearer_auth(&self.token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::Auth(body))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::Api {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

//! Slack webhook transport
//!
//! Pure delivery: POSTs a built message to the incoming-webhook endpoint
//! and maps the endpoint's structured rejections. Dry-run constructs and
//! serializes the payload exactly as the live path, then skips the
//! network call.

use super::{Message, Notifier};
use crate::Result;
use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;
use tracing::{debug, info};

/// Per-request timeout for webhook posts
const DELIVER_TIMEOUT: Duration = Duration::from_secs(15);

/// Webhook client for Slack incoming webhooks
#[derive(Debug, Clone)]
pub struct SlackWebhook {
    client: Client,
    url: String,
    dry_run: bool,
}

impl SlackWebhook {
    /// Create a webhook client for `webhook_base` + `token`
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(webhook_base: &str, token: &str, dry_run: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(DELIVER_TIMEOUT)
            .default_headers({
                let mut headers = header::HeaderMap::new();
                headers.insert(
                    header::CONTENT_TYPE,
                    header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()?;

        Ok(Self {
            client,
            url: format!("{}{}", webhook_base, token),
            dry_run,
        })
    }
}

#[async_trait]
impl Notifier for SlackWebhook {
    async fn deliver(&self, message: &Message) -> Result<()> {
        // Serialize up front so dry-run still validates the payload shape
        let body = serde_json::to_string(message)?;

        if self.dry_run {
            info!(bytes = body.len(), "Dry run, skipping webhook delivery");
            return Ok(());
        }

        debug!("Sending webhook message");

        let response = self
            .client
            .post(&self.url)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let reason = match body.as_str() {
            "no_text" => "no text supplied".to_string(),
            "invalid_payload" => "malformed payload".to_string(),
            other => other.to_string(),
        };

        Err(crate::DropwatchError::Delivery {
            status: status.as_u16(),
            reason,
        })
    }
}

//! Notification building and delivery
//!
//! The builder turns a (folder owner, new items) pair into a
//! transport-agnostic `Message`; the `Notifier` trait is the delivery
//! seam. The payload shape went through several revisions over the
//! tool's lifetime (plain text, block-based, section plus context), so
//! each shape is a `MessageFormat` variant with its own encoder and the
//! active one is picked by configuration.

mod slack;

pub use slack::SlackWebhook;

use crate::detect::NewItem;
use crate::store::FolderId;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Delivers a built message to the outbound transport
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, message: &Message) -> Result<()>;
}

/// Which payload shape to emit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageFormat {
    /// Single `text` field
    PlainText,

    /// Two mrkdwn section blocks (summary, folder link)
    #[default]
    Blocks,

    /// A mrkdwn section block plus a context block with the folder link
    SectionContext,
}

/// A text object inside a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    Mrkdwn { text: String },
    PlainText { text: String },
}

/// One layout block of a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section { text: TextObject },
    Context { elements: Vec<TextObject> },
}

/// The outbound notification payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
}

/// Build the notification for a folder's new items
///
/// `items` must be non-empty; the orchestrator suppresses notifications
/// for folders with nothing new. Bullet order follows item order. Text is
/// in a fixed display locale.
pub fn build(
    format: MessageFormat,
    owner: &str,
    folder_id: &FolderId,
    items: &[NewItem],
    folder_link_base: &str,
) -> Message {
    debug_assert!(!items.is_empty(), "no notification for an empty change set");

    let summary = summary_text(owner, items);
    let link = folder_link(folder_link_base, folder_id, owner);

    match format {
        MessageFormat::PlainText => Message {
            text: Some(format!("{}{}", summary, link)),
            blocks: Vec::new(),
        },
        MessageFormat::Blocks => Message {
            text: None,
            blocks: vec![
                Block::Section {
                    text: TextObject::Mrkdwn { text: summary },
                },
                Block::Section {
                    text: TextObject::Mrkdwn { text: link },
                },
            ],
        },
        MessageFormat::SectionContext => Message {
            text: None,
            blocks: vec![
                Block::Section {
                    text: TextObject::Mrkdwn { text: summary },
                },
                Block::Context {
                    elements: vec![TextObject::Mrkdwn { text: link }],
                },
            ],
        },
    }
}

/// Count-prefixed summary with one bullet per item
fn summary_text(owner: &str, items: &[NewItem]) -> String {
    let mut msg = String::new();
    msg.push_str(owner);
    msg.push_str(" har lastet opp ");
    msg.push_str(&items.len().to_string());
    msg.push_str(" nye utlegg:\n");

    for item in items {
        msg.push_str("* ");
        msg.push_str(&item.name);
        msg.push('\n');
    }

    msg
}

/// Deep link back to the folder for the owner to inspect
fn folder_link(base: &str, folder_id: &FolderId, owner: &str) -> String {
    format!(
        "<{}{}|Gå til utleggsmappen og se alle utleggene til {}>",
        base, folder_id, owner
    )
}

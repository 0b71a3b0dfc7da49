//! Change detection
//!
//! Pure filtering of a folder listing into the items created after the
//! folder's watermark. No I/O, no mutation of the record; downstream
//! notification content relies on the output preserving listing order.

use crate::config::ExclusionRules;
use crate::lister::RemoteFile;
use crate::store::FolderRecord;
use chrono::{DateTime, Utc};

/// A file detected as new since the folder's watermark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Filter `listing` down to the items created strictly after the folder's
/// watermark
///
/// Exclusion rules are applied before the timestamp comparison. An item
/// whose timestamp is not strict RFC 3339 is logged and dropped; the rest
/// of the listing is unaffected. A folder that has never been scanned
/// (`watermark` absent) treats every non-excluded item as new — there is
/// no earlier baseline, so everything currently present gets reported
/// once.
pub fn new_items(
    record: &FolderRecord,
    listing: &[RemoteFile],
    rules: &ExclusionRules,
) -> Vec<NewItem> {
    let mut items = Vec::new();

    for file in listing {
        if rules.excludes_item(&file.name) {
            continue;
        }

        let created_at = match DateTime::parse_from_rfc3339(&file.created_time) {
            Ok(t) => t.with_timezone(&Utc),
            Err(e) => {
                tracing::warn!(
                    folder = %record.id,
                    file = %file.name,
                    created_time = %file.created_time,
                    error = %e,
                    "Skipping file with unparseable creation time"
                );
                continue;
            }
        };

        if let Some(mark) = record.watermark {
            if created_at <= mark {
                continue;
            }
        }

        items.push(NewItem {
            name: file.name.clone(),
            created_at,
        });
    }

    items
}

//! Push ingestion payloads.
//!
//! Automation pipelines POST either a single JSON object or an array of
//! them. Field names follow the inbound wire contract; everything is
//! optional except that a record without title and body is dropped.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sift_core::{ContentId, ContentRecord};
use uuid::Uuid;

/// One pushed content item as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct PushItem {
    /// Stable id for upsert. Fresh records omit it.
    #[serde(default)]
    pub id: Option<Uuid>,

    /// Record title. Required in practice: empty means the item is dropped.
    #[serde(default)]
    pub title: String,

    /// Record body.
    #[serde(default, rename = "content")]
    pub body: String,

    /// Optional image locator.
    #[serde(default, rename = "image_url")]
    pub image_ref: Option<String>,

    /// Classification label; defaults to the import label.
    #[serde(default)]
    pub category: Option<String>,

    /// Accepted for wire compatibility and ignored: pushed content always
    /// enters the pending partition, moderation owns state.
    #[serde(default)]
    pub status: Option<String>,

    /// Accepted for wire compatibility and ignored: the kind is derived
    /// from the payload, never trusted from the source.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    /// Origin timestamp; defaults to ingestion time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Provenance locator for the original content.
    #[serde(default, rename = "source_url")]
    pub source_ref: Option<String>,
}

impl PushItem {
    /// Converts the item into a pending record candidate.
    ///
    /// Returns `None` when title or body is missing, matching the silent
    /// drop policy for garbage rows.
    pub fn into_record(self, now: DateTime<Utc>) -> Option<ContentRecord> {
        if self.title.trim().is_empty() || self.body.trim().is_empty() {
            return None;
        }

        let id = self.id.map_or_else(ContentId::new, ContentId::from);
        let category =
            self.category.filter(|c| !c.trim().is_empty()).unwrap_or_else(|| {
                crate::adapter::IMPORT_CATEGORY.to_string()
            });
        let image_ref = self.image_ref.filter(|r| !r.trim().is_empty());

        Some(ContentRecord::new(
            id,
            self.title,
            self.body,
            image_ref,
            category,
            self.source_ref,
            self.created_at.unwrap_or(now),
        ))
    }
}

/// Wire payload: a single item or a batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PushPayload {
    /// A batch of items.
    Many(Vec<PushItem>),
    /// A single item.
    One(Box<PushItem>),
}

impl PushPayload {
    /// Flattens the payload into a uniform item list.
    pub fn into_items(self) -> Vec<PushItem> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![*item],
        }
    }
}

//! Fixture builders for test data.
//!
//! Builders produce valid domain objects with sensible defaults so tests
//! only spell out the fields they care about.

use chrono::{DateTime, Utc};
use sift_core::{ContentId, ContentRecord, RelayChannel, RelayEndpoint};

/// Builder for content records.
#[derive(Debug, Clone)]
pub struct ContentBuilder {
    id: ContentId,
    title: String,
    body: String,
    image_ref: Option<String>,
    category: String,
    source_ref: Option<String>,
    created_at: DateTime<Utc>,
}

impl ContentBuilder {
    /// Starts a builder with default field values.
    pub fn new() -> Self {
        Self {
            id: ContentId::new(),
            title: "Test headline".to_string(),
            body: "Test body text".to_string(),
            image_ref: None,
            category: "general".to_string(),
            source_ref: None,
            created_at: Utc::now(),
        }
    }

    /// Pins the record id.
    #[must_use]
    pub fn id(mut self, id: ContentId) -> Self {
        self.id = id;
        self
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the image reference.
    #[must_use]
    pub fn image_ref(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    /// Sets the category label.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the provenance locator.
    #[must_use]
    pub fn source_ref(mut self, source_ref: impl Into<String>) -> Self {
        self.source_ref = Some(source_ref.into());
        self
    }

    /// Sets the origin timestamp.
    #[must_use]
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Builds the record, deriving its kind.
    pub fn build(self) -> ContentRecord {
        ContentRecord::new(
            self.id,
            self.title,
            self.body,
            self.image_ref,
            self.category,
            self.source_ref,
            self.created_at,
        )
    }
}

impl Default for ContentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for relay endpoint configurations.
#[derive(Debug, Clone)]
pub struct EndpointBuilder {
    channel: RelayChannel,
    url: String,
    enabled: bool,
}

impl EndpointBuilder {
    /// Starts a builder for the given channel, enabled by default.
    pub fn new(channel: RelayChannel) -> Self {
        Self { channel, url: "https://relay.example/hook".to_string(), enabled: true }
    }

    /// Sets the destination URL.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the enabled flag.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Builds the endpoint configuration.
    pub fn build(self) -> RelayEndpoint {
        RelayEndpoint { channel: self.channel, url: self.url, enabled: self.enabled }
    }
}

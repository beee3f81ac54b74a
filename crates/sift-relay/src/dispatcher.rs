//! Sweep-based delivery of relay obligations.

use std::sync::Arc;

use serde::Serialize;
use sift_core::{Clock, ContentRecord, Outcome, RelayChannel, Storage};
use tracing::{info, instrument, warn};

use crate::{
    client::{ClientConfig, RelayClient},
    error::Result,
};

/// Configuration for the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Maximum obligations delivered per outcome in one pass.
    pub batch_limit: i64,

    /// HTTP client configuration.
    pub client: ClientConfig,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self { batch_limit: crate::DEFAULT_BATCH_LIMIT, client: ClientConfig::default() }
    }
}

/// Counters from one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepStats {
    /// Obligations confirmed delivered and marked sent.
    pub delivered: usize,

    /// Delivery attempts that failed; the obligations stay unsent.
    pub failed: usize,

    /// Obligations left untouched because no endpoint is enabled for
    /// their channel. Not an error: they become actionable the moment an
    /// endpoint is enabled.
    pub awaiting_endpoint: usize,
}

/// Delivers unsent ledger obligations to configured endpoints.
///
/// One sweep walks both outcomes oldest-first. A single delivery failure
/// never stops the pass; at-least-once semantics mean a pass racing another
/// pass on the same obligation can double-deliver, and receivers must
/// tolerate that.
#[derive(Clone)]
pub struct Dispatcher {
    storage: Storage,
    client: RelayClient,
    clock: Arc<dyn Clock>,
    batch_limit: i64,
}

impl Dispatcher {
    /// Creates a dispatcher over the given storage.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the HTTP client cannot be built.
    pub fn new(storage: Storage, config: DispatcherConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let client = RelayClient::new(config.client)?;

        Ok(Self { storage, client, clock, batch_limit: config.batch_limit })
    }

    /// Runs one delivery pass over every outcome's backlog.
    ///
    /// # Errors
    ///
    /// Returns an error only when the store itself fails; endpoint
    /// failures are counted in the stats and retried on later passes.
    #[instrument(name = "relay_sweep", skip(self))]
    pub async fn sweep(&self) -> Result<SweepStats> {
        let mut stats = SweepStats::default();

        for outcome in Outcome::ALL {
            self.sweep_outcome(outcome, &mut stats).await?;
        }

        info!(
            delivered = stats.delivered,
            failed = stats.failed,
            awaiting_endpoint = stats.awaiting_endpoint,
            "relay sweep complete"
        );

        Ok(stats)
    }

    async fn sweep_outcome(&self, outcome: Outcome, stats: &mut SweepStats) -> Result<()> {
        let channel = outcome.channel();

        let Some(endpoint) = self.storage.endpoints.find_enabled(&channel).await? else {
            let owed = self.storage.relay_ledger.pending(outcome).await?.len();
            if owed > 0 {
                info!(channel = %channel, owed, "no enabled endpoint, backlog retained");
            }
            stats.awaiting_endpoint += owed;
            return Ok(());
        };

        let backlog =
            self.storage.relay_ledger.pending_with_content(outcome, self.batch_limit).await?;

        for item in backlog {
            let payload = payload_for(&item.content, &channel);

            match self.client.post_json(&endpoint.url, &payload).await {
                Ok(status) => {
                    self.storage.relay_ledger.mark_sent(item.entry.id, self.clock.now()).await?;
                    stats.delivered += 1;
                    info!(
                        entry = %item.entry.id,
                        content_id = %item.entry.content_id,
                        status,
                        "obligation delivered"
                    );
                },
                Err(err) => {
                    // Leave sent_at null; the next pass picks it up again.
                    stats.failed += 1;
                    warn!(
                        entry = %item.entry.id,
                        url = %endpoint.url,
                        error = %err,
                        "delivery failed, obligation retained"
                    );
                },
            }
        }

        Ok(())
    }
}

/// Builds the outbound payload: the content snapshot flattened, plus an
/// `event` discriminator carrying the channel's outcome label.
fn payload_for(content: &ContentRecord, channel: &RelayChannel) -> serde_json::Value {
    let mut payload = serde_json::to_value(content).unwrap_or(serde_json::Value::Null);
    if let serde_json::Value::Object(ref mut fields) = payload {
        fields.insert(
            "event".to_string(),
            serde_json::Value::String(channel.event_label().to_string()),
        );
    }
    payload
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sift_core::{ContentId, ContentKind};

    use super::*;

    #[test]
    fn payload_flattens_content_and_adds_event() {
        let content = ContentRecord::new(
            ContentId::new(),
            "headline".into(),
            "body".into(),
            Some("https://cdn.example/i.png".into()),
            "news".into(),
            None,
            Utc::now(),
        );

        let payload = payload_for(&content, &RelayChannel::on_approve());

        assert_eq!(payload["title"], "headline");
        assert_eq!(payload["body"], "body");
        assert_eq!(payload["event"], "approved");
        assert_eq!(payload["kind"], ContentKind::Mixed.to_string());
    }
}

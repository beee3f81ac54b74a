//! Background sweep loop.

use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::dispatcher::Dispatcher;

/// Periodically runs dispatch passes until cancelled.
///
/// Passes are also triggered manually through the API; the ledger's
/// idempotent completion makes overlapping passes safe.
pub struct Sweeper {
    dispatcher: Arc<Dispatcher>,
    interval: Duration,
    cancellation_token: CancellationToken,
}

impl Sweeper {
    /// Creates a sweeper over the given dispatcher.
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        interval: Duration,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self { dispatcher, interval, cancellation_token }
    }

    /// Runs sweep passes until the cancellation token fires.
    ///
    /// A failed pass (store unavailable) is logged and retried on the next
    /// tick; obligations are durable, so nothing is lost while the store
    /// recovers.
    pub async fn run(self) {
        info!(interval_secs = self.interval.as_secs(), "relay sweeper starting");

        loop {
            tokio::select! {
                () = self.cancellation_token.cancelled() => break,
                () = sleep(self.interval) => {},
            }

            if self.cancellation_token.is_cancelled() {
                break;
            }

            match self.dispatcher.sweep().await {
                Ok(stats) if stats.delivered > 0 || stats.failed > 0 => {
                    info!(
                        delivered = stats.delivered,
                        failed = stats.failed,
                        "background sweep finished"
                    );
                },
                Ok(_) => {},
                Err(err) => {
                    error!(error = %err, "background sweep failed, will retry next tick");
                },
            }
        }

        info!("relay sweeper stopped");
    }
}

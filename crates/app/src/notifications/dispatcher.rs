//! Fire-and-forget notification dispatch.

use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, error, info_span, warn};

use crate::notifications::{ActivationNotice, Notifier};

/// Delivery attempts per notice.
pub const DISPATCH_ATTEMPTS: u32 = 3;

/// Pause between failed attempts.
pub const DISPATCH_BACKOFF: Duration = Duration::from_millis(800);

/// Runs notifier calls on tracked background tasks. Callers never observe failures;
/// they are retried a bounded number of times and then logged.
#[derive(Clone)]
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    tracker: TaskTracker,
}

impl Dispatcher {
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            tracker: TaskTracker::new(),
        }
    }

    pub fn dispatch_activation(&self, notice: ActivationNotice) {
        let notifier = Arc::clone(&self.notifier);
        let span = info_span!("notify.activation", user_id = %notice.user_id);

        self.tracker.spawn(
            async move {
                for attempt in 1..=DISPATCH_ATTEMPTS {
                    match notifier.send_activation(&notice).await {
                        Ok(()) => return,
                        Err(error) if attempt < DISPATCH_ATTEMPTS => {
                            warn!(attempt, error = %error, "activation notice failed, retrying");

                            sleep(DISPATCH_BACKOFF).await;
                        }
                        Err(error) => {
                            error!(attempt, error = %error, "activation notice abandoned");
                        }
                    }
                }
            }
            .instrument(span),
        );
    }

    /// Number of notices still being delivered.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting work and wait for in-flight deliveries to finish.
    pub async fn shutdown(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("in_flight", &self.tracker.len())
            .finish_non_exhaustive()
    }
}

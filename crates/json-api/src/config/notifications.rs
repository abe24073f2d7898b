//! Notifications Config

use clap::Args;

/// Activation notice delivery settings.
#[derive(Debug, Args)]
pub struct NotificationsConfig {
    /// Endpoint receiving activation notices as JSON. Notices are only logged when unset.
    #[arg(long, env = "NOTIFY_WEBHOOK_URL")]
    pub notify_webhook_url: Option<String>,
}

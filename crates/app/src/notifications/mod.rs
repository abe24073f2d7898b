//! Out-of-band user notifications.

mod dispatcher;
mod notifier;
mod webhook;

pub use dispatcher::*;
pub use notifier::*;
pub use webhook::WebhookNotifier;

//! Notification payloads and delivery backends.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::{auth::TokenPlaintext, domain::users::records::UserId};

/// Welcome message carrying the activation token a new user needs.
#[derive(Debug, Clone)]
pub struct ActivationNotice {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub registered_at: Timestamp,
    pub activation_token: TokenPlaintext,
}

/// Wire form of [`ActivationNotice`]. The token is exposed only here.
#[derive(Debug, Serialize)]
pub(crate) struct ActivationPayload<'a> {
    pub kind: &'static str,
    pub user_id: UserId,
    pub name: &'a str,
    pub email: &'a str,
    pub registered_at: Timestamp,
    pub activation_token: &'a str,
}

impl<'a> From<&'a ActivationNotice> for ActivationPayload<'a> {
    fn from(notice: &'a ActivationNotice) -> Self {
        Self {
            kind: "user_welcome",
            user_id: notice.user_id,
            name: &notice.name,
            email: &notice.email,
            registered_at: notice.registered_at,
            activation_token: notice.activation_token.expose(),
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification transport failed")]
    Transport(#[from] reqwest::Error),

    #[error("notification rejected: {0}")]
    Rejected(String),
}

#[automock]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_activation(&self, notice: &ActivationNotice) -> Result<(), NotifyError>;
}

/// Delivers nothing; records that a notice would have been sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_activation(&self, notice: &ActivationNotice) -> Result<(), NotifyError> {
        info!(
            user_id = %notice.user_id,
            email = %notice.email,
            "activation notice ready (no delivery backend configured)"
        );

        Ok(())
    }
}

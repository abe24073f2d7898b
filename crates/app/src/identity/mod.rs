//! Request identity resolution.
//!
//! A request either carries no credential and is [`Identity::Anonymous`], or carries
//! an `Authorization: Bearer <token>` header that must resolve to a user. Anonymity
//! is a normal outcome; only a credential that is present and unusable is an error.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::{
    auth::{TokenScope, TokenService, TokenServiceError},
    domain::users::records::{UserId, UserRecord},
    store::StoreError,
};

/// Header that carries the credential. Responses vary on it.
pub const VARY_HEADER: &str = "Authorization";

const BEARER_SCHEME: &str = "Bearer";

#[derive(Debug, Clone, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    Authenticated(UserRecord),
}

impl Identity {
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }

    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.user().map(|user| user.id)
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid or missing authentication token")]
    InvalidCredentialFormat,

    #[error("invalid or missing authentication token")]
    InvalidCredential,

    #[error("identity lookup failed")]
    Store(#[source] StoreError),
}

#[derive(Clone)]
pub struct IdentityResolver {
    tokens: Arc<dyn TokenService>,
}

impl IdentityResolver {
    #[must_use]
    pub fn new(tokens: Arc<dyn TokenService>) -> Self {
        Self { tokens }
    }

    /// Resolve the raw `Authorization` header value, if any, to an identity.
    ///
    /// # Errors
    ///
    /// [`IdentityError::InvalidCredentialFormat`] when the header is not exactly
    /// `Bearer <token>`, [`IdentityError::InvalidCredential`] when the token is
    /// malformed, unknown or expired, and [`IdentityError::Store`] when the lookup
    /// itself failed.
    pub async fn resolve(&self, authorization: Option<&str>) -> Result<Identity, IdentityError> {
        let Some(header) = authorization else {
            return Ok(Identity::Anonymous);
        };

        let token = bearer_token(header).ok_or(IdentityError::InvalidCredentialFormat)?;

        match self
            .tokens
            .resolve_token(TokenScope::Authentication, token)
            .await
        {
            Ok(user) => {
                debug!(user_id = %user.id, "resolved bearer token");

                Ok(Identity::Authenticated(user))
            }
            Err(TokenServiceError::NotFound | TokenServiceError::Invalid(_)) => {
                Err(IdentityError::InvalidCredential)
            }
            Err(TokenServiceError::Store(error)) => Err(IdentityError::Store(error)),
            Err(TokenServiceError::ExpiryOutOfRange(_)) => Err(IdentityError::InvalidCredential),
        }
    }
}

/// The token of a header of the form `Bearer <token>`: exactly two space-separated
/// parts with a case-sensitive scheme.
fn bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');

    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER_SCHEME), Some(token), None) => Some(token),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use crate::{
        auth::MockTokenService,
        domain::users::password::Password,
        versioning::Version,
    };

    use super::*;

    fn user() -> UserRecord {
        UserRecord {
            id: UserId::from_i64(42),
            created_at: Timestamp::UNIX_EPOCH,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: Password::default(),
            activated: true,
            version: Version::INITIAL,
        }
    }

    fn resolver(tokens: MockTokenService) -> IdentityResolver {
        IdentityResolver::new(Arc::new(tokens))
    }

    #[tokio::test]
    async fn missing_header_is_anonymous_without_lookup() {
        let mut tokens = MockTokenService::new();

        tokens.expect_resolve_token().never();

        let identity = resolver(tokens).resolve(None).await;

        assert!(
            matches!(identity, Ok(Identity::Anonymous)),
            "got {identity:?}"
        );
    }

    #[tokio::test]
    async fn malformed_headers_fail_before_lookup() {
        for header in [
            "",
            "Bearer",
            "bearer ABCDEFGHIJKLMNOPQRSTUVWXYZ",
            "Basic ABCDEFGHIJKLMNOPQRSTUVWXYZ",
            "Bearer ABCDEFGHIJKLMNOPQRSTUVWXYZ extra",
            "Bearer  ABCDEFGHIJKLMNOPQRSTUVWXYZ",
        ] {
            let mut tokens = MockTokenService::new();

            tokens.expect_resolve_token().never();

            let result = resolver(tokens).resolve(Some(header)).await;

            assert!(
                matches!(result, Err(IdentityError::InvalidCredentialFormat)),
                "header {header:?} gave {result:?}"
            );
        }
    }

    #[tokio::test]
    async fn unknown_and_malformed_tokens_are_indistinguishable() {
        for failure in [
            TokenServiceError::NotFound,
            TokenServiceError::Invalid(crate::validator::FieldErrors::new()),
        ] {
            let mut tokens = MockTokenService::new();
            let mut failure = Some(failure);

            tokens
                .expect_resolve_token()
                .once()
                .returning(move |_, _| Err(failure.take().unwrap_or(TokenServiceError::NotFound)));

            let result = resolver(tokens).resolve(Some("Bearer short")).await;

            assert!(
                matches!(result, Err(IdentityError::InvalidCredential)),
                "got {result:?}"
            );
        }
    }

    #[tokio::test]
    async fn valid_token_resolves_to_its_user() {
        let mut tokens = MockTokenService::new();

        tokens
            .expect_resolve_token()
            .withf(|scope, token| {
                *scope == TokenScope::Authentication && token == "ABCDEFGHIJKLMNOPQRSTUVWXYZ"
            })
            .once()
            .returning(|_, _| Ok(user()));

        let identity = resolver(tokens)
            .resolve(Some("Bearer ABCDEFGHIJKLMNOPQRSTUVWXYZ"))
            .await;

        assert!(
            matches!(&identity, Ok(Identity::Authenticated(user)) if user.id == UserId::from_i64(42)),
            "got {identity:?}"
        );
    }

    #[tokio::test]
    async fn store_failures_are_not_reported_as_bad_credentials() {
        let mut tokens = MockTokenService::new();

        tokens
            .expect_resolve_token()
            .returning(|_, _| Err(TokenServiceError::Store(StoreError::Timeout(std::time::Duration::from_secs(3)))));

        let result = resolver(tokens)
            .resolve(Some("Bearer ABCDEFGHIJKLMNOPQRSTUVWXYZ"))
            .await;

        assert!(matches!(result, Err(IdentityError::Store(_))), "got {result:?}");
    }
}

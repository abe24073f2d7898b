//! Token service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use tracing::debug;

use crate::{
    auth::{
        IssuedToken, NewToken, TokenDigest, TokenScope, TokenServiceError, TokensRepository,
        generate_token_plaintext, validate_token_plaintext,
    },
    domain::users::{
        UsersRepository,
        records::{UserId, UserRecord},
    },
    validator::Validator,
};

/// Token authority backed by the token and user stores.
#[derive(Clone)]
pub struct TokenAuthority {
    tokens: Arc<dyn TokensRepository>,
    users: Arc<dyn UsersRepository>,
}

impl TokenAuthority {
    #[must_use]
    pub fn new(tokens: Arc<dyn TokensRepository>, users: Arc<dyn UsersRepository>) -> Self {
        Self { tokens, users }
    }
}

#[async_trait]
impl TokenService for TokenAuthority {
    async fn issue_token(
        &self,
        user: UserId,
        ttl: SignedDuration,
        scope: TokenScope,
    ) -> Result<IssuedToken, TokenServiceError> {
        let expires_at = Timestamp::now()
            .checked_add(ttl)
            .map_err(TokenServiceError::ExpiryOutOfRange)?;

        let plaintext = generate_token_plaintext();

        self.tokens
            .insert_token(&NewToken {
                digest: plaintext.digest(),
                user_id: user,
                expires_at,
                scope,
            })
            .await?;

        debug!(user_id = %user, %scope, %expires_at, "issued token");

        Ok(IssuedToken {
            plaintext,
            user_id: user,
            expires_at,
            scope,
        })
    }

    async fn resolve_token(
        &self,
        scope: TokenScope,
        plaintext: &str,
    ) -> Result<UserRecord, TokenServiceError> {
        let mut v = Validator::new();

        validate_token_plaintext(&mut v, plaintext);

        v.finish().map_err(TokenServiceError::Invalid)?;

        let user = self
            .users
            .find_user_by_token(&TokenDigest::of(plaintext), scope, Timestamp::now())
            .await?;

        Ok(user)
    }

    async fn revoke_scope(&self, scope: TokenScope, user: UserId) -> Result<(), TokenServiceError> {
        let revoked = self.tokens.delete_tokens_for_user(scope, user).await?;

        debug!(user_id = %user, %scope, revoked, "revoked tokens");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait TokenService: Send + Sync {
    /// Issue a token for `user` valid for `ttl`. The plaintext is only ever returned here.
    async fn issue_token(
        &self,
        user: UserId,
        ttl: SignedDuration,
        scope: TokenScope,
    ) -> Result<IssuedToken, TokenServiceError>;

    /// Resolve an unexpired token of `scope` to its owner.
    async fn resolve_token(
        &self,
        scope: TokenScope,
        plaintext: &str,
    ) -> Result<UserRecord, TokenServiceError>;

    /// Delete every token of `scope` owned by `user`.
    async fn revoke_scope(&self, scope: TokenScope, user: UserId) -> Result<(), TokenServiceError>;
}

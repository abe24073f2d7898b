//! Users service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::SignedDuration;
use mockall::automock;
use tracing::{error, info};

use crate::{
    auth::{IssuedToken, TokenScope, TokenService, TokenServiceError},
    domain::users::{
        UsersRepository,
        data::{Credentials, NewUser, NewUserRecord},
        errors::UsersServiceError,
        password::{Password, validate_password_plaintext, verify_without_user},
        records::UserRecord,
    },
    notifications::{ActivationNotice, Dispatcher},
    permissions::{PermissionCode, PermissionsRepository},
    store::StoreError,
    validator::{FieldErrors, Validator, is_email},
    versioning::update_if_version_matches,
};

/// Lifetime of a freshly issued activation token.
pub const ACTIVATION_TOKEN_TTL: SignedDuration = SignedDuration::from_hours(24);

/// Lifetime of a freshly issued authentication token.
pub const AUTHENTICATION_TOKEN_TTL: SignedDuration = SignedDuration::from_hours(24);

pub const NAME_MAX_BYTES: usize = 500;

#[derive(Clone)]
pub struct UserDirectory {
    users: Arc<dyn UsersRepository>,
    permissions: Arc<dyn PermissionsRepository>,
    tokens: Arc<dyn TokenService>,
    dispatcher: Dispatcher,
}

impl UserDirectory {
    #[must_use]
    pub fn new(
        users: Arc<dyn UsersRepository>,
        permissions: Arc<dyn PermissionsRepository>,
        tokens: Arc<dyn TokenService>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            users,
            permissions,
            tokens,
            dispatcher,
        }
    }
}

#[async_trait]
impl UsersService for UserDirectory {
    async fn register_user(&self, user: NewUser) -> Result<UserRecord, UsersServiceError> {
        let mut v = Validator::new();

        validate_name(&mut v, &user.name);
        validate_email(&mut v, &user.email);
        validate_password_plaintext(&mut v, &user.password);

        v.finish().map_err(UsersServiceError::Invalid)?;

        let mut password = Password::default();

        password.set(&user.password)?;

        let Some(password_hash) = password.hash() else {
            error!("missing password hash for user");

            return Err(UsersServiceError::Invariant("missing password hash for user"));
        };

        let record = self
            .users
            .insert_user(&NewUserRecord {
                name: user.name,
                email: user.email,
                password_hash: password_hash.to_string(),
                activated: false,
            })
            .await
            .map_err(|error| match error {
                StoreError::AlreadyExists => duplicate_email(),
                other => UsersServiceError::from(other),
            })?;

        self.permissions
            .grant_permissions(record.id, &[PermissionCode::MOVIES_READ])
            .await?;

        let token = self
            .tokens
            .issue_token(record.id, ACTIVATION_TOKEN_TTL, TokenScope::Activation)
            .await?;

        self.dispatcher.dispatch_activation(ActivationNotice {
            user_id: record.id,
            name: record.name.clone(),
            email: record.email.clone(),
            registered_at: record.created_at,
            activation_token: token.plaintext,
        });

        info!(user_id = %record.id, "registered user");

        Ok(record)
    }

    async fn activate_user(&self, token_plaintext: &str) -> Result<UserRecord, UsersServiceError> {
        let mut user = self
            .tokens
            .resolve_token(TokenScope::Activation, token_plaintext)
            .await
            .map_err(|error| match error {
                TokenServiceError::Invalid(errors) => UsersServiceError::Invalid(errors),
                TokenServiceError::NotFound => UsersServiceError::Invalid(FieldErrors::from([(
                    "token".to_string(),
                    "invalid or expired activation token".to_string(),
                )])),
                other => UsersServiceError::from(other),
            })?;

        user.activated = true;

        update_if_version_matches(&*self.users, &mut user).await?;

        self.tokens
            .revoke_scope(TokenScope::Activation, user.id)
            .await?;

        info!(user_id = %user.id, version = %user.version, "activated user");

        Ok(user)
    }

    async fn authenticate(&self, credentials: Credentials) -> Result<IssuedToken, UsersServiceError> {
        let mut v = Validator::new();

        validate_email(&mut v, &credentials.email);
        validate_password_plaintext(&mut v, &credentials.password);

        v.finish().map_err(UsersServiceError::Invalid)?;

        let user = match self.users.get_user_by_email(&credentials.email).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                verify_without_user(&credentials.password);

                return Err(UsersServiceError::InvalidCredentials);
            }
            Err(other) => return Err(other.into()),
        };

        if !user.password.matches(&credentials.password)? {
            return Err(UsersServiceError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue_token(user.id, AUTHENTICATION_TOKEN_TTL, TokenScope::Authentication)
            .await?;

        Ok(token)
    }

    async fn find_by_email(&self, email: &str) -> Result<UserRecord, UsersServiceError> {
        Ok(self.users.get_user_by_email(email).await?)
    }
}

#[automock]
#[async_trait]
pub trait UsersService: Send + Sync {
    /// Validate and store a new, inactive user, grant the default read permission,
    /// issue an activation token and queue the welcome notice.
    async fn register_user(&self, user: NewUser) -> Result<UserRecord, UsersServiceError>;

    /// Redeem an activation token, mark its owner activated and revoke every
    /// activation token that owner holds.
    async fn activate_user(&self, token_plaintext: &str) -> Result<UserRecord, UsersServiceError>;

    /// Exchange e-mail and password for an authentication token.
    async fn authenticate(&self, credentials: Credentials) -> Result<IssuedToken, UsersServiceError>;

    async fn find_by_email(&self, email: &str) -> Result<UserRecord, UsersServiceError>;
}

pub fn validate_name(v: &mut Validator, name: &str) {
    v.check(!name.is_empty(), "name", "must be provided");
    v.check(
        name.len() <= NAME_MAX_BYTES,
        "name",
        "must not be more than 500 bytes long",
    );
}

pub fn validate_email(v: &mut Validator, email: &str) {
    v.check(!email.is_empty(), "email", "must be provided");
    v.check(is_email(email), "email", "must be a valid email address");
}

fn duplicate_email() -> UsersServiceError {
    UsersServiceError::Invalid(FieldErrors::from([(
        "email".to_string(),
        "a user with this email address already exists".to_string(),
    )]))
}

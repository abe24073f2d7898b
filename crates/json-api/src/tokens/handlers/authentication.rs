//! Create Authentication Token Handler

use std::{fmt, sync::Arc};

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use zeroize::Zeroizing;

use greenlight_app::{auth::IssuedToken, domain::users::data::Credentials};

use crate::{extensions::*, state::State, users::errors::into_status_error};

/// Authentication Request
#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct AuthenticationRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AuthenticationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationRequest")
            .field("email", &self.email)
            .field("password", &"**redacted**")
            .finish()
    }
}

impl From<AuthenticationRequest> for Credentials {
    fn from(request: AuthenticationRequest) -> Self {
        Credentials {
            email: request.email,
            password: Zeroizing::new(request.password),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AuthenticationToken {
    /// Bearer token for the `Authorization` header
    pub token: String,

    /// When the token stops being accepted
    pub expiry: String,
}

impl From<IssuedToken> for AuthenticationToken {
    fn from(issued: IssuedToken) -> Self {
        AuthenticationToken {
            token: issued.plaintext.expose().to_owned(),
            expiry: issued.expires_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AuthenticationTokenEnvelope {
    pub authentication_token: AuthenticationToken,
}

/// Create Authentication Token Handler
///
/// Exchanges an e-mail and password for a bearer token.
#[endpoint(
    tags("tokens"),
    summary = "Create Authentication Token",
    responses(
        (status_code = StatusCode::CREATED, description = "Token issued"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid credentials"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Validation failed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "tokens.authentication", skip(json, depot, res), err)]
pub(crate) async fn handler(
    json: JsonBody<AuthenticationRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<AuthenticationTokenEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let issued = state
        .app
        .users
        .authenticate(json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    info!(user_id = %issued.user_id, expires_at = %issued.expires_at, "issued authentication token");

    res.status_code(StatusCode::CREATED);

    Ok(Json(AuthenticationTokenEnvelope {
        authentication_token: issued.into(),
    }))
}

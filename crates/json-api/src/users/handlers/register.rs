//! Register User Handler

use std::{fmt, sync::Arc};

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use zeroize::Zeroizing;

use greenlight_app::domain::users::data::NewUser;

use crate::{
    extensions::*,
    state::State,
    users::{errors::into_status_error, models::UserEnvelope},
};

/// Register User Request
#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct RegisterUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for RegisterUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterUserRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"**redacted**")
            .finish()
    }
}

impl From<RegisterUserRequest> for NewUser {
    fn from(request: RegisterUserRequest) -> Self {
        NewUser {
            name: request.name,
            email: request.email,
            password: Zeroizing::new(request.password),
        }
    }
}

/// Register User Handler
///
/// Creates an inactive user and sends them an activation token.
#[endpoint(
    tags("users"),
    summary = "Register User",
    responses(
        (status_code = StatusCode::ACCEPTED, description = "User registered, activation pending"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Validation failed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "users.register", skip(json, depot, res), err)]
pub(crate) async fn handler(
    json: JsonBody<RegisterUserRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<UserEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let user = state
        .app
        .users
        .register_user(json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    info!(user_id = %user.id, "registered user");

    res.status_code(StatusCode::ACCEPTED);

    Ok(Json(UserEnvelope { user: user.into() }))
}

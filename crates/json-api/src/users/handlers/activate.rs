//! Activate User Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    extensions::*,
    state::State,
    users::{errors::into_status_error, models::UserEnvelope},
};

/// Activate User Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ActivateUserRequest {
    /// Activation token from the welcome notice
    pub token: String,
}

/// Activate User Handler
#[endpoint(
    tags("users"),
    summary = "Activate User",
    responses(
        (status_code = StatusCode::OK, description = "User activated"),
        (status_code = StatusCode::CONFLICT, description = "Edit conflict"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Invalid or expired token"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "users.activate", skip(json, depot), err)]
pub(crate) async fn handler(
    json: JsonBody<ActivateUserRequest>,
    depot: &mut Depot,
) -> Result<Json<UserEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let user = state
        .app
        .users
        .activate_user(&json.into_inner().token)
        .await
        .map_err(into_status_error)?;

    info!(user_id = %user.id, "activated user");

    Ok(Json(UserEnvelope { user: user.into() }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use greenlight_app::{
        domain::users::{MockUsersService, UsersServiceError},
        validator::FieldErrors,
    };

    use crate::test_helpers::{make_user, users_service};

    use super::*;

    const TOKEN: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    fn make_service(users: MockUsersService) -> Service {
        users_service(users, Router::with_path("v1/users/activated").put(handler))
    }

    #[tokio::test]
    async fn test_activate_user_success() -> TestResult {
        let mut users = MockUsersService::new();

        users
            .expect_activate_user()
            .once()
            .withf(|token| token == TOKEN)
            .return_once(|_| Ok(make_user(3, "carol@example.com", true)));

        let mut res = TestClient::put("http://example.com/v1/users/activated")
            .json(&json!({ "token": TOKEN }))
            .send(&make_service(users))
            .await;

        let body: UserEnvelope = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.user.activated, "response reflects the activation");

        Ok(())
    }

    #[tokio::test]
    async fn test_activate_user_bad_token_returns_422() {
        let mut users = MockUsersService::new();

        users.expect_activate_user().once().return_once(|_| {
            Err(UsersServiceError::Invalid(FieldErrors::from([(
                "token".to_owned(),
                "invalid or expired activation token".to_owned(),
            )])))
        });

        let res = TestClient::put("http://example.com/v1/users/activated")
            .json(&json!({ "token": TOKEN }))
            .send(&make_service(users))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));
    }

    #[tokio::test]
    async fn test_activate_user_conflict_returns_409() {
        let mut users = MockUsersService::new();

        users
            .expect_activate_user()
            .once()
            .return_once(|_| Err(UsersServiceError::EditConflict));

        let res = TestClient::put("http://example.com/v1/users/activated")
            .json(&json!({ "token": TOKEN }))
            .send(&make_service(users))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
    }
}

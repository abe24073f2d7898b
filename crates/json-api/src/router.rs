//! App Router

use std::sync::Arc;

use salvo::{Router, affix_state::inject, catch_panic::CatchPanic, trailing_slash::remove_slash};

use greenlight_app::permissions::PermissionCode;

use crate::{
    admission::{Require, admit},
    healthcheck, movies,
    observability::{metrics_handler, request_logging},
    state::State,
    tokens, users,
};

/// Every route the server answers, with `state` injected ahead of them.
pub(crate) fn app_router(state: Arc<State>) -> Router {
    Router::new()
        .hoop(CatchPanic::new())
        .hoop(request_logging)
        .hoop(remove_slash())
        .hoop(inject(state))
        .push(Router::with_path("debug/metrics").get(metrics_handler))
        .push(v1_router())
}

fn v1_router() -> Router {
    let read = || Require::permission(PermissionCode::MOVIES_READ);
    let write = || Require::permission(PermissionCode::MOVIES_WRITE);

    Router::with_path("v1")
        .hoop(admit)
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(
            Router::with_path("users")
                .post(users::register::handler)
                .push(Router::with_path("activated").put(users::activate::handler)),
        )
        .push(
            Router::with_path("tokens/authentication").post(tokens::authentication::handler),
        )
        .push(
            Router::with_path("movies")
                .push(Router::new().hoop(write()).post(movies::create::handler))
                .push(
                    Router::with_path("{id}")
                        .push(Router::new().hoop(read()).get(movies::get::handler))
                        .push(
                            Router::new()
                                .hoop(write())
                                .patch(movies::update::handler)
                                .delete(movies::delete::handler),
                        ),
                ),
        )
}

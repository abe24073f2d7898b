//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};

use greenlight_app::{
    admission::Admission,
    auth::{MockTokenService, TokenService},
    context::AppContext,
    domain::{
        movies::{
            MockMoviesService,
            records::{MovieId, MovieRecord, Runtime},
        },
        users::{
            MockUsersService,
            password::Password,
            records::{UserId, UserRecord},
        },
    },
    identity::{Identity, IdentityResolver},
    memory::MemoryStore,
    notifications::{Dispatcher, LogNotifier},
    permissions::PermissionsRepository,
    rate_limit::{ClientKey, RateLimiter, RateLimiterSettings},
    versioning::Version,
};

use crate::state::State;

pub(crate) const TEST_USER_ID: i64 = 1;

const TEST_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHRzYWx0$aGFzaGhhc2hoYXNoaGFzaGhhc2hoYXNoaGFzaA";

pub(crate) fn make_user(id: i64, email: &str, activated: bool) -> UserRecord {
    UserRecord {
        id: UserId::from_i64(id),
        created_at: Timestamp::UNIX_EPOCH,
        name: "Test User".to_owned(),
        email: email.to_owned(),
        password: Password::from_hash(TEST_PASSWORD_HASH.to_owned()),
        activated,
        version: Version::INITIAL,
    }
}

pub(crate) fn make_movie(id: i64) -> MovieRecord {
    MovieRecord {
        id: MovieId::from_i64(id),
        created_at: Timestamp::UNIX_EPOCH,
        title: "Moana".to_owned(),
        year: 2016,
        runtime: Runtime(107),
        genres: vec!["animation".to_owned(), "adventure".to_owned()],
        version: Version::INITIAL,
    }
}

/// Admit every request as an activated user, standing in for the admission hoops.
#[salvo::handler]
pub(crate) async fn inject_user(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let mut admission = Admission::new(ClientKey::new("203.0.113.1"), None);

    admission.identity =
        Identity::Authenticated(make_user(TEST_USER_ID, "writer@example.com", true));

    depot.inject(admission);

    ctrl.call_next(req, depot, res).await;
}

fn strict_users_mock() -> MockUsersService {
    let mut users = MockUsersService::new();

    users.expect_register_user().never();
    users.expect_activate_user().never();
    users.expect_authenticate().never();
    users.expect_find_by_email().never();

    users
}

fn strict_movies_mock() -> MockMoviesService {
    let mut movies = MockMoviesService::new();

    movies.expect_create_movie().never();
    movies.expect_get_movie().never();
    movies.expect_update_movie().never();
    movies.expect_delete_movie().never();

    movies
}

fn strict_tokens_mock() -> MockTokenService {
    let mut tokens = MockTokenService::new();

    tokens.expect_issue_token().never();
    tokens.expect_resolve_token().never();
    tokens.expect_revoke_scope().never();

    tokens
}

struct Services {
    users: MockUsersService,
    movies: MockMoviesService,
    tokens: MockTokenService,
    permissions: Arc<dyn PermissionsRepository>,
    limiter: RateLimiterSettings,
}

impl Services {
    fn strict() -> Self {
        Self {
            users: strict_users_mock(),
            movies: strict_movies_mock(),
            tokens: strict_tokens_mock(),
            permissions: Arc::new(MemoryStore::new()),
            limiter: RateLimiterSettings::default(),
        }
    }

    fn into_state(self) -> Arc<State> {
        let tokens: Arc<dyn TokenService> = Arc::new(self.tokens);

        let app = AppContext {
            users: Arc::new(self.users),
            movies: Arc::new(self.movies),
            identity: IdentityResolver::new(Arc::clone(&tokens)),
            tokens,
            permissions: self.permissions,
            rate_limiter: Arc::new(RateLimiter::new(self.limiter)),
            dispatcher: Dispatcher::new(Arc::new(LogNotifier)),
        };

        State::from_app_context(app, "test")
    }
}

pub(crate) fn strict_state() -> Arc<State> {
    Services::strict().into_state()
}

pub(crate) fn state_with_users(users: MockUsersService) -> Arc<State> {
    Services {
        users,
        ..Services::strict()
    }
    .into_state()
}

pub(crate) fn state_with_movies(movies: MockMoviesService) -> Arc<State> {
    Services {
        movies,
        ..Services::strict()
    }
    .into_state()
}

pub(crate) fn state_with_tokens(tokens: MockTokenService, limiter: RateLimiterSettings) -> Arc<State> {
    Services {
        tokens,
        limiter,
        ..Services::strict()
    }
    .into_state()
}

pub(crate) fn state_with_permissions(permissions: Arc<MemoryStore>) -> Arc<State> {
    Services {
        permissions,
        ..Services::strict()
    }
    .into_state()
}

pub(crate) fn users_service(users: MockUsersService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_users(users)))
            .push(route),
    )
}

pub(crate) fn movies_service(movies: MockMoviesService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_movies(movies)))
            .hoop(inject_user)
            .push(route),
    )
}

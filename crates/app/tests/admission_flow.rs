//! End-to-end admission over the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use greenlight_app::{
    admission::{Admission, AdmissionError, Requirement},
    auth::TokenPlaintext,
    context::{AppContext, Stores},
    domain::{
        movies::{
            MoviesServiceError,
            data::{MovieUpdate, NewMovie},
            records::Runtime,
        },
        users::data::{Credentials, NewUser},
    },
    memory::MemoryStore,
    notifications::{ActivationNotice, Notifier, NotifyError},
    permissions::{PermissionCode, PermissionsRepository},
    rate_limit::{ClientKey, RateLimiterSettings},
    versioning::Version,
};
use parking_lot::Mutex;
use testresult::TestResult;
use zeroize::Zeroizing;

#[derive(Debug, Default)]
struct Outbox(Mutex<Vec<ActivationNotice>>);

impl Outbox {
    fn last_token(&self) -> Option<TokenPlaintext> {
        self.0
            .lock()
            .last()
            .map(|notice| notice.activation_token.clone())
    }
}

#[async_trait]
impl Notifier for Outbox {
    async fn send_activation(&self, notice: &ActivationNotice) -> Result<(), NotifyError> {
        self.0.lock().push(notice.clone());

        Ok(())
    }
}

struct Harness {
    app: AppContext,
    store: Arc<MemoryStore>,
    outbox: Arc<Outbox>,
}

fn harness(limiter: RateLimiterSettings) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let outbox = Arc::new(Outbox::default());
    let app = AppContext::new(Stores::memory(&store), limiter, outbox.clone());

    Harness { app, store, outbox }
}

async fn admit(
    app: &AppContext,
    token: Option<&TokenPlaintext>,
    requirement: &Requirement,
) -> Result<Admission, AdmissionError> {
    let mut admission = Admission::new(
        ClientKey::new("198.51.100.1"),
        token.map(|token| format!("Bearer {}", token.expose())),
    );

    app.admission_pipeline().run(&mut admission).await?;
    app.guards(requirement).run(&mut admission).await?;

    Ok(admission)
}

#[tokio::test]
async fn registration_to_permitted_write() -> TestResult {
    let Harness { app, store, outbox } = harness(RateLimiterSettings {
        enabled: false,
        ..RateLimiterSettings::default()
    });

    let user = app
        .users
        .register_user(NewUser {
            name: "Faith Lehane".to_string(),
            email: "faith@example.com".to_string(),
            password: Zeroizing::new("pa55word1234".to_string()),
        })
        .await?;

    app.dispatcher.shutdown().await;

    let activation = outbox.last_token().ok_or("no activation notice sent")?;

    let token = app
        .users
        .authenticate(Credentials {
            email: "faith@example.com".to_string(),
            password: Zeroizing::new("pa55word1234".to_string()),
        })
        .await?
        .plaintext;

    let read = Requirement::Permission(PermissionCode::MOVIES_READ);
    let write = Requirement::Permission(PermissionCode::MOVIES_WRITE);

    let before_activation = admit(&app, Some(&token), &read).await;

    assert!(
        matches!(before_activation, Err(AdmissionError::ActivationRequired)),
        "got {before_activation:?}"
    );

    app.users.activate_user(activation.expose()).await?;

    let admission = admit(&app, Some(&token), &read).await?;

    assert_eq!(admission.identity.user_id(), Some(user.id));
    assert_eq!(admission.vary(), ["Authorization"]);

    let forbidden = admit(&app, Some(&token), &write).await;

    assert!(matches!(forbidden, Err(AdmissionError::Forbidden)), "got {forbidden:?}");

    store
        .grant_permissions(user.id, &[PermissionCode::MOVIES_WRITE])
        .await?;

    admit(&app, Some(&token), &write).await?;

    let anonymous = admit(&app, None, &write).await;

    assert!(
        matches!(anonymous, Err(AdmissionError::AuthenticationRequired)),
        "got {anonymous:?}"
    );

    Ok(())
}

#[tokio::test]
async fn rate_limiting_runs_before_authentication() -> TestResult {
    let Harness { app, .. } = harness(RateLimiterSettings {
        enabled: true,
        rate: 0.0,
        burst: 2,
    });

    for _ in 0..2 {
        admit(&app, None, &Requirement::Public).await?;
    }

    let limited = admit(&app, None, &Requirement::Public).await;

    assert!(matches!(limited, Err(AdmissionError::RateLimited)), "got {limited:?}");
    assert_eq!(app.rate_limiter.tracked_clients(), 1);

    Ok(())
}

#[tokio::test]
async fn concurrent_movie_edits_admit_one_writer() -> TestResult {
    let Harness { app, .. } = harness(RateLimiterSettings::default());

    let movie = app
        .movies
        .create_movie(NewMovie {
            title: "Moana".to_string(),
            year: 2016,
            runtime: Runtime(107),
            genres: vec!["animation".to_string(), "adventure".to_string()],
        })
        .await?;

    for _ in 0..2 {
        app.movies
            .update_movie(movie.id, MovieUpdate::default(), None)
            .await?;
    }

    let handles: Vec<_> = ["Moana (2016)", "Moana: Extended"]
        .into_iter()
        .map(|title| {
            let movies = Arc::clone(&app.movies);

            tokio::spawn(async move {
                movies
                    .update_movie(
                        movie.id,
                        MovieUpdate {
                            title: Some(title.to_string()),
                            ..MovieUpdate::default()
                        },
                        Some(Version::new(3)),
                    )
                    .await
            })
        })
        .collect();

    let mut versions = Vec::new();
    let mut conflicts = 0;

    for handle in handles {
        match handle.await? {
            Ok(updated) => versions.push(updated.version),
            Err(MoviesServiceError::EditConflict) => conflicts += 1,
            Err(other) => return Err(other.into()),
        }
    }

    assert_eq!(versions, [Version::new(4)]);
    assert_eq!(conflicts, 1);

    Ok(())
}

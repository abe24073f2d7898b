//! Request admission.
//!
//! Every inbound request is run through an ordered [`Pipeline`] of [`Stage`]s over a
//! mutable [`Admission`] context: rate limiting, then identity resolution, then the
//! guards its route requires. The first stage to refuse ends the run with a typed
//! [`AdmissionError`]; the context is left as far as it got, so anything it recorded
//! (such as response `Vary` headers) is still available to the caller.

mod guards;
mod stages;

use std::sync::Arc;

use async_trait::async_trait;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::{
    identity::{Identity, IdentityError},
    permissions::{PermissionCode, PermissionsRepository},
    rate_limit::ClientKey,
    store::StoreError,
};

pub use guards::{ActivatedGuard, AuthenticatedGuard, PermissionGuard};
pub use stages::{AuthenticateStage, RateLimitStage};

/// Per-request admission state.
#[derive(Debug, Clone)]
pub struct Admission {
    pub client_key: ClientKey,
    /// Raw `Authorization` header value, if the request carried one.
    pub authorization: Option<String>,
    pub identity: Identity,
    vary: SmallVec<[&'static str; 2]>,
}

impl Admission {
    #[must_use]
    pub fn new(client_key: ClientKey, authorization: Option<String>) -> Self {
        Self {
            client_key,
            authorization,
            identity: Identity::Anonymous,
            vary: SmallVec::new(),
        }
    }

    /// Record a request header the response depends on.
    pub fn add_vary(&mut self, header: &'static str) {
        if !self.vary.contains(&header) {
            self.vary.push(header);
        }
    }

    #[must_use]
    pub fn vary(&self) -> &[&'static str] {
        &self.vary
    }
}

#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error("rate limit exceeded")]
    RateLimited,

    #[error("invalid or missing authentication token")]
    InvalidCredentialFormat,

    #[error("invalid or missing authentication token")]
    InvalidCredential,

    #[error("you must be authenticated to access this resource")]
    AuthenticationRequired,

    #[error("your user account must be activated to access this resource")]
    ActivationRequired,

    #[error("your user account doesn't have the necessary permissions to access this resource")]
    Forbidden,

    #[error("admission could not be decided")]
    Transient(#[source] StoreError),
}

impl AdmissionError {
    /// Short label for metrics and logs.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::RateLimited => "rate_limited",
            Self::InvalidCredentialFormat => "invalid_credential_format",
            Self::InvalidCredential => "invalid_credential",
            Self::AuthenticationRequired => "authentication_required",
            Self::ActivationRequired => "activation_required",
            Self::Forbidden => "forbidden",
            Self::Transient(_) => "transient",
        }
    }
}

impl From<IdentityError> for AdmissionError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::InvalidCredentialFormat => Self::InvalidCredentialFormat,
            IdentityError::InvalidCredential => Self::InvalidCredential,
            IdentityError::Store(store) => Self::Transient(store),
        }
    }
}

/// One step of admission. A stage either lets the request continue, possibly after
/// updating the context, or refuses it.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, admission: &mut Admission) -> Result<(), AdmissionError>;
}

/// Ordered list of stages run front to back until one refuses.
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Stage>>,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn then(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Names of the stages in run order.
    pub fn stage_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|stage| stage.name())
    }

    /// Run every stage in order.
    ///
    /// # Errors
    ///
    /// Returns the refusal of the first stage that refuses. Later stages do not run.
    pub async fn run(&self, admission: &mut Admission) -> Result<(), AdmissionError> {
        for stage in &self.stages {
            if let Err(error) = stage.run(admission).await {
                debug!(
                    stage = stage.name(),
                    reason = error.reason(),
                    client = %admission.client_key,
                    "admission refused"
                );

                return Err(error);
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.stage_names()).finish()
    }
}

/// What a route demands of the caller's identity. Each level includes the ones
/// before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Public,
    Authenticated,
    Activated,
    Permission(PermissionCode),
}

impl Requirement {
    /// The guard stages enforcing this requirement, least specific first, so a
    /// refusal always names the first unmet level.
    #[must_use]
    pub fn guards(&self, permissions: &Arc<dyn PermissionsRepository>) -> Pipeline {
        match self {
            Self::Public => Pipeline::new(),
            Self::Authenticated => Pipeline::new().then(AuthenticatedGuard),
            Self::Activated => Pipeline::new().then(AuthenticatedGuard).then(ActivatedGuard),
            Self::Permission(code) => Pipeline::new()
                .then(AuthenticatedGuard)
                .then(ActivatedGuard)
                .then(PermissionGuard::new(Arc::clone(permissions), code.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use testresult::TestResult;

    use crate::memory::MemoryStore;

    use super::*;

    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl Stage for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn run(&self, _admission: &mut Admission) -> Result<(), AdmissionError> {
            self.0.fetch_add(1, Ordering::SeqCst);

            Ok(())
        }
    }

    struct Refuse;

    #[async_trait]
    impl Stage for Refuse {
        fn name(&self) -> &'static str {
            "refuse"
        }

        async fn run(&self, admission: &mut Admission) -> Result<(), AdmissionError> {
            admission.add_vary("X-Refused");

            Err(AdmissionError::Forbidden)
        }
    }

    fn admission() -> Admission {
        Admission::new(ClientKey::new("203.0.113.9"), None)
    }

    #[tokio::test]
    async fn first_refusal_short_circuits() {
        let runs = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .then(Counting(Arc::clone(&runs)))
            .then(Refuse)
            .then(Counting(Arc::clone(&runs)));
        let mut admission = admission();

        let result = pipeline.run(&mut admission).await;

        assert!(matches!(result, Err(AdmissionError::Forbidden)), "got {result:?}");
        assert_eq!(runs.load(Ordering::SeqCst), 1, "stages after the refusal never run");
        assert_eq!(admission.vary(), ["X-Refused"], "context survives refusal");
    }

    #[tokio::test]
    async fn empty_pipeline_admits() -> TestResult {
        Pipeline::new().run(&mut admission()).await?;

        Ok(())
    }

    #[test]
    fn vary_headers_are_recorded_once() {
        let mut admission = admission();

        admission.add_vary("Authorization");
        admission.add_vary("Authorization");

        assert_eq!(admission.vary(), ["Authorization"]);
    }

    #[test]
    fn requirements_expand_to_layered_guards() {
        let permissions: Arc<dyn PermissionsRepository> = Arc::new(MemoryStore::new());

        let names = |requirement: Requirement| -> Vec<&'static str> {
            requirement.guards(&permissions).stage_names().collect()
        };

        assert!(names(Requirement::Public).is_empty(), "public routes are unguarded");
        assert_eq!(names(Requirement::Authenticated), ["authenticated"]);
        assert_eq!(names(Requirement::Activated), ["authenticated", "activated"]);
        assert_eq!(
            names(Requirement::Permission(PermissionCode::MOVIES_WRITE)),
            ["authenticated", "activated", "permission"]
        );
    }
}

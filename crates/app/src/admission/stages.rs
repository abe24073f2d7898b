//! Rate limiting and identity stages.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    admission::{Admission, AdmissionError, Stage},
    identity::{IdentityResolver, VARY_HEADER},
    rate_limit::RateLimiter,
};

/// Spends one of the client's tokens or refuses with [`AdmissionError::RateLimited`].
#[derive(Debug, Clone)]
pub struct RateLimitStage {
    limiter: Arc<RateLimiter>,
}

impl RateLimitStage {
    #[must_use]
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self { limiter }
    }
}

#[async_trait]
impl Stage for RateLimitStage {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    async fn run(&self, admission: &mut Admission) -> Result<(), AdmissionError> {
        self.limiter
            .check(&admission.client_key)
            .map_err(|_limited| AdmissionError::RateLimited)
    }
}

/// Resolves the request credential into [`Admission::identity`].
#[derive(Clone)]
pub struct AuthenticateStage {
    resolver: IdentityResolver,
}

impl AuthenticateStage {
    #[must_use]
    pub fn new(resolver: IdentityResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Stage for AuthenticateStage {
    fn name(&self) -> &'static str {
        "authenticate"
    }

    async fn run(&self, admission: &mut Admission) -> Result<(), AdmissionError> {
        // Caches must key on the credential whatever the outcome.
        admission.add_vary(VARY_HEADER);

        admission.identity = self
            .resolver
            .resolve(admission.authorization.as_deref())
            .await?;

        Ok(())
    }
}

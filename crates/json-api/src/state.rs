//! State

use std::sync::Arc;

use greenlight_app::{admission::Pipeline, context::AppContext};

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
    /// Stages run for every request before routing.
    pub(crate) admission: Pipeline,
    /// Deployment environment reported by the healthcheck.
    pub(crate) environment: String,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext, environment: impl Into<String>) -> Self {
        let admission = app.admission_pipeline();

        Self {
            app,
            admission,
            environment: environment.into(),
        }
    }

    #[must_use]
    pub(crate) fn from_app_context(app: AppContext, environment: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(app, environment))
    }
}

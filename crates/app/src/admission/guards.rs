//! Identity guards.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    admission::{Admission, AdmissionError, Stage},
    domain::users::records::UserRecord,
    identity::Identity,
    permissions::{PermissionCode, PermissionsRepository},
};

fn require_user(identity: &Identity) -> Result<&UserRecord, AdmissionError> {
    identity.user().ok_or(AdmissionError::AuthenticationRequired)
}

fn require_activated(identity: &Identity) -> Result<&UserRecord, AdmissionError> {
    let user = require_user(identity)?;

    if user.activated {
        Ok(user)
    } else {
        Err(AdmissionError::ActivationRequired)
    }
}

/// Refuses anonymous callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticatedGuard;

#[async_trait]
impl Stage for AuthenticatedGuard {
    fn name(&self) -> &'static str {
        "authenticated"
    }

    async fn run(&self, admission: &mut Admission) -> Result<(), AdmissionError> {
        require_user(&admission.identity).map(|_user| ())
    }
}

/// Refuses callers whose account is not activated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivatedGuard;

#[async_trait]
impl Stage for ActivatedGuard {
    fn name(&self) -> &'static str {
        "activated"
    }

    async fn run(&self, admission: &mut Admission) -> Result<(), AdmissionError> {
        require_activated(&admission.identity).map(|_user| ())
    }
}

/// Refuses activated callers who do not hold a capability code. The permission set is
/// loaded fresh on every run.
#[derive(Clone)]
pub struct PermissionGuard {
    permissions: Arc<dyn PermissionsRepository>,
    code: PermissionCode,
}

impl PermissionGuard {
    #[must_use]
    pub fn new(permissions: Arc<dyn PermissionsRepository>, code: PermissionCode) -> Self {
        Self { permissions, code }
    }
}

#[async_trait]
impl Stage for PermissionGuard {
    fn name(&self) -> &'static str {
        "permission"
    }

    async fn run(&self, admission: &mut Admission) -> Result<(), AdmissionError> {
        let user = require_activated(&admission.identity)?;

        let held = self
            .permissions
            .permissions_for_user(user.id)
            .await
            .map_err(AdmissionError::Transient)?;

        if held.includes(&self.code) {
            Ok(())
        } else {
            Err(AdmissionError::Forbidden)
        }
    }
}

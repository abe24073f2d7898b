//! Per-route admission guards.

use std::sync::Arc;

use salvo::prelude::*;

use greenlight_app::{
    admission::{Admission, Requirement},
    permissions::PermissionCode,
};

use crate::state::State;

use super::errors::refuse;

/// Hoop refusing callers that do not meet `requirement`.
#[derive(Debug, Clone)]
pub(crate) struct Require {
    requirement: Requirement,
}

impl Require {
    #[must_use]
    pub(crate) fn new(requirement: Requirement) -> Self {
        Self { requirement }
    }

    #[must_use]
    pub(crate) fn permission(code: PermissionCode) -> Self {
        Self::new(Requirement::Permission(code))
    }
}

#[handler]
impl Require {
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        let guards = match depot.obtain::<Arc<State>>() {
            Ok(state) => state.app.guards(&self.requirement),
            Err(_error) => {
                res.render(StatusError::internal_server_error());

                return;
            }
        };

        let Ok(admission) = depot.obtain_mut::<Admission>() else {
            tracing::error!("guarded route reached without running admission");

            res.render(StatusError::internal_server_error());

            return;
        };

        let admitted = guards.run(admission).await;

        match admitted {
            Ok(()) => {
                ctrl.call_next(req, depot, res).await;
            }
            Err(error) => refuse(res, ctrl, error),
        }
    }
}

#[cfg(test)]
mod tests {
    use greenlight_app::{
        identity::Identity, memory::MemoryStore, permissions::PermissionsRepository,
        rate_limit::ClientKey,
    };
    use salvo::{affix_state::inject, test::TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{make_user, state_with_permissions};

    use super::*;

    #[derive(Debug, Clone)]
    struct AdmitAs(Identity);

    #[handler]
    impl AdmitAs {
        async fn handle(
            &self,
            req: &mut Request,
            depot: &mut Depot,
            res: &mut Response,
            ctrl: &mut FlowCtrl,
        ) {
            let mut admission = Admission::new(ClientKey::new("203.0.113.1"), None);

            admission.identity = self.0.clone();
            depot.inject(admission);

            ctrl.call_next(req, depot, res).await;
        }
    }

    #[handler]
    async fn ok(res: &mut Response) {
        res.render("ok");
    }

    fn make_service(permissions: Arc<MemoryStore>, identity: Identity, guard: Require) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(state_with_permissions(permissions)))
                .hoop(AdmitAs(identity))
                .push(Router::new().hoop(guard).get(ok)),
        )
    }

    async fn status_for(
        permissions: &Arc<MemoryStore>,
        identity: Identity,
        guard: Require,
    ) -> Option<StatusCode> {
        TestClient::get("http://example.com")
            .send(&make_service(Arc::clone(permissions), identity, guard))
            .await
            .status_code
    }

    #[tokio::test]
    async fn anonymous_callers_must_authenticate() {
        let permissions = Arc::new(MemoryStore::new());

        assert_eq!(
            status_for(
                &permissions,
                Identity::Anonymous,
                Require::new(Requirement::Activated)
            )
            .await,
            Some(StatusCode::UNAUTHORIZED)
        );
        assert_eq!(
            status_for(
                &permissions,
                Identity::Anonymous,
                Require::permission(PermissionCode::MOVIES_READ)
            )
            .await,
            Some(StatusCode::UNAUTHORIZED),
            "the least specific unmet requirement is reported"
        );
    }

    #[tokio::test]
    async fn inactive_users_are_forbidden() {
        let permissions = Arc::new(MemoryStore::new());
        let inactive = Identity::Authenticated(make_user(1, "new@example.com", false));

        assert_eq!(
            status_for(&permissions, inactive, Require::new(Requirement::Activated)).await,
            Some(StatusCode::FORBIDDEN)
        );
    }

    #[tokio::test]
    async fn permission_guard_checks_granted_codes() -> TestResult {
        let permissions = Arc::new(MemoryStore::new());
        let reader = make_user(2, "reader@example.com", true);

        permissions
            .grant_permissions(reader.id, &[PermissionCode::MOVIES_READ])
            .await?;

        let identity = Identity::Authenticated(reader);

        assert_eq!(
            status_for(
                &permissions,
                identity.clone(),
                Require::permission(PermissionCode::MOVIES_READ)
            )
            .await,
            Some(StatusCode::OK)
        );
        assert_eq!(
            status_for(
                &permissions,
                identity,
                Require::permission(PermissionCode::MOVIES_WRITE)
            )
            .await,
            Some(StatusCode::FORBIDDEN)
        );

        Ok(())
    }

    #[tokio::test]
    async fn missing_admission_is_a_server_error() {
        let service = Service::new(
            Router::new()
                .hoop(inject(state_with_permissions(Arc::new(MemoryStore::new()))))
                .push(Router::new().hoop(Require::new(Requirement::Activated)).get(ok)),
        );

        let res = TestClient::get("http://example.com").send(&service).await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));
    }
}

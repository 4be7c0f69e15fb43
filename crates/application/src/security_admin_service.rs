use std::sync::Arc;

use async_trait::async_trait;
use congregate_core::{AppResult, UserIdentity};
use congregate_domain::{AuditAction, Role, RoleAssignment, Scope};

use crate::audit::{AuditEvent, AuditRepository};
use crate::authorization_service::AuthorizationService;

/// Repository port for role-assignment administration.
#[async_trait]
pub trait RoleAssignmentAdminRepository: Send + Sync {
    /// Lists role assignments for a subject.
    async fn list_assignments_for_subject(&self, subject: &str) -> AppResult<Vec<RoleAssignment>>;

    /// Persists a new assignment for a subject.
    ///
    /// Granting an assignment the subject already holds is a conflict.
    async fn grant_assignment(&self, subject: &str, assignment: &RoleAssignment) -> AppResult<()>;

    /// Removes an assignment from a subject.
    ///
    /// Revoking an assignment the subject does not hold is a not-found.
    async fn revoke_assignment(&self, subject: &str, assignment: &RoleAssignment) -> AppResult<()>;
}

/// Application service for the account-administration flows that mutate
/// role assignments.
///
/// Every mutation validates the per-role scope invariants before
/// persisting, so the evaluator's malformed-assignment tolerance stays a
/// safety net rather than a code path normal data exercises.
#[derive(Clone)]
pub struct SecurityAdminService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn RoleAssignmentAdminRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl SecurityAdminService {
    /// Creates a new security administration service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn RoleAssignmentAdminRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            audit_repository,
        }
    }

    /// Returns a subject's assignments for administrative users.
    pub async fn list_assignments(
        &self,
        actor: &UserIdentity,
        subject: &str,
    ) -> AppResult<Vec<RoleAssignment>> {
        self.require_hq_admin(actor).await?;
        self.repository.list_assignments_for_subject(subject).await
    }

    /// Grants an assignment to a subject and emits an audit event.
    pub async fn grant_assignment(
        &self,
        actor: &UserIdentity,
        subject: &str,
        assignment: RoleAssignment,
    ) -> AppResult<()> {
        self.require_hq_admin(actor).await?;
        assignment.validate()?;

        self.repository.grant_assignment(subject, &assignment).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::SecurityAssignmentGranted,
                resource_type: "role_assignment".to_owned(),
                resource_id: format!("{subject}:{}", assignment.role().as_str()),
                detail: Some(format!(
                    "granted role '{}' ({}) to '{subject}'",
                    assignment.role().as_str(),
                    assignment.scope_summary()
                )),
            })
            .await
    }

    /// Revokes an assignment from a subject and emits an audit event.
    pub async fn revoke_assignment(
        &self,
        actor: &UserIdentity,
        subject: &str,
        assignment: RoleAssignment,
    ) -> AppResult<()> {
        self.require_hq_admin(actor).await?;

        self.repository
            .revoke_assignment(subject, &assignment)
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::SecurityAssignmentRevoked,
                resource_type: "role_assignment".to_owned(),
                resource_id: format!("{subject}:{}", assignment.role().as_str()),
                detail: Some(format!(
                    "revoked role '{}' ({}) from '{subject}'",
                    assignment.role().as_str(),
                    assignment.scope_summary()
                )),
            })
            .await
    }

    async fn require_hq_admin(&self, actor: &UserIdentity) -> AppResult<()> {
        self.authorization_service
            .require_role(actor.subject(), Role::HqAdmin, &Scope::global())
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use congregate_core::{AppError, AppResult, UserIdentity};
    use congregate_domain::{CenterId, RegularMemberGrant, Role, RoleAssignment};
    use tokio::sync::Mutex;

    use crate::audit::{AuditEvent, AuditRepository};
    use crate::authorization_service::{AuthorizationService, RoleAssignmentRepository};

    use super::{RoleAssignmentAdminRepository, SecurityAdminService};

    #[derive(Default)]
    struct FakeAuditRepository {
        events: Mutex<Vec<AuditEvent>>,
    }

    #[async_trait]
    impl AuditRepository for FakeAuditRepository {
        async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
            self.events.lock().await.push(event);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeAssignmentStore {
        map: Mutex<HashMap<String, Vec<RoleAssignment>>>,
    }

    #[async_trait]
    impl RoleAssignmentRepository for FakeAssignmentStore {
        async fn list_assignments_for_subject(
            &self,
            subject: &str,
        ) -> AppResult<Vec<RoleAssignment>> {
            Ok(self.map.lock().await.get(subject).cloned().unwrap_or_default())
        }
    }

    #[async_trait]
    impl RoleAssignmentAdminRepository for FakeAssignmentStore {
        async fn list_assignments_for_subject(
            &self,
            subject: &str,
        ) -> AppResult<Vec<RoleAssignment>> {
            Ok(self.map.lock().await.get(subject).cloned().unwrap_or_default())
        }

        async fn grant_assignment(
            &self,
            subject: &str,
            assignment: &RoleAssignment,
        ) -> AppResult<()> {
            self.map
                .lock()
                .await
                .entry(subject.to_owned())
                .or_default()
                .push(assignment.clone());
            Ok(())
        }

        async fn revoke_assignment(
            &self,
            subject: &str,
            assignment: &RoleAssignment,
        ) -> AppResult<()> {
            let mut map = self.map.lock().await;
            let assignments = map
                .get_mut(subject)
                .ok_or_else(|| AppError::NotFound("no assignments for subject".to_owned()))?;
            assignments.retain(|existing| existing != assignment);
            Ok(())
        }
    }

    fn admin_actor() -> UserIdentity {
        UserIdentity::new("root", "Root Admin", None)
    }

    fn service_with_admin() -> (SecurityAdminService, Arc<FakeAuditRepository>) {
        let store = Arc::new(FakeAssignmentStore {
            map: Mutex::new(HashMap::from([(
                "root".to_owned(),
                vec![RoleAssignment::hq_admin()],
            )])),
        });

        let authorization_service = AuthorizationService::new(
            store.clone() as Arc<dyn RoleAssignmentRepository>,
            RegularMemberGrant::Implicit,
        );
        let audit_repository = Arc::new(FakeAuditRepository::default());
        let service = SecurityAdminService::new(
            authorization_service,
            store as Arc<dyn RoleAssignmentAdminRepository>,
            audit_repository.clone(),
        );

        (service, audit_repository)
    }

    #[tokio::test]
    async fn grant_appends_audit_event() {
        let (service, audit_repository) = service_with_admin();

        let result = service
            .grant_assignment(
                &admin_actor(),
                "bob",
                RoleAssignment::center_admin(CenterId::new()),
            )
            .await;
        assert!(result.is_ok());

        let events = audit_repository.events.lock().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].resource_id, "bob:center_admin");
    }

    #[tokio::test]
    async fn grant_rejects_invalid_assignment() {
        let (service, audit_repository) = service_with_admin();

        let malformed =
            RoleAssignment::from_parts(Role::HqAdmin, Some(CenterId::new()), None, None);
        let result = service
            .grant_assignment(&admin_actor(), "bob", malformed)
            .await;
        assert!(result.is_err());

        let events = audit_repository.events.lock().await;
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn non_admin_actor_is_rejected() {
        let (service, _) = service_with_admin();
        let actor = UserIdentity::new("bob", "Bob", None);

        let result = service
            .grant_assignment(&actor, "carol", RoleAssignment::regular_member())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn revoke_appends_audit_event() {
        let (service, audit_repository) = service_with_admin();
        let center_id = CenterId::new();
        let assignment = RoleAssignment::center_admin(center_id);

        service
            .grant_assignment(&admin_actor(), "bob", assignment.clone())
            .await
            .ok();
        let result = service
            .revoke_assignment(&admin_actor(), "bob", assignment)
            .await;
        assert!(result.is_ok());

        let events = audit_repository.events.lock().await;
        assert_eq!(events.len(), 2);
    }
}

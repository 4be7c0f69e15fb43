use std::sync::Arc;

use async_trait::async_trait;
use congregate_core::{AppError, AppResult};
use congregate_domain::{
    RegularMemberGrant, Role, RoleAssignment, Scope, holds_role_or_hq_admin,
    holds_role_with_policy,
};

/// Repository port for role-assignment lookups.
#[async_trait]
pub trait RoleAssignmentRepository: Send + Sync {
    /// Lists role assignments for a subject.
    ///
    /// Unknown subjects yield an empty list rather than an error, so an
    /// authorization check cannot leak account existence.
    async fn list_assignments_for_subject(&self, subject: &str) -> AppResult<Vec<RoleAssignment>>;
}

/// Application service for scoped role checks.
///
/// Loads the caller's assignment snapshot and delegates the decision to
/// the pure evaluator; a negative decision surfaces as
/// [`AppError::Forbidden`] from the `require_*` variants.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn RoleAssignmentRepository>,
    regular_member_grant: RegularMemberGrant,
}

impl AuthorizationService {
    /// Creates a new authorization service from a repository implementation.
    #[must_use]
    pub fn new(
        repository: Arc<dyn RoleAssignmentRepository>,
        regular_member_grant: RegularMemberGrant,
    ) -> Self {
        Self {
            repository,
            regular_member_grant,
        }
    }

    /// Returns whether the subject holds `required` for `scope`.
    pub async fn has_role(&self, subject: &str, required: Role, scope: &Scope) -> AppResult<bool> {
        let assignments = self.repository.list_assignments_for_subject(subject).await?;

        Ok(holds_role_with_policy(
            &assignments,
            required,
            scope,
            self.regular_member_grant,
        ))
    }

    /// Ensures the subject holds `required` for `scope`.
    pub async fn require_role(&self, subject: &str, required: Role, scope: &Scope) -> AppResult<()> {
        if self.has_role(subject, required, scope).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "subject '{subject}' does not hold role '{}' for the requested scope",
            required.as_str()
        )))
    }

    /// Returns whether the subject is an HQ admin or holds `required` for
    /// `scope`.
    pub async fn has_role_or_hq_admin(
        &self,
        subject: &str,
        required: Role,
        scope: &Scope,
    ) -> AppResult<bool> {
        let assignments = self.repository.list_assignments_for_subject(subject).await?;

        Ok(holds_role_or_hq_admin(
            &assignments,
            required,
            scope,
            self.regular_member_grant,
        ))
    }

    /// Ensures the subject is an HQ admin or holds `required` for `scope`.
    pub async fn require_role_or_hq_admin(
        &self,
        subject: &str,
        required: Role,
        scope: &Scope,
    ) -> AppResult<()> {
        if self.has_role_or_hq_admin(subject, required, scope).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "subject '{subject}' does not hold role '{}' for the requested scope",
            required.as_str()
        )))
    }
}

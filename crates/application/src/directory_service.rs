use std::sync::Arc;

use async_trait::async_trait;
use congregate_core::{AppResult, UserIdentity};
use congregate_domain::{CenterId, ClusterId, Role, RoleAssignment, Scope, SmallGroupId};

use crate::authorization_service::AuthorizationService;

/// One subject's assignment, as returned by leadership listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectRoleAssignment {
    /// Subject holding the assignment.
    pub subject: String,
    /// The assignment itself.
    pub assignment: RoleAssignment,
}

/// Repository port for scope-filtered leadership lookups.
#[async_trait]
pub trait LeadershipDirectoryRepository: Send + Sync {
    /// Lists assignments scoped to one center.
    async fn list_assignments_for_center(
        &self,
        center_id: CenterId,
    ) -> AppResult<Vec<SubjectRoleAssignment>>;

    /// Lists assignments scoped to one cluster.
    async fn list_assignments_for_cluster(
        &self,
        cluster_id: ClusterId,
    ) -> AppResult<Vec<SubjectRoleAssignment>>;

    /// Lists assignments scoped to one small group.
    async fn list_assignments_for_small_group(
        &self,
        small_group_id: SmallGroupId,
    ) -> AppResult<Vec<SubjectRoleAssignment>>;
}

/// Application service for the scoped leadership directory.
///
/// Each listing is guarded by the role that administers the requested
/// level; HQ admins pass through the explicit composite check.
#[derive(Clone)]
pub struct DirectoryService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn LeadershipDirectoryRepository>,
}

impl DirectoryService {
    /// Creates a new directory service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn LeadershipDirectoryRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
        }
    }

    /// Returns the leadership roster of one center.
    pub async fn center_leadership(
        &self,
        actor: &UserIdentity,
        center_id: CenterId,
    ) -> AppResult<Vec<SubjectRoleAssignment>> {
        self.authorization_service
            .require_role_or_hq_admin(
                actor.subject(),
                Role::CenterAdmin,
                &Scope::center(center_id),
            )
            .await?;

        self.repository.list_assignments_for_center(center_id).await
    }

    /// Returns the leadership roster of one cluster.
    pub async fn cluster_leadership(
        &self,
        actor: &UserIdentity,
        cluster_id: ClusterId,
    ) -> AppResult<Vec<SubjectRoleAssignment>> {
        self.authorization_service
            .require_role_or_hq_admin(
                actor.subject(),
                Role::ClusterLeader,
                &Scope::cluster(cluster_id),
            )
            .await?;

        self.repository
            .list_assignments_for_cluster(cluster_id)
            .await
    }

    /// Returns the leadership roster of one small group.
    pub async fn small_group_leadership(
        &self,
        actor: &UserIdentity,
        small_group_id: SmallGroupId,
    ) -> AppResult<Vec<SubjectRoleAssignment>> {
        self.authorization_service
            .require_role_or_hq_admin(
                actor.subject(),
                Role::SmallGroupLeader,
                &Scope::small_group(small_group_id),
            )
            .await?;

        self.repository
            .list_assignments_for_small_group(small_group_id)
            .await
    }
}

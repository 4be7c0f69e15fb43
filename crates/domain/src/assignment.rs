use congregate_core::{AppError, AppResult};

use crate::hierarchy::{CenterId, ClusterId, SmallGroupId};
use crate::role::Role;

/// A (role, optional scope) tuple attached to a user account.
///
/// The shape is deliberately flat: every scope field is optional
/// regardless of the role, so rows hydrated from storage can violate the
/// per-role scope invariants. The evaluator tolerates such assignments by
/// treating them as non-matching; [`RoleAssignment::validate`] enforces
/// the invariants where assignments are created or mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    role: Role,
    center_id: Option<CenterId>,
    cluster_id: Option<ClusterId>,
    small_group_id: Option<SmallGroupId>,
}

impl RoleAssignment {
    /// Creates a global HQ administrator assignment.
    #[must_use]
    pub fn hq_admin() -> Self {
        Self::from_parts(Role::HqAdmin, None, None, None)
    }

    /// Creates a center administrator assignment for one center.
    #[must_use]
    pub fn center_admin(center_id: CenterId) -> Self {
        Self::from_parts(Role::CenterAdmin, Some(center_id), None, None)
    }

    /// Creates a cluster leader assignment for one cluster.
    #[must_use]
    pub fn cluster_leader(cluster_id: ClusterId) -> Self {
        Self::from_parts(Role::ClusterLeader, None, Some(cluster_id), None)
    }

    /// Creates a small-group leader assignment for one small group.
    #[must_use]
    pub fn small_group_leader(small_group_id: SmallGroupId) -> Self {
        Self::from_parts(Role::SmallGroupLeader, None, None, Some(small_group_id))
    }

    /// Creates a member administrator assignment scoped to a center.
    #[must_use]
    pub fn member_admin_for_center(center_id: CenterId) -> Self {
        Self::from_parts(Role::MemberAdmin, Some(center_id), None, None)
    }

    /// Creates a member administrator assignment scoped to a cluster.
    #[must_use]
    pub fn member_admin_for_cluster(cluster_id: ClusterId) -> Self {
        Self::from_parts(Role::MemberAdmin, None, Some(cluster_id), None)
    }

    /// Creates a member administrator assignment scoped to a small group.
    #[must_use]
    pub fn member_admin_for_small_group(small_group_id: SmallGroupId) -> Self {
        Self::from_parts(Role::MemberAdmin, None, None, Some(small_group_id))
    }

    /// Creates the baseline membership assignment.
    #[must_use]
    pub fn regular_member() -> Self {
        Self::from_parts(Role::RegularMember, None, None, None)
    }

    /// Assembles an assignment from stored parts without validation.
    ///
    /// Used when hydrating persisted rows; the evaluator treats any
    /// invariant violation as a non-match.
    #[must_use]
    pub fn from_parts(
        role: Role,
        center_id: Option<CenterId>,
        cluster_id: Option<ClusterId>,
        small_group_id: Option<SmallGroupId>,
    ) -> Self {
        Self {
            role,
            center_id,
            cluster_id,
            small_group_id,
        }
    }

    /// Returns the assigned role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the center scope, if set.
    #[must_use]
    pub fn center_id(&self) -> Option<CenterId> {
        self.center_id
    }

    /// Returns the cluster scope, if set.
    #[must_use]
    pub fn cluster_id(&self) -> Option<ClusterId> {
        self.cluster_id
    }

    /// Returns the small-group scope, if set.
    #[must_use]
    pub fn small_group_id(&self) -> Option<SmallGroupId> {
        self.small_group_id
    }

    /// Returns whether no scope field is set.
    #[must_use]
    pub fn is_unscoped(&self) -> bool {
        self.center_id.is_none() && self.cluster_id.is_none() && self.small_group_id.is_none()
    }

    /// Checks the per-role scope invariants.
    ///
    /// Global roles must carry no scope ids; each scoped role must carry
    /// exactly the id relevant to it. Administration flows call this
    /// before persisting, so stored assignments normally satisfy it.
    pub fn validate(&self) -> AppResult<()> {
        let valid = match self.role {
            Role::HqAdmin | Role::RegularMember => self.is_unscoped(),
            Role::CenterAdmin => {
                self.center_id.is_some()
                    && self.cluster_id.is_none()
                    && self.small_group_id.is_none()
            }
            Role::ClusterLeader => {
                self.center_id.is_none()
                    && self.cluster_id.is_some()
                    && self.small_group_id.is_none()
            }
            Role::SmallGroupLeader => {
                self.center_id.is_none()
                    && self.cluster_id.is_none()
                    && self.small_group_id.is_some()
            }
            Role::MemberAdmin => {
                let scope_count = usize::from(self.center_id.is_some())
                    + usize::from(self.cluster_id.is_some())
                    + usize::from(self.small_group_id.is_some());
                scope_count == 1
            }
        };

        if valid {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "role '{}' does not allow scope '{}'",
                self.role.as_str(),
                self.scope_summary()
            )))
        }
    }

    /// Returns a short human-readable description of the scope fields.
    #[must_use]
    pub fn scope_summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(center_id) = self.center_id {
            parts.push(format!("center {center_id}"));
        }
        if let Some(cluster_id) = self.cluster_id {
            parts.push(format!("cluster {cluster_id}"));
        }
        if let Some(small_group_id) = self.small_group_id {
            parts.push(format!("small group {small_group_id}"));
        }

        if parts.is_empty() {
            "global".to_owned()
        } else {
            parts.join(", ")
        }
    }
}

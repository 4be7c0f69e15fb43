//! The hierarchical permission evaluator.
//!
//! A pure decision over an already-loaded assignment set: no I/O, no
//! side effects, and no role-hierarchy inference. Call sites that want
//! "HQ admins can do everything" combine checks through
//! [`holds_role_or_hq_admin`] instead of the evaluator guessing.

use crate::assignment::RoleAssignment;
use crate::hierarchy::{CenterId, ClusterId, SmallGroupId};
use crate::role::Role;

/// The hierarchy identifiers a permission check is evaluated against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scope {
    /// Target center, if the operation is center-scoped.
    pub center_id: Option<CenterId>,
    /// Target cluster, if the operation is cluster-scoped.
    pub cluster_id: Option<ClusterId>,
    /// Target small group, if the operation is group-scoped.
    pub small_group_id: Option<SmallGroupId>,
}

impl Scope {
    /// Returns the empty scope used for global checks.
    #[must_use]
    pub fn global() -> Self {
        Self::default()
    }

    /// Returns a scope targeting one center.
    #[must_use]
    pub fn center(center_id: CenterId) -> Self {
        Self {
            center_id: Some(center_id),
            ..Self::default()
        }
    }

    /// Returns a scope targeting one cluster.
    #[must_use]
    pub fn cluster(cluster_id: ClusterId) -> Self {
        Self {
            cluster_id: Some(cluster_id),
            ..Self::default()
        }
    }

    /// Returns a scope targeting one small group.
    #[must_use]
    pub fn small_group(small_group_id: SmallGroupId) -> Self {
        Self {
            small_group_id: Some(small_group_id),
            ..Self::default()
        }
    }
}

/// Policy for `RegularMember` checks.
///
/// The source system grants every caller a `RegularMember` check
/// unconditionally. That behavior is preserved as the default; deployments
/// that consider it over-permissive can require an explicit assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegularMemberGrant {
    /// Any caller passes a `RegularMember` check, assignments or not.
    #[default]
    Implicit,
    /// A `RegularMember` check passes only with a matching assignment.
    Explicit,
}

/// Returns whether the assignment set satisfies `required` for `scope`
/// under the default [`RegularMemberGrant::Implicit`] policy.
#[must_use]
pub fn holds_role(assignments: &[RoleAssignment], required: Role, scope: &Scope) -> bool {
    holds_role_with_policy(assignments, required, scope, RegularMemberGrant::Implicit)
}

/// Returns whether the assignment set satisfies `required` for `scope`.
///
/// Evaluation short-circuits on the first matching assignment. An empty
/// set never matches (except `RegularMember` under the implicit policy),
/// and assignments violating the per-role scope invariants fail closed:
/// they simply never match.
#[must_use]
pub fn holds_role_with_policy(
    assignments: &[RoleAssignment],
    required: Role,
    scope: &Scope,
    regular_member_grant: RegularMemberGrant,
) -> bool {
    if required == Role::RegularMember && regular_member_grant == RegularMemberGrant::Implicit {
        return true;
    }

    assignments
        .iter()
        .any(|assignment| assignment_matches(assignment, required, scope))
}

/// Composite check: unscoped `HqAdmin` OR `required` for `scope`.
///
/// Call sites that give HQ admins blanket access use this helper; the
/// per-role matching itself never infers hierarchy.
#[must_use]
pub fn holds_role_or_hq_admin(
    assignments: &[RoleAssignment],
    required: Role,
    scope: &Scope,
    regular_member_grant: RegularMemberGrant,
) -> bool {
    holds_role_with_policy(
        assignments,
        Role::HqAdmin,
        &Scope::global(),
        regular_member_grant,
    ) || holds_role_with_policy(assignments, required, scope, regular_member_grant)
}

fn assignment_matches(assignment: &RoleAssignment, required: Role, scope: &Scope) -> bool {
    if assignment.role() != required {
        return false;
    }

    match required {
        Role::HqAdmin => assignment.is_unscoped(),
        Role::CenterAdmin => scope_id_matches(scope.center_id, assignment.center_id()),
        Role::ClusterLeader => scope_id_matches(scope.cluster_id, assignment.cluster_id()),
        Role::SmallGroupLeader => {
            scope_id_matches(scope.small_group_id, assignment.small_group_id())
        }
        Role::MemberAdmin => member_admin_matches(assignment, scope),
        Role::RegularMember => true,
    }
}

/// A scoped role matches only when the check provides the relevant id and
/// the assignment carries the same id.
fn scope_id_matches<T: PartialEq>(requested: Option<T>, assigned: Option<T>) -> bool {
    match (requested, assigned) {
        (Some(requested), Some(assigned)) => requested == assigned,
        _ => false,
    }
}

/// `MemberAdmin` sub-cases in priority order: center, then cluster, then
/// small group. A center-level assignment must not leak into cluster or
/// group checks, so the broader levels also require the narrower
/// assignment fields to be absent.
fn member_admin_matches(assignment: &RoleAssignment, scope: &Scope) -> bool {
    if scope_id_matches(scope.center_id, assignment.center_id())
        && assignment.cluster_id().is_none()
        && assignment.small_group_id().is_none()
    {
        return true;
    }

    if scope_id_matches(scope.cluster_id, assignment.cluster_id())
        && assignment.small_group_id().is_none()
    {
        return true;
    }

    scope_id_matches(scope.small_group_id, assignment.small_group_id())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use uuid::Uuid;

    use super::{RegularMemberGrant, Scope, holds_role, holds_role_or_hq_admin};
    use crate::assignment::RoleAssignment;
    use crate::hierarchy::{CenterId, ClusterId, SmallGroupId};
    use crate::role::Role;

    #[test]
    fn empty_assignment_set_never_matches_admin_roles() {
        for role in Role::all() {
            if *role == Role::RegularMember {
                continue;
            }
            assert!(!holds_role(&[], *role, &Scope::global()));
        }
    }

    #[test]
    fn hq_admin_matches_only_unscoped_assignment() {
        let unscoped = vec![RoleAssignment::hq_admin()];
        assert!(holds_role(&unscoped, Role::HqAdmin, &Scope::global()));

        let scoped = vec![RoleAssignment::from_parts(
            Role::HqAdmin,
            Some(CenterId::new()),
            None,
            None,
        )];
        assert!(!holds_role(&scoped, Role::HqAdmin, &Scope::global()));
    }

    #[test]
    fn hq_admin_does_not_imply_center_admin() {
        let assignments = vec![RoleAssignment::hq_admin()];
        let scope = Scope::center(CenterId::new());

        assert!(holds_role(&assignments, Role::HqAdmin, &Scope::global()));
        assert!(!holds_role(&assignments, Role::CenterAdmin, &scope));
    }

    #[test]
    fn center_admin_is_isolated_per_center() {
        let own_center = CenterId::new();
        let other_center = CenterId::new();
        let assignments = vec![RoleAssignment::center_admin(own_center)];

        assert!(holds_role(
            &assignments,
            Role::CenterAdmin,
            &Scope::center(own_center)
        ));
        assert!(!holds_role(
            &assignments,
            Role::CenterAdmin,
            &Scope::center(other_center)
        ));
        assert!(!holds_role(
            &assignments,
            Role::CenterAdmin,
            &Scope::global()
        ));
        assert!(!holds_role(&assignments, Role::HqAdmin, &Scope::global()));
    }

    #[test]
    fn cluster_leader_is_isolated_per_cluster() {
        let own_cluster = ClusterId::new();
        let assignments = vec![RoleAssignment::cluster_leader(own_cluster)];

        assert!(holds_role(
            &assignments,
            Role::ClusterLeader,
            &Scope::cluster(own_cluster)
        ));
        assert!(!holds_role(
            &assignments,
            Role::ClusterLeader,
            &Scope::cluster(ClusterId::new())
        ));
    }

    #[test]
    fn small_group_leader_is_isolated_per_group() {
        let own_group = SmallGroupId::new();
        let assignments = vec![RoleAssignment::small_group_leader(own_group)];

        assert!(holds_role(
            &assignments,
            Role::SmallGroupLeader,
            &Scope::small_group(own_group)
        ));
        assert!(!holds_role(
            &assignments,
            Role::SmallGroupLeader,
            &Scope::small_group(SmallGroupId::new())
        ));
    }

    #[test]
    fn center_member_admin_does_not_cover_narrower_scopes() {
        let center_id = CenterId::new();
        let assignments = vec![RoleAssignment::member_admin_for_center(center_id)];

        assert!(holds_role(
            &assignments,
            Role::MemberAdmin,
            &Scope::center(center_id)
        ));
        assert!(!holds_role(
            &assignments,
            Role::MemberAdmin,
            &Scope::cluster(ClusterId::new())
        ));
        assert!(!holds_role(
            &assignments,
            Role::MemberAdmin,
            &Scope::small_group(SmallGroupId::new())
        ));
    }

    #[test]
    fn cluster_and_group_member_admins_match_their_level() {
        let cluster_id = ClusterId::new();
        let small_group_id = SmallGroupId::new();

        let cluster_admin = vec![RoleAssignment::member_admin_for_cluster(cluster_id)];
        assert!(holds_role(
            &cluster_admin,
            Role::MemberAdmin,
            &Scope::cluster(cluster_id)
        ));
        assert!(!holds_role(
            &cluster_admin,
            Role::MemberAdmin,
            &Scope::small_group(small_group_id)
        ));

        let group_admin = vec![RoleAssignment::member_admin_for_small_group(small_group_id)];
        assert!(holds_role(
            &group_admin,
            Role::MemberAdmin,
            &Scope::small_group(small_group_id)
        ));
        assert!(!holds_role(
            &group_admin,
            Role::MemberAdmin,
            &Scope::cluster(cluster_id)
        ));
    }

    #[test]
    fn regular_member_is_granted_implicitly_by_default() {
        assert!(holds_role(&[], Role::RegularMember, &Scope::global()));

        let unrelated = vec![RoleAssignment::center_admin(CenterId::new())];
        assert!(holds_role(
            &unrelated,
            Role::RegularMember,
            &Scope::center(CenterId::new())
        ));
    }

    #[test]
    fn explicit_policy_requires_a_regular_member_assignment() {
        use super::holds_role_with_policy;

        assert!(!holds_role_with_policy(
            &[],
            Role::RegularMember,
            &Scope::global(),
            RegularMemberGrant::Explicit
        ));

        let assignments = vec![RoleAssignment::regular_member()];
        assert!(holds_role_with_policy(
            &assignments,
            Role::RegularMember,
            &Scope::global(),
            RegularMemberGrant::Explicit
        ));
    }

    #[test]
    fn composite_check_lets_hq_admin_through_scoped_operations() {
        let hq = vec![RoleAssignment::hq_admin()];
        let scope = Scope::center(CenterId::new());

        assert!(holds_role_or_hq_admin(
            &hq,
            Role::CenterAdmin,
            &scope,
            RegularMemberGrant::Implicit
        ));
        assert!(!holds_role_or_hq_admin(
            &[],
            Role::CenterAdmin,
            &scope,
            RegularMemberGrant::Implicit
        ));
    }

    #[test]
    fn malformed_scoped_assignment_fails_closed() {
        // A center admin row that lost its center id can never match.
        let assignments = vec![RoleAssignment::from_parts(
            Role::CenterAdmin,
            None,
            None,
            None,
        )];
        assert!(!holds_role(
            &assignments,
            Role::CenterAdmin,
            &Scope::center(CenterId::new())
        ));
    }

    fn arbitrary_id() -> impl Strategy<Value = Uuid> {
        prop::array::uniform16(any::<u8>()).prop_map(Uuid::from_bytes)
    }

    fn arbitrary_assignment() -> impl Strategy<Value = RoleAssignment> {
        (
            prop::sample::select(Role::all()),
            prop::option::of(arbitrary_id()),
            prop::option::of(arbitrary_id()),
            prop::option::of(arbitrary_id()),
        )
            .prop_map(|(role, center, cluster, small_group)| {
                RoleAssignment::from_parts(
                    role,
                    center.map(CenterId::from_uuid),
                    cluster.map(ClusterId::from_uuid),
                    small_group.map(SmallGroupId::from_uuid),
                )
            })
    }

    fn arbitrary_scope() -> impl Strategy<Value = Scope> {
        (
            prop::option::of(arbitrary_id()),
            prop::option::of(arbitrary_id()),
            prop::option::of(arbitrary_id()),
        )
            .prop_map(|(center, cluster, small_group)| Scope {
                center_id: center.map(CenterId::from_uuid),
                cluster_id: cluster.map(ClusterId::from_uuid),
                small_group_id: small_group.map(SmallGroupId::from_uuid),
            })
    }

    proptest! {
        #[test]
        fn evaluation_is_deterministic(
            assignments in prop::collection::vec(arbitrary_assignment(), 0..8),
            role in prop::sample::select(Role::all()),
            scope in arbitrary_scope(),
        ) {
            let first = holds_role(&assignments, role, &scope);
            let second = holds_role(&assignments, role, &scope);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn absent_role_never_matches(
            assignments in prop::collection::vec(arbitrary_assignment(), 0..8),
            role in prop::sample::select(Role::all()),
            scope in arbitrary_scope(),
        ) {
            prop_assume!(role != Role::RegularMember);
            let filtered: Vec<RoleAssignment> = assignments
                .into_iter()
                .filter(|assignment| assignment.role() != role)
                .collect();
            prop_assert!(!holds_role(&filtered, role, &scope));
        }

        #[test]
        fn assignment_order_does_not_change_the_outcome(
            assignments in prop::collection::vec(arbitrary_assignment(), 0..8),
            role in prop::sample::select(Role::all()),
            scope in arbitrary_scope(),
        ) {
            let mut reversed = assignments.clone();
            reversed.reverse();
            prop_assert_eq!(
                holds_role(&assignments, role, &scope),
                holds_role(&reversed, role, &scope)
            );
        }
    }
}

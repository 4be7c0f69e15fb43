use std::str::FromStr;

use congregate_core::AppError;
use serde::{Deserialize, Serialize};

/// Roles recognized by the permission evaluator.
///
/// Each scoped role is authoritative for exactly one level of the
/// HQ → center → cluster → small-group hierarchy. There is no implied
/// hierarchy between roles: holding `HqAdmin` does not satisfy a
/// `CenterAdmin` check unless the caller tests for it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Global administrator, never scoped.
    HqAdmin,
    /// Administrator of one center.
    CenterAdmin,
    /// Leader of one cluster.
    ClusterLeader,
    /// Leader of one small group.
    SmallGroupLeader,
    /// Member-records administrator for exactly one hierarchy level.
    MemberAdmin,
    /// Baseline role held by every congregation member.
    RegularMember,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HqAdmin => "hq_admin",
            Self::CenterAdmin => "center_admin",
            Self::ClusterLeader => "cluster_leader",
            Self::SmallGroupLeader => "small_group_leader",
            Self::MemberAdmin => "member_admin",
            Self::RegularMember => "regular_member",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[
            Role::HqAdmin,
            Role::CenterAdmin,
            Role::ClusterLeader,
            Role::SmallGroupLeader,
            Role::MemberAdmin,
            Role::RegularMember,
        ];

        ALL
    }

    /// Parses a transport value into a role.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "hq_admin" => Ok(Self::HqAdmin),
            "center_admin" => Ok(Self::CenterAdmin),
            "cluster_leader" => Ok(Self::ClusterLeader),
            "small_group_leader" => Ok(Self::SmallGroupLeader),
            "member_admin" => Ok(Self::MemberAdmin),
            "regular_member" => Ok(Self::RegularMember),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::Role;

    #[test]
    fn role_roundtrip_storage_value() {
        for role in Role::all() {
            let restored = Role::from_str(role.as_str());
            assert!(restored.is_ok());
            assert_eq!(restored.unwrap_or(Role::RegularMember), *role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(Role::from_str("flyer_admin").is_err());
        assert!(Role::from_str("HQ_ADMIN").is_err());
        assert!(Role::from_str("").is_err());
    }
}

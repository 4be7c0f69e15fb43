use congregate_application::SubjectRoleAssignment;
use congregate_core::UserIdentity;
use congregate_domain::RoleAssignment;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Incoming payload for password login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login outcome payload.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: String,
}

/// API representation of the authenticated user.
#[derive(Debug, Serialize)]
pub struct UserIdentityResponse {
    pub subject: String,
    pub display_name: String,
    pub email: Option<String>,
}

impl From<UserIdentity> for UserIdentityResponse {
    fn from(identity: UserIdentity) -> Self {
        Self {
            subject: identity.subject().to_owned(),
            display_name: identity.display_name().to_owned(),
            email: identity.email().map(ToOwned::to_owned),
        }
    }
}

/// Incoming payload for granting a role assignment.
#[derive(Debug, Deserialize)]
pub struct GrantAssignmentRequest {
    pub subject: String,
    pub role: String,
    pub center_id: Option<Uuid>,
    pub cluster_id: Option<Uuid>,
    pub small_group_id: Option<Uuid>,
}

/// Incoming payload for revoking a role assignment.
#[derive(Debug, Deserialize)]
pub struct RevokeAssignmentRequest {
    pub subject: String,
    pub role: String,
    pub center_id: Option<Uuid>,
    pub cluster_id: Option<Uuid>,
    pub small_group_id: Option<Uuid>,
}

/// API representation of a role assignment.
#[derive(Debug, Serialize)]
pub struct RoleAssignmentResponse {
    pub role: String,
    pub center_id: Option<String>,
    pub cluster_id: Option<String>,
    pub small_group_id: Option<String>,
}

impl From<RoleAssignment> for RoleAssignmentResponse {
    fn from(assignment: RoleAssignment) -> Self {
        Self {
            role: assignment.role().as_str().to_owned(),
            center_id: assignment.center_id().map(|id| id.to_string()),
            cluster_id: assignment.cluster_id().map(|id| id.to_string()),
            small_group_id: assignment.small_group_id().map(|id| id.to_string()),
        }
    }
}

/// API representation of one subject's assignment in a leadership roster.
#[derive(Debug, Serialize)]
pub struct SubjectRoleAssignmentResponse {
    pub subject: String,
    pub role: String,
    pub center_id: Option<String>,
    pub cluster_id: Option<String>,
    pub small_group_id: Option<String>,
}

impl From<SubjectRoleAssignment> for SubjectRoleAssignmentResponse {
    fn from(value: SubjectRoleAssignment) -> Self {
        Self {
            subject: value.subject,
            role: value.assignment.role().as_str().to_owned(),
            center_id: value.assignment.center_id().map(|id| id.to_string()),
            cluster_id: value.assignment.cluster_id().map(|id| id.to_string()),
            small_group_id: value.assignment.small_group_id().map(|id| id.to_string()),
        }
    }
}

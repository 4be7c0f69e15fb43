use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use congregate_core::UserIdentity;
use congregate_domain::{CenterId, ClusterId, Role, RoleAssignment, SmallGroupId};
use uuid::Uuid;

use crate::dto::{GrantAssignmentRequest, RevokeAssignmentRequest, RoleAssignmentResponse};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn list_assignments_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(subject): Path<String>,
) -> ApiResult<Json<Vec<RoleAssignmentResponse>>> {
    let assignments = state
        .security_admin_service
        .list_assignments(&user, subject.as_str())
        .await?
        .into_iter()
        .map(RoleAssignmentResponse::from)
        .collect();

    Ok(Json(assignments))
}

pub async fn grant_assignment_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<GrantAssignmentRequest>,
) -> ApiResult<StatusCode> {
    let assignment = assignment_from_parts(
        payload.role.as_str(),
        payload.center_id,
        payload.cluster_id,
        payload.small_group_id,
    )?;

    state
        .security_admin_service
        .grant_assignment(&user, payload.subject.as_str(), assignment)
        .await?;

    Ok(StatusCode::CREATED)
}

pub async fn revoke_assignment_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<RevokeAssignmentRequest>,
) -> ApiResult<StatusCode> {
    let assignment = assignment_from_parts(
        payload.role.as_str(),
        payload.center_id,
        payload.cluster_id,
        payload.small_group_id,
    )?;

    state
        .security_admin_service
        .revoke_assignment(&user, payload.subject.as_str(), assignment)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

fn assignment_from_parts(
    role: &str,
    center_id: Option<Uuid>,
    cluster_id: Option<Uuid>,
    small_group_id: Option<Uuid>,
) -> Result<RoleAssignment, ApiError> {
    let role = Role::from_transport(role)?;

    Ok(RoleAssignment::from_parts(
        role,
        center_id.map(CenterId::from_uuid),
        cluster_id.map(ClusterId::from_uuid),
        small_group_id.map(SmallGroupId::from_uuid),
    ))
}

#[cfg(test)]
mod tests {
    use congregate_domain::Role;

    use super::assignment_from_parts;

    #[test]
    fn transport_role_is_parsed() {
        let assignment = assignment_from_parts("hq_admin", None, None, None);
        assert!(assignment.is_ok());
        assert_eq!(
            assignment.ok().map(|value| value.role()),
            Some(Role::HqAdmin)
        );
    }

    #[test]
    fn unknown_transport_role_is_rejected() {
        assert!(assignment_from_parts("superuser", None, None, None).is_err());
    }
}

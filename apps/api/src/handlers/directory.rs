use axum::Json;
use axum::extract::{Extension, Path, State};
use congregate_core::UserIdentity;
use congregate_domain::{CenterId, ClusterId, SmallGroupId};
use uuid::Uuid;

use crate::dto::SubjectRoleAssignmentResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn center_leadership_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(center_id): Path<Uuid>,
) -> ApiResult<Json<Vec<SubjectRoleAssignmentResponse>>> {
    let roster = state
        .directory_service
        .center_leadership(&user, CenterId::from_uuid(center_id))
        .await?
        .into_iter()
        .map(SubjectRoleAssignmentResponse::from)
        .collect();

    Ok(Json(roster))
}

pub async fn cluster_leadership_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(cluster_id): Path<Uuid>,
) -> ApiResult<Json<Vec<SubjectRoleAssignmentResponse>>> {
    let roster = state
        .directory_service
        .cluster_leadership(&user, ClusterId::from_uuid(cluster_id))
        .await?
        .into_iter()
        .map(SubjectRoleAssignmentResponse::from)
        .collect();

    Ok(Json(roster))
}

pub async fn small_group_leadership_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(small_group_id): Path<Uuid>,
) -> ApiResult<Json<Vec<SubjectRoleAssignmentResponse>>> {
    let roster = state
        .directory_service
        .small_group_leadership(&user, SmallGroupId::from_uuid(small_group_id))
        .await?
        .into_iter()
        .map(SubjectRoleAssignmentResponse::from)
        .collect();

    Ok(Json(roster))
}

use std::str::FromStr;

use async_trait::async_trait;

use congregate_application::{
    LeadershipDirectoryRepository, RoleAssignmentAdminRepository, RoleAssignmentRepository,
    SubjectRoleAssignment,
};
use congregate_core::{AppError, AppResult};
use congregate_domain::{CenterId, ClusterId, Role, RoleAssignment, SmallGroupId};

use sqlx::{FromRow, PgPool};
use tracing::warn;

/// PostgreSQL-backed repository for role assignments.
#[derive(Clone)]
pub struct PostgresRoleAssignmentRepository {
    pool: PgPool,
}

impl PostgresRoleAssignmentRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_for_subject(&self, subject: &str) -> AppResult<Vec<RoleAssignment>> {
        let rows = sqlx::query_as::<_, RoleAssignmentRow>(
            r#"
            SELECT subject, role, center_id, cluster_id, small_group_id
            FROM role_assignments
            WHERE subject = $1
            "#,
        )
        .bind(subject)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role assignments: {error}")))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| assignment_from_row(&row))
            .collect())
    }

    async fn list_subject_assignments(
        &self,
        query: &'static str,
        scope_id: uuid::Uuid,
    ) -> AppResult<Vec<SubjectRoleAssignment>> {
        let rows = sqlx::query_as::<_, RoleAssignmentRow>(query)
            .bind(scope_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to load scoped assignments: {error}"))
            })?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let assignment = assignment_from_row(&row)?;
                Some(SubjectRoleAssignment {
                    subject: row.subject,
                    assignment,
                })
            })
            .collect())
    }
}

#[derive(Debug, FromRow)]
struct RoleAssignmentRow {
    subject: String,
    role: String,
    center_id: Option<uuid::Uuid>,
    cluster_id: Option<uuid::Uuid>,
    small_group_id: Option<uuid::Uuid>,
}

/// Hydrates a stored row, skipping rows whose role value is unknown.
///
/// A row with an unrecognized role must fail closed for the subject it
/// belongs to, not fault every permission check that loads it.
fn assignment_from_row(row: &RoleAssignmentRow) -> Option<RoleAssignment> {
    let Ok(role) = Role::from_str(row.role.as_str()) else {
        warn!(
            subject = row.subject.as_str(),
            role = row.role.as_str(),
            "skipping role assignment with unknown role value"
        );
        return None;
    };

    Some(RoleAssignment::from_parts(
        role,
        row.center_id.map(CenterId::from_uuid),
        row.cluster_id.map(ClusterId::from_uuid),
        row.small_group_id.map(SmallGroupId::from_uuid),
    ))
}

#[async_trait]
impl RoleAssignmentRepository for PostgresRoleAssignmentRepository {
    async fn list_assignments_for_subject(&self, subject: &str) -> AppResult<Vec<RoleAssignment>> {
        self.list_for_subject(subject).await
    }
}

#[async_trait]
impl RoleAssignmentAdminRepository for PostgresRoleAssignmentRepository {
    async fn list_assignments_for_subject(&self, subject: &str) -> AppResult<Vec<RoleAssignment>> {
        self.list_for_subject(subject).await
    }

    async fn grant_assignment(&self, subject: &str, assignment: &RoleAssignment) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO role_assignments (subject, role, center_id, cluster_id, small_group_id)
            SELECT $1, $2, $3, $4, $5
            WHERE NOT EXISTS (
                SELECT 1 FROM role_assignments
                WHERE subject = $1
                    AND role = $2
                    AND center_id IS NOT DISTINCT FROM $3
                    AND cluster_id IS NOT DISTINCT FROM $4
                    AND small_group_id IS NOT DISTINCT FROM $5
            )
            "#,
        )
        .bind(subject)
        .bind(assignment.role().as_str())
        .bind(assignment.center_id().map(|id| id.as_uuid()))
        .bind(assignment.cluster_id().map(|id| id.as_uuid()))
        .bind(assignment.small_group_id().map(|id| id.as_uuid()))
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to grant assignment: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "subject '{subject}' already holds role '{}' for that scope",
                assignment.role().as_str()
            )));
        }

        Ok(())
    }

    async fn revoke_assignment(&self, subject: &str, assignment: &RoleAssignment) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM role_assignments
            WHERE subject = $1
                AND role = $2
                AND center_id IS NOT DISTINCT FROM $3
                AND cluster_id IS NOT DISTINCT FROM $4
                AND small_group_id IS NOT DISTINCT FROM $5
            "#,
        )
        .bind(subject)
        .bind(assignment.role().as_str())
        .bind(assignment.center_id().map(|id| id.as_uuid()))
        .bind(assignment.cluster_id().map(|id| id.as_uuid()))
        .bind(assignment.small_group_id().map(|id| id.as_uuid()))
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to revoke assignment: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "subject '{subject}' does not hold role '{}' for that scope",
                assignment.role().as_str()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl LeadershipDirectoryRepository for PostgresRoleAssignmentRepository {
    async fn list_assignments_for_center(
        &self,
        center_id: CenterId,
    ) -> AppResult<Vec<SubjectRoleAssignment>> {
        self.list_subject_assignments(
            r#"
            SELECT subject, role, center_id, cluster_id, small_group_id
            FROM role_assignments
            WHERE center_id = $1
            ORDER BY subject
            "#,
            center_id.as_uuid(),
        )
        .await
    }

    async fn list_assignments_for_cluster(
        &self,
        cluster_id: ClusterId,
    ) -> AppResult<Vec<SubjectRoleAssignment>> {
        self.list_subject_assignments(
            r#"
            SELECT subject, role, center_id, cluster_id, small_group_id
            FROM role_assignments
            WHERE cluster_id = $1
            ORDER BY subject
            "#,
            cluster_id.as_uuid(),
        )
        .await
    }

    async fn list_assignments_for_small_group(
        &self,
        small_group_id: SmallGroupId,
    ) -> AppResult<Vec<SubjectRoleAssignment>> {
        self.list_subject_assignments(
            r#"
            SELECT subject, role, center_id, cluster_id, small_group_id
            FROM role_assignments
            WHERE small_group_id = $1
            ORDER BY subject
            "#,
            small_group_id.as_uuid(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use congregate_domain::Role;

    use super::{RoleAssignmentRow, assignment_from_row};

    #[test]
    fn known_role_row_hydrates() {
        let row = RoleAssignmentRow {
            subject: "alice".to_owned(),
            role: "center_admin".to_owned(),
            center_id: Some(uuid::Uuid::new_v4()),
            cluster_id: None,
            small_group_id: None,
        };

        let assignment = assignment_from_row(&row);
        assert!(assignment.is_some());
        assert_eq!(
            assignment.map(|value| value.role()),
            Some(Role::CenterAdmin)
        );
    }

    #[test]
    fn unknown_role_row_is_skipped() {
        let row = RoleAssignmentRow {
            subject: "alice".to_owned(),
            role: "social_media_admin".to_owned(),
            center_id: None,
            cluster_id: None,
            small_group_id: None,
        };

        assert!(assignment_from_row(&row).is_none());
    }
}

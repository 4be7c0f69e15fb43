use std::collections::HashMap;

use async_trait::async_trait;
use congregate_application::{
    LeadershipDirectoryRepository, RoleAssignmentAdminRepository, RoleAssignmentRepository,
    SubjectRoleAssignment,
};
use congregate_core::{AppError, AppResult};
use congregate_domain::{CenterId, ClusterId, RoleAssignment, SmallGroupId};
use tokio::sync::RwLock;

/// In-memory role assignment store.
///
/// Backs tests and acts as the injected fixture seam: fake identities for
/// test scenarios are seeded here and never through any production code
/// path.
#[derive(Debug, Default)]
pub struct InMemoryRoleAssignmentRepository {
    assignments: RwLock<HashMap<String, Vec<RoleAssignment>>>,
}

impl InMemoryRoleAssignmentRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            assignments: RwLock::new(HashMap::new()),
        }
    }

    fn collect_matching(
        assignments: &HashMap<String, Vec<RoleAssignment>>,
        predicate: impl Fn(&RoleAssignment) -> bool,
    ) -> Vec<SubjectRoleAssignment> {
        let mut values: Vec<SubjectRoleAssignment> = assignments
            .iter()
            .flat_map(|(subject, subject_assignments)| {
                subject_assignments
                    .iter()
                    .filter(|assignment| predicate(assignment))
                    .map(|assignment| SubjectRoleAssignment {
                        subject: subject.clone(),
                        assignment: assignment.clone(),
                    })
            })
            .collect();
        values.sort_by(|left, right| left.subject.cmp(&right.subject));

        values
    }
}

#[async_trait]
impl RoleAssignmentRepository for InMemoryRoleAssignmentRepository {
    async fn list_assignments_for_subject(&self, subject: &str) -> AppResult<Vec<RoleAssignment>> {
        Ok(self
            .assignments
            .read()
            .await
            .get(subject)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl RoleAssignmentAdminRepository for InMemoryRoleAssignmentRepository {
    async fn list_assignments_for_subject(&self, subject: &str) -> AppResult<Vec<RoleAssignment>> {
        Ok(self
            .assignments
            .read()
            .await
            .get(subject)
            .cloned()
            .unwrap_or_default())
    }

    async fn grant_assignment(&self, subject: &str, assignment: &RoleAssignment) -> AppResult<()> {
        let mut assignments = self.assignments.write().await;
        let subject_assignments = assignments.entry(subject.to_owned()).or_default();

        if subject_assignments.contains(assignment) {
            return Err(AppError::Conflict(format!(
                "subject '{subject}' already holds role '{}' for that scope",
                assignment.role().as_str()
            )));
        }

        subject_assignments.push(assignment.clone());
        Ok(())
    }

    async fn revoke_assignment(&self, subject: &str, assignment: &RoleAssignment) -> AppResult<()> {
        let mut assignments = self.assignments.write().await;
        let subject_assignments = assignments.get_mut(subject).ok_or_else(|| {
            AppError::NotFound(format!("subject '{subject}' has no assignments"))
        })?;

        let before = subject_assignments.len();
        subject_assignments.retain(|existing| existing != assignment);

        if subject_assignments.len() == before {
            return Err(AppError::NotFound(format!(
                "subject '{subject}' does not hold role '{}' for that scope",
                assignment.role().as_str()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl LeadershipDirectoryRepository for InMemoryRoleAssignmentRepository {
    async fn list_assignments_for_center(
        &self,
        center_id: CenterId,
    ) -> AppResult<Vec<SubjectRoleAssignment>> {
        let assignments = self.assignments.read().await;
        Ok(Self::collect_matching(&assignments, |assignment| {
            assignment.center_id() == Some(center_id)
        }))
    }

    async fn list_assignments_for_cluster(
        &self,
        cluster_id: ClusterId,
    ) -> AppResult<Vec<SubjectRoleAssignment>> {
        let assignments = self.assignments.read().await;
        Ok(Self::collect_matching(&assignments, |assignment| {
            assignment.cluster_id() == Some(cluster_id)
        }))
    }

    async fn list_assignments_for_small_group(
        &self,
        small_group_id: SmallGroupId,
    ) -> AppResult<Vec<SubjectRoleAssignment>> {
        let assignments = self.assignments.read().await;
        Ok(Self::collect_matching(&assignments, |assignment| {
            assignment.small_group_id() == Some(small_group_id)
        }))
    }
}

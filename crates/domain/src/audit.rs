use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role assignment is granted to a subject.
    SecurityAssignmentGranted,
    /// Emitted when a role assignment is revoked from a subject.
    SecurityAssignmentRevoked,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecurityAssignmentGranted => "security.assignment.granted",
            Self::SecurityAssignmentRevoked => "security.assignment.revoked",
        }
    }
}

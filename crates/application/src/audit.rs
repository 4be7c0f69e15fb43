use async_trait::async_trait;
use congregate_core::AppResult;
use congregate_domain::AuditAction;

/// Audit log entry emitted by administrative use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Acting subject.
    pub subject: String,
    /// Stable action identifier.
    pub action: AuditAction,
    /// Kind of resource the action touched.
    pub resource_type: String,
    /// Identifier of the touched resource.
    pub resource_id: String,
    /// Optional free-form description.
    pub detail: Option<String>,
}

/// Repository port for audit log persistence.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Appends an audit event entry.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}

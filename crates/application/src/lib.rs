//! Application services and ports.

#![forbid(unsafe_code)]

mod audit;
mod auth_event_service;
mod authorization_service;
mod directory_service;
mod security_admin_service;
mod user_service;

pub use audit::{AuditEvent, AuditRepository};
pub use auth_event_service::{
    AuthEvent, AuthEventKind, AuthEventOutcome, AuthEventRepository, AuthEventService,
};
pub use authorization_service::{AuthorizationService, RoleAssignmentRepository};
pub use directory_service::{
    DirectoryService, LeadershipDirectoryRepository, SubjectRoleAssignment,
};
pub use security_admin_service::{RoleAssignmentAdminRepository, SecurityAdminService};
pub use user_service::{AuthOutcome, PasswordHasher, UserRecord, UserRepository, UserService};

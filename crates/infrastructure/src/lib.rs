//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod in_memory_role_assignment_repository;
mod postgres_audit_repository;
mod postgres_auth_event_repository;
mod postgres_role_assignment_repository;
mod postgres_user_repository;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use in_memory_role_assignment_repository::InMemoryRoleAssignmentRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_auth_event_repository::PostgresAuthEventRepository;
pub use postgres_role_assignment_repository::PostgresRoleAssignmentRepository;
pub use postgres_user_repository::PostgresUserRepository;

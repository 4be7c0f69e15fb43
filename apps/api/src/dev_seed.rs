//! Development fixture seeding.
//!
//! Runs only through the explicit `seed` subcommand and provisions demo
//! accounts through the same services production requests use. Nothing
//! here is reachable from a serving process: there is no request-time
//! identity fabrication.

use std::sync::Arc;

use congregate_application::{
    AuthorizationService, PasswordHasher, RoleAssignmentAdminRepository,
    RoleAssignmentRepository, SecurityAdminService, UserRepository,
};
use congregate_core::{AppError, AppResult, UserIdentity};
use congregate_domain::{CenterId, ClusterId, RoleAssignment, SmallGroupId, UserId};
use congregate_infrastructure::{
    Argon2PasswordHasher, PostgresAuditRepository, PostgresRoleAssignmentRepository,
    PostgresUserRepository,
};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::api_config::ApiConfig;

const DEV_SEED_ADMIN_EMAIL: &str = "admin@congregate.local";
const DEV_SEED_ADMIN_DISPLAY_NAME: &str = "HQ Admin";
const DEV_SEED_ADMIN_PASSWORD: &str = "admin";

const DEV_SEED_LEADER_EMAIL: &str = "leader@congregate.local";
const DEV_SEED_LEADER_DISPLAY_NAME: &str = "Riverside Leader";
const DEV_SEED_LEADER_PASSWORD: &str = "admin";

const DEV_SEED_CENTER_ID: &str = "11111111-1111-1111-1111-111111111111";
const DEV_SEED_CLUSTER_ID: &str = "22222222-2222-2222-2222-222222222222";
const DEV_SEED_SMALL_GROUP_ID: &str = "33333333-3333-3333-3333-333333333333";

pub async fn run(pool: PgPool, config: &ApiConfig) -> AppResult<()> {
    let assignment_repository = Arc::new(PostgresRoleAssignmentRepository::new(pool.clone()));
    let authorization_service = AuthorizationService::new(
        assignment_repository.clone() as Arc<dyn RoleAssignmentRepository>,
        config.regular_member_grant,
    );
    let audit_repository = Arc::new(PostgresAuditRepository::new(pool.clone()));
    let security_admin_service = SecurityAdminService::new(
        authorization_service,
        assignment_repository.clone() as Arc<dyn RoleAssignmentAdminRepository>,
        audit_repository,
    );

    let user_repository = PostgresUserRepository::new(pool);
    let password_hasher = Argon2PasswordHasher::new();

    let admin_id = ensure_seed_user(
        &user_repository,
        &password_hasher,
        DEV_SEED_ADMIN_EMAIL,
        DEV_SEED_ADMIN_DISPLAY_NAME,
        DEV_SEED_ADMIN_PASSWORD,
    )
    .await?;
    let leader_id = ensure_seed_user(
        &user_repository,
        &password_hasher,
        DEV_SEED_LEADER_EMAIL,
        DEV_SEED_LEADER_DISPLAY_NAME,
        DEV_SEED_LEADER_PASSWORD,
    )
    .await?;

    let admin_subject = admin_id.to_string();
    let leader_subject = leader_id.to_string();

    // The first HQ assignment is written directly: the admin service
    // requires an HQ admin actor, and none exists yet.
    ensure_hq_bootstrap(assignment_repository.as_ref(), admin_subject.as_str()).await?;

    let actor = UserIdentity::new(
        admin_subject.clone(),
        DEV_SEED_ADMIN_DISPLAY_NAME,
        Some(DEV_SEED_ADMIN_EMAIL.to_owned()),
    );

    let center_id = CenterId::from_uuid(parse_uuid_const(DEV_SEED_CENTER_ID, "DEV_SEED_CENTER_ID")?);
    let cluster_id =
        ClusterId::from_uuid(parse_uuid_const(DEV_SEED_CLUSTER_ID, "DEV_SEED_CLUSTER_ID")?);
    let small_group_id = SmallGroupId::from_uuid(parse_uuid_const(
        DEV_SEED_SMALL_GROUP_ID,
        "DEV_SEED_SMALL_GROUP_ID",
    )?);

    for assignment in [
        RoleAssignment::center_admin(center_id),
        RoleAssignment::cluster_leader(cluster_id),
        RoleAssignment::small_group_leader(small_group_id),
        RoleAssignment::member_admin_for_center(center_id),
        RoleAssignment::regular_member(),
    ] {
        grant_if_missing(
            &security_admin_service,
            &actor,
            leader_subject.as_str(),
            assignment,
        )
        .await?;
    }

    info!(
        admin_email = DEV_SEED_ADMIN_EMAIL,
        leader_email = DEV_SEED_LEADER_EMAIL,
        %center_id,
        "development seed completed"
    );

    Ok(())
}

async fn ensure_seed_user(
    user_repository: &PostgresUserRepository,
    password_hasher: &Argon2PasswordHasher,
    email: &str,
    display_name: &str,
    password: &str,
) -> AppResult<UserId> {
    if let Some(existing) = user_repository.find_by_email(email).await? {
        return Ok(existing.id);
    }

    let password_hash = password_hasher.hash_password(password)?;
    user_repository
        .create(email, display_name, Some(password_hash.as_str()))
        .await
}

async fn ensure_hq_bootstrap(
    repository: &PostgresRoleAssignmentRepository,
    subject: &str,
) -> AppResult<()> {
    let hq_assignment = RoleAssignment::hq_admin();
    let existing =
        RoleAssignmentAdminRepository::list_assignments_for_subject(repository, subject).await?;

    if existing.contains(&hq_assignment) {
        return Ok(());
    }

    RoleAssignmentAdminRepository::grant_assignment(repository, subject, &hq_assignment).await
}

async fn grant_if_missing(
    security_admin_service: &SecurityAdminService,
    actor: &UserIdentity,
    subject: &str,
    assignment: RoleAssignment,
) -> AppResult<()> {
    match security_admin_service
        .grant_assignment(actor, subject, assignment)
        .await
    {
        Ok(()) | Err(AppError::Conflict(_)) => Ok(()),
        Err(error) => Err(error),
    }
}

fn parse_uuid_const(value: &str, name: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|error| {
        AppError::Internal(format!("invalid static uuid '{name}={value}': {error}"))
    })
}

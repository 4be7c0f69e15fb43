//! User account ports and authentication service.
//!
//! Accounts are provisioned by external administration tooling; this
//! service only authenticates them. Follows OWASP guidance on generic
//! failure messages and timing-uniform responses.

use std::sync::Arc;

use async_trait::async_trait;

use congregate_core::AppResult;
use congregate_domain::UserId;

use crate::auth_event_service::{AuthEvent, AuthEventKind, AuthEventOutcome, AuthEventService};

/// User record returned by repository queries.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Unique user identifier.
    pub id: UserId,
    /// Canonical email address.
    pub email: String,
    /// Display name shown in the UI.
    pub display_name: String,
    /// Argon2id password hash, or `None` for externally-provisioned
    /// accounts that have not set one.
    pub password_hash: Option<String>,
}

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;

    /// Finds a user by their unique identifier.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>>;

    /// Creates a new user record. Returns the assigned user ID.
    async fn create(
        &self,
        email: &str,
        display_name: &str,
        password_hash: Option<&str>,
    ) -> AppResult<UserId>;
}

/// Port for password hashing operations. Keeps the application layer free
/// of direct cryptographic library coupling.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// Result of a login attempt.
#[derive(Debug)]
pub enum AuthOutcome {
    /// Authentication succeeded. Session can be established.
    Authenticated(UserRecord),
    /// Authentication failed. Generic message prevents enumeration.
    Failed,
}

/// Application service for user authentication.
#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    auth_event_service: AuthEventService,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        auth_event_service: AuthEventService,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
            auth_event_service,
        }
    }

    /// Authenticates a user with email and password.
    ///
    /// Returns [`AuthOutcome::Failed`] for any failure (unknown email,
    /// wrong password, password-less account) to prevent enumeration.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<AuthOutcome> {
        let user = self.user_repository.find_by_email(email).await?;

        let Some(user) = user else {
            // Always hash to prevent timing attacks even when the user
            // does not exist.
            let _ = self.password_hasher.hash_password(password);
            return Ok(AuthOutcome::Failed);
        };

        let Some(ref stored_hash) = user.password_hash else {
            let _ = self.password_hasher.hash_password(password);
            return Ok(AuthOutcome::Failed);
        };

        let password_valid = self.password_hasher.verify_password(password, stored_hash)?;

        let outcome = if password_valid {
            AuthEventOutcome::Success
        } else {
            AuthEventOutcome::InvalidPassword
        };

        self.auth_event_service
            .record_event(AuthEvent {
                subject: Some(user.id.to_string()),
                kind: AuthEventKind::LoginAttempt,
                outcome,
                ip_address,
                user_agent,
            })
            .await?;

        if !password_valid {
            return Ok(AuthOutcome::Failed);
        }

        Ok(AuthOutcome::Authenticated(user))
    }

    /// Finds a user by id.
    pub async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        self.user_repository.find_by_id(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use congregate_core::{AppError, AppResult};
    use congregate_domain::UserId;
    use tokio::sync::Mutex;

    use crate::auth_event_service::{AuthEvent, AuthEventRepository, AuthEventService};

    use super::{AuthOutcome, PasswordHasher, UserRecord, UserRepository, UserService};

    #[derive(Default)]
    struct FakeAuthEventRepository {
        events: Mutex<Vec<AuthEvent>>,
    }

    #[async_trait]
    impl AuthEventRepository for FakeAuthEventRepository {
        async fn append_event(&self, event: AuthEvent) -> AppResult<()> {
            self.events.lock().await.push(event);
            Ok(())
        }
    }

    struct FakeUserRepository {
        by_email: HashMap<String, UserRecord>,
    }

    #[async_trait]
    impl UserRepository for FakeUserRepository {
        async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
            Ok(self.by_email.get(email).cloned())
        }

        async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
            Ok(self
                .by_email
                .values()
                .find(|user| user.id == user_id)
                .cloned())
        }

        async fn create(
            &self,
            _email: &str,
            _display_name: &str,
            _password_hash: Option<&str>,
        ) -> AppResult<UserId> {
            Err(AppError::Internal("not supported in tests".to_owned()))
        }
    }

    struct FakePasswordHasher;

    impl PasswordHasher for FakePasswordHasher {
        fn hash_password(&self, password: &str) -> AppResult<String> {
            Ok(format!("hashed:{password}"))
        }

        fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
            Ok(hash == format!("hashed:{password}"))
        }
    }

    fn service_with_user(email: &str, password: &str) -> UserService {
        let user = UserRecord {
            id: UserId::new(),
            email: email.to_owned(),
            display_name: "Test User".to_owned(),
            password_hash: Some(format!("hashed:{password}")),
        };

        UserService::new(
            Arc::new(FakeUserRepository {
                by_email: HashMap::from([(email.to_owned(), user)]),
            }),
            Arc::new(FakePasswordHasher),
            AuthEventService::new(Arc::new(FakeAuthEventRepository::default())),
        )
    }

    #[tokio::test]
    async fn login_with_correct_password_authenticates() {
        let service = service_with_user("pastor@example.org", "a-long-passphrase");

        let outcome = service
            .login("pastor@example.org", "a-long-passphrase", None, None)
            .await;
        assert!(matches!(outcome, Ok(AuthOutcome::Authenticated(_))));
    }

    #[tokio::test]
    async fn login_with_wrong_password_fails_generically() {
        let service = service_with_user("pastor@example.org", "a-long-passphrase");

        let outcome = service
            .login("pastor@example.org", "wrong", None, None)
            .await;
        assert!(matches!(outcome, Ok(AuthOutcome::Failed)));
    }

    #[tokio::test]
    async fn login_with_unknown_email_fails_generically() {
        let service = service_with_user("pastor@example.org", "a-long-passphrase");

        let outcome = service
            .login("stranger@example.org", "a-long-passphrase", None, None)
            .await;
        assert!(matches!(outcome, Ok(AuthOutcome::Failed)));
    }
}

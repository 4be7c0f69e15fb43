use std::sync::Arc;

use async_trait::async_trait;

use congregate_core::AppResult;

/// Kind of authentication activity being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEventKind {
    /// A password login attempt, successful or not.
    LoginAttempt,
    /// An explicit end of session.
    Logout,
}

impl AuthEventKind {
    /// Returns a stable storage value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoginAttempt => "login_attempt",
            Self::Logout => "logout",
        }
    }
}

/// How a recorded authentication event ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEventOutcome {
    /// The flow completed.
    Success,
    /// The presented password did not match the stored hash.
    InvalidPassword,
}

impl AuthEventOutcome {
    /// Returns a stable storage value for this outcome.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::InvalidPassword => "invalid_password",
        }
    }
}

/// One entry in the authentication activity trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEvent {
    /// Subject, when the account could be resolved.
    pub subject: Option<String>,
    /// What happened.
    pub kind: AuthEventKind,
    /// How it ended.
    pub outcome: AuthEventOutcome,
    /// Caller IP address if available.
    pub ip_address: Option<String>,
    /// Caller user-agent if available.
    pub user_agent: Option<String>,
}

/// Repository port for auth event persistence.
#[async_trait]
pub trait AuthEventRepository: Send + Sync {
    /// Appends an auth event entry.
    async fn append_event(&self, event: AuthEvent) -> AppResult<()>;
}

/// Records authentication activity for later security review.
#[derive(Clone)]
pub struct AuthEventService {
    repository: Arc<dyn AuthEventRepository>,
}

impl AuthEventService {
    /// Creates a service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AuthEventRepository>) -> Self {
        Self { repository }
    }

    /// Persists an auth event.
    pub async fn record_event(&self, event: AuthEvent) -> AppResult<()> {
        self.repository.append_event(event).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use congregate_core::AppResult;
    use tokio::sync::Mutex;

    use super::{AuthEvent, AuthEventKind, AuthEventOutcome, AuthEventRepository, AuthEventService};

    #[derive(Default)]
    struct RecordingRepository {
        events: Mutex<Vec<AuthEvent>>,
    }

    #[async_trait]
    impl AuthEventRepository for RecordingRepository {
        async fn append_event(&self, event: AuthEvent) -> AppResult<()> {
            self.events.lock().await.push(event);
            Ok(())
        }
    }

    #[tokio::test]
    async fn recorded_event_reaches_the_repository() {
        let repository = Arc::new(RecordingRepository::default());
        let service = AuthEventService::new(repository.clone());

        let result = service
            .record_event(AuthEvent {
                subject: Some("alice".to_owned()),
                kind: AuthEventKind::Logout,
                outcome: AuthEventOutcome::Success,
                ip_address: None,
                user_agent: None,
            })
            .await;
        assert!(result.is_ok());

        let events = repository.events.lock().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, AuthEventKind::Logout);
    }

    #[test]
    fn storage_values_are_stable() {
        assert_eq!(AuthEventKind::LoginAttempt.as_str(), "login_attempt");
        assert_eq!(AuthEventOutcome::InvalidPassword.as_str(), "invalid_password");
    }
}

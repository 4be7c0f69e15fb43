use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use congregate_application::{AuthEvent, AuthEventKind, AuthEventOutcome, AuthOutcome};
use congregate_core::{AppError, UserIdentity};
use tower_sessions::Session;

use crate::dto::{LoginRequest, LoginResponse, UserIdentityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub const SESSION_USER_KEY: &str = "user_identity";
/// Absolute session creation timestamp for OWASP absolute timeout enforcement.
pub const SESSION_CREATED_AT_KEY: &str = "session_created_at";

/// POST /auth/login - Authenticate with email+password.
pub async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (ip_address, user_agent) = extract_request_context(&headers);

    let outcome = state
        .user_service
        .login(&payload.email, &payload.password, ip_address, user_agent)
        .await?;

    match outcome {
        AuthOutcome::Authenticated(user) => {
            let identity = UserIdentity::new(
                user.id.to_string(),
                user.display_name.clone(),
                Some(user.email),
            );

            // OWASP Session Management: regenerate session ID on privilege change.
            session
                .cycle_id()
                .await
                .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

            session
                .insert(SESSION_USER_KEY, &identity)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to persist session identity: {error}"))
                })?;

            // OWASP Session Management: record absolute creation time.
            session
                .insert(SESSION_CREATED_AT_KEY, chrono::Utc::now().timestamp())
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to persist session creation time: {error}"))
                })?;

            Ok(Json(LoginResponse {
                status: "authenticated".to_owned(),
            }))
        }
        AuthOutcome::Failed => {
            // OWASP: generic error message for all failure cases.
            Err(AppError::Unauthorized("invalid email or password".to_owned()).into())
        }
    }
}

/// POST /auth/logout - End the authenticated session.
pub async fn logout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    session: Session,
) -> ApiResult<StatusCode> {
    let subject = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .map(|identity| identity.subject().to_owned());

    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    let (ip_address, user_agent) = extract_request_context(&headers);
    state
        .auth_event_service
        .record_event(AuthEvent {
            subject,
            kind: AuthEventKind::Logout,
            outcome: AuthEventOutcome::Success,
            ip_address,
            user_agent,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/me - Return the authenticated identity.
pub async fn me_handler(session: Session) -> ApiResult<Json<UserIdentityResponse>> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    Ok(Json(UserIdentityResponse::from(identity)))
}

fn extract_request_context(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned);

    let user_agent = headers
        .get("user-agent")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned);

    (ip_address, user_agent)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderMap;

    use super::extract_request_context;

    #[test]
    fn forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            axum::http::HeaderValue::from_static("10.0.0.1, 10.0.0.2"),
        );
        let (ip_address, _) = extract_request_context(&headers);
        assert_eq!(ip_address.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn missing_headers_yield_none() {
        let headers = HeaderMap::new();
        let (ip_address, user_agent) = extract_request_context(&headers);
        assert!(ip_address.is_none());
        assert!(user_agent.is_none());
    }
}

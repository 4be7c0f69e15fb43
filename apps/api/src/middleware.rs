use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use congregate_core::{AppError, UserIdentity};
use tower_sessions::Session;

use crate::auth::{SESSION_CREATED_AT_KEY, SESSION_USER_KEY};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Sessions older than this are rejected regardless of activity.
const SESSION_ABSOLUTE_TTL_SECONDS: i64 = 12 * 60 * 60;

/// Resolves the caller's session identity and injects it as a request
/// extension. Requests without an authenticated session, or with one past
/// its absolute lifetime, are rejected before any handler runs.
pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let created_at = session
        .get::<i64>(SESSION_CREATED_AT_KEY)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to read session creation time: {error}"))
        })?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    if chrono::Utc::now().timestamp() - created_at > SESSION_ABSOLUTE_TTL_SECONDS {
        session.delete().await.map_err(|error| {
            AppError::Internal(format!("failed to delete expired session: {error}"))
        })?;
        return Err(AppError::Unauthorized("session expired".to_owned()).into());
    }

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Blocks cross-site state-changing requests that a browser would send
/// with cookies attached.
pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        check_browser_origin(request.headers(), &state.frontend_url)?;
    }

    Ok(next.run(request).await)
}

fn check_browser_origin(headers: &HeaderMap, allowed_origin: &str) -> Result<(), ApiError> {
    if headers
        .get("sec-fetch-site")
        .is_some_and(|fetch_site| fetch_site == HeaderValue::from_static("cross-site"))
    {
        return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
    }

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if origin == allowed_origin {
        return Ok(());
    }

    // Older browsers send only a referer for same-origin form posts.
    let referer = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if referer.starts_with(allowed_origin) {
        return Ok(());
    }

    Err(AppError::Unauthorized("origin validation failed".to_owned()).into())
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

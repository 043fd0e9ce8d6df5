//! services/api/src/web/middleware.rs
//!
//! Identity middleware for protecting routes.
//!
//! Sign-in is handled by the hosting identity provider, which forwards the
//! authenticated user's id in the `x-user-id` header.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use lesson_quiz_core::SessionContext;
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

use crate::web::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Reads the caller's id from the identity header.
pub fn user_id_from_headers(headers: &HeaderMap) -> Result<Uuid, StatusCode> {
    let raw = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;
    Uuid::parse_str(raw.trim()).map_err(|_| StatusCode::UNAUTHORIZED)
}

/// Middleware that only requires a known user id.
///
/// Inserts the `Uuid` into request extensions. Used by enrollment, where the
/// user has no role yet.
pub async fn require_user(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let user_id = user_id_from_headers(req.headers())?;
    req.extensions_mut().insert(user_id);
    Ok(next.run(req).await)
}

/// Middleware that resolves the caller's role and inserts a `SessionContext`.
///
/// Missing or malformed identity is 401; a user who never enrolled is 403.
pub async fn require_context(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let user_id = user_id_from_headers(req.headers())?;

    let role = state
        .users
        .get_role(user_id)
        .await
        .map_err(|e| {
            error!("Failed to look up role: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or_else(|| {
            warn!("User {} has not enrolled.", user_id);
            StatusCode::FORBIDDEN
        })?;

    req.extensions_mut().insert(SessionContext { user_id, role });
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_a_valid_user_id() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(user_id_from_headers(&headers), Ok(id));
    }

    #[test]
    fn missing_or_malformed_id_is_unauthorized() {
        assert_eq!(
            user_id_from_headers(&HeaderMap::new()),
            Err(StatusCode::UNAUTHORIZED)
        );
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert_eq!(user_id_from_headers(&headers), Err(StatusCode::UNAUTHORIZED));
    }
}

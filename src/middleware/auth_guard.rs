use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::{
    extractors::{auth::bearer_token, AuthenticatedUser},
    services::DiaryService,
    AppError, AppState,
};

/// Rejects requests without a valid bearer access token and stores the
/// caller's identity for the handler
pub async fn require_auth<S: DiaryService>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized("Missing bearer access token".to_string()))?;

    let claims = state.jwt.validate(&token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected access token");
        AppError::Unauthorized("Invalid or expired access token".to_string())
    })?;

    let user_id = claims.user_id().ok_or_else(|| {
        tracing::warn!(sub = %claims.sub, "Access token subject is not a user id");
        AppError::Unauthorized("Invalid access token subject".to_string())
    })?;

    tracing::Span::current().record("user_id", user_id);
    request.extensions_mut().insert(AuthenticatedUser { user_id });

    Ok(next.run(request).await)
}

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use metrics::counter;
use std::sync::Arc;

use crate::{
    extractors::{StagedUploads, TransactionHandle},
    services::DiaryService,
    AppError, AppState,
};

/// Wraps the handler in one transaction: commits when the response is a
/// success, rolls back otherwise. Dropping an unfinished transaction also
/// rolls it back, which covers handlers that never complete.
///
/// Files staged by the handler are removed on every exit that does not commit.
pub async fn transaction_scope<S: DiaryService>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let handle = TransactionHandle::new(state.diary.begin().await?);
    let staged = StagedUploads::default();
    request.extensions_mut().insert(handle.clone());
    request.extensions_mut().insert(staged.clone());

    let response = next.run(request).await;

    let Some(tx) = handle.take().await else {
        discard_staged(&state, &staged).await;
        return Err(AppError::Internal(format!(
            "Transaction for {} was closed by the handler",
            route
        )));
    };

    if response.status().is_success() {
        if let Err(e) = state.diary.commit(tx).await {
            counter!("diary_transactions_total", "outcome" => "commit_failed").increment(1);
            discard_staged(&state, &staged).await;
            return Err(e);
        }
        counter!("diary_transactions_total", "outcome" => "commit").increment(1);
        tracing::debug!(route, "Transaction committed");
    } else {
        if let Err(e) = state.diary.rollback(tx).await {
            tracing::error!(error = %e, route, "Transaction rollback failed");
        }
        counter!("diary_transactions_total", "outcome" => "rollback").increment(1);
        tracing::debug!(route, status = %response.status(), "Transaction rolled back");
        discard_staged(&state, &staged).await;
    }

    Ok(response)
}

async fn discard_staged<S: DiaryService>(state: &AppState<S>, staged: &StagedUploads) {
    for name in staged.take().await {
        state.uploads.remove(&name).await;
    }
}

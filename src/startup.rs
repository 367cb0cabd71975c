use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, Method, Request},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    handlers::{self, diary_handler},
    middleware::{metrics_middleware, request_id_middleware, require_auth, transaction_scope},
    openapi::ApiDoc,
    services::DiaryService,
    AppState,
};

/// Diary routes, relative to `/api/diary`.
///
/// Stage order per request: auth guard, then transaction scope, then handler.
fn diary_routes<S: DiaryService>(state: &Arc<AppState<S>>) -> Router<Arc<AppState<S>>> {
    // Each of these runs inside one transaction
    let transactional = Router::new()
        .route(
            "/create",
            post(diary_handler::create_diary::<S>)
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .route("/update/{diaryId}", put(diary_handler::update_diary::<S>))
        .route("/delete/{diaryId}", delete(diary_handler::delete_diary::<S>))
        .route("/read/{diaryId}", get(diary_handler::read_diary_detail::<S>))
        .route("/uplike/{diaryId}", post(diary_handler::create_diary_like::<S>))
        .route("/downlike/{diaryId}", post(diary_handler::delete_diary_like::<S>))
        .route_layer(from_fn_with_state(state.clone(), transaction_scope::<S>))
        .route_layer(from_fn_with_state(state.clone(), require_auth::<S>));

    let authenticated = Router::new()
        .route("/getlike/{diaryId}", get(diary_handler::get_diary_like::<S>))
        .route("/my/calender/month", get(diary_handler::read_user_diary_monthly::<S>))
        .route("/my/calender/week", get(diary_handler::read_user_diary_weekly::<S>))
        .route("/my/calender/day", get(diary_handler::read_user_diary_daily::<S>))
        .route("/my", get(diary_handler::read_user_diary::<S>))
        .route_layer(from_fn_with_state(state.clone(), require_auth::<S>));

    let public = Router::new().route("/report", post(diary_handler::report_diary));

    transactional.merge(authenticated).merge(public)
}

pub fn build_router<S: DiaryService>(state: Arc<AppState<S>>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(state.config.cors_origin.clone())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true);

    // One span per request; request_id and user_id are filled in by middleware
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = tracing::field::Empty,
            user_id = tracing::field::Empty,
        )
    });

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler::<S>))
        .nest("/api/diary", diary_routes(&state))
        .nest_service("/uploads", ServeDir::new(state.uploads.dir()))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(trace)
        .layer(cors)
        .with_state(state)
}

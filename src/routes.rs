// src/routes.rs

use axum::{
    Json, Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::AppError,
    handlers::{resources, results},
    state::AppState,
    utils::session::require_session,
};

/// Assembles the console router.
///
/// * `/health` is public.
/// * Everything under `/api/console` requires an admin session.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Result<Router, AppError> {
    let origin = state
        .config
        .allowed_origin
        .parse::<HeaderValue>()
        .map_err(|e| AppError::Internal(format!("CONSOLE_ALLOWED_ORIGIN is invalid: {}", e)))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ])
        .expose_headers([axum::http::header::CONTENT_DISPOSITION]);

    let result_routes = Router::new()
        .route("/", get(results::list_results))
        .route("/export", get(results::export_results))
        .route("/tests", get(results::list_tests))
        .route("/{id}/report", put(results::submit_report));

    let resource_routes = Router::new()
        .route(
            "/{resource}",
            get(resources::list_resource).post(resources::create_resource),
        )
        .route("/{resource}/bulk-delete", post(resources::bulk_delete))
        .route(
            "/{resource}/{id}",
            get(resources::get_resource)
                .put(resources::update_resource)
                .delete(resources::delete_resource),
        );

    let console_routes = Router::new()
        .nest("/results", result_routes)
        .nest("/resources", resource_routes)
        .layer(middleware::from_fn(require_session));

    Ok(Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .nest("/api/console", console_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

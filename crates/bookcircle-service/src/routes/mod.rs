use crate::handlers::auth_handler::{self, AppState};
use crate::handlers::book_handler;
use crate::middleware::auth::require_auth;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Assemble the application router.
///
/// Register, login, and refresh sit outside the access guard: they are
/// how a token is first obtained. Everything else under `/api` that reads
/// or writes per-caller state goes through `require_auth`.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let public = Router::new()
        .route("/api/auth/register", post(auth_handler::register))
        .route("/api/auth/login", post(auth_handler::login))
        .route("/api/auth/refresh", post(auth_handler::refresh))
        .route("/api/books/:id", get(book_handler::get_book));

    let protected = Router::new()
        .route("/api/auth/profile", get(auth_handler::profile))
        .route("/api/books/status/:status", get(book_handler::list_books))
        .route("/api/books", post(book_handler::create_book))
        .route("/api/books/:id/finish", post(book_handler::finish_book))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .route("/health", get(health_check))
        .route(
            "/metrics",
            get(move || std::future::ready(metrics_handle.render())),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

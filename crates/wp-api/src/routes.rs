//! # Routes
//!
//! Axum router configuration for the woodpecker API.
//! Routes are grouped by the gates they need; each group stacks its
//! middleware so the token check always runs first.

use crate::handlers;
use crate::middleware::{require_admin, require_self, require_token};
use crate::state::AppState;
use axum::{
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;
use wp_core::CREDENTIAL_HEADER;

/// Create the main application router
///
/// Routes:
/// - Open:
///   - GET  /, /health
///   - GET  /admin/{email} - Admin status of an account
///   - PUT  /user/{email} - Upsert profile, returns a token
///   - GET  /tools, /tools/{id}
///   - POST /orders
///   - PUT  /comments, GET /review
///
/// - Token:
///   - POST   /create-payment-intent
///   - GET    /users
///   - GET    /order/{id}, DELETE /order/{id}, PATCH /order/{id}
///
/// - Token + self (`?email=` must match the token):
///   - GET /orders
///
/// - Token + admin:
///   - PUT  /user/admin/{email}
///   - POST /tool
pub fn create_router(state: AppState) -> Router {
    let open_routes = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/admin/{email}", get(handlers::check_admin))
        .route("/user/{email}", put(handlers::upsert_user))
        .route("/tools", get(handlers::list_tools))
        .route("/tools/{id}", get(handlers::get_tool))
        .route("/orders", post(handlers::create_order))
        .route("/comments", put(handlers::upsert_comment))
        .route("/review", get(handlers::list_reviews));

    let token_routes = Router::new()
        .route("/create-payment-intent", post(handlers::create_payment_intent))
        .route("/users", get(handlers::list_users))
        .route(
            "/order/{id}",
            get(handlers::get_order)
                .delete(handlers::delete_order)
                .patch(handlers::reconcile_payment),
        )
        .route_layer(from_fn_with_state(state.clone(), require_token));

    let self_routes = Router::new()
        .route("/orders", get(handlers::list_orders))
        .route_layer(from_fn_with_state(state.clone(), require_self))
        .route_layer(from_fn_with_state(state.clone(), require_token));

    let admin_routes = Router::new()
        .route("/user/admin/{email}", put(handlers::promote_admin))
        .route("/tool", post(handlers::add_tool))
        .route_layer(from_fn_with_state(state.clone(), require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_token));

    let cors = cors_layer(state.config.cors_origin.as_deref());

    Router::new()
        .merge(open_routes)
        .merge(token_routes)
        .merge(self_routes)
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// CORS restricted to the configured browser origin, or any origin if unset
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let allow_origin = match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => AllowOrigin::exact(origin),
        Some(Err(_)) => {
            warn!("CORS_ORIGIN is not a valid header value, allowing any origin");
            AllowOrigin::any()
        }
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(CREDENTIAL_HEADER)])
}


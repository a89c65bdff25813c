//! # Request Handlers
//!
//! Axum request handlers for the woodpecker API.
//! Access gates run as middleware before these are reached, so handlers
//! only translate between HTTP and the store or the order lifecycle.

use crate::error::ApiResult;
use crate::middleware::{ApiJson, EmailQuery};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};
use wp_core::{
    user, AppError, ClientSecret, Comment, CommentRepository, DeleteResult, DocumentId,
    InsertResult, IntentRequest, NewComment, NewOrder, NewTool, Order, PaidUpdate,
    PaymentConfirmation, Role, Tool, ToolRepository, UpdateResult, User, UserRepository,
};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create payment intent request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    /// Order total in major currency units
    pub total_price: f64,
}

#[derive(Debug, Serialize)]
pub struct AdminStatus {
    pub admin: bool,
}

/// Answer to a profile upsert: the store acknowledgement and a fresh token
#[derive(Debug, Serialize)]
pub struct UserSession {
    pub result: UpdateResult,
    pub token: String,
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn root() -> &'static str {
    "hello"
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "woodpecker",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a card payment intent for the client-side checkout
#[instrument(skip(state, request), fields(provider = state.gateway.provider_name()))]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PaymentIntentRequest>,
) -> ApiResult<Json<ClientSecret>> {
    let intent = IntentRequest::from_major_units(request.total_price, state.gateway.currency())?;
    let secret = state.gateway.create_intent(intent).await?;
    Ok(Json(secret))
}

/// Whether `email` belongs to an admin; unknown accounts are not admins
#[instrument(skip(state))]
pub async fn check_admin(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<AdminStatus>> {
    let admin = state
        .store
        .find_user(&email)
        .await?
        .is_some_and(|user| user.is_admin());
    Ok(Json(AdminStatus { admin }))
}

#[instrument(skip(state))]
pub async fn promote_admin(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<UpdateResult>> {
    user::validate_email_key(&email)?;
    let result = state.store.set_role(&email, Role::Admin).await?;
    if result.matched_count > 0 {
        info!(email = %email, "user promoted to admin");
    }
    Ok(Json(result))
}

/// Store the submitted profile for `email` and sign a token for it
#[instrument(skip(state, body))]
pub async fn upsert_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<UserSession>> {
    user::validate_email_key(&email)?;
    let profile = user::profile_from_body(body)?;

    let result = state.store.upsert_user(&email, profile.clone()).await?;
    let role = state
        .store
        .find_user(&email)
        .await?
        .and_then(|stored| stored.role);
    let token = state.tokens.issue(&email, role, &profile)?;

    Ok(Json(UserSession { result, token }))
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.store.list_users().await?))
}

#[instrument(skip(state))]
pub async fn get_tool(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Tool>> {
    let id = DocumentId::parse(&id)?;
    let tool = state
        .store
        .find_tool(&id)
        .await?
        .ok_or_else(|| AppError::not_found("tool", id.as_str()))?;
    Ok(Json(tool))
}

pub async fn list_tools(State(state): State<AppState>) -> ApiResult<Json<Vec<Tool>>> {
    Ok(Json(state.store.list_tools().await?))
}

#[instrument(skip(state, request), fields(name = %request.name))]
pub async fn add_tool(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewTool>,
) -> ApiResult<Json<InsertResult>> {
    let tool = request.into_tool()?;
    let result = state.store.insert_tool(tool).await?;
    info!(tool_id = %result.inserted_id, "tool added");
    Ok(Json(result))
}

pub async fn create_order(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewOrder>,
) -> ApiResult<Json<InsertResult>> {
    Ok(Json(state.orders.create_order(request).await?))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.list_orders_for_user(&query.email).await?))
}

#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    let id = DocumentId::parse(&id)?;
    Ok(Json(state.orders.get_order(&id).await?))
}

/// Delete an order; a well-formed id that matches nothing is not an error
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResult>> {
    let id = DocumentId::parse(&id)?;
    Ok(Json(state.orders.delete_order(&id).await?))
}

/// Mark the order paid and record the payment
pub async fn reconcile_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(confirmation): ApiJson<PaymentConfirmation>,
) -> ApiResult<Json<PaidUpdate>> {
    let id = DocumentId::parse(&id)?;
    Ok(Json(state.orders.reconcile_payment(&id, confirmation).await?))
}

#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn upsert_comment(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewComment>,
) -> ApiResult<Json<UpdateResult>> {
    let comment = request.into_comment()?;
    Ok(Json(state.store.upsert_comment(comment).await?))
}

pub async fn list_reviews(State(state): State<AppState>) -> ApiResult<Json<Vec<Comment>>> {
    Ok(Json(state.store.list_comments().await?))
}

//! # Access Gates
//!
//! Middleware composed in front of route groups. `require_token` must run
//! first; the capability gates read the claims it attaches and short-circuit
//! before the handler is reached.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{FromRequest, Query, Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use tracing::debug;
use wp_core::{AppError, Capability, Claims, CREDENTIAL_HEADER};

/// JSON body extractor that answers malformed bodies with an [`ApiError`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// The `?email=` query of self-scoped routes
#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

/// Verify the credential header and attach the claims
pub async fn require_token(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credential = match req.headers().get(CREDENTIAL_HEADER) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| AppError::Forbidden("malformed credential".to_string()))?,
        ),
        None => None,
    };
    let claims = state.tokens.verify(credential)?;

    debug!(email = %claims.email, "token verified");
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Allow only callers whose stored role is admin
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = verified_claims(&req)?.clone();
    state
        .authorizer
        .authorize(&claims, &Capability::Admin)
        .await?;
    Ok(next.run(req).await)
}

/// Allow only callers acting on their own `?email=`
pub async fn require_self(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = verified_claims(&req)?.clone();
    let Query(query) = Query::<EmailQuery>::try_from_uri(req.uri())?;
    let capability = Capability::SelfOnly { email: query.email };
    state.authorizer.authorize(&claims, &capability).await?;
    Ok(next.run(req).await)
}

fn verified_claims(req: &Request) -> Result<&Claims, ApiError> {
    req.extensions()
        .get::<Claims>()
        .ok_or_else(|| ApiError(AppError::Unauthenticated("no verified credential".to_string())))
}

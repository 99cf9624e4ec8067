//! Bearer-token authentication.
//!
//! Tokens are opaque: the raw value is never stored. Each request's
//! token is HMAC-hashed and looked up against the requester table; the
//! matching [`Requester`] rides along as a request extension.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::errors::AppError;
use crate::infra::app_state::AppState;

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)
        .ok_or_else(|| AppError::unauthorized("missing or malformed authorization header"))?;

    let token_hash = state.tokens.hash(token);
    let requester = state
        .store
        .find_requester_by_token_hash(&token_hash)
        .await
        .map_err(|err| AppError::internal(err.to_string()))?
        .ok_or_else(|| {
            debug!("rejected request with unknown bearer token");
            AppError::unauthorized("invalid token")
        })?;

    request.extensions_mut().insert(requester);
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

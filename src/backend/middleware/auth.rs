/**
 * Authentication Extractors
 *
 * Handlers declare the kind of caller they accept through their arguments:
 *
 * - `AuthUser` - a session holder (JWT from `Authorization: Bearer`, or the
 *   `access_token` query parameter for EventSource clients)
 * - `AdminUser` - a session holder with the `admin` role (403 otherwise)
 * - `ApiKeyUser` - an API key from `X-API-Key` or `Authorization: Bearer cp_...`
 *
 * Every extractor reloads the account so deleted or disabled users are
 * rejected even while their token is still valid.
 */

use axum::{
    extract::{FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, Uri},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::api_keys;
use crate::backend::auth::sessions::verify_token;
use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::api_key::API_KEY_MARKER;
use crate::shared::User;

/// Authenticated session holder
#[derive(Clone, Debug)]
pub struct AuthUser(pub User);

/// Authenticated administrator
#[derive(Clone, Debug)]
pub struct AdminUser(pub User);

/// Caller authenticated by API key
#[derive(Clone, Debug)]
pub struct ApiKeyUser {
    pub user: User,
    pub key_id: Uuid,
}

#[derive(Deserialize)]
struct TokenQuery {
    access_token: Option<String>,
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn query_token(uri: &Uri) -> Option<String> {
    Query::<TokenQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(q)| q.access_token)
        .filter(|t| !t.is_empty())
}

/// API key from `X-API-Key`, or a `cp_` bearer token
pub fn api_key_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-api-key")
        .and_then(|h| h.to_str().ok())
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .or_else(|| bearer_token(headers).filter(|t| t.starts_with(API_KEY_MARKER)))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .or_else(|| query_token(&parts.uri))
            .ok_or_else(|| BackendError::unauthorized("Missing authentication token"))?;

        if token.starts_with(API_KEY_MARKER) {
            return Err(BackendError::unauthorized("API keys are only accepted on /api/v1"));
        }

        let claims = verify_token(&state.config.jwt_secret, &token).map_err(|e| {
            tracing::warn!("Invalid token: {:?}", e);
            BackendError::unauthorized("Invalid or expired token")
        })?;

        let user_id = claims
            .user_id()
            .ok_or_else(|| BackendError::unauthorized("Invalid token subject"))?;

        let record = get_user_by_id(&state.db, user_id)
            .await?
            .ok_or_else(|| BackendError::unauthorized("Account no longer exists"))?;

        if record.is_disabled {
            return Err(BackendError::unauthorized("Account is disabled"));
        }

        Ok(AuthUser(record.to_user()))
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            tracing::warn!("Non-admin {} attempted an admin operation", user.username);
            return Err(BackendError::forbidden("Administrator access required"));
        }
        Ok(AdminUser(user))
    }
}

impl FromRequestParts<AppState> for ApiKeyUser {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let key = api_key_from_headers(&parts.headers)
            .ok_or_else(|| BackendError::unauthorized("Missing API key"))?;

        let (key_id, user_id) = api_keys::db::authenticate_key(&state.db, &key)
            .await?
            .ok_or_else(|| BackendError::unauthorized("Invalid or revoked API key"))?;

        let record = get_user_by_id(&state.db, user_id)
            .await?
            .ok_or_else(|| BackendError::unauthorized("Invalid or revoked API key"))?;

        if record.is_disabled {
            return Err(BackendError::unauthorized("Account is disabled"));
        }

        if let Err(e) = api_keys::db::touch_last_used(&state.db, key_id).await {
            tracing::warn!("Failed to stamp API key usage: {:?}", e);
        }

        Ok(ApiKeyUser {
            user: record.to_user(),
            key_id,
        })
    }
}

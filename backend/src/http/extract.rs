//! Request extractors: session user, validated bodies and queries, path ids.

use std::str::FromStr;

use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{header, request::Parts, HeaderMap},
    Json,
};
use chrono::Utc;
use serde::de::DeserializeOwned;

use super::error::AppError;
use super::state::AppState;
use crate::auth::{AuthError, SessionClaims};
use crate::models::UserId;
use crate::validation::Validate;

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

/// The authenticated caller, taken from `Authorization: Bearer …` or the
/// `token` cookie.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
    pub claims: SessionClaims,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn cookie_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value)
        .filter(|t| !t.is_empty())
}

/// Session token from the request, bearer header first.
pub fn request_token(headers: &HeaderMap) -> Option<&str> {
    bearer_token(headers).or_else(|| cookie_token(headers))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = request_token(&parts.headers).ok_or(AuthError::MissingToken)?;
        let claims = state.tokens.verify(token, Utc::now()).map_err(|err| {
            tracing::debug!(error = %err, "rejected session token");
            err
        })?;
        Ok(Self {
            id: claims.user_id,
            claims,
        })
    }
}

/// JSON body checked with [`Validate`]; yields the payload's output type.
pub struct ValidJson<P: Validate>(pub P::Output);

impl<S, P> FromRequest<S> for ValidJson<P>
where
    S: Send + Sync,
    P: Validate + DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, AppError> {
        let Json(payload) = Json::<P>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(Self(payload.validate()?))
    }
}

/// Query string checked with [`Validate`].
pub struct ValidQuery<P: Validate>(pub P::Output);

impl<S, P> FromRequestParts<S> for ValidQuery<P>
where
    S: Send + Sync,
    P: Validate + DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, AppError> {
        let Query(payload) = Query::<P>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(Self(payload.validate()?))
    }
}

/// Parse a path segment into an id, or 400 `Invalid <entity> ID`.
pub fn parse_id<T: FromStr>(raw: &str, entity: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {} ID", entity)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingId;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; token=from-cookie"));
        assert_eq!(request_token(&headers), Some("from-cookie"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(request_token(&headers), Some("from-header"));
    }

    #[test]
    fn test_missing_or_foreign_scheme_yields_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_token(&headers), None);
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(request_token(&headers), None);
    }

    #[test]
    fn test_parse_id_reports_entity() {
        let err = parse_id::<ListingId>("not-an-id", "listing").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(m) if m == "Invalid listing ID"));
    }
}

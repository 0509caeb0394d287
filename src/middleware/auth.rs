use async_trait::async_trait;
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::ApiError;
use crate::routes::{Authorization, MethodOptions};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Bearer token claims the custom authorizer accepts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: impl Into<String>, tenant_id: Option<String>, ttl_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: sub.into(),
            tenant_id,
            exp: (now + Duration::hours(ttl_hours)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

pub fn generate_token(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Allow { principal: String },
    Deny,
}

/// Custom authorizer consulted before any method with `Authorization::Custom`
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, token: &str, resource: &str) -> AuthDecision;
}

/// Validates HS256 bearer tokens
pub struct JwtAuthorizer {
    secret: String,
}

impl JwtAuthorizer {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }
}

#[async_trait]
impl Authorizer for JwtAuthorizer {
    async fn authorize(&self, token: &str, resource: &str) -> AuthDecision {
        if self.secret.is_empty() {
            tracing::warn!("Authorizer secret not configured, denying {}", resource);
            return AuthDecision::Deny;
        }

        let key = DecodingKey::from_secret(self.secret.as_bytes());
        match decode::<Claims>(token, &key, &Validation::default()) {
            Ok(data) => AuthDecision::Allow { principal: data.claims.sub },
            Err(e) => {
                tracing::debug!("Rejected token for {}: {}", resource, e);
                AuthDecision::Deny
            }
        }
    }
}

/// Fixed decision, for local runs and tests
#[derive(Debug, Clone)]
pub struct StaticAuthorizer(pub AuthDecision);

impl StaticAuthorizer {
    pub fn allow(principal: impl Into<String>) -> Self {
        Self(AuthDecision::Allow { principal: principal.into() })
    }

    pub fn deny() -> Self {
        Self(AuthDecision::Deny)
    }
}

#[async_trait]
impl Authorizer for StaticAuthorizer {
    async fn authorize(&self, _token: &str, _resource: &str) -> AuthDecision {
        self.0.clone()
    }
}

/// Enforce a method's gate. Returns the authorized principal, if the method has
/// an authorizer. Nothing reaches the binding unless this succeeds.
pub async fn enforce_gate(
    options: &MethodOptions,
    resource: &str,
    headers: &HeaderMap,
    authorizer: &dyn Authorizer,
    api_keys: &BTreeSet<String>,
) -> Result<Option<String>, ApiError> {
    let mut principal = None;

    if options.authorization == Authorization::Custom {
        let token = extract_bearer(headers).map_err(ApiError::unauthorized)?;
        match authorizer.authorize(&token, resource).await {
            AuthDecision::Allow { principal: p } => principal = Some(p),
            AuthDecision::Deny => return Err(ApiError::forbidden("Access denied by authorizer")),
        }
    }

    if options.api_key_required {
        let key = headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::forbidden("Missing API key"))?;

        if !api_keys.contains(key) {
            return Err(ApiError::forbidden("Invalid API key"));
        }
    }

    Ok(principal)
}

/// Extract bearer token from Authorization header
fn extract_bearer(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn keys() -> BTreeSet<String> {
        ["k-1".to_string()].into_iter().collect()
    }

    fn headers(token: Option<&str>, key: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            headers.insert("authorization", HeaderValue::from_str(&format!("Bearer {token}")).unwrap());
        }
        if let Some(key) = key {
            headers.insert(API_KEY_HEADER, HeaderValue::from_str(key).unwrap());
        }
        headers
    }

    #[tokio::test]
    async fn test_open_method_needs_nothing() {
        let result = enforce_gate(&MethodOptions::open(), "/products", &HeaderMap::new(), &StaticAuthorizer::deny(), &keys()).await;
        assert_eq!(result.unwrap(), None);
    }

    #[tokio::test]
    async fn test_gated_method_requires_token_and_key() {
        let gated = MethodOptions::gated();
        let allow = StaticAuthorizer::allow("alice");

        let missing_token = enforce_gate(&gated, "/ai-concierge", &headers(None, Some("k-1")), &allow, &keys()).await;
        assert_eq!(missing_token.unwrap_err().status_code(), 401);

        let missing_key = enforce_gate(&gated, "/ai-concierge", &headers(Some("t"), None), &allow, &keys()).await;
        assert_eq!(missing_key.unwrap_err().status_code(), 403);

        let wrong_key = enforce_gate(&gated, "/ai-concierge", &headers(Some("t"), Some("k-2")), &allow, &keys()).await;
        assert_eq!(wrong_key.unwrap_err().status_code(), 403);

        let ok = enforce_gate(&gated, "/ai-concierge", &headers(Some("t"), Some("k-1")), &allow, &keys()).await;
        assert_eq!(ok.unwrap(), Some("alice".to_string()));
    }

    #[tokio::test]
    async fn test_authorizer_deny_wins_over_valid_key() {
        let result = enforce_gate(
            &MethodOptions::gated(),
            "/ai-concierge",
            &headers(Some("t"), Some("k-1")),
            &StaticAuthorizer::deny(),
            &keys(),
        )
        .await;
        assert_eq!(result.unwrap_err().status_code(), 403);
    }

    #[tokio::test]
    async fn test_jwt_authorizer() {
        let secret = "test-secret";
        let token = generate_token(&Claims::new("alice", Some("acme".into()), 1), secret).unwrap();

        let authorizer = JwtAuthorizer::new(secret);
        assert_eq!(
            authorizer.authorize(&token, "/ai-concierge").await,
            AuthDecision::Allow { principal: "alice".into() }
        );
        assert_eq!(JwtAuthorizer::new("other").authorize(&token, "/ai-concierge").await, AuthDecision::Deny);
        assert_eq!(JwtAuthorizer::new("").authorize(&token, "/ai-concierge").await, AuthDecision::Deny);
    }

    #[tokio::test]
    async fn test_expired_token_is_denied() {
        let secret = "test-secret";
        let token = generate_token(&Claims::new("alice", None, -2), secret).unwrap();
        assert_eq!(JwtAuthorizer::new(secret).authorize(&token, "/").await, AuthDecision::Deny);
    }
}

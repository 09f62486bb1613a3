//! Token types for the Joali session
//!
//! The backend issues a pair of tokens:
//! - Access token: short-lived, sent as `Authorization: Bearer <token>`
//! - Refresh token: long-lived, exchanged at `/api/Auth/RefreshToken` for a new pair
//!
//! Token payloads are validated here, at the boundary, so the rest of the
//! crate only ever sees a complete `TokenPair`.

use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, Validation, decode};
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::UserRole;

/// Complete pair of access and refresh tokens
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Role reported alongside the tokens, if any
    pub role: Option<UserRole>,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// `token` object of login and refresh responses
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenPayload {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub role: Option<String>,
}

impl TokenPayload {
    /// Validate into a complete pair; both tokens must be present and non-empty
    pub fn into_pair(self) -> Option<TokenPair> {
        let access_token = self.access_token.filter(|t| !t.is_empty())?;
        let refresh_token = self.refresh_token.filter(|t| !t.is_empty())?;
        let role = self
            .role
            .filter(|r| !r.is_empty())
            .and_then(|r| r.parse().ok());

        Some(TokenPair {
            access_token,
            refresh_token,
            role,
        })
    }
}

/// Response body of `/api/Auth/RefreshToken`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TokenEnvelope {
    pub token: Option<TokenPayload>,
}

impl TokenEnvelope {
    pub fn into_pair(self) -> Option<TokenPair> {
        self.token.and_then(TokenPayload::into_pair)
    }
}

/// Request body of `/api/Auth/RefreshToken`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
    pub access_token: &'a str,
    pub refresh_token: &'a str,
}

const CLAIM_ROLE: &[&str] = &[
    "role",
    "http://schemas.microsoft.com/ws/2008/06/identity/claims/role",
];
const CLAIM_NAME: &[&str] = &[
    "unique_name",
    "name",
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name",
];
const CLAIM_USER_ID: &[&str] = &[
    "nameid",
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier",
    "sub",
];

/// Claims read from an access token without verifying its signature
///
/// Only used to fill in identity details the login response left out and to
/// display the token's expiry. The backend remains the authority on whether a
/// token is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub role: Option<UserRole>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token is not a decodable JWT: {0}")]
    Undecodable(#[from] jsonwebtoken::errors::Error),
}

impl TokenClaims {
    /// Decode the claims of a JWT access token
    pub fn peek(token: &str) -> Result<Self, AuthError> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<Map<String, Value>>(token, &DecodingKey::from_secret(&[]), &validation)?;
        Ok(Self::from_map(&data.claims))
    }

    fn from_map(claims: &Map<String, Value>) -> Self {
        Self {
            user_id: first_claim(claims, CLAIM_USER_ID),
            user_name: first_claim(claims, CLAIM_NAME),
            role: first_claim(claims, CLAIM_ROLE).and_then(|r| r.parse().ok()),
            expires_at: claims
                .get("exp")
                .and_then(Value::as_i64)
                .and_then(|exp| DateTime::from_timestamp(exp, 0)),
        }
    }
}

fn first_claim(claims: &Map<String, Value>, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| match claims.get(*name)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.iter().find_map(|v| v.as_str().map(String::from)),
        _ => None,
    })
}

/// Validated bearer credential
///
/// `Debug` redacts the value so tokens never reach logs.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("bearer token cannot be empty")]
    Empty,

    #[error("bearer token contains invalid character at position {position}")]
    InvalidCharacter { position: usize },
}

impl BearerToken {
    /// `Bearer <token>` header value, marked sensitive
    pub fn as_header_value(&self) -> Result<HeaderValue, TokenError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0))
            .map_err(|_| TokenError::InvalidCharacter { position: 0 })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BearerToken").field(&"[REDACTED]").finish()
    }
}

impl TryFrom<&str> for BearerToken {
    type Error = TokenError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(TokenError::Empty);
        }
        // Visible ASCII only, so the header value always converts
        if let Some(position) = value.chars().position(|c| !(' '..='~').contains(&c)) {
            return Err(TokenError::InvalidCharacter { position });
        }
        Ok(Self(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn jwt(claims: serde_json::Value) -> String {
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"backend-secret")).unwrap()
    }

    #[test]
    fn test_envelope_validation() {
        let envelope: TokenEnvelope = serde_json::from_str(
            r#"{"token": {"accessToken": "AT2", "refreshToken": "RT2", "role": "Staff"}}"#,
        )
        .unwrap();
        let pair = envelope.into_pair().unwrap();
        assert_eq!(pair.access_token, "AT2");
        assert_eq!(pair.refresh_token, "RT2");
        assert_eq!(pair.role, Some(UserRole::Staff));

        // Missing refresh token is not a usable pair
        let envelope: TokenEnvelope =
            serde_json::from_str(r#"{"token": {"accessToken": "AT2"}}"#).unwrap();
        assert!(envelope.into_pair().is_none());

        let envelope: TokenEnvelope = serde_json::from_str(r#"{"message": "expired"}"#).unwrap();
        assert!(envelope.into_pair().is_none());
    }

    #[test]
    fn test_peek_dotnet_claims() {
        let token = jwt(serde_json::json!({
            "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier": "17",
            "unique_name": "alice",
            "http://schemas.microsoft.com/ws/2008/06/identity/claims/role": "Admin",
            "exp": 1_900_000_000,
            "aud": "joali",
        }));

        let claims = TokenClaims::peek(&token).unwrap();
        assert_eq!(claims.user_id.as_deref(), Some("17"));
        assert_eq!(claims.user_name.as_deref(), Some("alice"));
        assert_eq!(claims.role, Some(UserRole::Admin));
        assert_eq!(claims.expires_at.unwrap().timestamp(), 1_900_000_000);
    }

    #[test]
    fn test_peek_opaque_token_fails() {
        assert!(TokenClaims::peek("AT1").is_err());
    }

    #[test]
    fn test_bearer_token() {
        let token = BearerToken::try_from("AT1").unwrap();
        assert_eq!(token.as_header_value().unwrap().to_str().unwrap(), "Bearer AT1");
        assert_eq!(format!("{:?}", token), "BearerToken(\"[REDACTED]\")");

        assert!(matches!(BearerToken::try_from(""), Err(TokenError::Empty)));
        assert!(matches!(
            BearerToken::try_from("bad\ntoken"),
            Err(TokenError::InvalidCharacter { position: 3 })
        ));
    }
}

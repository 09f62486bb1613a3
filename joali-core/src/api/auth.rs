//! `/api/Auth/*` and customer self-registration

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{JoaliClient, decode_optional, ensure_success};
use crate::auth::TokenPayload;
use crate::body::Body;
use crate::error::ApiError;
use crate::http::ApiRequest;
use crate::models::{CustomerRegistration, UserRole, string_or_number};
use crate::session::{Identity, SignOutReason};

const LOGIN: &str = "/api/Auth/Login";
const LOGOUT: &str = "/api/Auth/Logout";
const RESET_PASSWORD: &str = "/api/Auth/ResetPassword";
const CUSTOMER_REGISTER: &str = "/api/User/CustomerRegister";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
    api_key: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordRequest<'a> {
    email: &'a str,
    temporary_key: &'a str,
    new_password: &'a str,
}

/// Body of a successful login
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginResponse {
    pub token: Option<TokenPayload>,
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub role: Option<UserRole>,
    pub message: Option<String>,
}

impl JoaliClient {
    /// Authenticate and start a session
    ///
    /// Stores the token pair and whatever identity the backend reports,
    /// filling gaps from the access token's claims.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, ApiError> {
        let req = ApiRequest::post(LOGIN).json(&LoginRequest {
            email,
            password,
            api_key: self.api_key(),
        })?;

        let resp = self.http.execute(&req).await?;
        let text = ensure_success(resp, "Login failed")?;

        let Body::Parsed(parsed) = Body::<LoginResponse>::parse(&text) else {
            return Err(ApiError::MalformedResponse(
                "login response is not a JSON object".to_string(),
            ));
        };
        let pair = parsed
            .token
            .and_then(TokenPayload::into_pair)
            .ok_or_else(|| {
                ApiError::MalformedResponse("login response did not contain a token pair".to_string())
            })?;

        let identity = Identity {
            user_id: parsed.user_id,
            user_name: parsed.user_name,
            role: parsed.role.or_else(|| pair.role.clone()),
        }
        .or_claims_of(&pair.access_token);

        self.session().sign_in(&pair, &identity);
        Ok(identity)
    }

    /// End the session on the backend, then locally
    ///
    /// Fails without any network call when no access token is stored.
    #[tracing::instrument(skip(self))]
    pub async fn logout(&self) -> Result<Option<Value>, ApiError> {
        if self.session().access_token().is_none() {
            return Err(ApiError::NoAccessToken);
        }

        let req = ApiRequest::post(LOGOUT).authenticated();
        let text = self.send_checked(req, "Logout failed").await?;

        self.session().clear(SignOutReason::Logout);
        Ok(decode_optional(&text))
    }

    /// Set the permanent password of an account created with a temporary key
    #[tracing::instrument(skip(self, temporary_key, new_password))]
    pub async fn reset_initial_password(
        &self,
        email: &str,
        temporary_key: &str,
        new_password: &str,
    ) -> Result<Option<Value>, ApiError> {
        let req = ApiRequest::post(RESET_PASSWORD)
            .authenticated()
            .json(&ResetPasswordRequest {
                email,
                temporary_key,
                new_password,
            })?;

        self.fetch_optional(req, "Failed to reset initial password").await
    }

    /// Register a customer account; does not sign in
    #[tracing::instrument(skip(self, params), fields(email = %params.email))]
    pub async fn customer_register(
        &self,
        params: &CustomerRegistration,
    ) -> Result<Option<Value>, ApiError> {
        let req = ApiRequest::post(CUSTOMER_REGISTER)
            .query("apiKey", self.api_key())
            .json(params)?;

        self.fetch_optional(req, "Registration failed").await
    }
}

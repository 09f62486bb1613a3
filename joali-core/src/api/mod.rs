//! Typed façade over the Joali REST API
//!
//! Every method builds one request, hands it to the transport (which handles
//! bearer injection and refresh) and decodes the response body defensively:
//! - listings always return a `Vec`, empty when the body is unusable
//! - single records return `Option`, `None` when the body is empty or invalid
//! - non-2xx responses become `ApiError` carrying the backend's `message`
//!   or an operation-specific fallback

mod auth;
mod orders;
mod organizations;
mod services;
mod users;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::body::{self, Body};
use crate::config::{ApiConfig, Config};
use crate::error::ApiError;
use crate::http::{ApiRequest, ApiResponse, HttpClient};
use crate::retry::RetryPolicy;
use crate::session::Session;

pub use auth::LoginResponse;

/// Client for the booking backend
#[derive(Debug, Clone)]
pub struct JoaliClient {
    http: HttpClient,
    api_key: String,
}

impl JoaliClient {
    /// Create a client for `config`, reading and writing auth state through `session`
    pub fn new(config: &Config, session: Session) -> Result<Self, ApiError> {
        let http = HttpClient::new(&config.api.base_url, config.api.timeout(), session)?;

        Ok(Self {
            http,
            api_key: config.api.api_key.clone(),
        })
    }

    /// Client with default session settings
    pub fn with_api_config(api: &ApiConfig, session: Session) -> Result<Self, ApiError> {
        let config = Config {
            api: api.clone(),
            ..Config::default()
        };
        Self::new(&config, session)
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.http = self.http.with_policy(policy);
        self
    }

    pub fn session(&self) -> &Session {
        self.http.session()
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Execute and fail on non-2xx, keeping the raw body
    async fn send_checked(&self, req: ApiRequest, fallback: &str) -> Result<String, ApiError> {
        let resp = self.http.execute(&req).await?;
        ensure_success(resp, fallback)
    }

    /// Execute and decode a single record; empty/invalid body yields `None`
    async fn fetch_optional<T: DeserializeOwned>(
        &self,
        req: ApiRequest,
        fallback: &str,
    ) -> Result<Option<T>, ApiError> {
        let text = self.send_checked(req, fallback).await?;
        Ok(decode_optional(&text))
    }

    /// Execute and decode a listing; never fails on the body
    async fn fetch_list<T: DeserializeOwned>(
        &self,
        req: ApiRequest,
        fallback: &str,
    ) -> Result<Vec<T>, ApiError> {
        let text = self.send_checked(req, fallback).await?;
        Ok(body::parse_list(&text))
    }
}

fn ensure_success(resp: ApiResponse, fallback: &str) -> Result<String, ApiError> {
    if resp.status.is_success() {
        return Ok(resp.text);
    }

    let message = body::error_message(&resp.text, fallback);
    tracing::debug!(status = %resp.status, %message, "Request failed");

    if resp.status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized { message });
    }
    Err(ApiError::Status {
        status: resp.status.as_u16(),
        message,
    })
}

fn decode_optional<T: DeserializeOwned>(text: &str) -> Option<T> {
    match Body::<T>::parse(text) {
        Body::Parsed(value) => Some(value),
        Body::Empty => None,
        Body::Invalid(e) => {
            tracing::debug!(error = %e, "Response body not decodable");
            None
        }
    }
}

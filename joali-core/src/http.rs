//! HTTP transport shared by every façade call
//!
//! Authenticated requests get `Authorization: Bearer <access token>` from the
//! session. Responses to authenticated requests go through the
//! `RetryPolicy`; a 401 triggers the refresh flow and at most one resend with
//! the new token. Tokens are only refreshed in reaction to a 401, never ahead
//! of time. Responses are returned as status + raw text so the façade can
//! decode defensively.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::auth::BearerToken;
use crate::error::ApiError;
use crate::refresh::{RefreshError, RefreshOutcome, SessionRefresher};
use crate::retry::{RetryDecision, RetryPolicy, TokenPresence};
use crate::session::{Session, SignOutReason};

/// A request relative to the backend base URL
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(&'static str, String)>,
    body: Option<Value>,
    authenticated: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            authenticated: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach the session's bearer token and enable refresh-on-401
    pub fn authenticated(mut self) -> Self {
        self.authenticated = true;
        self
    }

}

/// Status and raw body of a completed exchange
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
    refresher: SessionRefresher,
    policy: RetryPolicy,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration, session: Session) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::ClientBuild)?;
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            refresher: SessionRefresher::new(http.clone(), &base_url),
            http,
            base_url,
            session,
            policy: RetryPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `req`, refreshing and resending per the retry policy
    pub async fn execute(&self, req: &ApiRequest) -> Result<ApiResponse, ApiError> {
        if !req.authenticated {
            return self.send(req, None).await;
        }

        let mut attempt = 1;
        loop {
            let sent_token = self.session.access_token();
            let resp = self.send(req, sent_token.as_deref()).await?;

            let tokens = TokenPresence::from(&self.session.snapshot());
            match self.policy.decide(attempt, resp.status, tokens) {
                RetryDecision::Return => return Ok(resp),
                RetryDecision::EndSession => {
                    tracing::warn!(path = %req.path, "Unauthorized without a usable token pair");
                    self.session.clear(SignOutReason::LoginRequired);
                    return Ok(resp);
                }
                RetryDecision::RefreshAndRetry => {
                    match self.refresher.refresh(&self.session, sent_token.as_deref()).await {
                        Ok(outcome) => {
                            let reused = outcome == RefreshOutcome::Reused;
                            tracing::debug!(path = %req.path, reused, "Retrying with refreshed token");
                            attempt += 1;
                        }
                        // Transport failure: the session is kept and the caller sees a network error
                        Err(RefreshError::Network(source)) => {
                            return Err(ApiError::Network {
                                url: self.refresher.url().to_string(),
                                source,
                            });
                        }
                        // Session already cleared by the refresher; surface the original 401
                        Err(_) => return Ok(resp),
                    }
                }
            }
        }
    }

    async fn send(&self, req: &ApiRequest, token: Option<&str>) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.base_url, req.path);
        let mut builder = self.http.request(req.method.clone(), &url);

        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        if let Some(token) = token {
            match BearerToken::try_from(token).and_then(|t| t.as_header_value()) {
                Ok(value) => builder = builder.header(AUTHORIZATION, value),
                Err(e) => tracing::warn!(error = %e, "Stored access token is not a valid header value"),
            }
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        tracing::debug!(method = %req.method, path = %req.path, "Sending request");

        let resp = builder.send().await.map_err(|source| ApiError::Network {
            url: url.clone(),
            source,
        })?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|source| ApiError::Network { url, source })?;

        tracing::debug!(method = %req.method, path = %req.path, status = %status, "Received response");

        Ok(ApiResponse { status, text })
    }
}

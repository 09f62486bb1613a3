//! Token refresh flow
//!
//! `Idle -> Refreshing -> {Refreshed, Failed}`. Entering `Refreshing` takes
//! the session's refresh lock, so concurrent callers that all saw a 401 queue
//! behind one exchange. A caller that gets the lock after the token was
//! already rotated reuses the new token instead of refreshing again.
//!
//! `Failed` is terminal for the session: it is cleared and the caller must
//! log in again. Only a rejected refresh token, an unusable token pair or a
//! missing token lead there. A transport failure leaves the session intact
//! and is reported as such. Refresh failures are never retried.

use thiserror::Error;

use crate::auth::{RefreshRequest, TokenEnvelope, TokenPair};
use crate::body::Body;
use crate::session::{Session, SessionSnapshot, SignOutReason};

pub(crate) const REFRESH_PATH: &str = "/api/Auth/RefreshToken";

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Access or refresh token missing")]
    MissingToken,

    #[error("Refresh token rejected (HTTP {status})")]
    Rejected { status: u16 },

    #[error("Refresh response did not contain a token pair")]
    Malformed,

    #[error("Refresh request failed: {0}")]
    Network(#[from] reqwest::Error),
}

/// Successful end of a refresh attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// This caller exchanged the refresh token
    Refreshed,
    /// Another caller already rotated the token; use it
    Reused,
}

impl RefreshError {
    /// Whether this failure means the session can no longer be refreshed
    pub fn ends_session(&self) -> bool {
        !matches!(self, RefreshError::Network(_))
    }
}

/// Exchanges refresh tokens against the backend
#[derive(Debug, Clone)]
pub struct SessionRefresher {
    http: reqwest::Client,
    url: String,
}

impl SessionRefresher {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            url: format!("{}{}", base_url, REFRESH_PATH),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Refresh the session after `stale` was rejected
    ///
    /// `stale` is the access token the failing request carried. When the
    /// failure ends the session, it is cleared before returning.
    pub async fn refresh(
        &self,
        session: &Session,
        stale: Option<&str>,
    ) -> Result<RefreshOutcome, RefreshError> {
        let _guard = session.lock_refresh().await;

        let snapshot = session.snapshot();
        if let Some(current) = snapshot.access_token.as_deref()
            && Some(current) != stale
        {
            tracing::debug!("Token already rotated by a concurrent refresh");
            return Ok(RefreshOutcome::Reused);
        }

        match self.exchange(&snapshot).await {
            Ok(pair) => {
                // Persist before releasing the lock so no retry sees the old token
                session.store_tokens(&pair);
                tracing::info!("Session tokens refreshed");
                Ok(RefreshOutcome::Refreshed)
            }
            Err(e) if e.ends_session() => {
                tracing::warn!(error = %e, "Token refresh failed, ending session");
                session.clear(SignOutReason::LoginRequired);
                Err(e)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh could not reach the backend, keeping session");
                Err(e)
            }
        }
    }

    async fn exchange(&self, snapshot: &SessionSnapshot) -> Result<TokenPair, RefreshError> {
        let (Some(access_token), Some(refresh_token)) = (
            snapshot.access_token.as_deref(),
            snapshot.refresh_token.as_deref(),
        ) else {
            return Err(RefreshError::MissingToken);
        };

        tracing::debug!(url = %self.url, "Sending refresh request");

        let resp = self
            .http
            .post(&self.url)
            .json(&RefreshRequest {
                access_token,
                refresh_token,
            })
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
            });
        }

        Body::<TokenEnvelope>::parse(&text)
            .into_option()
            .and_then(TokenEnvelope::into_pair)
            .ok_or(RefreshError::Malformed)
    }
}

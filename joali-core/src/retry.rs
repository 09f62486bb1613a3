//! Retry policy for authenticated requests
//!
//! `RetryPolicy::decide` is a pure function of the attempt number, the
//! response status and which tokens the session holds. The transport executes
//! whatever it returns; no retry logic lives in the send path itself.

use reqwest::StatusCode;

use crate::session::SessionSnapshot;

/// What the transport should do with a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Hand the response to the caller
    Return,
    /// Refresh the token pair, then resend
    RefreshAndRetry,
    /// The 401 cannot be recovered: tear down the session, then hand the response back
    EndSession,
}

/// Which tokens were available when the decision is made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPresence {
    pub access: bool,
    pub refresh: bool,
}

impl From<&SessionSnapshot> for TokenPresence {
    fn from(snapshot: &SessionSnapshot) -> Self {
        Self {
            access: snapshot.access_token.is_some(),
            refresh: snapshot.refresh_token.is_some(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Resends allowed after a successful refresh
    max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 1 }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Decide the fate of the response to attempt number `attempt` (1-based)
    pub fn decide(&self, attempt: u32, status: StatusCode, tokens: TokenPresence) -> RetryDecision {
        if status != StatusCode::UNAUTHORIZED {
            return RetryDecision::Return;
        }
        // Already retried with fresh tokens: the 401 stands
        if attempt > self.max_retries {
            return RetryDecision::Return;
        }
        if !(tokens.access && tokens.refresh) {
            return RetryDecision::EndSession;
        }
        RetryDecision::RefreshAndRetry
    }
}

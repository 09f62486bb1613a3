//! joali-core: Client library for the Joali booking backend
//!
//! This crate provides:
//! - Persisted session store (access/refresh tokens, role, user identity)
//! - HTTP transport with bearer injection and 401-triggered token refresh
//! - Single-flight refresh coordination and a pure retry policy
//! - Typed API façade for auth, users, organizations, services and orders

pub mod api;
pub mod auth;
pub mod body;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod refresh;
pub mod retry;
pub mod session;
pub mod storage;

pub use api::JoaliClient;
pub use auth::{BearerToken, TokenClaims, TokenPair};
pub use config::Config;
pub use error::ApiError;
pub use models::UserRole;
pub use session::{Identity, Session, SessionState, SignOutReason};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage, NullStorage};

/// Default backend URL used when no config file overrides it
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

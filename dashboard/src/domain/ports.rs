//! Domain ports defining the edge towards the remote user directory.
//!
//! The directory is the only external collaborator this core talks to: a
//! request/response HTTP-like service holding the canonical user records
//! and the authentication endpoints. The port exposes strongly typed
//! errors so adapters map their failures into predictable variants instead
//! of bubbling transport types into the domain.

use async_trait::async_trait;
use thiserror::Error;

use super::session::{AccessToken, LoginCredentials};
use super::user::{UserDraft, UserId, UserPatch, UserRecord};

/// Errors surfaced by [`UserDirectory`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// Network-level failure reaching the directory.
    #[error("directory transport failed: {message}")]
    Transport {
        /// Adapter-provided failure description.
        message: String,
    },
    /// The directory did not answer within the configured timeout.
    #[error("directory request timed out: {message}")]
    Timeout {
        /// Adapter-provided failure description.
        message: String,
    },
    /// The response arrived but could not be decoded into domain types.
    #[error("directory payload could not be decoded: {message}")]
    Decode {
        /// Adapter-provided failure description.
        message: String,
    },
    /// The directory rejected the request as malformed.
    #[error("directory rejected the request: {message}")]
    InvalidRequest {
        /// Adapter-provided failure description.
        message: String,
    },
    /// The addressed record does not exist on the directory side.
    #[error("directory record not found: {message}")]
    NotFound {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Credentials or token were rejected.
    #[error("directory refused authentication: {message}")]
    Unauthorized {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl DirectoryError {
    /// Helper for network-level failures.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Helper for timeouts.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Helper for payload decoding failures.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Helper for rejected requests.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Helper for missing directory records.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Helper for authentication refusals.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }
}

/// One slice of directory records plus the directory-side total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBatch {
    /// Records in directory order.
    pub users: Vec<UserRecord>,
    /// Total matching records on the directory side, before `limit`/`skip`.
    pub total: usize,
}

/// Token and profile returned by a successful login.
#[derive(Debug, Clone)]
pub struct AuthPayload {
    /// Opaque access token for subsequent authenticated calls.
    pub token: AccessToken,
    /// Profile of the authenticated user.
    pub profile: UserRecord,
}

/// Port for the remote user directory.
///
/// Object-safe so strategies, the orchestrator and the session context can
/// share one `Arc<dyn UserDirectory>`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch one bulk slice of records (`limit`/`skip` addressing).
    async fn fetch_page(&self, limit: usize, skip: usize) -> Result<UserBatch, DirectoryError>;

    /// Fetch every record whose name matches `query`, directory-filtered.
    async fn search(&self, query: &str) -> Result<UserBatch, DirectoryError>;

    /// Create a record; the directory assigns the identifier.
    async fn create(&self, draft: &UserDraft) -> Result<UserRecord, DirectoryError>;

    /// Merge a partial update into the record with `id` and return the
    /// directory's view of the result.
    async fn update(&self, id: UserId, patch: &UserPatch) -> Result<UserRecord, DirectoryError>;

    /// Delete the record with `id`.
    async fn delete(&self, id: UserId) -> Result<(), DirectoryError>;

    /// Exchange credentials for an access token and profile.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthPayload, DirectoryError>;

    /// Fetch the profile behind an access token.
    async fn current_user(&self, token: &AccessToken) -> Result<UserRecord, DirectoryError>;
}

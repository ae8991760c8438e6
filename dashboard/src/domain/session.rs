//! Explicit session context for the console shell.
//!
//! The session is an owned object with an explicit login / logout
//! lifecycle rather than ambient global state. Callers treat
//! [`SessionContext::is_authenticated`] as the precondition for reaching
//! the user-management surface.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::ports::{DirectoryError, UserDirectory};
use super::user::UserRecord;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for directory lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Opaque access token issued by the directory.
///
/// Deliberately has no `Display` impl and a redacted `Debug` so the token
/// cannot leak through logging.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a directory-issued token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token value for the Authorization header.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Errors surfaced by session operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The operation requires an established session.
    #[error("no active session")]
    NotAuthenticated,
    /// The directory rejected or failed the request.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

struct ActiveSession {
    token: AccessToken,
    profile: UserRecord,
}

/// Owned authentication state with an explicit lifecycle.
///
/// Created logged-out at process start; [`SessionContext::login`]
/// establishes the session and [`SessionContext::logout`] tears it down.
pub struct SessionContext {
    directory: Arc<dyn UserDirectory>,
    session_id: Uuid,
    active: Mutex<Option<ActiveSession>>,
}

impl SessionContext {
    /// A fresh, logged-out context over the given directory.
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            directory,
            session_id: Uuid::new_v4(),
            active: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exchange credentials for a session, replacing any previous one.
    pub async fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<UserRecord, DirectoryError> {
        let payload = self.directory.login(credentials).await?;
        let profile = payload.profile.clone();
        *self.lock() = Some(ActiveSession {
            token: payload.token,
            profile: payload.profile,
        });
        info!(session = %self.session_id, user = %profile.id(), "session established");
        Ok(profile)
    }

    /// Re-fetch the profile behind the stored token.
    pub async fn refresh_profile(&self) -> Result<UserRecord, SessionError> {
        let token = self.token().ok_or(SessionError::NotAuthenticated)?;
        let profile = self.directory.current_user(&token).await?;
        if let Some(active) = self.lock().as_mut() {
            active.profile = profile.clone();
        }
        Ok(profile)
    }

    /// True when a login has succeeded and not been torn down.
    pub fn is_authenticated(&self) -> bool {
        self.lock().is_some()
    }

    /// Profile of the authenticated user, if any.
    pub fn profile(&self) -> Option<UserRecord> {
        self.lock().as_ref().map(|active| active.profile.clone())
    }

    /// Stored access token, if any.
    pub fn token(&self) -> Option<AccessToken> {
        self.lock().as_ref().map(|active| active.token.clone())
    }

    /// Tear the session down. Idempotent.
    pub fn logout(&self) {
        let had_session = self.lock().take().is_some();
        if had_session {
            debug!(session = %self.session_id, "session torn down");
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;
    use crate::domain::ports::{AuthPayload, MockUserDirectory};
    use crate::domain::user::UserId;
    use rstest::rstest;

    fn profile() -> UserRecord {
        UserRecord::new(UserId::new(1), "Emily", "Johnson", "emily@example.com", 28)
    }

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyUsername)]
    #[case("   ", "pw", LoginValidationError::EmptyUsername)]
    #[case("user", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn username_is_trimmed_but_password_kept_verbatim() {
        let creds = LoginCredentials::try_from_parts("  emilys  ", " pass ")
            .expect("valid inputs should succeed");
        assert_eq!(creds.username(), "emilys");
        assert_eq!(creds.password(), " pass ");
    }

    #[test]
    fn access_token_debug_is_redacted() {
        let token = AccessToken::new("secret-token");
        assert_eq!(format!("{token:?}"), "AccessToken(..)");
    }

    #[tokio::test]
    async fn login_establishes_and_logout_tears_down() {
        let mut directory = MockUserDirectory::new();
        directory.expect_login().times(1).return_once(|_| {
            Ok(AuthPayload {
                token: AccessToken::new("token-1"),
                profile: profile(),
            })
        });

        let session = SessionContext::new(Arc::new(directory));
        assert!(!session.is_authenticated());

        let creds = LoginCredentials::try_from_parts("emilys", "emilyspass").expect("valid");
        let logged_in = session.login(&creds).await.expect("login succeeds");
        assert_eq!(logged_in.first_name(), "Emily");
        assert!(session.is_authenticated());
        assert_eq!(
            session.token().map(|token| token.as_str().to_owned()),
            Some("token-1".to_owned())
        );

        session.logout();
        assert!(!session.is_authenticated());
        assert!(session.profile().is_none());
    }

    #[tokio::test]
    async fn refresh_without_session_reports_not_authenticated() {
        let directory = MockUserDirectory::new();
        let session = SessionContext::new(Arc::new(directory));

        let err = session
            .refresh_profile()
            .await
            .expect_err("no session yet");
        assert_eq!(err, SessionError::NotAuthenticated);
    }

    #[tokio::test]
    async fn refresh_updates_the_stored_profile() {
        let mut directory = MockUserDirectory::new();
        directory.expect_login().times(1).return_once(|_| {
            Ok(AuthPayload {
                token: AccessToken::new("token-1"),
                profile: profile(),
            })
        });
        directory.expect_current_user().times(1).return_once(|_| {
            let mut refreshed = profile();
            refreshed.apply(&crate::domain::user::UserPatch {
                age: Some(29),
                ..Default::default()
            });
            Ok(refreshed)
        });

        let session = SessionContext::new(Arc::new(directory));
        let creds = LoginCredentials::try_from_parts("emilys", "emilyspass").expect("valid");
        session.login(&creds).await.expect("login succeeds");

        let refreshed = session.refresh_profile().await.expect("refresh succeeds");
        assert_eq!(refreshed.age(), 29);
        assert_eq!(session.profile().map(|p| p.age()), Some(29));
    }
}

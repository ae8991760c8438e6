//! Reqwest-backed user directory adapter.
//!
//! This adapter owns transport details only: URL assembly, timeout and
//! HTTP error mapping, and JSON decoding into domain records.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::dto::{LoginDto, LoginRequestDto, NewUserDto, UserDto, UserPatchDto, UsersPageDto};
use crate::domain::ports::{AuthPayload, DirectoryError, UserBatch, UserDirectory};
use crate::domain::session::{AccessToken, LoginCredentials};
use crate::domain::user::{UserDraft, UserId, UserPatch, UserRecord};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Directory adapter performing HTTP requests against one base URL.
pub struct HttpDirectory {
    client: Client,
    base: Url,
}

impl HttpDirectory {
    /// Build an adapter with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, DirectoryError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                DirectoryError::invalid_request("directory base URL cannot carry path segments")
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, DirectoryError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        serde_json::from_slice(body.as_ref()).map_err(|error| {
            DirectoryError::decode(format!("invalid directory JSON payload: {error}"))
        })
    }
}

#[async_trait]
impl UserDirectory for HttpDirectory {
    async fn fetch_page(&self, limit: usize, skip: usize) -> Result<UserBatch, DirectoryError> {
        let request = self.client.get(self.endpoint(&["users"])?).query(&[
            ("limit", limit.to_string()),
            ("skip", skip.to_string()),
        ]);
        let page: UsersPageDto = self.execute(request).await?;
        Ok(page.into_batch())
    }

    async fn search(&self, query: &str) -> Result<UserBatch, DirectoryError> {
        // limit=0 asks the directory for every match, not none.
        let request = self
            .client
            .get(self.endpoint(&["users", "search"])?)
            .query(&[("q", query), ("limit", "0")]);
        let page: UsersPageDto = self.execute(request).await?;
        Ok(page.into_batch())
    }

    async fn create(&self, draft: &UserDraft) -> Result<UserRecord, DirectoryError> {
        let request = self
            .client
            .post(self.endpoint(&["users", "add"])?)
            .json(&NewUserDto::from(draft));
        let user: UserDto = self.execute(request).await?;
        Ok(user.into_record())
    }

    async fn update(&self, id: UserId, patch: &UserPatch) -> Result<UserRecord, DirectoryError> {
        let request = self
            .client
            .put(self.endpoint(&["users", &id.to_string()])?)
            .json(&UserPatchDto::from(patch));
        let user: UserDto = self.execute(request).await?;
        Ok(user.into_record())
    }

    async fn delete(&self, id: UserId) -> Result<(), DirectoryError> {
        let request = self.client.delete(self.endpoint(&["users", &id.to_string()])?);
        // The directory echoes the deleted record; only the status matters.
        self.execute::<serde_json::Value>(request).await.map(|_| ())
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthPayload, DirectoryError> {
        let request = self
            .client
            .post(self.endpoint(&["auth", "login"])?)
            .json(&LoginRequestDto {
                username: credentials.username(),
                password: credentials.password(),
            });
        let login: LoginDto = self.execute(request).await?;
        login.into_payload().map_err(DirectoryError::decode)
    }

    async fn current_user(&self, token: &AccessToken) -> Result<UserRecord, DirectoryError> {
        let request = self
            .client
            .get(self.endpoint(&["auth", "me"])?)
            .bearer_auth(token.as_str());
        let user: UserDto = self.execute(request).await?;
        Ok(user.into_record())
    }
}

fn map_transport_error(error: reqwest::Error) -> DirectoryError {
    if error.is_timeout() {
        DirectoryError::timeout(error.to_string())
    } else {
        DirectoryError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> DirectoryError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DirectoryError::unauthorized(message),
        StatusCode::NOT_FOUND => DirectoryError::not_found(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            DirectoryError::timeout(message)
        }
        _ if status.is_client_error() => DirectoryError::invalid_request(message),
        _ => DirectoryError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

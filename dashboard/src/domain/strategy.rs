//! Deployment-mode strategies for fetching and persisting records.
//!
//! The two deployment modes differ in where filtering and persistence
//! happen, and nothing else, so the difference lives behind one trait.
//! [`LocalCacheStrategy`] mirrors the whole directory once and then works
//! purely in memory, simulating persistence. [`BackendSearchStrategy`]
//! delegates the search filter to the directory and persists every
//! mutation remotely, applying only the reconciled response.

use async_trait::async_trait;
use tracing::debug;

use super::ports::{DirectoryError, UserDirectory};
use super::query::QueryState;
use super::user::{UserDraft, UserId, UserPatch, UserRecord};

/// Batch size used when mirroring the full directory.
const MIRROR_BATCH_SIZE: usize = 100;

/// How records are fetched and mutations persisted for one deployment mode.
#[async_trait]
pub trait QueryStrategy: Send + Sync {
    /// Whether [`crate::domain::query::run_query`] must apply the search
    /// text locally. False when the candidate set is already
    /// directory-filtered.
    fn applies_search_locally(&self) -> bool;

    /// Fetch the initial candidate set for an empty store.
    async fn prime(&self, directory: &dyn UserDirectory)
    -> Result<Vec<UserRecord>, DirectoryError>;

    /// Fetch a replacement candidate set after a filter change.
    ///
    /// `Ok(None)` means the current store contents stay authoritative and
    /// only the local query needs re-running.
    async fn refresh(
        &self,
        directory: &dyn UserDirectory,
        state: &QueryState,
    ) -> Result<Option<Vec<UserRecord>>, DirectoryError>;

    /// Persist a creation and return the record to insert locally.
    async fn persist_add(
        &self,
        directory: &dyn UserDirectory,
        draft: UserDraft,
    ) -> Result<UserRecord, DirectoryError>;

    /// Persist an update. `Ok(Some(record))` carries the directory's
    /// reconciled view to put into the store; `Ok(None)` means the caller
    /// merges the patch locally.
    async fn persist_update(
        &self,
        directory: &dyn UserDirectory,
        id: UserId,
        patch: &UserPatch,
    ) -> Result<Option<UserRecord>, DirectoryError>;

    /// Persist a deletion before the local record is removed.
    async fn persist_delete(
        &self,
        directory: &dyn UserDirectory,
        id: UserId,
    ) -> Result<(), DirectoryError>;
}

/// Page through the bulk endpoint until the whole directory is mirrored.
async fn mirror_all(directory: &dyn UserDirectory) -> Result<Vec<UserRecord>, DirectoryError> {
    let mut mirrored = Vec::new();
    let mut skip = 0;
    loop {
        let batch = directory.fetch_page(MIRROR_BATCH_SIZE, skip).await?;
        let fetched = batch.users.len();
        mirrored.extend(batch.users);
        skip += fetched;
        if mirrored.len() >= batch.total || fetched == 0 {
            debug!(records = mirrored.len(), "directory mirror complete");
            return Ok(mirrored);
        }
    }
}

/// Mirror everything once, then filter and mutate purely in memory.
#[derive(Debug, Default)]
pub struct LocalCacheStrategy;

#[async_trait]
impl QueryStrategy for LocalCacheStrategy {
    fn applies_search_locally(&self) -> bool {
        true
    }

    async fn prime(
        &self,
        directory: &dyn UserDirectory,
    ) -> Result<Vec<UserRecord>, DirectoryError> {
        mirror_all(directory).await
    }

    async fn refresh(
        &self,
        _directory: &dyn UserDirectory,
        _state: &QueryState,
    ) -> Result<Option<Vec<UserRecord>>, DirectoryError> {
        // The mirror stays authoritative; filtering is purely local.
        Ok(None)
    }

    async fn persist_add(
        &self,
        _directory: &dyn UserDirectory,
        draft: UserDraft,
    ) -> Result<UserRecord, DirectoryError> {
        Ok(UserRecord::from_draft(UserId::minted_now(), draft))
    }

    async fn persist_update(
        &self,
        _directory: &dyn UserDirectory,
        _id: UserId,
        _patch: &UserPatch,
    ) -> Result<Option<UserRecord>, DirectoryError> {
        Ok(None)
    }

    async fn persist_delete(
        &self,
        _directory: &dyn UserDirectory,
        _id: UserId,
    ) -> Result<(), DirectoryError> {
        Ok(())
    }
}

/// Delegate search to the directory and persist mutations remotely.
#[derive(Debug, Default)]
pub struct BackendSearchStrategy;

#[async_trait]
impl QueryStrategy for BackendSearchStrategy {
    fn applies_search_locally(&self) -> bool {
        false
    }

    async fn prime(
        &self,
        directory: &dyn UserDirectory,
    ) -> Result<Vec<UserRecord>, DirectoryError> {
        mirror_all(directory).await
    }

    async fn refresh(
        &self,
        directory: &dyn UserDirectory,
        state: &QueryState,
    ) -> Result<Option<Vec<UserRecord>>, DirectoryError> {
        let query = state.search().trim();
        if query.is_empty() {
            return Ok(Some(mirror_all(directory).await?));
        }
        let batch = directory.search(query).await?;
        debug!(
            query,
            records = batch.users.len(),
            "directory search applied"
        );
        Ok(Some(batch.users))
    }

    async fn persist_add(
        &self,
        directory: &dyn UserDirectory,
        draft: UserDraft,
    ) -> Result<UserRecord, DirectoryError> {
        directory.create(&draft).await
    }

    async fn persist_update(
        &self,
        directory: &dyn UserDirectory,
        id: UserId,
        patch: &UserPatch,
    ) -> Result<Option<UserRecord>, DirectoryError> {
        directory.update(id, patch).await.map(Some)
    }

    async fn persist_delete(
        &self,
        directory: &dyn UserDirectory,
        id: UserId,
    ) -> Result<(), DirectoryError> {
        directory.delete(id).await
    }
}

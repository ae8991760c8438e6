//! Deterministic directory double with scriptable latency and failures.
//!
//! Unlike a mock, this double keeps real records and answers queries from
//! them, so scenarios read like conversations with a tiny directory. Delay
//! queues let a test make one response arrive later than another without
//! touching wall-clock time.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use dashboard::domain::ports::{AuthPayload, DirectoryError, UserBatch, UserDirectory};
use dashboard::domain::session::{AccessToken, LoginCredentials};
use dashboard::domain::user::{UserDraft, UserId, UserPatch, UserRecord};
use tokio::time::sleep;

pub fn record(id: u64, first: &str, last: &str, age: u32) -> UserRecord {
    UserRecord::new(
        UserId::new(id),
        first,
        last,
        format!("user{id}@example.com"),
        age,
    )
}

pub fn bulk_records(count: u64) -> Vec<UserRecord> {
    (1..=count)
        .map(|id| record(id, "Bulk", "Example", 30))
        .collect()
}

#[derive(Default)]
pub struct ScriptedDirectory {
    records: Mutex<Vec<UserRecord>>,
    fetch_delays: Mutex<VecDeque<Duration>>,
    search_delays: Mutex<VecDeque<Duration>>,
    fail_next_fetch: Mutex<Option<DirectoryError>>,
    next_id: AtomicU64,
}

impl ScriptedDirectory {
    pub fn with_records(records: Vec<UserRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            next_id: AtomicU64::new(10_000),
            ..Self::default()
        }
    }

    /// Queue a latency for the next bulk fetch.
    pub fn push_fetch_delay(&self, delay: Duration) {
        Self::lock(&self.fetch_delays).push_back(delay);
    }

    /// Queue a latency for the next search call.
    pub fn push_search_delay(&self, delay: Duration) {
        Self::lock(&self.search_delays).push_back(delay);
    }

    /// Make the next bulk fetch fail with `error`.
    pub fn fail_next_fetch(&self, error: DirectoryError) {
        *Self::lock(&self.fail_next_fetch) = Some(error);
    }

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn pause(delays: &Mutex<VecDeque<Duration>>) {
        let delay = Self::lock(delays).pop_front();
        if let Some(delay) = delay {
            sleep(delay).await;
        }
    }
}

#[async_trait]
impl UserDirectory for ScriptedDirectory {
    async fn fetch_page(&self, limit: usize, skip: usize) -> Result<UserBatch, DirectoryError> {
        Self::pause(&self.fetch_delays).await;
        if let Some(error) = Self::lock(&self.fail_next_fetch).take() {
            return Err(error);
        }
        let records = Self::lock(&self.records);
        let total = records.len();
        let users = records.iter().skip(skip).take(limit).cloned().collect();
        Ok(UserBatch { users, total })
    }

    async fn search(&self, query: &str) -> Result<UserBatch, DirectoryError> {
        Self::pause(&self.search_delays).await;
        let needle = query.to_lowercase();
        let records = Self::lock(&self.records);
        let users: Vec<UserRecord> = records
            .iter()
            .filter(|candidate| candidate.full_name().to_lowercase().contains(&needle))
            .cloned()
            .collect();
        let total = users.len();
        Ok(UserBatch { users, total })
    }

    async fn create(&self, draft: &UserDraft) -> Result<UserRecord, DirectoryError> {
        let id = UserId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let created = UserRecord::from_draft(id, draft.clone());
        Self::lock(&self.records).insert(0, created.clone());
        Ok(created)
    }

    async fn update(&self, id: UserId, patch: &UserPatch) -> Result<UserRecord, DirectoryError> {
        let mut records = Self::lock(&self.records);
        let Some(target) = records.iter_mut().find(|candidate| candidate.id() == id) else {
            return Err(DirectoryError::not_found(format!("user {id}")));
        };
        target.apply(patch);
        Ok(target.clone())
    }

    async fn delete(&self, id: UserId) -> Result<(), DirectoryError> {
        let mut records = Self::lock(&self.records);
        let before = records.len();
        records.retain(|candidate| candidate.id() != id);
        if records.len() == before {
            return Err(DirectoryError::not_found(format!("user {id}")));
        }
        Ok(())
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthPayload, DirectoryError> {
        let profile = Self::lock(&self.records).first().cloned().ok_or_else(|| {
            DirectoryError::unauthorized(format!("unknown user {}", credentials.username()))
        })?;
        Ok(AuthPayload {
            token: AccessToken::new("scripted-token"),
            profile,
        })
    }

    async fn current_user(&self, _token: &AccessToken) -> Result<UserRecord, DirectoryError> {
        Self::lock(&self.records)
            .first()
            .cloned()
            .ok_or_else(|| DirectoryError::not_found("no users scripted"))
    }
}

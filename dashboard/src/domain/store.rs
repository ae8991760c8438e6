//! In-memory record store.
//!
//! The store is the single owner of the mutable record collection. In
//! local-cache mode it mirrors the whole remote data set; in
//! backend-delegated mode it holds the most recent remote response. Either
//! way the query engine reads it through an immutable snapshot.

use thiserror::Error;

use super::user::{UserId, UserPatch, UserRecord};

/// Errors surfaced when a mutation targets a missing record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No record carries the given identifier. The store is unchanged.
    #[error("no record with id {id}")]
    NotFound {
        /// Identifier the caller asked for.
        id: UserId,
    },
}

impl StoreError {
    /// Helper for missing mutation targets.
    pub fn not_found(id: UserId) -> Self {
        Self::NotFound { id }
    }
}

/// Ordered, in-memory collection of user records.
///
/// Iteration order is insertion order with the newest record first, which
/// is what the list view renders when no filter is active.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<UserRecord>,
}

impl RecordStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a record first in iteration order and return its identifier.
    pub fn insert(&mut self, record: UserRecord) -> UserId {
        let id = record.id();
        self.records.insert(0, record);
        id
    }

    /// Merge a partial update into the record with `id`.
    ///
    /// Returns a clone of the updated record so callers can publish it
    /// without re-reading the store.
    pub fn update(&mut self, id: UserId, patch: &UserPatch) -> Result<UserRecord, StoreError> {
        let record = self
            .records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or_else(|| StoreError::not_found(id))?;
        record.apply(patch);
        Ok(record.clone())
    }

    /// Replace the record with the same identifier, or insert it first when
    /// absent. Used to reconcile a remote mutation echo.
    pub fn put(&mut self, record: UserRecord) {
        match self.records.iter_mut().find(|held| held.id() == record.id()) {
            Some(held) => *held = record,
            None => {
                self.records.insert(0, record);
            }
        }
    }

    /// Remove the record with `id`.
    pub fn delete(&mut self, id: UserId) -> Result<(), StoreError> {
        let before = self.records.len();
        self.records.retain(|record| record.id() != id);
        if self.records.len() == before {
            return Err(StoreError::not_found(id));
        }
        Ok(())
    }

    /// Discard the current collection in favour of a fresh mirror.
    pub fn replace(&mut self, records: Vec<UserRecord>) {
        self.records = records;
    }

    /// Read-only snapshot in iteration order.
    pub fn all(&self) -> &[UserRecord] {
        &self.records
    }

    /// Look up a single record.
    pub fn get(&self, id: UserId) -> Option<&UserRecord> {
        self.records.iter().find(|record| record.id() == id)
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;
    use crate::domain::user::UserPatch;

    fn record(id: u64, first: &str) -> UserRecord {
        UserRecord::new(UserId::new(id), first, "Example", "user@example.com", 30)
    }

    #[test]
    fn insert_places_newest_first() {
        let mut store = RecordStore::new();
        store.insert(record(1, "First"));
        store.insert(record(2, "Second"));

        let ids: Vec<u64> = store.all().iter().map(|r| r.id().value()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn update_merges_and_returns_the_new_record() {
        let mut store = RecordStore::new();
        store.insert(record(1, "Ada"));

        let updated = store
            .update(
                UserId::new(1),
                &UserPatch {
                    last_name: Some("Lovelace".into()),
                    ..UserPatch::default()
                },
            )
            .expect("record exists");

        assert_eq!(updated.full_name(), "Ada Lovelace");
        assert_eq!(
            store.get(UserId::new(1)).map(UserRecord::full_name),
            Some("Ada Lovelace")
        );
    }

    #[test]
    fn update_of_missing_record_is_a_noop() {
        let mut store = RecordStore::new();
        store.insert(record(1, "Ada"));

        let err = store
            .update(UserId::new(9), &UserPatch::default())
            .expect_err("missing id must fail");
        assert_eq!(err, StoreError::not_found(UserId::new(9)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_removes_exactly_one_record() {
        let mut store = RecordStore::new();
        store.insert(record(1, "Ada"));
        store.insert(record(2, "Grace"));

        store.delete(UserId::new(1)).expect("record exists");
        assert_eq!(store.len(), 1);
        assert!(store.get(UserId::new(1)).is_none());

        let err = store.delete(UserId::new(1)).expect_err("already gone");
        assert_eq!(err, StoreError::not_found(UserId::new(1)));
    }

    #[test]
    fn put_reconciles_a_remote_echo_in_place() {
        let mut store = RecordStore::new();
        store.insert(record(1, "Ada"));
        store.insert(record(2, "Grace"));

        store.put(record(1, "Augusta"));
        let ids: Vec<u64> = store.all().iter().map(|r| r.id().value()).collect();
        assert_eq!(ids, vec![2, 1], "in-place update keeps order");
        assert_eq!(
            store.get(UserId::new(1)).map(UserRecord::first_name),
            Some("Augusta")
        );

        store.put(record(3, "Edith"));
        assert_eq!(store.all().first().map(UserRecord::id), Some(UserId::new(3)));
    }

    #[test]
    fn replace_swaps_the_whole_mirror() {
        let mut store = RecordStore::new();
        store.insert(record(1, "Ada"));

        store.replace(vec![record(7, "Grace"), record(8, "Edith")]);
        assert_eq!(store.len(), 2);
        assert!(store.get(UserId::new(1)).is_none());
    }
}

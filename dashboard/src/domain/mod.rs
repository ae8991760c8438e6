//! Domain model and services for the admin console state core.
//!
//! Everything in here is transport-agnostic: the only edge towards the
//! outside world is the [`ports::UserDirectory`] trait, implemented by the
//! outbound adapters. The rest is pure state — records, filters, paging —
//! plus the async orchestration that keeps them coherent.

pub mod debounce;
pub mod ports;
pub mod query;
pub mod session;
pub mod store;
pub mod strategy;
pub mod user;
pub mod users_service;

pub use ports::{AuthPayload, DirectoryError, UserBatch, UserDirectory};
pub use query::QueryState;
pub use session::{AccessToken, LoginCredentials, LoginValidationError, SessionContext, SessionError};
pub use store::{RecordStore, StoreError};
pub use strategy::{BackendSearchStrategy, LocalCacheStrategy, QueryStrategy};
pub use user::{UserDraft, UserId, UserPatch, UserProfile, UserRecord};
pub use users_service::{ListSnapshot, LoadIndicator, MutationError, UserListService};

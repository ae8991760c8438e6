//! State-management core for a user administration console.
//!
//! The crate keeps a remote user directory, a local record store and a
//! paginated, filtered view of it coherent while the embedding shell
//! forwards view intents (search keystrokes, filter changes, page moves,
//! CRUD submissions). It is headless: rendering, routing and widget
//! concerns stay with the embedder, which polls
//! [`UserListService::snapshot`] after its intents settle.

pub mod config;
pub mod domain;
pub mod outbound;

pub use config::{ConsoleConfig, FetchMode};
pub use domain::{
    DirectoryError, ListSnapshot, LoadIndicator, LoginCredentials, MutationError, SessionContext,
    UserDirectory, UserDraft, UserId, UserListService, UserPatch, UserRecord,
};
pub use outbound::HttpDirectory;

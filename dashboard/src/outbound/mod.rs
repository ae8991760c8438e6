//! Outbound adapters.
//!
//! Implementations of the domain ports against concrete transports.

pub mod directory;

pub use directory::HttpDirectory;

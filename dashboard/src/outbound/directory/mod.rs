//! User directory outbound adapters.
//!
//! This module provides a thin HTTP implementation of the
//! `UserDirectory` port.

mod dto;
mod http_directory;

pub use http_directory::HttpDirectory;

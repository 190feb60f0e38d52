//! Searchfill Remote: HTTP transport for searchable field queries.

pub mod client;
pub mod config;
pub mod error;

pub use client::SuggestionClient;
pub use config::RemoteConfig;
pub use error::{RemoteError, Result};

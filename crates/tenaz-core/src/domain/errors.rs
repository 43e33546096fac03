//! Error taxonomy
//!
//! Every crate in the workspace reports failures through this enum.
//! Remote errors carry the originating method and URL so the CLI can
//! print a grep-able failure line; credential values never appear in
//! error text.

use thiserror::Error;

/// Workspace-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by tenaz operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Credential invalid, token acquisition refused, or consent missing.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// File not found, unreadable, or write failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Neither JSON nor YAML, a missing required field, or a wrong shape.
    #[error("format error: {0}")]
    Format(String),

    /// Transport failure or timeout.
    #[error("network error: {0}")]
    Network(String),

    /// 4xx/5xx with a structured error body from the backend.
    #[error("{method} {url}: {message}")]
    Remote {
        method: String,
        url: String,
        message: String,
    },

    /// More than one object resolved a lookup key that must be unique.
    #[error("collision: {0}")]
    Collision(String),
}

impl Error {
    /// Build a remote error from the pieces of a failed API call.
    pub fn remote(method: &str, url: &str, message: impl Into<String>) -> Self {
        Self::Remote {
            method: method.to_string(),
            url: url.to_string(),
            message: message.into(),
        }
    }
}

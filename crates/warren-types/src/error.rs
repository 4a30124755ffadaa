//! Error types for warren.

use std::io;

/// Errors produced by the warren client.
#[derive(Debug, thiserror::Error)]
pub enum WarrenError {
    /// The address could not be decoded as a gopher URI.
    #[error("bad URI: {0}")]
    Uri(String),

    /// A menu line could not be parsed. Callers are expected to skip
    /// the offending line rather than abort the whole menu.
    #[error("bad menu line: {0}")]
    MenuLine(String),

    /// Dial, read, or write failure, including timeouts.
    #[error("network error: {0}")]
    Network(String),

    /// No page handler for this item type.
    #[error("no handler for item type '{0}'")]
    Unsupported(char),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, WarrenError>;

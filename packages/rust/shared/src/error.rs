//! Error types for routeman.
//!
//! Library crates use [`RoutemanError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Number of characters of offending input quoted in [`RoutemanError::MalformedInput`].
pub const SNIPPET_LEN: usize = 100;

/// Top-level error type for all routeman operations.
#[derive(Debug, thiserror::Error)]
pub enum RoutemanError {
    /// The route-listing command could not be spawned or exited non-zero.
    #[error("route listing command `{command}` failed ({status}){}", stderr_suffix(.stderr))]
    UpstreamCommand {
        command: String,
        status: String,
        stderr: String,
    },

    /// The route listing is not valid JSON or does not match the expected shape.
    #[error("malformed route listing: {message} (input starts with: {snippet:?})")]
    MalformedInput { message: String, snippet: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The collection could not be serialized.
    #[error("output error: {message}")]
    Output { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RoutemanError>;

impl RoutemanError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a malformed-input error, quoting the start of `content`.
    pub fn malformed(msg: impl Into<String>, content: &str) -> Self {
        Self::MalformedInput {
            message: msg.into(),
            snippet: content.chars().take(SNIPPET_LEN).collect(),
        }
    }

    /// Create an output error from any displayable message.
    pub fn output(msg: impl Into<String>) -> Self {
        Self::Output {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

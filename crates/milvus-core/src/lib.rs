//! Core types shared by the Milvus toolkit crates.
//!
//! - [`ConnectConfig`] describes where the server lives and how to
//!   authenticate against it.
//! - [`DatabaseProperties`] and [`DatabaseDescription`] model the database
//!   level settings exposed by the REST API.
//! - [`MilvusError`] is the single error type returned by every fallible
//!   operation in the workspace.

mod config;
mod database;

pub use config::{
    ConnectConfig, DEFAULT_TIMEOUT, ENV_DB_NAME, ENV_TIMEOUT_SECS, ENV_TOKEN, ENV_URI,
};
pub use database::{validate_database_name, DatabaseDescription, DatabaseProperties};

// ---------------------------------------------------------------------------
// MilvusError
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum MilvusError {
    #[error("config error: {0}")]
    Config(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("parsing error: {0}")]
    Parsing(String),
    #[error("http error ({status}): {body}")]
    Http { status: u16, body: String },
    #[error("server error (code {code}): {message}")]
    Server { code: i64, message: String },
}

impl MilvusError {
    /// Whether retrying the same request may succeed.
    ///
    /// Only connection-level failures qualify. A server that answered, even
    /// with an error, is not retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, MilvusError::Transport(_) | MilvusError::Timeout(_))
    }
}

//! Entry point logic: build the connection config for the lab server and
//! hand it to a client constructor.
//!
//! The constructor is a parameter so the binary can pass
//! [`MilvusClient::new`] while tests pass anything that records the call.

use milvus_client::{ConnectConfig, MilvusClient, MilvusError};

/// Address of the lab Milvus server.
pub const DEFAULT_URI: &str = "http://192.168.31.48:30530";
/// Built-in `user:password` credential of the lab server.
pub const DEFAULT_TOKEN: &str = "root:Milvus";

pub fn default_config() -> ConnectConfig {
    ConnectConfig::new(DEFAULT_URI).with_token(DEFAULT_TOKEN)
}

/// Build the default config and construct exactly one client from it.
pub fn run<C, F>(construct: F) -> Result<C, MilvusError>
where
    F: FnOnce(ConnectConfig) -> Result<C, MilvusError>,
{
    let config = default_config();
    tracing::debug!(?config, "constructing Milvus client");
    construct(config)
}

/// [`run`] with the reqwest-backed client.
pub fn connect() -> Result<MilvusClient, MilvusError> {
    run(MilvusClient::new)
}

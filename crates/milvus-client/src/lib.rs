//! Milvus client for the Milvus toolkit.
//!
//! This crate provides [`MilvusClient`], a handle to a
//! [Milvus](https://milvus.io/) server using its REST API v2. It covers
//! connection checks (users, databases, collections) and the database
//! lifecycle (create, describe, alter properties, drop properties, drop).
//!
//! # Example
//!
//! ```rust,no_run
//! use milvus_client::{ConnectConfig, DatabaseProperties, MilvusClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConnectConfig::new("http://localhost:19530").with_token("root:Milvus");
//! let client = MilvusClient::new(config)?;
//! println!("{:?}", client.list_databases().await?);
//!
//! let props = DatabaseProperties::new().with_max_collections(2);
//! client.create_database("my_database_1", &props).await?;
//! client.close();
//! # Ok(())
//! # }
//! ```

mod backend;
mod client;
mod retry;

pub use backend::{FakeBackend, HttpBackend, MilvusBackend, MilvusRequest, MilvusResponse};
pub use client::MilvusClient;
pub use retry::RetryPolicy;

// Re-export core types for convenience.
pub use milvus_core::{ConnectConfig, DatabaseDescription, DatabaseProperties, MilvusError};

use std::sync::Arc;

use milvus_core::{
    validate_database_name, ConnectConfig, DatabaseDescription, DatabaseProperties, MilvusError,
};
use serde_json::{json, Value};

use crate::backend::{HttpBackend, MilvusBackend, MilvusRequest};
use crate::retry::RetryPolicy;

const USERS_LIST: &str = "/v2/vectordb/users/list";
const DATABASES_LIST: &str = "/v2/vectordb/databases/list";
const DATABASES_CREATE: &str = "/v2/vectordb/databases/create";
const DATABASES_DESCRIBE: &str = "/v2/vectordb/databases/describe";
const DATABASES_ALTER: &str = "/v2/vectordb/databases/alter";
const DATABASES_DROP_PROPERTIES: &str = "/v2/vectordb/databases/drop_properties";
const DATABASES_DROP: &str = "/v2/vectordb/databases/drop";
const COLLECTIONS_LIST: &str = "/v2/vectordb/collections/list";
const COLLECTIONS_HAS: &str = "/v2/vectordb/collections/has";

/// Whether the configured database is added to a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Server,
    Database,
}

/// Handle to a Milvus server, speaking the REST API v2.
///
/// Construction is lazy: [`new`](MilvusClient::new) only validates the
/// configuration. The first request opens the connection.
pub struct MilvusClient {
    config: ConnectConfig,
    backend: Arc<dyn MilvusBackend>,
    retry: RetryPolicy,
}

impl MilvusClient {
    /// Create a client backed by reqwest.
    pub fn new(config: ConnectConfig) -> Result<Self, MilvusError> {
        Self::with_backend(config, Arc::new(HttpBackend::new()))
    }

    /// Create a client that sends requests through `backend`.
    pub fn with_backend(
        config: ConnectConfig,
        backend: Arc<dyn MilvusBackend>,
    ) -> Result<Self, MilvusError> {
        config.validate()?;
        tracing::info!(
            uri = %config.base_url(),
            db_name = config.db_name.as_deref().unwrap_or("default"),
            authenticated = config.token.is_some(),
            "Milvus client created"
        );
        Ok(Self {
            config,
            backend,
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the retry policy (default: 3 attempts, 500ms base delay).
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Return a reference to the configuration.
    pub fn config(&self) -> &ConnectConfig {
        &self.config
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    // -----------------------------------------------------------------------
    // Users and databases
    // -----------------------------------------------------------------------

    pub async fn list_users(&self) -> Result<Vec<String>, MilvusError> {
        let data = self.call(USERS_LIST, json!({}), Scope::Server).await?;
        string_list(data, "users")
    }

    pub async fn list_databases(&self) -> Result<Vec<String>, MilvusError> {
        let data = self.call(DATABASES_LIST, json!({}), Scope::Server).await?;
        string_list(data, "databases")
    }

    /// Create a database. Fails with [`MilvusError::Server`] if it exists.
    pub async fn create_database(
        &self,
        name: &str,
        properties: &DatabaseProperties,
    ) -> Result<(), MilvusError> {
        validate_database_name(name)?;
        let mut body = json!({ "dbName": name });
        if !properties.is_empty() {
            body["properties"] = properties.to_value();
        }
        self.call_write(DATABASES_CREATE, body).await?;
        Ok(())
    }

    pub async fn describe_database(&self, name: &str) -> Result<DatabaseDescription, MilvusError> {
        validate_database_name(name)?;
        let data = self
            .call(DATABASES_DESCRIBE, json!({ "dbName": name }), Scope::Server)
            .await?;
        DatabaseDescription::from_value(data)
    }

    pub async fn alter_database_properties(
        &self,
        name: &str,
        properties: &DatabaseProperties,
    ) -> Result<(), MilvusError> {
        validate_database_name(name)?;
        if properties.is_empty() {
            return Err(MilvusError::Validation(
                "alter requires at least one property".to_string(),
            ));
        }
        let body = json!({ "dbName": name, "properties": properties.to_value() });
        self.call_write(DATABASES_ALTER, body).await?;
        Ok(())
    }

    /// Remove properties from a database. An empty key set sends nothing.
    pub async fn drop_database_properties<I, S>(
        &self,
        name: &str,
        keys: I,
    ) -> Result<(), MilvusError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        validate_database_name(name)?;
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Ok(());
        }
        let body = json!({ "dbName": name, "propertyKeys": keys });
        self.call_write(DATABASES_DROP_PROPERTIES, body).await?;
        Ok(())
    }

    pub async fn drop_database(&self, name: &str) -> Result<(), MilvusError> {
        validate_database_name(name)?;
        self.call_write(DATABASES_DROP, json!({ "dbName": name })).await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Collections (scoped to the configured database)
    // -----------------------------------------------------------------------

    pub async fn list_collections(&self) -> Result<Vec<String>, MilvusError> {
        let data = self
            .call(COLLECTIONS_LIST, json!({}), Scope::Database)
            .await?;
        string_list(data, "collections")
    }

    pub async fn has_collection(&self, name: &str) -> Result<bool, MilvusError> {
        if name.is_empty() {
            return Err(MilvusError::Validation(
                "collection name must not be empty".to_string(),
            ));
        }
        let data = self
            .call(
                COLLECTIONS_HAS,
                json!({ "collectionName": name }),
                Scope::Database,
            )
            .await?;
        data["has"]
            .as_bool()
            .ok_or_else(|| MilvusError::Parsing(format!("has_collection returned {data}")))
    }

    /// Release the client. Pending requests have already completed, so this
    /// only drops the connection pool.
    pub fn close(self) {
        tracing::info!(uri = %self.config.base_url(), "Milvus client closed");
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    fn build_request(&self, path: &str, mut body: Value, scope: Scope) -> MilvusRequest {
        if scope == Scope::Database {
            if let (Some(db_name), Some(obj)) = (&self.config.db_name, body.as_object_mut()) {
                obj.entry("dbName")
                    .or_insert_with(|| Value::String(db_name.clone()));
            }
        }
        let mut headers = vec![(
            "Content-Type".to_string(),
            "application/json".to_string(),
        )];
        if let Some(ref token) = self.config.token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        MilvusRequest {
            url: format!("{}{}", self.config.base_url(), path),
            headers,
            body,
            timeout: self.config.timeout,
        }
    }

    /// Send a read-only request and unwrap the `{code, data, message}`
    /// envelope. Any transient failure is retried.
    async fn call(&self, path: &str, body: Value, scope: Scope) -> Result<Value, MilvusError> {
        self.send(path, body, scope, MilvusError::is_transient).await
    }

    /// Send a mutating request. Only failures that happened before the
    /// request reached the server are retried: after a timeout the server
    /// may already have applied it.
    async fn call_write(&self, path: &str, body: Value) -> Result<Value, MilvusError> {
        self.send(path, body, Scope::Server, |e| {
            matches!(e, MilvusError::Transport(_))
        })
        .await
    }

    async fn send(
        &self,
        path: &str,
        body: Value,
        scope: Scope,
        retryable: fn(&MilvusError) -> bool,
    ) -> Result<Value, MilvusError> {
        let request = self.build_request(path, body, scope);
        let response = self
            .retry
            .run_when(retryable, |attempt| {
                tracing::debug!(path, attempt, "sending Milvus request");
                self.backend.send(request.clone())
            })
            .await?;

        if response.status >= 400 {
            let body = match response.body {
                Value::String(s) => s,
                other => other.to_string(),
            };
            return Err(MilvusError::Http {
                status: response.status,
                body,
            });
        }

        let code = response.body["code"].as_i64().unwrap_or(0);
        if code != 0 {
            let message = response.body["message"]
                .as_str()
                .unwrap_or("")
                .to_string();
            tracing::debug!(path, code, %message, "Milvus request rejected");
            return Err(MilvusError::Server { code, message });
        }

        Ok(response.body.get("data").cloned().unwrap_or(Value::Null))
    }
}

fn string_list(data: Value, what: &str) -> Result<Vec<String>, MilvusError> {
    match data {
        Value::Null => Ok(Vec::new()),
        other => serde_json::from_value(other)
            .map_err(|e| MilvusError::Parsing(format!("invalid {what} list: {e}"))),
    }
}

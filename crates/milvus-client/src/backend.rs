use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use milvus_core::MilvusError;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct MilvusRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
    pub timeout: Duration,
}

impl MilvusRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct MilvusResponse {
    pub status: u16,
    pub body: Value,
}

impl MilvusResponse {
    /// A 200 response wrapping `data` in the success envelope.
    pub fn ok(data: Value) -> Self {
        Self {
            status: 200,
            body: serde_json::json!({ "code": 0, "data": data }),
        }
    }

    /// A 200 response carrying an API-level error code.
    pub fn api_error(code: i64, message: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: serde_json::json!({ "code": code, "message": message.into() }),
        }
    }
}

/// Sends one JSON request to the server.
#[async_trait]
pub trait MilvusBackend: Send + Sync {
    async fn send(&self, request: MilvusRequest) -> Result<MilvusResponse, MilvusError>;
}

/// Production backend using reqwest.
pub struct HttpBackend {
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Use a preconfigured reqwest client (proxy, TLS roots, pool limits).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MilvusBackend for HttpBackend {
    async fn send(&self, request: MilvusRequest) -> Result<MilvusResponse, MilvusError> {
        let mut builder = self.client.post(&request.url).timeout(request.timeout);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        builder = builder.json(&request.body);

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                MilvusError::Timeout(format!("{} timed out: {e}", request.url))
            } else {
                MilvusError::Transport(format!("HTTP request failed: {e}"))
            }
        })?;

        let status = response.status().as_u16();
        // The server has seen the request by now, so a failure here must not
        // look like a connection error.
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                MilvusError::Timeout(format!("{} timed out reading body: {e}", request.url))
            } else {
                MilvusError::Parsing(format!("failed to read response body: {e}"))
            }
        })?;

        // Gateways in front of the server answer errors in plain text.
        let body = match serde_json::from_str::<Value>(&text) {
            Ok(body) => body,
            Err(_) if status >= 400 => Value::String(text),
            Err(e) => {
                return Err(MilvusError::Parsing(format!(
                    "failed to parse response JSON: {e}"
                )))
            }
        };

        Ok(MilvusResponse { status, body })
    }
}

/// Test backend with queued responses. Every request it receives is kept
/// for later inspection.
pub struct FakeBackend {
    responses: Mutex<VecDeque<Result<MilvusResponse, MilvusError>>>,
    requests: Mutex<Vec<MilvusRequest>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push_response(&self, response: MilvusResponse) -> &Self {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Ok(response));
        self
    }

    pub fn push_error(&self, error: MilvusError) -> &Self {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(error));
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<MilvusRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MilvusBackend for FakeBackend {
    async fn send(&self, request: MilvusRequest) -> Result<MilvusResponse, MilvusError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(MilvusError::Transport("FakeBackend exhausted".to_string())))
    }
}

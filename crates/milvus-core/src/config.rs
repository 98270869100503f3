use std::fmt;
use std::time::Duration;

use crate::{database::validate_database_name, MilvusError};

pub const ENV_URI: &str = "MILVUS_URI";
pub const ENV_TOKEN: &str = "MILVUS_TOKEN";
pub const ENV_DB_NAME: &str = "MILVUS_DB_NAME";
pub const ENV_TIMEOUT_SECS: &str = "MILVUS_TIMEOUT_SECS";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for connecting to a Milvus instance.
///
/// The token is either `user:password` (Milvus built-in auth) or an API key
/// (Zilliz Cloud). It is sent as a bearer token and never printed by
/// `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectConfig {
    /// Milvus endpoint URI (e.g. `http://localhost:19530`).
    pub uri: String,
    /// Optional credential.
    pub token: Option<String>,
    /// Database that scoped operations run against. `None` means the
    /// server's `default` database.
    pub db_name: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ConnectConfig {
    /// Create a new configuration pointing at `uri`.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            token: None,
            db_name: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the credential (`user:password` or API key).
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the database used by database-scoped operations.
    pub fn with_db_name(mut self, db_name: impl Into<String>) -> Self {
        self.db_name = Some(db_name.into());
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a configuration from `MILVUS_URI`, `MILVUS_TOKEN`,
    /// `MILVUS_DB_NAME` and `MILVUS_TIMEOUT_SECS`.
    ///
    /// Only `MILVUS_URI` is required. Empty values count as unset.
    pub fn from_env() -> Result<Self, MilvusError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading from an arbitrary
    /// lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MilvusError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let uri = get(ENV_URI)
            .ok_or_else(|| MilvusError::Config(format!("{ENV_URI} is not set")))?;
        let mut config = Self::new(uri);
        if let Some(token) = get(ENV_TOKEN) {
            config = config.with_token(token);
        }
        if let Some(db_name) = get(ENV_DB_NAME) {
            config = config.with_db_name(db_name);
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|e| {
                MilvusError::Config(format!("{ENV_TIMEOUT_SECS}={secs:?} is not a number: {e}"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration without touching the network.
    pub fn validate(&self) -> Result<(), MilvusError> {
        let uri = self.uri.trim();
        if uri.is_empty() {
            return Err(MilvusError::Config("uri must not be empty".to_string()));
        }
        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| MilvusError::Config(format!("uri {uri:?} has no scheme")))?;
        if !matches!(scheme.to_ascii_lowercase().as_str(), "http" | "https") {
            return Err(MilvusError::Config(format!(
                "unsupported uri scheme {scheme:?}, expected http or https"
            )));
        }
        let authority = rest.split('/').next().unwrap_or("");
        let (host, port) = split_authority(authority)
            .ok_or_else(|| MilvusError::Config(format!("uri {uri:?} has a malformed host")))?;
        if host.is_empty() || host == "[]" {
            return Err(MilvusError::Config(format!("uri {uri:?} has no host")));
        }
        if let Some(port) = port {
            if port.is_empty() || !port.chars().all(|c| c.is_ascii_digit()) {
                return Err(MilvusError::Config(format!("uri {uri:?} has an invalid port")));
            }
        }
        if matches!(&self.token, Some(t) if t.is_empty()) {
            return Err(MilvusError::Config("token must not be empty".to_string()));
        }
        if let Some(ref db_name) = self.db_name {
            validate_database_name(db_name)?;
        }
        if self.timeout.is_zero() {
            return Err(MilvusError::Config("timeout must be positive".to_string()));
        }
        Ok(())
    }

    /// The URI without trailing slashes, ready to have an API path appended.
    pub fn base_url(&self) -> &str {
        self.uri.trim().trim_end_matches('/')
    }
}

/// Split `host[:port]`, where host may be a bracketed IPv6 literal.
/// Returns `None` for an unterminated bracket or junk after it.
fn split_authority(authority: &str) -> Option<(&str, Option<&str>)> {
    if authority.starts_with('[') {
        let end = authority.find(']')?;
        let (host, rest) = authority.split_at(end + 1);
        if rest.is_empty() {
            return Some((host, None));
        }
        return rest.strip_prefix(':').map(|port| (host, Some(port)));
    }
    Some(match authority.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (authority, None),
    })
}

impl fmt::Debug for ConnectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectConfig")
            .field("uri", &self.uri)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("db_name", &self.db_name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn new_sets_defaults() {
        let config = ConnectConfig::new("http://localhost:19530");
        assert_eq!(config.uri, "http://localhost:19530");
        assert!(config.token.is_none());
        assert!(config.db_name.is_none());
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn validate_accepts_common_uris() {
        for uri in [
            "http://localhost:19530",
            "https://in01-abc.api.gcp-us-west1.zillizcloud.com",
            "http://192.168.31.48:30530/",
            "HTTP://milvus:19530",
            "http://[::1]",
            "http://[::1]:19530",
            "http://[fe80::1]:19530/",
        ] {
            assert!(ConnectConfig::new(uri).validate().is_ok(), "{uri}");
        }
    }

    #[test]
    fn validate_rejects_bad_uris() {
        for uri in [
            "",
            "   ",
            "localhost:19530",
            "grpc://localhost:19530",
            "http://",
            "http://:19530",
            "http://localhost:port",
            "http://localhost:",
            "http://[::1",
            "http://[::1]19530",
            "http://[]:19530",
        ] {
            let err = ConnectConfig::new(uri).validate().unwrap_err();
            assert!(matches!(err, MilvusError::Config(_)), "{uri}: {err}");
        }
    }

    #[test]
    fn validate_rejects_empty_token_and_bad_db() {
        let err = ConnectConfig::new("http://h:1")
            .with_token("")
            .validate()
            .unwrap_err();
        assert!(matches!(err, MilvusError::Config(_)));

        let err = ConnectConfig::new("http://h:1")
            .with_db_name("1st-db")
            .validate()
            .unwrap_err();
        assert!(matches!(err, MilvusError::Validation(_)));

        let err = ConnectConfig::new("http://h:1")
            .with_timeout(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert!(matches!(err, MilvusError::Config(_)));
    }

    #[test]
    fn base_url_trims_trailing_slash() {
        let config = ConnectConfig::new("http://localhost:19530//");
        assert_eq!(config.base_url(), "http://localhost:19530");
    }

    #[test]
    fn debug_redacts_token() {
        let config = ConnectConfig::new("http://h:1").with_token("root:Milvus");
        let printed = format!("{config:?}");
        assert!(!printed.contains("root:Milvus"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn from_lookup_reads_all_fields() {
        let config = ConnectConfig::from_lookup(lookup(&[
            (ENV_URI, "http://milvus:19530"),
            (ENV_TOKEN, "root:Milvus"),
            (ENV_DB_NAME, "analytics"),
            (ENV_TIMEOUT_SECS, "5"),
        ]))
        .unwrap();
        assert_eq!(config.uri, "http://milvus:19530");
        assert_eq!(config.token.as_deref(), Some("root:Milvus"));
        assert_eq!(config.db_name.as_deref(), Some("analytics"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn from_lookup_requires_uri() {
        let err = ConnectConfig::from_lookup(lookup(&[(ENV_TOKEN, "t")])).unwrap_err();
        assert!(err.to_string().contains(ENV_URI));

        let err = ConnectConfig::from_lookup(lookup(&[(ENV_URI, "  ")])).unwrap_err();
        assert!(matches!(err, MilvusError::Config(_)));
    }

    #[test]
    fn from_lookup_treats_empty_as_unset() {
        let config = ConnectConfig::from_lookup(lookup(&[
            (ENV_URI, "http://milvus:19530"),
            (ENV_TOKEN, ""),
            (ENV_DB_NAME, ""),
        ]))
        .unwrap();
        assert!(config.token.is_none());
        assert!(config.db_name.is_none());
    }

    #[test]
    fn from_lookup_rejects_bad_timeout() {
        let err = ConnectConfig::from_lookup(lookup(&[
            (ENV_URI, "http://milvus:19530"),
            (ENV_TIMEOUT_SECS, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, MilvusError::Config(_)));
    }
}

//! Client configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Authentication configuration for the Elasticsearch server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientAuth {
    /// Basic username/password authentication.
    Basic {
        /// The username for basic auth.
        username: String,
        /// The password for basic auth.
        password: String,
    },
    /// Bearer token authentication.
    Bearer {
        /// The bearer token.
        token: String,
    },
}

/// Configuration for an [`IndexClient`](crate::IndexClient).
///
/// Every field except `index` has a default, so a config can be deserialized
/// from a minimal document. [`ClientConfig::new`] builds the node URL from a
/// host and port for callers that don't hold a full URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Elasticsearch node URL (e.g. `http://localhost:9200`).
    #[serde(default = "default_node")]
    pub node: String,

    /// The target index. All document operations address this index.
    pub index: String,

    /// Optional mapping file applied when the index is created.
    #[serde(default)]
    pub mapping_file: Option<PathBuf>,

    /// Request timeout in milliseconds (default: 30000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Optional authentication.
    #[serde(default)]
    pub auth: Option<ClientAuth>,

    /// Whether to disable certificate validation (default: false).
    /// Only use for development/testing.
    #[serde(default)]
    pub disable_certificate_validation: bool,

    /// Number of primary shards when the index is created (default: 1).
    #[serde(default = "default_shards")]
    pub number_of_shards: u32,

    /// Number of replica shards when the index is created (default: 1).
    #[serde(default = "default_replicas")]
    pub number_of_replicas: u32,

    /// Refresh interval for the created index (default: "1s").
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: String,
}

fn default_node() -> String {
    "http://localhost:9200".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30000
}

fn default_shards() -> u32 {
    1
}

fn default_replicas() -> u32 {
    1
}

fn default_refresh_interval() -> String {
    "1s".to_string()
}

impl ClientConfig {
    /// Creates a configuration for a plain-HTTP node at `host:port` and the
    /// given target index, with all other fields at their defaults.
    pub fn new(host: &str, port: u16, index: impl Into<String>) -> Self {
        Self {
            node: format!("http://{host}:{port}"),
            index: index.into(),
            mapping_file: None,
            request_timeout_ms: default_request_timeout_ms(),
            auth: None,
            disable_certificate_validation: false,
            number_of_shards: default_shards(),
            number_of_replicas: default_replicas(),
            refresh_interval: default_refresh_interval(),
        }
    }

    /// Sets the mapping file applied when the index is created.
    pub fn with_mapping_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.mapping_file = Some(path.into());
        self
    }

    /// Sets the node URL, replacing the one built from host and port.
    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = node.into();
        self
    }

    /// Sets the authentication credentials.
    pub fn with_auth(mut self, auth: ClientAuth) -> Self {
        self.auth = Some(auth);
        self
    }
}

//! The index client handle.
//!
//! [`IndexClient`] owns a single [`Elasticsearch`] handle and one target
//! index. It is built through the [`IndexClient::connect`] factory, which
//! probes index existence, creates the index when absent, and seeds a mapping
//! from the configured file; from the caller's perspective construction is a
//! single step.

use std::fmt::Debug;
use std::time::Duration;

use elasticsearch::Elasticsearch;
use elasticsearch::auth::Credentials;
use elasticsearch::cert::CertificateValidation;
use elasticsearch::http::headers::HeaderMap;
use elasticsearch::http::request::JsonBody;
use elasticsearch::http::response::Response;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use elasticsearch::http::Method;
use serde_json::Value;

use crate::config::{ClientAuth, ClientConfig};
use crate::error::{ClientError, ClientResult};
use crate::schema::{self, MappingSkip, MappingStatus};
use crate::types::ServerInfo;

/// The minimum server version (major.minor, compared numerically) that
/// accepts mapping pushes from this client.
pub const MIN_SUPPORTED_VERSION: f64 = 1.4;

/// A client bound to one Elasticsearch index.
///
/// Constructed through [`IndexClient::connect`]; all operations address the
/// configured index. The handle holds no mutable state and performs one
/// request per call, so it can be shared freely to the extent the underlying
/// transport allows.
pub struct IndexClient {
    client: Elasticsearch,
    config: ClientConfig,
    mapping_status: MappingStatus,
}

impl Debug for IndexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexClient")
            .field("config", &self.config)
            .field("mapping_status", &self.mapping_status)
            .finish_non_exhaustive()
    }
}

impl IndexClient {
    /// Connects to the configured node and prepares the target index.
    ///
    /// Probes index existence; a missing index is created with the configured
    /// settings. When the index was just created and a mapping file is
    /// configured, the mapping is pushed, gated on the server version; the
    /// outcome is recorded and available through
    /// [`mapping_status`](Self::mapping_status). An unsupported server
    /// version or an unreadable mapping file downgrades to a logged skip; a
    /// structurally invalid mapping file or a server-side rejection fails
    /// construction.
    pub async fn connect(config: ClientConfig) -> ClientResult<Self> {
        let client = Self::build_client(&config)?;
        let mut this = Self {
            client,
            config,
            mapping_status: MappingStatus::NotRequested,
        };

        let existed = schema::index_exists(&this).await?;
        if !existed {
            schema::create_index(&this).await?;
        }

        this.mapping_status = match (this.config.mapping_file.clone(), existed) {
            (None, _) => MappingStatus::NotRequested,
            (Some(path), true) => {
                tracing::warn!(
                    "index '{}' already exists, not applying mapping file {}",
                    this.config.index,
                    path.display()
                );
                MappingStatus::Skipped(MappingSkip::IndexExists)
            }
            (Some(path), false) => schema::seed_mapping(&this, &path).await?,
        };

        Ok(this)
    }

    /// Builds the Elasticsearch client from configuration.
    fn build_client(config: &ClientConfig) -> ClientResult<Elasticsearch> {
        let url: elasticsearch::http::Url =
            config.node.parse().map_err(|e| ClientError::InvalidUrl {
                url: config.node.clone(),
                message: format!("{e}"),
            })?;

        let conn_pool = SingleNodeConnectionPool::new(url);

        let mut builder = TransportBuilder::new(conn_pool)
            .timeout(Duration::from_millis(config.request_timeout_ms));

        if config.disable_certificate_validation {
            builder = builder.cert_validation(CertificateValidation::None);
        }

        if let Some(ref auth) = config.auth {
            builder = match auth {
                ClientAuth::Basic { username, password } => {
                    builder.auth(Credentials::Basic(username.clone(), password.clone()))
                }
                ClientAuth::Bearer { token } => builder.auth(Credentials::Bearer(token.clone())),
            };
        }

        let transport = builder.build().map_err(|e| ClientError::TransportBuild {
            message: e.to_string(),
        })?;
        Ok(Elasticsearch::new(transport))
    }

    /// Returns the underlying Elasticsearch client.
    pub(crate) fn client(&self) -> &Elasticsearch {
        &self.client
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the target index name.
    pub fn index(&self) -> &str {
        &self.config.index
    }

    /// Returns the outcome of the construction-time mapping seeding.
    pub fn mapping_status(&self) -> &MappingStatus {
        &self.mapping_status
    }

    /// Fetches version and cluster metadata from the server's root endpoint.
    pub async fn info(&self) -> ClientResult<ServerInfo> {
        let response = self.client.info().send().await?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::UnexpectedStatus {
                operation: "server info",
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<ServerInfo>()
            .await
            .map_err(|e| ClientError::MalformedResponse {
                operation: "server info",
                message: e.to_string(),
            })
    }

    /// Whether the server version accepts mapping pushes.
    ///
    /// True iff the first two dot-separated components of the reported
    /// version, parsed as a decimal number, are at least
    /// [`MIN_SUPPORTED_VERSION`]. Any failure (unreachable server, malformed
    /// body, unparsable version) yields `false` with a warning log, never an
    /// error.
    pub async fn is_version_supported(&self) -> bool {
        match self.info().await {
            Ok(info) => version_at_least(&info.version.number, MIN_SUPPORTED_VERSION),
            Err(e) => {
                tracing::warn!("could not determine server version: {e}");
                false
            }
        }
    }

    /// Releases the client, closing the underlying transport.
    ///
    /// Consumes the handle, so it can be called at most once.
    pub fn close(self) {
        tracing::debug!("closing client for index '{}'", self.config.index);
        drop(self);
    }

    /// Sends a request on a raw path.
    ///
    /// Type-scoped document paths have no typed builders in the client crate,
    /// so they go through the transport directly.
    pub(crate) async fn send_raw(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ClientResult<Response> {
        let response = self
            .client
            .send(
                method,
                path,
                HeaderMap::new(),
                Option::<&Value>::None,
                body.map(JsonBody::from),
                None,
            )
            .await?;
        Ok(response)
    }
}

/// Whether the first two dot-separated components of `version`, parsed as a
/// decimal number, are at least `minimum`. Fails closed on any malformed
/// input.
pub(crate) fn version_at_least(version: &str, minimum: f64) -> bool {
    major_minor(version).is_some_and(|v| v >= minimum)
}

/// Parses `"major.minor[.rest]"` into the decimal number `major.minor`.
fn major_minor(version: &str) -> Option<f64> {
    let mut parts = version.split('.');
    let major = parts.next()?;
    let minor = parts.next()?;
    format!("{major}.{minor}").parse().ok()
}

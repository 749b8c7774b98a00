//! Thin Elasticsearch index client.
//!
//! This crate wraps the official [`elasticsearch`] client for the common
//! single-index workflow: bootstrap an index (optionally seeding its mapping
//! from a file), then index, fetch, search, and delete documents in it. Every
//! operation is one HTTP round-trip with light response unmarshalling - there
//! is no retry logic, caching, or pooling beyond what the transport provides.
//!
//! # Architecture
//!
//! - [`client`] - the opaque [`IndexClient`] handle and its `connect` factory
//! - [`config`] - node, index, and transport configuration
//! - [`schema`] - index lifecycle, mapping files, and the seeding outcome
//! - [`documents`] - document CRUD and filtered search
//! - [`query`] - term-filter construction ([`FilterBuilder`], [`FieldMatch`])
//! - [`types`] - response envelopes
//! - [`error`] - the [`ClientError`] taxonomy
//!
//! # Quick Start
//!
//! ```no_run
//! use elastic_index_client::{ClientConfig, FieldMatch, FilterBuilder, IndexClient};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), elastic_index_client::ClientError> {
//! // Connecting probes the index, creates it when absent, and seeds the
//! // mapping from the configured file.
//! let config = ClientConfig::new("localhost", 9200, "inventory")
//!     .with_mapping_file("mappings/widget.json");
//! let client = IndexClient::connect(config).await?;
//!
//! let id = client
//!     .add_document("widget", &json!({ "name": "test", "host": "test.foo.bar" }))
//!     .await?;
//!
//! let fetched = client.get_document("widget", &id).await?;
//! assert!(fetched.found);
//!
//! // Filters are built independently and passed into the search.
//! let filter = FilterBuilder::new()
//!     .field("name", "test")
//!     .field("host", FieldMatch::AnyOf(vec!["test.foo.bar".into()]));
//! let hits = client.search_filtered("widget", &filter).await?;
//!
//! client.close();
//! # Ok(())
//! # }
//! ```
//!
//! # Error policy
//!
//! Transport failures surface on every operation. The exceptions, matching
//! the behavior of the wrapped endpoints: a missing index reads as "absent"
//! during construction, a missing document is a `found: false` response, and
//! [`IndexClient::delete_document`] collapses failure into `false`. During
//! mapping seeding, an unsupported server version or an unreadable mapping
//! file downgrades to a logged skip that callers can observe through
//! [`IndexClient::mapping_status`].

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod config;
pub mod documents;
pub mod error;
pub mod query;
pub mod schema;
pub mod types;

// Re-export the client surface at crate root
pub use client::{IndexClient, MIN_SUPPORTED_VERSION};
pub use config::{ClientAuth, ClientConfig};
pub use error::{ClientError, ClientResult};
pub use query::{FieldMatch, FilterBuilder};
pub use schema::{MappingFile, MappingSkip, MappingStatus};
pub use types::{GetResponse, SearchHit, ServerInfo, ServerVersion};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

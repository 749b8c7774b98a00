//! Response envelopes returned by the server.
//!
//! These are deliberately loose: every field the server may omit carries a
//! default so that envelope parsing only fails when the response is not the
//! expected shape at all.

use serde::Deserialize;
use serde_json::Value;

/// Version metadata reported by the server's root endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerVersion {
    /// The dotted version string, e.g. `"1.7.5"`.
    pub number: String,
    /// Build hash of the server binary.
    #[serde(default)]
    pub build_hash: String,
    /// Build timestamp of the server binary.
    #[serde(default)]
    pub build_timestamp: String,
    /// Whether the server is a snapshot build.
    #[serde(default)]
    pub build_snapshot: bool,
    /// The bundled Lucene version.
    #[serde(default)]
    pub lucene_version: String,
}

/// Metadata reported by the server's root endpoint.
///
/// Produced per call and never cached.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    /// HTTP-style status echoed in the body by older servers.
    #[serde(default)]
    pub status: i64,
    /// The node name.
    #[serde(default)]
    pub name: String,
    /// The cluster name.
    #[serde(default)]
    pub cluster_name: String,
    /// Version metadata.
    pub version: ServerVersion,
    /// The server tagline.
    #[serde(default)]
    pub tagline: String,
}

/// The raw response to a by-id document fetch.
#[derive(Debug, Clone, Deserialize)]
pub struct GetResponse {
    /// The index the document was looked up in.
    #[serde(rename = "_index", default)]
    pub index: String,
    /// The document type the document was looked up under.
    #[serde(rename = "_type", default)]
    pub doc_type: String,
    /// The document id.
    #[serde(rename = "_id", default)]
    pub id: String,
    /// The document version; 0 when the document was not found.
    #[serde(rename = "_version", default)]
    pub version: u64,
    /// Whether the document exists.
    pub found: bool,
    /// The stored document, `Null` when not found.
    #[serde(rename = "_source", default)]
    pub source: Value,
}

/// A single document returned by a search.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    /// The index the hit came from.
    #[serde(rename = "_index", default)]
    pub index: String,
    /// The document type of the hit.
    #[serde(rename = "_type", default)]
    pub doc_type: String,
    /// The document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// The relevance score, absent for pure filter queries.
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    /// The stored document.
    #[serde(rename = "_source", default)]
    pub source: Value,
}

/// Extracts the hit list from a search response body.
///
/// Hits that do not match the envelope shape are skipped rather than failing
/// the whole response.
pub(crate) fn parse_hits(body: &Value) -> Vec<SearchHit> {
    body.get("hits")
        .and_then(|h| h.get("hits"))
        .and_then(Value::as_array)
        .map(|hits| {
            hits.iter()
                .filter_map(|hit| serde_json::from_value(hit.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

//! Index lifecycle and mapping seeding.
//!
//! The index is created with the settings carried by the configuration; its
//! field mapping comes from an optional mapping file, a JSON object with
//! exactly one top-level key naming the document type. The seeding outcome is
//! reported as a [`MappingStatus`] so callers can distinguish an applied
//! mapping from a skipped one without reading logs.

use std::path::{Path, PathBuf};

use elasticsearch::http::Method;
use elasticsearch::indices::{
    IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts, IndicesGetMappingParts,
    IndicesRefreshParts,
};
use serde_json::{Value, json};

use crate::client::IndexClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Outcome of the construction-time mapping seeding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingStatus {
    /// No mapping file was configured.
    NotRequested,
    /// The mapping was pushed to the server.
    Applied {
        /// The document type the mapping was registered under.
        doc_type: String,
    },
    /// A mapping file was configured but seeding was skipped.
    Skipped(MappingSkip),
}

impl MappingStatus {
    /// Whether the mapping was pushed to the server.
    pub fn is_applied(&self) -> bool {
        matches!(self, MappingStatus::Applied { .. })
    }
}

/// Why mapping seeding was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingSkip {
    /// The index already existed; its mapping was left untouched.
    IndexExists,
    /// The server version is below the minimum that accepts mapping pushes.
    VersionUnsupported {
        /// The version the server reported, or `"unknown"` when it could not
        /// be determined.
        version: String,
    },
    /// The mapping file could not be read or parsed as JSON.
    FileUnreadable {
        /// The configured file path.
        path: PathBuf,
        /// The underlying I/O or parse failure.
        reason: String,
    },
}

/// A parsed mapping file: one document type and its mapping body.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingFile {
    /// The document type, taken from the file's single top-level key.
    pub doc_type: String,
    /// The mapping body nested under that key, pushed unmodified.
    pub body: Value,
}

impl MappingFile {
    /// Validates a parsed mapping document.
    ///
    /// The document must be an object with exactly one key, whose value is
    /// itself an object. Multiple top-level keys are rejected rather than
    /// resolved by iteration order.
    pub fn from_value(origin: &Path, value: Value) -> ClientResult<Self> {
        let invalid = |reason: &str| ClientError::InvalidMapping {
            path: origin.to_path_buf(),
            reason: reason.to_string(),
        };

        let Value::Object(mut object) = value else {
            return Err(invalid("top level is not an object"));
        };

        let mut keys = object.keys();
        let Some(doc_type) = keys.next().cloned() else {
            return Err(invalid("no top-level key naming a document type"));
        };
        if keys.next().is_some() {
            return Err(invalid("more than one top-level key"));
        }

        let body = object.remove(&doc_type).unwrap_or(Value::Null);
        if !body.is_object() {
            return Err(invalid("mapping body is not an object"));
        }

        Ok(Self { doc_type, body })
    }
}

/// The result of reading a mapping file from disk.
pub(crate) enum MappingSource {
    /// The file parsed and validated.
    Ready(MappingFile),
    /// The file could not be read or parsed; seeding should be skipped.
    Unreadable { reason: String },
}

/// Reads and validates a mapping file.
///
/// I/O and JSON-parse problems are reported as [`MappingSource::Unreadable`]
/// (a skip, per the construction error policy); a structurally invalid file
/// is a hard error.
pub(crate) fn read_mapping_file(path: &Path) -> ClientResult<MappingSource> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            return Ok(MappingSource::Unreadable {
                reason: e.to_string(),
            });
        }
    };

    let value: Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            return Ok(MappingSource::Unreadable {
                reason: e.to_string(),
            });
        }
    };

    Ok(MappingSource::Ready(MappingFile::from_value(path, value)?))
}

/// Settings body for index creation.
pub(crate) fn index_settings(config: &ClientConfig) -> Value {
    json!({
        "settings": {
            "number_of_shards": config.number_of_shards,
            "number_of_replicas": config.number_of_replicas,
            "refresh_interval": config.refresh_interval,
        }
    })
}

/// Probes whether the target index exists.
///
/// A 404 means "absent"; any other non-success status propagates.
pub(crate) async fn index_exists(client: &IndexClient) -> ClientResult<bool> {
    let response = client
        .client()
        .indices()
        .exists(IndicesExistsParts::Index(&[client.index()]))
        .send()
        .await?;

    let status = response.status_code();
    if status.is_success() {
        Ok(true)
    } else if status.as_u16() == 404 {
        Ok(false)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::UnexpectedStatus {
            operation: "index exists",
            status: status.as_u16(),
            body,
        })
    }
}

/// Creates the target index with the configured settings.
pub(crate) async fn create_index(client: &IndexClient) -> ClientResult<()> {
    let response = client
        .client()
        .indices()
        .create(IndicesCreateParts::Index(client.index()))
        .body(index_settings(client.config()))
        .send()
        .await?;

    let status = response.status_code();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        // Another creator won the race; the index is there either way.
        if body.contains("resource_already_exists_exception")
            || body.contains("IndexAlreadyExistsException")
        {
            return Ok(());
        }
        return Err(ClientError::UnexpectedStatus {
            operation: "index create",
            status: status.as_u16(),
            body,
        });
    }

    tracing::debug!("created index '{}'", client.index());
    Ok(())
}

/// Seeds the index mapping from a file, gated on the server version.
///
/// Returns the observable outcome; only a structurally invalid file or a
/// server-side rejection produces an error.
pub(crate) async fn seed_mapping(client: &IndexClient, path: &Path) -> ClientResult<MappingStatus> {
    match client.info().await {
        Ok(info) => {
            if !crate::client::version_at_least(
                &info.version.number,
                crate::client::MIN_SUPPORTED_VERSION,
            ) {
                tracing::warn!(
                    "not applying mapping: server version {} is below {}",
                    info.version.number,
                    crate::client::MIN_SUPPORTED_VERSION
                );
                return Ok(MappingStatus::Skipped(MappingSkip::VersionUnsupported {
                    version: info.version.number,
                }));
            }
        }
        Err(e) => {
            tracing::warn!("not applying mapping: could not determine server version: {e}");
            return Ok(MappingStatus::Skipped(MappingSkip::VersionUnsupported {
                version: "unknown".to_string(),
            }));
        }
    }

    let mapping = match read_mapping_file(path)? {
        MappingSource::Ready(mapping) => mapping,
        MappingSource::Unreadable { reason } => {
            tracing::warn!("not applying mapping file {}: {reason}", path.display());
            return Ok(MappingStatus::Skipped(MappingSkip::FileUnreadable {
                path: path.to_path_buf(),
                reason,
            }));
        }
    };

    apply_mapping(client, &mapping).await?;
    Ok(MappingStatus::Applied {
        doc_type: mapping.doc_type,
    })
}

/// Pushes a mapping for its document type on the target index.
pub(crate) async fn apply_mapping(client: &IndexClient, mapping: &MappingFile) -> ClientResult<()> {
    let path = format!("/{}/_mapping/{}", client.index(), mapping.doc_type);
    let response = client
        .send_raw(Method::Put, &path, Some(mapping.body.clone()))
        .await?;

    let status = response.status_code();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::UnexpectedStatus {
            operation: "put mapping",
            status: status.as_u16(),
            body,
        });
    }

    tracing::info!(
        "applied mapping '{}' to index '{}'",
        mapping.doc_type,
        client.index()
    );
    Ok(())
}

impl IndexClient {
    /// Lists the document types registered in the index's mapping.
    ///
    /// Returns an empty, sorted list when the index has no mapping (or no
    /// longer exists).
    pub async fn document_types(&self) -> ClientResult<Vec<String>> {
        let response = self
            .client()
            .indices()
            .get_mapping(IndicesGetMappingParts::Index(&[self.index()]))
            .send()
            .await?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::UnexpectedStatus {
                operation: "get mapping",
                status: status.as_u16(),
                body,
            });
        }

        let body: Value =
            response
                .json()
                .await
                .map_err(|e| ClientError::MalformedResponse {
                    operation: "get mapping",
                    message: e.to_string(),
                })?;

        // The response is keyed by concrete index name, which may differ from
        // the requested name when addressed through an alias.
        let mappings = body
            .get(self.index())
            .or_else(|| body.as_object().and_then(|o| o.values().next()))
            .and_then(|index| index.get("mappings"))
            .and_then(Value::as_object);

        let mut types: Vec<String> = match mappings {
            Some(mappings) => mappings.keys().cloned().collect(),
            None => Vec::new(),
        };
        types.sort_unstable();
        Ok(types)
    }

    /// Refreshes the index so recent writes become searchable.
    ///
    /// Only needed for testing; in production the server refreshes on its
    /// own schedule.
    pub async fn refresh(&self) -> ClientResult<()> {
        let response = self
            .client()
            .indices()
            .refresh(IndicesRefreshParts::Index(&[self.index()]))
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::UnexpectedStatus {
                operation: "index refresh",
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Deletes the target index.
    ///
    /// Returns false when the index did not exist.
    pub async fn delete_index(&self) -> ClientResult<bool> {
        let response = self
            .client()
            .indices()
            .delete(IndicesDeleteParts::Index(&[self.index()]))
            .send()
            .await?;

        let status = response.status_code();
        if status.is_success() {
            tracing::debug!("deleted index '{}'", self.index());
            return Ok(true);
        }

        let body = response.text().await.unwrap_or_default();
        if status.as_u16() == 404 || body.contains("index_not_found_exception") {
            return Ok(false);
        }
        Err(ClientError::UnexpectedStatus {
            operation: "index delete",
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mapping_file_single_key() {
        let value = json!({
            "widget": {
                "_meta": { "owner": "inventory" },
                "dynamic_templates": []
            }
        });
        let mapping = MappingFile::from_value(Path::new("widget.json"), value).unwrap();
        assert_eq!(mapping.doc_type, "widget");
        assert_eq!(mapping.body["_meta"]["owner"], "inventory");
    }

    #[test]
    fn test_mapping_file_rejects_multiple_keys() {
        let value = json!({ "widget": {}, "gadget": {} });
        let err = MappingFile::from_value(Path::new("both.json"), value).unwrap_err();
        assert!(matches!(err, ClientError::InvalidMapping { .. }));
        assert!(err.to_string().contains("more than one top-level key"));
    }

    #[test]
    fn test_mapping_file_rejects_non_object_root() {
        let err = MappingFile::from_value(Path::new("list.json"), json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("top level is not an object"));
    }

    #[test]
    fn test_mapping_file_rejects_empty_object() {
        let err = MappingFile::from_value(Path::new("empty.json"), json!({})).unwrap_err();
        assert!(err.to_string().contains("no top-level key"));
    }

    #[test]
    fn test_mapping_file_rejects_non_object_body() {
        let err =
            MappingFile::from_value(Path::new("scalar.json"), json!({ "widget": 1 })).unwrap_err();
        assert!(err.to_string().contains("mapping body is not an object"));
    }

    #[test]
    fn test_read_mapping_file_missing_is_unreadable() {
        let result = read_mapping_file(Path::new("/nonexistent/mapping.json")).unwrap();
        assert!(matches!(result, MappingSource::Unreadable { .. }));
    }

    #[test]
    fn test_read_mapping_file_bad_json_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = read_mapping_file(&path).unwrap();
        assert!(matches!(result, MappingSource::Unreadable { .. }));
    }

    #[test]
    fn test_read_mapping_file_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widget.json");
        std::fs::write(
            &path,
            r#"{ "widget": { "_meta": {}, "dynamic_templates": [] } }"#,
        )
        .unwrap();

        match read_mapping_file(&path).unwrap() {
            MappingSource::Ready(mapping) => {
                assert_eq!(mapping.doc_type, "widget");
                assert!(mapping.body["dynamic_templates"].as_array().unwrap().is_empty());
            }
            MappingSource::Unreadable { reason } => panic!("unexpected skip: {reason}"),
        }
    }

    #[test]
    fn test_read_mapping_file_multi_key_is_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("both.json");
        std::fs::write(&path, r#"{ "widget": {}, "gadget": {} }"#).unwrap();

        assert!(read_mapping_file(&path).is_err());
    }

    #[test]
    fn test_index_settings_reflects_config() {
        let mut config = crate::config::ClientConfig::new("localhost", 9200, "inventory");
        config.number_of_shards = 3;
        config.number_of_replicas = 2;
        config.refresh_interval = "5s".to_string();

        let settings = index_settings(&config);
        assert_eq!(settings["settings"]["number_of_shards"], 3);
        assert_eq!(settings["settings"]["number_of_replicas"], 2);
        assert_eq!(settings["settings"]["refresh_interval"], "5s");
    }

    #[test]
    fn test_mapping_status_is_applied() {
        assert!(
            MappingStatus::Applied {
                doc_type: "widget".to_string()
            }
            .is_applied()
        );
        assert!(!MappingStatus::NotRequested.is_applied());
        assert!(!MappingStatus::Skipped(MappingSkip::IndexExists).is_applied());
    }
}

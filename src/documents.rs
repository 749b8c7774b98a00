//! Document operations.
//!
//! Documents are addressed by type and id under the client's index
//! (`/{index}/{type}/{id}`); those type-scoped paths go through the raw
//! transport. Each operation is a single round-trip: the server response
//! status is checked, then the body is parsed into its envelope.

use elasticsearch::http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::IndexClient;
use crate::error::{ClientError, ClientResult};
use crate::query::{FieldMatch, FilterBuilder};
use crate::types::{self, GetResponse, SearchHit};

/// Acknowledgement body of an index/delete write.
///
/// Older servers report `created: true`, newer ones `result: "created"`;
/// either counts as an acknowledged creation.
#[derive(Debug, Deserialize)]
pub(crate) struct WriteAck {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub created: bool,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub found: bool,
}

impl WriteAck {
    pub fn acknowledged_creation(&self) -> bool {
        self.created || self.result.as_deref() == Some("created")
    }

    pub fn acknowledged_deletion(&self) -> bool {
        self.found || self.result.as_deref() == Some("deleted")
    }
}

impl IndexClient {
    /// Indexes a document with a server-generated id and returns that id.
    ///
    /// Fails with [`ClientError::WriteNotAcknowledged`] when the server
    /// accepts the call but does not report a creation.
    pub async fn add_document<T: Serialize>(
        &self,
        doc_type: &str,
        data: &T,
    ) -> ClientResult<String> {
        let path = format!("/{}/{}", self.index(), doc_type);
        self.write_document(Method::Post, &path, doc_type, data, true)
            .await
    }

    /// Indexes a document at an explicit id and returns the id.
    ///
    /// The same acknowledgement rule as [`add_document`](Self::add_document)
    /// applies, so writing to an id that already holds a document fails.
    pub async fn add_document_with_id<T: Serialize>(
        &self,
        doc_type: &str,
        id: &str,
        data: &T,
    ) -> ClientResult<String> {
        let path = format!("/{}/{}/{}", self.index(), doc_type, id);
        self.write_document(Method::Put, &path, doc_type, data, true)
            .await
    }

    /// Overwrites (re-indexes) the document at an id.
    pub async fn update_document<T: Serialize>(
        &self,
        doc_type: &str,
        id: &str,
        data: &T,
    ) -> ClientResult<()> {
        let path = format!("/{}/{}/{}", self.index(), doc_type, id);
        self.write_document(Method::Put, &path, doc_type, data, false)
            .await?;
        tracing::debug!("updated document {}/{doc_type}/{id}", self.index());
        Ok(())
    }

    async fn write_document<T: Serialize>(
        &self,
        method: Method,
        path: &str,
        doc_type: &str,
        data: &T,
        require_created: bool,
    ) -> ClientResult<String> {
        let body = serde_json::to_value(data)?;
        let response = self.send_raw(method, path, Some(body)).await?;

        let status = response.status_code();
        let body: Value = if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| ClientError::MalformedResponse {
                    operation: "index document",
                    message: e.to_string(),
                })?
        } else {
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::UnexpectedStatus {
                operation: "index document",
                status: status.as_u16(),
                body: text,
            });
        };

        let ack: WriteAck =
            serde_json::from_value(body.clone()).map_err(|e| ClientError::MalformedResponse {
                operation: "index document",
                message: e.to_string(),
            })?;

        if require_created && !ack.acknowledged_creation() {
            return Err(ClientError::WriteNotAcknowledged {
                index: self.index().to_string(),
                doc_type: doc_type.to_string(),
                response: body.to_string(),
            });
        }

        Ok(ack.id)
    }

    /// Fetches a document by type and id.
    ///
    /// A missing document is a successful response with `found: false`, not
    /// an error.
    pub async fn get_document(&self, doc_type: &str, id: &str) -> ClientResult<GetResponse> {
        let path = format!("/{}/{}/{}", self.index(), doc_type, id);
        let response = self.send_raw(Method::Get, &path, None).await?;

        let status = response.status_code();
        if !status.is_success() && status.as_u16() != 404 {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::UnexpectedStatus {
                operation: "get document",
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<GetResponse>()
            .await
            .map_err(|e| ClientError::MalformedResponse {
                operation: "get document",
                message: e.to_string(),
            })
    }

    /// Deletes a document by type and id.
    ///
    /// Returns true iff the document existed and was deleted; false both for
    /// a missing document and for a failed call (logged, not surfaced).
    pub async fn delete_document(&self, doc_type: &str, id: &str) -> bool {
        let path = format!("/{}/{}/{}", self.index(), doc_type, id);
        let response = match self.send_raw(Method::Delete, &path, None).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("delete of {path} failed: {e}");
                return false;
            }
        };

        let status = response.status_code();
        if !status.is_success() && status.as_u16() != 404 {
            tracing::warn!("delete of {path} returned status {status}");
            return false;
        }

        match response.json::<WriteAck>().await {
            Ok(ack) => ack.acknowledged_deletion(),
            Err(e) => {
                tracing::warn!("delete of {path} returned an unreadable body: {e}");
                false
            }
        }
    }

    /// Searches the index for documents of a type matching a built filter.
    ///
    /// Returns an empty vector when nothing matches, including when the
    /// index holds no documents of the type at all.
    pub async fn search_filtered(
        &self,
        doc_type: &str,
        filter: &FilterBuilder,
    ) -> ClientResult<Vec<SearchHit>> {
        let path = format!("/{}/{}/_search", self.index(), doc_type);
        let response = self
            .send_raw(Method::Post, &path, Some(filter.to_query()))
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // A vanished index searches as empty rather than failing.
            if status.as_u16() == 404 || body.contains("index_not_found_exception") {
                return Ok(Vec::new());
            }
            return Err(ClientError::UnexpectedStatus {
                operation: "search",
                status: status.as_u16(),
                body,
            });
        }

        let body: Value =
            response
                .json()
                .await
                .map_err(|e| ClientError::MalformedResponse {
                    operation: "search",
                    message: e.to_string(),
                })?;

        Ok(types::parse_hits(&body))
    }

    /// Searches for documents whose field exactly equals a value.
    pub async fn get_documents_by_field(
        &self,
        doc_type: &str,
        field: &str,
        value: &str,
    ) -> ClientResult<Vec<SearchHit>> {
        let filter = FilterBuilder::new().field(field, FieldMatch::Exact(value.to_string()));
        self.search_filtered(doc_type, &filter).await
    }
}

//! Error types for the index client.
//!
//! Transport failures are separated from protocol-level failures (unexpected
//! statuses, unparsable bodies, unacknowledged writes) and from local input
//! failures (bad mapping files, bad filter values) that are raised before any
//! network call is made.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type for all client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// A failure in the underlying HTTP transport (unreachable server,
    /// connection reset, request build failure).
    #[error("transport error: {0}")]
    Transport(#[from] elasticsearch::Error),

    /// The server answered with a status the operation does not handle.
    #[error("unexpected response to {operation} (status {status}): {body}")]
    UnexpectedStatus {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The server answered successfully but the body did not parse as expected.
    #[error("malformed response to {operation}: {message}")]
    MalformedResponse {
        operation: &'static str,
        message: String,
    },

    /// The server accepted the write but did not report a creation.
    #[error("write not acknowledged for {index}/{doc_type}: {response}")]
    WriteNotAcknowledged {
        index: String,
        doc_type: String,
        response: String,
    },

    /// A mapping file parsed as JSON but is not structured as a single
    /// document-type definition.
    #[error("invalid mapping file {}: {reason}", path.display())]
    InvalidMapping { path: PathBuf, reason: String },

    /// An untyped filter value was neither a string nor an array of strings.
    #[error("invalid filter value for field '{field}': expected a string or an array of strings")]
    InvalidFilterValue { field: String },

    /// The configured node URL failed to parse.
    #[error("invalid node URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The HTTP transport could not be built from the configuration.
    #[error("failed to build transport: {message}")]
    TransportBuild { message: String },

    /// A request body failed to serialize.
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

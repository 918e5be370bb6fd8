//! Error types for the review widget

use thiserror::Error;

/// Failures talking to the remote review table.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The request never produced a response
    #[error("request failed: {0}")]
    Network(String),

    /// The store answered with a non-success status
    #[error("store responded with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected row shape
    #[error("unexpected response payload: {0}")]
    Decode(String),
}

impl From<gloo_net::Error> for StoreError {
    fn from(err: gloo_net::Error) -> Self {
        match err {
            gloo_net::Error::SerdeError(err) => StoreError::Decode(err.to_string()),
            other => StoreError::Network(other.to_string()),
        }
    }
}

/// Failures opening or running a realtime channel.
#[derive(Error, Debug)]
pub enum RealtimeError {
    #[error("could not open realtime socket: {0}")]
    Connect(String),

    #[error("realtime channel closed")]
    Closed,

    #[error("realtime protocol error: {0}")]
    Protocol(String),

    #[error("malformed realtime frame: {0}")]
    Json(#[from] serde_json::Error),
}

/// Invalid or missing widget configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing configuration: {0}")]
    Missing(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// The two outcomes a section can surface to its reader.
#[derive(Error, Debug)]
pub enum ReviewError {
    /// Query for a section failed; shown passively in the container
    #[error("failed to load reviews for `{post_id}`: {source}")]
    Load {
        post_id: String,
        #[source]
        source: StoreError,
    },

    /// Insert failed; shown as an alert and the input is kept for retry
    #[error("failed to submit review for `{post_id}`: {source}")]
    Submit {
        post_id: String,
        #[source]
        source: StoreError,
    },
}

impl ReviewError {
    pub fn post_id(&self) -> &str {
        match self {
            ReviewError::Load { post_id, .. } | ReviewError::Submit { post_id, .. } => post_id,
        }
    }
}

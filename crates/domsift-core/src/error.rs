//! Engine error types.

use thiserror::Error;

use crate::document::NodeId;

/// Errors that abort a digest before any traversal starts.
#[derive(Debug, Error)]
pub enum DigestError {
    /// Invalid option combination or unknown option word.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failures reported by a style/geometry provider for a single node.
///
/// The walker treats every variant as "invisible" and prunes the subtree.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    /// Node is no longer reachable from the document root.
    #[error("Node {0} is detached")]
    Detached(NodeId),

    /// Node is not an element.
    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    /// No bounding rectangle is known for the node.
    #[error("No geometry for node {0}")]
    NoGeometry(NodeId),

    /// Provider-specific failure.
    #[error("Provider error: {0}")]
    Other(String),
}

/// Snapshot decoding errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Malformed JSON or a field of the wrong type.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A node or attribute the document model cannot hold.
    #[error("Invalid node: {0}")]
    InvalidNode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

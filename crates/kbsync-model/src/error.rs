//! Error types for the content tree

use crate::language::Language;
use crate::node::{NodeRef, RemoteId};

/// Errors raised by content tree operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Node id does not belong to this tree
    #[error("unknown node: {0}")]
    UnknownNode(NodeRef),

    /// Remote ID may only be assigned once per node instance
    #[error("{node} already has remote id #{existing}")]
    RemoteIdAlreadySet { node: NodeRef, existing: RemoteId },

    /// A translation cannot be keyed by the tree's primary language
    #[error("cannot add a '{0}' translation: it is the primary language")]
    PrimaryLanguageTranslation(Language),

    /// Children can only be attached to primary nodes
    #[error("{0} is a translation and cannot own children")]
    ChildOfTranslation(NodeRef),

    /// Malformed A1 cell reference
    #[error("invalid cell reference: '{0}'")]
    InvalidCellRef(String),
}

/// Errors raised while saving or loading a snapshot
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// IO error on the snapshot file
    #[error("io error on {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding or decoding failed
    #[error("snapshot encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    /// File is not a portal snapshot
    #[error("not a portal snapshot (bad header)")]
    BadHeader,
}

impl SnapshotError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<std::path::PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

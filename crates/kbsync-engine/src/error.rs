//! Error types for the sync engine

use kbsync_api::ApiError;
use kbsync_model::{CellRef, ModelError, NodeRef};
use kbsync_sheet::SheetError;

/// Failure of a create, delete or write-back
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The remote call failed
    #[error("{node}: {source}")]
    Api {
        /// Node the call was made for
        node: NodeRef,
        /// Classified failure
        #[source]
        source: ApiError,
    },

    /// No such node in the portal
    #[error("{0}: unknown node")]
    UnknownNode(NodeRef),

    /// Translations are created through their primary node
    #[error("{0}: is a translation, sync its primary node instead")]
    NotPrimary(NodeRef),

    /// No remote parent ID and parent creation not requested
    #[error("{0}: parent has no remote id")]
    MissingParent(NodeRef),

    /// Parent creation was requested but yielded no remote ID
    #[error("{0}: failed to create parent")]
    ParentCreateFailed(NodeRef),

    /// The node was never created remotely
    #[error("{0}: no remote id")]
    NoRemoteId(NodeRef),

    /// No workbook ID on the node, its ancestors or the portal
    #[error("{0}: no source workbook")]
    NoWorkbook(NodeRef),

    /// Folder and article origins have their neighbour cell in use
    #[error("{0}: only categories are written back")]
    NotWritable(NodeRef),

    /// The node was not read from a spreadsheet
    #[error("{0}: no spreadsheet origin")]
    NoOrigin(NodeRef),

    /// The origin cell no longer holds the node's name
    #[error("{node}: cell {cell} holds '{found}', expected '{expected}'")]
    CellMismatch {
        /// Node being written back
        node: NodeRef,
        /// Origin cell
        cell: CellRef,
        /// Node name
        expected: String,
        /// Live cell text
        found: String,
    },

    /// Spreadsheet access failed
    #[error("spreadsheet error: {0}")]
    Sheet(#[from] SheetError),

    /// Tree update failed
    #[error("tree error: {0}")]
    Tree(#[from] ModelError),
}

impl SyncError {
    pub(crate) fn api(node: impl Into<NodeRef>, source: ApiError) -> Self {
        Self::Api {
            node: node.into(),
            source,
        }
    }

    /// Classified remote failure, if this is one
    #[must_use]
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api { source, .. } => Some(source),
            _ => None,
        }
    }
}

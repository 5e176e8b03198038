//! Spreadsheet write-back of remote IDs
//!
//! The remote ID of a node goes into the cell right of the node's origin
//! cell. The origin cell is read first and must still hold the node's name
//! (compared case-insensitively); rows inserted or deleted since parsing
//! would otherwise make the write land next to some other entry.
//!
//! Only categories are written back. A folder's right neighbour is the
//! title of its first article and an article's is its body.

use crate::error::SyncError;
use kbsync_model::{CellRef, NodeRef, Portal};
use kbsync_sheet::CellStore;

/// A completed write-back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteBack {
    /// Cell that now holds the remote ID
    pub cell: CellRef,
    /// Text the cell held before, when it was not blank
    pub previous: Option<String>,
}

/// Write the remote ID of category `node` next to its origin cell
pub fn write_back<S: CellStore + ?Sized>(
    portal: &Portal,
    node: NodeRef,
    store: &S,
) -> Result<WriteBack, SyncError> {
    if !matches!(node, NodeRef::Category(_)) {
        tracing::warn!("{node} is not a category, write-back refused");
        return Err(SyncError::NotWritable(node));
    }
    let meta = portal.meta(node).ok_or(SyncError::UnknownNode(node))?;
    let label = portal.label(node).unwrap_or_default();

    let Some(remote_id) = meta.remote_id() else {
        tracing::warn!("{node} '{label}' has no remote id, nothing to write back");
        return Err(SyncError::NoRemoteId(node));
    };
    let Some(workbook) = portal.resolve_workbook_id(node) else {
        tracing::warn!("{node} '{label}' has no source workbook, write-back skipped");
        return Err(SyncError::NoWorkbook(node));
    };
    let Some(origin) = meta.origin.as_ref().filter(|o| !o.sheet_name.is_empty()) else {
        tracing::warn!("{node} '{label}' has no spreadsheet origin, write-back skipped");
        return Err(SyncError::NoOrigin(node));
    };

    let sheet = origin.sheet_name.as_str();
    let found = store.read_cell(workbook, sheet, origin.cell)?;
    if found.trim().to_lowercase() != label.trim().to_lowercase() {
        tracing::error!(
            sheet,
            cell = %origin.cell,
            "cell holds '{found}' instead of '{label}', write-back aborted"
        );
        return Err(SyncError::CellMismatch {
            node,
            cell: origin.cell,
            expected: label.to_string(),
            found,
        });
    }

    let target = origin.cell.right();
    let value = remote_id.to_string();
    let previous = store.read_cell(workbook, sheet, target)?;
    let previous = (!previous.trim().is_empty()).then_some(previous);
    if let Some(old) = previous.as_deref().filter(|old| old.trim() != value) {
        tracing::warn!(sheet, cell = %target, "overwriting '{old}' with remote id {value}");
    }

    store.write_cell(workbook, sheet, target, &value)?;
    tracing::info!(sheet, cell = %target, remote_id = %remote_id, "wrote back {node} '{label}'");
    Ok(WriteBack {
        cell: target,
        previous,
    })
}

//! Outcomes and the run report

use kbsync_model::RemoteId;
use std::fmt::{self, Display, Formatter};

/// Result of a successful create call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Created now
    Created(RemoteId),
    /// Already had a remote ID; nothing was sent
    AlreadySynced(RemoteId),
    /// The helpdesk reports a duplicate; nothing was recorded
    AlreadyExists,
}

impl CreateOutcome {
    /// Remote ID the node carries after the call
    #[must_use]
    pub fn remote_id(self) -> Option<RemoteId> {
        match self {
            Self::Created(id) | Self::AlreadySynced(id) => Some(id),
            Self::AlreadyExists => None,
        }
    }
}

/// Result of a successful delete call; the local remote ID is cleared in every case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Deleted now
    Deleted(RemoteId),
    /// The helpdesk no longer had it
    AlreadyGone(RemoteId),
    /// The helpdesk refuses deletion of this resource
    Refused(RemoteId),
}

/// Counts and failure lines of a sync run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Nodes created
    pub created: usize,
    /// Nodes skipped because they already had a remote ID
    pub skipped: usize,
    /// Nodes the helpdesk reported as duplicates
    pub already_exists: usize,
    /// Translations created
    pub translations: usize,
    /// Nodes deleted, already gone or refused
    pub deleted: usize,
    /// Failed operations, node creates and translations alike
    pub failed: usize,
    /// Human-readable failure lines
    pub failures: Vec<String>,
}

impl SyncReport {
    pub(crate) fn fail(&mut self, line: String) {
        self.failed += 1;
        self.failures.push(line);
    }

    /// Whether nothing failed
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

impl Display for SyncReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created {}, translations {}, skipped {}, existing {}, deleted {}, failed {}",
            self.created,
            self.translations,
            self.skipped,
            self.already_exists,
            self.deleted,
            self.failed
        )?;
        for line in &self.failures {
            write!(f, "\n  - {line}")?;
        }
        Ok(())
    }
}

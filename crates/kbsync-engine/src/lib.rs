//! kbsync Sync Engine
//!
//! Drives a [`kbsync_model::Portal`] into the helpdesk and records the
//! assigned remote IDs, on the tree and back in the source spreadsheet.
//!
//! # Components
//!
//! - [`SyncEngine`]: idempotent create and delete of categories, folders
//!   and articles, with [`CreateOptions`] for recursion and overrides
//! - [`SyncReport`]: counts and failure lines of a run
//! - [`write_back`]: patches the remote ID next to a node's origin cell
//!
//! # Example
//!
//! ```rust,ignore
//! use kbsync_engine::{CreateOptions, SyncEngine};
//!
//! let mut engine = SyncEngine::new(client).with_portal_scope(config.portal_scope_ids.clone());
//! for id in portal.category_ids().to_vec() {
//!     engine.create_category(&mut portal, id, &CreateOptions::recursive())?;
//! }
//! println!("{}", engine.report());
//! ```

#![warn(unreachable_pub)]

mod engine;
mod error;
mod options;
mod report;
mod writeback;

pub use engine::{SyncEngine, SUFFIX_SEPARATOR};
pub use error::SyncError;
pub use options::CreateOptions;
pub use report::{CreateOutcome, DeleteOutcome, SyncReport};
pub use writeback::{write_back, WriteBack};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

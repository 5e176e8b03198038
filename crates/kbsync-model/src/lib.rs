//! kbsync Content Model
//!
//! Typed, arena-backed knowledge-base tree shared by the spreadsheet
//! reader, the helpdesk client, the sync engine and the preview renderer.
//!
//! # Core Concepts
//!
//! - [`Portal`]: root of the tree, owner of every node
//! - [`Category`], [`Folder`], [`Article`]: content nodes addressed by
//!   [`CategoryId`], [`FolderId`] and [`ArticleId`]
//! - [`NodeMeta`]: remote ID, source language and [`Origin`] coordinates
//! - [`Language`]: the fixed set of recognized content languages
//!
//! # Example
//!
//! ```rust,ignore
//! use kbsync_model::prelude::*;
//!
//! let mut portal = Portal::new("Help").with_suffix("EU");
//! let billing = portal.add_category(Category::new("Billing"));
//! portal.add_category_translation(billing, Language::Fr, Category::new("Facturation"))?;
//! let invoices = portal.add_folder(billing, Folder::new("Invoices"))?;
//! portal.add_article(invoices, Article::from_markdown("Download", "Click **Download**."))?;
//! ```

#![warn(unreachable_pub)]

mod error;
mod kinds;
mod language;
mod node;
mod origin;
mod portal;
mod snapshot;

/// Markdown rendering and plain-text extraction
pub mod markup;

pub use error::{ModelError, SnapshotError};
pub use kinds::{ArticleType, Status, Visibility};
pub use language::{Language, UnknownLanguage};
pub use node::{
    Article, ArticleId, Category, CategoryId, ContentNode, Folder, FolderId, NodeMeta, NodeRef,
    RemoteId,
};
pub use origin::{CellRef, Origin, WORKBOOK_URL_BASE};
pub use portal::{Portal, PortalStats};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commonly used types
pub mod prelude {
    pub use crate::{
        Article, ArticleId, ArticleType, Category, CategoryId, ContentNode, Folder, FolderId,
        Language, ModelError, NodeRef, Origin, Portal, RemoteId, Status, Visibility,
    };
}

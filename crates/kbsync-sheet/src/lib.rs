//! kbsync Spreadsheet Layer
//!
//! Reads authoring workbooks into the content tree and patches single
//! cells for write-back.
//!
//! # Components
//!
//! - [`Grid`], [`Sheet`], [`Workbook`]: raw cell values
//! - [`locate_header`]: finds the language header row and its column groups
//! - [`parse_workbook`] / [`build_category`]: grid → [`kbsync_model::Portal`]
//! - [`SheetSource`] and [`CellStore`]: backend seams, implemented by
//!   [`JsonWorkbookFile`] (local file) and [`SheetsClient`] (hosted service)

#![warn(unreachable_pub)]

mod builder;
mod error;
mod grid;
mod http;
mod locator;
mod source;

pub use builder::{build_category, parse_workbook, ParseOptions, ParseReport};
pub use error::{ParseError, SheetError};
pub use grid::{Grid, Sheet, Workbook};
pub use http::{SheetsClient, SheetsConfig, DEFAULT_SHEETS_URL};
pub use locator::{locate_header, HeaderLocation, ORIGIN_LANGUAGE};
pub use source::{CellStore, JsonWorkbookFile, SheetSource};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

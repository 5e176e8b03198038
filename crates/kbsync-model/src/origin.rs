//! Spreadsheet coordinates for nodes sourced from a workbook
//!
//! Provides [`CellRef`] (zero-based row/column with A1 notation) and
//! [`Origin`], which locates the cell holding a node's authoritative text.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Base URL of hosted workbooks, used to build deep links
pub const WORKBOOK_URL_BASE: &str = "https://docs.google.com/spreadsheets/d";

/// Zero-based cell position
///
/// # Examples
/// - `CellRef::new(0, 0)` → `A1`
/// - `CellRef::new(4, 27)` → `AB5`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellRef {
    /// Zero-based row index
    pub row: usize,
    /// Zero-based column index
    pub col: usize,
}

impl CellRef {
    /// Create a cell reference
    #[inline]
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The cell immediately to the right
    #[inline]
    #[must_use]
    pub const fn right(self) -> Self {
        Self::new(self.row, self.col + 1)
    }

    /// A1 column letters for a zero-based column index
    #[must_use]
    pub fn column_letters(col: usize) -> String {
        let mut n = col + 1;
        let mut letters = Vec::new();
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push(b'A' + u8::try_from(rem).unwrap_or(0));
            n = (n - 1) / 26;
        }
        letters.reverse();
        String::from_utf8(letters).unwrap_or_default()
    }

    /// A1 notation
    #[must_use]
    pub fn to_a1(self) -> String {
        format!("{}{}", Self::column_letters(self.col), self.row + 1)
    }
}

impl Display for CellRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

impl FromStr for CellRef {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidCellRef(s.to_string());
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (letters, digits) = trimmed.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        let mut col = 0usize;
        for c in letters.chars() {
            let value = (c.to_ascii_uppercase() as usize) - ('A' as usize) + 1;
            col = col
                .checked_mul(26)
                .and_then(|v| v.checked_add(value))
                .ok_or_else(invalid)?;
        }
        let row: usize = digits.parse().map_err(|_| invalid())?;
        if row == 0 {
            return Err(invalid());
        }
        Ok(Self::new(row - 1, col - 1))
    }
}

/// Where a node's text lives in its source workbook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    /// Workbook identifier; `None` means "inherit from the portal"
    pub workbook_id: Option<String>,
    /// Sheet (tab) name
    pub sheet_name: String,
    /// Numeric sheet identifier, needed for deep links
    pub sheet_id: Option<u64>,
    /// Cell holding the node's name or title
    pub cell: CellRef,
}

impl Origin {
    /// Create origin coordinates
    #[must_use]
    pub fn new(
        workbook_id: Option<String>,
        sheet_name: impl Into<String>,
        sheet_id: Option<u64>,
        cell: CellRef,
    ) -> Self {
        Self {
            workbook_id,
            sheet_name: sheet_name.into(),
            sheet_id,
            cell,
        }
    }

    /// Deep link to the origin cell: `<workbook-url>/edit#gid=<sheetId>&range=<A1>`
    ///
    /// `fallback_workbook` is used when the origin does not carry its own
    /// workbook ID. Returns `None` when no workbook or sheet ID is known.
    #[must_use]
    pub fn link(&self, fallback_workbook: Option<&str>) -> Option<String> {
        let workbook = self.workbook_id.as_deref().or(fallback_workbook)?;
        let sheet_id = self.sheet_id?;
        Some(format!(
            "{WORKBOOK_URL_BASE}/{workbook}/edit#gid={sheet_id}&range={}",
            self.cell.to_a1()
        ))
    }
}

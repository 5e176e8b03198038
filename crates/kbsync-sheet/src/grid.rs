//! Cell grids, sheets and workbooks
//!
//! A [`Grid`] is a list of rows of strings. Rows may be ragged: a cell past
//! the end of its row reads as the empty string. Only rows past the bottom
//! of the grid are out of bounds.

use kbsync_model::CellRef;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Rectangular-ish table of cell values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    /// Create a grid from rows
    #[must_use]
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Create a grid from string slices
    #[must_use]
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Number of rows
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Raw rows
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Cell value; `None` only when `row` is past the last row
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .map(|r| r.get(col).map_or("", String::as_str))
    }

    /// Cell value, empty for any missing cell
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.get(row, col).unwrap_or("")
    }

    /// Cell value at a [`CellRef`]
    #[must_use]
    pub fn at(&self, cell: CellRef) -> Option<&str> {
        self.get(cell.row, cell.col)
    }

    /// Overwrite a cell, growing the grid as needed; returns the previous value
    pub fn set(&mut self, cell: CellRef, value: impl Into<String>) -> String {
        if self.rows.len() <= cell.row {
            self.rows.resize_with(cell.row + 1, Vec::new);
        }
        let row = &mut self.rows[cell.row];
        if row.len() <= cell.col {
            row.resize_with(cell.col + 1, String::new);
        }
        std::mem::replace(&mut row[cell.col], value.into())
    }
}

/// One tab of a workbook
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    /// Tab name
    pub name: String,
    /// Numeric sheet ID used in deep links
    #[serde(default)]
    pub id: Option<u64>,
    /// Cell values
    #[serde(default, rename = "values")]
    pub grid: Grid,
}

impl Sheet {
    /// Create a sheet
    #[must_use]
    pub fn new(name: impl Into<String>, id: Option<u64>, grid: Grid) -> Self {
        Self {
            name: name.into(),
            id,
            grid,
        }
    }
}

impl Display for Sheet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sheet \"{}\" ({}x{})",
            self.name,
            self.grid.width(),
            self.grid.height()
        )
    }
}

/// A spreadsheet document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workbook {
    /// Workbook identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Document title
    #[serde(default)]
    pub title: String,
    /// Tabs in document order
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create an empty workbook
    #[must_use]
    pub fn new(id: Option<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            sheets: Vec::new(),
        }
    }

    /// With an extra sheet
    #[must_use]
    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.sheets.push(sheet);
        self
    }

    /// Sheet by name
    #[must_use]
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Mutable sheet by name
    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    /// Default portal name for this workbook
    #[must_use]
    pub fn portal_name(&self) -> &str {
        self.title.trim()
    }
}

impl Display for Workbook {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Workbook \"{}\"", self.title)?;
        if let Some(id) = &self.id {
            write!(f, " @ {id}")?;
        }
        for sheet in &self.sheets {
            write!(f, "\n - {sheet}")?;
        }
        Ok(())
    }
}

//! Spreadsheet backends
//!
//! [`SheetSource`] reads whole workbooks for parsing; [`CellStore`] reads and
//! patches single cells for write-back. [`JsonWorkbookFile`] implements both
//! over a local JSON document shaped like [`Workbook`].

use crate::error::SheetError;
use crate::grid::Workbook;
use kbsync_model::CellRef;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads workbooks
pub trait SheetSource {
    /// Fetch every sheet of a workbook
    fn fetch_workbook(&self, workbook_id: &str) -> Result<Workbook, SheetError>;
}

/// Reads and writes single cells
pub trait CellStore {
    /// Current text of a cell; empty when the cell is blank
    fn read_cell(&self, workbook_id: &str, sheet: &str, cell: CellRef)
        -> Result<String, SheetError>;

    /// Overwrite a cell with `value`
    fn write_cell(
        &self,
        workbook_id: &str,
        sheet: &str,
        cell: CellRef,
        value: &str,
    ) -> Result<(), SheetError>;
}

/// Workbook stored as a JSON file
#[derive(Debug, Clone)]
pub struct JsonWorkbookFile {
    path: PathBuf,
}

impl JsonWorkbookFile {
    /// Use the workbook at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File location
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the file
    pub fn load(&self) -> Result<Workbook, SheetError> {
        let text = fs::read_to_string(&self.path).map_err(|e| SheetError::io_error(&self.path, e))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Encode and write the file
    pub fn store(&self, workbook: &Workbook) -> Result<(), SheetError> {
        let text = serde_json::to_string_pretty(workbook)?;
        fs::write(&self.path, text).map_err(|e| SheetError::io_error(&self.path, e))
    }

    fn load_checked(&self, workbook_id: &str) -> Result<Workbook, SheetError> {
        let mut workbook = self.load()?;
        match workbook.id.as_deref() {
            Some(id) if id != workbook_id => {
                return Err(SheetError::UnknownWorkbook(workbook_id.to_string()))
            }
            Some(_) => {}
            None => workbook.id = Some(workbook_id.to_string()),
        }
        Ok(workbook)
    }
}

impl SheetSource for JsonWorkbookFile {
    fn fetch_workbook(&self, workbook_id: &str) -> Result<Workbook, SheetError> {
        let workbook = self.load_checked(workbook_id)?;
        tracing::debug!(
            path = %self.path.display(),
            sheets = workbook.sheets.len(),
            "workbook loaded"
        );
        Ok(workbook)
    }
}

impl CellStore for JsonWorkbookFile {
    fn read_cell(
        &self,
        workbook_id: &str,
        sheet: &str,
        cell: CellRef,
    ) -> Result<String, SheetError> {
        let workbook = self.load_checked(workbook_id)?;
        let sheet = workbook
            .sheet(sheet)
            .ok_or_else(|| SheetError::UnknownSheet(sheet.to_string()))?;
        Ok(sheet.grid.at(cell).unwrap_or_default().to_string())
    }

    fn write_cell(
        &self,
        workbook_id: &str,
        sheet: &str,
        cell: CellRef,
        value: &str,
    ) -> Result<(), SheetError> {
        let mut workbook = self.load_checked(workbook_id)?;
        let target = workbook
            .sheet_mut(sheet)
            .ok_or_else(|| SheetError::UnknownSheet(sheet.to_string()))?;
        target.grid.set(cell, value);
        self.store(&workbook)
    }
}

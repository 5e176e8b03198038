//! Error types for spreadsheet access and parsing
//!
//! - [`ParseError`]: grid → tree failures, scoped to a single sheet
//! - [`SheetError`]: reading or writing workbooks through a backend

use std::path::PathBuf;

/// Errors while turning one sheet into a category
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// No language header row; the sheet is skipped
    #[error("sheet '{sheet}': no contents found")]
    NoContentFound { sheet: String },

    /// A row or column the layout requires is missing; the sheet walk stops
    #[error("sheet '{sheet}': malformed grid at row {row}, column {column}")]
    MalformedGrid {
        sheet: String,
        row: usize,
        column: usize,
    },
}

impl ParseError {
    /// Sheet the error belongs to
    #[must_use]
    pub fn sheet(&self) -> &str {
        match self {
            Self::NoContentFound { sheet } | Self::MalformedGrid { sheet, .. } => sheet,
        }
    }
}

/// Errors raised by spreadsheet backends
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    /// IO error on a workbook file
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Workbook JSON could not be read or written
    #[error("invalid workbook json: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport failure talking to the spreadsheet service
    #[error("spreadsheet request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Spreadsheet service answered with an error status
    #[error("spreadsheet service returned {status}: {message}")]
    Service { status: u16, message: String },

    /// Workbook ID does not match the backend
    #[error("unknown workbook: '{0}'")]
    UnknownWorkbook(String),

    /// Sheet name not present in the workbook
    #[error("unknown sheet: '{0}'")]
    UnknownSheet(String),

    /// Service endpoint is not a usable base URL
    #[error("invalid spreadsheet service url: {0}")]
    InvalidUrl(String),
}

impl SheetError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_coordinates() {
        let err = ParseError::MalformedGrid {
            sheet: "Billing".into(),
            row: 4,
            column: 2,
        };
        assert_eq!(
            err.to_string(),
            "sheet 'Billing': malformed grid at row 4, column 2"
        );
        assert_eq!(err.sheet(), "Billing");
    }
}

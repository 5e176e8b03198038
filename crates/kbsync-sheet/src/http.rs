//! Hosted spreadsheet backend
//!
//! Talks to a Google-Sheets-compatible v4 REST service with a bearer token:
//!
//! - `GET  v4/spreadsheets/{id}` for the title and sheet list
//! - `GET  v4/spreadsheets/{id}/values/{range}` for cell values
//! - `PUT  v4/spreadsheets/{id}/values/{range}?valueInputOption=RAW` for write-back

use crate::error::SheetError;
use crate::grid::{Grid, Sheet, Workbook};
use crate::source::{CellStore, SheetSource};
use kbsync_model::CellRef;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default service endpoint
pub const DEFAULT_SHEETS_URL: &str = "https://sheets.googleapis.com";

/// Settings for [`SheetsClient`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// Service endpoint
    pub base_url: String,
    /// OAuth bearer token
    pub access_token: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SHEETS_URL.to_string(),
            access_token: None,
            timeout_secs: 10,
        }
    }
}

impl SheetsConfig {
    /// With service endpoint
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// With bearer token
    #[inline]
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    properties: SpreadsheetProperties,
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct SpreadsheetProperties {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: Option<u64>,
    title: String,
}

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Blocking client for a hosted spreadsheet service
#[derive(Debug, Clone)]
pub struct SheetsClient {
    base_url: Url,
    access_token: Option<String>,
    client: Client,
}

impl SheetsClient {
    /// Create a client from settings
    pub fn new(config: &SheetsConfig) -> Result<Self, SheetError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| SheetError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            base_url,
            access_token: config.access_token.clone(),
            client,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, SheetError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SheetError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("v4")
            .push("spreadsheets")
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn checked(response: Response) -> Result<Response, SheetError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().unwrap_or_default();
        Err(SheetError::Service {
            status: status.as_u16(),
            message,
        })
    }

    fn values(&self, workbook_id: &str, range: &str) -> Result<Vec<Vec<String>>, SheetError> {
        let url = self.url(&[workbook_id, "values", range])?;
        let response = self.authorized(self.client.get(url)).send()?;
        let range: ValueRange = Self::checked(response)?.json()?;
        Ok(range.values)
    }
}

/// A1 range for one cell of a named sheet: `'Sheet name'!B3`
fn cell_range(sheet: &str, cell: CellRef) -> String {
    format!("{}!{}", quote_sheet(sheet), cell.to_a1())
}

fn quote_sheet(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

impl SheetSource for SheetsClient {
    fn fetch_workbook(&self, workbook_id: &str) -> Result<Workbook, SheetError> {
        let url = self.url(&[workbook_id])?;
        let response = self
            .authorized(self.client.get(url))
            .query(&[("fields", "properties.title,sheets.properties")])
            .send()?;
        let meta: SpreadsheetMeta = Self::checked(response)?.json()?;

        let mut workbook = Workbook::new(Some(workbook_id.to_string()), meta.properties.title);
        for entry in meta.sheets {
            let values = self.values(workbook_id, &quote_sheet(&entry.properties.title))?;
            tracing::debug!(sheet = %entry.properties.title, rows = values.len(), "sheet fetched");
            workbook.sheets.push(Sheet::new(
                entry.properties.title,
                entry.properties.sheet_id,
                Grid::new(values),
            ));
        }
        Ok(workbook)
    }
}

impl CellStore for SheetsClient {
    fn read_cell(
        &self,
        workbook_id: &str,
        sheet: &str,
        cell: CellRef,
    ) -> Result<String, SheetError> {
        let values = self.values(workbook_id, &cell_range(sheet, cell))?;
        Ok(values
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .unwrap_or_default())
    }

    fn write_cell(
        &self,
        workbook_id: &str,
        sheet: &str,
        cell: CellRef,
        value: &str,
    ) -> Result<(), SheetError> {
        let range = cell_range(sheet, cell);
        let url = self.url(&[workbook_id, "values", &range])?;
        let body = serde_json::json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": [[value]],
        });
        let response = self
            .authorized(self.client.put(url))
            .query(&[("valueInputOption", "RAW")])
            .json(&body)
            .send()?;
        Self::checked(response)?;
        Ok(())
    }
}

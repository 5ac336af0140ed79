//! Events-sheet fetcher. Pulls grid data with formatted values and
//! hyperlinks, which the plain values endpoint does not expose.

use async_trait::async_trait;
use serde::Deserialize;

use runcal_core::source::{SheetRow, SheetSource, SourceCell};
use runcal_core::RuncalResult;

use super::provider_err;

/// Narrow field mask: only rendered text and hyperlinks per cell.
const FIELDS: &str = "sheets(data(rowData(values(hyperlink,formattedValue))))";

pub struct GoogleSheets {
    http: reqwest::Client,
    access_token: String,
    sheet_id: String,
}

impl GoogleSheets {
    pub fn new(access_token: &str, sheet_id: &str) -> Self {
        GoogleSheets {
            http: reqwest::Client::new(),
            access_token: access_token.to_string(),
            sheet_id: sheet_id.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Spreadsheet {
    #[serde(default)]
    sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Sheet {
    #[serde(default)]
    data: Vec<GridData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridData {
    #[serde(default)]
    row_data: Vec<RowData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RowData {
    #[serde(default)]
    values: Vec<CellData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CellData {
    formatted_value: Option<String>,
    hyperlink: Option<String>,
}

#[async_trait]
impl SheetSource for GoogleSheets {
    async fn fetch_rows(&self) -> RuncalResult<Vec<SheetRow>> {
        let url = format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}",
            self.sheet_id
        );

        let spreadsheet: Spreadsheet = self
            .http
            .get(&url)
            .query(&[("fields", FIELDS)])
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(provider_err)?
            .error_for_status()
            .map_err(provider_err)?
            .json()
            .await
            .map_err(provider_err)?;

        // Only the first sheet carries the events table
        let rows = spreadsheet
            .sheets
            .into_iter()
            .next()
            .and_then(|s| s.data.into_iter().next())
            .map(|d| d.row_data)
            .unwrap_or_default();

        Ok(rows
            .into_iter()
            .map(|row| {
                SheetRow(
                    row.values
                        .into_iter()
                        .map(|cell| SourceCell {
                            text: cell.formatted_value,
                            hyperlink: cell.hyperlink,
                        })
                        .collect(),
                )
            })
            .collect())
    }
}

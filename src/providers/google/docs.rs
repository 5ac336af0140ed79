//! Runbook-document fetcher. Walks the document body for embedded
//! tables and flattens each cell to its first text run's content and
//! link.

use async_trait::async_trait;
use serde::Deserialize;

use runcal_core::source::{DocSource, DocTable, SourceCell};
use runcal_core::RuncalResult;

use super::provider_err;

pub struct GoogleDocs {
    http: reqwest::Client,
    access_token: String,
}

impl GoogleDocs {
    pub fn new(access_token: &str) -> Self {
        GoogleDocs {
            http: reqwest::Client::new(),
            access_token: access_token.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    body: Option<Body>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Body {
    #[serde(default)]
    content: Vec<StructuralElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructuralElement {
    table: Option<Table>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Table {
    #[serde(default)]
    table_rows: Vec<TableRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableRow {
    #[serde(default)]
    table_cells: Vec<TableCell>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableCell {
    #[serde(default)]
    content: Vec<CellElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CellElement {
    paragraph: Option<Paragraph>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Paragraph {
    #[serde(default)]
    elements: Vec<ParagraphElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParagraphElement {
    text_run: Option<TextRun>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextRun {
    content: Option<String>,
    text_style: Option<TextStyle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextStyle {
    link: Option<Link>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Link {
    url: Option<String>,
}

/// A cell's text and link live on the first text run of its first
/// paragraph; deeper content is not part of the runbook convention.
fn flatten_cell(cell: TableCell) -> SourceCell {
    let run = cell
        .content
        .into_iter()
        .next()
        .and_then(|e| e.paragraph)
        .and_then(|p| p.elements.into_iter().next())
        .and_then(|e| e.text_run);

    match run {
        Some(run) => SourceCell {
            text: run.content.map(|t| t.trim().to_string()),
            hyperlink: run.text_style.and_then(|s| s.link).and_then(|l| l.url),
        },
        None => SourceCell::default(),
    }
}

#[async_trait]
impl DocSource for GoogleDocs {
    async fn fetch_tables(&self, doc_id: &str) -> RuncalResult<Vec<DocTable>> {
        let url = format!("https://docs.googleapis.com/v1/documents/{}", doc_id);

        let document: Document = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(provider_err)?
            .error_for_status()
            .map_err(provider_err)?
            .json()
            .await
            .map_err(provider_err)?;

        let content = document.body.map(|b| b.content).unwrap_or_default();

        Ok(content
            .into_iter()
            .filter_map(|element| element.table)
            .map(|table| DocTable {
                rows: table
                    .table_rows
                    .into_iter()
                    .map(|row| row.table_cells.into_iter().map(flatten_cell).collect())
                    .collect(),
            })
            .collect())
    }
}

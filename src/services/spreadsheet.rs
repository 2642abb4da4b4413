use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_EXPORT_ENDPOINT: &str = "https://docs.google.com/spreadsheets/d";

#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("Spreadsheet ID is required")]
    MissingId,

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Spreadsheet export failed: {0}")]
    ExportFailed(String),
}

/// Header row and size of a reachable spreadsheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadsheetCheck {
    pub spreadsheet_id: String,
    pub columns: Vec<String>,
    pub row_count: usize,
}

/// Checks that a spreadsheet's CSV export is reachable
pub struct SpreadsheetChecker {
    export_endpoint: String,
    client: Client,
}

impl SpreadsheetChecker {
    pub fn new(export_endpoint: &str, timeout_secs: u64) -> Result<Self, SpreadsheetError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            export_endpoint: export_endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub async fn check(&self, spreadsheet_id: &str) -> Result<SpreadsheetCheck, SpreadsheetError> {
        let spreadsheet_id = spreadsheet_id.trim();
        if spreadsheet_id.is_empty() {
            return Err(SpreadsheetError::MissingId);
        }

        let url = format!(
            "{}/{}/export?format=csv",
            self.export_endpoint,
            urlencoding::encode(spreadsheet_id)
        );
        tracing::debug!("Probing spreadsheet export: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(SpreadsheetError::ExportFailed(format!(
                "Status {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let mut lines = body.lines().filter(|line| !line.trim().is_empty());
        let columns = lines.next().map(split_csv_line).unwrap_or_default();
        if columns.is_empty() {
            return Err(SpreadsheetError::ExportFailed(
                "export contains no header row".to_string(),
            ));
        }

        Ok(SpreadsheetCheck {
            spreadsheet_id: spreadsheet_id.to_string(),
            columns,
            row_count: lines.count(),
        })
    }
}

/// Split one CSV line, honouring double-quoted fields
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field).trim().to_string()),
            _ => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::OnceCell;

use super::{a1_range, quote_sheet, Grid, GridRange, Rgb, SheetPatch, SheetStore};
use crate::error::SyncError;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
/// Raw numbers, date serials and formulas instead of their displayed text, so a
/// `USER_ENTERED` write puts back what was read.
const READ_RENDER_OPTION: &str = "FORMULA";

pub struct GoogleSheetsStore {
    spreadsheet_id: String,
    sheet_name: String,
    access_token: String,
    client: reqwest::Client,
    sheet_id: OnceCell<i64>,
}

impl GoogleSheetsStore {
    pub fn new(spreadsheet_id: String, sheet_name: String, access_token: String) -> Self {
        Self {
            spreadsheet_id,
            sheet_name,
            access_token,
            client: reqwest::Client::new(),
            sheet_id: OnceCell::new(),
        }
    }

    fn url(&self, suffix: &str) -> String {
        format!("{SHEETS_API}/{}{suffix}", self.spreadsheet_id)
    }

    fn values_url(&self) -> String {
        let range = quote_sheet(&self.sheet_name);
        self.url(&format!(
            "/values/{}?valueRenderOption={READ_RENDER_OPTION}",
            urlencoding::encode(&range)
        ))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let resp = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .context("Google Sheets request failed")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::SheetApi {
                status: status.as_u16(),
                body,
            }
            .into());
        }
        Ok(resp)
    }

    async fn batch_update(&self, requests: Vec<Value>) -> Result<Value> {
        let resp = self
            .send(
                self.client
                    .post(self.url(":batchUpdate"))
                    .json(&json!({ "requests": requests })),
            )
            .await?;
        resp.json().await.context("Failed to parse batchUpdate response")
    }

    /// Numeric id of the target sheet, adding the sheet when it doesn't exist yet.
    async fn sheet_id(&self) -> Result<i64> {
        self.sheet_id
            .get_or_try_init(|| async {
                let resp = self
                    .send(
                        self.client
                            .get(self.url(""))
                            .query(&[("fields", "sheets.properties(sheetId,title)")]),
                    )
                    .await?;
                let meta: SpreadsheetMeta =
                    resp.json().await.context("Failed to parse spreadsheet metadata")?;
                if let Some(sheet) = meta
                    .sheets
                    .iter()
                    .find(|s| s.properties.title == self.sheet_name)
                {
                    return anyhow::Ok(sheet.properties.sheet_id);
                }

                tracing::info!(sheet = %self.sheet_name, "sheet not found, adding it");
                let reply = self
                    .batch_update(vec![json!({
                        "addSheet": { "properties": { "title": self.sheet_name } }
                    })])
                    .await?;
                reply["replies"][0]["addSheet"]["properties"]["sheetId"]
                    .as_i64()
                    .context("addSheet reply carried no sheetId")
            })
            .await
            .copied()
    }
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl ValueRange {
    fn into_grid(self) -> Grid {
        self.values
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect()
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        // Integers print exactly; floats print their shortest round-trip form.
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}

fn color_json(rgb: Rgb) -> Value {
    json!({
        "red": f64::from(rgb.red) / 255.0,
        "green": f64::from(rgb.green) / 255.0,
        "blue": f64::from(rgb.blue) / 255.0,
    })
}

fn background_rows(colors: &[Option<Rgb>]) -> Vec<Value> {
    colors
        .iter()
        .map(|color| match color {
            Some(rgb) => json!({
                "values": [{ "userEnteredFormat": { "backgroundColor": color_json(*rgb) } }]
            }),
            None => json!({ "values": [{}] }),
        })
        .collect()
}

#[async_trait]
impl SheetStore for GoogleSheetsStore {
    fn describe(&self) -> String {
        format!("Google Sheets {} / {}", self.spreadsheet_id, self.sheet_name)
    }

    async fn read_rows(&self) -> Result<Grid> {
        self.sheet_id().await?;
        let resp = self.send(self.client.get(self.values_url())).await?;
        let body: ValueRange = resp.json().await.context("Failed to parse sheet values")?;
        Ok(body.into_grid())
    }

    async fn apply_patch(&self, patch: &SheetPatch) -> Result<()> {
        if !patch.clears.is_empty() {
            let ranges: Vec<String> = patch
                .clears
                .iter()
                .map(|r| a1_range(&self.sheet_name, r))
                .collect();
            self.send(
                self.client
                    .post(self.url("/values:batchClear"))
                    .json(&json!({ "ranges": ranges })),
            )
            .await?;
        }

        if !patch.updates.is_empty() {
            let data: Vec<Value> = patch
                .updates
                .iter()
                .map(|update| {
                    let range = GridRange {
                        rows: update.row..update.row + 1,
                        columns: 0..update.cells.len().max(1),
                    };
                    json!({
                        "range": a1_range(&self.sheet_name, &range),
                        "values": [update.cells],
                    })
                })
                .collect();
            self.send(self.client.post(self.url("/values:batchUpdate")).json(&json!({
                "valueInputOption": "USER_ENTERED",
                "data": data,
            })))
            .await?;
        }

        Ok(())
    }

    async fn set_backgrounds(
        &self,
        column: usize,
        first_row: usize,
        colors: &[Option<Rgb>],
    ) -> Result<()> {
        if colors.is_empty() {
            return Ok(());
        }
        let sheet_id = self.sheet_id().await?;
        self.batch_update(vec![json!({
            "updateCells": {
                "range": {
                    "sheetId": sheet_id,
                    "startRowIndex": first_row,
                    "endRowIndex": first_row + colors.len(),
                    "startColumnIndex": column,
                    "endColumnIndex": column + 1,
                },
                "rows": background_rows(colors),
                "fields": "userEnteredFormat.backgroundColor",
            }
        })])
        .await?;
        Ok(())
    }
}

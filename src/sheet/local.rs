use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{column_letter, Grid, Rgb, SheetPatch, SheetStore};

/// Sheets kept in a JSON file, for running without a Google account.
///
/// One file may hold several named sheets. Backgrounds are stored per A1 cell.
pub struct LocalSheetStore {
    path: PathBuf,
    sheet_name: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WorkbookData {
    #[serde(default)]
    sheets: BTreeMap<String, SheetData>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SheetData {
    #[serde(default)]
    pub rows: Grid,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub backgrounds: BTreeMap<String, String>,
}

impl LocalSheetStore {
    pub fn new(path: PathBuf, sheet_name: String) -> Self {
        Self { path, sheet_name }
    }

    fn load(&self) -> Result<WorkbookData> {
        if !self.path.exists() {
            return Ok(WorkbookData::default());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    fn save(&self, data: &WorkbookData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(data)?;
        // Readers only ever see a complete file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut SheetData)) -> Result<()> {
        let mut data = self.load()?;
        f(data.sheets.entry(self.sheet_name.clone()).or_default());
        self.save(&data)
    }

    pub fn sheet(&self) -> Result<SheetData> {
        Ok(self
            .load()?
            .sheets
            .get(&self.sheet_name)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl SheetStore for LocalSheetStore {
    fn describe(&self) -> String {
        format!("{} / {}", self.path.display(), self.sheet_name)
    }

    async fn read_rows(&self) -> Result<Grid> {
        Ok(self.sheet()?.rows)
    }

    async fn apply_patch(&self, patch: &SheetPatch) -> Result<()> {
        self.update(|sheet| patch.apply_to(&mut sheet.rows))
    }

    async fn set_backgrounds(
        &self,
        column: usize,
        first_row: usize,
        colors: &[Option<Rgb>],
    ) -> Result<()> {
        self.update(|sheet| {
            let letter = column_letter(column);
            for (offset, color) in colors.iter().enumerate() {
                let cell = format!("{letter}{}", first_row + offset + 1);
                match color {
                    Some(rgb) => {
                        sheet.backgrounds.insert(cell, rgb.to_hex());
                    }
                    None => {
                        sheet.backgrounds.remove(&cell);
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::RowUpdate;

    fn store(dir: &tempfile::TempDir, sheet: &str) -> LocalSheetStore {
        LocalSheetStore::new(dir.path().join("book.json"), sheet.to_string())
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty_sheet() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store(&dir, "Tickets").read_rows().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn patch_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, "Tickets");
        let patch = SheetPatch {
            updates: vec![
                RowUpdate {
                    row: 0,
                    cells: vec!["ID".into(), "Status".into()],
                },
                RowUpdate {
                    row: 1,
                    cells: vec!["7".into(), "Open".into()],
                },
            ],
            clears: vec![],
        };
        store.apply_patch(&patch).await.unwrap();

        let rows = store.read_rows().await.unwrap();
        assert_eq!(rows[1], vec!["7".to_string(), "Open".to_string()]);
        assert!(!dir.path().join("book.json.tmp").exists());
    }

    #[tokio::test]
    async fn sheets_in_one_file_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let a = store(&dir, "A");
        let b = store(&dir, "B");
        let patch = SheetPatch {
            updates: vec![RowUpdate {
                row: 0,
                cells: vec!["only in A".into()],
            }],
            clears: vec![],
        };
        a.apply_patch(&patch).await.unwrap();
        assert_eq!(a.read_rows().await.unwrap().len(), 1);
        assert!(b.read_rows().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn backgrounds_set_and_clear_by_cell() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, "Tickets");
        let green = Rgb::from_hex("#008000");
        store.set_backgrounds(10, 1, &[green, None]).await.unwrap();
        let sheet = store.sheet().unwrap();
        assert_eq!(sheet.backgrounds.get("K2").map(String::as_str), Some("#008000"));
        assert!(!sheet.backgrounds.contains_key("K3"));

        store.set_backgrounds(10, 1, &[None]).await.unwrap();
        assert!(store.sheet().unwrap().backgrounds.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("book.json"), "{not json").unwrap();
        let err = store(&dir, "Tickets").read_rows().await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}

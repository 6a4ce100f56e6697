pub mod google;
pub mod local;

use std::ops::Range;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::config::{AppConfig, DEFAULT_SHEET_NAME};
use crate::error::SyncError;
use crate::layout::Profile;

pub type Grid = Vec<Vec<String>>;

#[async_trait]
pub trait SheetStore: Send + Sync {
    fn describe(&self) -> String;
    /// All rows, header first. Trailing empty cells and rows may be missing.
    async fn read_rows(&self) -> Result<Grid>;
    async fn apply_patch(&self, patch: &SheetPatch) -> Result<()>;
    /// Sets one background per row of `column`, starting at grid row `first_row`.
    /// `None` clears the background.
    async fn set_backgrounds(
        &self,
        column: usize,
        first_row: usize,
        colors: &[Option<Rgb>],
    ) -> Result<()>;
}

pub fn create_store(config: &AppConfig, profile: &Profile) -> Result<Box<dyn SheetStore>> {
    let target = config.profile_target(profile.name);

    if let Some(cfg) = &config.google_sheets {
        let Some(token) = cfg.resolved_token() else {
            bail!(SyncError::NotConfigured("google_sheets.access_token"));
        };
        let spreadsheet_id = target
            .and_then(|t| t.spreadsheet_id.clone())
            .unwrap_or_else(|| cfg.spreadsheet_id.clone());
        let sheet_name = target
            .and_then(|t| t.sheet_name.clone())
            .or_else(|| cfg.sheet_name.clone())
            .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string());
        return Ok(Box::new(google::GoogleSheetsStore::new(
            spreadsheet_id,
            sheet_name,
            token,
        )));
    }

    if let Some(cfg) = &config.local_sheet {
        let path = target
            .and_then(|t| t.path.clone())
            .unwrap_or_else(|| cfg.path.clone());
        let sheet_name = target
            .and_then(|t| t.sheet_name.clone())
            .or_else(|| cfg.sheet_name.clone())
            .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string());
        return Ok(Box::new(local::LocalSheetStore::new(path, sheet_name)));
    }

    bail!(SyncError::NotConfigured("[google_sheets] or [local_sheet]"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    /// Parses `#RRGGBB`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self {
            red: channel(0)?,
            green: channel(2)?,
            blue: channel(4)?,
        })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

/// A rectangular block of cells, 0-based, end-exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRange {
    pub rows: Range<usize>,
    pub columns: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowUpdate {
    pub row: usize,
    pub cells: Vec<String>,
}

/// The difference between the sheet as read and the rows a run wants it to hold.
///
/// Applying it gives the same sheet a full rewrite would, but rows that did not
/// change are never touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetPatch {
    pub updates: Vec<RowUpdate>,
    pub clears: Vec<GridRange>,
}

impl SheetPatch {
    pub fn diff(old: &[Vec<String>], new: &[Vec<String>]) -> Self {
        let width = grid_width(new);
        let old_width = grid_width(old);

        let updates = new
            .iter()
            .enumerate()
            .filter(|(i, row)| !same_cells(old.get(*i), row, width))
            .map(|(i, row)| RowUpdate {
                row: i,
                cells: padded(row, width),
            })
            .collect();

        let mut clears = Vec::new();
        let kept_rows = new.len().min(old.len());
        if old_width > width && kept_rows > 0 {
            let wide = old[..kept_rows]
                .iter()
                .any(|row| row.iter().skip(width).any(|cell| !cell.is_empty()));
            if wide {
                clears.push(GridRange {
                    rows: 0..kept_rows,
                    columns: width..old_width,
                });
            }
        }
        if old.len() > new.len() {
            clears.push(GridRange {
                rows: new.len()..old.len(),
                columns: 0..old_width.max(width),
            });
        }

        Self { updates, clears }
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.clears.is_empty()
    }

    /// Applies the patch to an in-memory grid, then drops trailing blank cells and
    /// rows the way the Sheets API omits them on read.
    pub fn apply_to(&self, grid: &mut Grid) {
        for clear in &self.clears {
            for row in grid.iter_mut().take(clear.rows.end).skip(clear.rows.start) {
                for cell in row.iter_mut().take(clear.columns.end).skip(clear.columns.start) {
                    cell.clear();
                }
            }
        }
        for update in &self.updates {
            if grid.len() <= update.row {
                grid.resize(update.row + 1, Vec::new());
            }
            let row = &mut grid[update.row];
            if row.len() < update.cells.len() {
                row.resize(update.cells.len(), String::new());
            }
            row[..update.cells.len()].clone_from_slice(&update.cells);
        }
        trim_grid(grid);
    }
}

fn grid_width(grid: &[Vec<String>]) -> usize {
    grid.iter().map(Vec::len).max().unwrap_or(0)
}

fn padded(row: &[String], width: usize) -> Vec<String> {
    let mut cells = row.to_vec();
    cells.resize(width, String::new());
    cells
}

fn same_cells(old: Option<&Vec<String>>, new: &[String], width: usize) -> bool {
    let Some(old) = old else {
        return false;
    };
    (0..width).all(|i| {
        let before = old.get(i).map(String::as_str).unwrap_or_default();
        let after = new.get(i).map(String::as_str).unwrap_or_default();
        before == after
    })
}

pub fn trim_grid(grid: &mut Grid) {
    for row in grid.iter_mut() {
        while row.last().is_some_and(|c| c.is_empty()) {
            row.pop();
        }
    }
    while grid.last().is_some_and(|r| r.is_empty()) {
        grid.pop();
    }
}

/// A1 column letters for a 0-based index: 0 → A, 25 → Z, 26 → AA.
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// A1 notation for `range` on `sheet`, e.g. `'Tickets'!A2:T5`.
pub fn a1_range(sheet: &str, range: &GridRange) -> String {
    format!(
        "{}!{}{}:{}{}",
        quote_sheet(sheet),
        column_letter(range.columns.start),
        range.rows.start + 1,
        column_letter(range.columns.end.saturating_sub(1)),
        range.rows.end
    )
}

pub fn quote_sheet(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Grid {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn rgb_from_hex() {
        assert_eq!(
            Rgb::from_hex("#90EE90"),
            Some(Rgb {
                red: 0x90,
                green: 0xEE,
                blue: 0x90
            })
        );
        assert_eq!(Rgb::from_hex("#ffa500").unwrap().to_hex(), "#FFA500");
        assert_eq!(Rgb::from_hex("FFA500"), None);
        assert_eq!(Rgb::from_hex("#FFA5"), None);
        assert_eq!(Rgb::from_hex("#GG0000"), None);
    }

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(19), "T");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn a1_ranges_are_one_based() {
        let range = GridRange {
            rows: 1..5,
            columns: 0..20,
        };
        assert_eq!(a1_range("Tickets", &range), "'Tickets'!A2:T5");
        assert_eq!(quote_sheet("Bob's"), "'Bob''s'");
    }

    #[test]
    fn diff_of_identical_grids_is_empty() {
        let rows = grid(&[&["ID", "Status"], &["1", "Open"]]);
        assert!(SheetPatch::diff(&rows, &rows).is_empty());
    }

    #[test]
    fn diff_ignores_trailing_blank_cells() {
        let old = grid(&[&["ID", "Status", "Note"], &["1", "Open"]]);
        let new = grid(&[&["ID", "Status", "Note"], &["1", "Open", ""]]);
        assert!(SheetPatch::diff(&old, &new).is_empty());
    }

    #[test]
    fn diff_only_touches_changed_rows() {
        let old = grid(&[&["ID", "Status"], &["1", "Open"], &["2", "Open"]]);
        let new = grid(&[&["ID", "Status"], &["1", "Open"], &["2", "Closed"]]);
        let patch = SheetPatch::diff(&old, &new);
        assert_eq!(
            patch.updates,
            vec![RowUpdate {
                row: 2,
                cells: vec!["2".into(), "Closed".into()]
            }]
        );
        assert!(patch.clears.is_empty());
    }

    #[test]
    fn diff_clears_stale_trailing_rows() {
        let old = grid(&[&["ID", "Status"], &["1", "Open"], &["2", "Open"], &["3", "Open", "x"]]);
        let new = grid(&[&["ID", "Status"], &["2", "Open"]]);
        let patch = SheetPatch::diff(&old, &new);
        assert_eq!(patch.updates.len(), 1);
        assert_eq!(
            patch.clears,
            vec![GridRange {
                rows: 2..4,
                columns: 0..3
            }]
        );
    }

    #[test]
    fn diff_clears_columns_beyond_new_width() {
        let old = grid(&[&["ID", "Status", "Old"], &["1", "Open", "stale"]]);
        let new = grid(&[&["ID", "Status"], &["1", "Open"]]);
        let patch = SheetPatch::diff(&old, &new);
        assert!(patch.updates.is_empty());
        assert_eq!(
            patch.clears,
            vec![GridRange {
                rows: 0..2,
                columns: 2..3
            }]
        );
    }

    #[test]
    fn diff_against_empty_sheet_writes_everything() {
        let new = grid(&[&["ID", "Status"], &["1", "Open"]]);
        let patch = SheetPatch::diff(&[], &new);
        assert_eq!(patch.updates.len(), 2);
        assert!(patch.clears.is_empty());
    }

    #[test]
    fn applying_diff_matches_full_rewrite() {
        let old = grid(&[
            &["ID", "Status", "Legacy"],
            &["1", "Open", "a"],
            &["2", "Open"],
            &["3", "Pending"],
        ]);
        let new = grid(&[&["ID", "Status"], &["2", "Closed"], &["4", "Open"]]);
        let mut sheet = old.clone();
        SheetPatch::diff(&old, &new).apply_to(&mut sheet);
        assert_eq!(sheet, new);
    }

    #[test]
    fn trim_grid_drops_blank_tail() {
        let mut rows = grid(&[&["a", ""], &["", ""], &[]]);
        trim_grid(&mut rows);
        assert_eq!(rows, grid(&[&["a"]]));
    }
}

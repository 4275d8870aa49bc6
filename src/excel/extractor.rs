//! Spreadsheet extractor - xlsx sheet → rectangular table of cell text

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Dimensions, Range, Reader, Xlsx};
use tracing::debug;

use super::comments::{read_sheet_comments, SheetComments};
use crate::error::{OnboardError, OnboardResult};

/// Opening and closing marks around comment text fused into a cell.
pub const NOTE_OPEN: &str = "<<<";
pub const NOTE_CLOSE: &str = ">>>";

/// Rectangular table of optional cell text. `None` is an empty cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetTable {
    rows: Vec<Vec<Option<String>>>,
}

impl SheetTable {
    /// Builds a table, padding short rows so every row has the same width.
    pub fn from_rows(rows: Vec<Vec<Option<String>>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&[Option<String>]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Removes rows and columns in which every cell is empty.
    pub fn drop_empty(self) -> Self {
        let width = self.width();
        let keep_cols: Vec<usize> = (0..width)
            .filter(|&c| self.rows.iter().any(|row| row[c].is_some()))
            .collect();
        let rows = self
            .rows
            .into_iter()
            .filter(|row| row.iter().any(Option::is_some))
            .map(|row| {
                keep_cols
                    .iter()
                    .map(|&c| row[c].clone())
                    .collect::<Vec<_>>()
            })
            .collect();
        Self { rows }
    }
}

/// An xlsx workbook held in memory, readable from a file or an upload.
#[derive(Debug, Clone)]
pub struct Workbook {
    name: String,
    bytes: Vec<u8>,
    sheet_names: Vec<String>,
}

impl Workbook {
    pub fn open<P: AsRef<Path>>(path: P) -> OnboardResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            OnboardError::Extraction(format!("Failed to open workbook {}: {}", path.display(), e))
        })?;
        Self::from_bytes(path.display().to_string(), bytes)
    }

    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> OnboardResult<Self> {
        let name = name.into();
        let xlsx = Xlsx::new(Cursor::new(bytes.as_slice())).map_err(|e| {
            OnboardError::Extraction(format!("Failed to open workbook {}: {}", name, e))
        })?;
        let sheet_names = xlsx.sheet_names();
        Ok(Self {
            name,
            bytes,
            sheet_names,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Finds the actual sheet name, ignoring case and surrounding blanks.
    pub fn resolve_sheet(&self, wanted: &str) -> OnboardResult<&str> {
        let wanted_key = wanted.trim().to_lowercase();
        self.sheet_names
            .iter()
            .find(|name| name.trim().to_lowercase() == wanted_key)
            .map(String::as_str)
            .ok_or_else(|| {
                OnboardError::Extraction(format!(
                    "Sheet '{}' not found in {} (available: {})",
                    wanted,
                    self.name,
                    self.sheet_names.join(", ")
                ))
            })
    }

    /// Reads one sheet into a table of cell text with comments fused in.
    ///
    /// A cell holding both a value and a comment reads `value <<<comment>>>`,
    /// a comment alone reads `<<<comment>>>`. Vertically merged regions carry
    /// their anchor value down the anchor column. Empty rows and columns are
    /// dropped last.
    pub fn extract(&self, sheet: &str) -> OnboardResult<SheetTable> {
        let actual = self.resolve_sheet(sheet)?.to_string();
        let mut xlsx = Xlsx::new(Cursor::new(self.bytes.as_slice())).map_err(|e| {
            OnboardError::Extraction(format!("Failed to open workbook {}: {}", self.name, e))
        })?;

        let range = xlsx.worksheet_range(&actual).map_err(|e| {
            OnboardError::Extraction(format!("Failed to read sheet '{}': {}", actual, e))
        })?;

        xlsx.load_merged_regions().map_err(|e| {
            OnboardError::Extraction(format!("Failed to load merged regions: {}", e))
        })?;
        let merged = match xlsx.worksheet_merge_cells(&actual) {
            Some(Ok(regions)) => regions,
            Some(Err(e)) => {
                return Err(OnboardError::Extraction(format!(
                    "Failed to read merged regions of '{}': {}",
                    actual, e
                )))
            }
            None => Vec::new(),
        };

        let comments = read_sheet_comments(&self.bytes, &actual)?;
        let table = build_table(&range, &merged, &comments);
        debug!(
            sheet = %actual,
            rows = table.height(),
            cols = table.width(),
            comments = comments.len(),
            "extracted sheet"
        );
        Ok(table)
    }
}

fn build_table(range: &Range<Data>, merged: &[Dimensions], comments: &SheetComments) -> SheetTable {
    let (mut rows, mut cols) = range
        .end()
        .map(|(r, c)| (r + 1, c + 1))
        .unwrap_or((0, 0));
    for &(r, c) in comments.keys() {
        rows = rows.max(r + 1);
        cols = cols.max(c + 1);
    }

    let mut grid: Vec<Vec<Option<String>>> = (0..rows)
        .map(|r| (0..cols).map(|c| cell_text(range.get_value((r, c)))).collect())
        .collect();

    for region in merged {
        let (top, col) = region.start;
        let (bottom, _) = region.end;
        let Some(anchor) = grid
            .get(top as usize)
            .and_then(|row| row.get(col as usize))
            .cloned()
            .flatten()
        else {
            continue;
        };
        for r in (top + 1)..=bottom {
            if let Some(cell) = grid.get_mut(r as usize).and_then(|row| row.get_mut(col as usize)) {
                if cell.is_none() {
                    *cell = Some(anchor.clone());
                }
            }
        }
    }

    for (&(r, c), note) in comments {
        let cell = &mut grid[r as usize][c as usize];
        *cell = Some(match cell.take() {
            Some(value) => format!("{} {}{}{}", value, NOTE_OPEN, note, NOTE_CLOSE),
            None => format!("{}{}{}", NOTE_OPEN, note, NOTE_CLOSE),
        });
    }

    SheetTable::from_rows(grid).drop_empty()
}

/// Renders a cell as text. Integral floats lose their decimal part.
fn cell_text(cell: Option<&Data>) -> Option<String> {
    let text = match cell? {
        Data::Empty => return None,
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#{:?}", e),
        other => other.to_string(),
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

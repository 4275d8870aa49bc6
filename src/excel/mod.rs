//! Workbook access
//!
//! - Extract: xlsx sheet → table of cell text (comments fused, merges filled)
//! - Group: partition rows into logical records by a key column
//! - Template: write a blank onboarding workbook

mod comments;
mod extractor;
mod grouper;
mod template;

pub use comments::parse_cell_ref;
pub use extractor::{SheetTable, Workbook, NOTE_CLOSE, NOTE_OPEN};
pub use grouper::{group_rows, regroup, RowGroup};
pub use template::TemplateWriter;

/// Column whose non-empty cells open a new record group.
pub const DEFAULT_KEY_COLUMN: usize = 0;

/// Extracts `sheet` and normalizes it through row grouping.
pub fn load_sheet(workbook: &Workbook, sheet: &str) -> crate::error::OnboardResult<SheetTable> {
    let table = workbook.extract(sheet)?;
    let groups = group_rows(&table, DEFAULT_KEY_COLUMN);
    Ok(regroup(&table, &groups))
}

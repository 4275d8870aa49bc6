//! Onboarding workbook template writer

use std::collections::BTreeMap;
use std::path::Path;

use rust_xlsxwriter::{Format, Note, Workbook, Worksheet};

use crate::error::{OnboardError, OnboardResult};
use crate::mapping::schema::{schema_for, SheetSchema};
use crate::types::Entity;

/// Writes a workbook with one sheet per entity: optional banner row, header
/// row with notes on required columns, then any supplied data rows.
#[derive(Debug, Default)]
pub struct TemplateWriter {
    rows: BTreeMap<Entity, Vec<Vec<String>>>,
    notes: Vec<(Entity, u32, u16, String)>,
}

impl TemplateWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fills data rows for an entity, in header column order.
    pub fn with_rows<R, S>(mut self, entity: Entity, rows: R) -> Self
    where
        R: IntoIterator<Item = Vec<S>>,
        S: Into<String>,
    {
        self.rows.entry(entity).or_default().extend(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Attaches a note to a data cell; `data_row` counts from the first data row.
    pub fn with_note(mut self, entity: Entity, data_row: u32, col: u16, text: impl Into<String>) -> Self {
        self.notes.push((entity, data_row, col, text.into()));
        self
    }

    pub fn save(&self, path: &Path) -> OnboardResult<()> {
        let mut workbook = self.build()?;
        workbook
            .save(path)
            .map_err(|e| OnboardError::Template(format!("Failed to save {}: {}", path.display(), e)))
    }

    pub fn to_bytes(&self) -> OnboardResult<Vec<u8>> {
        let mut workbook = self.build()?;
        workbook
            .save_to_buffer()
            .map_err(|e| OnboardError::Template(format!("Failed to build workbook: {}", e)))
    }

    fn build(&self) -> OnboardResult<Workbook> {
        let mut workbook = Workbook::new();
        for entity in Entity::ALL {
            let worksheet = workbook.add_worksheet();
            self.write_sheet(worksheet, schema_for(entity))?;
        }
        Ok(workbook)
    }

    fn write_sheet(&self, worksheet: &mut Worksheet, schema: &SheetSchema) -> OnboardResult<()> {
        let err = |e: rust_xlsxwriter::XlsxError| {
            OnboardError::Template(format!("Sheet '{}': {}", schema.sheet_name(), e))
        };
        let bold = Format::new().set_bold();
        let header_row = schema.header_row as u32;
        let last_col = (schema.columns.len() - 1) as u16;

        worksheet.set_name(schema.sheet_name()).map_err(err)?;

        if let Some(banner) = schema.banner {
            worksheet
                .merge_range(0, 0, 0, last_col, banner, &bold)
                .map_err(err)?;
        }

        for (col, (label, field)) in schema.columns.iter().enumerate() {
            let col = col as u16;
            worksheet
                .write_string_with_format(header_row, col, *label, &bold)
                .map_err(err)?;
            worksheet.set_column_width(col, 24).map_err(err)?;
            if schema.is_required(field) {
                let note = Note::new("Required").set_author("onboard").add_author_prefix(false);
                worksheet.insert_note(header_row, col, &note).map_err(err)?;
            }
        }

        let first_data_row = header_row + 1;
        if let Some(rows) = self.rows.get(&schema.entity) {
            for (offset, row) in rows.iter().enumerate() {
                for (col, value) in row.iter().enumerate() {
                    if value.is_empty() {
                        continue;
                    }
                    worksheet
                        .write_string(first_data_row + offset as u32, col as u16, value)
                        .map_err(err)?;
                }
            }
        }

        for (_, data_row, col, text) in self.notes.iter().filter(|n| n.0 == schema.entity) {
            let note = Note::new(text).set_author("onboard").add_author_prefix(false);
            worksheet
                .insert_note(first_data_row + data_row, *col, &note)
                .map_err(err)?;
        }
        Ok(())
    }
}

//! Metadata mapper
//!
//! Turns a sheet table into records keyed by canonical field names, using the
//! sheet's label dictionary, and enforces required fields.

pub mod rows;
pub mod schema;

use std::collections::BTreeMap;

use crate::error::{OnboardError, OnboardResult};
use crate::excel::{SheetTable, NOTE_CLOSE, NOTE_OPEN};

pub use rows::{
    load_rows, AssetModelRow, HierarchyRow, IndustryRow, ParameterCategoryRow, ParameterGroupRow,
    ParameterRow, SheetRow, UnitGroupRow, UnitRow,
};
pub use schema::{schema_for, RequiredField, SheetSchema};

/// A cell value after stripping: one string, or a list for list fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

/// One data row mapped onto canonical fields. Blank cells are absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    /// Zero-based row index within the cleaned sheet table.
    pub row: usize,
    fields: BTreeMap<&'static str, FieldValue>,
    notes: BTreeMap<&'static str, String>,
}

impl Record {
    pub fn new(row: usize) -> Self {
        Self {
            row,
            ..Default::default()
        }
    }

    /// 1-based row number as reported to users.
    pub fn row_number(&self) -> usize {
        self.row + 1
    }

    pub fn insert(&mut self, field: &'static str, value: FieldValue) {
        self.fields.insert(field, value);
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Scalar text of a field; list fields are joined with ", ".
    pub fn text(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::List(items) => Some(items.join(", ")),
        }
    }

    /// List value of a field; scalar fields become a one-item list.
    pub fn list(&self, field: &str) -> Vec<String> {
        match self.fields.get(field) {
            Some(FieldValue::List(items)) => items.clone(),
            Some(FieldValue::Text(s)) => vec![s.clone()],
            None => Vec::new(),
        }
    }

    pub fn require(&self, field: &str) -> OnboardResult<String> {
        self.text(field).ok_or_else(|| {
            OnboardError::Validation(format!(
                "Field '{}' is missing in row number {}",
                field,
                self.row_number()
            ))
        })
    }

    /// Comment text that was attached to a field's cell.
    pub fn note(&self, field: &str) -> Option<&str> {
        self.notes.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }
}

/// Splits a trailing `<<<note>>>` annotation off a cell.
pub fn split_note(raw: &str) -> (Option<String>, Option<String>) {
    let trimmed = raw.trim();
    if let Some(body) = trimmed.strip_suffix(NOTE_CLOSE) {
        if let Some(idx) = body.rfind(NOTE_OPEN) {
            let value = body[..idx].trim();
            let note = body[idx + NOTE_OPEN.len()..].trim();
            return (non_blank(value), non_blank(note));
        }
    }
    (non_blank(trimmed), None)
}

fn non_blank(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split([',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Maps every data row of `table` onto records.
///
/// Fails on an empty sheet, and on the first blank required field with the
/// 1-based row number. A sheet holding only its header yields no records.
pub fn map_records(table: &SheetTable, schema: &SheetSchema) -> OnboardResult<Vec<Record>> {
    let sheet = schema.sheet_name();
    if table.is_empty() {
        return Err(OnboardError::Extraction(format!("Sheet '{}' is empty", sheet)));
    }
    let Some(header) = table.row(schema.header_row) else {
        return Ok(Vec::new());
    };

    let columns: Vec<(usize, &'static str)> = header
        .iter()
        .enumerate()
        .filter_map(|(col, cell)| {
            let (label, _) = split_note(cell.as_deref()?);
            schema.field_for(&label?).map(|field| (col, field))
        })
        .collect();

    for required in schema.required {
        if !columns.iter().any(|(_, f)| *f == required.field) {
            return Err(OnboardError::Validation(format!(
                "Column '{}' not found in header row {} of sheet '{}'",
                required.label,
                schema.header_row + 1,
                sheet
            )));
        }
    }

    let mut records = Vec::new();
    for row in (schema.header_row + 1)..table.height() {
        let mut record = Record::new(row);
        for &(col, field) in &columns {
            let Some(raw) = table.cell(row, col) else {
                continue;
            };
            let (value, note) = split_note(raw);
            if let Some(note) = note {
                record.notes.insert(field, note);
            }
            let Some(value) = value else {
                continue;
            };
            let value = if schema.is_list(field) {
                let items = split_list(&value);
                if items.is_empty() {
                    continue;
                }
                FieldValue::List(items)
            } else {
                FieldValue::Text(value)
            };
            record.insert(field, value);
        }

        for required in schema.required {
            if record.get(required.field).is_none() {
                return Err(OnboardError::Validation(format!(
                    "{} is missing in row number {} of sheet '{}'",
                    required.label,
                    record.row_number(),
                    sheet
                )));
            }
        }
        records.push(record);
    }
    Ok(records)
}

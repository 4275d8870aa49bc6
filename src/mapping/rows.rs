//! Typed sheet rows, one struct per entity.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::{map_records, schema_for, Record};
use crate::error::{OnboardError, OnboardResult};
use crate::excel::{load_sheet, Workbook};
use crate::types::Entity;

/// A row type that can be built from a mapped record.
pub trait SheetRow: Sized {
    const ENTITY: Entity;

    fn from_record(record: &Record) -> OnboardResult<Self>;

    /// Natural key compared against remote names.
    fn name(&self) -> &str;

    /// 1-based sheet row, for messages.
    fn row_number(&self) -> usize;
}

/// Reads, groups and maps the entity's sheet into typed rows.
pub fn load_rows<T: SheetRow>(workbook: &Workbook) -> OnboardResult<Vec<T>> {
    let schema = schema_for(T::ENTITY);
    let table = load_sheet(workbook, schema.sheet_name())?;
    map_records(&table, schema)?
        .iter()
        .map(T::from_record)
        .collect()
}

fn text_or_empty(record: &Record, field: &str) -> String {
    record.text(field).unwrap_or_default()
}

/// Reads a yes/no style cell. Blank is `false`.
fn flag(record: &Record, field: &str) -> OnboardResult<bool> {
    let Some(raw) = record.text(field) else {
        return Ok(false);
    };
    match raw.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => Ok(true),
        "no" | "n" | "false" | "0" => Ok(false),
        other => Err(OnboardError::Validation(format!(
            "Invalid value '{}' for {} in row number {}, expected yes or no",
            other,
            field,
            record.row_number()
        ))),
    }
}

/// Lower and upper bound written as `min-max`, `min,max` or `min to max`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Bounds {
    pub min: String,
    pub max: String,
}

impl Bounds {
    pub fn parse(raw: &str) -> Option<Bounds> {
        static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
        let re = PATTERN
            .get_or_init(|| {
                Regex::new(
                    r"^\s*(-?\d+(?:\.\d+)?)?\s*(?:,|-|to|TO|To)\s*(-?\d+(?:\.\d+)?)?\s*$",
                )
                .ok()
            })
            .as_ref()?;
        let caps = re.captures(raw)?;
        let min = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
        let max = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
        if min.is_empty() && max.is_empty() {
            return None;
        }
        Some(Bounds { min, max })
    }

    fn from_field(record: &Record, field: &str) -> OnboardResult<Bounds> {
        match record.text(field) {
            None => Ok(Bounds::default()),
            Some(raw) => Bounds::parse(&raw).ok_or_else(|| {
                OnboardError::Validation(format!(
                    "Invalid range '{}' for {} in row number {}, expected min-max",
                    raw,
                    field,
                    record.row_number()
                ))
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitGroupRow {
    pub row: usize,
    pub unit_group_name: String,
    pub description: String,
}

impl SheetRow for UnitGroupRow {
    const ENTITY: Entity = Entity::UnitGroup;

    fn from_record(record: &Record) -> OnboardResult<Self> {
        Ok(Self {
            row: record.row_number(),
            unit_group_name: record.require("unit_group_name")?,
            description: text_or_empty(record, "description"),
        })
    }

    fn name(&self) -> &str {
        &self.unit_group_name
    }

    fn row_number(&self) -> usize {
        self.row
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitRow {
    pub row: usize,
    pub name: String,
    pub notation: String,
    pub unit_group_name: Option<String>,
}

impl SheetRow for UnitRow {
    const ENTITY: Entity = Entity::Unit;

    fn from_record(record: &Record) -> OnboardResult<Self> {
        Ok(Self {
            row: record.row_number(),
            name: record.require("name")?,
            notation: text_or_empty(record, "notation"),
            unit_group_name: record.text("unit_group_name"),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn row_number(&self) -> usize {
        self.row
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterCategoryRow {
    pub row: usize,
    pub tag_category_name: String,
    pub description: String,
    pub tag_category_icon: String,
}

impl SheetRow for ParameterCategoryRow {
    const ENTITY: Entity = Entity::ParameterCategory;

    fn from_record(record: &Record) -> OnboardResult<Self> {
        Ok(Self {
            row: record.row_number(),
            tag_category_name: record.require("tag_category_name")?,
            description: text_or_empty(record, "description"),
            tag_category_icon: text_or_empty(record, "tag_category_icon"),
        })
    }

    fn name(&self) -> &str {
        &self.tag_category_name
    }

    fn row_number(&self) -> usize {
        self.row
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGroupRow {
    pub row: usize,
    pub tag_group_name: String,
    pub description: String,
    pub category: Option<String>,
}

impl SheetRow for ParameterGroupRow {
    const ENTITY: Entity = Entity::ParameterGroup;

    fn from_record(record: &Record) -> OnboardResult<Self> {
        Ok(Self {
            row: record.row_number(),
            tag_group_name: record.require("tag_group_name")?,
            description: text_or_empty(record, "description"),
            category: record.text("category"),
        })
    }

    fn name(&self) -> &str {
        &self.tag_group_name
    }

    fn row_number(&self) -> usize {
        self.row
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRow {
    pub row: usize,
    pub tag_name: String,
    pub description: String,
    pub system_tag_label: String,
    pub data_type_name: Option<String>,
    pub tag_type_name: Option<String>,
    pub tag_label: String,
    pub unit_name: Option<String>,
    pub tag_group_name: Option<String>,
    pub parameter_category: Option<String>,
    pub numeric_limit: Bounds,
    pub string_length: Bounds,
    pub default_value: String,
    pub input_required: bool,
}

impl SheetRow for ParameterRow {
    const ENTITY: Entity = Entity::Parameter;

    fn from_record(record: &Record) -> OnboardResult<Self> {
        let tag_name = record.require("tag_name")?;
        Ok(Self {
            row: record.row_number(),
            description: text_or_empty(record, "description"),
            system_tag_label: text_or_empty(record, "system_tag_label"),
            data_type_name: record.text("data_type_name"),
            tag_type_name: record.text("tag_type_name"),
            tag_label: record.text("tag_label").unwrap_or_else(|| tag_name.clone()),
            unit_name: record.text("unit_name"),
            tag_group_name: record.text("tag_group_name"),
            parameter_category: record.text("parameter_category"),
            numeric_limit: Bounds::from_field(record, "numeric_limit")?,
            string_length: Bounds::from_field(record, "string_length")?,
            default_value: text_or_empty(record, "basic"),
            input_required: flag(record, "required")?,
            tag_name,
        })
    }

    fn name(&self) -> &str {
        &self.tag_name
    }

    fn row_number(&self) -> usize {
        self.row
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndustryRow {
    pub row: usize,
    pub industry: String,
    pub description: String,
}

impl SheetRow for IndustryRow {
    const ENTITY: Entity = Entity::Industry;

    fn from_record(record: &Record) -> OnboardResult<Self> {
        Ok(Self {
            row: record.row_number(),
            industry: record.require("industry")?,
            description: record.require("description")?,
        })
    }

    fn name(&self) -> &str {
        &self.industry
    }

    fn row_number(&self) -> usize {
        self.row
    }
}

/// What the asset model's parameter list names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterSource {
    Group,
    Category,
}

impl ParameterSource {
    fn parse(raw: &str, row: usize) -> OnboardResult<Self> {
        match raw.trim().to_lowercase().as_str() {
            "parameter group" | "parameter groups" | "group" => Ok(ParameterSource::Group),
            "parameter category" | "parameter categories" | "category" => {
                Ok(ParameterSource::Category)
            }
            other => Err(OnboardError::Validation(format!(
                "Invalid Select Type '{}' in row number {}, expected 'parameter group' or 'parameter category'",
                other, row
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetModelRow {
    pub row: usize,
    pub asset_model_name: String,
    pub description: String,
    pub industry: String,
    pub select_type: Option<ParameterSource>,
    /// Group or category names, depending on `select_type`.
    pub parameter_sets: Vec<String>,
    pub increment_version: bool,
}

impl SheetRow for AssetModelRow {
    const ENTITY: Entity = Entity::AssetModel;

    fn from_record(record: &Record) -> OnboardResult<Self> {
        let row = record.row_number();
        let select_type = record
            .text("select_type")
            .map(|raw| ParameterSource::parse(&raw, row))
            .transpose()?;
        Ok(Self {
            row,
            asset_model_name: record.require("asset_model_name")?,
            description: record.require("description")?,
            industry: record.require("industry")?,
            select_type,
            parameter_sets: record.list("parameter_groups/parameter_category"),
            increment_version: flag(record, "increment_version")?,
        })
    }

    fn name(&self) -> &str {
        &self.asset_model_name
    }

    fn row_number(&self) -> usize {
        self.row
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyRow {
    pub row: usize,
    /// Full node path, segments trimmed and joined with `>`.
    pub path: String,
    pub tags: Vec<String>,
}

impl HierarchyRow {
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('>')
    }
}

/// Normalizes a `>`-delimited node path: trims segments, drops empty ones.
pub fn normalize_path(raw: &str) -> String {
    raw.split('>')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(">")
}

impl SheetRow for HierarchyRow {
    const ENTITY: Entity = Entity::Hierarchy;

    fn from_record(record: &Record) -> OnboardResult<Self> {
        Ok(Self {
            row: record.row_number(),
            path: normalize_path(&record.require("name")?),
            tags: record.list("tags"),
        })
    }

    fn name(&self) -> &str {
        &self.path
    }

    fn row_number(&self) -> usize {
        self.row
    }
}

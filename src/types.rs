//! Core types shared by the extractor, mapper, reconcilers and pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OnboardError;

/// Platform entity kinds, one per workbook sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    UnitGroup,
    Unit,
    ParameterCategory,
    ParameterGroup,
    Parameter,
    Industry,
    AssetModel,
    Hierarchy,
}

impl Entity {
    /// Every entity in dependency order.
    pub const ALL: [Entity; 8] = [
        Entity::UnitGroup,
        Entity::Unit,
        Entity::ParameterCategory,
        Entity::ParameterGroup,
        Entity::Parameter,
        Entity::Industry,
        Entity::AssetModel,
        Entity::Hierarchy,
    ];

    /// Steps run when no explicit selection is given. Hierarchy is opt-in.
    pub const DEFAULT_ORDER: [Entity; 7] = [
        Entity::UnitGroup,
        Entity::Unit,
        Entity::ParameterCategory,
        Entity::ParameterGroup,
        Entity::Parameter,
        Entity::Industry,
        Entity::AssetModel,
    ];

    /// Worksheet name holding this entity's rows.
    pub fn sheet_name(self) -> &'static str {
        match self {
            Entity::UnitGroup => "unit group",
            Entity::Unit => "unit",
            Entity::ParameterCategory => "parameter category",
            Entity::ParameterGroup => "parameter group",
            Entity::Parameter => "parameter",
            Entity::Industry => "industry",
            Entity::AssetModel => "asset model",
            Entity::Hierarchy => "hierarchy",
        }
    }

    /// Human label used in status messages.
    pub fn label(self) -> &'static str {
        match self {
            Entity::UnitGroup => "Unit Groups",
            Entity::Unit => "Units",
            Entity::ParameterCategory => "Parameter Categories",
            Entity::ParameterGroup => "Parameter Groups",
            Entity::Parameter => "Parameters",
            Entity::Industry => "Industries",
            Entity::AssetModel => "Asset Models",
            Entity::Hierarchy => "Hierarchy",
        }
    }

    /// Command-line / API identifier.
    pub fn key(self) -> &'static str {
        match self {
            Entity::UnitGroup => "unit-group",
            Entity::Unit => "unit",
            Entity::ParameterCategory => "parameter-category",
            Entity::ParameterGroup => "parameter-group",
            Entity::Parameter => "parameter",
            Entity::Industry => "industry",
            Entity::AssetModel => "asset-model",
            Entity::Hierarchy => "hierarchy",
        }
    }

    /// Orders a selection by dependency order and removes duplicates.
    pub fn in_run_order(selection: &[Entity]) -> Vec<Entity> {
        Entity::ALL
            .iter()
            .copied()
            .filter(|e| selection.contains(e))
            .collect()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Entity {
    type Err = OnboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        // accept plurals: "units", "industries", "parameter-categories"
        let singular = match normalized.strip_suffix("ies") {
            Some(stem) => format!("{}y", stem),
            None => normalized.trim_end_matches('s').to_string(),
        };
        Entity::ALL
            .iter()
            .copied()
            .find(|e| e.key() == normalized || e.key() == singular)
            .ok_or_else(|| {
                OnboardError::Config(format!(
                    "Unknown entity '{}'. Expected one of: {}",
                    s,
                    Entity::ALL.map(|e| e.key()).join(", ")
                ))
            })
    }
}

/// Project envelope fields carried by every request payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectContext {
    pub project_id: String,
    pub project_type: String,
    pub tz: String,
    pub language: String,
}

/// Case-insensitive natural key used for every set comparison.
pub fn natural_key(name: &str) -> String {
    name.trim().to_lowercase()
}

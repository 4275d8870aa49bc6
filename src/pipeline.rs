//! Orchestrator
//!
//! Loads every selected sheet first, so a malformed workbook fails before
//! any remote call, then runs the entity steps in dependency order. The
//! first failing step stops the run.

use tracing::{error, info};

use crate::error::OnboardResult;
use crate::excel::Workbook;
use crate::mapping::{
    load_rows, AssetModelRow, HierarchyRow, IndustryRow, ParameterCategoryRow, ParameterGroupRow,
    ParameterRow, SheetRow, UnitGroupRow, UnitRow,
};
use crate::reconcile::{
    reconcile, AssetModels, Hierarchy, Industries, ParameterCategories, ParameterGroups,
    Parameters, ReconciliationResult, RunLog, UnitGroups, Units,
};
use crate::remote::PlatformClient;
use crate::types::Entity;

/// Typed rows of one sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetRows {
    UnitGroups(Vec<UnitGroupRow>),
    Units(Vec<UnitRow>),
    ParameterCategories(Vec<ParameterCategoryRow>),
    ParameterGroups(Vec<ParameterGroupRow>),
    Parameters(Vec<ParameterRow>),
    Industries(Vec<IndustryRow>),
    AssetModels(Vec<AssetModelRow>),
    Hierarchy(Vec<HierarchyRow>),
}

fn names<T: SheetRow>(rows: &[T]) -> Vec<String> {
    rows.iter().map(|r| r.name().to_string()).collect()
}

impl SheetRows {
    /// Reads and validates the entity's sheet.
    pub fn load(entity: Entity, workbook: &Workbook) -> OnboardResult<Self> {
        Ok(match entity {
            Entity::UnitGroup => SheetRows::UnitGroups(load_rows(workbook)?),
            Entity::Unit => SheetRows::Units(load_rows(workbook)?),
            Entity::ParameterCategory => SheetRows::ParameterCategories(load_rows(workbook)?),
            Entity::ParameterGroup => SheetRows::ParameterGroups(load_rows(workbook)?),
            Entity::Parameter => SheetRows::Parameters(load_rows(workbook)?),
            Entity::Industry => SheetRows::Industries(load_rows(workbook)?),
            Entity::AssetModel => SheetRows::AssetModels(load_rows(workbook)?),
            Entity::Hierarchy => SheetRows::Hierarchy(load_rows(workbook)?),
        })
    }

    pub fn entity(&self) -> Entity {
        match self {
            SheetRows::UnitGroups(_) => Entity::UnitGroup,
            SheetRows::Units(_) => Entity::Unit,
            SheetRows::ParameterCategories(_) => Entity::ParameterCategory,
            SheetRows::ParameterGroups(_) => Entity::ParameterGroup,
            SheetRows::Parameters(_) => Entity::Parameter,
            SheetRows::Industries(_) => Entity::Industry,
            SheetRows::AssetModels(_) => Entity::AssetModel,
            SheetRows::Hierarchy(_) => Entity::Hierarchy,
        }
    }

    /// Natural keys in sheet order.
    pub fn names(&self) -> Vec<String> {
        match self {
            SheetRows::UnitGroups(rows) => names(rows),
            SheetRows::Units(rows) => names(rows),
            SheetRows::ParameterCategories(rows) => names(rows),
            SheetRows::ParameterGroups(rows) => names(rows),
            SheetRows::Parameters(rows) => names(rows),
            SheetRows::Industries(rows) => names(rows),
            SheetRows::AssetModels(rows) => names(rows),
            SheetRows::Hierarchy(rows) => names(rows),
        }
    }

    pub fn len(&self) -> usize {
        self.names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn reconcile(self, client: &PlatformClient, log: &mut RunLog) -> OnboardResult<ReconciliationResult> {
        match self {
            SheetRows::UnitGroups(rows) => reconcile(&mut UnitGroups, client, rows, log),
            SheetRows::Units(rows) => reconcile(&mut Units::default(), client, rows, log),
            SheetRows::ParameterCategories(rows) => {
                reconcile(&mut ParameterCategories, client, rows, log)
            }
            SheetRows::ParameterGroups(rows) => {
                reconcile(&mut ParameterGroups::default(), client, rows, log)
            }
            SheetRows::Parameters(rows) => reconcile(&mut Parameters::default(), client, rows, log),
            SheetRows::Industries(rows) => reconcile(&mut Industries, client, rows, log),
            SheetRows::AssetModels(rows) => reconcile(&mut AssetModels::default(), client, rows, log),
            SheetRows::Hierarchy(rows) => reconcile(&mut Hierarchy::default(), client, rows, log),
        }
    }
}

/// Result of a run: the status log and per-step outcomes.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub success: bool,
    pub messages: Vec<String>,
    pub results: Vec<ReconciliationResult>,
}

impl RunOutcome {
    /// The newline-joined status log.
    pub fn log_text(&self) -> String {
        self.messages.join("\n")
    }

    pub fn created_count(&self) -> usize {
        self.results.iter().map(|r| r.created.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    steps: Vec<Entity>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            steps: Entity::DEFAULT_ORDER.to_vec(),
        }
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs only `steps`, still in dependency order.
    pub fn with_steps(steps: &[Entity]) -> Self {
        Self {
            steps: Entity::in_run_order(steps),
        }
    }

    /// Adds or removes the hierarchy step.
    pub fn include_hierarchy(self, include: bool) -> Self {
        let mut steps: Vec<Entity> = self
            .steps
            .into_iter()
            .filter(|e| *e != Entity::Hierarchy)
            .collect();
        if include {
            steps.push(Entity::Hierarchy);
        }
        Self::with_steps(&steps)
    }

    pub fn steps(&self) -> &[Entity] {
        &self.steps
    }

    /// Loads every step's sheet without contacting the platform.
    pub fn load(&self, workbook: &Workbook) -> OnboardResult<Vec<SheetRows>> {
        self.steps
            .iter()
            .map(|entity| SheetRows::load(*entity, workbook))
            .collect()
    }

    pub fn run(&self, workbook: &Workbook, client: &PlatformClient) -> RunOutcome {
        let mut log = RunLog::new();
        info!(workbook = workbook.name(), steps = self.steps.len(), "migration started");

        let loaded = match self.load(workbook) {
            Ok(loaded) => loaded,
            Err(e) => {
                error!(kind = e.kind(), "workbook rejected: {}", e);
                log.push(format!("Error while reading workbook '{}': {}", workbook.name(), e));
                return RunOutcome {
                    success: false,
                    messages: log.into_lines(),
                    results: Vec::new(),
                };
            }
        };

        let mut results = Vec::with_capacity(loaded.len());
        for rows in loaded {
            let entity = rows.entity();
            match rows.reconcile(client, &mut log) {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!(entity = %entity, kind = e.kind(), "step failed: {}", e);
                    log.push(format!("Error while automating {}: {}", entity.label().to_lowercase(), e));
                    return RunOutcome {
                        success: false,
                        messages: log.into_lines(),
                        results,
                    };
                }
            }
        }

        info!(created = results.iter().map(|r| r.created.len()).sum::<usize>(), "migration finished");
        RunOutcome {
            success: true,
            messages: log.into_lines(),
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pipeline_order() {
        let pipeline = Pipeline::new();
        assert_eq!(pipeline.steps(), &Entity::DEFAULT_ORDER);
    }

    #[test]
    fn test_include_hierarchy_appends_last() {
        let pipeline = Pipeline::new().include_hierarchy(true);
        assert_eq!(pipeline.steps().len(), 8);
        assert_eq!(pipeline.steps().last(), Some(&Entity::Hierarchy));
        let pipeline = pipeline.include_hierarchy(false);
        assert!(!pipeline.steps().contains(&Entity::Hierarchy));
    }

    #[test]
    fn test_with_steps_reorders() {
        let pipeline = Pipeline::with_steps(&[Entity::AssetModel, Entity::UnitGroup, Entity::UnitGroup]);
        assert_eq!(pipeline.steps(), &[Entity::UnitGroup, Entity::AssetModel]);
    }

    #[test]
    fn test_log_text_joins_lines() {
        let outcome = RunOutcome {
            success: true,
            messages: vec!["a".to_string(), "b".to_string()],
            results: Vec::new(),
        };
        assert_eq!(outcome.log_text(), "a\nb");
    }
}

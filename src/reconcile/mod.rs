//! Entity reconcilers
//!
//! Every entity goes through [`reconcile`]: fetch what the platform already
//! has, diff by lower-cased name, then create each added record once.
//! Entities that also touch existing records (asset model versions,
//! hierarchy tags) opt in through [`Reconciler::needs_revisit`].

mod asset_models;
mod hierarchy;
mod industries;
mod parameter_categories;
mod parameter_groups;
mod parameters;
mod unit_groups;
mod units;

use std::collections::HashSet;

use tracing::{info, warn};

use crate::error::OnboardResult;
use crate::mapping::SheetRow;
use crate::remote::PlatformClient;
use crate::types::{natural_key, Entity};

pub use asset_models::AssetModels;
pub use hierarchy::Hierarchy;
pub use industries::Industries;
pub use parameter_categories::ParameterCategories;
pub use parameter_groups::ParameterGroups;
pub use parameters::Parameters;
pub use unit_groups::UnitGroups;
pub use units::Units;

/// Ordered status messages of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunLog {
    lines: Vec<String>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.lines.push(message);
    }

    /// Appends a message for a record that was skipped.
    pub fn skip(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.lines.push(message);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Case-insensitive set difference between local and remote names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diff {
    /// Local keys missing remotely, in sheet order.
    pub added: Vec<String>,
    /// Remote keys absent locally. Reported, never deleted.
    pub removed: Vec<String>,
}

impl Diff {
    pub fn compute<'a, L, R>(local: L, remote: R) -> Self
    where
        L: IntoIterator<Item = &'a str>,
        R: IntoIterator<Item = &'a str>,
    {
        let local = unique_keys(local);
        let remote = unique_keys(remote);
        let remote_set: HashSet<&String> = remote.iter().collect();
        let local_set: HashSet<&String> = local.iter().collect();

        Diff {
            added: local.iter().filter(|k| !remote_set.contains(k)).cloned().collect(),
            removed: remote.iter().filter(|k| !local_set.contains(k)).cloned().collect(),
        }
    }

    pub fn is_added(&self, name: &str) -> bool {
        let key = natural_key(name);
        self.added.iter().any(|k| *k == key)
    }
}

fn unique_keys<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(natural_key)
        .filter(|k| !k.is_empty() && seen.insert(k.clone()))
        .collect()
}

/// What happened to one record.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    Created,
    Updated,
    /// Nothing to do; the note goes to the run log.
    Unchanged(String),
    /// Left alone; the reason goes to the run log.
    Skipped(String),
}

/// Outcome of one entity step.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationResult {
    pub entity: Entity,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub skipped: Vec<String>,
}

impl ReconciliationResult {
    fn new(entity: Entity, diff: Diff) -> Self {
        Self {
            entity,
            added: diff.added,
            removed: diff.removed,
            created: Vec::new(),
            updated: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Per-entity half of the create-if-missing routine.
pub trait Reconciler {
    type Row: SheetRow;

    /// Names already on the platform, searched for `rows` or listed in one call.
    fn existing(&mut self, client: &PlatformClient, rows: &[Self::Row]) -> OnboardResult<Vec<String>>;

    /// Loads lookups needed by `create`/`revisit`. Called at most once, and
    /// only when there is work to do.
    fn prepare(&mut self, _client: &PlatformClient) -> OnboardResult<()> {
        Ok(())
    }

    fn create(&mut self, client: &PlatformClient, row: &Self::Row) -> OnboardResult<CreateOutcome>;

    /// Whether an already existing row still needs a call.
    fn needs_revisit(&self, _row: &Self::Row) -> bool {
        false
    }

    fn revisit(&mut self, _client: &PlatformClient, _row: &Self::Row) -> OnboardResult<CreateOutcome> {
        Ok(CreateOutcome::Skipped(String::new()))
    }
}

/// Runs one entity step: diff against the platform, create the added rows,
/// revisit existing rows that ask for it.
pub fn reconcile<R: Reconciler>(
    reconciler: &mut R,
    client: &PlatformClient,
    rows: Vec<R::Row>,
    log: &mut RunLog,
) -> OnboardResult<ReconciliationResult> {
    let entity = R::Row::ENTITY;
    let rows = first_per_key(rows);
    if rows.is_empty() {
        info!(entity = %entity, "no rows, step skipped");
        return Ok(ReconciliationResult::new(entity, Diff::default()));
    }
    info!(entity = %entity, rows = rows.len(), "reconciling");

    let existing = reconciler.existing(client, &rows)?;
    let diff = Diff::compute(
        rows.iter().map(|r| r.name()),
        existing.iter().map(String::as_str),
    );
    if !diff.removed.is_empty() {
        info!(
            entity = %entity,
            count = diff.removed.len(),
            "platform entries not in the workbook are left untouched"
        );
    }
    let mut result = ReconciliationResult::new(entity, diff);

    let (added, present): (Vec<&R::Row>, Vec<&R::Row>) = rows
        .iter()
        .partition(|row| result.added.contains(&natural_key(row.name())));
    let revisits: Vec<&R::Row> = present
        .iter()
        .copied()
        .filter(|row| reconciler.needs_revisit(row))
        .collect();

    if added.is_empty() && revisits.is_empty() {
        let names: Vec<&str> = rows.iter().map(|r| r.name()).collect();
        log.push(format!("{} information exists: {}", entity.label(), names.join(", ")));
        return Ok(result);
    }

    reconciler.prepare(client)?;
    for row in added {
        let outcome = reconciler.create(client, row)?;
        record_outcome(&mut result, log, row.name(), outcome);
    }
    for row in revisits {
        let outcome = reconciler.revisit(client, row)?;
        record_outcome(&mut result, log, row.name(), outcome);
    }

    let label = entity.label().to_lowercase();
    if !result.created.is_empty() {
        log.push(format!("Created {}: {}", label, result.created.join(", ")));
    }
    if !result.updated.is_empty() {
        log.push(format!("Updated {}: {}", label, result.updated.join(", ")));
    }
    Ok(result)
}

fn record_outcome(
    result: &mut ReconciliationResult,
    log: &mut RunLog,
    name: &str,
    outcome: CreateOutcome,
) {
    match outcome {
        CreateOutcome::Created => result.created.push(name.to_string()),
        CreateOutcome::Updated => result.updated.push(name.to_string()),
        CreateOutcome::Unchanged(note) => log.push(note),
        CreateOutcome::Skipped(reason) => {
            if !reason.is_empty() {
                log.skip(reason);
            }
            result.skipped.push(name.to_string());
        }
    }
}

/// Keeps the first row for each natural key.
fn first_per_key<T: SheetRow>(rows: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(natural_key(row.name())))
        .collect()
}

/// Value of the row whose name matches `key` exactly (case-insensitive),
/// used to pick the right hit out of a "contains" search.
fn exact_match<'a, T>(hits: &'a [T], key: &str, name: impl Fn(&T) -> &str) -> Option<&'a T> {
    let key = natural_key(key);
    hits.iter().find(|hit| natural_key(name(hit)) == key)
}

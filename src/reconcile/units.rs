use serde_json::Value;

use super::{exact_match, CreateOutcome, Reconciler};
use crate::error::OnboardResult;
use crate::mapping::UnitRow;
use crate::remote::payloads::{ProjectOnly, RemoteUnit, UnitPayload};
use crate::remote::{routes, ContentQuery, Lookup, PlatformClient};

/// Units, attached to their unit group by name.
#[derive(Debug, Default)]
pub struct Units {
    groups: Lookup,
}

impl Reconciler for Units {
    type Row = UnitRow;

    fn existing(&mut self, client: &PlatformClient, rows: &[UnitRow]) -> OnboardResult<Vec<String>> {
        let mut found = Vec::new();
        for row in rows {
            let query =
                ContentQuery::new(client.project(), client.page_size()).contains("unit", &row.name);
            let hits: Vec<RemoteUnit> = client.search_all(routes::LIST_UNITS, query)?;
            if let Some(hit) = exact_match(&hits, &row.name, RemoteUnit::display_name) {
                found.push(hit.display_name().to_string());
            }
        }
        Ok(found)
    }

    fn prepare(&mut self, client: &PlatformClient) -> OnboardResult<()> {
        let payload = ProjectOnly { project: client.project() };
        self.groups = client.lookup(routes::UNIT_GROUP_LOOKUP, &payload)?;
        Ok(())
    }

    fn create(&mut self, client: &PlatformClient, row: &UnitRow) -> OnboardResult<CreateOutcome> {
        let (group_name, group_id) = match row.unit_group_name.as_deref() {
            None => (String::new(), Value::String(String::new())),
            Some(name) => match self.groups.resolve(name) {
                Some(id) => (name.to_string(), id.clone()),
                None => {
                    return Ok(CreateOutcome::Skipped(format!(
                        "Unit '{}' in row number {} skipped: unit group '{}' not found",
                        row.name, row.row, name
                    )))
                }
            },
        };

        let payload = UnitPayload {
            unit_group_id: group_id,
            id: String::new(),
            unit: row.name.clone(),
            notation: row.notation.clone(),
            unit_group_name: group_name,
            name: row.name.clone(),
            action: "addnew".to_string(),
            project: client.project(),
        };
        client.post(routes::SAVE_UNITS, &payload)?;
        Ok(CreateOutcome::Created)
    }
}

use super::{exact_match, CreateOutcome, Reconciler};
use crate::error::OnboardResult;
use crate::mapping::UnitGroupRow;
use crate::remote::payloads::{RemoteUnitGroup, UnitGroupPayload};
use crate::remote::{routes, ContentQuery, PlatformClient};

/// Unit groups: searched one name at a time, created through the config service.
#[derive(Debug, Default)]
pub struct UnitGroups;

impl Reconciler for UnitGroups {
    type Row = UnitGroupRow;

    fn existing(&mut self, client: &PlatformClient, rows: &[UnitGroupRow]) -> OnboardResult<Vec<String>> {
        let mut found = Vec::new();
        for row in rows {
            let query = ContentQuery::new(client.project(), client.page_size())
                .contains("unit_group_name", &row.unit_group_name);
            let hits: Vec<RemoteUnitGroup> = client.search_all(routes::LIST_UNIT_GROUPS, query)?;
            if let Some(hit) = exact_match(&hits, &row.unit_group_name, |h| h.unit_group_name.as_str()) {
                found.push(hit.unit_group_name.clone());
            }
        }
        Ok(found)
    }

    fn create(&mut self, client: &PlatformClient, row: &UnitGroupRow) -> OnboardResult<CreateOutcome> {
        let payload = UnitGroupPayload {
            id: String::new(),
            unit_group_name: row.unit_group_name.clone(),
            description: row.description.clone(),
            value: String::new(),
            action: "edit".to_string(),
            project: client.project(),
        };
        client.post(routes::SAVE_UNIT_GROUP, &payload)?;
        Ok(CreateOutcome::Created)
    }
}

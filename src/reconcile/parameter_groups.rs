use serde_json::Value;

use super::{CreateOutcome, Reconciler};
use crate::error::OnboardResult;
use crate::mapping::ParameterGroupRow;
use crate::remote::payloads::{LookupRequest, ParameterGroupPayload, ProjectOnly};
use crate::remote::{routes, Lookup, PlatformClient};

/// Parameter groups: one list call for existence, category resolved by label.
#[derive(Debug, Default)]
pub struct ParameterGroups {
    categories: Lookup,
}

impl Reconciler for ParameterGroups {
    type Row = ParameterGroupRow;

    fn existing(&mut self, client: &PlatformClient, _rows: &[ParameterGroupRow]) -> OnboardResult<Vec<String>> {
        let payload = ProjectOnly { project: client.project() };
        let groups = client.lookup(routes::GROUP_LOOKUP, &payload)?;
        Ok(groups.names().map(str::to_string).collect())
    }

    fn prepare(&mut self, client: &PlatformClient) -> OnboardResult<()> {
        let payload = LookupRequest {
            lookup_name: "tag_categories".to_string(),
            project: client.project(),
        };
        self.categories = client.lookup(routes::CATEGORY_LOOKUP, &payload)?;
        Ok(())
    }

    fn create(&mut self, client: &PlatformClient, row: &ParameterGroupRow) -> OnboardResult<CreateOutcome> {
        let category = match row.category.as_deref() {
            None => Value::Null,
            Some(name) => match self.categories.resolve(name) {
                Some(id) => id.clone(),
                None => {
                    return Ok(CreateOutcome::Skipped(format!(
                        "Parameter group '{}' in row number {} skipped: parameter category '{}' not found",
                        row.tag_group_name, row.row, name
                    )))
                }
            },
        };

        let payload = ParameterGroupPayload {
            tag_group_id: String::new(),
            tag_group_name: row.tag_group_name.clone(),
            description: row.description.clone(),
            category,
            selected_tags: Vec::new(),
            deleted_tags: Vec::new(),
            project: client.project(),
        };
        client.post(routes::SAVE_GROUP, &payload)?;
        Ok(CreateOutcome::Created)
    }
}

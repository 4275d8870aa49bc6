use super::{CreateOutcome, Reconciler};
use crate::error::OnboardResult;
use crate::mapping::IndustryRow;
use crate::remote::payloads::{IndustryPayload, ProjectOnly, RemoteIndustry};
use crate::remote::{routes, PlatformClient};

#[derive(Debug, Default)]
pub struct Industries;

/// Every industry on the platform, from the dropdown listing.
pub(crate) fn list_industries(client: &PlatformClient) -> OnboardResult<Vec<RemoteIndustry>> {
    let payload = ProjectOnly { project: client.project() };
    client.post_list(routes::INDUSTRY_DROPDOWN, &payload)
}

impl Reconciler for Industries {
    type Row = IndustryRow;

    fn existing(&mut self, client: &PlatformClient, _rows: &[IndustryRow]) -> OnboardResult<Vec<String>> {
        Ok(list_industries(client)?
            .into_iter()
            .map(|industry| industry.industry_category_name)
            .collect())
    }

    fn create(&mut self, client: &PlatformClient, row: &IndustryRow) -> OnboardResult<CreateOutcome> {
        let payload = IndustryPayload {
            industry_category_name: row.industry.clone(),
            description: row.description.clone(),
            industry_category_id: String::new(),
            project: client.project(),
        };
        client.post(routes::CREATE_INDUSTRY, &payload)?;
        Ok(CreateOutcome::Created)
    }
}

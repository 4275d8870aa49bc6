use super::{exact_match, CreateOutcome, Reconciler};
use crate::error::OnboardResult;
use crate::mapping::ParameterCategoryRow;
use crate::remote::payloads::{ParameterCategoryPayload, RemoteCategory};
use crate::remote::{routes, ContentQuery, PlatformClient};

#[derive(Debug, Default)]
pub struct ParameterCategories;

impl Reconciler for ParameterCategories {
    type Row = ParameterCategoryRow;

    fn existing(
        &mut self,
        client: &PlatformClient,
        rows: &[ParameterCategoryRow],
    ) -> OnboardResult<Vec<String>> {
        let mut found = Vec::new();
        for row in rows {
            let query = ContentQuery::new(client.project(), client.page_size())
                .contains("tag_category_name", &row.tag_category_name);
            let hits: Vec<RemoteCategory> = client.search_all(routes::CATEGORY_CONTENT, query)?;
            if let Some(hit) = exact_match(&hits, &row.tag_category_name, |h| h.tag_category_name.as_str()) {
                found.push(hit.tag_category_name.clone());
            }
        }
        Ok(found)
    }

    fn create(
        &mut self,
        client: &PlatformClient,
        row: &ParameterCategoryRow,
    ) -> OnboardResult<CreateOutcome> {
        let payload = ParameterCategoryPayload {
            tag_category_name: row.tag_category_name.clone(),
            description: row.description.clone(),
            tag_category_icon: row.tag_category_icon.clone(),
            tag_category_id: String::new(),
            tags_list: Vec::new(),
            deleted_tags: Vec::new(),
            kind: String::new(),
            project: client.project(),
        };
        client.post(routes::SAVE_CATEGORY, &payload)?;
        Ok(CreateOutcome::Created)
    }
}

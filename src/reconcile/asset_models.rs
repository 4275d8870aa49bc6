//! Asset models
//!
//! A model is saved in two sections. `basic_info` returns the model id and
//! version; the parameters named by the row's groups or categories are then
//! attached with `add_only` and the `parameters` section saved. An existing
//! model whose row asks for a version increment goes through the same flow
//! with its current id and version.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::debug;

use super::industries::list_industries;
use super::{exact_match, CreateOutcome, Reconciler};
use crate::error::OnboardResult;
use crate::mapping::rows::ParameterSource;
use crate::mapping::AssetModelRow;
use crate::remote::payloads::{
    AssetBasicInfo, AssetModelPayload, AssetParameterLink, AssetParameters, AssetSection,
    AssetTagMember, AssetTagRequest, AssetTagSet, RemoteAssetModel, SavedAssetModel,
};
use crate::remote::{routes, AssetListQuery, Lookup, PlatformClient};
use crate::types::natural_key;

#[derive(Debug, Default)]
pub struct AssetModels {
    remote: HashMap<String, RemoteAssetModel>,
    industries: Lookup,
    tag_sets: HashMap<ParameterSource, Vec<AssetTagSet>>,
}

fn tag_kind(source: ParameterSource) -> &'static str {
    match source {
        ParameterSource::Group => "tag_groups",
        ParameterSource::Category => "tag_category",
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

impl AssetModels {
    fn tag_sets(
        &mut self,
        client: &PlatformClient,
        source: ParameterSource,
    ) -> OnboardResult<&[AssetTagSet]> {
        if !self.tag_sets.contains_key(&source) {
            let request = AssetTagRequest {
                kind: tag_kind(source).to_string(),
                tag_group_id: None,
                tag_category_id: None,
                project: client.project(),
            };
            let sets: Vec<AssetTagSet> = client.post_list(routes::ASSET_TAG_GROUP, &request)?;
            self.tag_sets.insert(source, sets);
        }
        Ok(self.tag_sets.get(&source).map(Vec::as_slice).unwrap_or_default())
    }

    /// Parameter ids for the row, or the reason the row has to be skipped.
    fn parameter_ids(
        &mut self,
        client: &PlatformClient,
        row: &AssetModelRow,
    ) -> OnboardResult<Result<Vec<Value>, String>> {
        if row.parameter_sets.is_empty() {
            return Ok(Ok(Vec::new()));
        }
        let Some(source) = row.select_type else {
            return Ok(Err(format!(
                "Asset model '{}' in row number {} skipped: Select Type is required when parameters are listed",
                row.asset_model_name, row.row
            )));
        };

        let sets = self.tag_sets(client, source)?;
        let mut ids = Vec::new();
        for name in &row.parameter_sets {
            let found = match source {
                ParameterSource::Group => {
                    exact_match(sets, name, |s| s.tag_group_name.as_str()).map(|s| s.tag_group_id.clone())
                }
                ParameterSource::Category => exact_match(sets, name, |s| s.tag_category_name.as_str())
                    .map(|s| s.tag_category_id.clone()),
            };
            match found {
                Some(id) => ids.push(id),
                None => {
                    let what = match source {
                        ParameterSource::Group => "parameter group",
                        ParameterSource::Category => "parameter category",
                    };
                    return Ok(Err(format!(
                        "Asset model '{}' in row number {} skipped: {} '{}' not found",
                        row.asset_model_name, row.row, what, name
                    )));
                }
            }
        }

        let request = AssetTagRequest {
            kind: tag_kind(source).to_string(),
            tag_group_id: (source == ParameterSource::Group).then(|| ids.clone()),
            tag_category_id: (source == ParameterSource::Category).then(|| ids.clone()),
            project: client.project(),
        };
        let members: Vec<AssetTagMember> = client.post_list(routes::ASSET_TAG_GROUP_META, &request)?;

        let mut seen = HashSet::new();
        let tag_ids = members
            .into_iter()
            .map(|member| member.tag_id)
            .filter(|id| !is_blank(id) && seen.insert(id.to_string()))
            .collect();
        Ok(Ok(tag_ids))
    }

    fn save(
        &mut self,
        client: &PlatformClient,
        row: &AssetModelRow,
        current: Option<RemoteAssetModel>,
    ) -> OnboardResult<CreateOutcome> {
        let Some(industry_id) = self.industries.resolve(&row.industry).cloned() else {
            return Ok(CreateOutcome::Skipped(format!(
                "Asset model '{}' in row number {} skipped: industry '{}' not found",
                row.asset_model_name, row.row, row.industry
            )));
        };
        let parameters = match self.parameter_ids(client, row)? {
            Ok(ids) => ids,
            Err(reason) => return Ok(CreateOutcome::Skipped(reason)),
        };

        let increment = current.is_some();
        let (current_id, current_version) = current
            .map(|m| (m.asset_model_id, m.asset_version))
            .unwrap_or_else(|| (Value::String(String::new()), Value::String(String::new())));

        let basic = AssetModelPayload {
            key_type: "basic_info".to_string(),
            data: AssetSection::BasicInfo(AssetBasicInfo {
                asset_model_name: row.asset_model_name.clone(),
                asset_description: row.description.clone(),
                description: row.description.clone(),
                industry: row.industry.clone(),
                industry_category_id: industry_id,
                thing_type_id: String::new(),
                update_section: Vec::new(),
                critical_parameters: Vec::new(),
                asset_model_image: String::new(),
                project_id: client.project().project_id,
                increment_version: increment,
            }),
            asset_model_id: current_id.clone(),
            asset_version: current_version.clone(),
            asset_model_name: row.asset_model_name.clone(),
            project: client.project(),
        };
        let body = client.post(routes::SAVE_ASSET_MODEL, &basic)?;
        let saved: SavedAssetModel = match body.get("data") {
            Some(data) if data.is_object() => serde_json::from_value(data.clone())?,
            _ => SavedAssetModel::default(),
        };
        let model_id = if is_blank(&saved.asset_model_id) { current_id } else { saved.asset_model_id };
        let version = if is_blank(&saved.asset_version) { current_version } else { saved.asset_version };
        debug!(model = %row.asset_model_name, id = %model_id, version = %version, "saved basic info");

        if !parameters.is_empty() {
            let link = AssetParameterLink {
                parameter_id: parameters.clone(),
                asset_model_id: model_id.clone(),
                asset_version: version.clone(),
                action: "add_only".to_string(),
                node_ids: Vec::new(),
                project: client.project(),
            };
            client.post(routes::ASSET_PARAMETERS, &link)?;

            let section = AssetModelPayload {
                key_type: "parameters".to_string(),
                data: AssetSection::Parameters(AssetParameters {
                    parameters,
                    asset_model_name: row.asset_model_name.clone(),
                    critical_parameters: Vec::new(),
                }),
                asset_model_id: model_id,
                asset_version: version,
                asset_model_name: row.asset_model_name.clone(),
                project: client.project(),
            };
            client.post(routes::SAVE_ASSET_MODEL, &section)?;
        }

        Ok(if increment {
            CreateOutcome::Updated
        } else {
            CreateOutcome::Created
        })
    }
}

impl Reconciler for AssetModels {
    type Row = AssetModelRow;

    fn existing(&mut self, client: &PlatformClient, rows: &[AssetModelRow]) -> OnboardResult<Vec<String>> {
        let mut found = Vec::new();
        for row in rows {
            let query = AssetListQuery::named(client.project(), &row.asset_model_name, client.page_size());
            let hits: Vec<RemoteAssetModel> = client.search_all(routes::LIST_ASSET_MODELS, query)?;
            if let Some(hit) = exact_match(&hits, &row.asset_model_name, |h| h.asset_model_name.as_str()) {
                found.push(hit.asset_model_name.clone());
                self.remote.insert(natural_key(&hit.asset_model_name), hit.clone());
            }
        }
        Ok(found)
    }

    fn prepare(&mut self, client: &PlatformClient) -> OnboardResult<()> {
        let mut industries = Lookup::default();
        for industry in list_industries(client)? {
            industries.insert(&industry.industry_category_name, industry.industry_category_id);
        }
        self.industries = industries;
        Ok(())
    }

    fn create(&mut self, client: &PlatformClient, row: &AssetModelRow) -> OnboardResult<CreateOutcome> {
        self.save(client, row, None)
    }

    fn needs_revisit(&self, row: &AssetModelRow) -> bool {
        row.increment_version
    }

    fn revisit(&mut self, client: &PlatformClient, row: &AssetModelRow) -> OnboardResult<CreateOutcome> {
        let current = self.remote.get(&natural_key(&row.asset_model_name)).cloned();
        if current.is_none() {
            return Ok(CreateOutcome::Skipped(format!(
                "Asset model '{}' in row number {} skipped: no existing version to increment",
                row.asset_model_name, row.row
            )));
        }
        self.save(client, row, current)
    }
}

use serde_json::{Map, Value};

use super::{exact_match, CreateOutcome, Reconciler};
use crate::error::OnboardResult;
use crate::mapping::rows::Bounds;
use crate::mapping::ParameterRow;
use crate::remote::payloads::{
    BasicQuality, DataQualityInfo, LookupRequest, ParameterPayload, ProjectOnly, Range,
    RemoteParameter,
};
use crate::remote::{routes, ContentQuery, Lookup, PlatformClient};

/// Parameters. Every reference column is resolved through its own dropdown.
#[derive(Debug, Default)]
pub struct Parameters {
    groups: Lookup,
    categories: Lookup,
    units: Lookup,
    data_types: Lookup,
    tag_types: Lookup,
}

/// Resolves an optional reference; `Err` carries the unresolved name.
fn resolve<'a>(lookup: &Lookup, name: Option<&'a str>) -> Result<(String, Value), &'a str> {
    match name {
        None => Ok((String::new(), Value::String(String::new()))),
        Some(name) => lookup
            .resolve(name)
            .map(|id| (name.to_string(), id.clone()))
            .ok_or(name),
    }
}

fn range(bounds: &Bounds) -> Range {
    Range {
        min: bounds.min.clone(),
        max: bounds.max.clone(),
    }
}

impl Parameters {
    fn skipped(row: &ParameterRow, what: &str, name: &str) -> CreateOutcome {
        CreateOutcome::Skipped(format!(
            "Parameter '{}' in row number {} skipped: {} '{}' not found",
            row.tag_name, row.row, what, name
        ))
    }
}

impl Reconciler for Parameters {
    type Row = ParameterRow;

    fn existing(&mut self, client: &PlatformClient, rows: &[ParameterRow]) -> OnboardResult<Vec<String>> {
        let mut found = Vec::new();
        for row in rows {
            let query = ContentQuery::new(client.project(), client.page_size())
                .contains("tag_name", &row.tag_name);
            let hits: Vec<RemoteParameter> = client.search_all(routes::PARAMETER_CONTENT, query)?;
            if let Some(hit) = exact_match(&hits, &row.tag_name, |h| h.tag_name.as_str()) {
                found.push(hit.tag_name.clone());
            }
        }
        Ok(found)
    }

    fn prepare(&mut self, client: &PlatformClient) -> OnboardResult<()> {
        let project = ProjectOnly { project: client.project() };
        self.groups = client.lookup(routes::GROUP_LOOKUP, &project)?;
        self.units = client.lookup(routes::UNIT_LOOKUP, &project)?;
        self.data_types = client.lookup(routes::DATA_TYPE_LOOKUP, &project)?;
        self.tag_types = client.lookup(routes::TAG_TYPE_LOOKUP, &project)?;
        let categories = LookupRequest {
            lookup_name: "tag_categories".to_string(),
            project: client.project(),
        };
        self.categories = client.lookup(routes::CATEGORY_LOOKUP, &categories)?;
        Ok(())
    }

    fn create(&mut self, client: &PlatformClient, row: &ParameterRow) -> OnboardResult<CreateOutcome> {
        let (group_name, group_id) = match resolve(&self.groups, row.tag_group_name.as_deref()) {
            Ok(found) => found,
            Err(name) => return Ok(Self::skipped(row, "parameter group", name)),
        };
        let (category_name, category_id) =
            match resolve(&self.categories, row.parameter_category.as_deref()) {
                Ok(found) => found,
                Err(name) => return Ok(Self::skipped(row, "parameter category", name)),
            };
        let (unit_name, unit_id) = match resolve(&self.units, row.unit_name.as_deref()) {
            Ok(found) => found,
            Err(name) => return Ok(Self::skipped(row, "unit", name)),
        };
        let (data_type_name, data_type) = match resolve(&self.data_types, row.data_type_name.as_deref()) {
            Ok(found) => found,
            Err(name) => return Ok(Self::skipped(row, "data type", name)),
        };
        let (tag_type_name, tag_type) = match resolve(&self.tag_types, row.tag_type_name.as_deref()) {
            Ok(found) => found,
            Err(name) => return Ok(Self::skipped(row, "UI input type", name)),
        };

        let payload = ParameterPayload {
            tag_name: row.tag_name.clone(),
            unit: unit_id,
            tag_type,
            description: row.description.clone(),
            tag_id: String::new(),
            tag_group_id: group_id,
            data_type,
            value_list: Vec::new(),
            system_tag_type: String::new(),
            tag_category_id: category_id,
            data_quality_info: DataQualityInfo {
                basic: BasicQuality {
                    value: row.default_value.clone(),
                    required: row.input_required,
                },
                numeric_limit: range(&row.numeric_limit),
                string_length: range(&row.string_length),
            },
            tag_label: row.tag_label.clone(),
            unit_name,
            tag_type_name,
            system_tag_label: row.system_tag_label.clone(),
            tag_group_name: group_name,
            data_type_name,
            parameter_category: category_name,
            id: String::new(),
            default: false,
            kind: "edit".to_string(),
            additional_fields: Map::new(),
            project: client.project(),
        };
        client.post(routes::SAVE_PARAMETERS, &payload)?;
        Ok(CreateOutcome::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::payloads::LookupOption;
    use serde_json::json;

    #[test]
    fn test_resolve_optional_reference() {
        let lookup = Lookup::from_options(vec![LookupOption {
            label: "Flow".to_string(),
            value: json!("g1"),
        }]);
        assert_eq!(resolve(&lookup, None).unwrap(), (String::new(), json!("")));
        assert_eq!(resolve(&lookup, Some("flow")).unwrap(), ("flow".to_string(), json!("g1")));
        assert_eq!(resolve(&lookup, Some("Level")).unwrap_err(), "Level");
    }
}

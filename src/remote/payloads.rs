//! Typed request payloads and response rows.
//!
//! Every request carries the project envelope (`project_id`, `project_type`,
//! `tz`, `language`) flattened in alongside its own fields.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::types::ProjectContext;

/// Payload carrying only the project envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectOnly {
    #[serde(flatten)]
    pub project: ProjectContext,
}

#[derive(Debug, Clone, Serialize)]
pub struct LookupRequest {
    pub lookup_name: String,
    #[serde(flatten)]
    pub project: ProjectContext,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitGroupPayload {
    pub id: String,
    pub unit_group_name: String,
    pub description: String,
    pub value: String,
    pub action: String,
    #[serde(flatten)]
    pub project: ProjectContext,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitPayload {
    pub unit_group_id: Value,
    pub id: String,
    pub unit: String,
    pub notation: String,
    pub unit_group_name: String,
    pub name: String,
    pub action: String,
    #[serde(flatten)]
    pub project: ProjectContext,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParameterCategoryPayload {
    pub tag_category_name: String,
    pub description: String,
    pub tag_category_icon: String,
    pub tag_category_id: String,
    #[serde(rename = "tagsList")]
    pub tags_list: Vec<Value>,
    #[serde(rename = "deletedTags")]
    pub deleted_tags: Vec<Value>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub project: ProjectContext,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParameterGroupPayload {
    pub tag_group_id: String,
    pub tag_group_name: String,
    pub description: String,
    pub category: Value,
    #[serde(rename = "selectedTags")]
    pub selected_tags: Vec<Value>,
    #[serde(rename = "deletedTags")]
    pub deleted_tags: Vec<Value>,
    #[serde(flatten)]
    pub project: ProjectContext,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Range {
    pub min: String,
    pub max: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BasicQuality {
    pub value: String,
    pub required: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DataQualityInfo {
    pub basic: BasicQuality,
    pub numeric_limit: Range,
    pub string_length: Range,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParameterPayload {
    pub tag_name: String,
    pub unit: Value,
    pub tag_type: Value,
    pub description: String,
    pub tag_id: String,
    pub tag_group_id: Value,
    pub data_type: Value,
    pub value_list: Vec<Value>,
    pub system_tag_type: String,
    pub tag_category_id: Value,
    pub data_quality_info: DataQualityInfo,
    pub tag_label: String,
    pub unit_name: String,
    pub tag_type_name: String,
    pub system_tag_label: String,
    pub tag_group_name: String,
    pub data_type_name: String,
    pub parameter_category: String,
    pub id: String,
    pub default: bool,
    #[serde(rename = "type")]
    pub kind: String,
    pub additional_fields: Map<String, Value>,
    #[serde(flatten)]
    pub project: ProjectContext,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndustryPayload {
    pub industry_category_name: String,
    pub description: String,
    pub industry_category_id: String,
    #[serde(flatten)]
    pub project: ProjectContext,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetBasicInfo {
    pub asset_model_name: String,
    pub asset_description: String,
    pub description: String,
    pub industry: String,
    pub industry_category_id: Value,
    pub thing_type_id: String,
    pub update_section: Vec<Value>,
    pub critical_parameters: Vec<Value>,
    pub asset_model_image: String,
    pub project_id: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub increment_version: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetParameters {
    pub parameters: Vec<Value>,
    pub asset_model_name: String,
    pub critical_parameters: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AssetSection {
    BasicInfo(AssetBasicInfo),
    Parameters(AssetParameters),
}

/// Asset model save, sent once per section (`basic_info`, then `parameters`).
#[derive(Debug, Clone, Serialize)]
pub struct AssetModelPayload {
    pub key_type: String,
    pub data: AssetSection,
    pub asset_model_id: Value,
    pub asset_version: Value,
    pub asset_model_name: String,
    #[serde(flatten)]
    pub project: ProjectContext,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetTagRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_group_id: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_category_id: Option<Vec<Value>>,
    #[serde(flatten)]
    pub project: ProjectContext,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetParameterLink {
    pub parameter_id: Vec<Value>,
    pub asset_model_id: Value,
    pub asset_version: Value,
    pub action: String,
    pub node_ids: Vec<Value>,
    #[serde(flatten)]
    pub project: ProjectContext,
}

#[derive(Debug, Clone, Serialize)]
pub struct HierarchyPayload {
    pub inside_site_conf: bool,
    #[serde(rename = "type")]
    pub kind: String,
    pub condition: Map<String, Value>,
    pub data: Vec<Map<String, Value>>,
    pub node_id: String,
    pub parent_id: String,
    pub node_name: String,
    pub customer_project_id: String,
    #[serde(flatten)]
    pub project: ProjectContext,
}

// ─── response rows ───────────────────────────────────────────────────────────

/// Accepts strings, numbers or null where the platform is loose about ids.
fn loose_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// `{label, value}` dropdown entry.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LookupOption {
    #[serde(default, deserialize_with = "loose_string")]
    pub label: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteUnitGroup {
    #[serde(default, deserialize_with = "loose_string")]
    pub unit_group_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteUnit {
    #[serde(default, deserialize_with = "loose_string")]
    pub unit: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub name: String,
}

impl RemoteUnit {
    pub fn display_name(&self) -> &str {
        if self.unit.is_empty() {
            &self.name
        } else {
            &self.unit
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCategory {
    #[serde(default, deserialize_with = "loose_string")]
    pub tag_category_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteParameter {
    #[serde(default, deserialize_with = "loose_string")]
    pub tag_name: String,
    #[serde(default)]
    pub tag_id: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteIndustry {
    #[serde(default, deserialize_with = "loose_string")]
    pub industry_category_name: String,
    #[serde(default)]
    pub industry_category_id: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteAssetModel {
    #[serde(default, deserialize_with = "loose_string")]
    pub asset_model_name: String,
    #[serde(default)]
    pub asset_model_id: Value,
    #[serde(default)]
    pub asset_version: Value,
}

/// Identity returned by the asset model `basic_info` save.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SavedAssetModel {
    #[serde(default)]
    pub asset_model_id: Value,
    #[serde(default)]
    pub asset_version: Value,
}

/// Row of the asset tag group/category listing.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetTagSet {
    #[serde(default, deserialize_with = "loose_string")]
    pub tag_group_name: String,
    #[serde(default)]
    pub tag_group_id: Value,
    #[serde(default, deserialize_with = "loose_string")]
    pub tag_category_name: String,
    #[serde(default)]
    pub tag_category_id: Value,
}

/// Parameter membership row from the asset tag metadata listing.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetTagMember {
    #[serde(default)]
    pub tag_id: Value,
    #[serde(default, deserialize_with = "loose_string")]
    pub tag_group_name: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub tag_category_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TagRef {
    pub value: Value,
    #[serde(default, deserialize_with = "loose_string")]
    pub label: String,
}

/// Node of the accessible hierarchy.
#[derive(Debug, Clone, Deserialize)]
pub struct HierarchyNode {
    #[serde(default, deserialize_with = "loose_string")]
    pub full_name: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub node_id: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub name: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub parent_id: String,
    #[serde(rename = "type", default, deserialize_with = "loose_string")]
    pub kind: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub desc: String,
    #[serde(default)]
    pub info: Map<String, Value>,
    #[serde(default)]
    pub settings: Map<String, Value>,
    #[serde(default)]
    pub tags: Vec<TagRef>,
}

impl HierarchyNode {
    /// Tags already on the node, from `tags` or `info.tags`.
    pub fn existing_tags(&self) -> Vec<TagRef> {
        if !self.tags.is_empty() {
            return self.tags.clone();
        }
        self.info
            .get("tags")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn project() -> ProjectContext {
        ProjectContext {
            project_id: "p1".to_string(),
            project_type: "n_level_hierarchy".to_string(),
            tz: "UTC".to_string(),
            language: "en".to_string(),
        }
    }

    #[test]
    fn test_unit_group_payload_flattens_project() {
        let payload = UnitGroupPayload {
            id: String::new(),
            unit_group_name: "Flow".to_string(),
            description: "Flow units".to_string(),
            value: String::new(),
            action: "edit".to_string(),
            project: project(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["unit_group_name"], "Flow");
        assert_eq!(value["action"], "edit");
        assert_eq!(value["project_id"], "p1");
        assert_eq!(value["language"], "en");
    }

    #[test]
    fn test_basic_info_omits_increment_when_false() {
        let mut info = AssetBasicInfo {
            asset_model_name: "Pump".to_string(),
            asset_description: "Pump".to_string(),
            description: String::new(),
            industry: "Water".to_string(),
            industry_category_id: json!("ind_1"),
            thing_type_id: String::new(),
            update_section: vec![],
            critical_parameters: vec![],
            asset_model_image: String::new(),
            project_id: "p1".to_string(),
            increment_version: false,
        };
        let value = serde_json::to_value(&info).unwrap();
        assert!(value.get("increment_version").is_none());
        info.increment_version = true;
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["increment_version"], true);
    }

    #[test]
    fn test_loose_ids() {
        let option: LookupOption = serde_json::from_value(json!({"label": 12, "value": 7})).unwrap();
        assert_eq!(option.label, "12");
        let industry: RemoteIndustry =
            serde_json::from_value(json!({"industry_category_name": null})).unwrap();
        assert_eq!(industry.industry_category_name, "");
    }

    #[test]
    fn test_hierarchy_node_tags_from_info() {
        let node: HierarchyNode = serde_json::from_value(json!({
            "full_name": "Plant>Line",
            "node_id": "n1",
            "name": "Line",
            "info": {"tags": [{"value": "t1", "label": "Temp"}]}
        }))
        .unwrap();
        assert_eq!(node.existing_tags().len(), 1);
        assert_eq!(node.existing_tags()[0].label, "Temp");
    }
}

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use super::{exact_match, CreateOutcome, Reconciler};
use crate::error::OnboardResult;
use crate::mapping::rows::normalize_path;
use crate::mapping::HierarchyRow;
use crate::remote::payloads::{HierarchyNode, HierarchyPayload, ProjectOnly, RemoteParameter, TagRef};
use crate::remote::{routes, ContentQuery, PlatformClient};
use crate::types::natural_key;

/// Hierarchy nodes are never created here; existing nodes get the listed
/// parameters appended.
#[derive(Debug, Default)]
pub struct Hierarchy {
    nodes: HashMap<String, HierarchyNode>,
}

impl Hierarchy {
    fn find_parameter(client: &PlatformClient, name: &str) -> OnboardResult<Option<TagRef>> {
        let query = ContentQuery::new(client.project(), client.page_size()).contains("tag_name", name);
        let hits: Vec<RemoteParameter> = client.search_all(routes::PARAMETER_CONTENT, query)?;
        Ok(exact_match(&hits, name, |h| h.tag_name.as_str()).map(|hit| TagRef {
            value: hit.tag_id.clone(),
            label: hit.tag_name.clone(),
        }))
    }
}

/// Save body for `node` carrying `tags`, with the node's info and settings merged in.
fn save_payload(client: &PlatformClient, node: &HierarchyNode, tags: Vec<TagRef>) -> OnboardResult<HierarchyPayload> {
    let project = client.project();
    let mut item = Map::new();
    item.insert("node_id".to_string(), Value::String(node.node_id.clone()));
    item.insert("name".to_string(), Value::String(node.name.clone()));
    item.insert("parent_id".to_string(), Value::String(node.parent_id.clone()));
    item.insert("project_id".to_string(), Value::String(project.project_id.clone()));
    item.insert("type".to_string(), Value::String(node.kind.clone()));
    item.insert("description".to_string(), Value::String(node.desc.clone()));
    item.extend(node.info.clone());
    item.extend(node.settings.clone());
    item.insert("tags".to_string(), serde_json::to_value(tags)?);

    Ok(HierarchyPayload {
        inside_site_conf: false,
        kind: node.kind.clone(),
        condition: Map::new(),
        data: vec![item],
        node_id: node.node_id.clone(),
        parent_id: node.parent_id.clone(),
        node_name: node.name.clone(),
        customer_project_id: project.project_id.clone(),
        project,
    })
}

fn node_not_found(row: &HierarchyRow) -> CreateOutcome {
    CreateOutcome::Skipped(format!(
        "Hierarchy node '{}' in row number {} skipped: node not found",
        row.path, row.row
    ))
}

impl Reconciler for Hierarchy {
    type Row = HierarchyRow;

    fn existing(&mut self, client: &PlatformClient, _rows: &[HierarchyRow]) -> OnboardResult<Vec<String>> {
        let payload = ProjectOnly { project: client.project() };
        let nodes: Vec<HierarchyNode> = client.post_list(routes::FETCH_HIERARCHY, &payload)?;
        let mut paths = Vec::with_capacity(nodes.len());
        for node in nodes {
            let path = normalize_path(&node.full_name);
            paths.push(path.clone());
            self.nodes.entry(natural_key(&path)).or_insert(node);
        }
        Ok(paths)
    }

    fn create(&mut self, _client: &PlatformClient, row: &HierarchyRow) -> OnboardResult<CreateOutcome> {
        Ok(node_not_found(row))
    }

    fn needs_revisit(&self, row: &HierarchyRow) -> bool {
        !row.tags.is_empty()
    }

    fn revisit(&mut self, client: &PlatformClient, row: &HierarchyRow) -> OnboardResult<CreateOutcome> {
        let Some(node) = self.nodes.get(&natural_key(&row.path)) else {
            return Ok(node_not_found(row));
        };

        let mut resolved = Vec::new();
        let mut missing = Vec::new();
        for name in &row.tags {
            match Self::find_parameter(client, name)? {
                Some(tag) => resolved.push(tag),
                None => missing.push(name.as_str()),
            }
        }
        if !missing.is_empty() {
            return Ok(CreateOutcome::Skipped(format!(
                "Hierarchy node '{}' in row number {} skipped: parameters not found: {}",
                row.path,
                row.row,
                missing.join(", ")
            )));
        }

        let mut tags = node.existing_tags();
        let mut present: HashSet<String> = tags.iter().map(|t| t.value.to_string()).collect();
        let before = tags.len();
        for tag in resolved {
            if present.insert(tag.value.to_string()) {
                tags.push(tag);
            }
        }
        if tags.len() == before {
            return Ok(CreateOutcome::Unchanged(format!(
                "Hierarchy node '{}' already has parameters: {}",
                row.path,
                row.tags.join(", ")
            )));
        }

        let payload = save_payload(client, node, tags)?;
        client.post(routes::SAVE_HIERARCHY, &payload)?;
        Ok(CreateOutcome::Updated)
    }
}

//! Paged search and listing request bodies.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::types::ProjectContext;

/// A request that can be advanced page by page.
pub trait Paged: Serialize {
    /// JSON pointer to the row array in the response.
    const ROWS: &'static str;

    fn set_page(&mut self, page: u32);

    fn page_size(&self) -> u32;
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentFilters {
    #[serde(rename = "sortModel")]
    pub sort_model: Vec<Value>,
    #[serde(rename = "filterModel")]
    pub filter_model: Map<String, Value>,
}

/// Table-content search used by unit, unit group, category and parameter listings.
#[derive(Debug, Clone, Serialize)]
pub struct ContentQuery {
    #[serde(rename = "startRow")]
    pub start_row: u32,
    #[serde(rename = "endRow")]
    pub end_row: u32,
    pub page: u32,
    pub records: u32,
    pub filters: ContentFilters,
    pub global_filters: Map<String, Value>,
    #[serde(rename = "metaData")]
    pub meta_data: Map<String, Value>,
    pub tag_fetch_type: String,
    #[serde(flatten)]
    pub project: ProjectContext,
}

impl ContentQuery {
    pub fn new(project: ProjectContext, page_size: u32) -> Self {
        Self {
            start_row: 0,
            end_row: page_size,
            page: 1,
            records: page_size,
            filters: ContentFilters {
                sort_model: Vec::new(),
                filter_model: Map::new(),
            },
            global_filters: Map::new(),
            meta_data: Map::new(),
            tag_fetch_type: String::new(),
            project,
        }
    }

    /// Adds a "text contains" filter on `field`.
    pub fn contains(mut self, field: &str, value: &str) -> Self {
        self.filters.filter_model.insert(
            field.to_string(),
            json!({"filterType": "text", "type": "contains", "filter": value}),
        );
        self
    }
}

impl Paged for ContentQuery {
    const ROWS: &'static str = "/data/bodyContent";

    fn set_page(&mut self, page: u32) {
        self.page = page;
        self.start_row = (page - 1) * self.records;
        self.end_row = page * self.records;
    }

    fn page_size(&self) -> u32 {
        self.records
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetListFilters {
    #[serde(rename = "filterModel")]
    pub filter_model: Map<String, Value>,
}

/// Asset model listing, searched by name through the sidebar filter.
#[derive(Debug, Clone, Serialize)]
pub struct AssetListQuery {
    pub filters: AssetListFilters,
    pub records: u32,
    pub counter: u32,
    #[serde(flatten)]
    pub project: ProjectContext,
}

impl AssetListQuery {
    pub fn named(project: ProjectContext, name: &str, page_size: u32) -> Self {
        let mut filter_model = Map::new();
        filter_model.insert("showFiltersSidebar".to_string(), Value::String(name.to_string()));
        filter_model.insert("search".to_string(), Value::Bool(true));
        Self {
            filters: AssetListFilters { filter_model },
            records: page_size,
            counter: 1,
            project,
        }
    }
}

impl Paged for AssetListQuery {
    const ROWS: &'static str = "/data/tableData/bodyContent";

    fn set_page(&mut self, page: u32) {
        self.counter = page;
    }

    fn page_size(&self) -> u32 {
        self.records
    }
}

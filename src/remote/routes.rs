//! Platform API routes, relative to the configured base URL.

// unit groups
pub const LIST_UNIT_GROUPS: &str = "/hry/units/list_unit_groups";
pub const SAVE_UNIT_GROUP: &str = "/ilens_api/ilens_config/save_unit_group";

// units
pub const LIST_UNITS: &str = "/hry/units/list_units";
pub const UNIT_GROUP_LOOKUP: &str = "/hry/units/get_unit_groups";
pub const SAVE_UNITS: &str = "/hry/units/save_units";
pub const UNIT_LOOKUP: &str = "/ilens_api/ilens_config/get_units";

// parameter categories
pub const CATEGORY_CONTENT: &str = "/hry/parameters/get_parameter_category_content";
pub const SAVE_CATEGORY: &str = "/hry/parameters/save_parameter_category";
pub const CATEGORY_LOOKUP: &str = "/ilens_api/ilens_config/list_tag_category";

// parameter groups
pub const GROUP_LOOKUP: &str = "/ilens_api/ilens_config/get_tag_group";
pub const SAVE_GROUP: &str = "/hry/parameters/save_params_for_parameter_group";

// parameters
pub const PARAMETER_CONTENT: &str = "/hry/parameters/get_parameter_content";
pub const SAVE_PARAMETERS: &str = "/hry/parameters/save_parameters";
pub const DATA_TYPE_LOOKUP: &str = "/ilens_api/ilens_config/get_data_types";
pub const TAG_TYPE_LOOKUP: &str = "/ilens_api/ilens_config/get_tag_types";

// industries
pub const INDUSTRY_DROPDOWN: &str = "/ilens_api/industry/list_dropdown";
pub const CREATE_INDUSTRY: &str = "/ilens_api/industry/create";

// asset models
pub const LIST_ASSET_MODELS: &str = "/scada_dt/asset/list";
pub const SAVE_ASSET_MODEL: &str = "/scada_dt/asset/save";
pub const ASSET_PARAMETERS: &str = "/scada_dt/asset/add_delete_param";
pub const ASSET_TAG_GROUP: &str = "/ilens_api/ilens_config/asset_tag_group";
pub const ASSET_TAG_GROUP_META: &str = "/ilens_api/ilens_config/asset_tag_group_meta";

// hierarchy
pub const FETCH_HIERARCHY: &str = "/hry/hry/fetch_accessible_data";
pub const SAVE_HIERARCHY: &str = "/hry/hierarchy/save";

/// Joins a base URL and a route without doubling or dropping slashes.
pub fn join(base_url: &str, route: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        route.trim_start_matches('/')
    )
}

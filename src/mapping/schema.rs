//! Per-sheet label dictionaries and required fields.

use crate::types::Entity;

/// A required column: canonical field plus the label used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredField {
    pub field: &'static str,
    pub label: &'static str,
}

/// How one worksheet maps onto canonical record fields.
#[derive(Debug, Clone, Copy)]
pub struct SheetSchema {
    pub entity: Entity,
    /// Index of the header row; data starts on the next row.
    pub header_row: usize,
    /// Banner text written above the header when `header_row` is 1.
    pub banner: Option<&'static str>,
    /// Display header label → canonical field. Lookup ignores case.
    pub columns: &'static [(&'static str, &'static str)],
    pub required: &'static [RequiredField],
    /// Fields whose cells hold comma or newline separated lists.
    pub list_fields: &'static [&'static str],
}

impl SheetSchema {
    pub fn sheet_name(&self) -> &'static str {
        self.entity.sheet_name()
    }

    /// Canonical field for a header label, ignoring case and padding.
    pub fn field_for(&self, header: &str) -> Option<&'static str> {
        let wanted = header.trim().to_lowercase();
        self.columns
            .iter()
            .find(|(label, _)| label.to_lowercase() == wanted)
            .map(|(_, field)| *field)
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.required.iter().any(|r| r.field == field)
    }

    pub fn is_list(&self, field: &str) -> bool {
        self.list_fields.contains(&field)
    }
}

pub const UNIT_GROUP: SheetSchema = SheetSchema {
    entity: Entity::UnitGroup,
    header_row: 0,
    banner: None,
    columns: &[
        ("Unit Group Name", "unit_group_name"),
        ("Description", "description"),
    ],
    required: &[RequiredField {
        field: "unit_group_name",
        label: "Unit Group Name",
    }],
    list_fields: &[],
};

pub const UNIT: SheetSchema = SheetSchema {
    entity: Entity::Unit,
    header_row: 0,
    banner: None,
    columns: &[
        ("Name", "name"),
        ("Notation", "notation"),
        ("Unit Group", "unit_group_name"),
    ],
    required: &[RequiredField {
        field: "name",
        label: "Unit Name",
    }],
    list_fields: &[],
};

pub const PARAMETER_CATEGORY: SheetSchema = SheetSchema {
    entity: Entity::ParameterCategory,
    header_row: 0,
    banner: None,
    columns: &[
        ("Parameter Category Name", "tag_category_name"),
        ("Description", "description"),
        ("Icon", "tag_category_icon"),
    ],
    required: &[RequiredField {
        field: "tag_category_name",
        label: "Parameter Category Name",
    }],
    list_fields: &[],
};

pub const PARAMETER_GROUP: SheetSchema = SheetSchema {
    entity: Entity::ParameterGroup,
    header_row: 0,
    banner: None,
    columns: &[
        ("Parameter Group Name", "tag_group_name"),
        ("Description", "description"),
        ("Parameter Category", "category"),
    ],
    required: &[RequiredField {
        field: "tag_group_name",
        label: "Parameter Group Name",
    }],
    list_fields: &[],
};

pub const PARAMETER: SheetSchema = SheetSchema {
    entity: Entity::Parameter,
    header_row: 1,
    banner: Some("Parameter Definitions"),
    columns: &[
        ("Parameter Name", "tag_name"),
        ("Description", "description"),
        ("Data Source", "system_tag_label"),
        ("Data Type", "data_type_name"),
        ("UI Input Type", "tag_type_name"),
        ("Parameter Label", "tag_label"),
        ("Unit", "unit_name"),
        ("Parameter Group", "tag_group_name"),
        ("Parameter Category", "parameter_category"),
        ("Numeric Limit", "numeric_limit"),
        ("String Length", "string_length"),
        ("Default Value", "basic"),
        ("Input Required", "required"),
    ],
    required: &[RequiredField {
        field: "tag_name",
        label: "Parameter Name",
    }],
    list_fields: &[],
};

pub const INDUSTRY: SheetSchema = SheetSchema {
    entity: Entity::Industry,
    header_row: 0,
    banner: None,
    columns: &[
        ("Industry Name", "industry"),
        ("Description", "description"),
    ],
    required: &[
        RequiredField {
            field: "industry",
            label: "Industry Name",
        },
        RequiredField {
            field: "description",
            label: "Industry Description",
        },
    ],
    list_fields: &[],
};

pub const ASSET_MODEL: SheetSchema = SheetSchema {
    entity: Entity::AssetModel,
    header_row: 1,
    banner: Some("Asset Model Definitions"),
    columns: &[
        ("Asset Model Name", "asset_model_name"),
        ("Description", "description"),
        ("Industry", "industry"),
        ("Select Type", "select_type"),
        (
            "Parameter Group/Parameter Category",
            "parameter_groups/parameter_category",
        ),
        ("Increment Version", "increment_version"),
    ],
    required: &[
        RequiredField {
            field: "asset_model_name",
            label: "Asset Model Name",
        },
        RequiredField {
            field: "description",
            label: "Asset Model Description",
        },
        RequiredField {
            field: "industry",
            label: "Industry",
        },
    ],
    list_fields: &["parameter_groups/parameter_category"],
};

pub const HIERARCHY: SheetSchema = SheetSchema {
    entity: Entity::Hierarchy,
    header_row: 0,
    banner: None,
    columns: &[("Hierarchy", "name"), ("Parameter Name", "tags")],
    required: &[
        RequiredField {
            field: "name",
            label: "Hierarchy",
        },
        RequiredField {
            field: "tags",
            label: "Parameter Name",
        },
    ],
    list_fields: &["tags"],
};

pub fn schema_for(entity: Entity) -> &'static SheetSchema {
    match entity {
        Entity::UnitGroup => &UNIT_GROUP,
        Entity::Unit => &UNIT,
        Entity::ParameterCategory => &PARAMETER_CATEGORY,
        Entity::ParameterGroup => &PARAMETER_GROUP,
        Entity::Parameter => &PARAMETER,
        Entity::Industry => &INDUSTRY,
        Entity::AssetModel => &ASSET_MODEL,
        Entity::Hierarchy => &HIERARCHY,
    }
}

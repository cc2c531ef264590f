//! Registry of the admin resources an [`EntityForm`](super::entity_form::EntityForm)
//! can create or edit.

use crate::core::schema::{DefaultValue, FieldRule, Schema};
use crate::utils::error::{AdminError, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

const SUPPLIER_TYPES: &[&str] = &["legal_entity", "natural_person"];
const UNIT_MEASURE_TYPES: &[&str] = &["product_materials", "service"];
const PHONE_MESSAGE: &str = "Phone Number format: +998XXXXXXXXX";

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+\d{12}$").expect("static regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Supplier,
    SupplierCategory,
    Category,
    BoxType,
    Brand,
    Measurement,
    MeasurementRatio,
    Organization,
    Currency,
    StorageType,
}

impl EntityKind {
    pub const ALL: [EntityKind; 10] = [
        EntityKind::Supplier,
        EntityKind::SupplierCategory,
        EntityKind::Category,
        EntityKind::BoxType,
        EntityKind::Brand,
        EntityKind::Measurement,
        EntityKind::MeasurementRatio,
        EntityKind::Organization,
        EntityKind::Currency,
        EntityKind::StorageType,
    ];

    /// Name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Supplier => "supplier",
            EntityKind::SupplierCategory => "supplier-category",
            EntityKind::Category => "category",
            EntityKind::BoxType => "box-type",
            EntityKind::Brand => "brand",
            EntityKind::Measurement => "measurement",
            EntityKind::MeasurementRatio => "measurement-ratio",
            EntityKind::Organization => "organization",
            EntityKind::Currency => "currency",
            EntityKind::StorageType => "storage-type",
        }
    }

    /// REST path segment.
    pub fn resource(self) -> &'static str {
        match self {
            EntityKind::Supplier => "suppliers",
            EntityKind::SupplierCategory => "supplier-categories",
            EntityKind::Category => "categories",
            EntityKind::BoxType => "box-types",
            EntityKind::Brand => "brands",
            EntityKind::Measurement => "unit-measures",
            EntityKind::MeasurementRatio => "unit-measures-ratios",
            EntityKind::Organization => "organizations",
            EntityKind::Currency => "currencies",
            EntityKind::StorageType => "warehouse-types",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Supplier => "Supplier",
            EntityKind::SupplierCategory => "Supplier category",
            EntityKind::Category => "Category",
            EntityKind::BoxType => "Box type",
            EntityKind::Brand => "Brand",
            EntityKind::Measurement => "Unit of measure",
            EntityKind::MeasurementRatio => "Unit ratio",
            EntityKind::Organization => "Organization",
            EntityKind::Currency => "Currency",
            EntityKind::StorageType => "Storage type",
        }
    }

    /// Accepts the CLI name or the REST path segment.
    pub fn parse(name: &str) -> Result<Self> {
        let name = name.trim().trim_matches('/');
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name || kind.resource() == name)
            .ok_or_else(|| AdminError::UnknownResourceError {
                name: name.to_string(),
            })
    }

    pub fn create_schema(self) -> Schema {
        Schema::new(match self {
            EntityKind::Supplier => supplier_fields(),
            EntityKind::SupplierCategory => vec![
                FieldRule::string("name").required(),
                FieldRule::number("parent"),
                FieldRule::number_array("organizations").required(),
            ],
            EntityKind::Category => vec![
                FieldRule::string("name").required(),
                FieldRule::number("parent"),
                FieldRule::number_array("organizations").required(),
                FieldRule::boolean("brand_required").default_value(DefaultValue::Bool(false)),
            ],
            EntityKind::BoxType => vec![
                FieldRule::string("name").required(),
                FieldRule::number("code").required(),
                FieldRule::string("short_name"),
                FieldRule::boolean("status").default_value(DefaultValue::Bool(true)),
            ],
            EntityKind::Brand => vec![FieldRule::string("name").required()],
            EntityKind::Measurement => measurement_fields(),
            EntityKind::MeasurementRatio => ratio_fields(),
            EntityKind::Organization => vec![
                FieldRule::string("name").required(),
                FieldRule::string("address").required(),
                FieldRule::string("additional_info"),
                FieldRule::string("phone_number").matches(phone_pattern(), PHONE_MESSAGE),
                FieldRule::number("currency").required(),
            ],
            EntityKind::Currency => currency_fields(),
            EntityKind::StorageType => vec![
                FieldRule::string("name").required(),
                FieldRule::number("order_number").required(),
                FieldRule::boolean("status").default_value(DefaultValue::Bool(true)),
            ],
        })
    }

    pub fn update_schema(self) -> Schema {
        Schema::new(match self {
            EntityKind::SupplierCategory => vec![
                FieldRule::string("name").required(),
                FieldRule::number("parent").nullable(),
                FieldRule::number_array("organizations").required(),
            ],
            EntityKind::Category => vec![
                FieldRule::string("name").required(),
                FieldRule::number("parent").nullable(),
                FieldRule::number_array("organizations").required(),
                FieldRule::boolean("brand_required").default_value(DefaultValue::Bool(false)),
            ],
            EntityKind::BoxType => vec![
                FieldRule::string("name").required(),
                FieldRule::number("code").nullable(),
                FieldRule::string("short_name"),
                FieldRule::boolean("status").default_value(DefaultValue::Bool(true)),
            ],
            EntityKind::Organization => vec![
                FieldRule::string("name").required(),
                FieldRule::string("address").required(),
                FieldRule::string("additional_info"),
                FieldRule::string("phone_number").required(),
                FieldRule::number("currency").required(),
            ],
            EntityKind::StorageType => vec![
                FieldRule::string("name").required(),
                FieldRule::number("order_number").required(),
                FieldRule::boolean("status"),
            ],
            EntityKind::Supplier
            | EntityKind::Brand
            | EntityKind::Measurement
            | EntityKind::MeasurementRatio
            | EntityKind::Currency => return self.create_schema(),
        })
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn supplier_fields() -> Vec<FieldRule> {
    vec![
        FieldRule::string("supplier_type")
            .one_of(SUPPLIER_TYPES)
            .default_value(DefaultValue::Str("legal_entity")),
        FieldRule::string("company_name").required(),
        FieldRule::number("stir").required(),
        FieldRule::string("address").required(),
        FieldRule::string("phone_number").required(),
        FieldRule::number("category").required(),
        FieldRule::string("note").required(),
        FieldRule::number("legal_entity").default_value(DefaultValue::Int(1)),
    ]
}

fn measurement_fields() -> Vec<FieldRule> {
    vec![
        FieldRule::string("name").required(),
        FieldRule::number("code").required(),
        FieldRule::string("short_name"),
        FieldRule::string("unit_measure_type")
            .one_of(UNIT_MEASURE_TYPES)
            .default_value(DefaultValue::Str("product_materials")),
        FieldRule::boolean("status").default_value(DefaultValue::Bool(true)),
    ]
}

fn ratio_fields() -> Vec<FieldRule> {
    vec![
        FieldRule::number("ratio").required().min(0.1),
        FieldRule::number("first_unit_measure").required(),
        FieldRule::number("second_unit_measure").required(),
    ]
}

fn currency_fields() -> Vec<FieldRule> {
    vec![
        FieldRule::string("name").required(),
        FieldRule::string("symbol").required(),
        FieldRule::string("side").required(),
        FieldRule::boolean("main").required(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_by_name_or_resource() {
        assert_eq!(EntityKind::parse("box-type").unwrap(), EntityKind::BoxType);
        assert_eq!(EntityKind::parse("/warehouse-types/").unwrap(), EntityKind::StorageType);
        assert!(matches!(
            EntityKind::parse("planets"),
            Err(AdminError::UnknownResourceError { .. })
        ));
    }

    #[test]
    fn test_names_and_resources_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for kind in EntityKind::ALL {
            assert!(seen.insert(kind.name()));
            assert!(seen.insert(kind.resource()));
        }
    }

    #[test]
    fn test_parent_is_nullable_only_on_update() {
        let create = EntityKind::SupplierCategory.create_schema();
        let update = EntityKind::SupplierCategory.update_schema();
        assert!(!create.field("parent").unwrap().nullable);
        assert!(update.field("parent").unwrap().nullable);
    }

    #[test]
    fn test_organization_phone_rules_differ() {
        let create = EntityKind::Organization.create_schema();
        let update = EntityKind::Organization.update_schema();
        assert!(create.field("phone_number").unwrap().pattern.is_some());
        assert!(update.field("phone_number").unwrap().required);
    }

    #[test]
    fn test_phone_regex_is_compiled_once() {
        let first = EntityKind::Organization.create_schema();
        let second = EntityKind::Organization.create_schema();
        let a = first.field("phone_number").unwrap().pattern.as_ref().unwrap().regex;
        let b = second.field("phone_number").unwrap().pattern.as_ref().unwrap().regex;
        assert!(std::ptr::eq(a, b));
        assert!(a.is_match("+998901234567"));
    }

    #[test]
    fn test_storage_type_status_default_only_on_create() {
        assert!(EntityKind::StorageType
            .create_schema()
            .field("status")
            .unwrap()
            .default
            .is_some());
        assert!(EntityKind::StorageType
            .update_schema()
            .field("status")
            .unwrap()
            .default
            .is_none());
    }
}

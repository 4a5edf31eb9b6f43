//! Product catalog records and their field descriptions.

use common::Money;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category_id: i32,
}

/// Describes one field of a queryable type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescription {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub field_type: &'static str,
    pub description: &'static str,
}

/// A queryable type and its fields, as listed by the schema endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDescription {
    pub name: &'static str,
    pub description: &'static str,
    pub fields: &'static [FieldDescription],
}

const fn field(
    name: &'static str,
    field_type: &'static str,
    description: &'static str,
) -> FieldDescription {
    FieldDescription {
        name,
        field_type,
        description,
    }
}

const CATEGORY_FIELDS: &[FieldDescription] = &[
    field("id", "Int!", "Unique identifier of the category"),
    field("name", "String!", "Display name of the category"),
    field("description", "String!", "Short description of what the category holds"),
];

const PRODUCT_FIELDS: &[FieldDescription] = &[
    field("id", "Int!", "Unique identifier of the product"),
    field("name", "String!", "Display name of the product"),
    field("description", "String!", "Marketing description of the product"),
    field("price", "Int!", "Unit price in cents"),
    field("categoryId", "Int!", "Identifier of the category the product belongs to"),
];

impl Category {
    pub fn field_descriptions() -> &'static [FieldDescription] {
        CATEGORY_FIELDS
    }
}

impl Product {
    pub fn field_descriptions() -> &'static [FieldDescription] {
        PRODUCT_FIELDS
    }
}

/// Every queryable catalog type.
pub fn schema() -> Vec<TypeDescription> {
    vec![
        TypeDescription {
            name: "Category",
            description: "A group of related products",
            fields: Category::field_descriptions(),
        },
        TypeDescription {
            name: "Product",
            description: "An item offered for sale alongside bookings",
            fields: Product::field_descriptions(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn described_fields_match_serialized_fields() {
        let product = Product {
            id: 1,
            name: "n".into(),
            description: "d".into(),
            price: Money::from_cents(1),
            category_id: 1,
        };
        let json = serde_json::to_value(&product).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();

        for field in Product::field_descriptions() {
            assert!(keys.contains(&field.name), "missing {}", field.name);
        }
        assert_eq!(keys.len(), Product::field_descriptions().len());
    }

    #[test]
    fn schema_lists_both_types() {
        let schema = schema();
        let names: Vec<_> = schema.iter().map(|t| t.name).collect();
        assert_eq!(names, ["Category", "Product"]);

        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json[0]["fields"][0]["type"], "Int!");
    }
}

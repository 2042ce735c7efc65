//! Static schema definitions for the bookstore.
//!
//! To add a metafield or metaobject, append an entry here and re-run:
//!
//! ```bash
//! copihue-cli provision all
//! ```
//!
//! Type names reference:
//! <https://shopify.dev/docs/apps/build/metafields/list-of-data-types>

use serde_json::{Value, json};

/// A product metafield definition to ensure on the shop.
#[derive(Debug, Clone, Copy)]
pub struct MetafieldDefinition {
    pub name: &'static str,
    pub key: &'static str,
    pub namespace: &'static str,
    pub field_type: &'static str,
    pub description: &'static str,
}

impl MetafieldDefinition {
    /// `namespace.key`, the identity reported in logs.
    #[must_use]
    pub fn identifier(&self) -> String {
        format!("{}.{}", self.namespace, self.key)
    }

    /// Build the `MetafieldDefinitionInput` for the create mutation.
    ///
    /// All bookstore metafields live on products and are publicly readable
    /// from the storefront.
    #[must_use]
    pub fn as_input(&self) -> Value {
        json!({
            "name": self.name,
            "namespace": self.namespace,
            "key": self.key,
            "type": self.field_type,
            "description": self.description,
            "ownerType": "PRODUCT",
            "access": {
                "storefront": "PUBLIC_READ",
            },
        })
    }
}

/// A field inside a metaobject definition.
#[derive(Debug, Clone, Copy)]
pub struct MetaobjectFieldDefinition {
    pub key: &'static str,
    pub name: &'static str,
    pub field_type: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// A metaobject definition to ensure on the shop.
#[derive(Debug, Clone, Copy)]
pub struct MetaobjectDefinition {
    pub object_type: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub field_definitions: &'static [MetaobjectFieldDefinition],
}

impl MetaobjectDefinition {
    /// Build the `MetaobjectDefinitionCreateInput` for the create mutation.
    #[must_use]
    pub fn as_input(&self) -> Value {
        json!({
            "type": self.object_type,
            "name": self.name,
            "description": self.description,
            "access": {
                "storefront": "PUBLIC_READ",
            },
            "capabilities": {
                "publishable": {
                    "enabled": true,
                },
            },
            "fieldDefinitions": self
                .field_definitions
                .iter()
                .map(|field| json!({
                    "key": field.key,
                    "name": field.name,
                    "type": field.field_type,
                    "description": field.description,
                    "validations": if field.required {
                        json!([{ "name": "required", "value": "true" }])
                    } else {
                        json!([])
                    },
                }))
                .collect::<Vec<_>>(),
        })
    }
}

/// Product metafields carrying book metadata.
pub const METAFIELD_DEFINITIONS: &[MetafieldDefinition] = &[
    MetafieldDefinition {
        name: "Autor",
        key: "autor",
        namespace: "custom",
        field_type: "single_line_text_field",
        description: "Autor del libro",
    },
    MetafieldDefinition {
        name: "ISBN",
        key: "isbn",
        namespace: "custom",
        field_type: "single_line_text_field",
        description: "ISBN del libro",
    },
    MetafieldDefinition {
        name: "Formato",
        key: "formato",
        namespace: "custom",
        field_type: "single_line_text_field",
        description: "Formato del libro",
    },
    MetafieldDefinition {
        name: "Páginas",
        key: "paginas",
        namespace: "custom",
        field_type: "single_line_text_field",
        description: "Cantidad de páginas del libro",
    },
    MetafieldDefinition {
        name: "Encuadernación",
        key: "encuadernacion",
        namespace: "custom",
        field_type: "single_line_text_field",
        description: "Tipo de encuadernación del libro",
    },
    MetafieldDefinition {
        name: "Idioma",
        key: "idioma",
        namespace: "custom",
        field_type: "single_line_text_field",
        description: "Idioma del libro",
    },
    MetafieldDefinition {
        name: "Impresores",
        key: "impresores",
        namespace: "custom",
        field_type: "single_line_text_field",
        description: "Impresores del libro",
    },
    MetafieldDefinition {
        name: "Año",
        key: "ano",
        namespace: "custom",
        field_type: "single_line_text_field",
        description: "Año de publicación",
    },
];

/// Metaobjects backing store content sections.
pub const METAOBJECT_DEFINITIONS: &[MetaobjectDefinition] = &[
    MetaobjectDefinition {
        object_type: "hero_gallery",
        name: "Hero Gallery",
        description: "Images for the homepage hero section (left and right galleries)",
        field_definitions: &[
            MetaobjectFieldDefinition {
                key: "left_images",
                name: "Left Gallery Images",
                field_type: "list.file_reference",
                description: "Images displayed in the left gallery of the hero section",
                required: false,
            },
            MetaobjectFieldDefinition {
                key: "right_images",
                name: "Right Gallery Images",
                field_type: "list.file_reference",
                description: "Images displayed in the right gallery of the hero section",
                required: false,
            },
        ],
    },
    MetaobjectDefinition {
        object_type: "about_us",
        name: "About Us",
        description: "Content for the info/about us section of the homepage",
        field_definitions: &[MetaobjectFieldDefinition {
            key: "content",
            name: "Content",
            field_type: "multi_line_text_field",
            description: "Main text content for the about us section",
            required: false,
        }],
    },
];

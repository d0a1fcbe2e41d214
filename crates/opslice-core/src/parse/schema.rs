use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON Schema type keyword value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

/// The `type` field can be a single type or an array of types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(SchemaType),
    Multiple(Vec<SchemaType>),
}

impl TypeSet {
    pub fn contains(&self, ty: SchemaType) -> bool {
        match self {
            TypeSet::Single(t) => *t == ty,
            TypeSet::Multiple(ts) => ts.contains(&ty),
        }
    }

    /// The first type other than `null`.
    pub fn primary(&self) -> Option<SchemaType> {
        match self {
            TypeSet::Single(SchemaType::Null) => None,
            TypeSet::Single(t) => Some(*t),
            TypeSet::Multiple(ts) => ts.iter().copied().find(|t| *t != SchemaType::Null),
        }
    }
}

/// A schema position: either a `$ref` or an inline schema.
///
/// A `$ref` with sibling keywords deserializes as a plain reference; the
/// siblings are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Schema(Box<Schema>),
}

impl SchemaOrRef {
    pub fn reference(ref_path: impl Into<String>) -> Self {
        SchemaOrRef::Ref {
            ref_path: ref_path.into(),
        }
    }

    pub fn inline(schema: Schema) -> Self {
        SchemaOrRef::Schema(Box::new(schema))
    }

    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            SchemaOrRef::Schema(s) => Some(s),
            SchemaOrRef::Ref { .. } => None,
        }
    }

    pub fn ref_path(&self) -> Option<&str> {
        match self {
            SchemaOrRef::Ref { ref_path } => Some(ref_path),
            SchemaOrRef::Schema(_) => None,
        }
    }
}

/// An OpenAPI 3.0 schema. Only the keywords that carry nested schemas, or
/// that a Swagger 2 parameter needs inline, are modeled; everything else
/// (`nullable`, `title`, validation keywords, `x-` extensions) stays in
/// `extra` and is written back unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaOrRef>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaOrRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaOrRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<SchemaOrRef>>,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Schema {
    pub fn of_type(ty: SchemaType) -> Self {
        Self {
            schema_type: Some(TypeSet::Single(ty)),
            ..Self::default()
        }
    }

    pub fn is_array(&self) -> bool {
        self.schema_type
            .as_ref()
            .is_some_and(|t| t.contains(SchemaType::Array))
    }
}

/// `additionalProperties` can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<SchemaOrRef>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmodeled_keywords_survive() {
        let json = r#"{"type":"string","maxLength":20,"nullable":true,"x-ms-navigationProperty":true}"#;
        let schema: Schema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.schema_type, Some(TypeSet::Single(SchemaType::String)));
        assert_eq!(schema.extra["nullable"], true);
        assert_eq!(serde_json::to_string(&schema).unwrap(), json);
    }

    #[test]
    fn test_reference_with_siblings_is_a_reference() {
        let node: SchemaOrRef = serde_json::from_str(
            r##"{"$ref":"#/components/schemas/user","description":"ignored"}"##,
        )
        .unwrap();
        assert_eq!(node.ref_path(), Some("#/components/schemas/user"));
    }

    #[test]
    fn test_not_is_a_schema_position() {
        let schema: Schema =
            serde_json::from_str(r##"{"not":{"$ref":"#/components/schemas/user"}}"##).unwrap();
        assert_eq!(
            schema.not.as_deref().and_then(SchemaOrRef::ref_path),
            Some("#/components/schemas/user")
        );
        assert!(schema.extra.is_empty());
    }

    #[test]
    fn test_primary_type_skips_null() {
        let ts: TypeSet = serde_json::from_str(r#"["null","integer"]"#).unwrap();
        assert_eq!(ts.primary(), Some(SchemaType::Integer));
        assert_eq!(TypeSet::Single(SchemaType::Null).primary(), None);
        assert!(Schema::of_type(SchemaType::Array).is_array());
    }
}

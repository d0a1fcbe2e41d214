use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::body::{HeaderOrRef, RequestBodyOrRef, ResponseOrRef};
use super::parameter::ParameterOrRef;
use super::reference::ComponentKind;
use super::schema::SchemaOrRef;
use super::security::SecurityScheme;

/// Named, reusable definitions. Registries keep insertion order, which for
/// a subset is the order the closure discovered them in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, SchemaOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, ParameterOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub request_bodies: IndexMap<String, RequestBodyOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, ResponseOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, HeaderOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub security_schemes: IndexMap<String, SecurityScheme>,

    /// Registries nothing here references into (`examples`, `links`,
    /// `callbacks`) plus extensions.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Components {
    /// Whether the registry of `kind` holds `id`.
    pub fn contains(&self, kind: ComponentKind, id: &str) -> bool {
        match kind {
            ComponentKind::Schemas => self.schemas.contains_key(id),
            ComponentKind::Parameters => self.parameters.contains_key(id),
            ComponentKind::Responses => self.responses.contains_key(id),
            ComponentKind::RequestBodies => self.request_bodies.contains_key(id),
            ComponentKind::Headers => self.headers.contains_key(id),
            ComponentKind::SecuritySchemes => self.security_schemes.contains_key(id),
        }
    }

    /// Number of definitions, security schemes excluded.
    pub fn definition_count(&self) -> usize {
        self.schemas.len()
            + self.parameters.len()
            + self.responses.len()
            + self.request_bodies.len()
            + self.headers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_by_kind() {
        let components: Components = serde_json::from_str(
            r#"{
                "schemas": {"user": {"type": "object"}},
                "requestBodies": {"userBody": {"content": {}}},
                "headers": {"trace": {"schema": {"type": "string"}}},
                "examples": {"sample": {"value": 1}}
            }"#,
        )
        .unwrap();
        assert!(components.contains(ComponentKind::Schemas, "user"));
        assert!(!components.contains(ComponentKind::Parameters, "user"));
        assert!(components.contains(ComponentKind::RequestBodies, "userBody"));
        assert!(components.contains(ComponentKind::Headers, "trace"));
        assert_eq!(components.definition_count(), 3);
        assert!(components.extra.contains_key("examples"));
    }
}

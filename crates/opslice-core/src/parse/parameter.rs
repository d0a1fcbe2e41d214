use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::body::Content;
use super::schema::SchemaOrRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Path => "path",
            ParameterLocation::Cookie => "cookie",
        }
    }

    /// Serialization style used when `style` is absent.
    fn default_style(&self) -> &'static str {
        match self {
            ParameterLocation::Query | ParameterLocation::Cookie => "form",
            ParameterLocation::Header | ParameterLocation::Path => "simple",
        }
    }
}

/// A path, query, header or cookie parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "in")]
    pub location: ParameterLocation,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,

    /// Alternative to `schema` for complex serializations.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: Content,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Parameter {
    /// Path parameters are required whatever the document says.
    pub fn is_required(&self) -> bool {
        self.required || self.location == ParameterLocation::Path
    }

    pub fn style(&self) -> &str {
        self.style
            .as_deref()
            .unwrap_or_else(|| self.location.default_style())
    }

    /// Whether array values repeat the parameter per item. Defaults to true
    /// for the `form` style only.
    pub fn explodes(&self) -> bool {
        self.explode.unwrap_or_else(|| self.style() == "form")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Parameter(Parameter),
}

impl ParameterOrRef {
    pub fn ref_path(&self) -> Option<&str> {
        match self {
            ParameterOrRef::Ref { ref_path } => Some(ref_path),
            ParameterOrRef::Parameter(_) => None,
        }
    }
}

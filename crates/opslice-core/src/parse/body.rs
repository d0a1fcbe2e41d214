//! Payload-carrying objects: media types, request bodies, responses and
//! response headers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::SchemaOrRef;

/// Media types keyed by content type, in declaration order.
pub type Content = IndexMap<String, MediaType>;

/// The schema of the first media type that declares one.
pub fn first_schema(content: &Content) -> Option<&SchemaOrRef> {
    content.values().find_map(|m| m.schema.as_ref())
}

/// The body shape for one content type. Examples and encodings are carried
/// through `extra` untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl MediaType {
    pub fn of(schema: SchemaOrRef) -> Self {
        Self {
            schema: Some(schema),
            extra: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub content: Content,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestBodyOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    RequestBody(RequestBody),
}

impl RequestBodyOrRef {
    pub fn ref_path(&self) -> Option<&str> {
        match self {
            RequestBodyOrRef::Ref { ref_path } => Some(ref_path),
            RequestBodyOrRef::RequestBody(_) => None,
        }
    }
}

/// A response header. Shaped like a parameter without `name` and `in`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Header {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: Content,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Header {
    /// `schema`, or the schema of the first media type in `content`.
    pub fn any_schema(&self) -> Option<&SchemaOrRef> {
        self.schema.as_ref().or_else(|| first_schema(&self.content))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Header(Header),
}

impl HeaderOrRef {
    pub fn ref_path(&self) -> Option<&str> {
        match self {
            HeaderOrRef::Ref { ref_path } => Some(ref_path),
            HeaderOrRef::Header(_) => None,
        }
    }
}

/// A response. Links stay raw; nothing here walks into them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: Content,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, HeaderOrRef>,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Response {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            content: Content::new(),
            headers: IndexMap::new(),
            extra: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Response(Response),
}

impl ResponseOrRef {
    pub fn ref_path(&self) -> Option<&str> {
        match self {
            ResponseOrRef::Ref { ref_path } => Some(ref_path),
            ResponseOrRef::Response(_) => None,
        }
    }
}

/// Responses keyed by status code or `default`.
pub type Responses = IndexMap<String, ResponseOrRef>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_schema_skips_schemaless_media_types() {
        let content = Content::from([
            ("text/plain".to_string(), MediaType::default()),
            (
                "application/json".to_string(),
                MediaType::of(SchemaOrRef::reference("#/components/schemas/user")),
            ),
        ]);
        assert_eq!(
            first_schema(&content).and_then(SchemaOrRef::ref_path),
            Some("#/components/schemas/user")
        );
        assert!(first_schema(&Content::new()).is_none());
    }

    #[test]
    fn test_media_type_keeps_examples_verbatim() {
        let json = r#"{"schema":{"type":"string"},"example":"hi","encoding":{"a":{}}}"#;
        let media: MediaType = serde_json::from_str(json).unwrap();
        assert_eq!(media.extra["example"], "hi");
        assert_eq!(serde_json::to_string(&media).unwrap(), json);
    }

    #[test]
    fn test_response_headers_are_modeled() {
        let response: Response = serde_json::from_str(
            r##"{
                "description": "ok",
                "headers": {
                    "X-Page": {"schema": {"$ref": "#/components/schemas/pageInfo"}},
                    "X-Trace": {"$ref": "#/components/headers/trace"},
                    "X-Json": {"content": {"application/json": {"schema": {"type": "object"}}}}
                }
            }"##,
        )
        .unwrap();
        let HeaderOrRef::Header(ref page) = response.headers["X-Page"] else {
            panic!("X-Page should be inline");
        };
        assert_eq!(
            page.any_schema().and_then(SchemaOrRef::ref_path),
            Some("#/components/schemas/pageInfo")
        );
        assert_eq!(
            response.headers["X-Trace"].ref_path(),
            Some("#/components/headers/trace")
        );
        let HeaderOrRef::Header(ref json) = response.headers["X-Json"] else {
            panic!("X-Json should be inline");
        };
        assert!(json.any_schema().is_some());
    }

    #[test]
    fn test_untagged_reference_wins() {
        let body: RequestBodyOrRef =
            serde_json::from_str(r##"{"$ref":"#/components/requestBodies/b"}"##).unwrap();
        assert_eq!(body.ref_path(), Some("#/components/requestBodies/b"));

        let response: ResponseOrRef = serde_json::from_str(r#"{"description":"ok"}"#).unwrap();
        assert_eq!(response, ResponseOrRef::Response(Response::new("ok")));
        assert_eq!(response.ref_path(), None);
    }
}

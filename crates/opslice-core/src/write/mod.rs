//! Serialize a document as OpenAPI 3 or Swagger 2, in YAML or JSON.

pub mod swagger2;

use serde::{Deserialize, Serialize};

use crate::error::WriteError;
use crate::parse::spec::OpenApiSpec;

/// Output dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    V2,
    V3,
}

/// Output syntax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    #[default]
    Yaml,
    Json,
}

impl Syntax {
    pub fn content_type(&self) -> &'static str {
        match self {
            Syntax::Yaml => "application/yaml",
            Syntax::Json => "application/json",
        }
    }
}

/// Render `spec` as text. Every component present in the document is
/// emitted, referenced from `paths` or not.
pub fn write(spec: &OpenApiSpec, dialect: Dialect, syntax: Syntax) -> Result<String, WriteError> {
    match dialect {
        Dialect::V3 => emit(spec, syntax),
        Dialect::V2 => emit(&swagger2::downgrade(spec), syntax),
    }
}

fn emit<T: Serialize>(value: &T, syntax: Syntax) -> Result<String, WriteError> {
    Ok(match syntax {
        Syntax::Yaml => serde_yaml_ng::to_string(value)?,
        Syntax::Json => serde_json::to_string_pretty(value)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    const DOC: &str = r##"
openapi: 3.0.1
info:
  title: Write
  version: v1.0
paths:
  /me:
    get:
      operationId: me.GetUser
      x-ms-docs-operation-type: operation
      responses:
        "200":
          $ref: "#/components/responses/user"
components:
  responses:
    user:
      description: ok
      content:
        application/json:
          schema:
            $ref: "#/components/schemas/user"
  schemas:
    user:
      type: object
"##;

    #[test]
    fn test_v3_json_round_trips() {
        let spec = parse::from_yaml(DOC).unwrap();
        let json = write(&spec, Dialect::V3, Syntax::Json).unwrap();
        assert_eq!(parse::from_json(&json).unwrap(), spec);
    }

    #[test]
    fn test_v3_yaml_keeps_extensions() {
        let spec = parse::from_yaml(DOC).unwrap();
        let yaml = write(&spec, Dialect::V3, Syntax::Yaml).unwrap();
        assert!(yaml.contains("x-ms-docs-operation-type: operation"));
        assert_eq!(parse::from_yaml(&yaml).unwrap(), spec);
    }

    #[test]
    fn test_v2_declares_swagger() {
        let spec = parse::from_yaml(DOC).unwrap();
        let json = write(&spec, Dialect::V2, Syntax::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["swagger"], "2.0");
        assert!(value.get("openapi").is_none());
        assert_eq!(value["definitions"]["user"]["type"], "object");
    }
}

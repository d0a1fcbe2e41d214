pub mod body;
pub mod components;
pub mod operation;
pub mod parameter;
pub mod reference;
pub mod schema;
pub mod security;
pub mod spec;

use crate::error::ParseError;
use spec::OpenApiSpec;

/// Parse an OpenAPI document from YAML.
pub fn from_yaml(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_yaml_ng::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Parse an OpenAPI document from JSON.
pub fn from_json(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_json::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Baseline structural check. Individual schemas are not validated.
fn validate_version(spec: &OpenApiSpec) -> Result<(), ParseError> {
    if !spec.openapi.starts_with("3.") {
        return Err(ParseError::UnsupportedVersion(spec.openapi.clone()));
    }
    if spec.info.title.trim().is_empty() {
        return Err(ParseError::MissingField("info.title".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_swagger_2() {
        let yaml = "openapi: '2.0'\ninfo:\n  title: T\n  version: '1'\n";
        assert!(matches!(
            from_yaml(yaml),
            Err(ParseError::UnsupportedVersion(v)) if v == "2.0"
        ));
    }

    #[test]
    fn test_rejects_blank_title() {
        let yaml = "openapi: 3.0.1\ninfo:\n  title: ''\n  version: '1'\n";
        assert!(matches!(from_yaml(yaml), Err(ParseError::MissingField(_))));
    }

    #[test]
    fn test_json_and_yaml_agree() {
        let yaml = "openapi: 3.0.1\ninfo:\n  title: T\n  version: '1'\npaths: {}\n";
        let json = r#"{"openapi":"3.0.1","info":{"title":"T","version":"1"},"paths":{}}"#;
        assert_eq!(from_yaml(yaml).unwrap(), from_json(json).unwrap());
    }
}

use std::fmt;

use crate::error::ResolveError;

const LOCAL_COMPONENTS_PREFIX: &str = "#/components/";

/// Which component registry a reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Schemas,
    Parameters,
    Responses,
    RequestBodies,
    Headers,
    SecuritySchemes,
}

impl ComponentKind {
    /// The section name used in `#/components/<section>/<id>`.
    pub fn section(&self) -> &'static str {
        match self {
            ComponentKind::Schemas => "schemas",
            ComponentKind::Parameters => "parameters",
            ComponentKind::Responses => "responses",
            ComponentKind::RequestBodies => "requestBodies",
            ComponentKind::Headers => "headers",
            ComponentKind::SecuritySchemes => "securitySchemes",
        }
    }

    fn from_section(section: &str) -> Option<Self> {
        match section {
            "schemas" => Some(ComponentKind::Schemas),
            "parameters" => Some(ComponentKind::Parameters),
            "responses" => Some(ComponentKind::Responses),
            "requestBodies" => Some(ComponentKind::RequestBodies),
            "headers" => Some(ComponentKind::Headers),
            "securitySchemes" => Some(ComponentKind::SecuritySchemes),
            _ => None,
        }
    }
}

/// A local `$ref` split into its registry kind and identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reference<'a> {
    pub kind: ComponentKind,
    pub id: &'a str,
}

impl<'a> Reference<'a> {
    /// Parse `#/components/<section>/<id>`. External references and
    /// pointers outside `components` are rejected.
    pub fn parse(ref_path: &'a str) -> Result<Self, ResolveError> {
        let stripped = ref_path
            .strip_prefix(LOCAL_COMPONENTS_PREFIX)
            .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
        let (section, id) = stripped
            .split_once('/')
            .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
        let kind = ComponentKind::from_section(section).ok_or_else(|| {
            ResolveError::InvalidRefFormat(format!("unknown section '{section}' in {ref_path}"))
        })?;
        if id.is_empty() {
            return Err(ResolveError::InvalidRefFormat(ref_path.to_string()));
        }
        Ok(Self { kind, id })
    }

    /// Build the `$ref` string for a component.
    pub fn path(kind: ComponentKind, id: &str) -> String {
        format!("{LOCAL_COMPONENTS_PREFIX}{}/{id}", kind.section())
    }
}

impl fmt::Display for Reference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{LOCAL_COMPONENTS_PREFIX}{}/{}", self.kind.section(), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_schema_ref() {
        let r = Reference::parse("#/components/schemas/microsoft.graph.user").unwrap();
        assert_eq!(r.kind, ComponentKind::Schemas);
        assert_eq!(r.id, "microsoft.graph.user");
    }

    #[test]
    fn test_parse_request_body_ref() {
        let r = Reference::parse("#/components/requestBodies/refPostBody").unwrap();
        assert_eq!(r.kind, ComponentKind::RequestBodies);
        assert_eq!(r.id, "refPostBody");
    }

    #[test]
    fn test_parse_header_ref() {
        let r = Reference::parse("#/components/headers/ETag").unwrap();
        assert_eq!(r.kind, ComponentKind::Headers);
        assert_eq!(r.id, "ETag");
    }

    #[test]
    fn test_rejects_external_ref() {
        assert!(Reference::parse("common.yaml#/components/schemas/Foo").is_err());
        assert!(Reference::parse("#/definitions/Foo").is_err());
        assert!(Reference::parse("#/components/examples/Foo").is_err());
        assert!(Reference::parse("#/components/schemas/").is_err());
    }

    #[test]
    fn test_display_round_trips_path() {
        let path = Reference::path(ComponentKind::Parameters, "top");
        assert_eq!(path, "#/components/parameters/top");
        assert_eq!(Reference::parse(&path).unwrap().to_string(), path);
    }
}

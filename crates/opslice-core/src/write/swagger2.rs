//! Downgrade an OpenAPI 3 document to a Swagger 2.0 value.
//!
//! Request bodies become a single `in: body` parameter, responses keep the
//! schema of their first media type, and component references move to the
//! v2 sections (`definitions`, `parameters`, `responses`).

use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use crate::parse::body::{
    Header, HeaderOrRef, RequestBody, RequestBodyOrRef, ResponseOrRef, first_schema,
};
use crate::parse::components::Components;
use crate::parse::operation::{Operation, PathItem};
use crate::parse::parameter::{Parameter, ParameterLocation, ParameterOrRef};
use crate::parse::reference::{ComponentKind, Reference};
use crate::parse::schema::{Schema, SchemaOrRef, SchemaType, TypeSet};
use crate::parse::security::{Grant, SecurityScheme, SecuritySchemeType};
use crate::parse::spec::OpenApiSpec;

/// Convert `spec` to a Swagger 2.0 document.
pub fn downgrade(spec: &OpenApiSpec) -> Value {
    let empty = Components::default();
    let components = spec.components.as_ref().unwrap_or(&empty);
    let mut root = Map::new();

    root.insert("swagger".into(), json!("2.0"));
    root.insert("info".into(), to_value(&spec.info));
    if let Some(server) = spec.servers.first() {
        let (scheme, host, base_path) = server.split_url();
        if let Some(host) = host {
            root.insert("host".into(), json!(host));
        }
        root.insert("basePath".into(), json!(base_path));
        if let Some(scheme) = scheme {
            root.insert("schemes".into(), json!([scheme]));
        }
    }

    let paths: Map<String, Value> = spec
        .paths
        .iter()
        .map(|(path, item)| (path.clone(), path_item(item, components)))
        .collect();
    root.insert("paths".into(), Value::Object(paths));

    insert_non_empty(
        &mut root,
        "definitions",
        components
            .schemas
            .iter()
            .map(|(id, s)| (id.clone(), schema(s)))
            .collect(),
    );
    insert_non_empty(
        &mut root,
        "parameters",
        components
            .parameters
            .iter()
            .filter_map(|(id, p)| parameter(p, components).map(|p| (id.clone(), p)))
            .collect(),
    );
    insert_non_empty(
        &mut root,
        "responses",
        components
            .responses
            .iter()
            .map(|(id, r)| (id.clone(), response(r, components)))
            .collect(),
    );
    insert_non_empty(
        &mut root,
        "securityDefinitions",
        components
            .security_schemes
            .iter()
            .filter_map(|(id, s)| security_scheme(s).map(|s| (id.clone(), s)))
            .collect(),
    );

    if !spec.security.is_empty() {
        root.insert("security".into(), to_value(&spec.security));
    }
    if !spec.tags.is_empty() {
        root.insert("tags".into(), to_value(&spec.tags));
    }
    copy_extensions(&mut root, &spec.extra);
    Value::Object(root)
}

fn to_value<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn insert_non_empty(root: &mut Map<String, Value>, key: &str, section: Map<String, Value>) {
    if !section.is_empty() {
        root.insert(key.to_string(), Value::Object(section));
    }
}

fn copy_extensions(into: &mut Map<String, Value>, extra: &IndexMap<String, Value>) {
    for (key, value) in extra {
        if key.starts_with("x-") {
            into.insert(key.clone(), value.clone());
        }
    }
}

/// Rewrite a v3 component reference to its v2 location.
fn v2_ref(ref_path: &str) -> String {
    match Reference::parse(ref_path) {
        Ok(Reference {
            kind: ComponentKind::Schemas,
            id,
        }) => format!("#/definitions/{id}"),
        Ok(Reference {
            kind: ComponentKind::Parameters,
            id,
        }) => format!("#/parameters/{id}"),
        Ok(Reference {
            kind: ComponentKind::Responses,
            id,
        }) => format!("#/responses/{id}"),
        _ => ref_path.to_string(),
    }
}

fn path_item(item: &PathItem, components: &Components) -> Value {
    let mut out = Map::new();
    for (method, op) in item.operations() {
        out.insert(
            method.as_str().to_ascii_lowercase(),
            operation(op, components),
        );
    }
    let params: Vec<Value> = item
        .parameters
        .iter()
        .filter_map(|p| parameter(p, components))
        .collect();
    if !params.is_empty() {
        out.insert("parameters".into(), Value::Array(params));
    }
    copy_extensions(&mut out, &item.extra);
    Value::Object(out)
}

fn operation(op: &Operation, components: &Components) -> Value {
    let mut out = Map::new();
    if !op.tags.is_empty() {
        out.insert("tags".into(), json!(op.tags));
    }
    if let Some(ref summary) = op.summary {
        out.insert("summary".into(), json!(summary));
    }
    if let Some(ref description) = op.description {
        out.insert("description".into(), json!(description));
    }
    if let Some(ref id) = op.operation_id {
        out.insert("operationId".into(), json!(id));
    }

    let body = op
        .request_body
        .as_ref()
        .and_then(|b| resolve_request_body(b, components));
    if let Some(body) = body {
        let consumes: Vec<&String> = body.content.keys().collect();
        if !consumes.is_empty() {
            out.insert("consumes".into(), json!(consumes));
        }
    }
    let mut produces: Vec<&String> = Vec::new();
    for resp in op.responses.values() {
        if let ResponseOrRef::Response(r) = resp {
            for media in r.content.keys() {
                if !produces.contains(&media) {
                    produces.push(media);
                }
            }
        }
    }
    if !produces.is_empty() {
        out.insert("produces".into(), json!(produces));
    }

    let mut params: Vec<Value> = op
        .parameters
        .iter()
        .filter_map(|p| parameter(p, components))
        .collect();
    if let Some(body) = body {
        params.push(body_parameter(body));
    }
    if !params.is_empty() {
        out.insert("parameters".into(), Value::Array(params));
    }

    let responses: Map<String, Value> = op
        .responses
        .iter()
        .map(|(status, r)| (status.clone(), response(r, components)))
        .collect();
    out.insert("responses".into(), Value::Object(responses));

    if let Some(deprecated) = op.deprecated {
        out.insert("deprecated".into(), json!(deprecated));
    }
    if let Some(ref security) = op.security {
        out.insert("security".into(), to_value(security));
    }
    copy_extensions(&mut out, &op.extra);
    Value::Object(out)
}

fn resolve_request_body<'a>(
    body: &'a RequestBodyOrRef,
    components: &'a Components,
) -> Option<&'a RequestBody> {
    match body {
        RequestBodyOrRef::RequestBody(rb) => Some(rb),
        RequestBodyOrRef::Ref { ref_path } => {
            let reference = Reference::parse(ref_path).ok()?;
            match components.request_bodies.get(reference.id)? {
                RequestBodyOrRef::RequestBody(rb) => Some(rb),
                RequestBodyOrRef::Ref { .. } => None,
            }
        }
    }
}

fn body_parameter(body: &RequestBody) -> Value {
    let mut out = Map::new();
    out.insert("in".into(), json!("body"));
    out.insert("name".into(), json!("body"));
    if let Some(ref description) = body.description {
        out.insert("description".into(), json!(description));
    }
    if body.required {
        out.insert("required".into(), json!(true));
    }
    let body_schema = first_schema(&body.content)
        .map(schema)
        .unwrap_or_else(|| json!({ "type": "object" }));
    out.insert("schema".into(), body_schema);
    Value::Object(out)
}

/// A non-body parameter. Cookie parameters have no v2 form and are dropped,
/// along with references to them.
fn parameter(param: &ParameterOrRef, components: &Components) -> Option<Value> {
    let p: &Parameter = match param {
        ParameterOrRef::Ref { ref_path } if refers_to_cookie(ref_path, components) => {
            return None;
        }
        ParameterOrRef::Ref { ref_path } => return Some(json!({ "$ref": v2_ref(ref_path) })),
        ParameterOrRef::Parameter(p) => p,
    };
    if p.location == ParameterLocation::Cookie {
        return None;
    }

    let mut out = Map::new();
    out.insert("name".into(), json!(p.name));
    out.insert("in".into(), json!(p.location.as_str()));
    if let Some(ref description) = p.description {
        out.insert("description".into(), json!(description));
    }
    if p.is_required() {
        out.insert("required".into(), json!(true));
    }

    let resolved = p
        .schema
        .as_ref()
        .or_else(|| first_schema(&p.content))
        .and_then(|s| resolve_schema(s, components));
    match resolved {
        Some(s) => {
            flatten_simple_schema(s, &mut out);
            if s.is_array() {
                let format = if p.explodes() { "multi" } else { "csv" };
                out.insert("collectionFormat".into(), json!(format));
            }
        }
        None => {
            out.insert("type".into(), json!("string"));
        }
    }
    copy_extensions(&mut out, &p.extra);
    Some(Value::Object(out))
}

fn refers_to_cookie(ref_path: &str, components: &Components) -> bool {
    let Ok(Reference {
        kind: ComponentKind::Parameters,
        id,
    }) = Reference::parse(ref_path)
    else {
        return false;
    };
    matches!(
        components.parameters.get(id),
        Some(ParameterOrRef::Parameter(p)) if p.location == ParameterLocation::Cookie
    )
}

fn resolve_schema<'a>(s: &'a SchemaOrRef, components: &'a Components) -> Option<&'a Schema> {
    match s {
        SchemaOrRef::Schema(schema) => Some(schema.as_ref()),
        SchemaOrRef::Ref { ref_path } => {
            let reference = Reference::parse(ref_path).ok()?;
            components.schemas.get(reference.id)?.as_schema()
        }
    }
}

/// Copy the keywords a v2 non-body parameter or header carries inline.
fn flatten_simple_schema(s: &Schema, out: &mut Map<String, Value>) {
    let ty = s.schema_type.as_ref().and_then(TypeSet::primary);
    out.insert("type".into(), to_value(&ty.unwrap_or(SchemaType::String)));
    if let Some(ref format) = s.format {
        out.insert("format".into(), json!(format));
    }
    if let Some(ref items) = s.items {
        out.insert("items".into(), schema(items));
    }
    if !s.enum_values.is_empty() {
        out.insert("enum".into(), json!(s.enum_values));
    }
    if let Some(ref default) = s.default_value {
        out.insert("default".into(), default.clone());
    }
}

fn response(resp: &ResponseOrRef, components: &Components) -> Value {
    let r = match resp {
        ResponseOrRef::Ref { ref_path } => return json!({ "$ref": v2_ref(ref_path) }),
        ResponseOrRef::Response(r) => r,
    };
    let mut out = Map::new();
    out.insert("description".into(), json!(r.description));
    if let Some(s) = first_schema(&r.content) {
        out.insert("schema".into(), schema(s));
    }
    if !r.headers.is_empty() {
        let headers: Map<String, Value> = r
            .headers
            .iter()
            .map(|(name, h)| (name.clone(), header(h, components)))
            .collect();
        out.insert("headers".into(), Value::Object(headers));
    }
    copy_extensions(&mut out, &r.extra);
    Value::Object(out)
}

/// v3 headers wrap their type in `schema`; v2 headers carry it inline and
/// cannot be references, so component headers are expanded in place.
fn header(h: &HeaderOrRef, components: &Components) -> Value {
    let mut out = Map::new();
    let resolved = resolve_header(h, components);
    if let Some(description) = resolved.and_then(|h| h.description.as_ref()) {
        out.insert("description".into(), json!(description));
    }
    let schema = resolved
        .and_then(Header::any_schema)
        .and_then(|s| resolve_schema(s, components));
    match schema {
        Some(s) => flatten_simple_schema(s, &mut out),
        None => {
            out.insert("type".into(), json!("string"));
        }
    }
    if let Some(h) = resolved {
        copy_extensions(&mut out, &h.extra);
    }
    Value::Object(out)
}

fn resolve_header<'a>(h: &'a HeaderOrRef, components: &'a Components) -> Option<&'a Header> {
    match h {
        HeaderOrRef::Header(h) => Some(h),
        HeaderOrRef::Ref { ref_path } => {
            let reference = Reference::parse(ref_path).ok()?;
            match components.headers.get(reference.id)? {
                HeaderOrRef::Header(h) => Some(h),
                HeaderOrRef::Ref { .. } => None,
            }
        }
    }
}

fn schema(s: &SchemaOrRef) -> Value {
    downgrade_schema(to_value(s))
}

/// Rewrite references and v3-only keywords inside a serialized schema.
fn downgrade_schema(value: Value) -> Value {
    let Value::Object(map) = value else {
        return value;
    };
    let mut out = Map::with_capacity(map.len());
    for (key, v) in map {
        match key.as_str() {
            "$ref" => {
                let rewritten = v.as_str().map(v2_ref).map(Value::String).unwrap_or(v);
                out.insert(key, rewritten);
            }
            "nullable" => {
                out.insert("x-nullable".into(), v);
            }
            "properties" => {
                let props = match v {
                    Value::Object(props) => Value::Object(
                        props
                            .into_iter()
                            .map(|(name, p)| (name, downgrade_schema(p)))
                            .collect(),
                    ),
                    other => other,
                };
                out.insert(key, props);
            }
            "items" | "additionalProperties" | "not" => {
                out.insert(key, downgrade_schema(v));
            }
            "allOf" | "anyOf" | "oneOf" => {
                let alternatives = match v {
                    Value::Array(items) => {
                        Value::Array(items.into_iter().map(downgrade_schema).collect())
                    }
                    other => other,
                };
                out.insert(key, alternatives);
            }
            _ => {
                out.insert(key, v);
            }
        }
    }
    Value::Object(out)
}

fn security_scheme(s: &SecurityScheme) -> Option<Value> {
    let mut out = Map::new();
    match s.scheme_type {
        SecuritySchemeType::OAuth2 => {
            // Swagger 2 allows one flow per scheme.
            let (grant, flow) = s.flows.as_ref()?.iter().next()?;
            let flow_name = match grant {
                Grant::AuthorizationCode => "accessCode",
                Grant::Implicit => "implicit",
                Grant::Password => "password",
                Grant::ClientCredentials => "application",
            };
            out.insert("type".into(), json!("oauth2"));
            out.insert("flow".into(), json!(flow_name));
            if let Some(ref url) = flow.authorization_url {
                out.insert("authorizationUrl".into(), json!(url));
            }
            if let Some(ref url) = flow.token_url {
                out.insert("tokenUrl".into(), json!(url));
            }
            out.insert("scopes".into(), to_value(&flow.scopes));
        }
        SecuritySchemeType::ApiKey => {
            out.insert("type".into(), json!("apiKey"));
            out.insert("name".into(), json!(s.name));
            out.insert("in".into(), json!(s.location));
        }
        SecuritySchemeType::Http if s.scheme.as_deref() == Some("basic") => {
            out.insert("type".into(), json!("basic"));
        }
        _ => return None,
    }
    if let Some(ref description) = s.description {
        out.insert("description".into(), json!(description));
    }
    Some(Value::Object(out))
}

use std::fs;
use std::path::PathBuf;

use indexmap::IndexMap;
use opslice_core::error::{RequestError, SliceError, SourceError};
use opslice_core::pipeline::{self, SliceRequest};
use opslice_core::select::Style;
use opslice_core::source::{DocumentCache, FileSource};
use opslice_core::write::{Dialect, Syntax};
use serde_json::Value;

const GRAPH: &str = include_str!("fixtures/graph.yaml");

fn graph_cache(dir: &tempfile::TempDir) -> DocumentCache<FileSource> {
    fs::write(dir.path().join("v1.0.yaml"), GRAPH).unwrap();
    let source = FileSource::new(IndexMap::from([
        ("v1.0".to_string(), PathBuf::from("v1.0.yaml")),
        ("beta".to_string(), PathBuf::from("beta.yaml")),
    ]))
    .relative_to(dir.path());
    DocumentCache::new(source)
}

fn slice_json(cache: &DocumentCache<FileSource>, request: SliceRequest) -> Value {
    let request = SliceRequest {
        syntax: Syntax::Json,
        ..request
    };
    serde_json::from_str(&pipeline::slice(cache, &request).unwrap()).unwrap()
}

#[test]
fn slice_as_swagger2() {
    let dir = tempfile::tempdir().unwrap();
    let cache = graph_cache(&dir);
    let doc = slice_json(
        &cache,
        SliceRequest {
            operation_ids: Some("users.user.ListOwnedItems".to_string()),
            ..SliceRequest::default()
        },
    );

    assert_eq!(doc["swagger"], "2.0");
    assert_eq!(doc["info"]["title"], "Partial Graph API");
    assert_eq!(doc["info"]["version"], "v1.0");
    assert_eq!(doc["host"], "graph.microsoft.com");
    assert_eq!(doc["basePath"], "/v1.0");
    assert_eq!(doc["securityDefinitions"]["azureaadv2"]["flow"], "accessCode");
    assert_eq!(doc["parameters"]["filter"]["name"], "$filter");
    assert_eq!(doc["parameters"]["filter"]["type"], "object");
    assert_eq!(
        doc["definitions"]["filterExpression"]["properties"]["clause"]["$ref"],
        "#/definitions/filterClause"
    );
    let op = &doc["paths"]["/users/{user-id}/ownedObjects"]["get"];
    assert_eq!(op["parameters"][0]["$ref"], "#/parameters/filter");
    assert_eq!(op["responses"]["200"]["$ref"], "#/responses/directoryObjectCollection");
    assert_eq!(op["x-ms-docs-operation-type"], "operation");
}

#[test]
fn slice_as_openapi3_with_powershell_style() {
    let dir = tempfile::tempdir().unwrap();
    let cache = graph_cache(&dir);
    let doc = slice_json(
        &cache,
        SliceRequest {
            tags: Some("Mail".to_string()),
            dialect: Dialect::V3,
            style: Style::Powershell,
            title: "Mail".to_string(),
            ..SliceRequest::default()
        },
    );

    assert_eq!(doc["openapi"], "3.0.1");
    assert_eq!(doc["info"]["title"], "Mail");
    assert_eq!(doc["servers"][0]["url"], "https://graph.microsoft.com/v1.0/");
    assert_eq!(doc["servers"][0]["description"], "Core");
    assert_eq!(
        doc["paths"]["/me/messages"]["post"]["operationId"],
        "me_CreateMessages"
    );
    assert_eq!(
        doc["components"]["schemas"]["message"]["properties"]["from"]["$ref"],
        "#/components/schemas/recipient"
    );
    assert!(doc["components"]["requestBodies"]["messageBody"].is_object());
    assert!(doc["paths"].get("/groups").is_none());
}

#[test]
fn path_level_parameters_survive_slicing() {
    let dir = tempfile::tempdir().unwrap();
    let cache = graph_cache(&dir);
    let request = SliceRequest {
        operation_ids: Some("users.user.ListOwnedItems".to_string()),
        ..SliceRequest::default()
    };

    let v2 = slice_json(&cache, request.clone());
    let item = &v2["paths"]["/users/{user-id}/ownedObjects"];
    assert_eq!(item["parameters"][0]["name"], "user-id");
    assert_eq!(item["parameters"][0]["in"], "path");
    assert_eq!(item["parameters"][0]["required"], true);

    let v3 = slice_json(
        &cache,
        SliceRequest {
            dialect: Dialect::V3,
            ..request
        },
    );
    let item = &v3["paths"]["/users/{user-id}/ownedObjects"];
    assert_eq!(item["parameters"][0]["name"], "user-id");
    assert_eq!(
        item["description"],
        "Provides operations to manage the ownedObjects property of the microsoft.graph.user entity."
    );
}

#[test]
fn header_schemas_are_carried_into_the_slice() {
    let dir = tempfile::tempdir().unwrap();
    let cache = graph_cache(&dir);
    let request = SliceRequest {
        operation_ids: Some("me.ListMessages".to_string()),
        dialect: Dialect::V3,
        ..SliceRequest::default()
    };

    let v3 = slice_json(&cache, request.clone());
    let header = &v3["paths"]["/me/messages"]["get"]["responses"]["200"]["headers"]["X-Page"];
    assert_eq!(header["schema"]["$ref"], "#/components/schemas/pageInfo");
    assert!(v3["components"]["schemas"]["pageInfo"].is_object());

    let v2 = slice_json(
        &cache,
        SliceRequest {
            dialect: Dialect::V2,
            ..request
        },
    );
    let header = &v2["paths"]["/me/messages"]["get"]["responses"]["200"]["headers"]["X-Page"];
    assert_eq!(header["type"], "object");
    assert_eq!(header["description"], "Paging state of the collection");
}

#[test]
fn full_document_keeps_every_operation() {
    let dir = tempfile::tempdir().unwrap();
    let cache = graph_cache(&dir);
    let full = pipeline::full_document(&cache, "v1.0").unwrap();
    let cached = cache.get("v1.0").unwrap();

    assert_eq!(full.operation_count(), cached.operation_count());
    assert!(full.components.as_ref().unwrap().schemas.contains_key("unusedEntity"));
    assert_eq!(
        full.paths["/me"].get.as_ref().unwrap().operation_id.as_deref(),
        Some("me_GetUser")
    );
    assert_eq!(
        cached.paths["/me"].get.as_ref().unwrap().operation_id.as_deref(),
        Some("me.GetUser")
    );
}

#[test]
fn missing_variant_file_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let cache = graph_cache(&dir);
    let request = SliceRequest {
        variant: "beta".to_string(),
        operation_ids: Some("*".to_string()),
        ..SliceRequest::default()
    };
    assert!(matches!(
        pipeline::slice(&cache, &request),
        Err(SliceError::Source(SourceError::DocumentUnavailable { .. }))
    ));
}

#[test]
fn conflicting_selectors_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let cache = graph_cache(&dir);
    let request = SliceRequest {
        operation_ids: Some("me.GetUser".to_string()),
        tags: Some("Mail".to_string()),
        ..SliceRequest::default()
    };
    assert!(matches!(
        pipeline::slice(&cache, &request),
        Err(SliceError::Request(RequestError::SelectorConflict))
    ));
}

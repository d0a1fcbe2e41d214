use indexmap::IndexMap;

use crate::parse::components::Components;
use crate::parse::operation::PathItem;
use crate::parse::security::{SecurityRequirement, SecurityScheme};
use crate::parse::spec::{Info, OpenApiSpec, Server};
use crate::search::SearchResult;

/// OpenAPI version declared by built subsets.
pub const SUBSET_OPENAPI_VERSION: &str = "3.0.1";

/// Identifier of the security scheme every subset carries.
pub const SECURITY_SCHEME_ID: &str = "azureaadv2";

pub const AUTHORIZATION_URL: &str =
    "https://login.microsoftonline.com/common/oauth2/v2.0/authorize";
pub const TOKEN_URL: &str = "https://login.microsoftonline.com/common/oauth2/v2.0/token";

pub const SERVER_URL: &str = "https://graph.microsoft.com/v1.0/";
pub const SERVER_DESCRIPTION: &str = "Core";

/// Build a document containing only the operations in `results`.
///
/// The subset starts with the fixed OAuth2 scheme, its security requirement
/// and the production server. Each path keeps the source path item's
/// summary, description and shared parameters. Schemas, parameters and
/// responses the operations refer to are *not* copied here; run
/// [`resolve_closure`](crate::closure::resolve_closure) afterwards.
pub fn build_subset(title: &str, version: &str, results: &[SearchResult<'_>]) -> OpenApiSpec {
    let mut components = Components::default();
    components.security_schemes.insert(
        SECURITY_SCHEME_ID.to_string(),
        SecurityScheme::authorization_code(AUTHORIZATION_URL, TOKEN_URL),
    );

    let mut paths: IndexMap<String, PathItem> = IndexMap::new();
    for result in results {
        let item = paths
            .entry(result.path.clone())
            .or_insert_with(|| shared_part(result.path_item));
        // A repeated (path, method) pair keeps the later operation.
        item.set_operation(result.method, result.operation.clone());
    }

    OpenApiSpec {
        openapi: SUBSET_OPENAPI_VERSION.to_string(),
        info: Info::new(title, version),
        servers: vec![Server::new(SERVER_URL, SERVER_DESCRIPTION)],
        paths,
        components: Some(components),
        tags: Vec::new(),
        security: vec![SecurityRequirement::from([(
            SECURITY_SCHEME_ID.to_string(),
            Vec::new(),
        )])],
        extra: IndexMap::new(),
    }
}

/// `item` without its operations.
fn shared_part(item: &PathItem) -> PathItem {
    PathItem {
        summary: item.summary.clone(),
        description: item.description.clone(),
        parameters: item.parameters.clone(),
        extra: item.extra.clone(),
        ..PathItem::default()
    }
}

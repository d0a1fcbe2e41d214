//! Request handling: select, subset, close over references, normalize,
//! serialize.

use log::info;

use crate::closure::resolve_closure;
use crate::error::{RequestError, SliceError, SourceError};
use crate::index::{build_index, render_markdown};
use crate::normalize::normalize;
use crate::parse::spec::OpenApiSpec;
use crate::search::search;
use crate::select::{Selector, Style};
use crate::source::{DocumentCache, DocumentSource};
use crate::subset::build_subset;
use crate::write::{self, Dialect, Syntax};

/// One slice request, with filters as received (comma-separated lists).
#[derive(Debug, Clone)]
pub struct SliceRequest {
    pub variant: String,
    pub operation_ids: Option<String>,
    pub tags: Option<String>,
    pub dialect: Dialect,
    pub syntax: Syntax,
    pub style: Style,
    pub title: String,
}

impl Default for SliceRequest {
    fn default() -> Self {
        Self {
            variant: "v1.0".to_string(),
            operation_ids: None,
            tags: None,
            dialect: Dialect::V2,
            syntax: Syntax::Yaml,
            style: Style::Plain,
            title: "Partial Graph API".to_string(),
        }
    }
}

impl SliceRequest {
    pub fn selector(&self) -> Result<Selector, RequestError> {
        Selector::from_filters(self.operation_ids.as_deref(), self.tags.as_deref())
    }
}

/// Build the subset document for `selector` out of `source`. The source is
/// only read; everything in the result is an independent copy.
pub fn slice_document(
    source: &OpenApiSpec,
    selector: &Selector,
    request: &SliceRequest,
) -> OpenApiSpec {
    let results = search(source, |op| selector.matches(op));
    let mut subset = build_subset(&request.title, &request.variant, &results);
    let closure = resolve_closure(source, &mut subset);
    if request.style.restricts_unions() {
        normalize(&mut subset);
    }
    info!(
        "sliced '{}': {} operations, {} definitions in {} passes, {} unresolved",
        request.variant,
        results.len(),
        closure.added,
        closure.passes,
        closure.missing.len()
    );
    subset
}

/// Serve a slice request end to end. The selector is validated before the
/// source document is touched.
pub fn slice<S: DocumentSource>(
    cache: &DocumentCache<S>,
    request: &SliceRequest,
) -> Result<String, SliceError> {
    let selector = request.selector()?;
    let source = cache.get(&request.variant)?;
    let subset = slice_document(&source, &selector, request);
    Ok(write::write(&subset, request.dialect, request.syntax)?)
}

/// The whole source document with unions collapsed. The cached copy is left
/// as loaded.
pub fn full_document<S: DocumentSource>(
    cache: &DocumentCache<S>,
    variant: &str,
) -> Result<OpenApiSpec, SourceError> {
    let source = cache.get(variant)?;
    let mut document = OpenApiSpec::clone(&source);
    let report = normalize(&mut document);
    info!(
        "normalized full '{variant}': {} unions collapsed, {} operations renamed",
        report.unions_collapsed, report.operations_renamed
    );
    Ok(document)
}

/// Markdown tag index of a source document.
pub fn operation_index<S: DocumentSource>(
    cache: &DocumentCache<S>,
    variant: &str,
    heading: &str,
) -> Result<String, SourceError> {
    let source = cache.get(variant)?;
    Ok(render_markdown(&build_index(&source), heading))
}

use std::fmt::Write as _;

use indexmap::IndexMap;

use crate::parse::operation::{HttpMethod, Operation};
use crate::parse::spec::OpenApiSpec;
use crate::walk::{self, Node, Visitor, Walk, WalkContext};

/// Heading used by [`render_markdown`] when none is configured.
pub const DEFAULT_HEADING: &str = "OpenAPI Operations for Microsoft Graph";

/// An operation listed under a tag.
#[derive(Debug, Clone)]
pub struct IndexedOperation<'a> {
    pub path: String,
    pub method: HttpMethod,
    pub operation: &'a Operation,
}

impl IndexedOperation<'_> {
    /// The operation id, or `METHOD path` when the operation has none.
    pub fn label(&self) -> String {
        match self.operation.operation_id {
            Some(ref id) => id.clone(),
            None => format!("{} {}", self.method, self.path),
        }
    }
}

/// Operations grouped by tag name, both in first-encounter order.
pub type OperationIndex<'a> = IndexMap<String, Vec<IndexedOperation<'a>>>;

#[derive(Default)]
struct IndexBuilder<'a> {
    index: OperationIndex<'a>,
}

impl<'a> Visitor<'a> for IndexBuilder<'a> {
    fn visit(&mut self, node: Node<'a>, cx: &WalkContext) -> Walk {
        match node {
            Node::Operation(operation) => {
                if let (Some(path), Some(method)) = (&cx.path, cx.method) {
                    // Untagged operations are left out.
                    for tag in &operation.tags {
                        self.index
                            .entry(tag.clone())
                            .or_default()
                            .push(IndexedOperation {
                                path: path.clone(),
                                method,
                                operation,
                            });
                    }
                }
                Walk::Skip
            }
            Node::Components(_) => Walk::Skip,
            _ => Walk::Continue,
        }
    }
}

/// Group every operation in `spec` under each of its tags.
pub fn build_index(spec: &OpenApiSpec) -> OperationIndex<'_> {
    let mut builder = IndexBuilder::default();
    walk::walk(spec, &mut builder);
    builder.index
}

/// Render the index as a markdown listing: one section per tag, one bullet
/// per operation.
pub fn render_markdown(index: &OperationIndex<'_>, heading: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {heading}");
    let _ = writeln!(out);
    for (tag, operations) in index {
        let _ = writeln!(out, "## {tag}");
        for entry in operations {
            let _ = writeln!(out, "- {}", entry.label());
        }
    }
    out
}

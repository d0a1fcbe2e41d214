use crate::parse::operation::{HttpMethod, Operation, PathItem};
use crate::parse::spec::OpenApiSpec;
use crate::walk::{self, Node, Visitor, Walk, WalkContext};

/// An operation found by [`search`], with the coordinates it was found at.
#[derive(Debug, Clone)]
pub struct SearchResult<'a> {
    pub path: String,
    pub method: HttpMethod,
    pub operation: &'a Operation,
    /// The path item holding the operation, for its shared parameters.
    pub path_item: &'a PathItem,
}

/// Collects every operation accepted by a predicate.
pub struct OperationSearch<'a, P> {
    predicate: P,
    current: Option<&'a PathItem>,
    results: Vec<SearchResult<'a>>,
}

impl<'a, P> OperationSearch<'a, P>
where
    P: Fn(&Operation) -> bool,
{
    pub fn new(predicate: P) -> Self {
        Self {
            predicate,
            current: None,
            results: Vec::new(),
        }
    }

    pub fn into_results(self) -> Vec<SearchResult<'a>> {
        self.results
    }
}

impl<'a, P> Visitor<'a> for OperationSearch<'a, P>
where
    P: Fn(&Operation) -> bool,
{
    fn visit(&mut self, node: Node<'a>, cx: &WalkContext) -> Walk {
        match node {
            Node::PathItem(item) => {
                self.current = Some(item);
                Walk::Continue
            }
            Node::Operation(operation) => {
                if let (Some(path), Some(method), Some(path_item)) =
                    (&cx.path, cx.method, self.current)
                {
                    if (self.predicate)(operation) {
                        self.results.push(SearchResult {
                            path: path.clone(),
                            method,
                            operation,
                            path_item,
                        });
                    }
                }
                // Nothing below an operation can be another operation.
                Walk::Skip
            }
            Node::Components(_) => Walk::Skip,
            _ => Walk::Continue,
        }
    }
}

/// Find every operation in `spec` that satisfies `predicate`, in document order.
pub fn search<'a, P>(spec: &'a OpenApiSpec, predicate: P) -> Vec<SearchResult<'a>>
where
    P: Fn(&Operation) -> bool,
{
    let mut visitor = OperationSearch::new(predicate);
    walk::walk(spec, &mut visitor);
    visitor.into_results()
}

//! Depth-first traversal over an OpenAPI document.
//!
//! The walker emits one [`Node`] per element in pre-order and hands it to a
//! [`Visitor`]. Visitors pattern-match on the node variant they care about
//! and return [`Walk::Continue`] for everything else. A `$ref` is emitted as a
//! [`Node::Reference`] and never followed, so cyclic component graphs cannot
//! loop the walker; visitors that chase references keep their own seen-set.

use indexmap::IndexMap;

use crate::parse::components::Components;
use crate::parse::body::{HeaderOrRef, MediaType, RequestBodyOrRef, ResponseOrRef, Responses};
use crate::parse::operation::{HttpMethod, Operation, PathItem};
use crate::parse::parameter::ParameterOrRef;
use crate::parse::schema::{AdditionalProperties, SchemaOrRef};
use crate::parse::spec::OpenApiSpec;

/// Discriminant of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Paths,
    PathItem,
    Operation,
    Parameter,
    RequestBody,
    Responses,
    Response,
    Header,
    MediaType,
    Schema,
    Components,
    Reference,
}

/// A borrowed element of the document tree.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Document(&'a OpenApiSpec),
    Paths(&'a IndexMap<String, PathItem>),
    /// The operation collection of one path.
    PathItem(&'a PathItem),
    Operation(&'a Operation),
    Parameter(&'a ParameterOrRef),
    RequestBody(&'a RequestBodyOrRef),
    Responses(&'a Responses),
    Response(&'a ResponseOrRef),
    Header(&'a HeaderOrRef),
    MediaType(&'a MediaType),
    Schema(&'a SchemaOrRef),
    Components(&'a Components),
    /// The raw `$ref` string of a reference node.
    Reference(&'a str),
}

impl Node<'_> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Document(_) => NodeKind::Document,
            Node::Paths(_) => NodeKind::Paths,
            Node::PathItem(_) => NodeKind::PathItem,
            Node::Operation(_) => NodeKind::Operation,
            Node::Parameter(_) => NodeKind::Parameter,
            Node::RequestBody(_) => NodeKind::RequestBody,
            Node::Responses(_) => NodeKind::Responses,
            Node::Response(_) => NodeKind::Response,
            Node::Header(_) => NodeKind::Header,
            Node::MediaType(_) => NodeKind::MediaType,
            Node::Schema(_) => NodeKind::Schema,
            Node::Components(_) => NodeKind::Components,
            Node::Reference(_) => NodeKind::Reference,
        }
    }
}

/// A mutably borrowed element of the document tree.
#[derive(Debug)]
pub enum NodeMut<'a> {
    Document(&'a mut OpenApiSpec),
    PathItem(&'a mut PathItem),
    Operation(&'a mut Operation),
    Parameter(&'a mut ParameterOrRef),
    RequestBody(&'a mut RequestBodyOrRef),
    Response(&'a mut ResponseOrRef),
    Header(&'a mut HeaderOrRef),
    MediaType(&'a mut MediaType),
    Schema(&'a mut SchemaOrRef),
}

impl NodeMut<'_> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeMut::Document(_) => NodeKind::Document,
            NodeMut::PathItem(_) => NodeKind::PathItem,
            NodeMut::Operation(_) => NodeKind::Operation,
            NodeMut::Parameter(_) => NodeKind::Parameter,
            NodeMut::RequestBody(_) => NodeKind::RequestBody,
            NodeMut::Response(_) => NodeKind::Response,
            NodeMut::Header(_) => NodeKind::Header,
            NodeMut::MediaType(_) => NodeKind::MediaType,
            NodeMut::Schema(_) => NodeKind::Schema,
        }
    }
}

/// Whether the walker should descend into the children of a visited node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Continue,
    Skip,
}

/// Location of the node being visited. Only set while inside `paths`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkContext {
    pub path: Option<String>,
    pub method: Option<HttpMethod>,
}

pub trait Visitor<'a> {
    fn visit(&mut self, node: Node<'a>, cx: &WalkContext) -> Walk;
}

pub trait VisitorMut {
    fn visit_mut(&mut self, node: NodeMut<'_>, cx: &WalkContext) -> Walk;
}

/// Walk `spec` in pre-order, calling `visitor` at every node.
pub fn walk<'a, V: Visitor<'a>>(spec: &'a OpenApiSpec, visitor: &mut V) {
    let mut walker = Walker {
        visitor,
        cx: WalkContext::default(),
    };
    walker.document(spec);
}

/// Walk `spec` in pre-order with mutable access to each node.
pub fn walk_mut<V: VisitorMut>(spec: &mut OpenApiSpec, visitor: &mut V) {
    let mut walker = WalkerMut {
        visitor,
        cx: WalkContext::default(),
    };
    walker.document(spec);
}

struct Walker<'v, V> {
    visitor: &'v mut V,
    cx: WalkContext,
}

impl<'a, V: Visitor<'a>> Walker<'_, V> {
    fn enter(&mut self, node: Node<'a>) -> bool {
        self.visitor.visit(node, &self.cx) == Walk::Continue
    }

    fn document(&mut self, spec: &'a OpenApiSpec) {
        if !self.enter(Node::Document(spec)) {
            return;
        }
        if self.enter(Node::Paths(&spec.paths)) {
            for (path, item) in &spec.paths {
                self.cx.path = Some(path.clone());
                self.path_item(item);
            }
        }
        self.cx = WalkContext::default();
        if let Some(ref components) = spec.components {
            self.components(components);
        }
    }

    fn path_item(&mut self, item: &'a PathItem) {
        self.cx.method = None;
        if !self.enter(Node::PathItem(item)) {
            return;
        }
        for param in &item.parameters {
            self.parameter(param);
        }
        for (method, op) in item.operations() {
            self.cx.method = Some(method);
            self.operation(op);
        }
        self.cx.method = None;
    }

    fn operation(&mut self, op: &'a Operation) {
        if !self.enter(Node::Operation(op)) {
            return;
        }
        for param in &op.parameters {
            self.parameter(param);
        }
        if let Some(ref body) = op.request_body {
            self.request_body(body);
        }
        self.responses(&op.responses);
    }

    fn parameter(&mut self, param: &'a ParameterOrRef) {
        if !self.enter(Node::Parameter(param)) {
            return;
        }
        match param {
            ParameterOrRef::Ref { ref_path } => self.reference(ref_path),
            ParameterOrRef::Parameter(p) => {
                if let Some(ref schema) = p.schema {
                    self.schema(schema);
                }
                self.content(&p.content);
            }
        }
    }

    fn request_body(&mut self, body: &'a RequestBodyOrRef) {
        if !self.enter(Node::RequestBody(body)) {
            return;
        }
        match body {
            RequestBodyOrRef::Ref { ref_path } => self.reference(ref_path),
            RequestBodyOrRef::RequestBody(rb) => self.content(&rb.content),
        }
    }

    fn responses(&mut self, responses: &'a Responses) {
        if !self.enter(Node::Responses(responses)) {
            return;
        }
        for response in responses.values() {
            self.response(response);
        }
    }

    fn response(&mut self, response: &'a ResponseOrRef) {
        if !self.enter(Node::Response(response)) {
            return;
        }
        match response {
            ResponseOrRef::Ref { ref_path } => self.reference(ref_path),
            ResponseOrRef::Response(r) => {
                self.content(&r.content);
                for header in r.headers.values() {
                    self.header(header);
                }
            }
        }
    }

    fn header(&mut self, header: &'a HeaderOrRef) {
        if !self.enter(Node::Header(header)) {
            return;
        }
        match header {
            HeaderOrRef::Ref { ref_path } => self.reference(ref_path),
            HeaderOrRef::Header(h) => {
                if let Some(ref schema) = h.schema {
                    self.schema(schema);
                }
                self.content(&h.content);
            }
        }
    }

    fn content(&mut self, content: &'a IndexMap<String, MediaType>) {
        for media_type in content.values() {
            if self.enter(Node::MediaType(media_type)) {
                if let Some(ref schema) = media_type.schema {
                    self.schema(schema);
                }
            }
        }
    }

    fn schema(&mut self, schema: &'a SchemaOrRef) {
        if !self.enter(Node::Schema(schema)) {
            return;
        }
        let s = match schema {
            SchemaOrRef::Ref { ref_path } => return self.reference(ref_path),
            SchemaOrRef::Schema(s) => s,
        };
        for prop in s.properties.values() {
            self.schema(prop);
        }
        if let Some(ref items) = s.items {
            self.schema(items);
        }
        for alt in s.all_of.iter().chain(&s.one_of).chain(&s.any_of) {
            self.schema(alt);
        }
        if let Some(AdditionalProperties::Schema(ref extra)) = s.additional_properties {
            self.schema(extra);
        }
        if let Some(ref not) = s.not {
            self.schema(not);
        }
    }

    fn components(&mut self, components: &'a Components) {
        if !self.enter(Node::Components(components)) {
            return;
        }
        for schema in components.schemas.values() {
            self.schema(schema);
        }
        for param in components.parameters.values() {
            self.parameter(param);
        }
        for body in components.request_bodies.values() {
            self.request_body(body);
        }
        for response in components.responses.values() {
            self.response(response);
        }
        for header in components.headers.values() {
            self.header(header);
        }
    }

    fn reference(&mut self, ref_path: &'a str) {
        self.enter(Node::Reference(ref_path));
    }
}

struct WalkerMut<'v, V> {
    visitor: &'v mut V,
    cx: WalkContext,
}

impl<V: VisitorMut> WalkerMut<'_, V> {
    fn enter(&mut self, node: NodeMut<'_>) -> bool {
        self.visitor.visit_mut(node, &self.cx) == Walk::Continue
    }

    fn document(&mut self, spec: &mut OpenApiSpec) {
        if !self.enter(NodeMut::Document(&mut *spec)) {
            return;
        }
        for (path, item) in spec.paths.iter_mut() {
            self.cx.path = Some(path.clone());
            self.path_item(item);
        }
        self.cx = WalkContext::default();
        if let Some(ref mut components) = spec.components {
            for schema in components.schemas.values_mut() {
                self.schema(schema);
            }
            for param in components.parameters.values_mut() {
                self.parameter(param);
            }
            for body in components.request_bodies.values_mut() {
                self.request_body(body);
            }
            for response in components.responses.values_mut() {
                self.response(response);
            }
            for header in components.headers.values_mut() {
                self.header(header);
            }
        }
    }

    fn path_item(&mut self, item: &mut PathItem) {
        self.cx.method = None;
        if !self.enter(NodeMut::PathItem(&mut *item)) {
            return;
        }
        for param in item.parameters.iter_mut() {
            self.parameter(param);
        }
        for (method, op) in item.operations_mut() {
            self.cx.method = Some(method);
            self.operation(op);
        }
        self.cx.method = None;
    }

    fn operation(&mut self, op: &mut Operation) {
        if !self.enter(NodeMut::Operation(&mut *op)) {
            return;
        }
        for param in op.parameters.iter_mut() {
            self.parameter(param);
        }
        if let Some(ref mut body) = op.request_body {
            self.request_body(body);
        }
        for response in op.responses.values_mut() {
            self.response(response);
        }
    }

    fn parameter(&mut self, param: &mut ParameterOrRef) {
        if !self.enter(NodeMut::Parameter(&mut *param)) {
            return;
        }
        if let ParameterOrRef::Parameter(p) = param {
            if let Some(ref mut schema) = p.schema {
                self.schema(schema);
            }
            self.content(&mut p.content);
        }
    }

    fn request_body(&mut self, body: &mut RequestBodyOrRef) {
        if !self.enter(NodeMut::RequestBody(&mut *body)) {
            return;
        }
        if let RequestBodyOrRef::RequestBody(rb) = body {
            self.content(&mut rb.content);
        }
    }

    fn response(&mut self, response: &mut ResponseOrRef) {
        if !self.enter(NodeMut::Response(&mut *response)) {
            return;
        }
        if let ResponseOrRef::Response(r) = response {
            self.content(&mut r.content);
            for header in r.headers.values_mut() {
                self.header(header);
            }
        }
    }

    fn header(&mut self, header: &mut HeaderOrRef) {
        if !self.enter(NodeMut::Header(&mut *header)) {
            return;
        }
        if let HeaderOrRef::Header(h) = header {
            if let Some(ref mut schema) = h.schema {
                self.schema(schema);
            }
            self.content(&mut h.content);
        }
    }

    fn content(&mut self, content: &mut IndexMap<String, MediaType>) {
        for media_type in content.values_mut() {
            if self.enter(NodeMut::MediaType(&mut *media_type)) {
                if let Some(ref mut schema) = media_type.schema {
                    self.schema(schema);
                }
            }
        }
    }

    fn schema(&mut self, schema: &mut SchemaOrRef) {
        if !self.enter(NodeMut::Schema(&mut *schema)) {
            return;
        }
        let SchemaOrRef::Schema(s) = schema else {
            return;
        };
        for prop in s.properties.values_mut() {
            self.schema(prop);
        }
        if let Some(ref mut items) = s.items {
            self.schema(items);
        }
        for alt in s
            .all_of
            .iter_mut()
            .chain(s.one_of.iter_mut())
            .chain(s.any_of.iter_mut())
        {
            self.schema(alt);
        }
        if let Some(AdditionalProperties::Schema(ref mut extra)) = s.additional_properties {
            self.schema(extra);
        }
        if let Some(ref mut not) = s.not {
            self.schema(not);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    const DOC: &str = r##"
openapi: 3.0.1
info:
  title: Walk
  version: "1"
paths:
  /users:
    get:
      operationId: users.ListUser
      parameters:
        - $ref: "#/components/parameters/top"
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: "#/components/schemas/user"
    post:
      operationId: users.CreateUser
      responses:
        default:
          $ref: "#/components/responses/error"
components:
  schemas:
    user:
      type: object
      properties:
        manager:
          $ref: "#/components/schemas/user"
  parameters:
    top:
      name: $top
      in: query
      schema:
        type: integer
"##;

    #[derive(Default)]
    struct Recorder {
        kinds: Vec<NodeKind>,
        refs: Vec<String>,
        locations: Vec<(Option<String>, Option<HttpMethod>)>,
    }

    impl<'a> Visitor<'a> for Recorder {
        fn visit(&mut self, node: Node<'a>, cx: &WalkContext) -> Walk {
            self.kinds.push(node.kind());
            match node {
                Node::Reference(r) => self.refs.push(r.to_string()),
                Node::Operation(_) => self.locations.push((cx.path.clone(), cx.method)),
                _ => {}
            }
            Walk::Continue
        }
    }

    #[test]
    fn test_visits_every_reference_once() {
        let spec = parse::from_yaml(DOC).unwrap();
        let mut rec = Recorder::default();
        walk(&spec, &mut rec);
        assert_eq!(
            rec.refs,
            vec![
                "#/components/parameters/top",
                "#/components/schemas/user",
                "#/components/responses/error",
                "#/components/schemas/user",
            ]
        );
    }

    #[test]
    fn test_reaches_headers_parameter_content_and_not() {
        let doc = r##"
openapi: 3.0.1
info:
  title: Walk
  version: "1"
paths:
  /items:
    get:
      parameters:
        - name: where
          in: query
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/condition"
      responses:
        "200":
          description: ok
          headers:
            X-Page:
              schema:
                $ref: "#/components/schemas/pageInfo"
components:
  schemas:
    condition:
      not:
        $ref: "#/components/schemas/negated"
  headers:
    trace:
      $ref: "#/components/headers/other"
"##;
        let spec = parse::from_yaml(doc).unwrap();
        let mut rec = Recorder::default();
        walk(&spec, &mut rec);
        assert_eq!(
            rec.refs,
            vec![
                "#/components/schemas/condition",
                "#/components/schemas/pageInfo",
                "#/components/schemas/negated",
                "#/components/headers/other",
            ]
        );
        assert_eq!(rec.kinds.iter().filter(|k| **k == NodeKind::Header).count(), 2);
    }

    #[test]
    fn test_context_tracks_path_and_method() {
        let spec = parse::from_yaml(DOC).unwrap();
        let mut rec = Recorder::default();
        walk(&spec, &mut rec);
        assert_eq!(
            rec.locations,
            vec![
                (Some("/users".to_string()), Some(HttpMethod::Get)),
                (Some("/users".to_string()), Some(HttpMethod::Post)),
            ]
        );
    }

    #[test]
    fn test_pre_order_starts_at_document() {
        let spec = parse::from_yaml(DOC).unwrap();
        let mut rec = Recorder::default();
        walk(&spec, &mut rec);
        assert_eq!(
            &rec.kinds[..4],
            &[
                NodeKind::Document,
                NodeKind::Paths,
                NodeKind::PathItem,
                NodeKind::Operation
            ]
        );
        assert!(rec.kinds.contains(&NodeKind::Components));
    }

    struct SkipOperations(usize);

    impl<'a> Visitor<'a> for SkipOperations {
        fn visit(&mut self, node: Node<'a>, _cx: &WalkContext) -> Walk {
            match node {
                Node::Operation(_) => Walk::Skip,
                Node::Reference(_) => {
                    self.0 += 1;
                    Walk::Continue
                }
                _ => Walk::Continue,
            }
        }
    }

    #[test]
    fn test_skip_prunes_children() {
        let spec = parse::from_yaml(DOC).unwrap();
        let mut v = SkipOperations(0);
        walk(&spec, &mut v);
        // Only the self-reference inside the `user` component remains.
        assert_eq!(v.0, 1);
    }

    struct Retitle;

    impl VisitorMut for Retitle {
        fn visit_mut(&mut self, node: NodeMut<'_>, cx: &WalkContext) -> Walk {
            if let NodeMut::Operation(op) = node {
                op.summary = Some(format!("{} {}", cx.method.unwrap(), cx.path.as_deref().unwrap()));
            }
            Walk::Continue
        }
    }

    #[test]
    fn test_walk_mut_edits_operations() {
        let mut spec = parse::from_yaml(DOC).unwrap();
        walk_mut(&mut spec, &mut Retitle);
        let item = &spec.paths["/users"];
        assert_eq!(item.get.as_ref().unwrap().summary.as_deref(), Some("GET /users"));
        assert_eq!(item.post.as_ref().unwrap().summary.as_deref(), Some("POST /users"));
    }
}

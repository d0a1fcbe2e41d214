//! Collapses `anyOf` unions for consumers that cannot parse them, and
//! rewrites dotted operation ids into a form their code generators accept.
//!
//! A union keeps its first alternative. A reference alternative replaces the
//! whole node; an inline alternative contributes only its `type`. Within a
//! property map, a property that has properties of its own is descended into
//! but its own `anyOf` is left alone.

use indexmap::IndexMap;
use log::debug;

use crate::parse::parameter::ParameterOrRef;
use crate::parse::schema::SchemaOrRef;
use crate::parse::spec::OpenApiSpec;
use crate::walk::{self, NodeMut, VisitorMut, Walk, WalkContext};

/// Separator between operation id segments.
pub const SEPARATOR: char = '.';
/// Replacement for the last separator of an operation id.
pub const SUBSTITUTE: char = '_';

/// What a [`normalize`] run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub unions_collapsed: usize,
    pub operations_renamed: usize,
}

/// Rewrite `spec` in place. Running it a second time changes nothing.
///
/// Callers holding a shared document must normalize a clone.
pub fn normalize(spec: &mut OpenApiSpec) -> NormalizeReport {
    let mut normalizer = UnionNormalizer::default();
    walk::walk_mut(spec, &mut normalizer);
    debug!(
        "normalized {} unions, renamed {} operations",
        normalizer.report.unions_collapsed, normalizer.report.operations_renamed
    );
    normalizer.report
}

#[derive(Default)]
struct UnionNormalizer {
    report: NormalizeReport,
}

impl VisitorMut for UnionNormalizer {
    fn visit_mut(&mut self, node: NodeMut<'_>, _cx: &WalkContext) -> Walk {
        match node {
            NodeMut::Operation(op) => {
                if let Some(renamed) = op.operation_id.as_deref().and_then(rewrite_operation_id) {
                    op.operation_id = Some(renamed);
                    self.report.operations_renamed += 1;
                }
                Walk::Continue
            }
            NodeMut::Parameter(ParameterOrRef::Parameter(param)) => {
                if let Some(ref mut schema) = param.schema {
                    self.schema(schema);
                }
                for media_type in param.content.values_mut() {
                    if let Some(ref mut schema) = media_type.schema {
                        self.schema(schema);
                    }
                }
                Walk::Skip
            }
            NodeMut::MediaType(media_type) => {
                if let Some(ref mut schema) = media_type.schema {
                    self.schema(schema);
                }
                Walk::Skip
            }
            // Component and header schemas; the rest are handled above.
            NodeMut::Schema(schema) => {
                self.schema(schema);
                Walk::Skip
            }
            _ => Walk::Continue,
        }
    }
}

impl UnionNormalizer {
    /// A schema at the root of a body, parameter or component.
    fn schema(&mut self, node: &mut SchemaOrRef) {
        self.collapse(node);
        if let SchemaOrRef::Schema(schema) = node {
            self.items(schema);
            self.properties(&mut schema.properties);
        }
    }

    fn properties(&mut self, properties: &mut IndexMap<String, SchemaOrRef>) {
        for property in properties.values_mut() {
            if let SchemaOrRef::Schema(schema) = property {
                if !schema.properties.is_empty() {
                    self.properties(&mut schema.properties);
                    continue;
                }
            }
            self.collapse(property);
            if let SchemaOrRef::Schema(schema) = property {
                self.items(schema);
            }
        }
    }

    fn items(&mut self, schema: &mut crate::parse::schema::Schema) {
        if schema.is_array() {
            if let Some(ref mut items) = schema.items {
                self.collapse(items);
            }
        }
    }

    fn collapse(&mut self, node: &mut SchemaOrRef) {
        if collapse_union(node) {
            self.report.unions_collapsed += 1;
        }
    }
}

/// Replace a non-empty `anyOf` with its first alternative. Returns whether
/// the node changed.
pub fn collapse_union(node: &mut SchemaOrRef) -> bool {
    let SchemaOrRef::Schema(schema) = node else {
        return false;
    };
    if schema.any_of.is_empty() {
        return false;
    }
    let alternatives = std::mem::take(&mut schema.any_of);
    match alternatives.into_iter().next() {
        Some(SchemaOrRef::Ref { ref_path }) => *node = SchemaOrRef::Ref { ref_path },
        Some(SchemaOrRef::Schema(first)) => schema.schema_type = first.schema_type,
        None => {}
    }
    true
}

/// Replace the last separator of `id` with the substitute. Returns `None`
/// when there is no separator, or when the text after the last separator
/// already holds the substitute.
///
/// The second case is what makes [`normalize`] idempotent: `a.b.c` becomes
/// `a.b_c`, which is then left alone. It also means an id such as
/// `me.Get_User` is kept as is on the first pass, since it cannot be told
/// apart from one that was already rewritten.
pub fn rewrite_operation_id(id: &str) -> Option<String> {
    let pos = id.rfind(SEPARATOR)?;
    let (head, tail) = (&id[..pos], &id[pos + SEPARATOR.len_utf8()..]);
    if tail.contains(SUBSTITUTE) {
        return None;
    }
    Some(format!("{head}{SUBSTITUTE}{tail}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::schema::{Schema, SchemaType, TypeSet};

    fn union(alternatives: Vec<SchemaOrRef>) -> SchemaOrRef {
        SchemaOrRef::inline(Schema {
            any_of: alternatives,
            ..Schema::default()
        })
    }

    #[test]
    fn test_rewrites_last_separator_only() {
        assert_eq!(
            rewrite_operation_id("users.user.ListOwnedItems").as_deref(),
            Some("users.user_ListOwnedItems")
        );
        assert_eq!(rewrite_operation_id("me.GetUser").as_deref(), Some("me_GetUser"));
        assert_eq!(rewrite_operation_id("GetUser"), None);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let once = rewrite_operation_id("users.user.ListOwnedItems").unwrap();
        assert_eq!(rewrite_operation_id(&once), None);
        let single = rewrite_operation_id("me.GetUser").unwrap();
        assert_eq!(rewrite_operation_id(&single), None);
    }

    #[test]
    fn test_substitute_in_last_segment_blocks_rewrite() {
        assert_eq!(rewrite_operation_id("me.Get_User"), None);
        assert_eq!(
            rewrite_operation_id("me_user.GetUser").as_deref(),
            Some("me_user_GetUser")
        );
    }

    #[test]
    fn test_reference_alternative_replaces_node() {
        let mut node = union(vec![
            SchemaOrRef::reference("#/components/schemas/X"),
            SchemaOrRef::reference("#/components/schemas/Y"),
        ]);
        assert!(collapse_union(&mut node));
        assert_eq!(node, SchemaOrRef::reference("#/components/schemas/X"));
    }

    #[test]
    fn test_inline_alternative_contributes_type() {
        let mut node = union(vec![
            SchemaOrRef::inline(Schema::of_type(SchemaType::String)),
            SchemaOrRef::reference("#/components/schemas/Y"),
        ]);
        assert!(collapse_union(&mut node));
        let schema = node.as_schema().unwrap();
        assert_eq!(schema.schema_type, Some(TypeSet::Single(SchemaType::String)));
        assert!(schema.any_of.is_empty());
    }

    #[test]
    fn test_plain_schema_untouched() {
        let mut node = SchemaOrRef::inline(Schema::of_type(SchemaType::Integer));
        assert!(!collapse_union(&mut node));
        let mut reference = SchemaOrRef::reference("#/components/schemas/X");
        assert!(!collapse_union(&mut reference));
    }

    #[test]
    fn test_nested_object_property_keeps_its_union() {
        let nested = SchemaOrRef::inline(Schema {
            properties: IndexMap::from([(
                "inner".to_string(),
                union(vec![SchemaOrRef::reference("#/components/schemas/Inner")]),
            )]),
            any_of: vec![SchemaOrRef::reference("#/components/schemas/Outer")],
            ..Schema::default()
        });
        let mut root = SchemaOrRef::inline(Schema {
            properties: IndexMap::from([("nested".to_string(), nested)]),
            ..Schema::of_type(SchemaType::Object)
        });

        let mut normalizer = UnionNormalizer::default();
        normalizer.schema(&mut root);

        let nested = root.as_schema().unwrap().properties["nested"].as_schema().unwrap();
        assert_eq!(nested.any_of.len(), 1, "property with sub-properties keeps anyOf");
        assert_eq!(
            nested.properties["inner"],
            SchemaOrRef::reference("#/components/schemas/Inner")
        );
        assert_eq!(normalizer.report.unions_collapsed, 1);
    }

    #[test]
    fn test_array_property_items_collapse() {
        let list = SchemaOrRef::inline(Schema {
            items: Some(Box::new(union(vec![SchemaOrRef::reference(
                "#/components/schemas/Item",
            )]))),
            ..Schema::of_type(SchemaType::Array)
        });
        let mut root = SchemaOrRef::inline(Schema {
            properties: IndexMap::from([("value".to_string(), list)]),
            ..Schema::of_type(SchemaType::Object)
        });

        UnionNormalizer::default().schema(&mut root);

        let list = root.as_schema().unwrap().properties["value"].as_schema().unwrap();
        assert_eq!(
            list.items.as_deref(),
            Some(&SchemaOrRef::reference("#/components/schemas/Item"))
        );
    }
}

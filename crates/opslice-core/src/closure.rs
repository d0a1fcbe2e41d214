//! Reference closure: copy every component a subset transitively refers to.
//!
//! Each pass walks the target, records references whose identifier is not yet
//! in the target's registry of that kind, and merges them in. A merged
//! definition is walked on the next pass, so its own references are found
//! then. Registries only grow and an existing key is never rewritten, which
//! bounds the number of passes by the number of source components.

use std::collections::BTreeSet;

use log::{debug, warn};

use crate::parse::components::Components;
use crate::parse::reference::{ComponentKind, Reference};
use crate::parse::spec::OpenApiSpec;
use crate::walk::{self, Node, Visitor, Walk, WalkContext};

/// Outcome of [`resolve_closure`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClosureReport {
    /// Walks performed, including the final one that found nothing new.
    pub passes: usize,
    /// Definitions added to the target.
    pub added: usize,
    /// References with no definition in the source, as `$ref` strings.
    pub missing: BTreeSet<String>,
}

/// Collects definitions for references the target cannot resolve yet.
struct ReferenceCollector<'a> {
    source: Option<&'a Components>,
    target: Option<&'a Components>,
    found: Components,
    missing: BTreeSet<String>,
}

impl<'a> ReferenceCollector<'a> {
    fn new(source: &'a OpenApiSpec, target: &'a OpenApiSpec) -> Self {
        Self {
            source: source.components.as_ref(),
            target: target.components.as_ref(),
            found: Components::default(),
            missing: BTreeSet::new(),
        }
    }

    fn collect(&mut self, ref_path: &str) {
        let Ok(reference) = Reference::parse(ref_path) else {
            debug!("ignoring non-local reference {ref_path}");
            return;
        };
        let Reference { kind, id } = reference;
        if kind == ComponentKind::SecuritySchemes
            || self.target.is_some_and(|c| c.contains(kind, id))
            || self.found.contains(kind, id)
        {
            return;
        }

        let copied = self.source.is_some_and(|source| {
            copy_definition(source, &mut self.found, kind, id)
        });
        if !copied {
            self.missing.insert(ref_path.to_string());
        }
    }
}

impl<'a> Visitor<'a> for ReferenceCollector<'a> {
    fn visit(&mut self, node: Node<'a>, _cx: &WalkContext) -> Walk {
        if let Node::Reference(ref_path) = node {
            self.collect(ref_path);
        }
        Walk::Continue
    }
}

/// Copy the definition `kind`/`id` from `source` into `into`. Returns false
/// when the source has no such definition.
fn copy_definition(source: &Components, into: &mut Components, kind: ComponentKind, id: &str) -> bool {
    match kind {
        ComponentKind::Schemas => copy_entry(&source.schemas, &mut into.schemas, id),
        ComponentKind::Parameters => copy_entry(&source.parameters, &mut into.parameters, id),
        ComponentKind::Responses => copy_entry(&source.responses, &mut into.responses, id),
        ComponentKind::RequestBodies => {
            copy_entry(&source.request_bodies, &mut into.request_bodies, id)
        }
        ComponentKind::Headers => copy_entry(&source.headers, &mut into.headers, id),
        ComponentKind::SecuritySchemes => false,
    }
}

fn copy_entry<T: Clone>(
    from: &indexmap::IndexMap<String, T>,
    into: &mut indexmap::IndexMap<String, T>,
    id: &str,
) -> bool {
    match from.get(id) {
        Some(definition) => {
            into.entry(id.to_string())
                .or_insert_with(|| definition.clone());
            true
        }
        None => false,
    }
}

/// Insert every entry of `from` whose key `into` lacks. Returns how many
/// were inserted; existing keys are left untouched.
fn merge_registry<T>(from: indexmap::IndexMap<String, T>, into: &mut indexmap::IndexMap<String, T>) -> usize {
    let mut inserted = 0;
    for (id, definition) in from {
        if !into.contains_key(&id) {
            into.insert(id, definition);
            inserted += 1;
        }
    }
    inserted
}

fn merge(found: Components, target: &mut Components) -> usize {
    merge_registry(found.schemas, &mut target.schemas)
        + merge_registry(found.parameters, &mut target.parameters)
        + merge_registry(found.responses, &mut target.responses)
        + merge_registry(found.request_bodies, &mut target.request_bodies)
        + merge_registry(found.headers, &mut target.headers)
}

/// Copy into `target.components` every schema, parameter, response, request
/// body and header reachable from `target`, looked up in `source`. Runs to a
/// fixpoint. References missing from `source` are skipped and reported.
pub fn resolve_closure(source: &OpenApiSpec, target: &mut OpenApiSpec) -> ClosureReport {
    let mut report = ClosureReport::default();
    loop {
        let (found, missing) = {
            let mut collector = ReferenceCollector::new(source, target);
            walk::walk(target, &mut collector);
            (collector.found, collector.missing)
        };
        report.passes += 1;
        report.missing.extend(missing);

        let added = merge(found, target.components_mut());
        debug!("closure pass {}: {added} new definitions", report.passes);
        if added == 0 {
            break;
        }
        report.added += added;
    }

    for ref_path in &report.missing {
        warn!("reference {ref_path} has no definition in the source document");
    }
    report
}

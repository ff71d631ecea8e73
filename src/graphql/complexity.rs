//! Document statistics for complexity limiting.
//!
//! Counting convention: a leaf field contributes 1 to the field count and
//! `parent depth + 1` to depth, so `{ health { ok } }` has 2 fields and
//! depth 2. Limit values are tuned against this convention; do not change
//! it to count only non-leaf nesting.

use std::collections::{HashMap, HashSet};

use async_graphql::parser::types::{
    DocumentOperations, ExecutableDocument, FragmentDefinition, Selection, SelectionSet,
};
use async_graphql::{Name, Positioned};

/// Hard cap on the stats walk itself, so a pathologically deep document
/// cannot exhaust the call stack before a limit rule reports it.
const WALK_DEPTH_CAP: usize = 256;

/// Derived per-document statistics. Recomputed per request, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentStats {
    /// Top-level operations in the document as parsed, regardless of which
    /// one `operationName` selects.
    pub operation_count: usize,
    /// Total fields across all operations.
    pub field_count: usize,
    /// Maximum selection depth across all operations.
    pub depth: usize,
}

/// Compute [`DocumentStats`] for a parsed document.
pub fn document_stats(doc: &ExecutableDocument) -> DocumentStats {
    let operations: Vec<_> = match &doc.operations {
        DocumentOperations::Single(op) => vec![op],
        DocumentOperations::Multiple(map) => map.values().collect(),
    };

    let mut field_count = 0;
    let mut depth = 0;
    for operation in &operations {
        let mut visited = HashSet::new();
        let stats = selection_stats(
            &operation.node.selection_set.node,
            0,
            &doc.fragments,
            &mut visited,
        );
        field_count += stats.fields;
        depth = depth.max(stats.depth);
    }

    DocumentStats {
        operation_count: operations.len(),
        field_count,
        depth,
    }
}

struct SetStats {
    fields: usize,
    depth: usize,
}

fn selection_stats(
    set: &SelectionSet,
    current: usize,
    fragments: &HashMap<Name, Positioned<FragmentDefinition>>,
    visited: &mut HashSet<Name>,
) -> SetStats {
    if current >= WALK_DEPTH_CAP {
        return SetStats {
            fields: 0,
            depth: current,
        };
    }

    let mut fields = 0;
    let mut depth = current;
    for selection in &set.items {
        match &selection.node {
            Selection::Field(field) => {
                fields += 1;
                let sub = &field.node.selection_set.node;
                if sub.items.is_empty() {
                    depth = depth.max(current + 1);
                } else {
                    let stats = selection_stats(sub, current + 1, fragments, visited);
                    fields += stats.fields;
                    depth = depth.max(stats.depth);
                }
            }
            // Inline fragments contribute at the same depth as their container.
            Selection::InlineFragment(fragment) => {
                let stats =
                    selection_stats(&fragment.node.selection_set.node, current, fragments, visited);
                fields += stats.fields;
                depth = depth.max(stats.depth);
            }
            // Spreads resolve at the same depth, with a per-path visited set
            // so cyclic spread chains terminate on the repeated name.
            Selection::FragmentSpread(spread) => {
                let name = &spread.node.fragment_name.node;
                if visited.insert(name.clone()) {
                    if let Some(definition) = fragments.get(name) {
                        let stats = selection_stats(
                            &definition.node.selection_set.node,
                            current,
                            fragments,
                            visited,
                        );
                        fields += stats.fields;
                        depth = depth.max(stats.depth);
                    }
                    visited.remove(name);
                }
            }
        }
    }

    SetStats { fields, depth }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::parser::parse_query;

    fn stats(query: &str) -> DocumentStats {
        document_stats(&parse_query(query).expect("query parses"))
    }

    #[test]
    fn health_query_counts_two_fields_depth_two() {
        let s = stats("{ health { ok } }");
        assert_eq!(s.operation_count, 1);
        assert_eq!(s.field_count, 2);
        assert_eq!(s.depth, 2);
    }

    #[test]
    fn single_leaf_has_depth_one() {
        let s = stats("{ health }");
        assert_eq!(s.field_count, 1);
        assert_eq!(s.depth, 1);
    }

    #[test]
    fn sibling_fields_share_depth() {
        let s = stats("{ a { x y } b }");
        assert_eq!(s.field_count, 4);
        assert_eq!(s.depth, 2);
    }

    #[test]
    fn counts_all_operations_in_the_document() {
        let s = stats("query A { health } query B { health { ok } }");
        assert_eq!(s.operation_count, 2);
        assert_eq!(s.field_count, 3);
        assert_eq!(s.depth, 2);
    }

    #[test]
    fn inline_fragment_keeps_container_depth() {
        let plain = stats("{ a { x } }");
        let inlined = stats("{ a { ... on T { x } } }");
        assert_eq!(inlined.depth, plain.depth);
        assert_eq!(inlined.field_count, plain.field_count);
    }

    #[test]
    fn fragment_spread_resolves_at_spread_depth() {
        let s = stats("{ a { ...F } } fragment F on T { x { y } }");
        assert_eq!(s.field_count, 3);
        assert_eq!(s.depth, 3);
    }

    #[test]
    fn cyclic_fragment_spread_terminates() {
        let s = stats(
            "{ ...A } \
             fragment A on T { x ...B } \
             fragment B on T { y ...A }",
        );
        // The repeated spread contributes nothing; x and y each count once.
        assert_eq!(s.field_count, 2);
        assert_eq!(s.depth, 1);
    }

    #[test]
    fn same_fragment_on_two_paths_counts_twice() {
        let s = stats("{ a { ...F } b { ...F } } fragment F on T { x }");
        assert_eq!(s.field_count, 4);
    }

    #[test]
    fn deep_query_depth_grows_per_level() {
        let s = stats("{ a { b { c { d { e } } } } }");
        assert_eq!(s.depth, 5);
        assert_eq!(s.field_count, 5);
    }
}

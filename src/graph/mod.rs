//! Graph algorithms for case relations.
//!
//! Parent/child relations between cases must form a forest. Uses petgraph
//! for cycle detection.

use crate::models::{RelatedCase, RelationType};
use petgraph::Graph;
use petgraph::algo::is_cyclic_directed;
use std::collections::HashMap;

/// The `(parent, child)` edge a relation contributes, if it is hierarchical.
pub fn hierarchy_edge(rel: &RelatedCase) -> Option<(i64, i64)> {
    match rel.relation_type? {
        RelationType::IsParentOf => Some((rel.primary_case.id, rel.related_case.id)),
        RelationType::IsChildOf => Some((rel.related_case.id, rel.primary_case.id)),
        _ => None,
    }
}

/// Detect cycles in the parent/child hierarchy formed by `relations`
pub fn detect_cycles<'a>(relations: impl IntoIterator<Item = &'a RelatedCase>) -> bool {
    let mut graph = Graph::<i64, ()>::new();
    let mut node_map = HashMap::new();

    for (parent, child) in relations.into_iter().filter_map(hierarchy_edge) {
        let source = *node_map
            .entry(parent)
            .or_insert_with(|| graph.add_node(parent));
        let target = *node_map
            .entry(child)
            .or_insert_with(|| graph.add_node(child));
        graph.add_edge(source, target, ());
    }

    is_cyclic_directed(&graph)
}

/// Check if adding `new_relations` to `existing` would create a cycle
pub fn would_create_cycle(existing: &[RelatedCase], new_relations: &[RelatedCase]) -> bool {
    detect_cycles(existing.iter().chain(new_relations))
}

//! Execution order derived from the edges of a workflow graph.

use crate::node::{NodeKind, WorkflowEdge, WorkflowNode};
use std::collections::{HashMap, VecDeque};

/// Compute the execution order of a workflow.
///
/// Breadth-first walk from the first start node, following outgoing edges in
/// insertion order. Nodes the walk never reaches are appended afterwards in
/// their input order, so the result is always a permutation of `nodes`.
/// Returns an empty list when there is no start node.
///
/// Nodes are marked as seen when enqueued, which yields the same order as
/// marking on dequeue while keeping the queue bounded by the node count.
pub fn traverse<'a>(nodes: &'a [WorkflowNode], edges: &[WorkflowEdge]) -> Vec<&'a WorkflowNode> {
    let Some(start) = nodes.iter().position(|n| n.kind() == NodeKind::Start) else {
        return Vec::new();
    };

    // First occurrence wins if ids collide
    let mut index_of: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
    for (index, node) in nodes.iter().enumerate() {
        index_of.entry(node.id.as_str()).or_insert(index);
    }

    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }

    let mut seen = vec![false; nodes.len()];
    let mut order = Vec::with_capacity(nodes.len());
    let mut queue = VecDeque::from([start]);
    seen[start] = true;

    while let Some(current) = queue.pop_front() {
        let node = &nodes[current];
        order.push(node);

        let Some(targets) = adjacency.get(node.id.as_str()) else {
            continue;
        };
        for target in targets {
            // Dangling targets have no node to visit
            if let Some(&next) = index_of.get(target) {
                if !seen[next] {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }
    }

    order.extend(
        nodes
            .iter()
            .zip(&seen)
            .filter(|(_, visited)| !**visited)
            .map(|(node, _)| node),
    );

    order
}

/// Ids of [`traverse`] in execution order
pub fn execution_path(nodes: &[WorkflowNode], edges: &[WorkflowEdge]) -> Vec<String> {
    traverse(nodes, edges)
        .into_iter()
        .map(|node| node.id.clone())
        .collect()
}

//! Non-blocking graph hints for the editor.
//!
//! Unlike `validate`, nothing here blocks a simulation; these point at parts
//! of the graph a run will never reach or will loop through.

use crate::node::{NodeKind, WorkflowEdge, WorkflowNode};
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphAnalysis {
    /// Node ids reachable from the start node, in node-list order
    pub reachable: Vec<String>,
    /// Node ids the start node cannot reach, in node-list order
    pub unreachable: Vec<String>,
    /// Whether any directed cycle exists (self-loops included)
    pub has_cycle: bool,
    /// Whether some end node is reachable from the start node
    pub reaches_end: bool,
}

/// Analyze reachability and cycles. Edges to unknown nodes are ignored.
pub fn analyze(nodes: &[WorkflowNode], edges: &[WorkflowEdge]) -> GraphAnalysis {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let mut node_to_index: HashMap<&str, NodeIndex> = HashMap::new();

    let indices: Vec<NodeIndex> = nodes
        .iter()
        .enumerate()
        .map(|(position, node)| {
            let idx = graph.add_node(position);
            node_to_index.entry(node.id.as_str()).or_insert(idx);
            idx
        })
        .collect();

    for edge in edges {
        if let (Some(from), Some(to)) = (
            node_to_index.get(edge.source.as_str()),
            node_to_index.get(edge.target.as_str()),
        ) {
            graph.add_edge(*from, *to, ());
        }
    }

    let mut reached = vec![false; nodes.len()];
    if let Some(start) = nodes.iter().position(|n| n.kind() == NodeKind::Start) {
        let mut bfs = Bfs::new(&graph, indices[start]);
        while let Some(idx) = bfs.next(&graph) {
            reached[graph[idx]] = true;
        }
    }

    let mut analysis = GraphAnalysis {
        has_cycle: is_cyclic_directed(&graph),
        ..GraphAnalysis::default()
    };
    for (node, reached) in nodes.iter().zip(&reached) {
        if *reached {
            analysis.reaches_end |= node.kind() == NodeKind::End;
            analysis.reachable.push(node.id.clone());
        } else {
            analysis.unreachable.push(node.id.clone());
        }
    }

    analysis
}

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use super::{GraphView, Position};

/// Fixed layout parameters. No randomness anywhere in the pipeline, so a
/// given node/edge set always lays out identically.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Vertical gap between ranks.
    pub rank_sep: f32,
    /// Horizontal gap between neighboring nodes in one rank.
    pub node_sep: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rank_sep: 100.0,
            node_sep: 50.0,
        }
    }
}

/// Layered top-to-bottom layout for directed graphs.
///
/// Ranks are assigned by longest path over a topological order, so the
/// anchor (the only node without incoming edges in the usual star graph)
/// sits in the root rank. Rows are centered on x = 0. Pure and synchronous;
/// safe to run for any number of graphs in parallel.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Assign a top-left position to every node in place.
    pub fn layout(&self, graph: &mut GraphView) {
        if graph.nodes.is_empty() {
            return;
        }

        // Mirror the node list into a DiGraph; petgraph indices are
        // allocated sequentially, so they coincide with node list indices.
        let mut dag = DiGraph::<(), ()>::with_capacity(graph.nodes.len(), graph.edges.len());
        let mut index_of: HashMap<&str, NodeIndex> = HashMap::with_capacity(graph.nodes.len());
        for node in &graph.nodes {
            let ix = dag.add_node(());
            index_of.insert(&node.id, ix);
        }

        for edge in &graph.edges {
            let (Some(&source), Some(&target)) =
                (index_of.get(edge.source.as_str()), index_of.get(edge.target.as_str()))
            else {
                debug_assert!(false, "graph edge references an unknown node id");
                continue;
            };
            if source != target {
                dag.add_edge(source, target, ());
            }
        }

        // Star graphs from the resolver are always acyclic; should a caller
        // hand-build a cyclic graph, fall back to insertion order rather
        // than failing layout.
        let order = toposort(&dag, None).unwrap_or_else(|_| dag.node_indices().collect());

        let mut rank = vec![0usize; graph.nodes.len()];
        for &ix in &order {
            let depth = dag
                .neighbors_directed(ix, Direction::Incoming)
                .map(|pred| rank[pred.index()] + 1)
                .max()
                .unwrap_or(0);
            rank[ix.index()] = depth;
        }

        let max_rank = rank.iter().copied().max().unwrap_or(0);
        let mut rows: Vec<Vec<usize>> = vec![Vec::new(); max_rank + 1];
        for (node_index, &node_rank) in rank.iter().enumerate() {
            rows[node_rank].push(node_index);
        }

        let mut y_cursor = 0.0f32;
        for row in &rows {
            if row.is_empty() {
                continue;
            }

            let row_height = row
                .iter()
                .map(|&i| graph.nodes[i].height)
                .fold(0.0f32, f32::max);
            let row_width: f32 = row.iter().map(|&i| graph.nodes[i].width).sum::<f32>()
                + self.config.node_sep * (row.len() - 1) as f32;

            let center_y = y_cursor + row_height / 2.0;
            let mut x_cursor = -row_width / 2.0;
            for &i in row {
                let node = &mut graph.nodes[i];
                // the algorithm places centers; emitted coordinates are the
                // top-left origin, shifted by half the node's box
                let center_x = x_cursor + node.width / 2.0;
                node.position = Position {
                    x: center_x - node.width / 2.0,
                    y: center_y - node.height / 2.0,
                };
                x_cursor += node.width + self.config.node_sep;
            }

            y_cursor += row_height + self.config.rank_sep;
        }
    }
}

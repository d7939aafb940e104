// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::BinaryHeap;

use crate::{Edge, Graph};

mod error;

pub use error::SearchError;

/// Multiplier of a node's safety deficit (`1 - safety_score`) added to the cost
/// of entering that node in [find_path].
pub const DEFAULT_PENALTY_FACTOR: f64 = 10.0;

/// Sequence of node indices from the start to the end node, with the total search cost.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub nodes: Vec<usize>,
    pub cost: f64,
}

impl Path {
    /// Returns the result of a search which didn't reach the end node.
    pub fn none() -> Self {
        Self {
            nodes: Vec::default(),
            cost: f64::INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct QueueItem {
    at: usize,
    cost: f64,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cost.eq(&other.cost)
    }
}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for QueueItem {}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison,
        // as lower costs are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other.cost.total_cmp(&self.cost)
    }
}

fn reconstruct_path(came_from: &[Option<usize>], from: usize, to: usize) -> Vec<usize> {
    let mut path = vec![to];
    let mut last = to;

    while last != from {
        match came_from[last] {
            Some(nd) => {
                path.push(nd);
                last = nd;
            }
            // Chain broken before reaching the start
            None => return Vec::default(),
        }
    }

    path.reverse();
    path
}

/// Uses [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm)
/// to find the safest-shortest route between two nodes in the provided graph,
/// with the [DEFAULT_PENALTY_FACTOR].
///
/// See [find_path_with_penalty] for details.
pub fn find_path(g: &Graph, from: usize, to: usize) -> Result<Path, SearchError> {
    find_path_with_penalty(g, from, to, DEFAULT_PENALTY_FACTOR)
}

/// Uses [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm)
/// to find the safest-shortest route between two nodes in the provided graph.
///
/// The cost of traversing an [Edge] is its distance plus
/// `(1 - safety_score) * penalty_factor` of the node it enters. The penalty is thus
/// charged once for every node along the path, except for the starting one.
///
/// The penalty factor must be finite and non-negative, otherwise
/// [SearchError::InvalidPenalty] is returned. Negative edge costs would let the
/// search cycle through the graph forever.
///
/// Returns [Path::none] (no nodes, infinite cost) if there is no route between
/// the two nodes. Ties between equally costly routes are broken arbitrarily.
pub fn find_path_with_penalty(
    g: &Graph,
    from: usize,
    to: usize,
    penalty_factor: f64,
) -> Result<Path, SearchError> {
    if !(penalty_factor.is_finite() && penalty_factor >= 0.0) {
        return Err(SearchError::InvalidPenalty(penalty_factor));
    }
    if g.get_node(from).is_none() {
        return Err(SearchError::InvalidReference(from));
    }
    if g.get_node(to).is_none() {
        return Err(SearchError::InvalidReference(to));
    }

    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::default();
    let mut came_from: Vec<Option<usize>> = vec![None; g.len()];
    let mut known_costs: Vec<f64> = vec![f64::INFINITY; g.len()];

    queue.push(QueueItem { at: from, cost: 0.0 });
    known_costs[from] = 0.0;

    while let Some(item) = queue.pop() {
        if item.at == to {
            break;
        }

        // Multiple items for the same node might be kept in the queue - skip outdated ones.
        if item.cost > known_costs[item.at] {
            continue;
        }

        for &Edge {
            to: neighbor_idx,
            distance,
            ..
        } in g.get_edges(item.at)
        {
            // Edges to non-existing nodes are silently ignored
            let Some(neighbor) = g.get_node(neighbor_idx) else {
                continue;
            };

            let penalty = (1.0 - neighbor.safety_score) * penalty_factor;
            let neighbor_cost = item.cost + distance + penalty;
            if neighbor_cost < known_costs[neighbor_idx] {
                came_from[neighbor_idx] = Some(item.at);
                known_costs[neighbor_idx] = neighbor_cost;
                queue.push(QueueItem {
                    at: neighbor_idx,
                    cost: neighbor_cost,
                });
            }
        }
    }

    if known_costs[to].is_infinite() {
        log::debug!("no path from node {} to node {}", from, to);
        return Ok(Path::none());
    }

    let nodes = reconstruct_path(&came_from, from, to);
    if nodes.is_empty() {
        return Ok(Path::none());
    }

    Ok(Path {
        nodes,
        cost: known_costs[to],
    })
}

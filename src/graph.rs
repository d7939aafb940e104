// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use rayon::prelude::*;

use crate::scorer::{hazard_context, NEARBY_WINDOW};
use crate::{earth_distance, Coordinates, Edge, Hazard, Node, NodeRole, SafetyScorer};

/// Represents a routing network as a list of [Nodes](Node)
/// and outgoing [Edges](Edge) of every node, both addressed by node indices.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Vec<Edge>>,
}

impl Graph {
    /// Index of the start node in graphs created by a [GraphBuilder].
    pub const START: usize = 0;

    /// Index of the end node in graphs created by a [GraphBuilder].
    pub const END: usize = 1;

    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns an iterator over all [Nodes](Node) in the graph, in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Returns an iterator over all [Edges](Edge) in the graph.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().flatten()
    }

    /// Retrieves a [Node] with the provided index.
    pub fn get_node(&self, idx: usize) -> Option<&Node> {
        self.nodes.get(idx)
    }

    /// Appends a [Node] to the graph and returns its index.
    pub fn add_node(&mut self, node: Node) -> usize {
        debug_assert!((0.0..=1.0).contains(&node.safety_score));

        self.nodes.push(node);
        self.edges.push(Vec::default());
        self.nodes.len() - 1
    }

    /// Gets all outgoing [Edges](Edge) from a node with a given index.
    pub fn get_edges(&self, from: usize) -> &[Edge] {
        self.edges.get(from).map(Vec::as_slice).unwrap_or_default()
    }

    /// Gets the distance of an [Edge] from one node to another.
    /// If such an edge doesn't exist, returns [f64::INFINITY].
    pub fn get_edge(&self, from: usize, to: usize) -> f64 {
        self.get_edges(from)
            .iter()
            .find(|e| e.to == to)
            .map(|e| e.distance)
            .unwrap_or(f64::INFINITY)
    }

    /// Creates or updates an [Edge]. Returns `false` if either of the referenced
    /// nodes doesn't exist, leaving the graph untouched.
    pub fn set_edge(&mut self, edge: Edge) -> bool {
        debug_assert!(edge.distance >= 0.0);

        if edge.to >= self.nodes.len() {
            return false;
        }

        match self.edges.get_mut(edge.from) {
            Some(edges) => {
                if let Some(candidate) = edges.iter_mut().find(|e| e.to == edge.to) {
                    *candidate = edge;
                } else {
                    edges.push(edge);
                }
                true
            }
            None => false,
        }
    }

    /// Removes an edge from one node to another.
    /// Returns `true` if such an edge existed.
    pub fn delete_edge(&mut self, from: usize, to: usize) -> bool {
        if let Some(edges) = self.edges.get_mut(from) {
            if let Some(idx) = edges.iter().position(|e| e.to == to) {
                edges.swap_remove(idx);
                return true;
            }
        }
        false
    }
}

/// Helper object for synthesizing a complete routing [Graph] for a single request.
pub struct GraphBuilder<'a> {
    scorer: &'a SafetyScorer,
    hazards: &'a [Hazard],
    parallel: bool,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(scorer: &'a SafetyScorer, hazards: &'a [Hazard]) -> Self {
        Self {
            scorer,
            hazards,
            parallel: true,
        }
    }

    /// Sets whether waypoints should be scored on the rayon thread pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Builds the graph: node [0](Graph::START) is the start, node [1](Graph::END)
    /// the end, followed by the provided waypoints. Waypoints are scored with the
    /// [SafetyScorer], and every ordered pair of distinct nodes gets an [Edge]
    /// with the great-circle distance between them.
    pub fn build<I>(&self, start: Coordinates, end: Coordinates, waypoints: I) -> Graph
    where
        I: IntoIterator<Item = Node>,
    {
        let mut nodes = vec![Node::start(start.lat, start.lon), Node::end(end.lat, end.lon)];
        nodes.extend(waypoints.into_iter().map(|w| Node {
            role: NodeRole::Waypoint,
            ..w
        }));

        // All nodes must be scored before any edges are created
        if self.parallel {
            nodes[2..].par_iter_mut().for_each(|n| self.score_node(n));
        } else {
            nodes[2..].iter_mut().for_each(|n| self.score_node(n));
        }

        let mut g = Graph {
            edges: vec![Vec::with_capacity(nodes.len().saturating_sub(1)); nodes.len()],
            nodes,
        };
        self.create_edges(&mut g);

        log::debug!(
            "built graph with {} nodes and {} edges over {} hazards",
            g.len(),
            g.edges().count(),
            self.hazards.len()
        );
        g
    }

    fn score_node(&self, node: &mut Node) {
        let (hazard_type, nearby) = hazard_context(self.hazards, node.lat, node.lon, NEARBY_WINDOW);
        node.safety_score = self
            .scorer
            .score_location(node.lat, node.lon, hazard_type, nearby)
            .value();
    }

    fn create_edges(&self, g: &mut Graph) {
        for (from, a) in g.nodes.iter().enumerate() {
            for (to, b) in g.nodes.iter().enumerate() {
                if from != to {
                    g.edges[from].push(Edge {
                        from,
                        to,
                        distance: earth_distance(a.lat, a.lon, b.lat, b.lon),
                    });
                }
            }
        }
    }
}

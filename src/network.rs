//! The capability set the robustness core needs from a graph.
//!
//! Removal policies, the statistics reporter and the experiment runner only ever talk to a graph
//! through [`Network`], so any representation can be plugged in by implementing it. The crate's
//! own [`Graph`](crate::graph::Graph) is the default implementation.

use std::{collections::BTreeMap, fmt::Debug, hash::Hash};

use crate::paths::PathLengthSummary;

/// A mutable, undirected, unweighted graph.
///
/// Implementations must enumerate vertices in a stable order (ascending by the vertex's `Ord`
/// for the crate's own graph) since every tie-break in the removal policies is defined in terms
/// of that order.
pub trait Network {
    /// The vertex identifier.
    type Vertex: Copy + Eq + Hash + Ord + Debug;

    /// Returns the vertices in enumeration order.
    fn vertices(&self) -> Vec<Self::Vertex>;

    /// Returns the number of vertices, the graph's "order".
    fn vertex_count(&self) -> usize;

    /// Returns the number of edges, the graph's "size".
    fn edge_count(&self) -> usize;

    /// Returns whether the vertex is part of the graph.
    fn contains_vertex(&self, vertex: &Self::Vertex) -> bool;

    /// Returns the number of edges incident to `vertex`, `None` if it isn't part of the graph.
    fn degree(&self, vertex: &Self::Vertex) -> Option<usize>;

    /// Removes a vertex and its incident edges, returning whether it was present.
    fn remove_vertex(&mut self, vertex: &Self::Vertex) -> bool;

    /// Partitions the vertices into connected components, largest first.
    ///
    /// Components of equal size keep their discovery order, and discovery walks the vertices in
    /// enumeration order. Each component lists its vertices in enumeration order.
    fn connected_components(&self) -> Vec<Vec<Self::Vertex>>;

    /// Returns the subgraph induced by `vertices`. Unknown vertices are ignored.
    fn subgraph(&self, vertices: &[Self::Vertex]) -> Self
    where
        Self: Sized;

    /// Returns the hop distance from `source` to every vertex reachable from it, including
    /// `source` itself at distance zero. Empty if `source` isn't part of the graph.
    fn shortest_path_lengths(&self, source: &Self::Vertex) -> BTreeMap<Self::Vertex, usize>;

    /// Returns the normalised betweenness centrality of every vertex.
    fn betweenness_centrality(&self) -> BTreeMap<Self::Vertex, f64>;

    /// Returns the second smallest eigenvalue of the graph's Laplacian, `0.0` for graphs with
    /// fewer than two vertices.
    fn algebraic_connectivity(&self) -> f64;

    /// Summarises the hop distances between every ordered pair of distinct, mutually reachable
    /// vertices.
    ///
    /// The provided implementation runs [`Network::shortest_path_lengths`] from every vertex;
    /// implementors with a cheaper traversal should override it.
    fn path_length_summary(&self) -> PathLengthSummary {
        let mut summary = PathLengthSummary::default();

        for source in self.vertices() {
            for (target, length) in self.shortest_path_lengths(&source) {
                if target != source {
                    summary.record(length);
                }
            }
        }

        summary
    }

    /// Returns whether the graph has no vertices.
    fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }
}

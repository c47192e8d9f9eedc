//! A module for working with graphs.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, BTreeSet, VecDeque},
    fmt::Debug,
    hash::Hash,
};

use itertools::Itertools;

use crate::{
    betweenness::compute_betweenness,
    edge::Edge,
    network::Network,
    paths::{compute_path_lengths, distances_from, PathLengthSummary},
    spectral,
};

/// Position of a vertex in the graph's index, used by the traversal algorithms.
pub(crate) type GraphIndex = usize;

/// An undirected, unweighted graph stored as vertex-keyed adjacency sets.
///
/// Vertices can exist without edges, which matters once removals start isolating parts of the
/// network: an isolated vertex still counts towards the graph's order.
///
/// The use of a `BTreeMap` means we need the `Ord` bound on `T`. Vertices are always enumerated in
/// ascending order, which keeps every computation (and every tie-break built on top of them)
/// deterministic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graph<T> {
    adjacency: BTreeMap<T, BTreeSet<T>>,
    edge_count: usize,
}

/// Vertices in enumeration order alongside their neighbours expressed as positions in that order.
struct Index<T> {
    vertices: Vec<T>,
    indices: Vec<Vec<GraphIndex>>,
}

impl<T> Default for Graph<T>
where
    T: Copy + Eq + Hash + Ord + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Graph<T>
where
    T: Copy + Eq + Hash + Ord + Debug,
{
    /// Creates an empty graph.
    ///
    /// # Examples
    ///
    /// ```
    /// use erosion::graph::Graph;
    ///
    /// let graph: Graph<u32> = Graph::new();
    /// assert!(graph.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            adjacency: BTreeMap::new(),
            edge_count: 0,
        }
    }

    /// Inserts a vertex without any edges, returns whether it was newly inserted.
    pub fn insert_vertex(&mut self, vertex: T) -> bool {
        if self.adjacency.contains_key(&vertex) {
            return false;
        }

        self.adjacency.insert(vertex, BTreeSet::new());
        true
    }

    /// Inserts an edge into the graph, adding its endpoints if they're new.
    ///
    /// Returns whether the edge was newly inserted. Self loops are rejected as they neither change
    /// connectivity nor count as a neighbour.
    ///
    /// # Examples
    ///
    /// ```
    /// use erosion::edge::Edge;
    /// use erosion::graph::Graph;
    ///
    /// let mut graph = Graph::new();
    ///
    /// assert!(graph.insert(Edge::new("a", "b")));
    /// assert!(!graph.insert(Edge::new("b", "a")));
    /// assert!(!graph.insert(Edge::new("c", "c")));
    /// ```
    pub fn insert(&mut self, edge: Edge<T>) -> bool {
        if edge.is_loop() {
            return false;
        }

        let (source, target) = edge.into_vertices();
        let is_inserted = self.adjacency.entry(source).or_default().insert(target);
        self.adjacency.entry(target).or_default().insert(source);

        if is_inserted {
            self.edge_count += 1;
        }

        is_inserted
    }

    /// Inserts a subset of `(hub, leaf)` edges into the graph.
    pub fn insert_subset(&mut self, hub: T, leaves: &[T]) {
        self.insert_vertex(hub);

        for leaf in leaves {
            self.insert(Edge::new(hub, *leaf));
        }
    }

    /// Removes a vertex along with its incident edges, returns whether it was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use erosion::edge::Edge;
    /// use erosion::graph::Graph;
    ///
    /// let mut graph = Graph::new();
    /// graph.insert(Edge::new("a", "b"));
    /// graph.insert(Edge::new("b", "c"));
    ///
    /// assert!(graph.remove_vertex(&"b"));
    /// assert_eq!(graph.vertex_count(), 2);
    /// assert_eq!(graph.edge_count(), 0);
    /// ```
    pub fn remove_vertex(&mut self, vertex: &T) -> bool {
        let Some(neighbours) = self.adjacency.remove(vertex) else {
            return false;
        };

        for neighbour in &neighbours {
            if let Some(others) = self.adjacency.get_mut(neighbour) {
                others.remove(vertex);
            }
        }
        self.edge_count -= neighbours.len();

        true
    }

    /// Checks if the graph contains an edge.
    pub fn contains(&self, edge: &Edge<T>) -> bool {
        self.adjacency
            .get(edge.source())
            .is_some_and(|neighbours| neighbours.contains(edge.target()))
    }

    /// Checks if the graph contains a vertex.
    pub fn contains_vertex(&self, vertex: &T) -> bool {
        self.adjacency.contains_key(vertex)
    }

    /// Iterates over the vertices in ascending order.
    pub fn vertices(&self) -> impl Iterator<Item = &T> + '_ {
        self.adjacency.keys()
    }

    /// Returns the number of edges incident to the vertex.
    pub fn degree(&self, vertex: &T) -> Option<usize> {
        self.adjacency.get(vertex).map(BTreeSet::len)
    }

    /// Returns the vertex count of the graph.
    ///
    /// # Examples
    ///
    /// ```
    /// use erosion::edge::Edge;
    /// use erosion::graph::Graph;
    ///
    /// let mut graph = Graph::new();
    /// graph.insert(Edge::new("a", "b"));
    /// graph.insert_vertex("c");
    ///
    /// assert_eq!(graph.vertex_count(), 3);
    /// ```
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Returns the edge count of the graph.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns whether the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Returns a mapping of vertices to their normalised betweenness centrality.
    ///
    /// The centrality of `v` is the sum, over all pairs `(s, t)` not involving `v`, of the
    /// fraction of shortest `s`-`t` paths passing through `v`, divided by the number of such
    /// pairs. Pairs in different components contribute nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use erosion::edge::Edge;
    /// use erosion::graph::Graph;
    ///
    /// let mut graph = Graph::new();
    /// graph.insert(Edge::new("a", "b"));
    /// graph.insert(Edge::new("b", "c"));
    ///
    /// let betweenness = graph.betweenness_centrality();
    ///
    /// assert_eq!(betweenness[&"a"], 0.0);
    /// assert_eq!(betweenness[&"b"], 1.0);
    /// ```
    pub fn betweenness_centrality(&self) -> BTreeMap<T, f64> {
        let Index { vertices, indices } = self.generate_index();
        let normalize = true;

        vertices
            .into_iter()
            .zip(compute_betweenness(&indices, normalize))
            .collect()
    }

    /// Returns the hop distance from `source` to every vertex reachable from it, itself included.
    pub fn shortest_path_lengths(&self, source: &T) -> BTreeMap<T, usize> {
        let Index { vertices, indices } = self.generate_index();

        let Ok(start) = vertices.binary_search(source) else {
            return BTreeMap::new();
        };

        vertices
            .iter()
            .zip(distances_from(start, &indices))
            .filter_map(|(vertex, distance)| distance.map(|d| (*vertex, d)))
            .collect()
    }

    /// Partitions the vertices into connected components, largest first.
    ///
    /// Components are discovered by searching from the smallest vertex not yet visited; components
    /// of the same size keep that discovery order.
    ///
    /// # Examples
    ///
    /// ```
    /// use erosion::edge::Edge;
    /// use erosion::graph::Graph;
    ///
    /// let mut graph = Graph::new();
    /// graph.insert(Edge::new(1, 2));
    /// graph.insert(Edge::new(3, 4));
    /// graph.insert(Edge::new(4, 5));
    ///
    /// assert_eq!(graph.connected_components(), vec![vec![3, 4, 5], vec![1, 2]]);
    /// ```
    pub fn connected_components(&self) -> Vec<Vec<T>> {
        let Index { vertices, indices } = self.generate_index();

        let mut labels: Vec<Option<usize>> = vec![None; vertices.len()];
        let mut components: Vec<Vec<GraphIndex>> = Vec::new();
        let mut queue: VecDeque<GraphIndex> = VecDeque::new();

        for start in 0..vertices.len() {
            if labels[start].is_some() {
                continue;
            }

            let label = components.len();
            let mut members = vec![start];
            labels[start] = Some(label);
            queue.push_back(start);

            while let Some(current) = queue.pop_front() {
                for &neighbour in &indices[current] {
                    if labels[neighbour].is_none() {
                        labels[neighbour] = Some(label);
                        members.push(neighbour);
                        queue.push_back(neighbour);
                    }
                }
            }

            // Report members in enumeration order rather than search order.
            members.sort_unstable();
            components.push(members);
        }

        // `sorted_by_key` is stable, equally sized components stay in discovery order.
        components
            .into_iter()
            .sorted_by_key(|members| Reverse(members.len()))
            .map(|members| members.into_iter().map(|i| vertices[i]).collect())
            .collect()
    }

    /// Returns the subgraph induced by the given vertices, ignoring any not in the graph.
    pub fn subgraph(&self, vertices: &[T]) -> Self {
        let keep: BTreeSet<T> = vertices
            .iter()
            .filter(|vertex| self.contains_vertex(vertex))
            .copied()
            .collect();

        let mut subgraph = Self::new();
        for vertex in &keep {
            subgraph.insert_vertex(*vertex);

            // Safety: `keep` only contains vertices present in the graph.
            for neighbour in &self.adjacency[vertex] {
                if keep.contains(neighbour) {
                    subgraph.insert(Edge::new(*vertex, *neighbour));
                }
            }
        }

        subgraph
    }

    /// Summarises the hop distances between every ordered pair of distinct, mutually reachable
    /// vertices.
    pub fn path_length_summary(&self) -> PathLengthSummary {
        compute_path_lengths(&self.generate_index().indices)
    }

    /// Returns the algebraic connectivity (Fiedler value) of the graph.
    ///
    /// This builds the dense laplacian matrix, so it costs `O(n^2)` memory and `O(n^3)` time.
    pub fn algebraic_connectivity(&self) -> f64 {
        spectral::algebraic_connectivity(&self.generate_index().indices)
    }

    //
    // Private
    //

    /// Constructs an index of the vertices, sorted by `T`'s implementation of `Ord`, and the
    /// adjacency lists expressed in terms of that index.
    fn generate_index(&self) -> Index<T> {
        let vertices: Vec<T> = self.adjacency.keys().copied().collect();
        let positions: BTreeMap<T, GraphIndex> = vertices
            .iter()
            .enumerate()
            .map(|(i, &vertex)| (vertex, i))
            .collect();

        // Safety: neighbours are always vertices of the graph, so they have a position.
        let indices = self
            .adjacency
            .values()
            .map(|neighbours| neighbours.iter().map(|n| positions[n]).collect())
            .collect();

        Index { vertices, indices }
    }
}

impl<T> FromIterator<Edge<T>> for Graph<T>
where
    T: Copy + Eq + Hash + Ord + Debug,
{
    fn from_iter<I: IntoIterator<Item = Edge<T>>>(iter: I) -> Self {
        let mut graph = Self::new();
        graph.extend(iter);
        graph
    }
}

impl<T> Extend<Edge<T>> for Graph<T>
where
    T: Copy + Eq + Hash + Ord + Debug,
{
    fn extend<I: IntoIterator<Item = Edge<T>>>(&mut self, iter: I) {
        for edge in iter {
            self.insert(edge);
        }
    }
}

impl<T> Network for Graph<T>
where
    T: Copy + Eq + Hash + Ord + Debug,
{
    type Vertex = T;

    fn vertices(&self) -> Vec<T> {
        self.adjacency.keys().copied().collect()
    }

    fn vertex_count(&self) -> usize {
        Graph::vertex_count(self)
    }

    fn edge_count(&self) -> usize {
        Graph::edge_count(self)
    }

    fn contains_vertex(&self, vertex: &T) -> bool {
        Graph::contains_vertex(self, vertex)
    }

    fn degree(&self, vertex: &T) -> Option<usize> {
        Graph::degree(self, vertex)
    }

    fn remove_vertex(&mut self, vertex: &T) -> bool {
        Graph::remove_vertex(self, vertex)
    }

    fn connected_components(&self) -> Vec<Vec<T>> {
        Graph::connected_components(self)
    }

    fn subgraph(&self, vertices: &[T]) -> Self {
        Graph::subgraph(self, vertices)
    }

    fn shortest_path_lengths(&self, source: &T) -> BTreeMap<T, usize> {
        Graph::shortest_path_lengths(self, source)
    }

    fn betweenness_centrality(&self) -> BTreeMap<T, f64> {
        Graph::betweenness_centrality(self)
    }

    fn algebraic_connectivity(&self) -> f64 {
        Graph::algebraic_connectivity(self)
    }

    fn path_length_summary(&self) -> PathLengthSummary {
        Graph::path_length_summary(self)
    }

    fn is_empty(&self) -> bool {
        Graph::is_empty(self)
    }
}

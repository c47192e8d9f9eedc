//! Structural statistics of a graph snapshot.

use tracing::instrument;

use crate::{
    error::{Result, RobustnessError},
    network::Network,
    results::StatisticsRecord,
};

/// Computes diameter, average path length and largest component fraction.
///
/// Path metrics are taken over the largest connected component only, since distances between
/// components are undefined. If several components share the largest size the one discovered
/// first (the one holding the smallest vertex) is used.
///
/// The average path length sums the distances between ordered pairs of distinct vertices and
/// divides by `n * (n - 1)`, `n` being the order of the largest component. A single-vertex
/// component has no such pairs and yields `0.0`.
///
/// # Errors
///
/// Returns [`RobustnessError::EmptyGraph`] if the graph has no vertices.
///
/// # Examples
///
/// ```
/// use erosion::{edge::Edge, graph::Graph, stats::report_statistics};
///
/// let mut graph = Graph::new();
/// graph.insert(Edge::new(1, 2));
/// graph.insert(Edge::new(2, 3));
/// graph.insert_vertex(4);
///
/// let record = report_statistics(&graph).unwrap();
///
/// assert_eq!(record.diameter, 2);
/// assert_eq!(record.average_path_length, 8.0 / 6.0);
/// assert_eq!(record.largest_component_fraction, 0.75);
/// ```
pub fn report_statistics<N: Network>(network: &N) -> Result<StatisticsRecord> {
    report_statistics_with(network, false)
}

/// Like [`report_statistics`], additionally measuring the algebraic connectivity of the largest
/// component when `spectral` is set.
///
/// The spectral measurement needs a dense eigen-decomposition, cubic in the component's order.
#[instrument(level = "trace", skip(network), fields(order = network.vertex_count()))]
pub fn report_statistics_with<N: Network>(network: &N, spectral: bool) -> Result<StatisticsRecord> {
    let order = network.vertex_count();
    let components = network.connected_components();
    let largest = components.first().ok_or(RobustnessError::EmptyGraph {
        operation: "statistics",
    })?;
    let largest_order = largest.len();

    // Skip building a subgraph when the whole graph is connected.
    let component = (components.len() > 1).then(|| network.subgraph(largest));
    let component = component.as_ref().unwrap_or(network);

    let summary = component.path_length_summary();
    let pairs = largest_order * largest_order.saturating_sub(1);
    // Every ordered pair within a component is connected.
    debug_assert_eq!(summary.pairs(), pairs as u64);

    let average_path_length = if pairs == 0 {
        0.0
    } else {
        summary.total() as f64 / pairs as f64
    };

    let algebraic_connectivity = spectral.then(|| component.algebraic_connectivity());

    Ok(StatisticsRecord {
        diameter: summary.longest(),
        average_path_length,
        largest_component_fraction: largest_order as f64 / order as f64,
        algebraic_connectivity,
    })
}

//! A module for computing betweenness centrality over indexed adjacency lists.

use std::collections::VecDeque;

use crate::graph::GraphIndex;

/// this is an implementation of Ulrik Brandes's
/// A Faster Algorithm for Betweenness Centrality
/// http://snap.stanford.edu/class/cs224w-readings/brandes01centrality.pdf
/// page 10, "Algorithm 1: Betweenness centrality in unweighted graphs"
///
/// Accumulates the dependencies of `index` on every other vertex into `betweenness_count`.
fn betweenness_for_node(index: usize, indices: &[Vec<GraphIndex>], betweenness_count: &mut [f64]) {
    let num_nodes = indices.len();

    let mut sigma: Vec<f64> = vec![0.0; num_nodes];
    let mut distance: Vec<Option<usize>> = vec![None; num_nodes];
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); num_nodes];
    let mut delta: Vec<f64> = vec![0.0; num_nodes];
    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut stack: Vec<usize> = Vec::with_capacity(num_nodes);

    sigma[index] = 1.0;
    distance[index] = Some(0);
    queue.push_back(index);

    while let Some(v) = queue.pop_front() {
        stack.push(v);
        let next = distance[v].map_or(0, |d| d + 1);

        for &w in &indices[v] {
            if distance[w].is_none() {
                distance[w] = Some(next);
                queue.push_back(w);
            }
            if distance[w] == Some(next) {
                sigma[w] += sigma[v];
                predecessors[w].push(v);
            }
        }
    }

    // Vertices come off the stack in order of non-increasing distance from the source.
    while let Some(w) = stack.pop() {
        for &v in &predecessors[w] {
            delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
        }
        if w != index {
            betweenness_count[w] += delta[w];
        }
    }
}

/// Computes the betweenness centrality of every vertex, sources processed in index order.
///
/// The sources are visited sequentially so the floating point sums, and therefore exact ties
/// between vertices, are identical from one call to the next.
///
/// When `normalize` is set the values are divided by `(n - 1)(n - 2)`, the number of ordered pairs
/// not involving the vertex; graphs with fewer than three vertices are left unscaled as every
/// value is zero. Otherwise the raw values are halved since every undirected pair is counted from
/// both ends.
pub(crate) fn compute_betweenness(indices: &[Vec<GraphIndex>], normalize: bool) -> Vec<f64> {
    let num_nodes = indices.len();

    let mut betweenness_count: Vec<f64> = vec![0.0; num_nodes];

    for index in 0..num_nodes {
        betweenness_for_node(index, indices, &mut betweenness_count);
    }

    let divisor: f64 = match (normalize, num_nodes) {
        (true, n) if n > 2 => ((n - 1) * (n - 2)) as f64,
        (true, _) => 1.0,
        // non-normalized: everything is counted twice, so we must divide by two
        (false, _) => 2.0,
    };

    for value in &mut betweenness_count {
        *value /= divisor;
    }

    betweenness_count
}

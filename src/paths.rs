//! A module for accumulating shortest path lengths with breadth-first searches.

use std::collections::VecDeque;

use crate::graph::GraphIndex;

/// Aggregate of hop distances between ordered pairs of distinct vertices.
///
/// Self pairs (distance zero) are never recorded, so [`PathLengthSummary::pairs`] counts ordered
/// pairs `(s, t)` with `s != t` and `t` reachable from `s`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PathLengthSummary {
    pairs: u64,
    total: u64,
    longest: usize,
}

impl PathLengthSummary {
    /// Records the distance of one ordered pair.
    pub fn record(&mut self, length: usize) {
        self.pairs += 1;
        self.total += length as u64;
        self.longest = self.longest.max(length);
    }

    /// Number of ordered pairs recorded.
    pub fn pairs(&self) -> u64 {
        self.pairs
    }

    /// Sum of all recorded distances.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Largest recorded distance, `0` when nothing was recorded.
    pub fn longest(&self) -> usize {
        self.longest
    }

    fn merge(&mut self, other: &Self) {
        self.pairs += other.pairs;
        self.total += other.total;
        self.longest = self.longest.max(other.longest);
    }
}

/// Breadth-first search from `index`, returning the hop distance to every vertex (`None` for
/// unreachable ones).
pub(crate) fn distances_from(index: usize, indices: &[Vec<GraphIndex>]) -> Vec<Option<usize>> {
    let mut distances: Vec<Option<usize>> = vec![None; indices.len()];
    let mut queue: VecDeque<usize> = VecDeque::new();

    distances[index] = Some(0);
    queue.push_back(index);

    while let Some(current) = queue.pop_front() {
        // Every queued vertex has had its distance set before being pushed.
        let next = distances[current].map_or(0, |d| d + 1);

        for &neighbour in &indices[current] {
            if distances[neighbour].is_none() {
                distances[neighbour] = Some(next);
                queue.push_back(neighbour);
            }
        }
    }

    distances
}

fn summary_for_node(index: usize, indices: &[Vec<GraphIndex>]) -> PathLengthSummary {
    let mut summary = PathLengthSummary::default();

    for (target, distance) in distances_from(index, indices).into_iter().enumerate() {
        match distance {
            Some(distance) if target != index => summary.record(distance),
            _ => {}
        }
    }

    summary
}

/// Runs a search from every vertex of the indexed adjacency lists and sums up the distances.
pub(crate) fn compute_path_lengths(indices: &[Vec<GraphIndex>]) -> PathLengthSummary {
    let mut summary = PathLengthSummary::default();

    for index in 0..indices.len() {
        summary.merge(&summary_for_node(index, indices));
    }

    summary
}

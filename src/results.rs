//! Measurement records and the time series an experiment produces.

use std::collections::{btree_map, BTreeMap};

/// Structural statistics of one graph snapshot.
///
/// Every metric except the component fraction is taken over the largest connected component.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatisticsRecord {
    /// Longest shortest path (in hops) within the largest component.
    pub diameter: usize,
    /// Mean shortest path length over ordered pairs of distinct vertices in the largest component,
    /// `0.0` when it has a single vertex.
    pub average_path_length: f64,
    /// Order of the largest component over the order of the whole graph, in `(0, 1]`.
    pub largest_component_fraction: f64,
    /// Fiedler value of the largest component, only measured on request.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub algebraic_connectivity: Option<f64>,
}

/// Statistics keyed by the removal step they were taken after, in ascending step order.
///
/// # Examples
///
/// ```
/// use erosion::results::{ResultSeries, StatisticsRecord};
///
/// let record = StatisticsRecord {
///     diameter: 3,
///     average_path_length: 1.5,
///     largest_component_fraction: 0.8,
///     algebraic_connectivity: None,
/// };
///
/// let mut series = ResultSeries::new();
/// series.insert(20, record);
/// series.insert(0, record);
///
/// assert_eq!(series.steps().collect::<Vec<_>>(), vec![0, 20]);
/// assert_eq!(series.get(20), Some(&record));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ResultSeries {
    records: BTreeMap<usize, StatisticsRecord>,
}

impl ResultSeries {
    /// Creates an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the statistics taken after `step`, returning any record it replaces.
    pub fn insert(&mut self, step: usize, record: StatisticsRecord) -> Option<StatisticsRecord> {
        self.records.insert(step, record)
    }

    /// Returns the record taken after `step`, if one was.
    pub fn get(&self, step: usize) -> Option<&StatisticsRecord> {
        self.records.get(&step)
    }

    /// Number of recorded measurements.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The most recent measurement.
    pub fn last(&self) -> Option<(usize, &StatisticsRecord)> {
        self.records.iter().next_back().map(|(step, record)| (*step, record))
    }

    /// Iterates over `(step, record)` pairs in ascending step order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &StatisticsRecord)> + '_ {
        self.records.iter().map(|(step, record)| (*step, record))
    }

    /// The steps at which measurements were taken.
    pub fn steps(&self) -> impl Iterator<Item = usize> + '_ {
        self.records.keys().copied()
    }

    /// The diameter column.
    pub fn diameters(&self) -> Vec<usize> {
        self.records.values().map(|r| r.diameter).collect()
    }

    /// The average path length column.
    pub fn average_path_lengths(&self) -> Vec<f64> {
        self.records.values().map(|r| r.average_path_length).collect()
    }

    /// The largest component fraction column.
    pub fn largest_component_fractions(&self) -> Vec<f64> {
        self.records
            .values()
            .map(|r| r.largest_component_fraction)
            .collect()
    }
}

impl IntoIterator for ResultSeries {
    type Item = (usize, StatisticsRecord);
    type IntoIter = btree_map::IntoIter<usize, StatisticsRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl FromIterator<(usize, StatisticsRecord)> for ResultSeries {
    fn from_iter<I: IntoIterator<Item = (usize, StatisticsRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

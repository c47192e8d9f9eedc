//! Erosion is a small toolkit for simulating how network topologies degrade as their nodes fail or
//! are attacked.
//!
//! # Basic usage
//!
//! A simulation removes vertices from a [`Graph`](graph::Graph) one at a time, chosen by a
//! [`RemovalPolicy`](policy::RemovalPolicy), and periodically measures the diameter, average path
//! length and largest component fraction of what's left.
//!
//! ```rust
//! use std::num::NonZeroUsize;
//!
//! use erosion::{
//!     edge::Edge,
//!     experiment::run_experiment,
//!     graph::Graph,
//!     policy::{DegreeAttack, RandomFailure},
//!     stats::report_statistics,
//! };
//!
//! // A ring of 100 nodes, each also linked to the node 10 hops ahead.
//! let topology = |n: u32| -> Graph<u32> {
//!     (0..n)
//!         .flat_map(|i| [Edge::new(i, (i + 1) % n), Edge::new(i, (i + 10) % n)])
//!         .collect()
//! };
//!
//! let before = report_statistics(&topology(100)).unwrap();
//! assert_eq!(before.largest_component_fraction, 1.0);
//!
//! // Measure after removals 0, 10, 20, ..., 40.
//! let every = NonZeroUsize::new(10).unwrap();
//!
//! let mut graph = topology(100);
//! let failures = run_experiment(&mut graph, 50, RandomFailure::seeded(42), every).unwrap();
//!
//! let mut graph = topology(100);
//! let attack = run_experiment(&mut graph, 50, DegreeAttack, every).unwrap();
//!
//! assert_eq!(failures.len(), 5);
//! assert_eq!(attack.steps().collect::<Vec<_>>(), vec![0, 10, 20, 30, 40]);
//! ```
//!
//! Longer runs can be configured, observed and cancelled through
//! [`Experiment`](experiment::Experiment).

mod betweenness;
pub mod edge;
pub mod error;
pub mod experiment;
pub mod graph;
pub mod network;
mod paths;
pub mod policy;
pub mod results;
mod spectral;
pub mod stats;

pub use error::{ExperimentError, Result, RobustnessError};
pub use paths::PathLengthSummary;

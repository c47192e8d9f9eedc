//! Error types for robustness simulations.
//!
//! [`RobustnessError`] covers the boundary conditions of a single operation (a removal, a
//! measurement, a configuration). [`ExperimentError`] wraps one of those when it aborts a full run
//! and keeps the results gathered up to that point.

use thiserror::Error;

use crate::results::ResultSeries;

/// Convenient result alias for operations that can fail with [`RobustnessError`].
pub type Result<T, E = RobustnessError> = std::result::Result<T, E>;

/// A boundary condition hit by a removal, a measurement or a configuration.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum RobustnessError {
    /// The operation needs at least one vertex.
    #[error("cannot perform {operation} on a graph with no vertices")]
    EmptyGraph {
        /// The operation that was attempted.
        operation: &'static str,
    },
    /// More removals were requested than the graph has vertices.
    #[error("requested {requested} removals but only {available} vertices remain")]
    ExhaustedGraph {
        /// Number of removals requested.
        requested: usize,
        /// Number of vertices available for removal.
        available: usize,
    },
    /// A removal policy picked nothing, or a vertex that isn't part of the graph.
    #[error("removal policy `{policy}` did not select a vertex present in the graph")]
    InvalidSelection {
        /// Name of the offending policy.
        policy: String,
    },
    /// A removal step changed the graph's order by something other than one vertex.
    #[error("removal policy `{policy}` took the graph from {before} to {after} vertices; each step must remove exactly one")]
    UnbalancedRemoval {
        /// Name of the offending policy.
        policy: String,
        /// Order of the graph before the step.
        before: usize,
        /// Order of the graph after the step.
        after: usize,
    },
    /// The caller requested the run to stop.
    #[error("experiment cancelled")]
    Cancelled,
    /// A removal method name didn't match any built-in policy.
    #[error("unknown removal method `{provided}`; expected `random`, `degree` or `betweenness`")]
    UnknownRemovalMethod {
        /// Raw value supplied by the caller.
        provided: String,
    },
    /// The experiment configuration was rejected.
    #[error("invalid experiment configuration: {reason}")]
    InvalidConfig {
        /// Why the configuration was rejected.
        reason: &'static str,
    },
}

/// An experiment that stopped before performing every requested removal.
///
/// Carries the step the run stopped at, the vertices left in the graph and the measurements
/// recorded so far, so long runs can be diagnosed without starting over.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("experiment aborted at step {step} with {remaining} vertices remaining: {source}")]
pub struct ExperimentError {
    step: usize,
    remaining: usize,
    #[source]
    source: RobustnessError,
    partial: ResultSeries,
}

impl ExperimentError {
    pub(crate) fn new(
        step: usize,
        remaining: usize,
        source: RobustnessError,
        partial: ResultSeries,
    ) -> Self {
        Self {
            step,
            remaining,
            source,
            partial,
        }
    }

    /// The removal step at which the run stopped.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Number of vertices left in the graph when the run stopped.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// The condition that stopped the run.
    pub fn cause(&self) -> &RobustnessError {
        &self.source
    }

    /// Measurements recorded before the run stopped.
    pub fn partial(&self) -> &ResultSeries {
        &self.partial
    }

    /// Consumes the error, returning the measurements recorded before the run stopped.
    pub fn into_partial(self) -> ResultSeries {
        self.partial
    }
}

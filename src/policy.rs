//! Removal policies: which vertex goes next.
//!
//! A [`RemovalPolicy`] picks one vertex of the current graph and removes it. The crate ships
//! random failure ([`RandomFailure`]) and two targeted attacks ([`DegreeAttack`],
//! [`BetweennessAttack`]); anything else can be plugged in by implementing the trait or wrapping a
//! selector closure with [`from_fn`].
//!
//! Targeted attacks break ties in favour of the smallest vertex, i.e. the first one in the
//! network's enumeration order, so attack trajectories are reproducible.

use std::{cmp::Reverse, fmt, str::FromStr};

use rand::{rngs::SmallRng, seq::SliceRandom, Rng, SeedableRng};
use tracing::trace;

use crate::{
    error::{Result, RobustnessError},
    network::Network,
};

/// Selects and removes one vertex at a time.
pub trait RemovalPolicy<N: Network> {
    /// A short name used in logs and errors.
    fn name(&self) -> &str;

    /// Picks the next vertex to remove without mutating the graph.
    ///
    /// # Errors
    ///
    /// Returns [`RobustnessError::EmptyGraph`] if the graph has no vertices.
    fn select(&mut self, network: &N) -> Result<N::Vertex>;

    /// Removes the selected vertex and its incident edges, returning the vertex.
    ///
    /// # Errors
    ///
    /// Returns [`RobustnessError::EmptyGraph`] on an empty graph and
    /// [`RobustnessError::InvalidSelection`] if the selected vertex isn't part of the graph.
    fn remove(&mut self, network: &mut N) -> Result<N::Vertex> {
        ensure_not_empty(network)?;

        let vertex = self.select(network)?;
        if !network.remove_vertex(&vertex) {
            return Err(RobustnessError::InvalidSelection {
                policy: self.name().to_owned(),
            });
        }

        trace!(policy = self.name(), ?vertex, remaining = network.vertex_count(), "removed vertex");
        Ok(vertex)
    }
}

impl<N: Network, P: RemovalPolicy<N> + ?Sized> RemovalPolicy<N> for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn select(&mut self, network: &N) -> Result<N::Vertex> {
        (**self).select(network)
    }

    fn remove(&mut self, network: &mut N) -> Result<N::Vertex> {
        (**self).remove(network)
    }
}

impl<N: Network, P: RemovalPolicy<N> + ?Sized> RemovalPolicy<N> for &mut P {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn select(&mut self, network: &N) -> Result<N::Vertex> {
        (**self).select(network)
    }

    fn remove(&mut self, network: &mut N) -> Result<N::Vertex> {
        (**self).remove(network)
    }
}

fn ensure_not_empty<N: Network>(network: &N) -> Result<()> {
    if network.is_empty() {
        return Err(RobustnessError::EmptyGraph {
            operation: "vertex removal",
        });
    }

    Ok(())
}

/// Uniformly random removal, modelling non-adversarial failures.
///
/// The generator is owned by the policy; seed it for reproducible runs.
#[derive(Clone, Debug)]
pub struct RandomFailure<R> {
    rng: R,
}

impl<R: Rng> RandomFailure<R> {
    /// Creates a policy drawing from the given generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Consumes the policy, returning the generator in its current state.
    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl RandomFailure<SmallRng> {
    /// Creates a policy with a generator seeded from `seed`.
    ///
    /// # Examples
    ///
    /// ```
    /// use erosion::{edge::Edge, graph::Graph, policy::{RandomFailure, RemovalPolicy}};
    ///
    /// let mut graph: Graph<u32> = (0..10).map(|i| Edge::new(i, (i + 1) % 10)).collect();
    ///
    /// let mut policy = RandomFailure::seeded(7);
    /// let removed = policy.remove(&mut graph).unwrap();
    ///
    /// assert!(!graph.contains_vertex(&removed));
    /// assert_eq!(graph.vertex_count(), 9);
    /// ```
    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }

    /// Creates a policy with a generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self::new(SmallRng::from_entropy())
    }
}

impl<N: Network, R: Rng> RemovalPolicy<N> for RandomFailure<R> {
    fn name(&self) -> &str {
        "random"
    }

    fn select(&mut self, network: &N) -> Result<N::Vertex> {
        network
            .vertices()
            .choose(&mut self.rng)
            .copied()
            .ok_or(RobustnessError::EmptyGraph {
                operation: "vertex removal",
            })
    }
}

/// Targeted attack on the vertex with the most connections.
#[derive(Clone, Copy, Debug, Default)]
pub struct DegreeAttack;

impl<N: Network> RemovalPolicy<N> for DegreeAttack {
    fn name(&self) -> &str {
        "degree"
    }

    fn select(&mut self, network: &N) -> Result<N::Vertex> {
        // Highest degree first, then smallest vertex.
        network
            .vertices()
            .into_iter()
            .filter_map(|vertex| network.degree(&vertex).map(|degree| (vertex, degree)))
            .min_by_key(|&(vertex, degree)| (Reverse(degree), vertex))
            .map(|(vertex, _)| vertex)
            .ok_or(RobustnessError::EmptyGraph {
                operation: "vertex removal",
            })
    }
}

/// Targeted attack on the vertex lying on the most shortest paths.
///
/// Centrality is recomputed over the whole current graph, disconnected or not, before every
/// removal. The first vertex whose value equals the maximum exactly is chosen; near-ties that
/// differ by floating point noise are not treated as ties.
#[derive(Clone, Copy, Debug, Default)]
pub struct BetweennessAttack;

impl<N: Network> RemovalPolicy<N> for BetweennessAttack {
    fn name(&self) -> &str {
        "betweenness"
    }

    fn select(&mut self, network: &N) -> Result<N::Vertex> {
        let centrality = network.betweenness_centrality();
        let max = centrality.values().copied().fold(f64::NEG_INFINITY, f64::max);

        // The map iterates in ascending vertex order.
        centrality
            .into_iter()
            .find(|(_, value)| *value == max)
            .map(|(vertex, _)| vertex)
            .ok_or(RobustnessError::EmptyGraph {
                operation: "vertex removal",
            })
    }
}

/// A policy built from a selector closure, see [`from_fn`].
pub struct FnPolicy<F> {
    name: String,
    selector: F,
}

impl<F> FnPolicy<F> {
    /// The name given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for FnPolicy<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPolicy").field("name", &self.name).finish()
    }
}

/// Wraps a selector closure as a removal policy.
///
/// The closure sees the current graph and returns the vertex to remove. Returning `None`, or a
/// vertex that isn't part of the graph, fails the removal with
/// [`RobustnessError::InvalidSelection`].
///
/// # Examples
///
/// ```
/// use erosion::{edge::Edge, graph::Graph, policy::{from_fn, RemovalPolicy}};
///
/// let mut graph: Graph<u32> = (0..5).map(|i| Edge::new(i, i + 1)).collect();
///
/// // Always remove the largest vertex.
/// let mut policy = from_fn("largest", |graph: &Graph<u32>| graph.vertices().last().copied());
///
/// assert_eq!(policy.remove(&mut graph), Ok(5));
/// assert_eq!(policy.remove(&mut graph), Ok(4));
/// ```
pub fn from_fn<N, F>(name: impl Into<String>, selector: F) -> FnPolicy<F>
where
    N: Network,
    F: FnMut(&N) -> Option<N::Vertex>,
{
    FnPolicy {
        name: name.into(),
        selector,
    }
}

impl<N, F> RemovalPolicy<N> for FnPolicy<F>
where
    N: Network,
    F: FnMut(&N) -> Option<N::Vertex>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn select(&mut self, network: &N) -> Result<N::Vertex> {
        ensure_not_empty(network)?;

        (self.selector)(network).ok_or_else(|| RobustnessError::InvalidSelection {
            policy: self.name.clone(),
        })
    }
}

/// The built-in removal policies, selectable by name.
///
/// # Examples
///
/// ```
/// use erosion::policy::RemovalMethod;
///
/// assert_eq!("degree".parse(), Ok(RemovalMethod::MaxDegree));
/// assert_eq!("Random".parse(), Ok(RemovalMethod::Random { seed: None }));
/// assert!("closeness".parse::<RemovalMethod>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovalMethod {
    /// Random failure, seeded from `seed` or from the operating system when `None`.
    Random {
        /// Seed for the policy's generator.
        seed: Option<u64>,
    },
    /// Attack on the highest-degree vertex.
    MaxDegree,
    /// Attack on the highest-betweenness vertex.
    MaxBetweenness,
}

impl RemovalMethod {
    /// Instantiates the policy.
    pub fn into_policy<N: Network>(self) -> Box<dyn RemovalPolicy<N>> {
        match self {
            Self::Random { seed: Some(seed) } => Box::new(RandomFailure::seeded(seed)),
            Self::Random { seed: None } => Box::new(RandomFailure::from_entropy()),
            Self::MaxDegree => Box::new(DegreeAttack),
            Self::MaxBetweenness => Box::new(BetweennessAttack),
        }
    }
}

impl Default for RemovalMethod {
    fn default() -> Self {
        Self::Random { seed: None }
    }
}

impl FromStr for RemovalMethod {
    type Err = RobustnessError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "random" | "failure" => Ok(Self::Random { seed: None }),
            "degree" => Ok(Self::MaxDegree),
            "betweenness" => Ok(Self::MaxBetweenness),
            _ => Err(RobustnessError::UnknownRemovalMethod {
                provided: raw.to_owned(),
            }),
        }
    }
}

impl fmt::Display for RemovalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Random { .. } => "random",
            Self::MaxDegree => "degree",
            Self::MaxBetweenness => "betweenness",
        })
    }
}

/// Removes one uniformly random vertex, returning it.
///
/// # Errors
///
/// Returns [`RobustnessError::EmptyGraph`] if the graph has no vertices.
pub fn random_failure<N: Network, R: Rng>(network: &mut N, rng: &mut R) -> Result<N::Vertex> {
    RandomFailure::new(rng).remove(network)
}

/// Removes the vertex with the highest degree (smallest vertex on ties), returning it.
///
/// # Errors
///
/// Returns [`RobustnessError::EmptyGraph`] if the graph has no vertices.
pub fn degree_attack<N: Network>(network: &mut N) -> Result<N::Vertex> {
    DegreeAttack.remove(network)
}

/// Removes the vertex with the highest betweenness centrality (smallest vertex on ties),
/// returning it.
///
/// # Errors
///
/// Returns [`RobustnessError::EmptyGraph`] if the graph has no vertices.
pub fn betweenness_attack<N: Network>(network: &mut N) -> Result<N::Vertex> {
    BetweennessAttack.remove(network)
}

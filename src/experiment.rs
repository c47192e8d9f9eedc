//! Running removal experiments.
//!
//! An [`Experiment`] removes vertices one at a time with a [`RemovalPolicy`] and measures the
//! graph every few removals, collecting a [`ResultSeries`]. Runs are strictly sequential: each
//! removal sees the graph left by the previous one.

use std::{
    num::NonZeroUsize,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use tracing::{debug, info, instrument, warn};

use crate::{
    error::{ExperimentError, Result, RobustnessError},
    network::Network,
    policy::RemovalPolicy,
    results::{ResultSeries, StatisticsRecord},
    stats::report_statistics_with,
};

/// Removals between two measurements unless configured otherwise.
pub const DEFAULT_MEASURE_EVERY: usize = 20;

/// A flag a caller can raise, from any thread, to stop a running experiment.
///
/// The runner checks it once before every removal.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a token that hasn't been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every experiment holding a clone of this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Observer notified as an experiment progresses.
///
/// Notifications are synchronous and purely informational, the observer can't alter the run.
/// Every method defaults to doing nothing; `()` is the silent observer.
pub trait Progress {
    /// Called once before the first removal.
    fn on_start(&mut self, _total: usize) {}

    /// Called after each removal with the number of vertices left.
    fn on_removal(&mut self, _step: usize, _remaining: usize) {}

    /// Called after each measurement, before it is added to the series.
    fn on_measurement(&mut self, _step: usize, _record: &StatisticsRecord) {}

    /// Called once after the last removal of a successful run.
    fn on_finish(&mut self, _results: &ResultSeries) {}
}

impl Progress for () {}

/// Configures and constructs [`Experiment`] instances.
///
/// # Examples
///
/// ```
/// use erosion::experiment::ExperimentBuilder;
///
/// let experiment = ExperimentBuilder::new()
///     .with_num_removals(100)
///     .with_measure_every(10)
///     .build()
///     .expect("configuration is valid");
///
/// assert_eq!(experiment.num_removals(), 100);
/// assert_eq!(experiment.measure_every().get(), 10);
/// ```
#[derive(Clone, Debug)]
pub struct ExperimentBuilder {
    num_removals: usize,
    measure_every: usize,
    spectral: bool,
    cancellation: Option<CancellationToken>,
}

impl Default for ExperimentBuilder {
    fn default() -> Self {
        Self {
            num_removals: 0,
            measure_every: DEFAULT_MEASURE_EVERY,
            spectral: false,
            cancellation: None,
        }
    }
}

impl ExperimentBuilder {
    /// Creates a builder populated with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many vertices to remove.
    pub fn with_num_removals(mut self, num_removals: usize) -> Self {
        self.num_removals = num_removals;
        self
    }

    /// Sets the number of removals between measurements. Measurements are taken after every
    /// removal whose 0-based step is a multiple of it.
    pub fn with_measure_every(mut self, measure_every: usize) -> Self {
        self.measure_every = measure_every;
        self
    }

    /// Also measures the algebraic connectivity of the largest component.
    pub fn with_spectral(mut self, spectral: bool) -> Self {
        self.spectral = spectral;
        self
    }

    /// Lets the run be stopped early through `token`.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Validates the configuration and constructs an [`Experiment`].
    ///
    /// # Errors
    ///
    /// Returns [`RobustnessError::InvalidConfig`] if the measurement interval is zero.
    pub fn build(self) -> Result<Experiment> {
        let measure_every =
            NonZeroUsize::new(self.measure_every).ok_or(RobustnessError::InvalidConfig {
                reason: "measurement interval must be at least one removal",
            })?;

        Ok(Experiment {
            num_removals: self.num_removals,
            measure_every,
            spectral: self.spectral,
            cancellation: self.cancellation,
        })
    }
}

/// A configured removal experiment, reusable across graphs.
#[derive(Clone, Debug)]
pub struct Experiment {
    num_removals: usize,
    measure_every: NonZeroUsize,
    spectral: bool,
    cancellation: Option<CancellationToken>,
}

impl Experiment {
    /// Shorthand for [`ExperimentBuilder::new`].
    pub fn builder() -> ExperimentBuilder {
        ExperimentBuilder::new()
    }

    /// Number of removals performed by a run.
    pub fn num_removals(&self) -> usize {
        self.num_removals
    }

    /// Number of removals between measurements.
    pub fn measure_every(&self) -> NonZeroUsize {
        self.measure_every
    }

    /// Whether the algebraic connectivity is measured.
    pub fn spectral(&self) -> bool {
        self.spectral
    }

    /// Runs the experiment on `network`, see [`Experiment::run_with`].
    pub fn run<N, P>(&self, network: &mut N, policy: P) -> Result<ResultSeries, ExperimentError>
    where
        N: Network,
        P: RemovalPolicy<N>,
    {
        self.run_with(network, policy, &mut ())
    }

    /// Removes [`Experiment::num_removals`] vertices from `network` with `policy`, measuring the
    /// graph after every step that is a multiple of [`Experiment::measure_every`].
    ///
    /// The graph is mutated in place and left in its final state, even when the run fails.
    ///
    /// # Errors
    ///
    /// The returned [`ExperimentError`] carries the measurements taken so far. A run fails:
    ///
    /// - up front, without touching the graph, with [`RobustnessError::ExhaustedGraph`] if more
    ///   removals are requested than the graph has vertices;
    /// - with [`RobustnessError::Cancelled`] once the cancellation token is raised;
    /// - with [`RobustnessError::UnbalancedRemoval`] if a step removes anything but exactly one
    ///   vertex;
    /// - with [`RobustnessError::EmptyGraph`] if a measurement falls on a graph emptied by the last
    ///   removal;
    /// - with whatever error the policy returns.
    #[instrument(
        level = "info",
        skip_all,
        fields(
            policy = policy.name(),
            num_removals = self.num_removals,
            measure_every = self.measure_every.get(),
        )
    )]
    pub fn run_with<N, P, O>(
        &self,
        network: &mut N,
        mut policy: P,
        progress: &mut O,
    ) -> Result<ResultSeries, ExperimentError>
    where
        N: Network,
        P: RemovalPolicy<N>,
        O: Progress + ?Sized,
    {
        let mut results = ResultSeries::new();
        let available = network.vertex_count();

        if self.num_removals > available {
            let cause = RobustnessError::ExhaustedGraph {
                requested: self.num_removals,
                available,
            };
            warn!(%cause, "rejecting experiment");
            return Err(ExperimentError::new(0, available, cause, results));
        }

        info!(
            vertices = available,
            edges = network.edge_count(),
            "starting experiment"
        );
        progress.on_start(self.num_removals);

        for step in 0..self.num_removals {
            if let Err(cause) = self.step(step, network, &mut policy, &mut results, progress) {
                let remaining = network.vertex_count();
                warn!(step, remaining, %cause, "experiment aborted");
                return Err(ExperimentError::new(step, remaining, cause, results));
            }
        }

        progress.on_finish(&results);
        info!(
            records = results.len(),
            remaining = network.vertex_count(),
            "experiment finished"
        );

        Ok(results)
    }

    fn step<N, P, O>(
        &self,
        step: usize,
        network: &mut N,
        policy: &mut P,
        results: &mut ResultSeries,
        progress: &mut O,
    ) -> Result<()>
    where
        N: Network,
        P: RemovalPolicy<N>,
        O: Progress + ?Sized,
    {
        if self
            .cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            return Err(RobustnessError::Cancelled);
        }

        if network.is_empty() {
            return Err(RobustnessError::ExhaustedGraph {
                requested: self.num_removals - step,
                available: 0,
            });
        }

        let before = network.vertex_count();
        policy.remove(network)?;

        let after = network.vertex_count();
        if after + 1 != before {
            return Err(RobustnessError::UnbalancedRemoval {
                policy: policy.name().to_owned(),
                before,
                after,
            });
        }
        progress.on_removal(step, after);

        if step % self.measure_every.get() == 0 {
            let record = report_statistics_with(&*network, self.spectral)?;

            debug!(
                step,
                diameter = record.diameter,
                average_path_length = record.average_path_length,
                largest_component_fraction = record.largest_component_fraction,
                "measured graph"
            );
            progress.on_measurement(step, &record);
            results.insert(step, record);
        }

        Ok(())
    }
}

/// Removes `num_removals` vertices from `network` with `policy`, measuring every
/// `measure_every` removals (at steps `0`, `measure_every`, `2 * measure_every`, ...).
///
/// # Errors
///
/// See [`Experiment::run_with`].
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use erosion::{edge::Edge, experiment::run_experiment, graph::Graph, policy::DegreeAttack};
///
/// // A ring of 50 vertices.
/// let mut graph: Graph<u32> = (0..50).map(|i| Edge::new(i, (i + 1) % 50)).collect();
///
/// let every = NonZeroUsize::new(10).unwrap();
/// let results = run_experiment(&mut graph, 30, DegreeAttack, every).unwrap();
///
/// assert_eq!(results.steps().collect::<Vec<_>>(), vec![0, 10, 20]);
/// // The first removal opens the ring into a path of 49 vertices.
/// assert_eq!(results.get(0).unwrap().diameter, 48);
/// assert_eq!(graph.vertex_count(), 20);
/// ```
pub fn run_experiment<N, P>(
    network: &mut N,
    num_removals: usize,
    policy: P,
    measure_every: NonZeroUsize,
) -> Result<ResultSeries, ExperimentError>
where
    N: Network,
    P: RemovalPolicy<N>,
{
    let experiment = Experiment {
        num_removals,
        measure_every,
        spectral: false,
        cancellation: None,
    };

    experiment.run(network, policy)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{
        edge::Edge,
        graph::Graph,
        policy::{from_fn, DegreeAttack, RandomFailure, RemovalMethod},
    };

    fn ring(n: u32) -> Graph<u32> {
        (0..n).map(|i| Edge::new(i, (i + 1) % n)).collect()
    }

    fn experiment(num_removals: usize, measure_every: usize) -> Experiment {
        Experiment::builder()
            .with_num_removals(num_removals)
            .with_measure_every(measure_every)
            .build()
            .expect("configuration is valid")
    }

    #[derive(Default)]
    struct Recorder {
        total: Option<usize>,
        removals: Vec<(usize, usize)>,
        measurements: Vec<usize>,
        finished: bool,
    }

    impl Progress for Recorder {
        fn on_start(&mut self, total: usize) {
            self.total = Some(total);
        }

        fn on_removal(&mut self, step: usize, remaining: usize) {
            self.removals.push((step, remaining));
        }

        fn on_measurement(&mut self, step: usize, _record: &StatisticsRecord) {
            self.measurements.push(step);
        }

        fn on_finish(&mut self, _results: &ResultSeries) {
            self.finished = true;
        }
    }

    #[test]
    fn builder_defaults() {
        let experiment = Experiment::builder().build().unwrap();

        assert_eq!(experiment.num_removals(), 0);
        assert_eq!(experiment.measure_every().get(), DEFAULT_MEASURE_EVERY);
        assert!(!experiment.spectral());
    }

    #[test]
    fn builder_rejects_zero_interval() {
        let err = Experiment::builder().with_measure_every(0).build().unwrap_err();

        assert!(matches!(err, RobustnessError::InvalidConfig { .. }));
    }

    #[test]
    fn measures_every_interval() {
        let mut graph = ring(120);

        let results = experiment(100, 20)
            .run(&mut graph, RandomFailure::seeded(5))
            .unwrap();

        assert_eq!(results.steps().collect::<Vec<_>>(), vec![0, 20, 40, 60, 80]);
        assert_eq!(graph.vertex_count(), 20);
    }

    #[test]
    fn zero_removals() {
        let mut graph = ring(5);

        let results = experiment(0, 1).run(&mut graph, DegreeAttack).unwrap();

        assert!(results.is_empty());
        assert_eq!(graph, ring(5));
    }

    #[test]
    fn rejects_more_removals_than_vertices() {
        let mut graph = ring(10);

        let err = experiment(11, 1)
            .run(&mut graph, RandomFailure::seeded(1))
            .unwrap_err();

        assert_eq!(
            err.cause(),
            &RobustnessError::ExhaustedGraph {
                requested: 11,
                available: 10
            }
        );
        assert_eq!(err.step(), 0);
        assert_eq!(err.remaining(), 10);
        assert!(err.partial().is_empty());

        // The graph is left untouched.
        assert_eq!(graph, ring(10));
    }

    #[test]
    fn removing_every_vertex_is_allowed_without_a_final_measurement() {
        let mut graph = ring(6);

        // Measurements at 0 and 4, the sixth removal (step 5) is not measured.
        let results = experiment(6, 4).run(&mut graph, DegreeAttack).unwrap();

        assert_eq!(results.steps().collect::<Vec<_>>(), vec![0, 4]);
        assert!(graph.is_empty());
    }

    #[test]
    fn measuring_an_emptied_graph_keeps_partial_results() {
        let mut graph = ring(5);

        let err = experiment(5, 1).run(&mut graph, DegreeAttack).unwrap_err();

        assert_eq!(
            err.cause(),
            &RobustnessError::EmptyGraph {
                operation: "statistics"
            }
        );
        assert_eq!(err.step(), 4);
        assert_eq!(err.remaining(), 0);
        assert_eq!(err.partial().steps().collect::<Vec<_>>(), vec![0, 1, 2, 3]);

        // One vertex left at step 3.
        let last = err.partial().get(3).unwrap();
        assert_eq!(last.diameter, 0);
        assert_eq!(last.largest_component_fraction, 1.0);
    }

    #[test]
    fn cancellation_stops_the_run() {
        struct CancelAt {
            step: usize,
            token: CancellationToken,
        }

        impl Progress for CancelAt {
            fn on_measurement(&mut self, step: usize, _record: &StatisticsRecord) {
                if step == self.step {
                    self.token.cancel();
                }
            }
        }

        let token = CancellationToken::new();
        let mut observer = CancelAt {
            step: 20,
            token: token.clone(),
        };
        let mut graph = ring(100);

        let err = Experiment::builder()
            .with_num_removals(90)
            .with_measure_every(10)
            .with_cancellation(token.clone())
            .build()
            .unwrap()
            .run_with(&mut graph, DegreeAttack, &mut observer)
            .unwrap_err();

        assert!(token.is_cancelled());
        assert_eq!(err.cause(), &RobustnessError::Cancelled);
        assert_eq!(err.step(), 21);
        assert_eq!(err.remaining(), 79);
        assert_eq!(err.into_partial().steps().collect::<Vec<_>>(), vec![0, 10, 20]);
    }

    #[test]
    fn policy_errors_abort_the_run() {
        let mut graph = ring(10);
        let mut calls = 0;
        let policy = from_fn("flaky", move |graph: &Graph<u32>| {
            calls += 1;
            (calls < 4).then(|| *graph.vertices().next().unwrap())
        });

        let err = experiment(8, 2).run(&mut graph, policy).unwrap_err();

        assert_eq!(
            err.cause(),
            &RobustnessError::InvalidSelection {
                policy: "flaky".to_owned()
            }
        );
        assert_eq!(err.step(), 3);
        assert_eq!(err.remaining(), 7);
        assert_eq!(err.partial().steps().collect::<Vec<_>>(), vec![0, 2]);
    }

    /// Overrides `remove` to take out `count` vertices per step, lowest first.
    struct Takes {
        count: usize,
    }

    impl RemovalPolicy<Graph<u32>> for Takes {
        fn name(&self) -> &str {
            "takes"
        }

        fn select(&mut self, graph: &Graph<u32>) -> Result<u32> {
            graph.vertices().next().copied().ok_or(RobustnessError::EmptyGraph {
                operation: "vertex removal",
            })
        }

        fn remove(&mut self, graph: &mut Graph<u32>) -> Result<u32> {
            let vertex = self.select(graph)?;
            let doomed: Vec<u32> = graph.vertices().take(self.count).copied().collect();
            for vertex in &doomed {
                graph.remove_vertex(vertex);
            }
            Ok(vertex)
        }
    }

    #[rstest]
    #[case::removes_nothing(0, 5)]
    #[case::removes_two(2, 3)]
    fn steps_must_remove_exactly_one_vertex(#[case] count: usize, #[case] after: usize) {
        let mut graph: Graph<u32> = (0..4).map(|i| Edge::new(i, i + 1)).collect();

        let err = experiment(5, 1)
            .run(&mut graph, Takes { count })
            .unwrap_err();

        assert_eq!(
            err.cause(),
            &RobustnessError::UnbalancedRemoval {
                policy: "takes".to_owned(),
                before: 5,
                after,
            }
        );
        assert_eq!(err.step(), 0);
        assert!(err.partial().is_empty());
    }

    #[test]
    fn borrowed_policies_keep_their_state() {
        let mut picks = Vec::new();
        let mut policy = from_fn("lowest", |graph: &Graph<u32>| {
            let vertex = *graph.vertices().next()?;
            picks.push(vertex);
            Some(vertex)
        });

        experiment(3, 1).run(&mut ring(10), &mut policy).unwrap();
        experiment(2, 1).run(&mut ring(10), &mut policy).unwrap();
        drop(policy);

        assert_eq!(picks, vec![0, 1, 2, 0, 1]);
    }

    #[test]
    fn progress_is_reported() {
        let mut graph = ring(10);
        let mut recorder = Recorder::default();

        experiment(4, 3)
            .run_with(&mut graph, DegreeAttack, &mut recorder)
            .unwrap();

        assert_eq!(recorder.total, Some(4));
        assert_eq!(recorder.removals, vec![(0, 9), (1, 8), (2, 7), (3, 6)]);
        assert_eq!(recorder.measurements, vec![0, 3]);
        assert!(recorder.finished);
    }

    #[test]
    fn spectral_measurements() {
        let mut graph = ring(12);

        let results = Experiment::builder()
            .with_num_removals(3)
            .with_measure_every(1)
            .with_spectral(true)
            .build()
            .unwrap()
            .run(&mut graph, DegreeAttack)
            .unwrap();

        assert!(results
            .iter()
            .all(|(_, record)| record.algebraic_connectivity.is_some()));
    }

    #[test]
    fn named_methods() {
        for method in [
            RemovalMethod::Random { seed: Some(9) },
            RemovalMethod::MaxDegree,
            RemovalMethod::MaxBetweenness,
        ] {
            let mut graph = ring(30);
            let results = experiment(25, 5)
                .run(&mut graph, method.into_policy())
                .unwrap();

            assert_eq!(results.len(), 5, "{method}");
            assert_eq!(graph.vertex_count(), 5, "{method}");
        }
    }

    #[test]
    fn free_function_matches_the_runner() {
        let every = NonZeroUsize::new(7).unwrap();

        let mut a = ring(40);
        let mut b = ring(40);

        let free = run_experiment(&mut a, 30, RandomFailure::seeded(2), every).unwrap();
        let runner = experiment(30, 7)
            .run(&mut b, RandomFailure::seeded(2))
            .unwrap();

        assert_eq!(free, runner);
        assert_eq!(a, b);
    }
}

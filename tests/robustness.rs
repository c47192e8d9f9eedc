use std::{collections::BTreeMap, num::NonZeroUsize};

use erosion::{
    edge::Edge,
    experiment::{run_experiment, Experiment},
    graph::Graph,
    network::Network,
    policy::{BetweennessAttack, DegreeAttack, RandomFailure, RemovalMethod, RemovalPolicy},
    stats::report_statistics,
    PathLengthSummary, RobustnessError,
};
use proptest::{collection::vec, prelude::*};

/// Graphs of 2 to 24 vertices with arbitrary edges, isolated vertices included.
fn graph_strategy() -> impl Strategy<Value = Graph<u32>> {
    (2u32..25).prop_flat_map(|order| {
        vec((0..order, 0..order), 0..(order as usize * 2)).prop_map(move |pairs| {
            let mut graph = Graph::new();
            for vertex in 0..order {
                graph.insert_vertex(vertex);
            }
            graph.extend(pairs.into_iter().map(Edge::from));
            graph
        })
    })
}

fn every(interval: usize) -> NonZeroUsize {
    NonZeroUsize::new(interval).expect("interval must be non-zero")
}

proptest! {
    #[test]
    fn degree_attack_removes_a_highest_degree_vertex(graph in graph_strategy()) {
        let max = graph.vertices().filter_map(|v| graph.degree(v)).max().unwrap();
        let first = graph.vertices().copied().find(|v| graph.degree(v) == Some(max)).unwrap();

        let mut graph = graph;
        let removed = DegreeAttack.remove(&mut graph).unwrap();

        prop_assert_eq!(removed, first);
        prop_assert!(!graph.contains_vertex(&removed));
    }

    #[test]
    fn betweenness_attack_removes_a_most_central_vertex(graph in graph_strategy()) {
        let centrality = graph.betweenness_centrality();
        let max = centrality.values().copied().fold(f64::NEG_INFINITY, f64::max);

        let mut graph = graph;
        let removed = BetweennessAttack.remove(&mut graph).unwrap();

        prop_assert_eq!(centrality[&removed], max);
        prop_assert!(centrality.range(..removed).all(|(_, value)| *value < max));
    }

    #[test]
    fn statistics_stay_in_range(graph in graph_strategy()) {
        let record = report_statistics(&graph).unwrap();
        let largest = graph.connected_components()[0].len();

        prop_assert!(record.largest_component_fraction > 0.0);
        prop_assert!(record.largest_component_fraction <= 1.0);
        prop_assert!(record.diameter < largest);

        if largest > 1 {
            prop_assert!(record.average_path_length >= 1.0);
            prop_assert!(record.average_path_length <= record.diameter as f64);
        } else {
            prop_assert_eq!(record.average_path_length, 0.0);
        }
    }

    #[test]
    fn failing_all_but_one_vertex_leaves_a_whole_graph(graph in graph_strategy(), seed: u64) {
        let mut graph = graph;
        let removals = graph.vertex_count() - 1;

        let results = run_experiment(&mut graph, removals, RandomFailure::seeded(seed), every(1))
            .unwrap();
        let (step, last) = results.last().unwrap();

        prop_assert_eq!(step, removals - 1);
        prop_assert_eq!(last.largest_component_fraction, 1.0);
        prop_assert_eq!(last.diameter, 0);
        prop_assert_eq!(last.average_path_length, 0.0);
        prop_assert_eq!(graph.vertex_count(), 1);
    }

    #[test]
    fn one_record_per_interval(
        graph in graph_strategy(),
        interval in 1usize..10,
        share in 0.0f64..1.0,
    ) {
        let mut graph = graph;
        // Keep at least one vertex so every measurement succeeds.
        let removals = ((graph.vertex_count() - 1) as f64 * share) as usize;

        let results = run_experiment(&mut graph, removals, DegreeAttack, every(interval)).unwrap();

        prop_assert_eq!(results.len(), removals.div_ceil(interval));
        prop_assert!(results.steps().all(|step| step % interval == 0 && step < removals));
    }

    #[test]
    fn seeded_runs_are_reproducible(graph in graph_strategy(), seed: u64) {
        let removals = graph.vertex_count() / 2;
        let mut a = graph.clone();
        let mut b = graph;

        let first = run_experiment(&mut a, removals, RandomFailure::seeded(seed), every(1)).unwrap();
        let second = run_experiment(&mut b, removals, RandomFailure::seeded(seed), every(1)).unwrap();

        prop_assert_eq!(first, second);
        prop_assert_eq!(a, b);
    }
}

#[test]
fn attacks_are_more_damaging_than_failures() {
    // A hub connected to 40 leaves, with the leaves chained in pairs.
    let mut graph = Graph::new();
    let leaves: Vec<u32> = (1..=40).collect();
    graph.insert_subset(0, &leaves);
    for pair in leaves.chunks(2) {
        graph.insert(Edge::new(pair[0], pair[1]));
    }

    let experiment = Experiment::builder()
        .with_num_removals(1)
        .with_measure_every(1)
        .build()
        .unwrap();

    let mut attacked = graph.clone();
    let attack = experiment
        .run(&mut attacked, RemovalMethod::MaxDegree.into_policy())
        .unwrap();

    let mut failed = graph;
    let failure = experiment
        .run(&mut failed, RemovalMethod::Random { seed: Some(3) }.into_policy())
        .unwrap();

    // Taking out the hub shatters the graph into pairs.
    assert!(!attacked.contains_vertex(&0));
    assert_eq!(attack.get(0).unwrap().largest_component_fraction, 2.0 / 40.0);
    assert_eq!(attack.get(0).unwrap().diameter, 1);

    // Unless the hub is hit, the 40 survivors stay connected through it.
    let expected = if failed.contains_vertex(&0) { 1.0 } else { 2.0 / 40.0 };
    assert_eq!(failure.get(0).unwrap().largest_component_fraction, expected);
}

#[test]
fn exhausting_the_graph_is_rejected_up_front() {
    let mut graph: Graph<u32> = (0..4).map(|i| Edge::new(i, i + 1)).collect();
    let before = graph.clone();

    let err = run_experiment(&mut graph, 6, DegreeAttack, every(1)).unwrap_err();

    assert_eq!(
        err.cause(),
        &RobustnessError::ExhaustedGraph {
            requested: 6,
            available: 5
        }
    );
    assert_eq!(graph, before);
}

/// A graph that remembers the order its vertices were removed in.
#[derive(Debug, Default)]
struct Journaled {
    graph: Graph<u32>,
    removed: Vec<u32>,
}

impl Network for Journaled {
    type Vertex = u32;

    fn vertices(&self) -> Vec<u32> {
        self.graph.vertices().copied().collect()
    }

    fn vertex_count(&self) -> usize {
        self.graph.vertex_count()
    }

    fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn contains_vertex(&self, vertex: &u32) -> bool {
        self.graph.contains_vertex(vertex)
    }

    fn degree(&self, vertex: &u32) -> Option<usize> {
        self.graph.degree(vertex)
    }

    fn remove_vertex(&mut self, vertex: &u32) -> bool {
        let removed = self.graph.remove_vertex(vertex);
        if removed {
            self.removed.push(*vertex);
        }
        removed
    }

    fn connected_components(&self) -> Vec<Vec<u32>> {
        self.graph.connected_components()
    }

    fn subgraph(&self, vertices: &[u32]) -> Self {
        Self {
            graph: self.graph.subgraph(vertices),
            removed: Vec::new(),
        }
    }

    fn shortest_path_lengths(&self, source: &u32) -> BTreeMap<u32, usize> {
        self.graph.shortest_path_lengths(source)
    }

    fn betweenness_centrality(&self) -> BTreeMap<u32, f64> {
        self.graph.betweenness_centrality()
    }

    fn algebraic_connectivity(&self) -> f64 {
        self.graph.algebraic_connectivity()
    }
}

#[test]
fn custom_networks_plug_into_the_runner() {
    // A path 0 - 1 - 2 - 3 - 4 - 5 - 6.
    let mut network = Journaled {
        graph: (0..6).map(|i| Edge::new(i, i + 1)).collect(),
        ..Default::default()
    };

    // The provided summary agrees with the graph's own.
    let summary: PathLengthSummary = Network::path_length_summary(&network);
    assert_eq!(summary, network.graph.path_length_summary());

    let results = run_experiment(&mut network, 3, BetweennessAttack, every(1)).unwrap();

    // The centre goes first, then the centres of what's left.
    assert_eq!(network.removed, vec![3, 1, 5]);
    assert_eq!(results.largest_component_fractions(), vec![0.5, 0.6, 0.25]);
    assert_eq!(results.last().unwrap().1.diameter, 0);
}

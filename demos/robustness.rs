use std::{env, error::Error};

use erosion::{
    edge::Edge,
    experiment::{Experiment, Progress},
    graph::Graph,
    policy::RemovalMethod,
    results::{ResultSeries, StatisticsRecord},
    stats::report_statistics,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

const ORDER: u32 = 200;
const CHORD: u32 = 17;
const REMOVALS: usize = 120;
const MEASURE_EVERY: usize = 20;
const SEED: u64 = 2024;

// A ring where every node also links to the node `CHORD` hops ahead.
fn ring_with_chords() -> Graph<u32> {
    (0..ORDER)
        .flat_map(|i| [Edge::new(i, (i + 1) % ORDER), Edge::new(i, (i + CHORD) % ORDER)])
        .collect()
}

// Draws removals on a progress bar and shows the latest measurement beside it.
struct Bar(ProgressBar);

impl Bar {
    fn new(method: RemovalMethod) -> Result<Self, Box<dyn Error>> {
        let bar = ProgressBar::new(0);
        bar.set_style(ProgressStyle::default_bar().template(
            "{prefix:>12} [{bar:30.cyan/blue}] {pos}/{len} {msg}",
        )?);
        bar.set_prefix(method.to_string());
        Ok(Self(bar))
    }
}

impl Progress for Bar {
    fn on_start(&mut self, total: usize) {
        self.0.set_length(total as u64);
    }

    fn on_removal(&mut self, step: usize, _remaining: usize) {
        self.0.set_position(step as u64 + 1);
    }

    fn on_measurement(&mut self, _step: usize, record: &StatisticsRecord) {
        self.0.set_message(format!(
            "largest component {:.2}",
            record.largest_component_fraction
        ));
    }

    fn on_finish(&mut self, _results: &ResultSeries) {
        self.0.finish_and_clear();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Try `RUST_LOG=erosion=debug` to follow the measurements.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Either the methods named on the command line, or all of them.
    let methods = env::args()
        .skip(1)
        .map(|arg| arg.parse::<RemovalMethod>())
        .collect::<Result<Vec<_>, _>>()?;
    let methods = if methods.is_empty() {
        vec![
            RemovalMethod::Random { seed: None },
            RemovalMethod::MaxDegree,
            RemovalMethod::MaxBetweenness,
        ]
    } else {
        methods
    };

    let graph = ring_with_chords();
    let baseline = report_statistics(&graph)?;
    println!(
        "\n{} nodes, {} edges: diameter {}, average path length {:.3}",
        graph.vertex_count(),
        graph.edge_count(),
        baseline.diameter,
        baseline.average_path_length,
    );

    let experiment = Experiment::builder()
        .with_num_removals(REMOVALS)
        .with_measure_every(MEASURE_EVERY)
        .build()?;

    for method in methods {
        // Seed random failures so runs can be compared.
        let method = match method {
            RemovalMethod::Random { seed: None } => RemovalMethod::Random { seed: Some(SEED) },
            other => other,
        };

        let mut graph = ring_with_chords();
        let mut bar = Bar::new(method)?;
        let results = experiment.run_with(&mut graph, method.into_policy(), &mut bar)?;

        println!("\n{method}");
        println!("{:>6} {:>9} {:>12} {:>9}", "step", "diameter", "avg. length", "largest");
        for (step, record) in results.iter() {
            println!(
                "{:>6} {:>9} {:>12.3} {:>9.3}",
                step, record.diameter, record.average_path_length, record.largest_component_fraction,
            );
        }
    }

    Ok(())
}

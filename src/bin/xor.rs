use std::env;
use std::fs;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format;

use shallow::linear_algebra::Value;
use shallow::loss::mse;
use shallow::{Activation, Network};

const SAMPLES: [([Value; 2], [Value; 1]); 4] = [
    ([0.0, 0.0], [0.0]),
    ([0.0, 1.0], [1.0]),
    ([1.0, 0.0], [1.0]),
    ([1.0, 1.0], [0.0]),
];

/// Trains a network on XOR and writes the result as JSON.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The number of hidden nodes.
    #[arg(long, default_value_t = 4)]
    hidden: usize,

    /// The number of passes over the four XOR samples.
    #[arg(short, long, default_value_t = 20_000)]
    iterations: usize,

    #[arg(short, long, default_value_t = 0.1)]
    learning_rate: Value,

    /// The activation function. (sigmoid or tanh)
    #[arg(short, long, default_value = "sigmoid", value_parser = parse_activation)]
    activation: &'static Activation,

    /// Seeds the random weights. Uses entropy if not given.
    #[arg(short, long)]
    seed: Option<u64>,

    /// A file to write the trained network to. Prints to stdout if not given.
    #[arg(short, long)]
    output: Option<String>,
}

fn parse_activation(name: &str) -> Result<&'static Activation, String> {
    Activation::by_name(name).ok_or_else(|| format!("unknown activation function \"{name}\""))
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    let event_format = format().with_target(false).without_time();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .event_format(event_format)
        .init();

    let args = Args::parse();
    debug!(?args, "Starting.");

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut network = Network::new(2, args.hidden, 1, &mut rng);
    network.set_learning_rate(args.learning_rate);
    network.set_activation(args.activation);

    let report_interval = (args.iterations / 10).max(1);

    for iteration in 1..=args.iterations {
        for (input, target) in &SAMPLES {
            network.train(input, target).expect("sample does not fit network");
        }

        if iteration % report_interval == 0 {
            info!(iteration, error = average_error(&network), "Training...");
        }
    }

    for (input, target) in &SAMPLES {
        let output = network.predict(input).expect("sample does not fit network");
        info!(?input, ?target, ?output, "Prediction");
    }

    let json = network.to_json().expect("could not serialize network");

    match args.output {
        Some(file) => {
            fs::write(&file, json).expect("could not write network file");
            info!(%file, "Wrote network.");
        }
        None => println!("{json}"),
    }
}

fn average_error(network: &Network) -> Value {
    let total: Value = SAMPLES
        .iter()
        .map(|(input, target)| {
            let output = network.predict(input).expect("sample does not fit network");
            mse(&output, target).expect("sample does not fit network")
        })
        .sum();

    total / SAMPLES.len() as Value
}

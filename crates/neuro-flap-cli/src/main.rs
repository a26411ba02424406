use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use neuro_flap_core::agent::should_jump;
use neuro_flap_core::{DecisionNetwork, Flock, GameConfig, NetworkParams, Pipe};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "neuro-flap")]
#[command(version)]
#[command(about = "Decision networks for the neuro-flap pipe course", long_about = None)]
struct Cli {
    /// Game constants as JSON; missing fields use the defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a randomly initialised network to a params file.
    Init {
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Summarise a params file.
    Inspect { params: PathBuf },
    /// Run one decision for a sensor vector.
    Decide {
        params: PathBuf,
        /// vertical offset, horizontal offset, altitude
        #[arg(long, num_args = 3, value_names = ["VERTICAL", "HORIZONTAL", "ALTITUDE"], allow_negative_numbers = true)]
        sensors: Vec<f64>,
    },
    /// Time flock steps over a scrolling two-pipe lane.
    Bench {
        #[arg(long, default_value_t = 1000)]
        birds: usize,
        #[arg(long, default_value_t = 500)]
        ticks: u32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(GameConfig::default()),
    }
}

fn load_network(path: &Path) -> Result<DecisionNetwork> {
    let params = NetworkParams::load(path)
        .with_context(|| format!("reading params from {}", path.display()))?;
    DecisionNetwork::try_from(&params)
        .with_context(|| format!("adopting params from {}", path.display()))
}

fn init(out: &Path, seed: u64) -> Result<()> {
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    let network = DecisionNetwork::random(&mut rng);
    network
        .to_params()
        .save(out)
        .with_context(|| format!("writing params to {}", out.display()))?;
    info!(seed, path = %out.display(), "wrote random network");
    Ok(())
}

fn inspect(path: &Path, config: &GameConfig) -> Result<()> {
    let network = load_network(path)?;
    println!("weights1:");
    for row in network.weights1() {
        println!("  {row:?}");
    }
    println!("biases1: {:?}", network.biases1());
    println!("weights2:");
    for row in network.weights2() {
        println!("  {row:?}");
    }
    println!("biases2: {:?}", network.biases2());

    // A bird level with the gap, one screen-quarter away from the next pipe.
    let [_, y] = config.spawn_point();
    let sample = [0.0, f64::from(config.screen_width) / 4.0, y];
    let output = network.forward(&sample);
    println!(
        "sample {sample:?} -> {output:.6} ({})",
        if should_jump(output) { "jump" } else { "glide" }
    );
    Ok(())
}

fn decide(path: &Path, sensors: &[f64]) -> Result<()> {
    let network = load_network(path)?;
    let input: [f64; DecisionNetwork::INPUT_SIZE] = sensors
        .try_into()
        .context("expected exactly three sensor values")?;
    let output = network.forward(&input);
    println!("{output}");
    println!("{}", if should_jump(output) { "jump" } else { "glide" });
    Ok(())
}

fn bench(config: GameConfig, birds: usize, ticks: u32, seed: u64) -> Result<()> {
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    let mut flock = Flock::spawn_random(config.clone(), birds, &mut rng)?;
    let width = f64::from(config.screen_width);
    let mut pipes = vec![
        Pipe::with_gap(width + 2.0, 150.0, config.gap_size),
        Pipe::with_gap(width * 1.5 + 2.0, 220.0, config.gap_size),
    ];
    info!(birds, ticks, seed, "benchmarking flock steps");

    let start = Instant::now();
    let mut jumps = 0usize;
    for _ in 0..ticks {
        jumps += flock.step(&pipes).jumps;
        for pipe in &mut pipes {
            pipe.x -= config.pipe_speed;
            if pipe.x < -config.pipe_width {
                pipe.x += width + config.pipe_width;
            }
        }
    }
    let elapsed = start.elapsed();

    println!("Time for {ticks} ticks over {birds} birds: {elapsed:?}");
    if ticks > 0 {
        println!("Avg time per tick: {:?}", elapsed / ticks);
    }
    println!("Total jumps: {jumps}");
    println!("{}", serde_json::to_string_pretty(&flock.stats())?);
    Ok(())
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Init { out, seed } => init(&out, seed),
        Command::Inspect { params } => inspect(&params, &config),
        Command::Decide { params, sensors } => decide(&params, &sensors),
        Command::Bench { birds, ticks, seed } => bench(config, birds, ticks, seed),
    }
}

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use neon_snake::game::GameConfig;
use neon_snake::modes::{AutoplayMode, HumanMode};
use neon_snake::persistence::FileScoreStore;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(name = "neon_snake")]
#[command(version, about = "Snake on a wrapping grid that speeds up as you score")]
struct Cli {
    /// Game mode
    #[arg(long, value_enum, default_value = "play")]
    mode: Mode,

    /// JSON file with game settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid side length, 3 to 256
    #[arg(long)]
    grid_size: Option<usize>,

    /// Tick interval at score 0, in milliseconds
    #[arg(long)]
    base_tick: Option<u64>,

    /// Shortest tick interval, in milliseconds
    #[arg(long)]
    min_tick: Option<u64>,

    /// Milliseconds shaved off the interval per score bracket
    #[arg(long)]
    speed_gain: Option<u64>,

    /// Where the best score is kept [default: ~/.neon_snake/best.json]
    #[arg(long)]
    best_file: Option<PathBuf>,

    /// RNG seed for autoplay
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Tick limit for autoplay
    #[arg(long, default_value = "10000")]
    max_ticks: u64,

    /// Write logs to this file (play mode logs nowhere otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Play with keyboard and mouse controls
    Play,
    /// Let a greedy pilot play a headless game
    Autoplay,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_file.as_deref(), cli.mode == Mode::Autoplay)?;

    let config = build_config(&cli)?;
    let best_file = cli.best_file.clone().unwrap_or_else(default_best_file);
    let store = FileScoreStore::open(&best_file);

    tracing::info!(
        grid_size = config.grid_size,
        base_tick_ms = config.base_tick_ms,
        min_tick_ms = config.min_tick_ms,
        best_file = ?best_file,
        "configuration loaded"
    );

    // Dispatch to appropriate mode
    match cli.mode {
        Mode::Play => {
            let mut human_mode = HumanMode::new(config, store);
            human_mode.run().await?;
        }
        Mode::Autoplay => {
            let mut autoplay = AutoplayMode::new(config, store, cli.seed, cli.max_ticks);
            let report = autoplay.run();

            println!("{}", "=".repeat(40));
            println!("Autoplay finished");
            println!("{}", "=".repeat(40));
            println!("Score:        {}", report.score);
            println!("Best:         {}", report.best);
            println!("Food eaten:   {}", report.foods_eaten);
            println!("Snake length: {}", report.snake_length);
            println!("Ticks:        {}", report.ticks);
            match report.over_reason {
                Some(reason) => println!("Ended by:     {:?}", reason),
                None => println!("Ended by:     tick limit"),
            }
        }
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    if let Some(grid_size) = cli.grid_size {
        config.grid_size = grid_size;
    }
    if let Some(base_tick) = cli.base_tick {
        config.base_tick_ms = base_tick;
    }
    if let Some(min_tick) = cli.min_tick {
        config.min_tick_ms = min_tick;
    }
    if let Some(speed_gain) = cli.speed_gain {
        config.speed_gain_ms = speed_gain;
    }

    config
        .validate()
        .map_err(|e| anyhow!("Invalid game configuration: {e}"))?;

    Ok(config)
}

fn default_best_file() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".neon_snake")
        .join("best.json")
}

/// The interactive mode owns the terminal, so it only logs to a file
fn init_tracing(log_file: Option<&Path>, stderr_fallback: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {:?}", path))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None if stderr_fallback => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        None => {}
    }

    Ok(())
}

use anyhow::{Context, Result};
use bevy::core::TaskPoolPlugin;
use bevy::prelude::*;
use clap::{Parser, ValueEnum};
use ecosystem_sim::{EcosystemPlugin, EcosystemStats, EcosystemTuning};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    Balanced,
    FastBreeding,
    ScarceFood,
}

#[derive(Parser)]
#[command(name = "ecosystem-sim")]
#[command(about = "Headless predator-prey ecosystem simulation")]
struct Cli {
    /// Tuning file (JSON). Overrides --preset.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Preset::Balanced)]
    preset: Preset,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 1000)]
    ticks: u64,

    /// Simulated seconds per tick
    #[arg(long, default_value_t = 0.1)]
    delta: f32,

    /// Override the world seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print the resolved tuning as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

fn load_tuning(cli: &Cli) -> Result<EcosystemTuning> {
    let mut tuning = match &cli.config {
        Some(path) => EcosystemTuning::from_json_file(path)
            .with_context(|| format!("Failed to load tuning from {}", path.display()))?,
        None => match cli.preset {
            Preset::Balanced => EcosystemTuning::balanced(),
            Preset::FastBreeding => EcosystemTuning::fast_breeding(),
            Preset::ScarceFood => EcosystemTuning::scarce_food(),
        },
    };
    tuning.fixed_delta = Some(cli.delta);
    if let Some(seed) = cli.seed {
        tuning.world_seed = seed;
    }
    tuning.validate().context("Invalid tuning")?;
    Ok(tuning)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let tuning = load_tuning(&cli)?;

    if cli.dump_config {
        println!("{}", tuning.to_json()?);
        return Ok(());
    }

    info!(
        "Ecosystem simulator starting: {} ticks of {:.3}s, seed {}",
        cli.ticks, cli.delta, tuning.world_seed
    );

    let mut app = App::new();
    app.add_plugins(TaskPoolPlugin::default())
        .insert_resource(tuning)
        .add_plugins(EcosystemPlugin);

    for _ in 0..cli.ticks {
        app.update();
    }

    let stats = app.world.resource::<EcosystemStats>();
    info!(
        "Finished after {:.1}s simulated: {} animals, {} births, {} deaths",
        stats.elapsed_seconds,
        stats.total_animals,
        stats.births,
        stats.natural_deaths + stats.culled
    );
    println!("{}", stats.to_json()?);
    Ok(())
}

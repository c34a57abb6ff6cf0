use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use stormforge::{output::OutputWriter, Generator, ScenarioLoader};

#[derive(Debug, Parser)]
#[command(author, version, about = "Seeded recipe shuffle and item pool generator")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/storm_default.yaml")]
    scenario: PathBuf,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Player slot to generate for
    #[arg(long)]
    player: Option<u32>,

    /// Directory for generation output
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&scenario.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut generator = Generator::new(scenario)?;
    if let Some(seed) = cli.seed {
        generator = generator.with_seed(seed);
    }
    if let Some(player) = cli.player {
        generator = generator.with_player(player);
    }
    let output = generator.run()?;
    let path = OutputWriter::new(&cli.output_dir).write(&output)?;
    println!(
        "Scenario '{}' generated {} items over {} locations: {}",
        output.scenario,
        output.item_pool.len(),
        output.location_count,
        path.display()
    );
    Ok(())
}

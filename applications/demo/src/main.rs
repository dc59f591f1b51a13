/// cardplay demo - scripted card, controller and speaker playback
use cardplay_demo::{DemoConfig, Scenario};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Timings are divided by this factor with `--fast`
const FAST_SPEEDUP: u32 = 10;

#[derive(Parser)]
#[command(name = "cardplay-demo")]
#[command(about = "Simulated memory-card audio playback", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the scripted timeline
    Run {
        /// Configuration file path
        #[arg(short, long, env = "CARDPLAY_CONFIG")]
        config: Option<PathBuf>,

        /// Run ten times faster than real time
        #[arg(long)]
        fast: bool,
    },
    /// Print the composed setup as JSON without playing
    Info {
        /// Configuration file path
        #[arg(short, long, env = "CARDPLAY_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardplay=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, fast } => {
            run(config, fast).await?;
        }
        Commands::Info { config } => {
            info(config)?;
        }
    }

    Ok(())
}

async fn run(config_path: Option<PathBuf>, fast: bool) -> anyhow::Result<()> {
    let config = DemoConfig::load(config_path.as_deref())?;
    let speedup = if fast { FAST_SPEEDUP } else { 1 };

    tracing::info!("Starting cardplay demo");
    tracing::info!("Controller: {}", config.controller.name);
    tracing::info!("Speedup: {}x", speedup);

    let scenario = Scenario::build(&config, speedup)?;
    scenario.run().await;

    let info = scenario.info();
    tracing::info!(
        "Final state of the controller: {}",
        serde_json::to_string(&info.controller)?
    );

    Ok(())
}

fn info(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = DemoConfig::load(config_path.as_deref())?;
    let scenario = Scenario::build(&config, 1)?;

    println!("{}", serde_json::to_string_pretty(&scenario.info())?);

    Ok(())
}

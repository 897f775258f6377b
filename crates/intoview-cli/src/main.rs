use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use intoview_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "intoview")]
#[command(author, version, about = "Scroll nested containers so an element becomes visible")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ~/.config/intoview/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print samples of an easing curve
    Ease {
        /// Preset name (ease, ease-in, ease-out, ease-in-out, linear) or x1,y1,x2,y2
        curve: String,
        /// Number of evenly spaced samples
        #[arg(long, default_value_t = 11)]
        samples: usize,
    },
    /// Scroll a fixture element into view and print the resulting offsets
    Scroll {
        /// Fixture file (.toml or .json)
        #[arg(short, long)]
        fixture: PathBuf,
        /// Name of the element to reveal
        #[arg(short, long)]
        target: String,
        /// Last container to scroll
        #[arg(long)]
        stop_at: Option<String>,
        /// Align the nearest edge instead of centering
        #[arg(long)]
        no_center: bool,
        /// Animate every container
        #[arg(long)]
        animate: bool,
        /// Animation duration in milliseconds
        #[arg(long)]
        duration: Option<u64>,
        /// Easing preset name
        #[arg(long)]
        easing: Option<String>,
        /// Wait for each container to settle before planning the next
        #[arg(long)]
        sequential: bool,
        /// Print offsets as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Ease { curve, samples } => commands::ease::run(&curve, samples),
        Commands::Scroll {
            fixture,
            target,
            stop_at,
            no_center,
            animate,
            duration,
            easing,
            sequential,
            json,
        } => {
            let args = commands::scroll::ScrollArgs {
                fixture,
                target,
                stop_at,
                no_center,
                animate,
                duration_ms: duration,
                easing,
                sequential,
                json,
            };
            commands::scroll::run(&args, &config.scroll).await
        }
    }
}

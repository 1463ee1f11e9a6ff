//! sigdecor binary
//!
//! Output goes to stdout; logs go to stderr (set `RUST_LOG` to adjust).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sigdecor_cli::commands::{render, simulate};
use sigdecor_cli::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "sigdecor")]
#[command(version, about = "Signature decoration overlays and placeholder cleanup")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render decoration overlays for annotations in a JSON file
    Render {
        /// JSON array of host annotation records
        #[arg(short, long)]
        annotations: PathBuf,

        /// Signed-in user, used when an annotation names no signer
        #[arg(short, long)]
        user: Option<String>,

        #[arg(short, long, value_enum, default_value = "json")]
        format: render::OutputFormat,
    },
    /// Replay a signing scenario against an in-memory host
    Simulate {
        /// Scenario JSON file
        #[arg(short, long)]
        scenario: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout carries command output, so logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("sigdecor v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(args.config.as_deref())?;

    let output = match args.command {
        Command::Render {
            annotations,
            user,
            format,
        } => render::run(&annotations, user.as_deref(), &config, format)?,
        Command::Simulate { scenario } => simulate::run(&scenario, &config).await?,
    };
    println!("{}", output);

    Ok(())
}

use std::path::PathBuf;

use catalog::ViewerConfig;
use clap::{Args, Parser, Subcommand};
use runtime::MapEvent;
use serde_json::json;
use streaming::ArchiveSource;
use streaming::file_archive::PmtilesFile;
use tracing::info;
use tracing_subscriber::EnvFilter;
use viewer::bootstrap::{self, DEFAULT_CONTAINER};
use viewer::{AutofitOutcome, HeadlessMap, MapEngine, Viewer};

#[derive(Parser)]
#[command(name = "solar-viewer", about = "Solar roof irradiance map viewer tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the fully registered style for a deployment.
    Style {
        #[command(flatten)]
        deployment: Deployment,
        /// Write to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the header metadata of a local PMTiles archive.
    Header { archive: PathBuf },
    /// Run a headless session and fit the camera to a local archive.
    Fit {
        #[command(flatten)]
        deployment: Deployment,
        /// Archive to read instead of the configured path.
        #[arg(long)]
        archive: Option<PathBuf>,
    },
    /// List built-in deployment presets.
    Presets,
    /// Load and validate a config file.
    Check { config: PathBuf },
}

#[derive(Args)]
struct Deployment {
    /// Built-in preset name.
    #[arg(long, conflicts_with = "config", default_value = "shinagawa")]
    preset: String,
    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Deployment {
    fn resolve(&self) -> Result<ViewerConfig, String> {
        match &self.config {
            Some(path) => ViewerConfig::load(path).map_err(|e| e.to_string()),
            None => catalog::preset(&self.preset).ok_or_else(|| {
                format!(
                    "unknown preset {:?} (known: {})",
                    self.preset,
                    catalog::preset_names().join(", ")
                )
            }),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main(Cli::parse()).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn real_main(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Style { deployment, out } => cmd_style(deployment.resolve()?, out),
        Command::Header { archive } => cmd_header(archive).await,
        Command::Fit {
            deployment,
            archive,
        } => cmd_fit(deployment.resolve()?, archive).await,
        Command::Presets => {
            for name in catalog::preset_names() {
                println!("{name}");
            }
            Ok(())
        }
        Command::Check { config } => {
            let config = ViewerConfig::load(&config).map_err(|e| e.to_string())?;
            println!("{}: ok ({} layers)", config.name, config.layer_ids().len());
            Ok(())
        }
    }
}

fn registered_session(config: ViewerConfig) -> Result<Viewer<HeadlessMap>, String> {
    let options = bootstrap::map_options(&config, DEFAULT_CONTAINER);
    let mut viewer = Viewer::new(HeadlessMap::new(&options), config).map_err(|e| e.to_string())?;
    viewer.dispatch(MapEvent::Ready).map_err(|e| e.to_string())?;
    Ok(viewer)
}

fn cmd_style(config: ViewerConfig, out: Option<PathBuf>) -> Result<(), String> {
    let viewer = registered_session(config)?;
    let style = viewer.engine().resolved_style();
    let raw = serde_json::to_string_pretty(&style).map_err(|e| e.to_string())?;
    match out {
        Some(path) => {
            std::fs::write(&path, raw).map_err(|e| format!("write {path:?}: {e}"))?;
            info!("style written to {}", path.display());
        }
        None => println!("{raw}"),
    }
    Ok(())
}

async fn cmd_header(archive: PathBuf) -> Result<(), String> {
    let header = PmtilesFile::new(&archive)
        .header()
        .await
        .map_err(|e| e.to_string())?;
    let raw = serde_json::to_string_pretty(&header).map_err(|e| e.to_string())?;
    println!("{raw}");
    Ok(())
}

async fn cmd_fit(config: ViewerConfig, archive: Option<PathBuf>) -> Result<(), String> {
    let archive = archive.unwrap_or_else(|| PathBuf::from(&config.archive.path));
    let mut viewer = registered_session(config)?;
    let outcome = viewer
        .autofit(&PmtilesFile::new(&archive))
        .await
        .map_err(|e| e.to_string())?;
    let status = match &outcome {
        AutofitOutcome::Fitted(_) => "fitted",
        AutofitOutcome::NoBounds => "no-bounds",
        AutofitOutcome::Failed(_) => "failed",
        AutofitOutcome::Cancelled => "cancelled",
    };
    let report = json!({
        "archive": archive.display().to_string(),
        "status": status,
        "bounds": outcome.bounds(),
        "camera": viewer.engine().camera(),
    });
    println!("{}", serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?);
    Ok(())
}

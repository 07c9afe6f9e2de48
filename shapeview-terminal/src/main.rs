/// shapeview terminal viewer
///
/// Drag with the left mouse button to spin the shape; click a tile along the
/// bottom (or press 1-9) to swap it in. W toggles wireframe, Q/Esc quits.
use anyhow::{Context, Result};
use clap::Parser;
use shapeview_core::DirectoryResources;
use shapeview_terminal::{TerminalApp, TerminalConfig};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Parser)]
#[command(name = "shapeview-terminal")]
#[command(about = "Spin and swap 3D shapes in the terminal", long_about = None)]
struct Cli {
    /// TOML config with [engine] and [display] sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory OBJ and STL surfaces are loaded from
    #[arg(short, long, default_value = ".")]
    resources: PathBuf,

    /// Target frame rate (overrides the config file)
    #[arg(long)]
    fps: Option<u32>,

    /// Start in wireframe mode
    #[arg(short, long)]
    wireframe: bool,

    /// Write logs here; the alternate screen owns stdout
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if let Some(path) = &cli.log_file {
        let file = File::create(path).with_context(|| format!("Failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }

    let mut config = match &cli.config {
        Some(path) => {
            TerminalConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))?
        }
        None => TerminalConfig::default(),
    };
    if let Some(fps) = cli.fps {
        config.display.fps = fps;
    }
    config.display.wireframe |= cli.wireframe;
    config.display.validate().context("Invalid display settings")?;

    let resources = DirectoryResources::new(&cli.resources);
    let mut app = TerminalApp::new(config, &resources).context("Failed to set up the viewer")?;
    app.run().context("Terminal error")?;

    Ok(())
}

/// Sketch3D Terminal Editor
///
/// Edits primitive 3D shapes in the terminal with the mouse.
/// Controls:
///   - Left drag: gizmo handles or free drag of the picked shape
///   - Right drag / Arrow Keys: orbit the camera
///   - Wheel / +/-: zoom
///   - 1-6: add Point/Vector/Cube/Sphere/Pyramid/Cone
///   - M/S/R: transform mode
///   - Delete: remove selection, C: clear
///   - Ctrl+S: save the scene document
///   - Q/ESC: Quit
use anyhow::{Context, Result};
use clap::Parser;
use sketch3d_core::{Editor, ViewerConfig};
use sketch3d_terminal::{populate_demo, TerminalApp};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

#[derive(Parser, Debug)]
#[command(name = "sketch3d-terminal")]
#[command(about = "Primitive 3D shape editor for the terminal")]
struct Cli {
    /// Configuration file path (defaults to ./sketch3d.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scene document to load on start; Ctrl+S saves back to it
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Start with one of each primitive
    #[arg(long)]
    demo: bool,
}

/// Initialize logging into `path`. The terminal itself is the canvas, so
/// nothing is ever logged to stdout or stderr.
fn init_logging(path: &Path, level: &str) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    Registry::default()
        .with(env_filter)
        .with(file_layer)
        .try_init()?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Sketch3D terminal starting");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log {
        init_logging(path, &cli.log_level)?;
    }

    let config = match &cli.config {
        Some(path) => ViewerConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ViewerConfig::load_or_default(),
    };

    let mut editor = Editor::with_config(config, 1.0, 1.0);

    if let Some(path) = &cli.scene {
        if path.exists() {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read scene {}", path.display()))?;
            let count = editor
                .scene_mut()
                .load_document(&text)
                .with_context(|| format!("failed to parse scene {}", path.display()))?;
            tracing::info!(path = %path.display(), count, "scene loaded");
        }
    }

    if cli.demo {
        populate_demo(editor.scene_mut());
    }

    let mut app = TerminalApp::new(editor)?;
    if let Some(path) = cli.scene {
        app = app.with_scene_path(path);
    }
    app.run()?;

    Ok(())
}

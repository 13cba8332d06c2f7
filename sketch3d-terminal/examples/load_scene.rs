/// Example: Load and edit a scene document in the terminal
///
/// Usage: cargo run --example load_scene -- path/to/scene.s3d
use anyhow::{Context, Result};
use sketch3d_core::Editor;
use sketch3d_terminal::{populate_demo, TerminalApp};
use std::env;
use std::fs;
use std::path::PathBuf;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let mut editor = Editor::new(1.0, 1.0);

    if args.len() < 2 {
        eprintln!("Usage: {} <scene-file>", args[0]);
        eprintln!("\nNo scene file provided, using the demo scene...");
        populate_demo(editor.scene_mut());
        let mut app = TerminalApp::new(editor)?;
        app.run()?;
        return Ok(());
    }

    let scene_path = PathBuf::from(&args[1]);
    println!("Loading scene: {}", scene_path.display());

    let text = fs::read_to_string(&scene_path)
        .with_context(|| format!("failed to read scene {}", scene_path.display()))?;
    let count = editor
        .scene_mut()
        .load_document(&text)
        .with_context(|| format!("failed to parse scene {}", scene_path.display()))?;

    println!("Loaded {} shapes", count);
    println!("Starting terminal editor (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(editor)?.with_scene_path(scene_path);
    app.run()?;

    Ok(())
}

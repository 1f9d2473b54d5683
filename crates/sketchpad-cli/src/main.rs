//! Sketchpad CLI - export scene documents to SVG and inspect them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sketchpad_core::{ExportOptions, Scene, SceneConfig, Store};
use std::path::{Path, PathBuf};

/// Sketchpad CLI - work with saved scene documents
#[derive(Parser, Debug)]
#[command(name = "sketchpad")]
#[command(about = "Command-line tools for Sketchpad scenes")]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export a scene to an SVG document
    Export {
        /// Scene JSON file
        scene: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Padding around the content (default: from config)
        #[arg(long)]
        padding: Option<f64>,

        /// Background color
        #[arg(long)]
        background: Option<String>,

        /// Include hidden elements
        #[arg(long)]
        include_hidden: bool,

        /// Export only the saved selection
        #[arg(long)]
        selection: bool,
    },

    /// Print a summary of a scene
    Info {
        /// Scene JSON file
        scene: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Export {
            scene,
            output,
            padding,
            background,
            include_hidden,
            selection,
        } => {
            let store = Store::with_scene(load_scene(&scene)?, config);
            let options = ExportOptions {
                padding: padding.unwrap_or(store.config().export_padding),
                background_color: background,
                include_hidden,
                selected_ids: selection.then(|| store.selected_ids().clone()),
            };
            let svg = store.export_svg_with(&options);
            match output {
                Some(path) => {
                    std::fs::write(&path, &svg)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    log::info!("Wrote {}", path.display());
                }
                None => println!("{svg}"),
            }
            Ok(())
        }
        Commands::Info { scene, json } => {
            let scene = load_scene(&scene)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary_json(&scene))?);
            } else {
                print!("{}", summary_text(&scene));
            }
            Ok(())
        }
    }
}

/// Load the engine configuration, falling back to defaults.
fn load_config(path: Option<&Path>) -> Result<SceneConfig> {
    let Some(path) = path else {
        return Ok(SceneConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    SceneConfig::from_json(&text).with_context(|| format!("Invalid config {}", path.display()))
}

fn load_scene(path: &Path) -> Result<Scene> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene {}", path.display()))?;
    Scene::from_json(&text).with_context(|| format!("Invalid scene {}", path.display()))
}

fn summary_json(scene: &Scene) -> serde_json::Value {
    let bounds = scene.bounds().map(|b| {
        serde_json::json!({
            "x": b.x0,
            "y": b.y0,
            "width": b.width(),
            "height": b.height(),
        })
    });
    serde_json::json!({
        "elements": scene.len(),
        "groups": scene.group_children.len(),
        "selected": scene.selected_ids.len(),
        "hidden": scene.elements.iter().filter(|e| !e.visible).count(),
        "bounds": bounds,
        "zoom": scene.viewport.zoom(),
    })
}

fn summary_text(scene: &Scene) -> String {
    let mut out = format!(
        "{} elements ({} groups, {} selected)\n",
        scene.len(),
        scene.group_children.len(),
        scene.selected_ids.len()
    );
    for element in &scene.elements {
        out.push_str(&format!(
            "  {:<10} {:<20} {:>8.1} {:>8.1} {:>8.1} x {:<8.1}{}\n",
            element.kind.label(),
            element.name,
            element.x,
            element.y,
            element.width,
            element.height,
            if element.visible { "" } else { " (hidden)" }
        ));
    }
    match scene.bounds() {
        Some(b) => out.push_str(&format!(
            "bounds: {:.1},{:.1} {:.1} x {:.1}\n",
            b.x0,
            b.y0,
            b.width(),
            b.height()
        )),
        None => out.push_str("bounds: empty\n"),
    }
    out
}

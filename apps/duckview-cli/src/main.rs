use anyhow::Context;
use clap::{Parser, Subcommand};
use duckview_assets::{PendingLoad, load_in_background, load_model};
use duckview_common::Color;
use duckview_render::{DebugTextRenderer, Viewport};
use duckview_scene::{GradientTexture, LightRig, Node, gradient_background};
use duckview_viewer::{FrameLoop, Viewer, ViewerConfig};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "duckview-cli", about = "CLI tool for duckview operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the default viewer setup
    Info,
    /// Load a model and print its node hierarchy
    Inspect {
        /// Model file (.glb or .gltf)
        model: PathBuf,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Write the background gradient as a PNG
    Gradient {
        /// Output file
        out: PathBuf,
        /// Top color
        #[arg(long, default_value = "#ADD8E6")]
        top: Color,
        /// Bottom color
        #[arg(long, default_value = "#E0F2F7")]
        bottom: Color,
        /// Stretch the 1-pixel-wide gradient to this width
        #[arg(long, default_value = "1")]
        width: u32,
    },
    /// Run the frame loop headless with the text renderer
    Frames {
        /// Model file (.glb or .gltf)
        model: PathBuf,
        /// Number of frames to render
        #[arg(short = 'n', long, default_value = "3")]
        frames: u64,
        /// Degrees to orbit the camera per frame
        #[arg(long, default_value = "0")]
        orbit: f32,
        /// Block until the model is loaded before the first frame
        #[arg(long)]
        wait: bool,
        /// JSON viewer configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => print_info(),
        Commands::Inspect { model, json } => inspect(&model, json)?,
        Commands::Gradient {
            out,
            top,
            bottom,
            width,
        } => {
            let gradient = gradient_background(top, bottom);
            write_gradient(&gradient, width, &out)?;
            println!(
                "Wrote {}x{} gradient {top} -> {bottom} to {}",
                width.max(1),
                gradient.height(),
                out.display()
            );
        }
        Commands::Frames {
            model,
            frames,
            orbit,
            wait,
            config,
        } => {
            let mut cfg = match config {
                Some(path) => ViewerConfig::load(&path)
                    .with_context(|| format!("reading config {}", path.display()))?,
                None => ViewerConfig::default(),
            };
            cfg.model = model;
            let rendered = run_frames(&cfg, frames, orbit, wait)?;
            tracing::debug!(rendered, "frame loop stopped");
        }
    }

    Ok(())
}

fn print_info() {
    let config = ViewerConfig::default();
    let rig = LightRig::default();
    println!("duckview-cli v{}", env!("CARGO_PKG_VERSION"));
    println!("default model: {}", config.model.display());
    let c = &config.camera;
    println!(
        "camera: fov={} near={} far={} position=({}, {}, {})",
        c.fov_degrees, c.near, c.far, c.position.x, c.position.y, c.position.z
    );
    for light in rig.lights() {
        println!("light: {}", light.kind());
    }
    println!(
        "background: gradient {} -> {}",
        config.background.top, config.background.bottom
    );
}

fn inspect(path: &Path, as_json: bool) -> anyhow::Result<()> {
    let model = load_model(path).with_context(|| format!("loading {}", path.display()))?;
    let bounds = model.root.world_bounds();

    if as_json {
        let mut nodes = Vec::new();
        walk(&model.root, 0, &mut |node, depth| {
            nodes.push(json!({
                "id": node.id.short(),
                "name": node.display_name(),
                "depth": depth,
                "mesh": node.mesh.as_ref().map(|mesh| json!({
                    "vertices": mesh.geometry.vertex_count(),
                    "triangles": mesh.geometry.triangle_count(),
                    "textured": mesh.material.base_color_texture.is_some(),
                })),
            }));
        });
        let report = json!({
            "source": model.source.display().to_string(),
            "meshes": model.mesh_count(),
            "bounds": bounds.map(|b| json!({
                "min": b.min.to_array(),
                "max": b.max.to_array(),
            })),
            "nodes": nodes,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Model: {}", model.source.display());
    println!("Meshes: {}", model.mesh_count());
    if let Some(b) = bounds {
        let size = b.size();
        println!("Size: {:.3} x {:.3} x {:.3}", size.x, size.y, size.z);
    }
    walk(&model.root, 0, &mut |node, depth| {
        let indent = "  ".repeat(depth);
        match &node.mesh {
            Some(mesh) => println!(
                "{indent}- {} [{} verts, {} tris{}]",
                node.display_name(),
                mesh.geometry.vertex_count(),
                mesh.geometry.triangle_count(),
                if mesh.material.base_color_texture.is_some() {
                    ", textured"
                } else {
                    ""
                }
            ),
            None => println!("{indent}- {}", node.display_name()),
        }
    });
    Ok(())
}

fn walk(node: &Node, depth: usize, f: &mut impl FnMut(&Node, usize)) {
    f(node, depth);
    for child in &node.children {
        walk(child, depth + 1, f);
    }
}

fn write_gradient(gradient: &GradientTexture, width: u32, out: &Path) -> anyhow::Result<()> {
    let image = image::RgbaImage::from_fn(width.max(1), gradient.height(), |_, y| {
        image::Rgba(gradient.row(y))
    });
    image
        .save(out)
        .with_context(|| format!("writing {}", out.display()))?;
    Ok(())
}

/// Returns the number of frames rendered.
fn run_frames(config: &ViewerConfig, frames: u64, orbit: f32, wait: bool) -> anyhow::Result<u64> {
    if frames == 0 {
        return Ok(0);
    }
    let mut viewer = Viewer::new(config, DebugTextRenderer::default(), Viewport::new(1280, 720));
    let load = load_in_background(&config.model)?;
    let mut pending = if wait {
        deliver(&mut viewer, load.wait());
        None
    } else {
        Some(load)
    };

    let mut frame_loop = FrameLoop::new();
    let stop = frame_loop.stop_handle();
    while let Some(output) = frame_loop.tick(&mut viewer) {
        print!("{output}");
        if let Some(outcome) = pending.as_ref().and_then(PendingLoad::try_take) {
            pending = None;
            deliver(&mut viewer, outcome);
        }
        if frame_loop.frames() >= frames {
            stop.stop();
        }
        if orbit != 0.0 {
            viewer.controls_mut().rotate_left(orbit.to_radians());
        }
    }
    Ok(frame_loop.frames())
}

fn deliver(viewer: &mut Viewer<DebugTextRenderer>, outcome: duckview_assets::LoadOutcome) {
    match viewer.on_model_loaded(outcome) {
        Ok(id) => println!("-- model loaded [{}]", id.short()),
        Err(e) => println!("-- model failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_frames_command() {
        let cli = Cli::parse_from(["duckview-cli", "frames", "Duck.glb", "-n", "5", "--wait"]);
        match cli.command {
            Commands::Frames {
                model,
                frames,
                wait,
                ..
            } => {
                assert_eq!(model, PathBuf::from("Duck.glb"));
                assert_eq!(frames, 5);
                assert!(wait);
            }
            _ => panic!("expected frames"),
        }
    }

    #[test]
    fn gradient_colors_parse() {
        let cli = Cli::parse_from(["duckview-cli", "gradient", "out.png", "--top", "0x000000"]);
        match cli.command {
            Commands::Gradient { top, bottom, .. } => {
                assert_eq!(top, Color::BLACK);
                assert_eq!(bottom, Color::from_hex(0xe0f2f7));
            }
            _ => panic!("expected gradient"),
        }
    }

    #[test]
    fn gradient_png_round_trips_rows() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("sky.png");
        let gradient = gradient_background(Color::from_hex(0xadd8e6), Color::from_hex(0xe0f2f7));
        write_gradient(&gradient, 4, &out).unwrap();

        let decoded = image::open(&out).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (4, 256));
        assert_eq!(decoded.get_pixel(3, 0).0, gradient.row(0));
        assert_eq!(decoded.get_pixel(0, 255).0, gradient.row(255));
    }

    #[test]
    fn frame_count_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let config = ViewerConfig {
            model: dir.path().join("missing.glb"),
            ..ViewerConfig::default()
        };
        assert_eq!(run_frames(&config, 0, 0.0, true).unwrap(), 0);
        assert_eq!(run_frames(&config, 2, 15.0, true).unwrap(), 2);
    }

    #[test]
    fn walk_reports_depth() {
        let mut root = Node::named("root");
        let mut child = Node::named("child");
        child.add_child(Node::named("leaf"));
        root.add_child(child);

        let mut seen = Vec::new();
        walk(&root, 0, &mut |node, depth| seen.push((node.display_name(), depth)));
        assert_eq!(
            seen,
            [("root".to_string(), 0), ("child".to_string(), 1), ("leaf".to_string(), 2)]
        );
    }
}

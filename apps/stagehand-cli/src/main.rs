use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use stagehand_common::SceneConfig;
use stagehand_render::{RecordingRenderer, RenderError, RibRenderer};
use stagehand_session::render_scene;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stagehand-cli", about = "Scene-setup sessions over a RIB stream backend")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print pipeline crate info
    Info,
    /// Run a scene session and write the RIB stream
    Render {
        /// Scene configuration JSON; defaults apply when omitted
        #[arg(short, long)]
        scene: Option<PathBuf>,
        /// Output RIB path, or "-" for stdout
        #[arg(short, long, default_value = "scene.rib")]
        out: PathBuf,
        /// Override the display target from the scene file
        #[arg(long)]
        target: Option<String>,
        /// Override the horizontal resolution
        #[arg(long)]
        width: Option<u32>,
        /// Override the vertical resolution
        #[arg(long)]
        height: Option<u32>,
        /// Merge the small-bucket tuning profile into the scene options
        #[arg(long)]
        small_buckets: bool,
    },
    /// List the renderer calls a scene produces, without writing a stream
    Trace {
        /// Scene configuration JSON; defaults apply when omitted
        #[arg(short, long)]
        scene: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("stagehand-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common:  {}", stagehand_common::crate_info());
            println!("render:  {}", stagehand_render::crate_info());
            println!("session: {}", stagehand_session::crate_info());
        }
        Commands::Render {
            scene,
            out,
            target,
            width,
            height,
            small_buckets,
        } => {
            let mut scene = load_scene(scene.as_deref())?;
            if let Some(target) = target {
                scene.display.target = target;
            }
            if let Some(width) = width {
                scene.display.width = width;
            }
            if let Some(height) = height {
                scene.display.height = height;
            }
            if small_buckets {
                let preset = stagehand_common::RenderOptionProfile::small_buckets();
                for (category, params) in preset.categories() {
                    for (name, value) in params {
                        scene.options.set(category, name, value.clone());
                    }
                }
            }

            if out.as_os_str() == "-" {
                let stdout = io::stdout();
                let mut renderer = RibRenderer::new(stdout.lock());
                render_scene(&mut renderer, &scene, demo_world)?;
            } else {
                let mut renderer = RibRenderer::create(&out)?;
                render_scene(&mut renderer, &scene, demo_world)?;
                println!("wrote {}", out.display());
            }
        }
        Commands::Trace { scene } => {
            let scene = load_scene(scene.as_deref())?;
            let mut renderer = RecordingRenderer::new();
            render_scene(&mut renderer, &scene, |_| Ok(()))?;
            for (index, call) in renderer.calls().iter().enumerate() {
                println!("{:>2}  {call:?}", index + 1);
            }
        }
    }

    Ok(())
}

fn load_scene(path: Option<&Path>) -> anyhow::Result<SceneConfig> {
    let Some(path) = path else {
        return Ok(SceneConfig::default());
    };
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => anyhow::bail!("failed to read scene file {}: {err}", path.display()),
    };
    let scene = match serde_json::from_str(&text) {
        Ok(scene) => scene,
        Err(err) => anyhow::bail!("invalid scene file {}: {err}", path.display()),
    };
    tracing::debug!(path = %path.display(), "loaded scene file");
    Ok(scene)
}

/// Demo world: two shaded spheres in front of the default camera.
fn demo_world<W: Write>(rib: &mut RibRenderer<W>) -> Result<(), RenderError> {
    rib.transform_begin()?;
    rib.color(0.9, 0.55, 0.2)?;
    rib.translate(0.0, 0.0, -5.0)?;
    rib.sphere(1.0, -1.0, 1.0, 360.0)?;
    rib.transform_end()?;

    rib.transform_begin()?;
    rib.color(0.2, 0.45, 0.85)?;
    rib.translate(1.6, 0.4, -7.0)?;
    rib.sphere(0.6, -0.6, 0.6, 360.0)?;
    rib.transform_end()?;
    Ok(())
}

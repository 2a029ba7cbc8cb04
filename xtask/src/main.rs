use std::fs;
use std::process::Command;

use anyhow::Result;
use clap::{Parser, Subcommand};
use glam::Vec3;
use stagehand_common::{CameraConfig, ClipPlanes, DisplayConfig, RenderOptionProfile, SceneConfig};

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for stagehand")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
    /// Generate demos/scene.json and render it to demos/scene.rib
    Demo,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            run(&["fmt", "--all", "--", "--check"], "fmt check")?;
            run(
                &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
                "clippy",
            )?;
            run(&["test", "--workspace"], "test")?;
            run(&["doc", "--workspace", "--no-deps"], "doc")?;
        }
        Commands::Fmt => run(&["fmt", "--all", "--", "--check"], "fmt check")?,
        Commands::Clippy => run(
            &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
            "clippy",
        )?,
        Commands::Test => run(&["test", "--workspace"], "test")?,
        Commands::Doc => run(&["doc", "--workspace", "--no-deps"], "doc")?,
        Commands::Build => run(&["build", "--workspace"], "build")?,
        Commands::Demo => run_demo()?,
    }

    Ok(())
}

fn run(args: &[&str], what: &str) -> Result<()> {
    println!("==> Running cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("cargo {what} failed");
    }
    Ok(())
}

fn run_demo() -> Result<()> {
    println!("==> Writing demos/scene.json");
    let scene = SceneConfig {
        camera: CameraConfig {
            position: Vec3::new(0.0, 1.5, 8.0),
            target: Vec3::ZERO,
            ..CameraConfig::default()
        },
        display: DisplayConfig {
            clipping: Some(ClipPlanes::new(0.1, 1000.0)),
            ..DisplayConfig::default()
        },
        options: RenderOptionProfile::small_buckets(),
    };
    fs::create_dir_all("demos")?;
    fs::write("demos/scene.json", serde_json::to_string_pretty(&scene)?)?;

    run(
        &[
            "run",
            "-p",
            "stagehand-cli",
            "--",
            "render",
            "--scene",
            "demos/scene.json",
            "--out",
            "demos/scene.rib",
        ],
        "run stagehand-cli",
    )
}

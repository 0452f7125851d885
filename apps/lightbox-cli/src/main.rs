use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use lightbox_render::{DebugTextRenderer, SceneSnapshot};
use lightbox_runtime::{Clock, DemoConfig, DemoScene, FrameScheduler, ManualTime, RenderLoop};
use lightbox_tools::ControlKind;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lightbox-cli", about = "Headless driver for the lightbox demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// List panel folders and their controls
    Panel,
    /// Run the render loop on a manual clock and print the last frame
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u32,
        /// Simulated frames per second
        #[arg(long, default_value = "60")]
        fps: f32,
        /// Set a control before the first frame, e.g. `spot.helper=true`
        #[arg(long = "set", value_name = "PATH=VALUE")]
        sets: Vec<String>,
        /// Print the final frame as JSON
        #[arg(long)]
        json: bool,
        /// Disable orbit damping
        #[arg(long)]
        no_damping: bool,
    },
}

/// Frames are driven by the command's own loop; nothing to schedule.
struct Unscheduled;

impl FrameScheduler for Unscheduled {
    fn request_frame(&mut self) {}
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            let demo = DemoScene::new(DemoConfig::default())?;
            println!("lightbox-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("scene: {}", lightbox_scene::crate_info());
            println!("render: {}", lightbox_render::crate_info());
            println!("input: {}", lightbox_input::crate_info());
            println!("tools: {}", lightbox_tools::crate_info());
            println!("runtime: {}", lightbox_runtime::crate_info());
            println!(
                "demo: lights={} meshes={} controls={}",
                demo.graph.lights().count(),
                demo.graph.meshes().count(),
                demo.panel.len()
            );
        }
        Commands::Panel => {
            let demo = DemoScene::new(DemoConfig::default())?;
            for folder in demo.panel.folders() {
                println!("{}", folder.name());
                for &id in folder.controls() {
                    let control = demo.panel.control(id)?;
                    let path = demo.panel.path(id).unwrap_or_default();
                    let value = demo.panel.value(&demo.graph, id)?.to_string();
                    match control.kind() {
                        ControlKind::Slider { range, step } => println!(
                            "  {path:<28} = {value:<10} [{}, {}] step {step}",
                            range.start(),
                            range.end()
                        ),
                        ControlKind::Color => println!("  {path:<28} = {value}"),
                        ControlKind::Toggle => println!("  {path:<28} = {value} (toggle)"),
                    }
                }
            }
        }
        Commands::Simulate {
            frames,
            fps,
            sets,
            json,
            no_damping,
        } => {
            if !fps.is_finite() || fps <= 0.0 {
                bail!("--fps must be positive, got {fps}");
            }
            let mut demo = DemoScene::new(DemoConfig {
                damping: !no_damping,
                ..DemoConfig::default()
            })?;
            for set in &sets {
                let (path, value) = set
                    .split_once('=')
                    .with_context(|| format!("expected PATH=VALUE, got {set:?}"))?;
                demo.set_control(path.trim(), value)
                    .with_context(|| format!("cannot apply {set:?}"))?;
            }

            let time = ManualTime::new();
            let mut render_loop = RenderLoop::new(Clock::new(time.clone()));
            let mut renderer = DebugTextRenderer::new();
            let mut scheduler = Unscheduled;
            render_loop.start(&mut scheduler)?;

            let step = Duration::try_from_secs_f32(1.0 / fps)
                .with_context(|| format!("--fps {fps} gives no usable frame step"))?;
            let mut last = None;
            for _ in 0..frames {
                last = render_loop.frame(&mut demo, &mut renderer, &mut scheduler);
                time.advance(step);
            }
            tracing::info!(
                "simulated {} frames, elapsed {:.3}s",
                render_loop.frames(),
                render_loop.elapsed()
            );

            if json {
                let snapshot = SceneSnapshot::capture(&demo.graph, &demo.camera);
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else if let Some(text) = last {
                print!("{text}");
            }
        }
    }

    Ok(())
}

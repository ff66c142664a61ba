use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec3;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use viewloop_camera::{OrbitControls, Orbitable, OrthographicCamera, PerspectiveCamera};
use viewloop_render::DebugTextRenderer;
use viewloop_scene::{Scene, Spin};
use viewloop_viewport::{
    Camera, LoopError, ManualHost, SteppedClock, ViewerConfig, ViewportContext, ViewportLoop,
};

#[derive(Parser)]
#[command(name = "viewloop-cli", about = "Headless driver for the viewport loop")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML viewer configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Projection {
    Perspective,
    Orthographic,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Apply one resize to a fresh loop and print what the renderer receives
    Resize {
        #[arg(long, default_value = "800")]
        width: u32,
        #[arg(long, default_value = "600")]
        height: u32,
        /// Device pixel density reported by the host
        #[arg(long, default_value = "1.0")]
        density: f64,
    },
    /// Pump the loop for a number of frames and report each one
    Simulate {
        #[arg(short, long, default_value = "5")]
        frames: u64,
        #[arg(long, default_value = "800")]
        width: u32,
        #[arg(long, default_value = "600")]
        height: u32,
        #[arg(long, default_value = "1.0")]
        density: f64,
        /// Make the renderer fail on this frame
        #[arg(long)]
        fail_at: Option<u64>,
        #[arg(long, value_enum, default_value = "perspective")]
        projection: Projection,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Print the debug renderer's description of the last frame
        #[arg(long)]
        dump: bool,
    },
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    requested_frames: u64,
    frames_rendered: u64,
    frame_requests: u64,
    state: String,
    viewport: String,
    aspect: f32,
    pixel_density: f64,
    output_size: String,
    elapsed: f64,
    error: Option<String>,
    #[serde(skip)]
    last_frame: Option<String>,
}

struct SimulateArgs {
    frames: u64,
    width: u32,
    height: u32,
    density: f64,
    fail_at: Option<u64>,
}

fn simulate<C>(config: &ViewerConfig, camera: C, args: &SimulateArgs) -> SimulationReport
where
    C: Camera + Orbitable,
{
    let scene = Scene::demo();
    let spins: Vec<_> = scene
        .meshes()
        .keys()
        .enumerate()
        .map(|(i, id)| Spin::new(*id, Vec3::splat(0.5 * (i + 1) as f32)))
        .collect();

    let mut renderer = DebugTextRenderer::new();
    if let Some(frame) = args.fail_at {
        renderer = renderer.fail_at(frame);
    }
    let controls = OrbitControls::from_config(
        &config.controls,
        Vec3::from_array(config.camera.target),
    );

    let mut lp = ViewportLoop::new(
        ViewportContext::with_controls(scene, camera, renderer, controls),
        SteppedClock::sixty_hz(),
        &config.viewport,
    );
    for spin in spins {
        lp.add_update(spin.into_hook());
    }

    let mut host = ManualHost::new(args.width, args.height, args.density);
    let error = host.pump(&mut lp, args.frames).err().map(|e: LoopError| {
        tracing::debug!(frame = lp.frames(), "simulation halted");
        e.to_string()
    });

    let ctx = lp.context();
    SimulationReport {
        requested_frames: args.frames,
        frames_rendered: lp.frames(),
        frame_requests: host.frame_requests(),
        state: lp.state().to_string(),
        viewport: lp.viewport().to_string(),
        aspect: ctx.camera.aspect(),
        pixel_density: lp.pixel_density(),
        output_size: ctx.renderer.output_size().to_string(),
        elapsed: lp.elapsed(),
        error,
        last_frame: ctx.renderer.last_frame().map(str::to_owned),
    }
}

fn print_report(report: &SimulationReport, json: bool, dump: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!(
            "Simulated {}/{} frames ({} frame requests)",
            report.frames_rendered, report.requested_frames, report.frame_requests
        );
        println!("State: {}", report.state);
        println!(
            "Viewport: {} (aspect {:.4}), output {} @ {:.2}x",
            report.viewport, report.aspect, report.output_size, report.pixel_density
        );
        println!("Clock: {:.4}s", report.elapsed);
        if let Some(e) = &report.error {
            println!("Halted: {e}");
        }
    }
    if dump {
        if let Some(frame) = &report.last_frame {
            println!("{frame}");
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("viewloop-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("viewport: {}", viewloop_viewport::crate_info());
            println!("render: {}", viewloop_render::crate_info());
            println!(
                "max pixel density: {:.2}",
                config.viewport.max_pixel_density
            );
        }
        Commands::Resize {
            width,
            height,
            density,
        } => {
            let camera = PerspectiveCamera::from_config(&config.camera, 1.0);
            let mut lp = ViewportLoop::new(
                ViewportContext::new(Scene::new(), camera, DebugTextRenderer::new()),
                SteppedClock::sixty_hz(),
                &config.viewport,
            );
            let host = ManualHost::new(width, height, density);
            lp.on_resize(&host);

            let ctx = lp.context();
            println!("Viewport: {}", lp.viewport());
            match lp.viewport().aspect() {
                Some(_) => println!("Aspect: {:.4}", ctx.camera.aspect()),
                None => println!("Aspect: {:.4} (unchanged, zero height)", ctx.camera.aspect()),
            }
            println!("Output size: {}", ctx.renderer.output_size());
            println!(
                "Pixel density: {:.2} (host {density}, max {})",
                ctx.renderer.pixel_density(),
                config.viewport.max_pixel_density
            );
        }
        Commands::Simulate {
            frames,
            width,
            height,
            density,
            fail_at,
            projection,
            json,
            dump,
        } => {
            let args = SimulateArgs {
                frames,
                width,
                height,
                density,
                fail_at,
            };
            let aspect = width as f32 / height.max(1) as f32;
            let report = match projection {
                Projection::Perspective => {
                    simulate(&config, PerspectiveCamera::from_config(&config.camera, aspect), &args)
                }
                Projection::Orthographic => {
                    let mut camera = OrthographicCamera::new(
                        2.0,
                        aspect,
                        config.camera.near,
                        config.camera.far,
                    );
                    camera.set_view(
                        Vec3::from_array(config.camera.position),
                        Vec3::from_array(config.camera.target),
                    );
                    simulate(&config, camera, &args)
                }
            };
            print_report(&report, json, dump)?;
            if report.error.is_some() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

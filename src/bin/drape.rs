use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "drape", version, about = "Virtual try-on renderer")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite a garment onto one video frame and write a PNG.
    Frame(FrameArgs),
    /// Print body measurements and mesh corners for a pose as JSON.
    Measure(MeasureArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input video frame image.
    #[arg(long)]
    video: PathBuf,

    /// Pose landmarks JSON (array of {x, y, z?, visibility?}).
    #[arg(long)]
    pose: PathBuf,

    /// Garment image.
    #[arg(long)]
    garment: PathBuf,

    /// Fallback garment image, used when `--garment` does not decode.
    #[arg(long)]
    garment_fallback: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Session config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend override.
    #[arg(long, value_enum)]
    backend: Option<BackendChoice>,

    /// Draw landmark debug markers.
    #[arg(long)]
    debug: bool,

    /// Do not mirror the video and landmarks.
    #[arg(long)]
    no_mirror: bool,
}

#[derive(Parser, Debug)]
struct MeasureArgs {
    /// Pose landmarks JSON.
    #[arg(long)]
    pose: PathBuf,

    /// Canvas width in pixels.
    #[arg(long)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long)]
    height: u32,

    /// Session config JSON (only `tuning` is used).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Cpu,
    Gpu,
}

#[derive(serde::Serialize)]
struct MeasureReport {
    measurements: Option<drape::BodyMeasurements>,
    corners: Option<drape::MeshCorners>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Measure(args) => cmd_measure(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("drape=info,wgpu=warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_config(path: Option<&Path>) -> anyhow::Result<drape::SessionConfig> {
    match path {
        Some(p) => Ok(drape::SessionConfig::from_json_path(p)?),
        None => Ok(drape::SessionConfig::default()),
    }
}

fn read_pose(path: &Path) -> anyhow::Result<drape::PoseFrame> {
    let bytes = std::fs::read(path).with_context(|| format!("read pose '{}'", path.display()))?;
    drape::PoseFrame::from_json_slice(&bytes)
        .with_context(|| format!("parse pose '{}'", path.display()))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut config = read_config(args.config.as_deref())?;
    if let Some(choice) = args.backend {
        config.backend = match choice {
            BackendChoice::Cpu => drape::BackendKind::Cpu,
            BackendChoice::Gpu => drape::BackendKind::Gpu,
        };
    }
    config.debug_landmarks |= args.debug;
    if args.no_mirror {
        config.mirror = false;
    }

    let video_bytes = std::fs::read(&args.video)
        .with_context(|| format!("read video frame '{}'", args.video.display()))?;
    let video = drape::decode_video_frame(&video_bytes)?;
    let pose = read_pose(&args.pose)?;

    let mut session = drape::TryOnSession::new(config)?;
    let fallback = args.garment_fallback.map(drape::GarmentSource::Path);
    session
        .load_garment_with_fallback(&drape::GarmentSource::Path(args.garment), fallback.as_ref())
        .context("load garment")?;

    let frame = session.process_frame(&video, Some(&pose))?;
    let stats = session.stats();
    session.stop();

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    let path = if stats.frames_gpu > 0 {
        "gpu"
    } else if stats.frames_cpu > 0 {
        "cpu"
    } else {
        "none"
    };
    eprintln!("wrote {} (overlay: {path})", args.out.display());
    Ok(())
}

fn cmd_measure(args: MeasureArgs) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    let pose = read_pose(&args.pose)?;
    let report = MeasureReport {
        measurements: drape::calculate_body_measurements_with(
            &pose,
            args.width,
            args.height,
            &config.tuning,
        ),
        corners: drape::calculate_mesh_corners_with(&pose, args.width, args.height, &config.tuning),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

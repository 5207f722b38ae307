//! pipescan CLI — command-line interface for laser-profile pipe detection.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use pipescan::{DetectConfig, PipeProfiler, PoseConfig};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "pipescan")]
#[command(about = "Decode laser profile files and detect pipe cross-sections")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a sensor file and run the full detection pipeline.
    Detect(DetectArgs),

    /// Print header and profile statistics of a sensor file.
    Info {
        /// Path to the binary sensor file.
        #[arg(long)]
        bin: PathBuf,
    },

    /// Generate a synthetic pipe-on-seabed profile and detect it.
    Synth(SynthArgs),
}

#[derive(Debug, Clone, Args)]
struct DetectArgs {
    /// Path to the binary sensor file.
    #[arg(long)]
    bin: PathBuf,

    /// Path to a pose configuration (JSON); defaults when omitted.
    #[arg(long)]
    pose: Option<PathBuf>,

    /// Expected pipe diameter in millimeters.
    #[arg(long)]
    diameter: f64,

    /// Path to write per-profile results (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Inlier tolerance in millimeters.
    #[arg(long, default_value = "8.0")]
    tolerance: f64,

    /// RNG seed for the randomized estimator.
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Reconstruct a dense per-column profile before triangulating.
    #[arg(long)]
    dense: bool,
}

#[derive(Debug, Clone, Args)]
struct SynthArgs {
    /// Pipe diameter in millimeters.
    #[arg(long, default_value = "300.0")]
    diameter: f64,

    /// Cross-track offset of the pipe centre in millimeters.
    #[arg(long, default_value = "0.0")]
    offset_x: f64,

    /// Number of points to generate.
    #[arg(long, default_value = "400")]
    num_points: usize,

    /// Path to write the generated points and detection (JSON).
    #[arg(long)]
    out: PathBuf,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::Info { bin } => run_info(&bin),
        Commands::Synth(args) => run_synth(&args),
    }
}

fn load_pose(path: Option<&Path>) -> CliResult<PoseConfig> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| -> CliError {
                format!("failed to read pose file {}: {}", path.display(), e).into()
            })?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(PoseConfig::default()),
    }
}

fn decode_file(path: &Path) -> CliResult<pipescan::BinFileData> {
    tracing::info!("Loading sensor file: {}", path.display());
    let bytes = std::fs::read(path)?;
    let data = pipescan::decode(&bytes)?;
    for warning in &data.warnings {
        tracing::warn!("{}", warning);
    }
    tracing::info!(
        "Decoded {} profiles ({} points each)",
        data.profile_count(),
        data.header.points_per_profile
    );
    Ok(data)
}

fn run_detect(args: &DetectArgs) -> CliResult<()> {
    let pose = load_pose(args.pose.as_deref())?;
    let data = decode_file(&args.bin)?;

    let config = DetectConfig {
        tolerance_mm: args.tolerance,
        seed: args.seed,
        ..DetectConfig::default()
    };
    let profiler = PipeProfiler::with_config(pose, args.diameter, config);
    let results = if args.dense {
        profiler.process_file_dense(&data)
    } else {
        profiler.process_file(&data)
    };

    let detections = results.iter().filter(|r| r.detection.is_some()).count();
    tracing::info!(
        "Detected a pipe in {} of {} profiles",
        detections,
        results.len()
    );

    let json = serde_json::to_string_pretty(&results)?;
    std::fs::write(&args.out, &json)?;
    tracing::info!("Results written to {}", args.out.display());
    Ok(())
}

fn run_info(bin: &Path) -> CliResult<()> {
    let data = decode_file(bin)?;
    let header = &data.header;
    println!("format:             {}", header.format);
    println!("version:            {}", header.version);
    println!("header size:        {}", header.header_size);
    println!("points per profile: {}", header.points_per_profile);
    println!("profiles:           {}", data.profile_count());

    let with_comment = data.profiles.iter().filter(|p| p.comment.is_some()).count();
    let total_valid: usize = data.profiles.iter().map(|p| p.valid_count).sum();
    println!("structured comments: {}", with_comment);
    if data.profile_count() > 0 {
        println!(
            "valid points/profile: {:.1}",
            total_valid as f64 / data.profile_count() as f64
        );
    }
    for warning in &data.warnings {
        println!("warning: {}", warning);
    }
    Ok(())
}

fn run_synth(args: &SynthArgs) -> CliResult<()> {
    let pose = PoseConfig::default();
    let points = pipescan::synthetic_pipe_profile(&pose, args.diameter, args.offset_x, args.num_points);
    tracing::info!("Generated {} synthetic points", points.len());

    let profiler = PipeProfiler::new(pose, args.diameter);
    let detection = profiler.detect(&points, None);
    match &detection {
        Some(det) => tracing::info!(
            "Detected pipe: centre ({:.1}, {:.1}), diameter {:.1} mm, rms {:.3}",
            det.fit.cx,
            det.fit.cz,
            det.diameter,
            det.fit.rms
        ),
        None => tracing::info!("No pipe detected in synthetic profile"),
    }

    let json = serde_json::to_string_pretty(&serde_json::json!({
        "points": points,
        "detection": detection,
    }))?;
    std::fs::write(&args.out, &json)?;
    tracing::info!("Results written to {}", args.out.display());
    Ok(())
}

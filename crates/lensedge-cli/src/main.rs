//! lensedge: offline lens-edging planner and material-removal simulator.

mod job;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use lensedge_cam::{
    generate_roughing_passes, path_summary, plan_movement_path, to_csv, to_json, BevelPass,
    MachineConfig, PathSettings,
};
use lensedge_mesh::bevel_track;
use lensedge_stocksim::{generate_blank, removal_per_frame, rescale_time, simulate, SimSettings};

use job::JobFile;

#[derive(Parser)]
#[command(name = "lensedge", version, about = "Lens edging planner and simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Plan a job: roughing passes, movement path, optional removal
    /// simulation with rate-capped timing, then export.
    Plan {
        /// Job file (TOML).
        job: PathBuf,
        /// Output file; a timestamped name in the working directory otherwise.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Export format.
        #[arg(long, value_enum, default_value = "csv")]
        format: Format,
        /// Run the voxel removal simulation and rescale the time axis
        /// against the per-pass removal-rate caps.
        #[arg(long)]
        simulate: bool,
        /// Voxel resolution for the simulation (mm).
        #[arg(long, default_value_t = 0.5)]
        resolution: f64,
        /// Process every Nth path frame in the simulation.
        #[arg(long, default_value_t = 5)]
        frame_stride: usize,
    },
    /// Print the default machine configuration as JSON.
    Machine,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    match Cli::parse().command {
        Command::Plan {
            job,
            out,
            format,
            simulate,
            resolution,
            frame_stride,
        } => plan(job, out, format, simulate, resolution, frame_stride),
        Command::Machine => {
            let machine = MachineConfig::default_machine();
            println!("{}", serde_json::to_string_pretty(&machine)?);
            Ok(())
        }
    }
}

fn plan(
    job_path: PathBuf,
    out: Option<PathBuf>,
    format: Format,
    run_simulation: bool,
    resolution: f64,
    frame_stride: usize,
) -> anyhow::Result<()> {
    let job = JobFile::load(&job_path)?;
    let job_dir = job_path.parent().unwrap_or_else(|| std::path::Path::new("."));
    let machine = job.machine(job_dir)?;
    let blank = job.lens_blank();
    let target = job.target_contour(job_dir)?;

    let passes = generate_roughing_passes(
        &target,
        job.blank.radius_mm,
        &blank,
        job.method,
        &job.passes,
    )
    .context("generating roughing passes")?;
    let removed: f64 = passes.iter().map(|p| p.removed_volume_mm3).sum();
    info!(
        passes = passes.len(),
        removed_mm3 = removed,
        "roughing sequence generated"
    );

    let bevel = match &job.bevel {
        Some(section) => {
            let track = bevel_track(&target, &blank, section.position, section.width_mm)
                .context("placing bevel track")?;
            if !track.fits() {
                warn!("bevel does not fit the edge everywhere; continuing with clamped track");
            }
            let contour =
                lensedge_contour::PolarContour::new(target.radii().to_vec(), track.heights)
                    .context("building bevel contour")?;
            Some(BevelPass {
                contour,
                speed_sec_per_rev: section.speed_sec_per_rev,
                max_volume_rate_mm3_per_sec: section.max_volume_rate_mm3_per_sec,
            })
        }
        None => None,
    };

    let path = plan_movement_path(&machine, PathSettings::default(), &passes, bevel.as_ref())
        .context("planning movement path")?;
    if path.is_empty() {
        info!("nothing to do: empty path");
        return Ok(());
    }

    let time = if run_simulation {
        let settings = SimSettings {
            frame_stride,
            ..SimSettings::default()
        };
        let mut grid = generate_blank(
            &blank,
            job.blank.radius_mm * 2.0,
            resolution,
            0.0,
            &settings,
        )
        .context("building blank voxel grid")?;
        info!(voxels = grid.len(), "simulating material removal");
        simulate(&mut grid, &path, &machine, &settings, None)
            .context("running removal simulation")?;

        let volume = removal_per_frame(&grid, path.total_frames(), &settings);
        let rescaled = rescale_time(path.time(), &volume, path.segments())
            .context("rescaling time axis")?;
        if rescaled == path.time() {
            info!("no removal-rate caps active; time axis unchanged");
        } else {
            info!(
                planned_sec = path.total_duration_sec(),
                rescaled_sec = rescaled.last().copied().unwrap_or(0.0),
                "time axis stretched to honour removal-rate caps"
            );
        }
        rescaled
    } else {
        path.time().to_vec()
    };

    let (content, extension) = match format {
        Format::Csv => (to_csv(&path, &time)?, "csv"),
        Format::Json => (to_json(&path, &time)?, "json"),
    };
    let out_path = out.unwrap_or_else(|| default_output_name(extension));
    std::fs::write(&out_path, content)
        .with_context(|| format!("writing {}", out_path.display()))?;

    let summary = path_summary(&path, &time)?;
    println!(
        "{} frames, {} passes ({} roughing, {} beveling), {:.1} s total -> {}",
        summary.total_frames,
        summary.num_passes,
        summary.num_roughing_passes,
        summary.num_beveling_passes,
        summary.total_duration_sec,
        out_path.display()
    );
    Ok(())
}

fn default_output_name(extension: &str) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("toolpath_{stamp}.{extension}"))
}

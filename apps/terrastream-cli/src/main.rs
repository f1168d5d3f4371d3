use std::path::PathBuf;

use clap::{Parser, Subcommand};
use glam::Vec3;
use serde::Serialize;
use terrastream_common::ChunkCoordinate;
use terrastream_mesh::ChunkMeshBuilder;
use terrastream_noise::NoiseField;
use terrastream_scatter::{DecorationKind, DetailScatterer, TerrainDetailProfile};
use terrastream_stream::{
    LandmarkSelector, StreamStats, StreamUpdate, TerrainConfig, TerrainStreamer,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "terrastream-cli", about = "CLI tool for terrastream terrain generation")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML terrain config; defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Sample the normalized height field at a world position
    Sample {
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        #[arg(long, allow_hyphen_values = true)]
        z: f64,
    },
    /// Build one chunk and report its mesh and decorations
    Build {
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        x: i32,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        z: i32,
        /// Decoration profile: meadow or highland
        #[arg(long, default_value = "meadow")]
        profile: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Walk an observer in a straight line and report streaming per step
    Walk {
        /// Number of steps
        #[arg(short, long, default_value = "10")]
        steps: u32,
        /// Distance per step along +X
        #[arg(long, default_value = "25")]
        step: f32,
        /// Print JSON lines instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct ChunkReport {
    coord: ChunkCoordinate,
    profile: String,
    vertices: usize,
    triangles: usize,
    min_height: f32,
    max_height: f32,
    vegetation: usize,
    rocks: usize,
}

#[derive(Serialize)]
struct StepReport {
    step: u32,
    observer: [f32; 3],
    admitted: usize,
    evicted: usize,
    #[serde(flatten)]
    stats: StreamStats,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<TerrainConfig> {
    let config = match path {
        Some(p) => TerrainConfig::load(p)?,
        None => TerrainConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn profile_by_name(name: &str) -> anyhow::Result<TerrainDetailProfile> {
    match name {
        "meadow" => Ok(TerrainDetailProfile::meadow()),
        "highland" => Ok(TerrainDetailProfile::highland()),
        other => anyhow::bail!("unknown profile {other:?}; expected meadow or highland"),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Info => {
            println!("terrastream-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("noise: {}", terrastream_noise::crate_info());
            println!("mesh: {}", terrastream_mesh::crate_info());
            println!("stream: {}", terrastream_stream::crate_info());
            println!(
                "config: local_radius={} resolution={} cell_size={} admit_radius={}",
                config.local_radius,
                config.resolution,
                config.grid().cell_size(),
                config.admit_radius()
            );
        }
        Commands::Sample { x, z } => {
            let field = NoiseField::new(config.noise_parameters())?;
            let h = field.height(x, z);
            println!(
                "height({x}, {z}) = {h:.6} (world {:.3})",
                h * config.max_height as f64
            );
        }
        Commands::Build {
            x,
            z,
            profile,
            json,
        } => {
            let field = NoiseField::new(config.noise_parameters())?;
            let builder = ChunkMeshBuilder::from_grid(config.grid());
            let profile = profile_by_name(&profile)?;
            let coord = ChunkCoordinate::new(x, z);

            let mesh = builder.build(coord, &field, config.max_height);
            mesh.validate()?;
            let placements = DetailScatterer::new(config.seed as u64).scatter(&mesh, &profile);
            let bounds = mesh.bounds();
            let vegetation = placements
                .iter()
                .filter(|p| p.kind == DecorationKind::Vegetation)
                .count();

            let report = ChunkReport {
                coord,
                profile: profile.name.clone(),
                vertices: mesh.vertex_count(),
                triangles: mesh.triangle_count(),
                min_height: bounds.min.y,
                max_height: bounds.max.y,
                vegetation,
                rocks: placements.len() - vegetation,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Chunk {}: profile={} vertices={} triangles={} height=[{:.2}, {:.2}] vegetation={} rocks={}",
                    report.coord,
                    report.profile,
                    report.vertices,
                    report.triangles,
                    report.min_height,
                    report.max_height,
                    report.vegetation,
                    report.rocks
                );
            }
        }
        Commands::Walk { steps, step, json } => {
            // Mountain landmark a few chunks ahead of the walk.
            let landmark = Vec3::new(config.grid().chunk_size() * 3.0, 0.0, 0.0);
            let selector = LandmarkSelector::mountain(landmark, config.local_radius * 2.0);
            let mut streamer = TerrainStreamer::new(config, selector)?;

            let mut observer = Vec3::ZERO;
            let update = streamer.initialize(observer);
            print_step(0, observer, &update, &streamer, json)?;

            for i in 1..=steps {
                observer.x += step;
                let update = streamer.observer_moved(observer);
                print_step(i, observer, &update, &streamer, json)?;
            }

            tracing::info!(steps, resident = streamer.resident_count(), "walk finished");
            let timer = streamer.timer();
            if !json {
                println!(
                    "Recomputes: {} avg={:?} max={:?} min={:?}",
                    timer.count(),
                    timer.average(),
                    timer.max(),
                    timer.min()
                );
            }
        }
    }

    Ok(())
}

fn print_step(
    step: u32,
    observer: Vec3,
    update: &StreamUpdate,
    streamer: &TerrainStreamer,
    json: bool,
) -> anyhow::Result<()> {
    let report = StepReport {
        step,
        observer: observer.to_array(),
        admitted: update.admitted.len(),
        evicted: update.evicted.len(),
        stats: streamer.stats().clone(),
    };
    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!(
            "step {:>3} x={:>8.1}: +{} -{} resident={} decorations={} recomputes={}",
            report.step,
            observer.x,
            report.admitted,
            report.evicted,
            report.stats.resident_chunks,
            report.stats.resident_decorations,
            report.stats.recompute_count
        );
    }
    Ok(())
}

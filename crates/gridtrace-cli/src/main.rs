//! gridtrace CLI - render scene files with the uniform-grid ray tracer
//!
//! Renders stills or orbiting animations, with the sphere dynamics
//! advancing between animation frames.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gridtrace_dynamics::step;
use gridtrace_math::Transform;
use gridtrace_raytrace::Renderer;
use log::info;
use std::path::{Path, PathBuf};
use std::time::Instant;

mod output;
mod scene_file;

use scene_file::SceneFile;

#[derive(Parser)]
#[command(name = "gridtrace")]
#[command(about = "Uniform-grid ray tracer", long_about = None)]
struct Cli {
    /// Log level; RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a scene file to an image
    Render {
        /// Scene description (.toml)
        scene: PathBuf,
        /// Output image (format from extension: .png, .ppm)
        #[arg(short, long)]
        output: PathBuf,
        /// Image width in pixels
        #[arg(long, default_value_t = 640)]
        width: usize,
        /// Image height in pixels
        #[arg(long, default_value_t = 360)]
        height: usize,
        /// Number of frames; more than one orbits the view and runs dynamics
        #[arg(long, default_value_t = 1)]
        frames: usize,
    },
    /// Show shape, material and grid statistics for a scene file
    Info {
        /// Scene description (.toml)
        scene: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .parse_filters(&cli.log_level)
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Render {
            scene,
            output,
            width,
            height,
            frames,
        } => render(&scene, &output, width, height, frames),
        Commands::Info { scene } => show_info(&scene),
    }
}

fn base_dir(scene: &Path) -> &Path {
    scene.parent().unwrap_or(Path::new("."))
}

fn render(scene_path: &Path, output: &Path, width: usize, height: usize, frames: usize) -> Result<()> {
    if width == 0 || height == 0 {
        bail!("image size must be non-zero, got {}x{}", width, height);
    }
    if frames == 0 {
        bail!("--frames must be at least 1");
    }
    output::format_for(output)?;

    let file = SceneFile::read(scene_path)?;
    let mut loaded = file
        .load(base_dir(scene_path), width as f64 / height as f64)
        .with_context(|| format!("loading {}", scene_path.display()))?;
    let stats = loaded.grid.stats();
    info!(
        "scene: {} shapes, {} lights, grid {:?} with {} entries",
        loaded.scene.shapes().len(),
        loaded.scene.lights().len(),
        loaded.grid.dims(),
        stats.entries
    );

    let animated = frames > 1;
    let pivot = loaded.grid.bounds().center();
    for index in 0..frames {
        let rotation = animated.then(|| {
            let angle = std::f64::consts::TAU * index as f64 / (frames - 1) as f64;
            Transform::orbit_y(angle, &pivot)
        });

        let start = Instant::now();
        let frame = Renderer::new(&loaded.scene, &loaded.grid, &loaded.sensor, &loaded.trace).render(
            width,
            height,
            rotation.as_ref(),
        );
        let path = output::frame_path(output, index, animated);
        output::write_frame(&frame, &path)?;
        info!(
            "frame {}/{} -> {} in {:.2?}",
            index + 1,
            frames,
            path.display(),
            start.elapsed()
        );

        if index + 1 < frames && loaded.scene.sphere_count() > 0 {
            let stats = step(&mut loaded.grid, loaded.scene.shapes_mut(), &loaded.dynamics)?;
            info!(
                "dynamics: {} substeps, {} sphere contacts, {} wall contacts",
                stats.substeps, stats.sphere_contacts, stats.wall_contacts
            );
        }
    }

    Ok(())
}

fn show_info(scene_path: &Path) -> Result<()> {
    let file = SceneFile::read(scene_path)?;
    let meshes = file.meshes.len();
    let loaded = file.load(base_dir(scene_path), 16.0 / 9.0)?;
    let scene = &loaded.scene;

    println!("gridtrace scene: {}", scene_path.display());
    println!("  Materials: {}", scene.materials().len());
    println!("  Lights: {}", scene.lights().len());
    println!("  Shapes: {} ({} spheres, {} meshes)", scene.shapes().len(), scene.sphere_count(), meshes);

    let mut kinds: Vec<(&str, usize)> = Vec::new();
    for shape in scene.shapes() {
        let kind = shape.primitive.kind();
        match kinds.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, count)) => *count += 1,
            None => kinds.push((kind, 1)),
        }
    }
    for (kind, count) in kinds {
        println!("    {kind}: {count}");
    }

    let stats = loaded.grid.stats();
    let dims = loaded.grid.dims();
    println!("\nGrid:");
    println!("  Cells: {} x {} x {}", dims[0], dims[1], dims[2]);
    println!("  Entries: {}", stats.entries);
    println!("  Occupied cells: {}", stats.occupied_cells);
    println!("  Max per cell: {}", stats.max_per_cell);

    Ok(())
}

//! # pathtracer-cli
//!
//! An offline, physically based Monte Carlo path tracer. Renders one of a
//! handful of hard-coded scenes to a PPM (P3) image on standard output.
//!
//! ## Rendering equation
//!
//! The integrator solves the rendering equation via Monte Carlo integration,
//! combining next-event estimation (explicit light sampling) with recursive
//! BSDF-sampled indirect bounces:
//!
//! ```text
//!   L_o(p, ω_o) = L_e(p, ω_o) + ∫_Ω f_r(p, ω_i, ω_o) · L_i(p, ω_i) · |cos θ_i| dω_i
//! ```

use std::fs;
use std::io::{self, Write};
use std::time::Instant;

use clap::Parser;
use rand::SeedableRng;

use pathtracer_cli::camera::Camera;
use pathtracer_cli::error::RenderError;
use pathtracer_cli::integrator::{self, RenderConfig};
use pathtracer_cli::{image_io, scene};

/// pathtracer-cli — render a hard-coded scene to a PPM image on stdout
#[derive(Parser, Debug)]
#[command(
    name = "pathtracer-cli",
    version,
    about = "An offline, physically based Monte Carlo path tracer",
    after_help = "EXAMPLES:\n  \
                  pathtracer-cli --scene cornell > cornell.ppm\n  \
                  pathtracer-cli --scene bvh-stress --spp 10 > stress.ppm\n  \
                  pathtracer-cli --scene gallery --obj bunny.obj > bunny.ppm"
)]
struct Cli {
    /// Scene to render
    #[arg(short, long, value_enum, default_value_t = ScenePreset::Cornell, requires_if("gallery", "obj"))]
    scene: ScenePreset,

    /// Image width in pixels (height is derived from the scene's aspect ratio)
    #[arg(short = 'W', long)]
    width: Option<u32>,

    /// Samples per pixel
    #[arg(long)]
    spp: Option<u32>,

    /// Maximum ray bounce depth
    #[arg(long)]
    depth: Option<u32>,

    /// Path to an OBJ file, used only by `--scene gallery`
    #[arg(long)]
    obj: Option<String>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ScenePreset {
    /// S1: the Cornell box
    Cornell,
    /// A single Lambertian sphere resting on a ground sphere
    Sphere,
    /// A glass sphere in front of five colored quads
    Quads,
    /// 500-ish random spheres over a ground sphere, stressing the BVH
    BvhStress,
    /// An OBJ mesh lit by a single area light (requires `--obj`)
    Gallery,
}

fn build_scene(cli: &Cli) -> Result<scene::SceneBuild, RenderError> {
    match cli.scene {
        ScenePreset::Cornell => Ok(scene::cornell_box()),
        ScenePreset::Sphere => Ok(scene::single_sphere_on_plane()),
        ScenePreset::Quads => Ok(scene::glass_ball_on_quads()),
        ScenePreset::BvhStress => {
            let mut rng = rand::rngs::SmallRng::seed_from_u64(0);
            Ok(scene::bvh_stress_scene(&mut rng))
        }
        ScenePreset::Gallery => {
            // `requires_if` on `--scene` guarantees `--obj` is set by the time clap accepts the args.
            let path = cli.obj.as_deref().expect("clap enforces --obj with --scene gallery");
            let source = fs::read_to_string(path)?;
            scene::mesh_gallery(&source)
        }
    }
}

fn run() -> Result<(), RenderError> {
    let cli = Cli::parse();
    let build = build_scene(&cli)?;

    let mut camera_config = build.camera_config;
    let image_width = cli.width.unwrap_or(build.image_width);

    let default_render_config = RenderConfig::default();
    let render_config = RenderConfig {
        samples_per_pixel: cli.spp.unwrap_or(default_render_config.samples_per_pixel),
        max_depth: cli.depth.unwrap_or(default_render_config.max_depth),
    };

    // Background lives on both the camera and the scene; keep them in sync
    // if a future flag ever overrides one independently.
    camera_config.background = build.scene.background;
    let camera = Camera::new(&camera_config, image_width);

    eprintln!(
        "Rendering {}x{} at {} spp, max depth {}",
        camera.image_width, camera.image_height, render_config.samples_per_pixel, render_config.max_depth
    );

    let t0 = Instant::now();
    let pixels = integrator::render(&build.scene, &camera, &render_config);
    let elapsed = t0.elapsed();

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    image_io::write_ppm(&mut out, camera.image_width, camera.image_height, &pixels)?;
    out.flush()?;

    let total_rays =
        camera.image_width as u64 * camera.image_height as u64 * render_config.samples_per_pixel as u64;
    eprintln!(
        "Done in {:.2}s ({:.2}M rays, {:.2} Mrays/s)",
        elapsed.as_secs_f64(),
        total_rays as f64 / 1e6,
        total_rays as f64 / elapsed.as_secs_f64() / 1e6
    );

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

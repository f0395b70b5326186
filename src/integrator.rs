use std::sync::atomic::{AtomicU32, Ordering};

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;

use crate::camera::Camera;
use crate::hittable::Hittable;
use crate::math::{Color, Interval, Ray};
use crate::scene::Scene;

/// Lower bound on the shadow/continuation ray's `t` interval — keeps a ray
/// leaving a surface from immediately re-intersecting it due to floating
/// point error.
const SHADOW_RAY_EPSILON: f64 = 1e-3;

/// Estimates incident radiance along `ray` with next-event estimation for
/// direct lighting plus recursive BSDF sampling for indirect light.
/// Recursion stops at `max_depth` bounces, returning black beyond that point
/// (no Russian roulette — depth is capped instead, matching spec.md's
/// "maximum number of ray bounces" framing rather than an unbounded
/// roulette-terminated walk).
pub fn li(ray: Ray, scene: &Scene, max_depth: u32, rng: &mut dyn RngCore) -> Color {
    if max_depth == 0 {
        return Color::zero();
    }

    let rec = match scene.world.hit(&ray, Interval::new(SHADOW_RAY_EPSILON, f64::INFINITY)) {
        Some(rec) => rec,
        None => return scene.background,
    };

    let emitted = rec.material.emitted(&rec);

    let bsdf = match rec.material.bsdf(&rec) {
        Some(bsdf) => bsdf,
        None => return emitted,
    };

    let wo = -ray.direction.normalized();

    let direct = if scene.lights.is_empty() {
        Color::zero()
    } else {
        let light_index = rng.gen_range(0..scene.lights.len());
        let light = &scene.lights[light_index];
        let sample = light.sample(rec.p, rng);

        if sample.p_solid_angle > 0.0 && !sample.emitted.is_black() {
            let f = bsdf.f(wo, sample.wi);
            let cos_theta = rec.normal.dot(sample.wi);
            if !f.is_black() && cos_theta > 0.0 {
                let shadow_ray = Ray::new(rec.p, sample.wi);
                let occluded = scene
                    .world
                    .hit(&shadow_ray, Interval::new(SHADOW_RAY_EPSILON, sample.distance - SHADOW_RAY_EPSILON))
                    .is_some();
                if occluded {
                    Color::zero()
                } else {
                    let pdf_light = sample.p_solid_angle / scene.lights.len() as f64;
                    sample.emitted.hadamard(f) * (cos_theta / pdf_light)
                }
            } else {
                Color::zero()
            }
        } else {
            Color::zero()
        }
    };

    let indirect = match bsdf.sample(wo, rng) {
        Some(sample) if sample.pdf > 0.0 || sample.is_delta() => {
            let cos_theta = rec.normal.dot(sample.wi).abs();
            let throughput = if sample.is_delta() {
                sample.f
            } else {
                sample.f * (cos_theta / sample.pdf)
            };
            if throughput.is_black() {
                Color::zero()
            } else {
                let bounce = Ray::with_eta(rec.p, sample.wi, sample.eta);
                throughput.hadamard(li(bounce, scene, max_depth - 1, rng))
            }
        }
        _ => Color::zero(),
    };

    emitted + direct + indirect
}

/// Samples-per-pixel and bounce cap for a render — the knobs `main.rs`
/// exposes as CLI flags.
pub struct RenderConfig {
    pub samples_per_pixel: u32,
    pub max_depth: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 50,
            max_depth: 12,
        }
    }
}

/// Renders the full image into a flat, row-major `Color` buffer. Rows render
/// independently in parallel (`par_chunks_mut`, one freshly seeded `SmallRng`
/// per row — no RNG state or lock shared across threads), matching how
/// `other_examples/30f75fb0_doxxx-raytracer` parallelizes its framebuffer.
/// Progress ("Scanlines remaining: N") goes to stderr as each row completes.
pub fn render(scene: &Scene, camera: &Camera, config: &RenderConfig) -> Vec<Color> {
    let width = camera.image_width;
    let height = camera.image_height;
    let mut buffer = vec![Color::zero(); (width * height) as usize];
    let remaining = AtomicU32::new(height);

    buffer
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(row, pixels)| {
            let mut rng = SmallRng::seed_from_u64(row as u64);
            for (col, pixel) in pixels.iter_mut().enumerate() {
                let mut accumulated = Color::zero();
                for _ in 0..config.samples_per_pixel {
                    let ray = camera.get_ray(col as u32, row as u32, &mut rng);
                    accumulated += li(ray, scene, config.max_depth, &mut rng);
                }
                *pixel = accumulated / config.samples_per_pixel as f64;
            }
            let left = remaining.fetch_sub(1, Ordering::Relaxed) - 1;
            eprintln!("Scanlines remaining: {left}");
        });

    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::BvhNode;
    use crate::hittable::HittableList;
    use crate::material::DiffuseLight;
    use crate::math::{Point3, Vec3};
    use crate::shapes::Sphere;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    #[test]
    fn miss_returns_background() {
        let mut list = HittableList::new();
        list.add(Arc::new(Sphere::new(
            Point3::new(0.0, 0.0, -100.0),
            1.0,
            Arc::new(DiffuseLight::new(Color::zero())),
        )));
        let scene = Scene {
            world: Arc::new(BvhNode::new(list)),
            lights: vec![],
            background: Color::new(0.1, 0.2, 0.3),
        };
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 1.0, 0.0));
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(li(ray, &scene, 5, &mut rng), scene.background);
    }

    #[test]
    fn zero_depth_is_black() {
        let mut list = HittableList::new();
        list.add(Arc::new(Sphere::new(
            Point3::zero(),
            1.0,
            Arc::new(DiffuseLight::new(Color::ones())),
        )));
        let scene = Scene {
            world: Arc::new(BvhNode::new(list)),
            lights: vec![],
            background: Color::zero(),
        };
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(li(ray, &scene, 0, &mut rng), Color::zero());
    }

    #[test]
    fn direct_hit_on_emitter_returns_its_radiance() {
        let mut list = HittableList::new();
        let emit = Color::new(3.0, 3.0, 3.0);
        list.add(Arc::new(Sphere::new(Point3::zero(), 1.0, Arc::new(DiffuseLight::new(emit)))));
        let scene = Scene {
            world: Arc::new(BvhNode::new(list)),
            lights: vec![],
            background: Color::zero(),
        };
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(li(ray, &scene, 5, &mut rng), emit);
    }
}

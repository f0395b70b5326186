//! End-to-end scenario tests, one per testable property in spec.md §8.

use pathtracer_cli::bxdf::BxdfFlags;
use pathtracer_cli::camera::Camera;
use pathtracer_cli::hittable::{HitRecord, Hittable, HittableList};
use pathtracer_cli::integrator::{self, RenderConfig};
use pathtracer_cli::material::{Dielectric, Lambertian, Material};
use pathtracer_cli::math::{Color, Interval, Point3, Ray, Vec3};
use pathtracer_cli::scene;
use pathtracer_cli::shapes::{Quad, Sphere};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Draws BSDF samples with successive seeds until one picks the
/// transmission lobe (glass at near-normal incidence reflects only a few
/// percent of the time, so this converges in a handful of draws).
fn sample_transmission(bsdf: &pathtracer_cli::bxdf::Bsdf, wo: Vec3) -> pathtracer_cli::bxdf::BsdfSample {
    for seed in 0..256u64 {
        let mut rng = SmallRng::seed_from_u64(seed);
        if let Some(sample) = bsdf.sample(wo, &mut rng) {
            if sample.flags.contains(BxdfFlags::TRANSMISSION) {
                return sample;
            }
        }
    }
    panic!("no seed in range produced a transmitted sample");
}

/// S1: Cornell box renders at low resolution without crashing, and produces
/// a non-black image (the interior is lit only by the ceiling emitter, so a
/// render with zero direct/indirect contribution would indicate NEE or
/// scene construction is broken).
#[test]
fn s1_cornell_box_renders_nonblack() {
    let build = scene::cornell_box();
    let mut camera_config = build.camera_config;
    camera_config.background = build.scene.background;
    let camera = Camera::new(&camera_config, 16);

    let render_config = RenderConfig {
        samples_per_pixel: 8,
        max_depth: 6,
    };
    let pixels = integrator::render(&build.scene, &camera, &render_config);

    assert_eq!(pixels.len(), (camera.image_width * camera.image_height) as usize);
    assert!(pixels.iter().any(|c| c.max_component() > 0.0));
}

/// S2: a single Lambertian sphere above a ground sphere, 1 spp / 1 bounce.
/// The center pixel must be nonzero and darker than the sky background;
/// a pixel aimed well above the horizon must match the background exactly
/// (the ray never hits anything).
#[test]
fn s2_single_sphere_center_darker_than_background_edge_matches() {
    let background = Color::new(0.7, 0.8, 1.0);
    let mut world = HittableList::new();
    world.add(Arc::new(Sphere::new(Point3::new(0.0, -100.5, -1.0), 100.0, Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5))))));
    world.add(Arc::new(Sphere::new(Point3::new(0.0, 0.0, -1.0), 0.5, Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5))))));

    let scene = scene::Scene {
        world: Arc::new(world),
        lights: vec![],
        background,
    };

    let mut rng = SmallRng::seed_from_u64(7);

    let center_ray = Ray::new(Point3::zero(), Vec3::new(0.0, 0.0, -1.0));
    let center = integrator::li(center_ray, &scene, 1, &mut rng);
    assert!(center.max_component() > 0.0);
    assert!(center.max_component() < background.max_component());

    let sky_ray = Ray::new(Point3::zero(), Vec3::new(0.0, 1.0, 0.0));
    let sky = integrator::li(sky_ray, &scene, 1, &mut rng);
    assert_eq!(sky, background);
}

/// S3: a glass sphere (IOR 1.5) refracts light passing through its apex —
/// a ray through the center exits with `eta == 1` after two crossings
/// (entering then leaving the sphere returns to vacuum).
#[test]
fn s3_ray_through_glass_sphere_apex_returns_to_vacuum_eta() {
    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5));
    let sphere = Sphere::new(Point3::new(0.0, 0.0, 0.0), 1.0, glass);

    let ray_in = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
    let entry = sphere.hit(&ray_in, Interval::new(0.001, f64::INFINITY)).expect("ray must hit sphere");
    assert!(entry.front_face);
    assert_eq!(entry.incident_eta, 1.0);

    let entry_bsdf = entry.material.bsdf(&entry).expect("dielectric always has a bsdf");
    let wo_in = -ray_in.direction.normalized();
    let entry_sample = sample_transmission(&entry_bsdf, wo_in);
    assert_eq!(entry_sample.eta, 1.5);

    let ray_mid = Ray::with_eta(entry.p, entry_sample.wi, entry_sample.eta);
    let exit = sphere
        .hit(&ray_mid, Interval::new(0.001, f64::INFINITY))
        .expect("ray must exit through the far side");
    assert!(!exit.front_face);
    assert_eq!(exit.incident_eta, 1.5);

    let exit_bsdf = exit.material.bsdf(&exit).expect("dielectric always has a bsdf");
    let wo_mid = -ray_mid.direction.normalized();
    let exit_sample = sample_transmission(&exit_bsdf, wo_mid);
    assert_eq!(exit_sample.eta, 1.0);
}

/// S4: a quad hit at an exact, hand-computed `t`/`p`/`front_face`.
#[test]
fn s4_quad_hit_exact_t_and_point() {
    let quad = Quad::new(
        Point3::zero(),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5))),
    );
    let ray = Ray::new(Point3::new(0.5, 0.5, 1.0), Vec3::new(0.0, 0.0, -1.0));
    let rec: HitRecord = quad.hit(&ray, Interval::new(0.001, f64::INFINITY)).expect("ray must hit quad");

    assert!((rec.t - 1.0).abs() < 1e-12);
    assert!((rec.p - Point3::new(0.5, 0.5, 0.0)).length() < 1e-12);
    assert!(rec.front_face);
}

/// S5: BVH closest-hit `t` matches a linear scan for many random rays
/// against a large random sphere field.
#[test]
fn s5_bvh_matches_linear_scan_for_random_rays() {
    let mut rng = SmallRng::seed_from_u64(99);
    let mut objects: Vec<Arc<dyn Hittable>> = Vec::new();
    for _ in 0..500 {
        let x: f64 = rand::Rng::gen_range(&mut rng, -11.0..11.0);
        let z: f64 = rand::Rng::gen_range(&mut rng, -11.0..11.0);
        objects.push(Arc::new(Sphere::new(
            Point3::new(x, 0.2, z),
            0.2,
            Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5))),
        )));
    }

    let mut list = HittableList::new();
    for obj in &objects {
        list.add(obj.clone());
    }
    let bvh = pathtracer_cli::bvh::BvhNode::new(list);

    for _ in 0..10_000 {
        let origin = Point3::new(
            rand::Rng::gen_range(&mut rng, -12.0..12.0),
            rand::Rng::gen_range(&mut rng, -5.0..5.0),
            20.0,
        );
        let direction = Vec3::new(
            rand::Rng::gen_range(&mut rng, -0.2..0.2),
            rand::Rng::gen_range(&mut rng, -0.2..0.2),
            -1.0,
        );
        let ray = Ray::new(origin, direction);
        let ray_t = Interval::new(0.001, f64::INFINITY);

        let mut brute_t = None;
        for obj in &objects {
            if let Some(rec) = obj.hit(&ray, ray_t) {
                brute_t = Some(brute_t.map_or(rec.t, |best: f64| best.min(rec.t)));
            }
        }
        let bvh_t = bvh.hit(&ray, ray_t).map(|rec| rec.t);

        match (brute_t, bvh_t) {
            (None, None) => {}
            (Some(a), Some(b)) => assert!((a - b).abs() < 1e-9),
            other => panic!("brute force and bvh disagree: {other:?}"),
        }
    }
}

/// S6: a quad lying exactly in the plane `z = 0` still gets a non-degenerate
/// AABB on that axis after construction.
#[test]
fn s6_planar_quad_aabb_is_padded() {
    let quad = Quad::new(
        Point3::new(-1.0, -1.0, 0.0),
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(0.0, 2.0, 0.0),
        Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5))),
    );
    let bbox = quad.bounding_box();
    assert!(bbox.z.size() >= 1e-4);
}

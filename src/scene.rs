use std::sync::Arc;

use rand::{Rng, RngCore};

use crate::bvh::BvhNode;
use crate::camera::CameraConfig;
use crate::error::RenderError;
use crate::hittable::{Hittable, HittableList, RotateY, Translate};
use crate::light::{Light, QuadLight};
use crate::material::{Dielectric, DiffuseLight, Lambertian, Material, Metal};
use crate::math::{Color, Point3, Vec3};
use crate::obj;
use crate::shapes::{quad_box, Quad, Sphere};

/// The BVH-wrapped world plus the lights the integrator samples for NEE.
/// `background` is the radiance returned for rays that escape the scene —
/// duplicated from the matching [`CameraConfig`] at scene-build time so
/// `li()` doesn't need a `Camera` reference.
pub struct Scene {
    pub world: Arc<dyn Hittable>,
    pub lights: Vec<Arc<dyn Light>>,
    pub background: Color,
}

/// A scene plus the camera/resolution it was designed to be viewed through.
pub struct SceneBuild {
    pub scene: Scene,
    pub camera_config: CameraConfig,
    pub image_width: u32,
}

/// Adds `quad` to `world` and returns a [`QuadLight`] wrapping it, so a
/// single construction both makes the emitter visible to camera rays and
/// sampleable by NEE.
fn add_light_quad(world: &mut HittableList, quad: Quad) -> Arc<QuadLight> {
    let quad = Arc::new(quad);
    world.add(quad.clone());
    Arc::new(QuadLight::new(quad))
}

/// S1: the Cornell box. Grounded on `main.cpp`'s `cornell_box()` — exact
/// wall/light quad coordinates, box dimensions, rotations, translations, and
/// camera parameters (including `horizontal_flip`, needed because the
/// original's image-space convention is mirrored relative to this crate's).
pub fn cornell_box() -> SceneBuild {
    let red = Arc::new(Lambertian::new(Color::new(0.65, 0.05, 0.05)));
    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.73, 0.73, 0.73)));
    let green = Arc::new(Lambertian::new(Color::new(0.12, 0.45, 0.15)));
    let light = Arc::new(DiffuseLight::new(Color::new(15.0, 15.0, 15.0)));

    let mut world = HittableList::new();
    world.add(Arc::new(Quad::new(
        Point3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        green,
    )));
    world.add(Arc::new(Quad::new(
        Point3::new(0.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        red,
    )));
    let light_quad = add_light_quad(
        &mut world,
        Quad::new(
            Point3::new(343.0, 554.0, 332.0),
            Vec3::new(-130.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -105.0),
            light,
        ),
    );
    world.add(Arc::new(Quad::new(
        Point3::new(0.0, 0.0, 0.0),
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        white.clone(),
    )));
    world.add(Arc::new(Quad::new(
        Point3::new(555.0, 555.0, 555.0),
        Vec3::new(-555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -555.0),
        white.clone(),
    )));
    world.add(Arc::new(Quad::new(
        Point3::new(0.0, 0.0, 555.0),
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        white.clone(),
    )));

    let tall_box: Arc<dyn Hittable> = Arc::new(quad_box(
        Point3::zero(),
        Point3::new(165.0, 330.0, 165.0),
        white.clone(),
    ));
    let tall_box = Arc::new(RotateY::new(tall_box, 15.0));
    let tall_box = Arc::new(Translate::new(tall_box, Vec3::new(130.0, 0.0, 295.0)));
    world.add(tall_box);

    let short_box: Arc<dyn Hittable> = Arc::new(quad_box(
        Point3::zero(),
        Point3::new(165.0, 165.0, 165.0),
        white,
    ));
    let short_box = Arc::new(RotateY::new(short_box, -18.0));
    let short_box = Arc::new(Translate::new(short_box, Vec3::new(265.0, 0.0, 65.0)));
    world.add(short_box);

    let scene = Scene {
        world: Arc::new(BvhNode::new(world)),
        lights: vec![light_quad],
        background: Color::zero(),
    };

    let camera_config = CameraConfig {
        look_from: Point3::new(278.0, 278.0, -800.0),
        look_at: Point3::new(278.0, 278.0, 0.0),
        vup: Vec3::unit_y(),
        vfov_degrees: 40.0,
        aspect_ratio: 1.0,
        defocus_angle: 0.0,
        focus_dist: 10.0,
        background: Color::zero(),
        horizontal_flip: true,
    };

    SceneBuild {
        scene,
        camera_config,
        image_width: 600,
    }
}

/// S2: a single Lambertian sphere resting on a much larger ground sphere,
/// lit entirely by the sky background (no emitters, so `lights` is empty).
pub fn single_sphere_on_plane() -> SceneBuild {
    let mut world = HittableList::new();
    let ground = Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5)));
    world.add(Arc::new(Sphere::new(Point3::new(0.0, -100.5, -1.0), 100.0, ground)));

    let sphere_material = Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5)));
    world.add(Arc::new(Sphere::new(Point3::new(0.0, 0.0, -1.0), 0.5, sphere_material)));

    let scene = Scene {
        world: Arc::new(BvhNode::new(world)),
        lights: vec![],
        background: Color::new(0.7, 0.8, 1.0),
    };

    let camera_config = CameraConfig {
        look_from: Point3::new(0.0, 0.0, 0.0),
        look_at: Point3::new(0.0, 0.0, -1.0),
        vup: Vec3::unit_y(),
        vfov_degrees: 90.0,
        aspect_ratio: 16.0 / 9.0,
        defocus_angle: 0.0,
        focus_dist: 1.0,
        background: Color::new(0.7, 0.8, 1.0),
        horizontal_flip: false,
    };

    SceneBuild {
        scene,
        camera_config,
        image_width: 400,
    }
}

/// S3: a glass sphere (IOR 1.5) in front of five colored quads, grounded on
/// `main.cpp`'s `quads()` scene (quad layout/colors) with the sphere added
/// per spec.md's S3 geometry.
pub fn glass_ball_on_quads() -> SceneBuild {
    let left_red = Arc::new(Lambertian::new(Color::new(1.0, 0.2, 0.2)));
    let back_green = Arc::new(Lambertian::new(Color::new(0.2, 1.0, 0.2)));
    let right_blue = Arc::new(Lambertian::new(Color::new(0.2, 0.2, 1.0)));
    let upper_orange = Arc::new(Lambertian::new(Color::new(1.0, 0.5, 0.0)));
    let lower_teal = Arc::new(Lambertian::new(Color::new(0.2, 0.8, 0.8)));

    let mut world = HittableList::new();
    world.add(Arc::new(Quad::new(
        Point3::new(-3.0, -2.0, 5.0),
        Vec3::new(0.0, 0.0, -4.0),
        Vec3::new(0.0, 4.0, 0.0),
        left_red,
    )));
    world.add(Arc::new(Quad::new(
        Point3::new(-2.0, -2.0, 0.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(0.0, 4.0, 0.0),
        back_green,
    )));
    world.add(Arc::new(Quad::new(
        Point3::new(3.0, -2.0, 1.0),
        Vec3::new(0.0, 0.0, 4.0),
        Vec3::new(0.0, 4.0, 0.0),
        right_blue,
    )));
    world.add(Arc::new(Quad::new(
        Point3::new(-2.0, 3.0, 1.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 4.0),
        upper_orange,
    )));
    world.add(Arc::new(Quad::new(
        Point3::new(-2.0, -3.0, 5.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -4.0),
        lower_teal,
    )));

    let glass = Arc::new(Dielectric::new(1.5));
    world.add(Arc::new(Sphere::new(Point3::new(0.0, 0.0, 6.0), 1.0, glass)));

    let scene = Scene {
        world: Arc::new(BvhNode::new(world)),
        lights: vec![],
        background: Color::new(0.7, 0.8, 1.0),
    };

    let camera_config = CameraConfig {
        look_from: Point3::new(0.0, 0.0, 9.0),
        look_at: Point3::new(0.0, 0.0, 0.0),
        vup: Vec3::unit_y(),
        vfov_degrees: 80.0,
        aspect_ratio: 1.0,
        defocus_angle: 0.0,
        focus_dist: 10.0,
        background: Color::new(0.7, 0.8, 1.0),
        horizontal_flip: false,
    };

    SceneBuild {
        scene,
        camera_config,
        image_width: 400,
    }
}

/// S5: 500-ish randomly scattered spheres over a ground sphere, three
/// feature spheres (glass, matte, metal) in front — the BVH stress case,
/// grounded on `main.cpp`'s `make_big_scene()`. `rng` drives the random
/// placement/material choice so callers control reproducibility.
pub fn bvh_stress_scene(rng: &mut dyn RngCore) -> SceneBuild {
    let mut world = HittableList::new();

    let ground_material = Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5)));
    world.add(Arc::new(Sphere::new(Point3::new(0.0, -1000.0, 0.0), 1000.0, ground_material)));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat: f64 = rng.gen();
            let center = Point3::new(
                a as f64 + 0.9 * rng.gen::<f64>(),
                0.2,
                b as f64 + 0.9 * rng.gen::<f64>(),
            );

            if (center - Point3::new(4.0, 0.2, 0.0)).length() > 0.9 {
                let material: Arc<dyn Material> = if choose_mat < 0.8 {
                    let albedo = random_color(rng).hadamard(random_color(rng));
                    Arc::new(Lambertian::new(albedo))
                } else if choose_mat < 0.95 {
                    let albedo = random_color_range(rng, 0.5, 1.0);
                    let fuzz = rng.gen_range(0.0..0.5);
                    Arc::new(Metal::new(albedo, fuzz))
                } else {
                    Arc::new(Dielectric::new(1.5))
                };
                world.add(Arc::new(Sphere::new(center, 0.2, material)));
            }
        }
    }

    world.add(Arc::new(Sphere::new(
        Point3::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Dielectric::new(1.5)),
    )));
    world.add(Arc::new(Sphere::new(
        Point3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Lambertian::new(Color::new(0.4, 0.2, 0.1))),
    )));
    world.add(Arc::new(Sphere::new(
        Point3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    )));

    let scene = Scene {
        world: Arc::new(BvhNode::new(world)),
        lights: vec![],
        background: Color::new(0.7, 0.8, 1.0),
    };

    let camera_config = CameraConfig {
        look_from: Point3::new(13.0, 2.0, 3.0),
        look_at: Point3::zero(),
        vup: Vec3::unit_y(),
        vfov_degrees: 20.0,
        aspect_ratio: 16.0 / 9.0,
        defocus_angle: 0.6,
        focus_dist: 10.0,
        background: Color::new(0.7, 0.8, 1.0),
        horizontal_flip: false,
    };

    SceneBuild {
        scene,
        camera_config,
        image_width: 1200,
    }
}

fn random_color(rng: &mut dyn RngCore) -> Color {
    Color::new(rng.gen(), rng.gen(), rng.gen())
}

fn random_color_range(rng: &mut dyn RngCore, min: f64, max: f64) -> Color {
    Color::new(
        rng.gen_range(min..max),
        rng.gen_range(min..max),
        rng.gen_range(min..max),
    )
}

/// Loads an OBJ mesh from `obj_source`, lights it with a single area light
/// above and in front, and frames it with a fixed camera — the gallery scene
/// selected via `--obj <path>`.
pub fn mesh_gallery(obj_source: &str) -> Result<SceneBuild, RenderError> {
    let mesh_material = Arc::new(Lambertian::new(Color::new(0.6, 0.6, 0.6)));
    let mesh = obj::load_obj(obj_source, mesh_material)?;

    let mut world = HittableList::new();
    world.add(Arc::new(BvhNode::new(mesh)));

    let light = Arc::new(DiffuseLight::new(Color::new(8.0, 8.0, 8.0)));
    let light_quad = add_light_quad(
        &mut world,
        Quad::new(
            Point3::new(-2.0, 4.0, -2.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 4.0),
            light,
        ),
    );

    let scene = Scene {
        world: Arc::new(BvhNode::new(world)),
        lights: vec![light_quad],
        background: Color::new(0.05, 0.05, 0.08),
    };

    let camera_config = CameraConfig {
        look_from: Point3::new(0.0, 2.0, 6.0),
        look_at: Point3::new(0.0, 0.5, 0.0),
        vup: Vec3::unit_y(),
        vfov_degrees: 35.0,
        aspect_ratio: 16.0 / 9.0,
        defocus_angle: 0.0,
        focus_dist: 6.0,
        background: Color::new(0.05, 0.05, 0.08),
        horizontal_flip: false,
    };

    Ok(SceneBuild {
        scene,
        camera_config,
        image_width: 480,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::Hittable;
    use crate::math::Interval;
    use crate::math::Ray;

    #[test]
    fn cornell_box_light_quad_is_sampleable_and_visible() {
        let build = cornell_box();
        assert_eq!(build.scene.lights.len(), 1);
        let ray = Ray::new(Point3::new(343.0, 500.0, 332.0), Vec3::new(0.0, 1.0, 0.0));
        assert!(build
            .scene
            .world
            .hit(&ray, Interval::new(0.001, f64::INFINITY))
            .is_some());
    }

    #[test]
    fn single_sphere_scene_has_no_lights() {
        let build = single_sphere_on_plane();
        assert!(build.scene.lights.is_empty());
    }

    #[test]
    fn mesh_gallery_rejects_malformed_obj() {
        assert!(mesh_gallery("f 1 2 3\n").is_err());
    }
}

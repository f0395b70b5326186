use rand::{Rng, RngCore};

use crate::math::{Color, Point3, Ray, Vec3};

/// Thin-lens camera configuration. `background` is the radiance returned for
/// rays that escape the scene entirely (no Non-goal excludes it — every ray
/// that misses everything needs *some* color), and `horizontal_flip` mirrors
/// the image left-to-right at ray-generation time (grounded on
/// `main.cpp`'s `cam.flipHorizontal = true` for the Cornell box scene).
pub struct CameraConfig {
    pub look_from: Point3,
    pub look_at: Point3,
    pub vup: Vec3,
    pub vfov_degrees: f64,
    pub aspect_ratio: f64,
    pub defocus_angle: f64,
    pub focus_dist: f64,
    pub background: Color,
    pub horizontal_flip: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            look_from: Point3::new(0.0, 1.0, 3.0),
            look_at: Point3::zero(),
            vup: Vec3::unit_y(),
            vfov_degrees: 40.0,
            aspect_ratio: 16.0 / 9.0,
            defocus_angle: 0.0,
            focus_dist: 3.0,
            background: Color::zero(),
            horizontal_flip: false,
        }
    }
}

/// A thin-lens camera producing primary rays for integer pixel coordinates.
/// Depth of field is simulated by jittering the ray origin across a disk of
/// radius `focus_dist * tan(defocus_angle / 2)` centered on the camera,
/// while the rays still converge on the same point on the focus plane.
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,
    pub background: Color,
    horizontal_flip: bool,
    center: Point3,
    pixel00_loc: Point3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
    defocus_angle: f64,
}

impl Camera {
    pub fn new(config: &CameraConfig, image_width: u32) -> Self {
        let image_height = ((image_width as f64 / config.aspect_ratio) as u32).max(1);

        let theta = config.vfov_degrees.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * config.focus_dist;
        let viewport_width = viewport_height * (image_width as f64 / image_height as f64);

        let w = (config.look_from - config.look_at).normalized();
        let u = config.vup.cross(w).normalized();
        let v = w.cross(u);

        let viewport_u = u * viewport_width;
        let viewport_v = -v * viewport_height;

        let pixel_delta_u = viewport_u / image_width as f64;
        let pixel_delta_v = viewport_v / image_height as f64;

        let viewport_upper_left =
            config.look_from - w * config.focus_dist - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + (pixel_delta_u + pixel_delta_v) * 0.5;

        let defocus_radius = config.focus_dist * (config.defocus_angle.to_radians() / 2.0).tan();

        Self {
            image_width,
            image_height,
            background: config.background,
            horizontal_flip: config.horizontal_flip,
            center: config.look_from,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            u,
            v,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
            defocus_angle: config.defocus_angle,
        }
    }

    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Point3 {
        let p = Vec3::random_in_unit_disk(rng);
        self.center + self.defocus_disk_u * p.x + self.defocus_disk_v * p.y
    }

    /// Builds a jittered primary ray through pixel `(i, j)` (row `j`, column
    /// `i`, both zero-based). `horizontal_flip` mirrors the column before
    /// jittering so the rest of the camera math is unaffected.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let i = if self.horizontal_flip {
            self.image_width - 1 - i
        } else {
            i
        };

        let offset_x: f64 = rng.gen::<f64>() - 0.5;
        let offset_y: f64 = rng.gen::<f64>() - 0.5;

        let pixel_sample = self.pixel00_loc
            + self.pixel_delta_u * (i as f64 + offset_x)
            + self.pixel_delta_v * (j as f64 + offset_y);

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        Ray::new(ray_origin, pixel_sample - ray_origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn image_height_derives_from_aspect_ratio() {
        let config = CameraConfig {
            aspect_ratio: 2.0,
            ..CameraConfig::default()
        };
        let camera = Camera::new(&config, 400);
        assert_eq!(camera.image_height, 200);
    }

    #[test]
    fn zero_defocus_angle_gives_pinhole_origin() {
        let config = CameraConfig::default();
        let camera = Camera::new(&config, 100);
        let mut rng = SmallRng::seed_from_u64(42);
        let ray = camera.get_ray(50, 50, &mut rng);
        assert_eq!(ray.origin, config.look_from);
    }
}

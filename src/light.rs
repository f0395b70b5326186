use std::sync::Arc;

use rand::RngCore;

use crate::hittable::{HitRecord, Hittable};
use crate::material::Material;
use crate::math::{Aabb, Color, Interval, Point3, Ray, Vec3};
use crate::shapes::Quad;

/// Result of sampling a point on a light from a shading point `x`. `wi`
/// points from `x` toward the light; `p_solid_angle` is the solid-angle
/// density of that sample *not* divided by the number of lights — the
/// integrator applies the `1/N` uniform-selection factor itself.
pub struct LightSample {
    pub wi: Vec3,
    pub emitted: Color,
    pub p_solid_angle: f64,
    pub distance: f64,
}

/// An emissive primitive the integrator can explicitly sample for next-event
/// estimation, in addition to being an ordinary [`Hittable`] camera rays can
/// strike directly.
pub trait Light: Hittable {
    fn sample(&self, x: Point3, rng: &mut dyn RngCore) -> LightSample;
}

/// An area light backed by a [`Quad`] emitter; the quad's own material
/// supplies the emitted radiance used when sampling it directly.
pub struct QuadLight {
    quad: Arc<Quad>,
    material: Arc<dyn Material>,
}

impl QuadLight {
    pub fn new(quad: Arc<Quad>) -> Self {
        let material = quad.material();
        Self { quad, material }
    }
}

impl Hittable for QuadLight {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        self.quad.hit(ray, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        self.quad.bounding_box()
    }
}

impl Light for QuadLight {
    fn sample(&self, x: Point3, rng: &mut dyn RngCore) -> LightSample {
        let y = self.quad.sample_point(rng);
        let p_area = 1.0 / self.quad.area();
        let to_light = y - x;
        let distance = to_light.length();
        let wi = to_light / distance;
        // wi points toward the light; the light-facing test needs the
        // vector from the light back toward the shading point.
        let cos_theta_y = (-wi).dot(self.quad.normal());

        if cos_theta_y < 0.0 {
            return LightSample {
                wi,
                emitted: Color::zero(),
                p_solid_angle: 0.0,
                distance,
            };
        }

        let distance_squared = distance * distance;
        LightSample {
            wi,
            emitted: self.material.emitted(&dummy_hit_record(y, self.quad.normal())),
            p_solid_angle: p_area * distance_squared / cos_theta_y,
            distance,
        }
    }
}

/// `Material::emitted` only needs a hit record for materials that vary
/// emission spatially (none do here), so a minimal stand-in is built instead
/// of threading a full intersection through the light-sampling path.
fn dummy_hit_record(p: Point3, normal: Vec3) -> HitRecord {
    HitRecord {
        p,
        normal,
        material: Arc::new(crate::material::DiffuseLight::new(Color::zero())),
        t: 0.0,
        front_face: true,
        incident_eta: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::DiffuseLight;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn backfacing_sample_has_zero_emission() {
        let quad = Arc::new(Quad::new(
            Point3::new(-1.0, 2.0, -1.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            Arc::new(DiffuseLight::new(Color::new(4.0, 4.0, 4.0))),
        ));
        let light = QuadLight::new(quad);
        let mut rng = SmallRng::seed_from_u64(1);
        // This quad's normal points along +/-Y depending on winding; a point
        // directly above a light facing -Y sees no emission.
        let sample = light.sample(Point3::new(0.0, 5.0, 0.0), &mut rng);
        if light.quad.normal().y > 0.0 {
            assert!(sample.emitted.max_component() > 0.0);
        } else {
            assert_eq!(sample.emitted, Color::zero());
        }
    }

    #[test]
    fn front_facing_sample_returns_emission_and_positive_pdf() {
        let quad = Arc::new(Quad::new(
            Point3::new(-1.0, 2.0, -1.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            Arc::new(DiffuseLight::new(Color::new(4.0, 4.0, 4.0))),
        ));
        let light = QuadLight::new(quad);
        let mut rng = SmallRng::seed_from_u64(1);
        let below_y = if light.quad.normal().y > 0.0 { -5.0 } else { 5.0 };
        let sample = light.sample(Point3::new(0.0, below_y, 0.0), &mut rng);
        assert!(sample.p_solid_angle > 0.0);
        assert!(sample.emitted.max_component() > 0.0);
    }
}

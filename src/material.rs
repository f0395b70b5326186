use std::sync::Arc;

use crate::bxdf::{Bsdf, Bxdf, DielectricBxdf, LambertianReflection, SpecularReflection};
use crate::hittable::HitRecord;
use crate::math::Color;

/// Surface shading behavior: a material either builds a [`Bsdf`] describing
/// how it scatters light, emits radiance directly (area lights), or both
/// (spec.md allows either; in practice light-emitting materials here do not
/// also scatter).
pub trait Material: Send + Sync {
    fn bsdf(&self, rec: &HitRecord) -> Option<Bsdf>;

    fn emitted(&self, _rec: &HitRecord) -> Color {
        Color::zero()
    }
}

pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Material for Lambertian {
    fn bsdf(&self, rec: &HitRecord) -> Option<Bsdf> {
        let lobes: Vec<Box<dyn Bxdf>> = vec![Box::new(LambertianReflection::new(self.albedo))];
        Some(Bsdf::new(rec, lobes))
    }
}

pub struct Metal {
    albedo: Color,
    fuzz: f64,
}

impl Metal {
    pub fn new(albedo: Color, fuzz: f64) -> Self {
        Self {
            albedo,
            fuzz: fuzz.min(1.0),
        }
    }
}

impl Material for Metal {
    fn bsdf(&self, rec: &HitRecord) -> Option<Bsdf> {
        let lobes: Vec<Box<dyn Bxdf>> = vec![Box::new(SpecularReflection::new(self.albedo, self.fuzz))];
        Some(Bsdf::new(rec, lobes))
    }
}

/// Smooth dielectric (glass). `refraction_index` is this material's own
/// index of refraction; the medium the ray currently travels through comes
/// from the hit record's `incident_eta`, which the integrator propagates
/// bounce to bounce. On entry the ray moves from `incident_eta` into
/// `refraction_index`; on exit it is assumed to return to vacuum (1.0) —
/// no nested-medium stack is tracked, so an exit through a second dielectric
/// boundary while still inside a first one is not modeled.
pub struct Dielectric {
    refraction_index: f64,
}

impl Dielectric {
    pub fn new(refraction_index: f64) -> Self {
        Self { refraction_index }
    }
}

impl Material for Dielectric {
    fn bsdf(&self, rec: &HitRecord) -> Option<Bsdf> {
        let (eta, transmitted_eta) = if rec.front_face {
            (self.refraction_index / rec.incident_eta, self.refraction_index)
        } else {
            (1.0 / rec.incident_eta, 1.0)
        };
        let lobes: Vec<Box<dyn Bxdf>> = vec![Box::new(DielectricBxdf::new(eta, transmitted_eta))];
        Some(Bsdf::new(rec, lobes))
    }
}

pub struct DiffuseLight {
    emit: Color,
}

impl DiffuseLight {
    pub fn new(emit: Color) -> Self {
        Self { emit }
    }
}

impl Material for DiffuseLight {
    fn bsdf(&self, _rec: &HitRecord) -> Option<Bsdf> {
        None
    }

    fn emitted(&self, _rec: &HitRecord) -> Color {
        self.emit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Point3, Vec3};

    fn rec_with_material(material: Arc<dyn Material>, front_face: bool) -> HitRecord {
        HitRecord {
            p: Point3::zero(),
            normal: Vec3::new(0.0, 0.0, 1.0),
            material,
            t: 1.0,
            front_face,
            incident_eta: 1.0,
        }
    }

    #[test]
    fn diffuse_light_has_no_bsdf_but_emits() {
        let light = DiffuseLight::new(Color::new(4.0, 4.0, 4.0));
        let rec = rec_with_material(Arc::new(Lambertian::new(Color::zero())), true);
        assert!(light.bsdf(&rec).is_none());
        assert_eq!(light.emitted(&rec), Color::new(4.0, 4.0, 4.0));
    }

    #[test]
    fn dielectric_inverts_eta_ratio_on_exit() {
        let glass = Dielectric::new(1.5);
        let entering = rec_with_material(Arc::new(Lambertian::new(Color::zero())), true);
        let exiting = rec_with_material(Arc::new(Lambertian::new(Color::zero())), false);
        assert!(glass.bsdf(&entering).is_some());
        assert!(glass.bsdf(&exiting).is_some());
    }
}

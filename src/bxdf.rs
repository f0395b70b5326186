use rand::Rng;

use crate::hittable::HitRecord;
use crate::math::{Color, Vec3};

/// Which transport modes a lobe participates in. Compound constants mirror
/// the combinations a renderer actually tests for (`is_specular`,
/// `is_diffuse`, ...); `ALL` is the identity for an empty bitwise-or scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BxdfFlags(u8);

impl BxdfFlags {
    pub const UNSET: Self = Self(0);
    pub const REFLECTION: Self = Self(1 << 0);
    pub const TRANSMISSION: Self = Self(1 << 1);
    pub const DIFFUSE: Self = Self(1 << 2);
    pub const GLOSSY: Self = Self(1 << 3);
    pub const SPECULAR: Self = Self(1 << 4);

    pub const DIFFUSE_REFLECTION: Self = Self(Self::REFLECTION.0 | Self::DIFFUSE.0);
    pub const DIFFUSE_TRANSMISSION: Self = Self(Self::TRANSMISSION.0 | Self::DIFFUSE.0);
    pub const GLOSSY_REFLECTION: Self = Self(Self::REFLECTION.0 | Self::GLOSSY.0);
    pub const GLOSSY_TRANSMISSION: Self = Self(Self::TRANSMISSION.0 | Self::GLOSSY.0);
    pub const SPECULAR_REFLECTION: Self = Self(Self::REFLECTION.0 | Self::SPECULAR.0);
    pub const SPECULAR_TRANSMISSION: Self = Self(Self::TRANSMISSION.0 | Self::SPECULAR.0);
    pub const SPECULAR_BOTH: Self = Self(Self::SPECULAR_REFLECTION.0 | Self::SPECULAR_TRANSMISSION.0);
    pub const ALL: Self = Self(
        Self::DIFFUSE.0 | Self::GLOSSY.0 | Self::SPECULAR.0 | Self::REFLECTION.0 | Self::TRANSMISSION.0,
    );

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_specular(self) -> bool {
        self.0 & Self::SPECULAR.0 != 0
    }

    pub fn is_diffuse(self) -> bool {
        self.0 & Self::DIFFUSE.0 != 0
    }
}

impl std::ops::BitOr for BxdfFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Outcome of importance-sampling a single lobe or a whole [`Bsdf`]. For a
/// delta lobe `pdf` is a formal placeholder (`1.0`) — the caller must never
/// divide by it against a non-delta estimator. `eta` is the refractive index
/// of the medium the scattered ray now travels through: unchanged from the
/// incident ray for every lobe except a dielectric transmission, which
/// carries the transmitted index so the next hit knows which side it's on.
pub struct BsdfSample {
    pub wi: Vec3,
    pub f: Color,
    pub pdf: f64,
    pub flags: BxdfFlags,
    pub eta: f64,
}

impl BsdfSample {
    pub fn is_delta(&self) -> bool {
        self.flags.is_specular()
    }
}

/// A single scattering lobe evaluated entirely in the local shading frame
/// (`+Z` is the shading normal). [`Bsdf`] is responsible for transforming
/// in and out of world space.
pub trait Bxdf: Send + Sync {
    fn flags(&self) -> BxdfFlags;

    fn f(&self, wo: Vec3, wi: Vec3) -> Color {
        let _ = (wo, wi);
        Color::zero()
    }

    fn pdf(&self, wo: Vec3, wi: Vec3) -> f64 {
        let _ = (wo, wi);
        0.0
    }

    /// `incident_eta` is the refractive index of the medium the ray currently
    /// travels through, passed down so a lobe that changes medium (a
    /// dielectric transmission) can stamp the correct value onto its sample.
    fn sample(&self, wo: Vec3, incident_eta: f64, rng: &mut dyn rand::RngCore) -> Option<BsdfSample>;
}

/// Perfectly diffuse (Lambertian) reflection, cosine-weighted sampled.
pub struct LambertianReflection {
    albedo: Color,
}

impl LambertianReflection {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Bxdf for LambertianReflection {
    fn flags(&self) -> BxdfFlags {
        BxdfFlags::DIFFUSE_REFLECTION
    }

    fn f(&self, _wo: Vec3, wi: Vec3) -> Color {
        if wi.z <= 0.0 {
            return Color::zero();
        }
        self.albedo / std::f64::consts::PI
    }

    fn pdf(&self, _wo: Vec3, wi: Vec3) -> f64 {
        if wi.z <= 0.0 {
            return 0.0;
        }
        wi.z / std::f64::consts::PI
    }

    fn sample(&self, wo: Vec3, incident_eta: f64, rng: &mut dyn rand::RngCore) -> Option<BsdfSample> {
        let wi = Vec3::cos_weighted_in_hemisphere(rng);
        Some(BsdfSample {
            f: self.f(wo, wi),
            pdf: self.pdf(wo, wi),
            flags: self.flags(),
            eta: incident_eta,
            wi,
        })
    }
}

/// Ideal or fuzzed mirror reflection. `fuzz == 0` is a true delta lobe;
/// `fuzz > 0` perturbs the reflected direction but is still treated as a
/// delta lobe for transport purposes, matching the metal material's original
/// "always accept the perturbed mirror bounce" behavior.
pub struct SpecularReflection {
    albedo: Color,
    fuzz: f64,
}

impl SpecularReflection {
    pub fn new(albedo: Color, fuzz: f64) -> Self {
        Self {
            albedo,
            fuzz: fuzz.min(1.0),
        }
    }
}

impl Bxdf for SpecularReflection {
    fn flags(&self) -> BxdfFlags {
        BxdfFlags::SPECULAR_REFLECTION
    }

    fn sample(&self, wo: Vec3, incident_eta: f64, rng: &mut dyn rand::RngCore) -> Option<BsdfSample> {
        let mirror = Vec3::new(-wo.x, -wo.y, wo.z);
        let wi = if self.fuzz > 0.0 {
            (mirror + self.fuzz * Vec3::random_unit_vector(rng)).normalized()
        } else {
            mirror
        };
        if wi.z <= 0.0 {
            return None;
        }
        Some(BsdfSample {
            wi,
            f: self.albedo,
            pdf: 1.0,
            flags: self.flags(),
            eta: incident_eta,
        })
    }
}

/// Smooth dielectric interface: stochastically chooses reflection or
/// transmission per sample, weighted by the exact Fresnel dielectric term.
/// `eta` is the incident/transmitted ratio used for the Fresnel and Snell
/// computations; `transmitted_eta` is the absolute index the ray carries
/// forward when it actually refracts through the surface.
pub struct DielectricBxdf {
    eta: f64,
    transmitted_eta: f64,
}

impl DielectricBxdf {
    pub fn new(eta: f64, transmitted_eta: f64) -> Self {
        Self { eta, transmitted_eta }
    }
}

impl Bxdf for DielectricBxdf {
    fn flags(&self) -> BxdfFlags {
        BxdfFlags::SPECULAR_BOTH
    }

    fn sample(&self, wo: Vec3, incident_eta: f64, rng: &mut dyn rand::RngCore) -> Option<BsdfSample> {
        // Local frame: +Z is the (outward, front-facing) shading normal, so
        // wo.z > 0 means the ray is entering from outside the medium.
        let entering = wo.z > 0.0;
        let (eta_i, eta_t) = if entering {
            (1.0, self.eta)
        } else {
            (self.eta, 1.0)
        };

        let cos_theta_i = wo.z.abs().min(1.0);
        let reflectance = crate::fresnel::fr_dielectric(cos_theta_i, eta_i, eta_t);

        if rng.gen::<f64>() < reflectance {
            let wi = Vec3::new(-wo.x, -wo.y, wo.z);
            return Some(BsdfSample {
                wi,
                f: Color::ones(),
                pdf: 1.0,
                flags: BxdfFlags::SPECULAR_REFLECTION,
                eta: incident_eta,
            });
        }

        let normal = if entering { Vec3::unit_z() } else { -Vec3::unit_z() };
        let refracted = (-wo).refract(normal, eta_i / eta_t)?;
        Some(BsdfSample {
            wi: refracted,
            f: Color::ones(),
            pdf: 1.0,
            flags: BxdfFlags::SPECULAR_TRANSMISSION,
            eta: self.transmitted_eta,
        })
    }
}

/// Per-hit container combining a shading frame with the set of lobes the
/// material contributed. Built fresh for each intersection and discarded
/// once the integrator is done with it.
pub struct Bsdf {
    t1: Vec3,
    t2: Vec3,
    n: Vec3,
    lobes: Vec<Box<dyn Bxdf>>,
    incident_eta: f64,
}

impl Bsdf {
    pub fn new(rec: &HitRecord, lobes: Vec<Box<dyn Bxdf>>) -> Self {
        let n = rec.normal;
        let a = if n.x.abs() > 0.95 {
            Vec3::new(0.0, 1.0, 0.0)
        } else {
            Vec3::new(1.0, 0.0, 0.0)
        };
        let t1 = a.cross(n).normalized();
        let t2 = n.cross(t1);
        Self {
            t1,
            t2,
            n,
            lobes,
            incident_eta: rec.incident_eta,
        }
    }

    pub fn world_to_local(&self, v: Vec3) -> Vec3 {
        Vec3::new(v.dot(self.t1), v.dot(self.t2), v.dot(self.n))
    }

    pub fn local_to_world(&self, v: Vec3) -> Vec3 {
        v.x * self.t1 + v.y * self.t2 + v.z * self.n
    }

    pub fn f(&self, wo_world: Vec3, wi_world: Vec3) -> Color {
        let wo = self.world_to_local(wo_world);
        let wi = self.world_to_local(wi_world);
        self.lobes.iter().fold(Color::zero(), |acc, lobe| acc + lobe.f(wo, wi))
    }

    /// Marginal pdf for `wi` across all lobes, `sum_k (1/K) * pdf_k(wi)` —
    /// the corrected uniform mixture (not `1/(K-1)`).
    pub fn pdf(&self, wo_world: Vec3, wi_world: Vec3) -> f64 {
        if self.lobes.is_empty() {
            return 0.0;
        }
        let wo = self.world_to_local(wo_world);
        let wi = self.world_to_local(wi_world);
        let weight = 1.0 / self.lobes.len() as f64;
        self.lobes.iter().map(|lobe| weight * lobe.pdf(wo, wi)).sum()
    }

    pub fn sample(&self, wo_world: Vec3, rng: &mut dyn rand::RngCore) -> Option<BsdfSample> {
        let index = rng.gen_range(0..self.lobes.len());
        let lobe = &self.lobes[index];
        let wo = self.world_to_local(wo_world);
        let sample = lobe.sample(wo, self.incident_eta, rng)?;
        let wi_world = self.local_to_world(sample.wi);

        if sample.is_delta() {
            return Some(BsdfSample {
                wi: wi_world,
                f: sample.f,
                pdf: sample.pdf,
                flags: sample.flags,
                eta: sample.eta,
            });
        }

        Some(BsdfSample {
            f: self.f(wo_world, wi_world),
            pdf: self.pdf(wo_world, wi_world),
            flags: sample.flags,
            wi: wi_world,
            eta: sample.eta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use crate::math::Point3;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::sync::Arc;

    fn flat_hit() -> HitRecord {
        HitRecord {
            p: Point3::zero(),
            normal: Vec3::new(0.0, 0.0, 1.0),
            material: Arc::new(Lambertian::new(Color::ones())),
            t: 1.0,
            front_face: true,
            incident_eta: 1.0,
        }
    }

    #[test]
    fn lambertian_pdf_matches_cosine_law() {
        let lobe = LambertianReflection::new(Color::new(0.5, 0.5, 0.5));
        let wi = Vec3::new(0.0, 0.0, 1.0);
        assert!((lobe.pdf(Vec3::unit_z(), wi) - 1.0 / std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn bsdf_pdf_uses_one_over_k_not_one_over_k_minus_one() {
        let rec = flat_hit();
        let lobes: Vec<Box<dyn Bxdf>> = vec![
            Box::new(LambertianReflection::new(Color::ones())),
            Box::new(LambertianReflection::new(Color::ones())),
        ];
        let bsdf = Bsdf::new(&rec, lobes);
        let wo = Vec3::new(0.0, 0.0, 1.0);
        let wi = Vec3::new(0.0, 0.0, 1.0);
        let single = LambertianReflection::new(Color::ones()).pdf(wo, wi);
        assert!((bsdf.pdf(wo, wi) - single).abs() < 1e-12);
    }

    #[test]
    fn specular_reflection_mirrors_about_normal() {
        let lobe = SpecularReflection::new(Color::ones(), 0.0);
        let mut rng = SmallRng::seed_from_u64(7);
        let wo = Vec3::new(0.3, 0.1, 0.9).normalized();
        let sample = lobe.sample(wo, 1.0, &mut rng).unwrap();
        assert!(sample.is_delta());
        assert!((sample.wi.z - wo.z).abs() < 1e-12);
        assert_eq!(sample.eta, 1.0);
    }
}

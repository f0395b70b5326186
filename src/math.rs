use rand::{Rng, RngCore};
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign, Neg, Sub};

/// A 3-component vector used for positions, directions, and colors throughout
/// the renderer. Implements the arithmetic and geometric operations needed
/// for light transport: dot/cross products, reflection, refraction, and the
/// random-direction generators the BSDF samplers draw from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

pub type Point3 = Vec3;
pub type Color = Vec3;

impl Vec3 {
    #[inline(always)]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline(always)]
    pub const fn ones() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    #[inline(always)]
    pub const fn unit_y() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    #[inline(always)]
    pub const fn unit_z() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    #[inline(always)]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline(always)]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    #[inline(always)]
    pub fn normalized(self) -> Self {
        self / self.length()
    }

    #[inline(always)]
    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline(always)]
    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    /// Specular reflection of `self` about the surface normal `n`: I - 2*dot(I,N)*N.
    #[inline(always)]
    pub fn reflect(self, normal: Self) -> Self {
        self - normal * 2.0 * self.dot(normal)
    }

    /// Snell's law refraction of a unit-length incident direction about a unit
    /// normal with ratio `eta_ratio = eta_incident / eta_transmitted`. Returns
    /// `None` on total internal reflection.
    #[inline]
    pub fn refract(self, normal: Self, eta_ratio: f64) -> Option<Self> {
        let cos_theta = (-self).dot(normal).min(1.0);
        let r_perp = (self + normal * cos_theta) * eta_ratio;
        let discriminant = 1.0 - r_perp.length_squared();
        if discriminant < 0.0 {
            return None;
        }
        let r_parallel = normal * -(discriminant.sqrt());
        Some(r_perp + r_parallel)
    }

    #[inline(always)]
    pub fn hadamard(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }

    #[inline(always)]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self * (1.0 - t) + other * t
    }

    #[inline(always)]
    pub fn saturate(self) -> Self {
        Self::new(
            self.x.clamp(0.0, 0.999),
            self.y.clamp(0.0, 0.999),
            self.z.clamp(0.0, 0.999),
        )
    }

    /// Gamma-2 encoding (sqrt) applied per channel before quantization.
    #[inline(always)]
    pub fn gamma_correct(self) -> Self {
        Self::new(
            if self.x > 0.0 { self.x.sqrt() } else { 0.0 },
            if self.y > 0.0 { self.y.sqrt() } else { 0.0 },
            if self.z > 0.0 { self.z.sqrt() } else { 0.0 },
        )
    }

    #[inline(always)]
    pub fn near_zero(self) -> bool {
        const EPS: f64 = 1e-8;
        self.x.abs() < EPS && self.y.abs() < EPS && self.z.abs() < EPS
    }

    pub fn max_component(self) -> f64 {
        self.x.max(self.y).max(self.z)
    }

    pub fn is_black(self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Uniformly distributed random point inside the unit sphere via rejection sampling.
    pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Self {
        loop {
            let v = Self::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if v.length_squared() < 1.0 {
                return v;
            }
        }
    }

    pub fn random_unit_vector(rng: &mut dyn RngCore) -> Self {
        Self::random_in_unit_sphere(rng).normalized()
    }

    /// Random point on the unit disk — used for defocus-disk sampling.
    pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Self {
        loop {
            let v = Self::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 0.0);
            if v.length_squared() < 1.0 {
                return v;
            }
        }
    }

    /// Cosine-weighted direction in the hemisphere around +Z, for sampling a
    /// Lambertian lobe in its own local shading frame.
    pub fn cos_weighted_in_hemisphere(rng: &mut dyn RngCore) -> Self {
        let r1: f64 = rng.gen();
        let r2: f64 = rng.gen();
        let phi = 2.0 * std::f64::consts::PI * r1;
        let cos_theta = (1.0 - r2).sqrt();
        let sin_theta = r2.sqrt();
        Self::new(phi.cos() * sin_theta, phi.sin() * sin_theta, cos_theta)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Add for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, t: f64) -> Self {
        Self::new(self.x * t, self.y * t, self.z * t)
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;
    #[inline(always)]
    fn mul(self, v: Vec3) -> Vec3 {
        v * self
    }
}

impl MulAssign<f64> for Vec3 {
    #[inline(always)]
    fn mul_assign(&mut self, t: f64) {
        self.x *= t;
        self.y *= t;
        self.z *= t;
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn div(self, t: f64) -> Self {
        let inv = 1.0 / t;
        Self::new(self.x * inv, self.y * inv, self.z * inv)
    }
}

impl DivAssign<f64> for Vec3 {
    #[inline(always)]
    fn div_assign(&mut self, t: f64) {
        let inv = 1.0 / t;
        self.x *= inv;
        self.y *= inv;
        self.z *= inv;
    }
}

impl Index<usize> for Vec3 {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vec3 index out of bounds: {i}"),
        }
    }
}

// ─── Ray ────────────────────────────────────────────────────────────────────

/// A parametric ray R(t) = origin + t*direction. `eta` carries the refractive
/// index of the medium the ray currently travels through (1.0 in vacuum/air)
/// so a dielectric hit can tell whether it is entering or leaving a medium
/// without re-deriving that state from scratch.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vec3,
    pub eta: f64,
}

impl Ray {
    #[inline(always)]
    pub const fn new(origin: Point3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            eta: 1.0,
        }
    }

    #[inline(always)]
    pub const fn with_eta(origin: Point3, direction: Vec3, eta: f64) -> Self {
        Self {
            origin,
            direction,
            eta,
        }
    }

    #[inline(always)]
    pub fn at(self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }
}

// ─── Interval ───────────────────────────────────────────────────────────────

/// A closed real interval [min, max]. `EMPTY` and `UNIVERSE` are the two
/// sentinel values used to seed unions during AABB construction.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub const EMPTY: Interval = Interval {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };
    pub const UNIVERSE: Interval = Interval {
        min: f64::NEG_INFINITY,
        max: f64::INFINITY,
    };

    #[inline(always)]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// The union of two intervals — the smallest interval containing both.
    pub fn union(a: Interval, b: Interval) -> Self {
        Self::new(a.min.min(b.min), a.max.max(b.max))
    }

    #[inline(always)]
    pub fn size(&self) -> f64 {
        self.max - self.min
    }

    #[inline(always)]
    pub fn contains(&self, t: f64) -> bool {
        self.min <= t && t <= self.max
    }

    #[inline(always)]
    pub fn surrounds(&self, t: f64) -> bool {
        self.min < t && t < self.max
    }

    /// Symmetric padding: grows the interval by `delta/2` on each side.
    pub fn expand(&self, delta: f64) -> Self {
        let padding = delta / 2.0;
        Self::new(self.min - padding, self.max + padding)
    }
}

impl Add<f64> for Interval {
    type Output = Interval;
    fn add(self, rhs: f64) -> Interval {
        Interval::new(self.min + rhs, self.max + rhs)
    }
}

// ─── Axis-Aligned Bounding Box ──────────────────────────────────────────────

/// Any AABB dimension narrower than this is padded at construction, which
/// keeps the slab test well-defined for perfectly planar primitives (flat
/// quads/triangles whose box would otherwise be degenerate on one axis).
pub const AABB_PAD_DELTA: f64 = 1e-4;

/// An axis-aligned bounding box made of three `Interval`s, used as the
/// bounding volume throughout the BVH.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut bbox = Self { x, y, z };
        bbox.pad_to_minimum();
        bbox
    }

    /// Builds the box with `a` and `b` treated as two opposing extrema
    /// (order does not matter on any axis).
    pub fn from_corners(a: Point3, b: Point3) -> Self {
        let x = if a.x <= b.x {
            Interval::new(a.x, b.x)
        } else {
            Interval::new(b.x, a.x)
        };
        let y = if a.y <= b.y {
            Interval::new(a.y, b.y)
        } else {
            Interval::new(b.y, a.y)
        };
        let z = if a.z <= b.z {
            Interval::new(a.z, b.z)
        } else {
            Interval::new(b.z, a.z)
        };
        Self::new(x, y, z)
    }

    pub fn union(a: &Aabb, b: &Aabb) -> Self {
        Self::new(
            Interval::union(a.x, b.x),
            Interval::union(a.y, b.y),
            Interval::union(a.z, b.z),
        )
    }

    fn pad_to_minimum(&mut self) {
        if self.x.size() < AABB_PAD_DELTA {
            self.x = self.x.expand(AABB_PAD_DELTA);
        }
        if self.y.size() < AABB_PAD_DELTA {
            self.y = self.y.expand(AABB_PAD_DELTA);
        }
        if self.z.size() < AABB_PAD_DELTA {
            self.z = self.z.expand(AABB_PAD_DELTA);
        }
    }

    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Slab-method ray/box test. `ray_t` is taken by value so the caller's
    /// interval is never disturbed; IEEE-754 infinities make axis-aligned
    /// directions (division by zero) produce the correct answer without an
    /// explicit branch.
    pub fn hit(&self, ray: &Ray, mut ray_t: Interval) -> bool {
        for axis in 0..3 {
            let ax = self.axis_interval(axis);
            let inv_d = 1.0 / ray.direction[axis];
            let mut t_enter = (ax.min - ray.origin[axis]) * inv_d;
            let mut t_exit = (ax.max - ray.origin[axis]) * inv_d;
            if t_enter > t_exit {
                std::mem::swap(&mut t_enter, &mut t_exit);
            }
            if t_enter > ray_t.min {
                ray_t.min = t_enter;
            }
            if t_exit < ray_t.max {
                ray_t.max = t_exit;
            }
            if ray_t.max <= ray_t.min {
                return false;
            }
        }
        true
    }

    /// Index of the widest axis (0=x, 1=y, 2=z) — the SAH builder's split axis.
    pub fn longest_axis(&self) -> usize {
        if self.x.size() > self.y.size() {
            if self.x.size() > self.z.size() {
                0
            } else {
                2
            }
        } else if self.y.size() > self.z.size() {
            1
        } else {
            2
        }
    }

    pub fn surface_area(&self) -> f64 {
        2.0 * (self.x.size() * self.y.size()
            + self.x.size() * self.z.size()
            + self.y.size() * self.z.size())
    }

    pub fn centroid(&self) -> Point3 {
        Point3::new(
            (self.x.min + self.x.max) / 2.0,
            (self.y.min + self.y.max) / 2.0,
            (self.z.min + self.z.max) / 2.0,
        )
    }
}

impl Add<Vec3> for Aabb {
    type Output = Aabb;
    fn add(self, offset: Vec3) -> Aabb {
        Aabb::new(self.x + offset.x, self.y + offset.y, self.z + offset.z)
    }
}

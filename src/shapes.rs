use std::sync::Arc;

use rand::RngCore;

use crate::hittable::{HitRecord, Hittable, HittableList};
use crate::material::Material;
use crate::math::{Aabb, Interval, Point3, Ray, Vec3};

pub struct Sphere {
    center: Point3,
    radius: f64,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Sphere {
    pub fn new(center: Point3, radius: f64, material: Arc<dyn Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::new(radius, radius, radius);
        let bbox = Aabb::from_corners(center - rvec, center + rvec);
        Self {
            center,
            radius,
            material,
            bbox,
        }
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let oc = self.center - ray.origin;
        let a = ray.direction.length_squared();
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let p = ray.at(root);
        let outward_normal = (p - self.center) / self.radius;
        let mut rec = HitRecord {
            p,
            normal: outward_normal,
            material: self.material.clone(),
            t: root,
            front_face: true,
            incident_eta: ray.eta,
        };
        rec.set_face_normal(ray, outward_normal);
        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

/// A planar quadrilateral spanned by edge vectors `u`/`v` from corner `q`.
/// Also the area-light primitive: [`Quad::sample_point`]/[`Quad::area`]/
/// [`Quad::normal`] back `light::QuadLight`.
pub struct Quad {
    q: Point3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    material: Arc<dyn Material>,
    bbox: Aabb,
    normal: Vec3,
    d: f64,
}

impl Quad {
    pub fn new(q: Point3, u: Vec3, v: Vec3, material: Arc<dyn Material>) -> Self {
        let n = u.cross(v);
        let normal = n.normalized();
        let d = normal.dot(q);
        let w = n / n.dot(n);

        let b1 = Aabb::from_corners(q, q + u + v);
        let b2 = Aabb::from_corners(q + u, q + v);
        let bbox = Aabb::union(&b1, &b2);

        Self {
            q,
            u,
            v,
            w,
            material,
            bbox,
            normal,
            d,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn material(&self) -> Arc<dyn Material> {
        self.material.clone()
    }

    pub fn area(&self) -> f64 {
        self.u.cross(self.v).length()
    }

    /// Uniformly samples a point on the quad's surface.
    pub fn sample_point(&self, rng: &mut dyn RngCore) -> Point3 {
        use rand::Rng;
        let a: f64 = rng.gen();
        let b: f64 = rng.gen();
        self.q + self.u * a + self.v * b
    }
}

impl Hittable for Quad {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin)) / denom;
        if !ray_t.contains(t) {
            return None;
        }

        let hit_point = ray.at(t);
        let p = hit_point - self.q;
        let alpha = self.w.dot(p.cross(self.v));
        let beta = self.w.dot(self.u.cross(p));

        let unit_interval = Interval::new(0.0, 1.0);
        if !(unit_interval.contains(alpha) && unit_interval.contains(beta)) {
            return None;
        }

        let mut rec = HitRecord {
            p: hit_point,
            normal: self.normal,
            material: self.material.clone(),
            t,
            front_face: true,
            incident_eta: ray.eta,
        };
        rec.set_face_normal(ray, self.normal);
        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

/// Builds the 6 quads of an axis-aligned box spanning arbitrary corners `a`
/// and `b` (componentwise min/max is taken first, so either diagonal works).
pub fn quad_box(a: Point3, b: Point3, material: Arc<dyn Material>) -> HittableList {
    let mut sides = HittableList::new();

    let min = Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z));
    let max = Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z));

    let dx = Vec3::new(max.x - min.x, 0.0, 0.0);
    let dy = Vec3::new(0.0, max.y - min.y, 0.0);
    let dz = Vec3::new(0.0, 0.0, max.z - min.z);

    sides.add(Arc::new(Quad::new(min, dx, dy, material.clone())));
    sides.add(Arc::new(Quad::new(min, dy, dz, material.clone())));
    sides.add(Arc::new(Quad::new(min, dx, dz, material.clone())));
    sides.add(Arc::new(Quad::new(max, -dx, -dy, material.clone())));
    sides.add(Arc::new(Quad::new(max, -dy, -dz, material.clone())));
    sides.add(Arc::new(Quad::new(max, -dx, -dz, material)));

    sides
}

/// A single CCW-wound triangle. `triangle_mesh.h`'s container is modeled by
/// building a [`HittableList`] of these and wrapping it in a BVH, rather
/// than a dedicated mesh type, since a `HittableList` is already exactly
/// that container.
pub struct Triangle {
    v0: Point3,
    v1: Point3,
    v2: Point3,
    normal: Vec3,
    d: f64,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Triangle {
    pub fn new(v0: Point3, v1: Point3, v2: Point3, material: Arc<dyn Material>) -> Self {
        let n = (v1 - v0).cross(v2 - v0);
        let normal = n.normalized();
        let d = normal.dot(v0);

        let b1 = Aabb::from_corners(v0, v1);
        let b2 = Aabb::from_corners(v1, v2);
        let bbox = Aabb::union(&b1, &b2);

        Self {
            v0,
            v1,
            v2,
            normal,
            d,
            material,
            bbox,
        }
    }
}

impl Hittable for Triangle {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin)) / denom;
        if !ray_t.contains(t) {
            return None;
        }

        let hit_point = ray.at(t);

        let v0v1 = self.v1 - self.v0;
        let v0p = hit_point - self.v0;
        if v0v1.cross(v0p).dot(self.normal) < 0.0 {
            return None;
        }
        let v1v2 = self.v2 - self.v1;
        let v1p = hit_point - self.v1;
        if v1v2.cross(v1p).dot(self.normal) < 0.0 {
            return None;
        }
        let v2v0 = self.v0 - self.v2;
        let v2p = hit_point - self.v2;
        if v2v0.cross(v2p).dot(self.normal) < 0.0 {
            return None;
        }

        let mut rec = HitRecord {
            p: hit_point,
            normal: self.normal,
            material: self.material.clone(),
            t,
            front_face: true,
            incident_eta: ray.eta,
        };
        rec.set_face_normal(ray, self.normal);
        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use crate::math::Color;

    fn mat() -> Arc<dyn Material> {
        Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5)))
    }

    #[test]
    fn sphere_hit_from_outside() {
        let sphere = Sphere::new(Point3::new(0.0, 0.0, -5.0), 1.0, mat());
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 0.0, -1.0));
        let rec = sphere.hit(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();
        assert!((rec.t - 4.0).abs() < 1e-9);
        assert!(rec.front_face);
    }

    #[test]
    fn quad_hit_inside_unit_square() {
        let quad = Quad::new(
            Point3::new(-1.0, -1.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
            mat(),
        );
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = quad.hit(&ray, Interval::new(0.001, f64::INFINITY));
        assert!(rec.is_some());
    }

    #[test]
    fn quad_box_has_six_sides() {
        let b = quad_box(Point3::zero(), Point3::ones(), mat());
        assert_eq!(b.objects.len(), 6);
    }

    #[test]
    fn triangle_hit_inside() {
        let tri = Triangle::new(
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            mat(),
        );
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(tri.hit(&ray, Interval::new(0.001, f64::INFINITY)).is_some());
    }
}

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable, HittableList};
use crate::math::{Aabb, Interval, Ray};

/// A node in a bounding volume hierarchy built top-down with a
/// surface-area-heuristic split. Immutable after construction: both
/// children are owned `Arc<dyn Hittable>`s and there are no parent pointers.
pub struct BvhNode {
    left: Arc<dyn Hittable>,
    right: Arc<dyn Hittable>,
    bbox: Aabb,
}

impl BvhNode {
    pub fn new(list: HittableList) -> Self {
        let mut objects = list.objects;
        let end = objects.len();
        Self::build(&mut objects, 0, end)
    }

    fn build(objects: &mut [Arc<dyn Hittable>], start: usize, end: usize) -> Self {
        let mut bbox = Aabb::EMPTY;
        for object in &objects[start..end] {
            bbox = Aabb::union(&bbox, &object.bounding_box());
        }

        let axis = bbox.longest_axis();
        let span = end - start;

        let (left, right): (Arc<dyn Hittable>, Arc<dyn Hittable>) = match span {
            1 => (objects[start].clone(), objects[start].clone()),
            2 => (objects[start].clone(), objects[start + 1].clone()),
            3 => {
                Self::sort_by_axis(objects, start, end, axis);
                let left: Arc<dyn Hittable> = Arc::new(Self::build(objects, start, start + 2));
                let right = objects[end - 1].clone();
                (left, right)
            }
            _ => {
                Self::sort_by_axis(objects, start, end, axis);
                let num_buckets = span.min(12);
                let axis_interval = bbox.axis_interval(axis);
                let bucket_length = axis_interval.size() / num_buckets as f64;
                let offset = Self::sah_partition(
                    objects,
                    start,
                    end,
                    axis,
                    num_buckets,
                    axis_interval.min,
                    bucket_length,
                );
                let left: Arc<dyn Hittable> = Arc::new(Self::build(objects, start, start + offset + 1));
                let right: Arc<dyn Hittable> = Arc::new(Self::build(objects, start + offset + 1, end));
                (left, right)
            }
        };

        Self { left, right, bbox }
    }

    fn sort_by_axis(objects: &mut [Arc<dyn Hittable>], start: usize, end: usize, axis: usize) {
        objects[start..end].sort_by(|a, b| {
            let a_min = a.bounding_box().axis_interval(axis).min;
            let b_min = b.bounding_box().axis_interval(axis).min;
            a_min.partial_cmp(&b_min).expect("primitive bounds must be finite")
        });
    }

    /// Scans `num_buckets` equal-width slabs along `axis` and returns the
    /// *offset from `start`* of the last element to include in the left
    /// partition — the bucket boundary minimizing the SAH cost
    /// `left.surface_area() + right.surface_area()`. Ties (including the
    /// "cursor is still at the first element" case) resolve to offset 0.
    fn sah_partition(
        objects: &[Arc<dyn Hittable>],
        start: usize,
        end: usize,
        axis: usize,
        num_buckets: usize,
        axis_min: f64,
        bucket_length: f64,
    ) -> usize {
        let mut best_offset = 0usize;
        let mut min_sa = f64::INFINITY;
        let mut cursor = start;
        let mut left_box = objects[cursor].bounding_box();

        for i in 1..=num_buckets {
            let bound = axis_min + bucket_length * i as f64;
            while cursor < end && objects[cursor].bounding_box().centroid()[axis] <= bound {
                left_box = Aabb::union(&left_box, &objects[cursor].bounding_box());
                cursor += 1;
            }
            if cursor == end {
                break;
            }

            let left_sa = left_box.surface_area();
            if left_sa > min_sa {
                continue;
            }

            let mut right_box = Aabb::EMPTY;
            for object in &objects[cursor + 1..end] {
                right_box = Aabb::union(&right_box, &object.bounding_box());
            }
            let right_sa = right_box.surface_area();

            if left_sa + right_sa < min_sa {
                best_offset = if cursor == start { 0 } else { cursor - start - 1 };
                min_sa = left_sa + right_sa;
            }
        }

        best_offset
    }
}

impl Hittable for BvhNode {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        if !self.bbox.hit(ray, ray_t) {
            return None;
        }

        let hit_left = self.left.hit(ray, ray_t);
        let right_max = hit_left.as_ref().map(|rec| rec.t).unwrap_or(ray_t.max);
        let hit_right = self.right.hit(ray, Interval::new(ray_t.min, right_max));

        hit_right.or(hit_left)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use crate::math::{Color, Point3, Vec3};
    use crate::shapes::Sphere;

    fn mat() -> Arc<dyn crate::material::Material> {
        Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5)))
    }

    #[test]
    fn bvh_matches_brute_force_for_many_spheres() {
        let mut list = HittableList::new();
        for i in 0..37 {
            let x = (i as f64) * 0.7 - 12.0;
            list.add(Arc::new(Sphere::new(Point3::new(x, 0.0, -10.0), 0.3, mat())));
        }
        let brute_force: Vec<Arc<dyn Hittable>> = list.objects.clone();
        let bvh = BvhNode::new(list);

        for i in 0..50 {
            let x = (i as f64) * 0.5 - 12.5;
            let ray = Ray::new(Point3::new(x, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
            let ray_t = Interval::new(0.001, f64::INFINITY);

            let mut brute_t = None;
            for obj in &brute_force {
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
}

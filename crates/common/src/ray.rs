use glam::Vec3;

use crate::{DEGENERATE_EPSILON, PARALLEL_EPSILON};

/// A ray `origin + direction * t` restricted to `0 <= t <= max_distance`.
///
/// `t` is measured in multiples of `direction`, so a segment is a ray whose
/// direction is the segment's displacement and whose `max_distance` is 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub max_distance: f32,
}

impl Ray {
    /// Unbounded ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            max_distance: f32::INFINITY,
        }
    }

    /// The segment from `origin` to `origin + displacement`.
    pub fn segment(origin: Vec3, displacement: Vec3) -> Self {
        Self {
            origin,
            direction: displacement,
            max_distance: 1.0,
        }
    }

    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Point at parameter `t`.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Intersect a ray with triangle `(a, b, c)`, returning the ray parameter of
/// the hit.
///
/// Plane intersection followed by a barycentric inside test. Zero-area
/// triangles, rays parallel to the plane (including rays lying in it) and
/// hits behind the origin or past `max_distance` all return `None`.
pub fn intersect_triangle(ray: &Ray, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let ab = b - a;
    let ac = c - a;
    let cross = ab.cross(ac);
    let area_sq = cross.length_squared();
    if area_sq <= DEGENERATE_EPSILON {
        return None;
    }
    let normal = cross / area_sq.sqrt();

    let denom = normal.dot(ray.direction);
    if denom.abs() <= PARALLEL_EPSILON {
        return None;
    }
    let t = normal.dot(a - ray.origin) / denom;
    if t < 0.0 || t > ray.max_distance {
        return None;
    }

    let ap = ray.at(t) - a;
    let d00 = ab.dot(ab);
    let d01 = ab.dot(ac);
    let d11 = ac.dot(ac);
    let d20 = ap.dot(ab);
    let d21 = ap.dot(ac);
    let det = d00 * d11 - d01 * d01;
    if det.abs() <= DEGENERATE_EPSILON {
        return None;
    }
    let v = (d11 * d20 - d01 * d21) / det;
    let w = (d00 * d21 - d01 * d20) / det;
    let u = 1.0 - v - w;

    const EDGE_TOLERANCE: f32 = -1e-5;
    (u >= EDGE_TOLERANCE && v >= EDGE_TOLERANCE && w >= EDGE_TOLERANCE).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> (Vec3, Vec3, Vec3) {
        (
            Vec3::new(-10.0, 0.0, -10.0),
            Vec3::new(-10.0, 0.0, 10.0),
            Vec3::new(10.0, 0.0, 10.0),
        )
    }

    #[test]
    fn downward_ray_hits_floor() {
        let (a, b, c) = floor();
        let ray = Ray::new(Vec3::new(-5.0, 3.0, 5.0), Vec3::NEG_Y);
        let t = intersect_triangle(&ray, a, b, c).unwrap();
        assert!((t - 3.0).abs() < 1e-5);
    }

    #[test]
    fn ray_outside_triangle_misses() {
        let (a, b, c) = floor();
        // (5, _, -5) lies on the other half of the square.
        let ray = Ray::new(Vec3::new(5.0, 3.0, -5.0), Vec3::NEG_Y);
        assert!(intersect_triangle(&ray, a, b, c).is_none());
    }

    #[test]
    fn ray_pointing_away_misses() {
        let (a, b, c) = floor();
        let ray = Ray::new(Vec3::new(-5.0, 3.0, 5.0), Vec3::Y);
        assert!(intersect_triangle(&ray, a, b, c).is_none());
    }

    #[test]
    fn parallel_ray_misses_even_in_plane() {
        let (a, b, c) = floor();
        let above = Ray::new(Vec3::new(-5.0, 1.0, 5.0), Vec3::X);
        let inside = Ray::new(Vec3::new(-15.0, 0.0, 5.0), Vec3::X);
        assert!(intersect_triangle(&above, a, b, c).is_none());
        assert!(intersect_triangle(&inside, a, b, c).is_none());
    }

    #[test]
    fn degenerate_triangle_never_hits() {
        let a = Vec3::ZERO;
        let b = Vec3::new(1.0, 0.0, 0.0);
        let c = Vec3::new(2.0, 0.0, 0.0);
        let ray = Ray::new(Vec3::new(1.0, 1.0, 0.0), Vec3::NEG_Y);
        assert!(intersect_triangle(&ray, a, b, c).is_none());
    }

    #[test]
    fn segment_respects_length() {
        let (a, b, c) = floor();
        let short = Ray::segment(Vec3::new(-5.0, 3.0, 5.0), Vec3::new(0.0, -2.0, 0.0));
        let long = Ray::segment(Vec3::new(-5.0, 3.0, 5.0), Vec3::new(0.0, -4.0, 0.0));
        assert!(intersect_triangle(&short, a, b, c).is_none());
        let t = intersect_triangle(&long, a, b, c).unwrap();
        assert!((t - 0.75).abs() < 1e-5);
    }

    #[test]
    fn hit_on_shared_edge_counts() {
        let (a, b, c) = floor();
        // Diagonal from (-10,-10) to (10,10) is an edge of the triangle.
        let ray = Ray::new(Vec3::new(2.0, 1.0, 2.0), Vec3::NEG_Y);
        assert!(intersect_triangle(&ray, a, b, c).is_some());
    }
}

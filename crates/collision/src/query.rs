use cavern_common::Ray;
use glam::Vec3;

use crate::mesh::CollisionMesh;

/// Nearest triangle crossed by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub triangle: usize,
    /// Ray parameter of the hit, in multiples of the ray's direction.
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

impl CollisionMesh {
    /// Nearest hit along the ray, first triangle winning ties.
    pub fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        for (index, tri) in self.triangles().iter().enumerate() {
            let Some(t) = tri.raycast(ray) else {
                continue;
            };
            if best.is_none_or(|b| t < b.distance) {
                best = Some(RayHit {
                    triangle: index,
                    distance: t,
                    point: ray.at(t),
                    normal: tri.normal(),
                });
            }
        }
        best
    }

    /// Whether a lightweight particle moving from `origin` by `displacement`
    /// crosses any triangle this frame.
    ///
    /// Single pass, no sliding, no radius: the particle either gets through
    /// or it doesn't.
    pub fn test_emitter_collision(&self, origin: Vec3, displacement: Vec3) -> bool {
        let segment = Ray::segment(origin, displacement);
        self.triangles()
            .iter()
            .any(|tri| tri.raycast(&segment).is_some())
    }

    /// First surface straight below `point` within `max_drop`.
    pub fn ground_below(&self, point: Vec3, max_drop: f32) -> Option<RayHit> {
        self.raycast(&Ray::new(point, Vec3::NEG_Y).with_max_distance(max_drop))
    }
}

use cavern_common::{DEGENERATE_EPSILON, Ray, intersect_triangle};
use glam::Vec3;

/// Angle sum (radians) above which a point counts as inside a triangle.
///
/// An enclosed point sums to roughly 2π and an outside point to roughly 0.
/// Anything over one radian is accepted, so this is a loose test rather
/// than an exact comparison against 2π.
const INSIDE_ANGLE_THRESHOLD: f32 = 1.0;

/// A collision triangle with its unit face normal.
///
/// The normal follows the winding: `(b - a) x (c - a)`, normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    vertices: [Vec3; 3],
    normal: Vec3,
}

impl Triangle {
    /// Build a triangle, or `None` if its corners are collinear or coincide.
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Option<Self> {
        let cross = (b - a).cross(c - a);
        let len_sq = cross.length_squared();
        if len_sq <= DEGENERATE_EPSILON || !len_sq.is_finite() {
            return None;
        }
        Some(Self {
            vertices: [a, b, c],
            normal: cross / len_sq.sqrt(),
        })
    }

    pub fn vertices(&self) -> &[Vec3; 3] {
        &self.vertices
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Signed distance from `point` to the triangle's plane, positive on the
    /// normal side.
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point - self.vertices[0])
    }

    /// Orthogonal projection of `point` onto the triangle's plane.
    pub fn project(&self, point: Vec3) -> Vec3 {
        point - self.normal * self.signed_distance(point)
    }

    /// Whether a point on (or near) the plane lies within the triangle.
    ///
    /// Sums the signed angles subtended by each edge as seen from the point.
    /// See [`INSIDE_ANGLE_THRESHOLD`] for how loose the cut-off is.
    pub fn contains_point(&self, point: Vec3) -> bool {
        let mut sum = 0.0;
        for i in 0..3 {
            let a = self.vertices[i] - point;
            let b = self.vertices[(i + 1) % 3] - point;
            let (la, lb) = (a.length_squared(), b.length_squared());
            if la <= DEGENERATE_EPSILON || lb <= DEGENERATE_EPSILON {
                // Sitting on a corner.
                return true;
            }
            let cos = (a.dot(b) / (la * lb).sqrt()).clamp(-1.0, 1.0);
            let angle = cos.acos();
            if a.cross(b).dot(self.normal) >= 0.0 {
                sum += angle;
            } else {
                sum -= angle;
            }
        }
        f32::abs(sum) > INSIDE_ANGLE_THRESHOLD
    }

    /// Ray parameter of the hit, if the ray crosses this triangle.
    pub fn raycast(&self, ray: &Ray) -> Option<f32> {
        let [a, b, c] = self.vertices;
        intersect_triangle(ray, a, b, c)
    }
}

/// Immutable set of triangles used purely for intersection math.
#[derive(Debug, Clone, Default)]
pub struct CollisionMesh {
    triangles: Vec<Triangle>,
    rejected: usize,
}

impl CollisionMesh {
    /// Build from raw corner triples, skipping degenerate ones.
    pub fn from_triangles(corners: impl IntoIterator<Item = [Vec3; 3]>) -> Self {
        let mut triangles = Vec::new();
        let mut rejected = 0;
        for (i, [a, b, c]) in corners.into_iter().enumerate() {
            match Triangle::new(a, b, c) {
                Some(t) => triangles.push(t),
                None => {
                    tracing::warn!(triangle = i, "skipping degenerate collision triangle");
                    rejected += 1;
                }
            }
        }
        tracing::debug!(
            triangles = triangles.len(),
            rejected,
            "built collision mesh"
        );
        Self {
            triangles,
            rejected,
        }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn get(&self, index: usize) -> Option<&Triangle> {
        self.triangles.get(index)
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Number of input triangles dropped as degenerate.
    pub fn rejected_count(&self) -> usize {
        self.rejected
    }
}

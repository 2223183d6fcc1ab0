use cavern_assets::QuadFace;
use cavern_common::{CellId, Ray, intersect_triangle};
use glam::Vec3;

/// Unordered pair of global vertex indices, stored smaller-first so that
/// `Edge::new(a, b) == Edge::new(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge(usize, usize);

impl Edge {
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    pub fn vertices(self) -> (usize, usize) {
        (self.0, self.1)
    }

    pub fn is_degenerate(self) -> bool {
        self.0 == self.1
    }
}

/// A quad navigation cell.
#[derive(Debug, Clone, PartialEq)]
pub struct NavCell {
    id: CellId,
    vertices: [Vec3; 4],
    vertex_ids: [usize; 4],
    centroid: Vec3,
    pub(crate) obstacle: bool,
    pub(crate) neighbors: Vec<CellId>,
}

impl NavCell {
    pub(crate) fn new(id: CellId, face: &QuadFace) -> Self {
        let centroid = face.positions.iter().copied().sum::<Vec3>() / 4.0;
        Self {
            id,
            vertices: face.positions,
            vertex_ids: face.indices,
            centroid,
            obstacle: false,
            neighbors: Vec::new(),
        }
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn vertices(&self) -> &[Vec3; 4] {
        &self.vertices
    }

    /// Global vertex indices, in the same order as [`NavCell::vertices`].
    pub fn vertex_ids(&self) -> &[usize; 4] {
        &self.vertex_ids
    }

    /// Mean of the four corners; the waypoint entities walk towards.
    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    pub fn is_obstacle(&self) -> bool {
        self.obstacle
    }

    pub fn neighbors(&self) -> &[CellId] {
        &self.neighbors
    }

    /// The four edges, pairing corners cyclically.
    pub fn edges(&self) -> [Edge; 4] {
        let v = self.vertex_ids;
        [
            Edge::new(v[0], v[1]),
            Edge::new(v[1], v[2]),
            Edge::new(v[2], v[3]),
            Edge::new(v[3], v[0]),
        ]
    }

    /// Ray parameter of the hit, testing the halves `(0, 1, 2)` and `(2, 3, 0)`.
    ///
    /// The split assumes corners are ordered around the quad as parsed; a
    /// bow-tie or strongly non-planar quad can be missed or over-reported.
    pub fn raycast(&self, ray: &Ray) -> Option<f32> {
        let [a, b, c, d] = self.vertices;
        intersect_triangle(ray, a, b, c).or_else(|| intersect_triangle(ray, c, d, a))
    }

    pub fn is_hit_by(&self, ray: &Ray) -> bool {
        self.raycast(ray).is_some()
    }
}

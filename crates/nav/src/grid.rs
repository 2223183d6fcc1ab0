use cavern_assets::QuadFace;
use glam::Vec3;

/// A flat `cols x rows` grid of quads on the y = 0 plane.
///
/// Cell `(cx, cz)` comes out at index `cz * cols + cx` and covers
/// `[cx, cx + 1] x [cz, cz + 1]` scaled by `size`. Corners are wound so the
/// face normal points up, and neighboring quads share vertex indices.
pub fn quad_grid(cols: usize, rows: usize, size: f32) -> Vec<QuadFace> {
    let stride = cols + 1;
    let vertex = |x: usize, z: usize| (z * stride + x, Vec3::new(x as f32 * size, 0.0, z as f32 * size));

    let mut faces = Vec::with_capacity(cols * rows);
    for cz in 0..rows {
        for cx in 0..cols {
            let corners = [
                vertex(cx, cz),
                vertex(cx, cz + 1),
                vertex(cx + 1, cz + 1),
                vertex(cx + 1, cz),
            ];
            faces.push(QuadFace {
                indices: corners.map(|(i, _)| i),
                positions: corners.map(|(_, p)| p),
            });
        }
    }
    faces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_layout() {
        let faces = quad_grid(3, 2, 2.0);
        assert_eq!(faces.len(), 6);
        assert_eq!(faces[0].indices, [0, 4, 5, 1]);
        assert_eq!(faces[4].indices, [5, 9, 10, 6]);
        assert_eq!(faces[5].positions[2], Vec3::new(6.0, 0.0, 4.0));
    }

    #[test]
    fn grid_faces_point_up() {
        for face in quad_grid(2, 2, 1.0) {
            let [a, b, c, _] = face.positions;
            assert!((b - a).cross(c - a).y > 0.0);
        }
    }
}

use cavern_common::PARALLEL_EPSILON;
use glam::Vec3;

use crate::mesh::CollisionMesh;

/// Distance a resolved sphere is pushed off a contact plane, beyond its radius.
pub const DEFAULT_SKIN_WIDTH: f32 = 0.1;

/// Default bound on slide iterations per move.
pub const DEFAULT_MAX_BOUNCES: u32 = 5;

/// A moving sphere to resolve against the mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepQuery {
    pub origin: Vec3,
    pub displacement: Vec3,
    pub radius: f32,
    pub max_bounces: u32,
    pub skin_width: f32,
}

impl SweepQuery {
    pub fn new(origin: Vec3, displacement: Vec3, radius: f32) -> Self {
        Self {
            origin,
            displacement,
            radius,
            max_bounces: DEFAULT_MAX_BOUNCES,
            skin_width: DEFAULT_SKIN_WIDTH,
        }
    }

    pub fn with_max_bounces(mut self, max_bounces: u32) -> Self {
        self.max_bounces = max_bounces;
        self
    }

    pub fn with_skin_width(mut self, skin_width: f32) -> Self {
        self.skin_width = skin_width;
        self
    }
}

/// Where and when the sphere first touched a triangle during one bounce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Index into [`CollisionMesh::triangles`].
    pub triangle: usize,
    pub normal: Vec3,
    /// Fraction of this bounce's displacement travelled before touching.
    pub time: f32,
    /// Touch point on the triangle's plane.
    pub point: Vec3,
}

/// Coarse classification of a contacted surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Floor,
    Wall,
    Ceiling,
}

impl Contact {
    /// Classify by the vertical component of the contact normal.
    pub fn surface(&self, floor_normal_y: f32) -> Surface {
        if self.normal.y >= floor_normal_y {
            Surface::Floor
        } else if self.normal.y <= -floor_normal_y {
            Surface::Ceiling
        } else {
            Surface::Wall
        }
    }
}

/// Outcome of a full sweep: final center plus one contact per bounce taken.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Resolution {
    pub position: Vec3,
    pub contacts: Vec<Contact>,
}

impl Resolution {
    pub fn collided(&self) -> bool {
        !self.contacts.is_empty()
    }

    pub fn touched(&self, surface: Surface, floor_normal_y: f32) -> bool {
        self.contacts
            .iter()
            .any(|c| c.surface(floor_normal_y) == surface)
    }
}

impl CollisionMesh {
    /// Resolve a moving sphere and return its corrected center.
    ///
    /// Zero displacement or `max_bounces == 0` returns `origin` unchanged.
    pub fn resolve(&self, origin: Vec3, displacement: Vec3, radius: f32, max_bounces: u32) -> Vec3 {
        let query = SweepQuery::new(origin, displacement, radius).with_max_bounces(max_bounces);
        self.sweep(&query).position
    }

    /// Resolve a moving sphere, keeping every contact along the way.
    ///
    /// Each bounce finds the earliest blocking triangle, moves the sphere to
    /// the touch point pushed `skin_width` off the plane, removes the normal
    /// component from the leftover motion and recurses with one fewer bounce.
    /// Running out of bounces mid-slide keeps the last corrected position.
    pub fn sweep(&self, query: &SweepQuery) -> Resolution {
        let mut contacts = Vec::new();
        let position = self.slide(
            query.origin,
            query.displacement,
            query.radius,
            query.skin_width,
            query.max_bounces,
            &mut contacts,
        );
        tracing::trace!(
            bounces = contacts.len(),
            ?position,
            "sweep resolved"
        );
        Resolution { position, contacts }
    }

    fn slide(
        &self,
        origin: Vec3,
        displacement: Vec3,
        radius: f32,
        skin_width: f32,
        bounces_left: u32,
        contacts: &mut Vec<Contact>,
    ) -> Vec3 {
        if bounces_left == 0 || displacement == Vec3::ZERO {
            return origin;
        }
        let Some(contact) = self.first_contact(origin, displacement, radius) else {
            return origin + displacement;
        };

        let remaining = displacement * (1.0 - contact.time);
        let slid = remaining - contact.normal * contact.normal.dot(remaining);
        let corrected = contact.point + contact.normal * (radius + skin_width);
        contacts.push(contact);

        self.slide(corrected, slid, radius, skin_width, bounces_left - 1, contacts)
    }

    /// The earliest triangle the sphere touches along `displacement`, if any.
    ///
    /// Only motion towards a triangle's front face can hit it. A sphere that
    /// already overlaps a plane it is moving into, with its center projecting
    /// inside the triangle, is hit at time 0.
    pub fn first_contact(&self, origin: Vec3, displacement: Vec3, radius: f32) -> Option<Contact> {
        let mut best: Option<Contact> = None;

        for (index, tri) in self.triangles().iter().enumerate() {
            let normal = tri.normal();
            let approach = displacement.dot(-normal);
            if approach <= PARALLEL_EPSILON {
                continue;
            }

            let distance = tri.signed_distance(origin);
            let mut time = (distance - radius) / approach;
            if !(0.0..=1.0).contains(&time) {
                let embedded = distance > 0.0
                    && distance < radius
                    && tri.contains_point(tri.project(origin));
                if !embedded {
                    continue;
                }
                time = 0.0;
            }

            let point = tri.project(origin + displacement * time);
            if !tri.contains_point(point) {
                continue;
            }

            if best.is_none_or(|b| time < b.time) {
                best = Some(Contact {
                    triangle: index,
                    normal,
                    time,
                    point,
                });
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = DEFAULT_SKIN_WIDTH;

    fn floor_quad(y: f32, half: f32) -> [[Vec3; 3]; 2] {
        let a = Vec3::new(-half, y, -half);
        let b = Vec3::new(-half, y, half);
        let c = Vec3::new(half, y, half);
        let d = Vec3::new(half, y, -half);
        [[a, b, c], [a, c, d]]
    }

    /// Wall in the plane x = `x`, facing -X.
    fn wall_facing_neg_x(x: f32, half: f32) -> [[Vec3; 3]; 2] {
        let a = Vec3::new(x, -half, -half);
        let b = Vec3::new(x, -half, half);
        let c = Vec3::new(x, half, half);
        let d = Vec3::new(x, half, -half);
        [[a, b, c], [a, c, d]]
    }

    fn big_floor() -> CollisionMesh {
        CollisionMesh::from_triangles([[
            Vec3::new(-1000.0, 0.0, -1000.0),
            Vec3::new(-1000.0, 0.0, 3000.0),
            Vec3::new(3000.0, 0.0, -1000.0),
        ]])
    }

    #[test]
    fn sphere_rests_on_floor() {
        let mesh = big_floor();
        let p = mesh.resolve(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, -20.0, 0.0), 1.0, 5);
        assert!((p.y - 1.0).abs() <= EPS + 1e-4, "y = {}", p.y);
        assert!(p.x.abs() < 1e-4 && p.z.abs() < 1e-4);
    }

    #[test]
    fn zero_displacement_is_rest() {
        let mesh = big_floor();
        for origin in [Vec3::new(0.0, 0.5, 0.0), Vec3::new(3.0, 8.0, -2.0)] {
            assert_eq!(mesh.resolve(origin, Vec3::ZERO, 1.0, 5), origin);
        }
    }

    #[test]
    fn zero_bounces_returns_origin() {
        let mesh = big_floor();
        let origin = Vec3::new(0.0, 10.0, 0.0);
        assert_eq!(mesh.resolve(origin, Vec3::new(0.0, -20.0, 0.0), 1.0, 0), origin);
        assert_eq!(mesh.resolve(origin, Vec3::new(4.0, 0.0, 0.0), 1.0, 0), origin);
    }

    #[test]
    fn free_motion_is_unchanged() {
        let mesh = big_floor();
        let origin = Vec3::new(0.0, 5.0, 0.0);
        let d = Vec3::new(3.0, -1.0, 2.0);
        let res = mesh.sweep(&SweepQuery::new(origin, d, 1.0));
        assert_eq!(res.position, origin + d);
        assert!(!res.collided());
    }

    #[test]
    fn moving_away_from_floor_is_free() {
        let mesh = big_floor();
        let origin = Vec3::new(0.0, 0.5, 0.0);
        let p = mesh.resolve(origin, Vec3::new(0.0, 3.0, 0.0), 1.0, 5);
        assert_eq!(p, Vec3::new(0.0, 3.5, 0.0));
    }

    #[test]
    fn diagonal_fall_slides_along_floor() {
        let mesh = big_floor();
        let res = mesh.sweep(&SweepQuery::new(
            Vec3::new(0.0, 3.0, 0.0),
            Vec3::new(4.0, -4.0, 0.0),
            1.0,
        ));
        // Touches at t = 0.5, then slides the remaining 2 units along +X.
        assert!((res.position.x - 4.0).abs() < 1e-4);
        assert!((res.position.y - (1.0 + EPS)).abs() < 1e-4);
        assert_eq!(res.contacts.len(), 1);
        assert!((res.contacts[0].time - 0.5).abs() < 1e-5);
        assert!(res.touched(Surface::Floor, 0.7));
        assert!(!res.touched(Surface::Wall, 0.7));
    }

    #[test]
    fn wall_blocks_and_slides() {
        let mut tris = Vec::new();
        tris.extend(wall_facing_neg_x(5.0, 50.0));
        let mesh = CollisionMesh::from_triangles(tris);
        let origin = Vec3::new(0.0, 0.0, 0.0);
        let res = mesh.sweep(&SweepQuery::new(origin, Vec3::new(10.0, 0.0, 3.0), 1.0));

        assert!(res.position.x <= 5.0 - 1.0 + 1e-4);
        assert!((res.position.z - 3.0).abs() < 1e-4);
        assert_eq!(res.contacts[0].surface(0.7), Surface::Wall);
    }

    #[test]
    fn embedded_sphere_is_pushed_out() {
        let mesh = big_floor();
        let res = mesh.sweep(&SweepQuery::new(
            Vec3::new(0.0, 0.4, 0.0),
            Vec3::new(0.0, -0.1, 0.0),
            1.0,
        ));
        assert_eq!(res.contacts.len(), 1);
        assert_eq!(res.contacts[0].time, 0.0);
        assert!((res.position.y - (1.0 + EPS)).abs() < 1e-4);
    }

    #[test]
    fn embedded_parallel_motion_is_not_pushed_out() {
        let mesh = CollisionMesh::from_triangles(wall_facing_neg_x(5.0, 50.0));
        // Center 0.5 in front of the wall, radius 1, sliding along it.
        let origin = Vec3::new(4.5, 0.0, 0.0);
        let d = Vec3::new(0.0, 0.0, 2.0);
        assert!(mesh.first_contact(origin, d, 1.0).is_none());
        let res = mesh.sweep(&SweepQuery::new(origin, d, 1.0));
        assert_eq!(res.position, origin + d);
        assert!(!res.collided());
    }

    #[test]
    fn back_faces_do_not_block() {
        let mesh = big_floor();
        let origin = Vec3::new(0.0, -5.0, 0.0);
        let p = mesh.resolve(origin, Vec3::new(0.0, 10.0, 0.0), 1.0, 5);
        assert_eq!(p, Vec3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn outside_triangle_extent_is_free() {
        let mesh = CollisionMesh::from_triangles(floor_quad(0.0, 2.0));
        let origin = Vec3::new(10.0, 5.0, 10.0);
        let d = Vec3::new(0.0, -10.0, 0.0);
        assert_eq!(mesh.resolve(origin, d, 1.0, 5), origin + d);
    }

    #[test]
    fn earliest_contact_wins() {
        let mut tris = Vec::new();
        tris.extend(floor_quad(-6.0, 50.0));
        tris.extend(floor_quad(0.0, 50.0));
        let mesh = CollisionMesh::from_triangles(tris);
        let contact = mesh
            .first_contact(Vec3::new(1.0, 4.0, 1.0), Vec3::new(0.0, -20.0, 0.0), 1.0)
            .unwrap();
        assert!(contact.triangle >= 2, "upper floor is reached first");
        assert!((contact.time - 0.15).abs() < 1e-5);
    }

    #[test]
    fn corner_stops_within_bounce_limit() {
        let mut tris = Vec::new();
        tris.extend(floor_quad(0.0, 50.0));
        tris.extend(wall_facing_neg_x(5.0, 50.0));
        let mesh = CollisionMesh::from_triangles(tris);
        let res = mesh.sweep(
            &SweepQuery::new(Vec3::new(0.0, 3.0, 0.0), Vec3::new(20.0, -20.0, 0.0), 1.0)
                .with_max_bounces(3),
        );
        assert!(res.contacts.len() <= 3);
        assert!(res.position.x <= 4.0 + 1e-3);
        assert!(res.position.y >= 1.0 - 1e-3);
    }

    #[test]
    fn resolved_position_clears_every_hit_plane() {
        let mut tris = Vec::new();
        tris.extend(floor_quad(0.0, 50.0));
        tris.extend(wall_facing_neg_x(5.0, 50.0));
        let mesh = CollisionMesh::from_triangles(tris);
        let radius = 1.0;
        let moves = [
            Vec3::new(20.0, -20.0, 0.0),
            Vec3::new(3.0, -9.0, 7.0),
            Vec3::new(12.0, 0.0, -4.0),
            Vec3::new(0.0, -30.0, 0.0),
        ];
        for d in moves {
            let res = mesh.sweep(&SweepQuery::new(Vec3::new(0.0, 3.0, 0.0), d, radius));
            for contact in &res.contacts {
                let tri = mesh.get(contact.triangle).unwrap();
                assert!(
                    tri.signed_distance(res.position) >= radius - EPS - 1e-4,
                    "move {d:?} ends at {:?}",
                    res.position
                );
            }
        }
    }

    #[test]
    fn surface_classification() {
        let c = |normal: Vec3| Contact {
            triangle: 0,
            normal,
            time: 0.0,
            point: Vec3::ZERO,
        };
        assert_eq!(c(Vec3::Y).surface(0.7), Surface::Floor);
        assert_eq!(c(Vec3::NEG_Y).surface(0.7), Surface::Ceiling);
        assert_eq!(c(Vec3::X).surface(0.7), Surface::Wall);
        assert_eq!(c(Vec3::new(0.0, 0.5, 0.866)).surface(0.7), Surface::Wall);
    }

    #[test]
    fn identical_input_gives_identical_output() {
        let mut tris = Vec::new();
        tris.extend(floor_quad(0.0, 50.0));
        tris.extend(wall_facing_neg_x(5.0, 50.0));
        let mesh = CollisionMesh::from_triangles(tris);
        let q = SweepQuery::new(Vec3::new(0.0, 3.0, 0.0), Vec3::new(9.0, -7.0, 2.0), 1.0);
        assert_eq!(mesh.sweep(&q), mesh.sweep(&q));
    }
}

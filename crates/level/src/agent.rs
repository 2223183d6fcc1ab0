use cavern_common::CellId;
use glam::Vec3;

use crate::level::Level;

/// Per-entity record of which navigation cell it stands in.
///
/// Holds ids only, so entities can be stored and updated independently of
/// the level they query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellTracker {
    current: Option<CellId>,
    previous: Option<CellId>,
}

impl CellTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<CellId> {
        self.current
    }

    /// The cell occupied before the most recent change.
    pub fn previous(&self) -> Option<CellId> {
        self.previous
    }

    /// Re-locate after moving. Uses the current cell as the search hint.
    /// Returns true when the cell changed.
    pub fn update(&mut self, level: &Level, position: Vec3) -> bool {
        let found = level.locate_cell(position, self.current);
        if found == self.current {
            return false;
        }
        tracing::trace!(from = ?self.current, to = ?found, "entity changed cell");
        self.previous = self.current;
        self.current = found;
        true
    }
}

/// Walks an entity through a route's centroids, one tick at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct PathFollower {
    waypoints: Vec<Vec3>,
    next: usize,
    arrive_radius: f32,
}

impl PathFollower {
    pub fn new(waypoints: Vec<Vec3>, arrive_radius: f32) -> Self {
        Self {
            waypoints,
            next: 0,
            arrive_radius,
        }
    }

    pub fn from_route(level: &Level, route: &[CellId], arrive_radius: f32) -> Self {
        Self::new(level.waypoints(route), arrive_radius)
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.waypoints.len()
    }

    pub fn current_target(&self) -> Option<Vec3> {
        self.waypoints.get(self.next).copied()
    }

    pub fn remaining(&self) -> &[Vec3] {
        &self.waypoints[self.next.min(self.waypoints.len())..]
    }

    /// Horizontal displacement for this tick, at most `max_step` long.
    ///
    /// Height is ignored: a sphere resting on the floor sits above the
    /// centroids it walks through. Waypoints within `arrive_radius` are
    /// consumed; once all are consumed the result is zero.
    pub fn steer(&mut self, position: Vec3, max_step: f32) -> Vec3 {
        while let Some(target) = self.current_target() {
            let mut to = target - position;
            to.y = 0.0;
            if to.length() <= self.arrive_radius {
                self.next += 1;
                continue;
            }
            return to.clamp_length_max(max_step);
        }
        Vec3::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LevelConfig;
    use cavern_nav::quad_grid;

    #[test]
    fn tracker_records_transitions() {
        let level = Level::from_quads(&quad_grid(3, 1, 1.0), LevelConfig::default()).unwrap();
        let mut t = CellTracker::new();
        assert!(t.update(&level, Vec3::new(0.5, 1.0, 0.5)));
        assert_eq!(t.current(), Some(CellId(0)));
        assert_eq!(t.previous(), None);

        assert!(!t.update(&level, Vec3::new(0.6, 1.0, 0.5)));

        assert!(t.update(&level, Vec3::new(1.5, 1.0, 0.5)));
        assert_eq!(t.current(), Some(CellId(1)));
        assert_eq!(t.previous(), Some(CellId(0)));

        assert!(t.update(&level, Vec3::new(9.0, 1.0, 0.5)));
        assert_eq!(t.current(), None);
        assert_eq!(t.previous(), Some(CellId(1)));
    }

    #[test]
    fn follower_steps_towards_waypoints() {
        let mut f = PathFollower::new(vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0)], 0.1);
        let step = f.steer(Vec3::new(0.0, 1.0, 0.0), 1.0);
        // First waypoint is underfoot and is consumed immediately.
        assert_eq!(step, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(f.remaining().len(), 1);

        let step = f.steer(Vec3::new(3.5, 1.0, 0.0), 1.0);
        assert!((step - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);

        assert_eq!(f.steer(Vec3::new(4.0, 1.0, 0.0), 1.0), Vec3::ZERO);
        assert!(f.is_finished());
        assert!(f.current_target().is_none());
        assert!(f.remaining().is_empty());
    }

    #[test]
    fn empty_route_is_finished() {
        let mut f = PathFollower::new(Vec::new(), 0.5);
        assert!(f.is_finished());
        assert_eq!(f.steer(Vec3::ONE, 1.0), Vec3::ZERO);
    }
}

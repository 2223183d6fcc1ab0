//! Navigation: quad cells, shared-edge adjacency, cell location and A* search.
//!
//! # Invariants
//! - Adjacency is mutual: if A lists B as a neighbor, B lists A.
//! - Cells are never added or removed after build; only the obstacle flag
//!   changes, and only between searches.
//! - Obstacle cells are excluded from search outright, not penalized.
//! - Returned paths step only between neighbors and never enter an obstacle.

mod cell;
mod graph;
mod grid;
mod path;
mod search;

pub use cell::{Edge, NavCell};
pub use graph::{BuildReport, LocateProbe, NavError, NavGraph};
pub use grid::quad_grid;
pub use path::{Path, Steps};

pub fn crate_info() -> &'static str {
    "cavern-nav v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("nav"));
    }
}

//! Level: the single owner of a cave's collision mesh and navigation graph.
//!
//! # Invariants
//! - Meshes are immutable after load; only cell obstacle flags change.
//! - Entities hold cell ids, never references into the level.
//! - Every query is synchronous and finishes within the call.

pub mod agent;
pub mod config;
pub mod level;

pub use agent::{CellTracker, PathFollower};
pub use config::{ConfigError, LevelConfig};
pub use level::{Level, LevelError, Movement};

pub fn crate_info() -> &'static str {
    "cavern-level v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("level"));
    }
}

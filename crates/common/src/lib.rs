//! Shared value types and intersection math for the cavern core.
//!
//! # Invariants
//! - Every intersection test guards its divisions; parallel or degenerate
//!   input reports "no hit" instead of producing NaN or infinity.

pub mod ray;
pub mod types;

pub use ray::{Ray, intersect_triangle};
pub use types::CellId;

/// Tolerance used when deciding that a direction is parallel to a plane.
pub const PARALLEL_EPSILON: f32 = 1e-6;

/// Squared cross-product magnitude under which a triangle counts as zero-area.
pub const DEGENERATE_EPSILON: f32 = 1e-12;

//! Collision: an immutable triangle mesh, a recursive swept-sphere resolver,
//! and single-pass ray/emitter queries.
//!
//! # Invariants
//! - The mesh is read-only after construction; every query takes `&self`.
//! - The resolver keeps no scratch state between calls. Each bounce is a
//!   pure function of its inputs, so concurrent queries never interfere.
//! - Recursion depth is bounded by `max_bounces`.
//! - Ties between equally early contacts go to the lowest triangle index.

mod mesh;
mod query;
mod sweep;

pub use mesh::{CollisionMesh, Triangle};
pub use query::RayHit;
pub use sweep::{
    Contact, DEFAULT_MAX_BOUNCES, DEFAULT_SKIN_WIDTH, Resolution, Surface, SweepQuery,
};

pub fn crate_info() -> &'static str {
    "cavern-collision v0.1.0"
}

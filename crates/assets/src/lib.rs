//! Geometry loader: parses OBJ-style mesh text into positions and faces.
//!
//! The collision core never reads files itself. Levels hand this crate the
//! text of a collision mesh and a navigation mesh; it returns flat triangle
//! lists and quad faces that keep their file vertex indices.
//!
//! # Layout
//! Only `v`, `vn`, `vt` and `f` carry meaning. Everything else (`o`, `g`,
//! `s`, `usemtl`, `mtllib`, comments) is skipped.

mod obj;

pub use obj::{Face, FaceCorner, MeshError, ObjMesh, QuadFace, load_obj, parse_obj};

pub fn crate_info() -> &'static str {
    "cavern-assets v0.1.0"
}

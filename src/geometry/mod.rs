//! Renderable geometry value objects and their incremental builders.
//!
//! Each geometry kind is immutable once built and carries a per-primitive
//! (or per-vertex, for meshes) picking group tag plus a bounding sphere.
//! Builders append whole primitives; the group id is an explicit parameter
//! of every `add` call.

/// Impostor cylinder lists.
pub mod cylinders;
/// Triangulated meshes.
pub mod mesh;
/// Shared tessellation primitives (icosphere, perpendicular frames).
pub mod primitive;
/// Bounding spheres.
pub mod sphere3d;
/// Impostor sphere lists.
pub mod spheres;

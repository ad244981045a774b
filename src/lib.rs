// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
// Geometry math allowances
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::too_many_lines)]

//! Backbone geometry and bond-topology indexing for molecular structure
//! visualization.
//!
//! Strand walks hierarchical molecular structures (units → residues →
//! elements, with intra-unit and inter-unit bond tables) and produces
//! renderable geometry: triangulated meshes or impostor primitive lists for
//! polymer backbones. Alongside the geometry it maintains the index
//! machinery that makes the output pickable: per-primitive group tags,
//! location iterators, and bidirectional bond-index mappings between a
//! structure and its filtered substructure views.
//!
//! # Key entry points
//!
//! - [`structure::Structure`] / [`structure::Unit`] - the read-only model
//!   the generators walk
//! - [`repr::backbone_cylinder`] / [`repr::backbone_sphere`] - backbone
//!   geometry generators (mesh and impostor paths)
//! - [`repr::bond`] - bond-index mappings, bond picking, and highlight
//!   propagation
//! - [`repr::visual`] - strategy selection and geometry lifecycle wrappers
//! - [`export::obj::ObjExporter`] - Wavefront OBJ output
//!
//! # Architecture
//!
//! Everything here is synchronous and allocation-light: generators are pure
//! functions over immutable structures, producing freshly built geometry
//! values that the owning renderer swaps in wholesale. Bond-index mappings
//! are recomputed per query rather than cached; they are O(edge count) and
//! must never outlive a structure change.

pub mod error;
pub mod export;
pub mod geometry;
pub mod repr;
pub mod structure;
pub mod theme;

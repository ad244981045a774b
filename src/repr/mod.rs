//! Structure representations: geometry generators, picking, and the index
//! machinery connecting them.

/// Backbone cylinder-pair generator.
pub mod backbone_cylinder;
/// Backbone per-residue sphere generator.
pub mod backbone_sphere;
/// Bond-index mappings, bond picking, and highlight propagation.
pub mod bond;
/// Semantic locations and the group/instance cursor.
pub mod location;
/// Picking identifiers and loci.
pub mod loci;
/// Polymer-level picking shared by the backbone visuals.
pub mod polymer;
/// Visual wrappers: strategy selection and geometry lifecycle.
pub mod visual;

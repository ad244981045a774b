//! Polymer backbone rendered as one sphere per residue trace atom.

use serde::{Deserialize, Serialize};

use crate::geometry::mesh::{Mesh, MeshBuilder};
use crate::geometry::primitive::sphere_vertex_count;
use crate::geometry::spheres::{Spheres, SpheresBuilder};
use crate::repr::location::Location;
use crate::structure::segment::{PolymerRangeIter, ResidueIter};
use crate::structure::{Structure, Unit};
use crate::theme::SizeTheme;

/// Backbone sphere generation props.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackboneSphereProps {
    /// Scale applied to the themed per-residue size.
    pub size_factor: f32,
    /// Icosphere subdivision of the mesh path (0-3).
    pub detail: u32,
    /// Prefer the impostor path when the backend supports it.
    pub try_use_impostor: bool,
}

impl Default for BackboneSphereProps {
    fn default() -> Self {
        Self {
            size_factor: 0.3,
            detail: 0,
            try_use_impostor: true,
        }
    }
}

/// Walk polymer ranges residue by residue, yielding each residue's trace
/// element with its running group id.
fn each_backbone_residue(unit: &Unit, mut f: impl FnMut(u32, u32)) {
    let model = unit.model();
    let mut residue_it = ResidueIter::new(model, unit.elements());
    let mut i: u32 = 0;
    for range in PolymerRangeIter::new(model, unit.elements()) {
        residue_it.reset(range);
        for seg in &mut residue_it {
            f(model.trace_element(seg.index), i);
            i += 1;
        }
    }
}

/// Generate impostor spheres for a unit's backbone trace atoms.
///
/// A unit without polymer elements yields an explicitly empty geometry.
pub fn create_backbone_sphere_impostor(
    unit: &Unit,
    structure: &Structure,
    props: &BackboneSphereProps,
    previous: Option<Spheres>,
) -> Spheres {
    let polymer_count = unit.polymer_elements().len();
    if polymer_count == 0 {
        return Spheres::empty(previous);
    }

    let mut builder =
        SpheresBuilder::reuse_or_with_capacity(previous, polymer_count);
    let model = unit.model();

    each_backbone_residue(unit, |element, group| {
        builder.add(model.position(element), group);
    });

    log::debug!(
        "backbone sphere impostor: unit {} of structure {}, {} spheres",
        unit.id(),
        structure.id(),
        builder.len()
    );
    builder.finish(unit.boundary().expand(props.size_factor))
}

/// Generate a triangulated sphere mesh for a unit's backbone trace atoms.
///
/// `detail` controls the icosphere tessellation; radius is the themed size
/// of each trace atom scaled by `size_factor`.
pub fn create_backbone_sphere_mesh(
    unit: &Unit,
    structure: &Structure,
    theme: &dyn SizeTheme,
    props: &BackboneSphereProps,
    previous: Option<Mesh>,
) -> Mesh {
    let polymer_count = unit.polymer_elements().len();
    if polymer_count == 0 {
        return Mesh::empty(previous);
    }

    let vertex_estimate = polymer_count * sphere_vertex_count(props.detail);
    let mut builder = MeshBuilder::reuse_or_with_capacity(
        previous,
        vertex_estimate,
        vertex_estimate * 2,
    );
    let model = unit.model();

    each_backbone_residue(unit, |element, group| {
        let radius = theme.size(&Location::Element {
            unit: unit.id(),
            element,
        }) * props.size_factor;
        builder.add_sphere(model.position(element), radius, props.detail, group);
    });

    log::debug!(
        "backbone sphere mesh: unit {} of structure {}, {} vertices",
        unit.id(),
        structure.id(),
        builder.vertex_count()
    );
    builder.finish(unit.boundary().expand(props.size_factor))
}

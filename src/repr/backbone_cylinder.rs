//! Polymer backbone rendered as per-bond cylinder pairs.
//!
//! Each adjacent residue pair contributes two half-cylinders split at a
//! fraction along the trace-to-trace vector, so either half can be colored
//! and sized by its own residue and picked independently. Ranges with a
//! registered ring closure emit one extra closing pair whose second half
//! reuses the range's first group id.

use serde::{Deserialize, Serialize};

use crate::geometry::cylinders::{Cylinders, CylindersBuilder};
use crate::geometry::mesh::{CylinderProps, Mesh, MeshBuilder};
use crate::repr::location::Location;
use crate::repr::polymer::{NUCLEIC_SHIFT, STANDARD_SHIFT};
use crate::structure::segment::{PolymerRangeIter, ResidueIter};
use crate::structure::{ResidueIndex, Structure, Unit};
use crate::theme::SizeTheme;

/// Backbone cylinder generation props.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackboneCylinderProps {
    /// Scale applied to the themed per-residue size.
    pub size_factor: f32,
    /// Radial tessellation of the mesh path.
    pub radial_segments: u32,
    /// Prefer the impostor path when the backend supports it.
    pub try_use_impostor: bool,
}

impl Default for BackboneCylinderProps {
    fn default() -> Self {
        Self {
            size_factor: 0.3,
            radial_segments: 16,
            try_use_impostor: true,
        }
    }
}

/// One emitted backbone bond: the residue pair and the group ids of its two
/// halves.
struct BackbonePair {
    index_a: ResidueIndex,
    index_b: ResidueIndex,
    group_a: u32,
    group_b: u32,
}

/// Walk polymer ranges residue-pairwise, emitting one pair per adjacent
/// residue plus the ring-closure pair where registered. Group ids count
/// residues across ranges; the closing pair's second half reuses the
/// range's first group.
fn each_backbone_pair(unit: &Unit, mut f: impl FnMut(&BackbonePair)) {
    let model = unit.model();
    let mut residue_it = ResidueIter::new(model, unit.elements());
    let mut i: u32 = 0;

    for range in PolymerRangeIter::new(model, unit.elements()) {
        residue_it.reset(range);
        let first_group = i;
        let Some(first) = residue_it.next() else {
            continue;
        };
        i += 1;
        let mut index_b = first.index;

        for seg in &mut residue_it {
            let index_a = index_b;
            index_b = seg.index;
            f(&BackbonePair {
                index_a,
                index_b,
                group_a: i - 1,
                group_b: i,
            });
            i += 1;
        }

        if let Some(partner) = model.cyclic_partner(index_b) {
            f(&BackbonePair {
                index_a: index_b,
                index_b: partner,
                group_a: i - 1,
                group_b: first_group,
            });
        }
    }
}

fn shift_for(unit: &Unit, residue: ResidueIndex) -> f32 {
    if unit.model().molecule_type(residue).is_nucleic() {
        NUCLEIC_SHIFT
    } else {
        STANDARD_SHIFT
    }
}

/// Generate impostor cylinders for a unit's backbone.
///
/// Radii are left at scale 1; the themed size is applied in the backend's
/// vertex stage. A unit without polymer elements yields an explicitly empty
/// geometry.
pub fn create_backbone_cylinder_impostor(
    unit: &Unit,
    structure: &Structure,
    props: &BackboneCylinderProps,
    previous: Option<Cylinders>,
) -> Cylinders {
    let polymer_count = unit.polymer_elements().len();
    if polymer_count == 0 {
        return Cylinders::empty(previous);
    }

    let estimate = polymer_count * 2;
    let mut builder =
        CylindersBuilder::reuse_or_with_capacity(previous, estimate);
    let model = unit.model();

    each_backbone_pair(unit, |pair| {
        let p_a = model.position(model.trace_element(pair.index_a));
        let p_b = model.position(model.trace_element(pair.index_b));
        let p_m = p_a + (p_b - p_a) * shift_for(unit, pair.index_a);

        builder.add(p_a, p_m, 1.0, false, false, pair.group_a);
        builder.add(p_m, p_b, 1.0, false, false, pair.group_b);
    });

    log::debug!(
        "backbone cylinder impostor: unit {} of structure {}, {} cylinders",
        unit.id(),
        structure.id(),
        builder.len()
    );
    builder.finish(unit.boundary().expand(props.size_factor))
}

/// Generate a triangulated mesh for a unit's backbone.
///
/// Each half-cylinder's radius is the themed size of its own residue's
/// trace atom scaled by `size_factor`. A unit without polymer elements
/// yields an explicitly empty geometry.
pub fn create_backbone_cylinder_mesh(
    unit: &Unit,
    structure: &Structure,
    theme: &dyn SizeTheme,
    props: &BackboneCylinderProps,
    previous: Option<Mesh>,
) -> Mesh {
    let polymer_count = unit.polymer_elements().len();
    if polymer_count == 0 {
        return Mesh::empty(previous);
    }

    let vertex_estimate =
        props.radial_segments as usize * 2 * polymer_count * 2;
    let mut builder = MeshBuilder::reuse_or_with_capacity(
        previous,
        vertex_estimate,
        vertex_estimate,
    );
    let model = unit.model();
    let mut cylinder_props = CylinderProps {
        radius_top: 1.0,
        radius_bottom: 1.0,
        radial_segments: props.radial_segments,
    };

    each_backbone_pair(unit, |pair| {
        let e_a = model.trace_element(pair.index_a);
        let e_b = model.trace_element(pair.index_b);
        let p_a = model.position(e_a);
        let p_b = model.position(e_b);
        let shift = shift_for(unit, pair.index_a);

        let radius_a = theme.size(&Location::Element {
            unit: unit.id(),
            element: e_a,
        }) * props.size_factor;
        cylinder_props.radius_top = radius_a;
        cylinder_props.radius_bottom = radius_a;
        builder.add_cylinder(p_a, p_b, shift, &cylinder_props, pair.group_a);

        let radius_b = theme.size(&Location::Element {
            unit: unit.id(),
            element: e_b,
        }) * props.size_factor;
        cylinder_props.radius_top = radius_b;
        cylinder_props.radius_bottom = radius_b;
        builder.add_cylinder(
            p_b,
            p_a,
            1.0 - shift,
            &cylinder_props,
            pair.group_b,
        );
    });

    log::debug!(
        "backbone cylinder mesh: unit {} of structure {}, {} vertices",
        unit.id(),
        structure.id(),
        builder.vertex_count()
    );
    builder.finish(unit.boundary().expand(props.size_factor))
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::geometry::sphere3d::Sphere3D;
    use crate::structure::model::MoleculeType;
    use crate::structure::testing::{
        chain_model_with, chain_structure, structure_of, TRACE_SPACING,
    };
    use crate::theme::UniformSizeTheme;

    fn props() -> BackboneCylinderProps {
        BackboneCylinderProps::default()
    }

    #[test]
    fn test_no_polymer_elements_yields_empty_geometry() {
        let model = chain_model_with(2, |d| d.polymer_ranges.clear());
        let structure = structure_of(&model);
        let unit = structure.unit(0).unwrap();

        let cylinders =
            create_backbone_cylinder_impostor(unit, &structure, &props(), None);
        assert_eq!(cylinders.cylinder_count(), 0);
        assert_eq!(cylinders.bounding_sphere(), Sphere3D::ZERO);

        let mesh = create_backbone_cylinder_mesh(
            unit,
            &structure,
            &UniformSizeTheme::default(),
            &props(),
            None,
        );
        assert_eq!(mesh.vertex_count(), 0);
    }

    #[test]
    fn test_linear_chain_pair_and_group_invariants() {
        let n = 4;
        let structure = chain_structure(n);
        let unit = structure.unit(0).unwrap();
        let cylinders =
            create_backbone_cylinder_impostor(unit, &structure, &props(), None);

        // N - 1 adjacent pairs, two halves each.
        assert_eq!(cylinders.cylinder_count(), 2 * (n - 1));
        assert_eq!(cylinders.groups(), &[0, 1, 1, 2, 2, 3]);

        // Group ids are the contiguous residue range with no gaps.
        let mut distinct: Vec<u32> = cylinders.groups().to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        assert_eq!(distinct, (0..n as u32).collect::<Vec<_>>());
    }

    #[test]
    fn test_cyclic_chain_adds_exactly_one_closing_pair() {
        let n = 4;
        let cyclic_model =
            chain_model_with(n, |d| d.cyclic_polymer_map = vec![(3, 0)]);
        let cyclic = structure_of(&cyclic_model);
        let linear = chain_structure(n);

        let closed = create_backbone_cylinder_impostor(
            cyclic.unit(0).unwrap(),
            &cyclic,
            &props(),
            None,
        );
        let open = create_backbone_cylinder_impostor(
            linear.unit(0).unwrap(),
            &linear,
            &props(),
            None,
        );

        assert_eq!(closed.cylinder_count(), open.cylinder_count() + 2);
        // The closing pair reuses the range's first group for its B half.
        assert_eq!(closed.groups()[closed.groups().len() - 2..], [3, 0]);
    }

    #[test]
    fn test_single_residue_range_contributes_only_cyclic_closure() {
        // Polymer range covering just residue 0, closing onto residue 2.
        let model = chain_model_with(3, |d| {
            d.polymer_ranges = vec![(0, 2)];
            d.cyclic_polymer_map = vec![(0, 2)];
        });
        let structure = structure_of(&model);
        let cylinders = create_backbone_cylinder_impostor(
            structure.unit(0).unwrap(),
            &structure,
            &props(),
            None,
        );
        assert_eq!(cylinders.cylinder_count(), 2);
        assert_eq!(cylinders.groups(), &[0, 0]);
    }

    #[test]
    fn test_nucleic_and_standard_split_points() {
        // Residue 0 nucleic, residues 1..2 protein.
        let model = chain_model_with(3, |d| {
            d.molecule_type[0] = MoleculeType::Dna;
        });
        let structure = structure_of(&model);
        let cylinders = create_backbone_cylinder_impostor(
            structure.unit(0).unwrap(),
            &structure,
            &props(),
            None,
        );
        assert_eq!(cylinders.cylinder_count(), 4);

        // Pair 0 splits at the nucleic fraction along trace0 → trace1.
        let expected_mid_0 = NUCLEIC_SHIFT * TRACE_SPACING;
        assert!(
            (cylinders.instances()[0].end_position()
                - Vec3::new(expected_mid_0, 0.0, 0.0))
            .length()
                < 1e-5
        );
        // Pair 1 splits at the standard fraction along trace1 → trace2.
        let expected_mid_1 = (1.0 + STANDARD_SHIFT) * TRACE_SPACING;
        assert!(
            (cylinders.instances()[2].end_position()
                - Vec3::new(expected_mid_1, 0.0, 0.0))
            .length()
                < 1e-5
        );
    }

    #[test]
    fn test_mesh_radius_follows_theme_and_size_factor() {
        let structure = chain_structure(2);
        let unit = structure.unit(0).unwrap();
        let theme = UniformSizeTheme { value: 2.0 };
        let generation_props = BackboneCylinderProps {
            size_factor: 0.5,
            radial_segments: 8,
            ..props()
        };
        let mesh = create_backbone_cylinder_mesh(
            unit,
            &structure,
            &theme,
            &generation_props,
            None,
        );
        // Ring vertices sit at radius size * size_factor from the axis
        // (the axis is the x axis for this fixture).
        let max_off_axis = mesh
            .positions()
            .chunks(3)
            .map(|p| (p[1] * p[1] + p[2] * p[2]).sqrt())
            .fold(0.0f32, f32::max);
        assert!((max_off_axis - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_regeneration_is_structurally_idempotent() {
        let structure = chain_structure(5);
        let unit = structure.unit(0).unwrap();
        let theme = UniformSizeTheme::default();

        let first = create_backbone_cylinder_mesh(
            unit,
            &structure,
            &theme,
            &props(),
            None,
        );
        let first_groups = first.group_sequence();
        let first_vertices = first.vertex_count();

        // Rebuild reusing the previous geometry's storage.
        let second = create_backbone_cylinder_mesh(
            unit,
            &structure,
            &theme,
            &props(),
            Some(first),
        );
        assert_eq!(second.group_sequence(), first_groups);
        assert_eq!(second.vertex_count(), first_vertices);
    }

    #[test]
    fn test_props_serde_roundtrip_with_defaults() {
        let custom = BackboneCylinderProps {
            size_factor: 0.4,
            radial_segments: 8,
            try_use_impostor: false,
        };
        let json = serde_json::to_string(&custom).unwrap();
        let back: BackboneCylinderProps =
            serde_json::from_str(&json).unwrap();
        assert_eq!(back, custom);

        let partial: BackboneCylinderProps =
            serde_json::from_str(r#"{"size_factor": 1.0}"#).unwrap();
        assert_eq!(partial.size_factor, 1.0);
        assert_eq!(
            partial.radial_segments,
            BackboneCylinderProps::default().radial_segments
        );
    }

    #[test]
    fn test_bounding_sphere_expanded_by_size_factor() {
        let structure = chain_structure(3);
        let unit = structure.unit(0).unwrap();
        let cylinders =
            create_backbone_cylinder_impostor(unit, &structure, &props(), None);
        let expected = unit.boundary().expand(props().size_factor);
        assert_eq!(cylinders.bounding_sphere(), expected);
    }
}

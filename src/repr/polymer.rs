//! Polymer-level picking support shared by the backbone visuals.
//!
//! Backbone geometry tags its primitives with the polymer residue position
//! (per unit, in chain order); the functions here translate between those
//! group tags and element-level loci.

use crate::repr::location::{Location, LocationIterator};
use crate::repr::loci::{Interval, Loci, PickingId};
use crate::structure::StructureGroup;

/// Fraction along the bond where a standard (amino acid) half-cylinder pair
/// splits; the midpoint, so each half takes its own residue's color/size.
pub const STANDARD_SHIFT: f32 = 0.5;

/// Split fraction when the first residue is nucleic: trace atoms sit on the
/// sugar ring, so the split lands closer to residue A, keeping the longer
/// half on the inter-residue stretch.
pub const NUCLEIC_SHIFT: f32 = 0.25;

/// Location cursor for polymer-residue-tagged geometry: one group per
/// polymer residue, one instance per unit in the group.
pub fn polymer_location_iterator(
    sg: StructureGroup<'_>,
) -> LocationIterator<'_> {
    let group_count = sg
        .group
        .units()
        .first()
        .and_then(|&id| sg.structure.unit(id))
        .map_or(0, |u| u.polymer_elements().len());
    let instance_count = sg.group.len();

    LocationIterator::new(group_count, instance_count, move |group, instance| {
        let Some(&unit_id) = sg.group.units().get(instance) else {
            return Location::None;
        };
        let Some(unit) = sg.structure.unit(unit_id) else {
            return Location::None;
        };
        unit.polymer_elements().get(group).map_or(
            Location::None,
            |&element| Location::Element {
                unit: unit_id,
                element,
            },
        )
    })
}

/// Resolve a picking id against polymer-residue-tagged geometry.
///
/// Misses (wrong object, out-of-range instance or group) yield
/// [`Loci::None`].
pub fn polymer_element_loci(
    picking: &PickingId,
    sg: StructureGroup<'_>,
    object_id: u32,
) -> Loci {
    if picking.object_id != object_id {
        return Loci::None;
    }
    let Some(&unit_id) = sg.group.units().get(picking.instance_id as usize)
    else {
        return Loci::None;
    };
    let Some(unit) = sg.structure.unit(unit_id) else {
        return Loci::None;
    };
    let Some(&element) =
        unit.polymer_elements().get(picking.group_id as usize)
    else {
        return Loci::None;
    };
    let Some(local) = unit.find_element(element) else {
        return Loci::None;
    };
    Loci::single_element(sg.structure.root_id(), unit_id, local)
}

/// Apply the renderer group intervals covered by an element loci.
///
/// Returns whether any `apply` call reported a change.
pub fn each_polymer_element(
    loci: &Loci,
    sg: StructureGroup<'_>,
    apply: &mut dyn FnMut(Interval) -> bool,
) -> bool {
    let mut changed = false;
    let Loci::Elements {
        structure,
        elements,
    } = loci
    else {
        return false;
    };
    if *structure != sg.structure.root_id() {
        return false;
    }
    let Some(first_unit) = sg
        .group
        .units()
        .first()
        .and_then(|&id| sg.structure.unit(id))
    else {
        return false;
    };
    let group_count = first_unit.polymer_elements().len() as u32;

    for entry in elements {
        let Some(unit_idx) = sg.group.index_of(entry.unit) else {
            continue;
        };
        let Some(unit) = sg.structure.unit(entry.unit) else {
            continue;
        };
        for &local in &entry.indices {
            let element = unit.element_at(local);
            if let Ok(pos) = unit.polymer_elements().binary_search(&element) {
                if apply(Interval::singleton(
                    unit_idx * group_count + pos as u32,
                )) {
                    changed = true;
                }
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::testing::chain_structure;
    use crate::structure::UnitGroup;

    #[test]
    fn test_loci_roundtrip_through_marking() {
        let structure = chain_structure(4);
        let group = UnitGroup::new(vec![0]);
        let sg = StructureGroup {
            structure: &structure,
            group: &group,
        };

        let picking = PickingId {
            object_id: 1,
            instance_id: 0,
            group_id: 2,
        };
        let loci = polymer_element_loci(&picking, sg, 1);
        assert!(!loci.is_none());

        let mut hits = Vec::new();
        let changed = each_polymer_element(&loci, sg, &mut |interval| {
            hits.push(interval.start);
            true
        });
        assert!(changed);
        assert_eq!(hits, vec![2]);
    }

    #[test]
    fn test_object_mismatch_is_a_miss() {
        let structure = chain_structure(2);
        let group = UnitGroup::new(vec![0]);
        let sg = StructureGroup {
            structure: &structure,
            group: &group,
        };
        let picking = PickingId {
            object_id: 5,
            instance_id: 0,
            group_id: 0,
        };
        assert!(polymer_element_loci(&picking, sg, 1).is_none());
    }

    #[test]
    fn test_location_iterator_resolves_traces() {
        let structure = chain_structure(3);
        let group = UnitGroup::new(vec![0]);
        let sg = StructureGroup {
            structure: &structure,
            group: &group,
        };
        let it = polymer_location_iterator(sg);
        assert_eq!(it.group_count(), 3);
        assert_eq!(it.instance_count(), 1);
        assert_eq!(
            it.location(1, 0),
            Location::Element {
                unit: 0,
                element: 2
            }
        );
    }

    #[test]
    fn test_foreign_structure_is_ignored() {
        let structure = chain_structure(2);
        let other = chain_structure(2);
        let group = UnitGroup::new(vec![0]);
        let sg = StructureGroup {
            structure: &structure,
            group: &group,
        };
        let loci = Loci::single_element(other.root_id(), 0, 0);
        let changed = each_polymer_element(&loci, sg, &mut |_| true);
        assert!(!changed);
    }
}

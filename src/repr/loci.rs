//! Picking identifiers and semantic selections (loci).
//!
//! A [`Loci`] is structure-relative: it names units and unit-local element
//! indices plus the id of the hierarchy root it was resolved against, never
//! borrowing the structure itself. Picking misses resolve to
//! [`Loci::None`], which is an expected outcome, not an error.

use crate::structure::{StructureId, UnitElementIndex, UnitId};

/// The identifier triple a renderer reports for a picked fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickingId {
    /// Render object identity.
    pub object_id: u32,
    /// Instance (unit within the rendered group).
    pub instance_id: u32,
    /// Per-primitive group tag baked into the geometry.
    pub group_id: u32,
}

/// A half-open interval of renderer group slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    /// First slot.
    pub start: u32,
    /// One past the last slot.
    pub end: u32,
}

impl Interval {
    /// The interval covering exactly one slot.
    pub fn singleton(slot: u32) -> Self {
        Self {
            start: slot,
            end: slot + 1,
        }
    }

    /// Number of covered slots.
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Whether the interval covers nothing.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Sorted unit-local element indices of one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitElements {
    /// The unit the indices are local to.
    pub unit: UnitId,
    /// Strictly sorted unit-local element indices.
    pub indices: Vec<UnitElementIndex>,
}

impl UnitElements {
    /// Whether the selection contains a unit-local index.
    pub fn contains(&self, index: UnitElementIndex) -> bool {
        self.indices.binary_search(&index).is_ok()
    }
}

/// One directed bond endpoint pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BondLocation {
    /// Unit of the first endpoint.
    pub a_unit: UnitId,
    /// First endpoint, local to `a_unit`.
    pub a_index: UnitElementIndex,
    /// Unit of the second endpoint.
    pub b_unit: UnitId,
    /// Second endpoint, local to `b_unit`.
    pub b_index: UnitElementIndex,
}

impl BondLocation {
    /// A bond within one unit.
    pub fn intra(
        unit: UnitId,
        a_index: UnitElementIndex,
        b_index: UnitElementIndex,
    ) -> Self {
        Self {
            a_unit: unit,
            a_index,
            b_unit: unit,
            b_index,
        }
    }

    /// The same bond seen from the other endpoint.
    pub fn flipped(self) -> Self {
        Self {
            a_unit: self.b_unit,
            a_index: self.b_index,
            b_unit: self.a_unit,
            b_index: self.a_index,
        }
    }
}

/// A semantic, structure-relative selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loci {
    /// Nothing selected (picking miss, empty input).
    None,
    /// A set of elements, grouped per unit.
    Elements {
        /// Root id of the hierarchy the selection belongs to.
        structure: StructureId,
        /// Per-unit sorted element selections.
        elements: Vec<UnitElements>,
    },
    /// A set of directed bond locations.
    Bonds {
        /// Root id of the hierarchy the selection belongs to.
        structure: StructureId,
        /// Directed endpoint pairs.
        bonds: Vec<BondLocation>,
    },
}

impl Loci {
    /// Whether this is the empty selection.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Root id of the hierarchy the selection belongs to, if any.
    pub fn structure(&self) -> Option<StructureId> {
        match self {
            Self::None => None,
            Self::Elements { structure, .. } | Self::Bonds { structure, .. } => {
                Some(*structure)
            }
        }
    }

    /// A single-element selection.
    pub fn single_element(
        structure: StructureId,
        unit: UnitId,
        index: UnitElementIndex,
    ) -> Self {
        Self::Elements {
            structure,
            elements: vec![UnitElements {
                unit,
                indices: vec![index],
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_singleton() {
        let interval = Interval::singleton(5);
        assert_eq!(interval.len(), 1);
        assert!(!interval.is_empty());
        assert_eq!(interval.start, 5);
        assert_eq!(interval.end, 6);
    }

    #[test]
    fn test_bond_location_flip() {
        let bond = BondLocation::intra(3, 1, 2);
        let flipped = bond.flipped();
        assert_eq!(flipped.a_index, 2);
        assert_eq!(flipped.b_index, 1);
        assert_eq!(flipped.flipped(), bond);
    }

    #[test]
    fn test_unit_elements_contains() {
        let sel = UnitElements {
            unit: 0,
            indices: vec![1, 4, 9],
        };
        assert!(sel.contains(4));
        assert!(!sel.contains(5));
    }

    #[test]
    fn test_loci_structure_id() {
        assert_eq!(Loci::None.structure(), None);
        assert_eq!(Loci::single_element(7, 0, 0).structure(), Some(7));
    }
}
